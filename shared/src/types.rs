//! Common types and money helpers used across the platform

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Predefined product categories for medical supplies
pub const CATEGORIES: [&str; 5] = [
    "Medicamentos",
    "Equipos",
    "Insumos",
    "Dispositivos",
    "Consumibles",
];

/// Fixed set of shipping destinations (Peruvian cities)
pub const DESTINATIONS: [&str; 15] = [
    "Lima",
    "Arequipa",
    "Trujillo",
    "Chiclayo",
    "Piura",
    "Iquitos",
    "Cusco",
    "Huancayo",
    "Chimbote",
    "Tacna",
    "Ica",
    "Sullana",
    "Chincha",
    "Huánuco",
    "Pucallpa",
];

/// Convert a monetary amount to integer cents, the form the local store
/// persists. Amounts are rounded to two decimal places.
pub fn decimal_to_cents(amount: Decimal) -> i64 {
    (amount * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or(0)
}

/// Convert integer cents back to a two-decimal monetary amount.
pub fn cents_to_decimal(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}
