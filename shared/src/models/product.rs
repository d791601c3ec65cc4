//! Product catalog models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::decimal_to_cents;

/// A medical supply product tracked in the local catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    /// Unique within the active set; soft-deleted duplicates may exist
    pub name: String,
    pub category: String,
    pub price: Decimal,
    /// May transiently go negative on over-allocation
    pub stock: i64,
    pub min_stock: i64,
    pub created_at: DateTime<Utc>,
    pub active: bool,
}

impl Product {
    /// Whether the product is at or below its minimum stock threshold
    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.min_stock
    }

    /// Unit price in integer cents, as persisted by the local store
    pub fn price_cents(&self) -> i64 {
        decimal_to_cents(self.price)
    }
}
