//! Caller-side validation for order and catalog mutations
//!
//! The core services trust callers to have run these checks before invoking
//! mutation entry points; only the terminal guard on order deletion and the
//! reference guard on product deactivation are re-checked inside the core.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::Product;
use crate::types::DESTINATIONS;

/// Business-rule violations detected before a mutation is committed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("client name must not be empty")]
    EmptyClientName,

    #[error("unknown destination: {0}")]
    UnknownDestination(String),

    #[error("quantity must be greater than zero")]
    NonPositiveQuantity,

    #[error("price must not be negative")]
    NegativePrice,

    #[error("insufficient stock for {product}: available {available}, requested {requested}")]
    InsufficientStock {
        product: String,
        available: i64,
        requested: i64,
    },
}

pub fn validate_client_name(client: &str) -> Result<(), ValidationError> {
    if client.trim().is_empty() {
        return Err(ValidationError::EmptyClientName);
    }
    Ok(())
}

pub fn validate_destination(destination: &str) -> Result<(), ValidationError> {
    if DESTINATIONS.contains(&destination) {
        Ok(())
    } else {
        Err(ValidationError::UnknownDestination(destination.to_string()))
    }
}

pub fn validate_quantity(quantity: i64) -> Result<(), ValidationError> {
    if quantity <= 0 {
        return Err(ValidationError::NonPositiveQuantity);
    }
    Ok(())
}

pub fn validate_price(price: Decimal) -> Result<(), ValidationError> {
    if price < Decimal::ZERO {
        return Err(ValidationError::NegativePrice);
    }
    Ok(())
}

/// Check that a requested quantity can be served from current stock.
pub fn check_stock_available(product: &Product, requested: i64) -> Result<(), ValidationError> {
    validate_quantity(requested)?;
    if requested > product.stock {
        return Err(ValidationError::InsufficientStock {
            product: product.name.clone(),
            available: product.stock,
            requested,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::str::FromStr;
    use uuid::Uuid;

    fn product_with_stock(stock: i64) -> Product {
        Product {
            id: Uuid::new_v4(),
            name: "Mascarillas N95".to_string(),
            category: "Insumos".to_string(),
            price: Decimal::from_str("8.75").unwrap(),
            stock,
            min_stock: 25,
            created_at: Utc::now(),
            active: true,
        }
    }

    #[test]
    fn rejects_blank_client_names() {
        assert_eq!(validate_client_name("   "), Err(ValidationError::EmptyClientName));
        assert!(validate_client_name("Ana").is_ok());
    }

    #[test]
    fn destination_must_be_in_the_fixed_set() {
        assert!(validate_destination("Lima").is_ok());
        assert_eq!(
            validate_destination("Bogotá"),
            Err(ValidationError::UnknownDestination("Bogotá".to_string()))
        );
    }

    #[test]
    fn stock_check_allows_exact_availability() {
        let product = product_with_stock(5);
        assert!(check_stock_available(&product, 5).is_ok());
        assert!(matches!(
            check_stock_available(&product, 6),
            Err(ValidationError::InsufficientStock { available: 5, requested: 6, .. })
        ));
    }

    #[test]
    fn stock_check_rejects_non_positive_quantities() {
        let product = product_with_stock(5);
        assert_eq!(
            check_stock_available(&product, 0),
            Err(ValidationError::NonPositiveQuantity)
        );
    }
}
