//! Order, order line, and lifecycle state models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::decimal_to_cents;

/// Lifecycle state of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Preparing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Preparing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    /// Token persisted by the local store
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(OrderStatus::Pending),
            "preparing" => Some(OrderStatus::Preparing),
            "shipped" => Some(OrderStatus::Shipped),
            "delivered" => Some(OrderStatus::Delivered),
            "cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }

    /// Status vocabulary used by the remote order documents
    pub fn wire_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pendiente",
            OrderStatus::Preparing => "Preparando",
            OrderStatus::Shipped => "Enviado",
            OrderStatus::Delivered => "Entregado",
            OrderStatus::Cancelled => "Cancelado",
        }
    }

    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "Pendiente" => Some(OrderStatus::Pending),
            "Preparando" => Some(OrderStatus::Preparing),
            "Enviado" => Some(OrderStatus::Shipped),
            "Entregado" => Some(OrderStatus::Delivered),
            "Cancelado" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }

    /// Delivered and Cancelled orders never change state again
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Any non-terminal state may move to any other state except itself.
    pub fn can_transition(self, to: OrderStatus) -> bool {
        !self.is_terminal() && self != to
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A customer order against the local catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub client: String,
    pub destination: String,
    /// Sum of line quantity x unit price at line creation
    pub total: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn total_cents(&self) -> i64 {
        decimal_to_cents(self.total)
    }
}

/// One product + quantity entry within an order. Immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i64,
}

/// An order line joined with the product fields a sync payload needs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineDetail {
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: Decimal,
}

impl LineDetail {
    pub fn subtotal(&self) -> Decimal {
        Decimal::from(self.quantity) * self.unit_price
    }
}

/// Total amount for a set of line details
pub fn order_total(details: &[LineDetail]) -> Decimal {
    details.iter().map(LineDetail::subtotal).sum()
}
