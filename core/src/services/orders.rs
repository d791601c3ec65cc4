//! Order service: the persistent order store
//!
//! Status writes here are unconditional; the lifecycle coordinator is the
//! layer that enforces the state machine. Deletion restores stock for every
//! line inside one transaction before the order row goes away.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use shared::{
    cents_to_decimal, check_stock_available, decimal_to_cents, LineDetail, Order, OrderLine,
    OrderStatus,
};

use crate::error::{AppError, AppResult};
use crate::events::{EventBus, StoreEvent};

use super::ledger::StockLedger;

/// Order service for managing orders and their line items
#[derive(Clone)]
pub struct OrderService {
    db: SqlitePool,
    events: Option<EventBus>,
}

/// Row shape of the orders table
#[derive(Debug, FromRow)]
struct OrderRow {
    id: Uuid,
    client: String,
    destination: String,
    total_cents: i64,
    status: String,
    created_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Order {
            id: row.id,
            client: row.client,
            destination: row.destination,
            total: cents_to_decimal(row.total_cents),
            // Unknown tokens fall back to Pending, matching record creation
            status: OrderStatus::parse(&row.status).unwrap_or(OrderStatus::Pending),
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct LineDetailRow {
    product_id: Uuid,
    product_name: String,
    quantity: i64,
    price_cents: i64,
}

const SELECT_ORDER: &str =
    "SELECT id, client, destination, total_cents, status, created_at FROM orders";

impl OrderService {
    /// Create a new OrderService instance
    pub fn new(db: SqlitePool) -> Self {
        Self { db, events: None }
    }

    pub fn with_events(db: SqlitePool, events: EventBus) -> Self {
        Self {
            db,
            events: Some(events),
        }
    }

    fn notify(&self, event: StoreEvent) {
        if let Some(events) = &self.events {
            events.publish(event);
        }
    }

    /// Persist a new order with status Pending. Client and destination are
    /// validated by the caller, not here.
    pub async fn create_order(
        &self,
        client: &str,
        destination: &str,
        total: Decimal,
    ) -> AppResult<Order> {
        let row = sqlx::query_as::<_, OrderRow>(
            r#"
            INSERT INTO orders (id, client, destination, total_cents, status, created_at)
            VALUES (?, ?, ?, ?, 'pending', ?)
            RETURNING id, client, destination, total_cents, status, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(client)
        .bind(destination)
        .bind(decimal_to_cents(total))
        .bind(Utc::now())
        .fetch_one(&self.db)
        .await?;

        self.notify(StoreEvent::OrdersChanged);
        Ok(row.into())
    }

    pub async fn get_order(&self, order_id: Uuid) -> AppResult<Order> {
        let row = sqlx::query_as::<_, OrderRow>(&format!("{SELECT_ORDER} WHERE id = ?"))
            .bind(order_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Order".to_string()))?;

        Ok(row.into())
    }

    /// All orders, newest first.
    pub async fn list_orders(&self) -> AppResult<Vec<Order>> {
        let rows =
            sqlx::query_as::<_, OrderRow>(&format!("{SELECT_ORDER} ORDER BY created_at DESC"))
                .fetch_all(&self.db)
                .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn list_orders_by_status(&self, status: OrderStatus) -> AppResult<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "{SELECT_ORDER} WHERE status = ? ORDER BY created_at DESC"
        ))
        .bind(status.as_str())
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Unconditional status overwrite, persisted immediately.
    pub async fn set_status(&self, order_id: Uuid, status: OrderStatus) -> AppResult<()> {
        let result = sqlx::query("UPDATE orders SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(order_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Order".to_string()));
        }

        self.notify(StoreEvent::OrdersChanged);
        Ok(())
    }

    /// Delete an order, restoring stock for every line first.
    ///
    /// Delivered orders are immutable history and cannot be deleted.
    /// Restoration, line removal, and order removal run in one transaction:
    /// either all apply or none do.
    pub async fn delete_order(&self, order_id: Uuid) -> AppResult<()> {
        let order = self.get_order(order_id).await?;
        if order.status == OrderStatus::Delivered {
            return Err(AppError::OrderNotDeletable(
                "delivered orders cannot be deleted".to_string(),
            ));
        }

        let mut tx = self.db.begin().await?;

        StockLedger::restore_lines(&mut *tx, order_id).await?;

        sqlx::query("DELETE FROM order_lines WHERE order_id = ?")
            .bind(order_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM orders WHERE id = ?")
            .bind(order_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(%order_id, client = %order.client, "order deleted, stock restored");
        self.notify(StoreEvent::OrdersChanged);
        self.notify(StoreEvent::ProductsChanged);
        Ok(())
    }

    pub async fn lines_for_order(&self, order_id: Uuid) -> AppResult<Vec<OrderLine>> {
        let lines = sqlx::query_as::<_, (Uuid, Uuid, Uuid, i64)>(
            "SELECT id, order_id, product_id, quantity FROM order_lines WHERE order_id = ?",
        )
        .bind(order_id)
        .fetch_all(&self.db)
        .await?;

        Ok(lines
            .into_iter()
            .map(|(id, order_id, product_id, quantity)| OrderLine {
                id,
                order_id,
                product_id,
                quantity,
            })
            .collect())
    }

    /// Lines joined with the product fields a sync payload carries.
    pub async fn line_details(&self, order_id: Uuid) -> AppResult<Vec<LineDetail>> {
        let rows = sqlx::query_as::<_, LineDetailRow>(
            r#"
            SELECT ol.product_id, p.name AS product_name, ol.quantity, p.price_cents
            FROM order_lines ol
            JOIN products p ON p.id = ol.product_id
            WHERE ol.order_id = ?
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| LineDetail {
                product_id: r.product_id,
                product_name: r.product_name,
                quantity: r.quantity,
                unit_price: cents_to_decimal(r.price_cents),
            })
            .collect())
    }

    /// Caller-side batch stock check run before building an order. Returns
    /// a description per product that cannot serve its requested quantity;
    /// an empty list means the order can proceed.
    pub async fn validate_stock_for_order(
        &self,
        items: &[(Uuid, i64)],
    ) -> AppResult<Vec<String>> {
        let mut conflicts = Vec::new();

        for &(product_id, quantity) in items {
            let product = super::catalog::fetch_product(&self.db, product_id).await?;
            if let Err(err) = check_stock_available(&product, quantity) {
                conflicts.push(err.to_string());
            }
        }

        Ok(conflicts)
    }
}
