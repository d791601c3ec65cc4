//! Stock ledger: the single choke point coupling order mutation to
//! inventory mutation
//!
//! Attaching a line decrements the referenced product's stock; deleting an
//! order restores it. Local writes are authoritative; remote propagation is
//! fire-and-forget over a channel drained by the stock-sync worker and is
//! never awaited or rolled back here.

use sqlx::{SqliteConnection, SqlitePool};
use tokio::sync::mpsc;
use uuid::Uuid;

use shared::{validate_quantity, OrderLine};

use crate::error::{AppError, AppResult};

/// Stock value to push to the remote store, keyed by product name
#[derive(Debug, Clone)]
pub struct StockUpdate {
    pub product_name: String,
    pub new_stock: i64,
}

/// Ledger operations over the products and order_lines tables
#[derive(Clone)]
pub struct StockLedger {
    db: SqlitePool,
    stock_tx: Option<mpsc::UnboundedSender<StockUpdate>>,
}

impl StockLedger {
    pub fn new(db: SqlitePool) -> Self {
        Self { db, stock_tx: None }
    }

    /// Ledger that forwards every stock write to the remote sync worker.
    pub fn with_remote(db: SqlitePool, stock_tx: mpsc::UnboundedSender<StockUpdate>) -> Self {
        Self {
            db,
            stock_tx: Some(stock_tx),
        }
    }

    /// Create an order line and apply the stock decrement. Line insert and
    /// decrement commit in one transaction: a failed decrement leaves no
    /// orphan line behind.
    ///
    /// The decrement is unconditional: callers are expected to have
    /// pre-validated `quantity <= stock`, and an over-allocation is applied
    /// anyway and logged rather than rejected.
    pub async fn attach_line(
        &self,
        order_id: Uuid,
        product_id: Uuid,
        quantity: i64,
    ) -> AppResult<OrderLine> {
        validate_quantity(quantity)?;

        let mut tx = self.db.begin().await?;

        let line_id = Uuid::new_v4();
        sqlx::query("INSERT INTO order_lines (id, order_id, product_id, quantity) VALUES (?, ?, ?, ?)")
            .bind(line_id)
            .bind(order_id)
            .bind(product_id)
            .bind(quantity)
            .execute(&mut *tx)
            .await?;

        let (name, stock) =
            sqlx::query_as::<_, (String, i64)>("SELECT name, stock FROM products WHERE id = ?")
                .bind(product_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        let new_stock = stock - quantity;
        if new_stock < 0 {
            tracing::warn!(product = %name, new_stock, "stock went negative on allocation");
        }

        sqlx::query("UPDATE products SET stock = ? WHERE id = ?")
            .bind(new_stock)
            .bind(product_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::debug!(product = %name, quantity, new_stock, "stock decremented");

        // Best-effort remote propagation; a dropped receiver is not an error.
        if let Some(tx) = &self.stock_tx {
            let _ = tx.send(StockUpdate {
                product_name: name,
                new_stock,
            });
        }

        Ok(OrderLine {
            id: line_id,
            order_id,
            product_id,
            quantity,
        })
    }

    /// Restore stock for every line of `order_id`.
    ///
    /// Reads the lines before any caller removes the owning order row, and
    /// is a no-op when the lines are already gone.
    pub async fn restore_for_order(&self, order_id: Uuid) -> AppResult<()> {
        let mut conn = self.db.acquire().await?;
        Self::restore_lines(&mut conn, order_id).await
    }

    /// Transactional variant used by order deletion: runs on the caller's
    /// connection so restoration and deletion commit or abort together.
    pub(crate) async fn restore_lines(
        conn: &mut SqliteConnection,
        order_id: Uuid,
    ) -> AppResult<()> {
        let lines = sqlx::query_as::<_, (Uuid, i64)>(
            "SELECT product_id, quantity FROM order_lines WHERE order_id = ?",
        )
        .bind(order_id)
        .fetch_all(&mut *conn)
        .await?;

        for (product_id, quantity) in lines {
            sqlx::query("UPDATE products SET stock = stock + ? WHERE id = ?")
                .bind(quantity)
                .bind(product_id)
                .execute(&mut *conn)
                .await?;
            tracing::debug!(%product_id, quantity, "stock restored");
        }

        Ok(())
    }
}
