//! System-wide summary counts

use serde::Serialize;
use sqlx::SqlitePool;

use shared::OrderStatus;

use crate::error::AppResult;

/// Headline counters shown by the sync binary and the dashboard
#[derive(Debug, Clone, Serialize)]
pub struct SystemStats {
    pub active_products: i64,
    pub orders: i64,
    pub low_stock_products: i64,
    pub delivered_orders: i64,
}

#[derive(Clone)]
pub struct ReportService {
    db: SqlitePool,
}

impl ReportService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn system_stats(&self) -> AppResult<SystemStats> {
        let active_products: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE active = TRUE")
                .fetch_one(&self.db)
                .await?;

        let orders: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.db)
            .await?;

        let low_stock_products: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM products WHERE active = TRUE AND stock <= min_stock",
        )
        .fetch_one(&self.db)
        .await?;

        let delivered_orders: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE status = ?")
                .bind(OrderStatus::Delivered.as_str())
                .fetch_one(&self.db)
                .await?;

        Ok(SystemStats {
            active_products,
            orders,
            low_stock_products,
            delivered_orders,
        })
    }
}
