//! Remote sync adapter
//!
//! Translates local catalog and order state into the remote document
//! vocabulary (Spanish field names, floating-point money) and back. Order
//! documents live at a deterministic key derived from the order itself, so
//! repeated pushes of the same order land on one document.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use shared::{LineDetail, Order, Product};

use crate::error::{AppError, AppResult};
use crate::external::DocumentStore;

use super::ledger::StockUpdate;

const PRODUCTS: &str = "products";
const ORDERS: &str = "orders";

/// Product document as the remote store sees it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteProduct {
    pub nombre: String,
    pub categoria: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub precio: Decimal,
    #[serde(default = "default_description")]
    pub descripcion: String,
    #[serde(default)]
    pub stock: i64,
    #[serde(rename = "stockMinimo", default)]
    pub stock_minimo: i64,
    #[serde(rename = "fechaCreacion", default)]
    pub fecha_creacion: Option<DateTime<Utc>>,
    #[serde(default = "default_active")]
    pub activo: bool,
}

fn default_description() -> String {
    "Producto médico".to_string()
}

fn default_active() -> bool {
    true
}

/// Order document pushed to the remote store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteOrder {
    pub id: String,
    pub cliente: String,
    pub destino: String,
    pub productos: Vec<RemoteOrderLine>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub estado: String,
    #[serde(rename = "fechaCreacion")]
    pub fecha_creacion: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteOrderLine {
    pub id: String,
    pub nombre: String,
    pub cantidad: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub precio: Decimal,
}

/// Outcome of a product push: created a new document or updated one in place
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteWrite {
    Created,
    Updated,
}

/// Sync adapter over a [`DocumentStore`]
#[derive(Clone)]
pub struct SyncService {
    store: Arc<dyn DocumentStore>,
}

impl SyncService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Deterministic remote key for an order: normalized client name, the
    /// creation timestamp, and the total in cents. The same order always
    /// maps to the same key, so pushes are idempotent.
    pub fn order_key(order: &Order) -> String {
        let client: String = order
            .client
            .chars()
            .map(|c| if c == ' ' { '_' } else { c })
            .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
            .collect();

        format!(
            "{}_{}_{}",
            client,
            order.created_at.format("%Y%m%d_%H%M%S"),
            order.total_cents()
        )
    }

    /// Push a product, matching on active name: an existing document gets
    /// its stock, threshold, and price refreshed in place, otherwise a new
    /// document is inserted.
    pub async fn upsert_product(&self, product: &Product) -> AppResult<RemoteWrite> {
        let existing = self
            .store
            .find_where(
                PRODUCTS,
                &[("nombre", json!(product.name)), ("activo", json!(true))],
            )
            .await?;

        if let Some(doc) = existing.first() {
            self.store
                .update_fields(
                    PRODUCTS,
                    &doc.id,
                    json!({
                        "stock": product.stock,
                        "stockMinimo": product.min_stock,
                        "precio": product.price.to_f64().unwrap_or(0.0),
                    }),
                )
                .await?;
            tracing::debug!(product = %product.name, "remote product updated");
            return Ok(RemoteWrite::Updated);
        }

        let doc = serde_json::to_value(RemoteProduct {
            nombre: product.name.clone(),
            categoria: product.category.clone(),
            precio: product.price,
            descripcion: default_description(),
            stock: product.stock,
            stock_minimo: product.min_stock,
            fecha_creacion: Some(product.created_at),
            activo: true,
        })?;
        self.store.insert(PRODUCTS, doc).await?;
        tracing::debug!(product = %product.name, "remote product created");
        Ok(RemoteWrite::Created)
    }

    /// Overwrite the stock field of the remote product named `name`.
    pub async fn update_product_stock(&self, name: &str, new_stock: i64) -> AppResult<()> {
        let existing = self
            .store
            .find_where(PRODUCTS, &[("nombre", json!(name)), ("activo", json!(true))])
            .await?;

        let doc = existing.first().ok_or_else(|| AppError::RemoteNotFound {
            collection: PRODUCTS.to_string(),
            key: name.to_string(),
        })?;

        self.store
            .update_fields(PRODUCTS, &doc.id, json!({ "stock": new_stock }))
            .await?;
        Ok(())
    }

    /// Create-or-merge the order document at its deterministic key.
    pub async fn upsert_order(&self, order: &Order, lines: &[LineDetail]) -> AppResult<()> {
        let key = Self::order_key(order);
        let doc = serde_json::to_value(RemoteOrder {
            id: key.clone(),
            cliente: order.client.clone(),
            destino: order.destination.clone(),
            productos: lines
                .iter()
                .map(|line| RemoteOrderLine {
                    id: line.product_id.to_string(),
                    nombre: line.product_name.clone(),
                    cantidad: line.quantity,
                    precio: line.unit_price,
                })
                .collect(),
            total: order.total,
            estado: order.status.wire_str().to_string(),
            fecha_creacion: order.created_at,
        })?;

        self.store.upsert_merge(ORDERS, &key, doc).await?;
        tracing::debug!(%key, status = %order.status.wire_str(), "order synced");
        Ok(())
    }

    /// Patch only the status field of an already-pushed order.
    pub async fn update_order_status(&self, order: &Order) -> AppResult<()> {
        let key = Self::order_key(order);
        self.store
            .update_fields(ORDERS, &key, json!({ "estado": order.status.wire_str() }))
            .await?;
        tracing::debug!(%key, status = %order.status.wire_str(), "order status synced");
        Ok(())
    }

    /// All active products currently held by the remote store.
    pub async fn fetch_remote_products(&self) -> AppResult<Vec<RemoteProduct>> {
        let docs = self
            .store
            .find_where(PRODUCTS, &[("activo", json!(true))])
            .await?;

        docs.into_iter()
            .map(|doc| serde_json::from_value(doc.data).map_err(AppError::from))
            .collect()
    }
}

/// Drain the stock-update channel, pushing each write to the remote store.
///
/// Failures are logged and dropped: the local ledger is authoritative and
/// the reconciliation job repairs any divergence later.
pub fn spawn_stock_sync_worker(
    sync: SyncService,
    mut rx: mpsc::UnboundedReceiver<StockUpdate>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(update) = rx.recv().await {
            match sync
                .update_product_stock(&update.product_name, update.new_stock)
                .await
            {
                Ok(()) => {
                    tracing::debug!(product = %update.product_name, stock = update.new_stock, "remote stock updated")
                }
                Err(err) => {
                    tracing::warn!(product = %update.product_name, error = %err, "remote stock update failed")
                }
            }
        }
    })
}
