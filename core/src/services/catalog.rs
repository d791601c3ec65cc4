//! Catalog service: the persistent product store
//!
//! Products are never hard-deleted; deactivation keeps order history
//! intact. Name uniqueness within the active set is the caller's
//! responsibility, this layer only persists.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use shared::{cents_to_decimal, decimal_to_cents, Product};

use crate::error::{AppError, AppResult};
use crate::events::{EventBus, StoreEvent};

/// Catalog service for managing the local product store
#[derive(Clone)]
pub struct CatalogService {
    db: SqlitePool,
    events: Option<EventBus>,
}

/// Row shape of the products table
#[derive(Debug, FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    category: String,
    price_cents: i64,
    stock: i64,
    min_stock: i64,
    created_at: DateTime<Utc>,
    active: bool,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            category: row.category,
            price: cents_to_decimal(row.price_cents),
            stock: row.stock,
            min_stock: row.min_stock,
            created_at: row.created_at,
            active: row.active,
        }
    }
}

/// Input for creating a product
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProductInput {
    pub name: String,
    pub category: String,
    pub price: Decimal,
    pub stock: i64,
    pub min_stock: i64,
}

const SELECT_PRODUCT: &str =
    "SELECT id, name, category, price_cents, stock, min_stock, created_at, active FROM products";

/// Shared single-product fetch used by sibling services.
pub(crate) async fn fetch_product(db: &SqlitePool, product_id: Uuid) -> AppResult<Product> {
    let row = sqlx::query_as::<_, ProductRow>(&format!("{SELECT_PRODUCT} WHERE id = ?"))
        .bind(product_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

    Ok(row.into())
}

impl CatalogService {
    /// Create a new CatalogService instance
    pub fn new(db: SqlitePool) -> Self {
        Self { db, events: None }
    }

    pub fn with_events(db: SqlitePool, events: EventBus) -> Self {
        Self {
            db,
            events: Some(events),
        }
    }

    fn notify(&self) {
        if let Some(events) = &self.events {
            events.publish(StoreEvent::ProductsChanged);
        }
    }

    /// Persist a new active product with the current timestamp.
    pub async fn create_product(&self, input: CreateProductInput) -> AppResult<Product> {
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            INSERT INTO products (id, name, category, price_cents, stock, min_stock, created_at, active)
            VALUES (?, ?, ?, ?, ?, ?, ?, TRUE)
            RETURNING id, name, category, price_cents, stock, min_stock, created_at, active
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&input.name)
        .bind(&input.category)
        .bind(decimal_to_cents(input.price))
        .bind(input.stock)
        .bind(input.min_stock)
        .bind(Utc::now())
        .fetch_one(&self.db)
        .await?;

        self.notify();
        Ok(row.into())
    }

    pub async fn get_product(&self, product_id: Uuid) -> AppResult<Product> {
        let row = sqlx::query_as::<_, ProductRow>(&format!("{SELECT_PRODUCT} WHERE id = ?"))
            .bind(product_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        Ok(row.into())
    }

    /// Exact-name lookup among active products.
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "{SELECT_PRODUCT} WHERE name = ? AND active = TRUE"
        ))
        .bind(name)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Into::into))
    }

    pub async fn list_active_products(&self) -> AppResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "{SELECT_PRODUCT} WHERE active = TRUE ORDER BY name"
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Active products at or below their minimum stock threshold.
    pub async fn list_low_stock_products(&self) -> AppResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "{SELECT_PRODUCT} WHERE active = TRUE AND stock <= min_stock ORDER BY name"
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn list_by_category(&self, category: &str) -> AppResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "{SELECT_PRODUCT} WHERE active = TRUE AND category = ? ORDER BY name"
        ))
        .bind(category)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Case-insensitive substring search over name and category.
    pub async fn search(&self, term: &str) -> AppResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            {SELECT_PRODUCT}
            WHERE active = TRUE
              AND (LOWER(name) LIKE '%' || LOWER(?) || '%'
                   OR LOWER(category) LIKE '%' || LOWER(?) || '%')
            ORDER BY name
            "#
        ))
        .bind(term)
        .bind(term)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Unconditional stock overwrite, persisted immediately. The sign of
    /// `new_stock` is not validated here (see the stock ledger).
    pub async fn update_stock(&self, product_id: Uuid, new_stock: i64) -> AppResult<()> {
        let result = sqlx::query("UPDATE products SET stock = ? WHERE id = ?")
            .bind(new_stock)
            .bind(product_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Product".to_string()));
        }

        self.notify();
        Ok(())
    }

    /// Soft delete. Returns `Ok(false)` when any order line references the
    /// product, leaving it active.
    pub async fn deactivate(&self, product_id: Uuid) -> AppResult<bool> {
        let referenced = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM order_lines WHERE product_id = ?)",
        )
        .bind(product_id)
        .fetch_one(&self.db)
        .await?;

        if referenced {
            return Ok(false);
        }

        let result = sqlx::query("UPDATE products SET active = FALSE WHERE id = ?")
            .bind(product_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Product".to_string()));
        }

        self.notify();
        Ok(true)
    }

    /// Seed the demo catalog into an empty store. Returns the number of
    /// products created (zero when the catalog already has rows).
    pub async fn seed_demo_products(&self) -> AppResult<u32> {
        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.db)
            .await?;
        if existing > 0 {
            return Ok(0);
        }

        // price in cents
        let demo: [(&str, &str, i64, i64, i64); 8] = [
            ("Paracetamol 500mg", "Medicamentos", 1550, 100, 20),
            ("Jeringas 5ml", "Insumos", 230, 500, 100),
            ("Termómetro Digital", "Equipos", 4500, 15, 10),
            ("Mascarillas N95", "Insumos", 875, 5, 25),
            ("Oxímetro de Pulso", "Equipos", 12000, 8, 5),
            ("Ibuprofeno 400mg", "Medicamentos", 1800, 25, 15),
            ("Alcohol en Gel", "Insumos", 1250, 30, 20),
            ("Tensiómetro Digital", "Equipos", 8500, 12, 8),
        ];

        for (name, category, price_cents, stock, min_stock) in demo {
            self.create_product(CreateProductInput {
                name: name.to_string(),
                category: category.to_string(),
                price: cents_to_decimal(price_cents),
                stock,
                min_stock,
            })
            .await?;
        }

        tracing::info!(count = demo.len(), "seeded demo catalog");
        Ok(demo.len() as u32)
    }
}
