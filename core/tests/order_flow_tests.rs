//! Order and stock ledger flow tests
//!
//! Covers the coupling between orders and inventory: attaching lines
//! decrements stock, deleting an order restores it, delivered orders are
//! immutable history, and total stock is conserved across the flow.

use rust_decimal::Decimal;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::str::FromStr;
use uuid::Uuid;

use shared::{order_total, LineDetail, OrderStatus};

use medistock_core::services::{CatalogService, CreateProductInput, OrderService, StockLedger};
use medistock_core::AppError;

async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool");
    sqlx::migrate!("./migrations").run(&pool).await.expect("migrations");
    pool
}

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

struct Flow {
    catalog: CatalogService,
    orders: OrderService,
    ledger: StockLedger,
}

async fn flow() -> Flow {
    let pool = test_pool().await;
    Flow {
        catalog: CatalogService::new(pool.clone()),
        orders: OrderService::new(pool.clone()),
        ledger: StockLedger::new(pool),
    }
}

#[tokio::test]
async fn attaching_a_line_decrements_stock() {
    let f = flow().await;

    let product = f
        .catalog
        .create_product(CreateProductInput {
            name: "Paracetamol 500mg".to_string(),
            category: "Medicamentos".to_string(),
            price: dec("15.50"),
            stock: 100,
            min_stock: 20,
        })
        .await
        .unwrap();

    let total = order_total(&[LineDetail {
        product_id: product.id,
        product_name: product.name.clone(),
        quantity: 30,
        unit_price: product.price,
    }]);
    assert_eq!(total, dec("465.00"));

    let order = f
        .orders
        .create_order("Clinica San Pablo", "Arequipa", total)
        .await
        .unwrap();
    let line = f.ledger.attach_line(order.id, product.id, 30).await.unwrap();

    assert_eq!(line.quantity, 30);
    assert_eq!(f.catalog.get_product(product.id).await.unwrap().stock, 70);

    let stored = f.orders.get_order(order.id).await.unwrap();
    assert_eq!(stored.status, OrderStatus::Pending);
    assert_eq!(stored.total, dec("465.00"));
}

#[tokio::test]
async fn deleting_an_order_restores_stock_for_every_line() {
    let f = flow().await;

    let paracetamol = f
        .catalog
        .create_product(CreateProductInput {
            name: "Paracetamol 500mg".to_string(),
            category: "Medicamentos".to_string(),
            price: dec("15.50"),
            stock: 100,
            min_stock: 20,
        })
        .await
        .unwrap();
    let syringes = f
        .catalog
        .create_product(CreateProductInput {
            name: "Jeringas 5ml".to_string(),
            category: "Insumos".to_string(),
            price: dec("2.30"),
            stock: 500,
            min_stock: 100,
        })
        .await
        .unwrap();

    let order = f
        .orders
        .create_order("Hospital Central", "Lima", dec("488.00"))
        .await
        .unwrap();
    f.ledger.attach_line(order.id, paracetamol.id, 30).await.unwrap();
    f.ledger.attach_line(order.id, syringes.id, 10).await.unwrap();

    assert_eq!(f.catalog.get_product(paracetamol.id).await.unwrap().stock, 70);
    assert_eq!(f.catalog.get_product(syringes.id).await.unwrap().stock, 490);

    f.orders.delete_order(order.id).await.unwrap();

    assert_eq!(f.catalog.get_product(paracetamol.id).await.unwrap().stock, 100);
    assert_eq!(f.catalog.get_product(syringes.id).await.unwrap().stock, 500);
    assert!(matches!(
        f.orders.get_order(order.id).await.unwrap_err(),
        AppError::NotFound(_)
    ));
    assert!(f.orders.lines_for_order(order.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn delivered_orders_cannot_be_deleted() {
    let f = flow().await;

    let order = f
        .orders
        .create_order("Hospital Central", "Lima", dec("100.00"))
        .await
        .unwrap();
    f.orders.set_status(order.id, OrderStatus::Delivered).await.unwrap();

    let err = f.orders.delete_order(order.id).await.unwrap_err();
    assert!(matches!(err, AppError::OrderNotDeletable(_)));
    assert!(f.orders.get_order(order.id).await.is_ok());
}

#[tokio::test]
async fn over_allocation_is_applied_and_goes_negative() {
    let f = flow().await;

    let product = f
        .catalog
        .create_product(CreateProductInput {
            name: "Mascarillas N95".to_string(),
            category: "Insumos".to_string(),
            price: dec("8.75"),
            stock: 5,
            min_stock: 25,
        })
        .await
        .unwrap();

    let order = f
        .orders
        .create_order("Posta Rural", "Cusco", dec("87.50"))
        .await
        .unwrap();
    f.ledger.attach_line(order.id, product.id, 10).await.unwrap();

    // The decrement is never rejected, only logged
    assert_eq!(f.catalog.get_product(product.id).await.unwrap().stock, -5);

    // Deletion brings the level back
    f.orders.delete_order(order.id).await.unwrap();
    assert_eq!(f.catalog.get_product(product.id).await.unwrap().stock, 5);
}

#[tokio::test]
async fn failed_attach_leaves_no_orphan_line() {
    let f = flow().await;

    let product = f
        .catalog
        .create_product(CreateProductInput {
            name: "Tensiómetro Digital".to_string(),
            category: "Equipos".to_string(),
            price: dec("85.00"),
            stock: 12,
            min_stock: 8,
        })
        .await
        .unwrap();
    let order = f
        .orders
        .create_order("Hospital Central", "Lima", dec("85.00"))
        .await
        .unwrap();

    // Unknown product: the whole attach rolls back
    assert!(f.ledger.attach_line(order.id, Uuid::new_v4(), 1).await.is_err());
    assert!(f.orders.lines_for_order(order.id).await.unwrap().is_empty());

    // A later deletion must not restore anything that was never subtracted
    f.orders.delete_order(order.id).await.unwrap();
    assert_eq!(f.catalog.get_product(product.id).await.unwrap().stock, 12);
}

#[tokio::test]
async fn zero_or_negative_quantities_are_rejected() {
    let f = flow().await;

    let product = f
        .catalog
        .create_product(CreateProductInput {
            name: "Alcohol en Gel".to_string(),
            category: "Insumos".to_string(),
            price: dec("12.50"),
            stock: 30,
            min_stock: 20,
        })
        .await
        .unwrap();
    let order = f
        .orders
        .create_order("Hospital Central", "Lima", dec("0.00"))
        .await
        .unwrap();

    assert!(f.ledger.attach_line(order.id, product.id, 0).await.is_err());
    assert!(f.ledger.attach_line(order.id, product.id, -3).await.is_err());
    assert_eq!(f.catalog.get_product(product.id).await.unwrap().stock, 30);
}

#[tokio::test]
async fn stock_validation_reports_each_shortfall() {
    let f = flow().await;

    let scarce = f
        .catalog
        .create_product(CreateProductInput {
            name: "Oxímetro de Pulso".to_string(),
            category: "Equipos".to_string(),
            price: dec("120.00"),
            stock: 8,
            min_stock: 5,
        })
        .await
        .unwrap();
    let plenty = f
        .catalog
        .create_product(CreateProductInput {
            name: "Jeringas 5ml".to_string(),
            category: "Insumos".to_string(),
            price: dec("2.30"),
            stock: 500,
            min_stock: 100,
        })
        .await
        .unwrap();

    let conflicts = f
        .orders
        .validate_stock_for_order(&[(scarce.id, 10), (plenty.id, 50)])
        .await
        .unwrap();

    assert_eq!(conflicts.len(), 1);
    assert!(conflicts[0].contains("Oxímetro de Pulso"));

    let clean = f
        .orders
        .validate_stock_for_order(&[(scarce.id, 8), (plenty.id, 500)])
        .await
        .unwrap();
    assert!(clean.is_empty());
}

#[tokio::test]
async fn line_details_join_current_product_fields() {
    let f = flow().await;

    let product = f
        .catalog
        .create_product(CreateProductInput {
            name: "Ibuprofeno 400mg".to_string(),
            category: "Medicamentos".to_string(),
            price: dec("18.00"),
            stock: 25,
            min_stock: 15,
        })
        .await
        .unwrap();
    let order = f
        .orders
        .create_order("Clinica San Pablo", "Trujillo", dec("90.00"))
        .await
        .unwrap();
    f.ledger.attach_line(order.id, product.id, 5).await.unwrap();

    let details = f.orders.line_details(order.id).await.unwrap();
    assert_eq!(details.len(), 1);
    assert_eq!(details[0].product_name, "Ibuprofeno 400mg");
    assert_eq!(details[0].quantity, 5);
    assert_eq!(details[0].unit_price, dec("18.00"));
    assert_eq!(details[0].subtotal(), dec("90.00"));
}

#[tokio::test]
async fn orders_list_newest_first_and_filter_by_status() {
    let f = flow().await;

    let first = f
        .orders
        .create_order("Hospital Central", "Lima", dec("10.00"))
        .await
        .unwrap();
    let second = f
        .orders
        .create_order("Posta Rural", "Tacna", dec("20.00"))
        .await
        .unwrap();
    f.orders.set_status(second.id, OrderStatus::Shipped).await.unwrap();

    let all = f.orders.list_orders().await.unwrap();
    assert_eq!(all.len(), 2);

    let shipped = f.orders.list_orders_by_status(OrderStatus::Shipped).await.unwrap();
    assert_eq!(shipped.len(), 1);
    assert_eq!(shipped[0].id, second.id);

    let pending = f.orders.list_orders_by_status(OrderStatus::Pending).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, first.id);
}
