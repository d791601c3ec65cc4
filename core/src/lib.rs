//! Medistock core engine
//!
//! Inventory/order consistency and synchronization for a medical-supplies
//! catalog: a local SQLite store of products, orders, and order lines; the
//! stock ledger rules coupling the two; an idempotent remote sync adapter;
//! the order lifecycle state machine; and a bidirectional reconciliation
//! job. Services are constructed explicitly and injected where needed;
//! there is no ambient global state.

pub mod config;
pub mod error;
pub mod events;
pub mod external;
pub mod services;

pub use config::Config;
pub use error::{AppError, AppResult};
