pub mod catalog;
pub mod ledger;
pub mod lifecycle;
pub mod orders;
pub mod reconcile;
pub mod reports;
pub mod sync;

pub use catalog::{CatalogService, CreateProductInput};
pub use ledger::{StockLedger, StockUpdate};
pub use lifecycle::{LifecycleService, RemoteOutcome, TransitionReceipt};
pub use orders::OrderService;
pub use reconcile::{ReconcileService, SyncReport};
pub use reports::{ReportService, SystemStats};
pub use sync::{RemoteWrite, SyncService};
