//! Domain models for the Medistock inventory platform

mod order;
mod product;

pub use order::*;
pub use product::*;
