//! Shared types and models for the Medistock inventory platform
//!
//! This crate contains the domain model shared between the core engine
//! and any client-facing components of the system.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
