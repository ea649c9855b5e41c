//! Fields Core Library
//!
//! This crate provides the domain models, error types, configuration, and the
//! hierarchy parsing logic shared across all custom-fields service components.

pub mod config;
pub mod error;
pub mod hierarchy;
pub mod ledger_store;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use hierarchy::ingest::IngestError;
pub use ledger_store::{LedgerStore, VersionedRecord};
pub use validation::SchemaValidator;
