//! Database repositories for the custom-fields service.

pub mod db;

pub use db::{CustomFieldRepository, PgLedgerStore};
