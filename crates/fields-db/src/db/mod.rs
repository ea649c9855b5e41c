//! Repository implementations.
//!
//! Each repository owns a `PgPool` clone and exposes the queries for one
//! table. `custom_field` holds the field definitions, `ledger` the versioned
//! per-organization enablement records.

pub mod custom_field;
pub mod ledger;

pub use custom_field::CustomFieldRepository;
pub use ledger::PgLedgerStore;
