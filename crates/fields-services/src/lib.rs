//! Business service layer for the custom-fields service.
//!
//! Hosts the search-index and cache abstractions plus the enablement ledger
//! and attribute-name uniqueness checks. Keep coordination logic here; keep
//! thin HTTP handling in fields-api.

pub mod services;

pub use services::document_cache::{cache_key, DocumentCache, LruDocumentCache};
pub use services::enablement::EnablementLedger;
pub use services::search_index::{ElasticSearchIndex, InMemorySearchIndex, SearchIndex};
pub use services::uniqueness::UniquenessGuard;
