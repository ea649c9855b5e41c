pub mod document_cache;
pub mod enablement;
pub mod search_index;
pub mod uniqueness;
