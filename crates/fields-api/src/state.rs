//! Application state shared across handlers.

use std::sync::Arc;

use fields_core::hierarchy::ingest::UploadPolicy;
use fields_core::{Config, SchemaValidator};
use fields_db::CustomFieldRepository;
use fields_services::{DocumentCache, EnablementLedger, SearchIndex, UniquenessGuard};
use sqlx::PgPool;

pub struct AppState {
    pub config: Config,
    pub pool: PgPool,
    pub custom_fields: CustomFieldRepository,
    pub search_index: Arc<dyn SearchIndex>,
    pub cache: Arc<dyn DocumentCache>,
    pub ledger: EnablementLedger,
    pub uniqueness: UniquenessGuard,
    pub validator: Arc<dyn SchemaValidator>,
}

impl AppState {
    pub fn upload_policy(&self) -> UploadPolicy {
        UploadPolicy {
            allowed_extensions: self.config.allowed_extensions.clone(),
            allowed_content_types: self.config.allowed_content_types.clone(),
            max_levels: self.config.max_hierarchy_levels,
        }
    }
}
