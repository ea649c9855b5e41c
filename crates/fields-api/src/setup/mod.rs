//! Application setup and initialization.

pub mod database;
pub mod routes;
pub mod server;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use fields_core::Config;
use fields_db::{CustomFieldRepository, PgLedgerStore};
use fields_services::{
    ElasticSearchIndex, EnablementLedger, LruDocumentCache, SearchIndex, UniquenessGuard,
};
use sqlx::PgPool;

use crate::state::AppState;
use crate::validation::ProfileValidator;

/// Initialize telemetry, database, services, and routes.
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    crate::telemetry::init_telemetry(config.is_production())?;
    tracing::info!(environment = %config.environment, "Configuration loaded");

    let pool = database::setup_database(&config).await?;
    let state = initialize_services(config, pool).await?;
    let router = routes::setup_routes(state.clone())?;

    Ok((state, router))
}

async fn initialize_services(config: Config, pool: PgPool) -> Result<Arc<AppState>> {
    let custom_fields = CustomFieldRepository::new(pool.clone());

    let elastic = ElasticSearchIndex::new(&config.search_index_url, &config.search_index_name);
    // A missing index is created lazily on the first write; startup only
    // warns when the cluster is unreachable.
    if let Err(e) = elastic.ensure_index().await {
        tracing::warn!(error = %e, index = %config.search_index_name, "Search index not reachable at startup");
    }
    let search_index: Arc<dyn SearchIndex> = Arc::new(elastic);

    let cache = Arc::new(LruDocumentCache::new(
        config.cache_capacity,
        Duration::from_secs(config.cache_ttl_seconds),
    ));

    let ledger = EnablementLedger::new(
        Arc::new(PgLedgerStore::new(pool.clone())),
        config.max_enabled_fields,
        config.ledger_cas_retries,
    );
    let uniqueness = UniquenessGuard::new(search_index.clone());

    Ok(Arc::new(AppState {
        config,
        pool,
        custom_fields,
        search_index,
        cache,
        ledger,
        uniqueness,
        validator: Arc::new(ProfileValidator),
    }))
}
