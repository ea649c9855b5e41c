//! Route configuration.

use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::{DefaultBodyLimit, State},
    http::{HeaderValue, Method},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::api_doc::ApiDoc;
use crate::handlers::{custom_field, master_list, search, status};
use crate::state::AppState;

// Headroom over the workbook limit for the multipart framing and metadata.
const BODY_LIMIT_SLACK: usize = 64 * 1024;

pub fn setup_routes(state: Arc<AppState>) -> Result<Router> {
    let cors = setup_cors(&state.config.cors_origins)?;
    let body_limit = state.config.max_upload_bytes + BODY_LIMIT_SLACK;

    let protected = Router::new()
        .route("/create", post(custom_field::create))
        .route("/read/{id}", get(custom_field::read))
        .route("/update/{id}", put(custom_field::update))
        .route("/delete/{id}", delete(custom_field::delete))
        .route("/search", post(search::search))
        .route("/masterList/create", post(master_list::create))
        .route("/masterList/update", put(master_list::update))
        .route("/status/update", post(status::update_status))
        .route("/popup/update", post(status::update_popup))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::auth::auth_middleware,
        ));

    let app = Router::new()
        .route("/health", get(health))
        .route("/api/openapi.json", get(openapi))
        .nest("/customFields/v1", protected)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .with_state(state);

    Ok(app)
}

fn setup_cors(origins: &[String]) -> Result<CorsLayer> {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    if origins.is_empty() {
        return Ok(cors.allow_origin(Any));
    }

    let origins = origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .map_err(|_| anyhow::anyhow!("Invalid CORS origin: {}", origin))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(cors.allow_origin(origins))
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let database = match sqlx::query("SELECT 1").execute(&state.pool).await {
        Ok(_) => "up",
        Err(e) => {
            tracing::warn!(error = %e, "Health check database ping failed");
            "down"
        }
    };
    Json(serde_json::json!({
        "status": if database == "up" { "healthy" } else { "degraded" },
        "database": database,
    }))
}

async fn openapi() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}
