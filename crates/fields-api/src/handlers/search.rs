//! Filtered search over the index.

use std::sync::Arc;

use axum::{extract::State, Json};
use fields_core::models::custom_field::keys;
use fields_core::models::SearchCriteria;
use fields_core::AppError;
use serde_json::{json, Map, Value as JsonValue};

use crate::constants::API_SEARCH;
use crate::error::HttpAppError;
use crate::response::{result_entry, ApiResponse};
use crate::state::AppState;

pub const RESULT_SEARCH_RESULTS: &str = "searchResults";

/// Search custom fields by filter criteria. Inactive fields are excluded
/// unless the filter asks for them explicitly.
#[utoipa::path(
    post,
    path = "/customFields/v1/search",
    request_body = SearchCriteria,
    responses(
        (status = 200, description = "Matching fields under searchResults", body = ApiResponse)
    ),
    tag = "customFields"
)]
pub async fn search(
    State(state): State<Arc<AppState>>,
    Json(criteria): Json<SearchCriteria>,
) -> Result<Json<ApiResponse>, HttpAppError> {
    let result = search_inner(&state, criteria)
        .await
        .map_err(|e| HttpAppError::new(API_SEARCH, e))?;
    Ok(Json(ApiResponse::success(API_SEARCH, result)))
}

async fn search_inner(
    state: &Arc<AppState>,
    mut criteria: SearchCriteria,
) -> Result<Map<String, JsonValue>, AppError> {
    criteria
        .filter_criteria_map
        .entry(keys::IS_ACTIVE.to_string())
        .or_insert(json!(true));

    let found = state.search_index.search(&criteria).await?;
    Ok(result_entry(
        RESULT_SEARCH_RESULTS,
        serde_json::to_value(found)?,
    ))
}
