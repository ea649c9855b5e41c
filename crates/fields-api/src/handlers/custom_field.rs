//! Create, read, update, and soft-delete for scalar custom fields.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::Utc;
use fields_core::models::custom_field::keys;
use fields_core::models::CustomField;
use fields_core::validation::profiles;
use fields_core::AppError;
use fields_services::cache_key;
use serde_json::{json, Map, Value as JsonValue};
use uuid::Uuid;

use crate::auth::UserContext;
use crate::constants::{API_CREATE, API_DELETE, API_READ, API_UPDATE};
use crate::error::HttpAppError;
use crate::handlers::{
    ensure_organization_unchanged, not_found, payload_object, persist_and_mirror, stamp_write,
    str_field,
};
use crate::response::{result_entry, ApiResponse};
use crate::state::AppState;

pub const RESULT_CUSTOM_FIELD: &str = "customField";

/// Create a custom field definition.
#[utoipa::path(
    post,
    path = "/customFields/v1/create",
    request_body = Object,
    responses(
        (status = 200, description = "Field created", body = ApiResponse),
        (status = 400, description = "Validation failure or duplicate attribute name", body = ApiResponse),
        (status = 401, description = "Missing or invalid user token", body = ApiResponse)
    ),
    tag = "customFields"
)]
pub async fn create(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<UserContext>,
    Json(payload): Json<JsonValue>,
) -> Result<Json<ApiResponse>, HttpAppError> {
    let result = create_inner(&state, &user, &payload)
        .await
        .map_err(|e| HttpAppError::new(API_CREATE, e))?;
    Ok(Json(ApiResponse::success(API_CREATE, result)))
}

async fn create_inner(
    state: &Arc<AppState>,
    user: &UserContext,
    payload: &JsonValue,
) -> Result<Map<String, JsonValue>, AppError> {
    state.validator.validate(profiles::CREATE, payload)?;

    let organization_id = str_field(payload, keys::ORGANIZATION_ID)?;
    let attribute_name = str_field(payload, keys::ATTRIBUTE_NAME)?;
    state
        .uniqueness
        .check_available(&organization_id, &[attribute_name], None)
        .await?;

    let custom_field_id = Uuid::new_v4().to_string();
    let now = Utc::now();

    let mut document = payload_object(payload)?;
    document.insert(keys::IS_ACTIVE.to_string(), json!(true));
    document.insert(keys::IS_ENABLED.to_string(), json!(false));
    document
        .entry(keys::IS_MANDATORY.to_string())
        .or_insert(json!(false));
    stamp_write(&mut document, &user.user_id, now, true);

    let is_mandatory = document
        .get(keys::IS_MANDATORY)
        .and_then(JsonValue::as_bool)
        .unwrap_or(false);

    let field = CustomField {
        custom_field_id,
        document: JsonValue::Object(document),
        is_mandatory,
        is_active: true,
        created_on: now,
        updated_on: now,
    };

    let document = persist_and_mirror(state, &field).await?;
    tracing::info!(custom_field_id = %field.custom_field_id, organization_id, "Custom field created");
    Ok(result_entry(RESULT_CUSTOM_FIELD, document))
}

/// Read an active custom field by id.
#[utoipa::path(
    get,
    path = "/customFields/v1/read/{id}",
    responses(
        (status = 200, description = "Field found", body = ApiResponse),
        (status = 404, description = "Unknown or inactive id", body = ApiResponse)
    ),
    tag = "customFields"
)]
pub async fn read(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse>, HttpAppError> {
    let result = read_inner(&state, &id)
        .await
        .map_err(|e| HttpAppError::new(API_READ, e))?;
    Ok(Json(ApiResponse::success(API_READ, result)))
}

async fn read_inner(
    state: &Arc<AppState>,
    id: &str,
) -> Result<Map<String, JsonValue>, AppError> {
    let field = state
        .custom_fields
        .find_active_by_id(id)
        .await?
        .ok_or_else(|| not_found(id))?;

    let document = field.document_with_id();
    state.cache.put(&cache_key(id), document.clone()).await;
    Ok(result_entry(RESULT_CUSTOM_FIELD, document))
}

/// Update a custom field. The organization id is immutable and `isEnabled`
/// resets to false.
#[utoipa::path(
    put,
    path = "/customFields/v1/update/{id}",
    request_body = Object,
    responses(
        (status = 200, description = "Field updated", body = ApiResponse),
        (status = 400, description = "Organization change or duplicate attribute name", body = ApiResponse),
        (status = 404, description = "Unknown or inactive id", body = ApiResponse)
    ),
    tag = "customFields"
)]
pub async fn update(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<String>,
    Json(payload): Json<JsonValue>,
) -> Result<Json<ApiResponse>, HttpAppError> {
    let result = update_inner(&state, &user, &id, &payload)
        .await
        .map_err(|e| HttpAppError::new(API_UPDATE, e))?;
    Ok(Json(ApiResponse::success(API_UPDATE, result)))
}

async fn update_inner(
    state: &Arc<AppState>,
    user: &UserContext,
    id: &str,
    payload: &JsonValue,
) -> Result<Map<String, JsonValue>, AppError> {
    state.validator.validate(profiles::UPDATE, payload)?;

    let existing = state
        .custom_fields
        .find_active_by_id(id)
        .await?
        .ok_or_else(|| not_found(id))?;

    let stored_organization = existing
        .organization_id()
        .unwrap_or_default()
        .to_string();
    let incoming_organization = str_field(payload, keys::ORGANIZATION_ID)?;
    ensure_organization_unchanged(&stored_organization, &incoming_organization)?;

    let attribute_name = str_field(payload, keys::ATTRIBUTE_NAME)?;
    if existing.attribute_name() != Some(attribute_name.as_str()) {
        state
            .uniqueness
            .check_available(&stored_organization, &[attribute_name], Some(id))
            .await?;
    }

    let now = Utc::now();
    let mut document = payload_object(payload)?;

    // Creation info survives the update untouched.
    for key in [keys::CREATED_BY, keys::CREATED_ON] {
        if let Some(value) = existing.document.get(key) {
            document.insert(key.to_string(), value.clone());
        }
    }
    document.insert(keys::IS_ACTIVE.to_string(), json!(true));
    document.insert(keys::IS_ENABLED.to_string(), json!(false));
    document
        .entry(keys::IS_MANDATORY.to_string())
        .or_insert(json!(existing.is_mandatory));
    stamp_write(&mut document, &user.user_id, now, false);

    let is_mandatory = document
        .get(keys::IS_MANDATORY)
        .and_then(JsonValue::as_bool)
        .unwrap_or(existing.is_mandatory);

    let field = CustomField {
        custom_field_id: id.to_string(),
        document: JsonValue::Object(document),
        is_mandatory,
        is_active: true,
        created_on: existing.created_on,
        updated_on: now,
    };

    let document = persist_and_mirror(state, &field).await?;
    tracing::info!(custom_field_id = %id, "Custom field updated");
    Ok(result_entry(RESULT_CUSTOM_FIELD, document))
}

/// Soft-delete a custom field. An enabled field is disabled in the ledger
/// first; if that fails the field stays active.
#[utoipa::path(
    delete,
    path = "/customFields/v1/delete/{id}",
    responses(
        (status = 200, description = "Field deleted", body = ApiResponse),
        (status = 404, description = "Unknown or inactive id", body = ApiResponse)
    ),
    tag = "customFields"
)]
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse>, HttpAppError> {
    let result = delete_inner(&state, &user, &id)
        .await
        .map_err(|e| HttpAppError::new(API_DELETE, e))?;
    Ok(Json(ApiResponse::success(API_DELETE, result)))
}

async fn delete_inner(
    state: &Arc<AppState>,
    user: &UserContext,
    id: &str,
) -> Result<Map<String, JsonValue>, AppError> {
    let existing = state
        .custom_fields
        .find_active_by_id(id)
        .await?
        .ok_or_else(|| not_found(id))?;

    if existing.is_enabled() {
        let organization_id = existing.organization_id().ok_or_else(|| {
            AppError::Internal(format!("stored document {} has no organizationId", id))
        })?;
        // A reversal failure aborts the delete and leaves the field enabled.
        state.ledger.disable(organization_id, &existing).await?;
    }

    let now = Utc::now();
    let mut document = payload_object(&existing.document)?;
    document.insert(keys::IS_ACTIVE.to_string(), json!(false));
    document.insert(keys::IS_ENABLED.to_string(), json!(false));
    stamp_write(&mut document, &user.user_id, now, false);

    let field = CustomField {
        custom_field_id: id.to_string(),
        document: JsonValue::Object(document),
        is_mandatory: existing.is_mandatory,
        is_active: false,
        created_on: existing.created_on,
        updated_on: now,
    };

    state.custom_fields.save(&field).await?;
    // The index keeps the document, now marked inactive, so searches that
    // explicitly ask for inactive fields still see it.
    state
        .search_index
        .index_document(id, &field.document_with_id())
        .await?;
    state.cache.remove(&cache_key(id)).await;

    tracing::info!(custom_field_id = %id, "Custom field deleted");
    let mut result = Map::new();
    result.insert(keys::CUSTOM_FIELD_ID.to_string(), json!(id));
    result.insert(keys::STATUS.to_string(), json!("deleted"));
    Ok(result)
}
