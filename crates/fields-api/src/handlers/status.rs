//! Enablement status and popup flag endpoints.

use std::sync::Arc;

use axum::{extract::State, Extension, Json};
use chrono::Utc;
use fields_core::models::custom_field::keys;
use fields_core::models::CustomField;
use fields_core::validation::profiles;
use fields_core::AppError;
use serde_json::{json, Map, Value as JsonValue};

use crate::auth::UserContext;
use crate::constants::{API_POPUP_UPDATE, API_STATUS_UPDATE};
use crate::error::HttpAppError;
use crate::handlers::{bool_field, not_found, payload_object, persist_and_mirror, stamp_write, str_field};
use crate::response::ApiResponse;
use crate::state::AppState;

/// Enable or disable a custom field for its organization. Enabling charges
/// the field's weight against the organization's budget.
#[utoipa::path(
    post,
    path = "/customFields/v1/status/update",
    request_body = Object,
    responses(
        (status = 200, description = "Status changed", body = ApiResponse),
        (status = 400, description = "Already in requested state or capacity exceeded", body = ApiResponse),
        (status = 404, description = "Unknown or inactive id", body = ApiResponse)
    ),
    tag = "customFields"
)]
pub async fn update_status(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<UserContext>,
    Json(payload): Json<JsonValue>,
) -> Result<Json<ApiResponse>, HttpAppError> {
    let result = update_status_inner(&state, &user, &payload)
        .await
        .map_err(|e| HttpAppError::new(API_STATUS_UPDATE, e))?;
    Ok(Json(ApiResponse::success(API_STATUS_UPDATE, result)))
}

async fn update_status_inner(
    state: &Arc<AppState>,
    user: &UserContext,
    payload: &JsonValue,
) -> Result<Map<String, JsonValue>, AppError> {
    state.validator.validate(profiles::STATUS_UPDATE, payload)?;

    let custom_field_id = str_field(payload, keys::CUSTOM_FIELD_ID)?;
    let requested = bool_field(payload, keys::IS_ENABLED)?;

    let existing = state
        .custom_fields
        .find_active_by_id(&custom_field_id)
        .await?
        .ok_or_else(|| not_found(&custom_field_id))?;

    if existing.is_enabled() == requested {
        return Err(AppError::AlreadyInState(format!(
            "Custom field {} is already {}",
            custom_field_id,
            if requested { "enabled" } else { "disabled" }
        )));
    }

    let organization_id = existing
        .organization_id()
        .ok_or_else(|| {
            AppError::Internal(format!(
                "stored document {} has no organizationId",
                custom_field_id
            ))
        })?
        .to_string();

    if requested {
        state.ledger.enable(&organization_id, &existing).await?;
    } else {
        // The document said enabled; a missing ledger entry must not block
        // turning the flag off.
        state.ledger.disable(&organization_id, &existing).await?;
    }

    let now = Utc::now();
    let mut document = payload_object(&existing.document)?;
    document.insert(keys::IS_ENABLED.to_string(), json!(requested));
    stamp_write(&mut document, &user.user_id, now, false);

    let field = CustomField {
        custom_field_id: custom_field_id.clone(),
        document: JsonValue::Object(document),
        is_mandatory: existing.is_mandatory,
        is_active: true,
        created_on: existing.created_on,
        updated_on: now,
    };

    persist_and_mirror(state, &field).await?;
    tracing::info!(custom_field_id = %custom_field_id, enabled = requested, "Custom field status changed");

    let mut result = Map::new();
    result.insert(keys::CUSTOM_FIELD_ID.to_string(), json!(custom_field_id));
    result.insert(keys::IS_ENABLED.to_string(), json!(requested));
    Ok(result)
}

/// Flip the organization's popup flag. Requires at least one enabled field.
#[utoipa::path(
    post,
    path = "/customFields/v1/popup/update",
    request_body = Object,
    responses(
        (status = 200, description = "Popup flag changed", body = ApiResponse),
        (status = 400, description = "No enabled fields or already in requested state", body = ApiResponse),
        (status = 404, description = "Unknown organization", body = ApiResponse)
    ),
    tag = "customFields"
)]
pub async fn update_popup(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<JsonValue>,
) -> Result<Json<ApiResponse>, HttpAppError> {
    let result = update_popup_inner(&state, &payload)
        .await
        .map_err(|e| HttpAppError::new(API_POPUP_UPDATE, e))?;
    Ok(Json(ApiResponse::success(API_POPUP_UPDATE, result)))
}

async fn update_popup_inner(
    state: &Arc<AppState>,
    payload: &JsonValue,
) -> Result<Map<String, JsonValue>, AppError> {
    state.validator.validate(profiles::POPUP_UPDATE, payload)?;

    let organization_id = str_field(payload, keys::ORGANIZATION_ID)?;
    let enabled = bool_field(payload, keys::IS_POPUP_ENABLED)?;

    let record = state
        .ledger
        .record(&organization_id)
        .await?
        .ok_or_else(|| AppError::OrganizationNotFound(organization_id.clone()))?;
    if record.custom_field_ids.is_empty() {
        return Err(AppError::BadRequest(format!(
            "Organization {} has no enabled custom fields",
            organization_id
        )));
    }

    let updated = state
        .ledger
        .set_popup_enabled(&organization_id, enabled)
        .await?;
    tracing::info!(organization_id = %organization_id, enabled, "Popup flag changed");

    let mut result = Map::new();
    result.insert(keys::ORGANIZATION_ID.to_string(), json!(organization_id));
    result.insert(
        keys::IS_POPUP_ENABLED.to_string(),
        json!(updated.is_popup_enabled),
    );
    Ok(result)
}
