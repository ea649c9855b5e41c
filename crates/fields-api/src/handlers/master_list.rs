//! Master-list hierarchy upload endpoints.
//!
//! Both endpoints take a multipart body with a `file` part (the workbook)
//! and a `metadata` part (a JSON string with the organization, name, and
//! level declarations). The sheet is validated against the declared levels,
//! parsed into the forward tree and the reversed chains, and stored as one
//! custom-field document.

use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::{Extension, Json};
use bytes::Bytes;
use chrono::Utc;
use fields_core::hierarchy::ingest::{check_upload, parse_level_metadata, validate_sheet, LevelMeta};
use fields_core::hierarchy::parse_hierarchy;
use fields_core::models::custom_field::{keys, FIELD_TYPE_MASTER_LIST};
use fields_core::models::CustomField;
use fields_core::validation::profiles;
use fields_core::{AppError, IngestError};
use serde_json::{json, Map, Value as JsonValue};
use uuid::Uuid;

use crate::auth::UserContext;
use crate::constants::{API_MASTER_LIST_CREATE, API_MASTER_LIST_UPDATE};
use crate::error::HttpAppError;
use crate::handlers::custom_field::RESULT_CUSTOM_FIELD;
use crate::handlers::{
    ensure_organization_unchanged, not_found, payload_object, persist_and_mirror, stamp_write,
    str_field,
};
use crate::response::{result_entry, ApiResponse};
use crate::spreadsheet::decode_workbook;
use crate::state::AppState;

struct MasterListUpload {
    metadata: JsonValue,
    file_name: Option<String>,
    content_type: Option<String>,
    bytes: Bytes,
}

async fn read_upload(mut multipart: Multipart) -> Result<MasterListUpload, AppError> {
    let mut metadata: Option<String> = None;
    let mut file_name = None;
    let mut content_type = None;
    let mut bytes: Option<Bytes> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed multipart body: {}", e)))?
    {
        match field.name() {
            Some("file") => {
                file_name = field.file_name().map(str::to_string);
                content_type = field.content_type().map(str::to_string);
                bytes = Some(field.bytes().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read uploaded file: {}", e))
                })?);
            }
            Some("metadata") => {
                metadata = Some(field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read metadata part: {}", e))
                })?);
            }
            _ => {}
        }
    }

    let metadata = metadata
        .ok_or_else(|| AppError::InvalidInput("metadata part is required".to_string()))?;
    let metadata: JsonValue = serde_json::from_str(&metadata)
        .map_err(|e| AppError::InvalidInput(format!("Malformed metadata JSON: {}", e)))?;
    let bytes = bytes.ok_or(AppError::Ingest(IngestError::UploadedFileEmpty))?;

    Ok(MasterListUpload {
        metadata,
        file_name,
        content_type,
        bytes,
    })
}

/// The parsed hierarchy keys of the stored document: the forward tree, the
/// reversed chains, the caller's level declarations, and the level count.
fn hierarchy_entries(
    document: &mut Map<String, JsonValue>,
    levels: &[LevelMeta],
    forward: JsonValue,
    reversed: JsonValue,
    original_levels: JsonValue,
) {
    document.insert(keys::TYPE.to_string(), json!(FIELD_TYPE_MASTER_LIST));
    document.insert(keys::LEVELS.to_string(), json!(levels.len()));
    document.insert(keys::CUSTOM_FIELD_DATA.to_string(), forward);
    document.insert(keys::REVERSED_ORDER_CUSTOM_FIELD_DATA.to_string(), reversed);
    document.insert(keys::ORIGINAL_CUSTOM_FIELD_DATA.to_string(), original_levels);
}

struct ParsedUpload {
    metadata: JsonValue,
    organization_id: String,
    levels: Vec<LevelMeta>,
    forward: JsonValue,
    reversed: JsonValue,
}

/// Shared ingestion path: upload checks, metadata levels, sheet validation,
/// hierarchy parse.
async fn ingest(
    state: &Arc<AppState>,
    upload: MasterListUpload,
    profile: &str,
) -> Result<ParsedUpload, AppError> {
    state.validator.validate(profile, &upload.metadata)?;
    let organization_id = str_field(&upload.metadata, keys::ORGANIZATION_ID)?;

    let policy = state.upload_policy();
    check_upload(
        upload.file_name.as_deref(),
        upload.content_type.as_deref(),
        upload.bytes.len(),
        &policy,
    )?;

    let levels = parse_level_metadata(upload.metadata.get(keys::CUSTOM_FIELD_DATA))?;
    let sheet = decode_workbook(&upload.bytes)?;
    let validated = validate_sheet(&sheet, &levels, &policy)?;

    let parsed = parse_hierarchy(
        &validated.headers,
        &sheet.rows,
        levels.len(),
        &validated.attribute_labels,
    );

    Ok(ParsedUpload {
        organization_id,
        forward: serde_json::to_value(&parsed.forward)?,
        reversed: serde_json::to_value(&parsed.reversed)?,
        levels,
        metadata: upload.metadata,
    })
}

fn level_names(levels: &[LevelMeta]) -> Vec<String> {
    levels.iter().map(|l| l.attribute_name.clone()).collect()
}

/// Create a master-list custom field from an uploaded workbook.
#[utoipa::path(
    post,
    path = "/customFields/v1/masterList/create",
    request_body(content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Hierarchy field created", body = ApiResponse),
        (status = 400, description = "Spreadsheet or metadata validation failure", body = ApiResponse),
        (status = 401, description = "Missing or invalid user token", body = ApiResponse)
    ),
    tag = "customFields"
)]
pub async fn create(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<UserContext>,
    multipart: Multipart,
) -> Result<Json<ApiResponse>, HttpAppError> {
    let result = create_inner(&state, &user, multipart)
        .await
        .map_err(|e| HttpAppError::new(API_MASTER_LIST_CREATE, e))?;
    Ok(Json(ApiResponse::success(API_MASTER_LIST_CREATE, result)))
}

async fn create_inner(
    state: &Arc<AppState>,
    user: &UserContext,
    multipart: Multipart,
) -> Result<Map<String, JsonValue>, AppError> {
    let upload = read_upload(multipart).await?;
    let parsed = ingest(state, upload, profiles::MASTER_LIST_CREATE).await?;

    state
        .uniqueness
        .check_available(&parsed.organization_id, &level_names(&parsed.levels), None)
        .await?;

    let custom_field_id = Uuid::new_v4().to_string();
    let now = Utc::now();

    let mut document = payload_object(&parsed.metadata)?;
    let original_levels = document
        .get(keys::CUSTOM_FIELD_DATA)
        .cloned()
        .unwrap_or_else(|| json!([]));
    hierarchy_entries(
        &mut document,
        &parsed.levels,
        parsed.forward,
        parsed.reversed,
        original_levels,
    );
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
    tracing::info!(
        custom_field_id = %field.custom_field_id,
        organization_id = %parsed.organization_id,
        levels = parsed.levels.len(),
        "Master list created"
    );
    Ok(result_entry(RESULT_CUSTOM_FIELD, document))
}

/// Replace the hierarchy of an existing master-list field. The target id
/// comes from the metadata; creation info and `isMandatory` are preserved
/// and `isEnabled` resets.
#[utoipa::path(
    put,
    path = "/customFields/v1/masterList/update",
    request_body(content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Hierarchy field updated", body = ApiResponse),
        (status = 400, description = "Spreadsheet or metadata validation failure", body = ApiResponse),
        (status = 404, description = "Unknown or inactive id", body = ApiResponse)
    ),
    tag = "customFields"
)]
pub async fn update(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<UserContext>,
    multipart: Multipart,
) -> Result<Json<ApiResponse>, HttpAppError> {
    let result = update_inner(&state, &user, multipart)
        .await
        .map_err(|e| HttpAppError::new(API_MASTER_LIST_UPDATE, e))?;
    Ok(Json(ApiResponse::success(API_MASTER_LIST_UPDATE, result)))
}

async fn update_inner(
    state: &Arc<AppState>,
    user: &UserContext,
    multipart: Multipart,
) -> Result<Map<String, JsonValue>, AppError> {
    let upload = read_upload(multipart).await?;
    let custom_field_id = str_field(&upload.metadata, keys::CUSTOM_FIELD_ID)?;
    let parsed = ingest(state, upload, profiles::MASTER_LIST_UPDATE).await?;

    let existing = state
        .custom_fields
        .find_active_by_id(&custom_field_id)
        .await?
        .ok_or_else(|| not_found(&custom_field_id))?;

    let stored_organization = existing.organization_id().unwrap_or_default();
    ensure_organization_unchanged(stored_organization, &parsed.organization_id)?;

    state
        .uniqueness
        .check_available(
            &parsed.organization_id,
            &level_names(&parsed.levels),
            Some(&custom_field_id),
        )
        .await?;

    let now = Utc::now();
    let mut document = payload_object(&parsed.metadata)?;
    let original_levels = document
        .get(keys::CUSTOM_FIELD_DATA)
        .cloned()
        .unwrap_or_else(|| json!([]));
    hierarchy_entries(
        &mut document,
        &parsed.levels,
        parsed.forward,
        parsed.reversed,
        original_levels,
    );

    for key in [keys::CREATED_BY, keys::CREATED_ON, keys::IS_MANDATORY] {
        if let Some(value) = existing.document.get(key) {
            document.insert(key.to_string(), value.clone());
        }
    }
    document.insert(keys::IS_ACTIVE.to_string(), json!(true));
    document.insert(keys::IS_ENABLED.to_string(), json!(false));
    stamp_write(&mut document, &user.user_id, now, false);

    let field = CustomField {
        custom_field_id: custom_field_id.clone(),
        document: JsonValue::Object(document),
        is_mandatory: existing.is_mandatory,
        is_active: true,
        created_on: existing.created_on,
        updated_on: now,
    };

    let document = persist_and_mirror(state, &field).await?;
    tracing::info!(custom_field_id = %custom_field_id, "Master list updated");
    Ok(result_entry(RESULT_CUSTOM_FIELD, document))
}
