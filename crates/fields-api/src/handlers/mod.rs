//! Request handlers.
//!
//! Handlers are thin: validate the payload profile, run the core operation,
//! mirror the document to the search index and cache, answer in the uniform
//! envelope. Postgres is the source of truth; the index and cache are
//! write-through copies.

pub mod custom_field;
pub mod master_list;
pub mod search;
pub mod status;

use std::sync::Arc;

use fields_core::models::custom_field::{format_document_time, keys};
use fields_core::models::CustomField;
use fields_core::AppError;
use fields_services::cache_key;
use serde_json::{Map, Value as JsonValue};

use crate::state::AppState;

/// Read a required non-empty string field from a validated payload.
fn str_field(payload: &JsonValue, key: &str) -> Result<String, AppError> {
    payload
        .get(key)
        .and_then(JsonValue::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| AppError::InvalidInput(format!("{} is required", key)))
}

fn bool_field(payload: &JsonValue, key: &str) -> Result<bool, AppError> {
    payload
        .get(key)
        .and_then(JsonValue::as_bool)
        .ok_or_else(|| AppError::InvalidInput(format!("{} must be a boolean", key)))
}

/// The payload as an owned JSON object. Profile validation has already
/// rejected non-object bodies.
fn payload_object(payload: &JsonValue) -> Result<Map<String, JsonValue>, AppError> {
    payload
        .as_object()
        .cloned()
        .ok_or_else(|| AppError::InvalidInput("request body must be a JSON object".to_string()))
}

fn not_found(custom_field_id: &str) -> AppError {
    AppError::NotFound(format!("Custom field {} not found", custom_field_id))
}

/// Updates must keep the stored organization id; rejected before any store
/// mutation.
fn ensure_organization_unchanged(stored: &str, incoming: &str) -> Result<(), AppError> {
    if stored != incoming {
        return Err(AppError::BadRequest(
            "organizationId cannot be changed".to_string(),
        ));
    }
    Ok(())
}

/// Save to Postgres, then mirror the full document to the search index and
/// cache. Returns the document as clients see it.
async fn persist_and_mirror(state: &Arc<AppState>, field: &CustomField) -> Result<JsonValue, AppError> {
    state.custom_fields.save(field).await?;
    let document = field.document_with_id();
    state
        .search_index
        .index_document(&field.custom_field_id, &document)
        .await?;
    state
        .cache
        .put(&cache_key(&field.custom_field_id), document.clone())
        .await;
    Ok(document)
}

/// Audit stamps common to every write: actor and update time, creation info
/// only when absent.
fn stamp_write(
    document: &mut Map<String, JsonValue>,
    user_id: &str,
    now: chrono::DateTime<chrono::Utc>,
    is_create: bool,
) {
    let ts = format_document_time(now);
    if is_create {
        document.insert(keys::CREATED_BY.to_string(), JsonValue::String(user_id.to_string()));
        document.insert(keys::CREATED_ON.to_string(), JsonValue::String(ts.clone()));
    }
    document.insert(keys::UPDATED_BY.to_string(), JsonValue::String(user_id.to_string()));
    document.insert(keys::UPDATED_ON.to_string(), JsonValue::String(ts));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_organization_change_is_rejected() {
        let err = ensure_organization_unchanged("org-a", "org-b").unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert!(err.to_string().contains("organizationId"));
    }

    #[test]
    fn test_same_organization_passes() {
        ensure_organization_unchanged("org-a", "org-a").unwrap();
    }
}
