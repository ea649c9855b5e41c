use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

#[cfg(feature = "sqlx")]
use sqlx::FromRow;

/// Document keys used inside the JSONB attribute bag. The document is a
/// semi-structured `serde_json::Value`; these are the keys the service reads
/// and stamps.
pub mod keys {
    pub const NAME: &str = "name";
    pub const ATTRIBUTE_NAME: &str = "attributeName";
    pub const ORGANIZATION_ID: &str = "organizationId";
    pub const IS_MANDATORY: &str = "isMandatory";
    pub const IS_ACTIVE: &str = "isActive";
    pub const IS_ENABLED: &str = "isEnabled";
    pub const IS_POPUP_ENABLED: &str = "isPopupEnabled";
    pub const CREATED_BY: &str = "createdBy";
    pub const CREATED_ON: &str = "createdOn";
    pub const UPDATED_BY: &str = "updatedBy";
    pub const UPDATED_ON: &str = "updatedOn";
    pub const CUSTOM_FIELD_ID: &str = "customFieldId";
    pub const CUSTOM_FIELD_DATA: &str = "customFieldData";
    pub const REVERSED_ORDER_CUSTOM_FIELD_DATA: &str = "reversedOrderCustomFieldData";
    pub const ORIGINAL_CUSTOM_FIELD_DATA: &str = "originalCustomFieldData";
    pub const LEVELS: &str = "levels";
    pub const LEVEL: &str = "level";
    pub const TYPE: &str = "type";
    pub const STATUS: &str = "status";
}

/// Document `type` value marking a multi-level master-list field.
pub const FIELD_TYPE_MASTER_LIST: &str = "masterList";

/// Timestamp format stored inside documents (`createdOn` / `updatedOn`).
const DOCUMENT_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%z";

/// Format a timestamp the way documents store it.
pub fn format_document_time(t: DateTime<Utc>) -> String {
    t.format(DOCUMENT_TIME_FORMAT).to_string()
}

/// A persisted custom-field definition. The `document` carries the full
/// attribute bag; `is_mandatory` and `is_active` are denormalized mirrors of
/// the same keys inside the document, kept as columns for fast filtering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(FromRow))]
pub struct CustomField {
    pub custom_field_id: String,
    pub document: JsonValue,
    pub is_mandatory: bool,
    pub is_active: bool,
    pub created_on: DateTime<Utc>,
    pub updated_on: DateTime<Utc>,
}

impl CustomField {
    /// The document with `customFieldId` injected, as returned to clients and
    /// written to the search index and cache.
    pub fn document_with_id(&self) -> JsonValue {
        let mut doc = self.document.clone();
        if let Some(map) = doc.as_object_mut() {
            map.insert(
                keys::CUSTOM_FIELD_ID.to_string(),
                JsonValue::String(self.custom_field_id.clone()),
            );
        }
        doc
    }

    pub fn organization_id(&self) -> Option<&str> {
        self.document.get(keys::ORGANIZATION_ID)?.as_str()
    }

    pub fn attribute_name(&self) -> Option<&str> {
        self.document.get(keys::ATTRIBUTE_NAME)?.as_str()
    }

    pub fn is_enabled(&self) -> bool {
        self.document
            .get(keys::IS_ENABLED)
            .and_then(JsonValue::as_bool)
            .unwrap_or(false)
    }

    /// Enablement budget cost: 1 for scalar fields, the level count for
    /// master-list fields.
    pub fn weight(&self) -> i64 {
        let is_master_list = self
            .document
            .get(keys::TYPE)
            .and_then(JsonValue::as_str)
            .map(|t| t == FIELD_TYPE_MASTER_LIST)
            .unwrap_or(false);
        if is_master_list {
            self.document
                .get(keys::LEVELS)
                .and_then(JsonValue::as_i64)
                .unwrap_or(1)
        } else {
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn field_with(document: JsonValue) -> CustomField {
        CustomField {
            custom_field_id: "cf-1".to_string(),
            document,
            is_mandatory: false,
            is_active: true,
            created_on: Utc::now(),
            updated_on: Utc::now(),
        }
    }

    #[test]
    fn test_weight_scalar_field() {
        let field = field_with(json!({"name": "Department"}));
        assert_eq!(field.weight(), 1);
    }

    #[test]
    fn test_weight_master_list_uses_levels() {
        let field = field_with(json!({"type": "masterList", "levels": 3}));
        assert_eq!(field.weight(), 3);
    }

    #[test]
    fn test_document_with_id_injects_id() {
        let field = field_with(json!({"name": "Department"}));
        let doc = field.document_with_id();
        assert_eq!(doc["customFieldId"], json!("cf-1"));
        assert_eq!(doc["name"], json!("Department"));
    }

    #[test]
    fn test_is_enabled_defaults_false() {
        let field = field_with(json!({"name": "Department"}));
        assert!(!field.is_enabled());
        let field = field_with(json!({"isEnabled": true}));
        assert!(field.is_enabled());
    }
}
