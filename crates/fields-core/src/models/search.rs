use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;

fn default_page_size() -> usize {
    100
}

/// Filter criteria accepted by the search endpoint and translated by the
/// search-index backend. Filter values may be scalars (exact match) or arrays
/// (any-of).
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchCriteria {
    #[serde(default)]
    #[schema(value_type = Object)]
    pub filter_criteria_map: serde_json::Map<String, JsonValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requested_fields: Vec<String>,
    #[serde(default)]
    pub page_number: usize,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_direction: Option<String>,
}

impl SearchCriteria {
    /// Criteria matching active documents with the given filters.
    pub fn with_filters(filters: serde_json::Map<String, JsonValue>) -> Self {
        Self {
            filter_criteria_map: filters,
            page_size: default_page_size(),
            ..Default::default()
        }
    }
}

/// Search hits plus total count, as returned under `searchResults`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub total_count: u64,
    #[schema(value_type = Vec<Object>)]
    pub data: Vec<JsonValue>,
}
