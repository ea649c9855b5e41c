use std::sync::Arc;

use fields_core::models::custom_field::keys;
use fields_core::models::SearchCriteria;
use fields_core::AppError;
use serde_json::{json, Map, Value as JsonValue};

use crate::services::search_index::SearchIndex;

// Upper bound on active fields per organization scanned for collisions.
const SCAN_PAGE_SIZE: usize = 10_000;

/// Attribute-name uniqueness within an organization.
///
/// Scalar fields claim their `attributeName`; master-list fields claim one
/// name per level, stored under `originalCustomFieldData`. Only active
/// documents count, so names freed by a soft delete become reusable.
pub struct UniquenessGuard {
    index: Arc<dyn SearchIndex>,
}

impl UniquenessGuard {
    pub fn new(index: Arc<dyn SearchIndex>) -> Self {
        Self { index }
    }

    /// Fail with the full list of clashes when any of `names` is already
    /// claimed by another active field of the organization. `exclude_id`
    /// lets an update skip the field being updated.
    #[tracing::instrument(skip(self, names), fields(organization_id = %organization_id))]
    pub async fn check_available(
        &self,
        organization_id: &str,
        names: &[String],
        exclude_id: Option<&str>,
    ) -> Result<(), AppError> {
        if names.is_empty() {
            return Ok(());
        }

        let mut filters = Map::new();
        filters.insert(keys::ORGANIZATION_ID.to_string(), json!(organization_id));
        filters.insert(keys::IS_ACTIVE.to_string(), json!(true));
        let mut criteria = SearchCriteria::with_filters(filters);
        criteria.page_size = SCAN_PAGE_SIZE;

        let result = self.index.search(&criteria).await?;

        let mut taken: Vec<String> = Vec::new();
        for document in &result.data {
            let id = document
                .get(keys::CUSTOM_FIELD_ID)
                .and_then(JsonValue::as_str);
            if id.is_some() && id == exclude_id {
                continue;
            }
            for claimed in claimed_names(document) {
                if names.iter().any(|n| n == claimed) && !taken.iter().any(|t| t == claimed) {
                    taken.push(claimed.to_string());
                }
            }
        }

        if taken.is_empty() {
            Ok(())
        } else {
            taken.sort();
            Err(AppError::DuplicateAttribute(taken))
        }
    }
}

/// Every attribute name a document claims: the top-level one plus one per
/// declared master-list level.
fn claimed_names(document: &JsonValue) -> Vec<&str> {
    let mut names = Vec::new();
    if let Some(name) = document.get(keys::ATTRIBUTE_NAME).and_then(JsonValue::as_str) {
        names.push(name);
    }
    if let Some(levels) = document
        .get(keys::ORIGINAL_CUSTOM_FIELD_DATA)
        .and_then(JsonValue::as_array)
    {
        for level in levels {
            if let Some(name) = level.get(keys::ATTRIBUTE_NAME).and_then(JsonValue::as_str) {
                names.push(name);
            }
        }
    }
    names
}
