use serde::{Deserialize, Serialize};

/// Per-organization enablement record, stored as a JSON blob keyed by
/// organization id. `custom_fields_count` must equal the sum of weights of
/// the ids in `custom_field_ids`; the ledger maintains this through
/// disciplined add/remove, it is never recomputed from scratch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnablementRecord {
    #[serde(default)]
    pub custom_field_ids: Vec<String>,
    #[serde(default)]
    pub custom_fields_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_popup_enabled: Option<bool>,
}

impl EnablementRecord {
    pub fn contains(&self, custom_field_id: &str) -> bool {
        self.custom_field_ids.iter().any(|id| id == custom_field_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserializes_partial_blob() {
        // Records written before the popup flag existed have only ids + count.
        let record: EnablementRecord =
            serde_json::from_str(r#"{"customFieldIds":["a"],"customFieldsCount":2}"#)
                .expect("deserialize");
        assert!(record.contains("a"));
        assert_eq!(record.custom_fields_count, 2);
        assert_eq!(record.is_popup_enabled, None);
    }
}
