use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One node of a master-list hierarchy, persisted as nested JSON inside a
/// field document (`customFieldData` for the forward tree,
/// `reversedOrderCustomFieldData` for the per-leaf chains).
///
/// Parent pointers are omitted from the wire shape at the root level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyNode {
    pub field_name: String,
    pub field_value: String,
    pub field_attribute: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_field_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_field_value: Option<String>,
    #[serde(default)]
    pub field_values: Vec<HierarchyNode>,
}

impl HierarchyNode {
    /// Copy of this node's scalar fields with an empty children list.
    pub fn scalar_copy(&self) -> HierarchyNode {
        HierarchyNode {
            field_name: self.field_name.clone(),
            field_value: self.field_value.clone(),
            field_attribute: self.field_attribute.clone(),
            parent_field_name: self.parent_field_name.clone(),
            parent_field_value: self.parent_field_value.clone(),
            field_values: Vec::new(),
        }
    }

    /// Number of nodes in this subtree, including self.
    pub fn node_count(&self) -> usize {
        1 + self
            .field_values
            .iter()
            .map(HierarchyNode::node_count)
            .sum::<usize>()
    }

    /// Number of zero-child nodes in this subtree.
    pub fn leaf_count(&self) -> usize {
        if self.field_values.is_empty() {
            1
        } else {
            self.field_values
                .iter()
                .map(HierarchyNode::leaf_count)
                .sum()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_camel_case_and_omits_absent_parents() {
        let node = HierarchyNode {
            field_name: "Country".to_string(),
            field_value: "India".to_string(),
            field_attribute: "country".to_string(),
            parent_field_name: None,
            parent_field_value: None,
            field_values: vec![],
        };
        let json = serde_json::to_value(&node).expect("serialize");
        assert_eq!(json["fieldName"], "Country");
        assert_eq!(json["fieldAttribute"], "country");
        assert!(json.get("parentFieldName").is_none());
        assert!(json["fieldValues"].as_array().expect("array").is_empty());
    }
}
