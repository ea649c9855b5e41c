//! Request payload validation.
//!
//! One rule table per profile; each rule names a key and the shape it must
//! have. Violations are collected, not short-circuited, so a client sees
//! every problem at once.

use fields_core::models::custom_field::keys;
use fields_core::validation::profiles;
use fields_core::SchemaValidator;
use serde_json::Value as JsonValue;

#[derive(Clone, Copy)]
enum Shape {
    NonEmptyString,
    Bool,
    NonEmptyArray,
}

struct Rule {
    key: &'static str,
    shape: Shape,
    required: bool,
}

const fn required(key: &'static str, shape: Shape) -> Rule {
    Rule {
        key,
        shape,
        required: true,
    }
}

const fn optional(key: &'static str, shape: Shape) -> Rule {
    Rule {
        key,
        shape,
        required: false,
    }
}

fn rules_for(profile: &str) -> Option<&'static [Rule]> {
    const CREATE: &[Rule] = &[
        required(keys::ORGANIZATION_ID, Shape::NonEmptyString),
        required(keys::NAME, Shape::NonEmptyString),
        required(keys::ATTRIBUTE_NAME, Shape::NonEmptyString),
        optional(keys::IS_MANDATORY, Shape::Bool),
    ];
    const MASTER_LIST_CREATE: &[Rule] = &[
        required(keys::ORGANIZATION_ID, Shape::NonEmptyString),
        required(keys::NAME, Shape::NonEmptyString),
        required(keys::CUSTOM_FIELD_DATA, Shape::NonEmptyArray),
        optional(keys::IS_MANDATORY, Shape::Bool),
    ];
    const MASTER_LIST_UPDATE: &[Rule] = &[
        required(keys::ORGANIZATION_ID, Shape::NonEmptyString),
        required(keys::CUSTOM_FIELD_ID, Shape::NonEmptyString),
        required(keys::CUSTOM_FIELD_DATA, Shape::NonEmptyArray),
        optional(keys::NAME, Shape::NonEmptyString),
    ];
    const STATUS_UPDATE: &[Rule] = &[
        required(keys::CUSTOM_FIELD_ID, Shape::NonEmptyString),
        required(keys::IS_ENABLED, Shape::Bool),
    ];
    const POPUP_UPDATE: &[Rule] = &[
        required(keys::ORGANIZATION_ID, Shape::NonEmptyString),
        required(keys::IS_POPUP_ENABLED, Shape::Bool),
    ];

    match profile {
        profiles::CREATE | profiles::UPDATE => Some(CREATE),
        profiles::MASTER_LIST_CREATE => Some(MASTER_LIST_CREATE),
        profiles::MASTER_LIST_UPDATE => Some(MASTER_LIST_UPDATE),
        profiles::STATUS_UPDATE => Some(STATUS_UPDATE),
        profiles::POPUP_UPDATE => Some(POPUP_UPDATE),
        _ => None,
    }
}

fn check(rule: &Rule, payload: &JsonValue) -> Option<String> {
    let value = payload.get(rule.key);

    let Some(value) = value else {
        return rule
            .required
            .then(|| format!("{} is required", rule.key));
    };

    let ok = match rule.shape {
        Shape::NonEmptyString => value.as_str().is_some_and(|s| !s.trim().is_empty()),
        Shape::Bool => value.is_boolean(),
        Shape::NonEmptyArray => value.as_array().is_some_and(|a| !a.is_empty()),
    };

    if ok {
        None
    } else {
        let expected = match rule.shape {
            Shape::NonEmptyString => "a non-empty string",
            Shape::Bool => "a boolean",
            Shape::NonEmptyArray => "a non-empty array",
        };
        Some(format!("{} must be {}", rule.key, expected))
    }
}

#[derive(Default)]
pub struct ProfileValidator;

impl SchemaValidator for ProfileValidator {
    fn violations(&self, profile: &str, payload: &JsonValue) -> Vec<String> {
        let Some(rules) = rules_for(profile) else {
            return vec![format!("unknown validation profile: {}", profile)];
        };
        if !payload.is_object() {
            return vec!["request body must be a JSON object".to_string()];
        }
        rules
            .iter()
            .filter_map(|rule| check(rule, payload))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fields_core::AppError;
    use serde_json::json;

    #[test]
    fn test_create_accepts_complete_payload() {
        let validator = ProfileValidator;
        validator
            .validate(
                profiles::CREATE,
                &json!({
                    "organizationId": "org-a",
                    "name": "Department",
                    "attributeName": "department",
                    "isMandatory": true
                }),
            )
            .unwrap();
    }

    #[test]
    fn test_create_collects_all_violations() {
        let validator = ProfileValidator;
        let violations = validator.violations(
            profiles::CREATE,
            &json!({"organizationId": "", "isMandatory": "yes"}),
        );
        assert_eq!(violations.len(), 4);
        assert!(violations
            .iter()
            .any(|v| v == "organizationId must be a non-empty string"));
        assert!(violations.iter().any(|v| v == "name is required"));
        assert!(violations.iter().any(|v| v == "isMandatory must be a boolean"));
    }

    #[test]
    fn test_status_update_requires_boolean_flag() {
        let validator = ProfileValidator;
        let err = validator
            .validate(
                profiles::STATUS_UPDATE,
                &json!({"customFieldId": "cf-1", "isEnabled": "true"}),
            )
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn test_master_list_create_requires_level_array() {
        let validator = ProfileValidator;
        let violations = validator.violations(
            profiles::MASTER_LIST_CREATE,
            &json!({"organizationId": "org-a", "name": "Region", "customFieldData": []}),
        );
        assert_eq!(violations, vec!["customFieldData must be a non-empty array"]);
    }

    #[test]
    fn test_popup_update_profile() {
        let validator = ProfileValidator;
        validator
            .validate(
                profiles::POPUP_UPDATE,
                &json!({"organizationId": "org-a", "isPopupEnabled": true}),
            )
            .unwrap();
        let violations =
            validator.violations(profiles::POPUP_UPDATE, &json!({"isPopupEnabled": true}));
        assert_eq!(violations, vec!["organizationId is required"]);
    }

    #[test]
    fn test_unknown_profile_is_rejected() {
        let validator = ProfileValidator;
        let violations = validator.violations("nonsense", &json!({}));
        assert_eq!(violations.len(), 1);
    }

    #[test]
    fn test_non_object_body_is_rejected() {
        let validator = ProfileValidator;
        let violations = validator.violations(profiles::CREATE, &json!([1, 2]));
        assert_eq!(violations, vec!["request body must be a JSON object"]);
    }
}
