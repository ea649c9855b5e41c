use serde_json::Value as JsonValue;

use crate::error::AppError;

/// Named validation profiles for the write endpoints. Each profile defines
/// which payload fields are required and which are forbidden; the API crate
/// owns the concrete rules.
pub mod profiles {
    pub const CREATE: &str = "create";
    pub const UPDATE: &str = "update";
    pub const MASTER_LIST_CREATE: &str = "masterListCreate";
    pub const MASTER_LIST_UPDATE: &str = "masterListUpdate";
    pub const STATUS_UPDATE: &str = "statusUpdate";
    pub const POPUP_UPDATE: &str = "popupUpdate";
}

/// Structural validation of request payloads against a named profile.
pub trait SchemaValidator: Send + Sync {
    /// Returns the list of violations, empty meaning the payload is valid.
    fn violations(&self, profile: &str, payload: &JsonValue) -> Vec<String>;

    /// Validate and fold violations into a single `InvalidInput` error.
    fn validate(&self, profile: &str, payload: &JsonValue) -> Result<(), AppError> {
        let violations = self.violations(profile, payload);
        if violations.is_empty() {
            Ok(())
        } else {
            Err(AppError::InvalidInput(violations.join("; ")))
        }
    }
}
