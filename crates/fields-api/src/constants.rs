//! API identifiers stamped into response envelopes.

pub const API_VERSION: &str = "v1";

pub const API_CREATE: &str = "api.customFields.create";
pub const API_READ: &str = "api.customFields.read";
pub const API_UPDATE: &str = "api.customFields.update";
pub const API_DELETE: &str = "api.customFields.delete";
pub const API_SEARCH: &str = "api.customFields.search";
pub const API_MASTER_LIST_CREATE: &str = "api.customFields.masterList.create";
pub const API_MASTER_LIST_UPDATE: &str = "api.customFields.masterList.update";
pub const API_STATUS_UPDATE: &str = "api.customFields.status.update";
pub const API_POPUP_UPDATE: &str = "api.customFields.popup.update";
pub const API_AUTH: &str = "api.customFields.auth";

/// Header carrying the caller's JWT.
pub const USER_TOKEN_HEADER: &str = "x-authenticated-user-token";
