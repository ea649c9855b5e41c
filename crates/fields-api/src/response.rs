//! Uniform response envelope.
//!
//! Every endpoint, success or failure, answers with the same shape: the api
//! id, version, timestamp, a params block carrying the correlation id and
//! outcome, a response code, and the operation result.

use chrono::Utc;
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::constants::API_VERSION;

pub const STATUS_SUCCESS: &str = "success";
pub const STATUS_FAILED: &str = "failed";
pub const RESPONSE_CODE_OK: &str = "OK";

#[derive(Debug, Serialize, ToSchema)]
pub struct ResponseParams {
    /// Correlation id, unique per response.
    pub resmsgid: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub err: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errmsg: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse {
    pub id: String,
    pub ver: String,
    pub ts: String,
    pub params: ResponseParams,
    #[serde(rename = "responseCode")]
    pub response_code: String,
    #[schema(value_type = Object)]
    pub result: Map<String, JsonValue>,
}

impl ApiResponse {
    pub fn success(api_id: &str, result: Map<String, JsonValue>) -> Self {
        Self {
            id: api_id.to_string(),
            ver: API_VERSION.to_string(),
            ts: Utc::now().to_rfc3339(),
            params: ResponseParams {
                resmsgid: Uuid::new_v4().to_string(),
                status: STATUS_SUCCESS.to_string(),
                err: None,
                errmsg: None,
            },
            response_code: RESPONSE_CODE_OK.to_string(),
            result,
        }
    }

    pub fn failure(api_id: &str, err_code: &str, errmsg: String) -> Self {
        Self {
            id: api_id.to_string(),
            ver: API_VERSION.to_string(),
            ts: Utc::now().to_rfc3339(),
            params: ResponseParams {
                resmsgid: Uuid::new_v4().to_string(),
                status: STATUS_FAILED.to_string(),
                err: Some(err_code.to_string()),
                errmsg: Some(errmsg),
            },
            response_code: err_code.to_string(),
            result: Map::new(),
        }
    }
}

/// Shorthand for a one-entry result map.
pub fn result_entry(key: &str, value: JsonValue) -> Map<String, JsonValue> {
    let mut map = Map::new();
    map.insert(key.to_string(), value);
    map
}
