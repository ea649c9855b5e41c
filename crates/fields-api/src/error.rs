//! HTTP error response conversion.
//!
//! Handlers return `Result<_, HttpAppError>`; the wrapper exists because of
//! the orphan rule (`IntoResponse` and `AppError` both live elsewhere) and
//! carries the api id so failures render in the same envelope as successes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use fields_core::{AppError, ErrorMetadata, LogLevel};

use crate::response::ApiResponse;

#[derive(Debug)]
pub struct HttpAppError {
    pub api_id: &'static str,
    pub error: AppError,
}

impl HttpAppError {
    pub fn new(api_id: &'static str, error: impl Into<AppError>) -> Self {
        Self {
            api_id,
            error: error.into(),
        }
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type, "Request failed");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type, "Request failed");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type, "Request failed");
        }
    }
}

fn is_production_env() -> bool {
    std::env::var("ENVIRONMENT")
        .map(|env| {
            let env = env.to_lowercase();
            env == "production" || env == "prod"
        })
        .unwrap_or(false)
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let error = &self.error;
        let status = StatusCode::from_u16(error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(error);

        // Hide internals in production and for sensitive errors.
        let message = if is_production_env() || error.is_sensitive() {
            error.client_message()
        } else {
            error.detailed_message()
        };

        let envelope = ApiResponse::failure(self.api_id, error.error_code(), message);
        (status, Json(envelope)).into_response()
    }
}
