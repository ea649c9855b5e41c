//! Caller authentication.
//!
//! Every business route requires a JWT in `x-authenticated-user-token`. The
//! middleware verifies it, resolves the caller's user id, and stores a
//! `UserContext` extension for handlers. Missing, expired, or malformed
//! tokens fail closed with 401.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use fields_core::AppError;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

use crate::constants::{API_AUTH, USER_TOKEN_HEADER};
use crate::error::HttpAppError;
use crate::state::AppState;

#[derive(Clone, Debug)]
pub struct UserContext {
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
    #[allow(dead_code)]
    exp: usize,
}

/// The subject may be a bare user id or a colon-separated principal path
/// ending in the user id.
fn user_id_from_subject(sub: &str) -> &str {
    sub.rsplit(':').next().unwrap_or(sub)
}

fn verify_token(token: &str, secret: &str) -> Result<UserContext, AppError> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::new(Algorithm::HS256);

    let data = decode::<Claims>(token, &key, &validation)
        .map_err(|e| AppError::Unauthorized(format!("Invalid user token: {}", e)))?;

    let user_id = user_id_from_subject(&data.claims.sub);
    if user_id.is_empty() {
        return Err(AppError::Unauthorized(
            "User token has no subject".to_string(),
        ));
    }

    Ok(UserContext {
        user_id: user_id.to_string(),
    })
}

pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(USER_TOKEN_HEADER)
        .and_then(|h| h.to_str().ok());

    let Some(token) = token else {
        return HttpAppError::new(
            API_AUTH,
            AppError::Unauthorized("Missing user token".to_string()),
        )
        .into_response();
    };

    match verify_token(token, &state.config.jwt_secret) {
        Ok(context) => {
            request.extensions_mut().insert(context);
            next.run(request).await
        }
        Err(error) => HttpAppError::new(API_AUTH, error).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde::Serialize;

    #[derive(Serialize)]
    struct TestClaims {
        sub: String,
        exp: usize,
    }

    fn token(sub: &str, exp: usize, secret: &str) -> String {
        encode(
            &Header::default(),
            &TestClaims {
                sub: sub.to_string(),
                exp,
            },
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn far_future() -> usize {
        4_102_444_800 // 2100-01-01
    }

    #[test]
    fn test_valid_token_resolves_user() {
        let t = token("user-123", far_future(), "secret");
        let context = verify_token(&t, "secret").unwrap();
        assert_eq!(context.user_id, "user-123");
    }

    #[test]
    fn test_subject_path_keeps_last_segment() {
        let t = token("f:realm:user-123", far_future(), "secret");
        let context = verify_token(&t, "secret").unwrap();
        assert_eq!(context.user_id, "user-123");
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let t = token("user-123", far_future(), "secret");
        let err = verify_token(&t, "other").unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let t = token("user-123", 1_000_000, "secret");
        let err = verify_token(&t, "secret").unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        let err = verify_token("not-a-jwt", "secret").unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }
}
