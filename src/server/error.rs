use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::engine::{AuthError, Error};

/// Failures surfaced to HTTP clients as `{ok: false, message}`.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized(&'static str),
    Forbidden,
    NotFound(String),
    /// Infrastructure trouble; clients should retry rather than fix their request
    Unavailable,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Unauthorized(message) => (StatusCode::UNAUTHORIZED, message.to_string()),
            ApiError::Forbidden => (
                StatusCode::FORBIDDEN,
                "Not allowed to access this resource".to_string(),
            ),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            ApiError::Unavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Service temporarily unavailable, try again".to_string(),
            ),
        };
        (status, Json(json!({ "ok": false, "message": message }))).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::AccountNotFound { .. } => ApiError::NotFound("Invalid card".to_string()),
            other => {
                log::error!("Ledger unavailable: {other}");
                ApiError::Unavailable
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            // Unknown card and wrong PIN look the same from outside
            AuthError::AccountNotFound { .. } | AuthError::InvalidCredential => {
                ApiError::Unauthorized("Invalid credentials")
            }
            AuthError::InvalidSession => ApiError::Unauthorized("Invalid or missing session"),
            AuthError::SessionExpired => ApiError::Unauthorized("Session has expired"),
            AuthError::Forbidden => ApiError::Forbidden,
            AuthError::Storage(err) => err.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_storage_failure_is_503() {
        let response = ApiError::from(Error::StorageUnavailable("account lock poisoned")).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body = body_json(response).await;
        assert_eq!(body["ok"], false);
        assert_eq!(body["message"], "Service temporarily unavailable, try again");
    }

    #[tokio::test]
    async fn test_unknown_account_is_404() {
        let response = ApiError::from(Error::AccountNotFound {
            card: "4000********0000".to_string(),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["message"], "Invalid card");
    }

    #[test]
    fn test_auth_storage_failure_is_unavailable() {
        let err = AuthError::Storage(Error::StorageUnavailable("account lock poisoned"));
        assert!(matches!(ApiError::from(err), ApiError::Unavailable));
    }
}
