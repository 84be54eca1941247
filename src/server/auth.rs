//! Login routes and the bearer-token extractors guarding the read endpoints.

use axum::{
    extract::{rejection::JsonRejection, FromRequestParts, State},
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::{error::ApiError, AppState};
use crate::engine::{AdminSession, AuthError, CustomerSession};

/// Creates the auth router.
pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/adminLogin", post(admin_login))
        .route("/auth/logout", post(logout))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest {
    card_number: String,
    pin: String,
}

#[derive(Deserialize)]
struct AdminLoginRequest {
    username: String,
    password: String,
}

/// POST /auth/login - Check card number and PIN, open a customer session.
async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    if payload.card_number.trim().is_empty() || payload.pin.is_empty() {
        return Err(ApiError::BadRequest("cardNumber and pin are required".to_string()));
    }

    match state.core.auth().login_customer(&payload.card_number, &payload.pin) {
        Ok(login) => Ok(Json(json!({
            "ok": true,
            "cardNumber": login.card_number,
            "role": "CUSTOMER",
            "token": login.token,
            "expiresAt": login.session.expires_at(),
        }))),
        Err(AuthError::AccountNotFound { .. } | AuthError::InvalidCredential) => {
            Err(ApiError::Unauthorized("Invalid card number or PIN"))
        }
        Err(e) => Err(e.into()),
    }
}

/// POST /auth/adminLogin - Check the administrator credential, open an admin session.
async fn admin_login(
    State(state): State<AppState>,
    payload: Result<Json<AdminLoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    match state.core.auth().login_admin(&payload.username, &payload.password) {
        Ok(login) => Ok(Json(json!({
            "ok": true,
            "role": "ADMIN",
            "token": login.token,
            "expiresAt": login.session.expires_at(),
        }))),
        Err(AuthError::InvalidCredential) => {
            Err(ApiError::Unauthorized("Invalid admin credentials"))
        }
        Err(e) => Err(e.into()),
    }
}

/// POST /auth/logout - Revoke the presented session.
async fn logout(State(state): State<AppState>, BearerToken(token): BearerToken) -> StatusCode {
    state.core.auth().logout(&token);
    StatusCode::NO_CONTENT
}

/// Extracts the bearer token from the Authorization header.
fn extract_bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Raw bearer token from the `Authorization` header.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(extract_bearer_token)
            .map(|token| BearerToken(token.to_string()))
            .ok_or(ApiError::Unauthorized(
                "Authorization header with Bearer token is required",
            ))
    }
}

/// A live customer session, resolved from the bearer token.
#[derive(Debug, Clone)]
pub struct CustomerAuth(pub CustomerSession);

impl FromRequestParts<AppState> for CustomerAuth {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let BearerToken(token) = BearerToken::from_request_parts(parts, state).await?;
        Ok(CustomerAuth(state.core.auth().customer_session(&token)?))
    }
}

/// A live admin session, resolved from the bearer token.
#[derive(Debug, Clone)]
pub struct AdminAuth(pub AdminSession);

impl FromRequestParts<AppState> for AdminAuth {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let BearerToken(token) = BearerToken::from_request_parts(parts, state).await?;
        Ok(AdminAuth(state.core.auth().admin_session(&token)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(extract_bearer_token("bearer abc"), Some("abc"));
        assert_eq!(extract_bearer_token("Bearer "), None);
        assert_eq!(extract_bearer_token("Basic abc"), None);
    }
}
