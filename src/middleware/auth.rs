use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::auth::validate_jwt;
use crate::error::ApiError;
use crate::state::AppState;

/// Header set by the upstream gateway when bearer tokens are not verified here
pub const USER_ID_HEADER: &str = "x-user-id";

/// Authenticated caller injected into request extensions
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: String,
}

/// Resolve the caller identity for protected routes.
///
/// With a JWT secret configured the bearer token is mandatory and its `sub`
/// claim is the user id. Otherwise the `x-user-id` header is trusted.
pub async fn identity_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let security = &state.config.security;

    let user_id = if security.jwt_secret.is_empty() {
        extract_user_header(&headers).map_err(ApiError::unauthorized)?
    } else {
        let token = extract_jwt_from_headers(&headers).map_err(ApiError::unauthorized)?;
        validate_jwt(&token, security)
            .map_err(|e| ApiError::unauthorized(e.to_string()))?
            .sub
    };

    request.extensions_mut().insert(AuthUser { user_id });
    Ok(next.run(request).await)
}

fn extract_user_header(headers: &HeaderMap) -> Result<String, String> {
    let value = headers
        .get(USER_ID_HEADER)
        .ok_or_else(|| "Missing user identity".to_string())?
        .to_str()
        .map_err(|_| "Invalid user identity header".to_string())?
        .trim();

    if value.is_empty() {
        return Err("Missing user identity".to_string());
    }
    Ok(value.to_string())
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<String, String> {
    let auth_str = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| "Missing Authorization header".to_string())?
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty JWT token".to_string());
        }
        Ok(token.trim().to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}
