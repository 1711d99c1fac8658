use std::sync::Arc;

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::error::Error;
use crate::server::AppState;
use crate::types::User;

/// Extractor that requires an authenticated, active user.
pub struct RequireUser(pub User);

/// Extractor that additionally requires the admin role.
pub struct RequireAdmin(pub User);

#[derive(Debug)]
pub enum AuthError {
    MissingAuth,
    InvalidScheme,
    InvalidToken,
    TokenExpired,
    AccountDisabled,
    NotAdmin,
    InternalError,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        // A missing token is 401; a token that is present but unusable
        // (bad signature, expired, stale user) is 403.
        let (status, message) = match self {
            AuthError::MissingAuth => (StatusCode::UNAUTHORIZED, "Authentication required"),
            AuthError::InvalidScheme => (StatusCode::UNAUTHORIZED, "Invalid authorization scheme"),
            AuthError::InvalidToken => (StatusCode::FORBIDDEN, "Invalid token"),
            AuthError::TokenExpired => (StatusCode::FORBIDDEN, "Token expired"),
            AuthError::AccountDisabled => (StatusCode::FORBIDDEN, "Account disabled"),
            AuthError::NotAdmin => (StatusCode::FORBIDDEN, "Admin access required"),
            AuthError::InternalError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = json!({ "success": false, "message": message });

        let mut response = (status, Json(body)).into_response();

        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                "WWW-Authenticate",
                "Bearer realm=\"keyrack\"".parse().unwrap(),
            );
        }

        response
    }
}

impl FromRequestParts<Arc<AppState>> for RequireUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let user = authenticate(parts, state)?;
        Ok(RequireUser(user))
    }
}

impl FromRequestParts<Arc<AppState>> for RequireAdmin {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let user = authenticate(parts, state)?;

        if !user.role.is_admin() {
            return Err(AuthError::NotAdmin);
        }

        Ok(RequireAdmin(user))
    }
}

fn authenticate(parts: &mut Parts, state: &Arc<AppState>) -> Result<User, AuthError> {
    let auth_header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthError::MissingAuth)?;

    let raw_token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidScheme)?;

    let claims = state.signer.verify(raw_token).map_err(|e| match e {
        Error::TokenExpired => AuthError::TokenExpired,
        _ => AuthError::InvalidToken,
    })?;

    // The token may outlive the account: re-check the store so tokens for
    // deleted or deactivated users die immediately.
    let user = state
        .store
        .get_user(claims.sub)
        .map_err(|_| AuthError::InternalError)?
        .ok_or(AuthError::InvalidToken)?;

    if !user.active {
        return Err(AuthError::AccountDisabled);
    }

    Ok(user)
}
