use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;

use crate::auth::RequireUser;
use crate::server::dto::{LoginRequest, LoginResponse};
use crate::server::response::{ApiError, ApiResponse};
use crate::server::{AppState, ClientIp};
use crate::types::ActivityAction;

/// POST /api/auth/login
///
/// Unknown usernames and wrong passwords produce the identical response so
/// the endpoint leaks no account-existence signal.
pub async fn login(
    State(state): State<Arc<AppState>>,
    ClientIp(ip): ClientIp,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.username.is_empty() || req.password.is_empty() {
        return Err(ApiError::bad_request("Username and password are required"));
    }

    let user = state
        .store
        .get_user_by_username(&req.username)
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

    if !user.active {
        return Err(ApiError::forbidden(
            "Account disabled. Contact the administrator.",
        ));
    }

    let valid = state
        .passwords
        .verify(&req.password, &user.password_hash)
        .map_err(ApiError::from)?;
    if !valid {
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    let token = state.signer.issue(&user).map_err(ApiError::from)?;

    state.log_activity(user.id, ActivityAction::Login, "User logged in", ip);

    Ok(Json(ApiResponse::success_with_message(
        LoginResponse { token, user },
        "Login successful",
    )))
}

/// GET /api/auth/verify
///
/// The extractor has already validated the token and re-checked the account,
/// so this just echoes the current identity.
pub async fn verify(RequireUser(user): RequireUser) -> impl IntoResponse {
    Json(ApiResponse::success(json!({ "user": user })))
}

/// POST /api/auth/logout
///
/// Tokens are stateless and not revocable server-side; logout only records
/// the session end in the audit trail.
pub async fn logout(
    RequireUser(user): RequireUser,
    State(state): State<Arc<AppState>>,
    ClientIp(ip): ClientIp,
) -> impl IntoResponse {
    state.log_activity(user.id, ActivityAction::Logout, "User logged out", ip);
    Json(ApiResponse::message("Logout successful"))
}
