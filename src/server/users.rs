use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::auth::RequireAdmin;
use crate::server::dto::{CreateUserRequest, UpdateUserRequest};
use crate::server::response::{ApiError, ApiResponse};
use crate::server::validation::{validate_password, validate_username};
use crate::server::{AppState, ClientIp};
use crate::store::{NewUser, UserPatch};
use crate::types::ActivityAction;

pub async fn list_users(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let users = state.store.list_users()?;
    Ok(Json(ApiResponse::success(users)))
}

pub async fn get_user(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .store
        .get_user(id)?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(Json(ApiResponse::success(user)))
}

pub async fn create_user(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<Arc<AppState>>,
    ClientIp(ip): ClientIp,
    Json(req): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let username = validate_username(&req.username)?;
    validate_password(&req.password)?;

    let password_hash = state.passwords.hash(&req.password)?;

    // Username uniqueness and the single-admin rule surface as Conflict
    // from the store.
    let user = state.store.create_user(&NewUser {
        username: username.clone(),
        password_hash,
        role: req.role,
        active: req.active,
    })?;

    state.log_activity(
        admin.id,
        ActivityAction::CreateUser,
        format!("Created user: {username} ({})", req.role),
        ip,
    );

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(
            user,
            "User created successfully",
        )),
    ))
}

pub async fn update_user(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    ClientIp(ip): ClientIp,
    Json(req): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let username = match &req.username {
        Some(name) => Some(validate_username(name)?),
        None => None,
    };

    // An empty password field means "leave unchanged", matching the admin
    // form's behavior.
    let password_hash = match req.password.as_deref() {
        Some("") | None => None,
        Some(password) => {
            validate_password(password)?;
            Some(state.passwords.hash(password)?)
        }
    };

    let user = state.store.update_user(
        id,
        &UserPatch {
            username,
            password_hash,
            role: req.role,
            active: req.active,
        },
    )?;

    state.log_activity(
        admin.id,
        ActivityAction::UpdateUser,
        format!("Updated user: {}", user.username),
        ip,
    );

    Ok(Json(ApiResponse::success_with_message(
        user,
        "User updated successfully",
    )))
}

pub async fn delete_user(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    ClientIp(ip): ClientIp,
) -> Result<impl IntoResponse, ApiError> {
    if id == admin.id {
        return Err(ApiError::conflict("You cannot delete your own account"));
    }

    let user = state
        .store
        .get_user(id)?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    state.store.delete_user(id)?;

    state.log_activity(
        admin.id,
        ActivityAction::DeleteUser,
        format!("Deleted user: {} ({})", user.username, user.role),
        ip,
    );

    Ok(Json(ApiResponse::message("User deleted successfully")))
}
