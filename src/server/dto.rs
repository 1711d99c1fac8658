use serde::{Deserialize, Serialize};

use crate::types::{PasswordList, Role, User};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub role: Role,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct BrandRequest {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct BrandDeleted {
    pub models_removed: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateModelRequest {
    pub brand_id: i64,
    pub name: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub reset_instructions: Option<String>,
    #[serde(default)]
    pub possible_passwords: Option<PasswordList>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateModelRequest {
    #[serde(default)]
    pub brand_id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub reset_instructions: Option<String>,
    #[serde(default)]
    pub possible_passwords: Option<PasswordList>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListModelsParams {
    #[serde(default)]
    pub order: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ActivityParams {
    #[serde(default)]
    pub limit: Option<i64>,
}
