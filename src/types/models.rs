use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }

    #[must_use]
    pub fn is_admin(self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            other => Err(format!("invalid role: {other}")),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip)]
    pub password_hash: String,
    pub role: Role,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Brand {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Model {
    pub id: i64,
    pub brand_id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub reset_instructions: String,
    pub possible_passwords: PasswordList,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A model joined with its brand's name, as returned by list/search endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct ModelWithBrand {
    #[serde(flatten)]
    pub model: Model,
    pub brand_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityAction {
    CreateUser,
    UpdateUser,
    DeleteUser,
    CreateBrand,
    UpdateBrand,
    DeleteBrand,
    CreateModel,
    UpdateModel,
    DeleteModel,
    UploadImage,
    DeleteImage,
    Login,
    Logout,
}

impl ActivityAction {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ActivityAction::CreateUser => "CREATE_USER",
            ActivityAction::UpdateUser => "UPDATE_USER",
            ActivityAction::DeleteUser => "DELETE_USER",
            ActivityAction::CreateBrand => "CREATE_BRAND",
            ActivityAction::UpdateBrand => "UPDATE_BRAND",
            ActivityAction::DeleteBrand => "DELETE_BRAND",
            ActivityAction::CreateModel => "CREATE_MODEL",
            ActivityAction::UpdateModel => "UPDATE_MODEL",
            ActivityAction::DeleteModel => "DELETE_MODEL",
            ActivityAction::UploadImage => "UPLOAD_IMAGE",
            ActivityAction::DeleteImage => "DELETE_IMAGE",
            ActivityAction::Login => "LOGIN",
            ActivityAction::Logout => "LOGOUT",
        }
    }
}

impl FromStr for ActivityAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREATE_USER" => Ok(ActivityAction::CreateUser),
            "UPDATE_USER" => Ok(ActivityAction::UpdateUser),
            "DELETE_USER" => Ok(ActivityAction::DeleteUser),
            "CREATE_BRAND" => Ok(ActivityAction::CreateBrand),
            "UPDATE_BRAND" => Ok(ActivityAction::UpdateBrand),
            "DELETE_BRAND" => Ok(ActivityAction::DeleteBrand),
            "CREATE_MODEL" => Ok(ActivityAction::CreateModel),
            "UPDATE_MODEL" => Ok(ActivityAction::UpdateModel),
            "DELETE_MODEL" => Ok(ActivityAction::DeleteModel),
            "UPLOAD_IMAGE" => Ok(ActivityAction::UploadImage),
            "DELETE_IMAGE" => Ok(ActivityAction::DeleteImage),
            "LOGIN" => Ok(ActivityAction::Login),
            "LOGOUT" => Ok(ActivityAction::Logout),
            other => Err(format!("invalid activity action: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ActivityLogEntry {
    pub id: i64,
    pub user_id: i64,
    pub action: ActivityAction,
    pub details: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Candidate default passwords for a model, always held in canonical form:
/// an ordered list of strings.
///
/// Clients may submit the list as a native JSON array, a JSON-encoded array
/// string, or a bare comma-separated string; deserialization normalizes all
/// three. Stored values that fail to parse as a JSON array are read back as a
/// single-element list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PasswordList(pub Vec<String>);

impl PasswordList {
    #[must_use]
    pub fn new(passwords: Vec<String>) -> Self {
        Self(passwords)
    }

    /// Parses the stored column value, tolerating legacy plain strings.
    #[must_use]
    pub fn from_stored(raw: &str) -> Self {
        if raw.trim().is_empty() {
            return Self(Vec::new());
        }
        match serde_json::from_str::<Vec<String>>(raw) {
            Ok(list) => Self(list),
            Err(_) => Self(vec![raw.to_string()]),
        }
    }

    /// Canonical serialized form for storage: a JSON array of strings.
    #[must_use]
    pub fn to_stored(&self) -> String {
        serde_json::to_string(&self.0).unwrap_or_else(|_| "[]".to_string())
    }

    fn from_string_input(s: &str) -> Self {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Self(Vec::new());
        }
        if let Ok(list) = serde_json::from_str::<Vec<String>>(trimmed) {
            return Self(list);
        }
        Self(
            trimmed
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(String::from)
                .collect(),
        )
    }
}

impl<'de> Deserialize<'de> for PasswordList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        match value {
            serde_json::Value::Null => Ok(Self(Vec::new())),
            serde_json::Value::String(s) => Ok(Self::from_string_input(&s)),
            serde_json::Value::Array(items) => {
                let mut passwords = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        serde_json::Value::String(s) => passwords.push(s),
                        other => {
                            return Err(de::Error::custom(format!(
                                "possible_passwords entries must be strings, got {other}"
                            )));
                        }
                    }
                }
                Ok(Self(passwords))
            }
            other => Err(de::Error::custom(format!(
                "possible_passwords must be an array or string, got {other}"
            ))),
        }
    }
}
