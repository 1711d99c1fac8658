mod schema;
mod sqlite;

pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::types::*;

/// Fields for inserting a user. The hash is produced by the caller; the store
/// never sees a plaintext password.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub active: bool,
}

/// Partial update for a user: absent fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub username: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<Role>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct NewModel {
    pub brand_id: i64,
    pub name: String,
    pub image_url: Option<String>,
    pub reset_instructions: String,
    pub possible_passwords: PasswordList,
}

/// Partial update for a model. An empty `image_url` clears the reference.
#[derive(Debug, Clone, Default)]
pub struct ModelPatch {
    pub brand_id: Option<i64>,
    pub name: Option<String>,
    pub image_url: Option<String>,
    pub reset_instructions: Option<String>,
    pub possible_passwords: Option<PasswordList>,
}

/// Listing order for the joined model view: the admin list reads
/// alphabetically, the dashboard reads newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelOrder {
    #[default]
    ByBrandAndName,
    Recent,
}

#[derive(Debug, Clone)]
pub struct NewActivityEntry {
    pub user_id: i64,
    pub action: ActivityAction,
    pub details: String,
    pub ip_address: Option<String>,
}

/// Store defines the database interface.
pub trait Store: Send + Sync {
    fn initialize(&self) -> Result<()>;

    // User operations. Username uniqueness and the single-admin invariant are
    // enforced here so the API and the bootstrap path share them.
    fn create_user(&self, user: &NewUser) -> Result<User>;
    fn get_user(&self, id: i64) -> Result<Option<User>>;
    fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
    fn list_users(&self) -> Result<Vec<User>>;
    fn update_user(&self, id: i64, patch: &UserPatch) -> Result<User>;
    fn delete_user(&self, id: i64) -> Result<bool>;
    fn admin_exists(&self) -> Result<bool>;

    // Brand operations
    fn create_brand(&self, name: &str) -> Result<Brand>;
    fn get_brand(&self, id: i64) -> Result<Option<Brand>>;
    fn list_brands(&self) -> Result<Vec<Brand>>;
    fn update_brand(&self, id: i64, name: &str) -> Result<Brand>;
    /// Deletes a brand and (via cascade) its models. Returns the number of
    /// models removed, or `Error::NotFound` if the brand is absent.
    fn delete_brand(&self, id: i64) -> Result<i64>;

    // Model operations
    fn create_model(&self, model: &NewModel) -> Result<ModelWithBrand>;
    fn get_model(&self, id: i64) -> Result<Option<ModelWithBrand>>;
    fn list_models(&self, order: ModelOrder) -> Result<Vec<ModelWithBrand>>;
    fn list_brand_models(&self, brand_id: i64) -> Result<Vec<Model>>;
    fn search_models(&self, query: &str) -> Result<Vec<ModelWithBrand>>;
    fn update_model(&self, id: i64, patch: &ModelPatch) -> Result<ModelWithBrand>;
    /// Returns the deleted model's name, or `Error::NotFound`.
    fn delete_model(&self, id: i64) -> Result<String>;
    /// Models whose image_url points at the given URL.
    fn models_using_image(&self, image_url: &str) -> Result<Vec<ModelWithBrand>>;

    // Activity log (append-only)
    fn append_activity(&self, entry: &NewActivityEntry) -> Result<ActivityLogEntry>;
    fn list_activity(&self, limit: i64) -> Result<Vec<ActivityLogEntry>>;
}
