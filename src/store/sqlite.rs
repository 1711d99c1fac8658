use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};

use super::schema::SCHEMA;
use super::{ModelOrder, ModelPatch, NewActivityEntry, NewModel, NewUser, Store, UserPatch};
use crate::error::{Error, Result};
use crate::types::*;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // Handle SQLite's default datetime format: "YYYY-MM-DD HH:MM:SS"
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            tracing::error!("Invalid datetime in database: '{}' - {}", s, e);
            Utc::now()
        })
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn column_parse_err(
    index: usize,
    err: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(index, rusqlite::types::Type::Text, err.into())
}

/// Maps a SQLite constraint violation to the domain `Conflict` error; unique
/// indexes in the schema are the authoritative uniqueness check.
fn conflict_on_constraint(e: rusqlite::Error, message: &str) -> Error {
    match &e {
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Error::Conflict(message.to_string())
        }
        _ => Error::Database(e),
    }
}

fn user_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        password_hash: row.get(2)?,
        role: row
            .get::<_, String>(3)?
            .parse()
            .map_err(|e: String| column_parse_err(3, e))?,
        active: row.get(4)?,
        created_at: parse_datetime(&row.get::<_, String>(5)?),
        updated_at: parse_datetime(&row.get::<_, String>(6)?),
    })
}

const USER_COLUMNS: &str =
    "id, username, password_hash, role, active, created_at, updated_at";

fn brand_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Brand> {
    Ok(Brand {
        id: row.get(0)?,
        name: row.get(1)?,
        created_at: parse_datetime(&row.get::<_, String>(2)?),
        updated_at: parse_datetime(&row.get::<_, String>(3)?),
    })
}

fn model_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Model> {
    Ok(Model {
        id: row.get(0)?,
        brand_id: row.get(1)?,
        name: row.get(2)?,
        image_url: row.get(3)?,
        reset_instructions: row.get(4)?,
        possible_passwords: PasswordList::from_stored(&row.get::<_, String>(5)?),
        created_at: parse_datetime(&row.get::<_, String>(6)?),
        updated_at: parse_datetime(&row.get::<_, String>(7)?),
    })
}

fn model_with_brand_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ModelWithBrand> {
    Ok(ModelWithBrand {
        model: model_from_row(row)?,
        brand_name: row.get(8)?,
    })
}

const MODEL_JOIN: &str = "SELECT m.id, m.brand_id, m.name, m.image_url, m.reset_instructions,
            m.possible_passwords, m.created_at, m.updated_at, b.name AS brand_name
     FROM models m
     INNER JOIN brands b ON m.brand_id = b.id";

fn activity_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ActivityLogEntry> {
    Ok(ActivityLogEntry {
        id: row.get(0)?,
        user_id: row.get(1)?,
        action: row
            .get::<_, String>(2)?
            .parse()
            .map_err(|e: String| column_parse_err(2, e))?,
        details: row.get(3)?,
        ip_address: row.get(4)?,
        created_at: parse_datetime(&row.get::<_, String>(5)?),
    })
}

fn get_user_inner(conn: &Connection, id: i64) -> Result<Option<User>> {
    conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
        params![id],
        user_from_row,
    )
    .optional()
    .map_err(Error::from)
}

fn admin_exists_inner(conn: &Connection, excluding: Option<i64>) -> Result<bool> {
    let exists = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM users WHERE role = 'admin' AND id != ?1)",
        params![excluding.unwrap_or(-1)],
        |row| row.get(0),
    )?;
    Ok(exists)
}

fn get_model_inner(conn: &Connection, id: i64) -> Result<Option<ModelWithBrand>> {
    conn.query_row(
        &format!("{MODEL_JOIN} WHERE m.id = ?1"),
        params![id],
        model_with_brand_from_row,
    )
    .optional()
    .map_err(Error::from)
}

fn brand_exists_inner(conn: &Connection, id: i64) -> Result<bool> {
    let exists = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM brands WHERE id = ?1)",
        params![id],
        |row| row.get(0),
    )?;
    Ok(exists)
}

impl Store for SqliteStore {
    fn initialize(&self) -> Result<()> {
        self.conn().execute_batch(SCHEMA)?;
        Ok(())
    }

    // User operations

    fn create_user(&self, user: &NewUser) -> Result<User> {
        let conn = self.conn();

        if user.role.is_admin() && admin_exists_inner(&conn, None)? {
            return Err(Error::Conflict(
                "An administrator already exists".to_string(),
            ));
        }

        let now = format_datetime(&Utc::now());
        conn.execute(
            "INSERT INTO users (username, password_hash, role, active, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
            params![
                user.username,
                user.password_hash,
                user.role.as_str(),
                user.active,
                now,
            ],
        )
        .map_err(|e| conflict_on_constraint(e, "Username already exists"))?;

        let id = conn.last_insert_rowid();
        get_user_inner(&conn, id)?.ok_or(Error::NotFound)
    }

    fn get_user(&self, id: i64) -> Result<Option<User>> {
        get_user_inner(&self.conn(), id)
    }

    fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        // BINARY collation on username keeps the lookup case-sensitive
        self.conn()
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1"),
                params![username],
                user_from_row,
            )
            .optional()
            .map_err(Error::from)
    }

    fn list_users(&self) -> Result<Vec<User>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC, id DESC"
        ))?;
        let rows = stmt.query_map([], user_from_row)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn update_user(&self, id: i64, patch: &UserPatch) -> Result<User> {
        let conn = self.conn();
        let existing = get_user_inner(&conn, id)?.ok_or(Error::NotFound)?;

        let role = patch.role.unwrap_or(existing.role);
        if role.is_admin() && !existing.role.is_admin() && admin_exists_inner(&conn, Some(id))? {
            return Err(Error::Conflict(
                "An administrator already exists".to_string(),
            ));
        }

        let username = patch.username.as_ref().unwrap_or(&existing.username);
        let password_hash = patch
            .password_hash
            .as_ref()
            .unwrap_or(&existing.password_hash);
        let active = patch.active.unwrap_or(existing.active);

        conn.execute(
            "UPDATE users
             SET username = ?1, password_hash = ?2, role = ?3, active = ?4, updated_at = ?5
             WHERE id = ?6",
            params![
                username,
                password_hash,
                role.as_str(),
                active,
                format_datetime(&Utc::now()),
                id,
            ],
        )
        .map_err(|e| conflict_on_constraint(e, "Username already exists"))?;

        get_user_inner(&conn, id)?.ok_or(Error::NotFound)
    }

    fn delete_user(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM users WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    fn admin_exists(&self) -> Result<bool> {
        admin_exists_inner(&self.conn(), None)
    }

    // Brand operations

    fn create_brand(&self, name: &str) -> Result<Brand> {
        let conn = self.conn();
        let now = format_datetime(&Utc::now());
        conn.execute(
            "INSERT INTO brands (name, created_at, updated_at) VALUES (?1, ?2, ?2)",
            params![name, now],
        )
        .map_err(|e| conflict_on_constraint(e, "Brand already exists"))?;

        let id = conn.last_insert_rowid();
        conn.query_row(
            "SELECT id, name, created_at, updated_at FROM brands WHERE id = ?1",
            params![id],
            brand_from_row,
        )
        .map_err(Error::from)
    }

    fn get_brand(&self, id: i64) -> Result<Option<Brand>> {
        self.conn()
            .query_row(
                "SELECT id, name, created_at, updated_at FROM brands WHERE id = ?1",
                params![id],
                brand_from_row,
            )
            .optional()
            .map_err(Error::from)
    }

    fn list_brands(&self) -> Result<Vec<Brand>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare("SELECT id, name, created_at, updated_at FROM brands ORDER BY name ASC")?;
        let rows = stmt.query_map([], brand_from_row)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn update_brand(&self, id: i64, name: &str) -> Result<Brand> {
        let conn = self.conn();
        let rows = conn
            .execute(
                "UPDATE brands SET name = ?1, updated_at = ?2 WHERE id = ?3",
                params![name, format_datetime(&Utc::now()), id],
            )
            .map_err(|e| conflict_on_constraint(e, "Brand already exists"))?;

        if rows == 0 {
            return Err(Error::NotFound);
        }

        conn.query_row(
            "SELECT id, name, created_at, updated_at FROM brands WHERE id = ?1",
            params![id],
            brand_from_row,
        )
        .map_err(Error::from)
    }

    fn delete_brand(&self, id: i64) -> Result<i64> {
        let conn = self.conn();
        let model_count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM models WHERE brand_id = ?1",
            params![id],
            |row| row.get(0),
        )?;

        let rows = conn.execute("DELETE FROM brands WHERE id = ?1", params![id])?;
        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(model_count)
    }

    // Model operations

    fn create_model(&self, model: &NewModel) -> Result<ModelWithBrand> {
        let conn = self.conn();

        if !brand_exists_inner(&conn, model.brand_id)? {
            return Err(Error::NotFound);
        }

        let now = format_datetime(&Utc::now());
        conn.execute(
            "INSERT INTO models
             (brand_id, name, image_url, reset_instructions, possible_passwords, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
            params![
                model.brand_id,
                model.name,
                model.image_url,
                model.reset_instructions,
                model.possible_passwords.to_stored(),
                now,
            ],
        )
        .map_err(|e| {
            conflict_on_constraint(e, "A model with that name already exists for this brand")
        })?;

        let id = conn.last_insert_rowid();
        get_model_inner(&conn, id)?.ok_or(Error::NotFound)
    }

    fn get_model(&self, id: i64) -> Result<Option<ModelWithBrand>> {
        get_model_inner(&self.conn(), id)
    }

    fn list_models(&self, order: ModelOrder) -> Result<Vec<ModelWithBrand>> {
        let order_by = match order {
            ModelOrder::ByBrandAndName => "ORDER BY b.name ASC, m.name ASC",
            ModelOrder::Recent => "ORDER BY m.created_at DESC, m.id DESC",
        };

        let conn = self.conn();
        let mut stmt = conn.prepare(&format!("{MODEL_JOIN} {order_by}"))?;
        let rows = stmt.query_map([], model_with_brand_from_row)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn list_brand_models(&self, brand_id: i64) -> Result<Vec<Model>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, brand_id, name, image_url, reset_instructions, possible_passwords,
                    created_at, updated_at
             FROM models WHERE brand_id = ?1 ORDER BY name ASC",
        )?;
        let rows = stmt.query_map(params![brand_id], model_from_row)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn search_models(&self, query: &str) -> Result<Vec<ModelWithBrand>> {
        // LIKE on NOCASE-collated text gives the case-insensitive substring match
        let pattern = format!("%{}%", query.trim());

        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "{MODEL_JOIN} WHERE m.name LIKE ?1 OR b.name LIKE ?1
             ORDER BY b.name ASC, m.name ASC"
        ))?;
        let rows = stmt.query_map(params![pattern], model_with_brand_from_row)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn update_model(&self, id: i64, patch: &ModelPatch) -> Result<ModelWithBrand> {
        let conn = self.conn();
        let existing = get_model_inner(&conn, id)?.ok_or(Error::NotFound)?.model;

        let brand_id = patch.brand_id.unwrap_or(existing.brand_id);
        if brand_id != existing.brand_id && !brand_exists_inner(&conn, brand_id)? {
            return Err(Error::NotFound);
        }

        let name = patch.name.as_ref().unwrap_or(&existing.name);
        let image_url = match &patch.image_url {
            Some(url) if url.is_empty() => None,
            Some(url) => Some(url.clone()),
            None => existing.image_url.clone(),
        };
        let reset_instructions = patch
            .reset_instructions
            .as_ref()
            .unwrap_or(&existing.reset_instructions);
        let possible_passwords = patch
            .possible_passwords
            .as_ref()
            .unwrap_or(&existing.possible_passwords);

        conn.execute(
            "UPDATE models
             SET brand_id = ?1, name = ?2, image_url = ?3, reset_instructions = ?4,
                 possible_passwords = ?5, updated_at = ?6
             WHERE id = ?7",
            params![
                brand_id,
                name,
                image_url,
                reset_instructions,
                possible_passwords.to_stored(),
                format_datetime(&Utc::now()),
                id,
            ],
        )
        .map_err(|e| {
            conflict_on_constraint(e, "A model with that name already exists for this brand")
        })?;

        get_model_inner(&conn, id)?.ok_or(Error::NotFound)
    }

    fn delete_model(&self, id: i64) -> Result<String> {
        let conn = self.conn();
        let name: Option<String> = conn
            .query_row(
                "SELECT name FROM models WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        let name = name.ok_or(Error::NotFound)?;

        conn.execute("DELETE FROM models WHERE id = ?1", params![id])?;
        Ok(name)
    }

    fn models_using_image(&self, image_url: &str) -> Result<Vec<ModelWithBrand>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "{MODEL_JOIN} WHERE m.image_url = ?1 ORDER BY b.name ASC, m.name ASC"
        ))?;
        let rows = stmt.query_map(params![image_url], model_with_brand_from_row)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    // Activity log

    fn append_activity(&self, entry: &NewActivityEntry) -> Result<ActivityLogEntry> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO activity_logs (user_id, action, details, ip_address, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                entry.user_id,
                entry.action.as_str(),
                entry.details,
                entry.ip_address,
                format_datetime(&Utc::now()),
            ],
        )?;

        let id = conn.last_insert_rowid();
        conn.query_row(
            "SELECT id, user_id, action, details, ip_address, created_at
             FROM activity_logs WHERE id = ?1",
            params![id],
            activity_from_row,
        )
        .map_err(Error::from)
    }

    fn list_activity(&self, limit: i64) -> Result<Vec<ActivityLogEntry>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, user_id, action, details, ip_address, created_at
             FROM activity_logs ORDER BY id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit], activity_from_row)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_store() -> (TempDir, SqliteStore) {
        let temp_dir = TempDir::new().unwrap();
        let store = SqliteStore::new(temp_dir.path().join("keyrack.db")).unwrap();
        store.initialize().unwrap();
        (temp_dir, store)
    }

    fn new_user(username: &str, role: Role) -> NewUser {
        NewUser {
            username: username.to_string(),
            password_hash: "$argon2id$fake".to_string(),
            role,
            active: true,
        }
    }

    fn new_model(brand_id: i64, name: &str) -> NewModel {
        NewModel {
            brand_id,
            name: name.to_string(),
            image_url: None,
            reset_instructions: String::new(),
            possible_passwords: PasswordList::default(),
        }
    }

    #[test]
    fn test_create_and_get_user() {
        let (_dir, store) = test_store();
        let user = store.create_user(&new_user("alice", Role::User)).unwrap();

        let found = store.get_user(user.id).unwrap().unwrap();
        assert_eq!(found.username, "alice");
        assert_eq!(found.role, Role::User);
        assert!(found.active);

        assert!(store.get_user_by_username("alice").unwrap().is_some());
        // username lookups are case-sensitive
        assert!(store.get_user_by_username("Alice").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_username_conflicts() {
        let (_dir, store) = test_store();
        store.create_user(&new_user("alice", Role::User)).unwrap();

        let err = store.create_user(&new_user("alice", Role::User)).unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }

    #[test]
    fn test_single_admin_enforced_at_create() {
        let (_dir, store) = test_store();
        store.create_user(&new_user("root", Role::Admin)).unwrap();
        assert!(store.admin_exists().unwrap());

        let err = store.create_user(&new_user("root2", Role::Admin)).unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }

    #[test]
    fn test_single_admin_enforced_at_promotion() {
        let (_dir, store) = test_store();
        store.create_user(&new_user("root", Role::Admin)).unwrap();
        let user = store.create_user(&new_user("bob", Role::User)).unwrap();

        let err = store
            .update_user(
                user.id,
                &UserPatch {
                    role: Some(Role::Admin),
                    ..UserPatch::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));

        // updating the existing admin in place stays legal
        let admin = store.get_user_by_username("root").unwrap().unwrap();
        store
            .update_user(
                admin.id,
                &UserPatch {
                    username: Some("superroot".to_string()),
                    ..UserPatch::default()
                },
            )
            .unwrap();
    }

    #[test]
    fn test_user_patch_partial_semantics() {
        let (_dir, store) = test_store();
        let user = store.create_user(&new_user("carol", Role::User)).unwrap();

        let updated = store
            .update_user(
                user.id,
                &UserPatch {
                    active: Some(false),
                    ..UserPatch::default()
                },
            )
            .unwrap();
        assert_eq!(updated.username, "carol");
        assert!(!updated.active);
        assert_eq!(updated.password_hash, user.password_hash);
    }

    #[test]
    fn test_brand_name_uniqueness_is_case_insensitive() {
        let (_dir, store) = test_store();
        store.create_brand("Cisco").unwrap();

        let err = store.create_brand("cisco").unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }

    #[test]
    fn test_update_brand() {
        let (_dir, store) = test_store();
        let cisco = store.create_brand("Cisco").unwrap();
        store.create_brand("Dell").unwrap();

        let renamed = store.update_brand(cisco.id, "Cisco Systems").unwrap();
        assert_eq!(renamed.name, "Cisco Systems");

        let err = store.update_brand(cisco.id, "DELL").unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));

        let err = store.update_brand(9999, "Nokia").unwrap_err();
        assert!(matches!(err, Error::NotFound));
    }

    #[test]
    fn test_delete_brand_cascades_to_models() {
        let (_dir, store) = test_store();
        let brand = store.create_brand("Dell").unwrap();
        store.create_model(&new_model(brand.id, "Latitude 5420")).unwrap();
        store.create_model(&new_model(brand.id, "OptiPlex 7090")).unwrap();

        let removed = store.delete_brand(brand.id).unwrap();
        assert_eq!(removed, 2);
        assert!(store.list_models(ModelOrder::default()).unwrap().is_empty());

        let err = store.delete_brand(brand.id).unwrap_err();
        assert!(matches!(err, Error::NotFound));
    }

    #[test]
    fn test_model_uniqueness_scoped_to_brand() {
        let (_dir, store) = test_store();
        let dell = store.create_brand("Dell").unwrap();
        let hp = store.create_brand("HP").unwrap();

        store.create_model(&new_model(dell.id, "Latitude")).unwrap();

        let err = store.create_model(&new_model(dell.id, "LATITUDE")).unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));

        // same name under another brand is fine
        store.create_model(&new_model(hp.id, "Latitude")).unwrap();
    }

    #[test]
    fn test_create_model_requires_brand() {
        let (_dir, store) = test_store();
        let err = store.create_model(&new_model(42, "Ghost")).unwrap_err();
        assert!(matches!(err, Error::NotFound));
    }

    #[test]
    fn test_search_matches_brand_name() {
        let (_dir, store) = test_store();
        let cisco = store.create_brand("Cisco").unwrap();
        let dell = store.create_brand("Dell").unwrap();
        store.create_model(&new_model(cisco.id, "Catalyst 2960")).unwrap();
        store.create_model(&new_model(cisco.id, "ISR 4321")).unwrap();
        store.create_model(&new_model(dell.id, "Latitude 5420")).unwrap();

        // brand-only match returns every model under that brand
        let hits = store.search_models("cisco").unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|m| m.brand_name == "Cisco"));

        let hits = store.search_models("latitude").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].brand_name, "Dell");
    }

    #[test]
    fn test_list_models_orderings() {
        let (_dir, store) = test_store();
        let zyxel = store.create_brand("Zyxel").unwrap();
        let asus = store.create_brand("Asus").unwrap();
        store.create_model(&new_model(zyxel.id, "NBG6615")).unwrap();
        store.create_model(&new_model(asus.id, "RT-AC68U")).unwrap();

        let alphabetical = store.list_models(ModelOrder::ByBrandAndName).unwrap();
        assert_eq!(alphabetical[0].brand_name, "Asus");

        let recent = store.list_models(ModelOrder::Recent).unwrap();
        assert_eq!(recent[0].brand_name, "Asus"); // inserted last
        assert_eq!(recent[1].brand_name, "Zyxel");
    }

    #[test]
    fn test_model_patch_semantics() {
        let (_dir, store) = test_store();
        let brand = store.create_brand("Dell").unwrap();
        let created = store
            .create_model(&NewModel {
                image_url: Some("/uploads/a.png".to_string()),
                reset_instructions: "Hold reset for 10s".to_string(),
                ..new_model(brand.id, "Latitude")
            })
            .unwrap();

        // rename only; everything else untouched
        let updated = store
            .update_model(
                created.model.id,
                &ModelPatch {
                    name: Some("Latitude 5420".to_string()),
                    ..ModelPatch::default()
                },
            )
            .unwrap();
        assert_eq!(updated.model.name, "Latitude 5420");
        assert_eq!(updated.model.image_url.as_deref(), Some("/uploads/a.png"));
        assert_eq!(updated.model.reset_instructions, "Hold reset for 10s");

        // empty image_url clears the reference
        let updated = store
            .update_model(
                created.model.id,
                &ModelPatch {
                    image_url: Some(String::new()),
                    ..ModelPatch::default()
                },
            )
            .unwrap();
        assert!(updated.model.image_url.is_none());

        // moving to a nonexistent brand fails
        let err = store
            .update_model(
                created.model.id,
                &ModelPatch {
                    brand_id: Some(404),
                    ..ModelPatch::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, Error::NotFound));
    }

    #[test]
    fn test_models_using_image() {
        let (_dir, store) = test_store();
        let brand = store.create_brand("Dell").unwrap();
        store
            .create_model(&NewModel {
                image_url: Some("/uploads/shared.png".to_string()),
                ..new_model(brand.id, "Latitude")
            })
            .unwrap();

        let users = store.models_using_image("/uploads/shared.png").unwrap();
        assert_eq!(users.len(), 1);
        assert!(store.models_using_image("/uploads/other.png").unwrap().is_empty());
    }

    #[test]
    fn test_activity_append_and_list() {
        let (_dir, store) = test_store();
        for action in [ActivityAction::Login, ActivityAction::CreateBrand] {
            store
                .append_activity(&NewActivityEntry {
                    user_id: 1,
                    action,
                    details: "test".to_string(),
                    ip_address: Some("127.0.0.1".to_string()),
                })
                .unwrap();
        }

        let entries = store.list_activity(10).unwrap();
        assert_eq!(entries.len(), 2);
        // newest first
        assert_eq!(entries[0].action, ActivityAction::CreateBrand);
        assert_eq!(entries[1].action, ActivityAction::Login);
    }

    #[test]
    fn test_password_list_stored_canonically() {
        let (_dir, store) = test_store();
        let brand = store.create_brand("Dell").unwrap();
        let created = store
            .create_model(&NewModel {
                possible_passwords: PasswordList::new(vec!["admin".into(), "0000".into()]),
                ..new_model(brand.id, "Latitude")
            })
            .unwrap();

        let fetched = store.get_model(created.model.id).unwrap().unwrap();
        assert_eq!(
            fetched.model.possible_passwords.to_stored(),
            r#"["admin","0000"]"#
        );
    }
}
