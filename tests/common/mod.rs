use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use keyrack::auth::{PasswordHasher, TokenSigner};
use keyrack::images::ImageStore;
use keyrack::server::{AppState, create_router};
use keyrack::store::{NewUser, SqliteStore, Store};
use keyrack::types::Role;

pub const ADMIN_PASSWORD: &str = "root-password";
pub const VIEWER_PASSWORD: &str = "viewer-password";

/// An in-process app over a fresh temp database, seeded with an admin
/// ("root") and a regular user ("viewer").
pub struct TestApp {
    pub router: Router,
    pub store: Arc<SqliteStore>,
    pub temp_dir: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("create temp dir");
        let store = Arc::new(SqliteStore::new(temp_dir.path().join("keyrack.db")).expect("open db"));
        store.initialize().expect("initialize schema");

        let hasher = PasswordHasher::new();
        store
            .create_user(&NewUser {
                username: "root".to_string(),
                password_hash: hasher.hash(ADMIN_PASSWORD).expect("hash"),
                role: Role::Admin,
                active: true,
            })
            .expect("seed admin");
        store
            .create_user(&NewUser {
                username: "viewer".to_string(),
                password_hash: hasher.hash(VIEWER_PASSWORD).expect("hash"),
                role: Role::User,
                active: true,
            })
            .expect("seed viewer");

        let state = Arc::new(AppState::new(
            store.clone(),
            ImageStore::new(temp_dir.path()),
            TokenSigner::new("test-secret", 24),
        ));

        Self {
            router: create_router(state),
            store,
            temp_dir,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let response = self.raw_request(method, uri, token, body).await;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("parse body")
        };
        (status, json)
    }

    pub async fn raw_request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("build request");

        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("send request")
    }

    pub async fn login(&self, username: &str, password: &str) -> String {
        let (status, body) = self
            .request(
                Method::POST,
                "/api/auth/login",
                None,
                Some(serde_json::json!({"username": username, "password": password})),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["data"]["token"]
            .as_str()
            .expect("token in login response")
            .to_string()
    }

    pub async fn admin_token(&self) -> String {
        self.login("root", ADMIN_PASSWORD).await
    }

    pub async fn viewer_token(&self) -> String {
        self.login("viewer", VIEWER_PASSWORD).await
    }

    /// Creates a brand via the API and returns its id.
    pub async fn create_brand(&self, token: &str, name: &str) -> i64 {
        let (status, body) = self
            .request(
                Method::POST,
                "/api/brands",
                Some(token),
                Some(serde_json::json!({"name": name})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create brand failed: {body}");
        body["data"]["id"].as_i64().expect("brand id")
    }

    /// Creates a model via the API and returns its id.
    pub async fn create_model(&self, token: &str, brand_id: i64, name: &str) -> i64 {
        let (status, body) = self
            .request(
                Method::POST,
                "/api/models",
                Some(token),
                Some(serde_json::json!({"brand_id": brand_id, "name": name})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create model failed: {body}");
        body["data"]["id"].as_i64().expect("model id")
    }
}
