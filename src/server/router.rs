use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::{ConnectInfo, DefaultBodyLimit, FromRequestParts, Request};
use axum::http::request::Parts;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::{
    Json, Router,
    routing::{delete, get, post},
};

use super::response::ApiResponse;
use super::{activity, auth, brands, models, uploads, users};
use crate::auth::{PasswordHasher, TokenSigner};
use crate::images::ImageStore;
use crate::store::{NewActivityEntry, Store};
use crate::types::ActivityAction;

/// Uploads above this size are rejected at the body-limit layer.
const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

pub struct AppState {
    pub store: Arc<dyn Store>,
    pub images: ImageStore,
    pub signer: TokenSigner,
    pub passwords: PasswordHasher,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, images: ImageStore, signer: TokenSigner) -> Self {
        Self {
            store,
            images,
            signer,
            passwords: PasswordHasher::new(),
        }
    }

    /// Appends an audit entry. A failed append never fails the request.
    pub fn log_activity(
        &self,
        user_id: i64,
        action: ActivityAction,
        details: impl Into<String>,
        ip_address: Option<String>,
    ) {
        let entry = NewActivityEntry {
            user_id,
            action,
            details: details.into(),
            ip_address,
        };
        if let Err(e) = self.store.append_activity(&entry) {
            tracing::warn!("Failed to record {} activity: {e}", action.as_str());
        }
    }
}

/// Requester address for the audit trail: first `X-Forwarded-For` hop when
/// behind a proxy, otherwise the socket peer address.
pub struct ClientIp(pub Option<String>);

impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let forwarded = parts
            .headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let ip = forwarded.or_else(|| {
            parts
                .extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ci| ci.0.ip().to_string())
        });

        Ok(ClientIp(ip))
    }
}

async fn health() -> Json<ApiResponse<()>> {
    Json(ApiResponse::message("API is running"))
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status();

    tracing::info!(
        "{} {} {} {}ms",
        method,
        uri.path(),
        status.as_u16(),
        latency.as_millis()
    );

    response
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        // Auth
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/verify", get(auth::verify))
        .route("/api/auth/logout", post(auth::logout))
        // Brands
        .route("/api/brands", get(brands::list_brands).post(brands::create_brand))
        .route(
            "/api/brands/{id}",
            get(brands::get_brand)
                .put(brands::update_brand)
                .delete(brands::delete_brand),
        )
        .route("/api/brands/{id}/models", get(brands::list_brand_models))
        // Models
        .route("/api/models", get(models::list_models).post(models::create_model))
        .route("/api/models/search", get(models::search_models))
        .route(
            "/api/models/{id}",
            get(models::get_model)
                .put(models::update_model)
                .delete(models::delete_model),
        )
        // Users
        .route("/api/users", get(users::list_users).post(users::create_user))
        .route(
            "/api/users/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        // Image storage gateway
        .route(
            "/api/upload",
            post(uploads::upload_image).get(uploads::list_images),
        )
        .route("/api/upload/{filename}", delete(uploads::delete_image))
        .route("/uploads/{filename}", get(uploads::serve_image))
        // Audit trail
        .route("/api/activity", get(activity::list_activity))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}
