//! # Keyrack
//!
//! A password-recovery catalog for network equipment, usable both as a
//! standalone binary and as a library.
//!
//! ## Library Usage
//!
//! ```toml
//! [dependencies]
//! keyrack = { version = "0.1", default-features = false }
//! ```
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use std::path::PathBuf;
//! use keyrack::auth::TokenSigner;
//! use keyrack::images::ImageStore;
//! use keyrack::server::{AppState, create_router};
//! use keyrack::store::{SqliteStore, Store};
//!
//! let store = SqliteStore::new(&PathBuf::from("./data/keyrack.db")).unwrap();
//! store.initialize().unwrap();
//!
//! let state = Arc::new(AppState::new(
//!     Arc::new(store),
//!     ImageStore::new(&PathBuf::from("./data")),
//!     TokenSigner::new("secret", 24),
//! ));
//! let router = create_router(state);
//! // Serve with axum...
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): Includes the binary's CLI. Disable with `default-features = false`.

pub mod auth;
pub mod config;
pub mod error;
pub mod images;
pub mod server;
pub mod store;
pub mod types;
