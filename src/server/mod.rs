mod activity;
mod auth;
mod brands;
mod models;
pub mod dto;
pub mod response;
mod router;
mod uploads;
mod users;
pub mod validation;

pub use router::{AppState, ClientIp, create_router};
