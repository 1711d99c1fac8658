use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;

use crate::error::Error;

/// Standard response envelope: `{success, data?, message?}` on every endpoint.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    #[must_use]
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    #[must_use]
    pub fn success_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
        }
    }
}

impl ApiResponse<()> {
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
        }
    }
}

/// API error that converts to a proper HTTP response in the envelope shape.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({ "success": false, "message": self.message });
        (self.status, Json(body)).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        match e {
            Error::Validation(msg) => ApiError::bad_request(msg),
            Error::InvalidCredentials => ApiError::unauthorized("Invalid credentials"),
            Error::Unauthorized => ApiError::unauthorized("Authentication required"),
            Error::AccountDisabled => ApiError::forbidden("Account disabled"),
            Error::Forbidden => ApiError::forbidden("Forbidden"),
            Error::InvalidToken => ApiError::forbidden("Invalid token"),
            Error::TokenExpired => ApiError::forbidden("Token expired"),
            Error::NotFound => ApiError::not_found("Resource not found"),
            Error::Conflict(msg) => ApiError::conflict(msg),
            // Store and IO failures stay server-side; the client gets a
            // generic message.
            Error::Database(e) => {
                tracing::error!("Database error: {e}");
                ApiError::internal("Internal server error")
            }
            Error::Io(e) => {
                tracing::error!("IO error: {e}");
                ApiError::internal("Internal server error")
            }
            Error::Config(e) => {
                tracing::error!("Configuration error: {e}");
                ApiError::internal("Internal server error")
            }
        }
    }
}
