//! # Error Module
//!
//! Domain error taxonomy returned by the service layer and rendered by the
//! HTTP layer. Store failures arrive as [`StoreError`] and are classified here
//! so raw persistence messages never reach a client.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::store::StoreError;

/// Service-level result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Classified failure of a service operation
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Classify a store failure for the named resource ("user", "book").
    pub fn from_store(err: StoreError, resource: &str) -> Self {
        match err {
            StoreError::NotFound => AppError::NotFound(format!("{resource} not found")),
            StoreError::NotOwner => {
                AppError::Forbidden(format!("{resource} belongs to another user"))
            }
            StoreError::Duplicate(constraint) => {
                tracing::debug!("unique constraint violated: {}", constraint);
                AppError::AlreadyExists(format!("{resource} already exists"))
            }
            StoreError::Backend(e) => AppError::Internal(e),
        }
    }

    /// Short machine-readable kind, used as the `error` field of responses.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Unauthenticated(_) => "unauthenticated",
            AppError::Forbidden(_) => "forbidden",
            AppError::InvalidInput(_) => "invalid_input",
            AppError::NotFound(_) => "not_found",
            AppError::AlreadyExists(_) => "already_exists",
            AppError::Internal(_) => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::AlreadyExists(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match &self {
            AppError::Unauthenticated(msg)
            | AppError::Forbidden(msg)
            | AppError::InvalidInput(msg)
            | AppError::NotFound(msg)
            | AppError::AlreadyExists(msg) => msg.clone(),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {:?}", e);
                "there is a problem with the server".to_string()
            }
        };

        let body = Json(ErrorResponse {
            error: self.kind(),
            message,
        });

        (self.status(), body).into_response()
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .keys()
            .map(|field| field.to_string())
            .collect();
        fields.sort();
        AppError::InvalidInput(format!("missing or empty field(s): {}", fields.join(", ")))
    }
}

// Extractor rejections carry parser details; only a fixed message is returned.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!("rejected request body: {}", rejection.body_text());
        let message = match rejection {
            JsonRejection::JsonDataError(_) => "request body has missing or mistyped fields",
            JsonRejection::JsonSyntaxError(_) => "request body is not valid JSON",
            JsonRejection::MissingJsonContentType(_) => "expected an application/json request body",
            _ => "request body could not be read",
        };
        AppError::InvalidInput(message.to_string())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!("rejected path: {}", rejection.body_text());
        AppError::InvalidInput("invalid path parameter".to_string())
    }
}
