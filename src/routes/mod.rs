// # Routes Module
//
// - HTTP route handlers for the book catalog server.
// - Handlers bind the request, hand the credential attached by the auth
//   middleware to a service, and wrap the result in `ApiResponse`.
//
// ## Available Route Modules
// - `health`: liveness and store health
// - `auth`: registration and login
// - `users`: profile of the authenticated user
// - `books`: books owned by the authenticated user

use serde::Serialize;

/// Health check and monitoring endpoints
pub mod health;

/// Registration and login
pub mod auth;

/// Profile endpoints
pub mod users;

/// Book endpoints
pub mod books;

/// Success envelope shared by all handlers
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(message: &str, data: T) -> Self {
        Self {
            message: message.to_string(),
            data: Some(data),
            token: None,
        }
    }

    pub fn with_token(mut self, token: String) -> Self {
        self.token = Some(token);
        self
    }
}

impl ApiResponse<()> {
    pub fn message(message: &str) -> Self {
        Self {
            message: message.to_string(),
            data: None,
            token: None,
        }
    }
}
