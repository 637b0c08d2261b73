//! # Services Module
//!
//! Business logic for users and books. Every authenticated operation resolves
//! the caller from its credential before validating input or touching a store.

pub mod book;
pub mod user;

pub use book::BookService;
pub use user::UserService;

use crate::auth::{Credential, Principal};
use crate::error::{AppError, Result};

/// Resolve the caller or fail with `Unauthenticated`
fn authenticate(credential: &Credential) -> Result<Principal> {
    credential.resolve_identity().ok_or_else(|| {
        tracing::warn!("rejected request: no caller identity in credential");
        AppError::Unauthenticated("caller not found".to_string())
    })
}
