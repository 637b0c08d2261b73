//! # Authentication Module
//!
//! Token issuance and parsing, identity resolution, password hashing, and the
//! middleware that guards authenticated routes.

pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;

pub use jwt::JwtService;
pub use models::{Credential, Principal};
pub use password::PasswordService;
