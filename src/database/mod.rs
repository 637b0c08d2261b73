//! # Database Module
//!
//! PostgreSQL integration using tokio-postgres and deadpool.
//! Includes connection management, models, migrations, and the Postgres
//! implementations of the store traits.

pub mod books;
pub mod connection;
pub mod migrations;
pub mod models;
pub mod users;

pub use connection::{DatabaseConfig, DatabaseConnection};
