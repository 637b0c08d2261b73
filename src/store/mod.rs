//! # Store Module
//!
//! Persistence traits for users and books. The Postgres implementations live
//! on [`crate::database::DatabaseConnection`]; [`memory::MemoryStore`] backs
//! development runs and tests.

pub mod book;
pub mod memory;
pub mod user;

pub use book::BookStore;
pub use memory::MemoryStore;
pub use user::UserStore;

use thiserror::Error;

/// Store-level result type
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Kind of persistence failure, reported structurally instead of as text
#[derive(Error, Debug)]
pub enum StoreError {
    /// No row matched the lookup or the write
    #[error("record not found")]
    NotFound,

    /// The row exists but is owned by someone else
    #[error("record owned by another user")]
    NotOwner,

    /// A unique constraint rejected the write
    #[error("duplicate value violates {0}")]
    Duplicate(String),

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

impl From<tokio_postgres::Error> for StoreError {
    fn from(e: tokio_postgres::Error) -> Self {
        use tokio_postgres::error::SqlState;

        if let Some(db_error) = e.as_db_error() {
            if db_error.code() == &SqlState::UNIQUE_VIOLATION {
                let constraint = db_error.constraint().unwrap_or("unique constraint");
                return StoreError::Duplicate(constraint.to_string());
            }
        }
        StoreError::Backend(anyhow::Error::new(e).context("Database query failed"))
    }
}

impl From<deadpool_postgres::PoolError> for StoreError {
    fn from(e: deadpool_postgres::PoolError) -> Self {
        StoreError::Backend(anyhow::Error::new(e).context("Failed to get DB connection"))
    }
}
