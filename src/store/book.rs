//! Book store
//!
//! Mutations take the caller's user id and enforce ownership themselves: the
//! lookup, the owner comparison and the write happen atomically, so a book
//! cannot change hands between the check and the write.

use async_trait::async_trait;

use crate::database::models::{Book, BookChanges, NewBook};
use crate::store::StoreResult;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookStore: Send + Sync {
    /// Insert a book owned by `owner`
    async fn add(&self, owner: i64, book: &NewBook) -> StoreResult<Book>;
    /// `NotFound` if the book is absent, `NotOwner` if `owner` does not own it
    async fn update(&self, owner: i64, book_id: i64, changes: &BookChanges) -> StoreResult<Book>;
    /// Same checks as [`BookStore::update`]
    async fn delete(&self, owner: i64, book_id: i64) -> StoreResult<()>;
}
