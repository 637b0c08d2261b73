//! User store

use async_trait::async_trait;

use crate::database::models::{NewUser, User, UserChanges};
use crate::store::StoreResult;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user; `Duplicate` when the email is already registered
    async fn insert(&self, user: &NewUser) -> StoreResult<User>;
    async fn find_by_email(&self, email: &str) -> StoreResult<User>;
    async fn find_by_id(&self, id: i64) -> StoreResult<User>;
    /// Apply a partial update; `NotFound` when no row has this id
    async fn update(&self, id: i64, changes: &UserChanges) -> StoreResult<User>;
    /// Hard delete; `NotFound` when nothing was removed
    async fn delete(&self, id: i64) -> StoreResult<()>;
}
