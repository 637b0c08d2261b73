//! Postgres-backed user store

use async_trait::async_trait;

use crate::database::DatabaseConnection;
use crate::database::models::{FromRow, NewUser, User, UserChanges};
use crate::store::{StoreError, StoreResult, UserStore};

const USER_COLUMNS: &str = "id, name, email, address, phone, password_hash, created_at, updated_at";

#[async_trait]
impl UserStore for DatabaseConnection {
    async fn insert(&self, user: &NewUser) -> StoreResult<User> {
        let client = self.pool().get().await?;
        let sql = format!(
            "INSERT INTO users (name, email, address, phone, password_hash) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {USER_COLUMNS}"
        );
        let row = client
            .query_one(
                sql.as_str(),
                &[
                    &user.name,
                    &user.email,
                    &user.address,
                    &user.phone,
                    &user.password_hash,
                ],
            )
            .await?;
        Ok(User::from_row(&row)?)
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<User> {
        let client = self.pool().get().await?;
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let row = client
            .query_opt(sql.as_str(), &[&email])
            .await?
            .ok_or(StoreError::NotFound)?;
        Ok(User::from_row(&row)?)
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<User> {
        let client = self.pool().get().await?;
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = client
            .query_opt(sql.as_str(), &[&id])
            .await?
            .ok_or(StoreError::NotFound)?;
        Ok(User::from_row(&row)?)
    }

    async fn update(&self, id: i64, changes: &UserChanges) -> StoreResult<User> {
        let client = self.pool().get().await?;
        let sql = format!(
            "UPDATE users SET \
                name = COALESCE($1, name), \
                email = COALESCE($2, email), \
                address = COALESCE($3, address), \
                phone = COALESCE($4, phone), \
                password_hash = COALESCE($5, password_hash), \
                updated_at = NOW() \
             WHERE id = $6 RETURNING {USER_COLUMNS}"
        );
        let row = client
            .query_opt(
                sql.as_str(),
                &[
                    &changes.name,
                    &changes.email,
                    &changes.address,
                    &changes.phone,
                    &changes.password_hash,
                    &id,
                ],
            )
            .await?;

        match row {
            Some(row) => Ok(User::from_row(&row)?),
            None => {
                tracing::debug!("update matched no user with id {}", id);
                Err(StoreError::NotFound)
            }
        }
    }

    async fn delete(&self, id: i64) -> StoreResult<()> {
        let client = self.pool().get().await?;
        let affected = client
            .execute("DELETE FROM users WHERE id = $1", &[&id])
            .await?;

        if affected == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
