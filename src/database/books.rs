//! Postgres-backed book store
//!
//! Ownership-checked mutations lock the row with `SELECT ... FOR UPDATE`
//! inside a transaction, so the owner cannot change between check and write.

use async_trait::async_trait;

use crate::database::DatabaseConnection;
use crate::database::models::{Book, BookChanges, FromRow, NewBook};
use crate::store::{BookStore, StoreError, StoreResult};

const BOOK_COLUMNS: &str = "id, title, year, author, user_id, created_at, updated_at";

/// Fail unless `owner` owns the locked row
async fn lock_owned(
    tx: &deadpool_postgres::Transaction<'_>,
    owner: i64,
    book_id: i64,
) -> StoreResult<()> {
    let row = tx
        .query_opt("SELECT user_id FROM books WHERE id = $1 FOR UPDATE", &[&book_id])
        .await?
        .ok_or(StoreError::NotFound)?;

    let stored_owner: i64 = row.try_get("user_id")?;
    if stored_owner != owner {
        tracing::warn!(
            "user {} attempted to modify book {} owned by {}",
            owner,
            book_id,
            stored_owner
        );
        return Err(StoreError::NotOwner);
    }
    Ok(())
}

#[async_trait]
impl BookStore for DatabaseConnection {
    async fn add(&self, owner: i64, book: &NewBook) -> StoreResult<Book> {
        let client = self.pool().get().await?;
        let sql = format!(
            "INSERT INTO books (title, year, author, user_id) \
             VALUES ($1, $2, $3, $4) RETURNING {BOOK_COLUMNS}"
        );
        let row = client
            .query_one(
                sql.as_str(),
                &[&book.title, &book.year, &book.author, &owner],
            )
            .await?;
        Ok(Book::from_row(&row)?)
    }

    async fn update(&self, owner: i64, book_id: i64, changes: &BookChanges) -> StoreResult<Book> {
        let mut client = self.pool().get().await?;
        let tx = client.transaction().await?;

        lock_owned(&tx, owner, book_id).await?;

        let sql = format!(
            "UPDATE books SET \
                title = COALESCE($1, title), \
                year = COALESCE($2, year), \
                author = COALESCE($3, author), \
                updated_at = NOW() \
             WHERE id = $4 RETURNING {BOOK_COLUMNS}"
        );
        let row = tx
            .query_opt(
                sql.as_str(),
                &[&changes.title, &changes.year, &changes.author, &book_id],
            )
            .await?
            .ok_or(StoreError::NotFound)?;
        let book = Book::from_row(&row)?;

        tx.commit().await?;
        Ok(book)
    }

    async fn delete(&self, owner: i64, book_id: i64) -> StoreResult<()> {
        let mut client = self.pool().get().await?;
        let tx = client.transaction().await?;

        lock_owned(&tx, owner, book_id).await?;

        let affected = tx
            .execute("DELETE FROM books WHERE id = $1", &[&book_id])
            .await?;
        if affected == 0 {
            return Err(StoreError::NotFound);
        }

        tx.commit().await?;
        Ok(())
    }
}
