//! Book business logic

use std::sync::Arc;
use validator::Validate;

use crate::auth::Credential;
use crate::database::models::{Book, BookChanges, BookInput};
use crate::error::{AppError, Result};
use crate::services::authenticate;
use crate::store::BookStore;

pub struct BookService {
    store: Arc<dyn BookStore>,
}

impl BookService {
    pub fn new(store: Arc<dyn BookStore>) -> Self {
        Self { store }
    }

    /// Add a book owned by the caller; any `user_id` in the input is ignored
    pub async fn add(&self, credential: &Credential, input: BookInput) -> Result<Book> {
        let principal = authenticate(credential)?;
        input.validate()?;

        if let Some(claimed) = input.user_id.filter(|id| *id != principal.user_id()) {
            tracing::debug!(
                "ignoring owner {} supplied by user {}",
                claimed,
                principal.user_id()
            );
        }
        let new_book = input
            .into_new_book()
            .ok_or_else(|| AppError::InvalidInput("title, year and author are required".into()))?;

        let mut book = self
            .store
            .add(principal.user_id(), &new_book)
            .await
            .map_err(|e| AppError::from_store(e, "book"))?;
        book.user_id = principal.user_id();
        Ok(book)
    }

    pub async fn update(
        &self,
        credential: &Credential,
        book_id: i64,
        changes: BookChanges,
    ) -> Result<Book> {
        let principal = authenticate(credential)?;
        let changes = changes.without_blanks();

        let mut book = self
            .store
            .update(principal.user_id(), book_id, &changes)
            .await
            .map_err(|e| AppError::from_store(e, "book"))?;
        book.id = book_id;
        book.user_id = principal.user_id();
        Ok(book)
    }

    pub async fn delete(&self, credential: &Credential, book_id: i64) -> Result<()> {
        let principal = authenticate(credential)?;

        self.store
            .delete(principal.user_id(), book_id)
            .await
            .map_err(|e| AppError::from_store(e, "book"))
    }
}
