//! In-memory store
//!
//! Implements both store traits over concurrent maps. Email uniqueness and
//! book ownership checks are made while holding the entry's shard lock.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::{DashMap, mapref::entry::Entry};
use std::sync::atomic::{AtomicI64, Ordering};

use crate::database::models::{Book, BookChanges, NewBook, NewUser, User, UserChanges};
use crate::store::{BookStore, StoreError, StoreResult, UserStore};

#[derive(Debug, Default)]
pub struct MemoryStore {
    users: DashMap<i64, User>,
    /// email -> user id
    emails: DashMap<String, i64>,
    books: DashMap<i64, Book>,
    user_seq: AtomicI64,
    book_seq: AtomicI64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_user_id(&self) -> i64 {
        self.user_seq.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn next_book_id(&self) -> i64 {
        self.book_seq.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Current state of a book, if present
    #[cfg(test)]
    pub fn book(&self, id: i64) -> Option<Book> {
        self.books.get(&id).map(|book| book.clone())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert(&self, user: &NewUser) -> StoreResult<User> {
        let id = self.next_user_id();
        // Claim the email first; the emails lock is released before touching users.
        match self.emails.entry(user.email.clone()) {
            Entry::Occupied(_) => return Err(StoreError::Duplicate("users_email_key".into())),
            Entry::Vacant(slot) => {
                slot.insert(id);
            }
        }

        let now = Utc::now();
        let created = User {
            id,
            name: user.name.clone(),
            email: user.email.clone(),
            address: user.address.clone(),
            phone: user.phone.clone(),
            password_hash: user.password_hash.clone(),
            created_at: now,
            updated_at: now,
        };
        self.users.insert(id, created.clone());

        Ok(created)
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<User> {
        let id = self.emails.get(email).map(|id| *id).ok_or(StoreError::NotFound)?;
        self.find_by_id(id).await
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<User> {
        self.users
            .get(&id)
            .map(|user| user.clone())
            .ok_or(StoreError::NotFound)
    }

    async fn update(&self, id: i64, changes: &UserChanges) -> StoreResult<User> {
        let mut user = self.users.get_mut(&id).ok_or(StoreError::NotFound)?;

        if let Some(email) = changes.email.as_ref().filter(|email| **email != user.email) {
            match self.emails.entry(email.clone()) {
                Entry::Occupied(_) => {
                    return Err(StoreError::Duplicate("users_email_key".into()));
                }
                Entry::Vacant(slot) => {
                    slot.insert(id);
                }
            }
            self.emails.remove(&user.email);
            user.email = email.clone();
        }
        if let Some(name) = &changes.name {
            user.name = name.clone();
        }
        if let Some(address) = &changes.address {
            user.address = address.clone();
        }
        if let Some(phone) = &changes.phone {
            user.phone = phone.clone();
        }
        if let Some(password_hash) = &changes.password_hash {
            user.password_hash = password_hash.clone();
        }
        user.updated_at = Utc::now();

        Ok(user.clone())
    }

    async fn delete(&self, id: i64) -> StoreResult<()> {
        let (_, user) = self.users.remove(&id).ok_or(StoreError::NotFound)?;
        self.emails.remove(&user.email);
        Ok(())
    }
}

#[async_trait]
impl BookStore for MemoryStore {
    async fn add(&self, owner: i64, book: &NewBook) -> StoreResult<Book> {
        let now = Utc::now();
        let created = Book {
            id: self.next_book_id(),
            title: book.title.clone(),
            year: book.year,
            author: book.author.clone(),
            user_id: owner,
            created_at: now,
            updated_at: now,
        };
        self.books.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update(&self, owner: i64, book_id: i64, changes: &BookChanges) -> StoreResult<Book> {
        let mut book = self.books.get_mut(&book_id).ok_or(StoreError::NotFound)?;
        if book.user_id != owner {
            return Err(StoreError::NotOwner);
        }

        if let Some(title) = &changes.title {
            book.title = title.clone();
        }
        if let Some(year) = changes.year {
            book.year = year;
        }
        if let Some(author) = &changes.author {
            book.author = author.clone();
        }
        book.updated_at = Utc::now();

        Ok(book.clone())
    }

    async fn delete(&self, owner: i64, book_id: i64) -> StoreResult<()> {
        match self.books.entry(book_id) {
            Entry::Vacant(_) => Err(StoreError::NotFound),
            Entry::Occupied(entry) if entry.get().user_id != owner => Err(StoreError::NotOwner),
            Entry::Occupied(entry) => {
                entry.remove();
                Ok(())
            }
        }
    }
}
