// Database Models
//
// Users and books as stored, the write models handed to the stores, and the
// request payloads the services validate before building them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;
use validator::Validate;

/// Trait for converting from tokio-postgres Row
pub trait FromRow {
    fn from_row(row: &Row) -> Result<Self, tokio_postgres::Error>
    where
        Self: Sized;
}

// ============================================================================
// USERS
// ============================================================================

/// Registered user account
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub address: String,
    pub phone: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FromRow for User {
    fn from_row(row: &Row) -> Result<Self, tokio_postgres::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            address: row.try_get("address")?,
            phone: row.try_get("phone")?,
            password_hash: row.try_get("password_hash")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// User row to insert; the password is already hashed
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub address: String,
    pub phone: String,
    pub password_hash: String,
}

/// Partial user update; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub password_hash: Option<String>,
}

/// Registration payload
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct RegisterInput {
    #[validate(required, length(min = 1))]
    pub name: Option<String>,
    #[validate(required, length(min = 1))]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[validate(required, length(min = 1))]
    pub password: Option<String>,
}

/// Login payload
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct LoginInput {
    #[validate(required, length(min = 1))]
    pub email: Option<String>,
    #[validate(required, length(min = 1))]
    pub password: Option<String>,
}

/// Profile update payload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
}

impl UpdateUserInput {
    /// Store changes for this payload. Empty strings leave the field untouched.
    pub fn into_changes(self, password_hash: Option<String>) -> UserChanges {
        UserChanges {
            name: non_empty(self.name),
            email: non_empty(self.email),
            address: non_empty(self.address),
            phone: non_empty(self.phone),
            password_hash,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

// ============================================================================
// BOOKS
// ============================================================================

/// Book record; `user_id` is the owner
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub year: i32,
    pub author: String,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FromRow for Book {
    fn from_row(row: &Row) -> Result<Self, tokio_postgres::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            year: row.try_get("year")?,
            author: row.try_get("author")?,
            user_id: row.try_get("user_id")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Book row to insert; the owner is supplied separately by the caller identity
#[derive(Debug, Clone, PartialEq)]
pub struct NewBook {
    pub title: String,
    pub year: i32,
    pub author: String,
}

/// Partial book update
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BookChanges {
    pub title: Option<String>,
    pub year: Option<i32>,
    pub author: Option<String>,
}

impl BookChanges {
    /// Drop empty strings and non-positive years so they leave the record as is
    pub fn without_blanks(self) -> Self {
        Self {
            title: non_empty(self.title),
            year: self.year.filter(|year| *year > 0),
            author: non_empty(self.author),
        }
    }
}

/// Add-book payload. A client-supplied `user_id` is accepted but never trusted.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct BookInput {
    #[validate(required, length(min = 1))]
    pub title: Option<String>,
    #[validate(required, range(min = 1))]
    pub year: Option<i32>,
    #[validate(required, length(min = 1))]
    pub author: Option<String>,
    #[serde(default)]
    pub user_id: Option<i64>,
}

impl BookInput {
    /// Convert a validated payload into the insert model
    pub fn into_new_book(self) -> Option<NewBook> {
        Some(NewBook {
            title: self.title?,
            year: self.year?,
            author: self.author?,
        })
    }
}
