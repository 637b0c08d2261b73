//! # Book Catalog Server
//!
//! A small multi-user REST backend built with Axum and Tokio. Users register,
//! log in with a JWT, and manage their profile; authenticated users add,
//! update and delete the books they own.
//!
//! ## Architecture
//! - `server`: router, shared state and startup
//! - `config`: environment variable configuration
//! - `auth`: token issuance/parsing, identity resolution, password hashing,
//!   authentication middleware
//! - `services`: user and book business logic
//! - `store`: persistence traits plus the in-memory backend
//! - `database`: PostgreSQL pool, migrations and store implementations
//! - `routes`: HTTP handlers
//!
//! ## Running the Server
//! ```bash
//! cp .env.example .env
//! cargo run
//! ```
//!
//! Set `STORE_BACKEND=memory` to run without PostgreSQL.

mod auth;
mod config;
mod database;
mod error;
mod routes;
mod server;
mod services;
mod store;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Application entry point.
///
/// Loads `.env`, initializes tracing and runs the server until Ctrl+C.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false) // Don't show module targets for cleaner output
                .compact(),
        )
        .init();

    tracing::info!("🏁 Starting book catalog server...");
    tracing::info!(
        "📦 Package: {} v{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    let config = config::Config::from_env()?;
    server::start(config).await
}
