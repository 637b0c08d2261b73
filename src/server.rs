//! # Server Module
//!
//! HTTP server setup and route configuration for the book catalog server.

use anyhow::{Context, Result};
use axum::{
    Router,
    extract::Request,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, patch, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::{Layer, ServiceBuilder};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    normalize_path::{NormalizePath, NormalizePathLayer},
    trace::TraceLayer,
};

use crate::auth::{JwtService, PasswordService, middleware::AuthMiddleware};
use crate::config::{Config, StoreBackend};
use crate::database::{DatabaseConnection, migrations};
use crate::routes::{auth, books, health, users};
use crate::services::{BookService, UserService};
use crate::store::{BookStore, MemoryStore, UserStore};

/// Application state shared across all route handlers
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<UserService>,
    pub books: Arc<BookService>,
    pub jwt_service: Arc<JwtService>,
    /// Present when the Postgres backend is in use
    pub db: Option<Arc<DatabaseConnection>>,
}

impl AppState {
    /// Wire the services to a store that implements both store traits
    pub fn new<S>(store: Arc<S>, jwt_service: Arc<JwtService>) -> Self
    where
        S: UserStore + BookStore + 'static,
    {
        Self {
            users: Arc::new(UserService::new(
                store.clone(),
                jwt_service.clone(),
                PasswordService::new(),
            )),
            books: Arc::new(BookService::new(store)),
            jwt_service,
            db: None,
        }
    }

    /// Build state from configuration, connecting to the database if needed
    pub async fn from_config(config: &Config) -> Result<Self> {
        if config.auth.uses_dev_secret() {
            tracing::warn!(
                "⚠️  JWT_SECRET not set, signing tokens with the development secret"
            );
        }
        let jwt_service = Arc::new(JwtService::new(
            &config.auth.jwt_secret,
            config.auth.token_ttl_hours,
        ));

        match config.store {
            StoreBackend::Memory => {
                tracing::info!("🧠 Using in-memory store; data is lost on restart");
                Ok(Self::new(Arc::new(MemoryStore::new()), jwt_service))
            }
            StoreBackend::Postgres => {
                let db = Arc::new(
                    DatabaseConnection::new(config.database.clone())
                        .await
                        .context("Failed to connect to DB")?,
                );
                if config.run_migrations {
                    migrations::run_migrations(db.pool()).await?;
                } else if migrations::needs_migration(db.pool()).await? {
                    tracing::warn!(
                        "⚠️  Schema is missing tables and DATABASE_RUN_MIGRATIONS is off"
                    );
                }

                let mut state = Self::new(db.clone(), jwt_service);
                state.db = Some(db);
                Ok(state)
            }
        }
    }
}

/// Build the application router
fn router(state: AppState, cors_origins: &[String]) -> Router {
    // Every route in here requires a token
    let protected = Router::new()
        .route(
            "/users",
            get(users::profile)
                .patch(users::update)
                .delete(users::deactivate),
        )
        .route("/books", post(books::add))
        .route("/books/{id}", patch(books::update).delete(books::delete))
        .layer(middleware::from_fn_with_state(
            state.jwt_service.clone(),
            AuthMiddleware::validate_token,
        ));

    Router::new()
        .route("/ping", get(health::ping))
        .route("/health", get(health::health))
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .merge(protected)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(cors_origins)),
        )
        .with_state(state)
}

/// The router wrapped so trailing slashes are stripped before routing
pub fn app(state: AppState, cors_origins: &[String]) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(router(state, cors_origins))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match origin.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!("ignoring invalid CORS origin '{}'", origin);
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::ORIGIN,
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::AUTHORIZATION,
        ])
}

/// Starts the book catalog HTTP server and serves until shutdown.
pub async fn start(config: Config) -> Result<()> {
    let state = AppState::from_config(&config).await?;
    let app = app(state, &config.server.cors_origins);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr} - port may already be in use"))?;

    tracing::info!("🚀 Book catalog server listening on http://{}", addr);
    tracing::info!("🏥 Health check available at http://{}/ping", addr);

    axum::serve(listener, axum::ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("👋 Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::response::Response;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    type TestApp = NormalizePath<Router>;

    fn test_app() -> (TestApp, Arc<JwtService>) {
        let jwt_service = Arc::new(JwtService::new("test_secret", 24));
        let state = AppState::new(Arc::new(MemoryStore::new()), jwt_service.clone());
        (app(state, &[]), jwt_service)
    }

    async fn send(
        app: &TestApp,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Response {
        let body = body.map(|body| body.to_string());
        send_raw(app, method, uri, token, body.as_deref()).await
    }

    async fn send_raw(
        app: &TestApp,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<&str>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        app.clone().oneshot(request).await.unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    /// Asserts a JSON error envelope and returns its message
    async fn error_message(response: Response, status: StatusCode, kind: &str) -> String {
        assert_eq!(response.status(), status);
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(content_type.starts_with("application/json"), "{content_type}");

        let body = json_body(response).await;
        assert_eq!(body["error"], kind);
        body["message"].as_str().unwrap().to_string()
    }

    async fn register_and_login(app: &TestApp, name: &str) -> (i64, String) {
        let email = format!("{name}@x.com");
        let password = format!("{name}123");
        let response = send(
            app,
            "POST",
            "/register",
            None,
            Some(json!({ "name": name, "email": email, "password": password })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let id = json_body(response).await["data"]["id"].as_i64().unwrap();

        let response = send(
            app,
            "POST",
            "/login",
            None,
            Some(json!({ "email": email, "password": password })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(header::SET_COOKIE));
        let token = json_body(response).await["token"]
            .as_str()
            .unwrap()
            .to_string();
        (id, token)
    }

    #[tokio::test]
    async fn test_ping() {
        let (app, _) = test_app();
        let response = send(&app, "GET", "/ping", None, None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({ "status": "pong" }));
    }

    #[tokio::test]
    async fn test_register_omits_password() {
        let (app, _) = test_app();
        let response = send(
            &app,
            "POST",
            "/register",
            None,
            Some(json!({ "name": "alif", "email": "alif@x.com", "password": "alif123" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = json_body(response).await;
        assert!(body["data"]["id"].as_i64().unwrap() > 0);
        assert!(body["data"].get("password").is_none());
        assert!(body["data"].get("password_hash").is_none());
        assert!(body.get("token").is_none());
    }

    #[tokio::test]
    async fn test_login_wrong_password_issues_no_token() {
        let (app, _) = test_app();
        register_and_login(&app, "alif").await;

        let response = send(
            &app,
            "POST",
            "/login",
            None,
            Some(json!({ "email": "alif@x.com", "password": "wrong" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(!response.headers().contains_key(header::SET_COOKIE));

        let body = json_body(response).await;
        assert_eq!(body["error"], "unauthenticated");
        assert!(body.get("token").is_none());
    }

    #[tokio::test]
    async fn test_protected_routes_require_token() {
        let (app, jwt_service) = test_app();

        let response = send(&app, "GET", "/users", None, None).await;
        let message = error_message(response, StatusCode::UNAUTHORIZED, "unauthenticated").await;
        assert_eq!(message, "missing access token");

        let response = send(&app, "GET", "/users", Some("garbage"), None).await;
        error_message(response, StatusCode::UNAUTHORIZED, "unauthenticated").await;

        let forged = JwtService::new("other_secret", 24).issue(1).unwrap();
        let response = send(&app, "POST", "/books", Some(&forged), Some(json!({}))).await;
        error_message(response, StatusCode::UNAUTHORIZED, "unauthenticated").await;

        // A correctly signed token for an id that was never registered
        let token = jwt_service.issue(77).unwrap();
        let response = send(&app, "GET", "/users", Some(&token), None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_malformed_requests_return_error_envelope() {
        let (app, _) = test_app();
        let (_, token) = register_and_login(&app, "alif").await;

        let response = send(
            &app,
            "POST",
            "/register",
            None,
            Some(json!({ "name": "budi", "email": 5, "password": "budi123" })),
        )
        .await;
        let message = error_message(response, StatusCode::BAD_REQUEST, "invalid_input").await;
        assert!(!message.contains("invalid type"), "{message}");

        let response = send_raw(&app, "POST", "/login", None, Some("{\"email\":")).await;
        error_message(response, StatusCode::BAD_REQUEST, "invalid_input").await;

        let response = send(
            &app,
            "PATCH",
            "/books/abc",
            Some(&token),
            Some(json!({ "title": "Naruto" })),
        )
        .await;
        let message = error_message(response, StatusCode::BAD_REQUEST, "invalid_input").await;
        assert!(!message.contains("abc"), "{message}");
    }

    #[tokio::test]
    async fn test_trailing_slash_is_ignored() {
        let (app, _) = test_app();
        let (_, token) = register_and_login(&app, "alif").await;

        let response = send(&app, "GET", "/ping/", None, None).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(
            &app,
            "POST",
            "/books/",
            Some(&token),
            Some(json!({ "title": "One Piece", "year": 1997, "author": "Oda" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let id = json_body(response).await["data"]["id"].as_i64().unwrap();

        let uri = format!("/books/{id}/");
        let response = send(&app, "PATCH", &uri, Some(&token), Some(json!({ "year": 1999 }))).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["data"]["year"], 1999);

        let response = send(&app, "DELETE", &uri, Some(&token), None).await;
        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn test_book_ownership_flow() {
        let (app, _) = test_app();
        let (alif_id, alif) = register_and_login(&app, "alif").await;
        let (_, budi) = register_and_login(&app, "budi").await;

        let response = send(
            &app,
            "POST",
            "/books",
            Some(&alif),
            Some(json!({ "title": "One Piece", "year": 1997, "author": "Oda", "user_id": 999 })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let book = json_body(response).await["data"].clone();
        assert_eq!(book["user_id"].as_i64(), Some(alif_id));
        let uri = format!("/books/{}", book["id"]);
        let rename = json!({ "title": "Naruto" });

        let response = send(&app, "PATCH", &uri, Some(&budi), Some(rename.clone())).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let response = send(&app, "DELETE", &uri, Some(&budi), None).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = send(&app, "PATCH", "/books/4040", Some(&alif), Some(rename)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = send(&app, "PATCH", &uri, Some(&alif), Some(json!({ "year": 1999 }))).await;
        assert_eq!(response.status(), StatusCode::OK);
        let updated = json_body(response).await["data"].clone();
        assert_eq!(updated["title"], "One Piece");
        assert_eq!(updated["year"], 1999);

        let response = send(&app, "DELETE", &uri, Some(&alif), None).await;
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        let response = send(&app, "DELETE", &uri, Some(&alif), None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_add_book_missing_fields() {
        let (app, _) = test_app();
        let (_, token) = register_and_login(&app, "alif").await;

        let body = json!({ "title": "One Piece" });
        let response = send(&app, "POST", "/books", Some(&token), Some(body)).await;
        error_message(response, StatusCode::BAD_REQUEST, "invalid_input").await;
    }

    #[tokio::test]
    async fn test_profile_update_and_deactivate() {
        let (app, _) = test_app();
        let (id, token) = register_and_login(&app, "alif").await;

        let body = json!({ "phone": "0812", "email": "" });
        let response = send(&app, "PATCH", "/users", Some(&token), Some(body)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let user = json_body(response).await["data"].clone();
        assert_eq!(user["id"].as_i64(), Some(id));
        assert_eq!(user["phone"], "0812");
        assert_eq!(user["email"], "alif@x.com");

        let response = send(&app, "DELETE", "/users", Some(&token), None).await;
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        let response = send(&app, "GET", "/users", Some(&token), None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_register_duplicate_email_conflicts() {
        let (app, _) = test_app();
        register_and_login(&app, "alif").await;

        let response = send(
            &app,
            "POST",
            "/register",
            None,
            Some(json!({ "name": "alif", "email": "alif@x.com", "password": "other" })),
        )
        .await;
        error_message(response, StatusCode::CONFLICT, "already_exists").await;
    }
}
