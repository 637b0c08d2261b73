use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{Value, json};

use crate::server::AppState;

/// Health check endpoint handler.
///
/// Returns a fixed JSON body so load balancers and container probes can tell
/// the process is serving requests.
///
/// # Route
/// - **Method**: GET
/// - **Path**: `/ping`
///
/// ```bash
/// curl http://localhost:8000/ping
/// # Response: {"status":"pong"}
/// ```
pub async fn ping() -> Json<Value> {
    Json(json!({ "status": "pong" }))
}

/// Store health: pings the database when the Postgres backend is in use.
///
/// # Route
/// - **Method**: GET
/// - **Path**: `/health`
/// - **200 OK**: store reachable
/// - **503 Service Unavailable**: database did not answer
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let Some(db) = &state.db else {
        return (StatusCode::OK, Json(json!({ "status": "ok", "store": "memory" })));
    };

    match db.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "status": "ok", "store": "postgres", "pool": db.stats() })),
        ),
        Err(e) => {
            tracing::error!("health check failed: {:#}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable", "store": "postgres" })),
            )
        }
    }
}
