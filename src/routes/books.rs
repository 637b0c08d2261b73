//! Book routes; every handler acts on behalf of the authenticated caller

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;

use crate::auth::Credential;
use crate::database::models::{BookChanges, BookInput};
use crate::error::{AppError, Result};
use crate::routes::ApiResponse;
use crate::server::AppState;

pub async fn add(
    State(state): State<AppState>,
    Extension(credential): Extension<Credential>,
    WithRejection(Json(payload), _): WithRejection<Json<BookInput>, AppError>,
) -> Result<impl IntoResponse> {
    let book = state.books.add(&credential, payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::new("book added", book))))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(credential): Extension<Credential>,
    WithRejection(Path(book_id), _): WithRejection<Path<i64>, AppError>,
    WithRejection(Json(payload), _): WithRejection<Json<BookChanges>, AppError>,
) -> Result<impl IntoResponse> {
    let book = state.books.update(&credential, book_id, payload).await?;
    Ok(Json(ApiResponse::new("book updated", book)))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(credential): Extension<Credential>,
    WithRejection(Path(book_id), _): WithRejection<Path<i64>, AppError>,
) -> Result<impl IntoResponse> {
    state.books.delete(&credential, book_id).await?;
    Ok((StatusCode::ACCEPTED, Json(ApiResponse::message("book deleted"))))
}
