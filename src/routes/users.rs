//! Profile routes for the authenticated user

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::WithRejection;

use crate::auth::Credential;
use crate::database::models::UpdateUserInput;
use crate::error::{AppError, Result};
use crate::routes::ApiResponse;
use crate::server::AppState;

pub async fn profile(
    State(state): State<AppState>,
    Extension(credential): Extension<Credential>,
) -> Result<impl IntoResponse> {
    let user = state.users.profile(&credential).await?;
    Ok(Json(ApiResponse::new("profile retrieved", user)))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(credential): Extension<Credential>,
    WithRejection(Json(payload), _): WithRejection<Json<UpdateUserInput>, AppError>,
) -> Result<impl IntoResponse> {
    let user = state.users.update(&credential, payload).await?;
    Ok(Json(ApiResponse::new("profile updated", user)))
}

pub async fn deactivate(
    State(state): State<AppState>,
    Extension(credential): Extension<Credential>,
) -> Result<impl IntoResponse> {
    state.users.deactivate(&credential).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(ApiResponse::message("account deactivated")),
    ))
}
