//! Auth routes for registration and login

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::{
    WithRejection,
    cookie::{Cookie, CookieJar, SameSite},
};

use crate::auth::middleware::ACCESS_TOKEN_COOKIE;
use crate::database::models::{LoginInput, RegisterInput};
use crate::error::{AppError, Result};
use crate::routes::ApiResponse;
use crate::server::AppState;

pub async fn register(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<RegisterInput>, AppError>,
) -> Result<impl IntoResponse> {
    let user = state.users.register(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new("registration successful", user)),
    ))
}

/// Returns the user and token in the body and also sets the token cookie
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Json(payload), _): WithRejection<Json<LoginInput>, AppError>,
) -> Result<impl IntoResponse> {
    let (token, user) = state.users.login(payload).await?;

    let mut cookie = Cookie::new(ACCESS_TOKEN_COOKIE, token.clone());
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_path("/");
    cookie.set_max_age(time::Duration::seconds(state.jwt_service.ttl_seconds()));

    Ok((
        StatusCode::OK,
        jar.add(cookie),
        Json(ApiResponse::new("login successful", user).with_token(token)),
    ))
}
