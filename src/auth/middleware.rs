//! Authentication Middleware
//!
//! Axum middleware that turns the presented token into a [`Credential`] and
//! injects it into the request for downstream handlers.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

use crate::auth::{
    jwt::JwtService,
    models::{Credential, ParsedToken},
};
use crate::error::AppError;

/// Name of the cookie set on login
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Authentication middleware that validates tokens and injects the credential
pub struct AuthMiddleware;

impl AuthMiddleware {
    /// Middleware function for validating JWT tokens
    pub async fn validate_token(
        State(jwt_service): State<Arc<JwtService>>,
        mut req: Request,
        next: Next,
    ) -> Result<Response, AppError> {
        let Some(token) = extract_token(req.headers()) else {
            tracing::warn!(
                "[AuthMiddleware] Missing bearer token for {} {}",
                req.method(),
                req.uri()
            );
            return Err(AppError::Unauthenticated("missing access token".to_string()));
        };

        let credential = jwt_service.parse(&token);
        match &credential {
            Credential::Token(ParsedToken { valid: true, claims }) => {
                tracing::debug!("[AuthMiddleware] token accepted for sub={:?}", claims.sub);
            }
            _ => {
                tracing::warn!("[AuthMiddleware] token rejected for {}", req.uri());
                return Err(AppError::Unauthenticated(
                    "invalid or expired access token".to_string(),
                ));
            }
        }

        req.extensions_mut().insert(credential);
        Ok(next.run(req).await)
    }
}

/// Bearer token from the Authorization header, falling back to the cookie
fn extract_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
        .or_else(|| {
            CookieJar::from_headers(headers)
                .get(ACCESS_TOKEN_COOKIE)
                .map(|cookie| cookie.value().to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(extract_token(&headers).as_deref(), Some("abc.def"));
    }

    #[test]
    fn test_extract_cookie_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; access_token=xyz"),
        );
        assert_eq!(extract_token(&headers).as_deref(), Some("xyz"));
    }

    #[test]
    fn test_extract_missing() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic Zm9vOmJhcg=="));
        assert_eq!(extract_token(&headers), None);
    }
}
