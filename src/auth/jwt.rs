//! JWT Token Service
//!
//! Issues signed identity tokens and parses presented tokens into a
//! [`Credential`] for the service layer.

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::auth::models::{Credential, ParsedToken};

const ISSUER: &str = "book-catalog";

/// JWT Claims structure containing the user identity and token metadata
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// User identifier; absent in tokens minted by other parties
    #[serde(default)]
    pub sub: Option<i64>,
    /// Token issued at timestamp
    pub iat: i64,
    /// Token expiration timestamp
    pub exp: i64,
    /// Token issuer
    pub iss: String,
}

/// JWT Service for token operations
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl JwtService {
    /// Create a new JWT service with the provided secret and token lifetime
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        let encoding_key = EncodingKey::from_secret(secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(secret.as_bytes());

        let mut validation = Validation::default();
        validation.set_issuer(&[ISSUER]);

        Self {
            encoding_key,
            decoding_key,
            validation,
            ttl: Duration::try_hours(ttl_hours).unwrap_or(Duration::MAX),
        }
    }

    /// Token lifetime in seconds
    pub fn ttl_seconds(&self) -> i64 {
        self.ttl.num_seconds()
    }

    /// Generate a signed token for a user
    pub fn issue(&self, user_id: i64) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: Some(user_id),
            iat: now.timestamp(),
            exp: now
                .checked_add_signed(self.ttl)
                .context("token expiry out of range")?
                .timestamp(),
            iss: ISSUER.to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .context("Failed to encode JWT token")
    }

    /// Validate and decode a token, failing on bad signature or expiry
    pub fn validate_token(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .context("Failed to validate JWT token")
    }

    /// Parse whatever the client presented into a credential.
    ///
    /// A token that fails validation but still carries a readable payload is
    /// kept with `valid: false`; anything else becomes `Unverified`.
    pub fn parse(&self, token: &str) -> Credential {
        match self.validate_token(token) {
            Ok(claims) => Credential::Token(ParsedToken { claims, valid: true }),
            Err(e) => {
                tracing::debug!("token rejected: {:#}", e);
                match self.decode_unchecked(token) {
                    Some(claims) => Credential::Token(ParsedToken { claims, valid: false }),
                    None => {
                        tracing::debug!("undecodable token of {} bytes", token.len());
                        Credential::Unverified
                    }
                }
            }
        }
    }

    fn decode_unchecked(&self, token: &str) -> Option<Claims> {
        let mut validation = Validation::default();
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)
            .ok()
            .map(|data| data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_jwt_roundtrip() {
        let jwt_service = JwtService::new("test_secret", 24);

        let token = jwt_service.issue(7).unwrap();
        let claims = jwt_service.validate_token(&token).unwrap();

        assert_eq!(claims.sub, Some(7));
        assert_eq!(claims.iss, ISSUER);
        assert_eq!(claims.exp - claims.iat, 24 * 60 * 60);
    }

    #[test]
    fn test_parse_valid_token() {
        let jwt_service = JwtService::new("test_secret", 24);
        let token = jwt_service.issue(3).unwrap();

        match jwt_service.parse(&token) {
            Credential::Token(parsed) => {
                assert!(parsed.valid);
                assert_eq!(parsed.claims.sub, Some(3));
            }
            other => panic!("unexpected credential: {:?}", other),
        }
    }

    #[test]
    fn test_parse_wrong_signature_is_invalid() {
        let issuer = JwtService::new("other_secret", 24);
        let verifier = JwtService::new("test_secret", 24);
        let token = issuer.issue(3).unwrap();

        match verifier.parse(&token) {
            Credential::Token(parsed) => {
                assert!(!parsed.valid);
                assert_eq!(parsed.claims.sub, Some(3));
            }
            other => panic!("unexpected credential: {:?}", other),
        }
    }

    #[test]
    fn test_parse_expired_token_is_invalid() {
        let jwt_service = JwtService::new("test_secret", -2);
        let token = jwt_service.issue(3).unwrap();

        assert!(matches!(
            jwt_service.parse(&token),
            Credential::Token(ParsedToken { valid: false, .. })
        ));
    }

    #[test]
    fn test_issue_with_unrepresentable_expiry_fails() {
        let jwt_service = JwtService::new("test_secret", i64::MAX);
        assert!(jwt_service.issue(1).is_err());
    }

    #[test]
    fn test_parse_garbage_is_unverified() {
        let jwt_service = JwtService::new("test_secret", 24);
        assert!(matches!(
            jwt_service.parse("not-a-token"),
            Credential::Unverified
        ));
    }

    #[test]
    fn test_token_without_subject() {
        let jwt_service = JwtService::new("test_secret", 24);
        let now = Utc::now().timestamp();
        let token = encode(
            &Header::default(),
            &json!({ "iat": now, "exp": now + 60, "iss": ISSUER }),
            &EncodingKey::from_secret(b"test_secret"),
        )
        .unwrap();

        match jwt_service.parse(&token) {
            Credential::Token(parsed) => {
                assert!(parsed.valid);
                assert_eq!(parsed.claims.sub, None);
            }
            other => panic!("unexpected credential: {:?}", other),
        }
    }
}
