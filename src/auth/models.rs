//! Authentication Models
//!
//! The credential attached to a request by the middleware, and the typed
//! principal the service layer resolves from it.

use serde::Serialize;

use crate::auth::jwt::Claims;

/// Whatever the authentication layer could make of the presented token
#[derive(Debug, Clone)]
pub enum Credential {
    /// No token was presented
    Anonymous,
    /// A token string that could not be decoded at all
    Unverified,
    /// A decoded token, with the outcome of signature and expiry checks
    Token(ParsedToken),
}

/// Decoded token payload plus its validity flag
#[derive(Debug, Clone)]
pub struct ParsedToken {
    pub claims: Claims,
    pub valid: bool,
}

/// Authenticated caller identity; the user id is always positive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Principal {
    user_id: i64,
}

impl Principal {
    pub fn user_id(&self) -> i64 {
        self.user_id
    }
}

impl Credential {
    /// Resolve the caller identity.
    ///
    /// Returns `None` for anonymous or undecodable credentials, tokens that
    /// failed validation, and tokens whose subject is missing or not positive.
    pub fn resolve_identity(&self) -> Option<Principal> {
        match self {
            Credential::Token(ParsedToken { claims, valid: true }) => claims
                .sub
                .filter(|id| *id > 0)
                .map(|user_id| Principal { user_id }),
            _ => None,
        }
    }
}

#[cfg(test)]
impl Credential {
    /// A validated token credential for `user_id`
    pub fn for_user(user_id: i64) -> Credential {
        Credential::token(Some(user_id), true)
    }

    /// A decoded token with the given subject and validity flag
    pub fn token(sub: Option<i64>, valid: bool) -> Credential {
        Credential::Token(ParsedToken {
            claims: Claims {
                sub,
                iat: 0,
                exp: i64::MAX,
                iss: "book-catalog".to_string(),
            },
            valid,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolves_valid_subject() {
        let principal = Credential::token(Some(42), true).resolve_identity().unwrap();
        assert_eq!(principal.user_id(), 42);
    }

    #[test]
    fn test_rejected_credentials_resolve_to_none() {
        let cases = [
            Credential::Anonymous,
            Credential::Unverified,
            Credential::token(Some(42), false),
            Credential::token(None, true),
            Credential::token(Some(0), true),
            Credential::token(Some(-5), true),
        ];

        for credential in cases {
            assert_eq!(credential.resolve_identity(), None, "{:?}", credential);
        }
    }
}
