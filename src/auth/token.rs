//! Admin token issue and verification (HS256 JWT)

use chrono::Duration;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::clock::Clock;
use crate::error::{BlogError, Result};

/// The only role the admin area accepts
pub const ADMIN_ROLE: &str = "admin";

/// How long an issued token stays valid
pub const TOKEN_LIFETIME_HOURS: i64 = 24;

/// Claims carried by an admin token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenClaims {
    pub user_id: String,
    pub role: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl TokenClaims {
    pub fn is_admin(&self) -> bool {
        self.role == ADMIN_ROLE
    }
}

/// A token failed verification
///
/// Malformed, expired and badly signed tokens are not told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Invalid or expired token")]
pub struct InvalidToken;

/// Signs and verifies admin tokens with a shared secret
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    admin_password: String,
    lifetime: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenCodec {
    pub fn new(secret: &str, admin_password: &str, clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            admin_password: admin_password.to_string(),
            lifetime: Duration::hours(TOKEN_LIFETIME_HOURS),
            clock,
        }
    }

    /// Token lifetime in seconds, used for the session cookie's max-age
    pub fn lifetime_secs(&self) -> i64 {
        self.lifetime.num_seconds()
    }

    /// Check the admin password and sign an admin token
    pub fn issue(&self, password: &str) -> Result<String> {
        if password != self.admin_password {
            return Err(BlogError::unauthorized("Incorrect password"));
        }
        self.issue_for(ADMIN_ROLE, ADMIN_ROLE)
    }

    /// Sign a token for an arbitrary identity without a password check
    pub fn issue_for(&self, user_id: &str, role: &str) -> Result<String> {
        let now = self.clock.now();
        let claims = TokenClaims {
            user_id: user_id.to_string(),
            role: role.to_string(),
            iat: now.timestamp(),
            exp: (now + self.lifetime).timestamp(),
        };
        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }

    /// Check signature and expiry
    pub fn verify(&self, token: &str) -> std::result::Result<TokenClaims, InvalidToken> {
        // Expiry is checked against the injected clock below
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;

        let data = decode::<TokenClaims>(token, &self.decoding_key, &validation).map_err(|e| {
            tracing::debug!("JWT validation failed: {}", e);
            InvalidToken
        })?;

        if self.clock.now().timestamp() >= data.claims.exp {
            tracing::debug!("JWT expired for {}", data.claims.user_id);
            return Err(InvalidToken);
        }
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::{TimeZone, Utc};

    fn codec() -> (Arc<ManualClock>, TokenCodec) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
        ));
        let codec = TokenCodec::new("test-secret", "hunter2", clock.clone());
        (clock, codec)
    }

    #[test]
    fn test_issue_and_verify() {
        let (_clock, codec) = codec();
        let token = codec.issue("hunter2").unwrap();
        let claims = codec.verify(&token).unwrap();
        assert_eq!(claims.user_id, "admin");
        assert!(claims.is_admin());
        assert_eq!(claims.exp - claims.iat, 24 * 60 * 60);
    }

    #[test]
    fn test_wrong_password() {
        let (_clock, codec) = codec();
        assert!(matches!(
            codec.issue("nope"),
            Err(BlogError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_expires_after_24_hours() {
        let (clock, codec) = codec();
        let token = codec.issue("hunter2").unwrap();

        clock.advance(Duration::hours(23));
        assert!(codec.verify(&token).is_ok());

        clock.advance(Duration::hours(1) + Duration::seconds(1));
        assert_eq!(codec.verify(&token), Err(InvalidToken));
    }

    #[test]
    fn test_rejects_foreign_and_garbage_tokens() {
        let (clock, codec) = codec();
        let other = TokenCodec::new("other-secret", "hunter2", clock);
        let foreign = other.issue("hunter2").unwrap();

        assert_eq!(codec.verify(&foreign), Err(InvalidToken));
        assert_eq!(codec.verify("not.a.jwt"), Err(InvalidToken));
        assert_eq!(codec.verify(""), Err(InvalidToken));
    }

    #[test]
    fn test_non_admin_role_round_trips() {
        let (_clock, codec) = codec();
        let token = codec.issue_for("guest", "viewer").unwrap();
        let claims = codec.verify(&token).unwrap();
        assert!(!claims.is_admin());
    }
}
