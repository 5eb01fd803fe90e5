// ============================
// accountd-backend/src/auth/token.rs
// ============================
//! Signed session tokens (HS256 JWT).
use std::time::Duration;

use accountd_common::AccountId;
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use metrics::counter;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::metrics::TOKEN_ISSUED;

/// Lifetime of every issued token
pub const TOKEN_TTL: Duration = Duration::from_secs(60 * 60 * 24 * 30); // 30 days

/// Claims carried by a session token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Account the token was issued to
    pub id: AccountId,
    /// Issued at, seconds since the epoch
    pub iat: i64,
    /// Expiry, seconds since the epoch
    pub exp: i64,
}

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

/// Issues and verifies session tokens with one process-wide secret.
///
/// Built without a secret, every call fails with [`AppError::MissingSecret`].
#[derive(Clone)]
pub struct TokenIssuer {
    keys: Option<std::sync::Arc<Keys>>,
    ttl: Duration,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("configured", &self.keys.is_some())
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TokenIssuer {
    pub fn new(secret: Option<&str>) -> Self {
        Self::with_ttl(secret, TOKEN_TTL)
    }

    pub fn with_ttl(secret: Option<&str>, ttl: Duration) -> Self {
        let keys = secret.filter(|s| !s.is_empty()).map(|s| {
            std::sync::Arc::new(Keys {
                encoding: EncodingKey::from_secret(s.as_bytes()),
                decoding: DecodingKey::from_secret(s.as_bytes()),
            })
        });
        Self { keys, ttl }
    }

    /// Whether a signing secret was supplied
    pub fn is_configured(&self) -> bool {
        self.keys.is_some()
    }

    fn keys(&self) -> Result<&Keys, AppError> {
        self.keys.as_deref().ok_or(AppError::MissingSecret)
    }

    /// Sign a fresh token for `account_id`
    pub fn issue(&self, account_id: AccountId) -> Result<String, AppError> {
        let keys = self.keys()?;
        let iat = Utc::now().timestamp();
        let claims = Claims {
            id: account_id,
            iat,
            exp: iat + self.ttl.as_secs() as i64,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding)
            .map_err(|e| AppError::Internal(format!("token signing failed: {e}")))?;
        counter!(TOKEN_ISSUED).increment(1);
        Ok(token)
    }

    /// Check signature and expiry, returning the claims
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let keys = self.keys()?;
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let data = decode::<Claims>(token, &keys.decoding, &validation).map_err(|e| {
            tracing::debug!(error = %e, "token rejected");
            AppError::Unauthorized("invalid or expired token".to_string())
        })?;
        Ok(data.claims)
    }
}
