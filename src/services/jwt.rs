//! # JWT Service
//!
//! This module issues and validates the internal admin session token. Every
//! login flow (Google, Twitch, password) ends with [`JwtService::issue_admin_token`];
//! every protected route goes through [`JwtService::validate_admin_token`].
//!
//! ## Token format
//!
//! - HS256, signed with `ADMIN_JWT_SECRET`
//! - Claims: `sub`, `name`, `provider`, `role`, `iat`, `exp`
//! - Lifetime: `ADMIN_TOKEN_TTL_MINUTES`

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument, trace};

use crate::utils::constant::ADMIN_ROLE;

/// Errors that can occur during JWT operations
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Token encoding failed: {0}")]
    EncodingError(#[from] jsonwebtoken::errors::Error),
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
    #[error("Missing admin role")]
    NotAdmin,
}

/// Which login flow produced a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Google,
    Twitch,
    Password,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Google => "google",
            Provider::Twitch => "twitch",
            Provider::Password => "password",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JWT claims structure for admin session tokens
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject, prefixed with the provider (`google:<sub>`, `twitch:<id>`, ...)
    pub sub: String,
    /// Display name
    pub name: String,
    pub provider: Provider,
    /// Absent or anything but `admin` is refused by [`JwtService::validate_admin_token`]
    #[serde(default)]
    pub role: Option<String>,
    /// Expiration timestamp (Unix epoch)
    pub exp: u64,
    /// Issued at timestamp (Unix epoch)
    pub iat: u64,
}

/// Service for issuing and checking admin session tokens
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl: Duration,
}

impl JwtService {
    /// Creates a new JWT service from the shared HS256 secret.
    ///
    /// # Arguments
    ///
    /// * `secret` - Signing secret
    /// * `token_ttl` - Lifetime of issued tokens
    pub fn new(secret: &[u8], token_ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            token_ttl,
        }
    }

    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }

    /// Issues a session token carrying the admin role.
    ///
    /// # Errors
    ///
    /// Returns [`JwtError::EncodingError`] if signing fails.
    #[instrument(skip(self, name))]
    pub fn issue_admin_token(
        &self,
        subject: &str,
        name: &str,
        provider: Provider,
    ) -> Result<String, JwtError> {
        let now = unix_now();
        let claims = Claims {
            sub: subject.to_string(),
            name: name.to_string(),
            provider,
            role: Some(ADMIN_ROLE.to_string()),
            exp: now + self.token_ttl.as_secs(),
            iat: now,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        trace!("Admin session token issued");
        Ok(token)
    }

    /// Validates a session token and returns its claims.
    ///
    /// Checks the signature, expiry and the `admin` role claim.
    ///
    /// # Errors
    ///
    /// - [`JwtError::TokenExpired`] - Token has expired
    /// - [`JwtError::InvalidToken`] - Token is malformed or has invalid signature
    /// - [`JwtError::NotAdmin`] - Token is genuine but lacks the admin role
    #[instrument(skip_all, fields(token_length = token.len()))]
    pub fn validate_admin_token(&self, token: &str) -> Result<Claims, JwtError> {
        let validation = Validation::new(Algorithm::HS256);

        let claims = match decode::<Claims>(token, &self.decoding_key, &validation) {
            Ok(token_data) => token_data.claims,
            Err(e) if e.kind() == &jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                debug!("Session token expired");
                return Err(JwtError::TokenExpired);
            }
            Err(e) => {
                debug!(error = %e, "Invalid session token");
                return Err(JwtError::InvalidToken);
            }
        };

        if claims.role.as_deref() != Some(ADMIN_ROLE) {
            debug!(subject = %claims.sub, "Session token without admin role");
            return Err(JwtError::NotAdmin);
        }

        trace!(subject = %claims.sub, "Session token validated");
        Ok(claims)
    }
}

pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
