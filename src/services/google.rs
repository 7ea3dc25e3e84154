//! # Google Sign-In
//!
//! Verifies Google ID tokens (RS256) against Google's published JWKS.
//!
//! The key set is held in a [`JwksCache`]: the last fetched set plus the
//! instant it stops being fresh, behind an async `RwLock`. Freshness comes
//! from the `Cache-Control: max-age` response header, one hour when absent.
//! Two requests arriving on a cold cache may both fetch; the second write
//! wins and both sets are equivalent.

use std::time::Duration;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::jwk::{Jwk, JwkSet};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use reqwest::header::CACHE_CONTROL;
use serde::Deserialize;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::services::auth::AuthError;
use crate::utils::constant::{DEFAULT_JWKS_TTL, GOOGLE_ISSUERS, GOOGLE_JWKS_URL};

struct CachedKeys {
    keys: JwkSet,
    fresh_until: Instant,
}

pub struct JwksCache {
    http_client: reqwest::Client,
    url: String,
    cached: RwLock<Option<CachedKeys>>,
}

impl JwksCache {
    pub fn new(http_client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            http_client,
            url: url.into(),
            cached: RwLock::new(None),
        }
    }

    /// Returns the key with the given `kid`, refreshing the set when stale.
    ///
    /// A fresh set that lacks the `kid` is not refetched.
    pub async fn find(&self, kid: &str) -> Result<Jwk, AuthError> {
        {
            let guard = self.cached.read().await;
            if let Some(cached) = guard.as_ref() {
                if Instant::now() < cached.fresh_until {
                    return cached
                        .keys
                        .find(kid)
                        .cloned()
                        .ok_or(AuthError::GoogleKeyNotFound);
                }
            }
        }

        let fresh = self.fetch().await?;
        let key = fresh.keys.find(kid).cloned();
        *self.cached.write().await = Some(fresh);
        key.ok_or(AuthError::GoogleKeyNotFound)
    }

    #[instrument(skip(self), fields(url = %self.url))]
    async fn fetch(&self) -> Result<CachedKeys, AuthError> {
        let response = self
            .http_client
            .get(&self.url)
            .send()
            .await
            .and_then(|res| res.error_for_status())
            .map_err(|e| {
                warn!(error = %e, "Failed to fetch Google JWKS");
                AuthError::GoogleKeysUnavailable
            })?;

        let ttl = response
            .headers()
            .get(CACHE_CONTROL)
            .and_then(|value| value.to_str().ok())
            .and_then(max_age)
            .unwrap_or(DEFAULT_JWKS_TTL);

        let keys = response.json::<JwkSet>().await.map_err(|e| {
            warn!(error = %e, "Google JWKS response is not a key set");
            AuthError::GoogleKeysUnavailable
        })?;

        info!(
            key_count = keys.keys.len(),
            ttl_secs = ttl.as_secs(),
            "Google JWKS refreshed"
        );
        Ok(CachedKeys {
            keys,
            fresh_until: Instant::now() + ttl,
        })
    }
}

/// Extracts `max-age` from a `Cache-Control` header value.
fn max_age(cache_control: &str) -> Option<Duration> {
    cache_control
        .split(',')
        .filter_map(|directive| directive.trim().strip_prefix("max-age="))
        .find_map(|secs| secs.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

#[derive(Debug, Deserialize)]
struct GoogleClaims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

/// A Google account that passed verification and the allow-list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleIdentity {
    /// `google:<sub>`
    pub subject: String,
    pub name: String,
}

pub struct GoogleVerifier {
    client_id: Option<String>,
    allowed_emails: Vec<String>,
    jwks: JwksCache,
}

impl GoogleVerifier {
    /// # Arguments
    ///
    /// * `client_id` - OAuth client id expected as the token audience
    /// * `allowed_emails` - Lowercased allow-list, empty to accept any account
    pub fn new(
        http_client: reqwest::Client,
        client_id: Option<String>,
        allowed_emails: Vec<String>,
    ) -> Self {
        Self::with_jwks_url(http_client, client_id, allowed_emails, GOOGLE_JWKS_URL)
    }

    pub fn with_jwks_url(
        http_client: reqwest::Client,
        client_id: Option<String>,
        allowed_emails: Vec<String>,
        jwks_url: impl Into<String>,
    ) -> Self {
        Self {
            client_id,
            allowed_emails,
            jwks: JwksCache::new(http_client, jwks_url),
        }
    }

    pub fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }

    /// Verifies a Google ID token and applies the e-mail allow-list.
    #[instrument(skip_all)]
    pub async fn verify(&self, credential: &str) -> Result<GoogleIdentity, AuthError> {
        let client_id = self
            .client_id
            .as_deref()
            .ok_or(AuthError::GoogleNotConfigured)?;

        let header = decode_header(credential).map_err(|_| AuthError::GoogleMalformed)?;
        let kid = header.kid.ok_or(AuthError::GoogleMalformed)?;

        let jwk = self.jwks.find(&kid).await?;
        let key = DecodingKey::from_jwk(&jwk).map_err(|e| {
            warn!(error = %e, kid = %kid, "Unusable Google JWK");
            AuthError::GoogleInvalid
        })?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[client_id]);
        validation.set_issuer(&GOOGLE_ISSUERS);

        let claims = decode::<GoogleClaims>(credential, &key, &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::GoogleExpired,
                ErrorKind::InvalidAudience => AuthError::GoogleAudience,
                ErrorKind::InvalidIssuer => AuthError::GoogleIssuer,
                _ => {
                    debug!(error = %e, "Google ID token rejected");
                    AuthError::GoogleInvalid
                }
            })?
            .claims;

        let email = claims.email.as_deref().map(str::to_lowercase);
        if !self.allowed_emails.is_empty()
            && !email
                .as_ref()
                .is_some_and(|email| self.allowed_emails.contains(email))
        {
            warn!(email = ?email, "Google account not in the allow-list");
            return Err(AuthError::EmailNotAllowed);
        }

        let name = claims
            .name
            .filter(|name| !name.trim().is_empty())
            .or(claims.email)
            .unwrap_or_else(|| "Google Admin".to_string());

        info!(subject = %claims.sub, "Google admin verified");
        Ok(GoogleIdentity {
            subject: format!("google:{}", claims.sub),
            name,
        })
    }
}
