//! # Twitch Login
//!
//! Admins sign in with a Twitch user access token (implicit flow) or an
//! authorization code (code flow, requires the client secret). Either way
//! the token is validated against `id.twitch.tv/oauth2/validate` and must
//! belong to our client id.

use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use crate::services::auth::AuthError;
use crate::utils::constant::{TWITCH_HELIX_BASE_URL, TWITCH_OAUTH_BASE_URL};

/// What the admin sent to `/auth/twitch`.
#[derive(Debug, Clone)]
pub enum TwitchCredentials {
    AccessToken(String),
    Code {
        code: String,
        redirect_uri: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TwitchIdentity {
    /// `twitch:<user_id>`
    pub subject: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct ValidateResponse {
    client_id: String,
    #[serde(default)]
    login: Option<String>,
    #[serde(default)]
    user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct HelixUsers {
    data: Vec<HelixUser>,
}

#[derive(Debug, Deserialize)]
struct HelixUser {
    display_name: String,
}

pub struct TwitchVerifier {
    http_client: reqwest::Client,
    client_id: Option<String>,
    client_secret: Option<String>,
    redirect_uri: Option<String>,
    allowed_logins: Vec<String>,
    oauth_base_url: String,
    helix_base_url: String,
}

impl TwitchVerifier {
    pub fn new(
        http_client: reqwest::Client,
        client_id: Option<String>,
        client_secret: Option<String>,
        redirect_uri: Option<String>,
        allowed_logins: Vec<String>,
    ) -> Self {
        Self {
            http_client,
            client_id,
            client_secret,
            redirect_uri,
            allowed_logins,
            oauth_base_url: TWITCH_OAUTH_BASE_URL.to_string(),
            helix_base_url: TWITCH_HELIX_BASE_URL.to_string(),
        }
    }

    /// Points the verifier at other Twitch endpoints.
    pub fn with_base_urls(
        mut self,
        oauth_base_url: impl Into<String>,
        helix_base_url: impl Into<String>,
    ) -> Self {
        self.oauth_base_url = oauth_base_url.into();
        self.helix_base_url = helix_base_url.into();
        self
    }

    pub fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }

    #[instrument(skip_all)]
    pub async fn verify(&self, credentials: TwitchCredentials) -> Result<TwitchIdentity, AuthError> {
        let client_id = self
            .client_id
            .as_deref()
            .ok_or(AuthError::TwitchNotConfigured)?;

        let access_token = match credentials {
            TwitchCredentials::AccessToken(token) => token,
            TwitchCredentials::Code { code, redirect_uri } => {
                self.exchange_code(client_id, &code, redirect_uri).await?
            }
        };

        let validated = self.validate_token(client_id, &access_token).await?;

        if validated.client_id != client_id {
            warn!(client_id = %validated.client_id, "Twitch token issued for another client");
            return Err(AuthError::TwitchClientMismatch);
        }

        let login = validated.login.unwrap_or_default();
        if !self.allowed_logins.is_empty() && !self.allowed_logins.contains(&login.to_lowercase())
        {
            warn!(login = %login, "Twitch login not in the allow-list");
            return Err(AuthError::TwitchLoginNotAllowed);
        }

        let subject = format!("twitch:{}", validated.user_id.unwrap_or_default());
        let name = match self.display_name(client_id, &access_token).await {
            Some(display_name) => display_name,
            None if !login.is_empty() => login,
            None => subject.clone(),
        };

        info!(subject = %subject, "Twitch admin verified");
        Ok(TwitchIdentity { subject, name })
    }

    /// Validates with the `OAuth` scheme, retrying once with `Bearer` on 401.
    async fn validate_token(
        &self,
        client_id: &str,
        access_token: &str,
    ) -> Result<ValidateResponse, AuthError> {
        let url = format!("{}/validate", self.oauth_base_url);

        let mut response = self
            .send_validate(&url, client_id, &format!("OAuth {access_token}"))
            .await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            debug!("Twitch refused the OAuth scheme, retrying with Bearer");
            response = self
                .send_validate(&url, client_id, &format!("Bearer {access_token}"))
                .await?;
        }

        let response = response.error_for_status().map_err(|e| {
            debug!(error = %e, "Twitch token validation failed");
            AuthError::TwitchInvalidToken
        })?;

        response.json::<ValidateResponse>().await.map_err(|e| {
            warn!(error = %e, "Unexpected Twitch validate response");
            AuthError::TwitchInvalidToken
        })
    }

    async fn send_validate(
        &self,
        url: &str,
        client_id: &str,
        authorization: &str,
    ) -> Result<reqwest::Response, AuthError> {
        self.http_client
            .get(url)
            .header("Authorization", authorization)
            .header("Client-Id", client_id)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Twitch unreachable");
                AuthError::TwitchUnreachable
            })
    }

    async fn exchange_code(
        &self,
        client_id: &str,
        code: &str,
        redirect_uri: Option<String>,
    ) -> Result<String, AuthError> {
        let client_secret = self
            .client_secret
            .as_deref()
            .ok_or(AuthError::TwitchSecretNotConfigured)?;
        let redirect_uri = redirect_uri
            .filter(|uri| !uri.trim().is_empty())
            .or_else(|| self.redirect_uri.clone())
            .ok_or(AuthError::TwitchMissingRedirect)?;

        let response = self
            .http_client
            .post(format!("{}/token", self.oauth_base_url))
            .form(&[
                ("client_id", client_id),
                ("client_secret", client_secret),
                ("code", code),
                ("grant_type", "authorization_code"),
                ("redirect_uri", redirect_uri.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Twitch unreachable");
                AuthError::TwitchUnreachable
            })?;

        let response = response.error_for_status().map_err(|e| {
            debug!(error = %e, "Twitch rejected the authorization code");
            AuthError::TwitchCodeRejected
        })?;

        let token = response.json::<TokenResponse>().await.map_err(|e| {
            warn!(error = %e, "Unexpected Twitch token response");
            AuthError::TwitchCodeRejected
        })?;
        debug!("Twitch authorization code exchanged");
        Ok(token.access_token)
    }

    /// Best-effort Helix lookup; any failure yields `None`.
    async fn display_name(&self, client_id: &str, access_token: &str) -> Option<String> {
        let response = self
            .http_client
            .get(format!("{}/users", self.helix_base_url))
            .bearer_auth(access_token)
            .header("Client-Id", client_id)
            .send()
            .await
            .and_then(|res| res.error_for_status());

        let users = match response {
            Ok(res) => res.json::<HelixUsers>().await.ok(),
            Err(e) => {
                debug!(error = %e, "Helix user lookup failed");
                None
            }
        }?;

        users
            .data
            .into_iter()
            .next()
            .map(|user| user.display_name)
            .filter(|name| !name.trim().is_empty())
    }
}
