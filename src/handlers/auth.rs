//! # Admin Authentication Handlers
//!
//! Three login flows produce the same admin session token:
//!
//! 1. Google Sign-In: the frontend posts the Google ID token
//! 2. Twitch: the frontend posts a user access token, or an authorization
//!    code to be exchanged server-side
//! 3. E-mail and password against the local admin accounts
//!
//! `GET /auth/config` tells the frontend which flows are available.

use std::sync::Arc;

use axum::{
    Extension,
    extract::{Json, State},
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::error::AppResult;
use crate::models::AppState;
use crate::services::auth::{AdminSession, AuthError, authenticate_password};
use crate::services::jwt::Provider;
use crate::services::twitch::TwitchCredentials;
use crate::utils::extract::JsonBody;
use crate::utils::validator::blank_to_none;

/// Login flows the frontend may offer.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthConfigResponse {
    pub google_client_id: Option<String>,
    pub twitch_client_id: Option<String>,
    pub password_login_enabled: bool,
}

#[derive(Debug, Deserialize)]
pub struct GoogleLoginRequest {
    #[serde(default)]
    pub credential: Option<String>,
}

/// Either `access_token`, or `code` with an optional `redirect_uri`.
#[derive(Debug, Deserialize)]
pub struct TwitchLoginRequest {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub redirect_uri: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PasswordLoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Response containing the admin session token after a successful login
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub provider: Provider,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub subject: String,
    pub name: String,
    pub provider: Provider,
}

/// GET /auth/config
#[instrument(skip(state))]
pub async fn auth_config(State(state): State<Arc<AppState>>) -> Json<AuthConfigResponse> {
    Json(AuthConfigResponse {
        google_client_id: state.google.client_id().map(str::to_string),
        twitch_client_id: state.twitch.client_id().map(str::to_string),
        password_login_enabled: state.config.password_login_enabled,
    })
}

fn issue(
    state: &AppState,
    subject: &str,
    name: String,
    provider: Provider,
) -> AppResult<Json<LoginResponse>> {
    let token = state
        .jwt_service
        .issue_admin_token(subject, &name, provider)
        .map_err(AuthError::from)?;
    info!(subject, provider = %provider, "Admin session issued");
    Ok(Json(LoginResponse {
        token,
        provider,
        name,
    }))
}

/// POST /auth/google
///
/// # Returns
///
/// - `200 OK` - Session token
/// - `401 Unauthorized` - Missing, forged, expired or foreign ID token
/// - `403 Forbidden` - Account not in `ALLOWED_GOOGLE_EMAILS`
#[instrument(skip_all, fields(request_id = %uuid::Uuid::new_v4()))]
pub async fn login_google(
    State(state): State<Arc<AppState>>,
    JsonBody(payload): JsonBody<GoogleLoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let credential =
        blank_to_none(payload.credential).ok_or(AuthError::MissingGoogleCredential)?;

    let identity = state.google.verify(&credential).await?;
    issue(&state, &identity.subject, identity.name, Provider::Google)
}

/// POST /auth/twitch
///
/// # Returns
///
/// - `200 OK` - Session token
/// - `400 Bad Request` - Code flow without any redirect URI
/// - `401 Unauthorized` - Token or code rejected, or issued for another client
/// - `403 Forbidden` - Login not in `ALLOWED_TWITCH_LOGINS`
#[instrument(skip_all, fields(request_id = %uuid::Uuid::new_v4()))]
pub async fn login_twitch(
    State(state): State<Arc<AppState>>,
    JsonBody(payload): JsonBody<TwitchLoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let credentials = match (
        blank_to_none(payload.access_token),
        blank_to_none(payload.code),
    ) {
        (Some(token), _) => TwitchCredentials::AccessToken(token),
        (None, Some(code)) => TwitchCredentials::Code {
            code,
            redirect_uri: blank_to_none(payload.redirect_uri),
        },
        (None, None) => return Err(AuthError::MissingTwitchCredential.into()),
    };

    let identity = state.twitch.verify(credentials).await?;
    issue(&state, &identity.subject, identity.name, Provider::Twitch)
}

/// POST /auth/password
///
/// # Returns
///
/// - `200 OK` - Session token
/// - `401 Unauthorized` - Unknown e-mail or wrong password
/// - `403 Forbidden` - Disabled account, or password login turned off
#[instrument(skip_all, fields(request_id = %uuid::Uuid::new_v4()))]
pub async fn login_password(
    State(state): State<Arc<AppState>>,
    JsonBody(payload): JsonBody<PasswordLoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let user = authenticate_password(
        &state.db_pool,
        state.config.password_login_enabled,
        &payload.email,
        &payload.password,
    )
    .await?;

    let subject = format!("password:{}", user.id);
    issue(&state, &subject, user.label().to_string(), Provider::Password)
}

/// Echoes the verified session, letting the frontend check a stored token.
///
/// GET /auth/session
#[instrument(skip_all)]
pub async fn current_session(Extension(session): Extension<AdminSession>) -> Json<SessionResponse> {
    Json(SessionResponse {
        subject: session.subject,
        name: session.name,
        provider: session.provider,
    })
}
