//! # Admin Authentication
//!
//! Shared pieces of the three admin login flows:
//!
//! - [`AuthError`], the failure type every flow reports, with its HTTP status
//!   and the French message shown by the frontend
//! - [`AdminSession`], the verified session attached to protected requests
//! - [`authenticate_password`], the local e-mail/password flow
//!
//! Google and Twitch verification live in [`super::google`] and
//! [`super::twitch`]. All flows finish with
//! [`super::jwt::JwtService::issue_admin_token`].

use axum::http::StatusCode;
use sqlx::PgPool;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::error::AppResult;
use crate::models::admin_user::AdminUser;
use crate::services::admin_users;
use crate::services::jwt::{Claims, JwtError, Provider};
use crate::services::password::{dummy_verify, verify_password};
use crate::utils::validator::EMAIL_REGEX;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingBearer,
    #[error("invalid session token")]
    InvalidSession,
    #[error("session token expired")]
    SessionExpired,
    #[error("session token lacks the admin role")]
    Forbidden,
    #[error("session token could not be issued")]
    Issue(#[source] jsonwebtoken::errors::Error),

    #[error("Google credential missing")]
    MissingGoogleCredential,
    #[error("GOOGLE_CLIENT_ID is not configured")]
    GoogleNotConfigured,
    #[error("malformed Google ID token")]
    GoogleMalformed,
    #[error("no Google key matches the token kid")]
    GoogleKeyNotFound,
    #[error("Google keys could not be fetched")]
    GoogleKeysUnavailable,
    #[error("Google ID token expired")]
    GoogleExpired,
    #[error("Google ID token issued for another client")]
    GoogleAudience,
    #[error("Google ID token has an unexpected issuer")]
    GoogleIssuer,
    #[error("Google ID token rejected")]
    GoogleInvalid,
    #[error("Google account not allowed")]
    EmailNotAllowed,

    #[error("Twitch token or code missing")]
    MissingTwitchCredential,
    #[error("TWITCH_CLIENT_ID is not configured")]
    TwitchNotConfigured,
    #[error("TWITCH_CLIENT_SECRET is not configured")]
    TwitchSecretNotConfigured,
    #[error("Twitch redirect URI missing")]
    TwitchMissingRedirect,
    #[error("Twitch authorization code rejected")]
    TwitchCodeRejected,
    #[error("Twitch access token rejected")]
    TwitchInvalidToken,
    #[error("Twitch unreachable")]
    TwitchUnreachable,
    #[error("Twitch token issued for another client")]
    TwitchClientMismatch,
    #[error("Twitch login not allowed")]
    TwitchLoginNotAllowed,

    #[error("password login disabled")]
    PasswordLoginDisabled,
    #[error("email and password required")]
    MissingPasswordFields,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("account disabled")]
    AccountDisabled,
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::Forbidden
            | AuthError::EmailNotAllowed
            | AuthError::TwitchLoginNotAllowed
            | AuthError::PasswordLoginDisabled
            | AuthError::AccountDisabled => StatusCode::FORBIDDEN,
            AuthError::TwitchMissingRedirect | AuthError::MissingPasswordFields => {
                StatusCode::BAD_REQUEST
            }
            AuthError::Issue(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    pub fn detail(&self) -> &'static str {
        match self {
            AuthError::MissingBearer => "Authentification requise",
            AuthError::InvalidSession => "Jeton invalide",
            AuthError::SessionExpired => "Session expirée",
            AuthError::Forbidden => "Accès refusé",
            AuthError::Issue(_) => "Erreur interne du serveur",
            AuthError::MissingGoogleCredential => "Credential Google manquant",
            AuthError::GoogleNotConfigured => "GOOGLE_CLIENT_ID non configuré",
            AuthError::GoogleMalformed => "Token Google mal formé",
            AuthError::GoogleKeyNotFound => "Clé Google introuvable pour le token fourni",
            AuthError::GoogleKeysUnavailable => "Impossible de vérifier le token Google",
            AuthError::GoogleExpired => "Token Google expiré",
            AuthError::GoogleAudience => "Client Google non autorisé",
            AuthError::GoogleIssuer => "Émetteur Google invalide",
            AuthError::GoogleInvalid => "Token Google invalide",
            AuthError::EmailNotAllowed => "Adresse non autorisée",
            AuthError::MissingTwitchCredential => "Token Twitch manquant",
            AuthError::TwitchNotConfigured => "TWITCH_CLIENT_ID non configuré",
            AuthError::TwitchSecretNotConfigured => "TWITCH_CLIENT_SECRET non configuré",
            AuthError::TwitchMissingRedirect => "redirect_uri manquant",
            AuthError::TwitchCodeRejected => "Code Twitch invalide",
            AuthError::TwitchInvalidToken => "Token Twitch invalide",
            AuthError::TwitchUnreachable => "Impossible de contacter Twitch",
            AuthError::TwitchClientMismatch => "Client Twitch non autorisé",
            AuthError::TwitchLoginNotAllowed => "Compte Twitch non autorisé",
            AuthError::PasswordLoginDisabled => "Connexion par mot de passe désactivée",
            AuthError::MissingPasswordFields => "Email et mot de passe requis",
            AuthError::InvalidCredentials => "Identifiants invalides",
            AuthError::AccountDisabled => "Compte désactivé",
        }
    }
}

impl From<JwtError> for AuthError {
    fn from(e: JwtError) -> Self {
        match e {
            JwtError::EncodingError(inner) => AuthError::Issue(inner),
            JwtError::InvalidToken => AuthError::InvalidSession,
            JwtError::TokenExpired => AuthError::SessionExpired,
            JwtError::NotAdmin => AuthError::Forbidden,
        }
    }
}

/// Verified admin session, inserted as a request extension by
/// [`crate::middleware::auth::require_admin`].
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub subject: String,
    pub name: String,
    pub provider: Provider,
}

impl From<Claims> for AdminSession {
    fn from(claims: Claims) -> Self {
        Self {
            subject: claims.sub,
            name: claims.name,
            provider: claims.provider,
        }
    }
}

/// Checks an e-mail/password pair against the local admin accounts.
///
/// Unknown e-mails and wrong passwords are indistinguishable to the caller.
#[instrument(skip(db_pool, password))]
pub async fn authenticate_password(
    db_pool: &PgPool,
    password_login_enabled: bool,
    email: &str,
    password: &str,
) -> AppResult<AdminUser> {
    if !password_login_enabled {
        debug!("Password login attempted while disabled");
        return Err(AuthError::PasswordLoginDisabled.into());
    }
    if email.trim().is_empty() || password.is_empty() {
        return Err(AuthError::MissingPasswordFields.into());
    }
    if !EMAIL_REGEX.is_match(email.trim()) {
        debug!("Malformed admin e-mail");
        return Err(AuthError::InvalidCredentials.into());
    }

    let Some(user) = admin_users::get_by_email(db_pool, email).await? else {
        dummy_verify(password);
        debug!("Unknown admin e-mail");
        return Err(AuthError::InvalidCredentials.into());
    };

    if !verify_password(password, &user.password_hash) {
        warn!(user_id = user.id, "Wrong admin password");
        return Err(AuthError::InvalidCredentials.into());
    }

    if !user.is_active {
        warn!(user_id = user.id, "Login attempt on a disabled admin account");
        return Err(AuthError::AccountDisabled.into());
    }

    info!(user_id = user.id, "Admin authenticated with password");
    Ok(user)
}
