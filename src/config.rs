//! # Configuration
//!
//! All runtime settings come from environment variables (optionally loaded
//! from a `.env` file by `dotenvy` in `main`). [`Config::from_lookup`] takes a
//! lookup function so tests can build a configuration without touching the
//! process environment.

use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};

use crate::utils::constant::*;
use crate::utils::secret::get_secret;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("ADMIN_JWT_SECRET (or ADMIN_JWT_SECRET_FILE) must be set")]
    MissingJwtSecret,
    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

/// Settings for the account created at startup for password login.
#[derive(Debug, Clone)]
pub struct DefaultAdmin {
    pub email: String,
    pub password_hash: Option<String>,
    pub password: Option<String>,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub app_env: AppEnv,
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub jwt_secret: String,
    pub admin_token_ttl: Duration,
    pub submission_ttl: Duration,
    pub google_client_id: Option<String>,
    /// Lowercased; empty means every verified Google account is accepted
    pub allowed_google_emails: Vec<String>,
    pub twitch_client_id: Option<String>,
    pub twitch_client_secret: Option<String>,
    pub twitch_redirect_uri: Option<String>,
    /// Lowercased; empty means every Twitch login is accepted
    pub allowed_twitch_logins: Vec<String>,
    pub password_login_enabled: bool,
    pub default_admin: Option<DefaultAdmin>,
    pub frontend_dist_path: Option<PathBuf>,
    pub frontend_submit_redirect: Option<String>,
}

impl Config {
    /// Loads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads the configuration using `lookup` to resolve variables.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::MissingJwtSecret`] when no session signing secret is set
    /// - [`ConfigError::Invalid`] when a numeric or boolean variable does not parse
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let app_env = match var("APP_ENV").map(|v| v.to_ascii_lowercase()).as_deref() {
            Some("production") => AppEnv::Production,
            _ => AppEnv::Development,
        };

        let jwt_secret = get_secret(&lookup, "ADMIN_JWT_SECRET_FILE", "ADMIN_JWT_SECRET")
            .ok_or(ConfigError::MissingJwtSecret)?;

        let default_admin = var("ADMIN_DEFAULT_EMAIL").map(|email| DefaultAdmin {
            email,
            password_hash: var("ADMIN_DEFAULT_PASSWORD_HASH"),
            password: get_secret(&lookup, "ADMIN_DEFAULT_PASSWORD_FILE", "ADMIN_DEFAULT_PASSWORD"),
            display_name: var("ADMIN_DEFAULT_NAME"),
        });

        let config = Self {
            app_env,
            port: parse_or("APP_PORT", var("APP_PORT"), DEFAULT_PORT)?,
            cors_origins: split_list(var("CORS_ORIGINS"), false),
            jwt_secret,
            admin_token_ttl: minutes(parse_or(
                "ADMIN_TOKEN_TTL_MINUTES",
                var("ADMIN_TOKEN_TTL_MINUTES"),
                DEFAULT_ADMIN_TOKEN_TTL_MINUTES,
            )?),
            submission_ttl: minutes(parse_or(
                "SUBMISSION_TTL_MINUTES",
                var("SUBMISSION_TTL_MINUTES"),
                DEFAULT_SUBMISSION_TTL_MINUTES,
            )?),
            google_client_id: var("GOOGLE_CLIENT_ID"),
            allowed_google_emails: split_list(var("ALLOWED_GOOGLE_EMAILS"), true),
            twitch_client_id: var("TWITCH_CLIENT_ID"),
            twitch_client_secret: get_secret(
                &lookup,
                "TWITCH_CLIENT_SECRET_FILE",
                "TWITCH_CLIENT_SECRET",
            ),
            twitch_redirect_uri: var("TWITCH_REDIRECT_URI"),
            allowed_twitch_logins: split_list(var("ALLOWED_TWITCH_LOGINS"), true),
            password_login_enabled: parse_bool(
                "PASSWORD_LOGIN_ENABLED",
                var("PASSWORD_LOGIN_ENABLED"),
                true,
            )?,
            default_admin,
            frontend_dist_path: var("FRONTEND_DIST_PATH").map(PathBuf::from),
            frontend_submit_redirect: var("FRONTEND_SUBMIT_REDIRECT"),
        };

        info!(
            app_env = ?config.app_env,
            port = config.port,
            cors_origins = ?config.cors_origins,
            google_login = config.google_client_id.is_some(),
            twitch_login = config.twitch_client_id.is_some(),
            password_login = config.password_login_enabled,
            "Configuration loaded"
        );

        Ok(config)
    }
}

fn minutes(value: u64) -> Duration {
    Duration::from_secs(value * 60)
}

fn parse_or<T>(key: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr + Display,
    T::Err: Display,
{
    match value {
        None => {
            info!("{key} not set, using default: {default}");
            Ok(default)
        }
        Some(raw) => raw.parse::<T>().map_err(|e| {
            warn!("Invalid {key} value: {e}");
            ConfigError::Invalid {
                key,
                message: e.to_string(),
            }
        }),
    }
}

fn parse_bool(key: &'static str, value: Option<String>, default: bool) -> Result<bool, ConfigError> {
    let Some(raw) = value else {
        return Ok(default);
    };
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::Invalid {
            key,
            message: format!("expected a boolean, got `{other}`"),
        }),
    }
}

/// Splits a comma-separated list, dropping blanks.
fn split_list(value: Option<String>, lowercase: bool) -> Vec<String> {
    value
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            if lowercase {
                item.to_lowercase()
            } else {
                item.trim_end_matches('/').to_string()
            }
        })
        .collect()
}
