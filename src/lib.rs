//! # reco - Stream Song Recommendation Backend
//!
//! Viewers suggest YouTube and Spotify songs; duplicates become votes,
//! moderators curate the queue with ban rules, and time-boxed submission
//! requests let a viewer answer a `!reco` command with a link.
//!
//! ## Modules
//!
//! - [`handlers`] - HTTP request handlers for various endpoints
//! - [`middleware`] - The admin authorization gate
//! - [`services`] - Business logic (dedup, ban rules, ledger, auth, metadata)
//! - [`models`] - Database rows, payloads and shared state
//! - [`config`] - Environment configuration
//! - [`utils`] - Utility functions and constants

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

use std::sync::Arc;

use axum::{
    Router,
    http::HeaderValue,
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
};
use sqlx::PgPool;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::Config;
use crate::handlers::frontend::{FrontendMode, frontend_router};
use crate::handlers::*;
use crate::middleware::require_admin;
use crate::models::AppState;
use crate::services::google::GoogleVerifier;
use crate::services::metadata::{MetadataService, OEmbedMetadataService};
use crate::services::twitch::TwitchVerifier;
use crate::utils::constant::UPSTREAM_HTTP_TIMEOUT;

/// Creates an Axum router with the production metadata service.
///
/// This is a convenience function that calls [`app_with_metadata_service`]
/// with no custom metadata service.
#[inline]
pub fn app(db_pool: PgPool, config: Config) -> Router {
    app_with_metadata_service(db_pool, config, None)
}

/// Creates an Axum router with application routes and state.
///
/// # Arguments
///
/// * `db_pool` - PostgreSQL database connection pool
/// * `config` - Runtime settings
/// * `metadata_service` - Optional custom metadata service. If None, the
///   oEmbed implementation is used
///
/// # Returns
///
/// A configured Axum router with all application routes and middleware
pub fn app_with_metadata_service(
    db_pool: PgPool,
    config: Config,
    metadata_service: Option<Arc<dyn MetadataService>>,
) -> Router {
    let http_client = build_http_client();

    let metadata_service = metadata_service
        .unwrap_or_else(|| Arc::new(OEmbedMetadataService::new(http_client.clone())));

    let google = GoogleVerifier::new(
        http_client.clone(),
        config.google_client_id.clone(),
        config.allowed_google_emails.clone(),
    );
    let twitch = TwitchVerifier::new(
        http_client,
        config.twitch_client_id.clone(),
        config.twitch_client_secret.clone(),
        config.twitch_redirect_uri.clone(),
        config.allowed_twitch_logins.clone(),
    );

    app_with_state(AppState::new(db_pool, config, google, twitch, metadata_service))
}

/// Creates the router around a fully assembled state.
///
/// Lets tests point the OAuth verifiers at local mock servers.
pub fn app_with_state(state: AppState) -> Router {
    let frontend = frontend_router(FrontendMode::from_config(&state.config));
    let cors = cors_layer(&state.config.cors_origins);
    let state = Arc::new(state);

    let admin_routes = Router::new()
        .route("/songs", post(add_song))
        .route("/songs/{id}", delete(delete_song))
        .route("/ban", get(list_ban_rules).post(create_ban_rule))
        .route("/ban/{id}", put(update_ban_rule).delete(delete_ban_rule))
        .route("/submission-requests", post(create_submission_request))
        .route("/auth/session", get(current_session))
        .route_layer(from_fn_with_state(Arc::clone(&state), require_admin));

    let public_routes = Router::new()
        .route("/health-check", get(health_check))
        .route("/songs", get(list_songs))
        .route("/songs/{id}/vote", post(vote_song))
        .route("/public-submissions", post(submit_song))
        .route("/submission-requests/active", get(list_active_requests))
        .route("/submission-requests/{token}", get(get_submission_request))
        .route(
            "/submission-requests/{token}/submit",
            post(fulfill_submission_request),
        )
        .route("/auth/config", get(auth_config))
        .route("/auth/google", post(login_google))
        .route("/auth/twitch", post(login_twitch))
        .route("/auth/password", post(login_password));

    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .merge(frontend)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Shared outbound client; every upstream call is bounded by the same timeout.
fn build_http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(UPSTREAM_HTTP_TIMEOUT)
        .build()
        .unwrap_or_else(|e| {
            warn!(error = %e, "Falling back to a default HTTP client");
            reqwest::Client::new()
        })
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    info!(origins = ?origins, "CORS origins configured");

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}
