use std::sync::Arc;

use sqlx::PgPool;
use tracing::{debug, info};

use crate::config::Config;
use crate::services::google::GoogleVerifier;
use crate::services::jwt::JwtService;
use crate::services::metadata::MetadataService;
use crate::services::twitch::TwitchVerifier;

/// Application state shared across requests. Needs to be thread-safe.
pub struct AppState {
    /// The PostgreSQL database connection pool.
    pub db_pool: PgPool,
    /// Runtime settings loaded at startup.
    pub config: Config,
    /// Admin session token service.
    pub jwt_service: JwtService,
    /// Google ID token verifier, owner of the JWKS cache.
    pub google: GoogleVerifier,
    pub twitch: TwitchVerifier,
    /// Resolves song links to title, artist and thumbnail.
    pub metadata_service: Arc<dyn MetadataService>,
}

impl AppState {
    /// Creates a new application state with the provided services.
    ///
    /// # Arguments
    ///
    /// * `db_pool` - PostgreSQL database connection pool
    /// * `config` - Runtime settings
    /// * `google` - Google ID token verifier
    /// * `twitch` - Twitch token verifier
    /// * `metadata_service` - Song metadata provider
    pub fn new(
        db_pool: PgPool,
        config: Config,
        google: GoogleVerifier,
        twitch: TwitchVerifier,
        metadata_service: Arc<dyn MetadataService>,
    ) -> Self {
        info!("Initializing application state");
        let jwt_service = JwtService::new(config.jwt_secret.as_bytes(), config.admin_token_ttl);
        debug!(
            token_ttl_secs = jwt_service.token_ttl().as_secs(),
            submission_ttl_secs = config.submission_ttl.as_secs(),
            "Session and submission lifetimes configured"
        );

        Self {
            db_pool,
            config,
            jwt_service,
            google,
            twitch,
            metadata_service,
        }
    }
}
