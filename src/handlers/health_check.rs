use axum::http::StatusCode;
use tracing::{debug, instrument};

/// Liveness probe for the hosting platform.
///
/// GET /health-check
///
/// Answers `200 OK` with an empty body without touching the database, so a
/// cold or unreachable database does not restart the service.
#[instrument]
pub async fn health_check() -> StatusCode {
    debug!("Health check endpoint accessed");
    StatusCode::OK
}
