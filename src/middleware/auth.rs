//! # Admin Gate
//!
//! The only authorization check in the application. Every admin route is
//! layered with [`require_admin`], whatever login flow produced the token.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, instrument, trace, warn};

use crate::error::AppError;
use crate::models::AppState;
use crate::services::auth::{AdminSession, AuthError};

/// Admin authorization middleware
///
/// # Authentication Flow
///
/// 1. Extracts `Authorization` header with `Bearer <token>` format
/// 2. Validates the session token signature, expiry and `admin` role
/// 3. Adds [`AdminSession`] to request extensions for handler access
///
/// # Returns
///
/// - **Success**: Continues to next handler with the admin session
/// - **Failure**: `401` for a missing, malformed, forged or expired token,
///   `403` for a genuine token without the admin role
#[instrument(
    skip_all,
    fields(
        method = %req.method(),
        uri = %req.uri(),
        request_id = %uuid::Uuid::new_v4()
    )
)]
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    trace!("Checking admin session");

    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());

    let Some(token) = token else {
        warn!("Missing or malformed Authorization header");
        return AppError::from(AuthError::MissingBearer).into_response();
    };

    match state.jwt_service.validate_admin_token(token) {
        Ok(claims) => {
            debug!(subject = %claims.sub, provider = %claims.provider, "Admin session accepted");
            req.extensions_mut().insert(AdminSession::from(claims));
            next.run(req).await
        }
        Err(e) => {
            warn!(error = %e, "Admin session rejected");
            AppError::from(AuthError::from(e)).into_response()
        }
    }
}
