//! # Centralized Error Handling
//!
//! This module provides a unified error handling system for the application.
//! It centralizes error logging and HTTP response generation. Client-facing
//! messages are French, as displayed by the frontend, and are sent as
//! `{"detail": "..."}` bodies.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use crate::services::auth::AuthError;
use crate::services::metadata::MetadataError;

/// Central application error type that encompasses all possible error conditions.
///
/// _Db and body errors are logged automatically, while other errors should be logged
/// at the point of creation if needed._
#[derive(Error, Debug)]
pub enum AppError {
    #[error("database error")]
    Db(#[from] sqlx::Error),

    #[error("not found: {0}")]
    NotFound(&'static str),

    #[error("bad request: {0}")]
    BadRequest(&'static str),

    #[error("invalid JSON body: {0}")]
    InvalidJson(#[from] JsonRejection),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error("internal server error")]
    Internal,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    detail: &'a str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Db(e) = &self {
            error!(?e, "Database error occurred");
        }
        if let AppError::InvalidJson(rejection) = &self {
            warn!(%rejection, "Rejected request body");
        }

        let (status, detail) = match &self {
            AppError::Db(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Erreur de base de données"),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, *msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, *msg),
            AppError::InvalidJson(_) => (StatusCode::BAD_REQUEST, "Corps de requête invalide"),
            AppError::Auth(e) => (e.status(), e.detail()),
            AppError::Metadata(e) => (StatusCode::BAD_GATEWAY, e.detail()),
            AppError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "Erreur interne du serveur"),
        };

        (status, Json(ErrorBody { detail })).into_response()
    }
}

/// Convenience Result type alias that uses AppError as the error type.
pub type AppResult<T> = Result<T, AppError>;
