//! # Frontend Shell
//!
//! The single-page frontend owns `/`, `/submit`, `/admin` and `/login`.
//! Depending on deployment the backend either serves the built bundle,
//! redirects to where the frontend is hosted, or answers a readiness
//! message on `/` alone.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{
    Json, Router,
    http::Uri,
    response::Redirect,
    routing::get,
};
use serde_json::{Value, json};
use tower_http::services::{ServeDir, ServeFile};
use tracing::{debug, info};

use crate::config::Config;
use crate::models::AppState;

/// Paths the single-page app routes on its own.
pub const SHELL_PATHS: [&str; 6] = ["/", "/submit", "/admin", "/admin/", "/login", "/login/"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrontendMode {
    /// Serve `index.html` and the assets of a built bundle.
    Dist(PathBuf),
    /// Redirect shell paths to this origin.
    Redirect(String),
    /// Only `/` answers, with a readiness message.
    Bare,
}

impl FrontendMode {
    pub fn from_config(config: &Config) -> Self {
        if let Some(dist) = &config.frontend_dist_path {
            if dist.join("index.html").is_file() {
                return FrontendMode::Dist(dist.clone());
            }
            debug!(path = %dist.display(), "FRONTEND_DIST_PATH has no index.html");
        }

        match redirect_base(config) {
            Some(base) => FrontendMode::Redirect(base),
            None => FrontendMode::Bare,
        }
    }
}

/// `FRONTEND_SUBMIT_REDIRECT` without its `/submit` suffix, else the first
/// CORS origin.
fn redirect_base(config: &Config) -> Option<String> {
    let from_submit = config.frontend_submit_redirect.as_deref().map(|url| {
        let url = url.trim_end_matches('/');
        url.strip_suffix("/submit").unwrap_or(url).to_string()
    });

    from_submit
        .or_else(|| config.cors_origins.first().cloned())
        .map(|base| base.trim_end_matches('/').to_string())
        .filter(|base| !base.is_empty())
}

pub fn frontend_router(mode: FrontendMode) -> Router<Arc<AppState>> {
    info!(mode = ?mode, "Frontend shell configured");

    match mode {
        FrontendMode::Dist(dist) => serve_dist(&dist),
        FrontendMode::Redirect(base) => {
            let redirect = move |uri: Uri| {
                let target = format!("{base}{}", uri.path());
                async move { Redirect::temporary(&target) }
            };
            SHELL_PATHS
                .iter()
                .fold(Router::new(), |router, path| {
                    router.route(path, get(redirect.clone()))
                })
        }
        FrontendMode::Bare => Router::new().route("/", get(backend_ready)),
    }
}

fn serve_dist(dist: &Path) -> Router<Arc<AppState>> {
    let index = ServeFile::new(dist.join("index.html"));
    SHELL_PATHS
        .iter()
        .fold(Router::new(), |router, path| {
            router.route_service(path, index.clone())
        })
        .fallback_service(ServeDir::new(dist))
}

async fn backend_ready() -> Json<Value> {
    Json(json!({ "message": "Backend prêt !" }))
}
