//! # HTTP Request Handlers
//!
//! This module contains all HTTP request handlers of the reco backend.
//! Each handler is responsible for processing specific HTTP requests and
//! returning appropriate responses; business rules live in [`crate::services`].
//!
//! ## Available Handlers
//!
//! - **Auth** (`auth`) - Admin login flows and session introspection
//! - **Songs** (`songs`) - Queue listing, votes, admin additions and removals
//! - **Ban rules** (`ban_rules`) - Admin ban rule management
//! - **Public submissions** (`public_submissions`) - Viewer link suggestions
//! - **Submission requests** (`submission_requests`) - Time-boxed viewer tokens
//! - **Frontend** (`frontend`) - Single-page app shell
//! - **Health Check** (`health_check`) - Application health monitoring

mod auth;
mod ban_rules;
pub mod frontend;
mod health_check;
mod public_submissions;
mod songs;
mod submission_requests;

pub use auth::*;
pub use ban_rules::*;
pub use health_check::*;
pub use public_submissions::*;
pub use songs::*;
pub use submission_requests::*;
