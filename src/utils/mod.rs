//! # Utility Modules
//!
//! This module contains utility functions, constants, and validators used
//! throughout the reco backend.
//!
//! ## Available Utilities
//!
//! - **Constants** (`constant`) - Application-wide defaults and fixed limits
//! - **Database URL** (`database_url`) - Connection string discovery and cleanup
//! - **Extractors** (`extract`) - JSON bodies rejected as `{"detail"}` errors
//! - **Secrets** (`secret`) - `*_FILE` aware secret lookup
//! - **Text** (`text`) - Normalized comparison keys for fuzzy matching
//! - **Validators** (`validator`) - Input validation utilities and regex patterns

pub mod constant;
pub mod database_url;
pub mod extract;
pub mod secret;
pub mod text;
pub mod validator;
