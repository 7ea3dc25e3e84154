//! # Business Logic Services
//!
//! This module contains the core business logic of the reco backend.
//! Services encapsulate domain-specific functionality and provide clean
//! interfaces for use by HTTP handlers and startup code.
//!
//! ## Available Services
//!
//! - **Songs** (`songs`) - Queue listing, deduplicated insertion, votes
//! - **Ban rules** (`ban_rules`) - Rule storage and the sweep it triggers
//! - **Submission requests** (`submission_requests`) - Time-boxed viewer tokens
//! - **Metadata** (`metadata`) - oEmbed lookups for YouTube and Spotify links
//! - **Auth** (`auth`, `google`, `twitch`, `password`, `admin_users`) - Admin login flows
//! - **JWT** (`jwt`) - Admin session token issuing and validation

pub mod admin_users;
pub mod auth;
pub mod ban_rules;
pub mod google;
pub mod jwt;
pub mod metadata;
pub mod password;
pub mod songs;
pub mod submission_requests;
pub mod twitch;
