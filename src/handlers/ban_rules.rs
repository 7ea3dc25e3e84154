//! # Ban Rule Handlers
//!
//! Admin-only. Creating or updating a rule removes the songs it now matches.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use crate::error::{AppError, AppResult};
use crate::models::{AppState, BanRule, BanRulePayload};
use crate::services::ban_rules;
use crate::utils::extract::JsonBody;

const RULE_NOT_FOUND: &str = "Règle introuvable";

/// GET /ban
#[instrument(skip(state), fields(request_id = %uuid::Uuid::new_v4()))]
pub async fn list_ban_rules(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<BanRule>>> {
    Ok(Json(ban_rules::list_ban_rules(&state.db_pool).await?))
}

/// POST /ban
///
/// # Returns
///
/// - `200 OK` - The stored rule
/// - `400 Bad Request` - Every field is blank
#[instrument(skip(state), fields(request_id = %uuid::Uuid::new_v4()))]
pub async fn create_ban_rule(
    State(state): State<Arc<AppState>>,
    JsonBody(payload): JsonBody<BanRulePayload>,
) -> AppResult<Json<BanRule>> {
    let fields = payload.validated()?;
    let rule = ban_rules::add_ban_rule(&state.db_pool, fields).await?;
    Ok(Json(rule))
}

/// PUT /ban/{id}
#[instrument(skip(state), fields(request_id = %uuid::Uuid::new_v4()))]
pub async fn update_ban_rule(
    State(state): State<Arc<AppState>>,
    Path(rule_id): Path<i32>,
    JsonBody(payload): JsonBody<BanRulePayload>,
) -> AppResult<Json<BanRule>> {
    let fields = payload.validated()?;
    ban_rules::update_ban_rule(&state.db_pool, rule_id, fields)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound(RULE_NOT_FOUND))
}

/// DELETE /ban/{id}
#[instrument(skip(state), fields(request_id = %uuid::Uuid::new_v4()))]
pub async fn delete_ban_rule(
    State(state): State<Arc<AppState>>,
    Path(rule_id): Path<i32>,
) -> AppResult<StatusCode> {
    if ban_rules::delete_ban_rule(&state.db_pool, rule_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(RULE_NOT_FOUND))
    }
}
