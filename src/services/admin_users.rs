//! Persistence for local admin accounts and the startup bootstrap.

use sqlx::PgPool;
use tracing::{debug, info, instrument, warn};

use crate::config::DefaultAdmin;
use crate::error::{AppError, AppResult};
use crate::models::admin_user::AdminUser;
use crate::services::password::hash_password;

/// Case-insensitive lookup; a blank e-mail finds nothing.
pub async fn get_by_email(db_pool: &PgPool, email: &str) -> Result<Option<AdminUser>, sqlx::Error> {
    let normalized = email.trim().to_lowercase();
    if normalized.is_empty() {
        return Ok(None);
    }

    sqlx::query_as::<_, AdminUser>(
        r#"
        SELECT id, email, password_hash, display_name, is_active, created_at
        FROM admin_users
        WHERE LOWER(email) = $1
        LIMIT 1
        "#,
    )
    .bind(normalized)
    .fetch_optional(db_pool)
    .await
}

/// Inserts an account; the e-mail is stored trimmed and lowercased.
#[instrument(skip(db_pool, password_hash))]
pub async fn create_user(
    db_pool: &PgPool,
    email: &str,
    password_hash: &str,
    display_name: Option<&str>,
    is_active: bool,
) -> Result<AdminUser, sqlx::Error> {
    sqlx::query_as::<_, AdminUser>(
        r#"
        INSERT INTO admin_users (email, password_hash, display_name, is_active)
        VALUES ($1, $2, $3, $4)
        RETURNING id, email, password_hash, display_name, is_active, created_at
        "#,
    )
    .bind(email.trim().to_lowercase())
    .bind(password_hash)
    .bind(display_name)
    .bind(is_active)
    .fetch_one(db_pool)
    .await
}

/// Creates the configured default admin account when it does not exist yet.
///
/// Does nothing when password login is disabled or no default account is
/// configured. A plain `ADMIN_DEFAULT_PASSWORD` is hashed here; an explicit
/// `ADMIN_DEFAULT_PASSWORD_HASH` wins over it.
#[instrument(skip_all)]
pub async fn ensure_default_admin_user(
    db_pool: &PgPool,
    password_login_enabled: bool,
    default_admin: Option<&DefaultAdmin>,
) -> AppResult<()> {
    if !password_login_enabled {
        info!("Password login disabled, no default admin account created");
        return Ok(());
    }

    let Some(admin) = default_admin else {
        debug!("No default admin account configured");
        return Ok(());
    };

    let password_hash = match (&admin.password_hash, &admin.password) {
        (Some(hash), _) => hash.clone(),
        (None, Some(password)) => hash_password(password).map_err(|e| {
            warn!(error = %e, "Failed to hash the default admin password");
            AppError::Internal
        })?,
        (None, None) => {
            warn!(
                email = %admin.email,
                "Default admin e-mail set without ADMIN_DEFAULT_PASSWORD_HASH or ADMIN_DEFAULT_PASSWORD"
            );
            return Ok(());
        }
    };

    if let Some(existing) = get_by_email(db_pool, &admin.email).await? {
        debug!(email = %existing.email, "Default admin account already present");
        return Ok(());
    }

    create_user(
        db_pool,
        &admin.email,
        &password_hash,
        admin.display_name.as_deref(),
        true,
    )
    .await?;
    info!(email = %admin.email, "Default admin account created");
    Ok(())
}
