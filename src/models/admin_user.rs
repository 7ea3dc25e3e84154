use sqlx::FromRow;
use time::OffsetDateTime;

/// A local administrator account for the e-mail/password flow.
#[derive(Debug, Clone, FromRow)]
pub struct AdminUser {
    pub id: i32,
    pub email: String,
    /// Argon2 PHC string
    pub password_hash: String,
    pub display_name: Option<String>,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
}

impl AdminUser {
    /// Name shown in the admin UI and carried in the session token.
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.email)
    }
}
