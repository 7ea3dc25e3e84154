use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use validator::Validate;

/// A `!reco` command waiting for the viewer to provide a link.
#[derive(Debug, Clone, FromRow)]
pub struct SubmissionRequest {
    pub id: i32,
    pub token: String,
    pub twitch_user: String,
    pub comment: Option<String>,
    pub created_at: OffsetDateTime,
    pub expires_at: OffsetDateTime,
    pub consumed_at: Option<OffsetDateTime>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SubmissionRequestCreate {
    #[validate(length(min = 1, max = 255))]
    pub twitch_user: String,
    #[validate(length(max = 500))]
    #[serde(default)]
    pub comment: Option<String>,
}

/// What viewers and the overlay see of a request.
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmissionRequestPublic {
    pub token: String,
    pub twitch_user: String,
    pub comment: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

impl From<SubmissionRequest> for SubmissionRequestPublic {
    fn from(request: SubmissionRequest) -> Self {
        Self {
            token: request.token,
            twitch_user: request.twitch_user,
            comment: request.comment,
            created_at: request.created_at,
            expires_at: request.expires_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SubmissionFulfillPayload {
    #[serde(default)]
    pub link: String,
}
