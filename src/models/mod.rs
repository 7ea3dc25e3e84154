pub mod admin_user;
pub mod ban_rule;
pub mod song;
mod state;
pub mod submission_request;

pub use admin_user::AdminUser;
pub use ban_rule::{BanRule, BanRulePayload};
pub use song::{Song, SongCandidate};
pub use state::AppState;
pub use submission_request::{SubmissionRequest, SubmissionRequestPublic};
