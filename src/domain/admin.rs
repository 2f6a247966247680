// Admin console payloads: credentials, comments and violation notices
use super::compliance::{Exceedance, StatusTier};
use super::reading::Reading;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub role: String,
}

/// Who, if anyone, the admin console is signed in as.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionStatus {
    pub authenticated: bool,
    pub user: Option<User>,
}

/// Enforcement actions an officer can record.
pub const ACTIONS: [&str; 3] = ["Notice Issued", "Fine Imposed", "Operations Closed"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminComment {
    pub id: i64,
    pub comment: String,
    pub action: Option<String>,
    pub officer: Option<String>,
    pub reading_id: Option<i64>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentRequest {
    pub industry_id: i64,
    pub reading_id: Option<i64>,
    pub comment: String,
    #[serde(default = "default_action")]
    pub action: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentReceipt {
    pub success: bool,
    pub id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoticeRequest {
    pub industry_id: i64,
    #[serde(default = "default_action")]
    pub action: String,
    #[serde(default)]
    pub comment: String,
    /// Overrides the industry's contact address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoticeOutcome {
    pub success: bool,
    pub email_sent_to: Option<String>,
    pub mode: Option<String>,
}

/// A flagged reading together with the pollutants that breached their limits.
#[derive(Debug, Clone, Serialize)]
pub struct ViolationEntry {
    #[serde(flatten)]
    pub reading: Reading,
    pub status: StatusTier,
    pub exceedances: Vec<Exceedance>,
}

fn default_action() -> String {
    ACTIONS[0].to_string()
}
