// Trait for the monitoring backend's REST API
use crate::domain::admin::{
    AdminComment, CommentReceipt, CommentRequest, Credentials, LoginResponse, NoticeOutcome,
    NoticeRequest,
};
use crate::domain::industry::Industry;
use crate::domain::reading::{LimitSet, Reading};
use crate::error::Result;
use async_trait::async_trait;
use bytes::Bytes;

#[async_trait]
pub trait MonitoringApi: Send + Sync {
    /// List all monitored industries
    async fn list_industries(&self) -> Result<Vec<Industry>>;

    /// Most recent `limit` readings for an industry, oldest first
    async fn history(&self, industry_id: i64, limit: usize) -> Result<Vec<Reading>>;

    /// Latest reading with embedded limits, `None` if the industry has no readings yet
    async fn live(&self, industry_id: i64) -> Result<Option<Reading>>;

    async fn safe_limits(&self, industry_type: &str) -> Result<Option<LimitSet>>;

    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse>;

    // Admin endpoints below require a bearer token

    async fn violations(&self, token: &str) -> Result<Vec<Reading>>;

    async fn comments(&self, token: &str, industry_id: i64) -> Result<Vec<AdminComment>>;

    async fn add_comment(&self, token: &str, request: &CommentRequest) -> Result<CommentReceipt>;

    async fn send_notice(&self, token: &str, request: &NoticeRequest) -> Result<NoticeOutcome>;

    /// Violation notice rendered as PDF
    async fn notice_pdf(&self, token: &str, industry_id: i64) -> Result<Bytes>;
}
