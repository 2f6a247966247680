// Admin service - Authenticated enforcement workflow
use crate::application::monitoring_api::MonitoringApi;
use crate::application::session::Session;
use crate::domain::admin::{
    AdminComment, CommentReceipt, CommentRequest, NoticeOutcome, NoticeRequest, SessionStatus,
    User, ViolationEntry,
};
use crate::domain::compliance::{evaluate, exceedances};
use crate::error::Result;
use bytes::Bytes;
use std::sync::Arc;

#[derive(Clone)]
pub struct AdminService {
    api: Arc<dyn MonitoringApi>,
    session: Arc<Session>,
}

impl AdminService {
    pub fn new(api: Arc<dyn MonitoringApi>, session: Arc<Session>) -> Self {
        Self { api, session }
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<User> {
        self.session.login(self.api.as_ref(), username, password).await
    }

    pub async fn logout(&self) -> Result<()> {
        self.session.logout().await
    }

    pub async fn session_status(&self) -> SessionStatus {
        SessionStatus {
            authenticated: self.session.is_authenticated().await,
            user: self.session.user().await,
        }
    }

    /// Flagged readings, each annotated with its overall tier and the
    /// pollutants over their limit.
    pub async fn violations(&self) -> Result<Vec<ViolationEntry>> {
        let token = self.session.require_token().await?;
        let readings = self.api.violations(&token).await?;

        Ok(readings
            .into_iter()
            .map(|reading| {
                let exceedances = reading
                    .limits
                    .as_ref()
                    .map(|limits| exceedances(&reading, limits))
                    .unwrap_or_default();
                let status = evaluate(Some(&reading), reading.limits.as_ref()).overall;
                ViolationEntry {
                    reading,
                    status,
                    exceedances,
                }
            })
            .collect())
    }

    pub async fn comments(&self, industry_id: i64) -> Result<Vec<AdminComment>> {
        let token = self.session.require_token().await?;
        self.api.comments(&token, industry_id).await
    }

    pub async fn add_comment(&self, request: &CommentRequest) -> Result<CommentReceipt> {
        let token = self.session.require_token().await?;
        let receipt = self.api.add_comment(&token, request).await?;
        tracing::info!(
            industry_id = request.industry_id,
            action = %request.action,
            "comment recorded"
        );
        Ok(receipt)
    }

    pub async fn send_notice(&self, request: &NoticeRequest) -> Result<NoticeOutcome> {
        let token = self.session.require_token().await?;
        let outcome = self.api.send_notice(&token, request).await?;
        tracing::info!(
            industry_id = request.industry_id,
            success = outcome.success,
            sent_to = ?outcome.email_sent_to,
            "violation notice dispatched"
        );
        Ok(outcome)
    }

    pub async fn notice_pdf(&self, industry_id: i64) -> Result<Bytes> {
        let token = self.session.require_token().await?;
        self.api.notice_pdf(&token, industry_id).await
    }
}
