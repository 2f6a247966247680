// REST implementation of the monitoring backend API
use crate::application::monitoring_api::MonitoringApi;
use crate::domain::admin::{
    AdminComment, CommentReceipt, CommentRequest, Credentials, LoginResponse, NoticeOutcome,
    NoticeRequest,
};
use crate::domain::industry::Industry;
use crate::domain::reading::{LimitSet, Reading};
use crate::error::{MonitorError, Result};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpMonitoringApi {
    base_url: String,
    client: reqwest::Client,
}

impl HttpMonitoringApi {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.client
            .get(self.endpoint(path))
            .header("Accept", "application/json")
    }

    fn authorized(&self, request: RequestBuilder, token: &str) -> RequestBuilder {
        request.bearer_auth(token)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().path().to_string();
        let body = response.text().await.unwrap_or_default();
        tracing::debug!(%status, %url, %body, "backend request failed");

        match status {
            StatusCode::NOT_FOUND => Err(MonitorError::NotFound(url)),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(MonitorError::Unauthorized),
            // flask_jwt_extended answers 422 for malformed or expired tokens
            StatusCode::UNPROCESSABLE_ENTITY if body.contains("msg") => {
                Err(MonitorError::Unauthorized)
            }
            _ => Err(MonitorError::Status {
                status: status.as_u16(),
                body,
            }),
        }
    }

    async fn json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self.send(request).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Treat a 404 as "nothing there yet".
fn optional<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(MonitorError::NotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

#[async_trait]
impl MonitoringApi for HttpMonitoringApi {
    async fn list_industries(&self) -> Result<Vec<Industry>> {
        self.json(self.get("industries")).await
    }

    async fn history(&self, industry_id: i64, limit: usize) -> Result<Vec<Reading>> {
        let request = self
            .get(&format!("history/{}", industry_id))
            .query(&[("limit", limit)]);
        let readings: Vec<Reading> = self.json(request).await?;
        tracing::debug!(industry_id, count = readings.len(), "fetched history");
        Ok(readings)
    }

    async fn live(&self, industry_id: i64) -> Result<Option<Reading>> {
        optional(self.json(self.get(&format!("live/{}", industry_id))).await)
    }

    async fn safe_limits(&self, industry_type: &str) -> Result<Option<LimitSet>> {
        let path = format!("safe-limits/{}", urlencoding::encode(industry_type));
        optional(self.json(self.get(&path)).await)
    }

    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse> {
        let request = self.client.post(self.endpoint("login")).json(credentials);
        self.json(request).await
    }

    async fn violations(&self, token: &str) -> Result<Vec<Reading>> {
        self.json(self.authorized(self.get("violations"), token)).await
    }

    async fn comments(&self, token: &str, industry_id: i64) -> Result<Vec<AdminComment>> {
        let request = self.get(&format!("comments/{}", industry_id));
        self.json(self.authorized(request, token)).await
    }

    async fn add_comment(&self, token: &str, request: &CommentRequest) -> Result<CommentReceipt> {
        let builder = self.client.post(self.endpoint("comment")).json(request);
        self.json(self.authorized(builder, token)).await
    }

    async fn send_notice(&self, token: &str, request: &NoticeRequest) -> Result<NoticeOutcome> {
        let builder = self.client.post(self.endpoint("send-notice")).json(request);
        self.json(self.authorized(builder, token)).await
    }

    async fn notice_pdf(&self, token: &str, industry_id: i64) -> Result<Bytes> {
        let builder = self.client.get(self.endpoint(&format!("pdf/{}", industry_id)));
        let response = self.send(self.authorized(builder, token)).await?;
        Ok(response.bytes().await?)
    }
}
