// HTTP request handlers
use crate::domain::admin::{CommentRequest, Credentials, NoticeRequest};
use crate::domain::dashboard::DashboardView;
use crate::error::{MonitorError, Result};
use crate::infrastructure::http_response::{accepts_brotli, json_response, pdf_response};
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    Json,
};
use futures::stream::Stream;
use serde::Serialize;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

fn status_for(error: &MonitorError) -> StatusCode {
    match error {
        MonitorError::Unauthorized => StatusCode::UNAUTHORIZED,
        MonitorError::NotFound(_) => StatusCode::NOT_FOUND,
        MonitorError::Http(_)
        | MonitorError::Status { .. }
        | MonitorError::Decode(_)
        | MonitorError::WebSocket(_) => StatusCode::BAD_GATEWAY,
        MonitorError::Store(_) | MonitorError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(error: MonitorError, action: &str) -> Response {
    let status = status_for(&error);
    if status.is_server_error() {
        tracing::error!(error = %error, "{} failed", action);
    } else {
        tracing::debug!(error = %error, "{} rejected", action);
    }
    (status, Json(serde_json::json!({ "error": error.to_string() }))).into_response()
}

async fn respond<T: Serialize>(result: Result<T>, headers: &HeaderMap, action: &str) -> Response {
    match result {
        Ok(data) => match json_response(&data, accepts_brotli(headers)).await {
            Ok(response) => response,
            Err(status) => status.into_response(),
        },
        Err(e) => error_response(e, action),
    }
}

/// List industries with their risk band
pub async fn list_industries(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let result = state.industry_service.list_industries().await;
    respond(result, &headers, "listing industries").await
}

pub async fn safe_limits(
    Path(industry_type): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let result = state
        .industry_service
        .safe_limits(&industry_type)
        .await
        .and_then(|limits| limits.ok_or_else(|| MonitorError::NotFound(industry_type.clone())));
    respond(result, &headers, "fetching safe limits").await
}

/// Current dashboard view for the selected industry
pub async fn dashboard(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let view = state.dashboard_service.view().await;
    respond(Ok(view), &headers, "building dashboard").await
}

/// Select an industry and return its freshly loaded view
pub async fn select_industry(
    Path(id): Path<i64>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    state.dashboard_service.select(id).await;
    let view = state.dashboard_service.view().await;
    respond(Ok(view), &headers, "selecting industry").await
}

/// Server-sent events carrying every dashboard view change
pub async fn stream_dashboard(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    let mut updates = state.dashboard_service.subscribe();
    let initial = state.dashboard_service.view().await;

    let stream = async_stream::stream! {
        yield Ok::<_, Infallible>(view_event(&initial));
        loop {
            match updates.recv().await {
                Ok(view) => yield Ok(view_event(&view)),
                Err(RecvError::Lagged(skipped)) => {
                    // The next view supersedes whatever was skipped
                    tracing::debug!(skipped, "dashboard stream lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}

fn view_event(view: &DashboardView) -> Event {
    Event::default()
        .event("dashboard")
        .json_data(view)
        .unwrap_or_else(|e| Event::default().event("error").data(e.to_string()))
}

pub async fn login(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(credentials): Json<Credentials>,
) -> Response {
    let result = state
        .admin_service
        .login(&credentials.username, &credentials.password)
        .await;
    respond(result, &headers, "login").await
}

pub async fn session_status(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let status = state.admin_service.session_status().await;
    respond(Ok(status), &headers, "reading session").await
}

pub async fn logout(State(state): State<Arc<AppState>>) -> Response {
    match state.admin_service.logout().await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e, "logout"),
    }
}

/// Flagged readings with the pollutants that exceeded their limits
pub async fn violations(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let result = state.admin_service.violations().await;
    respond(result, &headers, "listing violations").await
}

pub async fn comments(
    Path(industry_id): Path<i64>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let result = state.admin_service.comments(industry_id).await;
    respond(result, &headers, "listing comments").await
}

pub async fn add_comment(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(request): Json<CommentRequest>,
) -> Response {
    if request.comment.trim().is_empty() {
        return (StatusCode::BAD_REQUEST, "comment is empty").into_response();
    }
    let result = state.admin_service.add_comment(&request).await;
    respond(result, &headers, "adding comment").await
}

pub async fn send_notice(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(request): Json<NoticeRequest>,
) -> Response {
    let result = state.admin_service.send_notice(&request).await;
    respond(result, &headers, "sending notice").await
}

pub async fn notice_pdf(Path(industry_id): Path<i64>, State(state): State<Arc<AppState>>) -> Response {
    match state.admin_service.notice_pdf(industry_id).await {
        Ok(pdf) => match pdf_response(pdf, "violation_notice.pdf") {
            Ok(response) => response,
            Err(status) => status.into_response(),
        },
        Err(e) => error_response(e, "downloading notice"),
    }
}
