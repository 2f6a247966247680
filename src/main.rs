// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod error;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use tokio::sync::mpsc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::admin_service::AdminService;
use crate::application::dashboard_service::DashboardService;
use crate::application::industry_service::IndustryService;
use crate::application::monitoring_api::MonitoringApi;
use crate::application::session::{Session, SessionStore};
use crate::infrastructure::config::load_monitor_config;
use crate::infrastructure::http_api::HttpMonitoringApi;
use crate::infrastructure::push_stream::PushStreamClient;
use crate::infrastructure::session_store::{FileSessionStore, MemorySessionStore};
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    add_comment, comments, dashboard, health_check, list_industries, login, logout, notice_pdf,
    safe_limits, select_industry, send_notice, session_status, stream_dashboard, violations,
};

const PUSH_CHANNEL_CAPACITY: usize = 256;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_monitor_config().context("loading config/monitor")?;

    // Backend client and session (infrastructure layer)
    let api: Arc<dyn MonitoringApi> = Arc::new(HttpMonitoringApi::new(
        config.api.base_url.clone(),
        Duration::from_secs(config.api.timeout_secs),
    )?);

    let store: Arc<dyn SessionStore> = match &config.session.path {
        Some(path) => Arc::new(FileSessionStore::new(path.clone())),
        None => Arc::new(MemorySessionStore::default()),
    };
    let session = Arc::new(Session::restore(store).await?);

    // Create services (application layer)
    let industry_service = IndustryService::new(api.clone());
    let dashboard_service = DashboardService::new(
        api.clone(),
        config.dashboard.clone(),
        config.compliance.zero_policy,
    );
    let admin_service = AdminService::new(api.clone(), session);

    // Push stream feeds the dashboard
    let (push_tx, push_rx) = mpsc::channel(PUSH_CHANNEL_CAPACITY);
    let push_client = PushStreamClient::new(
        &config.api.socket_url,
        Duration::from_secs(config.push.reconnect_secs),
    );
    tokio::spawn(push_client.run(push_tx));
    {
        let dashboard_service = dashboard_service.clone();
        tokio::spawn(async move { dashboard_service.run(push_rx).await });
    }

    // Initial selection: configured industry, else the first one listed
    let initial = match config.dashboard.initial_industry {
        Some(id) => Some(id),
        None => match api.list_industries().await {
            Ok(industries) => industries.first().map(|i| i.id),
            Err(e) => {
                tracing::warn!(error = %e, "could not list industries at startup");
                None
            }
        },
    };
    if let Some(id) = initial {
        let dashboard_service = dashboard_service.clone();
        tokio::spawn(async move { dashboard_service.select(id).await });
    }

    // Create application state
    let state = Arc::new(AppState {
        industry_service,
        dashboard_service,
        admin_service,
    });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/industries", get(list_industries))
        .route("/safe-limits/:industry_type", get(safe_limits))
        .route("/dashboard", get(dashboard))
        .route("/dashboard/select/:id", post(select_industry))
        .route("/dashboard/stream", get(stream_dashboard))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/session", get(session_status))
        .route("/violations", get(violations))
        .route("/comments/:id", get(comments))
        .route("/comment", post(add_comment))
        .route("/send-notice", post(send_notice))
        .route("/pdf/:id", get(notice_pdf))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("invalid server.bind {:?}", config.server.bind))?;
    tracing::info!(%addr, backend = %config.api.base_url, "starting emission-monitor");

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
