use crate::domain::compliance::ZeroPolicy;
use crate::domain::history::DEFAULT_HISTORY_BOUND;
use config::builder::DefaultState;
use config::{ConfigBuilder, Environment, File, Source};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
pub struct MonitorConfig {
    pub api: ApiSettings,
    pub server: ServerSettings,
    pub dashboard: DashboardSettings,
    #[serde(default)]
    pub session: SessionSettings,
    pub compliance: ComplianceSettings,
    pub push: PushSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    /// REST base, e.g. `http://localhost:5000/api`
    pub base_url: String,
    /// Socket.IO server, e.g. `http://localhost:5000`
    pub socket_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardSettings {
    pub history_limit: usize,
    /// Switch the selection when the drone moves to a new industry
    pub follow_drone: bool,
    pub initial_industry: Option<i64>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SessionSettings {
    /// Where the operator session is persisted; in-memory when unset
    pub path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ComplianceSettings {
    pub zero_policy: ZeroPolicy,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PushSettings {
    pub reconnect_secs: u64,
}

fn defaults() -> anyhow::Result<ConfigBuilder<DefaultState>> {
    Ok(config::Config::builder()
        .set_default("api.base_url", "http://localhost:5000/api")?
        .set_default("api.socket_url", "http://localhost:5000")?
        .set_default("api.timeout_secs", 10_i64)?
        .set_default("server.bind", "0.0.0.0:8080")?
        .set_default("dashboard.history_limit", DEFAULT_HISTORY_BOUND as i64)?
        .set_default("dashboard.follow_drone", true)?
        .set_default("compliance.zero_policy", "treat_as_absent")?
        .set_default("push.reconnect_secs", 5_i64)?)
}

fn monitor_environment() -> Environment {
    Environment::with_prefix("MONITOR")
        .separator("__")
        .try_parsing(true)
}

fn build_monitor_config<S>(file: S, environment: Environment) -> anyhow::Result<MonitorConfig>
where
    S: Source + Send + Sync + 'static,
{
    let settings = defaults()?
        .add_source(file)
        .add_source(environment)
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Load `config/monitor.toml` (optional) with `MONITOR__SECTION__KEY` overrides.
pub fn load_monitor_config() -> anyhow::Result<MonitorConfig> {
    build_monitor_config(
        File::with_name("config/monitor").required(false),
        monitor_environment(),
    )
}
