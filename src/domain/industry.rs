// Monitored industries and the drone that visits them
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Industry {
    pub id: i64,
    pub name: String,
    pub industry_type: String,
    pub location: Option<String>,
    pub contact_email: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
    /// Backend-computed score for the latest reading, 100 = fully compliant.
    pub compliance_score: Option<f64>,
    #[serde(default)]
    pub violations_count: u64,
    #[serde(default)]
    pub last_reading_at: Option<NaiveDateTime>,
}

impl Industry {
    /// First two words of the name, as shown on selector tabs.
    pub fn short_name(&self) -> String {
        self.name.split_whitespace().take(2).collect::<Vec<_>>().join(" ")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DroneStatus {
    #[default]
    Traveling,
    Scanning,
    Uploading,
}

/// Payload of the `drone_state` push event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroneState {
    #[serde(rename = "state")]
    pub status: DroneStatus,
    pub industry_id: i64,
    pub industry_name: Option<String>,
}
