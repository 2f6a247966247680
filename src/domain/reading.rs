// Sensor readings and regulatory limits
use super::pollutant::PollutantKind;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One drone measurement for an industry.
///
/// A pollutant field left as `None` means the pollutant was not measured,
/// which is not the same as a measured zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    #[serde(default, alias = "reading_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub industry_id: i64,
    pub timestamp: NaiveDateTime,
    pub pm25: Option<f64>,
    pub pm10: Option<f64>,
    pub no2: Option<f64>,
    pub so2: Option<f64>,
    pub co2: Option<f64>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gps_lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gps_lng: Option<f64>,
    #[serde(default)]
    pub is_violation: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limits: Option<LimitSet>,
}

impl Reading {
    pub fn value(&self, kind: PollutantKind) -> Option<f64> {
        match kind {
            PollutantKind::Pm25 => self.pm25,
            PollutantKind::Pm10 => self.pm10,
            PollutantKind::No2 => self.no2,
            PollutantKind::So2 => self.so2,
            PollutantKind::Co2 => self.co2,
        }
    }
}

#[cfg(test)]
impl Reading {
    pub fn new(industry_id: i64, timestamp: NaiveDateTime) -> Self {
        Self {
            id: None,
            industry_id,
            timestamp,
            pm25: None,
            pm10: None,
            no2: None,
            so2: None,
            co2: None,
            temperature: None,
            humidity: None,
            gps_lat: None,
            gps_lng: None,
            is_violation: false,
            industry_name: None,
            industry_type: None,
            limits: None,
        }
    }

    pub fn with(mut self, kind: PollutantKind, value: f64) -> Self {
        *self.slot(kind) = Some(value);
        self
    }

    pub fn with_limits(mut self, limits: LimitSet) -> Self {
        self.limits = Some(limits);
        self
    }

    fn slot(&mut self, kind: PollutantKind) -> &mut Option<f64> {
        match kind {
            PollutantKind::Pm25 => &mut self.pm25,
            PollutantKind::Pm10 => &mut self.pm10,
            PollutantKind::No2 => &mut self.no2,
            PollutantKind::So2 => &mut self.so2,
            PollutantKind::Co2 => &mut self.co2,
        }
    }
}

/// Regulatory ceilings for one industry type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LimitSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry_type: Option<String>,
    pub pm25: Option<f64>,
    pub pm10: Option<f64>,
    pub no2: Option<f64>,
    pub so2: Option<f64>,
    pub co2: Option<f64>,
}

impl LimitSet {
    pub fn ceiling(&self, kind: PollutantKind) -> Option<f64> {
        match kind {
            PollutantKind::Pm25 => self.pm25,
            PollutantKind::Pm10 => self.pm10,
            PollutantKind::No2 => self.no2,
            PollutantKind::So2 => self.so2,
            PollutantKind::Co2 => self.co2,
        }
    }
}

#[cfg(test)]
impl LimitSet {
    pub fn new(industry_type: impl Into<String>) -> Self {
        Self {
            industry_type: Some(industry_type.into()),
            ..Self::default()
        }
    }

    pub fn with(mut self, kind: PollutantKind, ceiling: f64) -> Self {
        match kind {
            PollutantKind::Pm25 => self.pm25 = Some(ceiling),
            PollutantKind::Pm10 => self.pm10 = Some(ceiling),
            PollutantKind::No2 => self.no2 = Some(ceiling),
            PollutantKind::So2 => self.so2 = Some(ceiling),
            PollutantKind::Co2 => self.co2 = Some(ceiling),
        }
        self
    }
}
