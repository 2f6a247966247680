//! Compliance classification of readings against regulatory limits.
//!
//! Every display surface renders the output of [`evaluate`]; nothing else
//! recomputes safe/warning/danger thresholds.

use super::pollutant::PollutantKind;
use super::reading::{LimitSet, Reading};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Ratio of value to limit at which a pollutant enters the warning band.
pub const WARNING_RATIO: f64 = 0.8;
/// Ratio of value to limit at which a pollutant is in violation.
pub const DANGER_RATIO: f64 = 1.0;

/// Classification of a reading against a limit.
///
/// `Safe < Warning < Danger` by severity. `Unknown` has no severity and is
/// never compared with the other tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusTier {
    Safe,
    Warning,
    Danger,
    Unknown,
}

impl StatusTier {
    pub fn severity(self) -> Option<u8> {
        match self {
            StatusTier::Safe => Some(0),
            StatusTier::Warning => Some(1),
            StatusTier::Danger => Some(2),
            StatusTier::Unknown => None,
        }
    }

    pub fn is_known(self) -> bool {
        self.severity().is_some()
    }

    /// Worst known tier in `tiers`, or `Unknown` when none is known.
    pub fn worst<I: IntoIterator<Item = StatusTier>>(tiers: I) -> StatusTier {
        tiers
            .into_iter()
            .filter(|t| t.is_known())
            .max_by_key(|t| t.severity())
            .unwrap_or(StatusTier::Unknown)
    }
}

/// How a measured value of exactly zero is classified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZeroPolicy {
    /// Zero counts as "no reading" and classifies as `Unknown`.
    #[default]
    TreatAsAbsent,
    /// Zero is a real measurement and classifies as `Safe`.
    TreatAsMeasured,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplianceResult {
    pub overall: StatusTier,
    pub pollutants: BTreeMap<PollutantKind, StatusTier>,
}

impl ComplianceResult {
    pub fn unknown() -> Self {
        Self {
            overall: StatusTier::Unknown,
            pollutants: PollutantKind::ALL
                .iter()
                .map(|&kind| (kind, StatusTier::Unknown))
                .collect(),
        }
    }

    pub fn tier(&self, kind: PollutantKind) -> StatusTier {
        self.pollutants
            .get(&kind)
            .copied()
            .unwrap_or(StatusTier::Unknown)
    }
}

pub fn evaluate(reading: Option<&Reading>, limits: Option<&LimitSet>) -> ComplianceResult {
    evaluate_with(ZeroPolicy::default(), reading, limits)
}

pub fn evaluate_with(
    policy: ZeroPolicy,
    reading: Option<&Reading>,
    limits: Option<&LimitSet>,
) -> ComplianceResult {
    let (Some(reading), Some(limits)) = (reading, limits) else {
        return ComplianceResult::unknown();
    };

    let pollutants: BTreeMap<PollutantKind, StatusTier> = PollutantKind::ALL
        .iter()
        .map(|&kind| {
            let tier = classify(policy, reading.value(kind), limits.ceiling(kind));
            (kind, tier)
        })
        .collect();

    ComplianceResult {
        overall: StatusTier::worst(pollutants.values().copied()),
        pollutants,
    }
}

/// Classify a single value against its ceiling.
pub fn classify(policy: ZeroPolicy, value: Option<f64>, limit: Option<f64>) -> StatusTier {
    match ratio(policy, value, limit) {
        None => StatusTier::Unknown,
        Some(r) if r >= DANGER_RATIO => StatusTier::Danger,
        Some(r) if r >= WARNING_RATIO => StatusTier::Warning,
        Some(_) => StatusTier::Safe,
    }
}

fn ratio(policy: ZeroPolicy, value: Option<f64>, limit: Option<f64>) -> Option<f64> {
    let value = value.filter(|v| v.is_finite())?;
    let limit = limit.filter(|l| l.is_finite() && *l > 0.0)?;
    if value == 0.0 && policy == ZeroPolicy::TreatAsAbsent {
        return None;
    }
    Some(value / limit)
}

/// Percent of limit, rounded, not clamped. `None` when there is nothing to compare.
pub fn percent_of_limit(value: Option<f64>, limit: Option<f64>) -> Option<i64> {
    ratio(ZeroPolicy::TreatAsMeasured, value, limit).map(|r| (r * 100.0).round() as i64)
}

/// Percent clamped to `[0, 100]` for bounded progress indicators.
pub fn progress_percent(percent: Option<i64>) -> u8 {
    percent.unwrap_or(0).clamp(0, 100) as u8
}

/// A pollutant strictly above its ceiling.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Exceedance {
    pub pollutant: PollutantKind,
    pub label: &'static str,
    pub value: f64,
    pub limit: f64,
}

pub fn exceedances(reading: &Reading, limits: &LimitSet) -> Vec<Exceedance> {
    PollutantKind::ALL
        .iter()
        .filter_map(|&kind| {
            let value = reading.value(kind)?;
            let limit = limits.ceiling(kind).filter(|l| *l > 0.0)?;
            (value > limit).then_some(Exceedance {
                pollutant: kind,
                label: kind.label(),
                value,
                limit,
            })
        })
        .collect()
}

/// 0-100 score where 100 means fully compliant.
///
/// Each measured ratio is capped at 2.0 before averaging, so one extreme
/// pollutant cannot push the score below zero on its own.
pub fn compliance_score(reading: &Reading, limits: &LimitSet) -> Option<f64> {
    let ratios: Vec<f64> = PollutantKind::ALL
        .iter()
        .filter_map(|&kind| ratio(ZeroPolicy::TreatAsAbsent, reading.value(kind), limits.ceiling(kind)))
        .map(|r| r.min(2.0))
        .collect();

    if ratios.is_empty() {
        return None;
    }

    let avg = ratios.iter().sum::<f64>() / ratios.len() as f64;
    let score = ((2.0 - avg) / 2.0 * 100.0 * 10.0).round() / 10.0;
    Some(score.max(0.0))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Unknown,
}

impl RiskLevel {
    pub fn from_score(score: Option<f64>) -> Self {
        match score {
            None => RiskLevel::Unknown,
            Some(s) if s >= 80.0 => RiskLevel::Low,
            Some(s) if s >= 50.0 => RiskLevel::Medium,
            Some(_) => RiskLevel::High,
        }
    }
}
