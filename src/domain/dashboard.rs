// Dashboard view model rendered by display surfaces
use super::compliance::{percent_of_limit, progress_percent, ComplianceResult, StatusTier};
use super::industry::DroneState;
use super::pollutant::PollutantKind;
use super::reading::{LimitSet, Reading};
use serde::Serialize;

/// Readings plotted on the live chart.
pub const CHART_WINDOW: usize = 30;

#[derive(Debug, Clone, Serialize)]
pub struct TimeSeriesPoint {
    pub time_ms: i64,
    pub value: f64,
}

impl TimeSeriesPoint {
    pub fn new(time_ms: i64, value: f64) -> Self {
        Self { time_ms, value }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SeriesData {
    pub pollutant: PollutantKind,
    pub name: &'static str,
    pub color: &'static str,
    pub points: Vec<TimeSeriesPoint>,
}

/// One emission card: value, limit and how close it is to the limit.
#[derive(Debug, Clone, Serialize)]
pub struct PollutantGauge {
    pub pollutant: PollutantKind,
    pub label: &'static str,
    pub unit: &'static str,
    pub value: Option<f64>,
    pub limit: Option<f64>,
    pub tier: StatusTier,
    pub percent: Option<i64>,
    pub progress: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub selected: Option<i64>,
    pub connected: bool,
    pub drone: Option<DroneState>,
    pub reading: Option<Reading>,
    pub limits: Option<LimitSet>,
    pub compliance: ComplianceResult,
    pub gauges: Vec<PollutantGauge>,
    pub chart: Vec<SeriesData>,
    pub series: Vec<Reading>,
}

impl DashboardView {
    /// `compliance` must be the evaluation of `reading` against `limits`.
    pub fn build(
        selected: Option<i64>,
        connected: bool,
        drone: Option<DroneState>,
        reading: Option<Reading>,
        limits: Option<LimitSet>,
        compliance: ComplianceResult,
        series: Vec<Reading>,
    ) -> Self {
        let gauges = gauges(&compliance, reading.as_ref(), limits.as_ref());
        let chart = chart(&series);

        Self {
            selected,
            connected,
            drone,
            reading,
            limits,
            compliance,
            gauges,
            chart,
            series,
        }
    }
}

fn gauges(
    compliance: &ComplianceResult,
    reading: Option<&Reading>,
    limits: Option<&LimitSet>,
) -> Vec<PollutantGauge> {
    PollutantKind::ALL
        .iter()
        .map(|&kind| {
            let value = reading.and_then(|r| r.value(kind));
            let limit = limits.and_then(|l| l.ceiling(kind));
            let percent = percent_of_limit(value, limit);
            PollutantGauge {
                pollutant: kind,
                label: kind.label(),
                unit: kind.unit(),
                value,
                limit,
                tier: compliance.tier(kind),
                percent,
                progress: progress_percent(percent),
            }
        })
        .collect()
}

fn chart(series: &[Reading]) -> Vec<SeriesData> {
    let window = &series[series.len().saturating_sub(CHART_WINDOW)..];

    PollutantKind::ALL
        .iter()
        .filter_map(|&kind| {
            let points: Vec<TimeSeriesPoint> = window
                .iter()
                .filter_map(|r| {
                    let value = r.value(kind)?;
                    Some(TimeSeriesPoint::new(r.timestamp.and_utc().timestamp_millis(), value))
                })
                .collect();

            // Only chart pollutants that have data
            if points.is_empty() {
                return None;
            }

            Some(SeriesData {
                pollutant: kind,
                name: kind.label(),
                color: kind.color(),
                points,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::compliance::evaluate;
    use chrono::{Duration, NaiveDate};

    fn reading_at(minute: i64, pm25: f64) -> Reading {
        let base = NaiveDate::from_ymd_opt(2025, 2, 11)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        Reading::new(1, base + Duration::minutes(minute)).with(PollutantKind::Pm25, pm25)
    }

    #[test]
    fn test_gauges_clamp_progress_only() {
        let limits = LimitSet::new("steel").with(PollutantKind::Pm25, 60.0);
        let reading = reading_at(0, 90.0);
        let compliance = evaluate(Some(&reading), Some(&limits));
        let view = DashboardView::build(
            Some(1),
            true,
            None,
            Some(reading),
            Some(limits),
            compliance,
            vec![],
        );

        let pm25 = &view.gauges[0];
        assert_eq!(pm25.pollutant, PollutantKind::Pm25);
        assert_eq!(pm25.percent, Some(150));
        assert_eq!(pm25.progress, 100);
        assert_eq!(pm25.tier, StatusTier::Danger);
        assert_eq!(view.compliance.overall, StatusTier::Danger);
        assert_eq!(view.gauges[1].tier, StatusTier::Unknown);
    }

    #[test]
    fn test_chart_uses_recent_window() {
        let series: Vec<Reading> = (0..40).map(|m| reading_at(m, m as f64)).collect();
        let view = DashboardView::build(
            Some(1),
            true,
            None,
            None,
            None,
            ComplianceResult::unknown(),
            series,
        );

        assert_eq!(view.chart.len(), 1);
        assert_eq!(view.chart[0].points.len(), CHART_WINDOW);
        assert_eq!(view.chart[0].points[0].value, 10.0);
        assert_eq!(view.series.len(), 40);
        assert_eq!(view.compliance.overall, StatusTier::Unknown);
    }
}
