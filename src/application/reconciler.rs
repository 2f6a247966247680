//! Live reading reconciliation for the selected industry.
//!
//! Merges the history snapshot fetched on selection with readings pushed by
//! the drone stream. Every operation is a synchronous state transition; the
//! reconciler holds no connection and performs no I/O. Anything that arrives
//! for an industry other than the current selection is dropped, so switching
//! selection mid-stream cannot bleed one industry's data into another's view.

use crate::domain::compliance::{evaluate_with, ComplianceResult, ZeroPolicy};
use crate::domain::history::{HistorySeries, DEFAULT_HISTORY_BOUND};
use crate::domain::reading::{LimitSet, Reading};

#[derive(Debug, Clone)]
pub struct LiveReconciler {
    bound: usize,
    selection: Option<i64>,
    series: Option<HistorySeries>,
    current_reading: Option<Reading>,
    current_limits: Option<LimitSet>,
}

impl Default for LiveReconciler {
    fn default() -> Self {
        Self::with_bound(DEFAULT_HISTORY_BOUND)
    }
}

impl LiveReconciler {
    pub fn with_bound(bound: usize) -> Self {
        Self {
            bound,
            selection: None,
            series: None,
            current_reading: None,
            current_limits: None,
        }
    }

    /// Start a fresh session for `industry_id`, discarding everything retained.
    pub fn select_entity(&mut self, industry_id: i64) {
        self.selection = Some(industry_id);
        self.series = Some(HistorySeries::new(self.bound));
        self.current_reading = None;
        self.current_limits = None;
    }

    /// Replace the series with a fetched history. Ignored unless `industry_id`
    /// is still selected.
    pub fn seed_history(&mut self, industry_id: i64, readings: Vec<Reading>) -> bool {
        if self.selection != Some(industry_id) {
            return false;
        }
        self.series = Some(HistorySeries::from_readings(self.bound, readings));
        true
    }

    pub fn set_current(&mut self, reading: Option<Reading>, limits: Option<LimitSet>) {
        self.current_reading = reading;
        self.current_limits = limits;
    }

    /// Apply one pushed reading. Returns `false` when it was dropped.
    ///
    /// A push without embedded limits keeps the limits already held.
    pub fn on_push(&mut self, reading: Reading) -> bool {
        if self.selection != Some(reading.industry_id) {
            return false;
        }

        if let Some(limits) = &reading.limits {
            self.current_limits = Some(limits.clone());
        }
        let series = self
            .series
            .get_or_insert_with(|| HistorySeries::new(self.bound));
        series.push(reading.clone());
        self.current_reading = Some(reading);
        true
    }

    pub fn selection(&self) -> Option<i64> {
        self.selection
    }

    pub fn current_reading(&self) -> Option<&Reading> {
        self.current_reading.as_ref()
    }

    pub fn current_limits(&self) -> Option<&LimitSet> {
        self.current_limits.as_ref()
    }

    /// Snapshot of the retained series, oldest first.
    pub fn series(&self) -> Vec<Reading> {
        self.series
            .as_ref()
            .map(HistorySeries::to_vec)
            .unwrap_or_default()
    }

    pub fn compliance(&self, policy: ZeroPolicy) -> ComplianceResult {
        evaluate_with(policy, self.current_reading(), self.current_limits())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::compliance::StatusTier;
    use crate::domain::pollutant::PollutantKind;
    use chrono::{Duration, NaiveDate};

    fn reading(industry_id: i64, seq: i64) -> Reading {
        let base = NaiveDate::from_ymd_opt(2025, 2, 11)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let mut r = Reading::new(industry_id, base + Duration::seconds(seq * 5))
            .with(PollutantKind::Pm25, 40.0 + seq as f64)
            .with_limits(LimitSet::new("steel").with(PollutantKind::Pm25, 60.0));
        r.id = Some(seq);
        r
    }

    fn ids(series: &[Reading]) -> Vec<i64> {
        series.iter().filter_map(|r| r.id).collect()
    }

    #[test]
    fn test_push_for_other_industry_is_ignored() {
        let mut rec = LiveReconciler::default();
        rec.select_entity(1);
        rec.seed_history(1, vec![reading(1, 0), reading(1, 1)]);
        rec.set_current(Some(reading(1, 1)), Some(LimitSet::new("steel")));

        let before_reading = rec.current_reading().cloned();
        let before_limits = rec.current_limits().cloned();
        let before_series = rec.series();

        assert!(!rec.on_push(reading(2, 9)));
        assert_eq!(rec.current_reading().cloned(), before_reading);
        assert_eq!(rec.current_limits().cloned(), before_limits);
        assert_eq!(ids(&rec.series()), ids(&before_series));
    }

    #[test]
    fn test_push_without_selection_is_ignored() {
        let mut rec = LiveReconciler::default();
        assert!(!rec.on_push(reading(1, 0)));
        assert!(rec.current_reading().is_none());
        assert!(rec.series().is_empty());
    }

    #[test]
    fn test_late_seed_for_previous_selection_is_dropped() {
        let mut rec = LiveReconciler::default();
        rec.select_entity(1);
        rec.select_entity(2);
        rec.on_push(reading(2, 5));

        assert!(!rec.seed_history(1, vec![reading(1, 0), reading(1, 1)]));
        assert_eq!(rec.selection(), Some(2));
        assert_eq!(ids(&rec.series()), vec![5]);
        assert!(rec.series().iter().all(|r| r.industry_id == 2));
    }

    #[test]
    fn test_series_is_bounded_sliding_window() {
        let mut rec = LiveReconciler::default();
        rec.select_entity(1);
        for seq in 0..45 {
            assert!(rec.on_push(reading(1, seq)));
        }

        let series = rec.series();
        assert_eq!(series.len(), 40);
        assert_eq!(ids(&series), (5..45).collect::<Vec<_>>());
        assert_eq!(rec.current_reading().unwrap().id, Some(44));
    }

    #[test]
    fn test_seed_truncates_to_most_recent() {
        let mut rec = LiveReconciler::with_bound(3);
        rec.select_entity(4);
        assert!(rec.seed_history(4, (0..6).map(|s| reading(4, s)).collect()));
        assert_eq!(ids(&rec.series()), vec![3, 4, 5]);
    }

    #[test]
    fn test_select_resets_session() {
        let mut rec = LiveReconciler::default();
        rec.select_entity(1);
        rec.on_push(reading(1, 0));
        rec.select_entity(1);

        assert!(rec.series().is_empty());
        assert!(rec.current_reading().is_none());
        assert!(rec.current_limits().is_none());
    }

    #[test]
    fn test_push_updates_latest_pair() {
        let mut rec = LiveReconciler::default();
        rec.select_entity(1);
        rec.set_current(None, Some(LimitSet::new("steel").with(PollutantKind::Pm25, 100.0)));

        let mut r = reading(1, 30);
        r.limits = None;
        rec.on_push(r);

        // 70 against the previously held limit of 100
        assert_eq!(rec.current_limits().unwrap().pm25, Some(100.0));
        assert_eq!(
            rec.compliance(ZeroPolicy::default()).tier(PollutantKind::Pm25),
            StatusTier::Safe
        );

        rec.on_push(reading(1, 31));
        assert_eq!(rec.current_limits().unwrap().pm25, Some(60.0));
        assert_eq!(
            rec.compliance(ZeroPolicy::default()).overall,
            StatusTier::Danger
        );
    }

    #[test]
    fn test_series_is_a_snapshot() {
        let mut rec = LiveReconciler::default();
        rec.select_entity(1);
        rec.on_push(reading(1, 0));

        let mut copy = rec.series();
        copy.clear();
        assert_eq!(rec.series().len(), 1);
    }
}
