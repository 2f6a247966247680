// Bounded, time-ordered reading history for one industry
use super::reading::Reading;
use std::collections::VecDeque;

/// Readings retained per selected industry in the live dashboard.
pub const DEFAULT_HISTORY_BOUND: usize = 40;

/// Sliding window of readings, oldest first.
///
/// Ordering is whatever the caller supplied; entries are never re-sorted.
#[derive(Debug, Clone)]
pub struct HistorySeries {
    bound: usize,
    readings: VecDeque<Reading>,
}

impl HistorySeries {
    pub fn new(bound: usize) -> Self {
        let bound = bound.max(1);
        Self {
            bound,
            readings: VecDeque::with_capacity(bound),
        }
    }

    /// Build from an oldest-first sequence, keeping only the most recent `bound`.
    pub fn from_readings<I>(bound: usize, readings: I) -> Self
    where
        I: IntoIterator<Item = Reading>,
    {
        let mut series = Self::new(bound);
        for reading in readings {
            series.push(reading);
        }
        series
    }

    /// Append a reading, evicting the oldest one once the bound is exceeded.
    pub fn push(&mut self, reading: Reading) -> Option<Reading> {
        self.readings.push_back(reading);
        if self.readings.len() > self.bound {
            self.readings.pop_front()
        } else {
            None
        }
    }

    pub fn to_vec(&self) -> Vec<Reading> {
        self.readings.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn reading_at(minute: i64) -> Reading {
        let base = NaiveDate::from_ymd_opt(2025, 2, 11)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let mut r = Reading::new(7, base + Duration::minutes(minute));
        r.id = Some(minute);
        r
    }

    fn ids(series: &HistorySeries) -> Vec<i64> {
        series.to_vec().iter().filter_map(|r| r.id).collect()
    }

    #[test]
    fn test_push_evicts_oldest() {
        let mut series = HistorySeries::new(3);
        assert!(series.push(reading_at(0)).is_none());
        series.push(reading_at(1));
        series.push(reading_at(2));
        let evicted = series.push(reading_at(3)).unwrap();

        assert_eq!(evicted.id, Some(0));
        assert_eq!(ids(&series), vec![1, 2, 3]);
    }

    #[test]
    fn test_from_readings_keeps_most_recent() {
        let series = HistorySeries::from_readings(4, (0..10).map(reading_at));
        assert_eq!(ids(&series), vec![6, 7, 8, 9]);
    }

    #[test]
    fn test_zero_bound_keeps_one() {
        let mut series = HistorySeries::new(0);
        series.push(reading_at(0));
        series.push(reading_at(1));
        assert_eq!(ids(&series), vec![1]);
    }
}
