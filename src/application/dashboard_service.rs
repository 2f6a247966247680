// Dashboard service - Owns the live view for one display context
use crate::application::monitoring_api::MonitoringApi;
use crate::application::reconciler::LiveReconciler;
use crate::domain::compliance::ZeroPolicy;
use crate::domain::dashboard::DashboardView;
use crate::domain::industry::DroneState;
use crate::domain::reading::Reading;
use crate::infrastructure::config::DashboardSettings;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, Mutex};

const VIEW_CHANNEL_CAPACITY: usize = 64;

/// Events delivered by the push-stream adapter.
#[derive(Debug, Clone, PartialEq)]
pub enum PushEvent {
    Connected,
    Disconnected,
    Drone(DroneState),
    Reading(Reading),
}

struct DisplayState {
    reconciler: LiveReconciler,
    drone: Option<DroneState>,
    connected: bool,
}

impl DisplayState {
    /// Apply the `/live` snapshot unless the selection moved on or a newer
    /// push already landed.
    fn apply_snapshot(&mut self, industry_id: i64, reading: Reading) -> bool {
        if self.reconciler.selection() != Some(industry_id) {
            return false;
        }
        if let Some(current) = self.reconciler.current_reading() {
            if current.timestamp > reading.timestamp {
                return false;
            }
        }
        let limits = reading.limits.clone();
        self.reconciler.set_current(Some(reading), limits);
        true
    }
}

#[derive(Clone)]
pub struct DashboardService {
    api: Arc<dyn MonitoringApi>,
    settings: DashboardSettings,
    zero_policy: ZeroPolicy,
    state: Arc<Mutex<DisplayState>>,
    updates: broadcast::Sender<DashboardView>,
}

impl DashboardService {
    pub fn new(
        api: Arc<dyn MonitoringApi>,
        settings: DashboardSettings,
        zero_policy: ZeroPolicy,
    ) -> Self {
        let (updates, _) = broadcast::channel(VIEW_CHANNEL_CAPACITY);
        let state = DisplayState {
            reconciler: LiveReconciler::with_bound(settings.history_limit),
            drone: None,
            connected: false,
        };
        Self {
            api,
            settings,
            zero_policy,
            state: Arc::new(Mutex::new(state)),
            updates,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DashboardView> {
        self.updates.subscribe()
    }

    /// Switch the view to `industry_id` and load its history and latest reading.
    ///
    /// Fetch results that arrive after the selection has moved on are dropped.
    /// Failures leave the view empty; nothing is retried here.
    pub async fn select(&self, industry_id: i64) {
        self.begin_select(industry_id).await;
        self.load(industry_id).await;
    }

    async fn begin_select(&self, industry_id: i64) {
        self.state.lock().await.reconciler.select_entity(industry_id);
        tracing::info!(industry_id, "industry selected");
        self.publish().await;
    }

    async fn load(&self, industry_id: i64) {
        let (history, live) = tokio::join!(
            self.api.history(industry_id, self.settings.history_limit),
            self.api.live(industry_id)
        );

        {
            let mut state = self.state.lock().await;

            match history {
                Ok(readings) => {
                    let count = readings.len();
                    if state.reconciler.seed_history(industry_id, readings) {
                        tracing::debug!(industry_id, count, "history seeded");
                    } else {
                        tracing::debug!(industry_id, "dropping history for stale selection");
                    }
                }
                Err(e) => tracing::warn!(industry_id, error = %e, "failed to fetch history"),
            }

            match live {
                Ok(Some(reading)) => {
                    if !state.apply_snapshot(industry_id, reading) {
                        tracing::debug!(industry_id, "dropping stale live snapshot");
                    }
                }
                Ok(None) => tracing::debug!(industry_id, "no readings yet"),
                Err(e) => tracing::warn!(industry_id, error = %e, "failed to fetch live reading"),
            }
        }

        self.publish().await;
    }

    pub async fn apply(&self, event: PushEvent) {
        match event {
            PushEvent::Connected | PushEvent::Disconnected => {
                let connected = event == PushEvent::Connected;
                self.state.lock().await.connected = connected;
                tracing::info!(connected, "push stream connectivity changed");
            }
            PushEvent::Drone(drone) => {
                let target = drone.industry_id;
                let follow = {
                    let mut state = self.state.lock().await;
                    let previous = state.drone.replace(drone).map(|d| d.industry_id);
                    self.settings.follow_drone
                        && previous != Some(target)
                        && state.reconciler.selection() != Some(target)
                };
                if follow {
                    tracing::info!(industry_id = target, "following drone to new target");
                    // Switch now so pushes for the target land; fetches run off the event loop
                    self.begin_select(target).await;
                    let service = self.clone();
                    tokio::spawn(async move { service.load(target).await });
                    return;
                }
            }
            PushEvent::Reading(reading) => {
                let industry_id = reading.industry_id;
                let applied = self.state.lock().await.reconciler.on_push(reading);
                if !applied {
                    tracing::debug!(industry_id, "ignoring push for unselected industry");
                    return;
                }
            }
        }
        self.publish().await;
    }

    /// Consume push events until the adapter hangs up.
    pub async fn run(&self, mut events: mpsc::Receiver<PushEvent>) {
        while let Some(event) = events.recv().await {
            self.apply(event).await;
        }
        tracing::info!("push event channel closed");
    }

    pub async fn view(&self) -> DashboardView {
        let state = self.state.lock().await;
        let reconciler = &state.reconciler;
        DashboardView::build(
            reconciler.selection(),
            state.connected,
            state.drone.clone(),
            reconciler.current_reading().cloned(),
            reconciler.current_limits().cloned(),
            reconciler.compliance(self.zero_policy),
            reconciler.series(),
        )
    }

    async fn publish(&self) {
        let view = self.view().await;
        // No subscribers is fine
        let _ = self.updates.send(view);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::monitoring_api::fake::FakeApi;
    use crate::domain::compliance::StatusTier;
    use crate::domain::industry::DroneStatus;
    use crate::domain::pollutant::PollutantKind;
    use crate::domain::reading::LimitSet;
    use chrono::{Duration, NaiveDate};
    use std::collections::HashMap;
    use tokio::sync::Notify;

    fn reading(industry_id: i64, seq: i64, pm25: f64) -> Reading {
        let base = NaiveDate::from_ymd_opt(2025, 2, 11)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let mut r = Reading::new(industry_id, base + Duration::seconds(seq * 5))
            .with(PollutantKind::Pm25, pm25)
            .with_limits(LimitSet::new("steel").with(PollutantKind::Pm25, 100.0));
        r.id = Some(industry_id * 1000 + seq);
        r
    }

    fn settings() -> DashboardSettings {
        DashboardSettings {
            history_limit: 40,
            follow_drone: true,
            initial_industry: None,
        }
    }

    fn api_with_history() -> FakeApi {
        let mut history = HashMap::new();
        history.insert(1, (0..50).map(|s| reading(1, s, 50.0)).collect());
        history.insert(2, (0..3).map(|s| reading(2, s, 85.0)).collect());
        let mut live = HashMap::new();
        live.insert(1, reading(1, 49, 50.0));
        live.insert(2, reading(2, 2, 85.0));
        FakeApi {
            history,
            live,
            ..FakeApi::default()
        }
    }

    fn drone(industry_id: i64) -> PushEvent {
        PushEvent::Drone(DroneState {
            status: DroneStatus::Scanning,
            industry_id,
            industry_name: None,
        })
    }

    #[tokio::test]
    async fn test_select_loads_history_and_snapshot() {
        let service = DashboardService::new(Arc::new(api_with_history()), settings(), ZeroPolicy::default());
        service.select(2).await;

        let view = service.view().await;
        assert_eq!(view.selected, Some(2));
        assert_eq!(view.series.len(), 3);
        assert_eq!(view.compliance.overall, StatusTier::Warning);
        assert_eq!(view.reading.unwrap().id, Some(2002));

        service.select(1).await;
        let view = service.view().await;
        assert_eq!(view.series.len(), 40);
        assert_eq!(view.series[0].id, Some(1010));
        assert_eq!(view.compliance.overall, StatusTier::Safe);
    }

    #[tokio::test]
    async fn test_history_for_previous_selection_is_dropped() {
        let gate = Arc::new(Notify::new());
        let mut api = api_with_history();
        api.gates.insert(1, gate.clone());
        let service = DashboardService::new(Arc::new(api), settings(), ZeroPolicy::default());

        let slow = {
            let service = service.clone();
            tokio::spawn(async move { service.select(1).await })
        };
        while service.view().await.selected != Some(1) {
            tokio::task::yield_now().await;
        }

        service.select(2).await;
        gate.notify_one();
        slow.await.unwrap();

        let view = service.view().await;
        assert_eq!(view.selected, Some(2));
        assert_eq!(view.series.len(), 3);
        assert!(view.series.iter().all(|r| r.industry_id == 2));
        assert_eq!(view.reading.unwrap().industry_id, 2);
    }

    #[tokio::test]
    async fn test_push_only_applies_to_selection() {
        let service = DashboardService::new(Arc::new(api_with_history()), settings(), ZeroPolicy::default());
        service.select(2).await;

        service.apply(PushEvent::Reading(reading(1, 99, 500.0))).await;
        let view = service.view().await;
        assert_eq!(view.series.len(), 3);
        assert_eq!(view.compliance.overall, StatusTier::Warning);

        service.apply(PushEvent::Reading(reading(2, 3, 130.0))).await;
        let view = service.view().await;
        assert_eq!(view.series.len(), 4);
        assert_eq!(view.compliance.overall, StatusTier::Danger);
        assert_eq!(view.gauges[0].percent, Some(130));
    }

    #[tokio::test]
    async fn test_follows_drone_target_changes_only() {
        let service = DashboardService::new(Arc::new(api_with_history()), settings(), ZeroPolicy::default());

        service.apply(drone(1)).await;
        assert_eq!(service.view().await.selected, Some(1));

        // Operator picks another industry while the drone stays put
        service.select(2).await;
        service.apply(drone(1)).await;
        assert_eq!(service.view().await.selected, Some(2));

        service.apply(drone(2)).await;
        service.apply(drone(1)).await;
        let view = service.view().await;
        assert_eq!(view.selected, Some(1));
        assert_eq!(view.drone.unwrap().industry_id, 1);
    }

    #[tokio::test]
    async fn test_follow_keeps_pushes_flowing_while_history_loads() {
        let gate = Arc::new(Notify::new());
        let mut api = api_with_history();
        api.gates.insert(1, gate.clone());
        let service = DashboardService::new(Arc::new(api), settings(), ZeroPolicy::default());

        // Returns while the history fetch for industry 1 is still parked
        service.apply(drone(1)).await;
        service.apply(PushEvent::Reading(reading(1, 60, 70.0))).await;

        let view = service.view().await;
        assert_eq!(view.selected, Some(1));
        assert_eq!(view.series.len(), 1);
        assert_eq!(view.reading.as_ref().and_then(|r| r.id), Some(1060));

        gate.notify_one();
        while service.view().await.series.len() != 40 {
            tokio::task::yield_now().await;
        }

        // The older /live snapshot does not replace the pushed reading
        let view = service.view().await;
        assert_eq!(view.reading.and_then(|r| r.id), Some(1060));
    }

    #[tokio::test]
    async fn test_follow_disabled() {
        let mut settings = settings();
        settings.follow_drone = false;
        let service = DashboardService::new(Arc::new(api_with_history()), settings, ZeroPolicy::default());

        service.apply(drone(1)).await;
        let view = service.view().await;
        assert_eq!(view.selected, None);
        assert!(view.drone.is_some());
    }

    #[tokio::test]
    async fn test_run_publishes_connectivity() {
        let service = DashboardService::new(Arc::new(FakeApi::default()), settings(), ZeroPolicy::default());
        let mut updates = service.subscribe();
        let (tx, rx) = mpsc::channel(8);

        tx.send(PushEvent::Connected).await.unwrap();
        tx.send(PushEvent::Disconnected).await.unwrap();
        drop(tx);
        service.run(rx).await;

        assert!(updates.recv().await.unwrap().connected);
        assert!(!updates.recv().await.unwrap().connected);
        assert!(!service.view().await.connected);
    }
}
