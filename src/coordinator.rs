// Polling data source: one coordinator per config entry, refreshed on a fixed interval.
// Only one fetch is in flight per coordinator; manual refreshes that arrive while a fetch
// is running wait for it and share its outcome instead of issuing a second request.

use crate::api_client::TerminalApi;
use crate::error::FetchError;
use crate::models::{ConnectionConfig, DashboardSnapshot};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Mutex, RwLock, broadcast};
use tokio::time::{Duration, Instant, interval_at};
use tracing::Instrument;

pub type RefreshOutcome = Result<Arc<DashboardSnapshot>, FetchError>;

/// Whether sensors have data, and whether it is current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DataState {
    /// No successful fetch yet.
    NoData,
    Fresh,
    /// Last refresh failed; showing the previous snapshot.
    Stale,
}

/// Snapshot and last-error marker, replaced together after every refresh.
#[derive(Debug, Clone, Default)]
pub struct CoordinatorState {
    pub snapshot: Option<Arc<DashboardSnapshot>>,
    pub last_error: Option<FetchError>,
    pub last_success_at: Option<DateTime<Utc>>,
    pub last_attempt_at: Option<DateTime<Utc>>,
}

impl CoordinatorState {
    pub fn data_state(&self) -> DataState {
        match (&self.snapshot, &self.last_error) {
            (None, _) => DataState::NoData,
            (Some(_), None) => DataState::Fresh,
            (Some(_), Some(_)) => DataState::Stale,
        }
    }

    /// True once a refresh has completed and the latest one succeeded.
    pub fn last_update_success(&self) -> bool {
        self.last_attempt_at.is_some() && self.last_error.is_none()
    }

    fn outcome(&self) -> RefreshOutcome {
        match (&self.last_error, &self.snapshot) {
            (Some(e), _) => Err(e.clone()),
            (None, Some(s)) => Ok(s.clone()),
            (None, None) => Err(FetchError::ConnectionError("no refresh completed".into())),
        }
    }
}

/// Serializable view of a coordinator's state (no document body).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoordinatorStatus {
    pub data_state: DataState,
    pub last_update_success: bool,
    pub last_error: Option<String>,
    pub last_success_at: Option<DateTime<Utc>>,
    pub last_attempt_at: Option<DateTime<Utc>>,
}

impl From<&CoordinatorState> for CoordinatorStatus {
    fn from(s: &CoordinatorState) -> Self {
        Self {
            data_state: s.data_state(),
            last_update_success: s.last_update_success(),
            last_error: s.last_error.as_ref().map(|e| e.to_string()),
            last_success_at: s.last_success_at,
            last_attempt_at: s.last_attempt_at,
        }
    }
}

/// Published after every completed refresh.
#[derive(Debug, Clone)]
pub struct CoordinatorUpdate {
    pub entry_id: String,
    pub state: CoordinatorState,
}

pub struct Coordinator {
    entry_id: String,
    connection: ConnectionConfig,
    api: TerminalApi,
    state: RwLock<CoordinatorState>,
    in_flight: Mutex<()>,
    completed_refreshes: AtomicU64,
    updates: broadcast::Sender<CoordinatorUpdate>,
}

impl Coordinator {
    pub fn new(
        entry_id: impl Into<String>,
        connection: ConnectionConfig,
        api: TerminalApi,
        updates: broadcast::Sender<CoordinatorUpdate>,
    ) -> Self {
        Self {
            entry_id: entry_id.into(),
            connection,
            api,
            state: RwLock::new(CoordinatorState::default()),
            in_flight: Mutex::new(()),
            completed_refreshes: AtomicU64::new(0),
            updates,
        }
    }

    pub fn entry_id(&self) -> &str {
        &self.entry_id
    }

    pub fn connection(&self) -> &ConnectionConfig {
        &self.connection
    }

    /// Consistent copy of the current state (snapshot is shared, not cloned).
    pub async fn state(&self) -> CoordinatorState {
        self.state.read().await.clone()
    }

    pub async fn snapshot(&self) -> Option<Arc<DashboardSnapshot>> {
        self.state.read().await.snapshot.clone()
    }

    /// Number of refreshes that ran a request to completion.
    pub fn completed_refreshes(&self) -> u64 {
        self.completed_refreshes.load(Ordering::Acquire)
    }

    /// Fetches the dashboard once. On failure the previous snapshot is kept and marked stale.
    pub async fn refresh(&self) -> RefreshOutcome {
        let seen = self.completed_refreshes.load(Ordering::Acquire);
        let _guard = self.in_flight.lock().await;
        if self.completed_refreshes.load(Ordering::Acquire) != seen {
            tracing::debug!(
                entry_id = %self.entry_id,
                operation = "refresh",
                "refresh coalesced with in-flight request"
            );
            return self.state.read().await.outcome();
        }

        let result = self.api.fetch_dashboard(&self.connection).await;
        let now = Utc::now();

        let (outcome, published) = {
            let mut state = self.state.write().await;
            let was_failing = state.last_error.is_some();
            state.last_attempt_at = Some(now);
            let outcome = match result {
                Ok(snapshot) => {
                    let snapshot = Arc::new(snapshot);
                    state.snapshot = Some(snapshot.clone());
                    state.last_error = None;
                    state.last_success_at = Some(now);
                    if was_failing {
                        tracing::info!(
                            entry_id = %self.entry_id,
                            operation = "refresh",
                            "dashboard fetch recovered"
                        );
                    } else {
                        tracing::debug!(
                            entry_id = %self.entry_id,
                            operation = "refresh",
                            "dashboard fetched"
                        );
                    }
                    Ok(snapshot)
                }
                Err(e) => {
                    tracing::warn!(
                        entry_id = %self.entry_id,
                        operation = "refresh",
                        error = %e,
                        has_snapshot = state.snapshot.is_some(),
                        "dashboard fetch failed"
                    );
                    state.last_error = Some(e.clone());
                    Err(e)
                }
            };
            (outcome, state.clone())
        };
        self.completed_refreshes.fetch_add(1, Ordering::AcqRel);

        // No receivers just means nobody is watching /ws/sensors.
        let _ = self.updates.send(CoordinatorUpdate {
            entry_id: self.entry_id.clone(),
            state: published,
        });
        outcome
    }
}

/// Scheduler timing.
pub struct SchedulerConfig {
    pub scan_interval: Duration,
    /// Poll immediately instead of one interval after start.
    pub refresh_on_start: bool,
}

/// Spawns the fixed-interval poll loop. Unless `refresh_on_start` is set, the first poll
/// fires one interval after start (the caller performs the initial refresh). Exits when
/// `shutdown_rx` fires or its sender is dropped.
pub fn spawn(
    coordinator: Arc<Coordinator>,
    config: SchedulerConfig,
    mut shutdown_rx: tokio::sync::oneshot::Receiver<()>,
) -> tokio::task::JoinHandle<()> {
    let SchedulerConfig {
        scan_interval,
        refresh_on_start,
    } = config;
    let span = tracing::debug_span!(
        "scheduler",
        entry_id = %coordinator.entry_id(),
        scan_interval_secs = scan_interval.as_secs()
    );
    tokio::spawn(
        async move {
            let start = if refresh_on_start {
                Instant::now()
            } else {
                Instant::now() + scan_interval
            };
            let mut tick = interval_at(start, scan_interval);
            tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = tick.tick() => {
                        // Failures are logged and kept as last_error by refresh().
                        let _ = coordinator.refresh().await;
                    }
                    _ = &mut shutdown_rx => {
                        tracing::debug!("Scheduler shutting down");
                        break;
                    }
                }
            }
        }
        .instrument(span),
    )
}
