// Per-entry contexts: one coordinator + scheduler task per configured household.
// Entries are independent; nothing is shared between them except the HTTP client and
// the update channel.

use crate::api_client::TerminalApi;
use crate::config::{HouseholdConfig, PollingConfig};
use crate::coordinator::{self, Coordinator, CoordinatorStatus, CoordinatorUpdate, SchedulerConfig};
use crate::entry_repo::EntryRepo;
use crate::models::{ConfigEntry, SensorState};
use crate::sensors;
use crate::setup_flow::{SetupFlow, SetupOutcome, UserInput};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{RwLock, broadcast, oneshot};
use tokio::time::Duration;

struct EntryContext {
    entry: ConfigEntry,
    coordinator: Arc<Coordinator>,
    shutdown_tx: oneshot::Sender<()>,
    handle: tokio::task::JoinHandle<()>,
}

/// Entry plus coordinator status, as listed by GET /api/entries.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryStatus {
    #[serde(flatten)]
    pub entry: ConfigEntry,
    pub status: CoordinatorStatus,
}

pub struct Hub {
    api: TerminalApi,
    repo: Arc<EntryRepo>,
    scan_interval: Duration,
    updates: broadcast::Sender<CoordinatorUpdate>,
    entries: RwLock<BTreeMap<String, EntryContext>>,
}

impl Hub {
    pub fn new(
        api: TerminalApi,
        repo: Arc<EntryRepo>,
        polling: &PollingConfig,
        updates: broadcast::Sender<CoordinatorUpdate>,
    ) -> Self {
        Self::with_scan_interval(
            api,
            repo,
            Duration::from_secs(polling.scan_interval_secs),
            updates,
        )
    }

    pub fn with_scan_interval(
        api: TerminalApi,
        repo: Arc<EntryRepo>,
        scan_interval: Duration,
        updates: broadcast::Sender<CoordinatorUpdate>,
    ) -> Self {
        Self {
            api,
            repo,
            scan_interval,
            updates,
            entries: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CoordinatorUpdate> {
        self.updates.subscribe()
    }

    /// Sets up every stored entry. Returns how many were loaded. First refreshes run
    /// inside the schedulers, so this does not wait on the remote API.
    pub async fn load_entries(&self) -> anyhow::Result<usize> {
        let entries = self.repo.list().await?;
        let n = entries.len();
        for entry in entries {
            self.register(entry, true).await;
        }
        Ok(n)
    }

    /// Runs the setup flow and sets up the entry it creates.
    pub async fn setup(&self, input: Option<UserInput>) -> anyhow::Result<SetupOutcome> {
        let outcome = SetupFlow::new(&self.api, &self.repo).submit(input).await?;
        if let SetupOutcome::CreateEntry { entry } = &outcome {
            self.setup_entry(entry.clone()).await;
        }
        Ok(outcome)
    }

    /// Sets up the `[[households]]` listed in the config file. Failures are logged and
    /// skipped. Returns how many entries were created.
    pub async fn setup_households(&self, households: &[HouseholdConfig]) -> usize {
        let mut created = 0;
        for household in households {
            let input = UserInput {
                url: household.url.clone(),
                token: household.token.clone(),
            };
            match self.setup(Some(input)).await {
                Ok(SetupOutcome::CreateEntry { entry }) => {
                    created += 1;
                    tracing::info!(
                        entry_id = %entry.entry_id,
                        household = %entry.title,
                        "household configured from config file"
                    );
                }
                Ok(SetupOutcome::Abort { reason }) => {
                    tracing::info!(
                        url = %household.url,
                        reason = %reason,
                        "household from config file skipped"
                    );
                }
                Ok(SetupOutcome::Form { errors, .. }) => {
                    tracing::warn!(
                        url = %household.url,
                        errors = ?errors,
                        "household from config file could not be set up"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        url = %household.url,
                        operation = "setup_households",
                        error = %e,
                        "household from config file could not be set up"
                    );
                }
            }
        }
        created
    }

    /// Registers the entry, then runs its first refresh. A failed first refresh leaves
    /// the entry set up without data; the scheduler retries on the next interval.
    pub async fn setup_entry(&self, entry: ConfigEntry) {
        let entry_id = entry.entry_id.clone();
        let coordinator = self.register(entry, false).await;
        if let Err(e) = coordinator.refresh().await {
            tracing::warn!(
                entry_id = %entry_id,
                operation = "setup_entry",
                error = %e,
                "first refresh failed; sensors unavailable until next poll"
            );
        }

        // The entry may have been deleted before it was registered.
        match self.repo.get(&entry_id).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                if self.unload_entry(&entry_id).await {
                    tracing::info!(entry_id = %entry_id, "entry removed during setup");
                }
            }
            Err(e) => {
                tracing::warn!(
                    entry_id = %entry_id,
                    operation = "setup_entry",
                    error = %e,
                    "could not confirm stored entry"
                );
            }
        }
    }

    /// Spawns the poll scheduler and adds the context. A context already registered
    /// under the same id is stopped.
    async fn register(&self, entry: ConfigEntry, refresh_on_start: bool) -> Arc<Coordinator> {
        let coordinator = Arc::new(Coordinator::new(
            entry.entry_id.clone(),
            entry.connection(),
            self.api.clone(),
            self.updates.clone(),
        ));
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let handle = coordinator::spawn(
            coordinator.clone(),
            SchedulerConfig {
                scan_interval: self.scan_interval,
                refresh_on_start,
            },
            shutdown_rx,
        );
        tracing::info!(
            entry_id = %entry.entry_id,
            household = %entry.title,
            "entry set up"
        );

        let previous = self.entries.write().await.insert(
            entry.entry_id.clone(),
            EntryContext {
                entry,
                coordinator: coordinator.clone(),
                shutdown_tx,
                handle,
            },
        );
        if let Some(old) = previous {
            stop_context(old).await;
        }
        coordinator
    }

    /// Stops the entry's scheduler. Returns false when the entry was not set up.
    pub async fn unload_entry(&self, entry_id: &str) -> bool {
        let ctx = self.entries.write().await.remove(entry_id);
        match ctx {
            Some(ctx) => {
                stop_context(ctx).await;
                tracing::info!(entry_id = %entry_id, "entry unloaded");
                true
            }
            None => false,
        }
    }

    /// Unloads and deletes the stored entry.
    pub async fn remove_entry(&self, entry_id: &str) -> anyhow::Result<bool> {
        let unloaded = self.unload_entry(entry_id).await;
        let deleted = self.repo.delete(entry_id).await?;
        Ok(unloaded || deleted)
    }

    pub async fn coordinator(&self, entry_id: &str) -> Option<Arc<Coordinator>> {
        self.entries
            .read()
            .await
            .get(entry_id)
            .map(|ctx| ctx.coordinator.clone())
    }

    pub async fn entry(&self, entry_id: &str) -> Option<ConfigEntry> {
        self.entries
            .read()
            .await
            .get(entry_id)
            .map(|ctx| ctx.entry.clone())
    }

    pub async fn sensors(&self, entry_id: &str) -> Option<Vec<SensorState>> {
        let (entry, coordinator) = {
            let entries = self.entries.read().await;
            let ctx = entries.get(entry_id)?;
            (ctx.entry.clone(), ctx.coordinator.clone())
        };
        let state = coordinator.state().await;
        Some(sensors::sensor_states(&entry, &state))
    }

    pub async fn all_sensors(&self) -> Vec<SensorState> {
        let mut out = Vec::new();
        for (entry, coordinator) in self.contexts().await {
            let state = coordinator.state().await;
            out.extend(sensors::sensor_states(&entry, &state));
        }
        out
    }

    pub async fn entry_statuses(&self) -> Vec<EntryStatus> {
        let mut out = Vec::new();
        for (entry, coordinator) in self.contexts().await {
            let state = coordinator.state().await;
            out.push(EntryStatus {
                entry,
                status: CoordinatorStatus::from(&state),
            });
        }
        out
    }

    /// Stops all schedulers (process shutdown). Stored entries are kept.
    pub async fn shutdown(&self) {
        let contexts: Vec<EntryContext> = {
            let mut entries = self.entries.write().await;
            std::mem::take(&mut *entries).into_values().collect()
        };
        for ctx in contexts {
            stop_context(ctx).await;
        }
        tracing::debug!("Hub shut down");
    }

    async fn contexts(&self) -> Vec<(ConfigEntry, Arc<Coordinator>)> {
        self.entries
            .read()
            .await
            .values()
            .map(|ctx| (ctx.entry.clone(), ctx.coordinator.clone()))
            .collect()
    }
}

async fn stop_context(ctx: EntryContext) {
    let EntryContext {
        entry,
        shutdown_tx,
        handle,
        ..
    } = ctx;
    let _ = shutdown_tx.send(());
    if let Err(e) = handle.await {
        tracing::warn!(entry_id = %entry.entry_id, error = %e, "scheduler task failed");
    }
}
