// Shared test helpers
#![allow(dead_code)]

use haushalt_bridge::api_client::TerminalApi;
use haushalt_bridge::coordinator::CoordinatorUpdate;
use haushalt_bridge::entry_repo::EntryRepo;
use haushalt_bridge::hub::Hub;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

pub const TOKEN: &str = "test-token";

/// Client with short timeouts so timeout tests stay fast.
pub fn test_api() -> TerminalApi {
    TerminalApi::new(Duration::from_millis(500), Duration::from_millis(500)).unwrap()
}

pub fn dashboard_doc(total_open: i64, overdue: i64, due_today: i64) -> Value {
    json!({
        "summary": {
            "totalOpen": total_open,
            "overdueCount": overdue,
            "dueTodayCount": due_today
        },
        "members": [{"_id": "m1", "name": "Anna"}],
        "tasks": {
            "overdue": [{"title": "Müll rausbringen"}],
            "due_today": [{"title": "Blumen gießen"}],
            "no_deadline": []
        },
        "lastUpdated": "2026-10-19T08:00:00.000Z"
    })
}

/// SQLite entry repo in a temp dir; keep the TempDir alive for the test's duration.
pub async fn temp_repo() -> (tempfile::TempDir, Arc<EntryRepo>) {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("entries.db");
    let repo = EntryRepo::connect(path.to_str().unwrap()).await.unwrap();
    repo.init().await.unwrap();
    (dir, Arc::new(repo))
}

pub fn updates_channel() -> broadcast::Sender<CoordinatorUpdate> {
    let (tx, _) = broadcast::channel(16);
    tx
}

/// Hub whose scheduler never ticks during a test.
pub async fn test_hub() -> (tempfile::TempDir, Arc<Hub>) {
    let (dir, repo) = temp_repo().await;
    let hub = Hub::with_scan_interval(
        test_api(),
        repo,
        Duration::from_secs(3600),
        updates_channel(),
    );
    (dir, Arc::new(hub))
}
