// Derived views: values and attributes over full, partial and malformed dashboards

mod common;

use common::dashboard_doc;
use haushalt_bridge::coordinator::CoordinatorState;
use haushalt_bridge::error::FetchError;
use haushalt_bridge::models::{ConfigEntry, DashboardSnapshot, StateClass};
use haushalt_bridge::sensors::{
    DueTodayView, OpenTasksView, OverdueTasksView, SensorView, all_views, sensor_states,
};
use serde_json::{Value, json};
use std::sync::Arc;

fn entry() -> ConfigEntry {
    ConfigEntry {
        entry_id: "7".into(),
        unique_id: "h1".into(),
        title: "Home".into(),
        url: "http://haushalt.local".into(),
        token: "t".into(),
        created_at: 0,
    }
}

#[test]
fn views_report_counts_from_summary() {
    let snap = DashboardSnapshot::new(dashboard_doc(5, 2, 1));
    assert_eq!(OpenTasksView.compute(Some(&snap)).0, Some(5));
    assert_eq!(OverdueTasksView.compute(Some(&snap)).0, Some(2));
    assert_eq!(DueTodayView.compute(Some(&snap)).0, Some(1));
}

#[test]
fn views_without_snapshot_are_empty() {
    for view in all_views() {
        let (value, attrs) = view.compute(None);
        assert_eq!(value, None, "{}", view.key());
        assert!(attrs.is_empty(), "{}", view.key());
    }
}

#[test]
fn views_default_to_zero_on_partial_or_malformed_documents() {
    let docs = [
        json!({}),
        json!({"summary": {}}),
        json!({"summary": null, "tasks": null}),
        json!({"summary": "broken", "tasks": [1, 2]}),
        json!({"summary": {"totalOpen": "5", "overdueCount": [], "dueTodayCount": {}}}),
        json!([]),
        json!(null),
        json!("text"),
    ];
    for doc in docs {
        let snap = DashboardSnapshot::new(doc.clone());
        for view in all_views() {
            let (value, _) = view.compute(Some(&snap));
            assert_eq!(value, Some(0), "{} on {}", view.key(), doc);
        }
    }
}

#[test]
fn open_tasks_attributes_carry_whole_dashboard() {
    let doc = dashboard_doc(5, 2, 1);
    let snap = DashboardSnapshot::new(doc.clone());
    let (_, attrs) = OpenTasksView.compute(Some(&snap));
    assert_eq!(attrs["summary"], doc["summary"]);
    assert_eq!(attrs["members"], doc["members"]);
    assert_eq!(attrs["tasks"], doc["tasks"]);
    assert_eq!(attrs["last_updated"], json!("2026-10-19T08:00:00.000Z"));
    assert_eq!(attrs.len(), 4);
}

#[test]
fn open_tasks_attributes_are_null_when_absent() {
    let snap = DashboardSnapshot::new(json!({"summary": {"totalOpen": 3}}));
    let (value, attrs) = OpenTasksView.compute(Some(&snap));
    assert_eq!(value, Some(3));
    assert_eq!(attrs["members"], Value::Null);
    assert_eq!(attrs["tasks"], Value::Null);
    assert_eq!(attrs["last_updated"], Value::Null);
}

#[test]
fn bucket_views_expose_their_task_lists() {
    let snap = DashboardSnapshot::new(dashboard_doc(5, 2, 1));
    let (_, overdue) = OverdueTasksView.compute(Some(&snap));
    assert_eq!(overdue["overdue"], json!([{"title": "Müll rausbringen"}]));
    assert_eq!(overdue["last_updated"], json!("2026-10-19T08:00:00.000Z"));
    assert_eq!(overdue.len(), 2);

    let (_, today) = DueTodayView.compute(Some(&snap));
    assert_eq!(today["due_today"], json!([{"title": "Blumen gießen"}]));
    assert_eq!(today.len(), 2);
}

#[test]
fn bucket_views_default_to_empty_lists() {
    let snap = DashboardSnapshot::new(json!({"tasks": {}}));
    assert_eq!(OverdueTasksView.compute(Some(&snap)).1["overdue"], json!([]));
    assert_eq!(DueTodayView.compute(Some(&snap)).1["due_today"], json!([]));
}

#[test]
fn sensor_states_before_first_refresh() {
    let states = sensor_states(&entry(), &CoordinatorState::default());
    assert_eq!(states.len(), 3);
    for s in &states {
        assert_eq!(s.value, None);
        assert!(!s.available);
        assert!(!s.stale);
    }
}

#[test]
fn sensor_states_carry_metadata() {
    let state = CoordinatorState {
        snapshot: Some(Arc::new(DashboardSnapshot::new(dashboard_doc(5, 2, 1)))),
        last_attempt_at: Some(chrono::Utc::now()),
        ..Default::default()
    };
    let states = sensor_states(&entry(), &state);
    let keys: Vec<_> = states.iter().map(|s| s.key.as_str()).collect();
    assert_eq!(keys, ["open_tasks", "overdue_tasks", "today_tasks"]);

    let open = &states[0];
    assert_eq!(open.unique_id, "7_open_tasks");
    assert_eq!(open.icon, "mdi:clipboard-list");
    assert_eq!(open.unit_of_measurement, "Aufgaben");
    assert_eq!(open.state_class, StateClass::Measurement);
    assert_eq!(open.value, Some(5));
    assert!(open.available);
    assert_eq!(open.device.model, "Home");
    assert_eq!(
        open.device.identifiers,
        vec![("haushaltsapp".to_string(), "7".to_string())]
    );
    assert_eq!(states[1].icon, "mdi:alert-circle");
    assert_eq!(states[2].icon, "mdi:calendar-today");
}

#[test]
fn sensor_states_keep_values_when_stale() {
    let state = CoordinatorState {
        snapshot: Some(Arc::new(DashboardSnapshot::new(dashboard_doc(5, 2, 1)))),
        last_error: Some(FetchError::ConnectionError("timeout".into())),
        last_attempt_at: Some(chrono::Utc::now()),
        ..Default::default()
    };
    let states = sensor_states(&entry(), &state);
    let values: Vec<_> = states.iter().map(|s| s.value).collect();
    assert_eq!(values, [Some(5), Some(2), Some(1)]);
    assert!(states.iter().all(|s| s.stale && !s.available));
}
