// Derived views: three task-count sensors projected from the dashboard snapshot

use crate::coordinator::CoordinatorState;
use crate::models::{
    Attributes, ConfigEntry, DashboardSnapshot, DeviceInfo, SensorDescription, SensorState,
    StateClass,
};

pub const ATTR_SUMMARY: &str = "summary";
pub const ATTR_MEMBERS: &str = "members";
pub const ATTR_TASKS: &str = "tasks";
pub const ATTR_LAST_UPDATED: &str = "last_updated";
pub const ATTR_OVERDUE: &str = "overdue";
pub const ATTR_DUE_TODAY: &str = "due_today";

const UNIT_TASKS: &str = "Aufgaben";

/// A sensor the registry polls: fixed description plus a pure projection.
pub trait SensorView: Send + Sync {
    fn description(&self) -> &SensorDescription;

    /// `(None, {})` without a snapshot; never fails on a malformed one.
    fn compute(&self, snapshot: Option<&DashboardSnapshot>) -> (Option<i64>, Attributes);

    fn key(&self) -> &'static str {
        self.description().key
    }
}

/// Total open tasks, with the whole dashboard as attributes.
pub struct OpenTasksView;

/// Overdue tasks.
pub struct OverdueTasksView;

/// Tasks due today.
pub struct DueTodayView;

const OPEN_TASKS: SensorDescription = SensorDescription {
    key: "open_tasks",
    name: "Offene Aufgaben",
    icon: "mdi:clipboard-list",
    unit: UNIT_TASKS,
    state_class: StateClass::Measurement,
};

const OVERDUE_TASKS: SensorDescription = SensorDescription {
    key: "overdue_tasks",
    name: "Überfällige Aufgaben",
    icon: "mdi:alert-circle",
    unit: UNIT_TASKS,
    state_class: StateClass::Measurement,
};

const TODAY_TASKS: SensorDescription = SensorDescription {
    key: "today_tasks",
    name: "Heute fällige Aufgaben",
    icon: "mdi:calendar-today",
    unit: UNIT_TASKS,
    state_class: StateClass::Measurement,
};

impl SensorView for OpenTasksView {
    fn description(&self) -> &SensorDescription {
        &OPEN_TASKS
    }

    fn compute(&self, snapshot: Option<&DashboardSnapshot>) -> (Option<i64>, Attributes) {
        let Some(snap) = snapshot else {
            return (None, Attributes::new());
        };
        let mut attrs = Attributes::new();
        attrs.insert(ATTR_SUMMARY.into(), snap.field_or_null("summary"));
        attrs.insert(ATTR_MEMBERS.into(), snap.field_or_null("members"));
        attrs.insert(ATTR_TASKS.into(), snap.field_or_null("tasks"));
        attrs.insert(ATTR_LAST_UPDATED.into(), snap.last_updated());
        (Some(snap.summary_count("totalOpen")), attrs)
    }
}

impl SensorView for OverdueTasksView {
    fn description(&self) -> &SensorDescription {
        &OVERDUE_TASKS
    }

    fn compute(&self, snapshot: Option<&DashboardSnapshot>) -> (Option<i64>, Attributes) {
        task_bucket_view(snapshot, "overdueCount", ATTR_OVERDUE)
    }
}

impl SensorView for DueTodayView {
    fn description(&self) -> &SensorDescription {
        &TODAY_TASKS
    }

    fn compute(&self, snapshot: Option<&DashboardSnapshot>) -> (Option<i64>, Attributes) {
        task_bucket_view(snapshot, "dueTodayCount", ATTR_DUE_TODAY)
    }
}

/// Count from `summary.<count_field>`, list from `tasks.<bucket>`.
fn task_bucket_view(
    snapshot: Option<&DashboardSnapshot>,
    count_field: &str,
    bucket: &str,
) -> (Option<i64>, Attributes) {
    let Some(snap) = snapshot else {
        return (None, Attributes::new());
    };
    let mut attrs = Attributes::new();
    attrs.insert(bucket.into(), snap.task_list(bucket));
    attrs.insert(ATTR_LAST_UPDATED.into(), snap.last_updated());
    (Some(snap.summary_count(count_field)), attrs)
}

/// All sensors created for a config entry, in registration order.
pub fn all_views() -> [&'static dyn SensorView; 3] {
    [&OpenTasksView, &OverdueTasksView, &DueTodayView]
}

/// Builds the registry-facing state of every sensor of `entry`.
pub fn sensor_states(entry: &ConfigEntry, state: &CoordinatorState) -> Vec<SensorState> {
    let snapshot = state.snapshot.as_deref();
    let available = state.last_update_success();
    let stale = snapshot.is_some() && state.last_error.is_some();
    let device = DeviceInfo::for_entry(&entry.entry_id, &entry.title);

    all_views()
        .into_iter()
        .map(|view| {
            let desc = view.description();
            let (value, attributes) = view.compute(snapshot);
            SensorState {
                unique_id: format!("{}_{}", entry.entry_id, desc.key),
                entry_id: entry.entry_id.clone(),
                key: desc.key.to_string(),
                translation_key: desc.key.to_string(),
                name: desc.name.to_string(),
                icon: desc.icon.to_string(),
                unit_of_measurement: desc.unit.to_string(),
                state_class: desc.state_class,
                value,
                attributes,
                available,
                stale,
                device: device.clone(),
            }
        })
        .collect()
}

