// Sensor entity models as exposed to the entity registry

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Integration domain, used in device identifiers.
pub const DOMAIN: &str = "haushaltsapp";

/// Attribute map attached to a sensor reading.
pub type Attributes = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateClass {
    Measurement,
}

/// Static description of one sensor kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorDescription {
    /// Entity key, also the translation key.
    pub key: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub unit: &'static str,
    pub state_class: StateClass,
}

/// Device grouping all sensors of one config entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    pub identifiers: Vec<(String, String)>,
    pub name: String,
    pub manufacturer: String,
    /// Household title of the entry.
    pub model: String,
    pub entry_type: String,
}

impl DeviceInfo {
    pub fn for_entry(entry_id: &str, household_title: &str) -> Self {
        Self {
            identifiers: vec![(DOMAIN.to_string(), entry_id.to_string())],
            name: "HaushaltsApp".into(),
            manufacturer: "HaushaltsApp".into(),
            model: household_title.to_string(),
            entry_type: "service".into(),
        }
    }
}

/// Current state of one sensor entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorState {
    /// `{entry_id}_{key}`.
    pub unique_id: String,
    pub entry_id: String,
    pub key: String,
    pub translation_key: String,
    pub name: String,
    pub icon: String,
    pub unit_of_measurement: String,
    pub state_class: StateClass,
    /// `None` until the first successful fetch.
    pub value: Option<i64>,
    pub attributes: Attributes,
    /// False when the last refresh failed.
    pub available: bool,
    /// True when `value` comes from an older snapshot because the last refresh failed.
    pub stale: bool,
    pub device: DeviceInfo,
}
