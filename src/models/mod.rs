// Domain models: households, dashboard snapshot, sensor entities

mod dashboard;
mod household;
mod sensor;

pub use dashboard::DashboardSnapshot;
pub use household::{
    ConfigEntry, ConnectionConfig, DEFAULT_HOUSEHOLD_NAME, HouseholdIdentity, NewEntry,
    normalize_base_url,
};
pub use sensor::{Attributes, DOMAIN, DeviceInfo, SensorDescription, SensorState, StateClass};
