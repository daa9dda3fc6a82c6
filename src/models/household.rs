// Household identity, connection settings and persisted config entries

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Title used when the auth probe does not name the household.
pub const DEFAULT_HOUSEHOLD_NAME: &str = "HaushaltsApp";

/// Identity returned by the auth probe. `id` is the dedup key for config entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HouseholdIdentity {
    pub id: String,
    pub display_name: String,
}

impl HouseholdIdentity {
    /// Reads `household._id` / `household.name` from an auth response body.
    /// Missing or mistyped fields fall back to `""` and `"HaushaltsApp"`.
    pub fn from_auth_response(body: &Value) -> Self {
        let household = body.get("household");
        let id = household
            .and_then(|h| h.get("_id"))
            .and_then(scalar_to_string)
            .unwrap_or_default();
        let display_name = household
            .and_then(|h| h.get("name"))
            .and_then(scalar_to_string)
            .unwrap_or_else(|| DEFAULT_HOUSEHOLD_NAME.to_string());
        Self { id, display_name }
    }
}

fn scalar_to_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Base URL + bearer token for one household. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    pub base_url: String,
    #[serde(skip_serializing)]
    pub token: String,
}

impl ConnectionConfig {
    /// Strips trailing slashes from `base_url`.
    pub fn new(base_url: &str, token: &str) -> Self {
        Self {
            base_url: normalize_base_url(base_url),
            token: token.to_string(),
        }
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

pub fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

/// A configured household as stored by the entry repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigEntry {
    pub entry_id: String,
    /// Household id from the auth probe; unique across entries.
    pub unique_id: String,
    pub title: String,
    pub url: String,
    #[serde(skip_serializing, default)]
    pub token: String,
    /// Creation time (ms since epoch).
    pub created_at: i64,
}

impl ConfigEntry {
    pub fn connection(&self) -> ConnectionConfig {
        ConnectionConfig::new(&self.url, &self.token)
    }
}

/// Entry data before the repository assigns an id.
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub unique_id: String,
    pub title: String,
    pub connection: ConnectionConfig,
}
