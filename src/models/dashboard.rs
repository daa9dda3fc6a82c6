// Dashboard snapshot: the raw ha-dashboard document with permissive accessors

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Last successfully fetched `/api/terminal/ha-dashboard` document.
///
/// The remote schema is not validated. Accessors never fail: absent or
/// mistyped fields come back as 0, an empty list, or `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DashboardSnapshot(Value);

impl DashboardSnapshot {
    pub fn new(document: Value) -> Self {
        Self(document)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Top-level field, `None` when absent or when the document is not an object.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.0.as_object().and_then(|o| o.get(key))
    }

    /// Top-level field cloned, `null` when absent.
    pub fn field_or_null(&self, key: &str) -> Value {
        self.field(key).cloned().unwrap_or(Value::Null)
    }

    /// `summary.<name>` as an integer (default 0).
    pub fn summary_count(&self, name: &str) -> i64 {
        self.field("summary")
            .and_then(|s| s.as_object())
            .and_then(|s| s.get(name))
            .map(count_value)
            .unwrap_or(0)
    }

    /// `tasks.<bucket>` as a list (default empty).
    pub fn task_list(&self, bucket: &str) -> Value {
        match self
            .field("tasks")
            .and_then(|t| t.as_object())
            .and_then(|t| t.get(bucket))
        {
            Some(list @ Value::Array(_)) => list.clone(),
            _ => Value::Array(Vec::new()),
        }
    }

    pub fn last_updated(&self) -> Value {
        self.field_or_null("lastUpdated")
    }
}

/// Integer reading of a JSON value. Floats truncate toward zero; non-numbers are 0.
fn count_value(v: &Value) -> i64 {
    if let Some(i) = v.as_i64() {
        i
    } else if let Some(u) = v.as_u64() {
        i64::try_from(u).unwrap_or(i64::MAX)
    } else if let Some(f) = v.as_f64() {
        f as i64
    } else {
        0
    }
}
