// Model tests: household identity parsing, URL normalization, JSON shape

use haushalt_bridge::error::FetchError;
use haushalt_bridge::models::*;
use serde_json::json;

#[test]
fn test_household_identity_from_auth_response() {
    let identity =
        HouseholdIdentity::from_auth_response(&json!({"household": {"_id": "h1", "name": "Home"}}));
    assert_eq!(identity.id, "h1");
    assert_eq!(identity.display_name, "Home");
}

#[test]
fn test_household_identity_defaults() {
    for body in [
        json!({}),
        json!({"household": null}),
        json!({"household": "h1"}),
        json!({"household": {"_id": null, "name": false}}),
        json!([]),
    ] {
        let identity = HouseholdIdentity::from_auth_response(&body);
        assert_eq!(identity.id, "", "{}", body);
        assert_eq!(identity.display_name, DEFAULT_HOUSEHOLD_NAME, "{}", body);
    }
}

#[test]
fn test_household_identity_numeric_id() {
    let identity = HouseholdIdentity::from_auth_response(&json!({"household": {"_id": 42}}));
    assert_eq!(identity.id, "42");
}

#[test]
fn test_connection_config_strips_trailing_slashes() {
    let conn = ConnectionConfig::new("http://haushalt.local:3000///", "t");
    assert_eq!(conn.base_url, "http://haushalt.local:3000");
    assert_eq!(
        conn.endpoint("/api/terminal/auth"),
        "http://haushalt.local:3000/api/terminal/auth"
    );
    assert_eq!(normalize_base_url(" http://x/ "), "http://x");
}

#[test]
fn test_config_entry_serialization_hides_token() {
    let entry = ConfigEntry {
        entry_id: "1".into(),
        unique_id: "h1".into(),
        title: "Home".into(),
        url: "http://haushalt.local".into(),
        token: "secret".into(),
        created_at: 1,
    };
    let json = serde_json::to_string(&entry).unwrap();
    assert!(json.contains("\"entryId\""));
    assert!(json.contains("\"uniqueId\""));
    assert!(!json.contains("secret"));
}

#[test]
fn test_dashboard_snapshot_is_transparent() {
    let doc = json!({"summary": {"totalOpen": 1}});
    let snap = DashboardSnapshot::new(doc.clone());
    assert_eq!(serde_json::to_value(&snap).unwrap(), doc);
}

#[test]
fn test_fetch_error_messages() {
    assert_eq!(
        FetchError::ConnectionError("connection refused".into()).to_string(),
        "Verbindungsfehler: connection refused"
    );
    assert_eq!(
        serde_json::to_value(FetchError::ApiError(502)).unwrap(),
        json!({"kind": "api_error", "detail": 502})
    );
}
