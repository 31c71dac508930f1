// System endpoint response types
//
// Shapes returned by `/rest/system/*`. Fields use `#[serde(default)]`
// liberally because daemon versions disagree about which keys are present.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ── Connections ──────────────────────────────────────────────────────

/// `GET /rest/system/connections`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connections {
    /// Keyed by device ID.
    #[serde(default)]
    pub connections: HashMap<String, Connection>,
    pub total: Connection,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub client_version: String,
    #[serde(default)]
    pub connected: bool,
    #[serde(default)]
    pub crypto: String,
    #[serde(default)]
    pub in_bytes_total: u64,
    #[serde(default)]
    pub out_bytes_total: u64,
    #[serde(default)]
    pub paused: bool,
    #[serde(rename = "type", default)]
    pub connection_type: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── Debug / discovery ────────────────────────────────────────────────

/// `GET /rest/system/debug`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugFacilities {
    #[serde(default)]
    pub enabled: Option<Vec<String>>,
    /// Facility name → human-readable description.
    #[serde(default)]
    pub facilities: HashMap<String, String>,
}

impl DebugFacilities {
    pub fn is_enabled(&self, facility: &str) -> bool {
        self.enabled
            .as_ref()
            .is_some_and(|on| on.iter().any(|f| f == facility))
    }
}

/// One device's entry in `GET /rest/system/discovery`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryEntry {
    #[serde(default)]
    pub addresses: Vec<String>,
}

// ── Errors / log ─────────────────────────────────────────────────────

/// A timestamped daemon message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub when: DateTime<Utc>,
    pub message: String,
    /// Present on `/system/log` entries only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<i32>,
}

/// `GET /rest/system/error`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorList {
    /// The daemon sends `null` when there are no errors.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub errors: Vec<LogEntry>,
}

/// `GET /rest/system/log`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogMessages {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub messages: Vec<LogEntry>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

// ── Ping / in-sync ───────────────────────────────────────────────────

/// `GET /rest/system/ping`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ping {
    pub ping: String,
}

/// `GET /rest/system/config/insync`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigInSync {
    pub config_in_sync: bool,
}

// ── Status ───────────────────────────────────────────────────────────

/// Listener state inside [`SystemStatus::connection_service_status`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListenerStatus {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub lan_addresses: Vec<String>,
    #[serde(default)]
    pub wan_addresses: Vec<String>,
}

/// `GET /rest/system/status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemStatus {
    #[serde(rename = "myID")]
    pub my_id: String,
    #[serde(default)]
    pub alloc: u64,
    #[serde(default)]
    pub sys: u64,
    #[serde(default)]
    pub cpu_percent: f64,
    #[serde(default)]
    pub goroutines: u32,
    #[serde(default)]
    pub uptime: u64,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub path_separator: String,
    #[serde(default)]
    pub tilde: String,
    #[serde(default)]
    pub discovery_enabled: bool,
    #[serde(default)]
    pub discovery_methods: u32,
    #[serde(default)]
    pub discovery_errors: HashMap<String, String>,
    #[serde(default)]
    pub connection_service_status: HashMap<String, ListenerStatus>,
    #[serde(default)]
    pub gui_address_overridden: bool,
    #[serde(default)]
    pub gui_address_used: String,
    /// Opaque per-address dial results.
    #[serde(default)]
    pub last_dial_status: Value,
    #[serde(default)]
    pub ur_version_max: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── Upgrade / version ────────────────────────────────────────────────

/// `GET /rest/system/upgrade`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeInfo {
    pub latest: String,
    #[serde(default)]
    pub major_version: bool,
    #[serde(default)]
    pub newer: bool,
    pub running: String,
}

/// `GET /rest/system/version`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionInfo {
    pub version: String,
    #[serde(default)]
    pub arch: String,
    #[serde(default)]
    pub os: String,
    #[serde(default)]
    pub codename: String,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_beta: bool,
    #[serde(default)]
    pub is_candidate: bool,
    #[serde(default)]
    pub is_release: bool,
    #[serde(default)]
    pub long_version: String,
    #[serde(default)]
    pub stamp: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub user: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn null_error_list_is_empty() {
        let list: ErrorList = serde_json::from_value(json!({ "errors": null })).unwrap();
        assert!(list.errors.is_empty());
    }

    #[test]
    fn log_entries_carry_levels() {
        let log: LogMessages = serde_json::from_value(json!({
            "messages": [{
                "when": "2024-03-01T12:00:00.123456789+01:00",
                "message": "Ready to synchronize",
                "level": 2
            }]
        }))
        .unwrap();
        assert_eq!(log.messages[0].level, Some(2));
        assert_eq!(log.messages[0].when.to_rfc3339(), "2024-03-01T11:00:00.123456789+00:00");
    }

    #[test]
    fn status_decodes_listeners() {
        let status: SystemStatus = serde_json::from_value(json!({
            "myID": "P56IOI7-MZJNU2Y",
            "alloc": 1024,
            "cpuPercent": 0.5,
            "connectionServiceStatus": {
                "tcp://0.0.0.0:22000": { "error": null, "lanAddresses": ["tcp://0.0.0.0:22000"], "wanAddresses": [] }
            },
            "lastDialStatus": { "tcp://10.0.0.2:22000": { "when": "2024-03-01T12:00:00Z", "error": "refused" } },
            "startTime": "2024-03-01T10:00:00Z",
            "uptime": 7200
        }))
        .unwrap();
        assert_eq!(status.my_id, "P56IOI7-MZJNU2Y");
        let listener = &status.connection_service_status["tcp://0.0.0.0:22000"];
        assert!(listener.error.is_none());
        assert_eq!(listener.lan_addresses.len(), 1);
        assert!(status.last_dial_status.is_object());
    }

    #[test]
    fn debug_facility_lookup() {
        let debug: DebugFacilities = serde_json::from_value(json!({
            "enabled": ["model"],
            "facilities": { "model": "The root hub", "db": "The database layer" }
        }))
        .unwrap();
        assert!(debug.is_enabled("model"));
        assert!(!debug.is_enabled("db"));
    }
}
