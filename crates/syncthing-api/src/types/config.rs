// Daemon configuration types
//
// Models for `GET/POST /rest/system/config`. The client never validates
// these; every struct keeps unknown fields in `extra` so a fetch, modify,
// write-back cycle preserves whatever newer daemons add.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Full daemon configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub version: u32,
    #[serde(default)]
    pub folders: Vec<FolderConfiguration>,
    #[serde(default)]
    pub devices: Vec<DeviceConfiguration>,
    #[serde(default)]
    pub gui: GuiConfiguration,
    #[serde(default)]
    pub ldap: LdapConfiguration,
    #[serde(default)]
    pub options: OptionsConfiguration,
    /// Opaque list; shape varies by daemon version.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub remote_ignored_devices: Value,
    /// Opaque list; shape varies by daemon version.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub pending_devices: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Config {
    pub fn folder(&self, id: &str) -> Option<&FolderConfiguration> {
        self.folders.iter().find(|f| f.id == id)
    }

    pub fn device(&self, id: &str) -> Option<&DeviceConfiguration> {
        self.devices.iter().find(|d| d.device_id == id)
    }

    pub fn device_mut(&mut self, id: &str) -> Option<&mut DeviceConfiguration> {
        self.devices.iter_mut().find(|d| d.device_id == id)
    }
}

// ── Folders ──────────────────────────────────────────────────────────

/// Device reference inside a folder's share list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceHeader {
    #[serde(rename = "deviceID")]
    pub device_id: String,
    #[serde(default)]
    pub introduced_by: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinDiskFree {
    pub value: f64,
    pub unit: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Versioning {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub params: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderConfiguration {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub filesystem_type: String,
    pub path: String,
    /// `sendreceive`, `sendonly`, `receiveonly`, ...
    #[serde(rename = "type", default)]
    pub folder_type: String,
    #[serde(default)]
    pub devices: Vec<DeviceHeader>,
    #[serde(rename = "rescanIntervalS", default)]
    pub rescan_interval_s: u32,
    #[serde(default)]
    pub fs_watcher_enabled: bool,
    #[serde(rename = "fsWatcherDelayS", default)]
    pub fs_watcher_delay_s: f64,
    #[serde(default)]
    pub ignore_perms: bool,
    #[serde(default)]
    pub auto_normalize: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_disk_free: Option<MinDiskFree>,
    #[serde(default)]
    pub versioning: Versioning,
    #[serde(default)]
    pub copiers: u32,
    #[serde(rename = "pullerMaxPendingKiB", default)]
    pub puller_max_pending_kib: u32,
    #[serde(default)]
    pub hashers: u32,
    #[serde(default)]
    pub order: String,
    #[serde(default)]
    pub ignore_delete: bool,
    #[serde(rename = "scanProgressIntervalS", default)]
    pub scan_progress_interval_s: i32,
    #[serde(rename = "pullerPauseS", default)]
    pub puller_pause_s: u32,
    #[serde(default)]
    pub max_conflicts: i32,
    #[serde(default)]
    pub disable_sparse_files: bool,
    #[serde(default)]
    pub disable_temp_indexes: bool,
    #[serde(default)]
    pub paused: bool,
    #[serde(default)]
    pub weak_hash_threshold_pct: u32,
    #[serde(default)]
    pub marker_name: String,
    #[serde(default)]
    pub copy_ownership_from_parent: bool,
    #[serde(rename = "modTimeWindowS", default)]
    pub mod_time_window_s: u32,
    #[serde(default)]
    pub max_concurrent_writes: u32,
    #[serde(default)]
    pub disable_fsync: bool,
    #[serde(default)]
    pub block_pull_order: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── Devices ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceConfiguration {
    #[serde(rename = "deviceID")]
    pub device_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub addresses: Vec<String>,
    #[serde(default)]
    pub compression: String,
    #[serde(default)]
    pub cert_name: String,
    #[serde(default)]
    pub introducer: bool,
    #[serde(default)]
    pub skip_introduction_removals: bool,
    #[serde(default)]
    pub introduced_by: String,
    #[serde(default)]
    pub paused: bool,
    /// Opaque network allow-list entries.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub allowed_networks: Value,
    #[serde(default)]
    pub auto_accept_folders: bool,
    #[serde(default)]
    pub max_send_kbps: u64,
    #[serde(default)]
    pub max_recv_kbps: u64,
    /// Opaque list of folders this device offered that were ignored.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub ignored_folders: Value,
    /// Opaque list of folders this device offered that await acceptance.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub pending_folders: Value,
    #[serde(rename = "maxRequestKiB", default)]
    pub max_request_kib: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── GUI / LDAP ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuiConfiguration {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub unix_socket_permissions: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub auth_mode: String,
    #[serde(rename = "useTLS", default)]
    pub use_tls: bool,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub insecure_admin_access: bool,
    #[serde(default)]
    pub theme: String,
    #[serde(default)]
    pub debugging: bool,
    #[serde(default)]
    pub insecure_skip_hostcheck: bool,
    #[serde(default)]
    pub insecure_allow_frame_loading: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LdapConfiguration {
    #[serde(default)]
    pub address: String,
    #[serde(rename = "bindDN", default)]
    pub bind_dn: String,
    #[serde(default)]
    pub transport: String,
    #[serde(default)]
    pub insecure_skip_verify: bool,
    #[serde(rename = "searchBaseDN", default)]
    pub search_base_dn: String,
    #[serde(default)]
    pub search_filter: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── Options ──────────────────────────────────────────────────────────

/// Global daemon options.
///
/// Only the commonly inspected knobs are modeled; the full set lives in
/// `extra` and survives round trips untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionsConfiguration {
    #[serde(default)]
    pub listen_addresses: Vec<String>,
    #[serde(default)]
    pub global_announce_servers: Vec<String>,
    #[serde(default)]
    pub global_announce_enabled: bool,
    #[serde(default)]
    pub local_announce_enabled: bool,
    #[serde(default)]
    pub local_announce_port: u16,
    #[serde(rename = "localAnnounceMCAddr", default)]
    pub local_announce_mc_addr: String,
    #[serde(default)]
    pub max_send_kbps: u64,
    #[serde(default)]
    pub max_recv_kbps: u64,
    #[serde(rename = "reconnectionIntervalS", default)]
    pub reconnection_interval_s: u32,
    #[serde(default)]
    pub relays_enabled: bool,
    #[serde(default)]
    pub start_browser: bool,
    #[serde(default)]
    pub nat_enabled: bool,
    #[serde(default)]
    pub ur_accepted: i32,
    #[serde(default)]
    pub ur_seen: i32,
    #[serde(rename = "autoUpgradeIntervalH", default)]
    pub auto_upgrade_interval_h: u32,
    #[serde(default)]
    pub upgrade_to_pre_releases: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_home_disk_free: Option<MinDiskFree>,
    /// Opaque network list.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub always_local_nets: Value,
    #[serde(rename = "unackedNotificationIDs", default)]
    pub unacked_notification_ids: Vec<String>,
    #[serde(default)]
    pub default_folder_path: String,
    #[serde(default)]
    pub max_folder_concurrency: i32,
    #[serde(default)]
    pub crash_reporting_enabled: bool,
    #[serde(default)]
    pub stun_servers: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
