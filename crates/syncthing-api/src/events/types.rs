//! Event model for `GET /rest/events`.
//!
//! An [`Event`] keeps its `data` as raw JSON so nothing the daemon sends is
//! lost; [`Event::payload`] decodes it into the typed [`EventPayload`]
//! variant selected by the event's [`EventType`].

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use strum::{EnumString, IntoStaticStr};

use crate::error::Error;
use crate::types::Config;

// ── EventType ────────────────────────────────────────────────────────

/// Event discriminant as sent in the `type` field.
///
/// Unknown names from newer daemons decode to [`EventType::Other`] rather
/// than failing the whole batch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumString, IntoStaticStr)]
#[non_exhaustive]
pub enum EventType {
    ConfigSaved,
    DeviceConnected,
    DeviceDisconnected,
    DeviceDiscovered,
    DevicePaused,
    DeviceRejected,
    DeviceResumed,
    DownloadProgress,
    FolderCompletion,
    FolderErrors,
    FolderRejected,
    FolderScanProgress,
    FolderSummary,
    ItemFinished,
    ItemStarted,
    ListenAddressesChanged,
    LocalChangeDetected,
    LocalIndexUpdated,
    LoginAttempt,
    RemoteChangeDetected,
    RemoteDownloadProgress,
    RemoteIndexUpdated,
    Starting,
    StartupComplete,
    StateChanged,
    #[strum(default)]
    Other(String),
}

impl EventType {
    /// Every discriminant this crate has a typed payload for.
    pub const KNOWN: [Self; 25] = [
        Self::ConfigSaved,
        Self::DeviceConnected,
        Self::DeviceDisconnected,
        Self::DeviceDiscovered,
        Self::DevicePaused,
        Self::DeviceRejected,
        Self::DeviceResumed,
        Self::DownloadProgress,
        Self::FolderCompletion,
        Self::FolderErrors,
        Self::FolderRejected,
        Self::FolderScanProgress,
        Self::FolderSummary,
        Self::ItemFinished,
        Self::ItemStarted,
        Self::ListenAddressesChanged,
        Self::LocalChangeDetected,
        Self::LocalIndexUpdated,
        Self::LoginAttempt,
        Self::RemoteChangeDetected,
        Self::RemoteDownloadProgress,
        Self::RemoteIndexUpdated,
        Self::Starting,
        Self::StartupComplete,
        Self::StateChanged,
    ];

    /// The wire name, e.g. `"ItemFinished"`.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Other(name) => name,
            known => known.into(),
        }
    }

    /// Parse a wire name; never fails.
    pub fn from_name(name: &str) -> Self {
        Self::from_str(name).unwrap_or_else(|_| Self::Other(name.to_owned()))
    }
}

impl AsRef<str> for EventType {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for EventType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EventType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::from_name(&name))
    }
}

// ── Event ────────────────────────────────────────────────────────────

/// One entry of the daemon's event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Per-process sequence number; restarts when the daemon does.
    pub id: u64,
    #[serde(rename = "globalID", default)]
    pub global_id: u64,
    pub time: DateTime<Utc>,
    #[serde(rename = "type")]
    pub event_type: EventType,
    #[serde(default)]
    pub data: Value,
}

impl Event {
    /// Decode `data` into an arbitrary caller type.
    pub fn data_as<T: DeserializeOwned>(&self) -> Result<T, Error> {
        T::deserialize(&self.data).map_err(|e| Error::Deserialization {
            message: format!("{} payload: {e}", self.event_type),
            body: self.data.to_string(),
        })
    }

    /// Decode `data` into the payload matching this event's type.
    pub fn payload(&self) -> Result<EventPayload, Error> {
        use EventPayload as P;

        Ok(match self.event_type {
            EventType::ConfigSaved => P::ConfigSaved(Box::new(self.data_as()?)),
            EventType::DeviceConnected => P::DeviceConnected(self.data_as()?),
            EventType::DeviceDisconnected => P::DeviceDisconnected(self.data_as()?),
            EventType::DeviceDiscovered => P::DeviceDiscovered(self.data_as()?),
            EventType::DevicePaused => P::DevicePaused(self.data_as()?),
            EventType::DeviceRejected => P::DeviceRejected(self.data_as()?),
            EventType::DeviceResumed => P::DeviceResumed(self.data_as()?),
            EventType::DownloadProgress => P::DownloadProgress(self.data_as()?),
            EventType::FolderCompletion => P::FolderCompletion(self.data_as()?),
            EventType::FolderErrors => P::FolderErrors(self.data_as()?),
            EventType::FolderRejected => P::FolderRejected(self.data_as()?),
            EventType::FolderScanProgress => P::FolderScanProgress(self.data_as()?),
            EventType::FolderSummary => P::FolderSummary(self.data_as()?),
            EventType::ItemFinished => P::ItemFinished(self.data_as()?),
            EventType::ItemStarted => P::ItemStarted(self.data_as()?),
            EventType::ListenAddressesChanged => P::ListenAddressesChanged(self.data_as()?),
            EventType::LocalChangeDetected => P::LocalChangeDetected(self.data_as()?),
            EventType::LocalIndexUpdated => P::LocalIndexUpdated(self.data_as()?),
            EventType::LoginAttempt => P::LoginAttempt(self.data_as()?),
            EventType::RemoteChangeDetected => P::RemoteChangeDetected(self.data_as()?),
            EventType::RemoteDownloadProgress => P::RemoteDownloadProgress(self.data_as()?),
            EventType::RemoteIndexUpdated => P::RemoteIndexUpdated(self.data_as()?),
            EventType::Starting => P::Starting(self.data_as()?),
            EventType::StartupComplete => P::StartupComplete,
            EventType::StateChanged => P::StateChanged(self.data_as()?),
            EventType::Other(_) => P::Other(self.data.clone()),
        })
    }
}

// ── Payloads ─────────────────────────────────────────────────────────

/// Typed `data` of an [`Event`].
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum EventPayload {
    ConfigSaved(Box<Config>),
    DeviceConnected(DeviceConnected),
    DeviceDisconnected(DeviceDisconnected),
    DeviceDiscovered(DeviceDiscovered),
    DevicePaused(DeviceRef),
    DeviceRejected(DeviceRejected),
    DeviceResumed(DeviceRef),
    /// Folder ID → file name → progress.
    DownloadProgress(HashMap<String, HashMap<String, PullerProgress>>),
    FolderCompletion(FolderCompletion),
    FolderErrors(FolderErrors),
    FolderRejected(FolderRejected),
    FolderScanProgress(FolderScanProgress),
    FolderSummary(FolderSummary),
    ItemFinished(ItemFinished),
    ItemStarted(ItemStarted),
    ListenAddressesChanged(ListenAddressesChanged),
    LocalChangeDetected(LocalChangeDetected),
    LocalIndexUpdated(LocalIndexUpdated),
    LoginAttempt(LoginAttempt),
    RemoteChangeDetected(RemoteChangeDetected),
    RemoteDownloadProgress(RemoteDownloadProgress),
    RemoteIndexUpdated(RemoteIndexUpdated),
    Starting(Starting),
    StartupComplete,
    StateChanged(StateChanged),
    /// Payload of an event type this crate does not model.
    Other(Value),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceConnected {
    pub id: String,
    #[serde(default)]
    pub addr: String,
    #[serde(default)]
    pub client_name: String,
    #[serde(default)]
    pub client_version: String,
    #[serde(default)]
    pub device_name: String,
    #[serde(rename = "type", default)]
    pub connection_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceDisconnected {
    pub id: String,
    #[serde(default)]
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceDiscovered {
    pub device: String,
    #[serde(default)]
    pub addrs: Vec<String>,
}

/// Payload of `DevicePaused` / `DeviceResumed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRef {
    pub device: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRejected {
    pub device: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullerProgress {
    pub total: u64,
    pub pulling: u64,
    pub copied_from_origin: u64,
    pub reused: u64,
    pub copied_from_elsewhere: u64,
    pub pulled: u64,
    pub bytes_total: u64,
    pub bytes_done: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderCompletion {
    pub folder: String,
    pub device: String,
    pub completion: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileError {
    pub path: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderErrors {
    pub folder: String,
    #[serde(default)]
    pub errors: Vec<FileError>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderRejected {
    pub device: String,
    pub folder: String,
    #[serde(default)]
    pub folder_label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderScanProgress {
    pub folder: String,
    pub current: u64,
    pub total: u64,
    /// Bytes per second.
    #[serde(default)]
    pub rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderSummary {
    pub folder: String,
    pub summary: FolderSummaryData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderSummaryData {
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub state_changed: Option<DateTime<Utc>>,
    #[serde(default)]
    pub global_bytes: u64,
    #[serde(default)]
    pub global_total_items: u64,
    #[serde(default)]
    pub local_bytes: u64,
    #[serde(default)]
    pub in_sync_bytes: u64,
    #[serde(default)]
    pub need_bytes: u64,
    #[serde(default)]
    pub need_total_items: u64,
    #[serde(default)]
    pub errors: u64,
    #[serde(default)]
    pub pull_errors: u64,
    #[serde(default)]
    pub sequence: u64,
    #[serde(default)]
    pub version: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// What happened to a synced item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemAction {
    Update,
    Metadata,
    Delete,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStarted {
    pub folder: String,
    pub item: String,
    pub action: ItemAction,
    #[serde(rename = "type", default)]
    pub item_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemFinished {
    pub folder: String,
    pub item: String,
    pub action: ItemAction,
    #[serde(rename = "type", default)]
    pub item_type: String,
    /// `None` on success.
    #[serde(default)]
    pub error: Option<String>,
}

/// Listener address change. The address objects are opaque URL structs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListenAddressesChanged {
    #[serde(default)]
    pub address: Value,
    #[serde(default)]
    pub lan: Value,
    #[serde(default)]
    pub wan: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalChangeDetected {
    #[serde(rename = "folderID", alias = "folder")]
    pub folder_id: String,
    #[serde(default)]
    pub label: String,
    pub path: String,
    #[serde(default)]
    pub action: String,
    #[serde(rename = "type", default)]
    pub item_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalIndexUpdated {
    pub folder: String,
    #[serde(default)]
    pub items: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginAttempt {
    pub username: String,
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteChangeDetected {
    #[serde(rename = "folderID", alias = "folder")]
    pub folder_id: String,
    #[serde(default)]
    pub label: String,
    pub path: String,
    #[serde(default)]
    pub action: String,
    #[serde(rename = "type", default)]
    pub item_type: String,
    #[serde(default)]
    pub modified_by: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteDownloadProgress {
    pub device: String,
    pub folder: String,
    /// File name → blocks downloaded so far.
    #[serde(default)]
    pub state: HashMap<String, u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteIndexUpdated {
    pub device: String,
    pub folder: String,
    #[serde(default)]
    pub items: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Starting {
    pub home: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateChanged {
    pub folder: String,
    pub from: String,
    pub to: String,
    /// Seconds spent in `from`.
    #[serde(default)]
    pub duration: Option<f64>,
}
