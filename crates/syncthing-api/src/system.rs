// System endpoints
//
// `/rest/system/*`: configuration, connections, debug facilities,
// discovery, error/log buffers, device pause/resume, lifecycle, and
// status/version queries. Each method is exactly one request.

use std::collections::HashMap;

use tracing::debug;

use crate::client::SyncthingClient;
use crate::error::Error;
use crate::query::Query;
use crate::transport::RequestBody;
use crate::types::{
    Config, ConfigInSync, Connections, DebugFacilities, DiscoveryEntry, ErrorList, LogMessages,
    Ping, SystemStatus, UpgradeInfo, VersionInfo,
};

/// Borrowed handle over the `/rest/system/*` endpoints.
#[derive(Debug, Clone, Copy)]
pub struct System<'a> {
    client: &'a SyncthingClient,
}

impl<'a> System<'a> {
    pub(crate) fn new(client: &'a SyncthingClient) -> Self {
        Self { client }
    }

    // ── Filesystem ───────────────────────────────────────────────────

    /// List subdirectories matching the `current` path prefix.
    ///
    /// `GET /rest/system/browse?current={path}`
    pub async fn browse(&self, current: Option<&str>) -> Result<Vec<String>, Error> {
        debug!(?current, "browsing directories");
        self.client
            .get("system/browse", Query::new().opt("current", current))
            .await
    }

    // ── Configuration ────────────────────────────────────────────────

    /// `GET /rest/system/config`
    pub async fn config(&self) -> Result<Config, Error> {
        self.client.get("system/config", Query::new()).await
    }

    /// Replace the whole daemon configuration.
    ///
    /// `POST /rest/system/config`
    pub async fn set_config(&self, config: &Config) -> Result<(), Error> {
        debug!(version = config.version, "writing config");
        let body = RequestBody::json(config)?;
        self.client
            .post_empty("system/config", Query::new(), Some(body))
            .await
    }

    /// Whether the running config matches what is on disk, i.e. no restart is pending.
    ///
    /// `GET /rest/system/config/insync`
    pub async fn is_config_in_sync(&self) -> Result<bool, Error> {
        let resp: ConfigInSync = self.client.get("system/config/insync", Query::new()).await?;
        Ok(resp.config_in_sync)
    }

    // ── Connections / discovery ──────────────────────────────────────

    /// `GET /rest/system/connections`
    pub async fn connections(&self) -> Result<Connections, Error> {
        self.client.get("system/connections", Query::new()).await
    }

    /// Device ID → addresses learned via discovery.
    ///
    /// `GET /rest/system/discovery`
    pub async fn discovery(&self) -> Result<HashMap<String, DiscoveryEntry>, Error> {
        self.client.get("system/discovery", Query::new()).await
    }

    // ── Debug facilities ─────────────────────────────────────────────

    /// `GET /rest/system/debug`
    pub async fn debug(&self) -> Result<DebugFacilities, Error> {
        self.client.get("system/debug", Query::new()).await
    }

    /// Toggle debug facilities.
    ///
    /// `GET /rest/system/debug?enable=a,b&disable=c`. Empty lists are omitted.
    pub async fn set_debug<S: AsRef<str>>(
        &self,
        enable: &[S],
        disable: &[S],
    ) -> Result<DebugFacilities, Error> {
        debug!(enable = enable.len(), disable = disable.len(), "updating debug facilities");
        let query = Query::new()
            .list("disable", disable.iter().map(AsRef::as_ref))
            .list("enable", enable.iter().map(AsRef::as_ref));
        self.client.get("system/debug", query).await
    }

    // ── Error and log buffers ────────────────────────────────────────

    /// `GET /rest/system/error`
    pub async fn errors(&self) -> Result<ErrorList, Error> {
        self.client.get("system/error", Query::new()).await
    }

    /// Append a message to the daemon's error list.
    ///
    /// `POST /rest/system/error`, body is the raw message text.
    pub async fn add_error(&self, message: &str) -> Result<(), Error> {
        self.client
            .post_empty(
                "system/error",
                Query::new(),
                Some(RequestBody::Text(message.to_owned())),
            )
            .await
    }

    /// `POST /rest/system/error/clear`
    pub async fn clear_errors(&self) -> Result<(), Error> {
        self.client
            .post_empty("system/error/clear", Query::new(), None)
            .await
    }

    /// Recent log lines.
    ///
    /// `GET /rest/system/log`
    pub async fn log(&self) -> Result<LogMessages, Error> {
        self.client.get("system/log", Query::new()).await
    }

    // ── Devices ──────────────────────────────────────────────────────

    /// `POST /rest/system/pause?device={id}`
    pub async fn pause(&self, device: &str) -> Result<(), Error> {
        debug!(device, "pausing device");
        self.client
            .post_empty("system/pause", Query::new().param("device", device), None)
            .await
    }

    /// `POST /rest/system/resume?device={id}`
    pub async fn resume(&self, device: &str) -> Result<(), Error> {
        debug!(device, "resuming device");
        self.client
            .post_empty("system/resume", Query::new().param("device", device), None)
            .await
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// `GET /rest/system/ping`
    pub async fn ping(&self) -> Result<Ping, Error> {
        self.client.get("system/ping", Query::new()).await
    }

    /// Erase the index database of one folder, or of all folders when `None`.
    /// The daemon restarts afterwards.
    ///
    /// `POST /rest/system/reset[?folder={id}]`
    pub async fn reset(&self, folder: Option<&str>) -> Result<(), Error> {
        debug!(?folder, "resetting index database");
        self.client
            .post_empty("system/reset", Query::new().opt("folder", folder), None)
            .await
    }

    /// `POST /rest/system/restart`
    pub async fn restart(&self) -> Result<(), Error> {
        debug!("requesting restart");
        self.client
            .post_empty("system/restart", Query::new(), None)
            .await
    }

    /// `POST /rest/system/shutdown`
    pub async fn shutdown(&self) -> Result<(), Error> {
        debug!("requesting shutdown");
        self.client
            .post_empty("system/shutdown", Query::new(), None)
            .await
    }

    // ── Status ───────────────────────────────────────────────────────

    /// `GET /rest/system/status`
    pub async fn status(&self) -> Result<SystemStatus, Error> {
        self.client.get("system/status", Query::new()).await
    }

    /// `GET /rest/system/upgrade`
    pub async fn upgrade(&self) -> Result<UpgradeInfo, Error> {
        self.client.get("system/upgrade", Query::new()).await
    }

    /// `GET /rest/system/version`
    pub async fn version(&self) -> Result<VersionInfo, Error> {
        self.client.get("system/version", Query::new()).await
    }
}
