// Syncthing REST client
//
// Owns the configured `Transport` and hands out borrowed endpoint groups
// (`system()`, `events()`). Endpoint methods live next to their group in
// separate modules to keep this one focused on construction and the
// shared GET/POST helpers.

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::Error;
use crate::events::Events;
use crate::query::Query;
use crate::system::System;
use crate::transport::{API_KEY_HEADER, ApiRequest, RequestBody, Transport, TransportConfig};

/// Everything needed to talk to one daemon.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Daemon GUI/API root, e.g. `http://127.0.0.1:8384`.
    pub url: Url,
    pub api_key: SecretString,
    pub transport: TransportConfig,
}

/// Async client for the Syncthing REST API.
///
/// Cheap to clone; clones share the underlying connection pool. Every
/// request carries the `X-API-Key` header.
#[derive(Debug, Clone)]
pub struct SyncthingClient {
    transport: Transport,
}

impl SyncthingClient {
    // ── Constructors ─────────────────────────────────────────────────

    pub fn new(config: &ClientConfig) -> Result<Self, Error> {
        Self::from_api_key(config.url.as_str(), &config.api_key, &config.transport)
    }

    /// Build from an API key and transport config.
    ///
    /// Injects `X-API-Key` as a sensitive default header on every request.
    pub fn from_api_key(
        base_url: &str,
        api_key: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        let mut key_value =
            HeaderValue::from_str(api_key.expose_secret()).map_err(|_| Error::InvalidApiKey)?;
        key_value.set_sensitive(true);
        headers.insert(API_KEY_HEADER, key_value);

        let http = transport.build_client_with_headers(headers)?;
        let base_url = Self::normalize_base_url(base_url)?;

        Ok(Self {
            transport: Transport::new(http, base_url, transport.timeout),
        })
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        let timeout = TransportConfig::default().timeout;
        Ok(Self {
            transport: Transport::new(http, base_url, timeout),
        })
    }

    /// Build the base URL ending in `/rest/`.
    ///
    /// Accepts both the daemon root (`http://host:8384`) and an explicit
    /// REST root (`http://host:8384/rest`).
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();

        if path.ends_with("/rest") {
            url.set_path(&format!("{path}/"));
        } else {
            url.set_path(&format!("{path}/rest/"));
        }
        Ok(url)
    }

    // ── Accessors ────────────────────────────────────────────────────

    /// The normalized `/rest/` base URL.
    pub fn base_url(&self) -> &Url {
        self.transport.base_url()
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// `/rest/system/*` endpoints.
    pub fn system(&self) -> System<'_> {
        System::new(self)
    }

    /// `/rest/events` endpoint and event streaming.
    pub fn events(&self) -> Events<'_> {
        Events::new(self)
    }

    // ── Request helpers ──────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str, query: Query) -> Result<T, Error> {
        self.transport
            .request(ApiRequest::get(path).query(query))
            .await?
            .json()
    }

    /// POST and discard whatever the daemon answers with.
    pub(crate) async fn post_empty(
        &self,
        path: &str,
        query: Query,
        body: Option<RequestBody>,
    ) -> Result<(), Error> {
        let mut req = ApiRequest::post(path).query(query);
        if let Some(body) = body {
            req = req.body(body);
        }
        self.transport.request(req).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_daemon_root() {
        let url = SyncthingClient::normalize_base_url("http://127.0.0.1:8384").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8384/rest/");
    }

    #[test]
    fn keeps_explicit_rest_root() {
        let url = SyncthingClient::normalize_base_url("https://nas.local/syncthing/rest/").unwrap();
        assert_eq!(url.as_str(), "https://nas.local/syncthing/rest/");
    }

    #[test]
    fn keeps_reverse_proxy_prefix() {
        let url = SyncthingClient::normalize_base_url("https://nas.local/syncthing").unwrap();
        assert_eq!(url.as_str(), "https://nas.local/syncthing/rest/");
    }

    #[test]
    fn rejects_unparseable_url() {
        let err = SyncthingClient::normalize_base_url("not a url").unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)));
    }

    #[test]
    fn rejects_api_key_with_newline() {
        let key = SecretString::from("abc\ndef".to_owned());
        let err = SyncthingClient::from_api_key(
            "http://127.0.0.1:8384",
            &key,
            &TransportConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidApiKey));
    }
}
