// HTTP transport: one request in, one decoded response envelope out.
//
// Every endpoint method funnels through `Transport::request`, which owns
// query rendering, body encoding, content-type sniffing, and the
// status-code split between success and `Error::Api`.

use std::path::PathBuf;
use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::query::Query;

const JSON_CONTENT_TYPE: &str = "application/json";
const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Header the daemon authenticates REST calls with.
pub const API_KEY_HEADER: &str = "X-API-Key";

// ── TransportConfig ──────────────────────────────────────────────────

/// How the daemon's TLS certificate is verified for `https://` URLs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsMode {
    /// Use the bundled web PKI roots.
    #[default]
    System,
    /// Trust the CA certificate in the given PEM file, e.g. the daemon's
    /// own `https-cert.pem`.
    CustomCa(PathBuf),
    /// Accept any certificate (the daemon's default GUI cert is self-signed).
    DangerAcceptInvalid,
}

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    /// Default per-request timeout. Long-poll requests override it.
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::System,
            timeout: Duration::from_secs(30),
            user_agent: concat!("syncthing-api/", env!("CARGO_PKG_VERSION")).to_owned(),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        self.build_client_with_headers(HeaderMap::new())
    }

    /// Build a `reqwest::Client` with additional default headers.
    ///
    /// Used by [`SyncthingClient`](crate::SyncthingClient) to inject the
    /// `X-API-Key` header.
    pub fn build_client_with_headers(&self, headers: HeaderMap) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.as_str())
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::none());

        match &self.tls {
            TlsMode::System => {}
            TlsMode::CustomCa(path) => {
                let cert_pem = std::fs::read(path)
                    .map_err(|e| Error::Tls(format!("failed to read CA cert: {e}")))?;
                let cert = reqwest::Certificate::from_pem(&cert_pem)
                    .map_err(|e| Error::Tls(format!("invalid CA cert: {e}")))?;
                builder = builder.add_root_certificate(cert);
            }
            TlsMode::DangerAcceptInvalid => {
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }
}

// ── Request ──────────────────────────────────────────────────────────

/// Encoded request payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    /// UTF-8 JSON text, sent as `application/json`.
    Json(Vec<u8>),
    /// Raw text, sent as `text/plain`.
    Text(String),
}

impl RequestBody {
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, Error> {
        serde_json::to_vec(value)
            .map(Self::Json)
            .map_err(|e| Error::Deserialization {
                message: format!("failed to encode request body: {e}"),
                body: String::new(),
            })
    }
}

/// A single REST call, relative to the client's `/rest/` base.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Query,
    pub body: Option<RequestBody>,
    pub timeout: Option<Duration>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Query::new(),
            body: None,
            timeout: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn query(mut self, query: Query) -> Self {
        self.query = query;
        self
    }

    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }

    /// Override the client-wide timeout for this request only.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

// ── Response ─────────────────────────────────────────────────────────

/// Response payload: decoded JSON when the daemon declared it, raw text otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(serde_json::Value),
    Text(String),
}

impl ResponseBody {
    /// Short single-line rendering for error messages and logs.
    pub fn preview(&self) -> String {
        let full = match self {
            Self::Json(value) => value.to_string(),
            Self::Text(text) => text.trim().to_owned(),
        };
        if full.chars().count() > 200 {
            let cut: String = full.chars().take(200).collect();
            format!("{cut}…")
        } else {
            full
        }
    }
}

/// Per-request response envelope.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: ResponseBody,
}

impl Response {
    pub fn is_ok(&self) -> bool {
        self.status.as_u16() < 300
    }

    /// Decode the body into `T`.
    ///
    /// Text bodies are parsed as JSON too, for endpoints that forget to
    /// declare their content type.
    pub fn json<T: DeserializeOwned>(self) -> Result<T, Error> {
        match self.body {
            ResponseBody::Json(value) => {
                T::deserialize(&value).map_err(|e| Error::Deserialization {
                    message: e.to_string(),
                    body: value.to_string(),
                })
            }
            ResponseBody::Text(text) => {
                serde_json::from_str(&text).map_err(|e| Error::Deserialization {
                    message: e.to_string(),
                    body: text,
                })
            }
        }
    }
}

// ── Transport ────────────────────────────────────────────────────────

/// Issues single HTTP exchanges against a base URL.
///
/// Cheap to clone: the inner `reqwest::Client` is reference-counted.
#[derive(Debug, Clone)]
pub struct Transport {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl Transport {
    /// `base_url` must end with a `/` so relative paths join beneath it.
    pub fn new(http: reqwest::Client, base_url: Url, timeout: Duration) -> Self {
        Self {
            http,
            base_url,
            timeout,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Join a path such as `/system/ping` onto the base URL.
    pub fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    /// Perform one HTTP exchange.
    ///
    /// Resolves for status codes below 300; anything else is returned as
    /// [`Error::Api`] with the full envelope.
    pub async fn request(&self, req: ApiRequest) -> Result<Response, Error> {
        let mut url = self.url(&req.path)?;
        if !req.query.is_empty() {
            url.set_query(Some(&req.query.to_string()));
        }
        debug!(method = %req.method, %url, "sending request");

        let effective_timeout = req.timeout.unwrap_or(self.timeout);
        let mut builder = self.http.request(req.method, url);
        if let Some(timeout) = req.timeout {
            builder = builder.timeout(timeout);
        }
        builder = match req.body {
            Some(RequestBody::Json(bytes)) => builder
                .header(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE))
                .body(bytes),
            Some(RequestBody::Text(text)) => builder
                .header(CONTENT_TYPE, HeaderValue::from_static(TEXT_CONTENT_TYPE))
                .body(text),
            None => builder,
        };

        let resp = builder
            .send()
            .await
            .map_err(|e| classify(e, effective_timeout))?;

        let status = resp.status();
        let headers = resp.headers().clone();
        let declared_json = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains(JSON_CONTENT_TYPE));
        let text = resp
            .text()
            .await
            .map_err(|e| classify(e, effective_timeout))?;

        let success = status.as_u16() < 300;
        let body = decode_body(text, declared_json, success)?;
        debug!(status = status.as_u16(), "received response");

        let response = Response {
            status,
            headers,
            body,
        };
        if success {
            Ok(response)
        } else {
            Err(Error::Api {
                status: response.status,
                headers: response.headers,
                body: response.body,
            })
        }
    }
}

fn decode_body(text: String, declared_json: bool, success: bool) -> Result<ResponseBody, Error> {
    if !declared_json || text.trim().is_empty() {
        return Ok(ResponseBody::Text(text));
    }
    match serde_json::from_str(&text) {
        Ok(value) => Ok(ResponseBody::Json(value)),
        // A failed call keeps its raw body rather than hiding the status.
        Err(_) if !success => Ok(ResponseBody::Text(text)),
        Err(e) => Err(Error::Deserialization {
            message: e.to_string(),
            body: text,
        }),
    }
}

fn classify(err: reqwest::Error, timeout: Duration) -> Error {
    if err.is_timeout() {
        Error::Timeout {
            timeout_secs: timeout.as_secs(),
        }
    } else {
        Error::Transport(err)
    }
}
