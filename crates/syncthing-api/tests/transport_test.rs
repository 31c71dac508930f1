// Integration tests for `Transport` and client construction using wiremock.
#![allow(clippy::unwrap_used)]

use std::time::Duration;

use reqwest::StatusCode;
use secrecy::SecretString;
use serde_json::json;
use tokio_test::assert_ok;
use wiremock::matchers::{body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use syncthing_api::{
    ApiRequest, Error, Query, RequestBody, ResponseBody, SyncthingClient, TransportConfig,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, SyncthingClient) {
    let server = MockServer::start().await;
    let client = SyncthingClient::from_reqwest(&server.uri(), reqwest::Client::new()).unwrap();
    (server, client)
}

// ── Envelope decoding ───────────────────────────────────────────────

#[tokio::test]
async fn test_json_body_is_decoded() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/system/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ping": "pong" })))
        .mount(&server)
        .await;

    let resp = client
        .transport()
        .request(ApiRequest::get("system/ping"))
        .await
        .unwrap();

    assert!(resp.is_ok());
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body, ResponseBody::Json(json!({ "ping": "pong" })));
}

#[tokio::test]
async fn test_text_body_stays_text() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/system/log.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("line one\nline two\n"))
        .mount(&server)
        .await;

    let resp = client
        .transport()
        .request(ApiRequest::get("/system/log.txt"))
        .await
        .unwrap();

    assert_eq!(resp.body, ResponseBody::Text("line one\nline two\n".into()));
}

#[tokio::test]
async fn test_empty_success_body() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/rest/system/error/clear"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let resp = client
        .transport()
        .request(ApiRequest::post("system/error/clear"))
        .await
        .unwrap();

    assert_eq!(resp.body, ResponseBody::Text(String::new()));
}

#[tokio::test]
async fn test_invalid_json_on_success_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/system/status"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("{\"myID\":", "application/json"))
        .mount(&server)
        .await;

    let err = client.system().status().await.unwrap_err();

    match err {
        Error::Deserialization { body, .. } => assert_eq!(body, "{\"myID\":"),
        other => panic!("expected Deserialization, got: {other:?}"),
    }
}

// ── Protocol failures ───────────────────────────────────────────────

#[tokio::test]
async fn test_server_error_carries_envelope() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/system/config"))
        .respond_with(
            ResponseTemplate::new(500)
                .insert_header("X-Syncthing-Id", "P56IOI7")
                .set_body_json(json!({ "error": "config not loaded" })),
        )
        .mount(&server)
        .await;

    let err = client.system().config().await.unwrap_err();

    assert!(err.is_server_error());
    assert!(err.is_transient());
    assert_eq!(err.message().as_deref(), Some("config not loaded"));
    match err {
        Error::Api {
            status,
            headers,
            body,
        } => {
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(headers.get("x-syncthing-id").unwrap(), "P56IOI7");
            assert_eq!(body, ResponseBody::Json(json!({ "error": "config not loaded" })));
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_not_found_with_text_body() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/rest/system/pause"))
        .respond_with(ResponseTemplate::new(404).set_body_string("unknown device"))
        .mount(&server)
        .await;

    let err = client.system().pause("NOPE").await.unwrap_err();

    assert!(err.is_client_error());
    assert!(!err.is_transient());
    assert_eq!(err.message().as_deref(), Some("unknown device"));
}

#[tokio::test]
async fn test_forbidden_is_unauthorized() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/system/ping"))
        .respond_with(ResponseTemplate::new(403).set_body_string("CSRF Error"))
        .mount(&server)
        .await;

    let err = client.system().ping().await.unwrap_err();
    assert!(err.is_unauthorized());
}

#[tokio::test]
async fn test_redirect_status_is_not_success() {
    let (server, client) = setup().await;

    // 304 is never followed as a redirect, so it reaches the status check.
    Mock::given(method("GET"))
        .and(path("/rest/system/version"))
        .respond_with(ResponseTemplate::new(304))
        .mount(&server)
        .await;

    let err = client.system().version().await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::NOT_MODIFIED));
}

#[tokio::test]
async fn test_location_redirect_is_not_followed() {
    let server = MockServer::start().await;
    let key = SecretString::from("k".to_owned());
    let client =
        SyncthingClient::from_api_key(&server.uri(), &key, &TransportConfig::default()).unwrap();

    Mock::given(method("GET"))
        .and(path("/rest/system/ping"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/elsewhere"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/elsewhere"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ping": "pong" })))
        .expect(0)
        .mount(&server)
        .await;

    let err = client.system().ping().await.unwrap_err();
    let Error::Api { status, headers, .. } = &err else {
        panic!("expected API error, got {err:?}");
    };
    assert_eq!(*status, StatusCode::FOUND);
    assert_eq!(headers.get("location").unwrap(), "/elsewhere");
}

// ── Transport failures ──────────────────────────────────────────────

#[tokio::test]
async fn test_request_timeout() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/system/ping"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "ping": "pong" }))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let err = client
        .transport()
        .request(ApiRequest::get("system/ping").timeout(Duration::from_millis(200)))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Timeout { .. }), "got: {err:?}");
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    // Nothing listens on a server that has been dropped.
    let uri = {
        let server = MockServer::start().await;
        server.uri()
    };
    let client = SyncthingClient::from_reqwest(&uri, reqwest::Client::new()).unwrap();

    let err = client.system().ping().await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)), "got: {err:?}");
}

// ── Request encoding ────────────────────────────────────────────────

#[tokio::test]
async fn test_api_key_header_on_every_request() {
    let server = MockServer::start().await;
    let key = SecretString::from("s3cr3t-key".to_owned());
    let client =
        SyncthingClient::from_api_key(&server.uri(), &key, &TransportConfig::default()).unwrap();

    Mock::given(method("GET"))
        .and(path("/rest/system/ping"))
        .and(header("X-API-Key", "s3cr3t-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ping": "pong" })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/system/restart"))
        .and(header("X-API-Key", "s3cr3t-key"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    assert_ok!(client.system().ping().await);
    assert_ok!(client.system().restart().await);
}

#[tokio::test]
async fn test_json_body_sets_content_type() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/rest/system/config"))
        .and(header("content-type", "application/json"))
        .and(body_string(r#"{"version":37}"#))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let body = RequestBody::json(&json!({ "version": 37 })).unwrap();
    client
        .transport()
        .request(ApiRequest::post("system/config").body(body))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_query_is_installed_verbatim() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/system/browse"))
        .and(query_param("current", "/home/user/My Files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let query = Query::new().param("current", "/home/user/My Files");
    client
        .transport()
        .request(ApiRequest::get("system/browse").query(query))
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(
        requests[0].url.query(),
        Some("current=%2Fhome%2Fuser%2FMy%20Files")
    );
}

#[tokio::test]
async fn test_no_query_string_when_empty() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/system/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ping": "pong" })))
        .mount(&server)
        .await;

    client.system().ping().await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[0].url.query(), None);
}
