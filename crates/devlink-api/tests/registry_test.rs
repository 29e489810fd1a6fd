// Integration tests for `Registry` using wiremock.
#![allow(clippy::unwrap_used)]

use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use devlink_api::{DataClient, Error, Registry};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, Registry) {
    let server = MockServer::start().await;
    let client = DataClient::from_reqwest(
        &server.uri(),
        "db",
        SecretString::from("test-key"),
        reqwest::Client::new(),
    )
    .unwrap();
    (server, Registry::new(client, "device"))
}

fn payload(mac: &str) -> serde_json::Map<String, serde_json::Value> {
    let serde_json::Value::Object(map) = json!({ "mac": mac, "name": "thermostat" }) else {
        unreachable!()
    };
    map
}

// ── Registration ────────────────────────────────────────────────────

#[tokio::test]
async fn test_register_unknown_mac_creates() {
    let (server, registry) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/db/_table/device"))
        .and(query_param("filter", "mac = 'aa:bb:cc:dd:ee:ff'"))
        .and(query_param("api_key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "resource": [] })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v2/db/_table/device"))
        .and(body_json(json!({
            "resource": [{ "mac": "aa:bb:cc:dd:ee:ff", "name": "thermostat" }]
        })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({ "resource": [{ "_id": "d1" }] })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let created = registry.register(payload("aa:bb:cc:dd:ee:ff")).await.unwrap();
    assert_eq!(created["_id"], "d1");
}

#[tokio::test]
async fn test_register_known_mac_patches_not_creates() {
    let (server, registry) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/db/_table/device"))
        .and(query_param("filter", "mac = 'aa:bb:cc:dd:ee:ff'"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "resource": [{ "_id": "d9" }] })),
        )
        .mount(&server)
        .await;

    // Second registration of the same MAC must never POST a new record.
    Mock::given(method("POST"))
        .and(path("/api/v2/db/_table/device"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/api/v2/db/_table/device/d9"))
        .and(body_json(json!({ "mac": "aa:bb:cc:dd:ee:ff", "name": "thermostat" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "_id": "d9", "mac": "aa:bb:cc:dd:ee:ff" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let patched = registry.register(payload("aa:bb:cc:dd:ee:ff")).await.unwrap();
    assert_eq!(patched["_id"], "d9");
}

#[tokio::test]
async fn test_register_without_mac_is_bad_request() {
    let (_server, registry) = setup().await;

    let serde_json::Value::Object(map) = json!({ "name": "no mac here" }) else {
        unreachable!()
    };

    let result = registry.register(map).await;
    assert!(
        matches!(result, Err(Error::BadRequest { .. })),
        "expected BadRequest, got: {result:?}"
    );
}

// ── Existence lookup ────────────────────────────────────────────────

#[tokio::test]
async fn test_device_exists_returns_id() {
    let (server, registry) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/db/_table/device"))
        .and(query_param("filter", "mac = '11:22:33:44:55:66'"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "resource": [{ "_id": "d7", "mac": "11:22:33:44:55:66" }]
        })))
        .mount(&server)
        .await;

    let id = registry.device_exists("11:22:33:44:55:66").await.unwrap();
    assert_eq!(id.as_deref(), Some("d7"));
}

#[tokio::test]
async fn test_device_exists_none_for_unknown_mac() {
    let (server, registry) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/db/_table/device"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "resource": [] })))
        .mount(&server)
        .await;

    let id = registry.device_exists("00:00:00:00:00:00").await.unwrap();
    assert!(id.is_none());
}

// ── Error mapping ───────────────────────────────────────────────────

#[tokio::test]
async fn test_unauthorized_maps_to_invalid_api_key() {
    let (server, registry) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = registry.device_exists("aa:bb:cc:dd:ee:ff").await;
    assert!(
        matches!(result, Err(Error::InvalidApiKey)),
        "expected InvalidApiKey, got: {result:?}"
    );
}

#[tokio::test]
async fn test_service_error_envelope_is_parsed() {
    let (server, registry) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": { "code": 500, "message": "table 'device' is unavailable" }
        })))
        .mount(&server)
        .await;

    let result = registry.device_exists("aa:bb:cc:dd:ee:ff").await;
    match result {
        Err(Error::Api { status, ref message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "table 'device' is unavailable");
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}
