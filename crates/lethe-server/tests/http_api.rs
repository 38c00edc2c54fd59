//! Handler-level tests of the custodian HTTP surface.
//!
//! The router runs in-process over the in-memory repository; requests go
//! through the full axum stack, so status codes, error bodies, and JSON
//! shapes are exactly what a remote client would see.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use lethe_core::{Clock, Encryptor, KeyStore, ManualClock, MemoryRepository, PlainProtection};
use lethe_proto::NewKeyResponse;
use lethe_server::router;
use serde_json::{Value, json};
use tower::ServiceExt;

fn test_app() -> (Router, ManualClock) {
    let clock = ManualClock::new(Utc::now());
    let store = KeyStore::new(
        MemoryRepository::new(),
        PlainProtection,
        clock.clone(),
        Duration::hours(24),
    );
    (router(Encryptor::new(store), clock.clone()), clock)
}

async fn post_json(app: &Router, uri: &str, body: String) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap();
    (status, value)
}

#[tokio::test]
async fn new_key_returns_verifiable_ciphertext() {
    let (app, clock) = test_app();
    let expiration = clock.now() + Duration::hours(1);

    let (status, body) = post_json(
        &app,
        "/new-key",
        json!({ "content": "the pre-hash", "expiration": expiration }).to_string(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let response: NewKeyResponse = serde_json::from_value(body).unwrap();
    assert_eq!(response.metadata.expiration, expiration);
    assert!(uuid::Uuid::parse_str(&response.metadata.key_id).is_ok());

    // The returned private half decrypts the custodian's ciphertext: the
    // same check a client runs for honesty.
    let private =
        lethe_crypto::deserialize_private_key(&response.metadata.verification_key).unwrap();
    let recovered = lethe_crypto::decrypt(&response.encrypted_content, &private).unwrap();
    assert_eq!(recovered, b"the pre-hash");
}

#[tokio::test]
async fn reencryption_is_deterministic_over_http() {
    let (app, clock) = test_app();
    let expiration = clock.now() + Duration::hours(1);

    let (status, body) = post_json(
        &app,
        "/new-key",
        json!({ "content": "stable hash", "expiration": expiration }).to_string(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let created: NewKeyResponse = serde_json::from_value(body).unwrap();

    let encrypt_body =
        json!({ "content": "stable hash", "key_id": created.metadata.key_id }).to_string();

    let (status, first) = post_json(&app, "/encrypt", encrypt_body.clone()).await;
    assert_eq!(status, StatusCode::OK);
    let (_, second) = post_json(&app, "/encrypt", encrypt_body).await;

    assert_eq!(first["encrypted_content"], second["encrypted_content"]);
    assert_eq!(first["encrypted_content"], Value::from(created.encrypted_content));
}

#[tokio::test]
async fn past_expiration_is_a_bad_request() {
    let (app, clock) = test_app();
    let expiration = clock.now() - Duration::hours(1);

    let (status, body) = post_json(
        &app,
        "/new-key",
        json!({ "content": "hash", "expiration": expiration }).to_string(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "bad-request");
    assert!(body["data"]["error"].as_str().unwrap().contains("future"));
}

#[tokio::test]
async fn expiration_beyond_horizon_is_a_bad_request() {
    let (app, clock) = test_app();
    let expiration = clock.now() + Duration::days(31);

    let (status, body) = post_json(
        &app,
        "/new-key",
        json!({ "content": "hash", "expiration": expiration }).to_string(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "bad-request");
}

#[tokio::test]
async fn unknown_key_is_not_found_with_context() {
    let (app, _) = test_app();
    let key_id = uuid::Uuid::new_v4().to_string();

    let (status, body) = post_json(
        &app,
        "/encrypt",
        json!({ "content": "hash", "key_id": key_id.as_str() }).to_string(),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error_code"], "key-not-found");
    assert_eq!(body["data"]["key_id"], Value::from(key_id));
}

#[tokio::test]
async fn expired_key_reports_original_expiration() {
    let (app, clock) = test_app();
    let expiration = clock.now() + Duration::minutes(10);

    let (_, body) = post_json(
        &app,
        "/new-key",
        json!({ "content": "hash", "expiration": expiration }).to_string(),
    )
    .await;
    let created: NewKeyResponse = serde_json::from_value(body).unwrap();

    clock.advance(Duration::minutes(30));

    let (status, body) = post_json(
        &app,
        "/encrypt",
        json!({ "content": "hash", "key_id": created.metadata.key_id.as_str() }).to_string(),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error_code"], "key-expired");
    assert_eq!(body["data"]["expiration"], Value::from(expiration.to_rfc3339()));
    assert_eq!(body["data"]["key_id"], Value::from(created.metadata.key_id));
}

#[tokio::test]
async fn malformed_json_is_a_bad_request_in_the_wire_format() {
    let (app, _) = test_app();

    let (status, body) = post_json(&app, "/new-key", "not json at all".to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "bad-request");
}

#[tokio::test]
async fn non_uuid_key_id_is_a_bad_request() {
    let (app, _) = test_app();

    let (status, body) = post_json(
        &app,
        "/encrypt",
        json!({ "content": "hash", "key_id": "definitely-not-a-uuid" }).to_string(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "bad-request");
}

#[tokio::test]
async fn empty_content_is_a_bad_request() {
    let (app, clock) = test_app();
    let expiration = clock.now() + Duration::hours(1);

    let (status, body) = post_json(
        &app,
        "/new-key",
        json!({ "content": "", "expiration": expiration }).to_string(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "bad-request");
}
