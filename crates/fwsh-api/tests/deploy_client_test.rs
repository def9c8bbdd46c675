#![allow(clippy::unwrap_used)]
// Integration tests for `DeployClient` using wiremock.

use serde_json::json;
use url::Url;
use wiremock::matchers::{header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fwsh_api::{Credentials, DeployClient, Error};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, DeployClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let credentials = Credentials::new("openmswfShell", "secret".to_string().into());
    let client = DeployClient::with_client(reqwest::Client::new(), base_url, credentials);
    (server, client)
}

// ── Stage tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_reload_success() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/reload"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "ok" })))
        .expect(1)
        .mount(&server)
        .await;

    client.reload().await.unwrap();
}

#[tokio::test]
async fn test_apply_error_uses_json_message() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/apply"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "error": "device unreachable" })),
        )
        .mount(&server)
        .await;

    let result = client.apply().await;

    match result {
        Err(Error::Remote { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "device unreachable");
        }
        other => panic!("expected Remote error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_apply_error_plain_body() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/apply"))
        .respond_with(ResponseTemplate::new(502).set_body_string("upstream gone\n"))
        .mount(&server)
        .await;

    let err = client.apply().await.unwrap_err();
    assert!(err.is_transient());
    assert_eq!(err.status(), Some(502));
    assert_eq!(err.to_string(), "upstream gone (HTTP 502)");
}

#[tokio::test]
async fn test_unauthorized_maps_to_authentication() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/reload"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = client.reload().await;

    assert!(
        matches!(result, Err(Error::Authentication { .. })),
        "expected Authentication error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_save_requires_capability() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/save"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    assert!(!client.supports_save());
    assert!(client.save().await.is_err());
}

#[tokio::test]
async fn test_save_when_supported() {
    let (server, client) = setup().await;
    let client = client.with_save(true);

    Mock::given(method("POST"))
        .and(path("/save"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client.save().await.unwrap();
}

#[tokio::test]
async fn test_base_url_path_prefix_is_kept() {
    let server = MockServer::start().await;
    let base_url = Url::parse(&format!("{}/api/v1/", server.uri())).unwrap();
    let client = DeployClient::with_client(
        reqwest::Client::new(),
        base_url,
        Credentials::new("admin", "pw".to_string().into()),
    );

    Mock::given(method("POST"))
        .and(path("/api/v1/reload"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client.reload().await.unwrap();
}
