//! Transport tests against a mock server: auth injection, error
//! normalization, and list-valued query serialization.

use std::time::Duration;

use sheetlink_auth::Credential;
use sheetlink_http::{ApiClient, HttpError};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer, credential: Credential) -> ApiClient {
    ApiClient::new(server.uri(), credential, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_api_key_attaches_query_param() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/doc1"))
        .and(query_param("key", "k123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server, Credential::api_key("k123"));
    let body: serde_json::Value = client.get_json("/doc1", &[]).await.unwrap();
    assert_eq!(body["ok"], true);
}

#[tokio::test]
async fn test_bearer_token_attaches_authorization_header() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/doc1"))
        .and(header("Authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server, Credential::access_token("tok-1"));
    let _: serde_json::Value = client.get_json("/doc1", &[]).await.unwrap();
}

#[tokio::test]
async fn test_repeated_query_keys() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/doc1"))
        .and(query_param("ranges", "Sheet1!A1:B2"))
        .and(query_param("ranges", "Sheet1!C1:D2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server, Credential::access_token("t"));
    let query = [
        ("ranges", "Sheet1!A1:B2".to_string()),
        ("ranges", "Sheet1!C1:D2".to_string()),
    ];
    let _: serde_json::Value = client.get_json("/doc1", &query).await.unwrap();
}

#[tokio::test]
async fn test_structured_error_is_normalized() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/doc1:batchUpdate"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": { "code": 400, "message": "Invalid requests[0].deleteSheet", "status": "INVALID_ARGUMENT" }
        })))
        .mount(&server)
        .await;

    let client = client(&server, Credential::access_token("t"));
    let err = client
        .post_json::<_, serde_json::Value>("/doc1:batchUpdate", &[], &serde_json::json!({}))
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Service error - [400] Invalid requests[0].deleteSheet"
    );
}

#[tokio::test]
async fn test_forbidden_under_api_key_is_private_document() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/doc1"))
        .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
            "error": { "code": 403, "message": "The caller does not have permission", "status": "PERMISSION_DENIED" }
        })))
        .mount(&server)
        .await;

    let client = client(&server, Credential::api_key("k"));
    let err = client
        .get_json::<serde_json::Value>("/doc1", &[])
        .await
        .unwrap_err();

    assert!(matches!(err, HttpError::PrivateDocument));
}

#[tokio::test]
async fn test_forbidden_under_bearer_stays_service_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/doc1"))
        .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
            "error": { "code": 403, "message": "The caller does not have permission", "status": "PERMISSION_DENIED" }
        })))
        .mount(&server)
        .await;

    let client = client(&server, Credential::access_token("t"));
    let err = client
        .get_json::<serde_json::Value>("/doc1", &[])
        .await
        .unwrap_err();

    assert!(matches!(err, HttpError::Service { code: 403, .. }));
}

#[tokio::test]
async fn test_unstructured_error_passes_through() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/doc1"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let client = client(&server, Credential::access_token("t"));
    let err = client
        .get_json::<serde_json::Value>("/doc1", &[])
        .await
        .unwrap_err();

    match err {
        HttpError::Status { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "upstream exploded");
        }
        other => panic!("expected Status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_get_bytes_downloads_binary_payload() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/export"))
        .and(query_param("format", "csv"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"a,b\n1,2\n".to_vec()))
        .mount(&server)
        .await;

    let client = client(&server, Credential::access_token("t"));
    let url = format!("{}/export", server.uri());
    let bytes = client
        .get_bytes(&url, &[("format", "csv".to_string())])
        .await
        .unwrap();

    assert_eq!(bytes, b"a,b\n1,2\n");
}
