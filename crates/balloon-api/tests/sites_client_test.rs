#![allow(clippy::unwrap_used)]
// Integration tests for `BalloonClient` using wiremock.

use std::collections::BTreeMap;
use std::io::Write;

use serde_json::json;
use wiremock::matchers::{body_json, header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use balloon_api::{BalloonClient, Error, ListOptions, SiteParams};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, BalloonClient) {
    let server = MockServer::start().await;
    let client = BalloonClient::from_reqwest(&server.uri(), reqwest::Client::new()).unwrap();
    (server, client)
}

fn params() -> SiteParams {
    SiteParams {
        name: "blog".into(),
        custom_domain: "www.example.com".into(),
        password: String::new(),
        notification_email: "ops@example.com".into(),
    }
}

// ── Sites ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_sites_with_paging() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/sites"))
        .and(query_param("page", "2"))
        .and(query_param("per_page", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "s1", "name": "blog", "state": "current" },
            { "id": "s2", "name": "docs", "state": "processing" }
        ])))
        .mount(&server)
        .await;

    let sites = client
        .list_sites(ListOptions {
            page: Some(2),
            per_page: Some(10),
        })
        .await
        .unwrap();

    assert_eq!(sites.len(), 2);
    assert!(sites[0].is_ready());
    assert_eq!(sites[1].name, "docs");
}

#[tokio::test]
async fn test_get_site() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/sites/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "abc",
            "user_id": "u1",
            "name": "blog",
            "state": "current",
            "premium": true,
            "url": "http://blog.bitballoon.com"
        })))
        .mount(&server)
        .await;

    let site = client.get_site("abc").await.unwrap();
    assert_eq!(site.user_id, "u1");
    assert!(site.premium);
    assert_eq!(site.url, "http://blog.bitballoon.com");
}

#[tokio::test]
async fn test_get_site_without_id_never_hits_network() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let result = client.get_site("").await;
    assert!(matches!(result, Err(Error::MissingSiteId)));
}

#[tokio::test]
async fn test_create_site_posts_metadata() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/sites"))
        .and(body_json(json!({
            "name": "blog",
            "custom_domain": "www.example.com",
            "password": "",
            "notification_email": "ops@example.com"
        })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({ "id": "new", "name": "blog" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let site = client.create_site(&params()).await.unwrap();
    assert_eq!(site.id, "new");
}

#[tokio::test]
async fn test_delete_site() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/sites/abc"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client.delete_site("abc").await.unwrap();
}

// ── Deploy requests ─────────────────────────────────────────────────

#[tokio::test]
async fn test_submit_manifest_returns_required() {
    let (server, client) = setup().await;

    let files = BTreeMap::from([
        ("index.html".to_string(), "aaa".to_string()),
        ("css/site.css".to_string(), "bbb".to_string()),
    ]);

    Mock::given(method("PUT"))
        .and(path("/sites/abc"))
        .and(body_json(json!({
            "name": "blog",
            "custom_domain": "www.example.com",
            "password": "",
            "notification_email": "ops@example.com",
            "files": { "index.html": "aaa", "css/site.css": "bbb" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "abc",
            "deploy_id": "d1",
            "required": ["bbb"]
        })))
        .mount(&server)
        .await;

    let info = client.submit_manifest("abc", &params(), &files).await.unwrap();
    assert_eq!(info.deploy_id, "d1");
    assert_eq!(info.required, vec!["bbb".to_string()]);
}

#[tokio::test]
async fn test_upload_file_streams_octets() {
    let (server, client) = setup().await;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"body { color: red }").unwrap();

    Mock::given(method("PUT"))
        .and(path("/sites/abc/files/css/site.css"))
        .and(header("content-type", "application/octet-stream"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client
        .upload_file("abc", "css/site.css", file.path())
        .await
        .unwrap();

    let received = server.received_requests().await.unwrap();
    assert_eq!(received[0].body, b"body { color: red }");
}

#[tokio::test]
async fn test_upload_missing_file_is_io_error() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let result = client
        .upload_file("abc", "gone.txt", std::path::Path::new("/nonexistent/gone.txt"))
        .await;
    assert!(matches!(result, Err(Error::Io { .. })), "got: {result:?}");
}

#[tokio::test]
async fn test_deploy_archive_multipart() {
    let (server, client) = setup().await;

    let dir = tempfile::tempdir().unwrap();
    let archive = dir.path().join("site.zip");
    std::fs::write(&archive, b"PK\x03\x04fake").unwrap();

    Mock::given(method("PUT"))
        .and(path("/sites/abc"))
        .and(header_exists("content-type"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "abc",
            "deploy_id": "d9"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let info = client
        .deploy_archive("abc", &params(), &archive)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(info.deploy_id, "d9");

    let received = server.received_requests().await.unwrap();
    let content_type = received[0]
        .headers
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .to_owned();
    let boundary = content_type
        .strip_prefix("multipart/form-data; boundary=")
        .unwrap();
    let body = String::from_utf8_lossy(&received[0].body);

    assert!(body.contains(&format!("--{boundary}")));
    assert!(body.contains("name=\"zip\"; filename=\"site.zip\""));
    assert!(body.contains("PK\u{3}\u{4}fake"));
    assert!(body.contains("name=\"custom_domain\"\r\n\r\nwww.example.com"));
    // Empty values are still sent as their own part.
    assert!(body.contains("name=\"password\"\r\n\r\n\r\n"));
    // The archive part comes before the metadata fields.
    assert!(body.find("name=\"zip\"").unwrap() < body.find("name=\"name\"").unwrap());
}

#[tokio::test]
async fn test_deploy_archive_empty_response() {
    let (server, client) = setup().await;

    let dir = tempfile::tempdir().unwrap();
    let archive = dir.path().join("site.zip");
    std::fs::write(&archive, b"zip").unwrap();

    Mock::given(method("PUT"))
        .and(path("/sites/abc"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let info = client.deploy_archive("abc", &params(), &archive).await.unwrap();
    assert!(info.is_none());
}

#[tokio::test]
async fn test_deploy_missing_archive_never_hits_network() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let result = client
        .deploy_archive("abc", &params(), std::path::Path::new("/nonexistent/site.zip"))
        .await;
    assert!(matches!(result, Err(Error::Io { .. })), "got: {result:?}");
}

// ── Error handling ──────────────────────────────────────────────────

#[tokio::test]
async fn test_unauthorized() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/sites"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = client.list_sites(ListOptions::default()).await;
    assert!(matches!(result, Err(Error::Unauthorized)), "got: {result:?}");
}

#[tokio::test]
async fn test_api_error_message_is_surfaced() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/sites/missing"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "message": "Site not found" })),
        )
        .mount(&server)
        .await;

    let err = client.get_site("missing").await.unwrap_err();
    assert!(err.is_not_found());
    match err {
        Error::Api { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "Site not found");
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_body_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/sites/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let result = client.get_site("abc").await;
    assert!(
        matches!(result, Err(Error::Deserialization { ref body, .. }) if body.contains("oops")),
        "got: {result:?}"
    );
}

#[tokio::test]
async fn test_malformed_multibyte_body_is_an_error_not_a_panic() {
    let (server, client) = setup().await;

    // The euro sign straddles the preview cut-off.
    let body = format!("{}\u{20ac} trailing", "x".repeat(199));
    Mock::given(method("GET"))
        .and(path("/sites/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body.clone()))
        .mount(&server)
        .await;

    match client.get_site("abc").await {
        Err(Error::Deserialization { body: raw, message }) => {
            assert_eq!(raw, body);
            assert!(message.contains("body preview"), "message: {message}");
        }
        other => panic!("expected Deserialization error, got: {other:?}"),
    }
}
