#![allow(clippy::unwrap_used)]
// End-to-end deploy flows through `SiteService` against a wiremock server.

use std::fs;
use std::path::Path;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_partial_json, body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use balloon_api::{BalloonClient, TransportConfig};
use balloon_core::fingerprint::digest_bytes;
use balloon_core::{
    CoreError, DeployEvent, DeployOptions, DeploySource, Site, SiteService, fingerprint_dir,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup(upload_concurrency: usize) -> (MockServer, SiteService) {
    let server = MockServer::start().await;
    let client = BalloonClient::new(&server.uri(), &TransportConfig::default()).unwrap();
    let service = SiteService::from_client(
        client,
        DeployOptions {
            upload_concurrency,
            poll_interval: Duration::from_millis(10),
            ..DeployOptions::default()
        },
    );
    (server, service)
}

fn site() -> Site {
    Site {
        id: "s1".into(),
        name: "blog".into(),
        notification_email: "ops@example.com".into(),
        state: "current".into(),
        ..Site::default()
    }
}

fn tree(files: &[(&str, &str)]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (rel, contents) in files {
        let target = dir.path().join(rel);
        fs::create_dir_all(target.parent().unwrap()).unwrap();
        fs::write(target, contents).unwrap();
    }
    dir
}

async fn expect_upload(server: &MockServer, rel: &str, status: u16, times: u64) {
    Mock::given(method("PUT"))
        .and(path(format!("/sites/s1/files/{rel}")))
        .and(header("content-type", "application/octet-stream"))
        .respond_with(ResponseTemplate::new(status).set_body_json(json!({ "message": "nope" })))
        .expect(times)
        .mount(server)
        .await;
}

async fn manifest_reply(server: &MockServer, required: &[String]) {
    Mock::given(method("PUT"))
        .and(path("/sites/s1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "s1",
            "deploy_id": "d1",
            "required": required,
        })))
        .expect(1)
        .mount(server)
        .await;
}

// ── Directory deploys ───────────────────────────────────────────────

#[tokio::test]
async fn test_uploads_only_required_digests() {
    let (server, service) = setup(4).await;
    let dir = tree(&[
        ("index.html", "<html>"),
        ("css/main.css", "body {}"),
        (".git/config", "[core]"),
        ("logo.png", "png"),
    ]);

    Mock::given(method("PUT"))
        .and(path("/sites/s1"))
        .and(body_partial_json(json!({
            "name": "blog",
            "notification_email": "ops@example.com",
            "files": {
                "index.html": digest_bytes(b"<html>"),
                "css/main.css": digest_bytes(b"body {}"),
                "logo.png": digest_bytes(b"png"),
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "s1",
            "deploy_id": "d1",
            "required": [digest_bytes(b"body {}")],
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/sites/s1/files/css/main.css"))
        .and(body_string("body {}"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    expect_upload(&server, "index.html", 200, 0).await;
    expect_upload(&server, "logo.png", 200, 0).await;

    let deployment = service
        .deploy(&site(), &DeploySource::Directory(dir.path().to_path_buf()))
        .await
        .unwrap();

    assert_eq!(deployment.info.deploy_id, "d1");
    assert_eq!(deployment.files, 3);
    assert_eq!(deployment.uploaded, 1);
}

#[tokio::test]
async fn test_unchanged_tree_uploads_nothing() {
    let (server, service) = setup(4).await;
    let dir = tree(&[("index.html", "<html>"), ("about.html", "about")]);

    // Second deploy of the same tree: the server already has every digest.
    manifest_reply(&server, &[]).await;
    expect_upload(&server, "index.html", 200, 0).await;
    expect_upload(&server, "about.html", 200, 0).await;

    let first = fingerprint_dir(dir.path()).unwrap();
    let deployment = service
        .deploy(&site(), &DeploySource::Directory(dir.path().to_path_buf()))
        .await
        .unwrap();
    let second = fingerprint_dir(dir.path()).unwrap();

    assert_eq!(first, second);
    assert_eq!(deployment.files, 2);
    assert_eq!(deployment.uploaded, 0);
}

#[tokio::test]
async fn test_first_upload_failure_stops_the_rest() {
    let (server, service) = setup(1).await;
    let dir = tree(&[("a.txt", "one"), ("b.txt", "two"), ("c.txt", "three")]);

    manifest_reply(
        &server,
        &[digest_bytes(b"one"), digest_bytes(b"two"), digest_bytes(b"three")],
    )
    .await;
    expect_upload(&server, "a.txt", 200, 1).await;
    expect_upload(&server, "b.txt", 500, 1).await;
    expect_upload(&server, "c.txt", 200, 0).await;

    let result = service
        .deploy(&site(), &DeploySource::Directory(dir.path().to_path_buf()))
        .await;

    match result {
        Err(CoreError::Api { status, message }) => {
            assert_eq!(status, Some(500));
            assert_eq!(message, "nope");
        }
        other => panic!("expected upload error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_concurrent_uploads_still_fail_fast() {
    let (server, service) = setup(4).await;
    let dir = tree(&[("a.txt", "one"), ("b.txt", "two")]);

    manifest_reply(&server, &[digest_bytes(b"one"), digest_bytes(b"two")]).await;
    // a.txt stalls; the failure on b.txt must not wait for it. Whether the
    // stalled request reached the server before being dropped is a race.
    Mock::given(method("PUT"))
        .and(path("/sites/s1/files/a.txt"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(10)))
        .expect(0..=1)
        .mount(&server)
        .await;
    expect_upload(&server, "b.txt", 502, 1).await;

    let started = std::time::Instant::now();
    let result = service
        .deploy(&site(), &DeploySource::Directory(dir.path().to_path_buf()))
        .await;

    assert!(
        matches!(result, Err(CoreError::Api { status: Some(502), .. })),
        "got {result:?}"
    );
    assert!(
        started.elapsed() < Duration::from_secs(5),
        "in-flight upload was awaited instead of cancelled"
    );
}

#[tokio::test]
async fn test_manifest_rejection_uploads_nothing() {
    let (server, service) = setup(4).await;
    let dir = tree(&[("index.html", "<html>")]);

    Mock::given(method("PUT"))
        .and(path("/sites/s1"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({ "message": "bad manifest" })),
        )
        .mount(&server)
        .await;
    expect_upload(&server, "index.html", 200, 0).await;

    let result = service
        .deploy(&site(), &DeploySource::Directory(dir.path().to_path_buf()))
        .await;

    assert!(
        matches!(result, Err(CoreError::Api { status: Some(422), ref message }) if message == "bad manifest"),
        "got {result:?}"
    );
}

#[tokio::test]
async fn test_missing_directory_fails_before_network() {
    let (server, service) = setup(4).await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let result = service
        .deploy(&site(), &DeploySource::Directory(dir.path().join("public")))
        .await;

    assert!(matches!(result, Err(CoreError::Io { .. })), "got {result:?}");
}

#[tokio::test]
async fn test_deploy_without_site_id_is_rejected() {
    let (server, service) = setup(4).await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tree(&[("index.html", "<html>")]);
    let result = service
        .deploy(
            &Site::default(),
            &DeploySource::Directory(dir.path().to_path_buf()),
        )
        .await;

    assert!(matches!(result, Err(CoreError::MissingSiteId)));
}

#[tokio::test]
async fn test_progress_events_follow_the_deploy() {
    let (server, service) = setup(1).await;
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let service = service.with_progress(tx);
    let dir = tree(&[("a.txt", "one"), ("b.txt", "two")]);

    manifest_reply(&server, &[digest_bytes(b"two")]).await;
    expect_upload(&server, "b.txt", 200, 1).await;

    service
        .deploy(&site(), &DeploySource::Directory(dir.path().to_path_buf()))
        .await
        .unwrap();
    drop(service);

    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    assert_eq!(
        events,
        vec![
            DeployEvent::Fingerprinted { files: 2 },
            DeployEvent::DiffComplete {
                files: 2,
                uploads: 1
            },
            DeployEvent::Uploading {
                path: "b.txt".into()
            },
            DeployEvent::Uploaded {
                path: "b.txt".into()
            },
        ]
    );
}

// ── Archive deploys ─────────────────────────────────────────────────

fn archive(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("site.zip");
    fs::write(&path, b"PK\x03\x04not really a zip").unwrap();
    path
}

#[tokio::test]
async fn test_archive_deploy_returns_descriptor() {
    let (server, service) = setup(4).await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("PUT"))
        .and(path("/sites/s1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "s1",
            "deploy_id": "d9",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let deployment = service
        .deploy(&site(), &DeploySource::Archive(archive(dir.path())))
        .await
        .unwrap();

    assert_eq!(deployment.info.deploy_id, "d9");
    assert!(deployment.info.required.is_empty());
    assert_eq!(deployment.uploaded, 0);
}

#[tokio::test]
async fn test_archive_deploy_without_body_keeps_site_id() {
    let (server, service) = setup(4).await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("PUT"))
        .and(path("/sites/s1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let deployment = service
        .deploy(&site(), &DeploySource::Archive(archive(dir.path())))
        .await
        .unwrap();

    assert_eq!(deployment.info.id, "s1");
    assert_eq!(deployment.info.deploy_id, "");
}

// ── Readiness ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_wait_polls_until_current() {
    let (server, service) = setup(4).await;

    Mock::given(method("GET"))
        .and(path("/sites/s1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "id": "s1", "state": "processing" })),
        )
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sites/s1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "id": "s1", "state": "current" })),
        )
        .mount(&server)
        .await;

    let pending = Site {
        state: "processing".into(),
        ..site()
    };
    let ready = service
        .wait_for_ready(&pending, Some(Duration::from_secs(5)), &CancellationToken::new())
        .await
        .unwrap();

    assert!(ready.is_ready());
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_wait_surfaces_fetch_error() {
    let (server, service) = setup(4).await;

    Mock::given(method("GET"))
        .and(path("/sites/s1"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "gone" })))
        .mount(&server)
        .await;

    let pending = Site {
        state: "processing".into(),
        ..site()
    };
    let result = service
        .wait_for_ready(&pending, Some(Duration::from_secs(5)), &CancellationToken::new())
        .await;

    assert!(matches!(result, Err(CoreError::NotFound { .. })), "got {result:?}");
}
