//! Test helpers: build the app and router for integration tests.
//!
//! Run from workspace root: `cargo test -p reelgate-api`.

#![allow(dead_code)]

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use reelgate_core::Config;
use serde_json::Value;
use std::time::Duration;
use tempfile::TempDir;
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "test-secret-key-0123456789";

/// API path prefix for tests (e.g. `/api/v0`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", reelgate_api::constants::API_PREFIX, path)
}

/// Test application: server and owned storage directory.
pub struct TestApp {
    pub server: TestServer,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

pub fn test_config(temp_dir: &TempDir) -> Config {
    Config::for_testing(TEST_JWT_SECRET, temp_dir.path().to_string_lossy().to_string())
}

/// Setup test app with isolated local storage.
pub async fn setup_test_app() -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let config = test_config(&temp_dir);
    setup_test_app_with_config(config, temp_dir, false).await
}

/// Variant that keeps a real HTTP transport so WebSocket upgrades work.
pub async fn setup_ws_test_app() -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let config = test_config(&temp_dir);
    setup_test_app_with_config(config, temp_dir, true).await
}

pub async fn setup_test_app_with_config(
    config: Config,
    temp_dir: TempDir,
    http_transport: bool,
) -> TestApp {
    let (_state, router) = reelgate_api::setup::initialize_app(config)
        .await
        .expect("Failed to initialize app");

    let server = if http_transport {
        TestServer::builder()
            .http_transport()
            .build(router)
            .expect("Failed to create test server")
    } else {
        TestServer::new(router).expect("Failed to create test server")
    };

    TestApp {
        server,
        _temp_dir: temp_dir,
    }
}

/// Log in a seeded user and return the bearer token.
pub async fn login(server: &TestServer, username: &str, password: &str) -> String {
    let response = server
        .post(&api_path("/login"))
        .json(&serde_json::json!({
            "username": username,
            "password": password,
        }))
        .await;
    assert_eq!(response.status_code(), 200, "login failed for {}", username);

    let body: Value = response.json();
    body["token"]
        .as_str()
        .expect("login response missing token")
        .to_string()
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

/// Upload a payload through the multipart intake and return the ack id.
pub async fn upload_video(
    server: &TestServer,
    token: &str,
    tenant: &str,
    filename: &str,
    content_type: &str,
    data: Vec<u8>,
) -> Uuid {
    let form = MultipartForm::new().add_part(
        "video",
        Part::bytes(data).file_name(filename).mime_type(content_type),
    );

    let response = server
        .post(&api_path(&format!("/tenants/{}/videos", tenant)))
        .add_header("Authorization", bearer(token))
        .multipart(form)
        .await;
    assert_eq!(response.status_code(), 200, "upload failed: {}", response.text());

    let body: Value = response.json();
    body["id"]
        .as_str()
        .and_then(|s| Uuid::parse_str(s).ok())
        .expect("upload ack missing id")
}

/// Poll until the record leaves `processing` and return its final view.
pub async fn wait_for_terminal(
    server: &TestServer,
    token: &str,
    tenant: &str,
    id: Uuid,
) -> Value {
    for _ in 0..200 {
        let response = server
            .get(&api_path(&format!("/tenants/{}/videos/{}", tenant, id)))
            .add_header("Authorization", bearer(token))
            .await;
        assert_eq!(response.status_code(), 200);

        let body: Value = response.json();
        if body["state"] != "processing" {
            return body;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("upload {} never reached a terminal state", id);
}
