mod helpers;

use helpers::{api_path, bearer, login, setup_test_app, upload_video};
use serde_json::Value;

const BLOB_SIZE: usize = 1000;

async fn upload_blob(app: &helpers::TestApp) -> (String, uuid::Uuid, Vec<u8>) {
    let client = app.client();
    let token = login(client, "editor1", "editor123").await;
    let data: Vec<u8> = (0..BLOB_SIZE as u32).map(|i| (i % 251) as u8).collect();
    let id = upload_video(client, &token, "tenant1", "seek.mp4", "video/mp4", data.clone()).await;
    (token, id, data)
}

fn stream_path(id: uuid::Uuid) -> String {
    api_path(&format!("/tenants/tenant1/videos/{}/stream", id))
}

#[tokio::test]
async fn test_no_range_serves_full_blob() {
    let app = setup_test_app().await;
    let (token, id, data) = upload_blob(&app).await;

    let response = app
        .client()
        .get(&stream_path(id))
        .add_header("Authorization", bearer(&token))
        .await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(
        response.headers().get("content-length").unwrap(),
        &BLOB_SIZE.to_string()
    );
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "video/mp4"
    );
    assert_eq!(response.as_bytes().to_vec(), data);
}

#[tokio::test]
async fn test_open_ended_range_returns_everything() {
    let app = setup_test_app().await;
    let (token, id, data) = upload_blob(&app).await;

    let response = app
        .client()
        .get(&stream_path(id))
        .add_header("Authorization", bearer(&token))
        .add_header("Range", "bytes=0-")
        .await;

    assert_eq!(response.status_code(), 206);
    assert_eq!(
        response.headers().get("content-range").unwrap(),
        "bytes 0-999/1000"
    );
    assert_eq!(response.as_bytes().to_vec(), data);
}

#[tokio::test]
async fn test_interior_range() {
    let app = setup_test_app().await;
    let (token, id, data) = upload_blob(&app).await;

    let response = app
        .client()
        .get(&stream_path(id))
        .add_header("Authorization", bearer(&token))
        .add_header("Range", "bytes=100-199")
        .await;

    assert_eq!(response.status_code(), 206);
    assert_eq!(
        response.headers().get("content-range").unwrap(),
        "bytes 100-199/1000"
    );
    assert_eq!(
        response.headers().get("content-length").unwrap(),
        "100"
    );
    assert_eq!(response.as_bytes().to_vec(), &data[100..=199]);
}

#[tokio::test]
async fn test_tail_range_reports_end_of_file() {
    let app = setup_test_app().await;
    let (token, id, data) = upload_blob(&app).await;

    let response = app
        .client()
        .get(&stream_path(id))
        .add_header("Authorization", bearer(&token))
        .add_header("Range", "bytes=900-999")
        .await;

    assert_eq!(response.status_code(), 206);
    assert_eq!(
        response.headers().get("content-range").unwrap(),
        "bytes 900-999/1000"
    );
    assert_eq!(response.as_bytes().to_vec(), &data[900..]);
}

#[tokio::test]
async fn test_range_past_end_is_unsatisfiable() {
    let app = setup_test_app().await;
    let (token, id, _) = upload_blob(&app).await;

    let response = app
        .client()
        .get(&stream_path(id))
        .add_header("Authorization", bearer(&token))
        .add_header("Range", "bytes=1000-1999")
        .await;

    assert_eq!(response.status_code(), 416);
    assert_eq!(
        response.headers().get("content-range").unwrap(),
        "bytes */1000"
    );
    let body: Value = response.json();
    assert_eq!(body["code"], "RANGE_NOT_SATISFIABLE");
    // The valid total size is surfaced so the client can correct its range.
    assert!(body["error"].as_str().unwrap().contains("1000"));
}

#[tokio::test]
async fn test_malformed_range_is_unsatisfiable() {
    let app = setup_test_app().await;
    let (token, id, _) = upload_blob(&app).await;

    for header in ["bytes=abc-def", "bytes=-", "items=0-10", "bytes=200-100"] {
        let response = app
            .client()
            .get(&stream_path(id))
            .add_header("Authorization", bearer(&token))
            .add_header("Range", header)
            .await;
        assert_eq!(response.status_code(), 416, "header {:?}", header);
    }
}

#[tokio::test]
async fn test_concurrent_disjoint_ranges() {
    let app = setup_test_app().await;
    let (token, id, data) = upload_blob(&app).await;
    let client = app.client();

    let first_half = client
        .get(&stream_path(id))
        .add_header("Authorization", bearer(&token))
        .add_header("Range", "bytes=0-499");
    let second_half = client
        .get(&stream_path(id))
        .add_header("Authorization", bearer(&token))
        .add_header("Range", "bytes=500-999");

    // Both reads run concurrently; each keeps its own cursor.
    let (a, b) = tokio::join!(first_half, second_half);
    assert_eq!(a.status_code(), 206);
    assert_eq!(b.status_code(), 206);
    assert_eq!(a.as_bytes().to_vec(), &data[..500]);
    assert_eq!(b.as_bytes().to_vec(), &data[500..]);
}

#[tokio::test]
async fn test_stream_requires_authentication() {
    let app = setup_test_app().await;
    let (_, id, _) = upload_blob(&app).await;

    let response = app.client().get(&stream_path(id)).await;
    assert_eq!(response.status_code(), 401);
}
