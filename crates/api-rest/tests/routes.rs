//! REST route integration tests
//!
//! Drives the full router (extractors, blocking core calls, error mapping) against a
//! temporary storage root.

use std::io::Cursor;
use std::sync::Arc;

use api_rest::{router, HttpMetrics};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use image::{DynamicImage, GenericImageView, ImageFormat, Rgb, RgbImage};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;
use zenpic_core::CoreConfig;

const BOUNDARY: &str = "zenpic-test-boundary";

struct TestApp {
    temp: TempDir,
    app: Router,
}

impl TestApp {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let cfg = CoreConfig::new(temp.path().join("photos"), temp.path().join("music")).unwrap();
        let app = router(Arc::new(cfg), 10 * 1024 * 1024, HttpMetrics::new().unwrap());
        Self { temp, app }
    }

    fn photos(&self) -> std::path::PathBuf {
        self.temp.path().join("photos")
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Vec<u8>, Option<String>) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, body.to_vec(), content_type)
    }

    async fn get(&self, uri: &str) -> (StatusCode, Vec<u8>, Option<String>) {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    async fn get_json(&self, uri: &str) -> (StatusCode, Value) {
        let (status, body, _) = self.get(uri).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    async fn upload(&self, uri: &str, parts: &[(&str, &str, &[u8])]) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(multipart_body(parts)))
            .unwrap();
        let (status, body, _) = self.send(request).await;
        (status, serde_json::from_slice(&body).unwrap())
    }
}

/// Builds a multipart body with one `files` part per `(filename, content type, bytes)`.
fn multipart_body(parts: &[(&str, &str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (filename, content_type, bytes) in parts {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                BOUNDARY, filename, content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([90, 90, 30]));
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}

#[tokio::test]
async fn health_reports_ok() {
    let app = TestApp::new();
    let (status, body) = app.get_json("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], json!(true));
}

#[tokio::test]
async fn collections_missing_root_is_404() {
    let app = TestApp::new();
    let (status, body) = app.get_json("/collections").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn upload_single_file_then_list_and_fetch() {
    let app = TestApp::new();
    let bytes: &[u8] = b"some bytes \x00\x01\x02";

    let (status, body) = app
        .upload(
            "/upload-photos/Sunny%20Day",
            &[("beach.bin", "application/octet-stream", bytes)],
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "status": true,
            "message": "Files are uploaded",
            "data": [{"name": "beach.bin", "mimetype": "application/octet-stream", "size": bytes.len()}]
        })
    );

    let (status, body) = app.get_json("/collections").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"dirs": [{"name": "Sunny Day", "type": "directory"}]}));

    let (status, body) = app.get_json("/collections/Sunny%20Day").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"result": [{"name": "beach.bin", "type": "file"}]}));

    let (status, fetched, _) = app.get("/collections/Sunny%20Day/beach.bin").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, bytes);
}

#[tokio::test]
async fn upload_multiple_files() {
    let app = TestApp::new();
    let (status, body) = app
        .upload(
            "/upload-photos/trip",
            &[("a.txt", "text/plain", &b"a"[..]), ("b.txt", "text/plain", &b"bb"[..])],
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["a.txt", "b.txt"]);
    assert!(app.photos().join("trip").join("b.txt").is_file());
}

#[tokio::test]
async fn upload_without_files_is_400() {
    let app = TestApp::new();
    let (status, body) = app.upload("/upload-photos/trip", &[]).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("no file uploaded"));
    assert!(!app.photos().exists());
}

#[tokio::test]
async fn upload_skips_parts_with_empty_filename() {
    let app = TestApp::new();

    let (status, body) = app
        .upload("/upload-photos/trip", &[("", "application/octet-stream", &b""[..])])
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("no file uploaded"));

    let (status, body) = app
        .upload(
            "/upload-photos/trip",
            &[
                ("", "application/octet-stream", &b""[..]),
                ("kept.txt", "text/plain", &b"kept"[..]),
            ],
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["name"], json!("kept.txt"));
}

#[tokio::test]
async fn malformed_multipart_is_client_error() {
    let app = TestApp::new();
    let request = Request::builder()
        .method("POST")
        .uri("/upload-photos/trip")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(format!("--{}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"a.txt\"\r\n\r\nunterminated", BOUNDARY)))
        .unwrap();

    let (status, body, _) = app.send(request).await;
    assert!(status.is_client_error());
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert!(body["error"].is_string());
    assert!(!app.photos().exists());
}

#[tokio::test]
async fn upload_traversal_is_rejected_without_side_effects() {
    let app = TestApp::new();
    let (status, _) = app
        .upload("/upload-photos/..", &[("x.txt", "text/plain", &b"x"[..])])
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(!app.temp.path().join("x.txt").exists());
    assert!(!app.photos().exists());
}

#[tokio::test]
async fn encoded_separator_in_collection_is_rejected() {
    let app = TestApp::new();
    let (status, _) = app.get_json("/collections/..%2F..%2Fetc").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn fetch_missing_file_is_404() {
    let app = TestApp::new();
    let (status, body) = app.get_json("/collections/none/nothing.jpg").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
    assert!(!app.photos().exists());
}

#[tokio::test]
async fn fetch_with_dimensions_resizes_image() {
    let app = TestApp::new();
    let picture = png(400, 300);
    app.upload("/upload-photos/c", &[("wide.png", "image/png", picture.as_slice())])
        .await;

    let (status, body, content_type) = app
        .get("/collections/c/wide.png?width=100&height=100")
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("image/png"));
    let decoded = image::load_from_memory(&body).unwrap();
    assert_eq!(decoded.dimensions(), (100, 75));
}

#[tokio::test]
async fn fetch_with_one_dimension_is_400() {
    let app = TestApp::new();
    let picture = png(10, 10);
    app.upload("/upload-photos/c", &[("p.png", "image/png", picture.as_slice())])
        .await;

    let (status, _) = app.get_json("/collections/c/p.png?width=100").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn resizing_non_image_is_422() {
    let app = TestApp::new();
    app.upload("/upload-photos/c", &[("notes.txt", "text/plain", &b"hello"[..])])
        .await;

    let (status, _) = app
        .get_json("/collections/c/notes.txt?width=10&height=10")
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn weather_collection_lists_mapped_directory() {
    let app = TestApp::new();
    app.upload("/upload-photos/Snow%20Day", &[("flake.txt", "text/plain", &b"*"[..])])
        .await;

    let (status, body) = app.get_json("/weathercollections?condition=snow").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"result": [{"name": "flake.txt", "type": "file"}], "collection": "Snow Day"})
    );
}

#[tokio::test]
async fn weather_collection_condition_errors() {
    let app = TestApp::new();

    let (status, body) = app.get_json("/weathercollections").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("query parameter condition required"));

    let (status, body) = app.get_json("/weathercollections?condition=banana").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("query condition 'banana' does not exist"));
}

#[tokio::test]
async fn music_library_is_separate() {
    let app = TestApp::new();
    let (status, _) = app
        .upload("/upload-music/album", &[("track.mp3", "audio/mpeg", &b"ID3"[..])])
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(app.temp.path().join("music").join("album").join("track.mp3").is_file());

    let (status, body) = app.get_json("/collections-music/album").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"result": [{"name": "track.mp3", "type": "file"}]}));

    let (status, fetched, _) = app.get("/collections-music/album/track.mp3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, b"ID3");

    let (status, _) = app.get_json("/collections").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = TestApp::new();
    let (status, body) = app.get_json("/api-docs/openapi.json").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/weathercollections"].is_object());
}

#[tokio::test]
async fn metrics_count_requests_by_matched_route() {
    let app = TestApp::new();
    app.get_json("/health").await;
    app.get_json("/collections/none").await;

    let (status, body, content_type) = app.get("/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("text/plain"));

    let text = String::from_utf8(body).unwrap();
    let health = text
        .lines()
        .find(|l| l.starts_with("http_requests_total{") && l.contains(r#"path="/health""#))
        .unwrap();
    assert!(health.contains(r#"method="GET""#));
    assert!(health.contains(r#"status_code="200""#));
    assert!(health.ends_with(" 1"));

    assert!(text.lines().any(|l| l.starts_with("http_requests_total{")
        && l.contains(r#"path="/collections/:collection_id""#)
        && l.contains(r#"status_code="404""#)));
    assert!(text.contains("http_request_duration_seconds_bucket{"));
    assert!(!text.contains(r#"path="/metrics""#));
}
