use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use chrono::{Duration as ChronoDuration, Utc};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use qr_forge::{
    config::Config,
    pipeline::QrPipeline,
    web::{AppState, create_router},
};
use serde_json::{Value, json};
use std::io::Cursor;
use tower::ServiceExt;

const BOUNDARY: &str = "qr-forge-test-boundary";

/// A multipart part: field name, optional (filename, content type), body
type Part<'a> = (&'a str, Option<(&'a str, &'a str)>, Vec<u8>);

fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, file, content) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match file {
            Some((filename, content_type)) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
            ),
        }
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn text_part(text: &str) -> Part<'_> {
    ("text", None, text.as_bytes().to_vec())
}

fn encoded_logo(format: ImageFormat, side: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    let image = RgbaImage::from_pixel(side, side, Rgba([200, 40, 40, 255]));
    let image = match format {
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(image).to_rgb8()),
        _ => DynamicImage::ImageRgba8(image),
    };
    image
        .write_to(&mut Cursor::new(&mut bytes), format)
        .unwrap();
    bytes
}

fn test_app() -> (Router, QrPipeline) {
    test_app_with_limit(5 * 1024 * 1024)
}

fn test_app_with_limit(max_request_size: usize) -> (Router, QrPipeline) {
    let config = Config::default();
    let store = config.storage.build_store().unwrap();
    let pipeline = QrPipeline::new(store, &config);
    let app = create_router(AppState::new(pipeline.clone()), max_request_size);
    (app, pipeline)
}

/// Helper to send requests and get raw responses
async fn send_request(
    app: &Router,
    method: Method,
    uri: &str,
    headers: &[(&str, &str)],
    body: Option<Vec<u8>>,
) -> (StatusCode, HeaderMap, Vec<u8>) {
    let mut request_builder = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        request_builder = request_builder.header(*name, *value);
    }

    let request = match body {
        Some(body) => request_builder
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap(),
        None => request_builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    (status, headers, body_bytes.to_vec())
}

/// Helper for endpoints that answer with JSON
async fn send_json_request(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Vec<u8>>,
) -> (StatusCode, Value) {
    let (status, _, body_bytes) = send_request(
        app,
        method,
        uri,
        &[("accept", "application/json")],
        body,
    )
    .await;

    let json: Value = if body_bytes.is_empty() {
        json!({})
    } else {
        serde_json::from_slice(&body_bytes).unwrap_or(json!({}))
    };

    (status, json)
}

fn location(headers: &HeaderMap) -> String {
    headers
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

fn assert_no_store(headers: &HeaderMap) {
    let cache_control = headers.get(header::CACHE_CONTROL).unwrap().to_str().unwrap();
    assert!(cache_control.contains("no-store"));
    assert_eq!(headers.get(header::PRAGMA).unwrap(), "no-cache");
    assert!(headers.get(header::EXPIRES).is_some());
}

#[tokio::test]
async fn test_health_endpoint() {
    let (app, pipeline) = test_app();
    pipeline.generate("health", None).await.unwrap();

    let (status, response) = send_json_request(&app, Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["success"], true);
    assert_eq!(response["data"]["status"], "healthy");
    assert_eq!(response["data"]["store"]["live_artifacts"], 1);
    assert_eq!(response["data"]["store"]["ttl_seconds"], 3600);
}

#[tokio::test]
async fn test_probe_endpoints() {
    let (app, _) = test_app();

    let (status, response) = send_json_request(&app, Method::GET, "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["data"]["status"], "ready");

    let (status, response) = send_json_request(&app, Method::GET, "/live", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["data"]["status"], "alive");
}

#[tokio::test]
async fn test_index_serves_form() {
    let (app, _) = test_app();

    let (status, headers, body) = send_request(&app, Method::GET, "/", &[], None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(
        headers
            .get(header::CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("text/html")
    );
    let html = String::from_utf8(body).unwrap();
    assert!(html.contains("action=\"/generate\""));
    assert!(headers.get("x-content-type-options").is_some());
}

#[tokio::test]
async fn test_form_submission_redirects_to_artifact() {
    let (app, _) = test_app();
    let body = multipart_body(&[text_part("hello world")]);

    let (status, headers, _) =
        send_request(&app, Method::POST, "/generate", &[], Some(body)).await;

    assert_eq!(status, StatusCode::SEE_OTHER);
    let location = location(&headers);
    let id = location.strip_prefix("/?artifact=").unwrap();
    assert_eq!(id.len(), 32);
    assert!(id.chars().all(|c| c.is_ascii_hexdigit()));

    let (status, headers, png) =
        send_request(&app, Method::GET, &format!("/qr/{id}"), &[], None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers.get(header::CONTENT_TYPE).unwrap(), "image/png");
    assert!(
        headers
            .get(header::CONTENT_DISPOSITION)
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("inline")
    );
    assert_no_store(&headers);
    assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
}

#[tokio::test]
async fn test_json_generation_returns_urls() {
    let (app, _) = test_app();
    let body = multipart_body(&[
        text_part("https://example.com"),
        (
            "logo",
            Some(("logo.png", "image/png")),
            encoded_logo(ImageFormat::Png, 80),
        ),
    ]);

    let (status, response) = send_json_request(&app, Method::POST, "/generate", Some(body)).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(response["success"], true);
    let id = response["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(response["data"]["text"], "https://example.com");
    assert_eq!(response["data"]["image_url"], format!("/qr/{id}"));
    assert_eq!(
        response["data"]["download_url"],
        format!("/qr/{id}?download=true")
    );
    assert!(response["data"]["expires_at"].is_string());

    let (status, headers, _) = send_request(
        &app,
        Method::GET,
        &format!("/qr/{id}?download=true"),
        &[],
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let disposition = headers
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(disposition.starts_with("attachment"));
    assert!(disposition.contains(&format!("qr-{id}.png")));
}

#[tokio::test]
async fn test_format_query_selects_json() {
    let (app, _) = test_app();
    let body = multipart_body(&[text_part("query mode")]);

    let (status, _, body) = send_request(
        &app,
        Method::POST,
        "/generate?format=json",
        &[],
        Some(body),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    let response: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(response["success"], true);
}

#[tokio::test]
async fn test_empty_text_is_rejected() {
    let (app, pipeline) = test_app();

    let (status, response) = send_json_request(
        &app,
        Method::POST,
        "/generate",
        Some(multipart_body(&[text_part("   ")])),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["success"], false);
    assert_eq!(response["error"], "Please enter some text to encode.");

    let (status, headers, _) = send_request(
        &app,
        Method::POST,
        "/generate",
        &[],
        Some(multipart_body(&[])),
    )
    .await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert!(location(&headers).starts_with("/?error="));

    assert_eq!(pipeline.store().stats().await.live_artifacts, 0);
}

#[tokio::test]
async fn test_overlong_text_is_rejected() {
    let (app, _) = test_app();
    let text = "a".repeat(1001);

    let (status, response) = send_json_request(
        &app,
        Method::POST,
        "/generate",
        Some(multipart_body(&[text_part(&text)])),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response["error"],
        "Text is too long. Maximum 1000 characters allowed."
    );
}

#[tokio::test]
async fn test_text_over_symbol_capacity_is_unprocessable() {
    let (app, _) = test_app();
    // 1000 characters, 3000 UTF-8 bytes: beyond the largest level H symbol
    let text = "語".repeat(1000);

    let (status, response) = send_json_request(
        &app,
        Method::POST,
        "/generate",
        Some(multipart_body(&[text_part(&text)])),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response["success"], false);
}

#[tokio::test]
async fn test_jpeg_logo_is_unsupported_media_type() {
    let (app, pipeline) = test_app();
    let body = multipart_body(&[
        text_part("hello"),
        (
            "logo",
            Some(("logo.jpg", "image/jpeg")),
            encoded_logo(ImageFormat::Jpeg, 40),
        ),
    ]);

    let (status, response) = send_json_request(&app, Method::POST, "/generate", Some(body)).await;

    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(
        response["error"],
        "Unsupported logo format: image/jpeg. Please upload a PNG or GIF image"
    );
    assert_eq!(pipeline.store().stats().await.live_artifacts, 0);
}

#[tokio::test]
async fn test_jpeg_logo_in_form_mode_redirects_with_error() {
    let (app, _) = test_app();
    let body = multipart_body(&[
        text_part("hello"),
        (
            "logo",
            Some(("logo.jpg", "image/jpeg")),
            encoded_logo(ImageFormat::Jpeg, 40),
        ),
    ]);

    let (status, headers, _) =
        send_request(&app, Method::POST, "/generate", &[], Some(body)).await;

    assert_eq!(status, StatusCode::SEE_OTHER);
    let location = location(&headers);
    let message = location.strip_prefix("/?error=").unwrap();
    assert!(
        urlencoding::decode(message)
            .unwrap()
            .starts_with("Unsupported logo format")
    );
}

#[tokio::test]
async fn test_empty_logo_field_is_ignored() {
    let (app, _) = test_app();
    let body = multipart_body(&[
        text_part("no logo chosen"),
        ("logo", Some(("", "application/octet-stream")), Vec::new()),
    ]);

    let (status, response) = send_json_request(&app, Method::POST, "/generate", Some(body)).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(response["success"], true);
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let (app, pipeline) = test_app_with_limit(1024);
    let body = multipart_body(&[
        text_part("hello"),
        ("logo", Some(("logo.png", "image/png")), vec![0u8; 8 * 1024]),
    ]);

    let (status, response) = send_json_request(&app, Method::POST, "/generate", Some(body)).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(response["success"], false);
    assert_eq!(pipeline.store().stats().await.live_artifacts, 0);
}

#[tokio::test]
async fn test_unknown_and_malformed_ids_are_not_found() {
    let (app, _) = test_app();

    for uri in ["/qr/0123456789abcdef0123456789abcdef", "/qr/not-an-id"] {
        let (status, headers, body) = send_request(&app, Method::GET, uri, &[], None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert_no_store(&headers);
        let response: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(response["error"], "No QR code available");
    }
}

#[tokio::test]
async fn test_expired_artifact_is_reported_as_expired() {
    let (app, pipeline) = test_app();
    let id = pipeline.generate("ephemeral", None).await.unwrap();

    let reaped = pipeline
        .store()
        .reap(Utc::now() + ChronoDuration::hours(2))
        .await;
    assert_eq!(reaped, 1);

    let (status, response) =
        send_json_request(&app, Method::GET, &format!("/qr/{id}"), None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(response["success"], false);
    assert_eq!(response["error"], "QR code has expired");
}
