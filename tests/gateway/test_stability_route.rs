// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Tests for POST /api/ai/generate/stability against a mocked Stability upstream

use axum::http::StatusCode;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use mockito::Matcher;
use serde_json::json;
use std::time::Duration;

use super::support::{
    configured_app, post_json, silent_upstream, test_app, test_app_with_timeout, OPENAI_KEY,
    PNG_BYTES, STABILITY_KEY, STABILITY_PATH,
};

const ROUTE: &str = "/api/ai/generate/stability";

fn form_field(name: &str, value: &str) -> Matcher {
    Matcher::Regex(format!(r#"name="{}"\s+{}\s"#, name, regex_escape(value)))
}

fn regex_escape(value: &str) -> String {
    value
        .chars()
        .flat_map(|c| {
            if c.is_ascii_alphanumeric() || c == ' ' || c == '-' || c == ':' {
                vec![c]
            } else {
                vec!['\\', c]
            }
        })
        .collect()
}

#[tokio::test]
async fn test_success_returns_base64_of_raw_body() {
    let mut server = mockito::Server::new_async().await;
    let upstream = server
        .mock("POST", STABILITY_PATH)
        .match_header("authorization", format!("Bearer {}", STABILITY_KEY).as_str())
        .match_header("accept", "image/*")
        .match_body(Matcher::AllOf(vec![
            form_field("prompt", "a red fox"),
            form_field("output_format", "png"),
            form_field("model", "sd3-medium"),
            form_field("aspect_ratio", "1:1"),
        ]))
        .with_status(200)
        .with_header("content-type", "image/png")
        .with_body(PNG_BYTES)
        .expect(1)
        .create_async()
        .await;

    let (status, body) = post_json(
        configured_app(&server.url()),
        ROUTE,
        json!({ "prompt": "a red fox" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "success": true,
            "imageBase64": STANDARD.encode(PNG_BYTES),
            "model": "sd3-medium",
            "size": "1024x1024"
        })
    );
    upstream.assert_async().await;
}

#[tokio::test]
async fn test_non_square_size_sends_literal_aspect_ratio() {
    let mut server = mockito::Server::new_async().await;
    let upstream = server
        .mock("POST", STABILITY_PATH)
        .match_body(Matcher::AllOf(vec![
            form_field("aspect_ratio", "1200:800"),
            form_field("model", "sd3-large"),
        ]))
        .with_status(200)
        .with_body(PNG_BYTES)
        .expect(1)
        .create_async()
        .await;

    let (status, body) = post_json(
        configured_app(&server.url()),
        ROUTE,
        json!({ "prompt": "a red fox", "size": "1200x800", "model": "sd3-large" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["size"], "1200x800");
    assert_eq!(body["model"], "sd3-large");
    upstream.assert_async().await;
}

#[tokio::test]
async fn test_cfg_scale_and_steps_are_accepted() {
    let mut server = mockito::Server::new_async().await;
    let upstream = server
        .mock("POST", STABILITY_PATH)
        .with_status(200)
        .with_body(PNG_BYTES)
        .expect(1)
        .create_async()
        .await;

    let (status, body) = post_json(
        configured_app(&server.url()),
        ROUTE,
        json!({ "prompt": "a red fox", "cfg_scale": 9.5, "steps": 40 }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    upstream.assert_async().await;
}

#[tokio::test]
async fn test_integer_like_steps_are_accepted() {
    let mut server = mockito::Server::new_async().await;
    let upstream = server
        .mock("POST", STABILITY_PATH)
        .with_status(200)
        .with_body(PNG_BYTES)
        .expect(2)
        .create_async()
        .await;

    for body in [
        json!({ "prompt": "a red fox", "steps": 30.0 }),
        json!({ "prompt": "a red fox", "steps": -1, "cfg_scale": "7" }),
    ] {
        let (status, response) = post_json(configured_app(&server.url()), ROUTE, body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(response["success"], true);
    }
    upstream.assert_async().await;
}

#[tokio::test]
async fn test_missing_key_wins_over_unusual_field_values() {
    let mut server = mockito::Server::new_async().await;
    let upstream = server
        .mock("POST", STABILITY_PATH)
        .expect(0)
        .create_async()
        .await;

    let app = test_app(Some(OPENAI_KEY), None, &server.url());
    let (status, body) = post_json(app, ROUTE, json!({ "prompt": "a red fox", "steps": -1 })).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["type"], "API_KEY_MISSING");
    upstream.assert_async().await;
}

#[tokio::test]
async fn test_missing_prompt_returns_400_without_upstream_call() {
    let mut server = mockito::Server::new_async().await;
    let upstream = server
        .mock("POST", STABILITY_PATH)
        .expect(0)
        .create_async()
        .await;

    let (status, body) = post_json(
        configured_app(&server.url()),
        ROUTE,
        json!({ "size": "512x512" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Prompt is required" }));
    upstream.assert_async().await;
}

#[tokio::test]
async fn test_missing_key_returns_503_without_upstream_call() {
    let mut server = mockito::Server::new_async().await;
    let upstream = server
        .mock("POST", STABILITY_PATH)
        .expect(0)
        .create_async()
        .await;

    for key in [None, Some("your-api-key-here")] {
        let app = test_app(Some(OPENAI_KEY), key, &server.url());
        let (status, body) = post_json(app, ROUTE, json!({ "prompt": "a red fox" })).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["type"], "API_KEY_MISSING");
        assert_eq!(body["error"], "Stability AI API key not configured");
        assert_eq!(body["service"], "Stability AI");
    }
    upstream.assert_async().await;
}

#[tokio::test]
async fn test_malformed_size_returns_400_without_upstream_call() {
    let mut server = mockito::Server::new_async().await;
    let upstream = server
        .mock("POST", STABILITY_PATH)
        .expect(0)
        .create_async()
        .await;

    let (status, body) = post_json(
        configured_app(&server.url()),
        ROUTE,
        json!({ "prompt": "a red fox", "size": "wide" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("WIDTHxHEIGHT"));
    upstream.assert_async().await;
}

#[tokio::test]
async fn test_upstream_401_overrides_message() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", STABILITY_PATH)
        .with_status(401)
        .with_body(json!({ "name": "unauthorized", "errors": ["bad key"] }).to_string())
        .create_async()
        .await;

    let (status, body) = post_json(
        configured_app(&server.url()),
        ROUTE,
        json!({ "prompt": "a red fox" }),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body,
        json!({ "error": "Invalid or missing API key", "type": "API_KEY_INVALID", "service": "Stability AI" })
    );
}

#[tokio::test]
async fn test_upstream_429_maps_to_rate_limit() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", STABILITY_PATH)
        .with_status(429)
        .create_async()
        .await;

    let (status, body) = post_json(
        configured_app(&server.url()),
        ROUTE,
        json!({ "prompt": "a red fox" }),
    )
    .await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["type"], "RATE_LIMIT_EXCEEDED");
    assert_eq!(body["error"], "Rate limit exceeded");
}

#[tokio::test]
async fn test_other_upstream_status_maps_to_unknown() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", STABILITY_PATH)
        .with_status(422)
        .with_body(json!({ "name": "content_moderation" }).to_string())
        .create_async()
        .await;

    let (status, body) = post_json(
        configured_app(&server.url()),
        ROUTE,
        json!({ "prompt": "a red fox" }),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["type"], "UNKNOWN_ERROR");
    assert_eq!(body["error"], "Request failed with status code 422");
}

#[tokio::test]
async fn test_empty_image_body_is_unknown_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", STABILITY_PATH)
        .with_status(200)
        .create_async()
        .await;

    let (status, body) = post_json(
        configured_app(&server.url()),
        ROUTE,
        json!({ "prompt": "a red fox" }),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["type"], "UNKNOWN_ERROR");
}

#[tokio::test]
async fn test_upstream_timeout_maps_to_500_unknown() {
    let base = silent_upstream().await;
    let app = test_app_with_timeout(
        Some(OPENAI_KEY),
        Some(STABILITY_KEY),
        &base,
        Duration::from_millis(500),
    );

    let (status, body) = post_json(app, ROUTE, json!({ "prompt": "a red fox" })).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["type"], "UNKNOWN_ERROR");
    assert_eq!(body["service"], "Stability AI");
}
