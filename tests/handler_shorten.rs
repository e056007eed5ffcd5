mod common;

use regex::Regex;
use serde_json::json;
use std::sync::Arc;

#[tokio::test]
async fn test_shorten_form_success() {
    let server = common::test_server(common::create_test_state());

    let response = server
        .post("/short")
        .form(&[("url", "http://example.com")])
        .await;

    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["code"], 200);
    assert_eq!(json["message"], "Success");
    assert_eq!(json["data"]["urlORi"], "http://example.com");
    assert_eq!(json["data"]["rate_limit"], 9);

    let short = json["data"]["urlShort"].as_str().unwrap();
    let pattern = Regex::new(r"^http://localhost:8080/short/[A-Za-z0-9]{6}$").unwrap();
    assert!(pattern.is_match(short), "unexpected short url {short}");
}

#[tokio::test]
async fn test_shorten_json_success() {
    let server = common::test_server(common::create_test_state());

    let response = server
        .post("/short")
        .json(&json!({ "url": "https://example.com/a?b=c" }))
        .await;

    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["data"]["urlORi"], "https://example.com/a?b=c");
}

#[tokio::test]
async fn test_shorten_with_custom_code() {
    let server = common::test_server(common::create_test_state());

    let response = server
        .post("/short")
        .json(&json!({ "url": "https://example.com", "custom_code": "mycode123" }))
        .await;

    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    assert_eq!(
        json["data"]["urlShort"],
        "http://localhost:8080/short/mycode123"
    );
}

#[tokio::test]
async fn test_shorten_blank_custom_code_generates_one() {
    let server = common::test_server(common::create_test_state());

    let response = server
        .post("/short")
        .form(&[("url", "http://example.com"), ("custom_code", "")])
        .await;

    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    let short = json["data"]["urlShort"].as_str().unwrap();
    assert_eq!(short.rsplit('/').next().unwrap().len(), 6);
}

#[tokio::test]
async fn test_shorten_custom_code_taken() {
    let server = common::test_server(common::create_test_state());

    server
        .post("/short")
        .json(&json!({ "url": "https://first.com", "custom_code": "taken" }))
        .await
        .assert_status_ok();

    let response = server
        .post("/short")
        .json(&json!({ "url": "https://second.com", "custom_code": "taken" }))
        .await;

    assert_eq!(response.status_code(), 403);

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"], "URL Custom short is already in use");

    let redirect = server.get("/short/taken").await;
    assert_eq!(redirect.header("location"), "https://first.com");
}

#[tokio::test]
async fn test_shorten_missing_url() {
    let server = common::test_server(common::create_test_state());

    let response = server.post("/short").form(&[("other", "x")]).await;

    assert_eq!(response.status_code(), 400);

    let json = response.json::<serde_json::Value>();
    assert_eq!(json, json!({ "code": 400, "message": "URL is missing!" }));
}

#[tokio::test]
async fn test_shorten_invalid_custom_code() {
    let server = common::test_server(common::create_test_state());

    let response = server
        .post("/short")
        .json(&json!({ "url": "https://example.com", "custom_code": "no spaces!" }))
        .await;

    assert_eq!(response.status_code(), 400);

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["code"], 400);
    assert!(json["message"].as_str().unwrap().contains("Custom code"));
}

#[tokio::test]
async fn test_shorten_malformed_json() {
    let server = common::test_server(common::create_test_state());

    let response = server
        .post("/short")
        .content_type("application/json")
        .bytes("{not json".into())
        .await;

    assert_eq!(response.status_code(), 400);
    assert_eq!(response.json::<serde_json::Value>()["code"], 400);
}

#[tokio::test]
async fn test_shorten_rate_limit_exceeded() {
    let server = common::test_server(common::create_test_state());

    for expected in (0..10).rev() {
        let response = server
            .post("/short")
            .form(&[("url", "http://example.com")])
            .await;

        response.assert_status_ok();
        assert_eq!(
            response.json::<serde_json::Value>()["data"]["rate_limit"],
            expected
        );
    }

    let response = server
        .post("/short")
        .form(&[("url", "http://example.com")])
        .await;

    assert_eq!(response.status_code(), 503);

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"], "Rate limit exceeded");
    let reset = json["rate_limit_reset"].as_u64().unwrap();
    assert!((1..=2).contains(&reset));
}

#[tokio::test]
async fn test_shorten_clients_behind_proxy_are_independent() {
    let state = common::create_test_state_with(
        Arc::new(shortlink::infrastructure::store::MemoryStore::new()),
        true,
    );
    let server = common::test_server(state);

    for _ in 0..10 {
        server
            .post("/short")
            .add_header("X-Forwarded-For", "203.0.113.7")
            .form(&[("url", "http://example.com")])
            .await
            .assert_status_ok();
    }

    let blocked = server
        .post("/short")
        .add_header("X-Forwarded-For", "203.0.113.7")
        .form(&[("url", "http://example.com")])
        .await;
    assert_eq!(blocked.status_code(), 503);

    let other = server
        .post("/short")
        .add_header("X-Forwarded-For", "198.51.100.2")
        .form(&[("url", "http://example.com")])
        .await;
    other.assert_status_ok();
    assert_eq!(other.json::<serde_json::Value>()["data"]["rate_limit"], 9);
}

#[tokio::test]
async fn test_shorten_store_unavailable() {
    let state = common::create_test_state_with(Arc::new(common::UnavailableStore), false);
    let server = common::test_server(state);

    let response = server
        .post("/short")
        .form(&[("url", "http://example.com")])
        .await;

    assert_eq!(response.status_code(), 500);

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"], "Unable to connect to server");
    assert!(json["message"].as_str().unwrap().contains("connection refused"));
}
