mod common;

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use common::{StubGenerator, test_config, well_formed_reply};
use mockito::Server;
use rsa_adcopy::api::routes::create_router;
use rsa_adcopy::config::Config;
use rsa_adcopy::AppState;
use serde_json::{json, Value};
use tower::ServiceExt;

async fn post_generate(state: AppState, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/api/generate")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = create_router(state).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn form() -> Value {
    json!({
        "keywords": "shipping, delivery",
        "sentiment": "urgent",
        "usps": "fast",
        "ctas": "buy now",
        "temperature": 0.4
    })
}

fn stub_state(reply: String) -> AppState {
    AppState::with_generator(test_config(), Arc::new(StubGenerator::replying(reply))).unwrap()
}

#[tokio::test]
async fn generates_ad_copy() {
    let (status, body) = post_generate(stub_state(well_formed_reply()), form()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["status"], "success");
    assert_eq!(body["meta"]["warnings"], 0);

    let data = &body["data"];
    assert_eq!(data["headlines"].as_array().unwrap().len(), 15);
    assert_eq!(data["descriptions"].as_array().unwrap().len(), 4);
    assert_eq!(data["paths"], json!(["shipping", "fast-delivery"]));
    assert_eq!(data["violations"], json!([]));
    assert_eq!(data["labels"]["headlines"], "Headlines (15 x 30 chars)");
    assert_eq!(data["labels"]["sentiment"], "Urgent");
    assert_eq!(data["scrape_degraded"], false);
}

#[tokio::test]
async fn violations_are_returned_alongside_copy() {
    let reply = well_formed_reply().replace("shipping\n", "a-very-long-display-path\n");
    let (status, body) = post_generate(stub_state(reply), form()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["status"], "partial");
    assert_eq!(body["meta"]["warnings"], 1);

    let violation = &body["data"]["violations"][0];
    assert_eq!(violation["section"], "paths");
    assert_eq!(violation["index"], 0);
    assert_eq!(violation["kind"], "Oversized");
    assert_eq!(body["data"]["paths"][0], "a-very-long-dis");
}

#[tokio::test]
async fn invalid_input_is_bad_request() {
    let mut body = form();
    body["keywords"] = json!(" , ");

    let (status, body) = post_generate(stub_state(well_formed_reply()), body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["meta"]["status"], "error");
    assert!(body["data"].is_null());
    assert!(body["meta"]["message"].as_str().unwrap().contains("keywords"));
}

#[tokio::test]
async fn missing_credential_is_reported() {
    let state = AppState::new(test_config()).unwrap();
    let (status, body) = post_generate(state, form()).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(
        body["meta"]["message"]
            .as_str()
            .unwrap()
            .starts_with("No API credential configured")
    );
}

#[tokio::test]
async fn entered_key_overrides_configuration() {
    let mut server = Server::new_async().await;
    let completion = json!({
        "choices": [{"message": {"role": "assistant", "content": well_formed_reply()}}]
    });
    let mock = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer sk-entered")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(completion.to_string())
        .expect(1)
        .create_async()
        .await;

    let base_url = server.url();
    let config = Config::from_lookup(|key| match key {
        "OPENAI_BASE_URL" => Some(base_url.clone()),
        "SCRAPE_TIMEOUT_SECS" => Some("1".to_string()),
        _ => None,
    })
    .unwrap();

    let mut body = form();
    body["api_key"] = json!("sk-entered");
    let (status, body) = post_generate(AppState::new(config).unwrap(), body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["headlines"].as_array().unwrap().len(), 15);
    mock.assert_async().await;
}

#[tokio::test]
async fn service_failure_reads_as_request_failed() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(500)
        .with_body(r#"{"error":{"message":"The server had an error"}}"#)
        .create_async()
        .await;

    let base_url = server.url();
    let config = Config::from_lookup(|key| match key {
        "OPENAI_BASE_URL" => Some(base_url.clone()),
        "OPENAI_API_KEY" => Some("sk-test".to_string()),
        _ => None,
    })
    .unwrap();

    let (status, body) = post_generate(AppState::new(config).unwrap(), form()).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let message = body["meta"]["message"].as_str().unwrap();
    assert!(message.starts_with("Request failed"));
    assert!(message.contains("The server had an error"));
}
