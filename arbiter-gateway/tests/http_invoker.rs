//! HTTP invoker contract tests: request shape, auth header, and the
//! status-code → error-kind mapping the routing core's failover policy
//! depends on.

use arbiter_core::error::InvokerError;
use arbiter_core::interfaces::UpstreamInvoker;
use arbiter_core::models::Message;
use arbiter_gateway::config::UpstreamConfig;
use arbiter_gateway::invoker::HttpInvoker;
use serde_json::{json, Value};
use std::collections::HashMap;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn upstream_config(base_url: String, api_key: Option<String>) -> UpstreamConfig {
    UpstreamConfig {
        base_url,
        api_key,
        timeout_secs: 5,
    }
}

fn completion_body(model: &str) -> Value {
    json!({
        "id": "chatcmpl-123",
        "object": "chat.completion",
        "created": 1_700_000_000u64,
        "model": model,
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": "Hi!"},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 9, "completion_tokens": 3, "total_tokens": 12}
    })
}

async fn invoke(
    server: &MockServer,
    extra: HashMap<String, Value>,
) -> Result<arbiter_core::models::ChatResponse, InvokerError> {
    let invoker = HttpInvoker::new(&upstream_config(format!("{}/v1", server.uri()), None)).unwrap();
    invoker
        .invoke("azure/gpt-4o", &[Message::user("hello")], &extra)
        .await
}

#[tokio::test]
async fn test_successful_completion_is_decoded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({
            "model": "azure/gpt-4o",
            "messages": [{"role": "user", "content": "hello"}],
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("azure/gpt-4o")))
        .expect(1)
        .mount(&server)
        .await;

    let response = invoke(&server, HashMap::new()).await.unwrap();
    assert_eq!(response.model, "azure/gpt-4o");
    assert_eq!(response.usage.unwrap().total_tokens, 12);
}

#[tokio::test]
async fn test_extra_parameters_are_forwarded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({
            "temperature": 0.2,
            "max_tokens": 64,
            "model": "azure/gpt-4o",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("azure/gpt-4o")))
        .expect(1)
        .mount(&server)
        .await;

    let extra: HashMap<String, Value> = [
        ("temperature".to_string(), json!(0.2)),
        ("max_tokens".to_string(), json!(64)),
        // A stray model key must lose to the routed model id.
        ("model".to_string(), json!("user-picked")),
    ]
    .into();

    invoke(&server, extra).await.unwrap();
}

#[tokio::test]
async fn test_api_key_becomes_bearer_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("Authorization", "Bearer sk-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("azure/gpt-4o")))
        .expect(1)
        .mount(&server)
        .await;

    let invoker = HttpInvoker::new(&upstream_config(
        format!("{}/v1", server.uri()),
        Some("sk-test".to_string()),
    ))
    .unwrap();
    invoker
        .invoke("azure/gpt-4o", &[Message::user("hello")], &HashMap::new())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_429_maps_to_rate_limit() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let err = invoke(&server, HashMap::new()).await.unwrap_err();
    assert!(matches!(err, InvokerError::RateLimit));
}

#[tokio::test]
async fn test_5xx_maps_to_service_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = invoke(&server, HashMap::new()).await.unwrap_err();
    assert!(matches!(err, InvokerError::ServiceUnavailable));
}

#[tokio::test]
async fn test_400_maps_to_invalid_request_with_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"message": "messages: field required"}
        })))
        .mount(&server)
        .await;

    let err = invoke(&server, HashMap::new()).await.unwrap_err();
    match err {
        InvokerError::InvalidRequest { message } => {
            assert_eq!(message, "messages: field required");
        }
        other => panic!("expected InvalidRequest, got {other:?}"),
    }
}

#[tokio::test]
async fn test_other_status_maps_to_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = invoke(&server, HashMap::new()).await.unwrap_err();
    assert!(matches!(err, InvokerError::Api { code: 404, .. }));
}

#[tokio::test]
async fn test_unreachable_upstream_maps_to_connection_error() {
    // Grab a port that stops listening the moment the mock server drops.
    let server = MockServer::start().await;
    let dead_uri = format!("{}/v1", server.uri());
    drop(server);

    let invoker = HttpInvoker::new(&upstream_config(dead_uri, None)).unwrap();
    let err = invoker
        .invoke("azure/gpt-4o", &[Message::user("hello")], &HashMap::new())
        .await
        .unwrap_err();
    assert!(matches!(err, InvokerError::Connection { .. }));
}

#[tokio::test]
async fn test_undecodable_body_maps_to_serialization_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = invoke(&server, HashMap::new()).await.unwrap_err();
    assert!(matches!(err, InvokerError::Serialization(_)));
}
