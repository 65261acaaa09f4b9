//! Fail-open fallback resolution: environment variable, default, and
//! builder override.

mod support;

use arbiter_core::client::ArbiterClient;
use arbiter_core::models::{Message, ModelDefinition, ModelTier};
use serial_test::serial;
use std::collections::HashMap;
use std::sync::Arc;
use support::{Behavior, ScriptedInvoker};

fn exhausting_client(invoker: Arc<ScriptedInvoker>) -> ArbiterClient {
    // One model whose provider fails with an availability error: the
    // first attempt excludes it, the remaining attempts dead-end, and
    // fail-open runs.
    let client = ArbiterClient::builder()
        .with_invoker(invoker)
        .build()
        .unwrap();
    client
        .registry()
        .register(ModelDefinition::new("primary", "P1", ModelTier::Fast));
    client
}

// FALLBACK_MODEL is process-global state, so every test in this file
// runs under #[serial].

#[tokio::test]
#[serial]
async fn test_fallback_model_resolution() {
    // Default when the variable is unset.
    std::env::remove_var("FALLBACK_MODEL");
    let invoker = Arc::new(
        ScriptedInvoker::new()
            .on("primary", Behavior::ServiceUnavailable)
            .on("azure/gpt-4o", Behavior::Ok),
    );
    let client = exhausting_client(invoker.clone());
    let response = client
        .chat_completion(vec![Message::user("hi")], "user-1", HashMap::new())
        .await
        .unwrap();
    assert_eq!(response.model, "azure/gpt-4o");

    // Environment variable repoints the fallback.
    std::env::set_var("FALLBACK_MODEL", "bedrock/claude-sonnet");
    let invoker = Arc::new(
        ScriptedInvoker::new()
            .on("primary", Behavior::ServiceUnavailable)
            .on("bedrock/claude-sonnet", Behavior::Ok),
    );
    let client = exhausting_client(invoker.clone());
    let response = client
        .chat_completion(vec![Message::user("hi")], "user-1", HashMap::new())
        .await
        .unwrap();
    assert_eq!(response.model, "bedrock/claude-sonnet");
    assert_eq!(
        invoker.calls(),
        vec!["primary", "bedrock/claude-sonnet"]
    );
    std::env::remove_var("FALLBACK_MODEL");
}

#[tokio::test]
#[serial]
async fn test_builder_override_beats_environment() {
    std::env::set_var("FALLBACK_MODEL", "env/ignored-model");

    let invoker = Arc::new(
        ScriptedInvoker::new()
            .on("primary", Behavior::ServiceUnavailable)
            .on("local/llama-70b", Behavior::Ok),
    );
    let client = ArbiterClient::builder()
        .with_invoker(invoker.clone())
        .with_fallback_model("local/llama-70b")
        .build()
        .unwrap();
    client
        .registry()
        .register(ModelDefinition::new("primary", "P1", ModelTier::Fast));

    let response = client
        .chat_completion(vec![Message::user("hi")], "user-1", HashMap::new())
        .await
        .unwrap();
    assert_eq!(response.model, "local/llama-70b");
    std::env::remove_var("FALLBACK_MODEL");
}
