//! # HTTP Handlers
//!
//! The gateway's public surface: chat completions, the model catalog and
//! a liveness probe. Handlers stay thin; everything interesting happens
//! inside the routing core.

use crate::gateway_error::GatewayError;
use crate::server::AppState;
use arbiter_core::models::{ChatResponse, Message};
use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use uuid::Uuid;

/// User id attributed to unauthenticated requests.
const DEFAULT_USER: &str = "default_user";

/// Inbound chat completion request.
///
/// The `model` field of the OpenAI schema is accepted but not honored:
/// model selection belongs to the router. Unknown fields (temperature,
/// max_tokens, …) are forwarded to the upstream verbatim.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionRequest {
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

/// Handle `POST /v1/chat/completions`.
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:3000/v1/chat/completions \
///   -H "Content-Type: application/json" \
///   -d '{
///     "messages": [{"role": "user", "content": "Hello!"}],
///     "user": "user-42"
///   }'
/// ```
pub async fn chat_completions(
    State(state): State<AppState>,
    Json(request): Json<ChatCompletionRequest>,
) -> Result<Json<ChatResponse>, GatewayError> {
    if request.messages.is_empty() {
        return Err(GatewayError::InvalidRequest {
            message: "messages must not be empty".to_string(),
        });
    }

    let request_id = Uuid::new_v4();
    let user_id = request.user.as_deref().unwrap_or(DEFAULT_USER);
    tracing::debug!(%request_id, user_id, messages = request.messages.len(), "chat completion");

    let response = state
        .client
        .chat_completion(request.messages, user_id, request.extra)
        .await?;

    Ok(Json(response))
}

/// Handle `GET /v1/models`: the current registry snapshot in the OpenAI
/// list shape, with the routing metadata attached.
pub async fn list_models(State(state): State<AppState>) -> Json<Value> {
    let data: Vec<Value> = state
        .client
        .registry()
        .list(None, None)
        .into_iter()
        .map(|m| {
            json!({
                "id": m.id,
                "object": "model",
                "owned_by": m.provider,
                "tier": m.tier,
                "domain": m.domain,
            })
        })
        .collect();

    Json(json!({ "object": "list", "data": data }))
}

/// Handle `GET /health`.
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "models": state.client.registry().len(),
    }))
}
