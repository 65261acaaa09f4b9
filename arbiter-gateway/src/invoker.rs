//! # HTTP Upstream Invoker
//!
//! [`UpstreamInvoker`] implementation over an OpenAI-compatible chat
//! completions endpoint. The gateway points this at whatever proxy or
//! provider terminates the actual vendor APIs; the routing core never
//! sees the transport.
//!
//! Error mapping is the contract that matters here: the routing core's
//! failover policy runs on the [`InvokerError`] kind, so every transport
//! and status-code failure must land in the right variant.
//!
//! | Upstream condition        | Variant                          |
//! |---------------------------|----------------------------------|
//! | HTTP 429                  | `RateLimit` (availability)       |
//! | HTTP 5xx                  | `ServiceUnavailable` (availability) |
//! | transport / DNS failure   | `Connection` (availability)      |
//! | request timeout           | `Timeout` (availability)         |
//! | HTTP 400                  | `InvalidRequest`                 |
//! | other non-2xx             | `Api { code, message }`          |
//! | undecodable body          | `Serialization`                  |

use crate::config::UpstreamConfig;
use arbiter_core::error::InvokerError;
use arbiter_core::interfaces::UpstreamInvoker;
use arbiter_core::models::{ChatResponse, Message};
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use serde_json::Value;
use std::collections::HashMap;

/// Invoker for an OpenAI-compatible `POST {base_url}/chat/completions`.
pub struct HttpInvoker {
    http: reqwest::Client,
    base_url: String,
}

impl HttpInvoker {
    /// Build an invoker from the upstream configuration.
    pub fn new(config: &UpstreamConfig) -> anyhow::Result<Self> {
        let mut default_headers = HeaderMap::new();
        if let Some(key) = &config.api_key {
            default_headers.insert("Authorization", format!("Bearer {key}").parse()?);
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .default_headers(default_headers)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl UpstreamInvoker for HttpInvoker {
    async fn invoke(
        &self,
        model_id: &str,
        messages: &[Message],
        extra: &HashMap<String, Value>,
    ) -> Result<ChatResponse, InvokerError> {
        // Caller extras first; model and messages are authoritative and
        // overwrite any stray duplicates.
        let mut body = serde_json::Map::new();
        for (key, value) in extra {
            body.insert(key.clone(), value.clone());
        }
        body.insert("model".to_string(), Value::String(model_id.to_string()));
        body.insert(
            "messages".to_string(),
            serde_json::to_value(messages)?,
        );

        let resp = self
            .http
            .post(self.completions_url())
            .json(&Value::Object(body))
            .send()
            .await
            .map_err(classify_transport_error)?;

        if !resp.status().is_success() {
            return Err(map_error_response(resp).await);
        }

        let text = resp.text().await.map_err(classify_transport_error)?;
        Ok(serde_json::from_str::<ChatResponse>(&text)?)
    }
}

fn classify_transport_error(e: reqwest::Error) -> InvokerError {
    if e.is_timeout() {
        InvokerError::Timeout
    } else {
        InvokerError::Connection {
            message: e.to_string(),
        }
    }
}

/// Map a non-2xx response onto the invoker error taxonomy.
async fn map_error_response(resp: reqwest::Response) -> InvokerError {
    let status = resp.status();
    // Pull a message out of the common `{"error": {"message": ...}}` shape.
    let message = match resp.text().await {
        Ok(body) => serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v.get("error").cloned())
            .and_then(|e| e.get("message").cloned())
            .and_then(|m| m.as_str().map(str::to_string))
            .unwrap_or(body),
        Err(_) => "failed to read error response".to_string(),
    };

    match status.as_u16() {
        429 => InvokerError::RateLimit,
        code if (500..600).contains(&code) => InvokerError::ServiceUnavailable,
        400 => InvokerError::InvalidRequest { message },
        code => InvokerError::Api { code, message },
    }
}
