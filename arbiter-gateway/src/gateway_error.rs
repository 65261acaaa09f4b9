//! # Gateway Error Mapping
//!
//! HTTP-facing error type translating the routing core's taxonomy into
//! status codes and OpenAI-style error bodies.

use arbiter_core::error::{ArbiterError, InvokerError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Errors surfaced by gateway handlers.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Errors from the routing core
    #[error(transparent)]
    Core(#[from] ArbiterError),

    /// Malformed inbound request
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },
}

impl GatewayError {
    fn status_and_type(&self) -> (StatusCode, &'static str) {
        match self {
            GatewayError::Core(e) => match e {
                ArbiterError::BudgetExceeded { .. } => {
                    (StatusCode::PAYMENT_REQUIRED, "budget_exceeded")
                }
                ArbiterError::BudgetUnavailable { .. } => {
                    (StatusCode::SERVICE_UNAVAILABLE, "budget_unavailable")
                }
                ArbiterError::NoHealthyModel { .. } => {
                    (StatusCode::SERVICE_UNAVAILABLE, "no_healthy_model")
                }
                ArbiterError::Exhausted { .. } => {
                    (StatusCode::SERVICE_UNAVAILABLE, "upstreams_exhausted")
                }
                ArbiterError::Invoker(invoker) => match invoker {
                    InvokerError::RateLimit => {
                        (StatusCode::TOO_MANY_REQUESTS, "rate_limit_exceeded")
                    }
                    InvokerError::InvalidRequest { .. } => {
                        (StatusCode::BAD_REQUEST, "invalid_request")
                    }
                    InvokerError::ServiceUnavailable
                    | InvokerError::Connection { .. }
                    | InvokerError::Timeout => (StatusCode::BAD_GATEWAY, "upstream_unavailable"),
                    InvokerError::Api { .. } | InvokerError::Serialization(_) => {
                        (StatusCode::BAD_GATEWAY, "upstream_error")
                    }
                },
                ArbiterError::Configuration { .. } => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "configuration_error")
                }
            },
            GatewayError::InvalidRequest { .. } => (StatusCode::BAD_REQUEST, "invalid_request"),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, error_type) = self.status_and_type();
        let body = Json(json!({
            "error": {
                "message": self.to_string(),
                "type": error_type,
                "code": status.as_u16(),
            }
        }));
        (status, body).into_response()
    }
}
