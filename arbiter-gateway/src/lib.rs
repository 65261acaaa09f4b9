//! # Arbiter Gateway
//!
//! HTTP front-end for the [`arbiter_core`] routing pipeline. The gateway
//! exposes an OpenAI-compatible `POST /v1/chat/completions` endpoint,
//! a model catalog at `GET /v1/models`, and a liveness probe at
//! `GET /health`.
//!
//! Wiring lives in [`server::create_server`]: it builds the routing core
//! from a TOML [`config::Config`], points the [`invoker::HttpInvoker`] at
//! the configured upstream, and installs the process-local budget and
//! audit collaborators when no external services are available.

pub mod collaborators;
pub mod config;
pub mod gateway_error;
pub mod handlers;
pub mod invoker;
pub mod server;

pub use config::Config;
pub use gateway_error::GatewayError;
pub use server::{create_server, AppState};
