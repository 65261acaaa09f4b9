//! # Server Assembly
//!
//! Wires the routing core to the HTTP surface: builds the
//! [`ArbiterClient`] from configuration, registers the startup model
//! catalog, and assembles the axum router with its middleware stack.

use crate::collaborators::{InMemoryBudget, TracingAudit};
use crate::config::Config;
use crate::handlers;
use crate::invoker::HttpInvoker;
use arbiter_core::client::ArbiterClient;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Application state shared across all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Gateway configuration
    pub config: Arc<Config>,
    /// Routing core executor
    pub client: Arc<ArbiterClient>,
}

/// Create the HTTP server from a validated configuration.
///
/// Builds the upstream invoker, wires the process-local collaborators,
/// registers the catalog models, and returns an axum router ready to
/// serve.
///
/// # Example
///
/// ```rust
/// let config = Config::load("config.toml")?;
/// config.validate()?;
/// let app = create_server(config).await?;
/// ```
pub async fn create_server(config: Config) -> anyhow::Result<Router> {
    let invoker = Arc::new(HttpInvoker::new(&config.upstream)?);

    let mut builder = ArbiterClient::builder()
        .with_invoker(invoker)
        .with_audit_client(Arc::new(TracingAudit))
        .with_fallback_costs(
            config.fallback.cost_per_1k_input,
            config.fallback.cost_per_1k_output,
        );

    if config.budget.enabled {
        builder = builder
            .with_budget_client(Arc::new(InMemoryBudget::new(config.budget.default_allowance)));
    }
    if let Some(model) = &config.fallback.model {
        builder = builder.with_fallback_model(model.clone());
    }

    let client = builder.build()?;

    for model in &config.models {
        client.registry().register(model.clone());
    }
    tracing::info!(models = client.registry().len(), "model catalog registered");

    let state = AppState {
        config: Arc::new(config),
        client: Arc::new(client),
    };

    let timeout = state.config.server.timeout();
    let app = Router::new()
        .route("/health", get(handlers::health))
        .route("/v1/models", get(handlers::list_models))
        .route("/v1/chat/completions", post(handlers::chat_completions))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(timeout)),
        )
        .with_state(state);

    Ok(app)
}
