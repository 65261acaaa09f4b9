//! # Arbiter Core
//!
//! The routing core of the Arbiter gateway: a request-handling pipeline
//! that sits between client applications and a heterogeneous pool of
//! upstream LLM providers and decides, per request, which model to
//! invoke. Selection optimizes three axes jointly: task-appropriate
//! capability, cost, and availability.
//!
//! ## Components
//!
//! - **[`classifier`]**: keyword/length heuristics mapping a prompt to a
//!   routing context (complexity score plus optional domain tag)
//! - **[`registry`]**: the catalog of candidate models, keyed by id
//! - **[`health`]**: per-provider circuit breaker with a rolling failure
//!   window and cooldown
//! - **[`router`]**: pure policy selecting a model from the registry
//! - **[`client`]**: the per-request executor orchestrating admission,
//!   classification, the route/invoke retry loop, fail-open recovery and
//!   post-flight accounting
//! - **[`interfaces`]**: capability traits for the injected collaborators
//!   (budget, audit, model foundry, upstream invoker)
//!
//! All state is in-memory and process-local; each replica maintains its
//! own view of provider health.
//!
//! ## Quick start
//!
//! ```rust
//! use arbiter_core::client::ArbiterClient;
//! use arbiter_core::models::{Message, ModelDefinition, ModelTier};
//! use std::collections::HashMap;
//!
//! let client = ArbiterClient::builder()
//!     .with_invoker(invoker)
//!     .with_budget_client(budget)
//!     .with_audit_client(audit)
//!     .build()?;
//!
//! client.registry().register(
//!     ModelDefinition::new("azure/gpt-4o-mini", "azure", ModelTier::Fast)
//!         .with_costs(0.00015, 0.0006),
//! );
//!
//! let response = client
//!     .chat_completion(vec![Message::user("Hello!")], "user-42", HashMap::new())
//!     .await?;
//! ```

pub mod classifier;
pub mod client;
pub mod error;
pub mod health;
pub mod interfaces;
pub mod models;
pub mod registry;
pub mod router;

pub use classifier::Classifier;
pub use client::{ArbiterClient, ArbiterClientBuilder};
pub use error::{ArbiterError, InvokerError};
pub use health::{HealthTracker, HealthTrackerConfig};
pub use interfaces::{AuditClient, BudgetClient, ModelFoundryClient, UpstreamInvoker};
pub use models::{
    ChatResponse, Choice, Message, ModelDefinition, ModelTier, Role, RoutingContext, Usage,
};
pub use registry::ModelRegistry;
pub use router::Router;

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, ArbiterError>;
