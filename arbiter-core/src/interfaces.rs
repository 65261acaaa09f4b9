//! # Collaborator Interfaces
//!
//! Capability traits for the external services the routing core depends
//! on. The core never names a concrete vendor at these seams; concrete
//! implementations are injected at wiring time as `Arc<dyn …>` trait
//! objects.
//!
//! ## Overview
//!
//! - [`BudgetClient`]: admission, economy-mode reads and post-flight
//!   deduction against the budget service
//! - [`AuditClient`]: transaction log sink
//! - [`ModelFoundryClient`]: custom-model catalog used to bulk-populate
//!   the registry at configuration time
//! - [`UpstreamInvoker`]: the actual LLM call
//!
//! Budget, audit and foundry operations carry opaque `anyhow::Error`
//! failures: the executor only cares *that* they failed, and which phase
//! fails open versus closed. The invoker returns the closed
//! [`InvokerError`](crate::error::InvokerError) set because the executor's
//! failover policy inspects the kind.

use crate::error::InvokerError;
use crate::models::{ChatResponse, Message, ModelDefinition};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;

/// Budget service operations consumed by the core.
#[async_trait]
pub trait BudgetClient: Send + Sync {
    /// Whether the user has enough budget to proceed with a request.
    async fn check_allowance(&self, user_id: &str) -> anyhow::Result<bool>;

    /// The user's remaining budget as a fraction in `[0, 1]`.
    /// Drives economy-mode tier downgrades.
    async fn get_remaining_budget_percentage(&self, user_id: &str) -> anyhow::Result<f64>;

    /// Deduct the cost of a completed transaction.
    async fn deduct_funds(&self, user_id: &str, amount: f64) -> anyhow::Result<()>;
}

/// Audit service operations consumed by the core.
#[async_trait]
pub trait AuditClient: Send + Sync {
    /// Log a completed transaction for auditing and cost tracking.
    async fn log_transaction(
        &self,
        user_id: &str,
        model_id: &str,
        input_tokens: u32,
        output_tokens: u32,
        cost: f64,
    ) -> anyhow::Result<()>;
}

/// Model-foundry catalog operations consumed by the core.
#[async_trait]
pub trait ModelFoundryClient: Send + Sync {
    /// List custom models available from the foundry, optionally filtered
    /// by domain.
    async fn list_custom_models(
        &self,
        domain: Option<&str>,
    ) -> anyhow::Result<Vec<ModelDefinition>>;
}

/// The upstream LLM call.
///
/// Implementations own their network resources and must release them on
/// success, failure and process shutdown alike. Cancellation of the
/// request future propagates into the invoker; a timeout must surface as
/// [`InvokerError::Timeout`] so that it is treated as an availability
/// failure.
#[async_trait]
pub trait UpstreamInvoker: Send + Sync {
    /// Invoke `model_id` with `messages`.
    ///
    /// `extra` carries caller-supplied provider parameters (temperature,
    /// max_tokens, …) forwarded verbatim.
    async fn invoke(
        &self,
        model_id: &str,
        messages: &[Message],
        extra: &HashMap<String, Value>,
    ) -> Result<ChatResponse, InvokerError>;
}
