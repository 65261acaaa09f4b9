//! # Arbiter Client
//!
//! The per-request orchestrator and public entry point of the routing
//! core. One long-lived [`ArbiterClient`] serves many concurrent
//! requests; per-request state (the provider exclusion set, the last
//! error slot) lives on the stack of each call.
//!
//! ## Request pipeline
//!
//! ```text
//! ADMIT -> CLASSIFY -> (ROUTE -> INVOKE)* -> FAIL_OPEN -> RETURN | RAISE
//! ```
//!
//! - **Admission** asks the budget service for an allowance and is the
//!   only fail-closed step: an unreachable budget service denies the
//!   request.
//! - **Classification** scores the last user message.
//! - The **retry loop** routes and invokes up to three times. An
//!   availability failure (rate limit, service unavailable, connection,
//!   timeout) opens a strike against the provider's health and excludes
//!   it for the remainder of the request; any other upstream error
//!   consumes an attempt without penalizing the provider.
//! - **Fail-open** makes a single last-resort call against the configured
//!   fallback model (`FALLBACK_MODEL` env var, default `azure/gpt-4o`)
//!   before giving up.
//! - **Accounting** (audit log + budget deduction) runs best-effort after
//!   any successful invoke and never affects the returned response.
//!
//! Cancellation propagates through the invoker call: a request dropped
//! mid-invoke runs neither further retries nor fail-open.
//!
//! ## Example
//!
//! ```rust
//! use arbiter_core::client::ArbiterClient;
//! use arbiter_core::models::Message;
//! use std::collections::HashMap;
//!
//! let client = ArbiterClient::builder()
//!     .with_invoker(invoker)
//!     .with_budget_client(budget)
//!     .with_audit_client(audit)
//!     .build()?;
//!
//! let response = client
//!     .chat_completion(vec![Message::user("Hello!")], "user-42", HashMap::new())
//!     .await?;
//! ```

use crate::classifier::Classifier;
use crate::error::{ArbiterError, InvokerError};
use crate::health::HealthTracker;
use crate::interfaces::{AuditClient, BudgetClient, ModelFoundryClient, UpstreamInvoker};
use crate::models::{ChatResponse, Message, ModelDefinition, ModelTier, Role};
use crate::registry::ModelRegistry;
use crate::router::Router;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Attempts made by the retry loop before fail-open takes over.
const MAX_ATTEMPTS: usize = 3;

/// Environment variable naming the fail-open fallback model.
const FALLBACK_MODEL_ENV: &str = "FALLBACK_MODEL";
/// Fallback model used when the environment variable is unset.
const DEFAULT_FALLBACK_MODEL: &str = "azure/gpt-4o";
/// Synthetic failure domain assigned to the fail-open attempt.
const FALLBACK_PROVIDER: &str = "failover";
/// Estimated fallback pricing used for accounting.
const FALLBACK_COST_PER_1K_INPUT: f64 = 0.005;
const FALLBACK_COST_PER_1K_OUTPUT: f64 = 0.015;

/// Long-lived request executor.
///
/// Stateless per invocation; safe to share across concurrent requests
/// because the shared registry and health tracker are.
impl std::fmt::Debug for ArbiterClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArbiterClient").finish_non_exhaustive()
    }
}

pub struct ArbiterClient {
    registry: Arc<ModelRegistry>,
    health: Arc<HealthTracker>,
    classifier: Classifier,
    router: Router,
    invoker: Arc<dyn UpstreamInvoker>,
    budget: Option<Arc<dyn BudgetClient>>,
    audit: Option<Arc<dyn AuditClient>>,
    foundry: Option<Arc<dyn ModelFoundryClient>>,
    fallback_model: Option<String>,
    fallback_costs: (f64, f64),
}

impl ArbiterClient {
    /// Start assembling a client.
    pub fn builder() -> ArbiterClientBuilder {
        ArbiterClientBuilder::default()
    }

    /// Shared model registry handle.
    pub fn registry(&self) -> &Arc<ModelRegistry> {
        &self.registry
    }

    /// Shared health tracker handle.
    pub fn health(&self) -> &Arc<HealthTracker> {
        &self.health
    }

    /// Execute one chat completion through the routing pipeline.
    ///
    /// `user_id` is carried unchanged into every budget and audit call.
    /// `extra` is forwarded verbatim to the upstream invoker.
    pub async fn chat_completion(
        &self,
        messages: Vec<Message>,
        user_id: &str,
        extra: HashMap<String, Value>,
    ) -> Result<ChatResponse, ArbiterError> {
        // Admission: the only fail-closed external call.
        if let Some(budget) = &self.budget {
            match budget.check_allowance(user_id).await {
                Ok(true) => {}
                Ok(false) => {
                    tracing::warn!(user_id, "budget exceeded, denying request");
                    return Err(ArbiterError::BudgetExceeded {
                        user_id: user_id.to_string(),
                    });
                }
                Err(e) => {
                    tracing::error!(user_id, error = %e, "budget check failed, failing closed");
                    return Err(ArbiterError::BudgetUnavailable { source: e });
                }
            }
        }

        // Classification runs on the content of the last user message.
        let prompt = messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str());
        if prompt.is_none() {
            tracing::warn!("no user message found, classifying empty prompt");
        }
        let ctx = self.classifier.classify(prompt.unwrap_or(""));
        tracing::info!(
            complexity = ctx.complexity(),
            domain = ctx.domain().unwrap_or("-"),
            "classified request"
        );

        let mut excluded: HashSet<String> = HashSet::new();
        let mut last_error: Option<ArbiterError> = None;

        for attempt in 1..=MAX_ATTEMPTS {
            let model = match self.router.route(&ctx, user_id, &excluded).await {
                Ok(model) => model,
                Err(e) => {
                    // Routing dead-end consumes the attempt without
                    // touching the exclusion set.
                    tracing::error!(attempt, error = %e, "routing failed");
                    last_error = Some(e);
                    continue;
                }
            };
            tracing::info!(attempt, model = %model.id, provider = %model.provider, "selected model");

            match self.invoker.invoke(&model.id, &messages, &extra).await {
                Ok(response) => {
                    self.health.record_success(&model.provider);
                    self.settle(user_id, &model, &response).await;
                    return Ok(response);
                }
                Err(e) => {
                    tracing::warn!(attempt, model = %model.id, error = %e, "invocation failed");
                    if e.is_retriable() {
                        self.health.record_failure(&model.provider);
                        excluded.insert(model.provider.clone());
                        tracing::warn!(
                            provider = %model.provider,
                            "provider failed with availability error, excluding for this request"
                        );
                    }
                    last_error = Some(ArbiterError::Invoker(e));
                }
            }
        }

        self.fail_open(messages, user_id, extra, last_error).await
    }

    /// Bulk-load the foundry's custom-model snapshot into the registry.
    ///
    /// The load is additive: models already registered but absent from the
    /// snapshot are retained, so manually registered local models coexist
    /// with foundry-managed ones. Returns the number of models upserted;
    /// `Ok(0)` when no foundry client is configured.
    pub async fn sync_foundry_models(&self, domain: Option<&str>) -> anyhow::Result<usize> {
        let Some(foundry) = &self.foundry else {
            tracing::debug!("no foundry client configured, skipping sync");
            return Ok(0);
        };

        let models = foundry.list_custom_models(domain).await?;
        let count = models.len();
        for model in models {
            self.registry.register(model);
        }
        tracing::info!(count, domain = domain.unwrap_or("-"), "synced foundry models");
        Ok(count)
    }

    /// Terminal recovery: one attempt against the configured fallback.
    async fn fail_open(
        &self,
        messages: Vec<Message>,
        user_id: &str,
        extra: HashMap<String, Value>,
        last_error: Option<ArbiterError>,
    ) -> Result<ChatResponse, ArbiterError> {
        let fallback = self.fallback_definition();
        tracing::error!(
            fallback = %fallback.id,
            last_error = last_error.as_ref().map(|e| e.to_string()).unwrap_or_default(),
            "retries exhausted, attempting fail-open"
        );

        match self.invoker.invoke(&fallback.id, &messages, &extra).await {
            Ok(response) => {
                self.settle(user_id, &fallback, &response).await;
                Ok(response)
            }
            Err(fail_open) => {
                tracing::error!(error = %fail_open, "fail-open attempt failed");
                match last_error {
                    Some(last) => Err(ArbiterError::Exhausted {
                        last: Box::new(last),
                        fail_open,
                    }),
                    None => Err(ArbiterError::Invoker(fail_open)),
                }
            }
        }
    }

    /// Ad-hoc definition for the fail-open attempt.
    ///
    /// The builder override wins; otherwise the environment variable is
    /// consulted at request time so operators can repoint the fallback
    /// without a restart. An unset variable never fails the request.
    fn fallback_definition(&self) -> ModelDefinition {
        let id = self.fallback_model.clone().unwrap_or_else(|| {
            std::env::var(FALLBACK_MODEL_ENV)
                .unwrap_or_else(|_| DEFAULT_FALLBACK_MODEL.to_string())
        });
        ModelDefinition::new(id, FALLBACK_PROVIDER, ModelTier::Reasoning)
            .with_costs(self.fallback_costs.0, self.fallback_costs.1)
    }

    /// Post-flight accounting: audit log, then budget deduction.
    ///
    /// Best-effort on every path. The response is already generated, so
    /// accounting failures are logged and swallowed; a response without
    /// usage skips both calls.
    async fn settle(&self, user_id: &str, model: &ModelDefinition, response: &ChatResponse) {
        let Some(usage) = &response.usage else {
            tracing::error!(
                model = %model.id,
                "response missing usage, skipping audit and deduction"
            );
            return;
        };
        let cost = model.cost_of(usage);

        if let Some(audit) = &self.audit {
            if let Err(e) = audit
                .log_transaction(
                    user_id,
                    &model.id,
                    usage.prompt_tokens,
                    usage.completion_tokens,
                    cost,
                )
                .await
            {
                tracing::error!(error = %e, "audit logging failed");
            }
        }

        if let Some(budget) = &self.budget {
            if let Err(e) = budget.deduct_funds(user_id, cost).await {
                tracing::error!(user_id, error = %e, "failed to deduct funds");
            }
        }
    }
}

/// Assembles an [`ArbiterClient`] from its collaborators.
///
/// The upstream invoker is the only required component. Registry and
/// health tracker default to fresh instances; pass shared handles when
/// other surfaces (catalog endpoints, health dashboards) need the same
/// view.
#[derive(Default)]
pub struct ArbiterClientBuilder {
    registry: Option<Arc<ModelRegistry>>,
    health: Option<Arc<HealthTracker>>,
    invoker: Option<Arc<dyn UpstreamInvoker>>,
    budget: Option<Arc<dyn BudgetClient>>,
    audit: Option<Arc<dyn AuditClient>>,
    foundry: Option<Arc<dyn ModelFoundryClient>>,
    fallback_model: Option<String>,
    fallback_costs: Option<(f64, f64)>,
}

impl ArbiterClientBuilder {
    /// Use a shared model registry.
    pub fn with_registry(mut self, registry: Arc<ModelRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Use a shared health tracker.
    pub fn with_health_tracker(mut self, health: Arc<HealthTracker>) -> Self {
        self.health = Some(health);
        self
    }

    /// Set the upstream invoker. Required.
    pub fn with_invoker(mut self, invoker: Arc<dyn UpstreamInvoker>) -> Self {
        self.invoker = Some(invoker);
        self
    }

    /// Wire the budget service.
    pub fn with_budget_client(mut self, budget: Arc<dyn BudgetClient>) -> Self {
        self.budget = Some(budget);
        self
    }

    /// Wire the audit service.
    pub fn with_audit_client(mut self, audit: Arc<dyn AuditClient>) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Wire the model foundry.
    pub fn with_foundry_client(mut self, foundry: Arc<dyn ModelFoundryClient>) -> Self {
        self.foundry = Some(foundry);
        self
    }

    /// Pin the fail-open fallback model, overriding the environment.
    pub fn with_fallback_model(mut self, model_id: impl Into<String>) -> Self {
        self.fallback_model = Some(model_id.into());
        self
    }

    /// Override the estimated fallback pricing used for accounting.
    pub fn with_fallback_costs(mut self, input: f64, output: f64) -> Self {
        self.fallback_costs = Some((input, output));
        self
    }

    /// Build the client.
    ///
    /// Fails with [`ArbiterError::Configuration`] when no invoker was
    /// provided.
    pub fn build(self) -> Result<ArbiterClient, ArbiterError> {
        let invoker = self.invoker.ok_or_else(|| ArbiterError::Configuration {
            message: "an upstream invoker is required".to_string(),
        })?;

        if self.budget.is_none() {
            tracing::warn!("no budget client configured; admission and economy mode are disabled");
        }

        let registry = self.registry.unwrap_or_else(|| Arc::new(ModelRegistry::new()));
        let health = self.health.unwrap_or_else(|| Arc::new(HealthTracker::new()));
        let router = Router::new(registry.clone(), health.clone(), self.budget.clone());

        Ok(ArbiterClient {
            registry,
            health,
            classifier: Classifier,
            router,
            invoker,
            budget: self.budget,
            audit: self.audit,
            foundry: self.foundry,
            fallback_model: self.fallback_model,
            fallback_costs: self
                .fallback_costs
                .unwrap_or((FALLBACK_COST_PER_1K_INPUT, FALLBACK_COST_PER_1K_OUTPUT)),
        })
    }
}
