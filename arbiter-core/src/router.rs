//! # Router
//!
//! Pure selection of a model for one request: `(routing context, user id,
//! excluded providers) → model`. The router owns no state of its own; it
//! consults the registry snapshot, the health tracker and the budget
//! service, and its only side effects are log lines and the idempotent
//! budget read.
//!
//! ## Selection policy
//!
//! 1. **Baseline tier** from the routing context: high complexity or a
//!    safety-critical domain targets `Reasoning`, moderate complexity
//!    targets `Smart`, everything else `Fast`.
//! 2. **Economy mode**: when the user's remaining budget fraction drops
//!    strictly below 10%, a `Smart` target is downgraded to `Fast`.
//!    `Reasoning` is never downgraded, and a failed budget read fails
//!    open on the baseline tier.
//! 3. **Domain priority**: when the prompt carries a domain, specialized
//!    models tagged with that domain are preferred, at the target tier
//!    when possible, otherwise at whatever tier is available. A
//!    specialized model at a mismatched tier beats a generic model at the
//!    right tier.
//! 4. **Generic selection**: first healthy, non-excluded model at the
//!    target tier, in registry snapshot order.

use crate::error::ArbiterError;
use crate::health::HealthTracker;
use crate::interfaces::BudgetClient;
use crate::models::{ModelDefinition, ModelTier, RoutingContext};
use crate::registry::ModelRegistry;
use std::collections::HashSet;
use std::sync::Arc;

/// Complexity at or above this routes to `Reasoning`.
const REASONING_COMPLEXITY: f64 = 0.8;
/// Complexity at or above this (but below reasoning) routes to `Smart`.
const SMART_COMPLEXITY: f64 = 0.4;
/// Budget fraction strictly below this triggers economy mode.
const ECONOMY_BUDGET_FRACTION: f64 = 0.10;
/// Domain that escalates to `Reasoning` regardless of complexity.
const SAFETY_CRITICAL_DOMAIN: &str = "safety_critical";

/// Selects the best model for a request.
pub struct Router {
    registry: Arc<ModelRegistry>,
    health: Arc<HealthTracker>,
    budget: Option<Arc<dyn BudgetClient>>,
}

impl Router {
    /// Create a router over shared registry and health state.
    ///
    /// Without a budget client, economy mode is skipped entirely.
    pub fn new(
        registry: Arc<ModelRegistry>,
        health: Arc<HealthTracker>,
        budget: Option<Arc<dyn BudgetClient>>,
    ) -> Self {
        Self {
            registry,
            health,
            budget,
        }
    }

    /// Select a model for `ctx`, skipping `excluded` providers.
    ///
    /// Fails with [`ArbiterError::NoHealthyModel`] naming the target tier
    /// when no candidate survives filtering.
    pub async fn route(
        &self,
        ctx: &RoutingContext,
        user_id: &str,
        excluded: &HashSet<String>,
    ) -> Result<ModelDefinition, ArbiterError> {
        let mut target_tier = self.baseline_tier(ctx);
        tracing::debug!(
            tier = %target_tier,
            complexity = ctx.complexity(),
            domain = ctx.domain().unwrap_or("-"),
            "baseline tier selected"
        );

        target_tier = self.apply_economy_mode(target_tier, user_id).await;

        // Domain-priority pass: a specialized model, when one is usable,
        // wins even at a mismatched tier.
        if let Some(domain) = ctx.domain() {
            let specialized: Vec<ModelDefinition> = self
                .registry
                .list(None, Some(domain))
                .into_iter()
                .filter(|m| self.admissible(m, excluded))
                .collect();

            if !specialized.is_empty() {
                let selected = specialized
                    .iter()
                    .find(|m| m.tier == target_tier)
                    .unwrap_or(&specialized[0]);
                tracing::info!(
                    model = %selected.id,
                    provider = %selected.provider,
                    domain,
                    "routed to domain-priority model"
                );
                return Ok(selected.clone());
            }
        }

        let selected = self
            .registry
            .list(Some(target_tier), None)
            .into_iter()
            .find(|m| self.admissible(m, excluded))
            .ok_or(ArbiterError::NoHealthyModel { tier: target_tier })?;

        tracing::info!(model = %selected.id, provider = %selected.provider, "routed to model");
        Ok(selected)
    }

    fn baseline_tier(&self, ctx: &RoutingContext) -> ModelTier {
        let safety_critical = ctx
            .domain()
            .is_some_and(|d| d.eq_ignore_ascii_case(SAFETY_CRITICAL_DOMAIN));

        if ctx.complexity() >= REASONING_COMPLEXITY || safety_critical {
            ModelTier::Reasoning
        } else if ctx.complexity() >= SMART_COMPLEXITY {
            ModelTier::Smart
        } else {
            ModelTier::Fast
        }
    }

    /// Downgrade `Smart` to `Fast` when the user's budget is nearly spent.
    /// A failed budget read logs and proceeds with the baseline tier.
    async fn apply_economy_mode(&self, tier: ModelTier, user_id: &str) -> ModelTier {
        let Some(budget) = &self.budget else {
            return tier;
        };

        match budget.get_remaining_budget_percentage(user_id).await {
            Ok(fraction) if fraction < ECONOMY_BUDGET_FRACTION => {
                if tier == ModelTier::Smart {
                    tracing::info!(
                        user_id,
                        fraction,
                        "economy mode: downgrading smart tier to fast"
                    );
                    ModelTier::Fast
                } else {
                    tier
                }
            }
            Ok(_) => tier,
            Err(e) => {
                tracing::error!(user_id, error = %e, "budget read failed, keeping baseline tier");
                tier
            }
        }
    }

    fn admissible(&self, model: &ModelDefinition, excluded: &HashSet<String>) -> bool {
        model.is_healthy
            && !excluded.contains(&model.provider)
            && self.health.is_healthy(&model.provider)
    }
}
