//! # Process-local Collaborators
//!
//! Stand-in implementations of the core's collaborator traits for
//! deployments that run without external budget and audit services. The
//! ledger is per-process and in-memory; replicas do not share balances.

use arbiter_core::interfaces::{AuditClient, BudgetClient};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory budget ledger.
///
/// Every user starts at `default_allowance` cost units on first sight.
/// Admission passes while the balance is positive; deductions may drive
/// the balance below zero, which simply denies the next request.
pub struct InMemoryBudget {
    default_allowance: f64,
    balances: Mutex<HashMap<String, f64>>,
}

impl InMemoryBudget {
    pub fn new(default_allowance: f64) -> Self {
        Self {
            default_allowance,
            balances: Mutex::new(HashMap::new()),
        }
    }

    /// Current balance for `user_id`, starting it at the default.
    fn balance(&self, user_id: &str) -> f64 {
        *self
            .balances
            .lock()
            .expect("budget lock poisoned")
            .entry(user_id.to_string())
            .or_insert(self.default_allowance)
    }

    /// Overwrite a user's balance. Test affordance.
    pub fn set_balance(&self, user_id: &str, balance: f64) {
        self.balances
            .lock()
            .expect("budget lock poisoned")
            .insert(user_id.to_string(), balance);
    }
}

#[async_trait]
impl BudgetClient for InMemoryBudget {
    async fn check_allowance(&self, user_id: &str) -> anyhow::Result<bool> {
        Ok(self.balance(user_id) > 0.0)
    }

    async fn get_remaining_budget_percentage(&self, user_id: &str) -> anyhow::Result<f64> {
        let fraction = self.balance(user_id) / self.default_allowance;
        Ok(fraction.clamp(0.0, 1.0))
    }

    async fn deduct_funds(&self, user_id: &str, amount: f64) -> anyhow::Result<()> {
        let mut balances = self.balances.lock().expect("budget lock poisoned");
        let balance = balances
            .entry(user_id.to_string())
            .or_insert(self.default_allowance);
        *balance -= amount;
        tracing::debug!(user_id, amount, balance = *balance, "deducted funds");
        Ok(())
    }
}

/// Audit sink that emits structured tracing events.
///
/// Downstream log shipping turns these into the transaction trail; the
/// gateway itself keeps nothing.
pub struct TracingAudit;

#[async_trait]
impl AuditClient for TracingAudit {
    async fn log_transaction(
        &self,
        user_id: &str,
        model_id: &str,
        input_tokens: u32,
        output_tokens: u32,
        cost: f64,
    ) -> anyhow::Result<()> {
        tracing::info!(
            target: "arbiter_gateway::audit",
            user_id,
            model_id,
            input_tokens,
            output_tokens,
            cost,
            at = %chrono::Utc::now().to_rfc3339(),
            "transaction"
        );
        Ok(())
    }
}
