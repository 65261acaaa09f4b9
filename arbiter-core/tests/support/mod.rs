//! Shared test doubles for the executor scenario suites: a scripted
//! upstream invoker and recording budget/audit/foundry collaborators.

#![allow(dead_code)]

use arbiter_core::error::InvokerError;
use arbiter_core::interfaces::{AuditClient, BudgetClient, ModelFoundryClient, UpstreamInvoker};
use arbiter_core::models::{ChatResponse, Choice, Message, ModelDefinition, Usage};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

/// What the scripted invoker does when a given model id is invoked.
#[derive(Debug, Clone, Copy)]
pub enum Behavior {
    Ok,
    OkWithoutUsage,
    RateLimit,
    ServiceUnavailable,
    Connection,
    Timeout,
    ApiError(u16),
}

/// Upstream invoker driven by a per-model script, recording every call.
#[derive(Default)]
pub struct ScriptedInvoker {
    behaviors: HashMap<String, Behavior>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the behavior for `model_id`. Unscripted models succeed.
    pub fn on(mut self, model_id: &str, behavior: Behavior) -> Self {
        self.behaviors.insert(model_id.to_string(), behavior);
        self
    }

    /// Model ids invoked so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl UpstreamInvoker for ScriptedInvoker {
    async fn invoke(
        &self,
        model_id: &str,
        _messages: &[Message],
        _extra: &HashMap<String, Value>,
    ) -> Result<ChatResponse, InvokerError> {
        self.calls.lock().unwrap().push(model_id.to_string());

        match self.behaviors.get(model_id).copied().unwrap_or(Behavior::Ok) {
            Behavior::Ok => Ok(response(model_id, 1000, 1000)),
            Behavior::OkWithoutUsage => {
                let mut r = response(model_id, 0, 0);
                r.usage = None;
                Ok(r)
            }
            Behavior::RateLimit => Err(InvokerError::RateLimit),
            Behavior::ServiceUnavailable => Err(InvokerError::ServiceUnavailable),
            Behavior::Connection => Err(InvokerError::Connection {
                message: "connection refused".to_string(),
            }),
            Behavior::Timeout => Err(InvokerError::Timeout),
            Behavior::ApiError(code) => Err(InvokerError::Api {
                code,
                message: "upstream rejected request".to_string(),
            }),
        }
    }
}

/// Canned completion response for `model_id`.
pub fn response(model_id: &str, prompt_tokens: u32, completion_tokens: u32) -> ChatResponse {
    ChatResponse {
        id: format!("chatcmpl-{model_id}"),
        object: "chat.completion".to_string(),
        created: 1_700_000_000,
        model: model_id.to_string(),
        choices: vec![Choice {
            index: 0,
            message: Message::assistant("stub completion"),
            finish_reason: Some("stop".to_string()),
        }],
        usage: Some(Usage {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }),
    }
}

/// Budget double with a fixed admission verdict and recorded deductions.
pub struct RecordingBudget {
    pub allowance: anyhow::Result<bool>,
    pub fraction: f64,
    deductions: Mutex<Vec<(String, f64)>>,
}

impl RecordingBudget {
    /// A budget that admits everything with a full allowance.
    pub fn permissive() -> Self {
        Self {
            allowance: Ok(true),
            fraction: 1.0,
            deductions: Mutex::new(Vec::new()),
        }
    }

    pub fn denying() -> Self {
        Self {
            allowance: Ok(false),
            ..Self::permissive()
        }
    }

    pub fn unreachable_service() -> Self {
        Self {
            allowance: Err(anyhow::anyhow!("budget database down")),
            ..Self::permissive()
        }
    }

    pub fn deductions(&self) -> Vec<(String, f64)> {
        self.deductions.lock().unwrap().clone()
    }
}

#[async_trait]
impl BudgetClient for RecordingBudget {
    async fn check_allowance(&self, _user_id: &str) -> anyhow::Result<bool> {
        match &self.allowance {
            Ok(v) => Ok(*v),
            Err(e) => Err(anyhow::anyhow!("{e}")),
        }
    }

    async fn get_remaining_budget_percentage(&self, _user_id: &str) -> anyhow::Result<f64> {
        Ok(self.fraction)
    }

    async fn deduct_funds(&self, user_id: &str, amount: f64) -> anyhow::Result<()> {
        self.deductions
            .lock()
            .unwrap()
            .push((user_id.to_string(), amount));
        Ok(())
    }
}

/// Budget double whose deduction always fails.
pub struct DeductionlessBudget(pub RecordingBudget);

#[async_trait]
impl BudgetClient for DeductionlessBudget {
    async fn check_allowance(&self, user_id: &str) -> anyhow::Result<bool> {
        self.0.check_allowance(user_id).await
    }

    async fn get_remaining_budget_percentage(&self, user_id: &str) -> anyhow::Result<f64> {
        self.0.get_remaining_budget_percentage(user_id).await
    }

    async fn deduct_funds(&self, _user_id: &str, _amount: f64) -> anyhow::Result<()> {
        anyhow::bail!("ledger write failed")
    }
}

/// One recorded audit transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub user_id: String,
    pub model_id: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub cost: f64,
}

/// Audit double recording every transaction.
#[derive(Default)]
pub struct RecordingAudit {
    transactions: Mutex<Vec<Transaction>>,
    pub fail: bool,
}

impl RecordingAudit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn transactions(&self) -> Vec<Transaction> {
        self.transactions.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuditClient for RecordingAudit {
    async fn log_transaction(
        &self,
        user_id: &str,
        model_id: &str,
        input_tokens: u32,
        output_tokens: u32,
        cost: f64,
    ) -> anyhow::Result<()> {
        if self.fail {
            anyhow::bail!("audit sink unavailable");
        }
        self.transactions.lock().unwrap().push(Transaction {
            user_id: user_id.to_string(),
            model_id: model_id.to_string(),
            input_tokens,
            output_tokens,
            cost,
        });
        Ok(())
    }
}

/// Foundry double serving a fixed snapshot.
pub struct StaticFoundry {
    pub models: Vec<ModelDefinition>,
}

#[async_trait]
impl ModelFoundryClient for StaticFoundry {
    async fn list_custom_models(
        &self,
        domain: Option<&str>,
    ) -> anyhow::Result<Vec<ModelDefinition>> {
        Ok(self
            .models
            .iter()
            .filter(|m| domain.is_none_or(|d| m.matches_domain(d)))
            .cloned()
            .collect())
    }
}
