//! # Gateway Configuration
//!
//! TOML-backed configuration for the Arbiter gateway binary: server
//! binding, the startup model catalog, the upstream endpoint, fail-open
//! fallback settings and the process-local budget ledger.
//!
//! # Example
//!
//! ```toml
//! [server]
//! host = "127.0.0.1"
//! port = 3000
//! timeout_secs = 60
//!
//! [upstream]
//! base_url = "https://llm-proxy.internal/v1"
//! timeout_secs = 120
//!
//! [fallback]
//! model = "azure/gpt-4o"
//! cost_per_1k_input = 0.005
//! cost_per_1k_output = 0.015
//!
//! [budget]
//! enabled = true
//! default_allowance = 25.0
//!
//! [[models]]
//! id = "azure/gpt-4o-mini"
//! provider = "azure"
//! tier = "fast"
//! cost_per_1k_input = 0.00015
//! cost_per_1k_output = 0.0006
//! ```

use arbiter_core::models::ModelDefinition;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the gateway binary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Upstream invoker settings
    pub upstream: UpstreamConfig,
    /// Fail-open fallback settings
    #[serde(default)]
    pub fallback: FallbackConfig,
    /// Process-local budget ledger settings
    #[serde(default)]
    pub budget: BudgetConfig,
    /// Models registered into the catalog at startup
    #[serde(default)]
    pub models: Vec<ModelDefinition>,
}

/// HTTP server binding and timeout settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            timeout_secs: 120,
        }
    }
}

impl ServerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Settings for the OpenAI-compatible upstream endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL of the completion endpoint (e.g. `https://proxy/v1`)
    pub base_url: String,
    /// API key forwarded as a bearer token, if the upstream requires one
    #[serde(default)]
    pub api_key: Option<String>,
    /// Request timeout in seconds
    #[serde(default = "default_upstream_timeout")]
    pub timeout_secs: u64,
}

fn default_upstream_timeout() -> u64 {
    120
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Fail-open fallback model and its estimated pricing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackConfig {
    /// Fallback model id; `None` defers to the `FALLBACK_MODEL`
    /// environment variable and its built-in default
    #[serde(default)]
    pub model: Option<String>,
    pub cost_per_1k_input: f64,
    pub cost_per_1k_output: f64,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            model: None,
            cost_per_1k_input: 0.005,
            cost_per_1k_output: 0.015,
        }
    }
}

/// Process-local budget ledger settings.
///
/// When enabled, every user starts with `default_allowance` cost units;
/// admission, economy mode and deduction run against the in-memory
/// ledger. Disable to run without budget enforcement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetConfig {
    pub enabled: bool,
    pub default_allowance: f64,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            default_allowance: 100.0,
        }
    }
}

impl Config {
    /// Load and parse a configuration file.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Validate constraints the type system cannot express.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.host.is_empty() {
            anyhow::bail!("server host cannot be empty");
        }
        if self.server.port == 0 {
            anyhow::bail!("server port must be between 1 and 65535");
        }
        if !self.upstream.base_url.starts_with("http://")
            && !self.upstream.base_url.starts_with("https://")
        {
            anyhow::bail!("invalid upstream base url: {}", self.upstream.base_url);
        }
        if self.upstream.timeout_secs == 0 {
            anyhow::bail!("upstream timeout cannot be 0");
        }

        for model in &self.models {
            if model.id.is_empty() {
                anyhow::bail!("model id cannot be empty");
            }
            if model.provider.is_empty() {
                anyhow::bail!("model provider cannot be empty for model: {}", model.id);
            }
            if model.cost_per_1k_input < 0.0 || model.cost_per_1k_output < 0.0 {
                anyhow::bail!("model costs cannot be negative for model: {}", model.id);
            }
        }

        if self.budget.enabled && self.budget.default_allowance <= 0.0 {
            anyhow::bail!("default allowance must be positive when the budget is enabled");
        }

        Ok(())
    }
}
