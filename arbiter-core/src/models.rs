//! # Model and Chat Types
//!
//! This module defines the core data structures shared across the routing
//! pipeline: the model catalog types consumed by the registry and router,
//! the routing context produced by the classifier, and the chat completion
//! wire types exchanged with upstream invokers.
//!
//! ## Overview
//!
//! - **ModelTier**: ordered capability levels used as the router's primary
//!   selection axis
//! - **ModelDefinition**: an immutable catalog entry for one upstream model
//! - **RoutingContext**: the classifier's verdict on a prompt
//! - **Chat types**: `Message`, `Role`, `ChatResponse`, `Choice`, `Usage`
//!
//! ## Example
//!
//! ```rust
//! use arbiter_core::models::{Message, ModelDefinition, ModelTier};
//!
//! let model = ModelDefinition::new("azure/gpt-4o", "azure", ModelTier::Reasoning)
//!     .with_costs(0.005, 0.015);
//!
//! let messages = vec![
//!     Message::system("You are a helpful assistant."),
//!     Message::user("Hello!"),
//! ];
//! ```

use serde::{Deserialize, Serialize};

/// Capability level of a model.
///
/// Tiers are ordered: `Fast < Smart < Reasoning`. A higher tier expresses
/// more capability and, typically, more cost. The router uses the tier as
/// its primary selection axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelTier {
    /// Cheapest, least capable tier
    Fast,
    /// Mid-range tier for moderately complex prompts
    Smart,
    /// Most capable tier, reserved for hard or safety-critical prompts
    Reasoning,
}

impl std::fmt::Display for ModelTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelTier::Fast => write!(f, "fast"),
            ModelTier::Smart => write!(f, "smart"),
            ModelTier::Reasoning => write!(f, "reasoning"),
        }
    }
}

/// Catalog entry describing one upstream model.
///
/// Definitions are immutable by convention: the registry replaces a
/// definition wholesale on re-registration, nothing mutates one in place.
/// The `provider` string is the failure domain for health tracking; models
/// sharing a provider fail together under an outage.
///
/// # Example
///
/// ```rust
/// use arbiter_core::models::{ModelDefinition, ModelTier};
///
/// let medical = ModelDefinition::new("medical-x", "modal", ModelTier::Reasoning)
///     .with_costs(0.01, 0.03)
///     .with_domain("medical");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDefinition {
    /// Stable identifier, unique within the registry (e.g. `"azure/gpt-4o"`)
    pub id: String,
    /// Failure domain for health tracking (e.g. `"azure"`)
    pub provider: String,
    /// Capability tier
    pub tier: ModelTier,
    /// Cost units per 1 000 input tokens
    #[serde(default)]
    pub cost_per_1k_input: f64,
    /// Cost units per 1 000 output tokens
    #[serde(default)]
    pub cost_per_1k_output: f64,
    /// Static health bit set at registration time; distinct from the
    /// health tracker's dynamic view
    #[serde(default = "default_healthy")]
    pub is_healthy: bool,
    /// Optional specialization tag used for domain-priority routing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
}

fn default_healthy() -> bool {
    true
}

impl ModelDefinition {
    /// Create a definition with zero costs, healthy, and no domain tag.
    pub fn new(
        id: impl Into<String>,
        provider: impl Into<String>,
        tier: ModelTier,
    ) -> Self {
        Self {
            id: id.into(),
            provider: provider.into(),
            tier,
            cost_per_1k_input: 0.0,
            cost_per_1k_output: 0.0,
            is_healthy: true,
            domain: None,
        }
    }

    /// Set the per-1k-token costs.
    pub fn with_costs(mut self, input: f64, output: f64) -> Self {
        self.cost_per_1k_input = input;
        self.cost_per_1k_output = output;
        self
    }

    /// Tag the model with a specialization domain.
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Set the static health bit.
    pub fn with_health(mut self, healthy: bool) -> Self {
        self.is_healthy = healthy;
        self
    }

    /// Compute the cost of a completed request from its token usage.
    ///
    /// Pure function of the definition and the usage: no state is read or
    /// written. `cost = prompt/1000 * input_rate + completion/1000 * output_rate`.
    pub fn cost_of(&self, usage: &Usage) -> f64 {
        (usage.prompt_tokens as f64 / 1000.0) * self.cost_per_1k_input
            + (usage.completion_tokens as f64 / 1000.0) * self.cost_per_1k_output
    }

    /// Whether the model's domain tag matches `domain`, case-insensitively.
    /// Models without a domain tag never match.
    pub fn matches_domain(&self, domain: &str) -> bool {
        self.domain
            .as_deref()
            .is_some_and(|d| d.eq_ignore_ascii_case(domain))
    }
}

/// The classifier's verdict on a prompt.
///
/// `complexity` is guaranteed to lie in `[0, 1]`; construction clamps out
/// of range values. A context lives for one request and is discarded when
/// the response is produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutingContext {
    complexity: f64,
    domain: Option<String>,
}

impl RoutingContext {
    /// Build a context, clamping `complexity` into `[0, 1]`.
    pub fn new(complexity: f64, domain: Option<String>) -> Self {
        Self {
            complexity: complexity.clamp(0.0, 1.0),
            domain,
        }
    }

    /// Complexity score in `[0, 1]`.
    pub fn complexity(&self) -> f64 {
        self.complexity
    }

    /// Detected specialization domain, if any.
    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }
}

/// A message in a conversation.
///
/// # Example
///
/// ```rust
/// let user_msg = Message::user("Hello, how are you?");
/// let system_msg = Message::system("You are a helpful assistant.");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message sender
    pub role: Role,
    /// Content of the message
    pub content: String,
}

impl Message {
    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

/// Role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions and context
    System,
    /// User input and questions
    User,
    /// AI assistant responses
    Assistant,
    /// Tool function results
    Tool,
}

/// Chat completion response returned by an upstream invoker.
///
/// The body is provider-payload-compatible; the executor only inspects
/// `usage` for accounting and forwards everything else untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Unique identifier for the completion
    pub id: String,
    /// Object type (always `"chat.completion"`)
    pub object: String,
    /// Unix timestamp of creation
    pub created: u64,
    /// Model that produced the completion
    pub model: String,
    /// Generated completions
    pub choices: Vec<Choice>,
    /// Token usage statistics; absent when the upstream omits them
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

/// A generated completion choice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Choice {
    /// Index of the choice in the response
    pub index: u32,
    /// The generated message
    pub message: Message,
    /// Reason why generation stopped
    pub finish_reason: Option<String>,
}

/// Token usage statistics for one completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_ordering() {
        assert!(ModelTier::Fast < ModelTier::Smart);
        assert!(ModelTier::Smart < ModelTier::Reasoning);
    }

    #[test]
    fn test_message_constructors() {
        let user_msg = Message::user("Hello, world!");
        assert_eq!(user_msg.role, Role::User);
        assert_eq!(user_msg.content, "Hello, world!");

        let assistant_msg = Message::assistant("Hi there!");
        assert_eq!(assistant_msg.role, Role::Assistant);

        let system_msg = Message::system("You are a helpful assistant.");
        assert_eq!(system_msg.role, Role::System);
    }

    #[test]
    fn test_routing_context_clamps_complexity() {
        assert_eq!(RoutingContext::new(1.7, None).complexity(), 1.0);
        assert_eq!(RoutingContext::new(-0.2, None).complexity(), 0.0);
        assert_eq!(RoutingContext::new(0.5, None).complexity(), 0.5);
    }

    #[test]
    fn test_cost_of_usage() {
        let model = ModelDefinition::new("m", "p", ModelTier::Smart).with_costs(0.005, 0.015);
        let usage = Usage {
            prompt_tokens: 2000,
            completion_tokens: 1000,
            total_tokens: 3000,
        };
        let cost = model.cost_of(&usage);
        assert!((cost - (0.01 + 0.015)).abs() < 1e-12);
    }

    #[test]
    fn test_domain_match_is_case_insensitive() {
        let model = ModelDefinition::new("m", "p", ModelTier::Fast).with_domain("Medical");
        assert!(model.matches_domain("medical"));
        assert!(model.matches_domain("MEDICAL"));
        assert!(!model.matches_domain("legal"));

        let untagged = ModelDefinition::new("g", "p", ModelTier::Fast);
        assert!(!untagged.matches_domain("medical"));
    }

    #[test]
    fn test_tier_serde_strings() {
        assert_eq!(serde_json::to_string(&ModelTier::Fast).unwrap(), "\"fast\"");
        assert_eq!(
            serde_json::from_str::<ModelTier>("\"reasoning\"").unwrap(),
            ModelTier::Reasoning
        );
    }
}
