//! # Prompt Classifier
//!
//! Lightweight heuristic classification of prompt text into a
//! [`RoutingContext`]. The classifier is pure and deterministic; it adds
//! no measurable latency to the request path and performs no I/O.
//!
//! Complexity is a two-level score: 0.9 when the prompt is long or carries
//! an analysis keyword, 0.1 otherwise. The optional domain tag is assigned
//! by the first matching rule of an ordered list; `safety_critical` is
//! checked before `medical` so that a prompt mentioning both is escalated
//! rather than de-escalated.

use crate::models::RoutingContext;
use once_cell::sync::Lazy;
use regex::Regex;

/// Prompts longer than this many characters score high complexity.
const COMPLEXITY_LENGTH_THRESHOLD: usize = 2000;

const COMPLEXITY_HIGH: f64 = 0.9;
const COMPLEXITY_LOW: f64 = 0.1;

/// Whole-word analysis keywords that force high complexity.
static COMPLEXITY_KEYWORDS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(analyze|critique|reason)\b").expect("static pattern"));

/// Ordered domain rules; the first match wins.
static DOMAIN_RULES: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    vec![
        (
            "safety_critical",
            Regex::new(r"(?i)\b(hazard|emergency|danger|immediate|adverse event)\b")
                .expect("static pattern"),
        ),
        (
            "medical",
            Regex::new(r"(?i)\b(clinical|dose)\b").expect("static pattern"),
        ),
    ]
});

/// Maps prompt text to a routing context.
///
/// # Example
///
/// ```rust
/// use arbiter_core::classifier::Classifier;
///
/// let ctx = Classifier.classify("Analyze this clinical data.");
/// assert_eq!(ctx.complexity(), 0.9);
/// assert_eq!(ctx.domain(), Some("medical"));
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct Classifier;

impl Classifier {
    /// Classify `text` into a complexity score and an optional domain tag.
    ///
    /// Pure and referentially transparent: equal inputs always produce
    /// equal contexts. Empty input yields `{0.1, None}`.
    pub fn classify(&self, text: &str) -> RoutingContext {
        let is_long = text.chars().count() > COMPLEXITY_LENGTH_THRESHOLD;
        let has_keywords = COMPLEXITY_KEYWORDS.is_match(text);

        let complexity = if is_long || has_keywords {
            COMPLEXITY_HIGH
        } else {
            COMPLEXITY_LOW
        };

        let domain = DOMAIN_RULES
            .iter()
            .find(|(_, pattern)| pattern.is_match(text))
            .map(|(name, _)| (*name).to_string());

        tracing::debug!(
            length = text.len(),
            has_keywords,
            complexity,
            domain = domain.as_deref().unwrap_or("-"),
            "classified prompt"
        );

        RoutingContext::new(complexity, domain)
    }
}
