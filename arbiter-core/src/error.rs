//! # Error Handling Module
//!
//! This module defines the closed error taxonomy for the routing core.
//!
//! ## Overview
//!
//! Two layers, mirroring the split between the upstream boundary and the
//! pipeline itself:
//!
//! - **InvokerError**: errors raised by an upstream invoker. The
//!   availability kinds (rate limit, service unavailable, connection,
//!   timeout) are *retriable*: the executor records them against the
//!   provider's health and excludes the provider for the rest of the
//!   request. Every other kind is returned to the retry loop without
//!   penalizing the provider.
//! - **ArbiterError**: pipeline-level failures surfaced to the caller:
//!   admission denials, routing dead-ends, and the terminal chained
//!   failure after fail-open gives up.
//!
//! The retriable/non-retriable distinction is expressed structurally via
//! [`InvokerError::is_retriable`]; callers must never string-match.
//!
//! ## Example
//!
//! ```rust
//! use arbiter_core::error::{ArbiterError, InvokerError};
//!
//! fn describe(err: &ArbiterError) -> &'static str {
//!     match err {
//!         ArbiterError::BudgetExceeded { .. } => "denied",
//!         ArbiterError::NoHealthyModel { .. } => "routing dead-end",
//!         ArbiterError::Invoker(e) if e.is_retriable() => "transient upstream",
//!         _ => "other",
//!     }
//! }
//! ```

use crate::models::ModelTier;
use thiserror::Error;

/// Errors raised by an upstream invoker.
///
/// This is a closed, inspectable set: the executor's failover policy is
/// driven entirely by the variant, never by message contents.
#[derive(Error, Debug)]
pub enum InvokerError {
    /// Upstream rate limit exceeded (availability, retriable)
    #[error("rate limit exceeded")]
    RateLimit,

    /// Upstream service temporarily unavailable (availability, retriable)
    #[error("service unavailable")]
    ServiceUnavailable,

    /// Connection-level failure reaching the upstream (availability, retriable)
    #[error("connection error: {message}")]
    Connection { message: String },

    /// Upstream request timed out (availability, retriable)
    #[error("request timed out")]
    Timeout,

    /// Upstream API rejected the request with a status code
    #[error("api error: {code} - {message}")]
    Api { code: u16, message: String },

    /// Client-side bad request; switching providers will not help
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },

    /// Response payload could not be decoded
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl InvokerError {
    /// Whether this error is an *availability* error.
    ///
    /// Availability errors drive the failover policy: the executor records
    /// a health failure for the provider and excludes it within the
    /// current request. All other kinds leave the provider untouched.
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            InvokerError::RateLimit
                | InvokerError::ServiceUnavailable
                | InvokerError::Connection { .. }
                | InvokerError::Timeout
        )
    }
}

/// Pipeline-level errors surfaced to the caller of the executor.
#[derive(Error, Debug)]
pub enum ArbiterError {
    /// Budget service explicitly denied admission; not retried
    #[error("budget exceeded for user {user_id}")]
    BudgetExceeded { user_id: String },

    /// Budget admission call itself failed; the only fail-closed point
    #[error("budget check unavailable")]
    BudgetUnavailable {
        #[source]
        source: anyhow::Error,
    },

    /// Router found no healthy candidate at the target tier
    #[error("no healthy models available for tier {tier}")]
    NoHealthyModel { tier: ModelTier },

    /// Upstream invoker failure that ended the request
    #[error(transparent)]
    Invoker(#[from] InvokerError),

    /// Retry loop and fail-open both failed.
    ///
    /// Surfaces the last in-loop error; the fail-open failure is chained
    /// as the source for observability.
    #[error("all attempts failed, last error: {last}")]
    Exhausted {
        last: Box<ArbiterError>,
        #[source]
        fail_open: InvokerError,
    },

    /// Client was assembled without a required component
    #[error("configuration error: {message}")]
    Configuration { message: String },
}
