//! # Provider Health Tracking
//!
//! Per-provider circuit breaker with a rolling failure window and a fixed
//! cooldown, used by the router to steer traffic away from providers that
//! are currently failing.
//!
//! ## Overview
//!
//! Each provider's breaker is either closed (healthy) or open (in
//! cooldown):
//!
//! - **Closed**: failures are appended to a rolling window. When strictly
//!   more than `failure_threshold` failures land inside `failure_window`,
//!   the breaker opens and the provider enters cooldown.
//! - **Open**: [`HealthTracker::is_healthy`] reports `false` until the
//!   cooldown elapses. The first health query after expiry closes the
//!   breaker lazily; a recorded success closes it immediately.
//!
//! There is no explicit half-open state: re-entry is probed by the next
//! request the router admits once the breaker has auto-closed.
//!
//! Entries are created lazily on first failure and age out through window
//! pruning and cooldown expiry; nothing deletes them explicitly.
//!
//! ## Example
//!
//! ```rust
//! use arbiter_core::health::HealthTracker;
//!
//! let tracker = HealthTracker::new();
//! tracker.record_failure("azure");
//! assert!(tracker.is_healthy("azure")); // one failure is not enough
//! ```
//!
//! Every operation is a single critical section: pruning, appending,
//! threshold evaluation and cooldown arming happen under one lock
//! acquisition per provider map access, and no I/O runs under the lock.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Configuration for the per-provider circuit breaker.
///
/// The defaults are the production constants; tests inject shorter
/// windows.
#[derive(Debug, Clone)]
pub struct HealthTrackerConfig {
    /// Rolling window within which failures are counted
    pub failure_window: Duration,
    /// Breaker opens when strictly more than this many failures are in the window
    pub failure_threshold: usize,
    /// How long an open breaker holds the provider unhealthy
    pub cooldown: Duration,
}

impl Default for HealthTrackerConfig {
    fn default() -> Self {
        Self {
            failure_window: Duration::from_secs(60),
            failure_threshold: 3,
            cooldown: Duration::from_secs(300),
        }
    }
}

#[derive(Debug, Default)]
struct ProviderHealth {
    /// Monotonically ordered failure instants inside the rolling window
    failures: VecDeque<Instant>,
    /// When set and in the future, the breaker is open
    cooldown_until: Option<Instant>,
}

/// Tracks dynamic provider health across all requests of the process.
///
/// One long-lived instance is shared by the router and executor; each
/// replica of the gateway maintains its own view.
pub struct HealthTracker {
    config: HealthTrackerConfig,
    providers: Mutex<HashMap<String, ProviderHealth>>,
}

impl Default for HealthTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthTracker {
    /// Create a tracker with the production constants.
    pub fn new() -> Self {
        Self::with_config(HealthTrackerConfig::default())
    }

    /// Create a tracker with explicit parameters.
    pub fn with_config(config: HealthTrackerConfig) -> Self {
        Self {
            config,
            providers: Mutex::new(HashMap::new()),
        }
    }

    /// Record a failure for `provider`.
    ///
    /// Prunes failures older than the window, appends the current instant,
    /// and opens the breaker when the remaining count exceeds the
    /// threshold.
    pub fn record_failure(&self, provider: &str) {
        let now = Instant::now();
        let mut providers = self.providers.lock().expect("health lock poisoned");
        let entry = providers.entry(provider.to_string()).or_default();

        while entry
            .failures
            .front()
            .is_some_and(|&t| now.duration_since(t) > self.config.failure_window)
        {
            entry.failures.pop_front();
        }
        entry.failures.push_back(now);

        let count = entry.failures.len();
        tracing::warn!(provider, count, "recorded provider failure");

        if count > self.config.failure_threshold {
            entry.cooldown_until = Some(now + self.config.cooldown);
            tracing::error!(
                provider,
                cooldown_secs = self.config.cooldown.as_secs(),
                "provider exceeded failure threshold, marked unhealthy"
            );
        }
    }

    /// Record a success for `provider`, resetting its breaker.
    ///
    /// Clears the failure window and any pending cooldown: a call that
    /// succeeds is proof the provider is back.
    pub fn record_success(&self, provider: &str) {
        let mut providers = self.providers.lock().expect("health lock poisoned");
        if let Some(entry) = providers.get_mut(provider) {
            entry.failures.clear();
            if entry.cooldown_until.take().is_some() {
                tracing::info!(provider, "provider recovered, marked healthy");
            }
        }
    }

    /// Whether `provider` is currently healthy.
    ///
    /// Providers with no recorded history are healthy. An elapsed cooldown
    /// is cleared here, lazily closing the breaker on the first query
    /// after expiry.
    pub fn is_healthy(&self, provider: &str) -> bool {
        let now = Instant::now();
        let mut providers = self.providers.lock().expect("health lock poisoned");
        let Some(entry) = providers.get_mut(provider) else {
            return true;
        };

        match entry.cooldown_until {
            Some(until) if now < until => false,
            Some(_) => {
                // Cooldown expired: close the breaker. Failure timestamps
                // are left to age out of the window naturally.
                entry.cooldown_until = None;
                tracing::info!(provider, "provider cooldown expired, marked healthy");
                true
            }
            None => true,
        }
    }
}
