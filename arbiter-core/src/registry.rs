//! # Model Registry
//!
//! In-memory catalog of candidate models keyed by stable model id.
//!
//! The registry is one of the two long-lived shared values of the pipeline
//! (the other being the health tracker). It is created once at process
//! startup and passed by reference into the router and executor; writers
//! serialize, readers receive consistent point-in-time snapshots.
//!
//! Snapshot order preserves insertion order, and that order is observable:
//! the router uses it as the deterministic tie-break when several
//! candidates survive filtering. Re-registering an id replaces the
//! definition in place without moving it.

use crate::models::{ModelDefinition, ModelTier};
use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Default)]
struct RegistryInner {
    /// Definitions in insertion order
    models: Vec<ModelDefinition>,
    /// id -> slot in `models`
    index: HashMap<String, usize>,
}

/// Thread-safe catalog of candidate models.
///
/// All operations are total; there are no failure modes. Locks are held
/// for bounded, non-blocking critical sections only.
///
/// # Example
///
/// ```rust
/// use arbiter_core::models::{ModelDefinition, ModelTier};
/// use arbiter_core::registry::ModelRegistry;
///
/// let registry = ModelRegistry::new();
/// registry.register(ModelDefinition::new("azure/gpt-4o", "azure", ModelTier::Reasoning));
/// assert!(registry.get("azure/gpt-4o").is_some());
/// ```
#[derive(Default)]
pub struct ModelRegistry {
    inner: RwLock<RegistryInner>,
}

impl ModelRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model, upserting by id.
    ///
    /// A model with the same id is replaced; its position in the snapshot
    /// order is retained.
    pub fn register(&self, model: ModelDefinition) {
        let mut inner = self.inner.write().expect("registry lock poisoned");
        if let Some(&slot) = inner.index.get(&model.id) {
            tracing::debug!(id = %model.id, tier = %model.tier, "replacing registered model");
            inner.models[slot] = model;
        } else {
            tracing::debug!(id = %model.id, tier = %model.tier, "registered model");
            let slot = inner.models.len();
            inner.index.insert(model.id.clone(), slot);
            inner.models.push(model);
        }
    }

    /// Retrieve a model by id.
    pub fn get(&self, model_id: &str) -> Option<ModelDefinition> {
        let inner = self.inner.read().expect("registry lock poisoned");
        inner
            .index
            .get(model_id)
            .map(|&slot| inner.models[slot].clone())
    }

    /// List models, optionally filtered by tier and/or domain.
    ///
    /// Filters are ANDed. Domain comparison is case-insensitive; models
    /// without a domain tag never match a domain filter. The returned
    /// vector is a snapshot in insertion order; callers iterate it without
    /// holding any lock.
    pub fn list(&self, tier: Option<ModelTier>, domain: Option<&str>) -> Vec<ModelDefinition> {
        let inner = self.inner.read().expect("registry lock poisoned");
        inner
            .models
            .iter()
            .filter(|m| tier.is_none_or(|t| m.tier == t))
            .filter(|m| domain.is_none_or(|d| m.matches_domain(d)))
            .cloned()
            .collect()
    }

    /// Number of registered models.
    pub fn len(&self) -> usize {
        self.inner.read().expect("registry lock poisoned").models.len()
    }

    /// Whether the registry holds no models.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Empty the registry. Test affordance.
    pub fn clear(&self) {
        let mut inner = self.inner.write().expect("registry lock poisoned");
        inner.models.clear();
        inner.index.clear();
        tracing::debug!("model registry cleared");
    }
}
