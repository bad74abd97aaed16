//! Process-wide model registry.
//!
//! Models are write-rarely, read-often: registered at startup (or when
//! a definition reloads) and looked up on every compilation. Readers
//! observe either the old or the new model, never a partial one.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use crate::model::Model;

/// Registry mapping model name to its initialized model.
#[derive(Debug, Default)]
pub struct ModelRegistry {
    models: DashMap<String, Arc<Model>>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace a model under its own name.
    pub fn register(&self, model: Model) -> Arc<Model> {
        let model = Arc::new(model);
        debug!(model = %model.name, "model registered");
        self.models.insert(model.name.clone(), model.clone());
        model
    }

    pub fn get(&self, name: &str) -> Option<Arc<Model>> {
        self.models.get(name).map(|entry| entry.value().clone())
    }

    pub fn remove(&self, name: &str) -> Option<Arc<Model>> {
        self.models.remove(name).map(|(_, model)| model)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Names of all registered models.
    pub fn names(&self) -> Vec<String> {
        self.models.iter().map(|entry| entry.key().clone()).collect()
    }
}
