//! Draft persistence
//!
//! `DraftStore` keeps the in-memory draft and its durable copy in step.

pub mod record;
pub mod store;

pub use record::{Draft, PostingKind};
pub use store::{DurableStore, FileStore, MemoryStore, StoreError};

use serde_json::Value;
use std::sync::Arc;

/// The draft for one workflow kind, auto-saved on every update
pub struct DraftStore {
    key: String,
    draft: Draft,
    store: Arc<dyn DurableStore>,
}

impl DraftStore {
    pub fn new(store: Arc<dyn DurableStore>, key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            draft: Draft::new(),
            store,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn is_empty(&self) -> bool {
        self.draft.is_empty()
    }

    /// Load the last saved draft. Returns whether anything was restored.
    pub fn hydrate(&mut self) -> Result<bool, StoreError> {
        let Some(saved) = self.store.get(&self.key)? else {
            return Ok(false);
        };
        match Draft::from_value(saved) {
            Some(draft) => {
                self.draft = draft;
                tracing::info!("Restored draft '{}' ({} top-level fields)", self.key, self.draft.as_map().len());
                Ok(true)
            }
            None => {
                tracing::warn!("Ignoring saved draft '{}': not a JSON object", self.key);
                Ok(false)
            }
        }
    }

    /// Deep-merge `partial` and save
    pub fn update(&mut self, partial: Value) -> Result<(), StoreError> {
        let Value::Object(patch) = partial else {
            return Err(StoreError::NotAnObject);
        };
        let mut merged = self.draft.clone();
        merged.merge(&patch);
        self.store.set(&self.key, &merged.to_value())?;
        self.draft = merged;
        Ok(())
    }

    /// Write the current draft to durable storage
    pub fn persist(&self) -> Result<(), StoreError> {
        self.store.set(&self.key, &self.draft.to_value())
    }

    /// Drop the draft after a successful submission
    pub fn clear(&mut self) -> Result<(), StoreError> {
        tracing::info!("Clearing submitted draft '{}'", self.key);
        self.wipe()
    }

    /// Drop the draft at the user's request
    pub fn discard(&mut self) -> Result<(), StoreError> {
        tracing::info!("Discarding draft '{}'", self.key);
        self.wipe()
    }

    fn wipe(&mut self) -> Result<(), StoreError> {
        self.draft = Draft::new();
        self.store.remove(&self.key)
    }
}
