//! Checklist gate
//!
//! Named attestations the user ticks off before submitting. Only required
//! items decide whether the gate is satisfied.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChecklistError {
    #[error("Unknown checklist item: {0}")]
    UnknownItem(String),
}

/// One attestation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    pub label: String,
    pub required: bool,
    pub checked: bool,
}

/// Required and optional attestations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checklist {
    items: BTreeMap<String, ChecklistItem>,
}

impl Checklist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a required item, initially unchecked
    pub fn required(mut self, name: &str, label: &str) -> Self {
        self.insert(name, label, true);
        self
    }

    /// Add an optional item, initially unchecked
    pub fn optional(mut self, name: &str, label: &str) -> Self {
        self.insert(name, label, false);
        self
    }

    fn insert(&mut self, name: &str, label: &str, required: bool) {
        self.items.insert(
            name.to_string(),
            ChecklistItem {
                label: label.to_string(),
                required,
                checked: false,
            },
        );
    }

    /// Recording-readiness checks shown before the camera step
    pub fn video_profile() -> Self {
        Self::new()
            .required("lighting", "My face is well lit and clearly visible")
            .required("quiet", "I am in a quiet place without background noise")
            .required("framing", "The camera is at eye level and I am centred in frame")
            .required("consent", "I agree that employers may view this video")
            .optional("script", "I have prepared talking points")
    }

    /// Tick or untick an item
    pub fn set_item(&mut self, name: &str, value: bool) -> Result<(), ChecklistError> {
        let item = self
            .items
            .get_mut(name)
            .ok_or_else(|| ChecklistError::UnknownItem(name.to_string()))?;
        item.checked = value;
        tracing::debug!("Checklist item '{}' set to {}", name, value);
        Ok(())
    }

    pub fn is_checked(&self, name: &str) -> Option<bool> {
        self.items.get(name).map(|i| i.checked)
    }

    /// True iff every required item is checked
    pub fn is_satisfied(&self) -> bool {
        self.items.values().filter(|i| i.required).all(|i| i.checked)
    }

    /// Required items still unchecked, in name order
    pub fn missing_required(&self) -> Vec<String> {
        self.items
            .iter()
            .filter(|(_, i)| i.required && !i.checked)
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn items(&self) -> impl Iterator<Item = (&str, &ChecklistItem)> {
        self.items.iter().map(|(name, item)| (name.as_str(), item))
    }

    /// Uncheck everything
    pub fn reset(&mut self) {
        for item in self.items.values_mut() {
            item.checked = false;
        }
    }
}
