//! Managing labeled examples collected from document selections.

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;
use crate::domain::model::LabeledExample;

/// All examples gathered under one label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEntry {
    pub label: String,
    #[serde(default)]
    pub is_section: bool,
    pub examples: Vec<LabeledExample>,
}

impl LabelEntry {
    /// Example values in insertion order.
    pub fn values(&self) -> Vec<String> {
        self.examples.iter().map(|e| e.value.clone()).collect()
    }

    /// Example contexts, aligned with [`LabelEntry::values`].
    pub fn contexts(&self) -> Vec<String> {
        self.examples.iter().map(|e| e.context.clone()).collect()
    }
}

/// Tracks labels and their examples for the current document view.
///
/// Labels keep insertion order. A label disappears once its last example is removed.
#[derive(Debug, Default, Clone)]
pub struct LabelBook {
    entries: Vec<LabelEntry>,
}

impl LabelBook {
    /// Create an empty book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of labels.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn labels(&self) -> &[LabelEntry] {
        &self.entries
    }

    pub fn get(&self, label: &str) -> Option<&LabelEntry> {
        self.entries.iter().find(|entry| entry.label == label.trim())
    }

    /// Append an example under `label`, creating the label when needed.
    ///
    /// Returns `Ok(None)` when the same value is already recorded for the label.
    pub fn add_example(
        &mut self,
        label: &str,
        value: impl Into<String>,
        context: impl Into<String>,
    ) -> Result<Option<LabeledExample>, DomainError> {
        let label = clean_label(label)?;
        let example = LabeledExample {
            label: label.clone(),
            value: value.into(),
            context: context.into(),
        };

        match self.position(&label) {
            Some(idx) => {
                let entry = &mut self.entries[idx];
                if entry.examples.iter().any(|e| e.value == example.value) {
                    tracing::debug!(label = %label, "duplicate example ignored");
                    return Ok(None);
                }
                entry.examples.push(example.clone());
            }
            None => self.entries.push(LabelEntry {
                label,
                is_section: false,
                examples: vec![example.clone()],
            }),
        }

        Ok(Some(example))
    }

    /// Replace the value of an existing example.
    ///
    /// Fails with [`DomainError::DuplicateExample`] when another example of the label already
    /// holds `value`.
    pub fn update_value(
        &mut self,
        label: &str,
        index: usize,
        value: impl Into<String>,
    ) -> Result<(), DomainError> {
        let value = value.into();
        let entry = self.entry_mut(label)?;
        if index >= entry.examples.len() {
            return Err(DomainError::ExampleOutOfRange {
                label: entry.label.clone(),
                index,
            });
        }
        let taken = entry
            .examples
            .iter()
            .enumerate()
            .any(|(i, e)| i != index && e.value == value);
        if taken {
            return Err(DomainError::DuplicateExample {
                label: entry.label.clone(),
                value,
            });
        }
        entry.examples[index].value = value;
        Ok(())
    }

    /// Remove one example, dropping the label when it was the last one.
    pub fn remove_example(
        &mut self,
        label: &str,
        index: usize,
    ) -> Result<LabeledExample, DomainError> {
        let idx = self
            .position(label)
            .ok_or_else(|| DomainError::UnknownLabel(label.trim().to_string()))?;

        let entry = &mut self.entries[idx];
        if index >= entry.examples.len() {
            return Err(DomainError::ExampleOutOfRange {
                label: entry.label.clone(),
                index,
            });
        }
        let removed = entry.examples.remove(index);
        if entry.examples.is_empty() {
            self.entries.remove(idx);
        }
        Ok(removed)
    }

    /// Remove a label and all of its examples. Returns `true` when the label existed.
    pub fn remove_label(&mut self, label: &str) -> bool {
        let original_len = self.entries.len();
        self.entries.retain(|entry| entry.label != label.trim());
        self.entries.len() != original_len
    }

    /// Flag a label as a document section rather than a single field.
    pub fn mark_section(&mut self, label: &str, is_section: bool) -> Result<(), DomainError> {
        self.entry_mut(label)?.is_section = is_section;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn position(&self, label: &str) -> Option<usize> {
        let label = label.trim();
        self.entries.iter().position(|entry| entry.label == label)
    }

    fn entry_mut(&mut self, label: &str) -> Result<&mut LabelEntry, DomainError> {
        let idx = self
            .position(label)
            .ok_or_else(|| DomainError::UnknownLabel(label.trim().to_string()))?;
        Ok(&mut self.entries[idx])
    }
}

fn clean_label(label: &str) -> Result<String, DomainError> {
    let trimmed = label.trim();
    if trimmed.is_empty() {
        Err(DomainError::EmptyLabel)
    } else {
        Ok(trimmed.to_string())
    }
}
