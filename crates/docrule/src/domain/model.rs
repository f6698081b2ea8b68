//! Domain models for selections, labeled examples, and rules.

use serde::{Deserialize, Serialize};

/// Half-open byte range `[start, end)` into a source text.
///
/// Both offsets always fall on UTF-8 character boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start: start.min(end),
            end: start.max(end),
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns whether `other` lies entirely inside this span.
    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Borrow the covered text. Panics if the span is out of range for `text`.
    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..self.end]
    }
}

/// A mouse selection reported by the host UI.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Selection {
    pub text: String,
    /// Approximate byte offset of the selection, used to pick between repeated occurrences.
    #[serde(default)]
    pub approx_offset: Option<usize>,
}

impl Selection {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            approx_offset: None,
        }
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.approx_offset = Some(offset);
        self
    }

    /// Returns whether the selection holds anything besides whitespace.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// A confirmed selection the user has named.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledExample {
    pub label: String,
    pub value: String,
    pub context: String,
}

impl LabeledExample {
    /// Context split into whitespace separated words.
    pub fn context_words(&self) -> Vec<&str> {
        self.context.split_whitespace().collect()
    }
}

/// Rule returned by the pattern generation backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedRule {
    pub id: u64,
    pub user_id: u64,
    pub document_id: u64,
    pub name: String,
    #[serde(default)]
    pub is_section: bool,
    pub pattern: String,
    pub created_at: String,
}

/// Named collection of finalized rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub name: String,
    pub rules: Vec<String>,
}
