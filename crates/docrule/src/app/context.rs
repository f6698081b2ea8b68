//! Context windows around located selections.

use serde::Serialize;

use crate::app::locate::Locator;
use crate::domain::model::{Selection, Span};
use crate::infra::config::Config;

/// Default number of context words (before plus after) around a selection.
pub const DEFAULT_RADIUS: usize = 10;

/// A maximal run of non-whitespace characters and its byte span in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Word<'a> {
    pub text: &'a str,
    pub span: Span,
}

/// Split `text` into words, keeping the original byte offsets.
pub fn tokenize(text: &str) -> Vec<Word<'_>> {
    let mut words = Vec::new();
    let mut open: Option<usize> = None;

    for (idx, ch) in text.char_indices() {
        match (ch.is_whitespace(), open) {
            (true, Some(start)) => {
                words.push(word(text, start, idx));
                open = None;
            }
            (false, None) => open = Some(idx),
            _ => {}
        }
    }
    if let Some(start) = open {
        words.push(word(text, start, text.len()));
    }

    words
}

fn word(text: &str, start: usize, end: usize) -> Word<'_> {
    Word {
        text: &text[start..end],
        span: Span::new(start, end),
    }
}

/// Number of words taken on each side of the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextWindow {
    pub before: usize,
    pub after: usize,
}

impl Default for ContextWindow {
    fn default() -> Self {
        Self::from_radius(DEFAULT_RADIUS)
    }
}

impl ContextWindow {
    /// Split a total word budget between both sides; odd budgets give the extra word to `after`.
    pub fn from_radius(radius: usize) -> Self {
        let before = radius / 2;
        Self {
            before,
            after: radius - before,
        }
    }

    pub fn asymmetric(before: usize, after: usize) -> Self {
        Self { before, after }
    }
}

/// Context extracted for a selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Context {
    /// Original source text covering the window, or the raw selection when it was not located.
    pub text: String,
    /// Span of the window in the source.
    pub span: Option<Span>,
    /// Span of the selection itself in the source.
    pub selection: Option<Span>,
}

impl Context {
    fn unlocated(selection: &str) -> Self {
        Self {
            text: selection.to_string(),
            span: None,
            selection: None,
        }
    }

    pub fn is_located(&self) -> bool {
        self.span.is_some()
    }

    /// The context as a list of words.
    pub fn words(&self) -> Vec<&str> {
        self.text.split_whitespace().collect()
    }
}

/// Expands located selections into word windows of the source text.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextExtractor {
    locator: Locator,
    window: ContextWindow,
}

impl ContextExtractor {
    pub fn new(locator: Locator, window: ContextWindow) -> Self {
        Self { locator, window }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Locator::from_config(config),
            ContextWindow::from_radius(config.extraction.context_radius),
        )
    }

    pub fn window(&self) -> ContextWindow {
        self.window
    }

    pub fn with_window(mut self, window: ContextWindow) -> Self {
        self.window = window;
        self
    }

    /// Extract context using the configured window.
    pub fn extract(&self, full_text: &str, selection: &Selection) -> Context {
        self.extract_with(full_text, selection, self.window)
    }

    /// Extract context with an explicit window. Never fails: a selection that cannot be
    /// located is returned unchanged as its own context.
    pub fn extract_with(
        &self,
        full_text: &str,
        selection: &Selection,
        window: ContextWindow,
    ) -> Context {
        let Some(located) = self.locator.locate_selection(full_text, selection) else {
            tracing::debug!(
                selection_len = selection.text.len(),
                "selection not located, using it as its own context"
            );
            return Context::unlocated(&selection.text);
        };

        let words = tokenize(full_text);
        let Some(first) = words.iter().position(|w| w.span.end > located.start) else {
            return Context::unlocated(&selection.text);
        };

        let last_word = words.len() - 1;
        let selected_words = selection.text.split_whitespace().count().max(1);
        let last = (first + selected_words - 1).min(last_word);

        let from = first.saturating_sub(window.before);
        let to = last.saturating_add(window.after).min(last_word);
        let span = Span::new(words[from].span.start, words[to].span.end);

        Context {
            text: span.slice(full_text).to_string(),
            span: Some(span),
            selection: Some(located),
        }
    }
}

/// Context for `selected` with `radius` words split around it.
pub fn extract_context(full_text: &str, selected: &str, radius: usize) -> String {
    ContextExtractor::default()
        .extract_with(
            full_text,
            &Selection::new(selected),
            ContextWindow::from_radius(radius),
        )
        .text
}
