//! Highlighting documents with backend generated rule patterns.
//!
//! Patterns arrive in a dialect that spells end-of-input as `\Z`, which the `regex` crate does
//! not accept. They are remapped before compilation and matched globally over the text. The
//! result is a sequence of plain and highlighted segments; rendering is left to the caller.

use std::borrow::Cow;
use std::fmt::Write as _;

use regex::Regex;
use serde::Serialize;

use crate::domain::model::Span;
use crate::infra::config::Config;

/// A rule pattern, either as received from the backend or already compiled.
#[derive(Debug, Clone)]
pub enum HighlightPattern {
    Source(String),
    Compiled(Regex),
}

impl HighlightPattern {
    /// Compile the pattern, remapping backend dialect escapes first.
    pub fn compile(&self) -> Result<Regex, regex::Error> {
        match self {
            HighlightPattern::Source(source) => Regex::new(&remap_dialect(source)),
            HighlightPattern::Compiled(regex) => Ok(regex.clone()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            HighlightPattern::Source(source) => source,
            HighlightPattern::Compiled(regex) => regex.as_str(),
        }
    }
}

impl From<&str> for HighlightPattern {
    fn from(value: &str) -> Self {
        HighlightPattern::Source(value.to_string())
    }
}

impl From<String> for HighlightPattern {
    fn from(value: String) -> Self {
        HighlightPattern::Source(value)
    }
}

impl From<Regex> for HighlightPattern {
    fn from(value: Regex) -> Self {
        HighlightPattern::Compiled(value)
    }
}

/// Rewrite `\Z` escapes to `$`. An escaped backslash followed by `Z` is left alone.
pub fn remap_dialect(pattern: &str) -> Cow<'_, str> {
    if !pattern.contains(r"\Z") {
        return Cow::Borrowed(pattern);
    }

    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('Z') => out.push('$'),
            Some(next) => {
                out.push('\\');
                out.push(next);
            }
            None => out.push('\\'),
        }
    }
    Cow::Owned(out)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum Segment {
    Plain(String),
    Highlighted(String),
}

impl Segment {
    pub fn text(&self) -> &str {
        match self {
            Segment::Plain(text) | Segment::Highlighted(text) => text,
        }
    }

    pub fn is_highlighted(&self) -> bool {
        matches!(self, Segment::Highlighted(_))
    }
}

/// Class and inline style wrapped around highlighted segments when rendering markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightMarker {
    pub class: String,
    pub style: String,
}

impl HighlightMarker {
    pub fn from_config(config: &Config) -> Self {
        Self {
            class: config.highlight.class.clone(),
            style: config.highlight.style.clone(),
        }
    }
}

impl Default for HighlightMarker {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Text split into plain and highlighted segments. Concatenating the segments yields the
/// original text.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct HighlightedText {
    pub segments: Vec<Segment>,
}

impl HighlightedText {
    pub fn plain(text: &str) -> Self {
        Self::from_spans(text, &[])
    }

    /// Build segments from sorted, non-overlapping spans.
    fn from_spans(text: &str, spans: &[Span]) -> Self {
        let mut segments = Vec::with_capacity(spans.len() * 2 + 1);
        let mut cursor = 0;
        for span in spans {
            if span.start > cursor {
                segments.push(Segment::Plain(text[cursor..span.start].to_string()));
            }
            segments.push(Segment::Highlighted(span.slice(text).to_string()));
            cursor = span.end;
        }
        if cursor < text.len() {
            segments.push(Segment::Plain(text[cursor..].to_string()));
        }
        Self { segments }
    }

    pub fn text(&self) -> String {
        self.segments.iter().map(Segment::text).collect()
    }

    pub fn is_highlighted(&self) -> bool {
        self.segments.iter().any(Segment::is_highlighted)
    }

    /// Byte spans of highlighted segments within [`HighlightedText::text`].
    pub fn highlighted_spans(&self) -> Vec<Span> {
        let mut spans = Vec::new();
        let mut offset = 0;
        for segment in &self.segments {
            let len = segment.text().len();
            if segment.is_highlighted() {
                spans.push(Span::new(offset, offset + len));
            }
            offset += len;
        }
        spans
    }

    /// Apply another pattern on top of the existing highlights.
    ///
    /// New matches are merged with existing highlighted ranges, so re-applying a pattern never
    /// wraps the same text twice.
    pub fn apply(&self, pattern: Option<&HighlightPattern>) -> Self {
        let text = self.text();
        let Some(found) = find_highlights(&text, pattern) else {
            return self.clone();
        };

        let mut spans = self.highlighted_spans();
        spans.extend(found);
        Self::from_spans(&text, &merge_overlapping(spans))
    }

    /// Render HTML with highlighted segments wrapped in `<mark>`.
    pub fn to_markup(&self, marker: &HighlightMarker) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Plain(text) => out.push_str(&escape_html(text)),
                Segment::Highlighted(text) => {
                    let _ = write!(
                        out,
                        "<mark class=\"{}\" style=\"{}\">{}</mark>",
                        escape_html(&marker.class),
                        escape_html(&marker.style),
                        escape_html(text)
                    );
                }
            }
        }
        out
    }
}

/// Applies rule patterns to document text.
#[derive(Debug, Clone, Copy, Default)]
pub struct HighlightMapper;

impl HighlightMapper {
    pub fn new() -> Self {
        Self
    }

    /// Highlight every match of `pattern` in `text`. Missing or invalid patterns leave the text
    /// unhighlighted.
    pub fn apply(&self, text: &str, pattern: Option<&HighlightPattern>) -> HighlightedText {
        match find_highlights(text, pattern) {
            Some(spans) => HighlightedText::from_spans(text, &spans),
            None => HighlightedText::plain(text),
        }
    }
}

/// Compile `pattern` and collect its non-empty matches. `None` when there is nothing to apply.
fn find_highlights(text: &str, pattern: Option<&HighlightPattern>) -> Option<Vec<Span>> {
    let Some(pattern) = pattern else {
        tracing::debug!("no highlight pattern supplied");
        return None;
    };

    match pattern.compile() {
        Ok(regex) => Some(match_spans(text, &regex)),
        Err(err) => {
            tracing::warn!(pattern = pattern.as_str(), error = %err, "invalid highlight pattern");
            None
        }
    }
}

/// Left-to-right, non-overlapping matches of `regex`. Empty matches are skipped and the search
/// moves forward one character past them.
fn match_spans(text: &str, regex: &Regex) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut pos = 0;

    while pos <= text.len() {
        let Some(found) = regex.find_at(text, pos) else {
            break;
        };
        if found.start() == found.end() {
            pos = next_char_boundary(text, found.end());
            continue;
        }
        spans.push(Span::new(found.start(), found.end()));
        pos = found.end();
    }

    spans
}

fn next_char_boundary(text: &str, at: usize) -> usize {
    text[at..]
        .chars()
        .next()
        .map_or(text.len() + 1, |ch| at + ch.len_utf8())
}

/// Sort spans and merge the ones that strictly overlap. Touching spans stay separate.
fn merge_overlapping(mut spans: Vec<Span>) -> Vec<Span> {
    spans.retain(|span| !span.is_empty());
    spans.sort_by_key(|span| (span.start, span.end));

    let mut merged: Vec<Span> = Vec::with_capacity(spans.len());
    for span in spans {
        match merged.last_mut() {
            Some(last) if span.start < last.end => last.end = last.end.max(span.end),
            _ => merged.push(span),
        }
    }
    merged
}

fn escape_html(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 8);
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    Cow::Owned(out)
}
