//! Locating browser selections inside the original source text.
//!
//! Rendered markdown/HTML collapses whitespace, so the text a user selects rarely matches the
//! source byte for byte. Lookup first tries a verbatim match and then falls back to a
//! whitespace-tolerant search anchored on a bounded prefix of the selection.

use regex::Regex;

use crate::domain::model::{Selection, Span};
use crate::infra::config::Config;

/// Default number of selection characters used to build the search anchor.
pub const DEFAULT_ANCHOR_CHARS: usize = 70;

/// Finds selections in a source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Locator {
    anchor_chars: usize,
}

impl Default for Locator {
    fn default() -> Self {
        Self::new(DEFAULT_ANCHOR_CHARS)
    }
}

impl Locator {
    /// Create a locator whose fuzzy anchor spans at most `anchor_chars` characters.
    pub fn new(anchor_chars: usize) -> Self {
        Self {
            anchor_chars: anchor_chars.max(1),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.extraction.anchor_chars)
    }

    pub fn anchor_chars(&self) -> usize {
        self.anchor_chars
    }

    /// Locate `selected` in `full_text`, returning its byte span.
    pub fn locate(&self, full_text: &str, selected: &str) -> Option<Span> {
        self.locate_near(full_text, selected, None)
    }

    /// Locate a [`Selection`], preferring the occurrence closest to its offset hint.
    pub fn locate_selection(&self, full_text: &str, selection: &Selection) -> Option<Span> {
        self.locate_near(full_text, &selection.text, selection.approx_offset)
    }

    fn locate_near(&self, full_text: &str, selected: &str, hint: Option<usize>) -> Option<Span> {
        let trimmed = selected.trim();
        if trimmed.is_empty() || full_text.is_empty() {
            return None;
        }

        let verbatim = full_text.match_indices(selected).map(|(idx, _)| idx);
        if let Some(start) = nearest(verbatim, hint) {
            return Some(Span::new(start, start + selected.len()));
        }

        let anchor = match anchor_pattern(trimmed, self.anchor_chars) {
            Ok(anchor) => anchor,
            Err(err) => {
                tracing::warn!(error = %err, "failed to build selection anchor");
                return None;
            }
        };

        let start = nearest(anchor.find_iter(full_text).map(|m| m.start()), hint)?;
        let end = walk_selection(full_text, start, trimmed)
            .unwrap_or_else(|| approximate_end(full_text, start, trimmed.len()));

        tracing::trace!(start, end, "selection located by whitespace-tolerant anchor");
        Some(Span::new(start, end))
    }
}

/// Locate `selected` in `full_text` with the default anchor length.
pub fn locate(full_text: &str, selected: &str) -> Option<Span> {
    Locator::default().locate(full_text, selected)
}

/// Build a regex matching the first `cap` characters of `selection`, with every whitespace run
/// matching one or more whitespace characters in the source.
fn anchor_pattern(selection: &str, cap: usize) -> Result<Regex, regex::Error> {
    let anchor: String = selection.chars().take(cap).collect();
    let words: Vec<String> = anchor.split_whitespace().map(regex::escape).collect();
    Regex::new(&words.join(r"\s+"))
}

fn nearest(candidates: impl Iterator<Item = usize>, hint: Option<usize>) -> Option<usize> {
    let mut candidates = candidates;
    match hint {
        None => candidates.next(),
        Some(hint) => candidates.min_by_key(|start| start.abs_diff(hint)),
    }
}

/// Walk `selection` against `full_text` from `start`, treating whitespace runs as equivalent.
/// Returns the byte offset where the selection ends in the source.
fn walk_selection(full_text: &str, start: usize, selection: &str) -> Option<usize> {
    let rest = &full_text[start..];
    let mut source = rest.char_indices().peekable();
    let mut wanted = selection.chars().peekable();

    while let Some(ch) = wanted.next() {
        if ch.is_whitespace() {
            while wanted.next_if(|c| c.is_whitespace()).is_some() {}
            match source.next() {
                Some((_, found)) if found.is_whitespace() => {}
                _ => return None,
            }
            while source.next_if(|(_, c)| c.is_whitespace()).is_some() {}
        } else {
            match source.next() {
                Some((_, found)) if found == ch => {}
                _ => return None,
            }
        }
    }

    let consumed = source.peek().map_or(rest.len(), |(idx, _)| *idx);
    Some(start + consumed)
}

fn approximate_end(full_text: &str, start: usize, len: usize) -> usize {
    let mut end = start.saturating_add(len).min(full_text.len());
    while !full_text.is_char_boundary(end) {
        end -= 1;
    }
    end
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "Contrato de prestação\n\n   Valor total:\n   R$ 1.200,00\n\nVigência: 12 meses";

    #[test]
    fn verbatim_substrings_round_trip() {
        for (start, _) in DOC.char_indices() {
            for end in (start + 1..=DOC.len()).filter(|end| DOC.is_char_boundary(*end)) {
                let needle = &DOC[start..end];
                if needle.trim().is_empty() {
                    continue;
                }
                let span = locate(DOC, needle).expect("verbatim substring is located");
                assert_eq!(span.slice(DOC), needle);
            }
        }
    }

    #[test]
    fn collapsed_whitespace_maps_back_to_source() {
        let span = locate(DOC, "Valor total: R$ 1.200,00").unwrap();
        assert_eq!(span.slice(DOC), "Valor total:\n   R$ 1.200,00");
    }

    #[test]
    fn surrounding_whitespace_in_selection_is_ignored_for_fuzzy_matches() {
        let span = locate(DOC, "  total: R$ ").unwrap();
        assert_eq!(span.slice(DOC), "total:\n   R$");
    }

    #[test]
    fn missing_selection_is_not_located() {
        assert_eq!(locate(DOC, "Valor parcial"), None);
        assert_eq!(locate("", "anything"), None);
    }

    #[test]
    fn blank_selection_is_not_located() {
        assert_eq!(locate(DOC, ""), None);
        assert_eq!(locate(DOC, " \n\t"), None);
    }

    #[test]
    fn regex_metacharacters_are_literal() {
        let text = "price (USD): $4.50\n* note";
        let span = locate(text, "(USD): $4.50 * note").unwrap();
        assert_eq!(span.slice(text), "(USD): $4.50\n* note");
    }

    #[test]
    fn offset_hint_picks_nearest_occurrence() {
        let text = "total 10\nsubtotal\ntotal 20";
        let selection = Selection::new("total").with_offset(20);
        let span = Locator::default()
            .locate_selection(text, &selection)
            .unwrap();
        assert_eq!(span.start, 18);
        assert_eq!(&text[span.end..], " 20");
    }

    #[test]
    fn verbatim_occurrence_beats_closer_fuzzy_candidate() {
        let text = "Valor total: 10\nnotas\nValor\n  total: 20";
        let selection = Selection::new("Valor total").with_offset(22);
        let span = Locator::default()
            .locate_selection(text, &selection)
            .unwrap();
        assert_eq!(span, Span::new(0, 11));
    }

    #[test]
    fn offset_hint_picks_nearest_fuzzy_candidate() {
        let text = "Valor\ntotal: 10\nValor\n  total: 20";
        let locator = Locator::default();

        let first = locator.locate(text, "Valor total").unwrap();
        assert_eq!(first.slice(text), "Valor\ntotal");

        let selection = Selection::new("Valor total").with_offset(20);
        let span = locator.locate_selection(text, &selection).unwrap();
        assert_eq!(span.start, 16);
        assert_eq!(span.slice(text), "Valor\n  total");
    }

    #[test]
    fn long_selection_is_anchored_on_prefix() {
        let words: Vec<String> = (0..40).map(|i| format!("word{i}")).collect();
        let source = words.join("\n  ");
        let selected = words[5..30].join(" ");

        let span = locate(&source, &selected).unwrap();
        assert!(span.slice(&source).starts_with("word5\n  word6"));
        assert!(span.slice(&source).ends_with("word29"));
    }

    #[test]
    fn divergent_tail_falls_back_to_approximate_end() {
        let locator = Locator::new(10);
        let text = "alpha beta gamma delta";
        let span = locator.locate(text, "alpha  beta GAMMA").unwrap();
        assert_eq!(span.start, 0);
        assert_eq!(span.end, "alpha  beta GAMMA".len());
    }

    #[test]
    fn approximate_end_respects_char_boundaries() {
        let text = "ação";
        assert_eq!(approximate_end(text, 0, 2), 1);
        assert_eq!(approximate_end(text, 0, 100), text.len());
    }
}
