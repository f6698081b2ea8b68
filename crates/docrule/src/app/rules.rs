//! Turning confirmed selections into generated rules.
//!
//! [`RuleWorkflow`] owns the per-document state: the label book, the generated rules, and a
//! cache of backend responses. Pattern generation itself lives behind [`PatternService`].

use std::collections::HashMap;

use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};

use crate::app::context::ContextExtractor;
use crate::app::labels::{LabelBook, LabelEntry};
use crate::app::template::TemplateBuilder;
use crate::domain::errors::DomainError;
use crate::domain::model::{GeneratedRule, LabeledExample, Selection, Template};
use crate::infra::cache::{Clock, QueryCache, SystemClock};
use crate::infra::config::Config;
use crate::infra::highlight::{HighlightMapper, HighlightPattern, HighlightedText};

/// Body of a "generate pattern" request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternRequest {
    pub key: String,
    pub values: Vec<String>,
    pub context: Vec<String>,
    #[serde(default)]
    pub is_section: bool,
}

impl PatternRequest {
    pub fn from_entry(entry: &LabelEntry) -> Self {
        Self {
            key: entry.label.clone(),
            values: entry.values(),
            context: entry.contexts(),
            is_section: entry.is_section,
        }
    }
}

/// Body of a "create rule" request attaching a label to an existing template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRuleInput {
    pub template_id: u64,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub is_section: bool,
}

impl CreateRuleInput {
    pub fn from_entry(template_id: u64, entry: &LabelEntry, description: impl Into<String>) -> Self {
        Self {
            template_id,
            name: entry.label.clone(),
            description: description.into(),
            is_section: entry.is_section,
        }
    }
}

/// Backend that turns labeled examples into a regular expression.
pub trait PatternService {
    fn generate(&self, request: &PatternRequest) -> Result<GeneratedRule>;
}

impl<T: PatternService + ?Sized> PatternService for &T {
    fn generate(&self, request: &PatternRequest) -> Result<GeneratedRule> {
        (**self).generate(request)
    }
}

/// A generated rule together with the request it answered.
#[derive(Debug, Clone)]
struct RuleRecord {
    request: PatternRequest,
    rule: GeneratedRule,
}

/// Selection → example → rule → highlight pipeline for one document view.
///
/// A rule is only served while its label still has the examples it was generated from; editing
/// the label through [`RuleWorkflow::book_mut`] retires it until the next [`generate_rule`].
///
/// [`generate_rule`]: RuleWorkflow::generate_rule
pub struct RuleWorkflow<S, C = SystemClock> {
    extractor: ContextExtractor,
    mapper: HighlightMapper,
    book: LabelBook,
    rules: HashMap<String, RuleRecord>,
    cache: QueryCache<GeneratedRule, C>,
    service: S,
}

impl<S: PatternService> RuleWorkflow<S, SystemClock> {
    pub fn new(service: S, config: &Config) -> Self {
        Self::with_cache(service, config, QueryCache::new(config.cache.ttl()))
    }
}

impl<S: PatternService, C: Clock> RuleWorkflow<S, C> {
    pub fn with_cache(service: S, config: &Config, cache: QueryCache<GeneratedRule, C>) -> Self {
        Self {
            extractor: ContextExtractor::from_config(config),
            mapper: HighlightMapper::new(),
            book: LabelBook::new(),
            rules: HashMap::new(),
            cache,
            service,
        }
    }

    pub fn book(&self) -> &LabelBook {
        &self.book
    }

    pub fn book_mut(&mut self) -> &mut LabelBook {
        &mut self.book
    }

    pub fn extractor(&self) -> &ContextExtractor {
        &self.extractor
    }

    /// Record a selection under `label`, with its context computed from `full_text`.
    ///
    /// Returns `Ok(None)` when the same value was already recorded for the label.
    pub fn confirm_selection(
        &mut self,
        full_text: &str,
        label: &str,
        selection: &Selection,
    ) -> Result<Option<LabeledExample>, DomainError> {
        if selection.is_blank() {
            return Err(DomainError::EmptySelection);
        }
        let context = self.extractor.extract(full_text, selection);
        if !context.is_located() {
            tracing::info!(label, "selection not found in document, keeping raw text as context");
        }
        self.book
            .add_example(label, selection.text.trim(), context.text)
    }

    /// Generate (or fetch from cache) the rule for `label`.
    pub fn generate_rule(&mut self, label: &str) -> Result<GeneratedRule> {
        let entry = self
            .book
            .get(label)
            .ok_or_else(|| DomainError::UnknownLabel(label.trim().to_string()))?;
        let request = PatternRequest::from_entry(entry);

        let rule = match self.cache.get(&request)? {
            Some(rule) => {
                tracing::debug!(label = %request.key, "using cached rule");
                rule
            }
            None => {
                let rule = self
                    .service
                    .generate(&request)
                    .with_context(|| format!("failed to generate pattern for '{}'", request.key))?;
                let purged = self.cache.purge_stale();
                if purged > 0 {
                    tracing::debug!(purged, "dropped stale cached rules");
                }
                self.cache.insert(&request, rule.clone())?;
                tracing::info!(label = %request.key, pattern = %rule.pattern, "generated rule");
                rule
            }
        };

        let book = &self.book;
        self.rules.retain(|label, _| book.get(label).is_some());
        self.rules.insert(
            request.key.clone(),
            RuleRecord {
                request,
                rule: rule.clone(),
            },
        );
        Ok(rule)
    }

    /// The rule generated for `label`, if its examples have not changed since.
    pub fn rule(&self, label: &str) -> Option<&GeneratedRule> {
        let entry = self.book.get(label)?;
        let record = self.rules.get(&entry.label)?;
        (record.request == PatternRequest::from_entry(entry)).then_some(&record.rule)
    }

    /// Highlight the matches of the rule generated for `label`.
    pub fn highlight(&self, full_text: &str, label: &str) -> Result<HighlightedText, DomainError> {
        let rule = self
            .rule(label)
            .ok_or_else(|| DomainError::MissingPattern(label.trim().to_string()))?;
        let pattern = HighlightPattern::from(rule.pattern.as_str());
        Ok(self.mapper.apply(full_text, Some(&pattern)))
    }

    /// Highlight the matches of every generated rule, in label order.
    pub fn highlight_all(&self, full_text: &str) -> HighlightedText {
        self.book
            .labels()
            .iter()
            .filter_map(|entry| self.rule(&entry.label))
            .fold(HighlightedText::plain(full_text), |text, rule| {
                text.apply(Some(&HighlightPattern::from(rule.pattern.as_str())))
            })
    }

    /// Build a template from every label that has a generated rule.
    pub fn build_template(&self, name: &str) -> Result<Template, DomainError> {
        let mut builder = TemplateBuilder::new(name);
        for entry in self.book.labels() {
            if let Some(rule) = self.rule(&entry.label) {
                builder.add_rule(rule)?;
            }
        }
        builder.build()
    }
}
