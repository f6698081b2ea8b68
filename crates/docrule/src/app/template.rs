//! Assembling generated rules into reusable templates.

use crate::domain::errors::DomainError;
use crate::domain::model::{GeneratedRule, Template};

/// Collects rules for a template, rejecting duplicates.
#[derive(Debug, Clone)]
pub struct TemplateBuilder {
    name: String,
    rules: Vec<String>,
}

impl TemplateBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rules: Vec::new(),
        }
    }

    /// Add a generated rule by name.
    pub fn add_rule(&mut self, rule: &GeneratedRule) -> Result<&mut Self, DomainError> {
        self.add_rule_name(&rule.name)
    }

    pub fn add_rule_name(&mut self, name: &str) -> Result<&mut Self, DomainError> {
        let name = name.trim();
        if self.rules.iter().any(|existing| existing == name) {
            return Err(DomainError::DuplicateRule(name.to_string()));
        }
        self.rules.push(name.to_string());
        Ok(self)
    }

    pub fn build(&self) -> Result<Template, DomainError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(DomainError::EmptyTemplateName);
        }
        if self.rules.is_empty() {
            return Err(DomainError::EmptyTemplate(name.to_string()));
        }
        Ok(Template {
            name: name.to_string(),
            rules: self.rules.clone(),
        })
    }
}
