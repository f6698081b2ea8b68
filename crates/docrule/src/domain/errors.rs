//! Domain-specific errors.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("selection is empty")]
    EmptySelection,
    #[error("label must not be empty")]
    EmptyLabel,
    #[error("unknown label '{0}'")]
    UnknownLabel(String),
    #[error("example {index} out of range for label '{label}'")]
    ExampleOutOfRange { label: String, index: usize },
    #[error("label '{label}' already has the value '{value}'")]
    DuplicateExample { label: String, value: String },
    #[error("template name must not be empty")]
    EmptyTemplateName,
    #[error("template '{0}' has no rules")]
    EmptyTemplate(String),
    #[error("rule '{0}' already added to template")]
    DuplicateRule(String),
    #[error("no pattern generated for label '{0}'")]
    MissingPattern(String),
}
