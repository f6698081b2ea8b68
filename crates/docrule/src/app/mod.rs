//! Application layer: selection lookup, context extraction, and the rule workflow.

pub mod context;
pub mod labels;
pub mod locate;
pub mod rules;
pub mod template;
