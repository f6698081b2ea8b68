pub mod app;
pub mod domain;
pub mod infra;

pub use app::context::{Context, ContextExtractor, ContextWindow, extract_context};
pub use app::locate::{Locator, locate};
pub use domain::model::{Selection, Span};
pub use infra::highlight::{HighlightMapper, HighlightPattern, HighlightedText, Segment};

/// Install the stderr log subscriber. Safe to call more than once.
pub fn init() {
    if let Err(err) = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .try_init()
    {
        // A host (or an earlier call) already installed a global subscriber; keep it.
        tracing::debug!(error = %err, "log subscriber already installed");
    }
}
