use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use docrule::app::context::{ContextExtractor, ContextWindow};
use docrule::app::locate::Locator;
use docrule::domain::model::Selection;
use docrule::infra::config::Config;
use docrule::infra::highlight::{HighlightMapper, HighlightMarker, HighlightPattern};

#[derive(Parser)]
#[command(author, version, about = "Locate selections, extract context, and highlight rule patterns", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the byte span of a selection within a document
    Locate {
        file: PathBuf,
        selection: String,
        /// Approximate byte offset used to choose between repeated occurrences
        #[arg(long)]
        offset: Option<usize>,
    },
    /// Print the context window surrounding a selection
    Context {
        file: PathBuf,
        selection: String,
        /// Words of context, split before and after the selection
        #[arg(long)]
        radius: Option<usize>,
        #[arg(long)]
        offset: Option<usize>,
    },
    /// Highlight the matches of a rule pattern
    Highlight {
        file: PathBuf,
        pattern: String,
        /// Render HTML markup instead of JSON segments
        #[arg(long)]
        markup: bool,
    },
}

fn main() -> Result<()> {
    docrule::init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Locate {
            file,
            selection,
            offset,
        } => {
            let text = read_document(&file)?;
            let selection = with_offset(Selection::new(selection), offset);
            match Locator::from_config(&config).locate_selection(&text, &selection) {
                Some(span) => println!("{}..{}", span.start, span.end),
                None => println!("not found"),
            }
        }
        Commands::Context {
            file,
            selection,
            radius,
            offset,
        } => {
            let text = read_document(&file)?;
            let selection = with_offset(Selection::new(selection), offset);
            let mut extractor = ContextExtractor::from_config(&config);
            if let Some(radius) = radius {
                extractor = extractor.with_window(ContextWindow::from_radius(radius));
            }
            println!("{}", extractor.extract(&text, &selection).text);
        }
        Commands::Highlight {
            file,
            pattern,
            markup,
        } => {
            let text = read_document(&file)?;
            let pattern = HighlightPattern::from(pattern);
            let highlighted = HighlightMapper::new().apply(&text, Some(&pattern));
            if markup {
                println!("{}", highlighted.to_markup(&HighlightMarker::from_config(&config)));
            } else {
                println!("{}", serde_json::to_string_pretty(&highlighted)?);
            }
        }
    }

    Ok(())
}

fn read_document(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read document {}", path.display()))
}

fn with_offset(selection: Selection, offset: Option<usize>) -> Selection {
    match offset {
        Some(offset) => selection.with_offset(offset),
        None => selection,
    }
}
