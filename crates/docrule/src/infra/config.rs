//! Configuration management utilities.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use dirs_next::config_dir;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

static DEFAULT_CONFIG: Lazy<&'static str> =
    Lazy::new(|| include_str!("../../assets/default-config.toml"));
static DEFAULT_WORKSPACE_CONFIG_PATH: &str = ".docrule/config.toml";

/// Layered configuration loaded from defaults, user, workspace, and env.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub extraction: Extraction,
    #[serde(default)]
    pub highlight: Highlight,
    #[serde(default)]
    pub cache: Cache,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extraction {
    /// Words of context (before plus after) taken around a selection.
    #[serde(default = "Extraction::default_context_radius")]
    pub context_radius: usize,
    /// Characters of the selection used as the whitespace-tolerant search anchor.
    #[serde(default = "Extraction::default_anchor_chars")]
    pub anchor_chars: usize,
}

impl Extraction {
    fn default_context_radius() -> usize {
        10
    }

    fn default_anchor_chars() -> usize {
        70
    }
}

impl Default for Extraction {
    fn default() -> Self {
        Self {
            context_radius: Self::default_context_radius(),
            anchor_chars: Self::default_anchor_chars(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Highlight {
    #[serde(default = "Highlight::default_class")]
    pub class: String,
    #[serde(default = "Highlight::default_style")]
    pub style: String,
}

impl Highlight {
    fn default_class() -> String {
        "docrule-highlight".into()
    }

    fn default_style() -> String {
        "background-color: #fff59d".into()
    }
}

impl Default for Highlight {
    fn default() -> Self {
        Self {
            class: Self::default_class(),
            style: Self::default_style(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Cache {
    #[serde(default)]
    ttl_secs: Option<u64>,
}

impl Cache {
    fn default_ttl_secs() -> u64 {
        300
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs.unwrap_or_else(Self::default_ttl_secs))
    }
}

/// Environment overrides for critical settings.
#[derive(Debug, Default, Clone)]
pub struct EnvOverrides {
    context_radius: Option<String>,
    highlight_style: Option<String>,
}

impl EnvOverrides {
    fn from_env() -> Self {
        Self {
            context_radius: env::var("DOCRULE_CONTEXT_RADIUS").ok(),
            highlight_style: env::var("DOCRULE_HIGHLIGHT_STYLE").ok(),
        }
    }

    #[cfg(test)]
    fn for_tests(context_radius: &str, highlight_style: &str) -> Self {
        Self {
            context_radius: Some(context_radius.to_owned()),
            highlight_style: Some(highlight_style.to_owned()),
        }
    }
}

impl Config {
    /// Load configuration from defaults, user/global config, workspace config, and env overrides.
    pub fn load() -> Result<Self> {
        let env = EnvOverrides::from_env();
        let global = global_config_path();
        let workspace = workspace_config_path()?;
        Self::load_with_layers(global, workspace, env)
    }

    fn load_with_layers(
        global: Option<PathBuf>,
        workspace: Option<PathBuf>,
        env_overrides: EnvOverrides,
    ) -> Result<Self> {
        let mut merged = parse_table(&DEFAULT_CONFIG)?;

        if let Some(global_path) = global.filter(|path| path.exists()) {
            merge_tables(&mut merged, read_table(&global_path)?);
        }

        if let Some(workspace_path) = workspace.filter(|path| path.exists()) {
            merge_tables(&mut merged, read_table(&workspace_path)?);
        }

        let config: Config = toml::Value::Table(merged)
            .try_into()
            .context("failed to parse merged config")?;
        Ok(apply_env_overrides(config, env_overrides))
    }
}

fn read_table(path: &Path) -> Result<toml::Table> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;
    parse_table(&data).with_context(|| format!("invalid config file: {}", path.display()))
}

fn parse_table(contents: &str) -> Result<toml::Table> {
    contents
        .parse::<toml::Table>()
        .with_context(|| "failed to parse TOML config".to_string())
}

/// Overlay every key present in `overlay` onto `base`, recursing into nested tables.
fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match value {
            toml::Value::Table(nested) => match base.get_mut(&key) {
                Some(toml::Value::Table(existing)) => merge_tables(existing, nested),
                _ => {
                    base.insert(key, toml::Value::Table(nested));
                }
            },
            value => {
                base.insert(key, value);
            }
        }
    }
}

fn global_config_path() -> Option<PathBuf> {
    config_dir().map(|base| base.join("docrule/config.toml"))
}

fn workspace_config_path() -> Result<Option<PathBuf>> {
    let cwd = env::current_dir()?;
    let root = find_repo_root(&cwd).unwrap_or(cwd);
    Ok(Some(root.join(DEFAULT_WORKSPACE_CONFIG_PATH)))
}

fn find_repo_root(start: &Path) -> Option<PathBuf> {
    let mut current = start;
    loop {
        if current.join(".git").exists() {
            return Some(current.to_path_buf());
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => return None,
        }
    }
}

fn apply_env_overrides(mut config: Config, env: EnvOverrides) -> Config {
    if let Some(raw) = env.context_radius {
        match raw.trim().parse::<usize>() {
            Ok(radius) => config.extraction.context_radius = radius,
            Err(err) => {
                tracing::warn!(value = %raw, error = %err, "ignoring invalid DOCRULE_CONTEXT_RADIUS");
            }
        }
    }
    if let Some(style) = env.highlight_style {
        config.highlight.style = style;
    }
    config
}
