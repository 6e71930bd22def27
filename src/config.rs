//! Configuration loader
//!
//! Defaults for `list` come from a TOML file. Resolution order:
//! 1. `--config <path>` (must exist)
//! 2. `DBTLIST_CONFIG` environment variable (must exist)
//! 3. `dbtlist.toml` in the working directory, if present
//!
//! Command-line flags always win over file values.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::output::OutputFormat;

pub const CONFIG_ENV: &str = "DBTLIST_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "dbtlist.toml";

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub defaults: Defaults,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Defaults {
    pub select: Option<String>,
    pub exclude: Option<String>,
    pub packages: Vec<String>,
    pub output: Option<OutputFormat>,
}

impl Config {
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        let env_path = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        Self::resolve_from(explicit, env_path, Path::new("."))
    }

    fn resolve_from(explicit: Option<&Path>, env_path: Option<PathBuf>, cwd: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        if let Some(path) = env_path {
            return Self::load(&path)
                .with_context(|| format!("config named by {CONFIG_ENV} could not be loaded"));
        }
        let fallback = cwd.join(DEFAULT_CONFIG_FILE);
        if fallback.is_file() {
            return Self::load(&fallback);
        }
        tracing::debug!("No config file found, using built-in defaults");
        Ok(Config::default())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&text)
            .with_context(|| format!("invalid config {}", path.display()))?;
        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }
}

/// Split a comma-separated package list, trimming entries and dropping empty ones.
pub fn split_packages(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_owned)
        .collect()
}
