//! Configuration loading from files and environment variables

use crate::error::{Error, Result, ResultExt};
use config::{Config as ConfigLib, ConfigBuilder as LibConfigBuilder, Environment, File};
use std::path::Path;
use tracing::debug;

use super::defaults::*;
use super::{global_config_path, Config};

/// Helper to set a config default with consistent error mapping
fn set_config_default<T: Into<config::Value>>(
    builder: LibConfigBuilder<config::builder::DefaultState>,
    key: &str,
    value: T,
) -> Result<LibConfigBuilder<config::builder::DefaultState>> {
    builder
        .set_default(key, value)
        .map_err(|e| Error::config(format!("Failed to set {key} default: {e}")))
}

impl Config {
    /// Loads configuration from a TOML file with environment variable overrides
    ///
    /// Environment variables are prefixed with `RELEVAL_` and use double underscores
    /// for nested values. For example:
    /// - `RELEVAL_EVALUATION__RELEVANCE_THRESHOLD=2`
    /// - `RELEVAL_MEASURES__MAP_CUTOFFS=5,10,20`
    pub fn from_file(path: &Path) -> Result<Self> {
        let builder = ConfigLib::builder();

        // config crate doesn't apply serde defaults for missing sections
        let builder = set_config_default(
            builder,
            "evaluation.relevance_threshold",
            i64::from(default_relevance_threshold()),
        )?;
        let builder = set_config_default(
            builder,
            "evaluation.judged_docs_only",
            default_judged_docs_only(),
        )?;
        let builder = set_config_default(builder, "measures.ndcg_gains", Vec::<String>::new())?;
        let mut builder = set_config_default(
            builder,
            "measures.map_cutoffs",
            default_map_cutoffs()
                .into_iter()
                .map(|c| c as i64)
                .collect::<Vec<i64>>(),
        )?;

        // Add the config file if it exists
        if path.exists() {
            debug!("Loading configuration from {}", path.display());
            builder = builder.add_source(File::from(path));
        }

        // Add environment variables with RELEVAL_ prefix
        builder = builder.add_source(
            Environment::with_prefix("RELEVAL")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("measures.map_cutoffs")
                .with_list_parse_key("measures.ndcg_gains")
                .try_parsing(true),
        );

        let config: Self = builder
            .build()
            .context("Failed to build config")?
            .try_deserialize()
            .context("Failed to deserialize config")?;

        config.validate()?;
        Ok(config)
    }

    /// Creates a config from a TOML string (useful for testing)
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML")
    }

    /// Load configuration
    ///
    /// Precedence (lowest to highest):
    /// 1. Hardcoded defaults
    /// 2. Config file (~/.releval/config.toml or custom path)
    /// 3. Environment variables (RELEVAL_*)
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let path = match config_path {
            Some(p) => p.to_path_buf(),
            None => global_config_path()?,
        };
        Self::from_file(&path)
    }
}
