//! Configuration module for relevance evaluation
//!
//! Evaluation parameters can be loaded from TOML files and/or environment
//! variables. See [`Config::load`] for precedence.

mod defaults;
mod loading;


use crate::entities::GainOverride;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use defaults::*;

/// Returns the path to the global configuration file
///
/// The global config is stored at `~/.releval/config.toml`.
pub fn global_config_path() -> Result<PathBuf> {
    let home_dir = dirs::home_dir()
        .ok_or_else(|| Error::config("Unable to determine home directory".to_string()))?;
    Ok(home_dir.join(".releval").join("config.toml"))
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Alignment parameters
    #[serde(default)]
    pub evaluation: EvaluationConfig,

    /// Parameters of the measures that consume alignments
    #[serde(default)]
    pub measures: MeasuresConfig,
}

/// Parameters that control how retrieved items are aligned with judgments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Only the first N items (after ranking) of each query are evaluated.
    /// Unbounded when absent.
    #[serde(default)]
    pub max_items_per_query: Option<usize>,

    /// Minimum judged level counted as relevant
    #[serde(default = "default_relevance_threshold")]
    pub relevance_threshold: u32,

    /// Drop non-pool and unjudged items and renumber the remaining ranks
    #[serde(default = "default_judged_docs_only")]
    pub judged_docs_only: bool,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            max_items_per_query: None,
            relevance_threshold: default_relevance_threshold(),
            judged_docs_only: default_judged_docs_only(),
        }
    }
}

/// Measure parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasuresConfig {
    /// Gain overrides for the cumulative-gain measures, as `level=gain`
    #[serde(default)]
    pub ndcg_gains: Vec<String>,

    /// Rank cutoffs for truncated average precision
    #[serde(default = "default_map_cutoffs")]
    pub map_cutoffs: Vec<usize>,
}

impl Default for MeasuresConfig {
    fn default() -> Self {
        Self {
            ndcg_gains: Vec::new(),
            map_cutoffs: default_map_cutoffs(),
        }
    }
}

impl MeasuresConfig {
    /// Parsed gain overrides
    pub fn gain_overrides(&self) -> Result<Vec<GainOverride>> {
        GainOverride::parse_list(&self.ndcg_gains)
    }

    /// Cutoffs in ascending order
    pub fn sorted_cutoffs(&self) -> Vec<usize> {
        let mut cutoffs = self.map_cutoffs.clone();
        cutoffs.sort_unstable();
        cutoffs
    }
}

impl Config {
    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.evaluation.max_items_per_query == Some(0) {
            return Err(Error::config(
                "Invalid max_items_per_query: must be greater than 0",
            ));
        }

        if self.measures.map_cutoffs.is_empty() {
            return Err(Error::config("Invalid map_cutoffs: at least one cutoff is required"));
        }
        if self.measures.map_cutoffs.contains(&0) {
            return Err(Error::config("Invalid map_cutoffs: cutoffs must be positive"));
        }
        let cutoffs = self.measures.sorted_cutoffs();
        if let Some(pair) = cutoffs.windows(2).find(|w| w[0] == w[1]) {
            return Err(Error::config(format!(
                "Invalid map_cutoffs: cutoff {} given more than once",
                pair[0]
            )));
        }

        self.measures.gain_overrides()?;

        Ok(())
    }
}
