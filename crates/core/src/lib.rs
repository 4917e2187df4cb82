//! Core types for ranked retrieval evaluation
//!
//! This crate provides the foundational abstractions used by the alignment
//! engine and the measures built on it:
//!
//! - **Entities**: retrieved items, judgment entries and groups, relevance categories
//! - **Configuration**: evaluation parameters loaded from TOML and the environment
//! - **Error handling**: unified error types
//!

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

pub mod config;
pub mod entities;
pub mod error;

// Re-export main types for convenience
pub use config::{Config, EvaluationConfig, MeasuresConfig};
pub use entities::{
    GainOverride, JudgmentEntry, JudgmentFormat, JudgmentGroup, QueryJudgments, QueryResults,
    RelevanceCategory, ResultsFormat, RetrievedItem, MAX_RELEVANCE_LEVEL,
};
pub use error::{Error, Result, ResultExt};

/// Version of the core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
