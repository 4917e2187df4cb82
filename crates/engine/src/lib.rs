//! Relevance alignment and cumulative-gain engine
//!
//! This crate turns a query's scored retrieval output and its relevance
//! judgments into the per-group statistics evaluation measures consume:
//!
//! - **Alignment**: deterministic ranking, merge against each judgment group,
//!   relevance histograms and counts ([`EvalSession`])
//! - **Gains**: level-to-gain tables and the ideal gain ordering ([`GainTable`])
//! - **Curves**: achieved and ideal discounted cumulative gain ([`dcg`])
//! - **Measures**: nDCG, rel-averaged nDCG and truncated MAP ([`measures`])

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

pub mod alignment;
pub mod dcg;
pub mod gains;
pub mod measures;
pub mod ordering;

pub use alignment::{AlignmentResult, EvalSession};
pub use dcg::{achieved_curve, ideal_curve, Discount};
pub use gains::{GainEntry, GainTable, IdealGains};
pub use ordering::RankedItem;
