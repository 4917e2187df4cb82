//! Discounted cumulative gain curves

use crate::gains::GainTable;
use releval_core::entities::RelevanceCategory;
use tracing::trace;

/// Rank discount applied to each gain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Discount {
    /// Full gain at rank 0, then `gain / log2(rank + 1)`
    #[default]
    Standard,
    /// `gain / log2(rank + 2)` at every rank
    Shifted,
}

impl Discount {
    /// Discounted gain at a 0-based rank
    pub fn apply(self, gain: f64, rank: usize) -> f64 {
        match self {
            Self::Standard if rank == 0 => gain,
            Self::Standard => gain / ((rank + 1) as f64).log2(),
            Self::Shifted => gain / ((rank + 2) as f64).log2(),
        }
    }
}

/// Cumulative gain of the ranking as retrieved, one value per rank
pub fn achieved_curve(
    categories: &[RelevanceCategory],
    table: &GainTable,
    discount: Discount,
) -> Vec<f64> {
    let mut dcg = 0.0;
    categories
        .iter()
        .enumerate()
        .map(|(rank, &category)| {
            let gain = table.gain(category);
            if gain != 0.0 {
                dcg += discount.apply(gain, rank);
                trace!(rank, gain, dcg, "achieved gain");
            }
            dcg
        })
        .collect()
}

/// Cumulative gain of the ideal ranking, one value per ideal position
pub fn ideal_curve(table: &GainTable, discount: Discount) -> Vec<f64> {
    let mut dcg = 0.0;
    table
        .ideal_gains()
        .enumerate()
        .map(|(rank, gain)| {
            dcg += discount.apply(gain, rank);
            trace!(rank, gain, dcg, "ideal gain");
            dcg
        })
        .collect()
}
