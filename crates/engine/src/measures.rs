//! Per-query measures computed from an aligned judgment group
//!
//! Each measure returns `None` when it is undefined for the query, leaving
//! the decision of how to average such queries to the caller.

use crate::alignment::AlignmentResult;
use crate::dcg::{achieved_curve, ideal_curve, Discount};
use crate::gains::GainTable;
use releval_core::error::{Error, Result};
use tracing::trace;

/// Normalized discounted cumulative gain over the whole retrieved list.
///
/// `None` when the ideal ranking has no positive gain. A query that retrieved
/// nothing relevant scores 0.
pub fn ndcg(result: &AlignmentResult, table: &GainTable) -> Option<f64> {
    let achieved = achieved_curve(&result.categories, table, Discount::Standard);
    let ideal = ideal_curve(table, Discount::Standard);

    let ideal_dcg = ideal.last().copied().unwrap_or(0.0);
    if ideal_dcg <= 0.0 {
        return None;
    }
    if result.num_rel_ret == 0 {
        return Some(0.0);
    }
    let dcg = achieved.last().copied().unwrap_or(0.0);
    Some(dcg / ideal_dcg)
}

/// Normalized discounted cumulative gain averaged over relevant documents.
///
/// nDCG is sampled at each retrieved document with positive gain. Every
/// positive-gain document that was not retrieved contributes the nDCG at the
/// end of the ranking. The sum is divided by the number of documents the
/// ideal ranking credits.
pub fn ndcg_rel(result: &AlignmentResult, table: &GainTable) -> Option<f64> {
    let ideal = ideal_curve(table, Discount::Shifted);
    let ideal_dcg = ideal.last().copied()?;
    if ideal_dcg <= 0.0 {
        return None;
    }
    let num_rel = ideal.len();

    let mut results_dcg = 0.0;
    let mut sum = 0.0;
    let mut num_rel_ret = 0usize;
    for (rank, &category) in result.categories.iter().enumerate() {
        let gain = table.gain(category);
        if gain != 0.0 {
            results_dcg += Discount::Shifted.apply(gain, rank);
        }
        if gain > 0.0 {
            sum += results_dcg / ideal[rank.min(num_rel - 1)];
            num_rel_ret += 1;
        }
        trace!(rank, gain, results_dcg, sum, "ndcg_rel");
    }

    sum += num_rel.saturating_sub(num_rel_ret) as f64 * results_dcg / ideal_dcg;
    if sum > 0.0 {
        Some(sum / num_rel as f64)
    } else {
        Some(0.0)
    }
}

/// Average precision truncated at each cutoff.
///
/// Cutoffs deeper than the retrieved list take the value at the end of the
/// list. Returns `(cutoff, value)` pairs in ascending cutoff order, or `None`
/// when the group has no relevant documents. Cutoffs must be positive.
pub fn map_cut(
    result: &AlignmentResult,
    cutoffs: &[usize],
) -> Result<Option<Vec<(usize, f64)>>> {
    if cutoffs.contains(&0) {
        return Err(Error::invalid_input("map cutoffs must be positive"));
    }
    if result.num_rel == 0 {
        return Ok(None);
    }
    let mut cutoffs = cutoffs.to_vec();
    cutoffs.sort_unstable();
    cutoffs.dedup();

    let num_rel = result.num_rel as f64;
    let mut values = Vec::with_capacity(cutoffs.len());
    let mut pending = cutoffs.iter().copied().peekable();
    let mut rel_so_far = 0usize;
    let mut sum = 0.0;

    for (rank, category) in result.categories.iter().enumerate() {
        if let Some(cutoff) = pending.next_if_eq(&rank) {
            values.push((cutoff, sum / num_rel));
        }
        if pending.peek().is_none() {
            break;
        }
        if category.is_relevant(result.relevance_threshold) {
            rel_so_far += 1;
            sum += rel_so_far as f64 / (rank + 1) as f64;
        }
    }
    values.extend(pending.map(|cutoff| (cutoff, sum / num_rel)));
    Ok(Some(values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use releval_core::entities::RelevanceCategory::{self, Level, NonPool};

    fn aligned(categories: Vec<RelevanceCategory>, rel_levels: Vec<usize>) -> AlignmentResult {
        let relevance_threshold = 1;
        AlignmentResult {
            group: String::new(),
            num_ret: categories.len(),
            num_rel_ret: categories
                .iter()
                .filter(|c| c.is_relevant(relevance_threshold))
                .count(),
            num_rel: rel_levels.iter().skip(1).sum(),
            num_rel_levels: rel_levels
                .iter()
                .rposition(|&c| c > 0)
                .map_or(0, |l| l + 1),
            categories,
            rel_levels,
            relevance_threshold,
            ..AlignmentResult::default()
        }
    }

    #[test]
    fn test_ndcg_perfect_ranking_is_one() {
        let result = aligned(vec![Level(2), Level(1), Level(0)], vec![1, 1, 1]);
        let table = GainTable::for_alignment(&result, &[]).unwrap();
        assert_eq!(ndcg(&result, &table), Some(1.0));
    }

    #[test]
    fn test_ndcg_undefined_without_positive_gain() {
        let result = aligned(vec![Level(0), NonPool], vec![3]);
        let table = GainTable::for_alignment(&result, &[]).unwrap();
        assert_eq!(ndcg(&result, &table), None);
        assert_eq!(ndcg_rel(&result, &table), None);
    }

    #[test]
    fn test_ndcg_zero_when_nothing_relevant_retrieved() {
        let result = aligned(vec![NonPool, Level(0)], vec![1, 2]);
        let table = GainTable::for_alignment(&result, &[]).unwrap();
        assert_eq!(ndcg(&result, &table), Some(0.0));
    }

    #[test]
    fn test_ndcg_rel_perfect_ranking_is_one() {
        let result = aligned(vec![Level(1), Level(1)], vec![0, 2]);
        let table = GainTable::for_alignment(&result, &[]).unwrap();
        assert_eq!(ndcg_rel(&result, &table), Some(1.0));
    }

    #[test]
    fn test_ndcg_rel_charges_unretrieved_documents_final_ratio() {
        // One of two relevant documents retrieved, at the top.
        let result = aligned(vec![Level(1)], vec![0, 2]);
        let table = GainTable::for_alignment(&result, &[]).unwrap();

        let ideal_dcg = 1.0 + 1.0 / 3f64.log2();
        let expected = (1.0 + 1.0 / ideal_dcg) / 2.0;
        let got = ndcg_rel(&result, &table).unwrap();
        assert!((got - expected).abs() < 1e-12, "{got} != {expected}");
    }

    #[test]
    fn test_map_cut_fills_cutoffs_beyond_retrieved() {
        let result = aligned(vec![Level(1), NonPool, Level(1)], vec![0, 3]);
        let values = map_cut(&result, &[1, 2, 10]).unwrap().unwrap();

        let at_end = (1.0 + 2.0 / 3.0) / 3.0;
        assert_eq!(values, vec![(1, 1.0 / 3.0), (2, 1.0 / 3.0), (10, at_end)]);
    }

    #[test]
    fn test_map_cut_undefined_without_relevant() {
        let result = aligned(vec![NonPool], vec![1]);
        assert_eq!(map_cut(&result, &[5]).unwrap(), None);
    }

    #[test]
    fn test_map_cut_rejects_zero_cutoff() {
        let result = aligned(vec![Level(1)], vec![0, 1]);
        let err = map_cut(&result, &[0, 5]).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));

        let nothing_relevant = aligned(vec![NonPool], vec![1]);
        assert!(map_cut(&nothing_relevant, &[0]).is_err());
    }

    #[test]
    fn test_ndcg_rel_compares_deep_hit_with_final_ideal() {
        // The only relevant document sits past the end of the ideal ranking
        let result = aligned(vec![NonPool, NonPool, Level(1)], vec![0, 1]);
        let table = GainTable::for_alignment(&result, &[]).unwrap();

        let expected = (1.0 / 4f64.log2()) / 1.0 / 1.0;
        let got = ndcg_rel(&result, &table).unwrap();
        assert!((got - expected).abs() < 1e-12, "{got} != {expected}");
    }

    #[test]
    fn test_ndcg_rel_deep_hit_with_unretrieved_tail() {
        // Relevant: one level 2 (rank 2), two level 1 (rank 4 and unretrieved)
        let result = aligned(vec![NonPool, Level(2), NonPool, Level(1)], vec![0, 2, 1]);
        let table = GainTable::for_alignment(&result, &[]).unwrap();

        let ideal = [
            2.0,
            2.0 + 1.0 / 3f64.log2(),
            2.0 + 1.0 / 3f64.log2() + 1.0 / 4f64.log2(),
        ];
        let dcg_at_second = 2.0 / 3f64.log2();
        let dcg_at_fourth = dcg_at_second + 1.0 / 5f64.log2();
        let sum = dcg_at_second / ideal[1]
            + dcg_at_fourth / ideal[2]
            + (3 - 2) as f64 * dcg_at_fourth / ideal[2];
        let expected = sum / 3.0;

        let got = ndcg_rel(&result, &table).unwrap();
        assert!((got - expected).abs() < 1e-12, "{got} != {expected}");
    }
}
