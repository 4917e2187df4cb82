//! The three orderings the alignment engine sorts by
//!
//! Their tie-break rules decide which rank every document receives, so each
//! one is a standalone function rather than an inline closure.

use releval_core::entities::{RelevanceCategory, RetrievedItem};
use std::cmp::Ordering;

/// A retrieved item after ranking, referring back to its input position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankedItem {
    /// Index into the query's retrieved items
    pub item: usize,
    /// 1-based rank after the score ordering is imposed
    pub rank: usize,
    /// Category with respect to the judgment group currently being aligned
    pub category: RelevanceCategory,
}

impl RankedItem {
    pub fn new(item: usize) -> Self {
        Self {
            item,
            rank: 0,
            category: RelevanceCategory::NonPool,
        }
    }
}

/// Descending score, exact ties broken by descending docno.
///
/// NaN scores sort after every real score.
pub fn by_score_desc_docno_desc(a: &RetrievedItem, b: &RetrievedItem) -> Ordering {
    let by_score = match (a.score.is_nan(), b.score.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal),
    };
    by_score.then_with(|| b.docno.as_bytes().cmp(a.docno.as_bytes()))
}

/// Ascending docno, compared bytewise
pub fn by_docno(a: &RetrievedItem, b: &RetrievedItem) -> Ordering {
    a.docno.as_bytes().cmp(b.docno.as_bytes())
}

/// Judged items first in ascending rank; everything else after
pub fn by_rank_judged_first(a: &RankedItem, b: &RankedItem) -> Ordering {
    match (a.category.is_judged(), b.category.is_judged()) {
        (true, true) => a.rank.cmp(&b.rank),
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => Ordering::Equal,
    }
}
