//! Alignment of a query's ranked output against its judgment groups
//!
//! [`EvalSession`] owns the scratch buffers and the single-query cache, so
//! independent sessions never share state.

use crate::ordering::{by_docno, by_rank_judged_first, by_score_desc_docno_desc, RankedItem};
use releval_core::config::EvaluationConfig;
use releval_core::entities::{
    JudgmentEntry, JudgmentGroup, QueryJudgments, QueryResults, RelevanceCategory, RetrievedItem,
};
use releval_core::error::{Error, Result};
use serde::Serialize;
use tracing::debug;

/// Per-group outcome of aligning one query
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AlignmentResult {
    /// Name of the judgment group
    pub group: String,
    /// Category of each retained item, indexed by rank - 1
    pub categories: Vec<RelevanceCategory>,
    /// Number of judged documents at each level, retrieved or not
    pub rel_levels: Vec<usize>,
    /// Threshold the relevance counts were taken with
    pub relevance_threshold: u32,
    pub num_ret: usize,
    pub num_rel: usize,
    pub num_rel_ret: usize,
    pub num_nonpool: usize,
    pub num_unjudged_in_pool: usize,
    /// One plus the highest level with a non-zero count, 0 if none
    pub num_rel_levels: usize,
}

impl AlignmentResult {
    fn reset(&mut self, group: &str, relevance_threshold: u32) {
        self.group.clear();
        self.group.push_str(group);
        self.categories.clear();
        self.rel_levels.clear();
        self.relevance_threshold = relevance_threshold;
        self.num_ret = 0;
        self.num_rel = 0;
        self.num_rel_ret = 0;
        self.num_nonpool = 0;
        self.num_unjudged_in_pool = 0;
        self.num_rel_levels = 0;
    }

    fn count_judgment(&mut self, entry: &JudgmentEntry) {
        if let Some(level) = entry.level {
            self.rel_levels[level as usize] += 1;
        }
    }
}

/// An evaluation run over a sequence of queries
///
/// Results for the most recent query are cached; aligning the same query id
/// again returns them untouched. Buffers keep their capacity from query to
/// query.
#[derive(Debug, Default)]
pub struct EvalSession {
    config: EvaluationConfig,
    ranked: Vec<RankedItem>,
    groups: Vec<AlignmentResult>,
    num_groups: usize,
    cached_query: Option<String>,
}

impl EvalSession {
    pub fn new(config: EvaluationConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    /// Query id whose alignment is currently cached
    pub fn cached_query(&self) -> Option<&str> {
        self.cached_query.as_deref()
    }

    /// Forgets the cached query while keeping buffer capacity
    pub fn clear(&mut self) {
        self.cached_query = None;
        self.num_groups = 0;
    }

    /// Aligns a query's retrieved items against each of its judgment groups.
    ///
    /// Returns one [`AlignmentResult`] per group, in group order.
    pub fn align(
        &mut self,
        results: &QueryResults,
        judgments: &QueryJudgments,
    ) -> Result<&[AlignmentResult]> {
        if self.cached_query.as_deref() == Some(results.query_id.as_str()) {
            debug!(query_id = %results.query_id, "Using cached alignment");
            return Ok(&self.groups[..self.num_groups]);
        }
        self.clear();

        if !judgments.format.has_levels() {
            return Err(Error::format_mismatch(
                "qrels or qrels_jg judgments",
                judgments.format.to_string(),
            ));
        }
        if judgments.query_id != results.query_id {
            return Err(Error::invalid_input(format!(
                "judgments for query '{}' supplied with results for query '{}'",
                judgments.query_id, results.query_id
            )));
        }

        rank_items(
            &mut self.ranked,
            &results.items,
            self.config.max_items_per_query,
        )?;
        if let Some(pair) = self
            .ranked
            .windows(2)
            .find(|w| results.items[w[0].item].docno == results.items[w[1].item].docno)
        {
            return Err(Error::duplicate_identifier(
                &results.query_id,
                &results.items[pair[1].item].docno,
            ));
        }

        // Every group of the query shares one histogram length
        let histogram_len = judgments.max_level().map_or(1, |max| max as usize + 1);

        let num_groups = judgments.groups.len();
        if self.groups.len() < num_groups {
            grow(&mut self.groups, num_groups, "judgment groups")?;
            self.groups.resize_with(num_groups, AlignmentResult::default);
        }

        for (group, out) in judgments.groups.iter().zip(self.groups.iter_mut()) {
            align_group(
                &mut self.ranked,
                &results.items,
                group,
                histogram_len,
                &self.config,
                out,
            )?;
            debug!(
                query_id = %results.query_id,
                group = %out.group,
                num_ret = out.num_ret,
                num_rel = out.num_rel,
                num_rel_ret = out.num_rel_ret,
                "Aligned judgment group"
            );
        }

        self.num_groups = num_groups;
        self.cached_query = Some(results.query_id.clone());
        Ok(&self.groups[..num_groups])
    }
}

/// Grows `buf` so it can hold `len` elements without reallocating
fn grow<T>(buf: &mut Vec<T>, len: usize, what: &str) -> Result<()> {
    buf.try_reserve(len.saturating_sub(buf.len()))
        .map_err(|e| Error::resource_exhausted(format!("cannot hold {len} {what}: {e}")))
}

/// Ranks the retrieved items, truncates to `max_items` and leaves the
/// retained items sorted by docno.
fn rank_items(
    ranked: &mut Vec<RankedItem>,
    items: &[RetrievedItem],
    max_items: Option<usize>,
) -> Result<()> {
    ranked.clear();
    grow(ranked, items.len(), "retrieved items")?;
    ranked.extend((0..items.len()).map(RankedItem::new));

    ranked.sort_by(|a, b| by_score_desc_docno_desc(&items[a.item], &items[b.item]));
    if let Some(max_items) = max_items {
        ranked.truncate(max_items);
    }
    for (index, ranked_item) in ranked.iter_mut().enumerate() {
        ranked_item.rank = index + 1;
    }

    ranked.sort_by(|a, b| by_docno(&items[a.item], &items[b.item]));
    Ok(())
}

/// Merges the docno-sorted ranked items with one group's judgments and
/// fills `out`. `ranked` is sorted by docno again on return.
fn align_group(
    ranked: &mut [RankedItem],
    items: &[RetrievedItem],
    group: &JudgmentGroup,
    histogram_len: usize,
    config: &EvaluationConfig,
    out: &mut AlignmentResult,
) -> Result<()> {
    let threshold = config.relevance_threshold;
    out.reset(group.name(), threshold);
    grow(&mut out.rel_levels, histogram_len, "relevance levels")?;
    out.rel_levels.resize(histogram_len, 0);

    let mut judgments = group.entries().iter().peekable();
    for ranked_item in ranked.iter_mut() {
        let docno = items[ranked_item.item].docno.as_bytes();
        while let Some(entry) = judgments.next_if(|e| e.docno.as_bytes() < docno) {
            out.count_judgment(entry);
        }
        ranked_item.category = match judgments.next_if(|e| e.docno.as_bytes() == docno) {
            None => RelevanceCategory::NonPool,
            Some(entry) => {
                out.count_judgment(entry);
                entry
                    .level
                    .map_or(RelevanceCategory::Unjudged, RelevanceCategory::Level)
            }
        };
    }
    for entry in judgments {
        out.count_judgment(entry);
    }

    grow(&mut out.categories, ranked.len(), "ranked categories")?;
    if config.judged_docs_only {
        // Compacted ranks keep the score tie-break order
        ranked.sort_by(by_rank_judged_first);
        out.categories.extend(
            ranked
                .iter()
                .take_while(|r| r.category.is_judged())
                .map(|r| r.category),
        );
        ranked.sort_by(|a, b| by_docno(&items[a.item], &items[b.item]));
    } else {
        out.categories.resize(ranked.len(), RelevanceCategory::NonPool);
        for ranked_item in ranked.iter() {
            out.categories[ranked_item.rank - 1] = ranked_item.category;
        }
    }

    for category in &out.categories {
        match category {
            RelevanceCategory::NonPool => out.num_nonpool += 1,
            RelevanceCategory::Unjudged => out.num_unjudged_in_pool += 1,
            RelevanceCategory::Level(level) if *level >= threshold => out.num_rel_ret += 1,
            RelevanceCategory::Level(_) => {}
        }
    }
    out.num_ret = out.categories.len();
    out.num_rel = out.rel_levels.iter().skip(threshold as usize).sum();
    out.num_rel_levels = out
        .rel_levels
        .iter()
        .rposition(|&count| count > 0)
        .map_or(0, |level| level + 1);
    Ok(())
}
