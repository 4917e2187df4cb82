use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum_macros::{Display, EnumString};

/// Source format of a query's retrieved results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ResultsFormat {
    TrecResults,
}

impl ResultsFormat {
    /// Parses a format tag, rejecting anything that is not a known results format
    pub fn from_tag(tag: &str) -> Result<Self> {
        Self::from_str(tag).map_err(|_| Error::format_mismatch("a results format", tag))
    }
}

/// Source format of a query's relevance judgments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum JudgmentFormat {
    /// Single judgment group per query
    Qrels,
    /// One or more named judgment groups per query
    QrelsJg,
    /// Preference judgments
    Prefs,
    /// Relevance judgments expressed as preferences
    QrelsPrefs,
}

impl JudgmentFormat {
    /// Parses a format tag, rejecting anything that is not a known judgment format
    pub fn from_tag(tag: &str) -> Result<Self> {
        Self::from_str(tag).map_err(|_| Error::format_mismatch("a judgment format", tag))
    }

    /// Whether judgments in this format carry graded relevance levels
    pub fn has_levels(self) -> bool {
        matches!(self, Self::Qrels | Self::QrelsJg)
    }
}

/// One (document, score) pair from a query's ranked output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedItem {
    pub docno: String,
    pub score: f64,
}

impl RetrievedItem {
    pub fn new(docno: impl Into<String>, score: f64) -> Self {
        Self {
            docno: docno.into(),
            score,
        }
    }

    /// Builds an item from a supplied rank instead of a score.
    ///
    /// The score is the negated rank, so rank 1 sorts before rank 2.
    pub fn from_rank(docno: impl Into<String>, rank: u64) -> Self {
        Self::new(docno, -(rank as f64))
    }
}

/// One (document, relevance level) pair
///
/// A `level` of `None` marks a document that is in the judged pool but was
/// never assigned a level.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JudgmentEntry {
    pub docno: String,
    pub level: Option<u32>,
}

impl JudgmentEntry {
    pub fn judged(docno: impl Into<String>, level: u32) -> Self {
        Self {
            docno: docno.into(),
            level: Some(level),
        }
    }

    pub fn unjudged(docno: impl Into<String>) -> Self {
        Self {
            docno: docno.into(),
            level: None,
        }
    }

    /// Builds an entry from a raw qrels level, where any negative value means unjudged
    pub fn from_raw(docno: impl Into<String>, raw_level: i64) -> Result<Self> {
        let docno: String = docno.into();
        if raw_level < 0 {
            return Ok(Self::unjudged(docno));
        }
        match u32::try_from(raw_level) {
            Ok(level) if level <= MAX_RELEVANCE_LEVEL => Ok(Self::judged(docno, level)),
            _ => Err(level_out_of_range(&docno, raw_level)),
        }
    }
}

fn level_out_of_range(docno: &str, level: impl std::fmt::Display) -> Error {
    Error::invalid_input(format!(
        "relevance level {level} for document '{docno}' exceeds {MAX_RELEVANCE_LEVEL}"
    ))
}

/// Highest relevance level a judgment may carry.
///
/// Alignment sizes its levels histogram by the highest level present.
pub const MAX_RELEVANCE_LEVEL: u32 = u16::MAX as u32;

/// A named partition of a query's judgments
///
/// Entries are kept sorted by docno and unique, which is what the alignment
/// merge relies on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JudgmentGroup {
    name: String,
    entries: Vec<JudgmentEntry>,
}

impl JudgmentGroup {
    pub fn new(name: impl Into<String>, mut entries: Vec<JudgmentEntry>) -> Result<Self> {
        let name = name.into();
        entries.sort_by(|a, b| a.docno.cmp(&b.docno));
        if let Some(pair) = entries.windows(2).find(|w| w[0].docno == w[1].docno) {
            return Err(Error::duplicate_judgment(name, pair[1].docno.clone()));
        }
        if let Some((entry, level)) = entries
            .iter()
            .find_map(|e| e.level.filter(|&l| l > MAX_RELEVANCE_LEVEL).map(|l| (e, l)))
        {
            return Err(level_out_of_range(&entry.docno, level));
        }
        Ok(Self { name, entries })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Entries in ascending docno order
    pub fn entries(&self) -> &[JudgmentEntry] {
        &self.entries
    }

    /// Highest assigned level in the group, if any entry is judged
    pub fn max_level(&self) -> Option<u32> {
        self.entries.iter().filter_map(|e| e.level).max()
    }
}

/// A query's retrieved items as delivered by the results loader
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResults {
    pub query_id: String,
    #[serde(default)]
    pub run_id: Option<String>,
    pub format: ResultsFormat,
    pub items: Vec<RetrievedItem>,
}

impl QueryResults {
    pub fn new(query_id: impl Into<String>, items: Vec<RetrievedItem>) -> Self {
        Self {
            query_id: query_id.into(),
            run_id: None,
            format: ResultsFormat::TrecResults,
            items,
        }
    }
}

/// A query's judgment groups as delivered by the judgment loader
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryJudgments {
    pub query_id: String,
    pub format: JudgmentFormat,
    pub groups: Vec<JudgmentGroup>,
}

impl QueryJudgments {
    /// Judgments with any number of named groups
    pub fn new(query_id: impl Into<String>, groups: Vec<JudgmentGroup>) -> Self {
        Self {
            query_id: query_id.into(),
            format: JudgmentFormat::QrelsJg,
            groups,
        }
    }

    /// Judgments with a single unnamed group
    pub fn single(query_id: impl Into<String>, entries: Vec<JudgmentEntry>) -> Result<Self> {
        Ok(Self {
            query_id: query_id.into(),
            format: JudgmentFormat::Qrels,
            groups: vec![JudgmentGroup::new("", entries)?],
        })
    }

    /// Highest assigned level across every group
    pub fn max_level(&self) -> Option<u32> {
        self.groups.iter().filter_map(JudgmentGroup::max_level).max()
    }
}

/// Classification of a ranked item with respect to one judgment group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelevanceCategory {
    /// Judged at this level
    Level(u32),
    /// No judgment entry exists for the document
    NonPool,
    /// Present in the pool but never assigned a level
    Unjudged,
}

impl RelevanceCategory {
    pub fn level(self) -> Option<u32> {
        match self {
            Self::Level(level) => Some(level),
            Self::NonPool | Self::Unjudged => None,
        }
    }

    pub fn is_judged(self) -> bool {
        matches!(self, Self::Level(_))
    }

    /// Judged at or above `threshold`
    pub fn is_relevant(self, threshold: u32) -> bool {
        self.level().is_some_and(|level| level >= threshold)
    }
}

/// An explicit gain for one relevance level, written `level=gain`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GainOverride {
    pub level: u32,
    pub gain: f64,
}

impl GainOverride {
    pub fn new(level: u32, gain: f64) -> Self {
        Self { level, gain }
    }

    /// Parses a list of `level=gain` strings, rejecting a level given twice
    pub fn parse_list<S: AsRef<str>>(pairs: &[S]) -> Result<Vec<Self>> {
        let mut overrides: Vec<Self> = Vec::with_capacity(pairs.len());
        for pair in pairs {
            let parsed: Self = pair.as_ref().parse()?;
            if overrides.iter().any(|o| o.level == parsed.level) {
                return Err(Error::malformed_gain_override(format!(
                    "level {} given more than once",
                    parsed.level
                )));
            }
            overrides.push(parsed);
        }
        Ok(overrides)
    }
}

impl FromStr for GainOverride {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (level, gain) = s
            .split_once('=')
            .ok_or_else(|| Error::malformed_gain_override(format!("'{s}' is not level=gain")))?;
        let level = level.trim().parse::<u32>().map_err(|_| {
            Error::malformed_gain_override(format!("'{}' is not a relevance level", level.trim()))
        })?;
        let gain = gain
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|g| g.is_finite())
            .ok_or_else(|| {
                Error::malformed_gain_override(format!("'{}' is not a finite gain", gain.trim()))
            })?;
        Ok(Self { level, gain })
    }
}
