//! Gain tables for the cumulative-gain measures

use crate::alignment::AlignmentResult;
use releval_core::entities::{GainOverride, RelevanceCategory};
use releval_core::error::{Error, Result};
use serde::Serialize;

/// One relevance level mapped to its gain
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GainEntry {
    pub level: u32,
    pub gain: f64,
    /// Number of judged documents at this level
    pub count: usize,
}

/// Gain entries in ascending gain order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GainTable {
    entries: Vec<GainEntry>,
    total_count: usize,
}

impl GainTable {
    /// Builds a table from a levels histogram.
    ///
    /// Levels below `num_rel_levels` without an override gain their own level
    /// value. Overrides for levels nobody was judged at stay in the table with
    /// a count of zero.
    pub fn build(
        rel_levels: &[usize],
        num_rel_levels: usize,
        overrides: &[GainOverride],
    ) -> Result<Self> {
        let mut entries: Vec<GainEntry> = Vec::new();
        entries
            .try_reserve(num_rel_levels + overrides.len())
            .map_err(|e| Error::resource_exhausted(format!("cannot build gain table: {e}")))?;

        for gain_override in overrides {
            if !gain_override.gain.is_finite() {
                return Err(Error::malformed_gain_override(format!(
                    "gain for level {} is not finite",
                    gain_override.level
                )));
            }
            if entries.iter().any(|e| e.level == gain_override.level) {
                return Err(Error::malformed_gain_override(format!(
                    "level {} given more than once",
                    gain_override.level
                )));
            }
            entries.push(GainEntry {
                level: gain_override.level,
                gain: gain_override.gain,
                count: 0,
            });
        }

        for (level, &count) in rel_levels.iter().enumerate().take(num_rel_levels) {
            let level = u32::try_from(level).map_err(|_| {
                Error::invalid_input(format!("relevance level {level} out of range"))
            })?;
            match entries.iter_mut().find(|e| e.level == level) {
                Some(entry) => entry.count = count,
                None => entries.push(GainEntry {
                    level,
                    gain: f64::from(level),
                    count,
                }),
            }
        }

        entries.sort_by(|a, b| a.gain.total_cmp(&b.gain));
        let total_count = entries.iter().map(|e| e.count).sum();

        Ok(Self {
            entries,
            total_count,
        })
    }

    /// Builds the table for one aligned judgment group
    pub fn for_alignment(result: &AlignmentResult, overrides: &[GainOverride]) -> Result<Self> {
        Self::build(&result.rel_levels, result.num_rel_levels, overrides)
    }

    pub fn entries(&self) -> &[GainEntry] {
        &self.entries
    }

    /// Documents counted across every level in the table
    pub fn total_count(&self) -> usize {
        self.total_count
    }

    /// Documents at levels whose gain is positive
    pub fn num_positive(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.gain > 0.0)
            .map(|e| e.count)
            .sum()
    }

    /// Gain credited for a ranked item; 0 for anything without a table entry
    pub fn gain(&self, category: RelevanceCategory) -> f64 {
        category
            .level()
            .and_then(|level| self.entries.iter().find(|e| e.level == level))
            .map_or(0.0, |e| e.gain)
    }

    /// Gains of the ideal ranking, best first
    pub fn ideal_gains(&self) -> IdealGains<'_> {
        IdealGains {
            entries: &self.entries,
            cursor: self.entries.len().checked_sub(1),
            used: 0,
        }
    }
}

/// Walks a [`GainTable`] from its highest gain down, one document at a time.
///
/// Stops for good at the first entry whose gain is not positive, even when
/// that entry holds no documents.
#[derive(Debug, Clone)]
pub struct IdealGains<'a> {
    entries: &'a [GainEntry],
    cursor: Option<usize>,
    used: usize,
}

impl Iterator for IdealGains<'_> {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        loop {
            let entry = self.entries[self.cursor?];
            if entry.gain <= 0.0 {
                self.cursor = None;
                return None;
            }
            if self.used < entry.count {
                self.used += 1;
                return Some(entry.gain);
            }
            self.used = 0;
            self.cursor = self.cursor.and_then(|c| c.checked_sub(1));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn levels(table: &GainTable) -> Vec<(u32, f64, usize)> {
        table
            .entries()
            .iter()
            .map(|e| (e.level, e.gain, e.count))
            .collect()
    }

    #[test]
    fn test_identity_gains_without_overrides() {
        let table = GainTable::build(&[4, 2, 1], 3, &[]).unwrap();
        assert_eq!(levels(&table), vec![(0, 0.0, 4), (1, 1.0, 2), (2, 2.0, 1)]);
        assert_eq!(table.total_count(), 7);
        assert_eq!(table.num_positive(), 3);
    }

    #[test]
    fn test_overrides_sort_by_gain_not_level() {
        let overrides = [GainOverride::new(1, 5.0), GainOverride::new(2, 1.0)];
        let table = GainTable::build(&[0, 2, 3], 3, &overrides).unwrap();
        assert_eq!(levels(&table), vec![(0, 0.0, 0), (2, 1.0, 3), (1, 5.0, 2)]);

        let ideal: Vec<f64> = table.ideal_gains().collect();
        assert_eq!(ideal, vec![5.0, 5.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_override_for_unseen_level_keeps_zero_count() {
        let table = GainTable::build(&[1, 1], 2, &[GainOverride::new(4, 7.0)]).unwrap();
        assert_eq!(levels(&table), vec![(0, 0.0, 1), (1, 1.0, 1), (4, 7.0, 0)]);
        let ideal: Vec<f64> = table.ideal_gains().collect();
        assert_eq!(ideal, vec![1.0]);
    }

    #[test]
    fn test_levels_beyond_num_rel_levels_are_ignored() {
        let table = GainTable::build(&[2, 0, 0], 1, &[]).unwrap();
        assert_eq!(levels(&table), vec![(0, 0.0, 2)]);
    }

    #[test]
    fn test_ideal_gains_freeze_at_first_non_positive_gain() {
        let overrides = [GainOverride::new(0, -1.0), GainOverride::new(1, 0.0)];
        let table = GainTable::build(&[3, 2, 1], 3, &overrides).unwrap();
        let ideal: Vec<f64> = table.ideal_gains().collect();
        assert_eq!(ideal, vec![2.0]);
    }

    #[test]
    fn test_gain_lookup_defaults_to_zero() {
        let table = GainTable::build(&[0, 1], 2, &[GainOverride::new(1, 2.5)]).unwrap();
        assert_eq!(table.gain(RelevanceCategory::Level(1)), 2.5);
        assert_eq!(table.gain(RelevanceCategory::Level(9)), 0.0);
        assert_eq!(table.gain(RelevanceCategory::NonPool), 0.0);
        assert_eq!(table.gain(RelevanceCategory::Unjudged), 0.0);
    }

    #[test]
    fn test_repeated_override_level_is_rejected() {
        let overrides = [GainOverride::new(1, 1.0), GainOverride::new(1, 2.0)];
        let err = GainTable::build(&[0, 1], 2, &overrides).unwrap_err();
        assert!(matches!(err, Error::MalformedGainOverride(_)));
    }

    #[test]
    fn test_empty_table_has_no_ideal_gains() {
        let table = GainTable::build(&[0], 0, &[]).unwrap();
        assert!(table.entries().is_empty());
        assert_eq!(table.ideal_gains().count(), 0);
    }
}
