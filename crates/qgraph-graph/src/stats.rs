//! Build counters.

use std::collections::BTreeMap;
use std::ops::AddAssign;

use qgraph_normalize::SkipReason;

/// What happened to the records fed into a builder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Records that created a new question node.
    pub ingested: usize,
    /// Records whose question key was already present.
    pub duplicates: usize,
    /// Records dropped because their natural key was incomplete.
    pub skipped: BTreeMap<SkipReason, usize>,
    /// Ingested questions with options whose correct answer was resolved.
    pub answers_resolved: usize,
    /// Ingested questions with options whose correct answer was not resolved.
    pub answers_unresolved: usize,
}

impl BuildStats {
    pub fn records_seen(&self) -> usize {
        self.ingested + self.duplicates + self.skipped_total()
    }

    pub fn skipped_total(&self) -> usize {
        self.skipped.values().sum()
    }

    pub(crate) fn record_skip(&mut self, reason: SkipReason) {
        *self.skipped.entry(reason).or_default() += 1;
    }
}

impl AddAssign<&BuildStats> for BuildStats {
    fn add_assign(&mut self, other: &BuildStats) {
        self.ingested += other.ingested;
        self.duplicates += other.duplicates;
        for (reason, count) in &other.skipped {
            *self.skipped.entry(*reason).or_default() += count;
        }
        self.answers_resolved += other.answers_resolved;
        self.answers_unresolved += other.answers_unresolved;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals_include_every_outcome() {
        let mut stats = BuildStats {
            ingested: 3,
            duplicates: 1,
            ..BuildStats::default()
        };
        stats.record_skip(SkipReason::MissingPaperCode);
        stats.record_skip(SkipReason::MissingPaperCode);
        stats.record_skip(SkipReason::MissingQuestionNo);
        assert_eq!(stats.skipped_total(), 3);
        assert_eq!(stats.records_seen(), 7);
    }

    #[test]
    fn add_assign_sums_fields() {
        let mut left = BuildStats {
            ingested: 2,
            answers_resolved: 1,
            ..BuildStats::default()
        };
        let mut right = BuildStats {
            ingested: 1,
            duplicates: 4,
            answers_unresolved: 1,
            ..BuildStats::default()
        };
        right.record_skip(SkipReason::MissingQuestionNo);
        left += &right;
        assert_eq!(left.ingested, 3);
        assert_eq!(left.duplicates, 4);
        assert_eq!(left.skipped_total(), 1);
        assert_eq!(left.answers_resolved, 1);
        assert_eq!(left.answers_unresolved, 1);
    }
}
