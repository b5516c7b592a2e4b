use std::collections::HashSet;

use super::history::InteractionStore;
use crate::error::Result;
use crate::roster::{PersonId, Roster};

/// How much of the "everyone meets everyone" goal a series has reached.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CoverageReport {
    /// Unordered pairs on the roster.
    pub total_pairs: usize,
    /// Pairs that shared a table at least once.
    pub pairs_interacted: usize,
    pub coverage_percentage: f64,
    /// Recorded interactions divided by `total_pairs`.
    pub average_interactions_per_pair: f64,
    /// Pairs that shared a table more than once.
    pub repeat_pairs: usize,
}

impl CoverageReport {
    /// Coverage of `roster` according to `store`. Records involving people not
    /// on the roster are ignored.
    pub fn compute(roster: &Roster, store: &dyn InteractionStore) -> Result<Self> {
        let people = roster.len();
        let total_pairs = people * people.saturating_sub(1) / 2;
        let members: HashSet<&PersonId> = roster.ids().collect();

        let mut pairs_interacted = 0;
        let mut repeat_pairs = 0;
        let mut interactions = 0u64;
        for record in store.records()? {
            if !members.contains(record.pair.first()) || !members.contains(record.pair.second()) {
                continue;
            }
            if record.count >= 1 {
                pairs_interacted += 1;
            }
            if record.count >= 2 {
                repeat_pairs += 1;
            }
            interactions += u64::from(record.count);
        }

        let (coverage_percentage, average_interactions_per_pair) = if total_pairs == 0 {
            (0.0, 0.0)
        } else {
            (
                100.0 * pairs_interacted as f64 / total_pairs as f64,
                interactions as f64 / total_pairs as f64,
            )
        };

        Ok(Self {
            total_pairs,
            pairs_interacted,
            coverage_percentage,
            average_interactions_per_pair,
            repeat_pairs,
        })
    }
}
