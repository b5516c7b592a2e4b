use std::collections::BTreeMap;
use std::time::Duration;

use crate::constraints::Violation;
use crate::diversity::DiversityBreakdown;
use crate::partition::Partition;
use crate::roster::{PersonId, TableId};

/// Counters collected while the search loop runs.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OptimizationStats {
    pub iterations: usize,
    /// Candidates the strategy adopted as its working state.
    pub accepted_moves: usize,
    /// Times a new best-ever fitness was observed.
    pub improvements: usize,
    pub elapsed: Duration,
    pub initial_score: f64,
    pub final_score: f64,
    /// Best-ever fitness after the start and after every improvement.
    pub best_score_history: Vec<f64>,
}

/// Outcome of one optimization run, built from the best-ever partition.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationResult {
    pub partition: Partition,
    /// The partition by person id, keyed by table.
    pub seating: BTreeMap<TableId, Vec<PersonId>>,
    pub score: f64,
    pub diversity: DiversityBreakdown,
    pub violations: Vec<Violation>,
    pub strategy: String,
    /// Strategy parameters at the end of the run.
    pub parameters: BTreeMap<String, f64>,
    pub stats: OptimizationStats,
}

impl OptimizationResult {
    pub fn hard_violations(&self) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(|violation| violation.is_hard())
    }

    /// Whether the returned seating breaches no hard constraint.
    pub fn is_feasible(&self) -> bool {
        self.hard_violations().next().is_none()
    }

    pub fn improvement(&self) -> f64 {
        self.stats.final_score - self.stats.initial_score
    }
}
