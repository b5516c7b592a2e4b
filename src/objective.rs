//! # Objective
//!
//! The fitness every search strategy maximizes. [`SeatingObjective`] combines the
//! diversity score with a penalty for constraint violations:
//!
//! ```text
//! fitness = diversity - scale * (hard_weight * #hard + soft_weight * #soft)
//! ```
//!
//! The scale keeps penalties in a range comparable to the `[0, 1]` diversity score;
//! with the defaults a single hard violation costs as much as the best possible
//! diversity, so any feasible arrangement beats any infeasible one.

use std::fmt::Debug;
use std::sync::Arc;

use crate::constraints::{ConstraintEvaluator, Severity, Violation};
use crate::diversity::{DiversityBreakdown, DiversityCalculator};
use crate::error::{Result, SeatingError};
use crate::partition::Partition;
use crate::roster::Roster;

/// Scores candidate partitions. Higher is better.
///
/// Implementations must be pure and deterministic: strategies call them many times
/// per second on near-identical candidates, and the genetic algorithm may call them
/// from several threads at once.
pub trait Objective: Debug + Send + Sync {
    /// Fitness of the whole partition.
    fn fitness(&self, partition: &Partition) -> f64;

    /// A per-table desirability score in table order, used to steer moves.
    fn table_scores(&self, partition: &Partition) -> Vec<f64>;

    /// Full account of how `partition` scores.
    fn report(&self, partition: &Partition) -> ObjectiveReport;
}

/// Everything the objective knows about one partition.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectiveReport {
    pub fitness: f64,
    pub diversity: DiversityBreakdown,
    pub violations: Vec<Violation>,
    /// Repeat-pairing penalty already subtracted from `fitness` (0 for single days).
    pub interaction_penalty: f64,
}

/// Penalty weights per violation severity.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PenaltyWeights {
    pub hard: f64,
    pub soft: f64,
    /// Multiplier applied to the summed weights before subtracting from diversity.
    pub scale: f64,
}

impl Default for PenaltyWeights {
    fn default() -> Self {
        Self {
            hard: 10.0,
            soft: 1.0,
            scale: 0.1,
        }
    }
}

impl PenaltyWeights {
    pub fn validate(&self) -> Result<()> {
        let values = [self.hard, self.soft, self.scale];
        if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(SeatingError::Configuration(
                "Penalty weights must be finite and non-negative".to_string(),
            ));
        }
        Ok(())
    }

    pub fn weight(&self, severity: Severity) -> f64 {
        match severity {
            Severity::Hard => self.hard,
            Severity::Soft => self.soft,
        }
    }

    /// Scaled penalty for a list of violations.
    pub fn penalty(&self, violations: &[Violation]) -> f64 {
        self.scale
            * violations
                .iter()
                .map(|violation| self.weight(violation.severity))
                .sum::<f64>()
    }
}

/// Diversity minus weighted violations for a single seating.
#[derive(Debug, Clone)]
pub struct SeatingObjective {
    diversity: DiversityCalculator,
    evaluator: ConstraintEvaluator,
    weights: PenaltyWeights,
}

impl SeatingObjective {
    pub fn new(
        diversity: DiversityCalculator,
        evaluator: ConstraintEvaluator,
        weights: PenaltyWeights,
    ) -> Self {
        Self {
            diversity,
            evaluator,
            weights,
        }
    }

    pub fn diversity(&self) -> &DiversityCalculator {
        &self.diversity
    }

    pub fn evaluator(&self) -> &ConstraintEvaluator {
        &self.evaluator
    }

    pub fn weights(&self) -> &PenaltyWeights {
        &self.weights
    }

    pub fn roster(&self) -> &Arc<Roster> {
        self.evaluator.roster()
    }
}

impl Objective for SeatingObjective {
    fn fitness(&self, partition: &Partition) -> f64 {
        let violations = self.evaluator.evaluate(partition);
        self.diversity.score(partition) - self.weights.penalty(&violations)
    }

    fn table_scores(&self, partition: &Partition) -> Vec<f64> {
        let mut scores = self.diversity.table_scores(partition);
        for violation in self.evaluator.evaluate(partition) {
            if let Some(slot) = violation.table.and_then(|t| scores.get_mut(t - 1)) {
                *slot -= self.weights.scale * self.weights.weight(violation.severity);
            }
        }
        scores
    }

    fn report(&self, partition: &Partition) -> ObjectiveReport {
        let violations = self.evaluator.evaluate(partition);
        let diversity = self.diversity.breakdown(partition);
        ObjectiveReport {
            fitness: diversity.overall - self.weights.penalty(&violations),
            diversity,
            violations,
            interaction_penalty: 0.0,
        }
    }
}
