//! Day objective for multi-day events: diversity blended with novelty, minus the
//! usual violation penalty.
//!
//! Every pair on the day's roster gets a weight in `[0, 1]` from its history: the
//! number of previous meetings, amplified when the last meeting was the day
//! before, relative to the most frequent pair. The partition's interaction penalty
//! is the mean weight over its co-located pairs. The day score mixes diversity and
//! `1 - penalty` and stays in `[0, 1]`, so one hard violation still costs more than
//! any seating can gain from fresh encounters.

use super::history::{InteractionStore, PersonPair};
use crate::constraints::{Severity, Violation, ViolationSource};
use crate::error::{Result, SeatingError};
use crate::objective::{Objective, ObjectiveReport, SeatingObjective};
use crate::partition::Partition;
use crate::roster::{PersonId, PersonIndex};

/// How history turns into a penalty.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionPenalty {
    /// Importance of fresh encounters relative to diversity. A weight `w` gives
    /// novelty the share `w / (1 + w)` of the day score.
    pub weight: f64,
    /// Amplification for pairs that last met on the previous day.
    pub consecutive_multiplier: f64,
    /// Pairs that already met this often may not share a table again.
    pub max_repeats: Option<u32>,
}

impl Default for InteractionPenalty {
    fn default() -> Self {
        Self {
            weight: 1.0,
            consecutive_multiplier: 1.5,
            max_repeats: None,
        }
    }
}

impl InteractionPenalty {
    pub fn validate(&self) -> Result<()> {
        if !self.weight.is_finite() || self.weight < 0.0 {
            return Err(SeatingError::Configuration(
                "Interaction penalty weight must be finite and non-negative".to_string(),
            ));
        }
        if !self.consecutive_multiplier.is_finite() || self.consecutive_multiplier < 1.0 {
            return Err(SeatingError::Configuration(
                "Consecutive-day multiplier must be at least 1.0".to_string(),
            ));
        }
        Ok(())
    }
}

/// [`SeatingObjective`] extended with interaction history for one day.
#[derive(Debug, Clone)]
pub struct RotationObjective {
    base: SeatingObjective,
    settings: InteractionPenalty,
    people: usize,
    /// Dense `people × people` matrices indexed by day-roster index. Weights are
    /// normalized to `[0, 1]`.
    weights: Vec<f64>,
    counts: Vec<u32>,
}

impl RotationObjective {
    /// Loads the history of every pair on the base objective's roster.
    /// Pairs involving people not on that roster are ignored.
    ///
    /// A pair's weight is its meeting count, times the consecutive-day multiplier
    /// when it last met on `day - 1`, divided by the largest weight any pair could
    /// have so far (the highest count times the multiplier).
    pub fn new(
        base: SeatingObjective,
        store: &dyn InteractionStore,
        day: u32,
        settings: InteractionPenalty,
    ) -> Result<Self> {
        settings.validate()?;
        let roster = base.roster();
        let people = roster.len();
        let mut weights = vec![0.0; people * people];
        let mut counts = vec![0; people * people];

        let mut max_count = 0;
        for record in store.records()? {
            let (Some(a), Some(b)) = (
                roster.index_of(record.pair.first()),
                roster.index_of(record.pair.second()),
            ) else {
                continue;
            };
            let consecutive = day > 0 && record.last_day() == Some(day - 1);
            let multiplier = if consecutive {
                settings.consecutive_multiplier
            } else {
                1.0
            };
            max_count = max_count.max(record.count);
            let weight = record.count as f64 * multiplier;
            for (i, j) in [(a, b), (b, a)] {
                weights[i * people + j] = weight;
                counts[i * people + j] = record.count;
            }
        }

        let ceiling = max_count as f64 * settings.consecutive_multiplier;
        if ceiling > 0.0 {
            weights.iter_mut().for_each(|weight| *weight /= ceiling);
        }

        Ok(Self {
            base,
            settings,
            people,
            weights,
            counts,
        })
    }

    pub fn base(&self) -> &SeatingObjective {
        &self.base
    }

    pub fn settings(&self) -> &InteractionPenalty {
        &self.settings
    }

    /// Normalized penalty weight of a pair on this day, in `[0, 1]`; 0 for pairs
    /// that never met or that are not on the day's roster.
    pub fn pair_weight(&self, a: &PersonId, b: &PersonId) -> f64 {
        let roster = self.base.roster();
        match (roster.index_of(a), roster.index_of(b)) {
            (Some(a), Some(b)) => self.weight(a, b),
            _ => 0.0,
        }
    }

    /// Mean pair weight over the co-located pairs of `partition`, in `[0, 1]`.
    pub fn interaction_penalty(&self, partition: &Partition) -> f64 {
        let pairs = partition.co_located_pairs();
        if pairs.is_empty() {
            return 0.0;
        }
        let total: f64 = pairs.iter().map(|&(a, b, _)| self.weight(a, b)).sum();
        total / pairs.len() as f64
    }

    /// Share of the day score that rewards fresh encounters.
    pub fn novelty_share(&self) -> f64 {
        self.settings.weight / (1.0 + self.settings.weight)
    }

    /// A hard violation per co-located pair that has reached the repeat cap.
    pub fn repeat_violations(&self, partition: &Partition) -> Vec<Violation> {
        let Some(cap) = self.settings.max_repeats else {
            return Vec::new();
        };
        let roster = self.base.roster();
        partition
            .co_located_pairs()
            .into_iter()
            .filter(|&(a, b, _)| self.count(a, b) >= cap)
            .map(|(a, b, table)| {
                let name = |idx| roster.id_of(idx).map_or("?", PersonId::as_str);
                Violation::new(
                    ViolationSource::RepeatCap,
                    Severity::Hard,
                    format!(
                        "{} and {} already shared a table {} times (cap {})",
                        name(a),
                        name(b),
                        self.count(a, b),
                        cap
                    ),
                    Some(table),
                )
            })
            .collect()
    }

    /// Diversity and novelty blended into `[0, 1]`, so a hard violation weighs as
    /// much against it as it does against a single-day score.
    fn blend(&self, diversity: f64, penalty: f64) -> f64 {
        let share = self.novelty_share();
        (1.0 - share) * diversity + share * (1.0 - penalty)
    }

    fn violations(&self, partition: &Partition) -> Vec<Violation> {
        let mut violations = self.base.evaluator().evaluate(partition);
        violations.extend(self.repeat_violations(partition));
        violations
    }

    fn weight(&self, a: PersonIndex, b: PersonIndex) -> f64 {
        if a < self.people && b < self.people {
            self.weights[a * self.people + b]
        } else {
            0.0
        }
    }

    fn count(&self, a: PersonIndex, b: PersonIndex) -> u32 {
        if a < self.people && b < self.people {
            self.counts[a * self.people + b]
        } else {
            0
        }
    }
}

impl Objective for RotationObjective {
    fn fitness(&self, partition: &Partition) -> f64 {
        let diversity = self.base.diversity().score(partition);
        self.blend(diversity, self.interaction_penalty(partition))
            - self.base.weights().penalty(&self.violations(partition))
    }

    fn table_scores(&self, partition: &Partition) -> Vec<f64> {
        let diversity = self.base.diversity().table_scores(partition);
        let mut scores: Vec<f64> = diversity
            .iter()
            .zip(partition.iter())
            .map(|(&table_diversity, (_, occupants))| {
                let mut total = 0.0;
                let mut pairs = 0usize;
                for (i, &a) in occupants.iter().enumerate() {
                    for &b in &occupants[i + 1..] {
                        total += self.weight(a, b);
                        pairs += 1;
                    }
                }
                let penalty = if pairs > 0 { total / pairs as f64 } else { 0.0 };
                self.blend(table_diversity, penalty)
            })
            .collect();
        let weights = self.base.weights();
        for violation in self.violations(partition) {
            if let Some(slot) = violation.table.and_then(|t| scores.get_mut(t - 1)) {
                *slot -= weights.scale * weights.weight(violation.severity);
            }
        }
        scores
    }

    fn report(&self, partition: &Partition) -> ObjectiveReport {
        let diversity = self.base.diversity().breakdown(partition);
        let violations = self.violations(partition);
        let penalty = self.interaction_penalty(partition);
        ObjectiveReport {
            fitness: self.blend(diversity.overall, penalty) - self.base.weights().penalty(&violations),
            diversity,
            violations,
            interaction_penalty: self.novelty_share() * penalty,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::constraints::{ConstraintEvaluator, Rule, RuleKind, Target};
    use crate::diversity::{Aggregation, DiversityCalculator, Dimension};
    use crate::objective::PenaltyWeights;
    use crate::rotation::history::InteractionHistory;
    use crate::roster::{Person, Roster};

    fn base_with(rules: Vec<Rule>) -> SeatingObjective {
        let genders = ["f", "m", "m", "f"];
        let roster = Arc::new(
            Roster::new(
                (0..4)
                    .map(|i| Person::new(format!("p{}", i)).with_attribute("gender", genders[i]))
                    .collect(),
            )
            .unwrap(),
        );
        let diversity =
            DiversityCalculator::new(&roster, &[Dimension::new("gender")], Aggregation::Mean, 0.5)
                .unwrap();
        SeatingObjective::new(
            diversity,
            ConstraintEvaluator::new(roster, rules),
            PenaltyWeights::default(),
        )
    }

    fn base() -> SeatingObjective {
        base_with(Vec::new())
    }

    fn pair(a: &str, b: &str) -> PersonPair {
        PersonPair::new(PersonId::from(a), PersonId::from(b))
    }

    fn history() -> InteractionHistory {
        let history = InteractionHistory::new();
        history.record_day(1, &[(pair("p0", "p1"), 1)]).unwrap();
        history
            .record_day(2, &[(pair("p0", "p1"), 1), (pair("p2", "p3"), 2)])
            .unwrap();
        history
    }

    #[test]
    fn test_pair_weights() {
        let objective =
            RotationObjective::new(base(), &history(), 3, InteractionPenalty::default()).unwrap();
        // met twice, last on day 2: the heaviest possible weight
        assert!((objective.pair_weight(&"p0".into(), &"p1".into()) - 1.0).abs() < 1e-12);
        assert!((objective.pair_weight(&"p3".into(), &"p2".into()) - 0.5).abs() < 1e-12);
        assert_eq!(objective.pair_weight(&"p0".into(), &"p2".into()), 0.0);
        assert_eq!(objective.pair_weight(&"p0".into(), &"zz".into()), 0.0);

        let later =
            RotationObjective::new(base(), &history(), 5, InteractionPenalty::default()).unwrap();
        assert!((later.pair_weight(&"p0".into(), &"p1".into()) - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_penalty_lowers_fitness_of_repeats() {
        let objective =
            RotationObjective::new(base(), &history(), 3, InteractionPenalty::default()).unwrap();
        let repeat = Partition::from_tables(vec![vec![0, 1], vec![2, 3]], 3);
        let fresh = Partition::from_tables(vec![vec![0, 2], vec![1, 3]], 3);
        assert!((objective.interaction_penalty(&repeat) - 0.75).abs() < 1e-12);
        assert_eq!(objective.interaction_penalty(&fresh), 0.0);
        assert!(objective.fitness(&fresh) > objective.fitness(&repeat));

        let report = objective.report(&repeat);
        assert!((report.interaction_penalty - 0.375).abs() < 1e-12);
        assert!((report.fitness - objective.fitness(&repeat)).abs() < 1e-12);
        let tables: f64 = objective.table_scores(&repeat).iter().sum();
        assert!(tables < objective.table_scores(&fresh).iter().sum::<f64>());
    }

    #[test]
    fn test_history_never_outweighs_hard_rule() {
        let apart = Rule::new(1, "apart", RuleKind::Separation)
            .with_target(Target::people(["p0", "p1"]))
            .with_severity(Severity::Hard);
        let history = InteractionHistory::new();
        for day in 1..=4 {
            history
                .record_day(day, &[(pair("p0", "p2"), 1), (pair("p1", "p3"), 2)])
                .unwrap();
        }
        let settings = InteractionPenalty {
            weight: 50.0,
            ..InteractionPenalty::default()
        };
        let objective = RotationObjective::new(base_with(vec![apart]), &history, 5, settings).unwrap();

        let breaks_rule = Partition::from_tables(vec![vec![0, 1], vec![2, 3]], 3);
        let all_repeats = Partition::from_tables(vec![vec![0, 2], vec![1, 3]], 3);
        assert_eq!(objective.interaction_penalty(&breaks_rule), 0.0);
        assert!((objective.interaction_penalty(&all_repeats) - 1.0).abs() < 1e-12);
        assert!(objective.fitness(&all_repeats) > objective.fitness(&breaks_rule));
        assert!(objective.fitness(&breaks_rule) <= 0.0);
    }

    #[test]
    fn test_repeat_cap() {
        let settings = InteractionPenalty {
            max_repeats: Some(2),
            ..InteractionPenalty::default()
        };
        let objective = RotationObjective::new(base(), &history(), 3, settings).unwrap();
        let repeat = Partition::from_tables(vec![vec![0, 1], vec![2, 3]], 3);
        let violations = objective.repeat_violations(&repeat);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].source, ViolationSource::RepeatCap);
        assert_eq!(violations[0].table, Some(1));
        assert_eq!(objective.report(&repeat).violations.len(), 1);
    }

    #[test]
    fn test_invalid_settings() {
        let settings = InteractionPenalty {
            consecutive_multiplier: 0.5,
            ..InteractionPenalty::default()
        };
        assert!(RotationObjective::new(base(), &history(), 3, settings).is_err());
    }
}
