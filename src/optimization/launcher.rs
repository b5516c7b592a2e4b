use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, trace};

use super::options::OptimizationOptions;
use super::result::{OptimizationResult, OptimizationStats};
use crate::constraints::{ConstraintEvaluator, CustomPredicate, Rule};
use crate::diversity::DiversityCalculator;
use crate::error::{Result, SeatingError};
use crate::objective::{Objective, SeatingObjective};
use crate::optimizer::{NeighborSearch, SearchContext, Strategy};
use crate::partition::Partition;
use crate::rng::RandomNumberGenerator;
use crate::roster::{EventConfig, Roster};

/// The inputs of a single-day optimization.
#[derive(Debug, Clone)]
pub struct SeatingProblem {
    pub roster: Arc<Roster>,
    pub event: EventConfig,
    pub rules: Vec<Rule>,
    predicates: Vec<(String, Arc<dyn CustomPredicate>)>,
}

impl SeatingProblem {
    pub fn new(roster: Arc<Roster>, event: EventConfig, rules: Vec<Rule>) -> Self {
        Self {
            roster,
            event,
            rules,
            predicates: Vec::new(),
        }
    }

    /// Supplies the predicate for custom rules naming `name`.
    pub fn with_predicate(
        mut self,
        name: impl Into<String>,
        predicate: Arc<dyn CustomPredicate>,
    ) -> Self {
        self.predicates.push((name.into(), predicate));
        self
    }
}

/// Runs a search strategy against an objective within a time budget and returns
/// the best partition it ever saw.
#[derive(Debug, Clone, Default)]
pub struct SeatingOptimizer {
    options: OptimizationOptions,
}

impl SeatingOptimizer {
    pub fn new(options: OptimizationOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &OptimizationOptions {
        &self.options
    }

    /// Diversity minus constraint penalties for `problem`, as configured.
    pub fn build_objective(&self, problem: &SeatingProblem) -> Result<SeatingObjective> {
        let diversity = DiversityCalculator::new(
            &problem.roster,
            self.options.get_dimensions(),
            self.options.get_aggregation(),
            self.options.get_min_confidence(),
        )?;
        let evaluator = problem.predicates.iter().fold(
            ConstraintEvaluator::with_confidence(
                Arc::clone(&problem.roster),
                problem.rules.clone(),
                self.options.get_min_confidence(),
            ),
            |evaluator, (name, predicate)| {
                evaluator.register_predicate(name.clone(), Arc::clone(predicate))
            },
        );
        Ok(SeatingObjective::new(
            diversity,
            evaluator,
            *self.options.get_penalty_weights(),
        ))
    }

    /// Optimizes the seating of `problem`, starting from a round-robin partition.
    ///
    /// # Errors
    ///
    /// - [`SeatingError::InsufficientRoster`] when fewer than two people are given;
    ///   nothing else is inspected or built in that case.
    /// - [`SeatingError::Configuration`] or [`SeatingError::InsufficientCapacity`]
    ///   for invalid options or an event that cannot seat everyone.
    /// - [`SeatingError::InvalidNumericValue`] when the objective yields a
    ///   non-finite fitness.
    pub fn optimize(
        &self,
        problem: &SeatingProblem,
        rng: &mut RandomNumberGenerator,
    ) -> Result<OptimizationResult> {
        check_roster(&problem.roster)?;
        self.options.validate()?;
        problem.event.validate(problem.roster.len())?;

        let objective = self.build_objective(problem)?;
        let initial = Partition::round_robin(problem.roster.len(), &problem.event);
        self.optimize_with(&objective, &problem.roster, initial, rng)
    }

    /// Optimizes from `initial` under any objective.
    pub fn optimize_with(
        &self,
        objective: &dyn Objective,
        roster: &Roster,
        initial: Partition,
        rng: &mut RandomNumberGenerator,
    ) -> Result<OptimizationResult> {
        check_roster(roster)?;
        self.options.validate()?;
        if !initial.is_complete(roster.len()) {
            return Err(SeatingError::Configuration(
                "Initial partition must seat every roster member exactly once".to_string(),
            ));
        }

        let mut strategy = Strategy::from_config(self.options.get_strategy())?;
        let max_runtime = self.options.get_max_runtime();
        let max_iterations = self.options.get_max_iterations();

        info!(
            strategy = strategy.name(),
            people = roster.len(),
            tables = initial.table_count(),
            max_runtime_ms = max_runtime.as_millis() as u64,
            "Starting seating optimization"
        );

        let start = Instant::now();
        let mut current_score = checked_fitness(objective, &initial, 0)?;
        let mut current = initial;
        let mut best = current.clone();
        let mut best_score = current_score;
        let mut best_fits = best.is_within_capacity();

        let mut stats = OptimizationStats {
            initial_score: current_score,
            best_score_history: vec![best_score],
            ..OptimizationStats::default()
        };

        let mut iteration = 0;
        loop {
            if start.elapsed() >= max_runtime {
                break;
            }
            if max_iterations.is_some_and(|cap| iteration >= cap) {
                break;
            }

            let candidate = {
                let mut ctx = SearchContext::new(objective, rng);
                strategy.generate_neighbor(&current, &mut ctx)
            };
            let candidate_score = checked_fitness(objective, &candidate, iteration)?;

            // Only capacity-respecting partitions may become the reported best.
            if candidate.is_within_capacity() && (candidate_score > best_score || !best_fits) {
                best = candidate.clone();
                best_score = candidate_score;
                best_fits = true;
                stats.improvements += 1;
                stats.best_score_history.push(best_score);
                trace!(iteration, best_score, "New best partition");
            }

            if strategy.should_accept(current_score, candidate_score, iteration, rng) {
                current = candidate;
                current_score = candidate_score;
                stats.accepted_moves += 1;
            }

            strategy.update_parameters(iteration);
            iteration += 1;
        }

        stats.iterations = iteration;
        stats.elapsed = start.elapsed();
        stats.final_score = best_score;

        let parameters: BTreeMap<String, f64> = strategy
            .parameters()
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect();
        debug!(?parameters, "Final strategy parameters");
        info!(
            strategy = strategy.name(),
            iterations = stats.iterations,
            accepted = stats.accepted_moves,
            improvements = stats.improvements,
            initial_score = stats.initial_score,
            final_score = stats.final_score,
            elapsed_ms = stats.elapsed.as_millis() as u64,
            "Seating optimization finished"
        );

        let report = objective.report(&best);
        Ok(OptimizationResult {
            seating: best.seating(roster),
            partition: best,
            score: best_score,
            diversity: report.diversity,
            violations: report.violations,
            strategy: strategy.name().to_string(),
            parameters,
            stats,
        })
    }
}

fn check_roster(roster: &Roster) -> Result<()> {
    if roster.len() < 2 {
        return Err(SeatingError::InsufficientRoster {
            found: roster.len(),
        });
    }
    Ok(())
}

fn checked_fitness(objective: &dyn Objective, partition: &Partition, iteration: usize) -> Result<f64> {
    let fitness = objective.fitness(partition);
    if !fitness.is_finite() {
        return Err(SeatingError::InvalidNumericValue(format!(
            "Non-finite fitness {} at iteration {}",
            fitness, iteration
        )));
    }
    Ok(fitness)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::objective::ObjectiveReport;
    use crate::optimizer::StrategyConfig;
    use crate::roster::Person;

    fn roster(n: usize) -> Arc<Roster> {
        let people = (0..n)
            .map(|i| {
                Person::new(format!("p{}", i))
                    .with_attribute("gender", if i % 2 == 0 { "f" } else { "m" })
                    .with_attribute("seniority", if i < n / 2 { "junior" } else { "senior" })
            })
            .collect();
        Arc::new(Roster::new(people).unwrap())
    }

    fn options(strategy: &str, iterations: usize) -> OptimizationOptions {
        OptimizationOptions::builder()
            .strategy(StrategyConfig::from_name(strategy).unwrap())
            .max_runtime(Duration::from_secs(60))
            .max_iterations(iterations)
            .build()
    }

    #[derive(Debug)]
    struct BrokenObjective;

    impl Objective for BrokenObjective {
        fn fitness(&self, _partition: &Partition) -> f64 {
            f64::NAN
        }

        fn table_scores(&self, partition: &Partition) -> Vec<f64> {
            vec![0.0; partition.table_count()]
        }

        fn report(&self, _partition: &Partition) -> ObjectiveReport {
            ObjectiveReport {
                fitness: f64::NAN,
                diversity: Default::default(),
                violations: Vec::new(),
                interaction_penalty: 0.0,
            }
        }
    }

    #[test]
    fn test_iteration_cap_and_stats() {
        let problem = SeatingProblem::new(roster(8), EventConfig::new(2, 4), Vec::new());
        let optimizer = SeatingOptimizer::new(options("random_swap", 300));
        let mut rng = RandomNumberGenerator::from_seed(42);
        let result = optimizer.optimize(&problem, &mut rng).unwrap();

        assert_eq!(result.stats.iterations, 300);
        assert_eq!(result.strategy, "random_swap");
        assert!(result.partition.is_complete(8));
        assert!(result.partition.is_within_capacity());
        assert!(result.score >= result.stats.initial_score);
        assert_eq!(result.stats.best_score_history.len(), result.stats.improvements + 1);
        assert_eq!(result.seating.values().map(Vec::len).sum::<usize>(), 8);
        assert!(result.parameters.contains_key("swap_weight"));
    }

    #[test]
    fn test_zero_budget_returns_initial() {
        let problem = SeatingProblem::new(roster(6), EventConfig::new(2, 3), Vec::new());
        let mut options = options("simulated_annealing", 100);
        options.set_max_runtime(Duration::ZERO);
        let mut rng = RandomNumberGenerator::from_seed(1);
        let result = SeatingOptimizer::new(options).optimize(&problem, &mut rng).unwrap();
        assert_eq!(result.stats.iterations, 0);
        assert_eq!(result.partition, Partition::round_robin(6, &problem.event));
    }

    #[test]
    fn test_insufficient_capacity() {
        let problem = SeatingProblem::new(roster(10), EventConfig::new(2, 4), Vec::new());
        let mut rng = RandomNumberGenerator::from_seed(1);
        assert!(matches!(
            SeatingOptimizer::default().optimize(&problem, &mut rng),
            Err(SeatingError::InsufficientCapacity {
                people: 10,
                capacity: 8
            })
        ));
    }

    #[test]
    fn test_non_finite_fitness() {
        let roster = roster(4);
        let initial = Partition::round_robin(4, &EventConfig::new(2, 3));
        let mut rng = RandomNumberGenerator::from_seed(1);
        let result = SeatingOptimizer::new(options("random_swap", 10)).optimize_with(
            &BrokenObjective,
            &roster,
            initial,
            &mut rng,
        );
        assert!(matches!(result, Err(SeatingError::InvalidNumericValue(_))));
    }

    #[test]
    fn test_incomplete_initial_partition() {
        let roster = roster(4);
        let initial = Partition::from_tables(vec![vec![0, 1], vec![2]], 3);
        let optimizer = SeatingOptimizer::new(options("random_swap", 10));
        let problem = SeatingProblem::new(Arc::clone(&roster), EventConfig::new(2, 3), Vec::new());
        let objective = optimizer.build_objective(&problem).unwrap();
        let mut rng = RandomNumberGenerator::from_seed(1);
        assert!(matches!(
            optimizer.optimize_with(&objective, &roster, initial, &mut rng),
            Err(SeatingError::Configuration(_))
        ));
    }
}
