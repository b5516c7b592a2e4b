use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use tracing::info;

use super::coverage::CoverageReport;
use super::history::InteractionStore;
use super::objective::RotationObjective;
use super::strategy::{structured_partition, RotationOptions, RotationStrategy};
use crate::constraints::Rule;
use crate::error::{Result, SeatingError};
use crate::objective::Objective;
use crate::optimization::{
    OptimizationResult, OptimizationStats, SeatingOptimizer, SeatingProblem,
};
use crate::partition::Partition;
use crate::rng::RandomNumberGenerator;
use crate::roster::{EventConfig, PersonId, PersonIndex, Roster};

/// One day of a series: its number and who is away.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DaySchedule {
    pub day: u32,
    pub absent: HashSet<PersonId>,
}

impl DaySchedule {
    pub fn new(day: u32) -> Self {
        Self {
            day,
            absent: HashSet::new(),
        }
    }

    pub fn with_absent<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<PersonId>,
    {
        self.absent.extend(ids.into_iter().map(Into::into));
        self
    }
}

/// The finalized seating of one day.
#[derive(Debug, Clone)]
pub struct DayOutcome {
    pub day: u32,
    /// Result over the day roster; indices refer to `roster`.
    pub result: OptimizationResult,
    pub roster: Arc<Roster>,
    pub interaction_penalty: f64,
    /// Coverage of the full event roster after this day was recorded.
    pub coverage: CoverageReport,
}

#[derive(Debug, Clone)]
pub struct RotationPlan {
    pub days: Vec<DayOutcome>,
    pub coverage: CoverageReport,
}

/// Plans a multi-day series, one optimization per day, recording each finalized
/// day into the interaction store before planning the next.
#[derive(Debug)]
pub struct RotationPlanner<S: InteractionStore> {
    roster: Arc<Roster>,
    event: EventConfig,
    rules: Vec<Rule>,
    options: RotationOptions,
    store: S,
}

impl<S: InteractionStore> RotationPlanner<S> {
    pub fn new(
        roster: Arc<Roster>,
        event: EventConfig,
        rules: Vec<Rule>,
        options: RotationOptions,
        store: S,
    ) -> Self {
        Self {
            roster,
            event,
            rules,
            options,
            store,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn options(&self) -> &RotationOptions {
        &self.options
    }

    /// Plans every day in order.
    pub fn plan(
        &self,
        days: &[DaySchedule],
        rng: &mut RandomNumberGenerator,
    ) -> Result<RotationPlan> {
        self.options.validate()?;
        let mut outcomes = Vec::with_capacity(days.len());
        for (day_index, schedule) in days.iter().enumerate() {
            outcomes.push(self.plan_day(schedule, day_index, rng)?);
        }
        let coverage = CoverageReport::compute(&self.roster, &self.store)?;
        Ok(RotationPlan {
            days: outcomes,
            coverage,
        })
    }

    /// Objective for `day` over `day_roster`, reflecting the history so far.
    pub fn build_objective(
        &self,
        day_roster: Arc<Roster>,
        day: u32,
        day_index: usize,
    ) -> Result<RotationObjective> {
        let strategy = &self.options.strategy;
        let problem = SeatingProblem::new(day_roster, self.event, self.rules.clone());
        let base = self.day_optimizer().build_objective(&problem)?;
        RotationObjective::new(base, &self.store, day, strategy.penalty(&self.options, day_index))
    }

    /// Seats one day and records its pairs.
    pub fn plan_day(
        &self,
        schedule: &DaySchedule,
        day_index: usize,
        rng: &mut RandomNumberGenerator,
    ) -> Result<DayOutcome> {
        let day_roster = Arc::new(self.roster.without(&schedule.absent)?);
        if day_roster.len() < 2 {
            return Err(SeatingError::InsufficientRoster {
                found: day_roster.len(),
            });
        }
        self.event.validate(day_roster.len())?;

        let strategy = &self.options.strategy;
        info!(
            day = schedule.day,
            strategy = strategy.name(),
            searched = strategy.searches(),
            people = day_roster.len(),
            absent = schedule.absent.len(),
            "Planning rotation day"
        );

        let objective = self.build_objective(Arc::clone(&day_roster), schedule.day, day_index)?;
        let result = match strategy {
            RotationStrategy::Structured => {
                let partition = structured_partition(day_roster.len(), &self.event, day_index);
                fixed_result(&objective, &day_roster, partition, strategy.name())
            }
            RotationStrategy::CustomPattern(days) => {
                let partition = self.custom_partition(days, &day_roster, schedule.day, day_index)?;
                fixed_result(&objective, &day_roster, partition, strategy.name())
            }
            _ => {
                let initial = Partition::round_robin(day_roster.len(), &self.event);
                self.day_optimizer()
                    .optimize_with(&objective, &day_roster, initial, rng)?
            }
        };

        let recorded = self
            .store
            .record_partition(schedule.day, &result.partition, &day_roster)?;
        let coverage = CoverageReport::compute(&self.roster, &self.store)?;
        let interaction_penalty = objective.report(&result.partition).interaction_penalty;

        info!(
            day = schedule.day,
            score = result.score,
            interaction_penalty,
            pairs_recorded = recorded,
            coverage = coverage.coverage_percentage,
            "Rotation day finalized"
        );

        Ok(DayOutcome {
            day: schedule.day,
            result,
            roster: day_roster,
            interaction_penalty,
            coverage,
        })
    }

    fn day_optimizer(&self) -> SeatingOptimizer {
        let strategy = &self.options.strategy;
        let mut options = self.options.optimization.clone();
        options.set_dimensions(strategy.dimensions(&self.options));
        options.set_strategy(strategy.search(&self.options));
        SeatingOptimizer::new(options)
    }

    /// The caller's seating for this day: absentees are dropped, people the
    /// pattern leaves out fill the first free seats.
    fn custom_partition(
        &self,
        days: &[Vec<Vec<PersonId>>],
        day_roster: &Roster,
        day: u32,
        day_index: usize,
    ) -> Result<Partition> {
        let pattern = days.get(day_index).ok_or_else(|| {
            SeatingError::Configuration(format!("No custom seating given for day {}", day))
        })?;
        if pattern.len() > self.event.table_count {
            return Err(SeatingError::Configuration(format!(
                "Custom seating for day {} uses {} tables, the event has {}",
                day,
                pattern.len(),
                self.event.table_count
            )));
        }

        let capacity = self.event.table_capacity;
        let mut placed = vec![false; day_roster.len()];
        let mut tables: Vec<Vec<PersonIndex>> = vec![Vec::new(); self.event.table_count];
        for (table, ids) in pattern.iter().enumerate() {
            for id in ids {
                let Some(person) = day_roster.index_of(id) else {
                    if self.roster.index_of(id).is_some() {
                        continue;
                    }
                    return Err(SeatingError::UnknownPerson(id.clone()));
                };
                if placed[person] {
                    return Err(SeatingError::Configuration(format!(
                        "{} is seated twice in the custom seating for day {}",
                        id, day
                    )));
                }
                placed[person] = true;
                tables[table].push(person);
            }
            if tables[table].len() > capacity {
                return Err(SeatingError::Configuration(format!(
                    "Table {} seats {} people on day {}, capacity is {}",
                    table + 1,
                    tables[table].len(),
                    day,
                    capacity
                )));
            }
        }

        for person in (0..day_roster.len()).filter(|&person| !placed[person]) {
            let target = tables
                .iter()
                .position(|occupants| occupants.len() < capacity)
                .ok_or(SeatingError::InsufficientCapacity {
                    people: day_roster.len(),
                    capacity: self.event.total_seats(),
                })?;
            tables[target].push(person);
        }
        Ok(Partition::from_tables(tables, capacity))
    }
}

/// Result record for a day whose seating was not searched for.
fn fixed_result(
    objective: &dyn Objective,
    roster: &Roster,
    partition: Partition,
    strategy: &str,
) -> OptimizationResult {
    let report = objective.report(&partition);
    OptimizationResult {
        seating: partition.seating(roster),
        partition,
        score: report.fitness,
        diversity: report.diversity,
        violations: report.violations,
        strategy: strategy.to_string(),
        parameters: BTreeMap::new(),
        stats: OptimizationStats {
            initial_score: report.fitness,
            final_score: report.fitness,
            best_score_history: vec![report.fitness],
            ..OptimizationStats::default()
        },
    }
}
