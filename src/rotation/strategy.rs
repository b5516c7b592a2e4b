use crate::diversity::Dimension;
use crate::error::{Result, SeatingError};
use crate::optimization::OptimizationOptions;
use crate::optimizer::{RandomSwapConfig, StrategyConfig};
use crate::partition::Partition;
use crate::roster::{EventConfig, PersonId, PersonIndex};

use super::objective::InteractionPenalty;

/// How a multi-day series trades diversity against fresh encounters.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RotationStrategy {
    /// The interaction penalty dominates the objective.
    #[default]
    MaximumDiversity,
    /// Deterministic shifted round-robin; no search.
    Structured,
    /// Random-swap search; pairs that met `max_repeats` times may not meet again.
    RandomWithConstraints { max_repeats: u32 },
    /// Caller-supplied seating, one entry per day, each a list of tables.
    CustomPattern(Vec<Vec<Vec<PersonId>>>),
    /// The interaction penalty grows with every day.
    ProgressiveMixing,
    /// Location and agency dimensions weigh more in the diversity score.
    Geographic,
}

impl RotationStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            RotationStrategy::MaximumDiversity => "maximum_diversity",
            RotationStrategy::Structured => "structured",
            RotationStrategy::RandomWithConstraints { .. } => "random_with_constraints",
            RotationStrategy::CustomPattern(_) => "custom_pattern",
            RotationStrategy::ProgressiveMixing => "progressive_mixing",
            RotationStrategy::Geographic => "geographic",
        }
    }

    /// Whether days are produced by the optimizer rather than a fixed layout.
    pub fn searches(&self) -> bool {
        !matches!(
            self,
            RotationStrategy::Structured | RotationStrategy::CustomPattern(_)
        )
    }

    /// Interaction penalty settings for the day at `day_index` (0 = first day).
    pub fn penalty(&self, options: &RotationOptions, day_index: usize) -> InteractionPenalty {
        let mut penalty = options.penalty;
        match self {
            RotationStrategy::MaximumDiversity => penalty.weight *= options.dominance_factor,
            RotationStrategy::ProgressiveMixing => {
                penalty.weight *= 1.0 + options.progression_step * day_index as f64
            }
            RotationStrategy::RandomWithConstraints { max_repeats } => {
                penalty.max_repeats = Some(*max_repeats)
            }
            _ => {}
        }
        penalty
    }

    /// Diversity dimensions to score with.
    pub fn dimensions(&self, options: &RotationOptions) -> Vec<Dimension> {
        let mut dimensions = options.optimization.get_dimensions().to_vec();
        if let RotationStrategy::Geographic = self {
            for name in &options.geographic_dimensions {
                match dimensions.iter_mut().find(|dim| &dim.name == name) {
                    Some(dim) => dim.weight *= options.geographic_boost,
                    None => dimensions.push(Dimension::weighted(
                        name.clone(),
                        options.geographic_boost,
                    )),
                }
            }
        }
        dimensions
    }

    /// Search strategy used on searching days.
    pub fn search(&self, options: &RotationOptions) -> StrategyConfig {
        match self {
            RotationStrategy::RandomWithConstraints { .. } => {
                StrategyConfig::RandomSwap(RandomSwapConfig::default())
            }
            _ => options.optimization.get_strategy().clone(),
        }
    }
}

/// Shifted round-robin: people are dealt in rows of `table_count`; on day `d`,
/// row `r` is rotated by `d * r` tables. Each row lands on distinct tables, so no
/// table exceeds capacity when the event seats everyone.
pub fn structured_partition(people: usize, event: &EventConfig, day_index: usize) -> Partition {
    let tables = event.table_count;
    if tables == 0 {
        return Partition::empty(0, event.table_capacity);
    }
    let mut seating: Vec<Vec<PersonIndex>> = vec![Vec::new(); tables];
    for person in 0..people {
        let row = person / tables;
        let slot = (person % tables + day_index * row) % tables;
        seating[slot].push(person);
    }
    Partition::from_tables(seating, event.table_capacity)
}

/// Configuration of a multi-day series.
#[derive(Debug, Clone)]
pub struct RotationOptions {
    pub strategy: RotationStrategy,
    /// Options of each day's optimization run.
    pub optimization: OptimizationOptions,
    pub penalty: InteractionPenalty,
    /// Penalty multiplier of [`RotationStrategy::MaximumDiversity`].
    pub dominance_factor: f64,
    /// Per-day penalty growth of [`RotationStrategy::ProgressiveMixing`].
    pub progression_step: f64,
    /// Dimensions boosted by [`RotationStrategy::Geographic`].
    pub geographic_dimensions: Vec<String>,
    pub geographic_boost: f64,
}

impl Default for RotationOptions {
    fn default() -> Self {
        Self {
            strategy: RotationStrategy::default(),
            optimization: OptimizationOptions::default(),
            penalty: InteractionPenalty::default(),
            dominance_factor: 2.0,
            progression_step: 0.5,
            geographic_dimensions: vec!["geography".to_string(), "agency_level".to_string()],
            geographic_boost: 3.0,
        }
    }
}

impl RotationOptions {
    pub fn new(strategy: RotationStrategy, optimization: OptimizationOptions) -> Self {
        Self {
            strategy,
            optimization,
            ..Self::default()
        }
    }

    pub fn with_penalty(mut self, penalty: InteractionPenalty) -> Self {
        self.penalty = penalty;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.optimization.validate()?;
        self.penalty.validate()?;
        let factors = [
            ("Dominance factor", self.dominance_factor),
            ("Progression step", self.progression_step),
            ("Geographic boost", self.geographic_boost),
        ];
        for (label, value) in factors {
            if !value.is_finite() || value < 0.0 {
                return Err(SeatingError::Configuration(format!(
                    "{} must be finite and non-negative",
                    label
                )));
            }
        }
        Ok(())
    }
}
