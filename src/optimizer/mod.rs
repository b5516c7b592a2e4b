//! # Optimizer Strategies
//!
//! Three search strategies share one neighbor/acceptance contract,
//! [`NeighborSearch`]:
//!
//! - [`RandomSwapOptimizer`]: hill climbing over swap/move/shuffle moves that only
//!   ever accepts strict improvements.
//! - [`SimulatedAnnealingOptimizer`]: temperature-controlled acceptance of
//!   regressions with a move mix that grows bolder while the temperature is high.
//! - [`GeneticAlgorithmOptimizer`]: a population evolved by tournament selection,
//!   table-wise crossover and mutation. Each neighbor request advances one
//!   generation and yields its best individual.
//!
//! The set is closed: [`Strategy`] dispatches to the three implementations and
//! [`StrategyConfig`] selects and parameterizes one, including by name.

pub mod annealing;
pub mod genetic;
pub mod operators;
pub mod random_swap;

use std::fmt::Debug;
use std::str::FromStr;

use crate::error::{Result, SeatingError};
use crate::objective::Objective;
use crate::partition::Partition;
use crate::rng::RandomNumberGenerator;

pub use annealing::{AnnealingConfig, SimulatedAnnealingOptimizer};
pub use genetic::{GeneticAlgorithmOptimizer, GeneticConfig};
pub use operators::{MoveKind, WeightedTable};
pub use random_swap::{RandomSwapConfig, RandomSwapOptimizer};

/// What a strategy may consult while producing a neighbor.
pub struct SearchContext<'a> {
    pub objective: &'a dyn Objective,
    pub rng: &'a mut RandomNumberGenerator,
}

impl<'a> SearchContext<'a> {
    pub fn new(objective: &'a dyn Objective, rng: &'a mut RandomNumberGenerator) -> Self {
        Self { objective, rng }
    }
}

/// The contract every search strategy implements.
pub trait NeighborSearch: Debug + Send {
    /// Stable strategy name reported in results.
    fn name(&self) -> &'static str;

    /// Produces one candidate from `current` using the elementary moves.
    fn generate_neighbor(&mut self, current: &Partition, ctx: &mut SearchContext<'_>) -> Partition;

    /// Decides whether the working state advances to the candidate.
    fn should_accept(
        &mut self,
        current_score: f64,
        candidate_score: f64,
        iteration: usize,
        rng: &mut RandomNumberGenerator,
    ) -> bool;

    /// Per-iteration state update, such as cooling.
    fn update_parameters(&mut self, _iteration: usize) {}

    /// Current parameter values, reported alongside results.
    fn parameters(&self) -> Vec<(&'static str, f64)>;
}

/// Selects a strategy and its parameters.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum StrategyConfig {
    RandomSwap(RandomSwapConfig),
    SimulatedAnnealing(AnnealingConfig),
    Genetic(GeneticConfig),
}

impl Default for StrategyConfig {
    fn default() -> Self {
        StrategyConfig::SimulatedAnnealing(AnnealingConfig::default())
    }
}

impl StrategyConfig {
    /// Resolves a strategy by name with default parameters.
    ///
    /// # Errors
    ///
    /// Unknown names are a [`SeatingError::Configuration`].
    pub fn from_name(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "random_swap" | "random" | "hill_climbing" => {
                Ok(StrategyConfig::RandomSwap(RandomSwapConfig::default()))
            }
            "simulated_annealing" | "annealing" | "sa" => {
                Ok(StrategyConfig::SimulatedAnnealing(AnnealingConfig::default()))
            }
            "genetic" | "genetic_algorithm" | "ga" => {
                Ok(StrategyConfig::Genetic(GeneticConfig::default()))
            }
            _ => Err(SeatingError::Configuration(format!(
                "Unknown optimization strategy '{}'",
                name
            ))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            StrategyConfig::RandomSwap(_) => random_swap::NAME,
            StrategyConfig::SimulatedAnnealing(_) => annealing::NAME,
            StrategyConfig::Genetic(_) => genetic::NAME,
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            StrategyConfig::RandomSwap(config) => config.validate(),
            StrategyConfig::SimulatedAnnealing(config) => config.validate(),
            StrategyConfig::Genetic(config) => config.validate(),
        }
    }
}

impl FromStr for StrategyConfig {
    type Err = SeatingError;

    fn from_str(name: &str) -> Result<Self> {
        Self::from_name(name)
    }
}

/// A ready-to-run strategy.
#[derive(Debug, Clone)]
pub enum Strategy {
    RandomSwap(RandomSwapOptimizer),
    SimulatedAnnealing(SimulatedAnnealingOptimizer),
    Genetic(GeneticAlgorithmOptimizer),
}

impl Strategy {
    /// Validates `config` and builds the matching strategy.
    pub fn from_config(config: &StrategyConfig) -> Result<Self> {
        Ok(match config {
            StrategyConfig::RandomSwap(c) => Strategy::RandomSwap(RandomSwapOptimizer::new(c.clone())?),
            StrategyConfig::SimulatedAnnealing(c) => {
                Strategy::SimulatedAnnealing(SimulatedAnnealingOptimizer::new(c.clone())?)
            }
            StrategyConfig::Genetic(c) => Strategy::Genetic(GeneticAlgorithmOptimizer::new(c.clone())?),
        })
    }

    fn inner(&self) -> &dyn NeighborSearch {
        match self {
            Strategy::RandomSwap(s) => s,
            Strategy::SimulatedAnnealing(s) => s,
            Strategy::Genetic(s) => s,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn NeighborSearch {
        match self {
            Strategy::RandomSwap(s) => s,
            Strategy::SimulatedAnnealing(s) => s,
            Strategy::Genetic(s) => s,
        }
    }
}

impl NeighborSearch for Strategy {
    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn generate_neighbor(&mut self, current: &Partition, ctx: &mut SearchContext<'_>) -> Partition {
        self.inner_mut().generate_neighbor(current, ctx)
    }

    fn should_accept(
        &mut self,
        current_score: f64,
        candidate_score: f64,
        iteration: usize,
        rng: &mut RandomNumberGenerator,
    ) -> bool {
        self.inner_mut()
            .should_accept(current_score, candidate_score, iteration, rng)
    }

    fn update_parameters(&mut self, iteration: usize) {
        self.inner_mut().update_parameters(iteration)
    }

    fn parameters(&self) -> Vec<(&'static str, f64)> {
        self.inner().parameters()
    }
}
