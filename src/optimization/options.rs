//! # OptimizationOptions
//!
//! Everything one optimization run is configured with, passed explicitly into
//! [`SeatingOptimizer`](super::SeatingOptimizer) at call time.
//!
//! ## Example
//!
//! ```rust
//! use std::time::Duration;
//! use seatplan::optimization::OptimizationOptions;
//! use seatplan::optimizer::StrategyConfig;
//!
//! let options = OptimizationOptions::builder()
//!     .strategy(StrategyConfig::from_name("random_swap").unwrap())
//!     .max_runtime(Duration::from_millis(200))
//!     .max_iterations(5_000)
//!     .build();
//!
//! assert_eq!(options.get_max_iterations(), Some(5_000));
//! assert!(options.validate().is_ok());
//! ```

use std::time::Duration;

use crate::diversity::{Aggregation, Dimension};
use crate::error::{Result, SeatingError};
use crate::objective::PenaltyWeights;
use crate::optimizer::StrategyConfig;

const DEFAULT_MAX_RUNTIME: Duration = Duration::from_secs(5);
const DEFAULT_MIN_CONFIDENCE: f64 = 0.5;

#[derive(Debug, Clone)]
pub struct OptimizationOptions {
    strategy: StrategyConfig,
    max_runtime: Duration,
    max_iterations: Option<usize>,
    penalty_weights: PenaltyWeights,
    dimensions: Vec<Dimension>,
    aggregation: Aggregation,
    min_confidence: f64,
}

impl OptimizationOptions {
    pub fn new(strategy: StrategyConfig, max_runtime: Duration) -> Self {
        Self {
            strategy,
            max_runtime,
            ..Self::default()
        }
    }

    pub fn get_strategy(&self) -> &StrategyConfig {
        &self.strategy
    }

    /// Wall-clock budget of the search loop.
    pub fn get_max_runtime(&self) -> Duration {
        self.max_runtime
    }

    /// Optional iteration cap, applied in addition to the wall-clock budget.
    pub fn get_max_iterations(&self) -> Option<usize> {
        self.max_iterations
    }

    pub fn get_penalty_weights(&self) -> &PenaltyWeights {
        &self.penalty_weights
    }

    pub fn get_dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    pub fn get_aggregation(&self) -> Aggregation {
        self.aggregation
    }

    pub fn get_min_confidence(&self) -> f64 {
        self.min_confidence
    }

    pub fn set_strategy(&mut self, strategy: StrategyConfig) {
        self.strategy = strategy;
    }

    pub fn set_max_runtime(&mut self, max_runtime: Duration) {
        self.max_runtime = max_runtime;
    }

    pub fn set_max_iterations(&mut self, max_iterations: Option<usize>) {
        self.max_iterations = max_iterations;
    }

    pub fn set_penalty_weights(&mut self, weights: PenaltyWeights) {
        self.penalty_weights = weights;
    }

    pub fn set_dimensions(&mut self, dimensions: Vec<Dimension>) {
        self.dimensions = dimensions;
    }

    pub fn set_aggregation(&mut self, aggregation: Aggregation) {
        self.aggregation = aggregation;
    }

    pub fn set_min_confidence(&mut self, min_confidence: f64) {
        self.min_confidence = min_confidence;
    }

    pub fn builder() -> OptimizationOptionsBuilder {
        OptimizationOptionsBuilder::default()
    }

    pub fn validate(&self) -> Result<()> {
        self.strategy.validate()?;
        self.penalty_weights.validate()?;
        if self.dimensions.is_empty() {
            return Err(SeatingError::Configuration(
                "At least one diversity dimension is required".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(SeatingError::Configuration(
                "Minimum confidence must be between 0.0 and 1.0".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for OptimizationOptions {
    fn default() -> Self {
        Self {
            strategy: StrategyConfig::default(),
            max_runtime: DEFAULT_MAX_RUNTIME,
            max_iterations: None,
            penalty_weights: PenaltyWeights::default(),
            dimensions: Dimension::defaults(),
            aggregation: Aggregation::default(),
            min_confidence: DEFAULT_MIN_CONFIDENCE,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct OptimizationOptionsBuilder {
    strategy: Option<StrategyConfig>,
    max_runtime: Option<Duration>,
    max_iterations: Option<usize>,
    penalty_weights: Option<PenaltyWeights>,
    dimensions: Option<Vec<Dimension>>,
    aggregation: Option<Aggregation>,
    min_confidence: Option<f64>,
}

impl OptimizationOptionsBuilder {
    pub fn strategy(mut self, value: StrategyConfig) -> Self {
        self.strategy = Some(value);
        self
    }

    pub fn max_runtime(mut self, value: Duration) -> Self {
        self.max_runtime = Some(value);
        self
    }

    pub fn max_iterations(mut self, value: usize) -> Self {
        self.max_iterations = Some(value);
        self
    }

    pub fn penalty_weights(mut self, value: PenaltyWeights) -> Self {
        self.penalty_weights = Some(value);
        self
    }

    pub fn dimensions(mut self, value: Vec<Dimension>) -> Self {
        self.dimensions = Some(value);
        self
    }

    pub fn aggregation(mut self, value: Aggregation) -> Self {
        self.aggregation = Some(value);
        self
    }

    pub fn min_confidence(mut self, value: f64) -> Self {
        self.min_confidence = Some(value);
        self
    }

    pub fn build(self) -> OptimizationOptions {
        OptimizationOptions {
            strategy: self.strategy.unwrap_or_default(),
            max_runtime: self.max_runtime.unwrap_or(DEFAULT_MAX_RUNTIME),
            max_iterations: self.max_iterations,
            penalty_weights: self.penalty_weights.unwrap_or_default(),
            dimensions: self.dimensions.unwrap_or_else(Dimension::defaults),
            aggregation: self.aggregation.unwrap_or_default(),
            min_confidence: self.min_confidence.unwrap_or(DEFAULT_MIN_CONFIDENCE),
        }
    }
}
