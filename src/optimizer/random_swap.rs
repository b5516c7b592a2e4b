use crate::error::{Result, SeatingError};
use crate::optimizer::operators::{self, MoveKind, WeightedTable};
use crate::optimizer::{NeighborSearch, SearchContext};
use crate::partition::Partition;
use crate::rng::RandomNumberGenerator;

pub(crate) const NAME: &str = "random_swap";

/// Move mix of the hill climber.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct RandomSwapConfig {
    pub swap_weight: f64,
    pub move_weight: f64,
    pub shuffle_weight: f64,
}

impl Default for RandomSwapConfig {
    fn default() -> Self {
        Self {
            swap_weight: 0.80,
            move_weight: 0.15,
            shuffle_weight: 0.05,
        }
    }
}

impl RandomSwapConfig {
    pub fn with_weights(mut self, swap: f64, mv: f64, shuffle: f64) -> Self {
        self.swap_weight = swap;
        self.move_weight = mv;
        self.shuffle_weight = shuffle;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let weights = [self.swap_weight, self.move_weight, self.shuffle_weight];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) || weights.iter().sum::<f64>() <= 0.0
        {
            return Err(SeatingError::Configuration(
                "Random swap weights must be non-negative and not all zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Hill climbing: random swap/move/shuffle moves, strict improvements only.
///
/// Because regressions are never accepted, the working state's score never
/// decreases across accepted steps.
#[derive(Debug, Clone)]
pub struct RandomSwapOptimizer {
    config: RandomSwapConfig,
    moves: WeightedTable<MoveKind>,
}

impl RandomSwapOptimizer {
    /// # Errors
    ///
    /// [`SeatingError::Configuration`] when `config` does not validate.
    pub fn new(config: RandomSwapConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid(config))
    }

    fn from_valid(config: RandomSwapConfig) -> Self {
        let moves = WeightedTable::new([
            (MoveKind::Swap, config.swap_weight),
            (MoveKind::Move, config.move_weight),
            (MoveKind::Shuffle, config.shuffle_weight),
        ]);
        Self { config, moves }
    }
}

impl Default for RandomSwapOptimizer {
    fn default() -> Self {
        Self::from_valid(RandomSwapConfig::default())
    }
}

impl NeighborSearch for RandomSwapOptimizer {
    fn name(&self) -> &'static str {
        NAME
    }

    fn generate_neighbor(&mut self, current: &Partition, ctx: &mut SearchContext<'_>) -> Partition {
        let kind = self.moves.pick(ctx.rng).unwrap_or(MoveKind::Swap);
        operators::apply(kind, current, ctx.rng)
    }

    fn should_accept(
        &mut self,
        current_score: f64,
        candidate_score: f64,
        _iteration: usize,
        _rng: &mut RandomNumberGenerator,
    ) -> bool {
        candidate_score > current_score
    }

    fn parameters(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("swap_weight", self.config.swap_weight),
            ("move_weight", self.config.move_weight),
            ("shuffle_weight", self.config.shuffle_weight),
        ]
    }
}
