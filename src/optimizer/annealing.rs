use crate::error::{Result, SeatingError};
use crate::optimizer::operators::{self, WeightedTable};
use crate::optimizer::{NeighborSearch, SearchContext};
use crate::partition::{self, Partition};
use crate::rng::RandomNumberGenerator;

pub(crate) const NAME: &str = "simulated_annealing";

/// Temperature schedule and move-mix parameters.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct AnnealingConfig {
    pub initial_temperature: f64,
    /// Factor in `(0, 1)` applied to the temperature after every iteration.
    pub cooling_rate: f64,
    pub min_temperature: f64,
    /// Upper bound on swaps chained by a single multi-swap move.
    pub max_multi_swaps: usize,
}

impl Default for AnnealingConfig {
    fn default() -> Self {
        Self {
            initial_temperature: 1.0,
            cooling_rate: 0.9995,
            min_temperature: 0.001,
            max_multi_swaps: 4,
        }
    }
}

impl AnnealingConfig {
    pub fn with_initial_temperature(mut self, temperature: f64) -> Self {
        self.initial_temperature = temperature;
        self
    }

    pub fn with_cooling_rate(mut self, cooling_rate: f64) -> Self {
        self.cooling_rate = cooling_rate;
        self
    }

    pub fn with_min_temperature(mut self, temperature: f64) -> Self {
        self.min_temperature = temperature;
        self
    }

    pub fn with_max_multi_swaps(mut self, swaps: usize) -> Self {
        self.max_multi_swaps = swaps;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.initial_temperature.is_finite() || self.initial_temperature <= 0.0 {
            return Err(SeatingError::Configuration(
                "Initial temperature must be positive".to_string(),
            ));
        }
        if !(self.cooling_rate > 0.0 && self.cooling_rate < 1.0) {
            return Err(SeatingError::Configuration(
                "Cooling rate must be between 0.0 and 1.0 (exclusive)".to_string(),
            ));
        }
        if !self.min_temperature.is_finite()
            || self.min_temperature <= 0.0
            || self.min_temperature > self.initial_temperature
        {
            return Err(SeatingError::Configuration(
                "Minimum temperature must be positive and not above the initial temperature"
                    .to_string(),
            ));
        }
        if self.max_multi_swaps < 2 {
            return Err(SeatingError::Configuration(
                "Multi-swap moves need at least 2 swaps".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AnnealingMove {
    LocalSwap,
    MultiSwap,
    Strategic,
    Reorganize,
}

/// Simulated annealing with Metropolis acceptance and geometric cooling.
///
/// While the temperature is high the move mix favours multi-swaps and whole-table
/// reorganizations; as it cools, local swaps take over and acceptance converges to
/// hill climbing.
#[derive(Debug, Clone)]
pub struct SimulatedAnnealingOptimizer {
    config: AnnealingConfig,
    temperature: f64,
}

impl SimulatedAnnealingOptimizer {
    /// Builds the optimizer at its initial temperature.
    ///
    /// # Errors
    ///
    /// [`SeatingError::Configuration`] when `config` does not validate.
    pub fn new(config: AnnealingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid(config))
    }

    fn from_valid(config: AnnealingConfig) -> Self {
        let temperature = config.initial_temperature;
        Self {
            config,
            temperature,
        }
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Overrides the current temperature, clamped to the configured floor.
    pub fn set_temperature(&mut self, temperature: f64) {
        self.temperature = temperature.max(self.config.min_temperature);
    }

    pub fn config(&self) -> &AnnealingConfig {
        &self.config
    }

    fn move_table(&self) -> WeightedTable<AnnealingMove> {
        let heat = (self.temperature / self.config.initial_temperature).clamp(0.0, 1.0);
        WeightedTable::new([
            (AnnealingMove::LocalSwap, 0.2 + 0.5 * (1.0 - heat)),
            (AnnealingMove::MultiSwap, 0.1 + 0.3 * heat),
            (AnnealingMove::Strategic, 0.2),
            (AnnealingMove::Reorganize, 0.05 + 0.15 * heat),
        ])
    }

    fn multi_swap(&self, current: &Partition, rng: &mut RandomNumberGenerator) -> Partition {
        let swaps = rng.gen_between(2, self.config.max_multi_swaps);
        (0..swaps).fold(current.clone(), |next, _| operators::random_swap(&next, rng))
    }

    /// Moves someone from the worst-scoring table to the best-scoring one, or swaps
    /// them in when the best table is full.
    fn strategic(current: &Partition, ctx: &mut SearchContext<'_>) -> Partition {
        let scores = ctx.objective.table_scores(current);
        let occupied: Vec<(usize, f64)> = scores
            .iter()
            .copied()
            .enumerate()
            .filter(|&(idx, _)| !current.table(idx + 1).is_empty())
            .collect();
        let worst = occupied
            .iter()
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|&(idx, _)| idx + 1);
        let best = occupied
            .iter()
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|&(idx, _)| idx + 1);

        match (worst, best) {
            (Some(from), Some(to)) if from != to => {
                if current.free_seats(to) > 0 {
                    partition::move_person(current, from, to, None, ctx.rng)
                } else {
                    partition::swap(current, from, to, None, None, ctx.rng)
                }
            }
            _ => operators::random_swap(current, ctx.rng),
        }
    }

    fn reorganize(current: &Partition, rng: &mut RandomNumberGenerator) -> Partition {
        let tables = current.table_count();
        if tables < 2 {
            return current.clone();
        }
        let a = rng.gen_index(tables);
        let mut b = rng.gen_index(tables - 1);
        if b >= a {
            b += 1;
        }
        partition::mix_tables(current, a + 1, b + 1, rng)
    }
}

impl Default for SimulatedAnnealingOptimizer {
    fn default() -> Self {
        Self::from_valid(AnnealingConfig::default())
    }
}

impl NeighborSearch for SimulatedAnnealingOptimizer {
    fn name(&self) -> &'static str {
        NAME
    }

    fn generate_neighbor(&mut self, current: &Partition, ctx: &mut SearchContext<'_>) -> Partition {
        match self.move_table().pick(ctx.rng) {
            Some(AnnealingMove::MultiSwap) => self.multi_swap(current, ctx.rng),
            Some(AnnealingMove::Strategic) => Self::strategic(current, ctx),
            Some(AnnealingMove::Reorganize) => Self::reorganize(current, ctx.rng),
            Some(AnnealingMove::LocalSwap) | None => operators::random_swap(current, ctx.rng),
        }
    }

    fn should_accept(
        &mut self,
        current_score: f64,
        candidate_score: f64,
        _iteration: usize,
        rng: &mut RandomNumberGenerator,
    ) -> bool {
        if candidate_score >= current_score {
            return true;
        }
        let delta = current_score - candidate_score;
        let probability = (-delta / self.temperature).exp();
        rng.gen_unit() < probability
    }

    fn update_parameters(&mut self, _iteration: usize) {
        self.temperature = (self.temperature * self.config.cooling_rate).max(self.config.min_temperature);
    }

    fn parameters(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("temperature", self.temperature),
            ("initial_temperature", self.config.initial_temperature),
            ("cooling_rate", self.config.cooling_rate),
            ("min_temperature", self.config.min_temperature),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_always_accepts_improvements() {
        let mut optimizer = SimulatedAnnealingOptimizer::default();
        let mut rng = RandomNumberGenerator::from_seed(3);
        for _ in 0..100 {
            assert!(optimizer.should_accept(0.2, 0.3, 0, &mut rng));
        }
    }

    #[test]
    fn test_cooling_stops_at_floor() {
        let config = AnnealingConfig::default()
            .with_initial_temperature(1.0)
            .with_cooling_rate(0.5)
            .with_min_temperature(0.1);
        let mut optimizer = SimulatedAnnealingOptimizer::new(config).unwrap();
        optimizer.update_parameters(0);
        assert!((optimizer.temperature() - 0.5).abs() < 1e-12);
        for i in 0..20 {
            optimizer.update_parameters(i);
        }
        assert!((optimizer.temperature() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_cold_rejects_regressions() {
        let config = AnnealingConfig::default().with_min_temperature(1e-6);
        let mut optimizer = SimulatedAnnealingOptimizer::new(config).unwrap();
        optimizer.set_temperature(1e-6);
        let mut rng = RandomNumberGenerator::from_seed(5);
        let accepted = (0..1000)
            .filter(|_| optimizer.should_accept(0.5, 0.4, 0, &mut rng))
            .count();
        assert_eq!(accepted, 0);
    }

    #[test]
    fn test_validate() {
        assert!(AnnealingConfig::default().validate().is_ok());
        assert!(AnnealingConfig::default().with_cooling_rate(1.0).validate().is_err());
        assert!(AnnealingConfig::default()
            .with_initial_temperature(0.0)
            .validate()
            .is_err());
        assert!(AnnealingConfig::default()
            .with_min_temperature(2.0)
            .validate()
            .is_err());
        assert!(AnnealingConfig::default().with_max_multi_swaps(1).validate().is_err());
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let short_chain = AnnealingConfig::default().with_max_multi_swaps(1);
        assert!(matches!(
            SimulatedAnnealingOptimizer::new(short_chain),
            Err(SeatingError::Configuration(_))
        ));
        let frozen = AnnealingConfig::default().with_cooling_rate(0.0);
        assert!(SimulatedAnnealingOptimizer::new(frozen).is_err());
    }
}
