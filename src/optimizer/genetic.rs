//! Genetic algorithm over whole partitions.
//!
//! The population is seeded lazily from the first partition the strategy is asked
//! about. Every `generate_neighbor` call then runs one generation:
//!
//! 1. the best `elites` individuals are carried over unchanged,
//! 2. the rest are bred from two tournament-selected parents by table-wise
//!    crossover,
//! 3. each child is mutated with probability `mutation_rate`,
//!
//! and the best individual of the new generation is returned. Acceptance is a
//! formality here: the population already decided what survives.

use rayon::prelude::*;
use tracing::debug;

use crate::error::{Result, SeatingError};
use crate::objective::Objective;
use crate::optimizer::operators::{self, MoveKind};
use crate::optimizer::{NeighborSearch, SearchContext};
use crate::partition::Partition;
use crate::rng::RandomNumberGenerator;
use crate::roster::PersonIndex;

pub(crate) const NAME: &str = "genetic";

const MUTATIONS: [MoveKind; 4] = [
    MoveKind::Swap,
    MoveKind::Move,
    MoveKind::Shuffle,
    MoveKind::Redistribute,
];

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct GeneticConfig {
    pub population_size: usize,
    /// Individuals copied unchanged into the next generation.
    pub elites: usize,
    pub tournament_size: usize,
    pub mutation_rate: f64,
    /// Population size from which fitness is evaluated in parallel.
    pub parallel_threshold: usize,
}

impl Default for GeneticConfig {
    fn default() -> Self {
        Self {
            population_size: 20,
            elites: 2,
            tournament_size: 3,
            mutation_rate: 0.3,
            parallel_threshold: 1000,
        }
    }
}

impl GeneticConfig {
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size;
        self
    }

    pub fn with_elites(mut self, elites: usize) -> Self {
        self.elites = elites;
        self
    }

    pub fn with_tournament_size(mut self, size: usize) -> Self {
        self.tournament_size = size;
        self
    }

    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.population_size < 2 {
            return Err(SeatingError::Configuration(
                "Population size must be at least 2".to_string(),
            ));
        }
        if self.elites >= self.population_size {
            return Err(SeatingError::Configuration(
                "Elite count must be smaller than the population size".to_string(),
            ));
        }
        if self.tournament_size == 0 {
            return Err(SeatingError::Configuration(
                "Tournament size must be greater than 0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(SeatingError::Configuration(
                "Mutation rate must be between 0.0 and 1.0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Picks `size` random individuals and returns the fittest of them.
pub fn tournament_select<'a>(
    population: &'a [Partition],
    fitness: &[f64],
    size: usize,
    rng: &mut RandomNumberGenerator,
) -> Result<&'a Partition> {
    if population.is_empty() || fitness.len() != population.len() {
        return Err(SeatingError::EmptyPopulation);
    }
    let mut winner = rng.gen_index(population.len());
    for _ in 1..size.max(1) {
        let challenger = rng.gen_index(population.len());
        if fitness[challenger] > fitness[winner] {
            winner = challenger;
        }
    }
    Ok(&population[winner])
}

/// Table-wise crossover: every table inherits its occupants from one parent at
/// random. People already placed are skipped; anyone left unplaced goes to the
/// first table with a free seat, or to the smallest table when all are full.
pub fn crossover(
    first: &Partition,
    second: &Partition,
    rng: &mut RandomNumberGenerator,
) -> Partition {
    let people: Vec<PersonIndex> = first
        .iter()
        .flat_map(|(_, occupants)| occupants.iter().copied())
        .collect();
    let slots = people.iter().copied().max().map_or(0, |max| max + 1);
    let mut placed = vec![false; slots];
    let capacity = first.capacity();

    let mut tables: Vec<Vec<PersonIndex>> = first
        .table_ids()
        .map(|table| {
            let parent = if rng.chance(0.5) { first } else { second };
            parent
                .table(table)
                .iter()
                .copied()
                .filter(|&person| match placed.get_mut(person) {
                    Some(seen) if !*seen => {
                        *seen = true;
                        true
                    }
                    _ => false,
                })
                .collect()
        })
        .collect();

    for person in people {
        if placed[person] {
            continue;
        }
        placed[person] = true;
        let target = tables
            .iter()
            .position(|occupants| occupants.len() < capacity)
            .or_else(|| {
                tables
                    .iter()
                    .enumerate()
                    .min_by_key(|(_, occupants)| occupants.len())
                    .map(|(idx, _)| idx)
            });
        if let Some(idx) = target {
            tables[idx].push(person);
        }
    }

    Partition::from_tables(tables, capacity)
}

/// Applies one elementary move chosen uniformly at random.
pub fn mutate(partition: &Partition, rng: &mut RandomNumberGenerator) -> Partition {
    let kind = MUTATIONS[rng.gen_index(MUTATIONS.len())];
    operators::apply(kind, partition, rng)
}

/// A genetic algorithm that advances one generation per neighbor request.
#[derive(Debug, Clone)]
pub struct GeneticAlgorithmOptimizer {
    config: GeneticConfig,
    population: Vec<Partition>,
    fitness: Vec<f64>,
    generation: usize,
}

impl GeneticAlgorithmOptimizer {
    /// # Errors
    ///
    /// [`SeatingError::Configuration`] when `config` does not validate.
    pub fn new(config: GeneticConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid(config))
    }

    fn from_valid(config: GeneticConfig) -> Self {
        Self {
            config,
            population: Vec::new(),
            fitness: Vec::new(),
            generation: 0,
        }
    }

    pub fn config(&self) -> &GeneticConfig {
        &self.config
    }

    pub fn population(&self) -> &[Partition] {
        &self.population
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Seeds the population with `seed` and mutated copies of it.
    pub fn initialize(
        &mut self,
        seed: &Partition,
        objective: &dyn Objective,
        rng: &mut RandomNumberGenerator,
    ) {
        let mut population = Vec::with_capacity(self.config.population_size);
        population.push(seed.clone());
        while population.len() < self.config.population_size {
            let steps = rng.gen_between(1, 3);
            let individual = (0..steps).fold(seed.clone(), |next, _| mutate(&next, rng));
            population.push(individual);
        }
        self.fitness = self.evaluate(&population, objective);
        self.population = population;
        self.generation = 0;
    }

    /// Runs one generation and returns its best individual.
    pub fn evolve(
        &mut self,
        objective: &dyn Objective,
        rng: &mut RandomNumberGenerator,
    ) -> Result<Partition> {
        if self.population.is_empty() {
            return Err(SeatingError::EmptyPopulation);
        }

        let mut ranked: Vec<usize> = (0..self.population.len()).collect();
        ranked.sort_by(|&a, &b| self.fitness[b].total_cmp(&self.fitness[a]));

        let mut next: Vec<Partition> = ranked
            .iter()
            .take(self.config.elites)
            .map(|&idx| self.population[idx].clone())
            .collect();
        while next.len() < self.config.population_size {
            let first = tournament_select(
                &self.population,
                &self.fitness,
                self.config.tournament_size,
                rng,
            )?;
            let second = tournament_select(
                &self.population,
                &self.fitness,
                self.config.tournament_size,
                rng,
            )?;
            let mut child = crossover(first, second, rng);
            if rng.chance(self.config.mutation_rate) {
                child = mutate(&child, rng);
            }
            next.push(child);
        }

        self.fitness = self.evaluate(&next, objective);
        self.population = next;
        self.generation += 1;

        let best = self.best_index().ok_or(SeatingError::EmptyPopulation)?;
        debug!(
            generation = self.generation,
            best_fitness = self.fitness[best],
            "Generation complete"
        );
        Ok(self.population[best].clone())
    }

    fn best_index(&self) -> Option<usize> {
        self.fitness
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(idx, _)| idx)
    }

    /// Scores every individual. Non-finite scores rank last.
    fn evaluate(&self, population: &[Partition], objective: &dyn Objective) -> Vec<f64> {
        let score = |individual: &Partition| {
            let fitness = objective.fitness(individual);
            if fitness.is_finite() {
                fitness
            } else {
                f64::NEG_INFINITY
            }
        };
        if population.len() >= self.config.parallel_threshold {
            population.par_iter().map(score).collect()
        } else {
            population.iter().map(score).collect()
        }
    }
}

impl Default for GeneticAlgorithmOptimizer {
    fn default() -> Self {
        Self::from_valid(GeneticConfig::default())
    }
}

impl NeighborSearch for GeneticAlgorithmOptimizer {
    fn name(&self) -> &'static str {
        NAME
    }

    fn generate_neighbor(&mut self, current: &Partition, ctx: &mut SearchContext<'_>) -> Partition {
        if self.population.is_empty() {
            self.initialize(current, ctx.objective, ctx.rng);
        }
        match self.evolve(ctx.objective, ctx.rng) {
            Ok(best) => best,
            Err(_) => current.clone(),
        }
    }

    fn should_accept(
        &mut self,
        _current_score: f64,
        _candidate_score: f64,
        _iteration: usize,
        _rng: &mut RandomNumberGenerator,
    ) -> bool {
        true
    }

    fn parameters(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("population_size", self.config.population_size as f64),
            ("elites", self.config.elites as f64),
            ("tournament_size", self.config.tournament_size as f64),
            ("mutation_rate", self.config.mutation_rate),
            ("generation", self.generation as f64),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::EventConfig;

    #[test]
    fn test_crossover_keeps_everyone_once() {
        let mut rng = RandomNumberGenerator::from_seed(8);
        let event = EventConfig::new(3, 4);
        let first = Partition::round_robin(11, &event);
        let mut second = first.clone();
        for _ in 0..30 {
            second = mutate(&second, &mut rng);
        }
        for _ in 0..200 {
            let child = crossover(&first, &second, &mut rng);
            assert!(child.is_complete(11));
            assert_eq!(child.table_count(), 3);
            assert!(child.is_within_capacity());
        }
    }

    #[test]
    fn test_crossover_repairs_into_first_free_table() {
        let mut rng = RandomNumberGenerator::from_seed(2);
        let first = Partition::from_tables(vec![vec![0, 1], vec![2, 3]], 3);
        let second = Partition::from_tables(vec![vec![2, 3], vec![0, 1]], 3);
        for _ in 0..50 {
            let child = crossover(&first, &second, &mut rng);
            assert!(child.is_complete(4));
        }
    }

    #[test]
    fn test_tournament_prefers_fitter() {
        let mut rng = RandomNumberGenerator::from_seed(12);
        let population = vec![
            Partition::from_tables(vec![vec![0], vec![1]], 3),
            Partition::from_tables(vec![vec![1], vec![0]], 3),
        ];
        let fitness = vec![0.1, 0.9];
        let wins = (0..1000)
            .filter(|_| {
                tournament_select(&population, &fitness, 3, &mut rng).unwrap() == &population[1]
            })
            .count();
        // the weaker individual only wins when it fills all three slots
        assert!(wins > 800, "wins {}", wins);
    }

    #[test]
    fn test_tournament_on_empty_population() {
        let mut rng = RandomNumberGenerator::from_seed(12);
        assert!(matches!(
            tournament_select(&[], &[], 3, &mut rng),
            Err(SeatingError::EmptyPopulation)
        ));
    }

    #[test]
    fn test_validate() {
        assert!(GeneticConfig::default().validate().is_ok());
        assert!(GeneticConfig::default().with_population_size(1).validate().is_err());
        assert!(GeneticConfig::default().with_elites(20).validate().is_err());
        assert!(GeneticConfig::default().with_tournament_size(0).validate().is_err());
        assert!(GeneticConfig::default().with_mutation_rate(1.5).validate().is_err());
    }
}
