use std::sync::Arc;
use std::time::Duration;

use seatplan::{
    constraints::{Rule, RuleKind, RuleParams, Severity, Target},
    error::SeatingError,
    objective::{Objective, SeatingObjective},
    optimization::{OptimizationOptions, SeatingOptimizer, SeatingProblem},
    optimizer::{
        AnnealingConfig, GeneticAlgorithmOptimizer, GeneticConfig, NeighborSearch,
        RandomSwapOptimizer, SearchContext, SimulatedAnnealingOptimizer, Strategy,
        StrategyConfig,
    },
    partition::Partition,
    rng::RandomNumberGenerator,
    roster::{EventConfig, Person, Roster},
};

const PEOPLE: usize = 14;

fn problem() -> SeatingProblem {
    let regions = ["north", "south", "east", "west"];
    let people = (0..PEOPLE)
        .map(|i| {
            Person::new(format!("p{}", i))
                .with_attribute("gender", if i % 2 == 0 { "f" } else { "m" })
                .with_attribute("geography", regions[i % regions.len()])
                .with_inferred("seniority", if i < 5 { "senior" } else { "junior" }, 0.9)
        })
        .collect();
    let roster = Arc::new(Roster::new(people).unwrap());
    let rules = vec![
        Rule::new(1, "leads apart", RuleKind::Separation)
            .with_target(Target::people(["p0", "p1", "p2"]))
            .with_severity(Severity::Hard),
        Rule::new(2, "spread regions", RuleKind::Distribution)
            .with_target(Target::attribute("geography", ["north"]))
            .with_params(RuleParams {
                tolerance: Some(1.0),
                ..RuleParams::default()
            }),
    ];
    // 14 people at 4 tables of 4 leaves two free seats for move operations
    SeatingProblem::new(roster, EventConfig::new(4, 4), rules)
}

fn objective(problem: &SeatingProblem) -> SeatingObjective {
    SeatingOptimizer::default().build_objective(problem).unwrap()
}

fn strategies() -> Vec<Strategy> {
    ["random_swap", "simulated_annealing", "genetic"]
        .iter()
        .map(|name| Strategy::from_config(&StrategyConfig::from_name(name).unwrap()).unwrap())
        .collect()
}

#[test]
fn test_every_candidate_keeps_the_roster() {
    let problem = problem();
    let objective = objective(&problem);

    for mut strategy in strategies() {
        let mut rng = RandomNumberGenerator::from_seed(17);
        let mut current = Partition::round_robin(PEOPLE, &problem.event);
        let mut current_score = objective.fitness(&current);
        for iteration in 0..300 {
            let candidate = {
                let mut ctx = SearchContext::new(&objective, &mut rng);
                strategy.generate_neighbor(&current, &mut ctx)
            };
            assert!(candidate.is_complete(PEOPLE), "{}", strategy.name());
            assert_eq!(candidate.table_count(), 4);

            let score = objective.fitness(&candidate);
            if strategy.should_accept(current_score, score, iteration, &mut rng) {
                current = candidate;
                current_score = score;
            }
            strategy.update_parameters(iteration);
        }
    }
}

#[test]
fn test_returned_seating_fits_capacity() {
    let problem = problem();
    for name in ["random_swap", "simulated_annealing", "genetic"] {
        let options = OptimizationOptions::builder()
            .strategy(StrategyConfig::from_name(name).unwrap())
            .max_runtime(Duration::from_secs(120))
            .max_iterations(150)
            .build();
        let mut rng = RandomNumberGenerator::from_seed(23);
        let result = SeatingOptimizer::new(options)
            .optimize(&problem, &mut rng)
            .unwrap();

        assert_eq!(result.strategy, name);
        assert!(result.partition.is_complete(PEOPLE));
        assert!(result.partition.is_within_capacity());
        assert!(result.score >= result.stats.initial_score);
        assert!((result.score - objective(&problem).fitness(&result.partition)).abs() < 1e-9);
    }
}

#[test]
fn test_random_swap_never_regresses() {
    let problem = problem();
    let objective = objective(&problem);
    let mut strategy = RandomSwapOptimizer::default();
    let mut rng = RandomNumberGenerator::from_seed(29);

    let mut current = Partition::round_robin(PEOPLE, &problem.event);
    let mut current_score = objective.fitness(&current);
    for iteration in 0..1000 {
        let candidate = {
            let mut ctx = SearchContext::new(&objective, &mut rng);
            strategy.generate_neighbor(&current, &mut ctx)
        };
        let score = objective.fitness(&candidate);
        if strategy.should_accept(current_score, score, iteration, &mut rng) {
            assert!(score > current_score);
            current = candidate;
            current_score = score;
        }
    }

    let options = OptimizationOptions::builder()
        .strategy(StrategyConfig::from_name("random_swap").unwrap())
        .max_runtime(Duration::from_secs(120))
        .max_iterations(1000)
        .build();
    let result = SeatingOptimizer::new(options)
        .optimize(&problem, &mut rng)
        .unwrap();
    let history = &result.stats.best_score_history;
    assert!(history.windows(2).all(|pair| pair[1] >= pair[0]));
    assert_eq!(history.last().copied(), Some(result.score));
}

#[test]
fn test_annealing_acceptance_law() {
    let config = AnnealingConfig::default()
        .with_initial_temperature(0.1)
        .with_min_temperature(0.001);
    let mut strategy = SimulatedAnnealingOptimizer::new(config).unwrap();
    let mut rng = RandomNumberGenerator::from_seed(31);

    let trials = 20_000;
    let accepted = (0..trials)
        .filter(|&i| strategy.should_accept(0.5, 0.4, i, &mut rng))
        .count();
    let frequency = accepted as f64 / trials as f64;
    let expected = (-1.0f64).exp();
    assert!(
        (frequency - expected).abs() < 0.02,
        "frequency {} expected {}",
        frequency,
        expected
    );

    assert!((0..trials).all(|i| strategy.should_accept(0.5, 0.6, i, &mut rng)));

    // the floor temperature makes regressions practically impossible
    strategy.set_temperature(0.001);
    let cold = (0..trials)
        .filter(|&i| strategy.should_accept(0.5, 0.4, i, &mut rng))
        .count();
    assert_eq!(cold, 0);
}

#[test]
fn test_annealing_cools_during_a_run() {
    let problem = problem();
    let objective = objective(&problem);
    let mut strategy = SimulatedAnnealingOptimizer::default();
    let start = strategy.temperature();
    let mut rng = RandomNumberGenerator::from_seed(37);
    let current = Partition::round_robin(PEOPLE, &problem.event);
    for iteration in 0..100 {
        let mut ctx = SearchContext::new(&objective, &mut rng);
        let _ = strategy.generate_neighbor(&current, &mut ctx);
        strategy.update_parameters(iteration);
    }
    assert!(strategy.temperature() < start);
}

#[test]
fn test_genetic_population_stays_closed() {
    let problem = problem();
    let objective = objective(&problem);
    let config = GeneticConfig::default()
        .with_population_size(12)
        .with_elites(2)
        .with_mutation_rate(0.8);
    let mut strategy = GeneticAlgorithmOptimizer::new(config).unwrap();
    let mut rng = RandomNumberGenerator::from_seed(41);
    let seed = Partition::round_robin(PEOPLE, &problem.event);

    let mut previous_best = f64::NEG_INFINITY;
    for generation in 0..60 {
        let best = {
            let mut ctx = SearchContext::new(&objective, &mut rng);
            strategy.generate_neighbor(&seed, &mut ctx)
        };
        assert!(strategy.should_accept(1.0, -1.0, generation, &mut rng));
        assert_eq!(strategy.population().len(), 12);
        for individual in strategy.population() {
            assert!(individual.is_complete(PEOPLE));
        }

        // elitism keeps the best individual alive
        let score = objective.fitness(&best);
        assert!(score >= previous_best);
        previous_best = score;
    }
    assert_eq!(strategy.generation(), 60);
}

#[test]
fn test_parallel_and_sequential_generations_agree() {
    let problem = problem();
    let objective = objective(&problem);
    let seed = Partition::round_robin(PEOPLE, &problem.event);

    let run = |threshold: usize| {
        let config = GeneticConfig::default().with_parallel_threshold(threshold);
        let mut strategy = GeneticAlgorithmOptimizer::new(config).unwrap();
        let mut rng = RandomNumberGenerator::from_seed(43);
        (0..10)
            .map(|_| {
                let mut ctx = SearchContext::new(&objective, &mut rng);
                strategy.generate_neighbor(&seed, &mut ctx)
            })
            .last()
    };
    assert_eq!(run(1), run(usize::MAX));
}

#[test]
fn test_unknown_strategy_name() {
    assert!(matches!(
        StrategyConfig::from_name("particle_swarm"),
        Err(SeatingError::Configuration(_))
    ));
}
