use std::sync::Arc;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use seatplan::{
    constraints::{Rule, RuleKind, Severity, Target},
    objective::Objective,
    optimization::{OptimizationOptions, SeatingOptimizer, SeatingProblem},
    optimizer::StrategyConfig,
    partition::Partition,
    rng::RandomNumberGenerator,
    roster::{EventConfig, Person, Roster},
    rotation::{DaySchedule, InteractionHistory, RotationOptions, RotationPlanner, RotationStrategy},
};

fn roster(size: usize) -> Arc<Roster> {
    let agencies = ["fbi", "nsa", "cia", "dhs"];
    let regions = ["north", "south", "east", "west", "central"];
    let people = (0..size)
        .map(|i| {
            Person::new(format!("p{}", i))
                .with_attribute("gender", if i % 2 == 0 { "f" } else { "m" })
                .with_attribute("agency_level", agencies[i % agencies.len()])
                .with_attribute("geography", regions[(i / 3) % regions.len()])
                .with_inferred("seniority", if i % 5 == 0 { "senior" } else { "junior" }, 0.8)
        })
        .collect();
    Arc::new(Roster::new(people).expect("unique ids"))
}

fn problem(size: usize) -> SeatingProblem {
    let rules = vec![Rule::new(1, "leads apart", RuleKind::Separation)
        .with_target(Target::people(["p0", "p1", "p2", "p3"]))
        .with_severity(Severity::Hard)];
    SeatingProblem::new(roster(size), EventConfig::for_roster(size, 8), rules)
}

fn options(strategy: &str, iterations: usize) -> OptimizationOptions {
    OptimizationOptions::builder()
        .strategy(StrategyConfig::from_name(strategy).expect("known strategy"))
        .max_runtime(Duration::from_secs(60))
        .max_iterations(iterations)
        .build()
}

fn bench_fitness(c: &mut Criterion) {
    let mut group = c.benchmark_group("fitness");
    for size in [40, 120, 400] {
        let problem = problem(size);
        let objective = SeatingOptimizer::default()
            .build_objective(&problem)
            .expect("valid problem");
        let partition = Partition::round_robin(size, &problem.event);
        group.bench_function(format!("fitness_{}", size), |b| {
            b.iter(|| objective.fitness(black_box(&partition)))
        });
    }
    group.finish();
}

fn bench_strategies(c: &mut Criterion) {
    let problem = problem(120);
    let mut group = c.benchmark_group("strategies");
    group.sample_size(10);
    for (strategy, iterations) in [
        ("random_swap", 500),
        ("simulated_annealing", 500),
        ("genetic", 25),
    ] {
        let optimizer = SeatingOptimizer::new(options(strategy, iterations));
        group.bench_function(strategy, |b| {
            let mut rng = RandomNumberGenerator::from_seed(42);
            b.iter(|| {
                let result = optimizer.optimize(black_box(&problem), &mut rng);
                assert!(result.is_ok());
            })
        });
    }
    group.finish();
}

fn bench_rotation_day(c: &mut Criterion) {
    let mut group = c.benchmark_group("rotation");
    group.sample_size(10);
    group.bench_function("maximum_diversity_two_days", |b| {
        let mut rng = RandomNumberGenerator::from_seed(7);
        b.iter(|| {
            let planner = RotationPlanner::new(
                roster(48),
                EventConfig::new(6, 8),
                Vec::new(),
                RotationOptions::new(
                    RotationStrategy::MaximumDiversity,
                    options("simulated_annealing", 300),
                ),
                InteractionHistory::new(),
            );
            let days = [DaySchedule::new(1), DaySchedule::new(2)];
            let plan = planner.plan(black_box(&days), &mut rng);
            assert!(plan.is_ok());
        })
    });
    group.finish();
}

criterion_group!(benches, bench_fitness, bench_strategies, bench_rotation_day);
criterion_main!(benches);
