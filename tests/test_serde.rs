#![cfg(feature = "serde")]

use std::sync::Arc;
use std::time::Duration;

use seatplan::{
    constraints::{Rule, RuleKind, RuleParams, Severity, Target},
    optimization::{OptimizationOptions, OptimizationResult, SeatingOptimizer, SeatingProblem},
    partition::Partition,
    rng::RandomNumberGenerator,
    roster::{EventConfig, Person, PersonId, Roster},
    rotation::{InteractionHistory, InteractionRecord, InteractionStore, PersonPair},
};

#[test]
fn test_roster_reads_from_json() {
    let json = r#"[
        {"id": "ana", "attributes": {"gender": "f"}, "inferred": {}},
        {"id": "ben", "attributes": {"gender": "m"}, "inferred": {"geography": {"value": "east", "confidence": 0.8}}}
    ]"#;
    let roster: Roster = serde_json::from_str(json).unwrap();
    let ids: Vec<&str> = roster.ids().map(PersonId::as_str).collect();
    assert_eq!(ids, ["ana", "ben"]);
    assert_eq!(roster.people()[1].attribute("geography", 0.5), Some("east"));

    let duplicated = r#"[
        {"id": "ana", "attributes": {}, "inferred": {}},
        {"id": "ana", "attributes": {}, "inferred": {}}
    ]"#;
    assert!(serde_json::from_str::<Roster>(duplicated).is_err());
}

#[test]
fn test_rules_and_partition_survive_json() {
    let rules = vec![
        Rule::new(1, "apart", RuleKind::Separation)
            .with_target(Target::people(["ana", "ben"]))
            .with_severity(Severity::Hard),
        Rule::new(2, "spread", RuleKind::Distribution)
            .with_target(Target::attribute("gender", ["f"]))
            .with_params(RuleParams {
                tolerance: Some(1.0),
                ..RuleParams::default()
            }),
    ];
    let json = serde_json::to_string(&rules).unwrap();
    assert_eq!(serde_json::from_str::<Vec<Rule>>(&json).unwrap(), rules);

    let partition = Partition::round_robin(7, &EventConfig::new(2, 4));
    let json = serde_json::to_string(&partition).unwrap();
    assert_eq!(serde_json::from_str::<Partition>(&json).unwrap(), partition);
}

#[test]
fn test_result_and_history_serialize() {
    let people = (0..6)
        .map(|i| Person::new(format!("p{}", i)).with_attribute("gender", ["f", "m"][i % 2]))
        .collect();
    let roster = Arc::new(Roster::new(people).unwrap());
    let problem = SeatingProblem::new(Arc::clone(&roster), EventConfig::new(2, 3), Vec::new());
    let options = OptimizationOptions::builder()
        .max_runtime(Duration::from_secs(60))
        .max_iterations(50)
        .build();
    let mut rng = RandomNumberGenerator::from_seed(9);
    let result = SeatingOptimizer::new(options)
        .optimize(&problem, &mut rng)
        .unwrap();

    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["strategy"], "simulated_annealing");
    assert!(value["seating"]["1"].is_array());
    let back: OptimizationResult = serde_json::from_value(value).unwrap();
    assert_eq!(back.partition, result.partition);

    let history = InteractionHistory::new();
    history.record_partition(1, &result.partition, &roster).unwrap();
    let json = serde_json::to_string(&history.records().unwrap()).unwrap();
    let records: Vec<InteractionRecord> = serde_json::from_str(&json).unwrap();
    let restored = InteractionHistory::from_records(records);
    let pair = PersonPair::new(
        roster.id_of(result.partition.table(1)[0]).unwrap().clone(),
        roster.id_of(result.partition.table(1)[1]).unwrap().clone(),
    );
    assert_eq!(restored.count(&pair).unwrap(), 1);
}
