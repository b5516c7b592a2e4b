//! # Constraints Module
//!
//! Declarative seating rules and the evaluator that checks a [`Partition`] against
//! them.
//!
//! ## Overview
//!
//! A [`Rule`] names a kind of requirement (keep people apart, keep them together,
//! spread an attribute evenly, keep people close, or a caller-defined check), the
//! people it targets, how serious a breach is, and a priority. The
//! [`ConstraintEvaluator`] turns a partition into a list of [`Violation`]s. It never
//! assigns numeric penalties; the objective decides what a hard or soft violation
//! costs.
//!
//! Besides the rules, the evaluator always reports tables that hold more people
//! than the event capacity. Moves do not enforce capacity, so this is how an
//! overfull candidate gets disfavoured instead of crashing the search.
//!
//! ## Basic Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use seatplan::constraints::{ConstraintEvaluator, Rule, RuleKind, Severity, Target};
//! use seatplan::partition::Partition;
//! use seatplan::roster::{Person, Roster};
//!
//! let roster = Arc::new(
//!     Roster::new(vec![Person::new("x"), Person::new("y"), Person::new("z")]).unwrap(),
//! );
//! let rule = Rule::new(1, "keep x and y apart", RuleKind::Separation)
//!     .with_target(Target::people(["x", "y"]))
//!     .with_severity(Severity::Hard);
//! let evaluator = ConstraintEvaluator::new(roster, vec![rule]);
//!
//! let together = Partition::from_tables(vec![vec![0, 1], vec![2]], 4);
//! assert_eq!(evaluator.evaluate(&together).len(), 1);
//!
//! let apart = Partition::from_tables(vec![vec![0, 2], vec![1]], 4);
//! assert!(evaluator.evaluate(&apart).is_empty());
//! ```

mod rules;

use std::collections::{BTreeSet, HashMap};
use std::fmt::{self, Debug, Display};
use std::sync::Arc;

use tracing::warn;

use crate::partition::Partition;
use crate::roster::{PersonId, PersonIndex, Roster, TableId};

/// How serious a breach of a rule is.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    /// Disqualifying; weighted heavily by the objective.
    Hard,
    /// Undesirable but tolerable.
    Soft,
}

/// What a rule asks of the seating.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleKind {
    /// Matching people must not share a table beyond `max_per_table`.
    Separation,
    /// Matching people must occupy no more than `max_tables` tables.
    Clustering,
    /// Each table's count of every target value stays within `tolerance` of the
    /// event-wide average.
    Distribution,
    /// Matching people must sit within `max_distance` tables of each other, and, if
    /// `max_seat_distance` is set, within that many seats when sharing a table.
    Proximity,
    /// Checked by the [`CustomPredicate`] registered under this name.
    Custom { predicate: String },
}

impl RuleKind {
    pub fn label(&self) -> &str {
        match self {
            RuleKind::Separation => "separation",
            RuleKind::Clustering => "clustering",
            RuleKind::Distribution => "distribution",
            RuleKind::Proximity => "proximity",
            RuleKind::Custom { predicate } => predicate,
        }
    }
}

/// Which people a rule applies to.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// People whose attribute `name` takes one of `values`. An empty value set
    /// matches anyone with a known value for the attribute.
    Attribute {
        name: String,
        values: BTreeSet<String>,
    },
    /// An explicit list of people.
    People(BTreeSet<PersonId>),
}

impl Target {
    pub fn attribute<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Target::Attribute {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn people<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<PersonId>,
    {
        Target::People(ids.into_iter().map(Into::into).collect())
    }
}

/// Optional numeric parameters; each kind reads the ones it needs.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RuleParams {
    /// Separation: most matching people allowed at one table (default 1).
    pub max_per_table: Option<usize>,
    /// Clustering: most tables the matching people may span (default 1).
    pub max_tables: Option<usize>,
    /// Distribution: allowed deviation from the per-table average (default 1.0).
    pub tolerance: Option<f64>,
    /// Proximity: largest table-id distance between two matching people (default 0).
    pub max_distance: Option<usize>,
    /// Proximity: largest circular seat distance for matching people at one table.
    pub max_seat_distance: Option<usize>,
}

/// A declarative seating rule.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub id: u32,
    pub name: String,
    pub kind: RuleKind,
    pub target: Target,
    pub severity: Severity,
    /// Lower is more important.
    pub priority: i32,
    pub params: RuleParams,
    /// Inactive rules are skipped by the evaluator.
    pub active: bool,
}

impl Rule {
    /// Creates an active soft rule with priority 0 and an empty people target.
    pub fn new(id: u32, name: impl Into<String>, kind: RuleKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            target: Target::People(BTreeSet::new()),
            severity: Severity::Soft,
            priority: 0,
            params: RuleParams::default(),
            active: true,
        }
    }

    pub fn with_target(mut self, target: Target) -> Self {
        self.target = target;
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_params(mut self, params: RuleParams) -> Self {
        self.params = params;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }
}

/// What produced a violation.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViolationSource {
    /// A caller-supplied rule, by id.
    Rule(u32),
    /// A table holds more people than the event capacity.
    Capacity,
    /// A pair was seated together more often than a rotation allows.
    RepeatCap,
}

/// A single breach found by the evaluator.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    pub source: ViolationSource,
    pub severity: Severity,
    pub message: String,
    pub table: Option<TableId>,
}

impl Violation {
    pub fn new(
        source: ViolationSource,
        severity: Severity,
        message: impl Into<String>,
        table: Option<TableId>,
    ) -> Self {
        Self {
            source,
            severity,
            message: message.into(),
            table,
        }
    }

    pub fn is_hard(&self) -> bool {
        self.severity == Severity::Hard
    }
}

impl Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            Severity::Hard => "hard",
            Severity::Soft => "soft",
        };
        match self.table {
            Some(table) => write!(f, "[{}] table {}: {}", severity, table, self.message),
            None => write!(f, "[{}] {}", severity, self.message),
        }
    }
}

/// A breach reported by a [`CustomPredicate`].
#[derive(Debug, Clone, PartialEq)]
pub struct Finding {
    pub message: String,
    pub table: Option<TableId>,
}

impl Finding {
    pub fn new(message: impl Into<String>, table: Option<TableId>) -> Self {
        Self {
            message: message.into(),
            table,
        }
    }
}

/// Caller-defined check behind a [`RuleKind::Custom`] rule.
///
/// `targets[i]` tells whether roster index `i` matches the rule's target.
/// Implementations must be pure: the optimizer calls them for every candidate.
pub trait CustomPredicate: Debug + Send + Sync {
    fn check(
        &self,
        rule: &Rule,
        partition: &Partition,
        roster: &Roster,
        targets: &[bool],
    ) -> Vec<Finding>;
}

#[derive(Debug, Clone)]
struct CompiledRule {
    rule: Rule,
    /// Target membership per roster index.
    matches: Vec<bool>,
    /// For attribute targets, the index of the person's value among the rule's values.
    value_slot: Vec<Option<usize>>,
    slot_names: Vec<String>,
}

/// Checks partitions against a fixed rule set for one roster.
#[derive(Debug, Clone)]
pub struct ConstraintEvaluator {
    roster: Arc<Roster>,
    rules: Vec<CompiledRule>,
    predicates: HashMap<String, Arc<dyn CustomPredicate>>,
    min_confidence: f64,
}

impl ConstraintEvaluator {
    /// Compiles `rules` against `roster`. Inactive rules are dropped and the rest
    /// ordered by priority, keeping input order among equal priorities.
    pub fn new(roster: Arc<Roster>, rules: Vec<Rule>) -> Self {
        Self::with_confidence(roster, rules, 0.5)
    }

    /// Like [`ConstraintEvaluator::new`], using inferred attributes only when their
    /// confidence reaches `min_confidence`.
    pub fn with_confidence(roster: Arc<Roster>, rules: Vec<Rule>, min_confidence: f64) -> Self {
        let mut active: Vec<Rule> = rules.into_iter().filter(|rule| rule.active).collect();
        active.sort_by_key(|rule| rule.priority);
        let rules = active
            .into_iter()
            .map(|rule| compile(rule, &roster, min_confidence))
            .collect();
        Self {
            roster,
            rules,
            predicates: HashMap::new(),
            min_confidence,
        }
    }

    /// Registers the predicate used by custom rules naming `name`.
    pub fn register_predicate(
        mut self,
        name: impl Into<String>,
        predicate: Arc<dyn CustomPredicate>,
    ) -> Self {
        self.predicates.insert(name.into(), predicate);
        self
    }

    pub fn roster(&self) -> &Arc<Roster> {
        &self.roster
    }

    pub fn min_confidence(&self) -> f64 {
        self.min_confidence
    }

    /// Active rules in evaluation order.
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter().map(|compiled| &compiled.rule)
    }

    /// All violations of `partition`: capacity first, then rules in priority order.
    pub fn evaluate(&self, partition: &Partition) -> Vec<Violation> {
        let mut violations = Vec::new();

        for table in partition.overfull_tables() {
            violations.push(Violation::new(
                ViolationSource::Capacity,
                Severity::Hard,
                format!(
                    "{} people seated at a table for {}",
                    partition.table(table).len(),
                    partition.capacity()
                ),
                Some(table),
            ));
        }

        for compiled in &self.rules {
            let findings = match &compiled.rule.kind {
                RuleKind::Separation => rules::separation(compiled, partition),
                RuleKind::Clustering => rules::clustering(compiled, partition),
                RuleKind::Distribution => rules::distribution(compiled, partition),
                RuleKind::Proximity => rules::proximity(compiled, partition, &self.roster),
                RuleKind::Custom { predicate } => match self.predicates.get(predicate) {
                    Some(check) => {
                        check.check(&compiled.rule, partition, &self.roster, &compiled.matches)
                    }
                    None => {
                        warn!(
                            rule = compiled.rule.id,
                            predicate = predicate.as_str(),
                            "No predicate registered for custom rule"
                        );
                        Vec::new()
                    }
                },
            };
            violations.extend(findings.into_iter().map(|finding| {
                Violation::new(
                    ViolationSource::Rule(compiled.rule.id),
                    compiled.rule.severity,
                    format!("{}: {}", compiled.rule.name, finding.message),
                    finding.table,
                )
            }));
        }

        violations
    }

    /// Whether `partition` breaches no hard rule and no table is overfull.
    pub fn is_feasible(&self, partition: &Partition) -> bool {
        self.evaluate(partition).iter().all(|v| !v.is_hard())
    }

    /// Whether the person at `index` matches the target of rule `rule_id`.
    pub fn matches(&self, rule_id: u32, index: PersonIndex) -> bool {
        self.rules
            .iter()
            .find(|compiled| compiled.rule.id == rule_id)
            .and_then(|compiled| compiled.matches.get(index).copied())
            .unwrap_or(false)
    }
}

fn compile(rule: Rule, roster: &Roster, min_confidence: f64) -> CompiledRule {
    let people = roster.people();
    match &rule.target {
        Target::People(ids) => {
            let matches: Vec<bool> = people.iter().map(|p| ids.contains(&p.id)).collect();
            let value_slot = matches.iter().map(|&m| m.then_some(0)).collect();
            CompiledRule {
                rule,
                matches,
                value_slot,
                slot_names: vec!["targeted people".to_string()],
            }
        }
        Target::Attribute { name, values } => {
            let mut slot_names: Vec<String> = values.iter().cloned().collect();
            let value_slot: Vec<Option<usize>> = people
                .iter()
                .map(|person| {
                    let value = person.attribute(name, min_confidence)?;
                    if values.is_empty() {
                        // open target: every known value becomes its own slot
                        let slot = match slot_names.iter().position(|known| known == value) {
                            Some(slot) => slot,
                            None => {
                                slot_names.push(value.to_string());
                                slot_names.len() - 1
                            }
                        };
                        Some(slot)
                    } else {
                        slot_names.iter().position(|known| known == value)
                    }
                })
                .collect();
            let matches = value_slot.iter().map(Option::is_some).collect();
            CompiledRule {
                rule,
                matches,
                value_slot,
                slot_names,
            }
        }
    }
}
