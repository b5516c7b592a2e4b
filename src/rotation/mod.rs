//! # Multi-day rotation
//!
//! Seats an event over several days so that people keep meeting new faces. Each
//! day runs the single-day optimization on that day's roster (absentees removed)
//! against a [`RotationObjective`]: the usual fitness minus a penalty for pairs
//! that already shared a table. Once a day is finalized its co-located pairs are
//! written to an [`InteractionStore`] and the next day sees them.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use seatplan::optimization::OptimizationOptions;
//! use seatplan::rng::RandomNumberGenerator;
//! use seatplan::roster::{EventConfig, Person, Roster};
//! use seatplan::rotation::{
//!     DaySchedule, InteractionHistory, RotationOptions, RotationPlanner, RotationStrategy,
//! };
//!
//! let roster = Arc::new(
//!     Roster::new((0..8).map(|i| Person::new(format!("p{}", i))).collect()).unwrap(),
//! );
//! let optimization = OptimizationOptions::builder()
//!     .max_runtime(Duration::from_secs(10))
//!     .max_iterations(100)
//!     .build();
//! let planner = RotationPlanner::new(
//!     roster,
//!     EventConfig::new(2, 4),
//!     Vec::new(),
//!     RotationOptions::new(RotationStrategy::Structured, optimization),
//!     InteractionHistory::new(),
//! );
//!
//! let days = [DaySchedule::new(1), DaySchedule::new(2)];
//! let mut rng = RandomNumberGenerator::from_seed(1);
//! let plan = planner.plan(&days, &mut rng).unwrap();
//! assert_eq!(plan.days.len(), 2);
//! assert!(plan.coverage.coverage_percentage > 0.0);
//! ```

pub mod coverage;
pub mod history;
pub mod objective;
pub mod planner;
pub mod strategy;

pub use coverage::CoverageReport;
pub use history::{InteractionDetail, InteractionHistory, InteractionRecord, InteractionStore, PersonPair};
pub use objective::{InteractionPenalty, RotationObjective};
pub use planner::{DayOutcome, DaySchedule, RotationPlan, RotationPlanner};
pub use strategy::{structured_partition, RotationOptions, RotationStrategy};
