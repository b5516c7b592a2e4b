//! Seating optimizer: assigns the people of a roster to event tables so that every
//! table is as diverse as possible, declared seating rules are respected, and over
//! a multi-day event people keep meeting someone new.

pub mod constraints;
pub mod diversity;
pub mod error;
pub mod objective;
pub mod optimization;
pub mod optimizer;
pub mod partition;
pub mod rng;
pub mod roster;
pub mod rotation;

// Re-export commonly used types for convenience
pub use error::{OptionExt, Result, SeatingError};
pub use objective::{Objective, PenaltyWeights, SeatingObjective};
pub use optimization::{OptimizationOptions, OptimizationResult, SeatingOptimizer, SeatingProblem};
pub use optimizer::{NeighborSearch, Strategy, StrategyConfig};
pub use partition::Partition;
pub use roster::{EventConfig, Person, PersonId, Roster};
