//! # Optimization
//!
//! The orchestrator: builds the initial round-robin partition, runs the configured
//! strategy in a time-boxed loop, tracks the best partition ever observed (which
//! is not necessarily the strategy's working state) and reports it with run
//! statistics.

pub mod launcher;
pub mod options;
pub mod result;

pub use launcher::{SeatingOptimizer, SeatingProblem};
pub use options::{OptimizationOptions, OptimizationOptionsBuilder};
pub use result::{OptimizationResult, OptimizationStats};
