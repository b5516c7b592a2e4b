//! # Error Types
//!
//! This module defines the error type shared by every part of the optimizer. Most
//! conditions that can go wrong during a search (a candidate that overflows a table,
//! a run that hits its time budget) are *not* errors: they are scored or reported.
//! The variants below cover the cases where a run cannot start or a caller handed
//! in something inconsistent.
//!
//! ## Examples
//!
//! ```rust
//! use seatplan::error::{Result, SeatingError};
//!
//! fn check_roster(people: usize) -> Result<()> {
//!     if people < 2 {
//!         return Err(SeatingError::InsufficientRoster { found: people });
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_roster(1).is_err());
//! ```
//!
//! Using the `OptionExt` trait to convert `Option` to `Result`:
//!
//! ```rust
//! use seatplan::error::{OptionExt, SeatingError};
//!
//! fn first_score(scores: &[f64]) -> seatplan::error::Result<f64> {
//!     scores.first().copied().ok_or_else_seating(|| SeatingError::EmptyPopulation)
//! }
//!
//! assert!(first_score(&[]).is_err());
//! ```

use thiserror::Error;

use crate::roster::PersonId;

/// Represents errors that can occur while preparing or running an optimization.
#[derive(Error, Debug)]
pub enum SeatingError {
    /// Fewer than two people were supplied, so there is nothing to arrange.
    #[error("Insufficient roster: at least 2 people are required, found {found}")]
    InsufficientRoster { found: usize },

    /// Error that occurs when an invalid configuration is provided.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The tables cannot seat everyone on the roster.
    #[error("Insufficient capacity: {people} people but only {capacity} seats")]
    InsufficientCapacity { people: usize, capacity: usize },

    /// The same person identifier appears twice in a roster.
    #[error("Duplicate person in roster: {0}")]
    DuplicatePerson(PersonId),

    /// A person identifier that is not part of the roster was referenced.
    #[error("Unknown person: {0}")]
    UnknownPerson(PersonId),

    /// Interactions for this day have already been recorded.
    #[error("Interactions for day {0} have already been recorded")]
    DayAlreadyRecorded(u32),

    /// Error that occurs when NaN or infinity values are encountered.
    #[error("Invalid numeric value: {0}")]
    InvalidNumericValue(String),

    /// Error that occurs when an empty population is encountered.
    #[error("Empty population error: Cannot operate on an empty population")]
    EmptyPopulation,

    /// The interaction store could not be read or updated.
    #[error("Interaction store error: {0}")]
    Store(String),
}

/// A specialized Result type for seating operations.
pub type Result<T> = std::result::Result<T, SeatingError>;

/// Extension trait for Option to convert to Result with a custom error.
pub trait OptionExt<T> {
    /// Converts an `Option<T>` to a `Result<T, SeatingError>` using a closure to
    /// generate the error.
    fn ok_or_else_seating<F>(self, err_fn: F) -> Result<T>
    where
        F: FnOnce() -> SeatingError;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_else_seating<F>(self, err_fn: F) -> Result<T>
    where
        F: FnOnce() -> SeatingError,
    {
        self.ok_or_else(err_fn)
    }
}
