//! # Roster
//!
//! People, their declared and inferred attributes, and the event-level table
//! configuration. A [`Roster`] is immutable for the duration of a run; searches
//! refer to people by their [`PersonIndex`] (position in the roster) rather than by
//! cloning `Person` values.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use crate::error::{Result, SeatingError};

/// Position of a person inside a [`Roster`].
pub type PersonIndex = usize;

/// Table identifiers run from `1` to the number of tables.
pub type TableId = usize;

/// Smallest supported table capacity.
pub const MIN_TABLE_CAPACITY: usize = 3;
/// Largest supported table capacity.
pub const MAX_TABLE_CAPACITY: usize = 8;

/// Stable identifier of a person, as supplied by the roster import.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PersonId(pub String);

impl PersonId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PersonId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for PersonId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// An attribute value produced by inference rather than declared by the person.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct InferredAttribute {
    pub value: String,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
}

/// A participant to be seated.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    pub id: PersonId,
    pub attributes: BTreeMap<String, String>,
    pub inferred: BTreeMap<String, InferredAttribute>,
}

impl Person {
    pub fn new(id: impl Into<PersonId>) -> Self {
        Self {
            id: id.into(),
            attributes: BTreeMap::new(),
            inferred: BTreeMap::new(),
        }
    }

    /// Adds a declared attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Adds an inferred attribute. The confidence is clamped to `[0, 1]`.
    pub fn with_inferred(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
        confidence: f64,
    ) -> Self {
        self.inferred.insert(
            key.into(),
            InferredAttribute {
                value: value.into(),
                confidence: confidence.clamp(0.0, 1.0),
            },
        );
        self
    }

    /// Looks up an attribute value.
    ///
    /// Declared values win. Inferred values are used only when their confidence is at
    /// least `min_confidence`. Returns `None` when the value is unknown.
    pub fn attribute(&self, key: &str, min_confidence: f64) -> Option<&str> {
        if let Some(value) = self.attributes.get(key) {
            return Some(value.as_str());
        }
        self.inferred
            .get(key)
            .filter(|inferred| inferred.confidence >= min_confidence)
            .map(|inferred| inferred.value.as_str())
    }
}

/// An ordered, duplicate-free list of people.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "Vec<Person>", into = "Vec<Person>")
)]
#[derive(Debug, Clone)]
pub struct Roster {
    people: Vec<Person>,
    index: HashMap<PersonId, PersonIndex>,
}

impl Roster {
    /// Builds a roster, rejecting duplicate identifiers.
    pub fn new(people: Vec<Person>) -> Result<Self> {
        let mut index = HashMap::with_capacity(people.len());
        for (idx, person) in people.iter().enumerate() {
            if index.insert(person.id.clone(), idx).is_some() {
                return Err(SeatingError::DuplicatePerson(person.id.clone()));
            }
        }
        Ok(Self { people, index })
    }

    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }

    pub fn people(&self) -> &[Person] {
        &self.people
    }

    pub fn person(&self, index: PersonIndex) -> Option<&Person> {
        self.people.get(index)
    }

    pub fn index_of(&self, id: &PersonId) -> Option<PersonIndex> {
        self.index.get(id).copied()
    }

    pub fn id_of(&self, index: PersonIndex) -> Option<&PersonId> {
        self.people.get(index).map(|person| &person.id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &PersonId> {
        self.people.iter().map(|person| &person.id)
    }

    /// Returns a new roster without the given people, keeping the original order.
    /// Unknown identifiers in `absent` are ignored.
    pub fn without(&self, absent: &HashSet<PersonId>) -> Result<Self> {
        Self::new(
            self.people
                .iter()
                .filter(|person| !absent.contains(&person.id))
                .cloned()
                .collect(),
        )
    }
}

impl TryFrom<Vec<Person>> for Roster {
    type Error = SeatingError;

    fn try_from(people: Vec<Person>) -> Result<Self> {
        Self::new(people)
    }
}

impl From<Roster> for Vec<Person> {
    fn from(roster: Roster) -> Self {
        roster.people
    }
}

/// Table layout of an event: a fixed number of tables sharing one capacity.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventConfig {
    pub table_count: usize,
    pub table_capacity: usize,
}

impl EventConfig {
    pub fn new(table_count: usize, table_capacity: usize) -> Self {
        Self {
            table_count,
            table_capacity,
        }
    }

    /// The smallest number of tables of `table_capacity` that seats `people`.
    pub fn for_roster(people: usize, table_capacity: usize) -> Self {
        let table_count = if table_capacity == 0 {
            0
        } else {
            people.div_ceil(table_capacity).max(1)
        };
        Self::new(table_count, table_capacity)
    }

    pub fn total_seats(&self) -> usize {
        self.table_count * self.table_capacity
    }

    /// Checks the layout itself and that it can seat `people`.
    pub fn validate(&self, people: usize) -> Result<()> {
        if self.table_count == 0 {
            return Err(SeatingError::Configuration(
                "An event needs at least one table".to_string(),
            ));
        }
        if !(MIN_TABLE_CAPACITY..=MAX_TABLE_CAPACITY).contains(&self.table_capacity) {
            return Err(SeatingError::Configuration(format!(
                "Table capacity must be between {} and {}, got {}",
                MIN_TABLE_CAPACITY, MAX_TABLE_CAPACITY, self.table_capacity
            )));
        }
        if people > self.total_seats() {
            return Err(SeatingError::InsufficientCapacity {
                people,
                capacity: self.total_seats(),
            });
        }
        Ok(())
    }
}
