//! # Interaction history
//!
//! Who has already shared a table with whom, across the days of one event.
//!
//! Records are keyed by an unordered [`PersonPair`] and only ever grow: each
//! finalized day adds one [`InteractionDetail`] per co-located pair. The in-memory
//! [`InteractionHistory`] is a cheap, cloneable handle around a shared map guarded
//! by a mutex, so every update for a pair is applied as a single upsert even when
//! several planners share one history.
//!
//! ## Example
//!
//! ```rust
//! use seatplan::rotation::{InteractionHistory, InteractionStore, PersonPair};
//! use seatplan::roster::PersonId;
//!
//! let history = InteractionHistory::new();
//! let pair = PersonPair::new(PersonId::from("ana"), PersonId::from("ben"));
//! history.record_day(1, &[(pair.clone(), 2)]).unwrap();
//!
//! let record = history.get(&pair).unwrap().unwrap();
//! assert_eq!(record.count, 1);
//! assert_eq!(record.last_day(), Some(1));
//! ```

use std::collections::{BTreeSet, HashMap};
use std::fmt::Debug;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use crate::error::{Result, SeatingError};
use crate::partition::Partition;
use crate::roster::{PersonId, Roster, TableId};

/// An unordered pair of people; `PersonPair::new(a, b) == PersonPair::new(b, a)`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PersonPair {
    first: PersonId,
    second: PersonId,
}

impl PersonPair {
    pub fn new(a: PersonId, b: PersonId) -> Self {
        if a <= b {
            Self { first: a, second: b }
        } else {
            Self { first: b, second: a }
        }
    }

    pub fn first(&self) -> &PersonId {
        &self.first
    }

    pub fn second(&self) -> &PersonId {
        &self.second
    }

    pub fn contains(&self, id: &PersonId) -> bool {
        &self.first == id || &self.second == id
    }
}

/// One shared table on one day.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InteractionDetail {
    pub day: u32,
    pub table: TableId,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionRecord {
    pub pair: PersonPair,
    pub count: u32,
    /// In recording order.
    pub details: Vec<InteractionDetail>,
}

impl InteractionRecord {
    fn new(pair: PersonPair) -> Self {
        Self {
            pair,
            count: 0,
            details: Vec::new(),
        }
    }

    pub fn last_day(&self) -> Option<u32> {
        self.details.iter().map(|detail| detail.day).max()
    }
}

/// Persistence seam for interaction history.
///
/// Implementations must apply each pair's update atomically; two writers must
/// never lose each other's increments for the same pair.
pub trait InteractionStore: Debug + Send + Sync {
    /// Adds one interaction for every `(pair, table)` of `day`.
    ///
    /// # Errors
    ///
    /// [`SeatingError::DayAlreadyRecorded`] when `day` was recorded before;
    /// [`SeatingError::Store`] when the store cannot be updated.
    fn record_day(&self, day: u32, pairs: &[(PersonPair, TableId)]) -> Result<usize>;

    fn get(&self, pair: &PersonPair) -> Result<Option<InteractionRecord>>;

    /// Every record, in pair order.
    fn records(&self) -> Result<Vec<InteractionRecord>>;

    fn recorded_days(&self) -> Result<Vec<u32>>;

    /// Records every co-located pair of `partition`.
    fn record_partition(&self, day: u32, partition: &Partition, roster: &Roster) -> Result<usize> {
        let pairs: Vec<(PersonPair, TableId)> = partition
            .co_located_pairs()
            .into_iter()
            .filter_map(|(a, b, table)| {
                let a = roster.id_of(a)?.clone();
                let b = roster.id_of(b)?.clone();
                Some((PersonPair::new(a, b), table))
            })
            .collect();
        self.record_day(day, &pairs)
    }
}

#[derive(Debug, Default)]
struct HistoryState {
    records: HashMap<PersonPair, InteractionRecord>,
    days: BTreeSet<u32>,
}

/// In-memory interaction store. Clones share the same history.
#[derive(Debug, Clone, Default)]
pub struct InteractionHistory {
    state: Arc<Mutex<HistoryState>>,
}

impl InteractionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a history from existing records, e.g. loaded from storage.
    pub fn from_records(records: impl IntoIterator<Item = InteractionRecord>) -> Self {
        let mut state = HistoryState::default();
        for record in records {
            state.days.extend(record.details.iter().map(|detail| detail.day));
            state.records.insert(record.pair.clone(), record);
        }
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.records.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.lock()?.records.is_empty())
    }

    /// Interaction count of a pair; 0 if they never met.
    pub fn count(&self, pair: &PersonPair) -> Result<u32> {
        Ok(self
            .lock()?
            .records
            .get(pair)
            .map_or(0, |record| record.count))
    }

    fn lock(&self) -> Result<MutexGuard<'_, HistoryState>> {
        self.state
            .lock()
            .map_err(|_| SeatingError::Store("interaction history lock poisoned".to_string()))
    }
}

impl InteractionStore for InteractionHistory {
    fn record_day(&self, day: u32, pairs: &[(PersonPair, TableId)]) -> Result<usize> {
        let mut state = self.lock()?;
        if !state.days.insert(day) {
            return Err(SeatingError::DayAlreadyRecorded(day));
        }
        for (pair, table) in pairs {
            let record = state
                .records
                .entry(pair.clone())
                .or_insert_with(|| InteractionRecord::new(pair.clone()));
            record.count += 1;
            record.details.push(InteractionDetail { day, table: *table });
        }
        debug!(day, pairs = pairs.len(), "Recorded interactions");
        Ok(pairs.len())
    }

    fn get(&self, pair: &PersonPair) -> Result<Option<InteractionRecord>> {
        Ok(self.lock()?.records.get(pair).cloned())
    }

    fn records(&self) -> Result<Vec<InteractionRecord>> {
        let mut records: Vec<InteractionRecord> =
            self.lock()?.records.values().cloned().collect();
        records.sort_by(|a, b| a.pair.cmp(&b.pair));
        Ok(records)
    }

    fn recorded_days(&self) -> Result<Vec<u32>> {
        Ok(self.lock()?.days.iter().copied().collect())
    }
}
