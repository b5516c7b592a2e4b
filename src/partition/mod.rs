//! # Partition
//!
//! A `Partition` assigns every person of a roster to exactly one table, keeping the
//! seating order inside each table. Search strategies create a new partition for
//! every candidate they consider, so the type is a copy-on-write value: each table
//! list lives behind an `Arc`, cloning a partition only bumps reference counts, and
//! a move copies just the tables it changes. Accepting or rejecting a candidate is
//! therefore a cheap value swap.
//!
//! The elementary moves live in [`moves`].
//!
//! ## Example
//!
//! ```rust
//! use seatplan::partition::Partition;
//! use seatplan::roster::EventConfig;
//!
//! let partition = Partition::round_robin(7, &EventConfig::new(2, 4));
//! assert_eq!(partition.table(1), &[0, 2, 4, 6]);
//! assert_eq!(partition.table(2), &[1, 3, 5]);
//! assert!(partition.is_complete(7));
//! ```

pub mod moves;

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{Result, SeatingError};
use crate::roster::{EventConfig, PersonId, PersonIndex, Roster, TableId};

pub use moves::{mix_tables, move_person, redistribute_table, shuffle_table, swap};

/// Table id → ordered list of roster indices.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    capacity: usize,
    tables: Vec<Arc<Vec<PersonIndex>>>,
}

impl Partition {
    /// Creates a partition with `table_count` empty tables.
    pub fn empty(table_count: usize, capacity: usize) -> Self {
        Self {
            capacity,
            tables: (0..table_count).map(|_| Arc::new(Vec::new())).collect(),
        }
    }

    /// Deals `people` roster indices across the tables in round-robin order. When the
    /// round-robin slot is full the person goes to the next table with free capacity.
    /// People that fit nowhere land on the last table tried, which callers avoid by
    /// validating the event first.
    pub fn round_robin(people: usize, event: &EventConfig) -> Self {
        let mut tables: Vec<Vec<PersonIndex>> = vec![Vec::new(); event.table_count];
        if tables.is_empty() {
            return Self::from_tables(tables, event.table_capacity);
        }
        let count = tables.len();
        for person in 0..people {
            let slot = person % count;
            let target = (0..count)
                .map(|offset| (slot + offset) % count)
                .find(|&idx| tables[idx].len() < event.table_capacity)
                .unwrap_or(slot);
            tables[target].push(person);
        }
        Self::from_tables(tables, event.table_capacity)
    }

    /// Wraps explicit table lists. The first list is table `1`.
    pub fn from_tables(tables: Vec<Vec<PersonIndex>>, capacity: usize) -> Self {
        Self {
            capacity,
            tables: tables.into_iter().map(Arc::new).collect(),
        }
    }

    /// Builds a partition from seating expressed with person ids.
    pub fn from_seating(
        seating: &[Vec<PersonId>],
        roster: &Roster,
        capacity: usize,
    ) -> Result<Self> {
        let tables = seating
            .iter()
            .map(|table| {
                table
                    .iter()
                    .map(|id| {
                        roster
                            .index_of(id)
                            .ok_or_else(|| SeatingError::UnknownPerson(id.clone()))
                    })
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_tables(tables, capacity))
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    pub fn table_ids(&self) -> impl Iterator<Item = TableId> {
        1..=self.tables.len()
    }

    /// Whether `table` names one of this partition's tables.
    pub fn has_table(&self, table: TableId) -> bool {
        table >= 1 && table <= self.tables.len()
    }

    /// Occupants of a table in seating order. Unknown tables are empty.
    pub fn table(&self, table: TableId) -> &[PersonIndex] {
        match table.checked_sub(1).and_then(|idx| self.tables.get(idx)) {
            Some(occupants) => occupants.as_slice(),
            None => &[],
        }
    }

    /// Iterates `(table id, occupants)` pairs in table order.
    pub fn iter(&self) -> impl Iterator<Item = (TableId, &[PersonIndex])> {
        self.tables
            .iter()
            .enumerate()
            .map(|(idx, occupants)| (idx + 1, occupants.as_slice()))
    }

    /// Mutable access to one table; copies the list only if it is shared.
    pub(crate) fn table_mut(&mut self, table: TableId) -> &mut Vec<PersonIndex> {
        Arc::make_mut(&mut self.tables[table - 1])
    }

    /// Total number of seated people.
    pub fn person_count(&self) -> usize {
        self.tables.iter().map(|table| table.len()).sum()
    }

    pub fn free_seats(&self, table: TableId) -> usize {
        self.capacity.saturating_sub(self.table(table).len())
    }

    pub fn tables_with_free_capacity(&self) -> Vec<TableId> {
        self.table_ids()
            .filter(|&table| self.free_seats(table) > 0)
            .collect()
    }

    /// The table with the fewest occupants; ties go to the lowest id.
    pub fn smallest_table(&self) -> Option<TableId> {
        self.iter()
            .min_by_key(|(_, occupants)| occupants.len())
            .map(|(table, _)| table)
    }

    /// Tables holding more people than the shared capacity.
    pub fn overfull_tables(&self) -> Vec<TableId> {
        self.iter()
            .filter(|(_, occupants)| occupants.len() > self.capacity)
            .map(|(table, _)| table)
            .collect()
    }

    pub fn is_within_capacity(&self) -> bool {
        self.tables.iter().all(|table| table.len() <= self.capacity)
    }

    /// Whether each of the roster indices `0..people` appears exactly once.
    pub fn is_complete(&self, people: usize) -> bool {
        let mut seen = vec![false; people];
        for table in &self.tables {
            for &person in table.iter() {
                match seen.get_mut(person) {
                    Some(slot) if !*slot => *slot = true,
                    _ => return false,
                }
            }
        }
        seen.into_iter().all(|present| present)
    }

    /// The table a person sits at.
    pub fn table_of(&self, person: PersonIndex) -> Option<TableId> {
        self.iter()
            .find(|(_, occupants)| occupants.contains(&person))
            .map(|(table, _)| table)
    }

    /// Every unordered pair sharing a table, with that table.
    pub fn co_located_pairs(&self) -> Vec<(PersonIndex, PersonIndex, TableId)> {
        let mut pairs = Vec::new();
        for (table, occupants) in self.iter() {
            for (i, &a) in occupants.iter().enumerate() {
                for &b in &occupants[i + 1..] {
                    pairs.push((a.min(b), a.max(b), table));
                }
            }
        }
        pairs
    }

    /// Translates the partition back to person ids.
    pub fn seating(&self, roster: &Roster) -> BTreeMap<TableId, Vec<PersonId>> {
        self.iter()
            .map(|(table, occupants)| {
                let ids = occupants
                    .iter()
                    .filter_map(|&person| roster.id_of(person).cloned())
                    .collect();
                (table, ids)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::Person;

    #[test]
    fn test_round_robin_respects_capacity() {
        let partition = Partition::round_robin(12, &EventConfig::new(3, 4));
        assert!(partition.is_within_capacity());
        assert!(partition.is_complete(12));
        assert_eq!(partition.table(1), &[0, 3, 6, 9]);
    }

    #[test]
    fn test_round_robin_wraps_to_free_table() {
        let partition = Partition::from_tables(vec![vec![0, 1, 2], vec![]], 3);
        assert_eq!(partition.tables_with_free_capacity(), vec![2]);

        let partition = Partition::round_robin(5, &EventConfig::new(2, 3));
        assert_eq!(partition.table(1), &[0, 2, 4]);
        assert_eq!(partition.table(2), &[1, 3]);

        // More people than seats: the overflow stays on its round-robin slot.
        let partition = Partition::round_robin(7, &EventConfig::new(2, 3));
        assert!(partition.is_complete(7));
        assert_eq!(partition.overfull_tables(), vec![1]);
    }

    #[test]
    fn test_is_complete_detects_duplicates_and_gaps() {
        assert!(!Partition::from_tables(vec![vec![0, 1], vec![1]], 4).is_complete(3));
        assert!(!Partition::from_tables(vec![vec![0], vec![2]], 4).is_complete(3));
        assert!(!Partition::from_tables(vec![vec![0, 1], vec![3]], 4).is_complete(3));
    }

    #[test]
    fn test_clone_shares_tables_until_written() {
        let original = Partition::round_robin(8, &EventConfig::new(2, 4));
        let mut copy = original.clone();
        assert!(Arc::ptr_eq(&original.tables[0], &copy.tables[0]));

        copy.table_mut(1).push(99);
        assert!(!Arc::ptr_eq(&original.tables[0], &copy.tables[0]));
        assert!(Arc::ptr_eq(&original.tables[1], &copy.tables[1]));
        assert_eq!(original.table(1).len(), 4);
    }

    #[test]
    fn test_co_located_pairs() {
        let partition = Partition::from_tables(vec![vec![2, 0, 1], vec![3]], 4);
        let pairs = partition.co_located_pairs();
        assert_eq!(pairs, vec![(0, 2, 1), (1, 2, 1), (0, 1, 1)]);
    }

    #[test]
    fn test_from_seating_rejects_unknown_people() {
        let roster = Roster::new(vec![Person::new("a"), Person::new("b")]).unwrap();
        let ok = Partition::from_seating(&[vec!["b".into()], vec!["a".into()]], &roster, 4)
            .unwrap();
        assert_eq!(ok.table(1), &[1]);

        let err = Partition::from_seating(&[vec!["z".into()]], &roster, 4);
        assert!(matches!(err, Err(SeatingError::UnknownPerson(_))));
    }
}
