//! Weighted choice of neighborhood moves.
//!
//! Strategies describe their move mix as a table of `(move, weight)` pairs and draw
//! from it with the run's single RNG, which keeps the mix data rather than
//! branching logic and makes runs reproducible under a fixed seed.

use crate::partition::{self, Partition};
use crate::rng::RandomNumberGenerator;
use crate::roster::TableId;

/// The elementary moves a strategy can draw.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveKind {
    Swap,
    Move,
    Shuffle,
    Redistribute,
}

/// A table of weighted options.
#[derive(Debug, Clone)]
pub struct WeightedTable<T> {
    entries: Vec<(T, f64)>,
    total: f64,
}

impl<T: Copy> WeightedTable<T> {
    /// Builds a table, dropping entries with non-positive or non-finite weights.
    pub fn new(entries: impl IntoIterator<Item = (T, f64)>) -> Self {
        let entries: Vec<(T, f64)> = entries
            .into_iter()
            .filter(|(_, weight)| weight.is_finite() && *weight > 0.0)
            .collect();
        let total = entries.iter().map(|(_, weight)| weight).sum();
        Self { entries, total }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[(T, f64)] {
        &self.entries
    }

    /// Draws one option proportionally to its weight.
    pub fn pick(&self, rng: &mut RandomNumberGenerator) -> Option<T> {
        let mut remaining = rng.gen_unit() * self.total;
        for (option, weight) in &self.entries {
            if remaining < *weight {
                return Some(*option);
            }
            remaining -= weight;
        }
        self.entries.last().map(|(option, _)| *option)
    }
}

fn pick_table(tables: &[TableId], rng: &mut RandomNumberGenerator) -> Option<TableId> {
    if tables.is_empty() {
        None
    } else {
        Some(tables[rng.gen_index(tables.len())])
    }
}

fn occupied_tables(partition: &Partition) -> Vec<TableId> {
    partition
        .iter()
        .filter(|(_, occupants)| !occupants.is_empty())
        .map(|(table, _)| table)
        .collect()
}

/// Swaps one random person between two distinct occupied tables.
pub fn random_swap(partition: &Partition, rng: &mut RandomNumberGenerator) -> Partition {
    let occupied = occupied_tables(partition);
    if occupied.len() < 2 {
        return partition.clone();
    }
    let first = rng.gen_index(occupied.len());
    let mut second = rng.gen_index(occupied.len() - 1);
    if second >= first {
        second += 1;
    }
    partition::swap(partition, occupied[first], occupied[second], None, None, rng)
}

/// Moves one random person to a different table that has a free seat.
pub fn random_move(partition: &Partition, rng: &mut RandomNumberGenerator) -> Partition {
    let Some(from) = pick_table(&occupied_tables(partition), rng) else {
        return partition.clone();
    };
    let destinations: Vec<TableId> = partition
        .tables_with_free_capacity()
        .into_iter()
        .filter(|&table| table != from)
        .collect();
    match pick_table(&destinations, rng) {
        Some(to) => partition::move_person(partition, from, to, None, rng),
        None => partition.clone(),
    }
}

/// Reorders one random table.
pub fn random_shuffle(partition: &Partition, rng: &mut RandomNumberGenerator) -> Partition {
    match pick_table(&occupied_tables(partition), rng) {
        Some(table) => partition::shuffle_table(partition, table, rng),
        None => partition.clone(),
    }
}

/// Spreads part of one random table over every other table with free seats.
pub fn random_redistribute(partition: &Partition, rng: &mut RandomNumberGenerator) -> Partition {
    let Some(table) = pick_table(&occupied_tables(partition), rng) else {
        return partition.clone();
    };
    let targets: Vec<TableId> = partition
        .tables_with_free_capacity()
        .into_iter()
        .filter(|&target| target != table)
        .collect();
    partition::redistribute_table(partition, table, &targets, None, rng)
}

/// Applies a move of the given kind at random positions.
pub fn apply(kind: MoveKind, partition: &Partition, rng: &mut RandomNumberGenerator) -> Partition {
    match kind {
        MoveKind::Swap => random_swap(partition, rng),
        MoveKind::Move => random_move(partition, rng),
        MoveKind::Shuffle => random_shuffle(partition, rng),
        MoveKind::Redistribute => random_redistribute(partition, rng),
    }
}
