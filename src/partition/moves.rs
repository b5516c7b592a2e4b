//! Elementary moves on a [`Partition`].
//!
//! Every move takes the partition by reference and returns a new one, leaving the
//! input untouched. Moves that cannot apply (an empty source table, an unknown
//! table id) return an unchanged copy instead of failing. None of them enforce
//! capacity: strategies pick destinations with free seats, and an overfull table
//! that slips through is reported by the constraint evaluator.

use crate::partition::Partition;
use crate::rng::RandomNumberGenerator;
use crate::roster::TableId;

/// Exchanges one person between tables `a` and `b`.
///
/// Missing indices are drawn uniformly among the table's occupants. Out-of-range
/// indices, equal tables or an empty table leave the partition unchanged.
pub fn swap(
    partition: &Partition,
    a: TableId,
    b: TableId,
    idx_a: Option<usize>,
    idx_b: Option<usize>,
    rng: &mut RandomNumberGenerator,
) -> Partition {
    if a == b || !partition.has_table(a) || !partition.has_table(b) {
        return partition.clone();
    }
    let (len_a, len_b) = (partition.table(a).len(), partition.table(b).len());
    if len_a == 0 || len_b == 0 {
        return partition.clone();
    }
    let i = idx_a.unwrap_or_else(|| rng.gen_index(len_a));
    let j = idx_b.unwrap_or_else(|| rng.gen_index(len_b));
    if i >= len_a || j >= len_b {
        return partition.clone();
    }

    let mut next = partition.clone();
    let person_a = partition.table(a)[i];
    let person_b = partition.table(b)[j];
    next.table_mut(a)[i] = person_b;
    next.table_mut(b)[j] = person_a;
    next
}

/// Moves one person from `from` to the end of `to`.
pub fn move_person(
    partition: &Partition,
    from: TableId,
    to: TableId,
    idx: Option<usize>,
    rng: &mut RandomNumberGenerator,
) -> Partition {
    if from == to || !partition.has_table(from) || !partition.has_table(to) {
        return partition.clone();
    }
    let len = partition.table(from).len();
    if len == 0 {
        return partition.clone();
    }
    let i = idx.unwrap_or_else(|| rng.gen_index(len));
    if i >= len {
        return partition.clone();
    }

    let mut next = partition.clone();
    let person = next.table_mut(from).remove(i);
    next.table_mut(to).push(person);
    next
}

/// Randomly reorders the occupants of one table. Only seat-order sensitive rules
/// notice the difference.
pub fn shuffle_table(
    partition: &Partition,
    table: TableId,
    rng: &mut RandomNumberGenerator,
) -> Partition {
    if !partition.has_table(table) || partition.table(table).len() < 2 {
        return partition.clone();
    }
    let mut next = partition.clone();
    rng.shuffle(next.table_mut(table));
    next
}

/// Removes `count` occupants of `table` (by default `max(1, size / 3)`) and deals
/// them round-robin over the `targets` that still have free seats. People that fit
/// nowhere are returned to `table`.
pub fn redistribute_table(
    partition: &Partition,
    table: TableId,
    targets: &[TableId],
    count: Option<usize>,
    rng: &mut RandomNumberGenerator,
) -> Partition {
    if !partition.has_table(table) || partition.table(table).is_empty() {
        return partition.clone();
    }
    let size = partition.table(table).len();
    let count = count.unwrap_or((size / 3).max(1)).clamp(1, size);

    let mut next = partition.clone();
    let mut displaced = Vec::with_capacity(count);
    {
        let occupants = next.table_mut(table);
        for _ in 0..count {
            let idx = rng.gen_index(occupants.len());
            displaced.push(occupants.swap_remove(idx));
        }
    }

    let targets: Vec<TableId> = targets
        .iter()
        .copied()
        .filter(|&target| target != table && next.has_table(target))
        .collect();
    let mut cursor = 0;
    for person in displaced {
        let destination = (0..targets.len())
            .map(|offset| targets[(cursor + offset) % targets.len()])
            .find(|&target| next.free_seats(target) > 0);
        match destination {
            Some(target) => {
                next.table_mut(target).push(person);
                cursor += 1;
            }
            None => next.table_mut(table).push(person),
        }
    }
    next
}

/// Pools the occupants of tables `a` and `b`, shuffles them, and deals them back
/// keeping both table sizes.
pub fn mix_tables(
    partition: &Partition,
    a: TableId,
    b: TableId,
    rng: &mut RandomNumberGenerator,
) -> Partition {
    if a == b || !partition.has_table(a) || !partition.has_table(b) {
        return partition.clone();
    }
    let mut pool: Vec<_> = partition
        .table(a)
        .iter()
        .chain(partition.table(b))
        .copied()
        .collect();
    if pool.len() < 2 {
        return partition.clone();
    }
    rng.shuffle(&mut pool);
    let split = partition.table(a).len();
    let tail = pool.split_off(split);

    let mut next = partition.clone();
    *next.table_mut(a) = pool;
    *next.table_mut(b) = tail;
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Partition {
        Partition::from_tables(vec![vec![0, 1, 2], vec![3, 4], vec![]], 4)
    }

    #[test]
    fn test_swap_with_indices() {
        let mut rng = RandomNumberGenerator::from_seed(1);
        let original = sample();
        let next = swap(&original, 1, 2, Some(0), Some(1), &mut rng);
        assert_eq!(next.table(1), &[4, 1, 2]);
        assert_eq!(next.table(2), &[3, 0]);
        // input untouched
        assert_eq!(original.table(1), &[0, 1, 2]);
    }

    #[test]
    fn test_swap_with_empty_table_is_noop() {
        let mut rng = RandomNumberGenerator::from_seed(1);
        let original = sample();
        assert_eq!(swap(&original, 1, 3, None, None, &mut rng), original);
        assert_eq!(swap(&original, 1, 1, None, None, &mut rng), original);
    }

    #[test]
    fn test_move_does_not_enforce_capacity() {
        let mut rng = RandomNumberGenerator::from_seed(3);
        let full = Partition::from_tables(vec![vec![0], vec![1, 2, 3, 4]], 4);
        let next = move_person(&full, 1, 2, None, &mut rng);
        assert_eq!(next.table(2).len(), 5);
        assert!(!next.is_within_capacity());
        assert!(next.is_complete(5));
    }

    #[test]
    fn test_move_from_empty_is_noop() {
        let mut rng = RandomNumberGenerator::from_seed(3);
        let original = sample();
        assert_eq!(move_person(&original, 3, 1, None, &mut rng), original);
    }

    #[test]
    fn test_shuffle_keeps_members() {
        let mut rng = RandomNumberGenerator::from_seed(5);
        let original = Partition::from_tables(vec![(0..8).collect()], 8);
        let next = shuffle_table(&original, 1, &mut rng);
        let mut members = next.table(1).to_vec();
        members.sort_unstable();
        assert_eq!(members, (0..8).collect::<Vec<_>>());
    }

    #[test]
    fn test_redistribute_uses_free_capacity() {
        let mut rng = RandomNumberGenerator::from_seed(9);
        let original = Partition::from_tables(vec![vec![0, 1, 2, 3, 4, 5], vec![6], vec![7]], 6);
        let next = redistribute_table(&original, 1, &[2, 3], None, &mut rng);
        assert_eq!(next.table(1).len(), 4);
        assert_eq!(next.table(2).len(), 2);
        assert_eq!(next.table(3).len(), 2);
        assert!(next.is_complete(8));
    }

    #[test]
    fn test_redistribute_falls_back_to_origin() {
        let mut rng = RandomNumberGenerator::from_seed(9);
        let original = Partition::from_tables(vec![vec![0, 1, 2], vec![3, 4, 5]], 3);
        let next = redistribute_table(&original, 1, &[2], Some(2), &mut rng);
        assert_eq!(next.table(1).len(), 3);
        assert_eq!(next.table(2), &[3, 4, 5]);
        assert!(next.is_complete(6));
    }

    #[test]
    fn test_mix_tables_preserves_sizes() {
        let mut rng = RandomNumberGenerator::from_seed(11);
        let original = sample();
        let next = mix_tables(&original, 1, 2, &mut rng);
        assert_eq!(next.table(1).len(), 3);
        assert_eq!(next.table(2).len(), 2);
        assert!(next.is_complete(5));
    }
}
