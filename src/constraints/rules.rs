//! Checks for the built-in rule kinds.

use super::{CompiledRule, Finding};
use crate::partition::Partition;
use crate::roster::{PersonId, PersonIndex, Roster, TableId};

fn matching<'a>(
    compiled: &'a CompiledRule,
    occupants: &'a [PersonIndex],
) -> impl Iterator<Item = PersonIndex> + 'a {
    occupants
        .iter()
        .copied()
        .filter(move |&person| compiled.matches.get(person).copied().unwrap_or(false))
}

pub(super) fn separation(compiled: &CompiledRule, partition: &Partition) -> Vec<Finding> {
    let limit = compiled.rule.params.max_per_table.unwrap_or(1);
    partition
        .iter()
        .filter_map(|(table, occupants)| {
            let count = matching(compiled, occupants).count();
            (count > limit).then(|| {
                Finding::new(
                    format!("{} targeted people share a table (limit {})", count, limit),
                    Some(table),
                )
            })
        })
        .collect()
}

pub(super) fn clustering(compiled: &CompiledRule, partition: &Partition) -> Vec<Finding> {
    let limit = compiled.rule.params.max_tables.unwrap_or(1).max(1);
    let mut people = 0;
    let mut spanned = 0;
    for (_, occupants) in partition.iter() {
        let count = matching(compiled, occupants).count();
        people += count;
        if count > 0 {
            spanned += 1;
        }
    }
    if people < 2 || spanned <= limit {
        return Vec::new();
    }
    vec![Finding::new(
        format!(
            "{} targeted people are spread over {} tables (limit {})",
            people, spanned, limit
        ),
        None,
    )]
}

pub(super) fn distribution(compiled: &CompiledRule, partition: &Partition) -> Vec<Finding> {
    let tolerance = compiled.rule.params.tolerance.unwrap_or(1.0).max(0.0);
    let tables = partition.table_count();
    if tables == 0 {
        return Vec::new();
    }

    let slots = compiled.slot_names.len();
    let mut counts = vec![vec![0usize; slots]; tables];
    for (table, occupants) in partition.iter() {
        for &person in occupants {
            if let Some(Some(slot)) = compiled.value_slot.get(person) {
                counts[table - 1][*slot] += 1;
            }
        }
    }

    let mut findings = Vec::new();
    for slot in 0..slots {
        let total: usize = counts.iter().map(|row| row[slot]).sum();
        if total == 0 {
            continue;
        }
        let average = total as f64 / tables as f64;
        for (idx, row) in counts.iter().enumerate() {
            let deviation = (row[slot] as f64 - average).abs();
            if deviation > tolerance + f64::EPSILON {
                findings.push(Finding::new(
                    format!(
                        "{} '{}' at the table, event average is {:.2} (tolerance {:.2})",
                        row[slot], compiled.slot_names[slot], average, tolerance
                    ),
                    Some(idx + 1),
                ));
            }
        }
    }
    findings
}

pub(super) fn proximity(
    compiled: &CompiledRule,
    partition: &Partition,
    roster: &Roster,
) -> Vec<Finding> {
    let name = |person: PersonIndex| roster.id_of(person).map_or("?", PersonId::as_str);
    let max_distance = compiled.rule.params.max_distance.unwrap_or(0);
    let max_seat_distance = compiled.rule.params.max_seat_distance;

    let seated: Vec<(PersonIndex, TableId, usize, usize)> = partition
        .iter()
        .flat_map(|(table, occupants)| {
            occupants
                .iter()
                .enumerate()
                .filter(|(_, &person)| compiled.matches.get(person).copied().unwrap_or(false))
                .map(move |(seat, &person)| (person, table, seat, occupants.len()))
        })
        .collect();

    let mut findings = Vec::new();
    for (i, &(a, table_a, seat_a, size)) in seated.iter().enumerate() {
        for &(b, table_b, seat_b, _) in &seated[i + 1..] {
            let distance = table_a.abs_diff(table_b);
            if distance > max_distance {
                findings.push(Finding::new(
                    format!(
                        "{} and {} are {} tables apart (limit {})",
                        name(a),
                        name(b),
                        distance,
                        max_distance
                    ),
                    None,
                ));
                continue;
            }
            if let (0, Some(limit)) = (distance, max_seat_distance) {
                let gap = seat_a.abs_diff(seat_b);
                let circular = gap.min(size - gap);
                if circular > limit {
                    findings.push(Finding::new(
                        format!(
                            "{} and {} are {} seats apart (limit {})",
                            name(a),
                            name(b),
                            circular,
                            limit
                        ),
                        Some(table_a),
                    ));
                }
            }
        }
    }
    findings
}
