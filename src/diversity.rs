//! # Diversity Calculator
//!
//! Scores how varied each table is across a list of tracked attribute dimensions.
//! For one table and one dimension the sub-score is the number of distinct values
//! present divided by the best variety the table could reach,
//! `min(table size, number of values known for the dimension)`. Unknown values
//! count as a category of their own. Table scores are the weighted mean over
//! dimensions; the partition score aggregates table scores by plain or size-weighted
//! mean. Every score lies in `[0, 1]`.
//!
//! Category codes are resolved once when the calculator is built, so scoring a
//! candidate only walks small integer slices.

use std::collections::{BTreeMap, HashMap};

use crate::error::{Result, SeatingError};
use crate::partition::Partition;
use crate::roster::{PersonIndex, Roster, TableId};

/// Dimensions tracked when the caller does not name any.
pub const DEFAULT_DIMENSIONS: [&str; 5] = [
    "gender",
    "agency_level",
    "department_type",
    "seniority",
    "geography",
];

/// A tracked attribute and its relative weight.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Dimension {
    pub name: String,
    pub weight: f64,
}

impl Dimension {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            weight: 1.0,
        }
    }

    pub fn weighted(name: impl Into<String>, weight: f64) -> Self {
        Self {
            name: name.into(),
            weight,
        }
    }

    pub fn defaults() -> Vec<Self> {
        DEFAULT_DIMENSIONS.iter().map(|name| Self::new(*name)).collect()
    }
}

/// How table scores are combined into the partition score.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Aggregation {
    /// Every non-empty table counts the same.
    #[default]
    Mean,
    /// Tables count in proportion to their occupancy.
    SizeWeighted,
}

/// Per-dimension and per-table view of a partition's diversity.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DiversityBreakdown {
    pub overall: f64,
    pub per_dimension: BTreeMap<String, f64>,
    pub per_table: BTreeMap<TableId, f64>,
}

#[derive(Debug, Clone)]
struct DimensionCodes {
    name: String,
    weight: f64,
    /// Category code per roster index; unknown values share one code.
    codes: Vec<u32>,
    /// Number of distinct categories on the roster, unknown included.
    known_values: usize,
}

/// Pure, deterministic diversity scorer bound to one roster.
#[derive(Debug, Clone)]
pub struct DiversityCalculator {
    dimensions: Vec<DimensionCodes>,
    aggregation: Aggregation,
    total_weight: f64,
}

impl DiversityCalculator {
    /// Resolves each person's category for every dimension.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if no dimension is given, or if a weight is
    /// negative or non-finite, or if all weights are zero.
    pub fn new(
        roster: &Roster,
        dimensions: &[Dimension],
        aggregation: Aggregation,
        min_confidence: f64,
    ) -> Result<Self> {
        if dimensions.is_empty() {
            return Err(SeatingError::Configuration(
                "At least one diversity dimension is required".to_string(),
            ));
        }
        if dimensions
            .iter()
            .any(|dim| !dim.weight.is_finite() || dim.weight < 0.0)
        {
            return Err(SeatingError::Configuration(
                "Dimension weights must be finite and non-negative".to_string(),
            ));
        }
        let total_weight: f64 = dimensions.iter().map(|dim| dim.weight).sum();
        if total_weight <= 0.0 {
            return Err(SeatingError::Configuration(
                "Dimension weights must not all be zero".to_string(),
            ));
        }

        let dimensions = dimensions
            .iter()
            .map(|dim| {
                // code 0 is reserved for unknown values
                let mut lookup: HashMap<&str, u32> = HashMap::new();
                let mut has_unknown = false;
                let codes: Vec<u32> = roster
                    .people()
                    .iter()
                    .map(|person| match person.attribute(&dim.name, min_confidence) {
                        Some(value) => {
                            let next = lookup.len() as u32 + 1;
                            *lookup.entry(value).or_insert(next)
                        }
                        None => {
                            has_unknown = true;
                            0
                        }
                    })
                    .collect();
                DimensionCodes {
                    name: dim.name.clone(),
                    weight: dim.weight,
                    codes,
                    known_values: lookup.len() + usize::from(has_unknown),
                }
            })
            .collect();

        Ok(Self {
            dimensions,
            aggregation,
            total_weight,
        })
    }

    /// Overall diversity of `partition` in `[0, 1]`.
    pub fn score(&self, partition: &Partition) -> f64 {
        let scored: Vec<(f64, usize)> = partition
            .iter()
            .filter(|(_, occupants)| !occupants.is_empty())
            .map(|(_, occupants)| (self.table_score(occupants), occupants.len()))
            .collect();
        self.aggregate(&scored)
    }

    /// Score of every table in table order; empty tables score `0`.
    pub fn table_scores(&self, partition: &Partition) -> Vec<f64> {
        partition
            .iter()
            .map(|(_, occupants)| self.table_score(occupants))
            .collect()
    }

    /// Score of a single group of people.
    pub fn table_score(&self, occupants: &[PersonIndex]) -> f64 {
        if occupants.is_empty() {
            return 0.0;
        }
        let weighted: f64 = self
            .dimensions
            .iter()
            .map(|dim| dim.weight * dimension_variety(dim, occupants))
            .sum();
        (weighted / self.total_weight).clamp(0.0, 1.0)
    }

    /// Overall, per-dimension and per-table scores.
    pub fn breakdown(&self, partition: &Partition) -> DiversityBreakdown {
        let occupied: Vec<(TableId, &[PersonIndex])> = partition
            .iter()
            .filter(|(_, occupants)| !occupants.is_empty())
            .collect();

        let per_dimension = self
            .dimensions
            .iter()
            .map(|dim| {
                let scored: Vec<(f64, usize)> = occupied
                    .iter()
                    .map(|(_, occupants)| (dimension_variety(dim, occupants), occupants.len()))
                    .collect();
                (dim.name.clone(), self.aggregate(&scored))
            })
            .collect();

        let per_table = partition
            .iter()
            .map(|(table, occupants)| (table, self.table_score(occupants)))
            .collect();

        DiversityBreakdown {
            overall: self.score(partition),
            per_dimension,
            per_table,
        }
    }

    fn aggregate(&self, scored: &[(f64, usize)]) -> f64 {
        if scored.is_empty() {
            return 0.0;
        }
        let value = match self.aggregation {
            Aggregation::Mean => {
                scored.iter().map(|(score, _)| score).sum::<f64>() / scored.len() as f64
            }
            Aggregation::SizeWeighted => {
                let people: usize = scored.iter().map(|(_, size)| size).sum();
                scored
                    .iter()
                    .map(|(score, size)| score * *size as f64)
                    .sum::<f64>()
                    / people as f64
            }
        };
        value.clamp(0.0, 1.0)
    }
}

fn dimension_variety(dim: &DimensionCodes, occupants: &[PersonIndex]) -> f64 {
    let max_variety = occupants.len().min(dim.known_values);
    if max_variety == 0 {
        return 0.0;
    }
    let mut seen: Vec<u32> = Vec::with_capacity(occupants.len());
    for &person in occupants {
        let code = dim.codes.get(person).copied().unwrap_or(0);
        if !seen.contains(&code) {
            seen.push(code);
        }
    }
    (seen.len() as f64 / max_variety as f64).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::Person;

    fn roster() -> Roster {
        Roster::new(vec![
            Person::new("a").with_attribute("gender", "f"),
            Person::new("b").with_attribute("gender", "f"),
            Person::new("c").with_attribute("gender", "m"),
            Person::new("d").with_attribute("gender", "m"),
        ])
        .unwrap()
    }

    fn calculator(roster: &Roster) -> DiversityCalculator {
        DiversityCalculator::new(roster, &[Dimension::new("gender")], Aggregation::Mean, 0.5)
            .unwrap()
    }

    #[test]
    fn test_mixed_tables_score_one() {
        let roster = roster();
        let calc = calculator(&roster);
        let mixed = Partition::from_tables(vec![vec![0, 2], vec![1, 3]], 4);
        assert_eq!(calc.score(&mixed), 1.0);
    }

    #[test]
    fn test_homogeneous_tables_score_half() {
        let roster = roster();
        let calc = calculator(&roster);
        let split = Partition::from_tables(vec![vec![0, 1], vec![2, 3]], 4);
        assert_eq!(calc.score(&split), 0.5);
        assert_eq!(calc.table_scores(&split), vec![0.5, 0.5]);
    }

    #[test]
    fn test_unknown_values_are_a_category() {
        let roster = Roster::new(vec![
            Person::new("a").with_attribute("gender", "f"),
            Person::new("b"),
            Person::new("c").with_inferred("gender", "m", 0.2),
        ])
        .unwrap();
        let calc = calculator(&roster);
        // b and c are both unknown (c's inference is below the confidence floor)
        let partition = Partition::from_tables(vec![vec![0, 1, 2]], 4);
        assert_eq!(calc.score(&partition), 1.0);
        let partition = Partition::from_tables(vec![vec![1, 2], vec![0]], 4);
        assert_eq!(calc.table_scores(&partition), vec![0.5, 1.0]);
    }

    #[test]
    fn test_empty_tables_are_ignored() {
        let roster = roster();
        let calc = calculator(&roster);
        let partition = Partition::from_tables(vec![vec![0, 2], vec![1, 3], vec![]], 4);
        assert_eq!(calc.score(&partition), 1.0);
    }

    #[test]
    fn test_size_weighted_aggregation() {
        let roster = roster();
        let calc = DiversityCalculator::new(
            &roster,
            &[Dimension::new("gender")],
            Aggregation::SizeWeighted,
            0.5,
        )
        .unwrap();
        // table 1: f, f, m -> 2/2 = 1.0 (3 people); table 2: m -> 1/1 = 1.0
        let partition = Partition::from_tables(vec![vec![0, 1, 2], vec![3]], 4);
        assert_eq!(calc.score(&partition), 1.0);
        // table 1: f, f -> 0.5 (2 people); table 2: m, m -> 0.5
        let partition = Partition::from_tables(vec![vec![0, 1], vec![2, 3]], 4);
        assert_eq!(calc.score(&partition), 0.5);
    }

    #[test]
    fn test_breakdown() {
        let roster = roster();
        let calc = calculator(&roster);
        let partition = Partition::from_tables(vec![vec![0, 2], vec![1, 3]], 4);
        let breakdown = calc.breakdown(&partition);
        assert_eq!(breakdown.overall, 1.0);
        assert_eq!(breakdown.per_dimension.get("gender"), Some(&1.0));
        assert_eq!(breakdown.per_table.len(), 2);
    }

    #[test]
    fn test_invalid_dimensions() {
        let roster = roster();
        assert!(DiversityCalculator::new(&roster, &[], Aggregation::Mean, 0.5).is_err());
        assert!(DiversityCalculator::new(
            &roster,
            &[Dimension::weighted("gender", -1.0)],
            Aggregation::Mean,
            0.5
        )
        .is_err());
    }
}
