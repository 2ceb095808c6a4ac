use std::collections::HashSet;

use super::domain::{NaturalKey, PolicyRecord};

/// Result of collapsing duplicate source rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DedupeOutcome {
    /// First occurrence of each natural key, in input order.
    pub unique: Vec<PolicyRecord>,
    /// Number of later occurrences that were dropped.
    pub suppressed: usize,
}

/// Collapse records referencing the same policy obligation.
///
/// Iterates in input order and keeps the first record seen for each
/// [`NaturalKey`]; later records with the same key are counted and dropped.
/// Stable and idempotent: re-running over the unique set suppresses nothing.
pub fn dedupe(records: &[PolicyRecord]) -> DedupeOutcome {
    let mut seen: HashSet<NaturalKey> = HashSet::with_capacity(records.len());
    let mut unique = Vec::with_capacity(records.len());
    let mut suppressed = 0;

    for record in records {
        if seen.insert(record.natural_key()) {
            unique.push(record.clone());
        } else {
            suppressed += 1;
        }
    }

    DedupeOutcome { unique, suppressed }
}
