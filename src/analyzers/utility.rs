use std::collections::HashMap;
use std::hash::Hash;

use crate::analyzers::types::{Popular, ValueCount};

/// Counts occurrences, remembering where each value was first seen.
fn tally<T, I>(values: I) -> Vec<(T, usize)>
where
    T: Hash + Eq + Clone,
    I: IntoIterator<Item = T>,
{
    let mut index: HashMap<T, usize> = HashMap::new();
    let mut counts: Vec<(T, usize)> = Vec::new();

    for value in values {
        match index.get(&value) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(value.clone(), counts.len());
                counts.push((value, 1));
            }
        }
    }

    counts
}

/// Most frequent value. Ties go to the value encountered first.
/// Returns `None` for empty input.
pub fn mode<T, I>(values: I) -> Option<Popular<T>>
where
    T: Hash + Eq + Clone,
    I: IntoIterator<Item = T>,
{
    let mut best: Option<(T, usize)> = None;
    // first-seen order, so only a strictly larger count replaces the leader
    for (value, count) in tally(values) {
        if best.as_ref().is_none_or(|(_, c)| count > *c) {
            best = Some((value, count));
        }
    }
    best.map(|(value, count)| Popular { value, count })
}

/// Frequency table sorted by descending count; ties keep first-seen order.
pub fn value_counts<I>(values: I) -> Vec<ValueCount>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut counts = tally(values.into_iter().map(|v| v.as_ref().to_string()));
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .map(|(value, count)| ValueCount { value, count })
        .collect()
}

/// Computes the arithmetic mean of a slice of values. Returns `None` for empty input.
pub fn mean(values: &[u64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().map(|&v| v as f64).sum::<f64>() / values.len() as f64)
}
