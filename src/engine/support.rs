//! Per-category support: the number of distinct query texts.

use std::collections::{HashMap, HashSet};

use rayon::prelude::*;

use crate::types::Observation;

/// Row count at which support counting switches to the rayon path.
pub const PARALLEL_THRESHOLD: usize = 65_536;

/// Distinct-query support for every category present in `rows`.
///
/// Repeated identical queries under one category count once.
pub fn count_support(rows: &[Observation]) -> HashMap<&str, usize> {
    if rows.len() >= PARALLEL_THRESHOLD {
        count_support_parallel(rows)
    } else {
        count_support_sequential(rows)
    }
}

/// Single-threaded support count.
pub fn count_support_sequential(rows: &[Observation]) -> HashMap<&str, usize> {
    let mut distinct: HashMap<&str, HashSet<&str>> = HashMap::new();
    for row in rows {
        distinct
            .entry(row.category.as_str())
            .or_default()
            .insert(row.query.as_str());
    }
    into_counts(distinct)
}

/// Support count split across rayon workers, merged before returning.
pub fn count_support_parallel(rows: &[Observation]) -> HashMap<&str, usize> {
    let distinct = rows
        .par_iter()
        .fold(
            HashMap::<&str, HashSet<&str>>::new,
            |mut acc, row| {
                acc.entry(row.category.as_str())
                    .or_default()
                    .insert(row.query.as_str());
                acc
            },
        )
        .reduce(HashMap::new, |mut left, right| {
            for (category, queries) in right {
                left.entry(category).or_default().extend(queries);
            }
            left
        });
    into_counts(distinct)
}

fn into_counts<'a>(distinct: HashMap<&'a str, HashSet<&'a str>>) -> HashMap<&'a str, usize> {
    distinct
        .into_iter()
        .map(|(category, queries)| (category, queries.len()))
        .collect()
}

/// Support counts sorted ascending by support, then by category.
pub fn ranked_support(rows: &[Observation]) -> Vec<(String, usize)> {
    let mut ranked: Vec<(String, usize)> = count_support(rows)
        .into_iter()
        .map(|(category, n)| (category.to_string(), n))
        .collect();
    ranked.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
    ranked
}
