//! Labeled query observations.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// One (category, query) row from a query log.
///
/// Identical rows are meaningful: each one is a separate search.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Observation {
    /// Category the query is labeled with.
    pub category: String,
    /// Query text as searched (or as normalized).
    pub query: String,
}

impl Observation {
    /// Create a new observation.
    pub fn new(category: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            query: query.into(),
        }
    }
}

/// An ordered multiset of observations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObservationSet {
    rows: Vec<Observation>,
}

impl ObservationSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    /// Append a row.
    pub fn push(&mut self, observation: Observation) {
        self.rows.push(observation);
    }

    /// Append a row from its parts.
    pub fn add(&mut self, category: impl Into<String>, query: impl Into<String>) -> &mut Self {
        self.rows.push(Observation::new(category, query));
        self
    }

    /// Number of rows, duplicates included.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the set has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate rows in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Observation> {
        self.rows.iter()
    }

    /// All rows as a slice.
    pub fn as_slice(&self) -> &[Observation] {
        &self.rows
    }

    /// Mutable access to all rows. Used by the normalizer.
    pub fn as_mut_slice(&mut self) -> &mut [Observation] {
        &mut self.rows
    }

    /// Number of distinct categories present.
    pub fn category_count(&self) -> usize {
        self.rows
            .iter()
            .map(|o| o.category.as_str())
            .collect::<HashSet<_>>()
            .len()
    }

    /// Keep only rows matching the predicate.
    pub fn retain<F>(&mut self, f: F)
    where
        F: FnMut(&Observation) -> bool,
    {
        self.rows.retain(f);
    }
}

impl From<Vec<Observation>> for ObservationSet {
    fn from(rows: Vec<Observation>) -> Self {
        Self { rows }
    }
}

impl FromIterator<Observation> for ObservationSet {
    fn from_iter<I: IntoIterator<Item = Observation>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

impl<C: Into<String>, Q: Into<String>> FromIterator<(C, Q)> for ObservationSet {
    fn from_iter<I: IntoIterator<Item = (C, Q)>>(iter: I) -> Self {
        Self {
            rows: iter
                .into_iter()
                .map(|(c, q)| Observation::new(c, q))
                .collect(),
        }
    }
}

impl IntoIterator for ObservationSet {
    type Item = Observation;
    type IntoIter = std::vec::IntoIter<Observation>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a> IntoIterator for &'a ObservationSet {
    type Item = &'a Observation;
    type IntoIter = std::slice::Iter<'a, Observation>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
