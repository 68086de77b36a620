//! Category rollup: merges under-supported categories into their parents.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::taxonomy::TaxonomyIndex;
use crate::types::{Observation, ObservationSet, RollupError, RollupResult};

use super::support::count_support;

/// What to do with observations whose category is not in the taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownCategoryPolicy {
    /// Treat the category as parentless: it is kept but never rolled up.
    #[default]
    PassThrough,
    /// Fail with `MissingCategory` before any pass runs.
    Reject,
}

/// Statistics gathered during a rollup run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RollupReport {
    /// Rows handed to the engine.
    pub input_rows: usize,
    /// Rows returned.
    pub output_rows: usize,
    /// Distinct categories before rollup.
    pub categories_before: usize,
    /// Distinct categories after rollup.
    pub categories_after: usize,
    /// Passes that moved at least one row.
    pub passes: usize,
    /// Rows moved up one level in each pass.
    pub moved_per_pass: Vec<usize>,
    /// Rows dropped because rollup made them identical to rows from another category.
    pub collapsed_duplicates: usize,
    /// Output rows at a parentless category whose final support is below threshold.
    pub frozen_rows: usize,
    /// Input rows whose category was unknown to the taxonomy.
    pub unknown_rows: usize,
}

/// Rolled-up observations plus the run report.
#[derive(Debug, Clone)]
pub struct RollupOutcome {
    /// Observations with their final categories.
    pub observations: ObservationSet,
    /// Run statistics.
    pub report: RollupReport,
}

/// The rollup engine: an explicit fixed-point loop over category support.
#[derive(Debug, Clone)]
pub struct RollupEngine {
    min_support: usize,
    max_passes: Option<usize>,
    unknown_policy: UnknownCategoryPolicy,
}

impl RollupEngine {
    /// Create an engine with the given minimum distinct-query support.
    pub fn new(min_support: usize) -> Self {
        Self {
            min_support,
            max_passes: None,
            unknown_policy: UnknownCategoryPolicy::default(),
        }
    }

    /// Cap the number of moving passes. Defaults to the taxonomy height.
    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = Some(max_passes);
        self
    }

    /// Set the unknown-category policy.
    pub fn with_unknown_policy(mut self, policy: UnknownCategoryPolicy) -> Self {
        self.unknown_policy = policy;
        self
    }

    /// Minimum distinct-query support.
    pub fn min_support(&self) -> usize {
        self.min_support
    }

    /// Unknown-category policy in effect.
    pub fn unknown_policy(&self) -> UnknownCategoryPolicy {
        self.unknown_policy
    }

    /// Check that every observed category exists in the taxonomy.
    pub fn validate(
        &self,
        observations: &ObservationSet,
        taxonomy: &TaxonomyIndex,
    ) -> RollupResult<()> {
        match observations.iter().find(|o| !taxonomy.exists(&o.category)) {
            Some(o) => Err(RollupError::MissingCategory(o.category.clone())),
            None => Ok(()),
        }
    }

    /// Roll up and return only the observations.
    pub fn rollup(
        &self,
        observations: &ObservationSet,
        taxonomy: &TaxonomyIndex,
    ) -> RollupResult<ObservationSet> {
        self.run(observations, taxonomy).map(|o| o.observations)
    }

    /// Roll up and return observations plus a report.
    pub fn run(
        &self,
        observations: &ObservationSet,
        taxonomy: &TaxonomyIndex,
    ) -> RollupResult<RollupOutcome> {
        if self.unknown_policy == UnknownCategoryPolicy::Reject {
            self.validate(observations, taxonomy)?;
        }

        let limit = self.max_passes.unwrap_or_else(|| taxonomy.height());
        let categories_before = observations.category_count();
        log::info!(
            "Rolling up {} rows over {} categories with min_support = {}",
            observations.len(),
            categories_before,
            self.min_support
        );

        let mut rows: Vec<Observation> = observations.as_slice().to_vec();
        let origins: Vec<String> = rows.iter().map(|r| r.category.clone()).collect();
        let unknown_rows = rows.iter().filter(|r| !taxonomy.exists(&r.category)).count();
        let mut frozen = vec![false; rows.len()];
        let mut moved_per_pass: Vec<usize> = Vec::new();

        loop {
            let moves: Vec<(usize, String)> = {
                let support = count_support(&rows);
                let mut moves = Vec::new();
                for (i, row) in rows.iter().enumerate() {
                    if frozen[i] {
                        continue;
                    }
                    let n = support.get(row.category.as_str()).copied().unwrap_or(0);
                    if n >= self.min_support {
                        continue;
                    }
                    match taxonomy.parent_of(&row.category) {
                        Some(parent) => moves.push((i, parent.to_string())),
                        None => frozen[i] = true,
                    }
                }
                moves
            };

            if moves.is_empty() {
                break;
            }
            if moved_per_pass.len() >= limit {
                return Err(RollupError::PassLimitExceeded { limit });
            }

            log::debug!(
                "Pass {}: moving {} rows up one level",
                moved_per_pass.len() + 1,
                moves.len()
            );
            moved_per_pass.push(moves.len());
            for (i, parent) in moves {
                rows[i].category = parent;
            }
        }

        let (rows, collapsed_duplicates) = collapse_merged_duplicates(rows, &origins);
        let observations = ObservationSet::from(rows);

        let frozen_rows = {
            let support = count_support(observations.as_slice());
            observations
                .iter()
                .filter(|o| {
                    taxonomy.parent_of(&o.category).is_none()
                        && support.get(o.category.as_str()).copied().unwrap_or(0) < self.min_support
                })
                .count()
        };
        if frozen_rows > 0 {
            log::warn!(
                "{} rows remain below min_support = {} at parentless categories",
                frozen_rows,
                self.min_support
            );
        }
        let categories_after = observations.category_count();
        log::info!(
            "Rollup finished after {} passes: {} categories remain",
            moved_per_pass.len(),
            categories_after
        );

        let report = RollupReport {
            input_rows: origins.len(),
            output_rows: observations.len(),
            categories_before,
            categories_after,
            passes: moved_per_pass.len(),
            moved_per_pass,
            collapsed_duplicates,
            frozen_rows,
            unknown_rows,
        };

        Ok(RollupOutcome {
            observations,
            report,
        })
    }
}

/// Roll up with the default policy and pass limit.
pub fn rollup(
    observations: &ObservationSet,
    taxonomy: &TaxonomyIndex,
    min_support: usize,
) -> RollupResult<ObservationSet> {
    RollupEngine::new(min_support).rollup(observations, taxonomy)
}

/// Drop rows that rollup made identical to rows from another origin category.
///
/// Each (category, query) group keeps as many rows as the largest count any
/// single origin contributed, so duplicates present in the input survive.
/// Row order is preserved.
fn collapse_merged_duplicates(
    rows: Vec<Observation>,
    origins: &[String],
) -> (Vec<Observation>, usize) {
    let keep: Vec<bool> = {
        let mut per_origin: HashMap<(&str, &str, &str), usize> = HashMap::new();
        for (row, origin) in rows.iter().zip(origins) {
            *per_origin
                .entry((row.category.as_str(), row.query.as_str(), origin.as_str()))
                .or_default() += 1;
        }

        let mut quota: HashMap<(&str, &str), usize> = HashMap::new();
        for ((category, query, _), n) in per_origin {
            let q = quota.entry((category, query)).or_default();
            *q = (*q).max(n);
        }

        let mut emitted: HashMap<(&str, &str), usize> = HashMap::new();
        rows.iter()
            .map(|row| {
                let key = (row.category.as_str(), row.query.as_str());
                let count = emitted.entry(key).or_default();
                let allowed = *count < quota.get(&key).copied().unwrap_or(0);
                if allowed {
                    *count += 1;
                }
                allowed
            })
            .collect()
    };

    let collapsed = keep.iter().filter(|k| !**k).count();
    let kept = rows
        .into_iter()
        .zip(keep)
        .filter_map(|(row, k)| k.then_some(row))
        .collect();
    (kept, collapsed)
}
