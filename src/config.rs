//! Rollup configuration with TOML persistence.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::engine::{RollupEngine, UnknownCategoryPolicy};
use crate::types::{
    RollupError, RollupResult, DEFAULT_CATEGORY_COLUMN, DEFAULT_LABEL_PREFIX, DEFAULT_MIN_SUPPORT,
    DEFAULT_QUERY_COLUMN, DEFAULT_ROOT_CATEGORY,
};

/// Column names and label marker used by the readers and writers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnSchema {
    /// Query-log column holding the category code.
    pub category_column: String,
    /// Query-log column holding the query text.
    pub query_column: String,
    /// Prefix written before each category in labeled output.
    pub label_prefix: String,
}

impl Default for ColumnSchema {
    fn default() -> Self {
        Self {
            category_column: DEFAULT_CATEGORY_COLUMN.to_string(),
            query_column: DEFAULT_QUERY_COLUMN.to_string(),
            label_prefix: DEFAULT_LABEL_PREFIX.to_string(),
        }
    }
}

impl ColumnSchema {
    /// Category code with the label prefix attached.
    pub fn label(&self, category: &str) -> String {
        format!("{}{}", self.label_prefix, category)
    }
}

/// Complete rollup configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RollupConfig {
    /// Minimum distinct queries per surviving category
    pub min_support: usize,

    /// Upper bound on moving passes; taxonomy height when unset
    pub max_passes: Option<usize>,

    /// Handling of categories missing from the taxonomy
    pub unknown_category: UnknownCategoryPolicy,

    /// Root category ID
    pub root_category: String,

    /// Drop query-log rows outside the taxonomy (or at the root) on load
    pub restrict_to_taxonomy: bool,

    /// Normalize query text before rollup
    pub normalize_queries: bool,

    /// Stem query tokens during normalization
    pub stem_queries: bool,

    /// Remove rows that end at the root before writing
    pub drop_root_rows: bool,

    /// Column names and label prefix
    pub schema: ColumnSchema,
}

impl Default for RollupConfig {
    fn default() -> Self {
        Self {
            min_support: DEFAULT_MIN_SUPPORT,
            max_passes: None,
            unknown_category: UnknownCategoryPolicy::PassThrough,
            root_category: DEFAULT_ROOT_CATEGORY.to_string(),
            restrict_to_taxonomy: true,
            normalize_queries: true,
            stem_queries: true,
            drop_root_rows: false,
            schema: ColumnSchema::default(),
        }
    }
}

impl RollupConfig {
    /// Load from TOML file
    pub fn load(path: &Path) -> RollupResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse from TOML text
    pub fn from_toml(content: &str) -> RollupResult<Self> {
        toml::from_str(content).map_err(|e| RollupError::Config(e.to_string()))
    }

    /// Save to TOML file
    pub fn save(&self, path: &Path) -> RollupResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| RollupError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Build a rollup engine from these settings.
    pub fn engine(&self) -> RollupEngine {
        let engine =
            RollupEngine::new(self.min_support).with_unknown_policy(self.unknown_category);
        match self.max_passes {
            Some(limit) => engine.with_max_passes(limit),
            None => engine,
        }
    }
}
