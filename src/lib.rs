//! Category rollup: taxonomy-aware cleanup of labeled query training data.
//!
//! Query logs label each search with a leaf category from a product taxonomy.
//! Sparse categories are merged into their ancestors until every surviving
//! label has at least `min_support` distinct queries.

pub mod cli;
pub mod config;
pub mod engine;
pub mod format;
pub mod taxonomy;
pub mod types;

// Re-export commonly used types at the crate root
pub use config::{ColumnSchema, RollupConfig};
pub use engine::{
    count_support, ranked_support, rollup, QueryNormalizer, RollupEngine, RollupOutcome,
    RollupReport, UnknownCategoryPolicy,
};
pub use format::{
    restrict_to_taxonomy, CategoryNamesWriter, LabeledReader, LabeledWriter, QueryLogReader,
    TaxonomyXmlReader,
};
pub use taxonomy::{path_to_root, Ancestors, TaxonomyBuilder, TaxonomyIndex};
pub use types::{
    CategoryNode, Observation, ObservationSet, RollupError, RollupResult, TaxonomyDefect,
    DEFAULT_LABEL_PREFIX, DEFAULT_MIN_SUPPORT, DEFAULT_ROOT_CATEGORY,
};
