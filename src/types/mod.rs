//! All data types for the category rollup library.

pub mod category;
pub mod error;
pub mod observation;

pub use category::CategoryNode;
pub use error::{RollupError, RollupResult, TaxonomyDefect};
pub use observation::{Observation, ObservationSet};

/// Identifier of the product taxonomy root ("Best Buy").
pub const DEFAULT_ROOT_CATEGORY: &str = "cat00000";

/// Prefix prepended to category codes in training files.
pub const DEFAULT_LABEL_PREFIX: &str = "__label__";

/// Default minimum number of distinct queries per category.
pub const DEFAULT_MIN_SUPPORT: usize = 1;

/// Default column holding the category code in query logs.
pub const DEFAULT_CATEGORY_COLUMN: &str = "category";

/// Default column holding the query text in query logs.
pub const DEFAULT_QUERY_COLUMN: &str = "query";
