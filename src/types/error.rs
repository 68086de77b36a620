//! Error types for the category rollup library.

use thiserror::Error;

/// Structural defects that make a taxonomy unusable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaxonomyDefect {
    /// A category names a parent that is never defined.
    #[error("category {category} references undefined parent {parent}")]
    DanglingParent { category: String, parent: String },

    /// Following parent links from this category never reaches the root.
    #[error("cycle detected through category {0}")]
    Cycle(String),

    /// The same category was defined twice with different parents.
    #[error("category {category} has conflicting parents {first} and {second}")]
    ConflictingParent {
        category: String,
        first: String,
        second: String,
    },

    /// The designated root was given a parent.
    #[error("root {root} cannot have parent {parent}")]
    RootHasParent { root: String, parent: String },

    /// A non-root category was defined without a parent.
    #[error("category {0} has no parent but is not the root")]
    SecondRoot(String),
}

/// All errors that can occur in the category rollup library.
#[derive(Error, Debug)]
pub enum RollupError {
    /// Taxonomy failed build-time validation.
    #[error("Malformed taxonomy: {0}")]
    MalformedTaxonomy(TaxonomyDefect),

    /// An observation references a category the taxonomy does not know.
    #[error("Category {0} not found in taxonomy")]
    MissingCategory(String),

    /// Rollup needed more moving passes than allowed.
    #[error("Rollup did not converge within {limit} passes")]
    PassLimitExceeded { limit: usize },

    /// A required column is absent from the input header.
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// A labeled line could not be parsed.
    #[error("Invalid labeled record at line {line}: {reason}")]
    InvalidRecord { line: usize, reason: String },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Taxonomy XML could not be parsed.
    #[error("XML error: {0}")]
    Xml(String),

    /// CSV read or write error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration could not be read or written.
    #[error("Config error: {0}")]
    Config(String),

    /// Pattern compilation error.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl From<TaxonomyDefect> for RollupError {
    fn from(defect: TaxonomyDefect) -> Self {
        Self::MalformedTaxonomy(defect)
    }
}

/// Convenience result type for rollup operations.
pub type RollupResult<T> = Result<T, RollupError>;
