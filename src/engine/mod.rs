//! Support counting, rollup, and query normalization.

pub mod normalize;
pub mod rollup;
pub mod support;

pub use normalize::QueryNormalizer;
pub use rollup::{rollup, RollupEngine, RollupOutcome, RollupReport, UnknownCategoryPolicy};
pub use support::{count_support, ranked_support};
