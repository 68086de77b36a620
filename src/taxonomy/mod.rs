//! In-memory category tree, built once and then read-only.

pub mod builder;
pub mod index;
pub mod traversal;

pub use builder::TaxonomyBuilder;
pub use index::TaxonomyIndex;
pub use traversal::{path_to_root, Ancestors};
