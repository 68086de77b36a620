//! Fluent API for building TaxonomyIndex instances.

use crate::types::{CategoryNode, RollupResult, DEFAULT_ROOT_CATEGORY};

use super::TaxonomyIndex;

/// Fluent builder for constructing a TaxonomyIndex.
pub struct TaxonomyBuilder {
    root: String,
    records: Vec<CategoryNode>,
}

impl TaxonomyBuilder {
    /// Create a new builder rooted at the default root category.
    pub fn new() -> Self {
        Self::with_root(DEFAULT_ROOT_CATEGORY)
    }

    /// Create a new builder with a specific root category.
    pub fn with_root(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            records: Vec::new(),
        }
    }

    /// Add a category under a parent.
    pub fn add(&mut self, category: &str, parent: &str) -> &mut Self {
        self.records.push(CategoryNode::new(category, parent));
        self
    }

    /// Add a named category under a parent.
    pub fn add_named(&mut self, category: &str, parent: &str, name: &str) -> &mut Self {
        self.records
            .push(CategoryNode::new(category, parent).with_name(name));
        self
    }

    /// Add a raw record. Parentless records other than the root fail at build.
    pub fn push(&mut self, record: CategoryNode) -> &mut Self {
        self.records.push(record);
        self
    }

    /// Add many records at once.
    pub fn extend(&mut self, records: impl IntoIterator<Item = CategoryNode>) -> &mut Self {
        self.records.extend(records);
        self
    }

    /// Validate and build the final TaxonomyIndex.
    pub fn build(self) -> RollupResult<TaxonomyIndex> {
        TaxonomyIndex::from_parts(self.root, self.records)
    }
}

impl Default for TaxonomyBuilder {
    fn default() -> Self {
        Self::new()
    }
}
