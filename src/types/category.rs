//! Taxonomy node record.

use serde::{Deserialize, Serialize};

/// A single category in the product taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryNode {
    /// Stable category code, e.g. `abcat0101001`.
    pub id: String,
    /// Human-readable name, if the source provided one.
    pub name: Option<String>,
    /// Immediate parent. `None` only for the root.
    pub parent: Option<String>,
}

impl CategoryNode {
    /// Create a node with a parent and no display name.
    pub fn new(id: impl Into<String>, parent: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            parent: Some(parent.into()),
        }
    }

    /// Create a parentless root node.
    pub fn root(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            parent: None,
        }
    }

    /// Attach a display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Whether this node has no parent.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}
