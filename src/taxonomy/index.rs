//! Immutable category tree with parent lookups and precomputed depths.

use std::collections::{HashMap, HashSet};

use crate::types::{CategoryNode, RollupResult, TaxonomyDefect};

use super::traversal::Ancestors;

/// Read-only lookup structure over the product taxonomy.
///
/// Construction validates the tree: every parent is defined, the root is the
/// only parentless node, and every category reaches the root without cycles.
#[derive(Debug, Clone)]
pub struct TaxonomyIndex {
    /// All categories, keyed by ID. Includes the root.
    nodes: HashMap<String, CategoryNode>,
    /// Child lists, sorted, keyed by parent ID.
    children: HashMap<String, Vec<String>>,
    /// Distance from each category to the root (root = 0).
    depths: HashMap<String, usize>,
    /// Root category ID.
    root: String,
    /// Maximum depth over all categories.
    height: usize,
}

impl TaxonomyIndex {
    /// Build an index from category records and the designated root.
    ///
    /// The root is defined implicitly; sources usually only mention it as a
    /// parent. Repeated identical records are merged.
    pub fn from_parts(
        root: impl Into<String>,
        records: impl IntoIterator<Item = CategoryNode>,
    ) -> RollupResult<Self> {
        let root = root.into();
        let mut nodes: HashMap<String, CategoryNode> = HashMap::new();
        nodes.insert(root.clone(), CategoryNode::root(root.clone()));

        for record in records {
            if record.id == root {
                if let Some(parent) = record.parent {
                    return Err(TaxonomyDefect::RootHasParent { root, parent }.into());
                }
                if let (Some(name), Some(node)) = (record.name, nodes.get_mut(&root)) {
                    node.name.get_or_insert(name);
                }
                continue;
            }
            let Some(parent) = record.parent.as_deref() else {
                return Err(TaxonomyDefect::SecondRoot(record.id).into());
            };
            match nodes.get_mut(&record.id) {
                Some(existing) => {
                    let first = existing.parent.as_deref().unwrap_or_default();
                    if first != parent {
                        return Err(TaxonomyDefect::ConflictingParent {
                            first: first.to_string(),
                            second: parent.to_string(),
                            category: record.id,
                        }
                        .into());
                    }
                    if existing.name.is_none() {
                        existing.name = record.name;
                    }
                }
                None => {
                    nodes.insert(record.id.clone(), record);
                }
            }
        }

        let mut ids: Vec<&String> = nodes.keys().collect();
        ids.sort();

        let mut children: HashMap<String, Vec<String>> = HashMap::new();
        for id in &ids {
            if let Some(parent) = nodes[*id].parent.as_deref() {
                if !nodes.contains_key(parent) {
                    return Err(TaxonomyDefect::DanglingParent {
                        category: (*id).clone(),
                        parent: parent.to_string(),
                    }
                    .into());
                }
                children
                    .entry(parent.to_string())
                    .or_default()
                    .push((*id).clone());
            }
        }

        let depths = compute_depths(&nodes, &ids, &root)?;
        let height = depths.values().copied().max().unwrap_or(0);

        log::debug!(
            "Built taxonomy with {} categories, height {}",
            nodes.len(),
            height
        );

        Ok(Self {
            nodes,
            children,
            depths,
            root,
            height,
        })
    }

    /// Immediate parent of a category. `None` for the root and unknown IDs.
    pub fn parent_of(&self, category: &str) -> Option<&str> {
        self.nodes.get(category).and_then(|n| n.parent.as_deref())
    }

    /// Whether the category is defined.
    pub fn exists(&self, category: &str) -> bool {
        self.nodes.contains_key(category)
    }

    /// Get a category record.
    pub fn get(&self, category: &str) -> Option<&CategoryNode> {
        self.nodes.get(category)
    }

    /// Display name of a category, if known.
    pub fn name_of(&self, category: &str) -> Option<&str> {
        self.nodes.get(category).and_then(|n| n.name.as_deref())
    }

    /// Number of edges between a category and the root.
    pub fn depth_of(&self, category: &str) -> Option<usize> {
        self.depths.get(category).copied()
    }

    /// Maximum depth of any category. Bounds the number of rollup passes.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Root category ID.
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Whether the category is the root.
    pub fn is_root(&self, category: &str) -> bool {
        self.root == category
    }

    /// Direct children of a category, sorted by ID.
    pub fn children_of(&self, category: &str) -> &[String] {
        self.children
            .get(category)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Whether a known category has no children.
    pub fn is_leaf(&self, category: &str) -> bool {
        self.exists(category) && self.children_of(category).is_empty()
    }

    /// Ancestors of a category, nearest first, ending at the root.
    pub fn ancestors<'a>(&'a self, category: &'a str) -> Ancestors<'a> {
        Ancestors::new(self, category)
    }

    /// Number of categories, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the index holds no categories.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All category records, sorted by ID.
    pub fn categories(&self) -> Vec<&CategoryNode> {
        let mut all: Vec<&CategoryNode> = self.nodes.values().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        all
    }
}

/// Walk each category up to a node of known depth, failing on cycles.
fn compute_depths(
    nodes: &HashMap<String, CategoryNode>,
    ids: &[&String],
    root: &str,
) -> Result<HashMap<String, usize>, TaxonomyDefect> {
    let mut depths: HashMap<String, usize> = HashMap::with_capacity(nodes.len());
    depths.insert(root.to_string(), 0);

    for id in ids {
        let mut path: Vec<&str> = Vec::new();
        let mut on_path: HashSet<&str> = HashSet::new();
        let mut current: &str = id.as_str();

        let base = loop {
            if let Some(&depth) = depths.get(current) {
                break depth;
            }
            if !on_path.insert(current) {
                return Err(TaxonomyDefect::Cycle(current.to_string()));
            }
            path.push(current);
            match nodes.get(current).and_then(|n| n.parent.as_deref()) {
                Some(parent) => current = parent,
                None => return Err(TaxonomyDefect::SecondRoot(current.to_string())),
            }
        };

        for (offset, node_id) in path.iter().rev().enumerate() {
            depths.insert((*node_id).to_string(), base + offset + 1);
        }
    }

    Ok(depths)
}
