//! Upward walks through the category tree.

use super::TaxonomyIndex;

/// Iterator over the ancestors of a category, nearest first.
///
/// Yields nothing for the root or an unknown category. Bounded by the index
/// size, so it terminates even if handed a category outside the tree.
pub struct Ancestors<'a> {
    index: &'a TaxonomyIndex,
    current: Option<&'a str>,
    remaining: usize,
}

impl<'a> Ancestors<'a> {
    pub(crate) fn new(index: &'a TaxonomyIndex, category: &'a str) -> Self {
        Self {
            index,
            current: Some(category),
            remaining: index.len(),
        }
    }
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let parent = self.index.parent_of(self.current?);
        self.current = parent;
        parent
    }
}

/// The category followed by all its ancestors up to the root.
pub fn path_to_root<'a>(index: &'a TaxonomyIndex, category: &'a str) -> Vec<&'a str> {
    std::iter::once(category)
        .chain(index.ancestors(category))
        .collect()
}

