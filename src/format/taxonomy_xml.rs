//! Reads category records from the product taxonomy XML.
//!
//! Each top-level `<category>` carries a `<path>` listing every category from
//! the root down to itself. The last path entry is the category; the one
//! before it is the parent.

use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::types::{CategoryNode, RollupError, RollupResult};

/// Reader for taxonomy XML files.
pub struct TaxonomyXmlReader;

impl TaxonomyXmlReader {
    /// Read a taxonomy XML file into category records.
    pub fn read_from_file(path: &Path, root: &str) -> RollupResult<Vec<CategoryNode>> {
        let content = std::fs::read_to_string(path)?;
        Self::read_from_str(&content, root)
    }

    /// Parse taxonomy XML text. The root's own record is skipped.
    pub fn read_from_str(xml: &str, root: &str) -> RollupResult<Vec<CategoryNode>> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<Vec<u8>> = Vec::new();
        let mut path: Vec<PathEntry> = Vec::new();
        let mut records: Vec<CategoryNode> = Vec::new();

        loop {
            match reader.read_event().map_err(xml_error)? {
                Event::Start(e) => {
                    let name = e.local_name().as_ref().to_vec();
                    if name == b"category" && stack.len() == 3 && stack[2] == b"path" {
                        path.push(PathEntry::default());
                    }
                    stack.push(name);
                }
                Event::End(_) => {
                    stack.pop();
                    if stack.len() == 1 && !path.is_empty() {
                        if let Some(record) = leaf_record(&path, root) {
                            records.push(record);
                        }
                        path.clear();
                    }
                }
                Event::Text(t) => {
                    if in_path_field(&stack) {
                        let text = t.unescape().map_err(xml_error)?;
                        push_field(&stack, &mut path, &text);
                    }
                }
                Event::CData(c) => {
                    if in_path_field(&stack) {
                        let text = std::str::from_utf8(&c).map_err(xml_error)?;
                        push_field(&stack, &mut path, text);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        log::info!("Read {} category records from taxonomy XML", records.len());
        Ok(records)
    }
}

#[derive(Default)]
struct PathEntry {
    id: String,
    name: Option<String>,
}

/// `categories/category/path/category/{id,name}`
fn in_path_field(stack: &[Vec<u8>]) -> bool {
    stack.len() == 5 && stack[1] == b"category" && stack[2] == b"path" && stack[3] == b"category"
}

/// Append text to the `id` or `name` of the current path entry.
fn push_field(stack: &[Vec<u8>], path: &mut [PathEntry], text: &str) {
    let Some(entry) = path.last_mut() else {
        return;
    };
    match stack[4].as_slice() {
        b"id" => entry.id.push_str(text),
        b"name" => entry.name.get_or_insert_with(String::new).push_str(text),
        _ => {}
    }
}

fn leaf_record(path: &[PathEntry], root: &str) -> Option<CategoryNode> {
    let leaf = path.last()?;
    if leaf.id.is_empty() || leaf.id == root {
        return None;
    }
    let parent = path
        .len()
        .checked_sub(2)
        .map(|i| path[i].id.clone());
    Some(CategoryNode {
        id: leaf.id.clone(),
        name: leaf.name.clone(),
        parent,
    })
}

fn xml_error(e: impl std::fmt::Display) -> RollupError {
    RollupError::Xml(e.to_string())
}
