//! Label-prefixed training files (`__label__<category> <query>` per line)
//! and the category name table.

use std::borrow::Cow;
use std::io::{BufRead, Write};
use std::path::Path;

use crate::config::ColumnSchema;
use crate::taxonomy::TaxonomyIndex;
use crate::types::{Observation, ObservationSet, RollupError, RollupResult};

/// Writer for labeled training files.
pub struct LabeledWriter {
    label_prefix: String,
    excluded: Option<String>,
}

impl LabeledWriter {
    /// Create a writer using the schema's label prefix.
    pub fn new(schema: &ColumnSchema) -> Self {
        Self {
            label_prefix: schema.label_prefix.clone(),
            excluded: None,
        }
    }

    /// Skip rows assigned to this category (typically the root).
    pub fn excluding(mut self, category: impl Into<String>) -> Self {
        self.excluded = Some(category.into());
        self
    }

    /// Write observations to a file. Returns the number of lines written.
    pub fn write_to_file(&self, observations: &ObservationSet, path: &Path) -> RollupResult<usize> {
        let file = std::fs::File::create(path)?;
        let mut writer = std::io::BufWriter::new(file);
        let written = self.write_to(observations, &mut writer)?;
        writer.flush()?;
        Ok(written)
    }

    /// Write observations to any writer, one row per line.
    pub fn write_to(
        &self,
        observations: &ObservationSet,
        writer: &mut impl Write,
    ) -> RollupResult<usize> {
        let mut written = 0usize;
        for o in observations {
            if self.excluded.as_deref() == Some(o.category.as_str()) {
                continue;
            }
            let line = format!("{}{} {}", self.label_prefix, o.category, o.query);
            writeln!(writer, "{}", escape(&line))?;
            written += 1;
        }
        let skipped = observations.len() - written;
        if skipped > 0 {
            log::info!("Skipped {} rows assigned to an excluded category", skipped);
        }
        Ok(written)
    }
}

/// Reader for labeled training files.
pub struct LabeledReader;

impl LabeledReader {
    /// Read a labeled file back into observations.
    pub fn read_from_file(path: &Path, schema: &ColumnSchema) -> RollupResult<ObservationSet> {
        let file = std::fs::File::open(path)?;
        Self::read_from(std::io::BufReader::new(file), schema)
    }

    /// Parse labeled lines. Blank lines are skipped.
    pub fn read_from(reader: impl BufRead, schema: &ColumnSchema) -> RollupResult<ObservationSet> {
        let mut observations = ObservationSet::new();
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let line = unescape(&line);
            let (label, query) = line.split_once(' ').unwrap_or((line.as_str(), ""));
            let category = label.strip_prefix(schema.label_prefix.as_str()).ok_or_else(|| {
                RollupError::InvalidRecord {
                    line: i + 1,
                    reason: format!("label {:?} lacks prefix {:?}", label, schema.label_prefix),
                }
            })?;
            if category.is_empty() {
                return Err(RollupError::InvalidRecord {
                    line: i + 1,
                    reason: "empty category".to_string(),
                });
            }
            observations.push(Observation::new(category, query));
        }
        Ok(observations)
    }
}

/// Writer for the `category,category_name,label` table.
pub struct CategoryNamesWriter;

impl CategoryNamesWriter {
    /// Write the name table for every non-root category to a file.
    pub fn write_to_file(
        taxonomy: &TaxonomyIndex,
        schema: &ColumnSchema,
        path: &Path,
    ) -> RollupResult<usize> {
        let file = std::fs::File::create(path)?;
        Self::write_to(taxonomy, schema, file)
    }

    /// Write the name table to any writer, sorted by category.
    pub fn write_to(
        taxonomy: &TaxonomyIndex,
        schema: &ColumnSchema,
        writer: impl Write,
    ) -> RollupResult<usize> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(["category", "category_name", "label"])?;
        let mut rows = 0usize;
        for node in taxonomy.categories() {
            if node.is_root() {
                continue;
            }
            let label = schema.label(&node.id);
            csv_writer.write_record([
                node.id.as_str(),
                node.name.as_deref().unwrap_or(""),
                label.as_str(),
            ])?;
            rows += 1;
        }
        csv_writer.flush()?;
        Ok(rows)
    }
}

/// Backslash-escape the characters the training file format reserves, and
/// flatten line breaks.
fn escape(line: &str) -> Cow<'_, str> {
    if !line.contains(&['\\', '|', '"', '\n', '\r'][..]) {
        return Cow::Borrowed(line);
    }
    let mut out = String::with_capacity(line.len() + 8);
    for c in line.chars() {
        match c {
            '\\' | '|' | '"' => {
                out.push('\\');
                out.push(c);
            }
            '\n' | '\r' => out.push(' '),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

fn unescape(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
                continue;
            }
        }
        out.push(c);
    }
    out
}
