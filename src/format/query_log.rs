//! Reads (category, query) observations from CSV query logs.

use std::io::Read;
use std::path::Path;

use crate::config::ColumnSchema;
use crate::taxonomy::TaxonomyIndex;
use crate::types::{ObservationSet, RollupError, RollupResult};

/// Reader for CSV query logs with a header row.
pub struct QueryLogReader;

impl QueryLogReader {
    /// Read a query log file.
    pub fn read_from_file(path: &Path, schema: &ColumnSchema) -> RollupResult<ObservationSet> {
        let file = std::fs::File::open(path)?;
        Self::read_from(std::io::BufReader::new(file), schema)
    }

    /// Read from any reader. Only the schema's category and query columns are
    /// used; other columns are ignored. Duplicate rows are kept.
    pub fn read_from(reader: impl Read, schema: &ColumnSchema) -> RollupResult<ObservationSet> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let category_idx = column_index(&headers, &schema.category_column)?;
        let query_idx = column_index(&headers, &schema.query_column)?;

        let mut observations = ObservationSet::new();
        let mut short_rows = 0usize;
        for record in csv_reader.records() {
            let record = record?;
            match (record.get(category_idx), record.get(query_idx)) {
                (Some(category), Some(query)) => {
                    observations.add(category, query);
                }
                _ => short_rows += 1,
            }
        }
        if short_rows > 0 {
            log::warn!("Skipped {} query log rows with missing columns", short_rows);
        }

        log::info!(
            "Read {} observations over {} categories",
            observations.len(),
            observations.category_count()
        );
        Ok(observations)
    }
}

fn column_index(headers: &csv::StringRecord, column: &str) -> RollupResult<usize> {
    headers
        .iter()
        .position(|h| h.trim() == column)
        .ok_or_else(|| RollupError::MissingColumn(column.to_string()))
}

/// Keep only rows whose category is a non-root taxonomy category.
///
/// Returns the number of rows removed.
pub fn restrict_to_taxonomy(observations: &mut ObservationSet, taxonomy: &TaxonomyIndex) -> usize {
    let before = observations.len();
    observations.retain(|o| taxonomy.exists(&o.category) && !taxonomy.is_root(&o.category));
    let removed = before - observations.len();
    if removed > 0 {
        log::info!("Dropped {} rows outside the taxonomy", removed);
    }
    removed
}
