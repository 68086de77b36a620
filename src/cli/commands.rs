//! CLI command implementations.

use std::path::Path;

use crate::config::RollupConfig;
use crate::engine::{ranked_support, QueryNormalizer, RollupReport};
use crate::format::{
    restrict_to_taxonomy, CategoryNamesWriter, LabeledReader, LabeledWriter, QueryLogReader,
    TaxonomyXmlReader,
};
use crate::taxonomy::{path_to_root, TaxonomyIndex};
use crate::types::{ObservationSet, RollupResult};

/// Input and output locations for a full rollup run.
pub struct PipelinePaths<'a> {
    /// Taxonomy XML.
    pub taxonomy: &'a Path,
    /// CSV query log.
    pub queries: &'a Path,
    /// Labeled training file to write.
    pub output: &'a Path,
    /// Optional category name table to write.
    pub category_names: Option<&'a Path>,
}

/// Read and validate the taxonomy XML.
pub fn load_taxonomy(path: &Path, config: &RollupConfig) -> RollupResult<TaxonomyIndex> {
    let records = TaxonomyXmlReader::read_from_file(path, &config.root_category)?;
    TaxonomyIndex::from_parts(config.root_category.clone(), records)
}

/// Read a query log and prepare it for rollup according to the config.
pub fn load_observations(
    path: &Path,
    taxonomy: &TaxonomyIndex,
    config: &RollupConfig,
) -> RollupResult<ObservationSet> {
    let mut observations = QueryLogReader::read_from_file(path, &config.schema)?;
    if config.restrict_to_taxonomy {
        restrict_to_taxonomy(&mut observations, taxonomy);
    }
    if config.normalize_queries {
        QueryNormalizer::new()?
            .with_stemming(config.stem_queries)
            .normalize_all(&mut observations);
    }
    Ok(observations)
}

/// Run the whole pipeline: taxonomy, query log, rollup, labeled output.
pub fn cmd_rollup(paths: &PipelinePaths<'_>, config: &RollupConfig, json: bool) -> RollupResult<()> {
    let taxonomy = load_taxonomy(paths.taxonomy, config)?;
    if let Some(names_path) = paths.category_names {
        let rows = CategoryNamesWriter::write_to_file(&taxonomy, &config.schema, names_path)?;
        log::info!("Wrote {} category names to {}", rows, names_path.display());
    }

    let observations = load_observations(paths.queries, &taxonomy, config)?;
    let outcome = config.engine().run(&observations, &taxonomy)?;
    let written = write_labeled(&outcome.observations, &taxonomy, config, paths.output)?;

    print_report(&outcome.report, paths.output, written, json);
    Ok(())
}

/// Roll up an existing labeled file again and write the result.
pub fn cmd_relabel(
    taxonomy_path: &Path,
    input: &Path,
    output: &Path,
    config: &RollupConfig,
    json: bool,
) -> RollupResult<()> {
    let taxonomy = load_taxonomy(taxonomy_path, config)?;
    let observations = LabeledReader::read_from_file(input, &config.schema)?;
    let outcome = config.engine().run(&observations, &taxonomy)?;
    let written = write_labeled(&outcome.observations, &taxonomy, config, output)?;

    print_report(&outcome.report, output, written, json);
    Ok(())
}

/// Show per-category support before rollup, weakest first.
pub fn cmd_stats(
    taxonomy_path: &Path,
    queries: &Path,
    config: &RollupConfig,
    limit: usize,
    json: bool,
) -> RollupResult<()> {
    let taxonomy = load_taxonomy(taxonomy_path, config)?;
    let observations = load_observations(queries, &taxonomy, config)?;
    let ranked = ranked_support(observations.as_slice());
    let below = ranked
        .iter()
        .filter(|(_, n)| *n < config.min_support)
        .count();

    if json {
        let categories: Vec<serde_json::Value> = ranked
            .iter()
            .take(limit)
            .map(|(category, support)| {
                serde_json::json!({
                    "category": category,
                    "name": taxonomy.name_of(category),
                    "depth": taxonomy.depth_of(category),
                    "support": support,
                })
            })
            .collect();
        let stats = serde_json::json!({
            "rows": observations.len(),
            "categories": ranked.len(),
            "min_support": config.min_support,
            "below_min_support": below,
            "weakest": categories,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&stats).unwrap_or_default()
        );
    } else {
        println!("Rows: {}", observations.len());
        println!("Categories: {}", ranked.len());
        println!(
            "Below min_support ({}): {}",
            config.min_support, below
        );
        println!("Weakest categories:");
        for (category, support) in ranked.iter().take(limit) {
            let depth = taxonomy
                .depth_of(category)
                .map(|d| d.to_string())
                .unwrap_or_else(|| "?".to_string());
            println!(
                "  {:<24} support={:<6} depth={:<3} {}",
                category,
                support,
                depth,
                taxonomy.name_of(category).unwrap_or("")
            );
        }
    }
    Ok(())
}

/// Build the taxonomy and describe it.
pub fn cmd_validate(taxonomy_path: &Path, config: &RollupConfig, json: bool) -> RollupResult<()> {
    let taxonomy = load_taxonomy(taxonomy_path, config)?;
    let leaves = taxonomy
        .categories()
        .iter()
        .filter(|n| taxonomy.is_leaf(&n.id))
        .count();
    let deepest = taxonomy
        .categories()
        .into_iter()
        .find(|n| taxonomy.depth_of(&n.id) == Some(taxonomy.height()))
        .map(|n| path_to_root(&taxonomy, &n.id).join(" > "))
        .unwrap_or_default();

    if json {
        let info = serde_json::json!({
            "file": taxonomy_path.display().to_string(),
            "root": taxonomy.root(),
            "categories": taxonomy.len(),
            "leaves": leaves,
            "height": taxonomy.height(),
            "deepest_path": deepest,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&info).unwrap_or_default()
        );
    } else {
        println!("File: {}", taxonomy_path.display());
        println!("Root: {}", taxonomy.root());
        println!("Categories: {}", taxonomy.len());
        println!("Leaves: {}", leaves);
        println!("Height: {}", taxonomy.height());
        println!("Deepest path: {}", deepest);
    }
    Ok(())
}

/// Write the default configuration as TOML.
pub fn cmd_init_config(path: &Path) -> RollupResult<()> {
    RollupConfig::default().save(path)?;
    println!("Created {}", path.display());
    Ok(())
}

fn write_labeled(
    observations: &ObservationSet,
    taxonomy: &TaxonomyIndex,
    config: &RollupConfig,
    output: &Path,
) -> RollupResult<usize> {
    let mut writer = LabeledWriter::new(&config.schema);
    if config.drop_root_rows {
        writer = writer.excluding(taxonomy.root());
    }
    writer.write_to_file(observations, output)
}

fn print_report(report: &RollupReport, output: &Path, written: usize, json: bool) {
    if json {
        let summary = serde_json::json!({
            "output": output.display().to_string(),
            "written": written,
            "report": report,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).unwrap_or_default()
        );
    } else {
        println!("Rows in: {}", report.input_rows);
        println!("Rows out: {}", report.output_rows);
        println!(
            "Categories: {} -> {}",
            report.categories_before, report.categories_after
        );
        println!("Passes: {}", report.passes);
        if report.collapsed_duplicates > 0 {
            println!("Collapsed duplicates: {}", report.collapsed_duplicates);
        }
        if report.frozen_rows > 0 {
            println!("Rows held at parentless categories: {}", report.frozen_rows);
        }
        println!("Wrote {} lines to {}", written, output.display());
    }
}
