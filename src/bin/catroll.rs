//! CLI entry point for the `catroll` command-line tool.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use category_rollup::cli::commands::{self, PipelinePaths};
use category_rollup::config::RollupConfig;
use category_rollup::engine::UnknownCategoryPolicy;
use category_rollup::RollupError;

#[derive(Parser)]
#[command(
    name = "catroll",
    about = "Roll sparse taxonomy categories up into their ancestors"
)]
struct Cli {
    /// Output format: "text" (default) or "json"
    #[arg(long, default_value = "text")]
    format: String,

    /// Enable debug logging
    #[arg(long)]
    verbose: bool,

    /// TOML config file; command-line flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a labeled training file from a taxonomy and a query log
    Rollup {
        /// Taxonomy XML file
        #[arg(long)]
        taxonomy: PathBuf,
        /// CSV query log
        #[arg(long)]
        queries: PathBuf,
        /// Labeled output file
        #[arg(long)]
        output: PathBuf,
        /// Minimum distinct queries per category label
        #[arg(long)]
        min_queries: Option<usize>,
        /// Maximum number of rollup passes
        #[arg(long)]
        max_passes: Option<usize>,
        /// Fail on categories missing from the taxonomy
        #[arg(long)]
        strict: bool,
        /// Leave rows that end at the root out of the output
        #[arg(long)]
        drop_root: bool,
        /// Keep query text as-is
        #[arg(long)]
        no_normalize: bool,
        /// Normalize queries without stemming
        #[arg(long)]
        no_stem: bool,
        /// Also write the category name table to this CSV
        #[arg(long)]
        category_names: Option<PathBuf>,
    },
    /// Roll up an existing labeled file again
    Relabel {
        /// Taxonomy XML file
        #[arg(long)]
        taxonomy: PathBuf,
        /// Labeled input file
        input: PathBuf,
        /// Labeled output file
        output: PathBuf,
        /// Minimum distinct queries per category label
        #[arg(long)]
        min_queries: Option<usize>,
        /// Fail on categories missing from the taxonomy
        #[arg(long)]
        strict: bool,
        /// Leave rows that end at the root out of the output
        #[arg(long)]
        drop_root: bool,
    },
    /// Show per-category support before rollup
    Stats {
        /// Taxonomy XML file
        #[arg(long)]
        taxonomy: PathBuf,
        /// CSV query log
        #[arg(long)]
        queries: PathBuf,
        /// Threshold used to count weak categories
        #[arg(long)]
        min_queries: Option<usize>,
        /// Number of weakest categories to list
        #[arg(long, default_value = "20")]
        limit: usize,
    },
    /// Check a taxonomy XML file and describe it
    Validate {
        /// Taxonomy XML file
        taxonomy: PathBuf,
    },
    /// Write the default configuration
    InitConfig {
        /// Path of the TOML file to create
        path: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    let json = cli.format == "json";

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let mut config = match &cli.config {
        Some(path) => match RollupConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Invalid config {}: {}", path.display(), e);
                process::exit(3);
            }
        },
        None => RollupConfig::default(),
    };

    let result = match cli.command {
        Commands::Rollup {
            taxonomy,
            queries,
            output,
            min_queries,
            max_passes,
            strict,
            drop_root,
            no_normalize,
            no_stem,
            category_names,
        } => {
            apply_overrides(&mut config, min_queries, strict, drop_root);
            if max_passes.is_some() {
                config.max_passes = max_passes;
            }
            if no_normalize {
                config.normalize_queries = false;
            }
            if no_stem {
                config.stem_queries = false;
            }
            let paths = PipelinePaths {
                taxonomy: &taxonomy,
                queries: &queries,
                output: &output,
                category_names: category_names.as_deref(),
            };
            commands::cmd_rollup(&paths, &config, json)
        }
        Commands::Relabel {
            taxonomy,
            input,
            output,
            min_queries,
            strict,
            drop_root,
        } => {
            apply_overrides(&mut config, min_queries, strict, drop_root);
            commands::cmd_relabel(&taxonomy, &input, &output, &config, json)
        }
        Commands::Stats {
            taxonomy,
            queries,
            min_queries,
            limit,
        } => {
            apply_overrides(&mut config, min_queries, false, false);
            commands::cmd_stats(&taxonomy, &queries, &config, limit, json)
        }
        Commands::Validate { taxonomy } => commands::cmd_validate(&taxonomy, &config, json),
        Commands::InitConfig { path } => commands::cmd_init_config(&path),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        let code = match &e {
            RollupError::Io(_) => 1,
            RollupError::Xml(_)
            | RollupError::Csv(_)
            | RollupError::MissingColumn(_)
            | RollupError::InvalidRecord { .. } => 2,
            RollupError::Config(_) => 3,
            RollupError::MalformedTaxonomy(_) | RollupError::MissingCategory(_) => 4,
            _ => 5,
        };
        process::exit(code);
    }
}

fn apply_overrides(
    config: &mut RollupConfig,
    min_queries: Option<usize>,
    strict: bool,
    drop_root: bool,
) {
    if let Some(min) = min_queries {
        config.min_support = min;
    }
    if strict {
        config.unknown_category = UnknownCategoryPolicy::Reject;
        config.restrict_to_taxonomy = false;
    }
    if drop_root {
        config.drop_root_rows = true;
    }
}
