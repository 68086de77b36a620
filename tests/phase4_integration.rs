//! Phase 4 tests: CLI integration and end-to-end flows.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::{tempdir, TempDir};

use category_rollup::cli::commands::{
    cmd_init_config, cmd_relabel, cmd_rollup, cmd_stats, cmd_validate, load_observations,
    load_taxonomy, PipelinePaths,
};
use category_rollup::config::RollupConfig;
use category_rollup::format::LabeledReader;
use category_rollup::types::{RollupError, TaxonomyDefect};

// ==================== Fixtures ====================

/// cat00000 -> abcat01 -> {abcat0101, abcat0102}; cat00000 -> abcat02
const TAXONOMY_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<categories>
  <category>
    <id>abcat01</id><name>TV &amp; Home Theater</name>
    <path>
      <category><id>cat00000</id><name>Best Buy</name></category>
      <category><id>abcat01</id><name>TV &amp; Home Theater</name></category>
    </path>
  </category>
  <category>
    <id>abcat0101</id><name>LCD TVs</name>
    <path>
      <category><id>cat00000</id><name>Best Buy</name></category>
      <category><id>abcat01</id><name>TV &amp; Home Theater</name></category>
      <category><id>abcat0101</id><name>LCD TVs</name></category>
    </path>
  </category>
  <category>
    <id>abcat0102</id><name>Plasma TVs</name>
    <path>
      <category><id>cat00000</id><name>Best Buy</name></category>
      <category><id>abcat01</id><name>TV &amp; Home Theater</name></category>
      <category><id>abcat0102</id><name>Plasma TVs</name></category>
    </path>
  </category>
  <category>
    <id>abcat02</id><name>Gift Ideas</name>
    <path>
      <category><id>cat00000</id><name>Best Buy</name></category>
      <category><id>abcat02</id><name>Gift Ideas</name></category>
    </path>
  </category>
</categories>
"#;

const DANGLING_XML: &str = r#"<categories>
  <category>
    <id>abcat9</id>
    <path>
      <category><id>ghost</id></category>
      <category><id>abcat9</id></category>
    </path>
  </category>
</categories>
"#;

const QUERY_LOG: &str = "\
user,sku,category,query,click_time
u1,1,abcat0101,LCD TV,2011-09-01
u2,2,abcat0102,Plasma!,2011-09-01
u3,3,abcat0101,Sharp 50,2011-09-02
u4,4,abcat02,Gift Card,2011-09-02
u5,5,zzz,mystery,2011-09-03
u6,6,cat00000,anything,2011-09-03
u7,7,abcat0101,lcd  tv,2011-09-04
";

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let ws = Self {
            dir: tempdir().unwrap(),
        };
        std::fs::write(ws.path("taxonomy.xml"), TAXONOMY_XML).unwrap();
        std::fs::write(ws.path("dangling.xml"), DANGLING_XML).unwrap();
        std::fs::write(ws.path("queries.csv"), QUERY_LOG).unwrap();
        ws
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn arg(&self, name: &str) -> String {
        self.path(name).to_str().unwrap().to_string()
    }
}

fn min_support(n: usize) -> RollupConfig {
    RollupConfig {
        min_support: n,
        ..RollupConfig::default()
    }
}

fn read_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|l| l.to_string())
        .collect()
}

const EXPECTED_OUTPUT: [&str; 5] = [
    "__label__abcat0101 lcd tv",
    "__label__cat00000 plasma",
    "__label__abcat0101 sharp 50",
    "__label__cat00000 gift card",
    "__label__abcat0101 lcd tv",
];

// ==================== Library Pipeline Tests ====================

#[test]
fn test_load_pipeline_inputs() {
    let ws = Workspace::new();
    let config = RollupConfig::default();
    let taxonomy = load_taxonomy(&ws.path("taxonomy.xml"), &config).unwrap();
    assert_eq!(taxonomy.len(), 5);
    assert_eq!(taxonomy.height(), 2);
    assert_eq!(taxonomy.name_of("abcat01"), Some("TV & Home Theater"));

    let observations = load_observations(&ws.path("queries.csv"), &taxonomy, &config).unwrap();
    assert_eq!(observations.len(), 5);
    assert!(observations.iter().all(|o| taxonomy.parent_of(&o.category).is_some()));
    assert_eq!(observations.as_slice()[4].query, "lcd tv");
}

#[test]
fn test_load_without_restriction_or_normalization() {
    let ws = Workspace::new();
    let config = RollupConfig {
        restrict_to_taxonomy: false,
        normalize_queries: false,
        ..RollupConfig::default()
    };
    let taxonomy = load_taxonomy(&ws.path("taxonomy.xml"), &config).unwrap();
    let observations = load_observations(&ws.path("queries.csv"), &taxonomy, &config).unwrap();
    assert_eq!(observations.len(), 7);
    assert_eq!(observations.as_slice()[1].query, "Plasma!");
}

#[test]
fn test_load_applies_accent_stripping_and_stemming() {
    let ws = Workspace::new();
    std::fs::write(
        ws.path("accented.csv"),
        "category,query\nabcat0101,Running Cameras\nabcat0101,Café Écran\n",
    )
    .unwrap();
    let config = RollupConfig::default();
    let taxonomy = load_taxonomy(&ws.path("taxonomy.xml"), &config).unwrap();

    let stemmed = load_observations(&ws.path("accented.csv"), &taxonomy, &config).unwrap();
    assert_eq!(stemmed.as_slice()[0].query, "run camera");

    let unstemmed = RollupConfig {
        stem_queries: false,
        ..RollupConfig::default()
    };
    let plain = load_observations(&ws.path("accented.csv"), &taxonomy, &unstemmed).unwrap();
    assert_eq!(plain.as_slice()[0].query, "running cameras");
    assert_eq!(plain.as_slice()[1].query, "cafe ecran");
}

#[test]
fn test_rollup_end_to_end() {
    let ws = Workspace::new();
    let (taxonomy, queries) = (ws.path("taxonomy.xml"), ws.path("queries.csv"));
    let (output, names_csv) = (ws.path("train.txt"), ws.path("names.csv"));
    let paths = PipelinePaths {
        taxonomy: &taxonomy,
        queries: &queries,
        output: &output,
        category_names: Some(&names_csv),
    };
    cmd_rollup(&paths, &min_support(2), false).unwrap();

    assert_eq!(read_lines(&ws.path("train.txt")), EXPECTED_OUTPUT);

    let names = read_lines(&ws.path("names.csv"));
    assert_eq!(names[0], "category,category_name,label");
    assert_eq!(names.len(), 5);
    assert!(names.contains(&"abcat0101,LCD TVs,__label__abcat0101".to_string()));
}

#[test]
fn test_rollup_drop_root_rows() {
    let ws = Workspace::new();
    let (taxonomy, queries, output) = (
        ws.path("taxonomy.xml"),
        ws.path("queries.csv"),
        ws.path("train.txt"),
    );
    let paths = PipelinePaths {
        taxonomy: &taxonomy,
        queries: &queries,
        output: &output,
        category_names: None,
    };
    let config = RollupConfig {
        drop_root_rows: true,
        ..min_support(2)
    };
    cmd_rollup(&paths, &config, true).unwrap();

    let lines = read_lines(&ws.path("train.txt"));
    assert_eq!(lines.len(), 3);
    assert!(lines.iter().all(|l| l.starts_with("__label__abcat0101 ")));
}

#[test]
fn test_relabel_is_idempotent() {
    let ws = Workspace::new();
    let config = min_support(2);
    let (taxonomy, queries, output) = (
        ws.path("taxonomy.xml"),
        ws.path("queries.csv"),
        ws.path("train.txt"),
    );
    let paths = PipelinePaths {
        taxonomy: &taxonomy,
        queries: &queries,
        output: &output,
        category_names: None,
    };
    cmd_rollup(&paths, &config, false).unwrap();
    cmd_relabel(
        &ws.path("taxonomy.xml"),
        &ws.path("train.txt"),
        &ws.path("again.txt"),
        &config,
        false,
    )
    .unwrap();

    assert_eq!(read_lines(&ws.path("again.txt")), EXPECTED_OUTPUT);
}

#[test]
fn test_relabel_with_higher_threshold() {
    let ws = Workspace::new();
    std::fs::write(
        ws.path("labeled.txt"),
        "__label__abcat0101 a\n__label__abcat0102 b\n__label__abcat0102 c\n",
    )
    .unwrap();
    cmd_relabel(
        &ws.path("taxonomy.xml"),
        &ws.path("labeled.txt"),
        &ws.path("out.txt"),
        &min_support(2),
        false,
    )
    .unwrap();

    let out = LabeledReader::read_from_file(&ws.path("out.txt"), &Default::default()).unwrap();
    let categories: Vec<&str> = out.iter().map(|o| o.category.as_str()).collect();
    assert_eq!(categories, vec!["cat00000", "abcat0102", "abcat0102"]);
}

#[test]
fn test_stats_and_validate() {
    let ws = Workspace::new();
    let config = min_support(2);
    cmd_stats(&ws.path("taxonomy.xml"), &ws.path("queries.csv"), &config, 10, true).unwrap();
    cmd_stats(&ws.path("taxonomy.xml"), &ws.path("queries.csv"), &config, 1, false).unwrap();
    cmd_validate(&ws.path("taxonomy.xml"), &config, false).unwrap();
}

#[test]
fn test_validate_malformed_taxonomy() {
    let ws = Workspace::new();
    let err = cmd_validate(&ws.path("dangling.xml"), &RollupConfig::default(), false).unwrap_err();
    match err {
        RollupError::MalformedTaxonomy(TaxonomyDefect::DanglingParent { category, parent }) => {
            assert_eq!(category, "abcat9");
            assert_eq!(parent, "ghost");
        }
        other => panic!("Expected DanglingParent, got {:?}", other),
    }
}

#[test]
fn test_missing_input_is_io_error() {
    let ws = Workspace::new();
    let result = cmd_validate(&ws.path("absent.xml"), &RollupConfig::default(), false);
    assert!(matches!(result, Err(RollupError::Io(_))));
}

#[test]
fn test_init_config_writes_loadable_defaults() {
    let ws = Workspace::new();
    cmd_init_config(&ws.path("catroll.toml")).unwrap();
    let loaded = RollupConfig::load(&ws.path("catroll.toml")).unwrap();
    assert_eq!(loaded, RollupConfig::default());
}

// ==================== CLI Helpers ====================

/// Locate the `catroll` binary built alongside test binaries.
fn catroll_bin() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // Remove test binary name
    path.pop(); // Remove "deps"
    path.push("catroll");
    path
}

/// Run the `catroll` CLI with the given arguments and return the output.
fn run_catroll(args: &[&str]) -> Output {
    Command::new(catroll_bin())
        .args(args)
        .output()
        .expect("Failed to run catroll")
}

/// Helper: assert that the CLI ran successfully (exit code 0).
fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "catroll failed with status {:?}\nstdout: {}\nstderr: {}",
        output.status,
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr),
    );
}

/// Helper: get stdout as a string from an Output.
fn stdout_str(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

// ==================== CLI Tests ====================

#[test]
fn test_cli_validate() {
    let ws = Workspace::new();
    let output = run_catroll(&["validate", &ws.arg("taxonomy.xml")]);
    assert_success(&output);
    let stdout = stdout_str(&output);
    assert!(stdout.contains("Categories: 5"));
    assert!(stdout.contains("Height: 2"));
    assert!(stdout.contains("Root: cat00000"));
}

#[test]
fn test_cli_validate_malformed_exit_code() {
    let ws = Workspace::new();
    let output = run_catroll(&["validate", &ws.arg("dangling.xml")]);
    assert_eq!(output.status.code(), Some(4));
    assert!(String::from_utf8_lossy(&output.stderr).contains("undefined parent ghost"));
}

#[test]
fn test_cli_rollup_json_report() {
    let ws = Workspace::new();
    let output = run_catroll(&[
        "--format",
        "json",
        "rollup",
        "--taxonomy",
        &ws.arg("taxonomy.xml"),
        "--queries",
        &ws.arg("queries.csv"),
        "--output",
        &ws.arg("train.txt"),
        "--min-queries",
        "2",
    ]);
    assert_success(&output);

    let summary: serde_json::Value = serde_json::from_str(&stdout_str(&output)).unwrap();
    assert_eq!(summary["written"], 5);
    assert_eq!(summary["report"]["passes"], 2);
    assert_eq!(summary["report"]["input_rows"], 5);
    assert_eq!(summary["report"]["categories_after"], 2);
    assert_eq!(read_lines(&ws.path("train.txt")), EXPECTED_OUTPUT);
}

#[test]
fn test_cli_config_file_and_override() {
    let ws = Workspace::new();
    std::fs::write(
        ws.path("catroll.toml"),
        "min_support = 99\ndrop_root_rows = true\n",
    )
    .unwrap();
    let output = run_catroll(&[
        "--config",
        &ws.arg("catroll.toml"),
        "rollup",
        "--taxonomy",
        &ws.arg("taxonomy.xml"),
        "--queries",
        &ws.arg("queries.csv"),
        "--output",
        &ws.arg("train.txt"),
        "--min-queries",
        "2",
    ]);
    assert_success(&output);
    assert_eq!(read_lines(&ws.path("train.txt")).len(), 3);
}

#[test]
fn test_cli_strict_rejects_unknown_category() {
    let ws = Workspace::new();
    let output = run_catroll(&[
        "rollup",
        "--taxonomy",
        &ws.arg("taxonomy.xml"),
        "--queries",
        &ws.arg("queries.csv"),
        "--output",
        &ws.arg("train.txt"),
        "--strict",
    ]);
    assert_eq!(output.status.code(), Some(4));
    assert!(String::from_utf8_lossy(&output.stderr).contains("zzz"));
}

#[test]
fn test_cli_missing_column_exit_code() {
    let ws = Workspace::new();
    std::fs::write(ws.path("bad.csv"), "category,search\nabcat0101,tv\n").unwrap();
    let output = run_catroll(&[
        "rollup",
        "--taxonomy",
        &ws.arg("taxonomy.xml"),
        "--queries",
        &ws.arg("bad.csv"),
        "--output",
        &ws.arg("train.txt"),
    ]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_cli_invalid_config_exit_code() {
    let ws = Workspace::new();
    std::fs::write(ws.path("bad.toml"), "min_support = [").unwrap();
    let output = run_catroll(&[
        "--config",
        &ws.arg("bad.toml"),
        "validate",
        &ws.arg("taxonomy.xml"),
    ]);
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn test_cli_init_config() {
    let ws = Workspace::new();
    let output = run_catroll(&["init-config", &ws.arg("new.toml")]);
    assert_success(&output);
    assert!(stdout_str(&output).contains("Created"));
    let loaded = RollupConfig::load(&ws.path("new.toml")).unwrap();
    assert_eq!(loaded.min_support, 1);
}

#[test]
fn test_cli_stats_json() {
    let ws = Workspace::new();
    let output = run_catroll(&[
        "--format",
        "json",
        "stats",
        "--taxonomy",
        &ws.arg("taxonomy.xml"),
        "--queries",
        &ws.arg("queries.csv"),
        "--min-queries",
        "2",
        "--limit",
        "2",
    ]);
    assert_success(&output);
    let stats: serde_json::Value = serde_json::from_str(&stdout_str(&output)).unwrap();
    assert_eq!(stats["rows"], 5);
    assert_eq!(stats["categories"], 3);
    assert_eq!(stats["below_min_support"], 2);
    assert_eq!(stats["weakest"].as_array().unwrap().len(), 2);
}
