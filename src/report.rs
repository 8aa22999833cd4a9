use crate::config::CoverageConfig;
use crate::coverage::{Coverage, SuiteMetadata};
use crate::error::CoverageResult;
use crate::query::BuildQuery;
use crate::types::TestSuite;
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Alignment marker for every column (centered).
pub const ALIGN_CENTER: &str = ":-:";

/// Location of the generated document inside the build directory.
pub fn output_path(build_dir: &Path) -> PathBuf {
    build_dir.join("doc").join("tf_e2e_coverage.md")
}

/// Markdown link from a test name to its source file in the repository.
pub fn name_element(suite: &TestSuite, name: &str, main_url: &str) -> String {
    let file = suite.single_source.as_deref().unwrap_or(name);
    let mut url = main_url.trim_end_matches('/').to_string();
    let dir = suite.source_dir();
    if !dir.is_empty() {
        url.push('/');
        url.push_str(dir);
    }
    format!("[{name}]({url}/{file}.py)")
}

/// Header, alignment row, then one row per non-excluded test name.
pub fn table_rows(
    suite: &TestSuite,
    coverage: &Coverage,
    config: &CoverageConfig,
) -> Vec<Vec<String>> {
    let header: Vec<String> = std::iter::once("target")
        .chain(config.registry.titles())
        .map(str::to_string)
        .collect();
    let align = vec![ALIGN_CENTER.to_string(); header.len()];

    let mut rows = vec![header, align];
    for (name, flags) in coverage.iter() {
        if config.exclusions.is_excluded(name) {
            debug!("excluding {name} from {}", suite.target);
            continue;
        }
        let mut row = Vec::with_capacity(flags.len() + 1);
        row.push(name_element(suite, name, &config.main_url));
        row.extend(flags.iter().map(|&passed| {
            if passed {
                config.success_element.clone()
            } else {
                config.failure_element.clone()
            }
        }));
        rows.push(row);
    }
    rows
}

/// Pipe-delimited Markdown table, no trailing newline.
pub fn markdown_table(rows: &[Vec<String>]) -> String {
    rows.iter()
        .map(|row| format!("| {} |", row.join(" | ")))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_table(suite: &TestSuite, coverage: &Coverage, config: &CoverageConfig) -> String {
    markdown_table(&table_rows(suite, coverage, config))
}

#[derive(Debug, Clone)]
pub struct SuiteReport {
    pub target: String,
    pub header: String,
    /// Data rows in the table
    pub rows: usize,
    pub excluded: usize,
    /// (name, backend) pairs listed under the `_failing` suite
    pub failing: usize,
    pub table: String,
}

#[derive(Debug, Clone)]
pub struct Report {
    pub suites: Vec<SuiteReport>,
    pub document: String,
}

impl Report {
    pub fn total_rows(&self) -> usize {
        self.suites.iter().map(|s| s.rows).sum()
    }
}

pub fn render_suite<Q: BuildQuery + ?Sized>(
    query: &Q,
    suite: &TestSuite,
    config: &CoverageConfig,
) -> CoverageResult<SuiteReport> {
    let meta = SuiteMetadata::collect(query, suite, config)?;
    let coverage = Coverage::from_passing(&config.registry, &meta.passing)?;
    let rows = table_rows(suite, &coverage, config);
    let data_rows = rows.len() - 2;
    Ok(SuiteReport {
        target: suite.target.clone(),
        header: suite.header.clone(),
        rows: data_rows,
        excluded: coverage.len() - data_rows,
        failing: meta.failing.len(),
        table: markdown_table(&rows),
    })
}

/// Preamble followed by one `##` section per suite, ending in a single newline.
pub fn render_document(description: &str, suites: &[SuiteReport]) -> String {
    let mut doc = description.trim_end().to_string();
    for s in suites {
        doc.push_str(&format!("\n\n## {}\n\n{}", s.header, s.table));
    }
    doc.push('\n');
    doc
}

/// Renders every configured suite in order. Nothing is written here.
pub fn generate_report<Q: BuildQuery + ?Sized>(
    query: &Q,
    config: &CoverageConfig,
) -> CoverageResult<Report> {
    let mut suites = Vec::with_capacity(config.suites.len());
    for suite in &config.suites {
        info!("collecting {}", suite.target);
        let report = render_suite(query, suite, config)?;
        info!(
            "{}: {} rows, {} excluded, {} failing pairs",
            report.target, report.rows, report.excluded, report.failing
        );
        suites.push(report);
    }
    let document = render_document(&config.description, &suites);
    Ok(Report { suites, document })
}

/// Writes the document to `<build_dir>/doc/tf_e2e_coverage.md`, replacing any old copy.
pub fn write_report(build_dir: &Path, report: &Report) -> CoverageResult<PathBuf> {
    let path = output_path(build_dir);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, &report.document)?;
    info!("wrote {}", path.display());
    Ok(path)
}

pub fn render_summary(report: &Report, path: &Path) -> String {
    let mut out = format!(
        "{} {} ({} suites, {} tests)\n",
        "Wrote".green().bold(),
        path.display(),
        report.suites.len(),
        report.total_rows()
    );
    for s in &report.suites {
        out.push_str(&format!("  {} {}", s.header.bold(), s.rows));
        if s.excluded > 0 {
            out.push_str(&format!(", {} excluded", s.excluded.to_string().yellow()));
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TargetRecord;

    fn rec(name: &str, backend: &str) -> TargetRecord {
        TargetRecord {
            name: name.into(),
            backend: backend.into(),
        }
    }

    #[test]
    fn link_uses_suite_directory() {
        let suite = TestSuite::new("//integrations/tensorflow/e2e:e2e_tests", "E2E");
        assert_eq!(
            name_element(&suite, "add", "https://github.com/google/iree/tree/main"),
            "[add](https://github.com/google/iree/tree/main/integrations/tensorflow/e2e/add.py)"
        );
    }

    #[test]
    fn link_uses_shared_source() {
        let suite = TestSuite::new(
            "//integrations/tensorflow/e2e/keras:imagenet_external_tests",
            "Vision",
        )
        .with_single_source("vision_model_test");
        for name in ["resnet50", "inception_v3"] {
            assert_eq!(
                name_element(&suite, name, "https://github.com/google/iree/tree/main/"),
                format!(
                    "[{name}](https://github.com/google/iree/tree/main/integrations/tensorflow/e2e/keras/vision_model_test.py)"
                )
            );
        }
    }

    #[test]
    fn link_for_root_package() {
        let suite = TestSuite::new("//:smoke_tests", "Smoke");
        assert_eq!(name_element(&suite, "ping", "https://x"), "[ping](https://x/ping.py)");
    }

    #[test]
    fn table_shape() {
        let mut config = CoverageConfig::builtin().unwrap();
        config.exclusions = crate::config::ExclusionFilters::new(&["mobilenet_v2_.*"]).unwrap();
        let suite = TestSuite::new("//e2e:e2e_tests", "E2E");
        let coverage = Coverage::from_passing(
            &config.registry,
            &[
                rec("add", "tf"),
                rec("mobilenet_v2_small", "tflite"),
                rec("conv2d", "iree_vulkan"),
            ],
        )
        .unwrap();
        let rows = table_rows(&suite, &coverage, &config);
        assert_eq!(rows.len(), 2 + 2);
        assert!(rows.iter().all(|r| r.len() == config.registry.len() + 1));
        assert_eq!(rows[0][0], "target");
        assert!(rows[1].iter().all(|c| c == ALIGN_CENTER));
        assert!(rows[2][0].starts_with("[add]"));
        assert!(rows[3][0].starts_with("[conv2d]"));
        // excluded from the table, not from the mapping
        assert!(coverage.get("mobilenet_v2_small").is_some());
    }

    #[test]
    fn markdown_rows_are_pipe_delimited() {
        let rows = vec![
            vec!["target".to_string(), "tensorflow".to_string()],
            vec![ALIGN_CENTER.to_string(), ALIGN_CENTER.to_string()],
        ];
        assert_eq!(
            markdown_table(&rows),
            "| target | tensorflow |\n| :-: | :-: |"
        );
    }

    #[test]
    fn document_ends_with_one_newline() {
        let suites = vec![SuiteReport {
            target: "//e2e:e2e_tests".into(),
            header: "End to end TensorFlow tests".into(),
            rows: 0,
            excluded: 0,
            failing: 0,
            table: "| target |\n| :-: |".into(),
        }];
        let doc = render_document("# Title\nIntro.\n\n", &suites);
        assert_eq!(
            doc,
            "# Title\nIntro.\n\n## End to end TensorFlow tests\n\n| target |\n| :-: |\n"
        );
        assert_eq!(render_document("# Title\n", &[]), "# Title\n");
    }

    #[test]
    fn summary_mentions_path_and_counts() {
        colored::control::set_override(false);
        let report = Report {
            suites: vec![SuiteReport {
                target: "//e2e:e2e_tests".into(),
                header: "End to end TensorFlow tests".into(),
                rows: 12,
                excluded: 2,
                failing: 3,
                table: String::new(),
            }],
            document: String::new(),
        };
        let text = render_summary(&report, Path::new("build/doc/tf_e2e_coverage.md"));
        assert!(text.starts_with("Wrote build/doc/tf_e2e_coverage.md (1 suites, 12 tests)\n"));
        assert!(text.contains("End to end TensorFlow tests 12, 2 excluded"));
    }
}
