use crate::error::{CoverageError, CoverageResult};
use std::process::{Command, Stdio};
use tracing::debug;

/// Flags that keep bazel's progress chatter out of the query output.
pub const QUERY_FLAGS: [&str; 3] = [
    "--ui_event_filters=-DEBUG",
    "--noshow_loading_progress",
    "--noshow_progress",
];

/// Source of concrete test target names for a build-target pattern.
pub trait BuildQuery {
    /// Targets currently matching `pattern`, in the order the build tool lists them.
    fn test_targets(&self, pattern: &str) -> CoverageResult<Vec<String>>;
}

/// Queries the build graph by running `bazel query` in the current directory.
#[derive(Debug, Clone)]
pub struct BazelQuery {
    pub bazel_cmd: String,
}

impl Default for BazelQuery {
    fn default() -> Self {
        Self {
            bazel_cmd: "bazel".to_string(),
        }
    }
}

impl BazelQuery {
    pub fn new(bazel_cmd: impl Into<String>) -> Self {
        Self {
            bazel_cmd: bazel_cmd.into(),
        }
    }

    fn command_line(&self, expression: &str) -> String {
        format!("{} query {} {}", self.bazel_cmd, QUERY_FLAGS.join(" "), expression)
    }

    fn run_query(&self, expression: &str) -> CoverageResult<Vec<String>> {
        let command = self.command_line(expression);
        debug!("running `{command}`");

        let out = Command::new(&self.bazel_cmd)
            .arg("query")
            .args(QUERY_FLAGS)
            .arg(expression)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| CoverageError::Query {
                command: command.clone(),
                message: format!("could not start '{}': {e}", self.bazel_cmd),
            })?;

        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr);
            return Err(CoverageError::Query {
                command,
                message: format!("exited with {}\nStderr: {}", out.status, stderr.trim_end()),
            });
        }

        let stdout = String::from_utf8(out.stdout).map_err(|e| CoverageError::Query {
            command: command.clone(),
            message: format!("output is not UTF-8: {e}"),
        })?;
        Ok(stdout
            .lines()
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Checks that the bazel binary can be found before any query runs.
    pub fn validate(&self) -> CoverageResult<()> {
        match which::which(&self.bazel_cmd) {
            Ok(path) => {
                debug!("using {}", path.display());
                Ok(())
            }
            Err(e) => Err(CoverageError::Query {
                command: self.bazel_cmd.clone(),
                message: format!(
                    "not found or not executable ({e}). Check that it is installed and in PATH."
                ),
            }),
        }
    }
}

impl BuildQuery for BazelQuery {
    fn test_targets(&self, pattern: &str) -> CoverageResult<Vec<String>> {
        // A failed query exits with the same code as a broken configuration, so
        // check that the suite exists before asking for its tests.
        let package = pattern.split_once(':').map_or(pattern, |(dir, _)| dir);
        let declared = self.run_query(&format!("{package}/..."))?;
        if !declared.iter().any(|t| t == pattern) {
            debug!("{pattern} is not declared; treating it as empty");
            return Ok(Vec::new());
        }
        self.run_query(&format!("tests({pattern})"))
    }
}
