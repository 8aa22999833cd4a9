use anyhow::{Context, Result};
use clap::Parser;
use e2e_coverage::config::CoverageConfig;
use e2e_coverage::query::BazelQuery;
use e2e_coverage::report::{generate_report, render_summary, write_report};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Generates Markdown files for the TensorFlow e2e backend coverage table"
)]
struct Cli {
    /// Base build directory.
    #[arg(value_name = "BUILD_PATH", value_parser = existing_dir)]
    build_dir: PathBuf,
}

fn existing_dir(arg: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(arg);
    if path.is_dir() {
        Ok(path)
    } else {
        Err("expected path to a directory".to_string())
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Warnings only unless RUST_LOG says otherwise
    let filter =
        std::env::var("RUST_LOG").unwrap_or_else(|_| "e2e_coverage=warn".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config =
        CoverageConfig::builtin().context("failed to load the built-in coverage configuration")?;
    info!(
        "{} suites, {} backends",
        config.suites.len(),
        config.registry.len()
    );

    let query = BazelQuery::default();
    query.validate()?;

    let report = generate_report(&query, &config).context("failed to build the coverage tables")?;
    let path = write_report(&cli.build_dir, &report).with_context(|| {
        format!(
            "failed to write the coverage report under {}",
            cli.build_dir.display()
        )
    })?;

    print!("{}", render_summary(&report, &path));
    Ok(())
}
