//! `quarry` - check query documents before they reach the backend.
//!
//! ```text
//! quarry check cities.yaml --output text
//! ```
//!
//! Exit status is 0 when the query is accepted, 2 when it is rejected, and 1
//! when the document or config cannot be read.

mod config;
mod document;
mod report;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::config::{CliConfig, OutputFormat, CONFIG_ENV};
use crate::document::QueryDocument;
use crate::report::Report;

#[derive(Parser)]
#[command(name = "quarry", version)]
#[command(about = "Check document-store queries against backend admission rules", long_about = None)]
struct Cli {
    /// Path to a YAML configuration file (defaults to $QUARRY_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the query described by a YAML or JSON document and report
    /// whether the backend would accept it
    Check {
        /// Query document to check
        file: PathBuf,

        /// Output format (overrides the config file)
        #[arg(long, value_enum)]
        output: Option<OutputFormat>,
    },
}

/// Result of a command, mapped to the process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Accepted,
    Rejected,
}

impl Status {
    fn exit_code(self) -> ExitCode {
        match self {
            Status::Accepted => ExitCode::SUCCESS,
            Status::Rejected => ExitCode::from(2),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match CliConfig::resolve(cli.config.as_deref(), std::env::var_os(CONFIG_ENV)) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err:#}");
            return ExitCode::FAILURE;
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match &cli.command {
        Commands::Check { file, output } => {
            let format = output.unwrap_or(config.output);
            check(file, format).map(|(status, rendered)| {
                print!("{rendered}");
                status
            })
        }
    };

    match result {
        Ok(status) => status.exit_code(),
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Loads, builds and renders one query document.
fn check(file: &Path, format: OutputFormat) -> Result<(Status, String)> {
    let document = QueryDocument::load(file)?;
    debug!(
        path = %file.display(),
        filters = document.filters.len(),
        orderings = document.order_by.len(),
        "loaded query document"
    );

    let outcome = document.build();
    let report = Report::new(&outcome);
    let status = if report.is_accepted() {
        Status::Accepted
    } else {
        Status::Rejected
    };
    info!(path = %file.display(), ?status, "checked query document");

    Ok((status, report.render(format)?))
}
