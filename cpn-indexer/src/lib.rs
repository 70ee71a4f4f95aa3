//! # CPN Indexer
//!
//! Main library for the CPN search indexer.
//!
//! This crate provides the command line, configuration and wiring for
//! running the indexing pipeline.

pub mod cli;
pub mod config;
pub mod logging;

pub use cli::Cli;
pub use config::{Dependencies, RunConfig, RunMode};

use thiserror::Error;
use tracing::info;

use cpn_indexer_pipeline::{run_local_files, run_remote};
use cpn_indexer_shared::RunSummary;

/// Errors that can occur during indexer initialization or execution.
#[derive(Error, Debug)]
pub enum IndexingError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    PipelineError(#[from] cpn_indexer_pipeline::PipelineError),

    /// Search error.
    #[error("Search error: {0}")]
    SearchError(#[from] cpn_indexer_repository::SearchError),
}

impl IndexingError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}

/// Line printed when a run succeeds.
pub fn completion_message(summary: &RunSummary) -> String {
    format!(
        "{} new files successfully imported to index {}",
        summary.uploaded_count,
        summary.indices().join(", ")
    )
}

/// Resolve the configuration, build the client and run the selected mode.
///
/// The process exit status is decided by the caller.
pub async fn run(cli: Cli) -> Result<RunSummary, IndexingError> {
    let config = RunConfig::from_cli(&cli)?;
    let dependencies = Dependencies::new(&config.connection)?;

    let summary = match &config.mode {
        RunMode::LocalFiles(run) => run_local_files(dependencies.client, run).await?,
        RunMode::Remote(run) => run_remote(dependencies.client, run).await?,
    };

    info!(
        run_id = %summary.run_id,
        uploaded = summary.uploaded_count,
        submissions = summary.submissions(),
        "Run finished"
    );
    Ok(summary)
}
