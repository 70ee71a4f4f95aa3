//! Entry points, one per run mode.
//!
//! Both modes build the same orchestrator and differ only in the fetcher,
//! the index naming and the write semantics.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, instrument};

use crate::errors::PipelineError;
use crate::fetcher::{LocalFileFetcher, StrapiConfig, StrapiFetcher};
use crate::orchestrator::{Orchestrator, RunPlan};
use crate::transformer::DocumentTransformer;
use cpn_indexer_repository::SearchEngineClient;
use cpn_indexer_shared::{IndexTarget, RunSummary, WriteMode};

/// Parameters of a local-file run.
#[derive(Debug, Clone)]
pub struct LocalFilesRun {
    /// Directory holding the `.fjson` files.
    pub path: PathBuf,
    /// File names relative to `path`, without extension; discovered when `None`.
    pub files: Option<Vec<String>>,
    pub index: String,
    pub delete_index: bool,
    pub post_count: usize,
    pub base_url: String,
    pub doc_url: String,
    pub category: String,
}

/// Parameters of a remote-paginated run.
#[derive(Debug, Clone)]
pub struct RemoteRun {
    pub strapi: StrapiConfig,
    pub locales: Vec<String>,
    pub index_prefix: String,
    pub delete_index: bool,
    pub post_count: usize,
    pub base_url: String,
    pub doc_url: String,
    pub category: String,
}

/// Index pre-rendered local files into one index, overwriting by file name.
#[instrument(skip(client, run), fields(path = %run.path.display(), index = %run.index))]
pub async fn run_local_files(
    client: Arc<dyn SearchEngineClient>,
    run: &LocalFilesRun,
) -> Result<RunSummary, PipelineError> {
    if run.index.is_empty() {
        return Err(PipelineError::config("index name is empty"));
    }

    let fetcher = match &run.files {
        Some(files) => LocalFileFetcher::new(&run.path, files.clone()),
        None => LocalFileFetcher::discover(&run.path).await?,
    };
    info!(files = fetcher.files().len(), "Indexing local files");

    let plan = RunPlan::single_index(IndexTarget::named(&run.index), run.delete_index);
    let transformer = DocumentTransformer::new(&run.base_url, &run.doc_url, &run.category);

    Orchestrator::new(fetcher, transformer, client, WriteMode::Overwrite)
        .with_post_count(run.post_count)
        .run(&plan)
        .await
}

/// Walk the content source for every locale into per-locale indices.
#[instrument(skip(client, run), fields(locales = ?run.locales, prefix = %run.index_prefix))]
pub async fn run_remote(
    client: Arc<dyn SearchEngineClient>,
    run: &RemoteRun,
) -> Result<RunSummary, PipelineError> {
    let plan = RunPlan::per_locale(
        &run.locales,
        &run.index_prefix,
        &run.category,
        run.delete_index,
    )?;
    let fetcher = StrapiFetcher::new(run.strapi.clone())?;
    let transformer = DocumentTransformer::new(&run.base_url, &run.doc_url, &run.category);

    Orchestrator::new(fetcher, transformer, client, WriteMode::Create)
        .with_post_count(run.post_count)
        .run(&plan)
        .await
}
