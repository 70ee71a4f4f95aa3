//! Orchestrator module for the indexer pipeline.
//!
//! Coordinates the fetcher, transformer, batcher and submitter.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use crate::batcher::{Batcher, DEFAULT_POST_COUNT};
use crate::errors::PipelineError;
use crate::fetcher::Fetcher;
use crate::lifecycle::IndexLifecycle;
use crate::submitter::BulkSubmitter;
use crate::transformer::DocumentTransformer;
use cpn_indexer_repository::SearchEngineClient;
use cpn_indexer_shared::{
    Batch, BulkResponse, IndexTarget, LocaleSummary, ResetScope, RunSummary, WriteMode,
};

/// One locale (or one unlocalized source) and the index it is written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    pub locale: Option<String>,
    pub target: IndexTarget,
}

impl Partition {
    pub fn localized(locale: impl Into<String>, target: IndexTarget) -> Self {
        Self {
            locale: Some(locale.into()),
            target,
        }
    }

    pub fn unlocalized(target: IndexTarget) -> Self {
        Self {
            locale: None,
            target,
        }
    }

    fn label(&self) -> &str {
        self.locale.as_deref().unwrap_or("-")
    }
}

/// What a run writes, and what it deletes first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPlan {
    pub partitions: Vec<Partition>,
    pub reset: Option<ResetScope>,
}

impl RunPlan {
    /// Plan for a single unlocalized index.
    pub fn single_index(target: IndexTarget, delete_index: bool) -> Self {
        let reset = delete_index.then(|| ResetScope::Index(target.clone()));
        Self {
            partitions: vec![Partition::unlocalized(target)],
            reset,
        }
    }

    /// Plan with one index per locale under a shared prefix.
    ///
    /// Deleting resets every index matching the prefix.
    pub fn per_locale<S: AsRef<str>>(
        locales: &[S],
        prefix: &str,
        category: &str,
        delete_index: bool,
    ) -> Result<Self, PipelineError> {
        if locales.is_empty() {
            return Err(PipelineError::config("no locales specified"));
        }
        if delete_index && prefix.is_empty() {
            return Err(PipelineError::config(
                "refusing to delete indices with an empty prefix",
            ));
        }

        let partitions = locales
            .iter()
            .map(|locale| {
                let locale = locale.as_ref();
                Partition::localized(locale, IndexTarget::for_locale(prefix, category, locale))
            })
            .collect();

        Ok(Self {
            partitions,
            reset: delete_index.then(|| ResetScope::Prefix(prefix.to_string())),
        })
    }
}

/// Pipeline stage, reported when a run aborts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Resetting,
    Fetching,
    Transforming,
    Submitting,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Resetting => "resetting",
            Stage::Fetching => "fetching",
            Stage::Transforming => "transforming",
            Stage::Submitting => "submitting",
        };
        f.write_str(name)
    }
}

/// Collects results until the run completes.
struct SummaryBuilder {
    run_id: Uuid,
    started_at: DateTime<Utc>,
    responses: Vec<BulkResponse>,
    uploaded_count: usize,
    locales: Vec<LocaleSummary>,
}

impl SummaryBuilder {
    fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            started_at: Utc::now(),
            responses: Vec::new(),
            uploaded_count: 0,
            locales: Vec::new(),
        }
    }

    fn finish(self) -> RunSummary {
        RunSummary {
            run_id: self.run_id,
            started_at: self.started_at,
            finished_at: Utc::now(),
            responses: self.responses,
            uploaded_count: self.uploaded_count,
            locales: self.locales,
        }
    }
}

/// Orchestrator that drives every partition of a run through the pipeline.
///
/// Execution is strictly sequential: a page is fetched, transformed and
/// batched, and full batches are submitted, before the next page is fetched.
/// The first error aborts the whole run; there is no per-locale isolation.
pub struct Orchestrator<F: Fetcher> {
    fetcher: F,
    transformer: DocumentTransformer,
    submitter: BulkSubmitter,
    lifecycle: IndexLifecycle,
    post_count: usize,
}

impl<F: Fetcher> Orchestrator<F> {
    /// Create a new orchestrator with the default post count.
    pub fn new(
        fetcher: F,
        transformer: DocumentTransformer,
        client: Arc<dyn SearchEngineClient>,
        mode: WriteMode,
    ) -> Self {
        Self {
            fetcher,
            transformer,
            submitter: BulkSubmitter::new(client.clone(), mode),
            lifecycle: IndexLifecycle::new(client),
            post_count: DEFAULT_POST_COUNT,
        }
    }

    /// Set the number of documents per bulk request.
    pub fn with_post_count(mut self, post_count: usize) -> Self {
        self.post_count = post_count;
        self
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Run the plan to completion.
    ///
    /// # Returns
    ///
    /// * `Ok(RunSummary)` - Every partition was drained and submitted
    /// * `Err(PipelineError)` - The first fatal error; batches already
    ///   submitted stay in the index
    #[instrument(skip(self, plan), fields(run_id, partitions = plan.partitions.len()))]
    pub async fn run(&self, plan: &RunPlan) -> Result<RunSummary, PipelineError> {
        if plan.partitions.is_empty() {
            return Err(PipelineError::config("nothing to index"));
        }
        // Validates the post count before any I/O.
        Batcher::new(self.post_count)?;

        let run_id = Uuid::new_v4();
        tracing::Span::current().record("run_id", tracing::field::display(run_id));
        info!(post_count = self.post_count, mode = ?self.submitter.mode(), "Starting indexing run");

        if let Some(scope) = &plan.reset {
            self.lifecycle.delete(scope).await.inspect_err(|e| {
                error!(stage = %Stage::Resetting, pattern = %scope.pattern(), error = %e, "Run aborted");
            })?;
        }

        let mut summary = SummaryBuilder::new(run_id);
        for partition in &plan.partitions {
            let locale_summary = self.run_partition(partition, &mut summary).await?;
            info!(
                locale = %locale_summary.locale,
                index = %locale_summary.index,
                pages = locale_summary.pages,
                documents = locale_summary.documents,
                submissions = locale_summary.submissions,
                "Partition complete"
            );
            summary.locales.push(locale_summary);
        }

        let summary = summary.finish();
        info!(
            uploaded = summary.uploaded_count,
            submissions = summary.submissions(),
            item_errors = summary.has_item_errors(),
            "Indexing run complete"
        );
        Ok(summary)
    }

    /// Drain one partition page by page.
    async fn run_partition(
        &self,
        partition: &Partition,
        summary: &mut SummaryBuilder,
    ) -> Result<LocaleSummary, PipelineError> {
        let locale = partition.locale.as_deref();
        // `pending` counts documents accepted but never submitted.
        let abort = |stage: Stage, page: u32, pending: usize, e: &PipelineError| {
            error!(
                stage = %stage,
                locale = partition.label(),
                index = %partition.target,
                page = page,
                pending = pending,
                error = %e,
                "Run aborted"
            );
        };

        let mut batcher = Batcher::new(self.post_count)?;
        let mut stats = LocaleSummary {
            locale: partition.label().to_string(),
            index: partition.target.name().to_string(),
            pages: 0,
            documents: 0,
            submissions: 0,
        };

        let mut page_number: u32 = 1;
        loop {
            let page = self
                .fetcher
                .fetch(locale, page_number)
                .await
                .inspect_err(|e| abort(Stage::Fetching, page_number, batcher.pending(), e))?;

            if page.is_unexpectedly_empty() {
                let e = PipelineError::anomaly(format!(
                    "page {} of {} for locale {} is empty but more records were expected (total {})",
                    page_number,
                    page.page_count,
                    partition.label(),
                    page.total
                ));
                abort(Stage::Fetching, page_number, batcher.pending(), &e);
                return Err(e);
            }
            stats.pages += 1;
            debug!(
                locale = partition.label(),
                page = page_number,
                page_count = page.page_count,
                records = page.records.len(),
                "Processing page"
            );

            for record in &page.records {
                let document = self
                    .transformer
                    .transform(record, locale)
                    .inspect_err(|e| abort(Stage::Transforming, page_number, batcher.pending(), e))?;
                stats.documents += 1;

                if let Some(batch) = batcher.accept(document) {
                    self.submit(&batch, partition, summary, &mut stats)
                        .await
                        .inspect_err(|e| abort(Stage::Submitting, page_number, batcher.pending() + batch.len(), e))?;
                }
            }

            if page_number >= page.page_count {
                break;
            }
            page_number += 1;
        }

        if let Some(batch) = batcher.flush() {
            self.submit(&batch, partition, summary, &mut stats)
                .await
                .inspect_err(|e| abort(Stage::Submitting, page_number, batcher.pending() + batch.len(), e))?;
        }

        Ok(stats)
    }

    async fn submit(
        &self,
        batch: &Batch,
        partition: &Partition,
        summary: &mut SummaryBuilder,
        stats: &mut LocaleSummary,
    ) -> Result<(), PipelineError> {
        let response = self.submitter.submit(batch, &partition.target).await?;
        summary.responses.push(response);
        summary.uploaded_count += batch.len();
        stats.submissions += 1;
        Ok(())
    }
}
