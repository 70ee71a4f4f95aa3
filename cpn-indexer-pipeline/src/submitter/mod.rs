//! Submitter module for the indexer pipeline.
//!
//! Writes batches into the search index, one bulk request per batch.

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::errors::PipelineError;
use cpn_indexer_repository::SearchEngineClient;
use cpn_indexer_shared::{Batch, BulkResponse, IndexTarget, WriteMode};

/// Submitter that sends batches to the search engine.
///
/// Request-level failures are returned as errors. Item-level failures are
/// left in the returned response; the submitter only logs them.
pub struct BulkSubmitter {
    client: Arc<dyn SearchEngineClient>,
    mode: WriteMode,
}

impl BulkSubmitter {
    /// Create a new submitter with the given client and write semantics.
    pub fn new(client: Arc<dyn SearchEngineClient>, mode: WriteMode) -> Self {
        Self { client, mode }
    }

    pub fn mode(&self) -> WriteMode {
        self.mode
    }

    /// Submit one batch as a single bulk request.
    #[instrument(skip(self, batch), fields(index = %target, count = batch.len()))]
    pub async fn submit(
        &self,
        batch: &Batch,
        target: &IndexTarget,
    ) -> Result<BulkResponse, PipelineError> {
        if batch.is_empty() {
            return Err(PipelineError::config("refusing to submit an empty batch"));
        }

        let response = self.client.bulk(target, batch, self.mode).await?;

        if response.errors {
            warn!(
                index = %target,
                items = response.items,
                "Bulk response reports item-level failures"
            );
        } else {
            debug!(items = response.items, "Batch submitted");
        }

        Ok(response)
    }
}
