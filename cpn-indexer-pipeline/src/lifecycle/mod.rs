//! Index lifecycle management.
//!
//! Deletes indices ahead of a rebuild so stale and fresh documents never mix.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::errors::PipelineError;
use cpn_indexer_repository::SearchEngineClient;
use cpn_indexer_shared::ResetScope;

pub struct IndexLifecycle {
    client: Arc<dyn SearchEngineClient>,
}

impl IndexLifecycle {
    pub fn new(client: Arc<dyn SearchEngineClient>) -> Self {
        Self { client }
    }

    /// Delete the index, or every index matching the prefix.
    ///
    /// Missing indices are not an error.
    #[instrument(skip(self), fields(pattern = %scope.pattern()))]
    pub async fn delete(&self, scope: &ResetScope) -> Result<(), PipelineError> {
        let pattern = scope.pattern();
        self.client.delete_indices(&pattern).await?;
        info!(pattern = %pattern, "Index reset complete");
        Ok(())
    }
}
