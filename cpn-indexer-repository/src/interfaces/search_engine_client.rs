//! Search engine client trait definition.
//!
//! This module defines the abstract interface for the store operations the
//! indexing pipeline needs, allowing for different backend implementations
//! (OpenSearch, Elasticsearch, in-memory test doubles).

use async_trait::async_trait;

use crate::errors::SearchError;
use cpn_indexer_shared::{Batch, BulkResponse, IndexTarget, WriteMode};

/// Abstract interface for store operations.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` so a client can be shared
/// behind an `Arc`.
///
/// # Error Handling
///
/// All methods return `Result<T, SearchError>`. An `Err` always means the
/// request as a whole failed; per-item outcomes of a bulk request are
/// reported inside the `BulkResponse`.
#[async_trait]
pub trait SearchEngineClient: Send + Sync {
    /// Write a batch of documents in a single bulk request.
    ///
    /// Every document becomes one bulk item keyed by its id, using the
    /// action selected by `mode`.
    ///
    /// # Arguments
    ///
    /// * `target` - The index to write into
    /// * `batch` - The documents to write, in order
    /// * `mode` - `Create` or `Overwrite` semantics for each item
    ///
    /// # Returns
    ///
    /// * `Ok(BulkResponse)` - The raw store response, including item-level failures
    /// * `Err(SearchError)` - If the request failed or was rejected
    async fn bulk(
        &self,
        target: &IndexTarget,
        batch: &Batch,
        mode: WriteMode,
    ) -> Result<BulkResponse, SearchError>;

    /// Delete every index matching `pattern`.
    ///
    /// The pattern is either an exact index name or a `prefix*` wildcard.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the indices were deleted or did not exist
    /// * `Err(SearchError)` - For any other failure
    async fn delete_indices(&self, pattern: &str) -> Result<(), SearchError>;
}
