//! Bulk request body construction.

use serde_json::{json, Value};

use crate::errors::SearchError;
use cpn_indexer_shared::{Batch, WriteMode};

/// Build the newline-delimited bulk body for a batch.
///
/// Each document contributes an action line keyed by its id followed by its
/// source line. The target index is carried by the request path, not by the
/// action lines.
pub fn build_bulk_body(batch: &Batch, mode: WriteMode) -> Result<Vec<Value>, SearchError> {
    let mut body = Vec::with_capacity(batch.len() * 2);

    for doc in batch.documents() {
        body.push(json!({ mode.action(): { "_id": doc.id } }));
        body.push(doc.to_source()?);
    }

    Ok(body)
}
