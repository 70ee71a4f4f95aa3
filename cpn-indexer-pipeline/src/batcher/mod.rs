//! Batcher module for the indexer pipeline.
//!
//! Groups documents into batches of at most `post_count` documents.

use std::mem;

use tracing::debug;

use crate::errors::PipelineError;
use cpn_indexer_shared::{Batch, Document};

/// Default number of documents per bulk request.
pub const DEFAULT_POST_COUNT: usize = 5;

/// Accumulates documents in arrival order and emits full batches.
///
/// The caller must call [`Batcher::flush`] once input is exhausted to get
/// the final, possibly smaller, batch.
#[derive(Debug)]
pub struct Batcher {
    post_count: usize,
    pending_docs: Vec<Document>,
}

impl Batcher {
    /// Create a batcher emitting batches of `post_count` documents.
    pub fn new(post_count: usize) -> Result<Self, PipelineError> {
        if post_count == 0 {
            return Err(PipelineError::config("post count must be at least 1"));
        }
        Ok(Self {
            post_count,
            pending_docs: Vec::with_capacity(post_count),
        })
    }

    /// Number of documents waiting for the next batch.
    pub fn pending(&self) -> usize {
        self.pending_docs.len()
    }

    /// Add a document, returning a batch when it completes one.
    pub fn accept(&mut self, document: Document) -> Option<Batch> {
        self.pending_docs.push(document);
        if self.pending_docs.len() < self.post_count {
            return None;
        }
        self.take()
    }

    /// Emit the remaining documents, if any.
    pub fn flush(&mut self) -> Option<Batch> {
        if self.pending_docs.is_empty() {
            return None;
        }
        self.take()
    }

    fn take(&mut self) -> Option<Batch> {
        let docs = mem::replace(&mut self.pending_docs, Vec::with_capacity(self.post_count));
        debug!(count = docs.len(), "Batch ready");
        Some(Batch::new(docs))
    }
}
