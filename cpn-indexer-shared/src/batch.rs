//! Batch of documents submitted as one bulk request.

use crate::document::Document;

/// Ordered documents bounded by the configured batch size.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Batch {
    documents: Vec<Document>,
}

impl Batch {
    pub fn new(documents: Vec<Document>) -> Self {
        Self { documents }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Document ids in batch order.
    pub fn ids(&self) -> Vec<&str> {
        self.documents.iter().map(|d| d.id.as_str()).collect()
    }
}
