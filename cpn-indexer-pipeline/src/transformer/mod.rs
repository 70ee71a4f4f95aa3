//! Transformer module for the indexer pipeline.
//!
//! Turns upstream records into search documents.

mod html;

pub use html::html_to_text;

use serde_json::Value;

use crate::errors::PipelineError;
use cpn_indexer_shared::{Document, Record};

/// Append a trailing slash to a non-empty URL that lacks one.
pub fn add_end_slash(url: &str) -> String {
    if url.is_empty() || url.ends_with('/') {
        url.to_string()
    } else {
        format!("{}/", url)
    }
}

/// Transform one record into a document.
///
/// Pure and deterministic. The record's own locale wins over the locale of
/// the sub-run. A body that is present but not a string is an error.
pub fn transform_record(
    record: &Record,
    locale: Option<&str>,
    category: &str,
    base_url: &str,
    doc_url: &str,
) -> Result<Document, PipelineError> {
    let body = match &record.body {
        None => None,
        Some(Value::String(markup)) => Some(html_to_text(markup)),
        Some(other) => {
            return Err(PipelineError::transform(format!(
                "body of record {} is not markup: {}",
                record.id, other
            )))
        }
    };

    let mut document = Document::new(record.id.to_string(), base_url, doc_url, category)
        .with_extra(record.payload.clone());
    document.locale = record.locale.clone().or_else(|| locale.map(str::to_string));
    document.body = body;

    Ok(document)
}

/// Transformer holding the constant per-run fields.
#[derive(Debug, Clone)]
pub struct DocumentTransformer {
    base_url: String,
    doc_url: String,
    category: String,
}

impl DocumentTransformer {
    /// Create a transformer. `base_url` is normalized to end with `/`.
    pub fn new(
        base_url: impl AsRef<str>,
        doc_url: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            base_url: add_end_slash(base_url.as_ref()),
            doc_url: doc_url.into(),
            category: category.into(),
        }
    }

    /// Transform a single record.
    pub fn transform(
        &self,
        record: &Record,
        locale: Option<&str>,
    ) -> Result<Document, PipelineError> {
        transform_record(record, locale, &self.category, &self.base_url, &self.doc_url)
    }
}
