//! # CPN Indexer Shared
//!
//! Types shared between the pipeline, the store repository and the binary:
//! upstream records and pages, the documents written to the index, batches,
//! index targets and the run summary returned to callers.

mod batch;
mod document;
mod page;
mod record;
mod summary;
mod target;

pub use batch::Batch;
pub use document::Document;
pub use page::Page;
pub use record::{Record, RecordError, RecordId};
pub use summary::{BulkResponse, LocaleSummary, RunSummary};
pub use target::{IndexTarget, ResetScope, WriteMode};
