//! # CPN Indexer Pipeline
//!
//! This crate provides the pipeline that loads content records into the
//! search index, one page and one batch at a time.
//!
//! ## Architecture
//!
//! The pipeline follows the Fetcher-Transformer-Batcher-Submitter pattern:
//!
//! 1. **Fetcher**: Retrieves one page of records (Strapi API or local files)
//! 2. **Transformer**: Turns records into search documents
//! 3. **Batcher**: Groups documents into fixed-size batches
//! 4. **Submitter**: Writes each batch with one bulk request
//! 5. **Orchestrator**: Walks every locale page by page, strictly in sequence
//!
//! Every error is fatal: the first failure aborts the whole run and is
//! returned to the caller.

pub mod batcher;
pub mod errors;
pub mod fetcher;
pub mod lifecycle;
pub mod orchestrator;
pub mod runs;
pub mod submitter;
pub mod transformer;

pub use errors::PipelineError;
pub use orchestrator::{Orchestrator, Partition, RunPlan};
pub use runs::{run_local_files, run_remote, LocalFilesRun, RemoteRun};
