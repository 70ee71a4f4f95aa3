//! # CPN Indexer Repository
//!
//! This crate provides the store interface used by the indexing pipeline and
//! a concrete implementation for OpenSearch. It includes definitions for
//! errors, connection configuration and the bulk wire format.

pub mod config;
pub mod errors;
pub mod interfaces;
pub mod opensearch;

pub use config::{ConnectionConfig, HostSpec};
pub use errors::SearchError;
pub use interfaces::SearchEngineClient;
pub use opensearch::OpenSearchClient;
