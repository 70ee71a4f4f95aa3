//! OpenSearch implementation of the store client.
//!
//! This module provides a concrete implementation of `SearchEngineClient`
//! using OpenSearch as the backend.

mod bulk;
mod client;
mod pool;

pub use bulk::build_bulk_body;
pub use client::OpenSearchClient;
pub use pool::RoundRobinConnectionPool;
