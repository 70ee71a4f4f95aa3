//! Dependency initialization and wiring for the indexer.

use std::sync::Arc;
use tracing::info;

use crate::IndexingError;
use cpn_indexer_repository::{ConnectionConfig, OpenSearchClient, SearchEngineClient};

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// Store client shared by the lifecycle manager and the submitter.
    pub client: Arc<dyn SearchEngineClient>,
}

impl Dependencies {
    /// Initialize the store client from the resolved connection settings.
    ///
    /// No request is sent; connection problems surface on the first call.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(IndexingError)` - If the client cannot be built
    pub fn new(connection: &ConnectionConfig) -> Result<Self, IndexingError> {
        info!(
            hosts = ?connection.hosts.iter().map(ToString::to_string).collect::<Vec<_>>(),
            use_ssl = connection.use_ssl,
            verify_certs = connection.verify_certs,
            "Initializing dependencies"
        );

        let client = OpenSearchClient::new(connection)?;

        Ok(Self {
            client: Arc::new(client),
        })
    }
}
