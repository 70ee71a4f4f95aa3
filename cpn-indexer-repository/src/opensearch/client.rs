//! OpenSearch client implementation.
//!
//! This module provides the concrete implementation of `SearchEngineClient`
//! using the OpenSearch Rust client.

use std::fmt::Debug;

use async_trait::async_trait;
use opensearch::{
    auth::Credentials,
    cert::CertificateValidation,
    http::request::JsonBody,
    http::transport::{ConnectionPool, SingleNodeConnectionPool, Transport, TransportBuilder},
    indices::IndicesDeleteParts,
    BulkParts, OpenSearch,
};
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use crate::config::ConnectionConfig;
use crate::errors::SearchError;
use crate::interfaces::SearchEngineClient;
use crate::opensearch::bulk::build_bulk_body;
use crate::opensearch::pool::RoundRobinConnectionPool;
use cpn_indexer_shared::{Batch, BulkResponse, IndexTarget, WriteMode};

/// OpenSearch client implementation.
///
/// # Example
///
/// ```ignore
/// use cpn_indexer_repository::{ConnectionConfig, OpenSearchClient};
/// let hosts = cpn_indexer_repository::config::parse_hosts(&["localhost:9200"])?;
/// let config = ConnectionConfig::new(hosts, "admin", "admin");
/// let client = OpenSearchClient::new(&config)?;
///
/// client.delete_indices("cpn-*").await?;
/// ```
pub struct OpenSearchClient {
    client: OpenSearch,
}

impl OpenSearchClient {
    /// Create a new OpenSearch client for the configured hosts.
    ///
    /// A single host uses a single-node pool; several hosts are used
    /// round-robin. Credentials are sent as HTTP basic auth.
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchClient)` - A new client instance
    /// * `Err(SearchError)` - If the host list is invalid or transport setup fails
    pub fn new(config: &ConnectionConfig) -> Result<Self, SearchError> {
        let mut urls = config.urls()?;

        let transport = if urls.len() == 1 {
            let url = urls.remove(0);
            build_transport(SingleNodeConnectionPool::new(url), config)?
        } else {
            build_transport(RoundRobinConnectionPool::new(urls)?, config)?
        };

        info!(
            hosts = ?config.hosts.iter().map(ToString::to_string).collect::<Vec<_>>(),
            use_ssl = config.use_ssl,
            "Created OpenSearch client"
        );

        Ok(Self {
            client: OpenSearch::new(transport),
        })
    }
}

fn build_transport<P>(pool: P, config: &ConnectionConfig) -> Result<Transport, SearchError>
where
    P: ConnectionPool + Debug + Clone + Send + 'static,
{
    let cert_validation = if config.verify_certs {
        CertificateValidation::Default
    } else {
        CertificateValidation::None
    };

    TransportBuilder::new(pool)
        .auth(Credentials::Basic(
            config.username.clone(),
            config.password.clone(),
        ))
        .cert_validation(cert_validation)
        .disable_proxy()
        .build()
        .map_err(|e| SearchError::connection(e.to_string()))
}

#[async_trait]
impl SearchEngineClient for OpenSearchClient {
    #[instrument(skip(self, batch), fields(index = %target, count = batch.len(), action = mode.action()))]
    async fn bulk(
        &self,
        target: &IndexTarget,
        batch: &Batch,
        mode: WriteMode,
    ) -> Result<BulkResponse, SearchError> {
        let body: Vec<JsonBody<Value>> = build_bulk_body(batch, mode)?
            .into_iter()
            .map(JsonBody::new)
            .collect();

        let response = self
            .client
            .bulk(BulkParts::Index(target.name()))
            .body(body)
            .send()
            .await
            .map_err(|e| SearchError::connection(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Bulk request failed");
            return Err(SearchError::bulk_index(format!(
                "Bulk request failed with status {}: {}",
                status, error_body
            )));
        }

        let body = response
            .json::<Value>()
            .await
            .map_err(|e| SearchError::parse(e.to_string()))?;
        let bulk_response = BulkResponse::from_body(body);

        if bulk_response.errors {
            warn!("Bulk response reports item-level errors");
        }
        debug!(items = bulk_response.items, took = ?bulk_response.took, "Bulk request completed");

        Ok(bulk_response)
    }

    #[instrument(skip(self))]
    async fn delete_indices(&self, pattern: &str) -> Result<(), SearchError> {
        let response = self
            .client
            .indices()
            .delete(IndicesDeleteParts::Index(&[pattern]))
            .send()
            .await
            .map_err(|e| SearchError::delete(e.to_string()))?;

        let status = response.status_code();

        // 404 is acceptable - the index may not exist
        if status.as_u16() == 404 {
            debug!(pattern = %pattern, "No index to delete");
            return Ok(());
        }

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Index deletion failed");
            return Err(SearchError::delete(format!(
                "Delete failed with status {}: {}",
                status, error_body
            )));
        }

        info!(pattern = %pattern, "Deleted indices");
        Ok(())
    }
}
