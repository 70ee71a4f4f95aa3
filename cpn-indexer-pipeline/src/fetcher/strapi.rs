//! Strapi content API fetcher.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::errors::PipelineError;
use crate::fetcher::{check_page, Fetcher};
use cpn_indexer_shared::{Page, Record};

/// Connection settings for a Strapi collection endpoint.
#[derive(Clone)]
pub struct StrapiConfig {
    /// Full collection URL, e.g. `https://cms.example.com/api/partners`.
    pub url: String,
    /// API token sent as a bearer token.
    pub token: String,
    /// Page size requested from Strapi; the server default applies when unset.
    pub page_size: Option<u32>,
    /// Value of the `populate` query parameter, if any.
    pub populate: Option<String>,
}

impl std::fmt::Debug for StrapiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrapiConfig")
            .field("url", &self.url)
            .field("token", &"<redacted>")
            .field("page_size", &self.page_size)
            .field("populate", &self.populate)
            .finish()
    }
}

impl StrapiConfig {
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            token: token.into(),
            page_size: None,
            populate: Some("*".to_string()),
        }
    }

    /// Query parameters for one page request.
    pub fn page_query(&self, locale: Option<&str>, page: u32) -> Vec<(String, String)> {
        let mut query = Vec::with_capacity(4);
        if let Some(locale) = locale {
            query.push(("locale".to_string(), locale.to_string()));
        }
        query.push(("pagination[page]".to_string(), page.to_string()));
        if let Some(page_size) = self.page_size {
            query.push(("pagination[pageSize]".to_string(), page_size.to_string()));
        }
        if let Some(ref populate) = self.populate {
            query.push(("populate".to_string(), populate.clone()));
        }
        query
    }
}

#[derive(Debug, Deserialize)]
struct StrapiResponse {
    data: Vec<Value>,
    meta: StrapiMeta,
}

#[derive(Debug, Deserialize)]
struct StrapiMeta {
    pagination: StrapiPagination,
}

#[derive(Debug, Deserialize)]
struct StrapiPagination {
    page: u32,
    #[serde(rename = "pageCount")]
    page_count: u32,
    #[serde(default)]
    total: Option<u64>,
}

/// Decode a Strapi collection response into a page.
///
/// When the response omits `total`, the number of records on the page is
/// used; an empty page is then judged by `page < pageCount` alone.
pub fn decode_page(body: Value) -> Result<Page, PipelineError> {
    let response: StrapiResponse = serde_json::from_value(body)
        .map_err(|e| PipelineError::decode(format!("unexpected Strapi payload: {}", e)))?;

    let records = response
        .data
        .into_iter()
        .map(Record::from_json)
        .collect::<Result<Vec<_>, _>>()?;

    let pagination = response.meta.pagination;
    let total = pagination.total.unwrap_or(records.len() as u64);

    Ok(Page::new(records, pagination.page, pagination.page_count, total))
}

/// Fetcher for a Strapi collection endpoint.
pub struct StrapiFetcher {
    http: reqwest::Client,
    config: StrapiConfig,
}

impl StrapiFetcher {
    /// Create a new fetcher.
    pub fn new(config: StrapiConfig) -> Result<Self, PipelineError> {
        if config.url.is_empty() {
            return Err(PipelineError::config("Strapi URL is empty"));
        }
        if config.token.is_empty() {
            return Err(PipelineError::config("Strapi token is empty"));
        }

        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| PipelineError::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }
}

#[async_trait]
impl Fetcher for StrapiFetcher {
    #[instrument(skip(self))]
    async fn fetch(&self, locale: Option<&str>, page: u32) -> Result<Page, PipelineError> {
        check_page(page)?;

        let response = self
            .http
            .get(&self.config.url)
            .bearer_auth(&self.config.token)
            .query(&self.config.page_query(locale, page))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(PipelineError::fetch(format!(
                "Strapi request failed with status {}: {}",
                status, error_body
            )));
        }

        let body: Value = response.json().await?;
        let fetched = decode_page(body)?;

        if fetched.page != page {
            warn!(requested = page, reported = fetched.page, "Strapi reported a different page");
        }
        debug!(
            records = fetched.records.len(),
            page_count = fetched.page_count,
            total = fetched.total,
            "Fetched page"
        );

        Ok(fetched)
    }
}
