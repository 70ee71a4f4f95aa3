//! Fetcher module for the indexer pipeline.
//!
//! A fetcher returns one page of records per call. The orchestrator drives
//! pagination; fetchers never loop on their own and never retry.

mod local_files;
mod strapi;

pub use local_files::LocalFileFetcher;
pub use strapi::{decode_page, StrapiConfig, StrapiFetcher};

use async_trait::async_trait;

use crate::errors::PipelineError;
use cpn_indexer_shared::Page;

/// Source of paginated records.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch one page of records.
    ///
    /// # Arguments
    ///
    /// * `locale` - Locale to fetch, or `None` for sources without locales
    /// * `page` - 1-based page number
    ///
    /// # Returns
    ///
    /// * `Ok(Page)` - Exactly the page reported by the source
    /// * `Err(PipelineError)` - On any transport or decode failure
    async fn fetch(&self, locale: Option<&str>, page: u32) -> Result<Page, PipelineError>;
}

/// Reject page numbers below 1.
pub(crate) fn check_page(page: u32) -> Result<(), PipelineError> {
    if page == 0 {
        return Err(PipelineError::fetch("page numbers start at 1"));
    }
    Ok(())
}
