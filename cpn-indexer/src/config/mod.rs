//! Configuration for the indexer binary.
//!
//! Everything is resolved once from the command line and the environment
//! into an immutable [`RunConfig`] before any I/O happens.

pub mod credentials;
mod dependencies;

pub use credentials::Credentials;
pub use dependencies::Dependencies;

use cpn_indexer_pipeline::fetcher::StrapiConfig;
use cpn_indexer_pipeline::{LocalFilesRun, RemoteRun};
use cpn_indexer_repository::config::parse_hosts;
use cpn_indexer_repository::ConnectionConfig;

use crate::cli::{Cli, Command};
use crate::IndexingError;
use credentials::{flag_or_env, resolve_credentials, STRAPI_TOKEN_VAR, STRAPI_URL_VAR};

/// The run to perform.
#[derive(Debug, Clone)]
pub enum RunMode {
    LocalFiles(LocalFilesRun),
    Remote(RemoteRun),
}

/// Fully resolved configuration of one invocation.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub connection: ConnectionConfig,
    pub mode: RunMode,
}

impl RunConfig {
    /// Resolve the configuration from parsed flags and the process environment.
    pub fn from_cli(cli: &Cli) -> Result<Self, IndexingError> {
        Self::resolve(cli, &|var| std::env::var(var).ok())
    }

    /// Resolve the configuration using `lookup` for environment variables.
    pub fn resolve<L>(cli: &Cli, lookup: &L) -> Result<Self, IndexingError>
    where
        L: Fn(&str) -> Option<String>,
    {
        let global = &cli.global;
        if global.post_count == 0 {
            return Err(IndexingError::config("--post-count must be at least 1"));
        }

        let hosts = parse_hosts(&global.hosts)?;
        let credentials =
            resolve_credentials(lookup, global.user.as_deref(), global.password.as_deref())?;
        let mut connection = ConnectionConfig::new(hosts, credentials.username, credentials.password);
        connection.use_ssl = !global.insecure_http;
        connection.verify_certs = !global.no_verify_certs;

        let mode = match &cli.command {
            Command::Files { path, files, index } => RunMode::LocalFiles(LocalFilesRun {
                path: path.clone(),
                files: (!files.is_empty()).then(|| files.clone()),
                index: index.clone(),
                delete_index: global.delete_index,
                post_count: global.post_count,
                base_url: global.base_url.clone(),
                doc_url: global.doc_url.clone(),
                category: global.category.clone(),
            }),
            Command::Strapi {
                locales,
                index_prefix,
                strapi_url,
                strapi_token,
                page_size,
            } => {
                if locales.is_empty() {
                    return Err(IndexingError::config("no locales specified"));
                }
                let url = flag_or_env(lookup, strapi_url.as_deref(), STRAPI_URL_VAR, "Strapi URL")?;
                let token =
                    flag_or_env(lookup, strapi_token.as_deref(), STRAPI_TOKEN_VAR, "Strapi token")?;
                let mut strapi = StrapiConfig::new(url, token);
                strapi.page_size = *page_size;

                RunMode::Remote(RemoteRun {
                    strapi,
                    locales: locales.clone(),
                    index_prefix: index_prefix.clone(),
                    delete_index: global.delete_index,
                    post_count: global.post_count,
                    base_url: global.base_url.clone(),
                    doc_url: global.doc_url.clone(),
                    category: global.category.clone(),
                })
            }
        };

        Ok(Self { connection, mode })
    }
}
