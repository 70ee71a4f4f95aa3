//! Command-line interface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use cpn_indexer_pipeline::batcher::DEFAULT_POST_COUNT;
use cpn_indexer_repository::config::DEFAULT_HOST;

/// Load CPN content into OpenSearch.
#[derive(Debug, Parser)]
#[clap(name = "cpn-indexer", version, about = "Load CPN content into OpenSearch indices")]
pub struct Cli {
    #[clap(flatten)]
    pub global: GlobalArgs,

    #[clap(subcommand)]
    pub command: Command,
}

/// Flags shared by every run mode.
#[derive(Debug, Clone, Args)]
pub struct GlobalArgs {
    /// Enable debug logging
    #[clap(long, global = true)]
    pub debug: bool,

    /// Emit logs as JSON lines
    #[clap(long, global = true)]
    pub json_logs: bool,

    /// Delete the target index (or every index under the prefix) before writing
    #[clap(long, global = true)]
    pub delete_index: bool,

    /// Search hosts as hostname:port
    #[clap(long, global = true, num_args = 1.., default_value = DEFAULT_HOST)]
    pub hosts: Vec<String>,

    /// Search user; SEARCH_USER takes precedence
    #[clap(long, global = true)]
    pub user: Option<String>,

    /// Search password; SEARCH_PASSWORD takes precedence
    #[clap(long, global = true)]
    pub password: Option<String>,

    /// Documents per bulk request
    #[clap(long, global = true, default_value_t = DEFAULT_POST_COUNT)]
    pub post_count: usize,

    /// Site URL stored with every document
    #[clap(long, global = true, default_value = "")]
    pub base_url: String,

    /// Document path stored with every document
    #[clap(long, global = true, default_value = "")]
    pub doc_url: String,

    /// Category stored with every document
    #[clap(long, global = true, default_value = "")]
    pub category: String,

    /// Connect to the search hosts over plain HTTP
    #[clap(long, global = true)]
    pub insecure_http: bool,

    /// Skip certificate validation
    #[clap(long, global = true)]
    pub no_verify_certs: bool,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Index pre-rendered .fjson files into a single index
    Files {
        /// Directory holding the files
        #[clap(long)]
        path: PathBuf,

        /// File names relative to the directory, without extension; all files when omitted
        #[clap(long = "file", num_args = 1..)]
        files: Vec<String>,

        /// Target index
        #[clap(long, default_value = "test-index")]
        index: String,
    },

    /// Index a Strapi collection into one index per locale
    Strapi {
        /// Locales to index
        #[clap(long, num_args = 1.., required = true)]
        locales: Vec<String>,

        /// Prefix of every index name
        #[clap(long, default_value = "cpn-")]
        index_prefix: String,

        /// Collection URL; STRAPI_URL when omitted
        #[clap(long)]
        strapi_url: Option<String>,

        /// API token; STRAPI_TOKEN when omitted
        #[clap(long)]
        strapi_token: Option<String>,

        /// Records per page requested from Strapi
        #[clap(long)]
        page_size: Option<u32>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_files_defaults() {
        let cli = Cli::try_parse_from(["cpn-indexer", "files", "--path", "docs"]).unwrap();

        assert_eq!(cli.global.hosts, vec!["localhost:9200"]);
        assert_eq!(cli.global.post_count, 5);
        assert!(!cli.global.delete_index);
        match cli.command {
            Command::Files { path, files, index } => {
                assert_eq!(path, PathBuf::from("docs"));
                assert!(files.is_empty());
                assert_eq!(index, "test-index");
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_strapi_flags() {
        let cli = Cli::try_parse_from([
            "cpn-indexer",
            "strapi",
            "--locales",
            "en",
            "de",
            "--hosts",
            "a:9200",
            "b:9200",
            "--category",
            "partners",
            "--post-count",
            "10",
            "--delete-index",
        ])
        .unwrap();

        assert_eq!(cli.global.hosts, vec!["a:9200", "b:9200"]);
        assert_eq!(cli.global.category, "partners");
        assert_eq!(cli.global.post_count, 10);
        assert!(cli.global.delete_index);
        match cli.command {
            Command::Strapi {
                locales,
                index_prefix,
                strapi_url,
                ..
            } => {
                assert_eq!(locales, vec!["en", "de"]);
                assert_eq!(index_prefix, "cpn-");
                assert!(strapi_url.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_strapi_requires_locales() {
        assert!(Cli::try_parse_from(["cpn-indexer", "strapi"]).is_err());
    }
}
