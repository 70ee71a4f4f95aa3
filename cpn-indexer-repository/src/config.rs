//! Connection configuration for the store client.

use std::fmt;
use std::str::FromStr;

use url::Url;

use crate::errors::SearchError;

/// Default host when none is configured.
pub const DEFAULT_HOST: &str = "localhost:9200";

/// One `hostname:port` entry of the host list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostSpec {
    pub host: String,
    pub port: u16,
}

impl FromStr for HostSpec {
    type Err = SearchError;

    /// Parse a `hostname:port` pair; anything else is a configuration error.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        let [host, port] = parts.as_slice() else {
            return Err(SearchError::config(format!(
                "host '{}' does not match the following format: hostname:port",
                s
            )));
        };
        if host.is_empty() {
            return Err(SearchError::config(format!("host '{}' has no hostname", s)));
        }
        let port = port
            .parse::<u16>()
            .map_err(|e| SearchError::config(format!("host '{}' has an invalid port: {}", s, e)))?;

        Ok(Self {
            host: host.to_string(),
            port,
        })
    }
}

impl fmt::Display for HostSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl HostSpec {
    /// Node URL for this host.
    pub fn url(&self, use_ssl: bool) -> Result<Url, SearchError> {
        let scheme = if use_ssl { "https" } else { "http" };
        Url::parse(&format!("{}://{}:{}", scheme, self.host, self.port))
            .map_err(|e| SearchError::config(format!("invalid host '{}': {}", self, e)))
    }
}

/// Parse a list of `hostname:port` entries.
pub fn parse_hosts<S: AsRef<str>>(hosts: &[S]) -> Result<Vec<HostSpec>, SearchError> {
    hosts.iter().map(|h| h.as_ref().parse()).collect()
}

/// Settings for connecting to the store.
#[derive(Clone)]
pub struct ConnectionConfig {
    pub hosts: Vec<HostSpec>,
    pub username: String,
    pub password: String,
    /// Connect over HTTPS.
    pub use_ssl: bool,
    /// Validate server certificates when connecting over HTTPS.
    pub verify_certs: bool,
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("hosts", &self.hosts)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("use_ssl", &self.use_ssl)
            .field("verify_certs", &self.verify_certs)
            .finish()
    }
}

impl ConnectionConfig {
    /// Create a config for HTTPS with certificate validation.
    pub fn new(
        hosts: Vec<HostSpec>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            hosts,
            username: username.into(),
            password: password.into(),
            use_ssl: true,
            verify_certs: true,
        }
    }

    /// Node URLs in host-list order.
    pub fn urls(&self) -> Result<Vec<Url>, SearchError> {
        if self.hosts.is_empty() {
            return Err(SearchError::config("no hosts configured"));
        }
        self.hosts.iter().map(|h| h.url(self.use_ssl)).collect()
    }
}
