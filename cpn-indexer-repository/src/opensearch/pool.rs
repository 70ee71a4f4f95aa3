//! Round-robin connection pool over a fixed host list.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use opensearch::http::transport::{Connection, ConnectionPool};
use url::Url;

use crate::errors::SearchError;

/// Hands out the configured nodes in turn, starting with the first.
///
/// Clones share the cursor, so a cloned transport keeps rotating from
/// where the original left off.
#[derive(Debug, Clone)]
pub struct RoundRobinConnectionPool {
    connections: Arc<[Connection]>,
    cursor: Arc<AtomicUsize>,
}

impl RoundRobinConnectionPool {
    pub fn new(urls: Vec<Url>) -> Result<Self, SearchError> {
        if urls.is_empty() {
            return Err(SearchError::config("no hosts configured"));
        }
        Ok(Self {
            connections: urls.into_iter().map(Connection::new).collect(),
            cursor: Arc::new(AtomicUsize::new(0)),
        })
    }

    fn next_index(&self) -> usize {
        self.cursor.fetch_add(1, Ordering::Relaxed) % self.connections.len()
    }
}

impl ConnectionPool for RoundRobinConnectionPool {
    fn next(&self) -> Connection {
        self.connections[self.next_index()].clone()
    }
}
