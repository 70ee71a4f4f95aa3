//! Run summary types.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

/// Raw response of one bulk submission.
///
/// Item-level failures are not interpreted; `errors` mirrors the flag the
/// store reports and `body` keeps the full response for callers to inspect.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkResponse {
    pub took: Option<u64>,
    pub errors: bool,
    pub items: usize,
    pub body: Value,
}

impl BulkResponse {
    pub fn from_body(body: Value) -> Self {
        let took = body.get("took").and_then(Value::as_u64);
        let errors = body.get("errors").and_then(Value::as_bool).unwrap_or(false);
        let items = body
            .get("items")
            .and_then(Value::as_array)
            .map(Vec::len)
            .unwrap_or(0);

        Self {
            took,
            errors,
            items,
            body,
        }
    }
}

/// Counts for one locale (or one local-file run).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocaleSummary {
    pub locale: String,
    pub index: String,
    pub pages: u32,
    pub documents: usize,
    pub submissions: usize,
}

/// Aggregate result of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub responses: Vec<BulkResponse>,
    pub uploaded_count: usize,
    pub locales: Vec<LocaleSummary>,
}

impl RunSummary {
    /// Number of bulk submissions made.
    pub fn submissions(&self) -> usize {
        self.responses.len()
    }

    /// Whether any bulk response reported item-level errors.
    pub fn has_item_errors(&self) -> bool {
        self.responses.iter().any(|r| r.errors)
    }

    /// Index names written during the run, in order.
    pub fn indices(&self) -> Vec<&str> {
        self.locales.iter().map(|l| l.index.as_str()).collect()
    }
}
