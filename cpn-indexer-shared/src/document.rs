//! Search document types.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Field names injected into every document.
pub const INJECTED_FIELDS: [&str; 5] = ["base_url", "doc_url", "category", "locale", "body"];

/// Document representing a transformed record in the search index.
///
/// The `id` is used as the store's document id and is not part of the
/// indexed source. Pass-through payload fields are flattened into the
/// source after the injected fields, in upstream order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(skip)]
    pub id: String,
    pub base_url: String,
    pub doc_url: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl Document {
    /// Create a document with the given id and injected fields.
    pub fn new(
        id: impl Into<String>,
        base_url: impl Into<String>,
        doc_url: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            base_url: base_url.into(),
            doc_url: doc_url.into(),
            category: category.into(),
            locale: None,
            body: None,
            extra: IndexMap::new(),
        }
    }

    /// Set pass-through payload fields.
    ///
    /// Keys that collide with an injected field are dropped; injected values win.
    pub fn with_extra(mut self, extra: IndexMap<String, Value>) -> Self {
        self.extra = extra
            .into_iter()
            .filter(|(key, _)| !INJECTED_FIELDS.contains(&key.as_str()))
            .collect();
        self
    }

    /// Render the indexed source of this document.
    pub fn to_source(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}
