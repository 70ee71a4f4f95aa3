//! Index naming and write semantics.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Destination index of a sub-run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexTarget {
    name: String,
}

impl IndexTarget {
    /// Target an index by its exact name.
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Derive the index name for a locale under a shared prefix.
    ///
    /// Produces `{prefix}{category}-{locale}`, or `{prefix}{locale}` when the
    /// category is empty. Index names are lowercased since the store rejects
    /// uppercase names.
    pub fn for_locale(prefix: &str, category: &str, locale: &str) -> Self {
        let name = if category.is_empty() {
            format!("{}{}", prefix, locale)
        } else {
            format!("{}{}-{}", prefix, category, locale)
        };
        Self {
            name: name.to_lowercase(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for IndexTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// What to delete before a rebuild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetScope {
    /// A single index.
    Index(IndexTarget),
    /// Every index whose name starts with the prefix.
    Prefix(String),
}

impl ResetScope {
    /// The index expression passed to the store's delete call.
    pub fn pattern(&self) -> String {
        match self {
            ResetScope::Index(target) => target.name().to_string(),
            ResetScope::Prefix(prefix) => format!("{}*", prefix),
        }
    }
}

/// Per-item write semantics of a bulk submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteMode {
    /// Fail the item when the id already exists.
    Create,
    /// Replace any existing document with the same id.
    Overwrite,
}

impl WriteMode {
    /// Bulk action name for this mode.
    pub fn action(&self) -> &'static str {
        match self {
            WriteMode::Create => "create",
            WriteMode::Overwrite => "index",
        }
    }
}
