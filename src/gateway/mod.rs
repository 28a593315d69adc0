//! Remote document store access.
//!
//! The sync controllers talk to the document database only through
//! [`RemoteGateway`]. Two implementations ship with the crate:
//!
//! - [`MemoryGateway`]: process-local collections, used by tests and demos
//! - [`FileGateway`]: one JSON file per collection under a data directory
//!
//! ```text
//! <DATA_DIR>/
//!   products.json
//!   orders.json
//!   users.json
//! ```

mod file;
mod memory;

pub use file::FileGateway;
pub use memory::MemoryGateway;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::path::PathBuf;
use thiserror::Error;

use crate::models::{Entity, Fields};

/// A document as returned by the remote store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }
}

impl From<Document> for Entity {
    fn from(doc: Document) -> Self {
        Entity::new(doc.id, doc.fields)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Errors reported by a gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("I/O error for {}: {}", .0.display(), .1)]
    Io(PathBuf, String),

    #[error("Corrupt collection file {}: {}", .0.display(), .1)]
    Corrupt(PathBuf, String),

    #[error("No document '{id}' in collection '{collection}'")]
    MissingDocument { collection: String, id: String },
}

/// Access to a remote document store.
///
/// Every call is one round trip and may fail with a transport error.
#[async_trait]
pub trait RemoteGateway: Send + Sync {
    /// Lists a whole collection ordered by `sort_field`.
    async fn list(
        &self,
        collection: &str,
        sort_field: &str,
        direction: SortDirection,
    ) -> Result<Vec<Document>, GatewayError>;

    /// Fetches one document. `Ok(None)` means the store has no such document.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, GatewayError>;

    /// Inserts a new document and returns the identifier the store assigned.
    async fn insert(&self, collection: &str, fields: Fields) -> Result<String, GatewayError>;

    /// Merges `fields` into an existing document.
    async fn update(&self, collection: &str, id: &str, fields: Fields)
        -> Result<(), GatewayError>;

    async fn delete(&self, collection: &str, id: &str) -> Result<(), GatewayError>;
}

/// Sorts documents by a field, the way the remote store orders a query.
///
/// Documents missing the field sort first in ascending order. Values are
/// compared as numbers when both are numeric, otherwise by their string form.
pub(crate) fn sort_documents(docs: &mut [Document], sort_field: &str, direction: SortDirection) {
    docs.sort_by(|a, b| {
        let ordering = compare_field(a.fields.get(sort_field), b.fields.get(sort_field));
        match direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
}

fn compare_field(a: Option<&serde_json::Value>, b: Option<&serde_json::Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => match (a.as_str(), b.as_str()) {
                (Some(x), Some(y)) => x.cmp(y),
                _ => a.to_string().cmp(&b.to_string()),
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(id: &str, value: serde_json::Value) -> Document {
        Document::new(id, value.as_object().cloned().unwrap())
    }

    #[test]
    fn test_sort_descending_by_timestamp() {
        let mut docs = vec![
            doc("a", json!({"createdAt": "2024-01-01T00:00:00.000000Z"})),
            doc("b", json!({"createdAt": "2024-03-01T00:00:00.000000Z"})),
            doc("c", json!({"createdAt": "2024-02-01T00:00:00.000000Z"})),
        ];

        sort_documents(&mut docs, "createdAt", SortDirection::Descending);

        let ids: Vec<&str> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_sort_numeric_and_missing() {
        let mut docs = vec![
            doc("ten", json!({"rank": 10})),
            doc("none", json!({})),
            doc("two", json!({"rank": 2})),
        ];

        sort_documents(&mut docs, "rank", SortDirection::Ascending);

        let ids: Vec<&str> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["none", "two", "ten"]);
    }

    #[test]
    fn test_sort_is_stable_for_ties() {
        let mut docs = vec![
            doc("first", json!({"createdAt": "same"})),
            doc("second", json!({"createdAt": "same"})),
        ];

        sort_documents(&mut docs, "createdAt", SortDirection::Descending);

        assert_eq!(docs[0].id, "first");
        assert_eq!(docs[1].id, "second");
    }
}
