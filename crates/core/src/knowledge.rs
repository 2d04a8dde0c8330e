//! Knowledge store - the static product facts and media references the
//! assistant is allowed to draw from.
//!
//! The store is a bundled JSON document:
//!
//! ```json
//! { "collections": {
//!     "products":       [ { "id": "...", "description": "..." } ],
//!     "youtube_videos": [ { "title": "...", "video_url": "...", "category": "..." } ]
//! } }
//! ```
//!
//! No schema is enforced beyond the fields the prompt renderer reads.
//! Documents stay raw JSON objects and accessors degrade to empty text.

use std::borrow::Cow;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::error::KnowledgeError;

/// Collection holding product documents.
pub const PRODUCTS_COLLECTION: &str = "products";

/// Collection holding media references.
pub const MEDIA_COLLECTION: &str = "youtube_videos";

/// A single document: string keys to arbitrary JSON values.
pub type Document = Map<String, Value>;

/// The loaded knowledge base. Immutable once loaded.
///
/// `collections` is kept as raw JSON. Entries that are not arrays, and array
/// items that are not objects, are skipped by the accessors rather than
/// rejected at load time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KnowledgeStore {
    collections: Map<String, Value>,
}

impl KnowledgeStore {
    /// Load the store from `path`.
    ///
    /// Returns `Ok(None)` when the file does not exist: a missing knowledge
    /// base is expected and the assistant falls back to a generic prompt.
    /// Any other read failure, invalid JSON, or a top-level value that is not
    /// an object is an error.
    pub fn load(path: &Path) -> Result<Option<Self>, KnowledgeError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "No knowledge base found, using fallback prompt");
                return Ok(None);
            }
            Err(e) => {
                return Err(KnowledgeError::Read {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                });
            }
        };

        let store = Self::from_json(&content).map_err(|e| KnowledgeError::Malformed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        debug!(
            path = %path.display(),
            collections = store.collections.len(),
            documents = store.document_count(),
            "Knowledge base loaded"
        );

        Ok(Some(store))
    }

    /// Parse a store from JSON text.
    ///
    /// Fails only when the text is not JSON or the top-level value is not an
    /// object. A missing or non-object `collections` value means no collections.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let Value::Object(mut root) = serde_json::from_str::<Value>(json)? else {
            return Err(serde::de::Error::custom(
                "knowledge base must be a JSON object",
            ));
        };

        let collections = match root.remove("collections") {
            Some(Value::Object(map)) => map,
            Some(other) => {
                debug!(kind = json_kind(&other), "Ignoring non-object `collections` value");
                Map::new()
            }
            None => Map::new(),
        };

        Ok(Self { collections })
    }

    /// The object documents of a collection, in file order.
    ///
    /// `None` if the collection is absent or is not an array. Array items
    /// that are not objects are skipped.
    pub fn collection(&self, name: &str) -> Option<Vec<&Document>> {
        let items = self.collections.get(name)?.as_array()?;
        Some(items.iter().filter_map(Value::as_object).collect())
    }

    /// Product documents (empty when the collection is absent).
    pub fn products(&self) -> Vec<&Document> {
        self.collection(PRODUCTS_COLLECTION).unwrap_or_default()
    }

    /// Total number of usable documents across all collections.
    pub fn document_count(&self) -> usize {
        self.collections
            .values()
            .filter_map(Value::as_array)
            .map(|items| items.iter().filter(|v| v.is_object()).count())
            .sum()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Read a field as display text.
///
/// Strings are returned as-is, a missing or `null` field is empty, and any
/// other value renders as its compact JSON text.
pub fn field_text<'a>(doc: &'a Document, key: &str) -> Cow<'a, str> {
    match doc.get(key) {
        None | Some(Value::Null) => Cow::Borrowed(""),
        Some(Value::String(s)) => Cow::Borrowed(s.as_str()),
        Some(other) => Cow::Owned(other.to_string()),
    }
}
