//! Remote document store client.
//!
//! The catalog never talks to a database directly: it goes through [`DocumentStore`],
//! a collection-of-documents interface shaped after the hosted store the inventory was
//! first built on. [`SqliteDocumentStore`] is the implementation the binary uses.

use crate::errors::{Error, Result};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

mod sqlite;

pub use sqlite::SqliteDocumentStore;

/// Body of a document: field name to JSON value.
pub type Fields = serde_json::Map<String, Value>;

/// A stored document together with its id.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Id assigned by the store on creation
    pub id: String,
    /// Document body
    pub fields: Fields,
}

/// Operations the catalog needs from a remote document store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Every document in `collection`, in a stable order.
    async fn list_all(&self, collection: &str) -> Result<Vec<Document>>;

    /// Stores a new document and returns the id assigned to it.
    async fn create(&self, collection: &str, fields: Fields) -> Result<String>;

    /// Merges `fields` into an existing document. Keys not present in
    /// `fields` are left untouched. Fails if the document does not exist.
    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<()>;

    /// Removes a document. Deleting a missing document succeeds.
    async fn delete(&self, collection: &str, id: &str) -> Result<()>;

    /// Atomically sets `field` to `new` only if it currently equals `expected`.
    /// Returns `false` when the current value differs; fails if the document
    /// does not exist.
    async fn compare_and_set(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        expected: Value,
        new: Value,
    ) -> Result<bool>;
}

/// Serializes a struct into a document body.
///
/// # Errors
/// Returns an error if serialization fails or the value is not a JSON object.
pub fn to_fields<T: Serialize>(value: &T) -> Result<Fields> {
    match serde_json::to_value(value)? {
        Value::Object(fields) => Ok(fields),
        other => Err(Error::Encode {
            message: format!("expected a JSON object, got {other}"),
        }),
    }
}

/// Equality used by `compare_and_set`: numbers compare by value, and numeric
/// strings compare equal to the number they spell.
pub(crate) fn values_match(current: &Value, expected: &Value) -> bool {
    match (as_number(current), as_number(expected)) {
        (Some(a), Some(b)) => (a - b).abs() < f64::EPSILON,
        _ => current == expected,
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_values_match_numbers_and_numeric_strings() {
        assert!(values_match(&json!(5), &json!(5)));
        assert!(values_match(&json!(5.0), &json!(5)));
        assert!(values_match(&json!("5"), &json!(5)));
        assert!(!values_match(&json!(4), &json!(5)));
        assert!(!values_match(&Value::Null, &json!(5)));
        assert!(values_match(&json!("abc"), &json!("abc")));
    }

    #[test]
    fn test_to_fields_rejects_non_objects() {
        assert!(matches!(to_fields(&42), Err(Error::Encode { .. })));
        assert!(to_fields(&json!({ "a": 1 })).is_ok());
    }
}
