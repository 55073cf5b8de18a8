//! Seam to the component that executes validated queries.
//!
//! This crate never talks to a backend. A [`Transport`] receives a
//! [`Query`] that has passed every check, serializes it to its wire format,
//! and returns the matching documents.

use crate::query::Query;

/// Executes validated queries against a backend.
///
/// # Example
///
/// ```
/// use quarry::{Query, Transport};
///
/// /// Returns the serialized query instead of calling a backend.
/// struct Echo;
///
/// impl Transport for Echo {
///     type Document = String;
///     type Error = serde_json::Error;
///
///     fn fetch(&self, query: &Query) -> Result<Vec<String>, Self::Error> {
///         Ok(vec![serde_json::to_string(query)?])
///     }
/// }
///
/// let query = Query::new().where_field("a", "==", 1i64).unwrap();
/// let docs = query.get(&Echo).unwrap();
/// assert!(docs[0].contains("\"=="));
/// ```
pub trait Transport {
    /// Document type returned by the backend.
    type Document;
    /// Transport-level failure (network, permission, decoding).
    type Error;

    /// Runs the query and returns the matching documents in result order.
    fn fetch(&self, query: &Query) -> Result<Vec<Self::Document>, Self::Error>;
}

impl<T: Transport + ?Sized> Transport for &T {
    type Document = T::Document;
    type Error = T::Error;

    fn fetch(&self, query: &Query) -> Result<Vec<Self::Document>, Self::Error> {
        (**self).fetch(query)
    }
}
