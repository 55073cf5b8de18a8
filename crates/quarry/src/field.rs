//! Field paths inside a document.
//!
//! A [`FieldPath`] names a possibly nested field (`address.city`) or the
//! document's own identity. Dotted strings are parsed and checked; explicit
//! segment lists are taken as-is, so a `.` inside a segment is literal.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::error::{QueryError, Result};

/// Name the backend uses for the document-identity field.
pub const DOCUMENT_ID_NAME: &str = "__name__";

/// Reference to a field within a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldPath {
    /// Ordered path segments, outermost first.
    Segments(Vec<String>),
    /// The document's identity rather than any stored field.
    DocumentId,
}

impl FieldPath {
    /// Parses a dotted path such as `"foo.bar"`.
    ///
    /// Fails with [`QueryError::InvalidFieldPath`] if any segment is empty,
    /// which covers the empty string, leading and trailing dots, and `..`.
    pub fn parse(path: &str) -> Result<Self> {
        let segments: Vec<String> = path.split('.').map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return Err(QueryError::InvalidFieldPath {
                path: path.to_string(),
            });
        }
        Ok(FieldPath::Segments(segments))
    }

    /// Builds a path from explicit segments. Never fails.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldPath::Segments(segments.into_iter().map(Into::into).collect())
    }

    /// Returns the document-identity sentinel.
    pub fn document_id() -> Self {
        FieldPath::DocumentId
    }

    /// Returns `true` for the document-identity sentinel.
    pub fn is_document_id(&self) -> bool {
        matches!(self, FieldPath::DocumentId)
    }

    /// Returns the path segments, or `None` for the document-identity sentinel.
    pub fn segments(&self) -> Option<&[String]> {
        match self {
            FieldPath::Segments(segments) => Some(segments),
            FieldPath::DocumentId => None,
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldPath::Segments(segments) => write!(f, "{}", segments.join(".")),
            FieldPath::DocumentId => f.write_str(DOCUMENT_ID_NAME),
        }
    }
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            FieldPath::Segments(segments) => segments.serialize(serializer),
            FieldPath::DocumentId => serializer.serialize_str(DOCUMENT_ID_NAME),
        }
    }
}

/// Conversion into a [`FieldPath`], parsing where the input is a dotted string.
///
/// Builder methods take `impl IntoFieldPath` so callers can pass `"a.b"`,
/// a segment list, or a ready-made path.
pub trait IntoFieldPath {
    fn into_field_path(self) -> Result<FieldPath>;
}

impl IntoFieldPath for FieldPath {
    fn into_field_path(self) -> Result<FieldPath> {
        Ok(self)
    }
}

impl IntoFieldPath for &FieldPath {
    fn into_field_path(self) -> Result<FieldPath> {
        Ok(self.clone())
    }
}

impl IntoFieldPath for &str {
    fn into_field_path(self) -> Result<FieldPath> {
        FieldPath::parse(self)
    }
}

impl IntoFieldPath for String {
    fn into_field_path(self) -> Result<FieldPath> {
        FieldPath::parse(&self)
    }
}

impl IntoFieldPath for &String {
    fn into_field_path(self) -> Result<FieldPath> {
        FieldPath::parse(self)
    }
}

impl IntoFieldPath for Vec<String> {
    fn into_field_path(self) -> Result<FieldPath> {
        Ok(FieldPath::Segments(self))
    }
}

impl IntoFieldPath for &[&str] {
    fn into_field_path(self) -> Result<FieldPath> {
        Ok(FieldPath::from_segments(self.iter().copied()))
    }
}

impl<const N: usize> IntoFieldPath for [&str; N] {
    fn into_field_path(self) -> Result<FieldPath> {
        Ok(FieldPath::from_segments(self))
    }
}
