//! Ordering clauses for query results.
//!
//! Provides [`Dir`] for sort direction and [`OrderBy`] for field-based ordering.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{QueryError, Result};
use crate::field::{FieldPath, IntoFieldPath};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dir {
    /// Ascending order (smallest first).
    #[default]
    Asc,
    /// Descending order (largest first).
    Desc,
}

impl Dir {
    /// Returns `true` if this is ascending order.
    pub fn is_asc(self) -> bool {
        matches!(self, Dir::Asc)
    }

    /// Returns `true` if this is descending order.
    pub fn is_desc(self) -> bool {
        matches!(self, Dir::Desc)
    }

    /// Returns the display name of this direction.
    pub fn as_str(self) -> &'static str {
        match self {
            Dir::Asc => "asc",
            Dir::Desc => "desc",
        }
    }
}

impl FromStr for Dir {
    type Err = QueryError;

    fn from_str(token: &str) -> Result<Self> {
        match token {
            "asc" => Ok(Dir::Asc),
            "desc" => Ok(Dir::Desc),
            _ => Err(QueryError::InvalidDirection {
                token: token.to_string(),
            }),
        }
    }
}

impl fmt::Display for Dir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single ordering clause specifying a field and direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderBy {
    /// The field to sort by.
    pub field: FieldPath,
    /// The sort direction.
    pub dir: Dir,
}

impl OrderBy {
    /// Creates a new ordering with the given direction.
    pub fn new(field: impl IntoFieldPath, dir: Dir) -> Result<Self> {
        Ok(OrderBy {
            field: field.into_field_path()?,
            dir,
        })
    }

    /// Creates a new ascending ordering for the given field.
    pub fn asc(field: impl IntoFieldPath) -> Result<Self> {
        Self::new(field, Dir::Asc)
    }

    /// Creates a new descending ordering for the given field.
    pub fn desc(field: impl IntoFieldPath) -> Result<Self> {
        Self::new(field, Dir::Desc)
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.dir)
    }
}
