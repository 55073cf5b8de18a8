//! Comparison operators for filter clauses.
//!
//! The [`Op`] enum covers the ten operators the backend accepts. Operators
//! are parsed from the same tokens the backend uses (`"=="`, `"not-in"`, ...)
//! and serialize back to them.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::QueryError;

/// Comparison operator for a filter clause.
///
/// Operators fall into a few families:
/// - **Equality**: `Eq`, `Ne` - the only operators allowed with a null operand
/// - **Range**: `Lt`, `Lte`, `Gt`, `Gte` - unrestricted in count
/// - **Array membership**: `ArrayContains`, `ArrayContainsAny`
/// - **Set membership**: `In`, `NotIn`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Op {
    /// Equal.
    #[serde(rename = "==")]
    Eq,
    /// Not equal.
    #[serde(rename = "!=")]
    Ne,
    /// Less than.
    #[serde(rename = "<")]
    Lt,
    /// Less than or equal.
    #[serde(rename = "<=")]
    Lte,
    /// Greater than.
    #[serde(rename = ">")]
    Gt,
    /// Greater than or equal.
    #[serde(rename = ">=")]
    Gte,
    /// Array field contains the operand.
    #[serde(rename = "array-contains")]
    ArrayContains,
    /// Array field contains any element of the operand list.
    #[serde(rename = "array-contains-any")]
    ArrayContainsAny,
    /// Field equals one element of the operand list.
    #[serde(rename = "in")]
    In,
    /// Field equals none of the elements of the operand list.
    #[serde(rename = "not-in")]
    NotIn,
}

impl Op {
    /// All operators, in declaration order.
    pub const ALL: [Op; 10] = [
        Op::Eq,
        Op::Ne,
        Op::Lt,
        Op::Lte,
        Op::Gt,
        Op::Gte,
        Op::ArrayContains,
        Op::ArrayContainsAny,
        Op::In,
        Op::NotIn,
    ];

    /// Returns `true` if this operator may be used with a null operand.
    pub fn accepts_null(self) -> bool {
        matches!(self, Op::Eq | Op::Ne)
    }

    /// Returns `true` if this operator takes a non-empty list operand.
    pub fn takes_list(self) -> bool {
        matches!(self, Op::In | Op::NotIn | Op::ArrayContainsAny)
    }

    /// Returns the token for this operator.
    pub fn as_str(self) -> &'static str {
        match self {
            Op::Eq => "==",
            Op::Ne => "!=",
            Op::Lt => "<",
            Op::Lte => "<=",
            Op::Gt => ">",
            Op::Gte => ">=",
            Op::ArrayContains => "array-contains",
            Op::ArrayContainsAny => "array-contains-any",
            Op::In => "in",
            Op::NotIn => "not-in",
        }
    }
}

impl FromStr for Op {
    type Err = QueryError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        Op::ALL
            .into_iter()
            .find(|op| op.as_str() == token)
            .ok_or_else(|| QueryError::OperatorInvalid {
                token: token.to_string(),
            })
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
