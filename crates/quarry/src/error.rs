//! Error types for query composition.
//!
//! Every rejected mutation produces exactly one [`QueryError`]. Variants carry
//! the field path and operator that triggered them so callers can point at
//! the offending constraint.

use thiserror::Error;

use crate::field::FieldPath;
use crate::op::Op;

/// Errors raised while building or validating a query.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    /// A dotted path was empty, started or ended with `.`, or contained `..`.
    #[error(
        "'fieldPath' Invalid field path ({path}). Paths must not be empty, begin with '.', end with '.', or contain '..'"
    )]
    InvalidFieldPath { path: String },

    /// The operator token is not one of the supported operators.
    #[error("'opStr' is invalid ({token}). Expected one of '==', '!=', '<', '<=', '>', '>=', 'array-contains', 'array-contains-any', 'in' or 'not-in'")]
    OperatorInvalid { token: String },

    /// No operand was supplied for a comparison.
    #[error("'value' argument expected for '{op}' filter on '{field}'")]
    ValueRequired { field: FieldPath, op: Op },

    /// A null operand was used with an operator other than `==` or `!=`.
    #[error("Invalid query. You can only perform equals comparisons on null. Got '{op}' on '{field}'.")]
    NullOperatorMismatch { field: FieldPath, op: Op },

    /// A list operator was given a non-list or an empty list.
    #[error("Invalid query. A non-empty array is required for '{op}' filters. Field '{field}'.")]
    EmptyArrayOperand { field: FieldPath, op: Op },

    /// A list operand exceeded the backend limit.
    #[error("Invalid query. '{op}' filters support a maximum of {max} elements in the value array. Got {len} on '{field}'.")]
    ArrayTooLarge {
        field: FieldPath,
        op: Op,
        len: usize,
        max: usize,
    },

    /// `and()` or `or()` received no children.
    #[error("Invalid query. '{kind}' requires at least one filter.")]
    EmptyComposite { kind: &'static str },

    /// More than one `array-contains` comparison in the tree.
    #[error("Invalid query. Queries only support a single array-contains filter. Second one on '{field}'.")]
    MultipleArrayContains { field: FieldPath },

    /// More than one `array-contains-any` comparison in the tree.
    #[error("Invalid query. You cannot use more than one 'array-contains-any' filter. Second one on '{field}'.")]
    MultipleArrayContainsAny { field: FieldPath },

    /// More than one `not-in` comparison in the tree.
    #[error("Invalid query. You cannot use more than one 'not-in' filter. Second one on '{field}'.")]
    MultipleNotIn { field: FieldPath },

    /// A `not-in` filter coexists with `!=`, `in` or `array-contains-any`.
    #[error("Invalid query. You cannot use 'not-in' filters with {} filters. Conflict on '{field}'.", describe_conflict(.op))]
    NotInConflict { field: FieldPath, op: Op },

    /// More than one `!=` comparison in the tree.
    #[error("Invalid query. You cannot use more than one '!=' inequality filter. Second one on '{field}'.")]
    MultipleNotEqual { field: FieldPath },

    /// A document-identity filter is ordered first by another field.
    #[error("Invalid query. 'FieldPath' cannot be used in conjunction with a differing orderBy(). Ordered first by '{order_field}'.")]
    DocumentIdOrderingConflict { order_field: FieldPath },

    /// The limit was not a positive integer.
    #[error("'limit' must be a positive integer value. Got {value}.")]
    InvalidLimit { value: String },

    /// The direction token was neither `asc` nor `desc`.
    #[error("'directionStr' must be one of 'asc' or 'desc'. Got '{token}'.")]
    InvalidDirection { token: String },
}

fn describe_conflict(op: &Op) -> &'static str {
    match op {
        Op::Ne => "'!=' inequality",
        Op::In => "'in'",
        Op::ArrayContainsAny => "'array-contains-any'",
        _ => "conflicting",
    }
}

/// Discriminant of a [`QueryError`], for matching without inspecting fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidFieldPath,
    OperatorInvalid,
    ValueRequired,
    NullOperatorMismatch,
    EmptyArrayOperand,
    ArrayTooLarge,
    EmptyComposite,
    MultipleArrayContains,
    MultipleArrayContainsAny,
    MultipleNotIn,
    NotInConflict,
    MultipleNotEqual,
    DocumentIdOrderingConflict,
    InvalidLimit,
    InvalidDirection,
}

impl QueryError {
    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            QueryError::InvalidFieldPath { .. } => ErrorKind::InvalidFieldPath,
            QueryError::OperatorInvalid { .. } => ErrorKind::OperatorInvalid,
            QueryError::ValueRequired { .. } => ErrorKind::ValueRequired,
            QueryError::NullOperatorMismatch { .. } => ErrorKind::NullOperatorMismatch,
            QueryError::EmptyArrayOperand { .. } => ErrorKind::EmptyArrayOperand,
            QueryError::ArrayTooLarge { .. } => ErrorKind::ArrayTooLarge,
            QueryError::EmptyComposite { .. } => ErrorKind::EmptyComposite,
            QueryError::MultipleArrayContains { .. } => ErrorKind::MultipleArrayContains,
            QueryError::MultipleArrayContainsAny { .. } => ErrorKind::MultipleArrayContainsAny,
            QueryError::MultipleNotIn { .. } => ErrorKind::MultipleNotIn,
            QueryError::NotInConflict { .. } => ErrorKind::NotInConflict,
            QueryError::MultipleNotEqual { .. } => ErrorKind::MultipleNotEqual,
            QueryError::DocumentIdOrderingConflict { .. } => {
                ErrorKind::DocumentIdOrderingConflict
            }
            QueryError::InvalidLimit { .. } => ErrorKind::InvalidLimit,
            QueryError::InvalidDirection { .. } => ErrorKind::InvalidDirection,
        }
    }

    /// Returns the field path that triggered this error, if any.
    pub fn field(&self) -> Option<&FieldPath> {
        match self {
            QueryError::ValueRequired { field, .. }
            | QueryError::NullOperatorMismatch { field, .. }
            | QueryError::EmptyArrayOperand { field, .. }
            | QueryError::ArrayTooLarge { field, .. }
            | QueryError::MultipleArrayContains { field }
            | QueryError::MultipleArrayContainsAny { field }
            | QueryError::MultipleNotIn { field }
            | QueryError::NotInConflict { field, .. }
            | QueryError::MultipleNotEqual { field } => Some(field),
            QueryError::DocumentIdOrderingConflict { order_field } => Some(order_field),
            _ => None,
        }
    }

    /// Returns the operator that triggered this error, if any.
    pub fn op(&self) -> Option<Op> {
        match self {
            QueryError::ValueRequired { op, .. }
            | QueryError::NullOperatorMismatch { op, .. }
            | QueryError::EmptyArrayOperand { op, .. }
            | QueryError::ArrayTooLarge { op, .. }
            | QueryError::NotInConflict { op, .. } => Some(*op),
            QueryError::MultipleArrayContains { .. } => Some(Op::ArrayContains),
            QueryError::MultipleArrayContainsAny { .. } => Some(Op::ArrayContainsAny),
            QueryError::MultipleNotIn { .. } => Some(Op::NotIn),
            QueryError::MultipleNotEqual { .. } => Some(Op::Ne),
            _ => None,
        }
    }
}

/// Result type for query operations.
pub type Result<T> = std::result::Result<T, QueryError>;
