//! Tree-wide admission rules.
//!
//! [`validate`] flattens a filter tree into its comparisons and checks the
//! rules that depend on the whole tree rather than on a single node. Rules
//! run in a fixed order and the first violation is reported:
//!
//! 1. at most one `array-contains`
//! 2. at most one `array-contains-any`
//! 3. at most one `not-in`
//! 4. `not-in` excludes `!=`, `in` and `array-contains-any`
//! 5. at most one `!=`
//! 6. a document-identity filter requires the first ordering, if any, to be
//!    on the document identity as well
//!
//! Range operators (`<`, `<=`, `>`, `>=`) are unrestricted.
//!
//! Validation is a pure function of its inputs; nothing is cached between
//! calls.

use crate::error::{QueryError, Result};
use crate::field::FieldPath;
use crate::filter::Filter;
use crate::op::Op;
use crate::ordering::OrderBy;

/// Checks a filter tree together with the query's orderings.
///
/// `filter` is `None` for a query without constraints, in which case only
/// the orderings are inspected (and always pass).
///
/// # Example
///
/// ```
/// use quarry::{validate, Filter, OrderBy, ErrorKind};
///
/// let filter = Filter::and([
///     Filter::compare("tags", "array-contains", "a").unwrap(),
///     Filter::or([
///         Filter::compare("x", "==", 1i64).unwrap(),
///         Filter::compare("tags", "array-contains", "b").unwrap(),
///     ])
///     .unwrap(),
/// ])
/// .unwrap();
///
/// let err = validate(Some(&filter), &[]).unwrap_err();
/// assert_eq!(err.kind(), ErrorKind::MultipleArrayContains);
/// ```
pub fn validate(filter: Option<&Filter>, orderings: &[OrderBy]) -> Result<()> {
    let Some(filter) = filter else {
        return Ok(());
    };

    let pairs: Vec<(Op, &FieldPath)> = filter
        .comparisons()
        .map(|cmp| (cmp.op(), cmp.field()))
        .collect();

    at_most_one(&pairs, Op::ArrayContains, |field| {
        QueryError::MultipleArrayContains { field }
    })?;
    at_most_one(&pairs, Op::ArrayContainsAny, |field| {
        QueryError::MultipleArrayContainsAny { field }
    })?;
    at_most_one(&pairs, Op::NotIn, |field| QueryError::MultipleNotIn { field })?;
    not_in_exclusive(&pairs)?;
    at_most_one(&pairs, Op::Ne, |field| QueryError::MultipleNotEqual { field })?;
    document_id_ordering(&pairs, orderings)?;

    Ok(())
}

/// Fails with the error built from the second occurrence of `op`.
fn at_most_one<F>(pairs: &[(Op, &FieldPath)], op: Op, err: F) -> Result<()>
where
    F: FnOnce(FieldPath) -> QueryError,
{
    match pairs.iter().filter(|(o, _)| *o == op).nth(1) {
        Some((_, field)) => Err(err((*field).clone())),
        None => Ok(()),
    }
}

fn not_in_exclusive(pairs: &[(Op, &FieldPath)]) -> Result<()> {
    if !pairs.iter().any(|(op, _)| *op == Op::NotIn) {
        return Ok(());
    }
    let conflict = pairs
        .iter()
        .find(|(op, _)| matches!(op, Op::Ne | Op::In | Op::ArrayContainsAny));
    match conflict {
        Some((op, field)) => Err(QueryError::NotInConflict {
            field: (*field).clone(),
            op: *op,
        }),
        None => Ok(()),
    }
}

// Only the first ordering is coupled to document-identity filters.
fn document_id_ordering(pairs: &[(Op, &FieldPath)], orderings: &[OrderBy]) -> Result<()> {
    let filters_on_id = pairs.iter().any(|(_, field)| field.is_document_id());
    match orderings.first() {
        Some(first) if filters_on_id && !first.field.is_document_id() => {
            Err(QueryError::DocumentIdOrderingConflict {
                order_field: first.field.clone(),
            })
        }
        _ => Ok(()),
    }
}
