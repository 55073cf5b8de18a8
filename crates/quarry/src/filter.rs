//! Filter tree: comparisons combined with AND / OR.
//!
//! A [`Filter`] is either a single [`Comparison`] or a [`Composite`] grouping
//! child filters under a [`Conjunction`]. Nodes are immutable once built;
//! composing filters produces new values.
//!
//! Per-node checks (operator token, operand presence, null and list operands)
//! run when a [`Comparison`] is constructed. Checks that need the whole tree
//! live in [`validate`](crate::validate).

use std::fmt;

use serde::Serialize;

use crate::error::{QueryError, Result};
use crate::field::{FieldPath, IntoFieldPath};
use crate::op::Op;
use crate::value::Value;

/// Maximum number of elements in an `in`, `not-in` or `array-contains-any` operand.
pub const MAX_LIST_OPERAND: usize = 10;

/// A single leaf constraint: field, operator, operand.
///
/// # Example
///
/// ```
/// use quarry::{Comparison, Op};
///
/// let cmp = Comparison::new("population", ">", 100_000i64).unwrap();
/// assert_eq!(cmp.op(), Op::Gt);
///
/// let err = Comparison::new("tags", "array-contains", quarry::Value::Null).unwrap_err();
/// assert!(err.to_string().contains("You can only perform equals comparisons on null"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    field: FieldPath,
    op: Op,
    value: Value,
}

impl Comparison {
    /// Builds a comparison from an operator token and an operand.
    pub fn new(field: impl IntoFieldPath, op: &str, value: impl Into<Value>) -> Result<Self> {
        Self::with_operand(field, op, Some(value.into()))
    }

    /// Builds a comparison whose operand may be missing.
    ///
    /// A missing operand is always rejected with
    /// [`QueryError::ValueRequired`]; this entry point exists for callers
    /// whose input can omit it (decoded documents, dynamic front ends).
    pub fn with_operand(
        field: impl IntoFieldPath,
        op: &str,
        value: Option<Value>,
    ) -> Result<Self> {
        let field = field.into_field_path()?;
        let op: Op = op.parse()?;
        Self::checked(field, op, value)
    }

    /// Builds a comparison from an already-parsed operator.
    pub fn from_parts(field: FieldPath, op: Op, value: Value) -> Result<Self> {
        Self::checked(field, op, Some(value))
    }

    fn checked(field: FieldPath, op: Op, value: Option<Value>) -> Result<Self> {
        let Some(value) = value else {
            return Err(QueryError::ValueRequired { field, op });
        };

        if value.is_null() && !op.accepts_null() {
            return Err(QueryError::NullOperatorMismatch { field, op });
        }

        if op.takes_list() {
            match value.as_list() {
                None | Some([]) => return Err(QueryError::EmptyArrayOperand { field, op }),
                Some(items) if items.len() > MAX_LIST_OPERAND => {
                    return Err(QueryError::ArrayTooLarge {
                        field,
                        op,
                        len: items.len(),
                        max: MAX_LIST_OPERAND,
                    });
                }
                Some(_) => {}
            }
        }

        Ok(Comparison { field, op, value })
    }

    /// Returns the compared field.
    pub fn field(&self) -> &FieldPath {
        &self.field
    }

    /// Returns the operator.
    pub fn op(&self) -> Op {
        self.op
    }

    /// Returns the operand.
    pub fn value(&self) -> &Value {
        &self.value
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field, self.op, self.value)
    }
}

/// How a composite combines its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Conjunction {
    And,
    Or,
}

impl Conjunction {
    pub fn as_str(self) -> &'static str {
        match self {
            Conjunction::And => "AND",
            Conjunction::Or => "OR",
        }
    }
}

impl fmt::Display for Conjunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An AND / OR group of at least two child filters.
///
/// Groups of one child are never built; they collapse to the child.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Composite {
    kind: Conjunction,
    children: Vec<Filter>,
}

impl Composite {
    pub fn kind(&self) -> Conjunction {
        self.kind
    }

    pub fn children(&self) -> &[Filter] {
        &self.children
    }
}

/// A filter tree: a single comparison or a composite of filters.
///
/// # Example
///
/// ```
/// use quarry::Filter;
///
/// let filter = Filter::and([
///     Filter::compare("state", "==", "CA").unwrap(),
///     Filter::or([
///         Filter::compare("population", ">", 1_000_000i64).unwrap(),
///         Filter::compare("capital", "==", true).unwrap(),
///     ])
///     .unwrap(),
/// ])
/// .unwrap();
///
/// assert_eq!(filter.comparisons().count(), 3);
/// assert_eq!(
///     filter.to_string(),
///     r#"(state == "CA" AND (population > 1000000 OR capital == true))"#
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Filter {
    Comparison(Comparison),
    Composite(Composite),
}

impl Filter {
    /// Builds a single-comparison filter.
    pub fn compare(field: impl IntoFieldPath, op: &str, value: impl Into<Value>) -> Result<Self> {
        Comparison::new(field, op, value).map(Filter::Comparison)
    }

    /// Builds a single-comparison filter whose operand may be missing.
    pub fn comparison(field: impl IntoFieldPath, op: &str, value: Option<Value>) -> Result<Self> {
        Comparison::with_operand(field, op, value).map(Filter::Comparison)
    }

    /// Groups filters under AND. A single child is returned unchanged.
    pub fn and(children: impl IntoIterator<Item = Filter>) -> Result<Self> {
        Self::group(Conjunction::And, children)
    }

    /// Groups filters under OR. A single child is returned unchanged.
    pub fn or(children: impl IntoIterator<Item = Filter>) -> Result<Self> {
        Self::group(Conjunction::Or, children)
    }

    fn group(kind: Conjunction, children: impl IntoIterator<Item = Filter>) -> Result<Self> {
        let mut children: Vec<Filter> = children.into_iter().collect();
        match children.len() {
            0 => Err(QueryError::EmptyComposite {
                kind: match kind {
                    Conjunction::And => "and",
                    Conjunction::Or => "or",
                },
            }),
            1 => Ok(children.remove(0)),
            _ => Ok(Filter::Composite(Composite { kind, children })),
        }
    }

    /// Appends `fragment` as an AND sibling of this filter.
    ///
    /// A top-level AND absorbs the fragment; an AND fragment is spliced in
    /// rather than nested. Anything else is wrapped in a new AND group.
    pub(crate) fn and_with(&self, fragment: Filter) -> Filter {
        let mut children = match self {
            Filter::Composite(c) if c.kind == Conjunction::And => c.children.clone(),
            other => vec![other.clone()],
        };
        match fragment {
            Filter::Composite(c) if c.kind == Conjunction::And => children.extend(c.children),
            other => children.push(other),
        }
        Filter::Composite(Composite {
            kind: Conjunction::And,
            children,
        })
    }

    /// Returns the comparison if this is a leaf.
    pub fn as_comparison(&self) -> Option<&Comparison> {
        match self {
            Filter::Comparison(cmp) => Some(cmp),
            Filter::Composite(_) => None,
        }
    }

    /// Returns the composite if this is a group.
    pub fn as_composite(&self) -> Option<&Composite> {
        match self {
            Filter::Composite(c) => Some(c),
            Filter::Comparison(_) => None,
        }
    }

    /// Iterates every comparison in the tree, depth first, left to right.
    pub fn comparisons(&self) -> Comparisons<'_> {
        Comparisons { stack: vec![self] }
    }
}

impl From<Comparison> for Filter {
    fn from(cmp: Comparison) -> Self {
        Filter::Comparison(cmp)
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Comparison(cmp) => write!(f, "{cmp}"),
            Filter::Composite(c) => {
                f.write_str("(")?;
                for (i, child) in c.children.iter().enumerate() {
                    if i > 0 {
                        write!(f, " {} ", c.kind)?;
                    }
                    write!(f, "{child}")?;
                }
                f.write_str(")")
            }
        }
    }
}

/// Depth-first iterator over the comparisons of a [`Filter`].
pub struct Comparisons<'a> {
    stack: Vec<&'a Filter>,
}

impl<'a> Iterator for Comparisons<'a> {
    type Item = &'a Comparison;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            match node {
                Filter::Comparison(cmp) => return Some(cmp),
                Filter::Composite(c) => self.stack.extend(c.children.iter().rev()),
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn list(n: usize) -> Value {
        Value::Array((0..n as i64).map(Value::from).collect())
    }

    #[test]
    fn comparison_accessors() {
        let cmp = Comparison::new("foo.bar", ">=", 3i64).unwrap();
        assert_eq!(cmp.field(), &FieldPath::from_segments(["foo", "bar"]));
        assert_eq!(cmp.op(), Op::Gte);
        assert_eq!(cmp.value(), &Value::from(3i64));
        assert_eq!(cmp.to_string(), "foo.bar >= 3");
    }

    #[test]
    fn invalid_path_reported_before_operator() {
        let err = Comparison::new(".foo.bar", "!", 1i64).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidFieldPath);
    }

    #[test]
    fn invalid_operator() {
        let err = Comparison::new("foo.bar", "!", 1i64).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OperatorInvalid);
        assert!(err.to_string().contains("'opStr' is invalid"));
    }

    #[test]
    fn missing_operand() {
        let err = Comparison::with_operand("foo.bar", "array-contains", None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueRequired);
        assert!(err.to_string().contains("'value' argument expected"));

        let err = Comparison::with_operand("foo", "==", None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueRequired);
    }

    #[test]
    fn missing_operand_is_never_null() {
        for op in Op::ALL {
            let err = Filter::comparison("foo", op.as_str(), None).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ValueRequired, "op {op}");
            assert_eq!(err.op(), Some(op));
        }

        // an explicit null is a value, checked on its own terms
        assert!(Filter::comparison("foo", "==", Some(Value::Null)).is_ok());
        let err = Filter::comparison("foo", "array-contains", Some(Value::Null)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NullOperatorMismatch);
    }

    #[test]
    fn null_only_with_equality() {
        assert!(Comparison::new("foo", "==", Value::Null).is_ok());
        assert!(Comparison::new("foo", "!=", Value::Null).is_ok());
        for op in ["<", "<=", ">", ">=", "array-contains", "array-contains-any", "in", "not-in"] {
            let err = Comparison::new("foo", op, Value::Null).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::NullOperatorMismatch, "op {op}");
        }
    }

    #[test]
    fn list_operators_need_non_empty_list() {
        for op in ["in", "not-in", "array-contains-any"] {
            let err = Comparison::new("foo", op, 1i64).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::EmptyArrayOperand, "op {op}");
            assert!(err.to_string().contains("A non-empty array is required"));

            let err = Comparison::new("foo", op, list(0)).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::EmptyArrayOperand, "op {op}");
        }
    }

    #[test]
    fn list_operand_size_limit() {
        for op in ["in", "not-in", "array-contains-any"] {
            assert!(Comparison::new("foo", op, list(MAX_LIST_OPERAND)).is_ok());
            let err = Comparison::new("foo", op, list(MAX_LIST_OPERAND + 1)).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ArrayTooLarge, "op {op}");
        }
    }

    #[test]
    fn non_list_operators_accept_lists() {
        assert!(Comparison::new("foo", "==", list(20)).is_ok());
        assert!(Comparison::new("foo", "array-contains", list(3)).is_ok());
    }

    #[test]
    fn degenerate_groups_collapse() {
        let leaf = Filter::compare("baz", "==", "baz").unwrap();
        assert_eq!(Filter::and([leaf.clone()]).unwrap(), leaf);
        assert_eq!(Filter::or([leaf.clone()]).unwrap(), leaf);
    }

    #[test]
    fn empty_groups_rejected() {
        let err = Filter::and(Vec::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyComposite);
        let err = Filter::or(Vec::new()).unwrap_err();
        assert!(err.to_string().contains("'or'"));
    }

    #[test]
    fn comparisons_walk_all_depths_in_order() {
        let filter = Filter::or([
            Filter::compare("a", "==", 1i64).unwrap(),
            Filter::and([
                Filter::compare("b", "==", 2i64).unwrap(),
                Filter::or([
                    Filter::compare("c", "==", 3i64).unwrap(),
                    Filter::compare("d", "==", 4i64).unwrap(),
                ])
                .unwrap(),
            ])
            .unwrap(),
            Filter::compare("e", "==", 5i64).unwrap(),
        ])
        .unwrap();

        let names: Vec<String> = filter.comparisons().map(|c| c.field().to_string()).collect();
        assert_eq!(names, ["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn and_with_splices_and_groups() {
        let a = Filter::compare("a", "==", 1i64).unwrap();
        let b = Filter::compare("b", "==", 2i64).unwrap();
        let c = Filter::compare("c", "==", 3i64).unwrap();

        let ab = a.and_with(b.clone());
        let abc = ab.and_with(c.clone());
        let top = abc.as_composite().unwrap();
        assert_eq!(top.kind(), Conjunction::And);
        assert_eq!(top.children().len(), 3);

        let spliced = a.and_with(Filter::and([b, c]).unwrap());
        assert_eq!(spliced, abc);
    }

    #[test]
    fn and_with_keeps_or_fragment_as_one_sibling() {
        let a = Filter::compare("a", "==", 1i64).unwrap();
        let or = Filter::or([
            Filter::compare("b", "==", 2i64).unwrap(),
            Filter::compare("c", "==", 3i64).unwrap(),
        ])
        .unwrap();

        let merged = a.and_with(or.clone());
        let top = merged.as_composite().unwrap();
        assert_eq!(top.children().len(), 2);
        assert_eq!(top.children()[1], or);

        // an OR root is wrapped, not extended
        let merged = or.and_with(a.clone());
        let top = merged.as_composite().unwrap();
        assert_eq!(top.kind(), Conjunction::And);
        assert_eq!(top.children(), &[or, a]);
    }

    #[test]
    fn serialize_shape() {
        let filter = Filter::compare("a", "in", vec![1i64]).unwrap();
        let json = serde_json::to_value(&filter).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "comparison": {
                    "field": ["a"],
                    "op": "in",
                    "value": {"arrayValue": [{"numberValue": 1}]}
                }
            })
        );
    }
}
