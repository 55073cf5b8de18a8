//! Query builder.
//!
//! The [`Query`] struct accumulates filters, orderings and a limit. Every
//! builder method validates the prospective query and returns it as a new
//! value, leaving the receiver untouched, so a rejected change never
//! disturbs a query the caller already holds.

use serde::Serialize;
use tracing::{debug, trace};

use crate::constraint::Constraint;
use crate::error::{QueryError, Result};
use crate::field::IntoFieldPath;
use crate::filter::{Comparison, Filter};
use crate::ordering::{Dir, OrderBy};
use crate::transport::Transport;
use crate::validate::validate;
use crate::value::{Number, Value};

/// A validated query: filter tree, orderings and limit.
///
/// Top-level `where_field` calls accumulate as AND siblings. An `or(...)`
/// group becomes a single AND sibling; an `and(...)` group is spliced in.
///
/// # Example
///
/// ```
/// use quarry::{Query, Filter, Dir, ErrorKind};
///
/// let base = Query::new()
///     .where_field("state", "==", "CA").unwrap()
///     .or([
///         Filter::compare("population", ">", 1_000_000i64).unwrap(),
///         Filter::compare("capital", "==", true).unwrap(),
///     ]).unwrap()
///     .order_by("population", Dir::Desc).unwrap()
///     .limit(20).unwrap();
///
/// assert_eq!(base.comparisons().count(), 3);
/// assert_eq!(base.get_limit(), Some(20));
///
/// // a rejected change leaves `base` as it was
/// let err = base.where_field("tags", "in", Vec::<i64>::new()).unwrap_err();
/// assert_eq!(err.kind(), ErrorKind::EmptyArrayOperand);
/// assert_eq!(base.comparisons().count(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Query {
    filter: Option<Filter>,
    orderings: Vec<OrderBy>,
    limit: Option<u64>,
}

impl Query {
    /// Creates a new empty query.
    pub fn new() -> Self {
        Query::default()
    }

    // ========================================================================
    // Filters
    // ========================================================================

    /// Adds a comparison as an AND sibling of the existing filters.
    pub fn where_field(
        &self,
        field: impl IntoFieldPath,
        op: &str,
        value: impl Into<Value>,
    ) -> Result<Self> {
        let cmp = Comparison::new(field, op, value).map_err(rejected)?;
        self.where_filter(cmp)
    }

    /// Adds a prebuilt filter as an AND sibling of the existing filters.
    pub fn where_filter(&self, fragment: impl Into<Filter>) -> Result<Self> {
        let fragment = fragment.into();
        let filter = match &self.filter {
            None => fragment,
            Some(current) => current.and_with(fragment),
        };
        self.commit(Query {
            filter: Some(filter),
            ..self.clone()
        })
    }

    /// Adds an AND group. A single filter is added as-is.
    pub fn and(&self, filters: impl IntoIterator<Item = Filter>) -> Result<Self> {
        let group = Filter::and(filters).map_err(rejected)?;
        self.where_filter(group)
    }

    /// Adds an OR group as one AND sibling. A single filter is added as-is.
    pub fn or(&self, filters: impl IntoIterator<Item = Filter>) -> Result<Self> {
        let group = Filter::or(filters).map_err(rejected)?;
        self.where_filter(group)
    }

    // ========================================================================
    // Ordering
    // ========================================================================

    /// Adds an ordering clause.
    ///
    /// Re-checks the existing filters, since an ordering can conflict with a
    /// document-identity filter that was accepted earlier.
    pub fn order_by(&self, field: impl IntoFieldPath, dir: Dir) -> Result<Self> {
        let order = OrderBy::new(field, dir).map_err(rejected)?;
        let mut orderings = self.orderings.clone();
        orderings.push(order);
        self.commit(Query {
            orderings,
            ..self.clone()
        })
    }

    /// Adds an ordering clause with a direction token (`"asc"` / `"desc"`).
    pub fn order_by_str(&self, field: impl IntoFieldPath, dir: &str) -> Result<Self> {
        let dir: Dir = dir.parse().map_err(rejected)?;
        self.order_by(field, dir)
    }

    /// Adds an ascending ordering clause.
    pub fn order_asc(&self, field: impl IntoFieldPath) -> Result<Self> {
        self.order_by(field, Dir::Asc)
    }

    /// Adds a descending ordering clause.
    pub fn order_desc(&self, field: impl IntoFieldPath) -> Result<Self> {
        self.order_by(field, Dir::Desc)
    }

    // ========================================================================
    // Limits
    // ========================================================================

    /// Sets the maximum number of results to return.
    ///
    /// `n` must be a positive integer; floats are accepted only when whole.
    pub fn limit(&self, n: impl Into<Number>) -> Result<Self> {
        let n = n.into();
        let limit = n.as_positive_integer().ok_or_else(|| {
            rejected(QueryError::InvalidLimit {
                value: n.to_string(),
            })
        })?;
        self.commit(Query {
            limit: Some(limit),
            ..self.clone()
        })
    }

    // ========================================================================
    // Constraint lists
    // ========================================================================

    /// Applies constraints left to right.
    ///
    /// Stops at the first failure; the receiver is unchanged either way.
    pub fn apply(&self, constraints: impl IntoIterator<Item = Constraint>) -> Result<Self> {
        constraints
            .into_iter()
            .try_fold(self.clone(), |query, constraint| match constraint {
                Constraint::Where(filter) => query.where_filter(filter),
                Constraint::OrderBy(order) => query.order_by(order.field, order.dir),
                Constraint::Limit(n) => query.limit(n),
            })
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// Returns the filter tree, if any constraint was added.
    pub fn filter(&self) -> Option<&Filter> {
        self.filter.as_ref()
    }

    /// Returns the ordering clauses.
    pub fn orderings(&self) -> &[OrderBy] {
        &self.orderings
    }

    /// Returns the limit, if set.
    pub fn get_limit(&self) -> Option<u64> {
        self.limit
    }

    /// Iterates every comparison in the filter tree.
    pub fn comparisons(&self) -> impl Iterator<Item = &Comparison> + '_ {
        self.filter.iter().flat_map(Filter::comparisons)
    }

    /// Returns `true` if this query has no filters.
    pub fn is_empty(&self) -> bool {
        self.filter.is_none()
    }

    // ========================================================================
    // Execution
    // ========================================================================

    /// Hands this query to a transport and returns the documents it yields.
    pub fn get<T: Transport>(
        &self,
        transport: &T,
    ) -> std::result::Result<Vec<T::Document>, T::Error> {
        transport.fetch(self)
    }

    fn commit(&self, candidate: Query) -> Result<Self> {
        validate(candidate.filter.as_ref(), &candidate.orderings).map_err(rejected)?;
        trace!(
            comparisons = candidate.comparisons().count(),
            orderings = candidate.orderings.len(),
            limit = ?candidate.limit,
            "accepted query change"
        );
        Ok(candidate)
    }
}

fn rejected(err: QueryError) -> QueryError {
    debug!(kind = ?err.kind(), error = %err, "rejected query change");
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::field::FieldPath;
    use crate::filter::Conjunction;

    #[test]
    fn empty_query() {
        let query = Query::new();
        assert!(query.is_empty());
        assert!(query.filter().is_none());
        assert!(query.orderings().is_empty());
        assert_eq!(query.get_limit(), None);
        assert_eq!(query.comparisons().count(), 0);
    }

    #[test]
    fn single_where_is_bare_comparison() {
        let query = Query::new().where_field("a", "==", 1i64).unwrap();
        assert!(query.filter().unwrap().as_comparison().is_some());
    }

    #[test]
    fn where_calls_accumulate_under_and() {
        let query = Query::new()
            .where_field("a", "==", 1i64)
            .unwrap()
            .where_field("b", ">", 2i64)
            .unwrap()
            .where_field("c", "<", 3i64)
            .unwrap();

        let top = query.filter().unwrap().as_composite().unwrap();
        assert_eq!(top.kind(), Conjunction::And);
        assert_eq!(top.children().len(), 3);
    }

    #[test]
    fn or_group_is_one_sibling() {
        let query = Query::new()
            .where_field("a", "==", 1i64)
            .unwrap()
            .or([
                Filter::compare("b", "==", 1i64).unwrap(),
                Filter::compare("c", "==", 1i64).unwrap(),
            ])
            .unwrap();

        let top = query.filter().unwrap().as_composite().unwrap();
        assert_eq!(top.kind(), Conjunction::And);
        assert_eq!(top.children().len(), 2);
        assert_eq!(
            top.children()[1].as_composite().unwrap().kind(),
            Conjunction::Or
        );
    }

    #[test]
    fn single_child_groups_match_bare_where() {
        let bare = Query::new().where_field("baz", "==", "baz").unwrap();
        let via_and = Query::new()
            .and([Filter::compare("baz", "==", "baz").unwrap()])
            .unwrap();
        let via_or = Query::new()
            .or([Filter::compare("baz", "==", "baz").unwrap()])
            .unwrap();
        assert_eq!(bare, via_and);
        assert_eq!(bare, via_or);
    }

    #[test]
    fn rejected_change_keeps_prior_state() {
        let base = Query::new()
            .where_field("tags", "array-contains", "a")
            .unwrap();
        let err = base
            .where_field("tags", "array-contains", "b")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MultipleArrayContains);
        assert_eq!(base.comparisons().count(), 1);

        // base is still usable
        let next = base.where_field("x", "==", 1i64).unwrap();
        assert_eq!(next.comparisons().count(), 2);
    }

    #[test]
    fn construction_errors_propagate() {
        let query = Query::new();
        assert_eq!(
            query.where_field(".foo", "==", 1i64).unwrap_err().kind(),
            ErrorKind::InvalidFieldPath
        );
        assert_eq!(
            query.where_field("foo", "!", 1i64).unwrap_err().kind(),
            ErrorKind::OperatorInvalid
        );
        assert_eq!(
            query.and(Vec::new()).unwrap_err().kind(),
            ErrorKind::EmptyComposite
        );
    }

    #[test]
    fn order_by_revalidates_filters() {
        let query = Query::new()
            .where_field(FieldPath::document_id(), "==", vec!["document-id"])
            .unwrap();

        let err = query.order_by("otherField", Dir::Asc).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DocumentIdOrderingConflict);
        assert!(query.orderings().is_empty());

        let ok = query.order_asc(FieldPath::document_id()).unwrap();
        assert_eq!(ok.orderings().len(), 1);
    }

    #[test]
    fn filter_added_after_ordering_is_checked() {
        let query = Query::new().order_desc("population").unwrap();
        let err = query
            .where_field(FieldPath::document_id(), ">", "a")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DocumentIdOrderingConflict);
    }

    #[test]
    fn order_by_str_parses_direction() {
        let query = Query::new().order_by_str("a", "desc").unwrap();
        assert_eq!(query.orderings()[0].dir, Dir::Desc);
        assert_eq!(
            query.order_by_str("a", "up").unwrap_err().kind(),
            ErrorKind::InvalidDirection
        );
    }

    #[test]
    fn limit_validation() {
        let query = Query::new();
        assert_eq!(query.limit(123).unwrap().get_limit(), Some(123));
        assert_eq!(query.limit(10.0).unwrap().get_limit(), Some(10));
        for bad in [Number::I64(-1), Number::I64(0), Number::F64(1.5), Number::F64(f64::NAN)] {
            let err = query.limit(bad).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidLimit);
            assert!(err
                .to_string()
                .contains("'limit' must be a positive integer value"));
        }
    }

    #[test]
    fn limit_does_not_touch_filters() {
        let query = Query::new()
            .where_field("a", "!=", 1i64)
            .unwrap()
            .limit(5)
            .unwrap();
        assert_eq!(query.comparisons().count(), 1);
        assert_eq!(query.limit(7).unwrap().get_limit(), Some(7));
    }

    #[test]
    fn apply_constraint_list() {
        let query = Query::new()
            .apply([
                Constraint::filter("a", "==", 1i64).unwrap(),
                Constraint::order_by("a", Dir::Desc).unwrap(),
                Constraint::limit(3),
            ])
            .unwrap();
        assert_eq!(query.comparisons().count(), 1);
        assert_eq!(query.orderings().len(), 1);
        assert_eq!(query.get_limit(), Some(3));
    }

    #[test]
    fn apply_stops_at_first_failure() {
        let base = Query::new();
        let err = base
            .apply([
                Constraint::filter("a", "!=", 1i64).unwrap(),
                Constraint::limit(-1),
                Constraint::filter("b", "!=", 1i64).unwrap(),
            ])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidLimit);
        assert!(base.is_empty());
    }

    #[test]
    fn serializes_validated_triple() {
        let query = Query::new()
            .where_field("a", ">", 1i64)
            .unwrap()
            .order_asc("a")
            .unwrap()
            .limit(2)
            .unwrap();
        let json = serde_json::to_value(&query).unwrap();
        assert_eq!(json["limit"], 2);
        assert_eq!(json["orderings"][0]["dir"], "asc");
        assert_eq!(json["filter"]["comparison"]["op"], ">");
    }

    /// Runs `f` under a subscriber that records formatted events.
    fn captured_logs(f: impl FnOnce()) -> String {
        use std::io;
        use std::sync::{Arc, Mutex};

        #[derive(Clone, Default)]
        struct Buffer(Arc<Mutex<Vec<u8>>>);

        impl io::Write for Buffer {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                self.0.lock().unwrap().extend_from_slice(buf);
                Ok(buf.len())
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let buffer = Buffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f);

        let bytes = buffer.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn every_accepted_change_is_traced() {
        let logs = captured_logs(|| {
            Query::new()
                .where_field("a", "==", 1i64)
                .unwrap()
                .order_asc("a")
                .unwrap()
                .limit(5)
                .unwrap();
        });
        let accepted: Vec<&str> = logs
            .lines()
            .filter(|line| line.contains("accepted query change"))
            .collect();
        assert_eq!(accepted.len(), 3, "{logs}");
        assert!(accepted[2].contains("limit=Some(5)"), "{logs}");
    }

    #[test]
    fn rejected_limit_is_logged_not_traced() {
        let logs = captured_logs(|| {
            Query::new().limit(0).unwrap_err();
        });
        assert!(logs.contains("rejected query change"), "{logs}");
        assert!(logs.contains("InvalidLimit"), "{logs}");
        assert!(!logs.contains("accepted query change"), "{logs}");
    }

    #[test]
    fn snapshots_are_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Query>();
    }
}
