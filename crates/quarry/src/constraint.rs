//! Constraint values for list-style query composition.
//!
//! A [`Constraint`] is one step of a query built from a list, as in
//! `query.apply([filter(..), order_by(..), limit(..)])`. Filters and
//! orderings are checked when the constraint is built; tree-wide rules run
//! when [`Query::apply`](crate::Query::apply) merges them.

use crate::error::Result;
use crate::field::IntoFieldPath;
use crate::filter::Filter;
use crate::ordering::{Dir, OrderBy};
use crate::value::{Number, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// A filter merged as an AND sibling.
    Where(Filter),
    /// An ordering clause appended to the orderings.
    OrderBy(OrderBy),
    /// A result limit, checked when applied.
    Limit(Number),
}

impl Constraint {
    /// A single comparison.
    pub fn filter(field: impl IntoFieldPath, op: &str, value: impl Into<Value>) -> Result<Self> {
        Filter::compare(field, op, value).map(Constraint::Where)
    }

    /// An AND group of filters.
    pub fn and(filters: impl IntoIterator<Item = Filter>) -> Result<Self> {
        Filter::and(filters).map(Constraint::Where)
    }

    /// An OR group of filters.
    pub fn or(filters: impl IntoIterator<Item = Filter>) -> Result<Self> {
        Filter::or(filters).map(Constraint::Where)
    }

    pub fn order_by(field: impl IntoFieldPath, dir: Dir) -> Result<Self> {
        OrderBy::new(field, dir).map(Constraint::OrderBy)
    }

    pub fn limit(n: impl Into<Number>) -> Self {
        Constraint::Limit(n.into())
    }
}

impl From<Filter> for Constraint {
    fn from(filter: Filter) -> Self {
        Constraint::Where(filter)
    }
}

impl From<OrderBy> for Constraint {
    fn from(order: OrderBy) -> Self {
        Constraint::OrderBy(order)
    }
}
