//! Query documents read from disk.
//!
//! A document lists filters, orderings and a limit:
//!
//! ```yaml
//! where:
//!   - { field: population, op: ">", value: 100000 }
//!   - or:
//!       - { field: state, op: "==", value: CA }
//!       - { field: state, op: "==", value: WA }
//! order_by:
//!   - { field: population, dir: desc }
//! limit: 10
//! ```
//!
//! YAML is a superset of JSON, so the same parser reads both. Syntax
//! problems surface as [`anyhow::Error`]; a well-formed document whose query
//! the backend would refuse surfaces as [`quarry::QueryError`] from
//! [`QueryDocument::build`].

use std::path::Path;

use anyhow::{Context, Result};
use quarry::{Constraint, Dir, FieldPath, Filter, Number, Query, Value, DOCUMENT_ID_NAME};
use serde::{Deserialize, Deserializer};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QueryDocument {
    #[serde(default, rename = "where")]
    pub filters: Vec<FilterDoc>,
    #[serde(default)]
    pub order_by: Vec<OrderDoc>,
    #[serde(default)]
    pub limit: Option<serde_json::Number>,
}

/// One entry of a `where` list: a comparison or a nested group.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FilterDoc {
    Or(OrDoc),
    And(AndDoc),
    Compare(CompareDoc),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrDoc {
    pub or: Vec<FilterDoc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AndDoc {
    pub and: Vec<FilterDoc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompareDoc {
    pub field: FieldDoc,
    pub op: String,
    /// `None` when the key is absent; an explicit `null` is `Some(Null)`.
    #[serde(default, deserialize_with = "present")]
    pub value: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderDoc {
    pub field: FieldDoc,
    #[serde(default)]
    pub dir: Option<String>,
}

/// A field given as a dotted string, `__name__`, or a list of segments.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FieldDoc {
    Dotted(String),
    Segments(Vec<String>),
}

fn present<'de, D>(deserializer: D) -> std::result::Result<Option<serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    serde_json::Value::deserialize(deserializer).map(Some)
}

impl QueryDocument {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read query document: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse query document: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Builds the query, applying filters, then orderings, then the limit.
    pub fn build(&self) -> quarry::Result<Query> {
        let mut constraints = Vec::with_capacity(self.filters.len() + self.order_by.len() + 1);
        for filter in &self.filters {
            constraints.push(Constraint::Where(filter.to_filter()?));
        }
        for order in &self.order_by {
            let dir: Dir = match &order.dir {
                Some(token) => token.parse()?,
                None => Dir::Asc,
            };
            constraints.push(Constraint::order_by(order.field.to_path()?, dir)?);
        }
        if let Some(limit) = &self.limit {
            constraints.push(Constraint::limit(to_number(limit)));
        }
        Query::new().apply(constraints)
    }
}

impl FilterDoc {
    pub fn to_filter(&self) -> quarry::Result<Filter> {
        match self {
            FilterDoc::Or(group) => Filter::or(children(&group.or)?),
            FilterDoc::And(group) => Filter::and(children(&group.and)?),
            FilterDoc::Compare(cmp) => Filter::comparison(
                cmp.field.to_path()?,
                &cmp.op,
                cmp.value.clone().map(Value::from),
            ),
        }
    }
}

fn children(docs: &[FilterDoc]) -> quarry::Result<Vec<Filter>> {
    docs.iter().map(FilterDoc::to_filter).collect()
}

impl FieldDoc {
    pub fn to_path(&self) -> quarry::Result<FieldPath> {
        match self {
            FieldDoc::Dotted(s) if s == DOCUMENT_ID_NAME => Ok(FieldPath::document_id()),
            FieldDoc::Dotted(s) => FieldPath::parse(s),
            FieldDoc::Segments(segments) => Ok(FieldPath::from_segments(segments.iter())),
        }
    }
}

fn to_number(n: &serde_json::Number) -> Number {
    if let Some(u) = n.as_u64() {
        Number::U64(u)
    } else if let Some(i) = n.as_i64() {
        Number::I64(i)
    } else {
        Number::F64(n.as_f64().unwrap_or(f64::NAN))
    }
}
