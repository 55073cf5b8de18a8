//! Rendering check results.

use anyhow::Result;
use quarry::{Query, QueryError};
use serde::Serialize;

use crate::config::OutputFormat;

/// Outcome of checking one query document.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Report<'a> {
    Accepted {
        comparisons: usize,
        query: &'a Query,
    },
    Rejected {
        kind: String,
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        field: Option<String>,
    },
}

impl<'a> Report<'a> {
    pub fn new(outcome: &'a quarry::Result<Query>) -> Self {
        match outcome {
            Ok(query) => Report::Accepted {
                comparisons: query.comparisons().count(),
                query,
            },
            Err(err) => Report::rejected(err),
        }
    }

    fn rejected(err: &QueryError) -> Self {
        Report::Rejected {
            kind: format!("{:?}", err.kind()),
            message: err.to_string(),
            field: err.field().map(ToString::to_string),
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Report::Accepted { .. })
    }

    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(self)? + "\n"),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(self)?),
            OutputFormat::Text => Ok(self.render_text()),
        }
    }

    fn render_text(&self) -> String {
        match self {
            Report::Accepted { query, .. } => {
                let mut out = String::from("ok\n");
                if let Some(filter) = query.filter() {
                    out.push_str(&format!("  where:    {filter}\n"));
                }
                if !query.orderings().is_empty() {
                    let orderings: Vec<String> =
                        query.orderings().iter().map(ToString::to_string).collect();
                    out.push_str(&format!("  order by: {}\n", orderings.join(", ")));
                }
                if let Some(limit) = query.get_limit() {
                    out.push_str(&format!("  limit:    {limit}\n"));
                }
                out
            }
            Report::Rejected { kind, message, .. } => format!("rejected ({kind}): {message}\n"),
        }
    }
}
