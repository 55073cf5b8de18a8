//! Quarry - composition and admission checks for document-store queries.
//!
//! Quarry builds structured query filters (field comparisons combined with
//! AND / OR) and rejects, before anything reaches the network, every
//! combination the backend cannot execute. It supports:
//!
//! - Field paths as dotted strings, explicit segments, or the document identity
//! - Ten operators: `==`, `!=`, `<`, `<=`, `>`, `>=`, `array-contains`,
//!   `array-contains-any`, `in`, `not-in`
//! - Arbitrarily nested AND / OR groups
//! - Tree-wide rules checked on every change, at any nesting depth
//! - Orderings and limits, with ordering re-checked against the filters
//!
//! # Quick Start
//!
//! ```rust
//! use quarry::{Query, Filter, Dir, ErrorKind, FieldPath};
//!
//! let query = Query::new()
//!     .where_field("state", "==", "CA").unwrap()
//!     .where_field("tags", "array-contains", "coastal").unwrap()
//!     .or([
//!         Filter::compare("population", ">", 1_000_000i64).unwrap(),
//!         Filter::compare("capital", "==", true).unwrap(),
//!     ]).unwrap()
//!     .order_by("population", Dir::Desc).unwrap()
//!     .limit(10).unwrap();
//!
//! assert_eq!(query.comparisons().count(), 4);
//!
//! // Only one array-contains filter may appear anywhere in the tree.
//! let err = query.where_field("tags", "array-contains", "sunny").unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::MultipleArrayContains);
//!
//! // Filtering on the document identity pins the first ordering to it.
//! let err = Query::new()
//!     .where_field(FieldPath::document_id(), "==", "cities/SF").unwrap()
//!     .order_by("population", Dir::Asc)
//!     .unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::DocumentIdOrderingConflict);
//! ```
//!
//! # Checks
//!
//! Checks on a single comparison run when it is built:
//!
//! | Check | Error |
//! |-------|-------|
//! | path has no empty segment | `InvalidFieldPath` |
//! | operator token is known | `OperatorInvalid` |
//! | operand supplied | `ValueRequired` |
//! | null only with `==` / `!=` | `NullOperatorMismatch` |
//! | `in` / `not-in` / `array-contains-any` take 1..=10 elements | `EmptyArrayOperand`, `ArrayTooLarge` |
//!
//! Checks on the whole tree run on every change to the query, in this order
//! (see [`validate`]):
//!
//! | Rule | Error |
//! |------|-------|
//! | one `array-contains` | `MultipleArrayContains` |
//! | one `array-contains-any` | `MultipleArrayContainsAny` |
//! | one `not-in` | `MultipleNotIn` |
//! | `not-in` excludes `!=`, `in`, `array-contains-any` | `NotInConflict` |
//! | one `!=` | `MultipleNotEqual` |
//! | document-identity filter needs first ordering on the identity | `DocumentIdOrderingConflict` |
//!
//! # Immutability
//!
//! Builder methods take `&self` and return a new [`Query`]. A rejected change
//! returns an error and leaves the original query as it was, so callers can
//! try a change and fall back to what they had.

mod constraint;
mod error;
mod field;
mod filter;
mod op;
mod ordering;
mod query;
mod transport;
mod validate;
mod value;

// Re-export public API
pub use constraint::Constraint;
pub use error::{ErrorKind, QueryError, Result};
pub use field::{FieldPath, IntoFieldPath, DOCUMENT_ID_NAME};
pub use filter::{Comparison, Comparisons, Composite, Conjunction, Filter, MAX_LIST_OPERAND};
pub use op::Op;
pub use ordering::{Dir, OrderBy};
pub use query::Query;
pub use transport::Transport;
pub use validate::validate;
pub use value::{DocumentRef, Number, Value};
