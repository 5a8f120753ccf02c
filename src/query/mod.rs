//! Query validation subsystem
//!
//! Turns a raw JSON query into a typed [`Query`] bound to a single
//! dataset, or rejects it with a uniform invalid-query error.
//!
//! # Grammar
//!
//! ```text
//! QUERY   := { WHERE, OPTIONS [, TRANSFORMATIONS] }
//! WHERE   := {} | FILTER
//! FILTER  := AND | OR | NOT | IS | EQ | GT | LT
//! OPTIONS := { COLUMNS [, ORDER] }
//! ORDER   := column | { dir: UP|DOWN, keys: [column..] }
//! TRANSFORMATIONS := { GROUP: [key..], APPLY: [{ name: { TOKEN: key } }..] }
//! ```
//!
//! Keys take the form `<datasetId>_<field>`. Every key in a query must
//! refer to the same dataset.

mod ast;
mod errors;
mod filter;
mod keys;
mod transform;
mod validator;

pub use ast::{
    ApplyOp, ApplyRule, Direction, Filter, Key, NumOp, Options, Order, Pattern, PatternKind,
    Query, Transformations, WILDCARD,
};
pub use errors::{QueryError, QueryErrorCode, QueryResult, Severity, INVALID_QUERY_MESSAGE};
pub use filter::{DatasetRefs, FilterValidator};
pub use keys::KeyRegistry;
pub use transform::TransformationValidator;
pub use validator::QueryValidator;
