//! Relational-style query compiler.
//!
//! Translates `where` / `select` / `orderBy` inputs into the native filter, projection and
//! sort documents a [`crate::store::DocumentStore`] executes. Every function here is pure.

mod filter;
mod parse;
mod projection;
mod sort;
mod types;

pub use filter::compile_filter;
pub use parse::{parse_order_by_json, parse_select_json, parse_where_json};
pub use projection::compile_projection;
pub use sort::compile_sort;
pub use types::{
    FieldCondition, FieldOperator, OperatorValue, OrderByInput, SelectInput, SortOrder,
    UnknownOperatorPolicy, WhereClause, WhereInput,
};

/// Native query parts for one request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledQuery {
    pub filter: bson::Document,
    pub projection: Option<bson::Document>,
    pub sort: Option<bson::Document>,
}

/// Compile all three parts of a read request.
#[must_use]
pub fn compile_query(
    filter: Option<&WhereInput>,
    select: Option<&SelectInput>,
    order_by: Option<&OrderByInput>,
) -> CompiledQuery {
    CompiledQuery {
        filter: compile_filter(filter),
        projection: compile_projection(select),
        sort: compile_sort(order_by),
    }
}
