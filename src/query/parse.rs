use crate::errors::DbError;
use crate::utils::json::{parse_json_to_bson, parse_json_to_bson_document};
use bson::{Bson, Document};

use super::types::{
    FieldCondition, FieldOperator, MAX_IN_SET, MAX_WHERE_DEPTH, OperatorValue, OrderByInput,
    SelectInput, SortOrder, WhereClause, WhereInput,
};

const AND: &str = "AND";
const OR: &str = "OR";
const NOT: &str = "NOT";

impl TryFrom<Document> for WhereInput {
    type Error = DbError;
    fn try_from(doc: Document) -> Result<Self, Self::Error> {
        parse_where(doc, 0)
    }
}

fn parse_where(doc: Document, depth: usize) -> Result<WhereInput, DbError> {
    if depth > MAX_WHERE_DEPTH {
        return Err(DbError::InvalidArgument(format!(
            "where nesting exceeds {MAX_WHERE_DEPTH} levels"
        )));
    }
    let mut clauses = Vec::with_capacity(doc.len());
    for (key, value) in doc {
        let clause = match key.as_str() {
            AND => WhereClause::And(parse_branches(&key, value, depth)?),
            OR => WhereClause::Or(parse_branches(&key, value, depth)?),
            NOT => WhereClause::Not(parse_branches(&key, value, depth)?),
            _ if is_operator_like(&key) => {
                return Err(DbError::InvalidArgument(format!(
                    "where key {key} names a store operator, not a field"
                )));
            }
            _ => match value {
                Bson::Document(ops) => {
                    WhereClause::Field { field: key, condition: FieldCondition::Operators(parse_ops(ops)?) }
                }
                literal => WhereClause::Field { field: key, condition: FieldCondition::Equals(literal) },
            },
        };
        clauses.push(clause);
    }
    Ok(WhereInput { clauses })
}

/// Field names, or any dotted segment of them, may not start with `$`.
fn is_operator_like(field: &str) -> bool {
    field.split('.').any(|seg| seg.starts_with('$'))
}

/// A logical key takes a list of filters or a single filter.
fn parse_branches(key: &str, value: Bson, depth: usize) -> Result<Vec<WhereInput>, DbError> {
    match value {
        Bson::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Bson::Document(d) => parse_where(d, depth + 1),
                other => Err(DbError::InvalidArgument(format!(
                    "{key} expects filter objects, got {other}"
                ))),
            })
            .collect(),
        Bson::Document(d) => Ok(vec![parse_where(d, depth + 1)?]),
        other => Err(DbError::InvalidArgument(format!("{key} expects a filter or a list, got {other}"))),
    }
}

fn parse_ops(ops: Document) -> Result<Vec<(FieldOperator, OperatorValue)>, DbError> {
    let mut out = Vec::with_capacity(ops.len());
    for (name, operand) in ops {
        let op = FieldOperator::from_name(&name);
        if matches!(op, FieldOperator::In | FieldOperator::NotIn)
            && let Bson::Array(values) = &operand
            && values.len() > MAX_IN_SET
        {
            return Err(DbError::InvalidArgument(format!(
                "{name} accepts at most {MAX_IN_SET} values, got {}",
                values.len()
            )));
        }
        let value = match (&op, operand) {
            (FieldOperator::Not, Bson::Document(nested)) => OperatorValue::Nested(parse_ops(nested)?),
            (_, v) => OperatorValue::Value(v),
        };
        out.push((op, value));
    }
    Ok(out)
}

impl TryFrom<Document> for SelectInput {
    type Error = DbError;
    fn try_from(doc: Document) -> Result<Self, Self::Error> {
        let mut fields = Vec::with_capacity(doc.len());
        for (k, v) in doc {
            match v {
                Bson::Boolean(b) => fields.push((k, b)),
                other => {
                    return Err(DbError::InvalidArgument(format!(
                        "select.{k} must be a boolean, got {other}"
                    )));
                }
            }
        }
        Ok(Self { fields })
    }
}

impl TryFrom<Bson> for OrderByInput {
    type Error = DbError;
    fn try_from(value: Bson) -> Result<Self, Self::Error> {
        let mut keys = Vec::new();
        match value {
            Bson::Document(d) => push_order_keys(d, &mut keys)?,
            Bson::Array(items) => {
                for item in items {
                    match item {
                        Bson::Document(d) => push_order_keys(d, &mut keys)?,
                        other => {
                            return Err(DbError::InvalidArgument(format!(
                                "orderBy entries must be objects, got {other}"
                            )));
                        }
                    }
                }
            }
            other => {
                return Err(DbError::InvalidArgument(format!(
                    "orderBy must be an object or a list of objects, got {other}"
                )));
            }
        }
        Ok(Self { keys })
    }
}

fn push_order_keys(doc: Document, keys: &mut Vec<(String, SortOrder)>) -> Result<(), DbError> {
    for (field, dir) in doc {
        let order = match &dir {
            Bson::String(s) if s.eq_ignore_ascii_case("asc") => SortOrder::Asc,
            Bson::String(s) if s.eq_ignore_ascii_case("desc") => SortOrder::Desc,
            other => {
                return Err(DbError::InvalidArgument(format!(
                    "orderBy.{field} must be \"asc\" or \"desc\", got {other}"
                )));
            }
        };
        keys.push((field, order));
    }
    Ok(())
}

fn malformed(what: &str, e: DbError) -> DbError {
    match e {
        DbError::InvalidArgument(msg) => DbError::InvalidArgument(format!("malformed {what}: {msg}")),
        other => other,
    }
}

/// # Errors
/// Returns `InvalidArgument` if the text is not a JSON object or breaks the `where` grammar.
pub fn parse_where_json(json: &str) -> Result<WhereInput, DbError> {
    let doc = parse_json_to_bson_document(json).map_err(|e| malformed("where", e))?;
    WhereInput::try_from(doc)
}

/// # Errors
/// Returns `InvalidArgument` if the text is not a JSON object of booleans.
pub fn parse_select_json(json: &str) -> Result<SelectInput, DbError> {
    let doc = parse_json_to_bson_document(json).map_err(|e| malformed("select", e))?;
    SelectInput::try_from(doc)
}

/// # Errors
/// Returns `InvalidArgument` if the text is not an ordering object or list of them.
pub fn parse_order_by_json(json: &str) -> Result<OrderByInput, DbError> {
    let value = parse_json_to_bson(json).map_err(|e| malformed("orderBy", e))?;
    OrderByInput::try_from(value)
}
