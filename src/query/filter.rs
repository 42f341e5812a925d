use bson::{Bson, Document, doc};

use super::types::{FieldCondition, FieldOperator, OperatorValue, WhereClause, WhereInput};
use crate::identity::native_key;

/// Compile a relational-style `where` into a native filter document.
///
/// `None` and empty inputs compile to `{}`, which matches every document. Operators the
/// compiler does not recognize are dropped; a field left with no operators adds no
/// constraint. `NOT` compiles to `$nor`: a document matches when it matches none of the
/// listed filters.
#[must_use]
pub fn compile_filter(input: Option<&WhereInput>) -> Document {
    input.map_or_else(Document::new, compile_where)
}

fn compile_where(input: &WhereInput) -> Document {
    let mut out = Document::new();
    let mut overflow: Vec<Bson> = Vec::new();
    for clause in &input.clauses {
        for (key, value) in compile_clause(clause) {
            if out.contains_key(&key) {
                overflow.push(Bson::Document(doc! { key: value }));
            } else {
                out.insert(key, value);
            }
        }
    }
    if !overflow.is_empty() {
        match out.get_mut("$and") {
            Some(Bson::Array(existing)) => existing.extend(overflow),
            _ => {
                out.insert("$and", overflow);
            }
        }
    }
    out
}

fn compile_branches(branches: &[WhereInput]) -> Bson {
    Bson::Array(branches.iter().map(|b| Bson::Document(compile_where(b))).collect())
}

fn compile_clause(clause: &WhereClause) -> Vec<(String, Bson)> {
    match clause {
        WhereClause::And(xs) if xs.is_empty() => Vec::new(),
        WhereClause::And(xs) => vec![("$and".to_string(), compile_branches(xs))],
        // No alternative can match.
        WhereClause::Or(xs) if xs.is_empty() => {
            vec![("$nor".to_string(), Bson::Array(vec![Bson::Document(Document::new())]))]
        }
        WhereClause::Or(xs) => vec![("$or".to_string(), compile_branches(xs))],
        WhereClause::Not(xs) if xs.is_empty() => Vec::new(),
        WhereClause::Not(xs) => vec![("$nor".to_string(), compile_branches(xs))],
        WhereClause::Field { field, condition: FieldCondition::Equals(v) } => {
            vec![(native_key(field).to_string(), v.clone())]
        }
        WhereClause::Field { field, condition: FieldCondition::Operators(ops) } => {
            compile_field(native_key(field), ops)
        }
    }
}

fn compile_field(key: &str, ops: &[(FieldOperator, OperatorValue)]) -> Vec<(String, Bson)> {
    let mut doc_level = Vec::new();
    let mut pairs: Vec<(String, Bson)> = field_conjuncts(key, ops, &mut doc_level)
        .into_iter()
        .map(|c| (key.to_string(), Bson::Document(c)))
        .collect();
    pairs.extend(doc_level);
    pairs
}

/// Translate one operator mapping into field-level conjuncts. The first conjunct carries
/// every comparison and the first pattern; each further pattern gets its own, since a
/// field-level document holds a single `$regex`.
fn field_conjuncts(
    key: &str,
    ops: &[(FieldOperator, OperatorValue)],
    doc_level: &mut Vec<(String, Bson)>,
) -> Vec<Document> {
    let mut head = Document::new();
    let mut rest = Vec::new();
    for (op, operand) in ops {
        let value = match operand {
            OperatorValue::Value(v) => v,
            OperatorValue::Nested(inner) => {
                if *op == FieldOperator::Not {
                    negate_nested(key, inner, &mut head, doc_level);
                } else {
                    log::debug!("operator {op:?} on {key} does not take a nested mapping; dropped");
                }
                continue;
            }
        };
        match op {
            FieldOperator::Equals => {
                head.insert("$eq", value.clone());
            }
            FieldOperator::Not => {
                head.insert("$ne", value.clone());
            }
            FieldOperator::In => {
                head.insert("$in", as_list(value));
            }
            FieldOperator::NotIn => {
                head.insert("$nin", as_list(value));
            }
            FieldOperator::Lt => {
                head.insert("$lt", value.clone());
            }
            FieldOperator::Lte => {
                head.insert("$lte", value.clone());
            }
            FieldOperator::Gt => {
                head.insert("$gt", value.clone());
            }
            FieldOperator::Gte => {
                head.insert("$gte", value.clone());
            }
            FieldOperator::Contains | FieldOperator::StartsWith | FieldOperator::EndsWith => {
                let pattern = pattern_for(op, value);
                if head.contains_key("$regex") {
                    rest.push(pattern);
                } else {
                    for (k, v) in pattern {
                        head.insert(k, v);
                    }
                }
            }
            FieldOperator::Unrecognized(name) => {
                log::debug!("dropping unrecognized operator {name} on {key}");
            }
        }
    }
    let mut out = Vec::with_capacity(1 + rest.len());
    if !head.is_empty() {
        out.push(head);
    }
    out.extend(rest);
    out
}

fn negate_nested(
    key: &str,
    inner: &[(FieldOperator, OperatorValue)],
    head: &mut Document,
    doc_level: &mut Vec<(String, Bson)>,
) {
    let mut conjuncts = field_conjuncts(key, inner, doc_level);
    match conjuncts.len() {
        0 => {}
        1 => {
            head.insert("$not", conjuncts.remove(0));
        }
        _ => {
            let all: Vec<Bson> =
                conjuncts.into_iter().map(|c| Bson::Document(doc! { key: c })).collect();
            doc_level.push(("$nor".to_string(), Bson::Array(vec![Bson::Document(doc! { "$and": all })])));
        }
    }
}

fn as_list(v: &Bson) -> Bson {
    match v {
        Bson::Array(_) => v.clone(),
        other => Bson::Array(vec![other.clone()]),
    }
}

/// Case-insensitive pattern matching the operand literally.
fn pattern_for(op: &FieldOperator, operand: &Bson) -> Document {
    let text = match operand {
        Bson::String(s) => s.clone(),
        other => other.to_string(),
    };
    let escaped = regex::escape(&text);
    let pattern = match op {
        FieldOperator::StartsWith => format!("^{escaped}"),
        FieldOperator::EndsWith => format!("{escaped}$"),
        _ => escaped,
    };
    doc! { "$regex": pattern, "$options": "i" }
}
