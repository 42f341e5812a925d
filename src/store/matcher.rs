//! Evaluation of native filter, sort, projection and update documents over BSON.

use bson::{Bson, Document};
use regex::{Regex, RegexBuilder};
use std::cmp::Ordering;

use crate::errors::StoreError;
use crate::types::NATIVE_ID;

// Safety limits to prevent resource abuse
const MAX_PATH_DEPTH: usize = 32;
const REGEX_SIZE_LIMIT: usize = 1 << 20;

#[derive(Debug, Clone, Copy)]
pub(crate) enum CmpOp {
    Gt,
    Gte,
    Lt,
    Lte,
}

#[derive(Debug, Clone)]
pub(crate) enum Cond {
    Eq(Bson),
    Ne(Bson),
    In(Vec<Bson>),
    Nin(Vec<Bson>),
    Cmp(CmpOp, Bson),
    Exists(bool),
    Regex(Regex),
    Not(Vec<Cond>),
}

/// Parsed form of a native filter document.
#[derive(Debug, Clone)]
pub(crate) enum Filter {
    True,
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Nor(Vec<Filter>),
    Field { path: String, conds: Vec<Cond> },
}

/// # Errors
/// Fails on unknown `$` operators, malformed logical arrays and invalid patterns.
pub(crate) fn parse_filter(doc: &Document) -> Result<Filter, StoreError> {
    let mut parts = Vec::with_capacity(doc.len());
    for (key, value) in doc {
        let part = match key.as_str() {
            "$and" => Filter::And(parse_branches(key, value)?),
            "$or" => Filter::Or(parse_branches(key, value)?),
            "$nor" => Filter::Nor(parse_branches(key, value)?),
            k if k.starts_with('$') => return Err(StoreError::UnsupportedOperator(k.to_string())),
            _ => Filter::Field { path: key.clone(), conds: parse_field(value)? },
        };
        parts.push(part);
    }
    Ok(match parts.len() {
        0 => Filter::True,
        1 => parts.remove(0),
        _ => Filter::And(parts),
    })
}

fn parse_branches(key: &str, value: &Bson) -> Result<Vec<Filter>, StoreError> {
    let Bson::Array(items) = value else {
        return Err(StoreError::BadFilter(format!("{key} must be an array")));
    };
    if items.is_empty() {
        return Err(StoreError::BadFilter(format!("{key} must be a nonempty array")));
    }
    items
        .iter()
        .map(|item| match item {
            Bson::Document(d) => parse_filter(d),
            _ => Err(StoreError::BadFilter(format!("{key} entries must be documents"))),
        })
        .collect()
}

fn is_operator_doc(d: &Document) -> bool {
    d.keys().next().is_some_and(|k| k.starts_with('$'))
}

fn parse_field(value: &Bson) -> Result<Vec<Cond>, StoreError> {
    match value {
        Bson::Document(d) if is_operator_doc(d) => parse_conds(d),
        literal => Ok(vec![Cond::Eq(literal.clone())]),
    }
}

fn parse_conds(d: &Document) -> Result<Vec<Cond>, StoreError> {
    let mut out = Vec::with_capacity(d.len());
    for (op, operand) in d {
        let cond = match op.as_str() {
            "$eq" => Cond::Eq(operand.clone()),
            "$ne" => Cond::Ne(operand.clone()),
            "$in" => Cond::In(as_array(op, operand)?),
            "$nin" => Cond::Nin(as_array(op, operand)?),
            "$gt" => Cond::Cmp(CmpOp::Gt, operand.clone()),
            "$gte" => Cond::Cmp(CmpOp::Gte, operand.clone()),
            "$lt" => Cond::Cmp(CmpOp::Lt, operand.clone()),
            "$lte" => Cond::Cmp(CmpOp::Lte, operand.clone()),
            "$exists" => Cond::Exists(truthy(operand)),
            "$regex" => Cond::Regex(build_regex(operand, d.get("$options"))?),
            "$options" => continue,
            "$not" => match operand {
                Bson::Document(inner) => Cond::Not(parse_conds(inner)?),
                _ => return Err(StoreError::BadFilter("$not needs an operator document".into())),
            },
            other => return Err(StoreError::UnsupportedOperator(other.to_string())),
        };
        out.push(cond);
    }
    Ok(out)
}

fn as_array(op: &str, v: &Bson) -> Result<Vec<Bson>, StoreError> {
    match v {
        Bson::Array(a) => Ok(a.clone()),
        _ => Err(StoreError::BadFilter(format!("{op} needs an array"))),
    }
}

fn build_regex(pattern: &Bson, options: Option<&Bson>) -> Result<Regex, StoreError> {
    let Bson::String(pattern) = pattern else {
        return Err(StoreError::BadFilter("$regex needs a string".into()));
    };
    let opts = match options {
        Some(Bson::String(s)) => s.as_str(),
        _ => "",
    };
    RegexBuilder::new(pattern)
        .case_insensitive(opts.contains('i'))
        .multi_line(opts.contains('m'))
        .dot_matches_new_line(opts.contains('s'))
        .ignore_whitespace(opts.contains('x'))
        .size_limit(REGEX_SIZE_LIMIT)
        .build()
        .map_err(|e| StoreError::InvalidRegex(e.to_string()))
}

fn truthy(v: &Bson) -> bool {
    match v {
        Bson::Boolean(b) => *b,
        Bson::Null => false,
        other => as_f64(other).is_none_or(|f| f != 0.0),
    }
}

pub(crate) fn eval_filter(doc: &Document, filter: &Filter) -> bool {
    match filter {
        Filter::True => true,
        Filter::And(fs) => fs.iter().all(|f| eval_filter(doc, f)),
        Filter::Or(fs) => fs.iter().any(|f| eval_filter(doc, f)),
        Filter::Nor(fs) => !fs.iter().any(|f| eval_filter(doc, f)),
        Filter::Field { path, conds } => {
            let value = get_path(doc, path);
            conds.iter().all(|c| eval_cond(value, c))
        }
    }
}

fn eval_cond(value: Option<&Bson>, cond: &Cond) -> bool {
    match cond {
        Cond::Eq(x) => matches_eq(value, x),
        Cond::Ne(x) => !matches_eq(value, x),
        Cond::In(xs) => xs.iter().any(|x| matches_eq(value, x)),
        Cond::Nin(xs) => !xs.iter().any(|x| matches_eq(value, x)),
        Cond::Exists(want) => value.is_some() == *want,
        Cond::Cmp(op, x) => value.is_some_and(|v| any_element(v, |e| cmp_matches(e, *op, x))),
        Cond::Regex(re) => value.is_some_and(|v| {
            any_element(v, |e| matches!(e, Bson::String(s) if re.is_match(s)))
        }),
        Cond::Not(inner) => !inner.iter().all(|c| eval_cond(value, c)),
    }
}

/// A missing field equals null; an array field matches if it or any element equals.
fn matches_eq(value: Option<&Bson>, x: &Bson) -> bool {
    match value {
        None => matches!(x, Bson::Null),
        Some(v) => bson_equal(v, x) || matches!(v, Bson::Array(items) if items.iter().any(|e| bson_equal(e, x))),
    }
}

fn any_element(v: &Bson, pred: impl Fn(&Bson) -> bool) -> bool {
    match v {
        Bson::Array(items) => items.iter().any(&pred),
        other => pred(other),
    }
}

fn cmp_matches(v: &Bson, op: CmpOp, x: &Bson) -> bool {
    if !comparable(v, x) {
        return false;
    }
    let c = compare_bson(v, x);
    match op {
        CmpOp::Gt => c == Ordering::Greater,
        CmpOp::Gte => c != Ordering::Less,
        CmpOp::Lt => c == Ordering::Less,
        CmpOp::Lte => c != Ordering::Greater,
    }
}

/// Range operators only compare within a type class.
fn comparable(a: &Bson, b: &Bson) -> bool {
    (as_f64(a).is_some() && as_f64(b).is_some())
        || matches!(
            (a, b),
            (Bson::String(_), Bson::String(_))
                | (Bson::Boolean(_), Bson::Boolean(_))
                | (Bson::DateTime(_), Bson::DateTime(_))
                | (Bson::ObjectId(_), Bson::ObjectId(_))
        )
}

fn as_f64(x: &Bson) -> Option<f64> {
    match x {
        Bson::Int32(i) => Some(f64::from(*i)),
        #[allow(clippy::cast_precision_loss)]
        Bson::Int64(i) => Some(*i as f64),
        Bson::Double(f) => Some(*f),
        Bson::Decimal128(d) => d.to_string().parse::<f64>().ok(),
        _ => None,
    }
}

/// Equality that treats Int32, Int64 and Double of the same value as equal.
pub(crate) fn bson_equal(a: &Bson, b: &Bson) -> bool {
    match (as_f64(a), as_f64(b)) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

fn get_path<'a>(doc: &'a Document, path: &str) -> Option<&'a Bson> {
    if path.is_empty() || path.len() > 1024 {
        return None;
    }
    let mut cur = doc;
    let mut parts = path.split('.').enumerate().peekable();
    while let Some((depth, part)) = parts.next() {
        if depth >= MAX_PATH_DEPTH {
            return None;
        }
        let v = cur.get(part)?;
        if parts.peek().is_none() {
            return Some(v);
        }
        match v {
            Bson::Document(d) => cur = d,
            _ => return None,
        }
    }
    None
}

pub(crate) fn compare_bson(a: &Bson, b: &Bson) -> Ordering {
    if let (Some(x), Some(y)) = (as_f64(a), as_f64(b)) {
        return x.total_cmp(&y);
    }
    match (a, b) {
        (Bson::String(x), Bson::String(y)) => x.cmp(y),
        (Bson::Boolean(x), Bson::Boolean(y)) => x.cmp(y),
        (Bson::DateTime(x), Bson::DateTime(y)) => x.cmp(y),
        (Bson::ObjectId(x), Bson::ObjectId(y)) => x.bytes().cmp(&y.bytes()),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn type_rank(v: &Bson) -> u8 {
    match v {
        Bson::MinKey => 0,
        Bson::Null | Bson::Undefined => 1,
        Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_) | Bson::Decimal128(_) => 2,
        Bson::Symbol(_) | Bson::String(_) => 3,
        Bson::Document(_) => 4,
        Bson::Array(_) => 5,
        Bson::Binary(_) => 6,
        Bson::ObjectId(_) => 7,
        Bson::Boolean(_) => 8,
        Bson::DateTime(_) => 9,
        Bson::Timestamp(_) => 10,
        Bson::RegularExpression(_) => 11,
        Bson::MaxKey => 255,
        _ => 12,
    }
}

/// Order two documents by a native sort document (`{field: 1 | -1}`).
/// Missing fields sort before present ones.
pub(crate) fn compare_docs(a: &Document, b: &Document, sort: &[(String, bool)]) -> Ordering {
    for (field, ascending) in sort {
        let ord = match (get_path(a, field), get_path(b, field)) {
            (Some(x), Some(y)) => compare_bson(x, y),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => Ordering::Equal,
        };
        if ord != Ordering::Equal {
            return if *ascending { ord } else { ord.reverse() };
        }
    }
    Ordering::Equal
}

/// Turn a sort document into `(field, ascending)` pairs.
///
/// # Errors
/// Fails when a direction is not `1` or `-1`.
pub(crate) fn parse_sort(sort: &Document) -> Result<Vec<(String, bool)>, StoreError> {
    sort.iter()
        .map(|(field, dir)| match as_f64(dir) {
            Some(d) if d == 1.0 => Ok((field.clone(), true)),
            Some(d) if d == -1.0 => Ok((field.clone(), false)),
            _ => Err(StoreError::BadFilter(format!("sort direction for {field} must be 1 or -1"))),
        })
        .collect()
}

/// Apply an inclusion projection. `_id` is kept unless explicitly excluded; an empty
/// projection returns the document unchanged.
pub(crate) fn project(doc: &Document, projection: &Document) -> Document {
    if projection.is_empty() {
        return doc.clone();
    }
    let keep_id = projection.get(NATIVE_ID).is_none_or(truthy);
    let included: Vec<&String> =
        projection.iter().filter(|(k, v)| k.as_str() != NATIVE_ID && truthy(v)).map(|(k, _)| k).collect();
    if included.is_empty() {
        // Exclusion of `_id` alone.
        let mut out = doc.clone();
        if !keep_id {
            out.remove(NATIVE_ID);
        }
        return out;
    }
    let mut out = Document::new();
    if keep_id && let Some(id) = doc.get(NATIVE_ID) {
        out.insert(NATIVE_ID, id.clone());
    }
    for path in included {
        if let Some(v) = get_path(doc, path) {
            set_path(&mut out, path, v.clone());
        }
    }
    out
}

fn ensure_subdoc<'a>(root: &'a mut Document, key: &str) -> &'a mut Document {
    if !matches!(root.get(key), Some(Bson::Document(_))) {
        root.insert(key.to_string(), Bson::Document(Document::new()));
    }
    match root.get_mut(key) {
        Some(Bson::Document(d)) => d,
        _ => unreachable!("subdocument inserted above"),
    }
}

fn set_path(root: &mut Document, path: &str, value: Bson) -> bool {
    let mut cur = root;
    let mut iter = path.split('.').peekable();
    while let Some(seg) = iter.next() {
        if iter.peek().is_none() {
            let old = cur.insert(seg.to_string(), value.clone());
            return old.as_ref() != Some(&value);
        }
        cur = ensure_subdoc(cur, seg);
    }
    false
}

/// Apply a `{"$set": {...}}` update in place. Returns whether anything changed.
///
/// # Errors
/// Fails on operators other than `$set` and on attempts to change `_id`.
pub(crate) fn apply_update(doc: &mut Document, update: &Document) -> Result<bool, StoreError> {
    let mut changed = false;
    for (op, fields) in update {
        if op != "$set" {
            return Err(StoreError::UnsupportedOperator(op.clone()));
        }
        let Bson::Document(fields) = fields else {
            return Err(StoreError::BadFilter("$set needs a document".into()));
        };
        for (path, value) in fields {
            if path == NATIVE_ID {
                if doc.get(NATIVE_ID).is_some_and(|cur| !bson_equal(cur, value)) {
                    return Err(StoreError::ImmutableField(NATIVE_ID.to_string()));
                }
                continue;
            }
            changed |= set_path(doc, path, value.clone());
        }
    }
    Ok(changed)
}

/// Check an update document before any document is touched.
///
/// # Errors
/// Same conditions as [`apply_update`] minus the `_id` comparison.
pub(crate) fn validate_update(update: &Document) -> Result<(), StoreError> {
    if update.is_empty() {
        return Err(StoreError::BadFilter("update document is empty".into()));
    }
    for (op, fields) in update {
        if op != "$set" {
            return Err(StoreError::UnsupportedOperator(op.clone()));
        }
        if !matches!(fields, Bson::Document(_)) {
            return Err(StoreError::BadFilter("$set needs a document".into()));
        }
    }
    Ok(())
}
