use bson::Bson;
use serde::{Deserialize, Serialize};

// Safety limits to prevent resource abuse
pub(crate) const MAX_WHERE_DEPTH: usize = 32;
pub(crate) const MAX_IN_SET: usize = 1000;

/// Relational-style filter (`where`). Clauses are implicitly AND-ed.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "bson::Document")]
pub struct WhereInput {
    pub clauses: Vec<WhereClause>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WhereClause {
    And(Vec<WhereInput>),
    Or(Vec<WhereInput>),
    /// Matches when none of the nested filters match.
    Not(Vec<WhereInput>),
    Field { field: String, condition: FieldCondition },
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldCondition {
    /// Implicit equality against a literal.
    Equals(Bson),
    Operators(Vec<(FieldOperator, OperatorValue)>),
}

/// Operand of a field operator. `not` may carry a nested operator mapping.
#[derive(Debug, Clone, PartialEq)]
pub enum OperatorValue {
    Value(Bson),
    Nested(Vec<(FieldOperator, OperatorValue)>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldOperator {
    Equals,
    Not,
    In,
    NotIn,
    Lt,
    Lte,
    Gt,
    Gte,
    Contains,
    StartsWith,
    EndsWith,
    Unrecognized(String),
}

impl FieldOperator {
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "equals" => Self::Equals,
            "not" => Self::Not,
            "in" => Self::In,
            "notIn" => Self::NotIn,
            "lt" => Self::Lt,
            "lte" => Self::Lte,
            "gt" => Self::Gt,
            "gte" => Self::Gte,
            "contains" => Self::Contains,
            "startsWith" => Self::StartsWith,
            "endsWith" => Self::EndsWith,
            other => Self::Unrecognized(other.to_string()),
        }
    }
}

impl WhereInput {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Names of operators the compiler will not translate, in encounter order.
    #[must_use]
    pub fn unrecognized_operators(&self) -> Vec<String> {
        let mut out = Vec::new();
        collect_unrecognized(self, &mut out);
        out
    }
}

fn collect_unrecognized(input: &WhereInput, out: &mut Vec<String>) {
    fn ops(list: &[(FieldOperator, OperatorValue)], out: &mut Vec<String>) {
        for (op, val) in list {
            if let FieldOperator::Unrecognized(name) = op {
                out.push(name.clone());
            }
            if let OperatorValue::Nested(inner) = val {
                ops(inner, out);
            }
        }
    }
    for clause in &input.clauses {
        match clause {
            WhereClause::And(xs) | WhereClause::Or(xs) | WhereClause::Not(xs) => {
                for x in xs {
                    collect_unrecognized(x, out);
                }
            }
            WhereClause::Field { condition: FieldCondition::Operators(list), .. } => {
                ops(list, out);
            }
            WhereClause::Field { .. } => {}
        }
    }
}

/// Projection (`select`): field name to inclusion flag, in caller order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "bson::Document")]
pub struct SelectInput {
    pub fields: Vec<(String, bool)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    #[must_use]
    pub const fn direction(self) -> i32 {
        match self {
            Self::Asc => 1,
            Self::Desc => -1,
        }
    }
}

/// Ordering (`orderBy`): a single mapping or a list of mappings, flattened into
/// precedence order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Bson")]
pub struct OrderByInput {
    pub keys: Vec<(String, SortOrder)>,
}

/// What to do with operator names the compiler does not know.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownOperatorPolicy {
    /// Drop the operator; a field left with no operators adds no constraint.
    #[default]
    Ignore,
    /// Fail the request with `InvalidArgument`.
    Reject,
}
