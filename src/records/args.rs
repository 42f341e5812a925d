//! Request shapes for the record operations, as callers send them (camelCase JSON).

use bson::Document;
use serde::Deserialize;

use crate::query::{OrderByInput, SelectInput, WhereInput};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FindManyArgs {
    #[serde(rename = "where", default)]
    pub filter: Option<WhereInput>,
    #[serde(default)]
    pub select: Option<SelectInput>,
    #[serde(default)]
    pub order_by: Option<OrderByInput>,
    /// Leading matches to discard; `0` is the same as absent.
    #[serde(default)]
    pub skip: Option<u64>,
    /// Maximum matches to return; `0` is the same as absent.
    #[serde(default)]
    pub take: Option<u64>,
}

/// An absent `where` selects the first document in natural order.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FindUniqueArgs {
    #[serde(rename = "where", default)]
    pub filter: Option<WhereInput>,
    #[serde(default)]
    pub select: Option<SelectInput>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateArgs {
    #[serde(default)]
    pub data: Option<Document>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateArgs {
    #[serde(rename = "where", default)]
    pub filter: Option<WhereInput>,
    #[serde(default)]
    pub data: Option<Document>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeleteArgs {
    #[serde(rename = "where", default)]
    pub filter: Option<WhereInput>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CountArgs {
    #[serde(rename = "where", default)]
    pub filter: Option<WhereInput>,
}
