use bson::{Bson, Document};
use serde_json::Value;

use crate::errors::DbError;

/// Convert a `serde_json::Value` that must be an object into a `bson::Document`.
///
/// # Errors
/// Returns `InvalidArgument` on anything but an object, or on malformed extended JSON.
pub fn json_value_to_bson_document(val: &Value) -> Result<Document, DbError> {
    let obj = val
        .as_object()
        .ok_or_else(|| DbError::InvalidArgument(format!("expected JSON object, got {val}")))?;
    Document::try_from(obj.clone()).map_err(|e| DbError::InvalidArgument(e.to_string()))
}

/// Parse a JSON string into a `bson::Document`. The JSON must be a top-level object.
///
/// # Errors
/// Returns `InvalidArgument` on malformed JSON or a non-object.
pub fn parse_json_to_bson_document(json: &str) -> Result<Document, DbError> {
    let val: Value =
        serde_json::from_str(json).map_err(|e| DbError::InvalidArgument(e.to_string()))?;
    json_value_to_bson_document(&val)
}

/// Parse any JSON value into BSON.
///
/// # Errors
/// Returns `InvalidArgument` on malformed JSON.
pub fn parse_json_to_bson(json: &str) -> Result<Bson, DbError> {
    let val: Value =
        serde_json::from_str(json).map_err(|e| DbError::InvalidArgument(e.to_string()))?;
    Bson::try_from(val).map_err(|e| DbError::InvalidArgument(e.to_string()))
}

/// Render a document as relaxed extended JSON.
#[must_use]
pub fn bson_document_to_json(doc: Document) -> Value {
    Bson::Document(doc).into_relaxed_extjson()
}
