use bson::Document;

use super::types::SelectInput;
use crate::identity::native_key;

/// Compile `select` into an inclusion-only projection.
///
/// Only fields set to `true` are listed. An empty projection leaves documents whole at the
/// store; the store always keeps `_id`.
#[must_use]
pub fn compile_projection(select: Option<&SelectInput>) -> Option<Document> {
    let select = select?;
    let mut out = Document::new();
    for (field, included) in &select.fields {
        if *included {
            out.insert(native_key(field), 1i32);
        }
    }
    Some(out)
}
