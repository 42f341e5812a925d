use bson::Document;

use super::types::OrderByInput;
use crate::identity::native_key;

/// Compile `orderBy` into a native sort document, `1` ascending and `-1` descending.
///
/// Key order is sort precedence. Absent or empty input means natural order.
#[must_use]
pub fn compile_sort(order_by: Option<&OrderByInput>) -> Option<Document> {
    let order_by = order_by?;
    if order_by.keys.is_empty() {
        return None;
    }
    let mut out = Document::new();
    for (field, order) in &order_by.keys {
        out.insert(native_key(field), order.direction());
    }
    Some(out)
}
