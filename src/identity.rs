//! Identity handling: one record has one identity, stored under [`NATIVE_ID`].
//!
//! Callers may address it through the relational alias [`ID_ALIAS`]; every place that
//! hands a key to the store goes through [`native_key`] or [`normalize_identity_field`].

use bson::{Bson, Document};
use rand::Rng;
use rand::distr::Alphanumeric;

use crate::types::{ID_ALIAS, NATIVE_ID};

/// Map a caller-supplied field name to the name the store understands.
#[must_use]
pub fn native_key(field: &str) -> &str {
    if field == ID_ALIAS { NATIVE_ID } else { field }
}

/// Null and empty strings do not count as an identity.
fn is_blank(v: Option<&Bson>) -> bool {
    match v {
        None | Some(Bson::Null) => true,
        Some(Bson::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

/// Fold the identity alias into the native identity attribute.
///
/// When `id` carries a value and `_id` does not, the value moves to `_id` and the `id`
/// key is removed. When both carry a value `_id` wins and `id` stays an ordinary field.
/// Returns `true` when the alias was folded.
pub fn normalize_identity_field(doc: &mut Document) -> bool {
    if is_blank(doc.get(ID_ALIAS)) || !is_blank(doc.get(NATIVE_ID)) {
        return false;
    }
    match doc.remove(ID_ALIAS) {
        Some(v) => {
            doc.insert(NATIVE_ID, v);
            true
        }
        None => false,
    }
}

/// Guarantee the document has a native identity, generating one of `len` characters if
/// needed. Returns the identity value.
pub fn ensure_identity(doc: &mut Document, len: usize) -> Bson {
    normalize_identity_field(doc);
    if is_blank(doc.get(NATIVE_ID)) {
        let id = generate_id(len);
        log::debug!("generated identity {id}");
        doc.insert(NATIVE_ID, id);
    }
    doc.get(NATIVE_ID).cloned().unwrap_or(Bson::Null)
}

/// Random identifier drawn uniformly from `[A-Za-z0-9]`.
///
/// Collisions are not checked: 62^20 possible values make them negligible at the scale this
/// layer runs at, but they are not impossible.
#[must_use]
pub fn generate_id(len: usize) -> String {
    generate_id_with(&mut rand::rng(), len)
}

/// Same as [`generate_id`] with a caller-provided generator (seeded in tests).
pub fn generate_id_with<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    (0..len).map(|_| char::from(rng.sample(Alphanumeric))).collect()
}
