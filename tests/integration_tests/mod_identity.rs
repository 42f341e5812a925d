use bson::doc;
use nexus_records::identity::{ensure_identity, generate_id, native_key, normalize_identity_field};
use std::collections::HashSet;

#[test]
fn thousand_generated_ids_are_distinct_and_alphanumeric() {
    let ids: HashSet<String> = (0..1000).map(|_| generate_id(20)).collect();
    assert_eq!(ids.len(), 1000);
    assert!(ids.iter().all(|id| id.len() == 20 && id.chars().all(|c| c.is_ascii_alphanumeric())));
}

#[test]
fn alias_resolution() {
    assert_eq!(native_key("id"), "_id");
    assert_eq!(native_key("_id"), "_id");
    assert_eq!(native_key("ident"), "ident");
}

#[test]
fn normalization_is_idempotent() {
    let mut d = doc! {"id": "a"};
    assert!(normalize_identity_field(&mut d));
    assert!(!normalize_identity_field(&mut d));
    assert_eq!(d, doc! {"_id": "a"});
}

#[test]
fn ensure_identity_respects_existing_value() {
    let mut d = doc! {"_id": 42};
    assert_eq!(ensure_identity(&mut d, 20), bson::Bson::Int32(42));
    let mut e = doc! {"_id": ""};
    let id = ensure_identity(&mut e, 6);
    assert_eq!(id.as_str().unwrap().len(), 6);
}
