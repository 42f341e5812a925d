use super::support::{ids, seeded_people, service};
use bson::doc;
use nexus_records::records::{CountArgs, CreateArgs, DeleteArgs, FindManyArgs, UpdateArgs};
use nexus_records::{DbError, RecordsConfig, StoreError};

#[test]
fn create_moves_alias_to_native_identity() {
    let svc = service();
    let rec = svc.create_json("users", r#"{"data":{"id":"X","name":"n"}}"#).unwrap();
    assert_eq!(rec.get_str("_id").unwrap(), "X");
    assert!(rec.get("id").is_none());
    let found = svc.find_unique_json("users", r#"{"where":{"id":"X"}}"#).unwrap().unwrap();
    assert_eq!(found, rec);
}

#[test]
fn create_keeps_both_when_native_identity_given() {
    let svc = service();
    let rec = svc.create_json("users", r#"{"data":{"_id":"N","id":"A"}}"#).unwrap();
    assert_eq!(rec.get_str("_id").unwrap(), "N");
    assert_eq!(rec.get_str("id").unwrap(), "A");
}

#[test]
fn blank_alias_gets_generated_identity() {
    let svc = service();
    let rec = svc.create_json("users", r#"{"data":{"id":null}}"#).unwrap();
    assert_eq!(rec.get_str("_id").unwrap().len(), 20);
}

#[test]
fn duplicate_identity_is_a_store_failure() {
    let svc = service();
    svc.create_json("users", r#"{"data":{"id":"dup"}}"#).unwrap();
    let err = svc.create_json("users", r#"{"data":{"id":"dup"}}"#).unwrap_err();
    assert!(matches!(err, DbError::Store(StoreError::DuplicateKey { .. })));
    assert_eq!(svc.count("users", CountArgs::default()).unwrap(), 1);
}

#[test]
fn skip_then_take_over_sorted_records() {
    let svc = seeded_people();
    let page = svc
        .find_many_json("people", r#"{"orderBy":{"age":"desc"},"skip":2,"take":3}"#)
        .unwrap();
    assert_eq!(ids(&page), vec!["p7", "p6", "p5"]);
}

#[test]
fn zero_skip_and_take_are_not_applied() {
    let svc = seeded_people();
    let all = svc.find_many("people", FindManyArgs { skip: Some(0), take: Some(0), ..FindManyArgs::default() }).unwrap();
    assert_eq!(all.len(), 10);
}

#[test]
fn multi_key_ordering_keeps_precedence() {
    let svc = seeded_people();
    let page = svc.find_many_json("people", r#"{"orderBy":[{"city":"asc"},{"age":"desc"}],"take":2}"#).unwrap();
    assert_eq!(ids(&page), vec!["p9", "p7"]);
}

#[test]
fn projection_is_inclusion_only() {
    let svc = seeded_people();
    let rec = svc
        .find_unique_json("people", r#"{"where":{"id":"p1"},"select":{"city":true,"age":false}}"#)
        .unwrap()
        .unwrap();
    assert_eq!(rec, doc! {"_id": "p1", "city": "Lima"});
}

#[test]
fn find_unique_without_match_is_none() {
    let svc = seeded_people();
    assert!(svc.find_unique_json("people", r#"{"where":{"id":"nope"}}"#).unwrap().is_none());
    assert!(svc.find_unique_json("elsewhere", "{}").unwrap().is_none());
}

#[test]
fn update_sets_only_named_fields() {
    let svc = seeded_people();
    let rec = svc
        .update("people", UpdateArgs {
            filter: Some(nexus_records::query::parse_where_json(r#"{"id":"p2"}"#).unwrap()),
            data: Some(doc! {"city": "Rome", "tags.primary": "x"}),
        })
        .unwrap()
        .unwrap();
    assert_eq!(rec.get_str("city").unwrap(), "Rome");
    assert_eq!(rec.get_i32("age").unwrap(), 22);
    assert_eq!(rec.get_document("tags").unwrap().get_str("primary").unwrap(), "x");
}

#[test]
fn update_without_match_changes_nothing() {
    let svc = seeded_people();
    let before = svc.find_many_json("people", "{}").unwrap();
    let r = svc.update_json("people", r#"{"where":{"id":"zz"},"data":{"city":"Rome"}}"#).unwrap();
    assert!(r.is_none());
    assert_eq!(svc.find_many_json("people", "{}").unwrap(), before);
}

#[test]
fn update_without_data_is_rejected_before_the_store() {
    let svc = seeded_people();
    let before = svc.find_many_json("people", "{}").unwrap();
    let err = svc.update("people", UpdateArgs::default()).unwrap_err();
    assert!(matches!(err, DbError::InvalidArgument(_)));
    assert_eq!(svc.find_many_json("people", "{}").unwrap(), before);
}

#[test]
fn create_without_data_leaves_collection_unchanged() {
    let svc = seeded_people();
    let err = svc.create_json("people", "{}").unwrap_err();
    assert!(matches!(err, DbError::InvalidArgument(_)));
    assert_eq!(svc.count("people", CountArgs::default()).unwrap(), 10);
}

#[test]
fn delete_returns_removed_record() {
    let svc = seeded_people();
    let gone = svc.delete_json("people", r#"{"where":{"id":"p4"}}"#).unwrap().unwrap();
    assert_eq!(gone.get_str("_id").unwrap(), "p4");
    assert_eq!(svc.count("people", CountArgs::default()).unwrap(), 9);
    assert!(svc.delete("people", DeleteArgs { filter: None }).unwrap().is_some());
}

#[test]
fn delete_without_match_changes_nothing() {
    let svc = seeded_people();
    assert!(svc.delete_json("people", r#"{"where":{"age":{"gt":100}}}"#).unwrap().is_none());
    assert_eq!(svc.count("people", CountArgs::default()).unwrap(), 10);
}

#[test]
fn count_matches_filter() {
    let svc = seeded_people();
    assert_eq!(svc.count_json("people", r#"{"where":{"city":"Oslo"}}"#).unwrap(), 5);
}

#[test]
fn config_reaches_the_service() {
    let cfg = RecordsConfig::from_toml_str("id_length = 12\nmax_take = 4\n").unwrap();
    let svc = nexus_records::RecordService::with_config(std::sync::Arc::new(nexus_records::MemoryStore::new()), cfg);
    let rec = svc.create("c", CreateArgs { data: Some(doc! {}) }).unwrap();
    assert_eq!(rec.get_str("_id").unwrap().len(), 12);
}

#[test]
fn ordering_honours_keys_beyond_the_eighth() {
    let svc = service();
    let tied = r#""k1":0,"k2":0,"k3":0,"k4":0,"k5":0,"k6":0,"k7":0,"k8":0"#;
    svc.create_json("wide", &format!(r#"{{"data":{{"id":"a",{tied},"k9":2}}}}"#)).unwrap();
    svc.create_json("wide", &format!(r#"{{"data":{{"id":"b",{tied},"k9":1}}}}"#)).unwrap();
    let order: Vec<String> = (1..=9).map(|i| format!(r#"{{"k{i}":"asc"}}"#)).collect();
    let page = svc.find_many_json("wide", &format!(r#"{{"orderBy":[{}]}}"#, order.join(","))).unwrap();
    assert_eq!(ids(&page), vec!["b", "a"]);
}
