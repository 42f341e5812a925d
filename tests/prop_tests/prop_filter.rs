use bson::doc;
use nexus_records::records::CreateArgs;
use nexus_records::{MemoryStore, RecordService};
use proptest::prelude::*;
use std::sync::Arc;

fn service_with(values: &[i64]) -> RecordService<Arc<MemoryStore>> {
    let svc = RecordService::new(Arc::new(MemoryStore::new()));
    for v in values {
        svc.create("p", CreateArgs { data: Some(doc! {"v": *v, "s": format!("k{v}")}) }).unwrap();
    }
    svc
}

fn count(svc: &RecordService<Arc<MemoryStore>>, where_json: &str) -> u64 {
    svc.count_json("p", &format!("{{\"where\":{where_json}}}")).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 48, .. ProptestConfig::default() })]

    #[test]
    fn prop_gt_and_lte_partition(values in proptest::collection::vec(-50i64..50, 0..30), pivot in -60i64..60) {
        let svc = service_with(&values);
        let gt = count(&svc, &format!("{{\"v\":{{\"gt\":{pivot}}}}}"));
        let lte = count(&svc, &format!("{{\"v\":{{\"lte\":{pivot}}}}}"));
        prop_assert_eq!(gt + lte, values.len() as u64);
    }

    #[test]
    fn prop_not_is_complement_of_single_clause(values in proptest::collection::vec(-10i64..10, 0..30), pick in -10i64..10) {
        let svc = service_with(&values);
        let hit = count(&svc, &format!("{{\"v\":{pick}}}"));
        let miss = count(&svc, &format!("{{\"NOT\":{{\"v\":{pick}}}}}"));
        prop_assert_eq!(hit + miss, values.len() as u64);
    }

    #[test]
    fn prop_not_of_two_clauses_is_and_of_negations(values in proptest::collection::vec(-10i64..10, 0..30), a in -10i64..10, b in -10i64..10) {
        let svc = service_with(&values);
        let nor = count(&svc, &format!("{{\"NOT\":[{{\"v\":{a}}},{{\"v\":{b}}}]}}"));
        let expected = values.iter().filter(|v| **v != a && **v != b).count() as u64;
        prop_assert_eq!(nor, expected);
    }

    #[test]
    fn prop_in_matches_membership(values in proptest::collection::vec(-10i64..10, 0..30), set in proptest::collection::vec(-10i64..10, 0..5)) {
        let svc = service_with(&values);
        let list = serde_json::to_string(&set).unwrap();
        let got = count(&svc, &format!("{{\"v\":{{\"in\":{list}}}}}"));
        let expected = values.iter().filter(|v| set.contains(v)).count() as u64;
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_contains_matches_literal_text(needle in "[a-z.*+?()|\\[\\]^$]{1,4}") {
        let svc = RecordService::new(Arc::new(MemoryStore::new()));
        svc.create("p", CreateArgs { data: Some(doc! {"s": format!("xx{needle}yy")}) }).unwrap();
        svc.create("p", CreateArgs { data: Some(doc! {"s": "plain"}) }).unwrap();
        let body = serde_json::json!({"where": {"s": {"contains": needle}}}).to_string();
        let got = svc.count_json("p", &body).unwrap();
        prop_assert!(got >= 1);
        prop_assert_eq!(got, if "plain".contains(needle.as_str()) { 2 } else { 1 });
    }

    #[test]
    fn prop_where_parser_never_panics(s in "\\PC{0,64}") {
        let _ = nexus_records::query::parse_where_json(&s);
    }
}
