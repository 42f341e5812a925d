use super::support::{ids, named_people, seeded_people};
use bson::doc;
use nexus_records::query::{compile_filter, compile_projection, compile_sort, parse_order_by_json, parse_select_json, parse_where_json};

fn matching(where_json: &str) -> Vec<String> {
    let svc = seeded_people();
    let body = format!("{{\"where\":{where_json}}}");
    ids(&svc.find_many_json("people", &body).unwrap())
}

#[test]
fn empty_where_matches_everything() {
    assert_eq!(matching("{}").len(), 10);
    assert_eq!(ids(&seeded_people().find_many_json("people", "{}").unwrap()).len(), 10);
}

#[test]
fn implicit_equality() {
    assert_eq!(matching(r#"{"age":23}"#), vec!["p3"]);
    assert_eq!(matching(r#"{"id":"p7"}"#), vec!["p7"]);
}

#[test]
fn each_comparison_operator() {
    assert_eq!(matching(r#"{"age":{"equals":21}}"#), vec!["p1"]);
    assert_eq!(matching(r#"{"age":{"not":21}}"#).len(), 9);
    assert_eq!(matching(r#"{"age":{"in":[20,29]}}"#), vec!["p0", "p9"]);
    assert_eq!(matching(r#"{"age":{"notIn":[20,29]}}"#).len(), 8);
    assert_eq!(matching(r#"{"age":{"lt":22}}"#), vec!["p0", "p1"]);
    assert_eq!(matching(r#"{"age":{"lte":22}}"#).len(), 3);
    assert_eq!(matching(r#"{"age":{"gt":27}}"#), vec!["p8", "p9"]);
    assert_eq!(matching(r#"{"age":{"gte":27}}"#).len(), 3);
}

#[test]
fn scalar_in_operand_is_a_single_value_set() {
    assert_eq!(matching(r#"{"city":{"in":"Lima"}}"#).len(), 5);
}

#[test]
fn pattern_operators_are_case_insensitive() {
    assert_eq!(matching(r#"{"name":{"contains":"SON 4"}}"#), vec!["p4"]);
    assert_eq!(matching(r#"{"city":{"startsWith":"os"}}"#).len(), 5);
    assert_eq!(matching(r#"{"name":{"endsWith":"9"}}"#), vec!["p9"]);
}

#[test]
fn pattern_operands_match_literally() {
    assert!(matching(r#"{"name":{"contains":"Person."}}"#).is_empty());
    assert!(matching(r#"{"name":{"startsWith":".*"}}"#).is_empty());
}

#[test]
fn two_patterns_on_one_field_both_apply() {
    assert_eq!(matching(r#"{"name":{"startsWith":"per","endsWith":"3"}}"#), vec!["p3"]);
}

#[test]
fn and_or_composition() {
    assert_eq!(matching(r#"{"AND":[{"city":"Oslo"},{"age":{"gte":26}}]}"#), vec!["p6", "p8"]);
    assert_eq!(matching(r#"{"OR":[{"id":"p1"},{"age":29}]}"#), vec!["p1", "p9"]);
    assert_eq!(matching(r#"{"OR":{"id":"p2"}}"#), vec!["p2"]);
}

#[test]
fn not_excludes_every_listed_clause() {
    // matches neither clause, so both p0 (age 20) and Lima residents are excluded
    let got = matching(r#"{"NOT":[{"age":20},{"city":"Lima"}]}"#);
    assert_eq!(got, vec!["p2", "p4", "p6", "p8"]);
}

#[test]
fn not_operator_with_nested_mapping() {
    assert_eq!(matching(r#"{"age":{"not":{"lt":28}}}"#), vec!["p8", "p9"]);
}

#[test]
fn empty_or_matches_nothing() {
    assert!(matching(r#"{"OR":[]}"#).is_empty());
}

#[test]
fn unknown_operator_is_ignored_by_default() {
    assert_eq!(matching(r#"{"age":{"near":3}}"#).len(), 10);
}

#[test]
fn compiled_documents_never_mention_the_alias() {
    let w = parse_where_json(r#"{"id":"a","OR":[{"id":{"in":["b"]}}],"NOT":{"id":{"not":"c"}}}"#).unwrap();
    let s = parse_select_json(r#"{"id":true,"name":true}"#).unwrap();
    let o = parse_order_by_json(r#"[{"id":"asc"}]"#).unwrap();
    let rendered = format!(
        "{} {} {}",
        compile_filter(Some(&w)),
        compile_projection(Some(&s)).unwrap(),
        compile_sort(Some(&o)).unwrap()
    );
    assert!(!rendered.contains("\"id\""), "{rendered}");
    assert_eq!(compile_projection(Some(&s)).unwrap(), doc! {"_id": 1, "name": 1});
}

#[test]
fn too_deep_nesting_is_rejected() {
    let mut json = String::from("{\"a\":1}");
    for _ in 0..40 {
        json = format!("{{\"AND\":[{json}]}}");
    }
    assert!(parse_where_json(&json).is_err());
}

#[test]
fn generated_names_are_found_by_their_own_prefix_and_suffix() {
    let (svc, names) = named_people(25);
    for (i, name) in names.iter().enumerate() {
        let head: String = name.chars().take(3).collect();
        let tail: String = name.chars().rev().take(3).collect::<Vec<_>>().into_iter().rev().collect();
        let body = serde_json::json!({"where": {"name": {"startsWith": head, "endsWith": tail}}}).to_string();
        let hits = ids(&svc.find_many_json("named", &body).unwrap());
        assert!(hits.contains(&format!("r{i}")), "{name}: {hits:?}");
    }
}

#[test]
fn operator_shaped_field_names_are_invalid() {
    let svc = seeded_people();
    for w in [r#"{"$or":[{"city":"Oslo"}]}"#, r#"{"$where":"1"}"#, r#"{"AND":[{"addr.$ne":1}]}"#] {
        let err = svc.find_many_json("people", &format!("{{\"where\":{w}}}")).unwrap_err();
        assert!(matches!(err, nexus_records::DbError::InvalidArgument(_)), "{w}: {err}");
    }
}
