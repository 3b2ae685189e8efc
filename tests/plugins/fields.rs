use gql::core::error::GqlError;
use gql::core::introspection;
use gql::core::schema::Schema;
use gql::plugins::fields::run_fields;

fn fixture_schema() -> Schema {
    let raw = include_str!("../fixtures/introspection.json");
    let body: serde_json::Value = serde_json::from_str(raw).expect("fixture is json");
    introspection::schema_from_data(body["data"].clone()).expect("fixture decodes")
}

fn fields(path: &[&str]) -> (Result<(), GqlError>, String, String) {
    let schema = fixture_schema();
    let mut out = Vec::new();
    let mut err = Vec::new();
    let result = run_fields(&schema, path, &mut out, &mut err);
    (
        result,
        String::from_utf8(out).unwrap(),
        String::from_utf8(err).unwrap(),
    )
}

#[test]
fn test_root_fields() {
    let (result, out, err) = fields(&["query"]);
    result.unwrap();
    assert_eq!(out, "viewer user search version\n");
    assert!(err.is_empty());
}

#[test]
fn test_fields_through_wrapped_types() {
    let (result, out, _) = fields(&["query", "viewer", "friends"]);
    result.unwrap();
    assert_eq!(out, "id name nme email role friends posts\n");
}

#[test]
fn test_scalar_field_has_no_fields() {
    let (result, out, _) = fields(&["query", "version"]);
    result.unwrap();
    assert_eq!(out, "\n");
}

#[test]
fn test_near_miss_prints_closest_matches() {
    let (result, out, err) = fields(&["query", "viewer", "nam"]);
    result.unwrap();
    assert_eq!(out, "name nme\n");
    assert!(err.contains("no exact match found"));
    assert!(err.contains("printing closest matches"));
}

#[test]
fn test_unknown_segment_is_not_found() {
    let (result, out, _) = fields(&["query", "viewer", "zzzzzz"]);
    assert!(matches!(result, Err(GqlError::PathNotFound)));
    assert!(out.is_empty());
}

#[test]
fn test_unknown_operation_is_not_found() {
    let (result, _, _) = fields(&["subscription", "events"]);
    assert!(matches!(result, Err(GqlError::PathNotFound)));
}
