use gql::core::error::GqlError;
use gql::core::introspection;
use gql::core::schema::Schema;
use gql::plugins::args::run_args;

fn fixture_schema() -> Schema {
    let raw = include_str!("../fixtures/introspection.json");
    let body: serde_json::Value = serde_json::from_str(raw).expect("fixture is json");
    introspection::schema_from_data(body["data"].clone()).expect("fixture decodes")
}

fn args(path: &[&str]) -> Result<String, GqlError> {
    let schema = fixture_schema();
    let mut out = Vec::new();
    run_args(&schema, path, &mut out)?;
    Ok(String::from_utf8(out).unwrap())
}

#[test]
fn test_argument_names_in_declaration_order() {
    assert_eq!(args(&["query", "search"]).unwrap(), "term limit\n");
    assert_eq!(args(&["mutation", "setActive"]).unwrap(), "id active\n");
}

#[test]
fn test_nested_field_arguments() {
    assert_eq!(args(&["query", "viewer", "friends"]).unwrap(), "first\n");
}

#[test]
fn test_field_without_arguments() {
    assert_eq!(args(&["query", "viewer"]).unwrap(), "\n");
}

#[test]
fn test_operation_alone_is_not_a_field() {
    assert!(matches!(args(&["query"]), Err(GqlError::PathNotFound)));
}

#[test]
fn test_unknown_field() {
    assert!(matches!(
        args(&["query", "viewer", "missing"]),
        Err(GqlError::PathNotFound)
    ));
}
