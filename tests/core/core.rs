use gql::core::binding::ArgValue;
use gql::core::cache::{CacheStore, FsCacheStore, SchemaCache, cache_key};
use gql::core::config::CacheKeyPolicy;
use gql::core::error::GqlError;
use gql::core::introspection;
use gql::core::query::{Invocation, NodeSettings, QuerySynthesizer};
use gql::core::schema::{Operation, Schema};
use gql::core::tree::{CommandTree, CommandTreeBuilder};
use std::cell::Cell;
use std::io;
use std::time::{Duration, SystemTime};
use tempfile::tempdir;

const ENDPOINT: &str = "https://api.example.com/graphql";

fn fixture_schema() -> Schema {
    let raw = include_str!("../fixtures/introspection.json");
    let body: serde_json::Value = serde_json::from_str(raw).expect("fixture is json");
    introspection::schema_from_data(body["data"].clone()).expect("fixture decodes")
}

fn query_tree<'s>(schema: &'s Schema, path: &[&str]) -> CommandTree<'s> {
    CommandTreeBuilder::new(schema)
        .build_operation(Operation::Query, path)
        .expect("tree builds")
        .expect("schema has a query root")
}

fn settings(arguments: Vec<(&str, ArgValue)>, max_depth: usize) -> NodeSettings {
    NodeSettings {
        arguments: arguments
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect(),
        max_depth,
        fields: Vec::new(),
    }
}

#[test]
fn test_fixture_decodes_roots_and_types() {
    let schema = fixture_schema();
    assert_eq!(schema.root(Operation::Query).unwrap().name(), "Query");
    assert_eq!(schema.root(Operation::Mutation).unwrap().name(), "Mutation");
    assert!(schema.root(Operation::Subscription).is_none());

    let friends = schema
        .field_for_path(&["query", "viewer", "friends"])
        .expect("friends field");
    assert_eq!(friends.ty.format_type(), "[User!]!");
    assert_eq!(friends.arg_names(), vec!["first"]);
}

#[test]
fn test_tree_expands_only_the_path() {
    let schema = fixture_schema();
    let tree = query_tree(&schema, &["query", "viewer", "friends"]);
    let chain = tree.chain();
    let names: Vec<&str> = chain.iter().map(|n| n.name()).collect();
    assert_eq!(names, vec!["query", "viewer", "friends"]);

    let viewer = tree.root.child("viewer").unwrap();
    assert!(viewer.expanded);
    assert!(!tree.root.child("user").unwrap().expanded);
    assert!(!viewer.child("posts").unwrap().expanded);
    assert!(tree.unmatched().is_none());
}

#[test]
fn test_assembles_nested_query_with_scoped_arguments() {
    let schema = fixture_schema();
    let tree = query_tree(&schema, &["query", "viewer", "friends"]);
    let chain = tree.chain();
    let invocations = vec![
        Invocation::new(chain[0], NodeSettings::default()),
        Invocation::new(chain[1], NodeSettings::default()),
        Invocation::new(chain[2], settings(vec![("first", ArgValue::Int(5))], 0)),
    ];
    let fragment = QuerySynthesizer::new(&schema).assemble(&invocations).unwrap();
    assert_eq!(
        fragment.query,
        "query { viewer { friends(first: 5) { id name nme email role } } }"
    );
}

#[test]
fn test_depth_one_skips_types_already_being_projected() {
    let schema = fixture_schema();
    let tree = query_tree(&schema, &["query", "viewer"]);
    let chain = tree.chain();
    let invocations = vec![
        Invocation::new(chain[0], NodeSettings::default()),
        Invocation::new(chain[1], settings(vec![], 1)),
    ];
    let fragment = QuerySynthesizer::new(&schema).assemble(&invocations).unwrap();
    assert_eq!(
        fragment.query,
        "query { viewer { id name nme email role posts { title score } } }"
    );
}

#[test]
fn test_union_without_fields_falls_back_to_typename() {
    let schema = fixture_schema();
    let tree = query_tree(&schema, &["query", "search"]);
    let chain = tree.chain();
    let invocations = vec![
        Invocation::new(chain[0], NodeSettings::default()),
        Invocation::new(
            chain[1],
            settings(vec![("term", ArgValue::Str("ada".to_string()))], 0),
        ),
    ];
    let fragment = QuerySynthesizer::new(&schema)
        .with_depth_ceiling(2)
        .assemble(&invocations)
        .unwrap();
    assert_eq!(fragment.query, "query { search(term: \"ada\") { __typename } }");
}

#[test]
fn test_mutation_passes_input_object_through() {
    let schema = fixture_schema();
    let tree = CommandTreeBuilder::new(&schema)
        .build_operation(Operation::Mutation, &["mutation", "createUser"])
        .unwrap()
        .unwrap();
    let chain = tree.chain();
    let create = chain[1];
    assert!(create.binding("input").unwrap().is_mandatory());
    assert_eq!(create.binding("input").unwrap().type_name(), "CreateUserInput!");

    let invocations = vec![
        Invocation::new(chain[0], NodeSettings::default()),
        Invocation::new(
            create,
            settings(
                vec![("input", ArgValue::Str("{name: \"Ada\"}".to_string()))],
                0,
            ),
        ),
    ];
    let fragment = QuerySynthesizer::new(&schema).assemble(&invocations).unwrap();
    assert_eq!(
        fragment.query,
        "mutation { createUser(input: {name: \"Ada\"}) { id name nme email role } }"
    );
}

#[test]
fn test_cache_round_trip_within_ttl() {
    let tmp = tempdir().unwrap();
    let schema = fixture_schema();
    let cache = SchemaCache::new(
        FsCacheStore::new(tmp.path().join("cache")),
        Duration::from_secs(600),
        CacheKeyPolicy::Sanitized,
    );

    assert!(cache.load(ENDPOINT, SystemTime::now()).is_none());
    cache.save(ENDPOINT, &schema);
    assert!(
        cache
            .store()
            .entry_path(&cache_key(ENDPOINT, CacheKeyPolicy::Sanitized))
            .exists()
    );
    let loaded = cache.load(ENDPOINT, SystemTime::now()).expect("fresh entry");
    assert_eq!(loaded, schema);

    let later = SystemTime::now() + Duration::from_secs(601);
    assert!(cache.load(ENDPOINT, later).is_none());
}

#[test]
fn test_corrupt_entry_is_a_miss() {
    let tmp = tempdir().unwrap();
    let store = FsCacheStore::new(tmp.path());
    let key = cache_key(ENDPOINT, CacheKeyPolicy::Hashed);
    store.write(&key, b"{not json").unwrap();
    let cache = SchemaCache::new(store, Duration::from_secs(600), CacheKeyPolicy::Hashed);
    assert!(cache.load(ENDPOINT, SystemTime::now()).is_none());
}

struct ReadOnlyStore {
    writes: Cell<usize>,
}

impl CacheStore for ReadOnlyStore {
    fn read(&self, _key: &str) -> io::Result<Vec<u8>> {
        Err(io::Error::new(io::ErrorKind::NotFound, "empty"))
    }

    fn modified(&self, _key: &str) -> io::Result<SystemTime> {
        Err(io::Error::new(io::ErrorKind::NotFound, "empty"))
    }

    fn write(&self, _key: &str, _bytes: &[u8]) -> io::Result<()> {
        self.writes.set(self.writes.get() + 1);
        Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
    }
}

#[test]
fn test_failed_cache_write_does_not_propagate() {
    let cache = SchemaCache::new(
        ReadOnlyStore {
            writes: Cell::new(0),
        },
        Duration::from_secs(600),
        CacheKeyPolicy::Sanitized,
    );
    let schema = cache
        .load_or_fetch(ENDPOINT, false, || Ok(fixture_schema()))
        .expect("fetch result survives the failed write");
    assert_eq!(schema.types.len(), fixture_schema().types.len());
    assert_eq!(cache.store().writes.get(), 1);
}

#[test]
fn test_bypass_refetches_and_rewrites() {
    let tmp = tempdir().unwrap();
    let cache = SchemaCache::new(
        FsCacheStore::new(tmp.path()),
        Duration::from_secs(600),
        CacheKeyPolicy::Sanitized,
    );
    cache.save(ENDPOINT, &Schema::default());

    let fetched = Cell::new(false);
    let schema = cache
        .load_or_fetch(ENDPOINT, true, || {
            fetched.set(true);
            Ok(fixture_schema())
        })
        .unwrap();
    assert!(fetched.get());
    assert!(!schema.types.is_empty());
    assert_eq!(cache.load(ENDPOINT, SystemTime::now()).unwrap(), schema);
}

#[test]
fn test_fetch_error_propagates() {
    let tmp = tempdir().unwrap();
    let cache = SchemaCache::new(
        FsCacheStore::new(tmp.path()),
        Duration::from_secs(600),
        CacheKeyPolicy::Sanitized,
    );
    let err = cache
        .load_or_fetch(ENDPOINT, false, || {
            Err(GqlError::SchemaFetch("unreachable".to_string()))
        })
        .unwrap_err();
    assert!(matches!(err, GqlError::SchemaFetch(_)));
}
