//! Introspection query and schema retrieval.

use crate::core::error::GqlError;
use crate::core::schema::Schema;
use crate::core::transport::{GraphQLRequest, Transport};
use serde::Deserialize;
use std::collections::BTreeMap;

pub const INTROSPECTION_OPERATION: &str = "IntrospectionQuery";

/// Full `__schema` query. `TypeRef` unrolls seven `ofType` levels, enough for
/// `[[T!]!]!` style wrappers.
pub const INTROSPECTION_QUERY: &str = r#"
query IntrospectionQuery {
  __schema {
    queryType { name }
    mutationType { name }
    subscriptionType { name }
    types {
      ...FullType
    }
    directives {
      name
      description
      locations
      args {
        ...InputValue
      }
    }
  }
}

fragment FullType on __Type {
  kind
  name
  description
  fields(includeDeprecated: true) {
    name
    description
    args {
      ...InputValue
    }
    type {
      ...TypeRef
    }
    isDeprecated
    deprecationReason
  }
  inputFields {
    ...InputValue
  }
  interfaces {
    ...TypeRef
  }
  enumValues(includeDeprecated: true) {
    name
    description
    isDeprecated
    deprecationReason
  }
  possibleTypes {
    ...TypeRef
  }
}

fragment InputValue on __InputValue {
  name
  description
  type { ...TypeRef }
  defaultValue
}

fragment TypeRef on __Type {
  kind
  name
  ofType {
    kind
    name
    ofType {
      kind
      name
      ofType {
        kind
        name
        ofType {
          kind
          name
          ofType {
            kind
            name
            ofType {
              kind
              name
              ofType {
                kind
                name
              }
            }
          }
        }
      }
    }
  }
}
"#;

#[derive(Deserialize)]
struct IntrospectionData {
    #[serde(rename = "__schema")]
    schema: Option<Schema>,
}

/// Decodes the `data` member of an introspection response.
pub fn schema_from_data(data: serde_json::Value) -> Result<Schema, GqlError> {
    let decoded: IntrospectionData = serde_json::from_value(data)
        .map_err(|e| GqlError::SchemaFetch(format!("malformed introspection payload: {}", e)))?;
    let schema = decoded
        .schema
        .ok_or_else(|| GqlError::SchemaFetch("response has no __schema".to_string()))?;
    if schema.types.is_empty() {
        return Err(GqlError::SchemaFetch(
            "introspection returned no types".to_string(),
        ));
    }
    // Types are resolved by name, so a shallow entry hides its fields.
    for shallow in schema.types.iter().filter(|t| t.is_reference()) {
        tracing::debug!(type_name = %shallow.name(), "schema entry carries no fields or possible types");
    }
    Ok(schema)
}

/// Runs the introspection query through `transport`.
pub fn fetch_schema(
    transport: &dyn Transport,
    headers: &BTreeMap<String, String>,
) -> Result<Schema, GqlError> {
    let mut request = GraphQLRequest::new(INTROSPECTION_QUERY);
    request.operation_name = Some(INTROSPECTION_OPERATION.to_string());
    request.headers = headers.clone();

    let response = transport
        .execute(&request)
        .map_err(|e| GqlError::SchemaFetch(e.to_string()))?;
    match response.data {
        Some(data) if !data.is_null() => {
            for error in &response.errors {
                tracing::warn!(message = %error.message, "introspection returned an error");
            }
            schema_from_data(data)
        }
        _ => {
            let messages = response
                .errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>();
            if messages.is_empty() {
                Err(GqlError::SchemaFetch("response has no data".to_string()))
            } else {
                Err(GqlError::SchemaFetch(messages.join("; ")))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schema::Operation;
    use crate::core::transport::{GraphQLResponse, RemoteError};
    use std::cell::RefCell;

    struct Canned {
        response: GraphQLResponse,
        seen: RefCell<Vec<GraphQLRequest>>,
    }

    impl Transport for Canned {
        fn execute(&self, request: &GraphQLRequest) -> Result<GraphQLResponse, GqlError> {
            self.seen.borrow_mut().push(request.clone());
            Ok(self.response.clone())
        }
    }

    fn canned(response: GraphQLResponse) -> Canned {
        Canned {
            response,
            seen: RefCell::new(Vec::new()),
        }
    }

    #[test]
    fn query_unrolls_type_refs() {
        assert_eq!(INTROSPECTION_QUERY.matches("ofType {").count(), 7);
        assert!(INTROSPECTION_QUERY.contains("possibleTypes"));
        assert!(INTROSPECTION_QUERY.contains("defaultValue"));
    }

    #[test]
    fn decodes_schema_and_forwards_headers() {
        let data = serde_json::json!({
            "__schema": {
                "queryType": {"name": "Query"},
                "mutationType": null,
                "subscriptionType": null,
                "types": [
                    {"kind": "OBJECT", "name": "Query", "fields": [
                        {"name": "hello", "args": [], "type": {"kind": "SCALAR", "name": "String", "ofType": null},
                         "isDeprecated": false, "deprecationReason": null}
                    ]},
                    {"kind": "SCALAR", "name": "String"}
                ],
                "directives": []
            }
        });
        let transport = canned(GraphQLResponse {
            data: Some(data),
            errors: vec![],
        });
        let mut headers = BTreeMap::new();
        headers.insert("Authorization".to_string(), "Bearer x".to_string());

        let schema = fetch_schema(&transport, &headers).unwrap();
        assert_eq!(schema.root(Operation::Query).unwrap().name(), "Query");
        assert!(schema.root(Operation::Mutation).is_none());
        assert_eq!(schema.types.len(), 2);

        let seen = transport.seen.borrow();
        assert_eq!(seen[0].headers["Authorization"], "Bearer x");
        assert_eq!(seen[0].operation_name.as_deref(), Some(INTROSPECTION_OPERATION));
    }

    #[test]
    fn error_list_without_data_fails() {
        let transport = canned(GraphQLResponse {
            data: None,
            errors: vec![RemoteError {
                message: "introspection disabled".to_string(),
                locations: vec![],
                path: vec![],
                extensions: None,
            }],
        });
        let err = fetch_schema(&transport, &BTreeMap::new()).unwrap_err();
        assert!(matches!(err, GqlError::SchemaFetch(ref m) if m.contains("introspection disabled")));
    }

    #[test]
    fn missing_schema_member_is_malformed() {
        let err = schema_from_data(serde_json::json!({"other": 1})).unwrap_err();
        assert!(matches!(err, GqlError::SchemaFetch(_)));
    }
}
