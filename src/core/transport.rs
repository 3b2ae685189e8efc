//! GraphQL-over-HTTP request/response types and the transport seam.

use crate::core::error::GqlError;
use crate::core::redact;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::LazyLock;
use std::time::Duration;

// A string literal (block strings split into adjacent literals) or a run of
// whitespace.
static LITERAL_OR_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""(?:[^"\\]|\\.)*"|[\s\p{Zs}]+"#).expect("static regex")
});

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQLRequest {
    pub query: String,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub variables: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,
    #[serde(skip)]
    pub headers: BTreeMap<String, String>,
}

impl GraphQLRequest {
    pub fn new(query: impl Into<String>) -> Self {
        GraphQLRequest {
            query: query.into(),
            ..GraphQLRequest::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub line: u64,
    pub column: u64,
}

/// Error object from a GraphQL response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<Location>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphQLResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<RemoteError>,
}

impl GraphQLResponse {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Sends one GraphQL request and returns the decoded body. Remote GraphQL
/// errors are part of the `Ok` response; `Err` means the exchange itself
/// failed.
pub trait Transport {
    fn execute(&self, request: &GraphQLRequest) -> Result<GraphQLResponse, GqlError>;
}

/// Turns newlines and whitespace runs into single spaces. String literals
/// are copied unchanged.
pub fn minify_query(query: &str) -> String {
    LITERAL_OR_WHITESPACE
        .replace_all(query.trim(), |caps: &regex::Captures<'_>| {
            let matched = &caps[0];
            if matched.starts_with('"') {
                matched.to_string()
            } else {
                " ".to_string()
            }
        })
        .into_owned()
}

/// Blocking JSON-over-POST transport.
pub struct HttpTransport {
    endpoint: String,
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>, timeout: Option<Duration>) -> Result<Self, GqlError> {
        let endpoint = endpoint.into();
        if endpoint.is_empty() {
            return Err(GqlError::Transport("endpoint cannot be empty".to_string()));
        }
        reqwest::Url::parse(&endpoint)
            .map_err(|e| GqlError::Transport(format!("invalid endpoint {}: {}", endpoint, e)))?;
        let mut builder = reqwest::blocking::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| GqlError::Transport(format!("failed to build http client: {}", e)))?;
        Ok(HttpTransport { endpoint, client })
    }
}

impl Transport for HttpTransport {
    fn execute(&self, request: &GraphQLRequest) -> Result<GraphQLResponse, GqlError> {
        let body = GraphQLRequest {
            query: minify_query(&request.query),
            ..request.clone()
        };
        let variables = redact::redact_value(Value::Object(body.variables.clone()));
        tracing::debug!(
            endpoint = %redact::redact_string(&self.endpoint),
            query = %body.query,
            variables = %variables,
            headers = ?redact::redact_headers(&body.headers),
            "sending graphql request"
        );

        let mut call = self.client.post(&self.endpoint).json(&body);
        for (name, value) in &body.headers {
            call = call.header(name.as_str(), value.as_str());
        }
        let resp = call
            .send()
            .map_err(|e| GqlError::Transport(format!("failed to reach {}: {}", self.endpoint, e)))?;

        let status = resp.status();
        let text = resp
            .text()
            .map_err(|e| GqlError::Transport(format!("failed to read response: {}", e)))?;
        // GraphQL servers commonly answer validation failures with 4xx and a
        // regular error body; only give up when the body is not a response.
        match serde_json::from_str::<GraphQLResponse>(&text) {
            Ok(decoded) if decoded.data.is_some() || decoded.has_errors() => Ok(decoded),
            _ if !status.is_success() => Err(GqlError::Transport(format!(
                "http error {}: {}",
                status,
                text.trim()
            ))),
            Ok(decoded) => Ok(decoded),
            Err(e) => Err(GqlError::Transport(format!("malformed response body: {}", e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minify_collapses_whitespace() {
        let q = "query {\n    viewer {\n        id\n    }\n}\n";
        assert_eq!(minify_query(q), "query { viewer { id } }");
    }

    #[test]
    fn minify_keeps_string_literals() {
        let q = "query {\n  search(term: \"ada  lovelace\") {  __typename }\n}";
        assert_eq!(
            minify_query(q),
            "query { search(term: \"ada  lovelace\") { __typename } }"
        );
        let escaped = r#"query { a(s: "say \"hi  there\"  ok") }"#;
        assert_eq!(minify_query(escaped), escaped);
    }

    #[test]
    fn request_serializes_wire_names() {
        let mut req = GraphQLRequest::new("query { a }");
        req.operation_name = Some("Op".to_string());
        req.variables.insert("x".to_string(), Value::from(1));
        req.headers.insert("X-Skip".to_string(), "1".to_string());
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"query": "query { a }", "variables": {"x": 1}, "operationName": "Op"})
        );
        let bare = serde_json::to_value(GraphQLRequest::new("{ a }")).unwrap();
        assert_eq!(bare, serde_json::json!({"query": "{ a }"}));
    }

    #[test]
    fn response_decodes_errors() {
        let body = r#"{"data": null, "errors": [{"message": "boom", "locations": [{"line": 1, "column": 3}], "path": ["a", 0], "extensions": {"code": "X"}}]}"#;
        let resp: GraphQLResponse = serde_json::from_str(body).unwrap();
        assert!(resp.data.is_none());
        assert!(resp.has_errors());
        assert_eq!(resp.errors[0].message, "boom");
        assert_eq!(resp.errors[0].locations[0].column, 3);
        assert_eq!(resp.errors[0].path.len(), 2);
    }

    #[test]
    fn empty_endpoint_is_rejected() {
        assert!(HttpTransport::new("", None).is_err());
        assert!(HttpTransport::new("not a url", None).is_err());
    }
}
