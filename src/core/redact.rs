//! Secret scrubbing for request details written to the debug log.

use regex::Regex;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Patterns that detect credentials inside header or variable values.
static SECRET_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    vec![
        // Bearer tokens
        (
            Regex::new(r"(?i)bearer\s+[a-zA-Z0-9_\-\.=+/]{8,}").unwrap(),
            "Bearer [REDACTED]",
        ),
        // Basic auth
        (
            Regex::new(r"(?i)basic\s+[a-zA-Z0-9=+/]{8,}").unwrap(),
            "Basic [REDACTED]",
        ),
        // GitHub tokens (ghp_, gho_, ghu_, ghs_, ghr_)
        (
            Regex::new(r"(ghp|gho|ghu|ghs|ghr)_[a-zA-Z0-9_]{36,255}").unwrap(),
            "[GITHUB_TOKEN_REDACTED]",
        ),
        // Credentials embedded in URLs
        (
            Regex::new(r#"(?i)([a-z][a-z0-9+.-]*://)[^\s/'"@:]+:[^\s/'"@]+@"#).unwrap(),
            "${1}[REDACTED]@",
        ),
    ]
});

fn sensitive_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.contains("authorization")
        || lower.contains("token")
        || lower.contains("secret")
        || lower.contains("password")
        || lower.contains("cookie")
        || lower.contains("api-key")
        || lower.contains("api_key")
}

pub fn redact_string(input: &str) -> String {
    let mut result = input.to_string();
    for (pattern, replacement) in SECRET_PATTERNS.iter() {
        result = pattern.replace_all(&result, *replacement).to_string();
    }
    result
}

/// Header map safe to log: sensitive header names lose their value, the rest
/// are pattern-scanned.
pub fn redact_headers(headers: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    headers
        .iter()
        .map(|(name, value)| {
            let value = if sensitive_name(name) {
                "[REDACTED]".to_string()
            } else {
                redact_string(value)
            };
            (name.clone(), value)
        })
        .collect()
}

/// Recursively redact query variables.
pub fn redact_value(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut redacted = Map::new();
            for (key, val) in map {
                if sensitive_name(&key) {
                    redacted.insert(key, Value::String("[REDACTED]".to_string()));
                } else {
                    redacted.insert(key, redact_value(val));
                }
            }
            Value::Object(redacted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(redact_value).collect()),
        Value::String(s) => Value::String(redact_string(&s)),
        other => other,
    }
}
