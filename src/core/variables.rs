//! `key=value` assignments from the command line: query variables and HTTP
//! headers.

use crate::core::error::GqlError;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Splits `key=value` at the first `=`; the value may contain further `=`.
pub fn parse_assignment(raw: &str) -> Result<(String, String), GqlError> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(GqlError::ArgumentError(format!(
            "{:?} must be in {{key}}={{value}} format",
            raw
        ))),
    }
}

/// Query variables collected from repeated `--set key=value` options.
///
/// Values are parsed as JSON when they are valid JSON and kept as plain
/// strings otherwise. Dotted keys address nested objects: `a.b=1` becomes
/// `{"a": {"b": 1}}`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Variables {
    flat: BTreeMap<String, Value>,
}

impl Variables {
    pub fn set(&mut self, raw: &str) -> Result<(), GqlError> {
        let (key, value) = parse_assignment(raw)?;
        let value = serde_json::from_str(&value).unwrap_or(Value::String(value));
        self.flat.insert(key, value);
        Ok(())
    }

    pub fn from_assignments<S: AsRef<str>>(raw: &[S]) -> Result<Self, GqlError> {
        let mut vars = Variables::default();
        for assignment in raw {
            vars.set(assignment.as_ref())?;
        }
        Ok(vars)
    }

    pub fn unflatten(&self) -> Map<String, Value> {
        let mut root = Map::new();
        for (key, value) in &self.flat {
            let segments: Vec<&str> = key.split('.').collect();
            insert_path(&mut root, &segments, value.clone());
        }
        root
    }
}

fn insert_path(map: &mut Map<String, Value>, segments: &[&str], value: Value) {
    let Some((head, tail)) = segments.split_first() else {
        return;
    };
    if tail.is_empty() {
        map.insert(head.to_string(), value);
        return;
    }
    let entry = map
        .entry(head.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !entry.is_object() {
        *entry = Value::Object(Map::new());
    }
    if let Value::Object(inner) = entry {
        insert_path(inner, tail, value);
    }
}
