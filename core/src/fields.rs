//! Static field tables translating parameter structs into wire payloads.
//!
//! # Design
//! Every request parameter struct is paired with a `FieldMap` listing, for
//! each Rust field, the name the Toggl API expects on the wire. Most entries
//! are identical snake_case names; the few camelCase ones (`postedFields`,
//! the project list filters) are what the service expects.
//!
//! Fields that serialize to `null` are omitted entirely.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::{ApiError, Result};
use crate::query::{Query, QueryValue};

/// `(rust_field, wire_name)` pairs for one parameter struct.
#[derive(Debug, Clone, Copy)]
pub struct FieldMap {
    fields: &'static [(&'static str, &'static str)],
}

impl FieldMap {
    pub const fn new(fields: &'static [(&'static str, &'static str)]) -> Self {
        Self { fields }
    }

    pub fn entries(&self) -> &'static [(&'static str, &'static str)] {
        self.fields
    }

    pub fn wire_name(&self, field: &str) -> Option<&'static str> {
        self.fields
            .iter()
            .find(|(rust, _)| *rust == field)
            .map(|(_, wire)| *wire)
    }

    /// Map `params` to a JSON object keyed by wire names.
    pub fn to_body<T: Serialize>(&self, params: &T) -> Result<Value> {
        let map = self
            .remap(params)?
            .into_iter()
            .map(|(wire, value)| (wire.to_string(), value))
            .collect::<Map<String, Value>>();
        Ok(Value::Object(map))
    }

    /// Map `params` to query parameters keyed by wire names. Arrays become
    /// comma-separated lists.
    pub fn to_query<T: Serialize>(&self, params: &T) -> Result<Query> {
        let mut query = Query::new();
        for (wire, value) in self.remap(params)? {
            let value = query_value(wire, value)?;
            query.push(wire, Some(value));
        }
        Ok(query)
    }

    /// Present fields as `(wire_name, value)` in table order.
    fn remap<T: Serialize>(&self, params: &T) -> Result<Vec<(&'static str, Value)>> {
        let mut source = match serde_json::to_value(params) {
            Ok(Value::Object(map)) => map,
            Ok(other) => {
                return Err(ApiError::Serialization(format!(
                    "expected parameters to serialize as an object, got {other}"
                )))
            }
            Err(e) => return Err(ApiError::Serialization(e.to_string())),
        };

        let mut out = Vec::with_capacity(self.fields.len());
        for (field, wire) in self.fields {
            match source.remove(*field) {
                Some(Value::Null) | None => {}
                Some(value) => out.push((*wire, value)),
            }
        }
        for (field, _) in source {
            warn!(field = %field, "parameter has no wire mapping and was dropped");
        }
        Ok(out)
    }
}

fn query_value(key: &str, value: Value) -> Result<QueryValue> {
    match value {
        Value::String(s) => Ok(QueryValue::String(s)),
        Value::Bool(b) => Ok(QueryValue::Bool(b)),
        Value::Number(n) => Ok(match n.as_i64() {
            Some(i) => QueryValue::Integer(i),
            None => QueryValue::String(n.to_string()),
        }),
        Value::Array(items) => {
            let joined = items
                .into_iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s),
                    Value::Number(n) => Ok(n.to_string()),
                    Value::Bool(b) => Ok(b.to_string()),
                    other => Err(ApiError::Serialization(format!(
                        "query parameter `{key}` holds a non-scalar item: {other}"
                    ))),
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(QueryValue::String(joined.join(",")))
        }
        other => Err(ApiError::Serialization(format!(
            "query parameter `{key}` is not a scalar: {other}"
        ))),
    }
}

/// Panics unless every field `params` serializes is listed in `map`, and
/// every table entry names a real field.
#[cfg(test)]
pub(crate) fn assert_table_covers<T: Serialize>(map: &FieldMap, params: &T) {
    let keys: Vec<String> = match serde_json::to_value(params).unwrap() {
        Value::Object(obj) => obj.keys().cloned().collect(),
        other => panic!("not an object: {other}"),
    };
    for key in &keys {
        assert!(map.wire_name(key).is_some(), "field `{key}` has no wire mapping");
    }
    for (field, _) in map.entries() {
        assert!(keys.iter().any(|k| k == field), "table entry `{field}` is not a field");
    }
}
