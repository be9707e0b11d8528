//! Query-string parameters.
//!
//! Values are scalars or absent. Absent values are dropped before encoding,
//! so a `None` never shows up as `key=` in the URL.

use std::fmt;

use url::form_urlencoded;

/// A scalar query-parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryValue::String(s) => f.write_str(s),
            QueryValue::Integer(n) => write!(f, "{n}"),
            QueryValue::Float(n) => write!(f, "{n}"),
            QueryValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for QueryValue {
    fn from(v: &str) -> Self {
        QueryValue::String(v.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(v: String) -> Self {
        QueryValue::String(v)
    }
}

impl From<i32> for QueryValue {
    fn from(v: i32) -> Self {
        QueryValue::Integer(v.into())
    }
}

impl From<i64> for QueryValue {
    fn from(v: i64) -> Self {
        QueryValue::Integer(v)
    }
}

impl From<u32> for QueryValue {
    fn from(v: u32) -> Self {
        QueryValue::Integer(v.into())
    }
}

impl From<f64> for QueryValue {
    fn from(v: f64) -> Self {
        QueryValue::Float(v)
    }
}

impl From<bool> for QueryValue {
    fn from(v: bool) -> Self {
        QueryValue::Bool(v)
    }
}

/// Ordered query parameters; insertion order is kept in the encoded string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    params: Vec<(String, Option<QueryValue>)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter. `None` is recorded but never encoded.
    pub fn param<V: Into<QueryValue>>(mut self, key: impl Into<String>, value: Option<V>) -> Self {
        self.push(key, value.map(Into::into));
        self
    }

    pub fn push(&mut self, key: impl Into<String>, value: Option<QueryValue>) {
        self.params.push((key.into(), value));
    }

    /// Present parameters with their values stringified.
    pub fn normalized(&self) -> Vec<(&str, String)> {
        self.params
            .iter()
            .filter_map(|(k, v)| v.as_ref().map(|v| (k.as_str(), v.to_string())))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.params.iter().all(|(_, v)| v.is_none())
    }

    /// `application/x-www-form-urlencoded` string, or `None` when nothing is present.
    pub fn to_query_string(&self) -> Option<String> {
        let pairs = self.normalized();
        if pairs.is_empty() {
            return None;
        }
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (k, v) in pairs {
            serializer.append_pair(k, &v);
        }
        Some(serializer.finish())
    }
}
