use serde::{Serialize, Deserialize};
use std::collections::BTreeMap;
use chrono::Utc;

/// Document value tree. Entries hold one of these under their key; indexes
/// only ever look at the top-level `Map` variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Seq(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Interpret a sequence of numbers as a float32 vector. Any non-numeric
    /// element makes the whole value a non-vector.
    pub fn as_f32_vector(&self) -> Option<Vec<f32>> {
        let items = match self {
            Value::Seq(items) => items,
            _ => return None,
        };

        let mut out = Vec::with_capacity(items.len());
        for item in items {
            match item {
                Value::Int(n) => out.push(*n as f32),
                Value::Float(f) => out.push(*f as f32),
                _ => return None,
            }
        }
        Some(out)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else {
                    Value::Float(n.as_f64().unwrap_or(0.0))
                }
            }
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(items) => {
                Value::Seq(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(fields) => Value::Map(
                fields.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
            ),
        }
    }
}

fn is_zero(n: &i64) -> bool {
    *n == 0
}

/// A stored value plus its lifecycle metadata. `ttl == 0` means the entry
/// never expires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Entry {
    pub value: Value,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub ttl: i64,
}

impl Entry {
    pub fn new(value: Value) -> Self {
        Entry {
            value,
            timestamp: Utc::now().timestamp(),
            ttl: 0,
        }
    }

    pub fn with_ttl(value: Value, ttl_secs: i64) -> Self {
        Entry {
            value,
            timestamp: Utc::now().timestamp(),
            ttl: ttl_secs,
        }
    }

    pub fn is_expired(&self, now: i64) -> bool {
        self.ttl > 0 && now > self.timestamp + self.ttl
    }
}
