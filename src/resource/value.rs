//! Attribute values exchanged with the host
//!
//! The host runtime stores resource state as a tree of typed attributes.
//! [`AttrValue`] is the plain intermediate form of that tree; marshaling it to
//! the host's wire format belongs to the host adapter.

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    Null,
    /// Not known until apply time
    Unknown,
    Bool(bool),
    Int64(i64),
    String(String),
    List(Vec<AttrValue>),
    Object(BTreeMap<String, AttrValue>),
}

impl AttrValue {
    pub fn string(s: impl Into<String>) -> Self {
        AttrValue::String(s.into())
    }

    pub fn object<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, AttrValue)>,
        K: Into<String>,
    {
        AttrValue::Object(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, AttrValue::Null)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, AttrValue::Unknown)
    }

    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        match self {
            AttrValue::Object(map) => map.get(key),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttrValue::Int64(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[AttrValue]> {
        match self {
            AttrValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Convert an object into the untyped mapping the query builders take.
    ///
    /// Null and unknown attributes are left out. Anything that is not an
    /// object yields an empty mapping.
    pub fn to_filter_args(&self) -> Map<String, Value> {
        let AttrValue::Object(fields) = self else {
            return Map::new();
        };

        fields
            .iter()
            .filter(|(_, v)| !v.is_null() && !v.is_unknown())
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect()
    }

    /// Plain JSON rendering. Unknown renders as null.
    pub fn to_json(&self) -> Value {
        match self {
            AttrValue::Null | AttrValue::Unknown => Value::Null,
            AttrValue::Bool(b) => Value::Bool(*b),
            AttrValue::Int64(i) => Value::from(*i),
            AttrValue::String(s) => Value::String(s.clone()),
            AttrValue::List(items) => Value::Array(items.iter().map(AttrValue::to_json).collect()),
            AttrValue::Object(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }

    /// Inverse of [`to_json`](Self::to_json). Non-integer numbers become strings.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => AttrValue::Null,
            Value::Bool(b) => AttrValue::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => AttrValue::Int64(i),
                None => AttrValue::String(n.to_string()),
            },
            Value::String(s) => AttrValue::String(s.clone()),
            Value::Array(items) => AttrValue::List(items.iter().map(AttrValue::from_json).collect()),
            Value::Object(fields) => AttrValue::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), AttrValue::from_json(v)))
                    .collect(),
            ),
        }
    }
}

impl From<i64> for AttrValue {
    fn from(i: i64) -> Self {
        AttrValue::Int64(i)
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        AttrValue::Bool(b)
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::String(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::String(s)
    }
}

impl<T: Into<AttrValue>> From<Option<T>> for AttrValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(AttrValue::Null)
    }
}

impl Serialize for AttrValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}
