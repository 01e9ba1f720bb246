//! Typed payload model
//!
//! Payloads describe what an action did. They are a closed set of value kinds
//! so the canonical encoder is total: every `Payload` that holds only finite
//! numbers and stays within the nesting limit has exactly one encoding.
//!
//! Key order is preserved for display and round-tripping, but equality is
//! order-independent, matching the canonical encoding.

use crate::canonical::EncodingError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Numeric payload value
///
/// Equality follows the canonical encoding: `Signed(5)` and `Unsigned(5)`
/// are equal, `5` and `5.0` are not.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PayloadNumber {
    /// Signed integer
    Signed(i64),
    /// Unsigned integer too large for `i64`
    Unsigned(u64),
    /// Floating point number; must be finite to be encoded
    Float(f64),
}

impl PayloadNumber {
    /// Normalize an unsigned value, preferring `Signed` when it fits
    pub fn from_u64(value: u64) -> Self {
        i64::try_from(value).map_or(Self::Unsigned(value), Self::Signed)
    }

    /// Get the value as `f64`, lossy for very large integers
    pub fn as_f64(&self) -> f64 {
        match *self {
            Self::Signed(n) => n as f64,
            Self::Unsigned(n) => n as f64,
            Self::Float(f) => f,
        }
    }
}

impl PartialEq for PayloadNumber {
    fn eq(&self, other: &Self) -> bool {
        match (*self, *other) {
            (Self::Signed(a), Self::Signed(b)) => a == b,
            (Self::Unsigned(a), Self::Unsigned(b)) => a == b,
            (Self::Signed(a), Self::Unsigned(b)) | (Self::Unsigned(b), Self::Signed(a)) => {
                u64::try_from(a).is_ok_and(|a| a == b)
            }
            (Self::Float(a), Self::Float(b)) => {
                a == b && a.is_sign_negative() == b.is_sign_negative()
            }
            (Self::Float(_), _) | (_, Self::Float(_)) => false,
        }
    }
}

/// A single payload value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PayloadValue {
    /// JSON `null`
    Null,
    /// Boolean
    Bool(bool),
    /// Number
    Number(PayloadNumber),
    /// UTF-8 string
    String(String),
    /// Ordered sequence
    Sequence(Vec<PayloadValue>),
    /// Nested mapping
    Mapping(Payload),
}

impl PayloadValue {
    /// Convert from a JSON value
    pub fn from_json(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => {
                let number = if let Some(i) = n.as_i64() {
                    PayloadNumber::Signed(i)
                } else if let Some(u) = n.as_u64() {
                    PayloadNumber::Unsigned(u)
                } else {
                    PayloadNumber::Float(n.as_f64().unwrap_or(f64::NAN))
                };
                Self::Number(number)
            }
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::Sequence(items.into_iter().map(Self::from_json).collect()),
            Value::Object(map) => Self::Mapping(Payload(
                map.into_iter()
                    .map(|(k, v)| (k, Self::from_json(v)))
                    .collect(),
            )),
        }
    }

    /// Convert into a JSON value; non-finite floats become `null`
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;
        match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Number(PayloadNumber::Signed(n)) => Value::from(*n),
            Self::Number(PayloadNumber::Unsigned(n)) => Value::from(*n),
            Self::Number(PayloadNumber::Float(f)) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Self::String(s) => Value::String(s.clone()),
            Self::Sequence(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Mapping(payload) => payload.to_json(),
        }
    }

    /// Get the value as a mapping, if it is one
    pub fn as_mapping(&self) -> Option<&Payload> {
        match self {
            Self::Mapping(payload) => Some(payload),
            _ => None,
        }
    }
}

impl From<bool> for PayloadValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for PayloadValue {
    fn from(value: i64) -> Self {
        Self::Number(PayloadNumber::Signed(value))
    }
}

impl From<i32> for PayloadValue {
    fn from(value: i32) -> Self {
        Self::Number(PayloadNumber::Signed(i64::from(value)))
    }
}

impl From<u32> for PayloadValue {
    fn from(value: u32) -> Self {
        Self::Number(PayloadNumber::Signed(i64::from(value)))
    }
}

impl From<u64> for PayloadValue {
    fn from(value: u64) -> Self {
        Self::Number(PayloadNumber::from_u64(value))
    }
}

impl From<f64> for PayloadValue {
    fn from(value: f64) -> Self {
        Self::Number(PayloadNumber::Float(value))
    }
}

impl From<&str> for PayloadValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for PayloadValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Payload> for PayloadValue {
    fn from(value: Payload) -> Self {
        Self::Mapping(value)
    }
}

impl<T: Into<PayloadValue>> From<Vec<T>> for PayloadValue {
    fn from(values: Vec<T>) -> Self {
        Self::Sequence(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<PayloadValue>> From<Option<T>> for PayloadValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Ordered mapping of string keys to payload values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(IndexMap<String, PayloadValue>);

impl Payload {
    /// Create an empty payload
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<PayloadValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert a value, returning the previous value for that key
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<PayloadValue>,
    ) -> Option<PayloadValue> {
        self.0.insert(key.into(), value.into())
    }

    /// Look up a value by key
    pub fn get(&self, key: &str) -> Option<&PayloadValue> {
        self.0.get(key)
    }

    /// Number of top-level keys
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the payload has no keys
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &PayloadValue)> {
        self.0.iter()
    }

    /// Convert from a JSON value, which must be an object
    pub fn from_json_object(value: serde_json::Value) -> Result<Self, EncodingError> {
        match PayloadValue::from_json(value) {
            PayloadValue::Mapping(payload) => Ok(payload),
            _ => Err(EncodingError::NotAnObject),
        }
    }

    /// Parse payload JSON text, which must be an object
    pub fn from_json_str(text: &str) -> Result<Self, EncodingError> {
        let value: serde_json::Value =
            serde_json::from_str(text).map_err(|e| EncodingError::Json(e.to_string()))?;
        Self::from_json_object(value)
    }

    /// Convert into a JSON object value
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.0
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<PayloadValue>> FromIterator<(K, V)> for Payload {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
