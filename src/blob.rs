//! Content-addressed blobs (the "item" of the Registers Specification).

use crate::canonical::encode_blob;
use crate::error::{RegisterError, Result};
use crate::hash::Hash;
use std::collections::BTreeMap;

/// A blob attribute value: a scalar string, or an ordered list of strings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    One(String),
    Many(Vec<String>),
}

impl Value {
    /// The scalar string, if this is a `One`.
    pub fn as_one(&self) -> Option<&str> {
        match self {
            Value::One(s) => Some(s),
            Value::Many(_) => None,
        }
    }

    /// The list of strings, if this is a `Many`.
    pub fn as_many(&self) -> Option<&[String]> {
        match self {
            Value::Many(items) => Some(items),
            Value::One(_) => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::One(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::One(s)
    }
}

impl From<Vec<String>> for Value {
    fn from(v: Vec<String>) -> Self {
        Value::Many(v)
    }
}

/// An immutable, content-addressed blob: an unordered set of attribute name
/// to value pairs. Equality and hashing use the digest, not the data.
#[derive(Clone, Debug)]
pub struct Blob {
    data: BTreeMap<String, Value>,
}

impl Blob {
    /// Build a blob from any iterable of `(name, value)` pairs.
    pub fn new(pairs: impl IntoIterator<Item = (String, Value)>) -> Self {
        Self {
            data: pairs.into_iter().collect(),
        }
    }

    /// The canonical JSON encoding: sorted keys, minimal separators, raw
    /// UTF-8 for non-ASCII characters.
    pub fn to_canonical_json(&self) -> String {
        encode_blob(&self.data)
    }

    /// Parse a blob from its canonical (or any valid) JSON object form.
    ///
    /// Attribute values must be strings or arrays of strings (spec §3: numbers
    /// and booleans never appear in blobs); any other scalar is rejected with
    /// [`RegisterError::RepresentationError`] rather than silently coerced.
    pub fn from_json(s: &str) -> Result<Self> {
        let raw: BTreeMap<String, serde_json::Value> = serde_json::from_str(s)?;
        let mut data = BTreeMap::new();

        for (k, v) in raw {
            let value = match v {
                serde_json::Value::String(s) => Value::One(s),
                serde_json::Value::Array(items) => {
                    let mut strings = Vec::with_capacity(items.len());
                    for item in items {
                        match item {
                            serde_json::Value::String(s) => strings.push(s),
                            other => {
                                return Err(RegisterError::RepresentationError {
                                    attr: k.clone(),
                                    value: other.to_string(),
                                    datatype: "string".to_string(),
                                })
                            }
                        }
                    }
                    Value::Many(strings)
                }
                serde_json::Value::Null => continue,
                other => {
                    return Err(RegisterError::RepresentationError {
                        attr: k.clone(),
                        value: other.to_string(),
                        datatype: "string".to_string(),
                    })
                }
            };
            data.insert(k, value);
        }

        Ok(Self { data })
    }

    /// The SHA-256 digest of the canonical JSON form.
    pub fn digest(&self) -> Hash {
        Hash::sha256(self.to_canonical_json().as_bytes())
    }

    /// Look up an attribute's value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Look up a scalar attribute's value as a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_one)
    }

    /// Iterate attribute pairs in sorted-key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.data.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The underlying attribute map.
    pub fn as_map(&self) -> &BTreeMap<String, Value> {
        &self.data
    }
}

impl PartialEq for Blob {
    fn eq(&self, other: &Self) -> bool {
        self.digest() == other.digest()
    }
}
impl Eq for Blob {}
