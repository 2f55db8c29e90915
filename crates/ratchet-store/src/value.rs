//! In-memory record model.
//!
//! A [`Record`] is a map from field name to [`Value`]. Unlike plain JSON, a
//! [`Value`] can hold raw bytes, which is how key material lives in memory
//! before the codec turns it into text.

use std::collections::BTreeMap;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{CodecError, CodecResult};

/// Field holding a record's identifier.
pub const ID_FIELD: &str = "id";

/// Field map backing a [`Record`] and [`Value::Map`].
///
/// `BTreeMap` keeps iteration order stable across runs.
pub type FieldMap = BTreeMap<String, Value>;

/// A dynamically typed record field value.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    /// No value. Dropped from maps on encode and written as `null` in lists.
    #[default]
    Undefined,
    /// JSON `null`.
    Null,
    /// A boolean.
    Bool(bool),
    /// A JSON number.
    Number(serde_json::Number),
    /// A text string.
    Text(String),
    /// Raw binary data, typically key material.
    Bytes(Vec<u8>),
    /// An ordered sequence.
    List(Vec<Value>),
    /// A nested mapping.
    Map(FieldMap),
}

impl Value {
    /// Build a value from any serializable type.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Unsupported`] if the type has a shape JSON
    /// cannot express, such as a map keyed by a non-string type or a NaN
    /// or infinite float.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> CodecResult<Self> {
        crate::finite::ensure_finite(value).map_err(|e| CodecError::Unsupported(e.to_string()))?;
        serde_json::to_value(value)
            .map(Self::from)
            .map_err(|e| CodecError::Unsupported(e.to_string()))
    }

    /// Short name of this value's kind, used in error messages.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::Text(_) => "text",
            Self::Bytes(_) => "bytes",
            Self::List(_) => "list",
            Self::Map(_) => "map",
        }
    }

    /// Borrow the text if this is a [`Value::Text`].
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow the bytes if this is a [`Value::Bytes`].
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// The value as an unsigned integer, if it is an integral number.
    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Number(n) => n.as_u64(),
            _ => None,
        }
    }

    /// Convert into plain JSON for typed deserialization.
    ///
    /// Bytes become an array of numbers so that `Vec<u8>` fields
    /// deserialize naturally. Undefined map entries are dropped.
    fn into_plain_json(self) -> serde_json::Value {
        match self {
            Self::Undefined | Self::Null => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(b),
            Self::Number(n) => serde_json::Value::Number(n),
            Self::Text(s) => serde_json::Value::String(s),
            Self::Bytes(b) => serde_json::Value::Array(
                b.into_iter().map(serde_json::Value::from).collect(),
            ),
            Self::List(items) => {
                serde_json::Value::Array(items.into_iter().map(Self::into_plain_json).collect())
            },
            Self::Map(map) => serde_json::Value::Object(
                map.into_iter()
                    .filter(|(_, v)| !matches!(v, Self::Undefined))
                    .map(|(k, v)| (k, v.into_plain_json()))
                    .collect(),
            ),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(n),
            serde_json::Value::String(s) => Self::Text(s),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Self::from).collect())
            },
            serde_json::Value::Object(map) => {
                Self::Map(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            },
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Self::Bytes(b)
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Self::Bytes(b.to_vec())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::List(items)
    }
}

impl From<FieldMap> for Value {
    fn from(map: FieldMap) -> Self {
        Self::Map(map)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Self::Map(record.fields)
    }
}

/// JSON has no NaN or infinity, so only finite floats convert.
impl TryFrom<f64> for Value {
    type Error = CodecError;

    fn try_from(f: f64) -> CodecResult<Self> {
        serde_json::Number::from_f64(f)
            .map(Self::Number)
            .ok_or_else(|| CodecError::Unsupported(format!("non-finite float {f}")))
    }
}

macro_rules! impl_from_integer {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(n: $t) -> Self {
                    Self::Number(serde_json::Number::from(n))
                }
            }
        )*
    };
}

impl_from_integer!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Self::Null, Into::into)
    }
}

/// A stored record: a field map that carries an `id` field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: FieldMap,
}

impl Record {
    /// Create an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a record holding only an `id` field.
    #[must_use]
    pub fn with_id(id: impl Into<Value>) -> Self {
        Self::new().with(ID_FIELD, id)
    }

    /// Builder-style field insert.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Build a record from any serializable struct or map.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Unsupported`] if the value cannot be expressed
    /// as JSON, or [`CodecError::NotARecord`] if it is not an object.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> CodecResult<Self> {
        Self::try_from(Value::from_serialize(value)?)
    }

    /// Deserialize the record into a typed struct.
    ///
    /// Binary fields are presented as arrays of numbers, so they map onto
    /// `Vec<u8>` fields.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Malformed`] if the record does not match `T`.
    pub fn deserialize<T: DeserializeOwned>(&self) -> CodecResult<T> {
        let json = Value::Map(self.fields.clone()).into_plain_json();
        Ok(serde_json::from_value(json)?)
    }

    /// Get a field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Get a text field.
    #[must_use]
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    /// Get a binary field.
    #[must_use]
    pub fn get_bytes(&self, field: &str) -> Option<&[u8]> {
        self.get(field).and_then(Value::as_bytes)
    }

    /// Set a field, returning the previous value.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(field.into(), value.into())
    }

    /// Remove a field, returning its value.
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.fields.remove(field)
    }

    /// The record's `id` field, if present.
    #[must_use]
    pub fn id(&self) -> Option<&Value> {
        self.get(ID_FIELD)
    }

    /// Iterate over fields in stable order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Borrow the underlying field map.
    #[must_use]
    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    /// Consume the record, returning its field map.
    #[must_use]
    pub fn into_fields(self) -> FieldMap {
        self.fields
    }
}

impl From<FieldMap> for Record {
    fn from(fields: FieldMap) -> Self {
        Self { fields }
    }
}

impl TryFrom<Value> for Record {
    type Error = CodecError;

    fn try_from(value: Value) -> CodecResult<Self> {
        match value {
            Value::Map(fields) => Ok(Self { fields }),
            other => Err(CodecError::NotARecord(other.kind())),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_and_accessors() {
        let record = Record::with_id("u1")
            .with("publicKey", vec![1u8, 2, 3])
            .with("name", "alice")
            .with("attempts", 2u32);

        assert_eq!(record.id(), Some(&Value::from("u1")));
        assert_eq!(record.get_bytes("publicKey"), Some(&[1u8, 2, 3][..]));
        assert_eq!(record.get_str("name"), Some("alice"));
        assert_eq!(record.get("attempts").and_then(Value::as_u64), Some(2));
        assert_eq!(record.len(), 4);
    }

    #[test]
    fn test_non_finite_float_is_unsupported() {
        assert!(matches!(
            Value::try_from(f64::NAN),
            Err(CodecError::Unsupported(_))
        ));
        assert!(matches!(
            Value::try_from(f64::INFINITY),
            Err(CodecError::Unsupported(_))
        ));
        assert!(Value::try_from(0.25).is_ok());
    }

    #[test]
    fn test_from_serialize_rejects_non_finite_floats() {
        #[derive(Serialize)]
        struct Item {
            id: &'static str,
            ratio: f64,
        }

        let err = Record::from_serialize(&Item {
            id: "x",
            ratio: f64::NAN,
        })
        .unwrap_err();
        assert!(matches!(err, CodecError::Unsupported(ref msg) if msg.contains("non-finite")));

        let ok = Record::from_serialize(&Item { id: "x", ratio: 0.5 }).unwrap();
        assert_eq!(ok.get("ratio"), Some(&Value::try_from(0.5).unwrap()));
    }

    #[test]
    fn test_from_serialize_struct() {
        #[derive(Serialize)]
        struct Conversation {
            id: String,
            active: bool,
        }

        let record = Record::from_serialize(&Conversation {
            id: "c1".into(),
            active: true,
        })
        .unwrap();
        assert_eq!(record.get_str("id"), Some("c1"));
        assert_eq!(record.get("active"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_from_serialize_rejects_non_string_keys() {
        let mut map = std::collections::HashMap::new();
        map.insert(vec![1u8, 2], "value");
        let err = Value::from_serialize(&map).unwrap_err();
        assert!(matches!(err, CodecError::Unsupported(_)));
    }

    #[test]
    fn test_from_serialize_rejects_scalars_as_records() {
        let err = Record::from_serialize(&42).unwrap_err();
        assert!(matches!(err, CodecError::NotARecord("number")));
    }

    #[test]
    fn test_deserialize_presents_bytes_as_numbers() {
        #[derive(serde::Deserialize)]
        struct PreKey {
            id: u32,
            #[serde(rename = "pubKey")]
            pub_key: Vec<u8>,
        }

        let record = Record::with_id(7u32).with("pubKey", vec![0u8, 255]);
        let typed: PreKey = record.deserialize().unwrap();
        assert_eq!(typed.id, 7);
        assert_eq!(typed.pub_key, vec![0, 255]);
    }
}
