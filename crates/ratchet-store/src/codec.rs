//! Record codec: [`Record`] ⇄ JSON text.
//!
//! Key material is binary, but the backend only stores strings. The codec
//! maps every byte to the `char` with the same code point (Latin-1 style),
//! so a 32-byte key becomes a 32-char string. This is *not* base64 or hex:
//! the stored form must stay compatible with records written by existing
//! clients, which use exactly this mapping.
//!
//! Which fields are binary is declared by a [`RecordSchema`]. On decode, a
//! schema field holding a string is turned back into bytes wherever it
//! appears in the record tree; on encode, a schema field must hold bytes or
//! null so that the round-trip is exact.

use std::collections::BTreeSet;

use serde_json::Value as Json;

use crate::error::{CodecError, CodecResult};
use crate::value::{FieldMap, Record, Value};

/// Field names that carry cryptographic key material.
pub const KEY_MATERIAL_FIELDS: [&str; 4] = ["privKey", "privateKey", "pubKey", "publicKey"];

/// Declares which field names of a record kind hold binary data.
///
/// Binary fields are matched by name at any nesting depth, so a pre-key's
/// `keyPair.pubKey` is covered by declaring `pubKey`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSchema {
    binary_fields: BTreeSet<String>,
}

impl RecordSchema {
    /// Schema with the four key-material fields declared binary.
    #[must_use]
    pub fn key_material() -> Self {
        Self::with_binary_fields(KEY_MATERIAL_FIELDS)
    }

    /// Schema with no binary fields. Everything round-trips as plain JSON.
    #[must_use]
    pub fn opaque() -> Self {
        Self {
            binary_fields: BTreeSet::new(),
        }
    }

    /// Schema declaring the given field names binary.
    #[must_use]
    pub fn with_binary_fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            binary_fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether `field` is declared binary.
    #[must_use]
    pub fn is_binary(&self, field: &str) -> bool {
        self.binary_fields.contains(field)
    }

    /// Declared binary field names, in sorted order.
    pub fn binary_fields(&self) -> impl Iterator<Item = &str> {
        self.binary_fields.iter().map(String::as_str)
    }
}

impl Default for RecordSchema {
    fn default() -> Self {
        Self::key_material()
    }
}

/// Latin-1 style byte ⇄ string mapping.
pub mod latin1 {
    /// Map each byte to the `char` with that code point.
    #[must_use]
    pub fn encode(bytes: &[u8]) -> String {
        bytes.iter().map(|&b| char::from(b)).collect()
    }

    /// Map each `char` back to a byte.
    ///
    /// Returns `None` if any char is above `U+00FF`.
    #[must_use]
    pub fn decode(text: &str) -> Option<Vec<u8>> {
        text.chars().map(|c| u8::try_from(c).ok()).collect()
    }
}

/// Encoder/decoder bound to one [`RecordSchema`].
#[derive(Debug, Clone, Default)]
pub struct Codec {
    schema: RecordSchema,
}

impl Codec {
    /// Create a codec for the given schema.
    #[must_use]
    pub fn new(schema: RecordSchema) -> Self {
        Self { schema }
    }

    /// The schema this codec applies.
    #[must_use]
    pub fn schema(&self) -> &RecordSchema {
        &self.schema
    }

    /// Convert a value into its JSON-safe form.
    ///
    /// Returns `Ok(None)` for [`Value::Undefined`], which callers treat as
    /// "omit this field".
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::NotBinary`] if a schema-declared binary field
    /// holds anything but bytes or null.
    pub fn canonicalize(&self, value: &Value) -> CodecResult<Option<Json>> {
        let json = match value {
            Value::Undefined => return Ok(None),
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Number(n) => Json::Number(n.clone()),
            Value::Text(s) => Json::String(s.clone()),
            Value::Bytes(b) => Json::String(latin1::encode(b)),
            Value::List(items) => Json::Array(
                items
                    .iter()
                    .map(|item| Ok(self.canonicalize(item)?.unwrap_or(Json::Null)))
                    .collect::<CodecResult<_>>()?,
            ),
            Value::Map(fields) => Json::Object(self.canonicalize_fields(fields)?),
        };
        Ok(Some(json))
    }

    fn canonicalize_fields(&self, fields: &FieldMap) -> CodecResult<serde_json::Map<String, Json>> {
        let mut out = serde_json::Map::new();
        for (name, value) in fields {
            if self.schema.is_binary(name)
                && !matches!(value, Value::Bytes(_) | Value::Null | Value::Undefined)
            {
                return Err(CodecError::NotBinary {
                    field: name.clone(),
                    found: value.kind(),
                });
            }
            if let Some(json) = self.canonicalize(value)? {
                out.insert(name.clone(), json);
            }
        }
        Ok(out)
    }

    /// Encode a record as JSON text.
    ///
    /// # Errors
    ///
    /// Propagates [`canonicalize`](Self::canonicalize) failures.
    pub fn encode(&self, record: &Record) -> CodecResult<String> {
        let object = Json::Object(self.canonicalize_fields(record.fields())?);
        Ok(serde_json::to_string(&object)?)
    }

    /// Decode JSON text into a record, restoring binary fields.
    ///
    /// A binary field whose value is not a string (null, a number, an
    /// object) is left as parsed.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Malformed`] for invalid JSON,
    /// [`CodecError::NotARecord`] if the text is not a JSON object, and
    /// [`CodecError::NotLatin1`] if a binary field cannot be mapped back
    /// to bytes.
    pub fn decode(&self, text: &str) -> CodecResult<Record> {
        let json: Json = serde_json::from_str(text)?;
        Record::try_from(self.revive(json)?)
    }

    fn revive(&self, json: Json) -> CodecResult<Value> {
        Ok(match json {
            Json::Array(items) => Value::List(
                items
                    .into_iter()
                    .map(|item| self.revive(item))
                    .collect::<CodecResult<_>>()?,
            ),
            Json::Object(map) => {
                let mut fields = FieldMap::new();
                for (name, value) in map {
                    let revived = match value {
                        Json::String(s) if self.schema.is_binary(&name) => {
                            let bytes = latin1::decode(&s).ok_or_else(|| CodecError::NotLatin1 {
                                field: name.clone(),
                            })?;
                            Value::Bytes(bytes)
                        },
                        other => self.revive(other)?,
                    };
                    fields.insert(name, revived);
                }
                Value::Map(fields)
            },
            scalar => Value::from(scalar),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> Codec {
        Codec::default()
    }

    #[test]
    fn test_latin1_maps_each_byte_to_one_char() {
        let text = latin1::encode(&[0x00, 0xFF, 0x10]);
        assert_eq!(text.chars().count(), 3);
        assert_eq!(text, "\u{0}\u{ff}\u{10}");
        assert_eq!(latin1::decode(&text), Some(vec![0x00u8, 0xFF, 0x10]));
    }

    #[test]
    fn test_latin1_rejects_wide_chars() {
        assert_eq!(latin1::decode("ok\u{100}"), None);
    }

    #[test]
    fn test_bytes_are_not_base64_or_hex() {
        let record = Record::with_id("u1").with("publicKey", vec![b'A', b'B']);
        let text = codec().encode(&record).unwrap();
        assert_eq!(text, r#"{"id":"u1","publicKey":"AB"}"#);
    }

    #[test]
    fn test_identity_key_round_trip_is_byte_exact() {
        let record = Record::with_id("u1").with("publicKey", vec![0x00u8, 0xFF, 0x10]);
        let decoded = codec().decode(&codec().encode(&record).unwrap()).unwrap();
        assert_eq!(decoded.get_bytes("publicKey"), Some(&[0x00, 0xFF, 0x10][..]));
        assert_eq!(decoded, record);
    }

    #[test]
    fn test_all_byte_values_round_trip() {
        let all: Vec<u8> = (0..=255).collect();
        let record = Record::with_id("k").with("privKey", all.clone());
        let decoded = codec().decode(&codec().encode(&record).unwrap()).unwrap();
        assert_eq!(decoded.get_bytes("privKey"), Some(all.as_slice()));
    }

    #[test]
    fn test_nested_key_material_is_revived() {
        let key_pair: FieldMap = [
            ("pubKey".to_owned(), Value::from(vec![1u8, 2])),
            ("privKey".to_owned(), Value::from(vec![3u8, 4])),
        ]
        .into_iter()
        .collect();
        let record = Record::with_id(5u32)
            .with("keyPair", key_pair)
            .with("history", vec![Value::Map(
                [("publicKey".to_owned(), Value::from(vec![9u8]))]
                    .into_iter()
                    .collect(),
            )]);

        let decoded = codec().decode(&codec().encode(&record).unwrap()).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn test_plain_fields_round_trip_as_json() {
        let nested: FieldMap = [("depth".to_owned(), Value::from(2u8))].into_iter().collect();
        let record = Record::with_id("c1")
            .with("name", "Alice")
            .with("unread", 3i64)
            .with("ratio", Value::try_from(0.5).unwrap())
            .with("archived", false)
            .with("avatar", Value::Null)
            .with("members", vec![Value::from("a"), Value::from("b")])
            .with("meta", nested);

        let decoded = codec().decode(&codec().encode(&record).unwrap()).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn test_undefined_fields_are_omitted() {
        let record = Record::with_id("x").with("gone", Value::Undefined);
        let text = codec().encode(&record).unwrap();
        assert_eq!(text, r#"{"id":"x"}"#);
    }

    #[test]
    fn test_undefined_list_items_become_null() {
        let record = Record::with_id("x").with("items", vec![Value::Undefined, Value::from(1u8)]);
        let text = codec().encode(&record).unwrap();
        assert_eq!(text, r#"{"id":"x","items":[null,1]}"#);
    }

    #[test]
    fn test_null_key_material_is_left_alone() {
        let decoded = codec()
            .decode(r#"{"id":"x","pubKey":null,"privKey":42}"#)
            .unwrap();
        assert_eq!(decoded.get("pubKey"), Some(&Value::Null));
        assert_eq!(decoded.get("privKey").and_then(Value::as_u64), Some(42));
    }

    #[test]
    fn test_encode_rejects_text_in_binary_field() {
        let record = Record::with_id("x").with("publicKey", "not bytes");
        let err = codec().encode(&record).unwrap_err();
        assert!(matches!(
            err,
            CodecError::NotBinary { ref field, found: "text" } if field == "publicKey"
        ));
    }

    #[test]
    fn test_opaque_schema_keeps_text_fields() {
        let opaque = Codec::new(RecordSchema::opaque());
        let record = Record::with_id("x").with("publicKey", "plain text");
        let decoded = opaque.decode(&opaque.encode(&record).unwrap()).unwrap();
        assert_eq!(decoded.get_str("publicKey"), Some("plain text"));
    }

    #[test]
    fn test_custom_schema_only_revives_declared_fields() {
        let schema = RecordSchema::with_binary_fields(["signature"]);
        let codec = Codec::new(schema);
        let decoded = codec
            .decode(r#"{"id":"x","signature":"\u0001","pubKey":"text"}"#)
            .unwrap();
        assert_eq!(decoded.get_bytes("signature"), Some(&[1u8][..]));
        assert_eq!(decoded.get_str("pubKey"), Some("text"));
    }

    #[test]
    fn test_decode_rejects_invalid_json() {
        assert!(matches!(
            codec().decode("{not json"),
            Err(CodecError::Malformed(_))
        ));
    }

    #[test]
    fn test_decode_rejects_non_objects() {
        assert!(matches!(
            codec().decode("[1,2]"),
            Err(CodecError::NotARecord("list"))
        ));
    }

    #[test]
    fn test_decode_rejects_wide_chars_in_binary_field() {
        let err = codec().decode(r#"{"pubKey":"Ā"}"#).unwrap_err();
        assert!(matches!(err, CodecError::NotLatin1 { ref field } if field == "pubKey"));
    }
}
