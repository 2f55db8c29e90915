//! Namespace tags, record identifiers and composite backend keys.
//!
//! Every record lives under the backend key `"{tag}@{id}"`. Tags may not
//! contain `@`, so the first `@` in a key is always the separator and ids
//! are free to contain `@` themselves. Namespace scans match on `"{tag}@"`,
//! never on the bare tag: `session` must not pick up keys of a hypothetical
//! `sessionArchive` namespace.

use std::borrow::Cow;
use std::fmt;

use crate::error::{StoreError, StoreResult};
use crate::value::{ID_FIELD, Record, Value};

/// Separator between namespace tag and record id.
pub const SEPARATOR: char = '@';

/// A record kind's key prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Namespace(Cow<'static, str>);

impl Namespace {
    /// Identity keys of remote and local parties.
    pub const IDENTITY_KEY: Self = Self(Cow::Borrowed("identityKey"));
    /// Ratchet session state.
    pub const SESSION: Self = Self(Cow::Borrowed("session"));
    /// One-time Curve25519 pre-keys.
    pub const PRE_KEY: Self = Self(Cow::Borrowed("25519KeypreKey"));
    /// Signed Curve25519 pre-keys.
    pub const SIGNED_PRE_KEY: Self = Self(Cow::Borrowed("25519KeysignedKey"));
    /// Queued inbound messages not yet decrypted.
    pub const UNPROCESSED: Self = Self(Cow::Borrowed("unprocessed"));
    /// Opaque configuration items.
    pub const ITEM: Self = Self(Cow::Borrowed("configuration"));
    /// Conversation metadata.
    pub const CONVERSATION: Self = Self(Cow::Borrowed("conversation"));

    /// All built-in namespaces.
    pub const ALL: [Self; 7] = [
        Self::IDENTITY_KEY,
        Self::SESSION,
        Self::PRE_KEY,
        Self::SIGNED_PRE_KEY,
        Self::UNPROCESSED,
        Self::ITEM,
        Self::CONVERSATION,
    ];

    /// Create a custom namespace.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidNamespace`] if the tag is empty or
    /// contains the `@` separator.
    pub fn new(tag: impl Into<String>) -> StoreResult<Self> {
        let tag = tag.into();
        if tag.is_empty() {
            return Err(StoreError::InvalidNamespace(
                "namespace must not be empty".into(),
            ));
        }
        if tag.contains(SEPARATOR) {
            return Err(StoreError::InvalidNamespace(format!(
                "namespace '{tag}' must not contain '{SEPARATOR}'"
            )));
        }
        Ok(Self(Cow::Owned(tag)))
    }

    /// The bare tag.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.0
    }

    /// The scan prefix `"{tag}@"`.
    #[must_use]
    pub fn prefix(&self) -> String {
        format!("{}{SEPARATOR}", self.0)
    }

    /// The backend key for `id` in this namespace.
    #[must_use]
    pub fn key_for(&self, id: &RecordId) -> String {
        format!("{}{SEPARATOR}{}", self.0, id.as_str())
    }

    /// Extract the record id from a backend key in this namespace.
    ///
    /// Returns `None` if the key belongs to another namespace.
    #[must_use]
    pub fn id_from_key<'k>(&self, key: &'k str) -> Option<&'k str> {
        key.strip_prefix(self.tag())?.strip_prefix(SEPARATOR)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Split a backend key into `(tag, id)` at the first separator.
#[must_use]
pub fn split_key(key: &str) -> Option<(&str, &str)> {
    key.split_once(SEPARATOR)
}

/// A record identifier in its stored (string) form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(String);

impl RecordId {
    /// Borrow the identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Derive an id from a record's `id` field.
    ///
    /// Text is used verbatim and numbers in decimal form (`7.0` becomes
    /// `"7"`). Any other kind yields `None`.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Text(s) => Some(Self(s.clone())),
            Value::Number(n) => Some(Self(number_to_decimal(n))),
            _ => None,
        }
    }
}

/// Largest integer an `f64` represents exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

#[allow(clippy::cast_possible_truncation)]
fn number_to_decimal(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER => (f as i64).to_string(),
        _ => n.to_string(),
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&String> for RecordId {
    fn from(s: &String) -> Self {
        Self(s.clone())
    }
}

impl From<&RecordId> for RecordId {
    fn from(id: &RecordId) -> Self {
        id.clone()
    }
}

macro_rules! impl_id_from_integer {
    ($($t:ty),*) => {
        $(
            impl From<$t> for RecordId {
                fn from(n: $t) -> Self {
                    Self(n.to_string())
                }
            }
        )*
    };
}

impl_id_from_integer!(u16, u32, u64, usize, i32, i64);

/// How a collection interprets record identifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IdPolicy {
    /// Ids are opaque strings, stored verbatim.
    #[default]
    Opaque,
    /// Ids are integers, stored in canonical decimal form. `7`, `"7"` and
    /// `"007"` all address the same record.
    Numeric,
}

impl IdPolicy {
    /// Normalize an identifier according to this policy.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidId`] if a numeric collection receives
    /// an id that is not an integer.
    pub fn normalize(self, id: RecordId) -> StoreResult<RecordId> {
        match self {
            Self::Opaque => Ok(id),
            Self::Numeric => {
                let text = id.as_str();
                if let Ok(n) = text.parse::<i64>() {
                    Ok(RecordId(n.to_string()))
                } else if let Ok(n) = text.parse::<u64>() {
                    Ok(RecordId(n.to_string()))
                } else {
                    Err(StoreError::InvalidId {
                        id: id.0,
                        reason: "expected an integer identifier",
                    })
                }
            },
        }
    }

    /// The normalized id of a record, read from its `id` field.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::MissingId`] if the record has no text or
    /// numeric `id`, and [`StoreError::InvalidId`] if normalization fails.
    pub fn id_of(self, namespace: &Namespace, record: &Record) -> StoreResult<RecordId> {
        let id = record
            .id()
            .and_then(RecordId::from_value)
            .ok_or_else(|| StoreError::MissingId {
                namespace: namespace.tag().to_owned(),
            })?;
        self.normalize(id)
    }

    /// The normalized id of a record together with the record to store.
    ///
    /// A text `id` that normalizes to a different form (`"007"` in a
    /// numeric collection) is rewritten, so the stored `id` field always
    /// matches the key the record lives under.
    ///
    /// # Errors
    ///
    /// Same as [`IdPolicy::id_of`].
    pub fn normalize_record<'a>(
        self,
        namespace: &Namespace,
        record: &'a Record,
    ) -> StoreResult<(RecordId, Cow<'a, Record>)> {
        let id = self.id_of(namespace, record)?;
        match record.id() {
            Some(Value::Text(text)) if text != id.as_str() => {
                let mut normalized = record.clone();
                normalized.insert(ID_FIELD, id.as_str());
                Ok((id, Cow::Owned(normalized)))
            },
            _ => Ok((id, Cow::Borrowed(record))),
        }
    }
}
