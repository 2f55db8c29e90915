//! Error types for the codec, backends and the record store.

/// Errors raised while converting records to and from stored text.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The value has a shape that JSON cannot express.
    #[error("unsupported value kind for serialization: {0}")]
    Unsupported(String),

    /// Stored text is not valid JSON.
    #[error("malformed stored record: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Stored text is valid JSON but not an object.
    #[error("stored value is not a record (found {0})")]
    NotARecord(&'static str),

    /// A binary field holds a string with a char outside `U+0000..=U+00FF`.
    #[error("binary field '{field}' contains a character above U+00FF")]
    NotLatin1 {
        /// Name of the offending field.
        field: String,
    },

    /// A schema-declared binary field holds something other than bytes.
    #[error("binary field '{field}' must hold bytes or null, found {found}")]
    NotBinary {
        /// Name of the offending field.
        field: String,
        /// Kind of value that was found instead.
        found: &'static str,
    },
}

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors from a raw string-keyed backend.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// Filesystem failure in a persistent backend.
    #[error("backend I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An internal lock was poisoned by a panicking writer.
    #[error("backend lock poisoned: {0}")]
    Poisoned(String),

    /// A stored entry could not be read back as UTF-8 text.
    #[error("backend entry '{key}' is not valid UTF-8")]
    InvalidUtf8 {
        /// Backend key of the entry.
        key: String,
    },

    /// A hashed entry's embedded key header is missing or names another key.
    #[error("backend entry '{key}' is corrupt")]
    Corrupt {
        /// Backend key of the entry.
        key: String,
    },
}

/// Result type for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;

/// Errors from namespaced record store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Encoding or decoding a record failed.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// The underlying backend failed.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// The namespace tag is empty or contains the key separator.
    #[error("invalid namespace: {0}")]
    InvalidNamespace(String),

    /// A record identifier does not fit the collection's identifier form.
    #[error("invalid record id '{id}': {reason}")]
    InvalidId {
        /// The rejected identifier.
        id: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// A record passed to a bulk or create-or-update call has no usable `id`.
    #[error("record in namespace '{namespace}' has no usable 'id' field")]
    MissingId {
        /// Namespace the record was destined for.
        namespace: String,
    },
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
