//! Error types for the register core.

use crate::hash::Hash;
use thiserror::Error;

/// Main error type for register operations.
///
/// Variants are grouped the way the specification groups them: parsing the
/// RSF wire format, log/integrity violations, schema problems, value
/// validation, and operational misuse. The core never logs on its own
/// behalf; callers observe these as plain `Result`s.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegisterError {
    // --- Parse errors (RSF codec) ---
    #[error("unknown RSF command: {0:?}")]
    UnknownCommand(String),

    #[error("malformed add-item command: {0:?}")]
    MalformedAddItem(String),

    #[error("malformed append-entry command: {0:?}")]
    MalformedAppendEntry(String),

    #[error("malformed assert-root-hash command: {0:?}")]
    MalformedAssertRootHash(String),

    #[error("unrecognised scope {0:?}, expected \"user\" or \"system\"")]
    BadScope(String),

    #[error("malformed hash {0:?}, expected \"<algorithm>:<hexdigits>\"")]
    BadHash(String),

    // --- Integrity errors (log collector) ---
    #[error("entry for key {key:?} at position {position} points to an unknown blob {blob_hash}")]
    OrphanEntry {
        key: String,
        position: u64,
        blob_hash: Hash,
    },

    #[error("log at size {size} was expected to have root hash {expected} but has {actual}")]
    InconsistentLog {
        expected: Hash,
        actual: Hash,
        size: u64,
    },

    #[error("the latest entry for key {key:?} already has blob {blob_digest}")]
    DuplicatedEntry { key: String, blob_digest: Hash },

    // --- Schema errors ---
    #[error("the register has no identifier; schema/context cannot be derived")]
    MissingIdentifier,

    #[error("attributes must have a non-empty identifier")]
    MissingAttributeIdentifier,

    #[error("attribute {0:?} already exists in the schema")]
    AttributeAlreadyExists(String),

    #[error("the primary key attribute {0:?} must be present")]
    MissingPrimaryKey(String),

    #[error("attribute {attr:?} in {value:?} is not present in the schema")]
    UnknownAttribute { attr: String, value: String },

    #[error("attribute {attr:?} expects cardinality {expected:?} but got {value:?}")]
    CardinalityMismatch {
        attr: String,
        expected: String,
        value: String,
    },

    // --- Value errors ---
    #[error("the value for {attr:?} ({value:?}) is not a string representation of {datatype}")]
    RepresentationError {
        attr: String,
        value: String,
        datatype: String,
    },

    #[error("{value:?} is not a valid {datatype}")]
    InvalidValue { datatype: String, value: String },

    #[error("{0:?} is not a valid key")]
    InvalidKey(String),

    // --- Operational errors ---
    #[error("command rejected: register is not ready ({0})")]
    CommandError(String),

    #[error("invalid JSON: {0}")]
    Json(String),
}

impl From<serde_json::Error> for RegisterError {
    fn from(e: serde_json::Error) -> Self {
        RegisterError::Json(e.to_string())
    }
}

impl RegisterError {
    /// The expected datatype tag for an `InvalidValue`, if this is one.
    ///
    /// Named to avoid the "returns the value instead of the datatype" bug the
    /// source exhibited — `datatype()` always holds the expected tag, never
    /// the offending value.
    pub fn invalid_value_datatype(&self) -> Option<&str> {
        match self {
            RegisterError::InvalidValue { datatype, .. } => Some(datatype),
            _ => None,
        }
    }
}

/// Result type for register operations.
pub type Result<T> = std::result::Result<T, RegisterError>;
