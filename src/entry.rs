//! Entries: positional references from a key to a blob.

use crate::hash::Hash;
use std::fmt;

/// Which log an entry belongs to: user data, or register system metadata.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Scope {
    User,
    System,
}

impl Scope {
    /// The RSF wire token for this scope.
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::User => "user",
            Scope::System => "system",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Scope {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Scope::User),
            "system" => Ok(Scope::System),
            _ => Err(()),
        }
    }
}

/// An immutable log entry: a key, scope, timestamp and blob reference,
/// assigned a 1-based position when it is inserted into its log.
#[derive(Clone, Debug)]
pub struct Entry {
    key: String,
    scope: Scope,
    timestamp: String,
    blob_hash: Hash,
    position: Option<u64>,
}

impl Entry {
    /// Build an entry without a position yet assigned (as produced while
    /// parsing an `append-entry` command, before the log inserts it).
    pub fn new(key: impl Into<String>, scope: Scope, timestamp: impl Into<String>, blob_hash: Hash) -> Self {
        Self {
            key: key.into(),
            scope,
            timestamp: timestamp.into(),
            blob_hash,
            position: None,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn blob_hash(&self) -> &Hash {
        &self.blob_hash
    }

    pub fn position(&self) -> Option<u64> {
        self.position
    }

    /// Assign the 1-based position, as done by `Log::insert`.
    pub(crate) fn set_position(&mut self, position: u64) {
        self.position = Some(position);
    }

    /// Canonical JSON representation, used both as the Merkle leaf bytes and
    /// as the per-entry HTTP resource body (spec §6):
    ///
    /// ```json
    /// [{"index-entry-number":"1","entry-number":"1","entry-timestamp":"...","key":"...","item-hash":["sha-256:..."]}]
    /// ```
    pub fn to_canonical_json(&self) -> String {
        let position = self.position.map(|p| p.to_string()).unwrap_or_default();
        format!(
            "[{{\"index-entry-number\":\"{p}\",\"entry-number\":\"{p}\",\"entry-timestamp\":\"{ts}\",\"key\":\"{key}\",\"item-hash\":[\"{hash}\"]}}]",
            p = position,
            ts = json_escape(&self.timestamp),
            key = json_escape(&self.key),
            hash = self.blob_hash,
        )
    }

    /// The bytes fed to the Merkle tree as this entry's leaf (spec §4.1/§9:
    /// the entry JSON is used for both the digest and the leaf).
    pub fn to_leaf_bytes(&self) -> Vec<u8> {
        self.to_canonical_json().into_bytes()
    }
}

/// Minimal escaping sufficient for the fields an `Entry` carries (keys and
/// RFC 3339 timestamps never contain control characters in a well-formed
/// register, but we don't trust that blindly).
fn json_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            c => out.push(c),
        }
    }
    out
}
