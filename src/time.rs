//! Timestamp formatting and the well-known empty-log root hash.

use chrono::{SecondsFormat, Utc};

/// The Merkle root of a log with zero entries: `sha256("")`, tagged as a
/// `sha-256` hash (the same value `merkle::root_hash(&[])` computes; kept
/// here as a named constant for callers that just need it as a sentinel).
pub const EMPTY_ROOT_HASH: &str = "sha-256:e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

/// The current UTC time as an RFC 3339 timestamp with second precision
/// (`YYYY-MM-DDTHH:MM:SSZ`), the shape every entry timestamp and patch
/// timestamp in the register wire formats takes.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}
