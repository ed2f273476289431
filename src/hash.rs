//! Typed hash values.
//!
//! A [`Hash`] is the pair `(algorithm, hex-digest)` the wire format spells as
//! `"{algorithm}:{hex}"`. Only `sha-256` is ever produced, but the parser
//! accepts any algorithm tag so legacy or foreign registers still round-trip.

use crate::error::{RegisterError, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// The only algorithm this crate produces digests with.
pub const SHA256: &str = "sha-256";

/// A `(algorithm, hex-digest)` pair, e.g. `sha-256:e3b0c4...`.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hash {
    algorithm: String,
    digest: String,
}

impl Hash {
    /// Build a hash value from an algorithm tag and a lowercase hex digest.
    pub fn new(algorithm: impl Into<String>, digest: impl Into<String>) -> Self {
        Self {
            algorithm: algorithm.into(),
            digest: digest.into(),
        }
    }

    /// Hash `bytes` with SHA-256 and wrap the result as a `sha-256:` hash.
    pub fn sha256(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        Self {
            algorithm: SHA256.to_string(),
            digest: hex::encode(hasher.finalize()),
        }
    }

    /// Parse the wire form `"{algorithm}:{hexdigits}"`.
    pub fn parse(s: &str) -> Result<Self> {
        let (algorithm, digest) = s
            .split_once(':')
            .ok_or_else(|| RegisterError::BadHash(s.to_string()))?;

        if algorithm.is_empty()
            || digest.is_empty()
            || !digest.chars().all(|c| c.is_ascii_hexdigit())
        {
            return Err(RegisterError::BadHash(s.to_string()));
        }

        Ok(Self::new(algorithm, digest.to_ascii_lowercase()))
    }

    /// The algorithm tag, e.g. `"sha-256"`.
    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    /// The lowercase hex digest.
    pub fn digest(&self) -> &str {
        &self.digest
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.digest)
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", self)
    }
}
