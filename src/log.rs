//! Append-only log of entries plus the blob pool they reference.

use crate::blob::Blob;
use crate::entry::{Entry, Scope};
use crate::error::{RegisterError, Result};
use crate::hash::Hash;
use crate::merkle;
use crate::record::Record;
use crate::rsf::{Action, Command};
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::{debug, trace, warn};

/// Statistics for a single log.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LogStats {
    pub total_entries: u64,
    pub total_blobs: u64,
}

/// An append-only sequence of entries, plus the blob map they reference.
///
/// Positions are dense (`1..=size()`), the root hash always reflects the
/// full current entry sequence (spec invariants L1-L3), and consecutive
/// duplicate entries for the same key are rejected by the collector rather
/// than by the log itself (spec invariant L4).
pub struct Log {
    entries: Vec<Entry>,
    blobs: HashMap<Hash, Blob>,
    root: RwLock<Option<Hash>>,
}

impl Log {
    /// An empty log; its root is the RFC 6962 empty-tree hash.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            blobs: HashMap::new(),
            root: RwLock::new(None),
        }
    }

    /// Number of entries in the log.
    pub fn size(&self) -> u64 {
        self.entries.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn blobs(&self) -> &HashMap<Hash, Blob> {
        &self.blobs
    }

    /// The current Merkle root over this log's entries (recomputed lazily
    /// and cached; every observation reflects the full entry sequence).
    pub fn root_hash(&self) -> Hash {
        if let Some(cached) = self.root.read().clone() {
            return cached;
        }
        let leaves: Vec<Vec<u8>> = self.entries.iter().map(Entry::to_leaf_bytes).collect();
        let root = merkle::root_hash(&leaves);
        *self.root.write() = Some(root.clone());
        root
    }

    /// Insert a blob into the pool (a no-op overwrite if already present —
    /// blobs are content-addressed, so any two with the same digest are
    /// interchangeable).
    pub fn insert_blob(&mut self, blob: Blob) {
        trace!(digest = %blob.digest(), "inserting blob");
        self.blobs.insert(blob.digest(), blob);
    }

    /// Append an entry, assigning it the next dense position and
    /// invalidating the cached root.
    pub fn insert_entry(&mut self, mut entry: Entry) {
        let position = self.size() + 1;
        entry.set_position(position);
        trace!(key = entry.key(), position, "inserting entry");
        self.entries.push(entry);
        *self.root.write() = None;
    }

    /// Look up a blob by digest.
    pub fn blob(&self, hash: &Hash) -> Option<&Blob> {
        self.blobs.get(hash)
    }

    /// The latest record for every key, as of the full current log.
    pub fn snapshot(&self) -> HashMap<String, Record> {
        self.snapshot_at(self.entries.len())
    }

    /// The latest record for every key, as of the first `size` entries.
    pub fn snapshot_at(&self, size: usize) -> HashMap<String, Record> {
        let mut records = HashMap::new();
        for entry in self.entries.iter().take(size) {
            if let Some(blob) = self.blobs.get(entry.blob_hash()) {
                records.insert(entry.key().to_string(), Record::new(entry.clone(), blob.clone()));
            }
        }
        records
    }

    /// The full entry history for a key, in log order.
    pub fn trail(&self, key: &str) -> Vec<Entry> {
        self.entries.iter().filter(|e| e.key() == key).cloned().collect()
    }

    /// The latest record for a key.
    pub fn find(&self, key: &str) -> Option<Record> {
        self.snapshot().remove(key)
    }

    pub fn stats(&self) -> LogStats {
        LogStats {
            total_entries: self.size(),
            total_blobs: self.blobs.len() as u64,
        }
    }
}

impl Default for Log {
    fn default() -> Self {
        Self::new()
    }
}

/// Tolerates duplicate-entry violations instead of failing fast on them, to
/// load historical registers that already contain some (spec §4.4: "the
/// country register has a duplicate entry for `field:country`").
#[derive(Clone, Copy, Debug, Default)]
pub struct CollectOptions {
    pub relaxed: bool,
}

/// The outcome of collecting a command sequence into a pair of logs.
pub struct Collected {
    pub data: Log,
    pub metadata: Log,
    /// Accumulated `DuplicatedEntry` errors when `relaxed` is set; empty
    /// otherwise (non-relaxed mode fails fast instead of accumulating).
    pub errors: Vec<RegisterError>,
}

/// Replays `commands` against `data`/`metadata` logs (or fresh ones),
/// sharing a single blob pool across both scopes, per spec §4.4.
pub fn collect(commands: &[Command], data: Log, metadata: Log, opts: CollectOptions) -> Result<Collected> {
    let mut data = data;
    let mut metadata = metadata;
    let mut pool: HashMap<Hash, Blob> = data.blobs.clone();
    pool.extend(metadata.blobs.clone());
    let mut errors = Vec::new();

    for command in commands {
        match command.action() {
            Action::AssertRootHash => {
                let expected = command.as_hash().expect("assert-root-hash command");
                let actual = data.root_hash();
                if expected != &actual {
                    return Err(RegisterError::InconsistentLog {
                        expected: expected.clone(),
                        actual,
                        size: data.size(),
                    });
                }
            }
            Action::AddItem => {
                let blob = command.as_blob().expect("add-item command").clone();
                debug!(digest = %blob.digest(), "add-item");
                pool.insert(blob.digest(), blob);
            }
            Action::AppendEntry => {
                let entry = command.as_entry().expect("append-entry command").clone();
                let blob = pool.get(entry.blob_hash()).cloned().ok_or_else(|| {
                    RegisterError::OrphanEntry {
                        key: entry.key().to_string(),
                        position: entry.position().unwrap_or_default(),
                        blob_hash: entry.blob_hash().clone(),
                    }
                })?;

                let target = match entry.scope() {
                    Scope::System => &mut metadata,
                    Scope::User => &mut data,
                };

                target.insert_blob(blob.clone());

                let duplicate = target
                    .snapshot()
                    .get(entry.key())
                    .map(|record| record.blob().digest() == *entry.blob_hash())
                    .unwrap_or(false);

                if duplicate {
                    let err = RegisterError::DuplicatedEntry {
                        key: entry.key().to_string(),
                        blob_digest: entry.blob_hash().clone(),
                    };
                    if opts.relaxed {
                        warn!(key = entry.key(), "suppressing duplicated entry (relaxed mode)");
                        errors.push(err);
                    } else {
                        return Err(err);
                    }
                } else {
                    debug!(key = entry.key(), scope = %entry.scope(), "append-entry");
                    target.insert_entry(entry);
                }
            }
        }
    }

    Ok(Collected { data, metadata, errors })
}

/// Re-emits the suffix of `log` starting at `start_position` (0-based) as
/// `add-item`/`append-entry` command pairs.
pub fn slice(log: &Log, start_position: usize) -> Vec<Command> {
    let mut commands = Vec::new();
    for entry in log.entries().iter().skip(start_position) {
        if let Some(blob) = log.blob(entry.blob_hash()) {
            commands.push(Command::add_item(blob.clone()));
            commands.push(Command::append_entry(entry.clone()));
        }
    }
    commands
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob::Value;

    fn blob_with_key(key: &str, value: &str) -> Blob {
        Blob::new([(key.to_string(), Value::from(value))])
    }

    #[test]
    fn insert_assigns_dense_positions() {
        let mut log = Log::new();
        for i in 0..5 {
            let blob = blob_with_key("name", &format!("item-{i}"));
            log.insert_blob(blob.clone());
            log.insert_entry(Entry::new(format!("k{i}"), Scope::User, "2020-01-01T00:00:00Z", blob.digest()));
        }
        let positions: Vec<_> = log.entries().iter().map(|e| e.position().unwrap()).collect();
        assert_eq!(positions, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn orphan_entry_is_rejected() {
        let entry = Entry::new("k", Scope::User, "2020-01-01T00:00:00Z", Hash::sha256(b"missing"));
        let commands = vec![Command::append_entry(entry)];
        let err = collect(&commands, Log::new(), Log::new(), CollectOptions::default()).unwrap_err();
        assert!(matches!(err, RegisterError::OrphanEntry { .. }));
    }

    #[test]
    fn duplicate_entry_is_rejected_in_strict_mode() {
        let blob = blob_with_key("name", "x");
        let commands = vec![
            Command::add_item(blob.clone()),
            Command::append_entry(Entry::new("k", Scope::User, "2020-01-01T00:00:00Z", blob.digest())),
            Command::append_entry(Entry::new("k", Scope::User, "2020-01-02T00:00:00Z", blob.digest())),
        ];
        let err = collect(&commands, Log::new(), Log::new(), CollectOptions::default()).unwrap_err();
        assert!(matches!(err, RegisterError::DuplicatedEntry { .. }));
    }

    #[test]
    fn duplicate_entry_is_tolerated_in_relaxed_mode() {
        let blob = blob_with_key("name", "x");
        let commands = vec![
            Command::add_item(blob.clone()),
            Command::append_entry(Entry::new("k", Scope::User, "2020-01-01T00:00:00Z", blob.digest())),
            Command::append_entry(Entry::new("k", Scope::User, "2020-01-02T00:00:00Z", blob.digest())),
        ];
        let collected = collect(
            &commands,
            Log::new(),
            Log::new(),
            CollectOptions { relaxed: true },
        )
        .unwrap();
        assert_eq!(collected.data.size(), 1);
        assert_eq!(collected.errors.len(), 1);
        assert!(matches!(collected.errors[0], RegisterError::DuplicatedEntry { .. }));
    }

    #[test]
    fn entry_blob_lands_only_in_its_own_scope_log() {
        let blob = blob_with_key("name", "x");
        let commands = vec![
            Command::add_item(blob.clone()),
            Command::append_entry(Entry::new("name", Scope::System, "2020-01-01T00:00:00Z", blob.digest())),
        ];
        let collected = collect(&commands, Log::new(), Log::new(), CollectOptions::default()).unwrap();
        assert_eq!(collected.metadata.size(), 1);
        assert_eq!(collected.data.size(), 0);
        assert!(collected.metadata.blob(&blob.digest()).is_some());
        assert!(collected.data.blob(&blob.digest()).is_none());
    }

    #[test]
    fn shared_pool_lets_either_scope_reference_an_added_item() {
        let blob = blob_with_key("name", "x");
        let commands = vec![
            Command::add_item(blob.clone()),
            Command::append_entry(Entry::new("k", Scope::User, "2020-01-01T00:00:00Z", blob.digest())),
            Command::append_entry(Entry::new("k", Scope::System, "2020-01-01T00:00:01Z", blob.digest())),
        ];
        let collected = collect(&commands, Log::new(), Log::new(), CollectOptions::default()).unwrap();
        assert!(collected.data.blob(&blob.digest()).is_some());
        assert!(collected.metadata.blob(&blob.digest()).is_some());
    }

    #[test]
    fn trail_returns_full_history_for_key() {
        let mut log = Log::new();
        for i in 0..3 {
            let blob = blob_with_key("name", &format!("v{i}"));
            log.insert_blob(blob.clone());
            log.insert_entry(Entry::new("GB", Scope::User, "2020-01-01T00:00:00Z", blob.digest()));
        }
        assert_eq!(log.trail("GB").len(), 3);
        assert_eq!(log.trail("other").len(), 0);
    }
}
