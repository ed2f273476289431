//! RSF commands: the three actions a register log can replay.

use crate::blob::Blob;
use crate::entry::Entry;
use crate::hash::Hash;
use std::fmt;

/// The action an RSF command performs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    AddItem,
    AppendEntry,
    AssertRootHash,
}

impl Action {
    /// The RSF wire token for this action.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::AddItem => "add-item",
            Action::AppendEntry => "append-entry",
            Action::AssertRootHash => "assert-root-hash",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The value a command carries, tagged by its action.
#[derive(Clone, Debug)]
enum Payload {
    Blob(Blob),
    Entry(Entry),
    Hash(Hash),
}

/// A single RSF command: an action paired with its typed value.
#[derive(Clone, Debug)]
pub struct Command {
    action: Action,
    payload: Payload,
}

impl Command {
    pub fn add_item(blob: Blob) -> Self {
        Self {
            action: Action::AddItem,
            payload: Payload::Blob(blob),
        }
    }

    pub fn append_entry(entry: Entry) -> Self {
        Self {
            action: Action::AppendEntry,
            payload: Payload::Entry(entry),
        }
    }

    pub fn assert_root_hash(hash: Hash) -> Self {
        Self {
            action: Action::AssertRootHash,
            payload: Payload::Hash(hash),
        }
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn as_blob(&self) -> Option<&Blob> {
        match &self.payload {
            Payload::Blob(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_entry(&self) -> Option<&Entry> {
        match &self.payload {
            Payload::Entry(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_hash(&self) -> Option<&Hash> {
        match &self.payload {
            Payload::Hash(h) => Some(h),
            _ => None,
        }
    }
}
