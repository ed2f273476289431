//! Patches: batches of commands that can be applied to a register.

use crate::blob::Blob;
use crate::entry::{Entry, Scope};
use crate::error::{RegisterError, Result};
use crate::hash::Hash;
use crate::rsf::{Action, Command};
use crate::schema::Schema;

/// A batch of commands checked against a schema, optionally bracketed by
/// before/after root-hash assertions (spec §4.7).
pub struct Patch {
    schema: Schema,
    commands: Vec<Command>,
    timestamp: String,
}

impl Patch {
    /// Build a patch from a list of blobs: each emits `add-item` followed by
    /// `append-entry(key=blob[primary-key], scope=user, timestamp, digest)`.
    pub fn from_blobs(schema: Schema, blobs: Vec<Blob>, timestamp: String) -> Self {
        let commands = collect(schema.primary_key(), &blobs, &timestamp);
        Self {
            schema,
            commands,
            timestamp,
        }
    }

    /// Build a patch from an existing command sequence; the timestamp is
    /// recovered from the first `append-entry` command.
    pub fn from_commands(schema: Schema, commands: Vec<Command>) -> Result<Self> {
        let timestamp = commands
            .iter()
            .find(|c| c.action() == Action::AppendEntry)
            .and_then(|c| c.as_entry())
            .map(|e| e.timestamp().to_string())
            .ok_or_else(|| RegisterError::CommandError("patch has no append-entry command".to_string()))?;

        Ok(Self {
            schema,
            commands,
            timestamp,
        })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// Add a blob's commands to this patch, using the schema's primary key
    /// and the patch's existing timestamp.
    pub fn add(&mut self, blob: Blob) {
        self.commands
            .extend(collect(self.schema.primary_key(), std::slice::from_ref(&blob), &self.timestamp));
    }

    /// Bracket the patch with before/after root-hash assertions, making it
    /// applicable only at an exact register size.
    pub fn seal(&mut self, start: Hash, end: Hash) {
        self.commands.insert(0, Command::assert_root_hash(start));
        self.commands.push(Command::assert_root_hash(end));
    }

    pub fn is_sealed(&self) -> bool {
        matches!(self.commands.first().map(Command::action), Some(Action::AssertRootHash))
            && matches!(self.commands.last().map(Command::action), Some(Action::AssertRootHash))
    }
}

fn collect(primary_key: &str, blobs: &[Blob], timestamp: &str) -> Vec<Command> {
    let mut commands = Vec::with_capacity(blobs.len() * 2);
    for blob in blobs {
        let key = blob.get_str(primary_key).unwrap_or_default().to_string();
        let entry = Entry::new(key, Scope::User, timestamp.to_string(), blob.digest());
        commands.push(Command::add_item(blob.clone()));
        commands.push(Command::append_entry(entry));
    }
    commands
}
