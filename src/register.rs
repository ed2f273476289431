//! Registers: a pair of logs plus the schema and context derived from them.

use crate::blob::Blob;
use crate::entry::Entry;
use crate::error::{RegisterError, Result};
use crate::log::{collect, CollectOptions, Log};
use crate::patch::Patch;
use crate::record::Record;
use crate::rsf::Command;
use crate::schema::{Attribute, Schema};
use std::collections::HashMap;
use tracing::info;

/// Counts and timestamps surfaced by [`Register::context`].
#[derive(Clone, Debug, Default)]
pub struct Context {
    pub total_records: usize,
    pub total_entries: u64,
    pub last_updated: Option<String>,
    pub register_record: Option<Blob>,
    pub custodian: Option<String>,
}

/// A register: the data log and metadata log produced by replaying a
/// command stream, plus the identity and schema derived from them.
pub struct Register {
    data: Log,
    metadata: Log,
    commands: Vec<Command>,
    uid: Option<String>,
    update_date: Option<String>,
}

impl Register {
    /// An empty register with no commands applied yet.
    pub fn new() -> Self {
        Self {
            data: Log::new(),
            metadata: Log::new(),
            commands: Vec::new(),
            uid: None,
            update_date: None,
        }
    }

    /// Build a register by replaying a full command stream from scratch.
    pub fn from_commands(commands: Vec<Command>) -> Result<Self> {
        let mut register = Self::new();
        if !commands.is_empty() {
            register.load_commands(commands, CollectOptions::default())?;
        }
        Ok(register)
    }

    /// Build a register in relaxed mode, tolerating `DuplicatedEntry`
    /// violations instead of failing on them — for loading historical
    /// registers that already contain some (spec §4.4, §9).
    pub fn from_commands_relaxed(commands: Vec<Command>) -> Result<Self> {
        let mut register = Self::new();
        if !commands.is_empty() {
            register.load_commands(commands, CollectOptions { relaxed: true })?;
        }
        Ok(register)
    }

    fn load_commands(&mut self, commands: Vec<Command>, opts: CollectOptions) -> Result<()> {
        let collected = collect(&commands, Log::new(), Log::new(), opts)?;
        self.data = collected.data;
        self.metadata = collected.metadata;
        self.commands = commands;
        self.collect_basic_metadata();
        Ok(())
    }

    fn collect_basic_metadata(&mut self) {
        if let Some(name) = self.metadata.find("name") {
            self.uid = name.blob().get_str("name").map(str::to_string);
        }
        self.collect_update_date();
    }

    fn collect_update_date(&mut self) {
        self.update_date = if !self.data.is_empty() {
            self.data.entries().last().map(|e| e.timestamp().to_string())
        } else if !self.metadata.is_empty() {
            self.metadata.entries().last().map(|e| e.timestamp().to_string())
        } else {
            None
        };
    }

    /// Apply a patch, sharing this register's current blob pool with the
    /// collector, and archive its commands on success (spec §4.7).
    pub fn apply(&mut self, patch: &Patch) -> Result<()> {
        let data = std::mem::replace(&mut self.data, Log::new());
        let metadata = std::mem::replace(&mut self.metadata, Log::new());

        let collected = collect(patch.commands(), data, metadata, CollectOptions::default())?;
        self.data = collected.data;
        self.metadata = collected.metadata;
        self.commands.extend(patch.commands().iter().cloned());
        self.collect_update_date();

        info!(entries = self.data.size(), "applied patch");
        Ok(())
    }

    pub fn uid(&self) -> Option<&str> {
        self.uid.as_deref()
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn log(&self) -> &Log {
        &self.data
    }

    pub fn metalog(&self) -> &Log {
        &self.metadata
    }

    pub fn records(&self) -> HashMap<String, Record> {
        self.data.snapshot()
    }

    pub fn record(&self, key: &str) -> Option<Record> {
        self.data.find(key)
    }

    pub fn trail(&self, key: &str) -> Vec<Entry> {
        self.data.trail(key)
    }

    /// The current schema, derived from every `field:*` metadata record
    /// (spec §4.5).
    pub fn schema(&self) -> Result<Schema> {
        let uid = self.uid.clone().ok_or(RegisterError::MissingIdentifier)?;
        let mut schema = Schema::new(uid);

        let mut fields: Vec<(String, Record)> = self
            .metadata
            .snapshot()
            .into_iter()
            .filter(|(key, _)| key.starts_with("field:"))
            .collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        for (_, record) in fields {
            let attr = Attribute::from_blob(record.blob())?;
            schema.insert(attr)?;
        }

        Ok(schema)
    }

    /// Counts, last-updated timestamp, and identity blobs (spec §4, context
    /// fields `total-records`/`total-entries`/`last-updated`/
    /// `register-record`/`custodian`).
    pub fn context(&self) -> Result<Context> {
        let uid = self.uid.clone().ok_or(RegisterError::MissingIdentifier)?;

        let register_record = self
            .metadata
            .find(&format!("register:{uid}"))
            .map(|r| r.blob().clone());
        let custodian = self
            .metadata
            .find("custodian")
            .and_then(|r| r.blob().get_str("custodian").map(str::to_string));

        Ok(Context {
            total_records: self.records().len(),
            total_entries: self.data.size(),
            last_updated: self.update_date.clone(),
            register_record,
            custodian,
        })
    }

    /// The human-readable title (the `register-name` metadata record).
    pub fn title(&self) -> Option<String> {
        self.metadata
            .find("register-name")
            .and_then(|r| r.blob().get_str("register-name").map(str::to_string))
    }

    /// The human-readable description (the `register:<uid>` record's `text`).
    pub fn description(&self) -> Option<String> {
        let uid = self.uid.as_ref()?;
        self.metadata
            .find(&format!("register:{uid}"))
            .and_then(|r| r.blob().get_str("text").map(str::to_string))
    }

    /// Ready once identified and the schema has the primary key plus at
    /// least one other attribute (spec §4.9).
    pub fn is_ready(&self) -> bool {
        self.uid.is_some() && self.schema().map(|s| s.is_ready()).unwrap_or(false)
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl Default for Register {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob::Value;
    use crate::entry::Scope;

    fn name_commands() -> Vec<Command> {
        let name_blob = Blob::new([("name".to_string(), Value::from("country"))]);
        vec![
            Command::add_item(name_blob.clone()),
            Command::append_entry(Entry::new("name", Scope::System, "2016-04-05T13:23:05Z", name_blob.digest())),
        ]
    }

    #[test]
    fn empty_register_has_no_identifier() {
        let register = Register::new();
        assert!(register.uid().is_none());
        assert!(register.is_empty());
        assert!(!register.is_ready());
    }

    #[test]
    fn register_adopts_uid_from_name_metadata_entry() {
        let register = Register::from_commands(name_commands()).unwrap();
        assert_eq!(register.uid(), Some("country"));
    }

    #[test]
    fn schema_fails_without_identifier() {
        let register = Register::new();
        assert!(matches!(register.schema(), Err(RegisterError::MissingIdentifier)));
    }

    #[test]
    fn schema_collects_field_records() {
        let mut commands = name_commands();

        let field_blob = Blob::new([
            ("field".to_string(), Value::from("country")),
            ("datatype".to_string(), Value::from("string")),
            ("cardinality".to_string(), Value::from("1")),
        ]);
        commands.push(Command::add_item(field_blob.clone()));
        commands.push(Command::append_entry(Entry::new(
            "field:country",
            Scope::System,
            "2016-04-05T13:23:05Z",
            field_blob.digest(),
        )));

        let register = Register::from_commands(commands).unwrap();
        let schema = register.schema().unwrap();
        assert_eq!(schema.primary_key(), "country");
        assert!(schema.get("country").is_some());
    }

    #[test]
    fn from_commands_relaxed_tolerates_duplicate_entries() {
        let blob = Blob::new([("country".to_string(), Value::from("GB"))]);
        let mut commands = name_commands();
        commands.push(Command::add_item(blob.clone()));
        commands.push(Command::append_entry(Entry::new(
            "country",
            Scope::User,
            "2020-01-01T00:00:00Z",
            blob.digest(),
        )));
        commands.push(Command::append_entry(Entry::new(
            "country",
            Scope::User,
            "2020-01-02T00:00:00Z",
            blob.digest(),
        )));

        assert!(Register::from_commands(commands.clone()).is_err());
        let register = Register::from_commands_relaxed(commands).unwrap();
        assert_eq!(register.records().len(), 1);
    }

    #[test]
    fn apply_extends_commands_and_data_log() {
        let mut register = Register::from_commands(name_commands()).unwrap();

        let mut schema = Schema::new("country");
        schema.insert(crate::schema::string("country")).unwrap();
        schema.insert(crate::schema::string("name")).unwrap();
        let blob = Blob::new([
            ("country".to_string(), Value::from("GB")),
            ("name".to_string(), Value::from("United Kingdom")),
        ]);
        let patch = Patch::from_blobs(schema, vec![blob], "2020-01-01T00:00:00Z".to_string());

        register.apply(&patch).unwrap();
        assert_eq!(register.records().len(), 1);
        assert_eq!(register.commands().len(), 4);
    }
}
