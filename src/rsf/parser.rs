//! Parsing the RSF wire format: tab-delimited command lines.

use super::command::Command;
use crate::blob::Blob;
use crate::entry::{Entry, Scope};
use crate::error::{RegisterError, Result};
use crate::hash::Hash;
use std::str::FromStr;

/// Parse a full RSF document: one command per line, blank lines ignored.
pub fn parse(source: &str) -> Result<Vec<Command>> {
    source
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(parse_command)
        .collect()
}

/// Parse a single RSF command line.
///
/// Each line is `<action>\t<rest>`, where `<rest>`'s shape depends on the
/// action (spec §4.3):
/// - `add-item\t<canonical JSON blob>`
/// - `append-entry\t<scope>\t<key>\t<timestamp>\t<blob-hash>`
/// - `assert-root-hash\t<hash>`
pub fn parse_command(line: &str) -> Result<Command> {
    let (action, rest) = line
        .split_once('\t')
        .ok_or_else(|| RegisterError::UnknownCommand(line.to_string()))?;

    match action {
        "add-item" => {
            let blob = parse_blob(rest).map_err(|_| RegisterError::MalformedAddItem(line.to_string()))?;
            Ok(Command::add_item(blob))
        }
        "append-entry" => {
            let entry = parse_entry(rest).map_err(|_| RegisterError::MalformedAppendEntry(line.to_string()))?;
            Ok(Command::append_entry(entry))
        }
        "assert-root-hash" => {
            let hash =
                parse_hash(rest.trim()).map_err(|_| RegisterError::MalformedAssertRootHash(line.to_string()))?;
            Ok(Command::assert_root_hash(hash))
        }
        _ => Err(RegisterError::UnknownCommand(line.to_string())),
    }
}

fn parse_blob(rest: &str) -> Result<Blob> {
    Blob::from_json(rest.trim())
}

fn parse_entry(rest: &str) -> Result<Entry> {
    let fields: Vec<&str> = rest.trim().split('\t').collect();
    let [scope, key, timestamp, blob_hash] = fields[..] else {
        return Err(RegisterError::MalformedAppendEntry(rest.to_string()));
    };

    let scope = Scope::from_str(scope).map_err(|_| RegisterError::BadScope(scope.to_string()))?;
    let blob_hash = parse_hash(blob_hash)?;

    Ok(Entry::new(key, scope, timestamp, blob_hash))
}

/// Parse a `"{algorithm}:{hexdigits}"` hash value.
pub fn parse_hash(original: &str) -> Result<Hash> {
    Hash::parse(original.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_add_item_line() {
        let command = parse_command(r#"add-item	{"country":"GB"}"#).unwrap();
        assert_eq!(command.as_blob().unwrap().get_str("country"), Some("GB"));
    }

    #[test]
    fn parses_append_entry_line() {
        let command =
            parse_command("append-entry\tuser\tGB\t2016-04-05T13:23:05Z\tsha-256:deadbeef").unwrap();
        let entry = command.as_entry().unwrap();
        assert_eq!(entry.key(), "GB");
        assert_eq!(entry.scope(), Scope::User);
        assert_eq!(entry.blob_hash().to_string(), "sha-256:deadbeef");
    }

    #[test]
    fn parses_assert_root_hash_line() {
        let command = parse_command("assert-root-hash\tsha-256:deadbeef").unwrap();
        assert_eq!(command.as_hash().unwrap().to_string(), "sha-256:deadbeef");
    }

    #[test]
    fn rejects_unknown_action() {
        let err = parse_command("delete-item\tfoo").unwrap_err();
        assert!(matches!(err, RegisterError::UnknownCommand(_)));
    }

    #[test]
    fn rejects_line_without_tab() {
        let err = parse_command("add-item").unwrap_err();
        assert!(matches!(err, RegisterError::UnknownCommand(_)));
    }

    #[test]
    fn rejects_malformed_append_entry() {
        let err = parse_command("append-entry\tuser\tGB").unwrap_err();
        assert!(matches!(err, RegisterError::MalformedAppendEntry(_)));
    }

    #[test]
    fn parse_skips_blank_lines() {
        let commands = parse("add-item\t{\"a\":\"b\"}\n\nassert-root-hash\tsha-256:deadbeef\n").unwrap();
        assert_eq!(commands.len(), 2);
    }
}
