//! Emitting RSF commands back to the tab-delimited wire format.

use super::command::{Action, Command};

/// Render a full command sequence as an RSF document, one line per command,
/// terminated with a trailing newline.
pub fn emit(commands: &[Command]) -> String {
    let mut out = String::new();
    for command in commands {
        out.push_str(&emit_command(command));
        out.push('\n');
    }
    out
}

/// Render a single command as its RSF line (no trailing newline).
pub fn emit_command(command: &Command) -> String {
    match command.action() {
        Action::AddItem => format!(
            "add-item\t{}",
            command.as_blob().expect("add-item command").to_canonical_json()
        ),
        Action::AppendEntry => {
            let entry = command.as_entry().expect("append-entry command");
            format!(
                "append-entry\t{}\t{}\t{}\t{}",
                entry.scope(),
                entry.key(),
                entry.timestamp(),
                entry.blob_hash(),
            )
        }
        Action::AssertRootHash => format!(
            "assert-root-hash\t{}",
            command.as_hash().expect("assert-root-hash command")
        ),
    }
}
