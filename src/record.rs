//! Records: an entry paired with the blob it currently points at.

use crate::blob::Blob;
use crate::entry::Entry;

/// The current value for a key: its latest entry plus the blob it names.
///
/// Unlike [`Entry::to_canonical_json`], a record's JSON form drops
/// `item-hash` and inlines the blob's attributes under `item` instead (spec
/// §6: "a record is a thin view over an entry, with the item embedded").
#[derive(Clone, Debug)]
pub struct Record {
    entry: Entry,
    blob: Blob,
}

impl Record {
    pub fn new(entry: Entry, blob: Blob) -> Self {
        Self { entry, blob }
    }

    pub fn entry(&self) -> &Entry {
        &self.entry
    }

    pub fn blob(&self) -> &Blob {
        &self.blob
    }

    pub fn key(&self) -> &str {
        self.entry.key()
    }

    /// The HTTP resource body for this record (spec §6): an object keyed by
    /// the record's key, never array-wrapped.
    ///
    /// ```json
    /// {"GB":{"index-entry-number":"1","entry-number":"1","entry-timestamp":"...","key":"GB","item":[{...}]}}
    /// ```
    pub fn to_json(&self) -> String {
        let entry_json = self.entry.to_canonical_json();
        let without_item_hash = entry_json
            .trim_start_matches('[')
            .trim_end_matches(']')
            .trim_start_matches('{')
            .trim_end_matches('}');

        let fields: Vec<&str> = split_top_level_object_fields(without_item_hash)
            .into_iter()
            .filter(|f| !f.starts_with("\"item-hash\""))
            .collect();

        format!(
            "{{{:?}:{{{},\"item\":[{}]}}}}",
            self.key(),
            fields.join(","),
            self.blob.to_canonical_json()
        )
    }
}

/// Split a flat (non-nested-object) JSON object's body into its
/// `"key":value` fields, respecting quoted strings and `[...]` arrays.
fn split_top_level_object_fields(body: &str) -> Vec<&str> {
    let mut fields = Vec::new();
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escaped = false;
    let mut start = 0usize;

    for (i, c) in body.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '[' | '{' => depth += 1,
            ']' | '}' => depth -= 1,
            ',' if depth == 0 => {
                fields.push(body[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    let tail = body[start..].trim();
    if !tail.is_empty() {
        fields.push(tail);
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{Entry, Scope};
    use crate::blob::Value;
    use crate::hash::Hash;

    #[test]
    fn to_json_replaces_item_hash_with_inlined_item() {
        let blob = Blob::new([("name".to_string(), Value::from("United Kingdom"))]);
        let mut entry = Entry::new("GB", Scope::User, "2016-04-05T13:23:05Z", blob.digest());
        entry.set_position(1);
        let record = Record::new(entry, blob);

        let json = record.to_json();
        assert!(!json.contains("item-hash"));
        assert!(json.starts_with(r#"{"GB":{"#));
        assert!(json.contains(r#""item":[{"name":"United Kingdom"}]"#));
        assert!(json.contains(r#""key":"GB""#));
        assert!(json.ends_with("}}"));
    }

    #[test]
    fn key_and_blob_accessors() {
        let blob = Blob::new([("name".to_string(), Value::from("x"))]);
        let entry = Entry::new("k", Scope::User, "2020-01-01T00:00:00Z", Hash::sha256(b"x"));
        let record = Record::new(entry, blob.clone());
        assert_eq!(record.key(), "k");
        assert_eq!(record.blob(), &blob);
    }
}
