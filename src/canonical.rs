//! Deterministic, hand-rolled JSON canonicalisation.
//!
//! A general-purpose JSON library's default serializer does not guarantee
//! byte-stable key ordering or escaping across versions, so blob digests
//! would not be reproducible across platforms if we leaned on one. Instead
//! this module sorts keys by byte order, forbids whitespace, and emits
//! non-ASCII characters as raw UTF-8 rather than `\uXXXX` escapes — matching
//! the Registers Specification's canonicalisation rules.

use crate::blob::Value;
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Render a blob's attribute map as canonical JSON bytes.
///
/// Keys are sorted lexicographically by byte value (a `BTreeMap<String, _>`
/// already iterates this way). Separators are `,` and `:` with no whitespace.
pub fn encode_blob(data: &BTreeMap<String, Value>) -> String {
    let mut out = String::with_capacity(64 + data.len() * 16);
    out.push('{');

    for (i, (key, value)) in data.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        encode_string(key, &mut out);
        out.push(':');
        encode_value(value, &mut out);
    }

    out.push('}');
    out
}

fn encode_value(value: &Value, out: &mut String) {
    match value {
        Value::One(s) => encode_string(s, out),
        Value::Many(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                encode_string(item, out);
            }
            out.push(']');
        }
    }
}

/// JSON-escape a string per RFC 8259, passing non-ASCII bytes through as raw
/// UTF-8 rather than `\uXXXX`.
fn encode_string(s: &str, out: &mut String) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
}
