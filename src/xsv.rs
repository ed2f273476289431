//! XSV (CSV/TSV) coercion between tabular rows and schema-validated blobs.
//!
//! Multi-values always split on `;`, regardless of the outer dialect's field
//! delimiter; a token containing `;` must be quoted to survive as one value.

use crate::blob::{Blob, Value};
use crate::error::{RegisterError, Result};
use crate::schema::{Cardinality, Schema};
use crate::validator::{validate, validate_key};
use std::collections::HashMap;
use std::io::Read;

/// Auto-detect CSV vs. TSV from the first line and parse every row into a
/// schema-validated blob (spec §4.8).
pub fn deserialise<R: Read>(mut reader: R, schema: &Schema) -> Result<Vec<Blob>> {
    let mut contents = String::new();
    reader
        .read_to_string(&mut contents)
        .map_err(|e| RegisterError::CommandError(e.to_string()))?;

    let delimiter = sniff_delimiter(&contents);

    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .from_reader(contents.as_bytes());

    let headers = rdr
        .headers()
        .map_err(|e| RegisterError::CommandError(e.to_string()))?
        .clone();

    let mut blobs = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(|e| RegisterError::CommandError(e.to_string()))?;
        let row: HashMap<String, String> = headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.to_string(), v.to_string()))
            .collect();
        blobs.push(coerce(&row, schema)?);
    }

    Ok(blobs)
}

/// Probes the first line for a tab to pick the dialect; CSV otherwise
/// (spec §4.8: "dialect is auto-detected from a 2 KiB probe").
fn sniff_delimiter(contents: &str) -> u8 {
    let probe = &contents[..contents.len().min(2048)];
    let first_line = probe.lines().next().unwrap_or("");
    if first_line.contains('\t') {
        b'\t'
    } else {
        b','
    }
}

/// Coerce a single row (field name -> raw token) into a blob validated
/// against `schema`.
pub fn coerce(row: &HashMap<String, String>, schema: &Schema) -> Result<Blob> {
    let mut data = Vec::new();

    for (key, raw) in row {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == ";" {
            continue;
        }

        let attr = schema
            .get(key)
            .ok_or_else(|| RegisterError::UnknownAttribute {
                attr: key.clone(),
                value: raw.clone(),
            })?;

        if key == schema.primary_key() {
            validate_key(trimmed)?;
        }

        if let Some(value) = deserialise_value(raw, attr.cardinality()) {
            data.push((key.clone(), value));
        }
    }

    let blob = Blob::new(data);
    validate(&blob, schema)?;
    Ok(blob)
}

/// Deserialise a raw token given its attribute's cardinality (spec §4.8).
pub fn deserialise_value(token: &str, cardinality: Cardinality) -> Option<Value> {
    if token.trim().is_empty() {
        return None;
    }

    match cardinality {
        Cardinality::Many => {
            let items: Vec<String> = split_token(token)
                .into_iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect();
            if items.is_empty() {
                None
            } else {
                Some(Value::Many(items))
            }
        }
        Cardinality::One => Some(Value::One(token.trim().to_string())),
    }
}

/// Split on `;`, respecting quoting so a quoted `"a;b"` token stays one value.
fn split_token(token: &str) -> Vec<String> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .from_reader(token.as_bytes());

    match rdr.records().next() {
        Some(Ok(record)) => record.iter().map(str::to_string).collect(),
        _ => Vec::new(),
    }
}

/// Quote a token if it contains `;`, so it round-trips through `split_token`.
fn quote_value(value: &str) -> String {
    if value.contains(';') {
        format!("\"{value}\"")
    } else {
        value.to_string()
    }
}

/// Serialise a value back to its XSV field representation: scalars pass
/// through, lists join on `;` with per-token quoting (spec §4.8).
pub fn serialise_value(value: &Value) -> String {
    match value {
        Value::One(s) => s.clone(),
        Value::Many(items) => items.iter().map(|v| quote_value(v)).collect::<Vec<_>>().join(";"),
    }
}

/// Serialise a blob to a row of fields in `headers` order, empty string for
/// any field the blob doesn't carry.
pub fn serialise_blob(blob: &Blob, headers: &[String]) -> Vec<String> {
    headers
        .iter()
        .map(|h| blob.get(h).map(serialise_value).unwrap_or_default())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{integer, integer_set, string};

    fn tsv_schema() -> Schema {
        let mut schema = Schema::new("foo");
        schema.insert(string("foo")).unwrap();
        schema.insert(integer_set("x")).unwrap();
        schema.insert(integer("y")).unwrap();
        schema
    }

    #[test]
    fn deserialise_value_many_splits_and_trims() {
        let value = deserialise_value("1;2; 3", Cardinality::Many).unwrap();
        assert_eq!(value.as_many().unwrap(), &["1", "2", "3"]);
    }

    #[test]
    fn deserialise_value_many_drops_trailing_empty() {
        let value = deserialise_value("1;", Cardinality::Many).unwrap();
        assert_eq!(value.as_many().unwrap(), &["1"]);
    }

    #[test]
    fn deserialise_value_empty_is_none() {
        assert!(deserialise_value("", Cardinality::One).is_none());
        assert!(deserialise_value("  ", Cardinality::Many).is_none());
    }

    #[test]
    fn serialise_value_quotes_tokens_containing_semicolon() {
        let value = Value::Many(vec!["foo".to_string(), "bar;far".to_string()]);
        assert_eq!(serialise_value(&value), r#"foo;"bar;far""#);
    }

    #[test]
    fn coerce_drops_empty_and_separator_only_fields() {
        let mut row = HashMap::new();
        row.insert("foo".to_string(), "abc".to_string());
        row.insert("x".to_string(), ";".to_string());
        row.insert("y".to_string(), "4".to_string());

        let blob = coerce(&row, &tsv_schema()).unwrap();
        assert_eq!(blob.get_str("foo"), Some("abc"));
        assert!(blob.get("x").is_none());
        assert_eq!(blob.get_str("y"), Some("4"));
    }

    #[test]
    fn coerce_splits_many_valued_field() {
        let mut row = HashMap::new();
        row.insert("foo".to_string(), "abc".to_string());
        row.insert("x".to_string(), "1;2;3".to_string());
        row.insert("y".to_string(), "4".to_string());

        let blob = coerce(&row, &tsv_schema()).unwrap();
        assert_eq!(blob.get("x").unwrap().as_many().unwrap(), &["1", "2", "3"]);
    }

    #[test]
    fn coerce_rejects_unknown_field() {
        let mut row = HashMap::new();
        row.insert("foo".to_string(), "abc".to_string());
        row.insert("bogus".to_string(), "1".to_string());
        row.insert("y".to_string(), "4".to_string());

        let err = coerce(&row, &tsv_schema()).unwrap_err();
        assert!(matches!(err, RegisterError::UnknownAttribute { .. }));
    }

    #[test]
    fn deserialise_reads_tsv_with_detected_dialect() {
        let input = "foo\tx\ty\nabc\t1;2;3\t4\n";
        let blobs = deserialise(input.as_bytes(), &tsv_schema()).unwrap();
        assert_eq!(blobs.len(), 1);
        assert_eq!(blobs[0].get_str("foo"), Some("abc"));
        assert_eq!(blobs[0].get("x").unwrap().as_many().unwrap(), &["1", "2", "3"]);
    }
}
