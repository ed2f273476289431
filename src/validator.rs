//! Value and blob validation against the closed datatype vocabulary.

use crate::blob::{Blob, Value};
use crate::error::{RegisterError, Result};
use crate::schema::{Cardinality, Datatype, Schema};
use once_cell::sync::Lazy;
use regex::Regex;

static CURIE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z][a-z0-9-]*:[\w0-9_/.%-]*$").unwrap());
static DATETIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}(-\d{2}(-\d{2}(T\d{2}(:\d{2}(:\d{2})?)?Z)?)?)?$").unwrap()
});
static NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9-]*$").unwrap());
static HASH_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^sha-256:[a-f0-9]{64}$").unwrap());
static INTEGER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(0|-?[1-9][0-9]*)$").unwrap());
static TIMESTAMP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}Z$").unwrap());
static PERIOD_DURATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^P(?:[0-9]+Y)?(?:[0-9]+M)?(?:[0-9]+D)?(?:T(?:[0-9]+H)?(?:[0-9]+M)?(?:[0-9]+S)?)?$").unwrap()
});
static KEY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_./-]*$").unwrap());

/// Validate a key: it must match the key grammar and contain no two
/// consecutive characters drawn from `_./-` (spec §4.6).
pub fn validate_key(key: &str) -> Result<()> {
    if !KEY_RE.is_match(key) {
        return Err(RegisterError::InvalidKey(key.to_string()));
    }

    let separators = "_./-";
    let chars: Vec<char> = key.chars().collect();
    for window in chars.windows(2) {
        if separators.contains(window[0]) && separators.contains(window[1]) {
            return Err(RegisterError::InvalidKey(key.to_string()));
        }
    }

    Ok(())
}

/// Validate a single scalar against a datatype's grammar.
pub fn validate_value_datatype(value: &str, datatype: Datatype) -> Result<()> {
    let ok = match datatype {
        Datatype::Curie => CURIE_RE.is_match(value),
        Datatype::Datetime => DATETIME_RE.is_match(value),
        Datatype::Name => NAME_RE.is_match(value),
        Datatype::Hash => HASH_RE.is_match(value),
        Datatype::Integer => INTEGER_RE.is_match(value),
        Datatype::Timestamp => TIMESTAMP_RE.is_match(value),
        Datatype::Url => is_valid_url(value),
        Datatype::Period => is_valid_period(value),
        Datatype::String | Datatype::Text => true,
    };

    if ok {
        Ok(())
    } else {
        Err(RegisterError::InvalidValue {
            datatype: datatype.to_string(),
            value: value.to_string(),
        })
    }
}

/// A URL is valid when its scheme is `http`/`https` and its hostname
/// contains a `.` (spec §4.6 — stricter than a bare `^https?://` prefix
/// check, since a scheme with no real host would otherwise pass).
fn is_valid_url(value: &str) -> bool {
    let Some(rest) = value
        .strip_prefix("http://")
        .or_else(|| value.strip_prefix("https://"))
    else {
        return false;
    };

    let host = rest.split(['/', '?', '#']).next().unwrap_or("");
    let host = host.split('@').next_back().unwrap_or(host);
    let host = host.rsplit_once(':').map(|(h, _)| h).unwrap_or(host);
    !host.is_empty() && host.contains('.')
}

/// A period is either an ISO-8601 duration (bare `P` and trailing `T`
/// forbidden) or `part/part` where each part is a duration or a datetime
/// (spec §4.6 — the `part/part` form is an enrichment over the plain
/// duration grammar the source validated).
fn is_valid_period(value: &str) -> bool {
    if let Some((left, right)) = value.split_once('/') {
        return is_duration_or_datetime(left) && is_duration_or_datetime(right);
    }
    is_valid_duration(value)
}

fn is_duration_or_datetime(part: &str) -> bool {
    is_valid_duration(part) || DATETIME_RE.is_match(part)
}

fn is_valid_duration(value: &str) -> bool {
    if value == "P" || value.ends_with('T') {
        return false;
    }
    PERIOD_DURATION_RE.is_match(value)
}

/// Validate a blob against a schema (spec §4.6): the primary key must be
/// present and non-null, every present field must be defined, value shape
/// must match cardinality, and scalars must satisfy their datatype grammar.
pub fn validate(blob: &Blob, schema: &Schema) -> Result<()> {
    match blob.get(schema.primary_key()) {
        Some(Value::One(s)) if !s.is_empty() => {}
        _ => {
            return Err(RegisterError::MissingPrimaryKey(schema.primary_key().to_string()));
        }
    }

    for (field, value) in blob.iter() {
        let attr = schema.get(field).ok_or_else(|| RegisterError::UnknownAttribute {
            attr: field.to_string(),
            value: describe(value),
        })?;

        match (attr.cardinality(), value) {
            (Cardinality::One, Value::One(s)) => validate_value_datatype(s, attr.datatype())?,
            (Cardinality::Many, Value::Many(items)) => {
                for item in items {
                    validate_value_datatype(item, attr.datatype())?;
                }
            }
            (expected, _) => {
                return Err(RegisterError::CardinalityMismatch {
                    attr: field.to_string(),
                    expected: expected.to_string(),
                    value: describe(value),
                });
            }
        }
    }

    Ok(())
}

fn describe(value: &Value) -> String {
    match value {
        Value::One(s) => s.clone(),
        Value::Many(items) => items.join(";"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{curie, integer, string, string_set, url};

    #[test]
    fn key_grammar_accepts_valid_keys() {
        assert!(validate_key("GB").is_ok());
        assert!(validate_key("field:country").is_ok());
        assert!(validate_key("a-b.c/d_e").is_ok());
    }

    #[test]
    fn key_grammar_rejects_leading_separator() {
        assert!(validate_key("-gb").is_err());
    }

    #[test]
    fn key_grammar_rejects_consecutive_separators() {
        assert!(validate_key("a--b").is_err());
        assert!(validate_key("a_.b").is_err());
        assert!(validate_key("a./b").is_err());
    }

    #[test]
    fn integer_grammar() {
        assert!(validate_value_datatype("0", Datatype::Integer).is_ok());
        assert!(validate_value_datatype("-12", Datatype::Integer).is_ok());
        assert!(validate_value_datatype("007", Datatype::Integer).is_err());
        assert!(validate_value_datatype("-0", Datatype::Integer).is_err());
    }

    #[test]
    fn url_grammar_requires_dotted_host() {
        assert!(validate_value_datatype("https://example.com", Datatype::Url).is_ok());
        assert!(validate_value_datatype("http://localhost", Datatype::Url).is_err());
        assert!(validate_value_datatype("ftp://example.com", Datatype::Url).is_err());
    }

    #[test]
    fn period_grammar_covers_duration_and_range_forms() {
        assert!(validate_value_datatype("P1Y2M3D", Datatype::Period).is_ok());
        assert!(validate_value_datatype("PT1H", Datatype::Period).is_ok());
        assert!(validate_value_datatype("P", Datatype::Period).is_err());
        assert!(validate_value_datatype("P1YT", Datatype::Period).is_err());
        assert!(validate_value_datatype("P1Y/P2Y", Datatype::Period).is_ok());
        assert!(validate_value_datatype("2020/2020-06", Datatype::Period).is_ok());
    }

    #[test]
    fn validate_rejects_missing_primary_key() {
        let mut schema = Schema::new("country");
        schema.insert(string("country")).unwrap();
        schema.insert(string("name")).unwrap();
        let blob = Blob::new([("name".to_string(), Value::from("Atlantis"))]);
        let err = validate(&blob, &schema).unwrap_err();
        assert!(matches!(err, RegisterError::MissingPrimaryKey(_)));
    }

    #[test]
    fn validate_rejects_undeclared_attribute() {
        let mut schema = Schema::new("country");
        schema.insert(string("country")).unwrap();
        let blob = Blob::new([
            ("country".to_string(), Value::from("GB")),
            ("bogus".to_string(), Value::from("x")),
        ]);
        let err = validate(&blob, &schema).unwrap_err();
        assert!(matches!(err, RegisterError::UnknownAttribute { .. }));
    }

    #[test]
    fn validate_rejects_cardinality_mismatch() {
        let mut schema = Schema::new("country");
        schema.insert(string("country")).unwrap();
        schema.insert(string_set("citizen-names")).unwrap();
        let blob = Blob::new([
            ("country".to_string(), Value::from("GB")),
            ("citizen-names".to_string(), Value::from("Briton")),
        ]);
        let err = validate(&blob, &schema).unwrap_err();
        assert!(matches!(err, RegisterError::CardinalityMismatch { .. }));
    }

    #[test]
    fn validate_accepts_well_formed_blob() {
        let mut schema = Schema::new("country");
        schema.insert(string("country")).unwrap();
        schema.insert(integer("population")).unwrap();
        schema.insert(curie("wikidata")).unwrap();
        schema.insert(url("website")).unwrap();
        let blob = Blob::new([
            ("country".to_string(), Value::from("GB")),
            ("population".to_string(), Value::from("67000000")),
            ("wikidata".to_string(), Value::from("wd:Q145")),
            ("website".to_string(), Value::from("https://gov.uk")),
        ]);
        assert!(validate(&blob, &schema).is_ok());
    }
}
