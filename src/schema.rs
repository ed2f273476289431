//! Schemas: the attribute list derived from a register's metadata log.

use crate::blob::Blob;
use crate::error::{RegisterError, Result};
use std::fmt;
use std::str::FromStr;

/// How many values an attribute carries: one scalar, or a list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cardinality {
    One,
    Many,
}

impl Cardinality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Cardinality::One => "1",
            Cardinality::Many => "n",
        }
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Cardinality {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "1" => Ok(Cardinality::One),
            "n" => Ok(Cardinality::Many),
            _ => Err(()),
        }
    }
}

/// The closed vocabulary of attribute value shapes (spec §4.6).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Datatype {
    Curie,
    Datetime,
    Name,
    Hash,
    Integer,
    Period,
    String,
    Text,
    Timestamp,
    Url,
}

impl Datatype {
    pub fn as_str(&self) -> &'static str {
        match self {
            Datatype::Curie => "curie",
            Datatype::Datetime => "datetime",
            Datatype::Name => "name",
            Datatype::Hash => "hash",
            Datatype::Integer => "integer",
            Datatype::Period => "period",
            Datatype::String => "string",
            Datatype::Text => "text",
            Datatype::Timestamp => "timestamp",
            Datatype::Url => "url",
        }
    }
}

impl fmt::Display for Datatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Datatype {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "curie" => Datatype::Curie,
            "datetime" => Datatype::Datetime,
            "name" => Datatype::Name,
            "hash" => Datatype::Hash,
            "integer" => Datatype::Integer,
            "period" => Datatype::Period,
            "string" => Datatype::String,
            "text" => Datatype::Text,
            "timestamp" => Datatype::Timestamp,
            "url" => Datatype::Url,
            _ => return Err(()),
        })
    }
}

/// A single field in a schema: identifier, shape, and optional description.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    uid: String,
    datatype: Datatype,
    cardinality: Cardinality,
    description: Option<String>,
}

impl Attribute {
    pub fn new(
        uid: impl Into<String>,
        datatype: Datatype,
        cardinality: Cardinality,
        description: Option<String>,
    ) -> Self {
        Self {
            uid: uid.into(),
            datatype,
            cardinality,
            description,
        }
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn datatype(&self) -> Datatype {
        self.datatype
    }

    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Parse an attribute out of a `field:<uid>` metadata record's blob
    /// (spec §4.5: `field`, `datatype`, `cardinality`, `text`).
    pub fn from_blob(blob: &Blob) -> Result<Self> {
        let uid = blob
            .get_str("field")
            .ok_or(RegisterError::MissingAttributeIdentifier)?
            .to_string();
        let datatype = blob
            .get_str("datatype")
            .and_then(|s| Datatype::from_str(s).ok())
            .ok_or_else(|| RegisterError::InvalidValue {
                datatype: "datatype".to_string(),
                value: blob.get_str("datatype").unwrap_or_default().to_string(),
            })?;
        let cardinality = blob
            .get_str("cardinality")
            .and_then(|s| Cardinality::from_str(s).ok())
            .ok_or_else(|| RegisterError::InvalidValue {
                datatype: "cardinality".to_string(),
                value: blob.get_str("cardinality").unwrap_or_default().to_string(),
            })?;
        let description = blob.get_str("text").map(str::to_string);

        Ok(Attribute::new(uid, datatype, cardinality, description))
    }
}

/// Convenience constructors matching the ten datatypes, one scalar helper
/// per type (`string("foo")`) and one set helper (`string_set("foo")`).
macro_rules! attribute_helpers {
    ($($scalar:ident, $set:ident => $variant:ident);* $(;)?) => {
        $(
            pub fn $scalar(uid: impl Into<String>) -> Attribute {
                Attribute::new(uid, Datatype::$variant, Cardinality::One, None)
            }

            pub fn $set(uid: impl Into<String>) -> Attribute {
                Attribute::new(uid, Datatype::$variant, Cardinality::Many, None)
            }
        )*
    };
}

attribute_helpers! {
    string, string_set => String;
    integer, integer_set => Integer;
    curie, curie_set => Curie;
    datetime, datetime_set => Datetime;
    name, name_set => Name;
    hash, hash_set => Hash;
    period, period_set => Period;
    text, text_set => Text;
    timestamp, timestamp_set => Timestamp;
    url, url_set => Url;
}

/// A primary key plus the ordered list of attributes derived from a
/// register's metadata log.
#[derive(Clone, Debug, Default)]
pub struct Schema {
    primary_key: String,
    attributes: Vec<Attribute>,
}

impl Schema {
    pub fn new(primary_key: impl Into<String>) -> Self {
        Self {
            primary_key: primary_key.into(),
            attributes: Vec::new(),
        }
    }

    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Ready once there are at least two attributes, one of which is the
    /// primary key (spec §4.5).
    pub fn is_ready(&self) -> bool {
        self.attributes.len() > 1 && self.get(&self.primary_key).is_some()
    }

    pub fn insert(&mut self, attr: Attribute) -> Result<()> {
        if self.get(&attr.uid).is_some() {
            return Err(RegisterError::AttributeAlreadyExists(attr.uid));
        }
        self.attributes.push(attr);
        Ok(())
    }

    pub fn get(&self, uid: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.uid == uid)
    }
}
