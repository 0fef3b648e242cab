//! Generated values.

use crate::keyword::KeywordFamily;
use chrono::{DateTime, SecondsFormat};
use chrono_tz::Tz;
use serde::{Serialize, Serializer};
use std::fmt;

/// A value produced from a keyword string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum GeneratedValue {
    /// From `[randstring]`
    Text(String),
    /// From `[randint]`
    Integer(i64),
    /// From `[datetime]`
    DateTime(#[serde(serialize_with = "serialize_zoned")] DateTime<Tz>),
}

impl GeneratedValue {
    /// The family that produces this kind of value.
    pub fn family(&self) -> KeywordFamily {
        match self {
            GeneratedValue::Text(_) => KeywordFamily::RandomString,
            GeneratedValue::Integer(_) => KeywordFamily::RandomInteger,
            GeneratedValue::DateTime(_) => KeywordFamily::DateTime,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            GeneratedValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            GeneratedValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<&DateTime<Tz>> {
        match self {
            GeneratedValue::DateTime(dt) => Some(dt),
            _ => None,
        }
    }
}

/// Format a zoned datetime as RFC 3339 followed by the bracketed zone id,
/// e.g. `2016-04-12T13:06:04.157-04:00[America/New_York]`.
pub fn format_zoned(dt: &DateTime<Tz>) -> String {
    format!(
        "{}[{}]",
        dt.to_rfc3339_opts(SecondsFormat::AutoSi, false),
        dt.timezone().name()
    )
}

fn serialize_zoned<S: Serializer>(dt: &DateTime<Tz>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_zoned(dt))
}

impl fmt::Display for GeneratedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeneratedValue::Text(s) => f.write_str(s),
            GeneratedValue::Integer(i) => write!(f, "{i}"),
            GeneratedValue::DateTime(dt) => f.write_str(&format_zoned(dt)),
        }
    }
}

impl From<String> for GeneratedValue {
    fn from(value: String) -> Self {
        GeneratedValue::Text(value)
    }
}

impl From<i64> for GeneratedValue {
    fn from(value: i64) -> Self {
        GeneratedValue::Integer(value)
    }
}

impl From<DateTime<Tz>> for GeneratedValue {
    fn from(value: DateTime<Tz>) -> Self {
        GeneratedValue::DateTime(value)
    }
}
