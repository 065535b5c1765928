//! Typed field values and the record abstraction.
//!
//! Every entity shown in a collection view implements [`Record`]: a stable
//! identifier plus a by-name field lookup returning a [`FieldValue`]. Filters,
//! sorting, search and stats only ever look at records through this trait.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;

/// A single field value of a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    /// Missing or explicitly null
    Null,
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Timestamp(DateTime<Utc>),
    /// A value from a closed set (status, role name, ...)
    Enum(String),
}

/// Declared kind of a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Integer,
    Float,
    Bool,
    Timestamp,
    Enum,
}

impl FieldKind {
    /// Kinds whose values have a natural order usable by range filters.
    pub fn is_ordered(&self) -> bool {
        !matches!(self, FieldKind::Bool | FieldKind::Enum)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldKind::Integer | FieldKind::Float)
    }
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Numeric view of the value, used by averages and numeric compares.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Integer(v) => Some(*v as f64),
            FieldValue::Float(v) if v.is_finite() => Some(*v),
            _ => None,
        }
    }

    /// Ordinal tick count (milliseconds since the epoch) for timestamps.
    pub fn ticks(&self) -> Option<i64> {
        match self {
            FieldValue::Timestamp(ts) => Some(ts.timestamp_millis()),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) | FieldValue::Enum(s) => Some(s),
            _ => None,
        }
    }

    /// String form used for search matching and distribution buckets.
    pub fn display_string(&self) -> Option<String> {
        match self {
            FieldValue::Null => None,
            FieldValue::Text(s) | FieldValue::Enum(s) => Some(s.clone()),
            FieldValue::Integer(v) => Some(v.to_string()),
            FieldValue::Float(v) => Some(v.to_string()),
            FieldValue::Bool(v) => Some(v.to_string()),
            FieldValue::Timestamp(ts) => Some(ts.to_rfc3339()),
        }
    }

    /// Convert the value into the declared field kind.
    ///
    /// Records coming from JSON carry timestamps and numbers as strings; this
    /// is where they become comparable. Values that cannot be converted
    /// become [`FieldValue::Null`] so they sort last instead of out of order.
    /// NaN and infinite floats are unordered data and count as null too.
    pub fn coerce(self, kind: FieldKind) -> FieldValue {
        match (kind, self) {
            (_, FieldValue::Null) => FieldValue::Null,
            (_, FieldValue::Float(v)) if !v.is_finite() => FieldValue::Null,
            (FieldKind::Text, FieldValue::Enum(s)) => FieldValue::Text(s),
            (FieldKind::Text, other) => other,
            (FieldKind::Enum, FieldValue::Text(s)) => FieldValue::Enum(s),
            (FieldKind::Enum, other) => other,
            (FieldKind::Integer, FieldValue::Text(s)) => s
                .trim()
                .parse::<i64>()
                .map(FieldValue::Integer)
                .unwrap_or(FieldValue::Null),
            (FieldKind::Float, FieldValue::Text(s)) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(FieldValue::Float)
                .unwrap_or(FieldValue::Null),
            (FieldKind::Float, FieldValue::Integer(v)) => FieldValue::Float(v as f64),
            (FieldKind::Bool, FieldValue::Text(s)) => match s.trim().to_ascii_lowercase().as_str()
            {
                "true" | "yes" | "1" => FieldValue::Bool(true),
                "false" | "no" | "0" => FieldValue::Bool(false),
                _ => FieldValue::Null,
            },
            (FieldKind::Timestamp, FieldValue::Text(s)) => {
                parse_timestamp(&s).map_or(FieldValue::Null, FieldValue::Timestamp)
            }
            (FieldKind::Timestamp, FieldValue::Integer(ms)) => DateTime::from_timestamp_millis(ms)
                .map_or(FieldValue::Null, FieldValue::Timestamp),
            (_, other) => other,
        }
    }
}

/// Parse the timestamp formats the backend emits.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Null, Into::into)
    }
}

/// An item of a remote collection.
pub trait Record: Clone + Send + Sync + 'static {
    /// Stable unique identifier type.
    type Id: Clone + Eq + Hash + Debug + Send + Sync + 'static;

    fn id(&self) -> Self::Id;

    /// Look up a field by key; unknown keys return [`FieldValue::Null`].
    fn field(&self, key: &str) -> FieldValue;
}
