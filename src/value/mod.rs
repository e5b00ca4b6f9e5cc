//! Runtime value model
//!
//! Every script value is one of a closed set of kinds. Conversions between
//! kinds follow the legacy engine exactly, quirks included; the rules live
//! here so that operators, the function catalog and the analyzer all agree.
//!
//! Conversions are total: a kind that cannot be converted yields a
//! `CoercionFault` value instead of panicking, and the caller decides whether
//! that becomes a runtime error or a static diagnostic.

pub mod arrays;
pub mod ops;
pub mod static_ops;

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Largest array or string a script may grow in one step
pub const MAX_COLLECTION_LEN: usize = 1 << 24;

/// The fixed runtime data tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Number,
    String,
    Bool,
    Null,
    Void,
    Array,
    Dictionary,
    Binary,
    Date,
}

impl ValueKind {
    pub const ALL: [ValueKind; 9] = [
        ValueKind::Number,
        ValueKind::String,
        ValueKind::Bool,
        ValueKind::Null,
        ValueKind::Void,
        ValueKind::Array,
        ValueKind::Dictionary,
        ValueKind::Binary,
        ValueKind::Date,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Number => "number",
            ValueKind::String => "string",
            ValueKind::Bool => "bool",
            ValueKind::Null => "null",
            ValueKind::Void => "void",
            ValueKind::Array => "array",
            ValueKind::Dictionary => "dictionary",
            ValueKind::Binary => "binary",
            ValueKind::Date => "date",
        }
    }

    /// Null and void behave identically in operators
    pub fn is_nullish(self) -> bool {
        matches!(self, ValueKind::Null | ValueKind::Void)
    }

    /// Kinds accepted by `&&`, `||`, `!` and boolean parameters
    pub fn is_bool_convertible(self) -> bool {
        matches!(
            self,
            ValueKind::Number | ValueKind::String | ValueKind::Bool | ValueKind::Null | ValueKind::Void
        )
    }

    /// Kinds that `to_number` accepts outside of sort evaluation
    pub fn is_number_convertible(self) -> bool {
        matches!(
            self,
            ValueKind::Number
                | ValueKind::String
                | ValueKind::Bool
                | ValueKind::Null
                | ValueKind::Void
                | ValueKind::Date
        )
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A conversion the value model does not define for the source kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoercionFault {
    pub from: ValueKind,
    pub to: ValueKind,
}

impl fmt::Display for CoercionFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot convert {} to {}", self.from, self.to)
    }
}

/// Runtime values
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Double precision number; the language has no separate integer kind
    Number(f64),

    /// String value
    String(String),

    /// Boolean value
    Bool(bool),

    /// Explicit null, e.g. from `Null()` or an unset variable
    Null,

    /// Absence of a value (empty block, functions without a result)
    Void,

    /// Ordered, growable array
    Array(Vec<Value>),

    /// String-keyed dictionary, iterated in key order
    Dictionary(BTreeMap<String, Value>),

    /// Raw bytes
    Binary(Vec<u8>),

    /// Instant in UTC
    Date(DateTime<Utc>),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::Bool(_) => ValueKind::Bool,
            Value::Null => ValueKind::Null,
            Value::Void => ValueKind::Void,
            Value::Array(_) => ValueKind::Array,
            Value::Dictionary(_) => ValueKind::Dictionary,
            Value::Binary(_) => ValueKind::Binary,
            Value::Date(_) => ValueKind::Date,
        }
    }

    pub fn is_nullish(&self) -> bool {
        self.kind().is_nullish()
    }

    fn fault(&self, to: ValueKind) -> CoercionFault {
        CoercionFault {
            from: self.kind(),
            to,
        }
    }

    // ── Conversions ───────────────────────────────────────────────────

    /// Truthiness. Strings accept `true`/`t` in any case, otherwise they
    /// are parsed as numbers and tested against zero.
    pub fn to_bool(&self) -> Result<bool, CoercionFault> {
        match self {
            Value::Number(n) => Ok(*n != 0.0),
            Value::Bool(b) => Ok(*b),
            Value::String(s) => Ok(string_to_bool(s)),
            Value::Null | Value::Void => Ok(false),
            Value::Array(_) | Value::Dictionary(_) | Value::Binary(_) | Value::Date(_) => {
                Err(self.fault(ValueKind::Bool))
            }
        }
    }

    /// Numeric value. Unparsable strings become 0, dates become Unix
    /// seconds.
    pub fn to_number(&self) -> Result<f64, CoercionFault> {
        match self {
            Value::Number(n) => Ok(*n),
            Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
            Value::String(s) => Ok(parse_number_prefix(s).unwrap_or(0.0)),
            Value::Null | Value::Void => Ok(0.0),
            Value::Date(d) => Ok(epoch_seconds(d)),
            Value::Array(_) | Value::Dictionary(_) | Value::Binary(_) => {
                Err(self.fault(ValueKind::Number))
            }
        }
    }

    /// Date value. Numbers are read as Unix seconds, strings are parsed.
    pub fn to_date(&self) -> Result<DateTime<Utc>, CoercionFault> {
        match self {
            Value::Date(d) => Ok(*d),
            Value::Number(n) => {
                Utc.timestamp_millis_opt((n * 1000.0) as i64)
                    .single()
                    .ok_or(self.fault(ValueKind::Date))
            }
            Value::String(s) => parse_date(s).ok_or(self.fault(ValueKind::Date)),
            _ => Err(self.fault(ValueKind::Date)),
        }
    }

    /// Bytes of a binary value; strings contribute their UTF-8 encoding
    pub fn to_binary(&self) -> Result<Vec<u8>, CoercionFault> {
        match self {
            Value::Binary(b) => Ok(b.clone()),
            Value::String(s) => Ok(s.as_bytes().to_vec()),
            Value::Null | Value::Void => Ok(Vec::new()),
            _ => Err(self.fault(ValueKind::Binary)),
        }
    }

    /// Key used by `SortArray`. Unlike `to_number` this never faults:
    /// kinds without a numeric reading sort as 0.
    pub fn sort_value(&self) -> f64 {
        match self {
            Value::Number(n) => *n,
            Value::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Value::String(s) => parse_number_prefix(s).unwrap_or(0.0),
            Value::Date(d) => epoch_seconds(d),
            Value::Null | Value::Void | Value::Array(_) | Value::Dictionary(_) | Value::Binary(_) => 0.0,
        }
    }

    /// Rendering of a value nested inside an array or dictionary
    fn fmt_element(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "\"{}\"", s),
            other => write!(f, "{}", other),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::String(s) => f.write_str(s),
            Value::Bool(b) => f.write_str(if *b { "1" } else { "0" }),
            Value::Null | Value::Void => Ok(()),
            Value::Array(items) => {
                f.write_str("{")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    item.fmt_element(f)?;
                }
                f.write_str("}")
            }
            Value::Dictionary(entries) => {
                f.write_str("[")?;
                for (i, (key, item)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}=>", key)?;
                    item.fmt_element(f)?;
                }
                f.write_str("]")
            }
            Value::Binary(bytes) => f.write_str(&binary_to_string(bytes)),
            Value::Date(d) => f.write_str(&d.to_rfc3339_opts(SecondsFormat::Millis, true)),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

// ── Helpers ───────────────────────────────────────────────────────────

fn string_to_bool(s: &str) -> bool {
    if s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("t") {
        return true;
    }
    parse_number_prefix(s).map(|n| n != 0.0).unwrap_or(false)
}

fn epoch_seconds(d: &DateTime<Utc>) -> f64 {
    d.timestamp_millis() as f64 / 1000.0
}

/// Best-effort numeric parse: leading whitespace is skipped and the longest
/// numeric prefix is read, so `"12abc"` is 12. Returns `None` when no digit
/// is found.
pub fn parse_number_prefix(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut j = frac_start;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if digits + (j - frac_start) > 0 {
            digits += j - frac_start;
            end = j;
        }
    }
    if digits == 0 {
        return None;
    }

    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut j = end + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            end = j;
        }
    }

    s[..end].parse::<f64>().ok()
}

/// Integral numbers print without a fraction
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        }
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Binary renders as UTF-8 only when it holds no null byte; anything else,
/// including invalid UTF-8, falls back to lowercase hex.
pub fn binary_to_string(bytes: &[u8]) -> String {
    if !bytes.contains(&0) {
        if let Ok(s) = std::str::from_utf8(bytes) {
            return s.to_string();
        }
    }
    hex::encode(bytes)
}

/// Accepts RFC 3339 plus the date layouts scripts commonly carry
pub fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(d) = DateTime::parse_from_rfc3339(s) {
        return Some(d.with_timezone(&Utc));
    }
    for layout in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, layout) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    for layout in ["%Y-%m-%d", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(s, layout) {
            return date
                .and_hms_opt(0, 0, 0)
                .map(|naive| Utc.from_utc_datetime(&naive));
        }
    }
    None
}
