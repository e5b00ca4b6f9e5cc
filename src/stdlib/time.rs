//! Date functions
//!
//! Dates are instants in UTC. `FormatDate` takes the legacy format tokens
//! (`yyyy-mm-dd HH:MM:SS`) and maps them onto chrono's strftime items.

use chrono::{DateTime, Duration, FixedOffset, Months, NaiveDateTime, TimeZone, Utc};

use crate::error::{Result, ScriptError};
use crate::signature::{Parameter, Signature};
use crate::stdlib::Builtin;
use crate::value::{Value, ValueKind};

/// Initialize the date functions
pub fn init() -> Vec<Builtin> {
    vec![
        // Now() -> date
        Builtin::new("Now", Signature::new(ValueKind::Date, vec![]), |_, _| {
            Ok(Value::Date(Utc::now()))
        }),
        // DateAdd(datePart, number, date) -> date
        Builtin::new(
            "DateAdd",
            Signature::new(
                ValueKind::Date,
                vec![
                    Parameter::required("datePart", ValueKind::String),
                    Parameter::required("number", ValueKind::Number),
                    Parameter::required("date", ValueKind::Date),
                ],
            ),
            |args, _| {
                let part = args.string(0);
                let amount = args.integer(1)?;
                let date = args.date(2)?;
                date_add(&part, amount, date).map(Value::Date)
            },
        ),
        // FormatDate(date, format) -> string
        Builtin::new(
            "FormatDate",
            Signature::new(
                ValueKind::String,
                vec![
                    Parameter::required("date", ValueKind::Date),
                    Parameter::required("format", ValueKind::String),
                ],
            ),
            |args, _| {
                let date = args.date(0)?;
                let pattern = strftime_pattern(&args.string(1));
                Ok(Value::String(date.format(&pattern).to_string()))
            },
        ),
        // GetUTCFormattedDateTime(date, timeZoneId[, isEuropeanFormat]) -> string
        Builtin::new(
            "GetUTCFormattedDateTime",
            Signature::new(
                ValueKind::String,
                vec![
                    Parameter::required("date", ValueKind::Date),
                    Parameter::required("timeZoneId", ValueKind::String),
                    Parameter::defaulted("isEuropeanFormat", ValueKind::Bool, Value::Bool(false)),
                ],
            ),
            |args, _| {
                let offset = parse_offset(args.function(), &args.string(1))?;
                let local = match args.value(0) {
                    Value::String(s) => parse_local(s, offset)
                        .ok_or_else(|| ScriptError::invalid_argument(args.function(), format!("cannot parse date '{}'", s)))?,
                    _ => args.date(0)?,
                };
                let layout = if args.bool(2)? {
                    "%d/%m/%Y %H:%M:%S"
                } else {
                    "%Y-%m-%dT%H:%M:%S%.3fZ"
                };
                Ok(Value::String(local.format(layout).to_string()))
            },
        ),
    ]
}

fn date_add(part: &str, amount: i64, date: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let overflow = || ScriptError::invalid_argument("DateAdd", "resulting date is out of range");
    let months = |n: i64| -> Result<DateTime<Utc>> {
        let magnitude = u32::try_from(n.unsigned_abs()).map_err(|_| overflow())?;
        let shifted = if n >= 0 {
            date.checked_add_months(Months::new(magnitude))
        } else {
            date.checked_sub_months(Months::new(magnitude))
        };
        shifted.ok_or_else(overflow)
    };
    let duration = match part.to_ascii_lowercase().as_str() {
        "year" | "yy" | "yyyy" => return months(amount.saturating_mul(12)),
        "quarter" | "qq" | "q" => return months(amount.saturating_mul(3)),
        "month" | "mm" | "m" => return months(amount),
        "dayofyear" | "dy" | "y" | "day" | "dd" | "d" | "weekday" | "dw" | "w" => Duration::try_days(amount),
        "week" | "wk" | "ww" => Duration::try_weeks(amount),
        "hour" | "hh" => Duration::try_hours(amount),
        "minute" | "mi" | "n" => Duration::try_minutes(amount),
        "second" | "ss" | "s" => Duration::try_seconds(amount),
        "millisecond" | "ms" => Duration::try_milliseconds(amount),
        other => {
            return Err(ScriptError::invalid_argument(
                "DateAdd",
                format!("unknown date part '{}'", other),
            ))
        }
    };
    duration
        .and_then(|d| date.checked_add_signed(d))
        .ok_or_else(overflow)
}

/// Legacy tokens, longest first so `yyyy` wins over `yy`
const TOKENS: &[(&str, &str)] = &[
    ("yyyy", "%Y"),
    ("Month", "%B"),
    ("mon", "%b"),
    ("ddd", "%a"),
    ("yy", "%y"),
    ("mm", "%m"),
    ("dd", "%d"),
    ("HH", "%H"),
    ("hh", "%I"),
    ("MM", "%M"),
    ("SS", "%S"),
    ("AP", "%p"),
    ("z", "%3f"),
];

/// Translates a legacy date format into a strftime pattern. Characters that
/// are not part of a token are copied literally.
pub fn strftime_pattern(format: &str) -> String {
    let mut out = String::with_capacity(format.len() * 2);
    let mut rest = format;
    'outer: while let Some(c) = rest.chars().next() {
        for (token, item) in TOKENS {
            if let Some(after) = rest.strip_prefix(token) {
                out.push_str(item);
                rest = after;
                continue 'outer;
            }
        }
        if c == '%' {
            out.push_str("%%");
        } else {
            out.push(c);
        }
        rest = &rest[c.len_utf8()..];
    }
    out
}

/// `UTC`, `GMT`, `Z` or a `+HH:MM` / `-HHMM` offset
fn parse_offset(function: &str, zone: &str) -> Result<FixedOffset> {
    let zone = zone.trim();
    if ["UTC", "GMT", "Z"].iter().any(|z| zone.eq_ignore_ascii_case(z)) {
        return FixedOffset::east_opt(0).ok_or_else(|| ScriptError::Internal("zero offset".into()));
    }
    let invalid = || ScriptError::invalid_argument(function, format!("unsupported time zone '{}'", zone));
    let (sign, digits) = match zone.as_bytes().first() {
        Some(b'+') => (1, &zone[1..]),
        Some(b'-') => (-1, &zone[1..]),
        _ => return Err(invalid()),
    };
    let digits: String = digits.chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    let hours: i32 = digits[..2].parse().map_err(|_| invalid())?;
    let minutes: i32 = digits[2..].parse().map_err(|_| invalid())?;
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}

/// A wall-clock string read in the given zone, converted to UTC
fn parse_local(s: &str, offset: FixedOffset) -> Option<DateTime<Utc>> {
    if let Ok(d) = DateTime::parse_from_rfc3339(s.trim()) {
        return Some(d.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%m/%d/%Y %H:%M:%S"]
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(s.trim(), layout).ok())
        .and_then(|naive| offset.from_local_datetime(&naive).single())
        .map(|d| d.with_timezone(&Utc))
}
