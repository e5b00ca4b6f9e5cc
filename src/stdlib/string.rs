//! String functions
//!
//! Positions and lengths count characters, not bytes.

use crate::error::{Result, ScriptError};
use crate::signature::{Parameter, Signature};
use crate::stdlib::{choose_array_first, infer_array_first, Args, Builtin, CallFn};
use crate::value::{Value, ValueKind};

/// Initialize the string functions
pub fn init() -> Vec<Builtin> {
    vec![
        // Length(str) -> number, Length(array) -> number
        Builtin::overloaded(
            "Length",
            vec![
                Signature::new(ValueKind::Number, vec![Parameter::required("str", ValueKind::String)]),
                Signature::new(ValueKind::Number, vec![Parameter::required("arr", ValueKind::Array)]),
            ],
            |args, _| match args.signature() {
                1 => Ok(Value::Number(args.array(0)?.len() as f64)),
                _ => Ok(Value::Number(args.string(0).chars().count() as f64)),
            },
        )
        .with_selectors(choose_array_first, infer_array_first),
        per_element("ToUpper", |args, _| map_strings(args, |s| s.to_uppercase())),
        per_element("ToLower", |args, _| map_strings(args, |s| s.to_lowercase())),
        per_element("Trim", |args, _| map_strings(args, |s| s.trim().to_string())),
        // Left(str, n) -> string
        Builtin::new(
            "Left",
            Signature::new(
                ValueKind::String,
                vec![
                    Parameter::required("str", ValueKind::String),
                    Parameter::required("n", ValueKind::Number),
                ],
            ),
            |args, _| {
                let n = count(args, 1)?;
                Ok(Value::String(args.string(0).chars().take(n).collect()))
            },
        ),
        // Right(str, n) -> string
        Builtin::new(
            "Right",
            Signature::new(
                ValueKind::String,
                vec![
                    Parameter::required("str", ValueKind::String),
                    Parameter::required("n", ValueKind::Number),
                ],
            ),
            |args, _| {
                let n = count(args, 1)?;
                let chars: Vec<char> = args.string(0).chars().collect();
                let start = chars.len().saturating_sub(n);
                Ok(Value::String(chars[start..].iter().collect()))
            },
        ),
        // Mid(str, m, n) -> string
        Builtin::new(
            "Mid",
            Signature::new(
                ValueKind::String,
                vec![
                    Parameter::required("str", ValueKind::String),
                    Parameter::required("m", ValueKind::Number),
                    Parameter::required("n", ValueKind::Number),
                ],
            ),
            |args, _| {
                let start = count(args, 1)?;
                let n = count(args, 2)?;
                Ok(Value::String(args.string(0).chars().skip(start).take(n).collect()))
            },
        ),
        // Replace(str, old, new) -> string
        Builtin::new(
            "Replace",
            Signature::new(
                ValueKind::String,
                vec![
                    Parameter::required("str", ValueKind::String),
                    Parameter::required("old", ValueKind::String),
                    Parameter::required("new", ValueKind::String),
                ],
            ),
            |args, _| {
                let s = args.string(0);
                let old = args.string(1);
                if old.is_empty() {
                    return Ok(Value::String(s));
                }
                Ok(Value::String(s.replace(&old, &args.string(2))))
            },
        ),
        // CountSubString(str, subStr) -> number
        Builtin::new(
            "CountSubString",
            Signature::new(
                ValueKind::Number,
                vec![
                    Parameter::required("str", ValueKind::String),
                    Parameter::required("subStr", ValueKind::String),
                ],
            ),
            |args, _| Ok(Value::Number(count_substring(&args.string(0), &args.string(1)) as f64)),
        ),
        // Split(str, delimiter) -> array
        Builtin::new(
            "Split",
            Signature::new(
                ValueKind::Array,
                vec![
                    Parameter::required("str", ValueKind::String),
                    Parameter::required("delimiter", ValueKind::String),
                ],
            ),
            |args, _| {
                let s = args.string(0);
                let delimiter = args.string(1);
                let parts: Vec<Value> = if delimiter.is_empty() {
                    s.chars().map(|c| Value::String(c.to_string())).collect()
                } else {
                    s.split(delimiter.as_str()).map(Value::from).collect()
                };
                Ok(Value::Array(parts))
            },
        ),
        // Index(str, subStr[, n]) -> number
        Builtin::new(
            "Index",
            Signature::new(
                ValueKind::Number,
                vec![
                    Parameter::required("str", ValueKind::String),
                    Parameter::required("subStr", ValueKind::String),
                    Parameter::defaulted("n", ValueKind::Number, Value::Number(1.0)),
                ],
            ),
            |args, _| {
                let n = args.integer(2)?;
                let found = find_occurrence(&args.string(0), &args.string(1), n);
                Ok(Value::Number(found.map_or(-1.0, |i| i as f64)))
            },
        ),
    ]
}

/// String function with an element-wise array overload
fn per_element(name: &'static str, call: CallFn) -> Builtin {
    Builtin::overloaded(
        name,
        vec![
            Signature::new(ValueKind::String, vec![Parameter::required("str", ValueKind::String)]),
            Signature::new(ValueKind::Array, vec![Parameter::required("arr", ValueKind::Array)]),
        ],
        call,
    )
    .with_selectors(choose_array_first, infer_array_first)
}

fn map_strings(args: &mut Args, f: fn(&str) -> String) -> Result<Value> {
    if args.signature() == 1 {
        let items = args.array(0)?;
        return Ok(Value::Array(
            items.iter().map(|item| Value::String(f(&item.to_string()))).collect(),
        ));
    }
    Ok(Value::String(f(&args.string(0))))
}

/// Character count argument; negative counts are rejected
fn count(args: &Args, index: usize) -> Result<usize> {
    let n = args.integer(index)?;
    usize::try_from(n).map_err(|_| {
        ScriptError::invalid_argument(args.function(), format!("argument {} must not be negative", index + 1))
    })
}

/// Occurrences that do not overlap: "aaa" holds "aa" once
pub fn count_substring(s: &str, sub: &str) -> usize {
    if sub.is_empty() {
        return 0;
    }
    s.matches(sub).count()
}

/// Character index of the n-th occurrence of `sub`. Negative `n` counts
/// from the end; 0 never matches.
fn find_occurrence(s: &str, sub: &str, n: i64) -> Option<usize> {
    if n == 0 {
        return None;
    }
    let starts: Vec<usize> = s.match_indices(sub).map(|(byte, _)| byte).collect();
    let byte = if n > 0 {
        starts.get(n as usize - 1)
    } else {
        starts.len().checked_sub(n.unsigned_abs() as usize).and_then(|i| starts.get(i))
    }?;
    Some(s[..*byte].chars().count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::Scope;
    use crate::stdlib::catalog;

    fn call(name: &str, args: Vec<Value>) -> Result<Value> {
        catalog().get(name).unwrap().invoke(args, &mut Scope::new())
    }

    fn s(v: &str) -> Value {
        Value::from(v)
    }

    #[test]
    fn test_length_overloads() {
        assert_eq!(call("Length", vec![s("héllo")]), Ok(Value::Number(5.0)));
        assert_eq!(call("Length", vec![Value::Number(1234.0)]), Ok(Value::Number(4.0)));
        assert_eq!(
            call("Length", vec![Value::Array(vec![s("a"), s("b")])]),
            Ok(Value::Number(2.0))
        );
    }

    #[test]
    fn test_case_and_trim_on_arrays() {
        assert_eq!(call("ToUpper", vec![s("abc")]), Ok(s("ABC")));
        assert_eq!(
            call("Trim", vec![Value::Array(vec![s(" a "), Value::Number(1.0)])]),
            Ok(Value::Array(vec![s("a"), s("1")]))
        );
    }

    #[test]
    fn test_substrings() {
        assert_eq!(call("Left", vec![s("abcdef"), Value::Number(2.0)]), Ok(s("ab")));
        assert_eq!(call("Right", vec![s("abcdef"), Value::Number(2.0)]), Ok(s("ef")));
        assert_eq!(call("Right", vec![s("ab"), Value::Number(5.0)]), Ok(s("ab")));
        assert_eq!(
            call("Mid", vec![s("abcdef"), Value::Number(1.0), Value::Number(3.0)]),
            Ok(s("bcd"))
        );
        assert!(call("Left", vec![s("abc"), Value::Number(-1.0)]).is_err());
    }

    #[test]
    fn test_count_substring_does_not_overlap() {
        assert_eq!(count_substring("aaa", "aa"), 1);
        assert_eq!(count_substring("abcabc", "bc"), 2);
        assert_eq!(count_substring("abc", ""), 0);
    }

    #[test]
    fn test_split_and_replace() {
        assert_eq!(
            call("Split", vec![s("a,b,,c"), s(",")]),
            Ok(Value::Array(vec![s("a"), s("b"), s(""), s("c")]))
        );
        assert_eq!(call("Replace", vec![s("a-b-c"), s("-"), s("+")]), Ok(s("a+b+c")));
        assert_eq!(call("Replace", vec![s("abc"), s(""), s("+")]), Ok(s("abc")));
    }

    #[test]
    fn test_index_occurrences() {
        assert_eq!(call("Index", vec![s("a.b.c"), s(".")]), Ok(Value::Number(1.0)));
        assert_eq!(
            call("Index", vec![s("a.b.c"), s("."), Value::Number(2.0)]),
            Ok(Value::Number(3.0))
        );
        assert_eq!(
            call("Index", vec![s("a.b.c"), s("."), Value::Number(-1.0)]),
            Ok(Value::Number(3.0))
        );
        assert_eq!(call("Index", vec![s("abc"), s("x")]), Ok(Value::Number(-1.0)));
    }
}
