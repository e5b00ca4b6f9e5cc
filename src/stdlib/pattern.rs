//! Regular expression functions

use regex::Regex;

use crate::error::{Result, ScriptError};
use crate::signature::{Parameter, Signature};
use crate::stdlib::{analyze_by_signature, Builtin};
use crate::types::StaticType;
use crate::value::{Value, ValueKind};

/// Initialize the regular expression functions
pub fn init() -> Vec<Builtin> {
    vec![
        // RegExMatch(input, regex, var1, ..., varN) -> number
        Builtin::new(
            "RegExMatch",
            Signature::new(
                ValueKind::Number,
                vec![
                    Parameter::required("input", ValueKind::String),
                    Parameter::required("regex", ValueKind::String),
                    Parameter::optional("var", ValueKind::String),
                ],
            )
            .variadic(),
            |args, scope| {
                let input = args.string(0);
                let re = compile(args.function(), &format!("^(?:{})$", args.string(1)))?;
                let Some(captures) = re.captures(&input) else {
                    return Ok(Value::Number(-1.0));
                };
                // Group 0 is the whole match; variables bind from group 1
                for (position, name) in args.values()[2..].iter().enumerate() {
                    let text = captures
                        .get(position + 1)
                        .map_or(String::new(), |m| m.as_str().to_string());
                    scope.set(&variable_name(&name.to_string()), Value::String(text));
                }
                Ok(Value::Number((re.captures_len() - 1) as f64))
            },
        )
        .analyze_with(|func, args, env| {
            let info = analyze_by_signature(func, args, env);
            for arg in args.iter().skip(2) {
                if let Some(name) = arg.string_literal() {
                    env.define(&variable_name(name), StaticType::String);
                }
            }
            info
        }),
        // RegExReplace(input, regex, replacement) -> string
        Builtin::new(
            "RegExReplace",
            Signature::new(
                ValueKind::String,
                vec![
                    Parameter::required("input", ValueKind::String),
                    Parameter::required("regex", ValueKind::String),
                    Parameter::required("replacement", ValueKind::String),
                ],
            ),
            |args, _| {
                let re = compile(args.function(), &args.string(1))?;
                let replacement = backreferences(&args.string(2));
                Ok(Value::String(
                    re.replace_all(&args.string(0), replacement.as_str()).into_owned(),
                ))
            },
        ),
    ]
}

fn compile(function: &str, pattern: &str) -> Result<Regex> {
    Regex::new(pattern)
        .map_err(|e| ScriptError::invalid_argument(function, format!("invalid regular expression: {}", e)))
}

/// Variable names are given as strings; `$name` targets a global, anything
/// else a local
fn variable_name(name: &str) -> String {
    name.trim().to_string()
}

/// Scripts write `\1` for group references; the regex crate expects `${1}`
fn backreferences(replacement: &str) -> String {
    let mut out = String::with_capacity(replacement.len());
    let mut chars = replacement.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek().map_or(false, |d| d.is_ascii_digit()) => {
                out.push_str("${");
                while let Some(d) = chars.peek().copied().filter(char::is_ascii_digit) {
                    out.push(d);
                    chars.next();
                }
                out.push('}');
            }
            '$' => out.push_str("$$"),
            other => out.push(other),
        }
    }
    out
}
