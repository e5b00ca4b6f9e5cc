//! Conversion functions: Bool, Int, Long, Float, Double, String, Date

use crate::error::{Result, ScriptError};
use crate::signature::{any, Parameter, Signature};
use crate::stdlib::{choose_array_first, infer_array_first, Args, Builtin, CallFn};
use crate::typechecker::typed_ast::TypedExpr;
use crate::types::{StaticType, TypeInfo};
use crate::value::{Value, ValueKind};

/// Initialize the conversion functions
pub fn init() -> Vec<Builtin> {
    vec![
        // Bool(arg) -> bool
        Builtin::new(
            "Bool",
            Signature::new(ValueKind::Bool, vec![Parameter::required("arg", any())]),
            |args, _| args.bool(0).map(Value::Bool),
        )
        .analyze_with(|func, args, _| convertible(func, args, ValueKind::Bool, ValueKind::is_bool_convertible)),
        // Int(arg) -> number, Int(array) -> array
        numeric("Int", |args, _| convert_numeric(args, f64::trunc)),
        // Long(arg) -> number, Long(array) -> array
        numeric("Long", |args, _| convert_numeric(args, f64::trunc)),
        // Float(arg) -> number, Float(array) -> array
        numeric("Float", |args, _| convert_numeric(args, |n| n)),
        // Double(arg) -> number, Double(array) -> array
        numeric("Double", |args, _| convert_numeric(args, |n| n)),
        // String(arg) -> string
        Builtin::new(
            "String",
            Signature::new(ValueKind::String, vec![Parameter::required("arg", any())]),
            |args, _| Ok(Value::String(args.string(0))),
        ),
        // Date(arg) -> date
        Builtin::new(
            "Date",
            Signature::new(ValueKind::Date, vec![Parameter::required("arg", any())]),
            |args, _| args.date(0).map(Value::Date),
        )
        .analyze_with(|func, args, _| {
            convertible(func, args, ValueKind::Date, |kind| {
                matches!(kind, ValueKind::Date | ValueKind::Number | ValueKind::String)
            })
        }),
    ]
}

fn numeric(name: &'static str, call: CallFn) -> Builtin {
    Builtin::overloaded(
        name,
        vec![
            Signature::new(ValueKind::Number, vec![Parameter::required("arg", any())]),
            Signature::new(ValueKind::Array, vec![Parameter::required("arg", ValueKind::Array)]),
        ],
        call,
    )
    .with_selectors(choose_array_first, infer_array_first)
    .analyze_with(|func, args, _| convertible(func, args, ValueKind::Number, ValueKind::is_number_convertible))
}

fn convert_numeric(args: &mut Args, round: fn(f64) -> f64) -> Result<Value> {
    if args.signature() == 1 {
        let function = args.function();
        let items = args.array(0)?;
        return elementwise(function, items, round).map(Value::Array);
    }
    args.number(0).map(|n| Value::Number(round(n)))
}

/// Nested arrays convert element by element
fn elementwise(function: &str, items: &[Value], round: fn(f64) -> f64) -> Result<Vec<Value>> {
    items
        .iter()
        .enumerate()
        .map(|(position, item)| match item {
            Value::Array(inner) => elementwise(function, inner, round).map(Value::Array),
            other => other
                .to_number()
                .map(|n| Value::Number(round(n)))
                .map_err(|fault| ScriptError::Conversion {
                    context: format!("{} element", function),
                    position: position + 1,
                    from: fault.from,
                    to: fault.to,
                }),
        })
        .collect()
}

/// Static check of a one-argument conversion
fn convertible(
    func: &Builtin,
    args: &mut [TypedExpr],
    to: ValueKind,
    accepts: fn(ValueKind) -> bool,
) -> TypeInfo {
    let overloaded = func.descriptor.signatures.len() > 1;
    let Some(arg) = args.first_mut() else {
        return TypeInfo::unknown();
    };
    if arg.fault_unassigned() || arg.ty() == StaticType::Error {
        return TypeInfo::unknown();
    }
    match arg.ty().kind() {
        None => TypeInfo::kind(to),
        Some(ValueKind::Array) if overloaded => TypeInfo::of(StaticType::Array),
        Some(kind) if accepts(kind) => TypeInfo::kind(to),
        Some(kind) => {
            arg.add_error(format!("{}: cannot convert {} to {}", func.name(), kind, to));
            TypeInfo::unknown()
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::scope::Scope;
    use crate::stdlib::catalog;
    use crate::value::Value;
    use crate::error::ScriptError;
    use chrono::{TimeZone, Utc};

    fn call(name: &str, args: Vec<Value>) -> Result<Value, ScriptError> {
        catalog().get(name).unwrap().invoke(args, &mut Scope::new())
    }

    #[test]
    fn test_bool_conversion() {
        assert_eq!(call("Bool", vec![Value::from("T")]), Ok(Value::Bool(true)));
        assert_eq!(call("Bool", vec![Value::Number(0.0)]), Ok(Value::Bool(false)));
        let date = Value::Date(Utc.timestamp_opt(0, 0).unwrap());
        assert!(matches!(
            call("Bool", vec![date]),
            Err(ScriptError::Conversion { position: 1, .. })
        ));
        assert!(call("Bool", vec![Value::Dictionary(Default::default())]).is_err());
    }

    #[test]
    fn test_int_truncates() {
        assert_eq!(call("Int", vec![Value::from("12.7abc")]), Ok(Value::Number(12.0)));
        assert_eq!(call("Int", vec![Value::Number(-3.9)]), Ok(Value::Number(-3.0)));
        assert_eq!(call("Double", vec![Value::from("2.5")]), Ok(Value::Number(2.5)));
    }

    #[test]
    fn test_int_on_arrays_is_elementwise() {
        let input = Value::Array(vec![
            Value::from("1.5"),
            Value::Array(vec![Value::Bool(true)]),
        ]);
        assert_eq!(
            call("Int", vec![input]),
            Ok(Value::Array(vec![
                Value::Number(1.0),
                Value::Array(vec![Value::Number(1.0)])
            ]))
        );
        assert!(call("Int", vec![Value::Array(vec![Value::Binary(vec![1])])]).is_err());
    }

    #[test]
    fn test_string_and_date() {
        assert_eq!(call("String", vec![Value::Bool(true)]), Ok(Value::from("1")));
        assert_eq!(
            call("Date", vec![Value::from("2024-03-05")]),
            Ok(Value::Date(Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap()))
        );
        assert!(call("Date", vec![Value::from("someday")]).is_err());
    }
}
