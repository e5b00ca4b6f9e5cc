//! Math functions

use crate::error::ScriptError;
use crate::signature::{Parameter, Signature};
use crate::stdlib::{Builtin, CallFn};
use crate::value::{Value, ValueKind};

fn unary(name: &'static str, call: CallFn) -> Builtin {
    Builtin::new(
        name,
        Signature::new(ValueKind::Number, vec![Parameter::required("f", ValueKind::Number)]),
        call,
    )
}

fn binary(name: &'static str, a: &'static str, b: &'static str, call: CallFn) -> Builtin {
    Builtin::new(
        name,
        Signature::new(
            ValueKind::Number,
            vec![
                Parameter::required(a, ValueKind::Number),
                Parameter::required(b, ValueKind::Number),
            ],
        ),
        call,
    )
}

/// Initialize the math functions
pub fn init() -> Vec<Builtin> {
    vec![
        // Round(f[, num]) -> number
        Builtin::new(
            "Round",
            Signature::new(
                ValueKind::Number,
                vec![
                    Parameter::required("f", ValueKind::Number),
                    Parameter::defaulted("num", ValueKind::Number, Value::Number(0.0)),
                ],
            ),
            |args, _| {
                let digits = args.integer(1)?;
                Ok(Value::Number(round_to(args.number(0)?, digits)))
            },
        ),
        unary("Ceiling", |args, _| Ok(Value::Number(args.number(0)?.ceil()))),
        unary("Floor", |args, _| Ok(Value::Number(args.number(0)?.floor()))),
        // Mod(x, y) -> number, sign follows x
        binary("Mod", "x", "y", |args, _| {
            let (x, y) = (args.number(0)?, args.number(1)?);
            if y == 0.0 {
                return Err(ScriptError::DivisionByZero);
            }
            Ok(Value::Number(x % y))
        }),
        // Pow(base, exp) -> number
        binary("Pow", "base", "exp", |args, _| {
            Ok(Value::Number(args.number(0)?.powf(args.number(1)?)))
        }),
    ]
}

/// Rounds half away from zero at `digits` decimals; negative digits round
/// to tens, hundreds, ...
fn round_to(n: f64, digits: i64) -> f64 {
    let digits = digits.clamp(-15, 15) as i32;
    let factor = 10f64.powi(digits);
    (n * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::Scope;
    use crate::stdlib::catalog;

    fn call(name: &str, args: Vec<f64>) -> Result<Value, ScriptError> {
        let args = args.into_iter().map(Value::Number).collect();
        catalog().get(name).unwrap().invoke(args, &mut Scope::new())
    }

    #[test]
    fn test_round() {
        assert_eq!(call("Round", vec![2.5]), Ok(Value::Number(3.0)));
        assert_eq!(call("Round", vec![-2.5]), Ok(Value::Number(-3.0)));
        assert_eq!(call("Round", vec![3.14159, 2.0]), Ok(Value::Number(3.14)));
        assert_eq!(call("Round", vec![1234.0, -2.0]), Ok(Value::Number(1200.0)));
    }

    #[test]
    fn test_ceiling_floor() {
        assert_eq!(call("Ceiling", vec![1.2]), Ok(Value::Number(2.0)));
        assert_eq!(call("Floor", vec![-1.2]), Ok(Value::Number(-2.0)));
    }

    #[test]
    fn test_mod_and_pow() {
        assert_eq!(call("Mod", vec![-7.0, 3.0]), Ok(Value::Number(-1.0)));
        assert_eq!(call("Mod", vec![1.0, 0.0]), Err(ScriptError::DivisionByZero));
        assert_eq!(call("Pow", vec![2.0, 10.0]), Ok(Value::Number(1024.0)));
    }

    #[test]
    fn test_string_arguments_convert() {
        let result = catalog()
            .get("Floor")
            .unwrap()
            .invoke(vec![Value::from("2.7")], &mut Scope::new());
        assert_eq!(result, Ok(Value::Number(2.0)));
    }
}
