//! Null handling and conditional functions

use crate::error::ScriptError;
use crate::signature::{any, Parameter, Signature};
use crate::stdlib::{analyze_by_signature, Builtin};
use crate::typechecker::typed_ast::TypedExpr;
use crate::types::{StaticType, TypeEnv, TypeInfo};
use crate::value::{Value, ValueKind};

/// Initialize the logical functions
pub fn init() -> Vec<Builtin> {
    vec![
        // Null() -> null
        Builtin::new("Null", Signature::new(ValueKind::Null, vec![]), |_, _| Ok(Value::Null)),
        // IsNull(arg) -> bool
        Builtin::new(
            "IsNull",
            Signature::new(ValueKind::Bool, vec![Parameter::required("arg", any())]),
            |args, _| Ok(Value::Bool(args.value(0).is_nullish())),
        ),
        // IfNull(arg, default) -> type
        Builtin::new(
            "IfNull",
            Signature::new(
                any(),
                vec![Parameter::required("arg", any()), Parameter::required("default", any())],
            ),
            |args, _| {
                if args.value(0).is_nullish() {
                    Ok(args.take(1))
                } else {
                    Ok(args.take(0))
                }
            },
        )
        .analyze_with(analyze_fallback),
        // IfEmpty(arg, default) -> type
        Builtin::new(
            "IfEmpty",
            Signature::new(
                any(),
                vec![Parameter::required("arg", any()), Parameter::required("default", any())],
            ),
            |args, _| {
                if is_empty(args.value(0)) {
                    Ok(args.take(1))
                } else {
                    Ok(args.take(0))
                }
            },
        )
        .analyze_with(analyze_fallback),
        // IsValid(expression) -> bool
        Builtin::new(
            "IsValid",
            Signature::new(ValueKind::Bool, vec![Parameter::required("expression", any())]),
            // Eagerly passed arguments were already evaluated without a fault
            |_, _| Ok(Value::Bool(true)),
        )
        .evaluated_lazily(|args, eval| Ok(Value::Bool(eval(&args[0]).is_ok()))),
        // If(condition, trueResult[, falseResult]) -> type
        Builtin::new(
            "If",
            Signature::new(
                any(),
                vec![
                    Parameter::required("condition", ValueKind::Bool),
                    Parameter::required("trueResult", any()),
                    Parameter::optional("falseResult", any()),
                ],
            ),
            |args, _| {
                if args.bool(0)? {
                    Ok(args.take(1))
                } else {
                    Ok(args.take(2))
                }
            },
        )
        .evaluated_lazily(|args, eval| {
            let condition = eval(&args[0])?;
            let truth = condition.to_bool().map_err(|fault| ScriptError::Conversion {
                context: "If".to_string(),
                position: 1,
                from: fault.from,
                to: fault.to,
            })?;
            match (truth, args.get(2)) {
                (true, _) => eval(&args[1]),
                (false, Some(otherwise)) => eval(otherwise),
                (false, None) => Ok(Value::Null),
            }
        })
        .analyze_with(analyze_if),
    ]
}

/// Null, void and the empty string are empty
fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null | Value::Void => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Both branches agree, or the result is unknown
fn common_type(a: StaticType, b: StaticType) -> StaticType {
    if a == b {
        a
    } else {
        StaticType::Unknown
    }
}

fn analyze_fallback(func: &Builtin, args: &mut [TypedExpr], env: &mut TypeEnv) -> TypeInfo {
    let info = analyze_by_signature(func, args, env);
    if args.iter().any(|arg| arg.ty().is_fault()) {
        return info;
    }
    match args {
        [arg, default] => match arg.ty() {
            StaticType::Null | StaticType::Void => TypeInfo::of(default.ty()),
            ty => TypeInfo::of(common_type(ty, default.ty())),
        },
        _ => info,
    }
}

fn analyze_if(func: &Builtin, args: &mut [TypedExpr], env: &mut TypeEnv) -> TypeInfo {
    let info = analyze_by_signature(func, args, env);
    if args.iter().any(|arg| arg.ty().is_fault()) {
        return info;
    }
    match args {
        [_, then] => TypeInfo::of(common_type(then.ty(), StaticType::Null)),
        [_, then, otherwise] => TypeInfo::of(common_type(then.ty(), otherwise.ty())),
        _ => info,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BinaryOp, Expr};
    use crate::scope::Scope;
    use crate::stdlib::catalog;
    use crate::interpreter::Interpreter;
    use crate::typechecker::check_program;

    fn run(script: Expr) -> Result<Value, ScriptError> {
        Interpreter::new().eval(&script)
    }

    #[test]
    fn test_null_checks() {
        assert_eq!(run(Expr::call("IsNull", vec![Expr::call("Null", vec![])])), Ok(Value::Bool(true)));
        assert_eq!(run(Expr::call("IsNull", vec![Expr::string("")])), Ok(Value::Bool(false)));
        assert_eq!(
            run(Expr::call("IfNull", vec![Expr::ident("unset"), Expr::number(5.0)])),
            Ok(Value::Number(5.0))
        );
        assert_eq!(
            run(Expr::call("IfEmpty", vec![Expr::string(""), Expr::string("d")])),
            Ok(Value::from("d"))
        );
        assert_eq!(
            run(Expr::call("IfEmpty", vec![Expr::number(0.0), Expr::string("d")])),
            Ok(Value::Number(0.0))
        );
    }

    #[test]
    fn test_is_valid_swallows_faults() {
        let faulting = Expr::binary(BinaryOp::Div, Expr::number(1.0), Expr::number(0.0));
        assert_eq!(run(Expr::call("IsValid", vec![faulting])), Ok(Value::Bool(false)));
        assert_eq!(run(Expr::call("IsValid", vec![Expr::number(1.0)])), Ok(Value::Bool(true)));
        assert!(matches!(
            run(Expr::call("IsValid", vec![])),
            Err(ScriptError::ArityMismatch { .. })
        ));
    }

    #[test]
    fn test_if_evaluates_one_branch() {
        let faulting = Expr::binary(BinaryOp::Div, Expr::number(1.0), Expr::number(0.0));
        let script = Expr::call(
            "If",
            vec![Expr::bool(true), Expr::string("yes"), faulting],
        );
        assert_eq!(run(script), Ok(Value::from("yes")));
        assert_eq!(
            run(Expr::call("If", vec![Expr::number(0.0), Expr::string("yes")])),
            Ok(Value::Null)
        );
    }

    #[test]
    fn test_eager_calls_on_evaluated_arguments() {
        let mut scope = Scope::new();
        let invoke = |name: &str, args: Vec<Value>, scope: &mut Scope| {
            catalog().get(name).expect("builtin exists").invoke(args, scope)
        };
        assert_eq!(invoke("IsValid", vec![Value::Null], &mut scope), Ok(Value::Bool(true)));
        assert_eq!(
            invoke("If", vec![Value::Bool(false), Value::from("a"), Value::from("b")], &mut scope),
            Ok(Value::from("b"))
        );
        assert_eq!(
            invoke("If", vec![Value::Bool(false), Value::from("a")], &mut scope),
            Ok(Value::Null)
        );
    }

    #[test]
    fn test_static_types_of_conditionals() {
        let same = check_program(&Expr::call(
            "If",
            vec![Expr::bool(true), Expr::number(1.0), Expr::number(2.0)],
        ))
        .unwrap();
        assert_eq!(same.typed.ty(), StaticType::Number);

        let mixed = check_program(&Expr::call(
            "IfNull",
            vec![Expr::call("Null", vec![]), Expr::string("x")],
        ))
        .unwrap();
        assert_eq!(mixed.typed.ty(), StaticType::String);
    }
}
