//! Global variable access by name and the operation log

use crate::signature::{any, Parameter, Signature};
use crate::stdlib::{analyze_by_signature, Builtin};
use crate::sysvars;
use crate::typechecker::typed_ast::TypedExpr;
use crate::types::{StaticType, TypeEnv, TypeInfo};
use crate::value::{Value, ValueKind};

/// Initialize the general functions
pub fn init() -> Vec<Builtin> {
    vec![
        // Get(name) -> type
        Builtin::new(
            "Get",
            Signature::new(any(), vec![Parameter::required("name", ValueKind::String)]),
            |args, scope| Ok(scope.get(&global_name(&args.string(0)))),
        )
        .analyze_with(analyze_get),
        // Set(name, value) -> type
        Builtin::new(
            "Set",
            Signature::new(
                any(),
                vec![Parameter::required("name", ValueKind::String), Parameter::required("value", any())],
            ),
            |args, scope| {
                let name = global_name(&args.string(0));
                let value = args.take(1);
                scope.set(&name, value.clone());
                Ok(value)
            },
        )
        .analyze_with(analyze_set),
        // WriteToOperationLog(message) -> string
        Builtin::new(
            "WriteToOperationLog",
            Signature::new(ValueKind::String, vec![Parameter::required("message", ValueKind::String)]),
            |args, scope| {
                let message = args.string(0);
                let operation = scope.get("$jitterbit.operation.name").to_string();
                tracing::info!(target: "operation_log", operation = %operation, "{}", message);
                Ok(Value::String(message))
            },
        ),
    ]
}

/// `name` and `$name` address the same global
pub fn global_name(name: &str) -> String {
    let name = name.trim();
    if name.starts_with('$') {
        name.to_string()
    } else {
        format!("${}", name)
    }
}

fn analyze_get(func: &Builtin, args: &mut [TypedExpr], env: &mut TypeEnv) -> TypeInfo {
    let info = analyze_by_signature(func, args, env);
    let Some(name) = args.first().and_then(TypedExpr::string_literal) else {
        return info;
    };
    let name = global_name(name);
    if let Some(known) = env.lookup(&name) {
        return TypeInfo::of(known.ty);
    }
    match sysvars::lookup(&name) {
        Some(var) => TypeInfo::of(var.data_type.static_type()),
        None => info,
    }
}

fn analyze_set(func: &Builtin, args: &mut [TypedExpr], env: &mut TypeEnv) -> TypeInfo {
    let info = analyze_by_signature(func, args, env);
    let [name, value] = args else {
        return info;
    };
    let faulted = [&*name, &*value]
        .iter()
        .any(|arg| arg.ty().is_fault() || arg.info.error.is_some());
    let ty = if faulted { StaticType::Unknown } else { value.ty() };
    if let Some(name) = name.string_literal() {
        env.define(&global_name(name), ty);
    }
    if faulted {
        info
    } else {
        TypeInfo::of(ty)
    }
}
