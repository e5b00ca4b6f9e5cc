//! Built-in function catalog
//!
//! Each module contributes a list of `Builtin` records through its `init()`
//! function. A record carries the function's descriptor plus the hooks the
//! resolver, the evaluator and the analyzer call:
//!
//! - `choose`: runtime signature selection from argument values
//! - `infer`: static signature selection from argument types
//! - `call`: the runtime behavior
//! - `analyze`: static checking of a call's typed arguments

pub mod collections;
pub mod connectors;
pub mod conversion;
pub mod encoding;
pub mod general;
pub mod logical;
pub mod math;
pub mod pattern;
pub mod string;
pub mod time;

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};

use crate::ast::Expr;
use crate::error::{Result, ScriptError};
use crate::scope::Scope;
use crate::signature::{fill_defaults, FunctionDescriptor, Parameter, Signature};
use crate::typechecker::typed_ast::TypedExpr;
use crate::types::{ArgCheck, StaticType, TypeEnv, TypeInfo};
use crate::value::{CoercionFault, Value, ValueKind};

pub type ChooseFn = fn(&[Value]) -> usize;
pub type InferFn = fn(&[TypeInfo]) -> usize;
pub type CallFn = fn(&mut Args, &mut Scope) -> Result<Value>;
pub type AnalyzeFn = fn(&Builtin, &mut [TypedExpr], &mut TypeEnv) -> TypeInfo;

/// Evaluates the argument expressions of a call on demand
pub type Evaluator<'a> = dyn FnMut(&Expr) -> Result<Value> + 'a;
pub type LazyFn = fn(&[Expr], &mut Evaluator<'_>) -> Result<Value>;

/// A built-in function
#[derive(Clone)]
pub struct Builtin {
    pub descriptor: FunctionDescriptor,
    pub choose: ChooseFn,
    pub infer: InferFn,
    pub call: CallFn,
    pub analyze: AnalyzeFn,
    /// Replaces eager argument evaluation when set
    pub lazy: Option<LazyFn>,
    /// The function modifies its first argument; the evaluator stores it
    /// back when the argument is assignable
    pub updates_first: bool,
}

fn first_signature(_: &[Value]) -> usize {
    0
}

fn first_signature_static(_: &[TypeInfo]) -> usize {
    0
}

impl Builtin {
    /// Single-signature function with the default hooks
    pub fn new(name: &'static str, signature: Signature, call: CallFn) -> Self {
        Builtin::overloaded(name, vec![signature], call)
    }

    pub fn overloaded(name: &'static str, signatures: Vec<Signature>, call: CallFn) -> Self {
        Builtin {
            descriptor: FunctionDescriptor::new(name, signatures),
            choose: first_signature,
            infer: first_signature_static,
            call,
            analyze: analyze_by_signature,
            lazy: None,
            updates_first: false,
        }
    }

    pub fn with_selectors(mut self, choose: ChooseFn, infer: InferFn) -> Self {
        self.choose = choose;
        self.infer = infer;
        self
    }

    pub fn analyze_with(mut self, analyze: AnalyzeFn) -> Self {
        self.analyze = analyze;
        self
    }

    pub fn evaluated_lazily(mut self, lazy: LazyFn) -> Self {
        self.lazy = Some(lazy);
        self
    }

    pub fn updating_first(mut self) -> Self {
        self.updates_first = true;
        self
    }

    pub fn name(&self) -> &'static str {
        self.descriptor.name
    }

    /// Arity check, then the function's own selection
    pub fn resolve(&self, args: &[Value]) -> Result<usize> {
        self.descriptor.check_arity(args.len())?;
        let index = (self.choose)(args);
        if index >= self.descriptor.signatures.len() {
            return Err(ScriptError::Internal(format!(
                "{} selected signature {} of {}",
                self.name(),
                index,
                self.descriptor.signatures.len()
            )));
        }
        Ok(index)
    }

    /// Resolves, fills defaults and runs the function
    pub fn invoke(&self, args: Vec<Value>, scope: &mut Scope) -> Result<Value> {
        self.invoke_with_args(args, scope).map(|(result, _)| result)
    }

    /// Like `invoke`, also handing back the arguments as the function left
    /// them
    pub fn invoke_with_args(&self, args: Vec<Value>, scope: &mut Scope) -> Result<(Value, Args)> {
        let index = self.resolve(&args)?;
        tracing::trace!(function = self.name(), signature = index, "resolved call");
        let values = fill_defaults(self.name(), &self.descriptor.signatures[index], args)?;
        let mut args = Args {
            function: self.name(),
            signature: index,
            values,
        };
        let result = (self.call)(&mut args, scope)?;
        Ok((result, args))
    }

    /// Static counterpart of `invoke`. Arity faults are reported on the
    /// call node and leave the result unknown; arguments keep their own
    /// diagnostics either way.
    pub fn analyze_call(&self, args: &mut [TypedExpr], env: &mut TypeEnv) -> TypeInfo {
        if let Some(message) = self.descriptor.arity_message(args.len()) {
            for arg in args.iter_mut() {
                arg.fault_unassigned();
            }
            return TypeInfo::unknown().with_error(message);
        }
        (self.analyze)(self, args, env)
    }

    /// Signature picked by the static selector, if it is in range
    pub fn inferred_signature(&self, args: &[TypedExpr]) -> Option<&Signature> {
        let infos: Vec<TypeInfo> = args.iter().map(|arg| arg.info.clone()).collect();
        self.descriptor.signatures.get((self.infer)(&infos))
    }
}

impl std::fmt::Debug for Builtin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Builtin")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

// ── Static analysis hooks ─────────────────────────────────────────────

/// Checks one argument against its parameter. Returns true when the call
/// can no longer be typed.
pub fn check_argument(function: &str, position: usize, param: &Parameter, arg: &mut TypedExpr) -> bool {
    if arg.fault_unassigned() {
        return true;
    }
    let kind = match arg.ty() {
        StaticType::Error => return true,
        other => match other.kind() {
            Some(kind) => kind,
            None => return false,
        },
    };
    match param.declared_type.check(kind) {
        ArgCheck::Accepted => false,
        ArgCheck::Converted(message) => {
            arg.add_warning(format!("{}: {}", function, message));
            false
        }
        ArgCheck::Rejected(message) => {
            arg.add_error(format!(
                "{} argument {} ({}): {}",
                function,
                position + 1,
                param.name,
                message
            ));
            true
        }
    }
}

/// Default `analyze`: check every argument against the inferred signature
/// and return its declared return type
pub fn analyze_by_signature(func: &Builtin, args: &mut [TypedExpr], _env: &mut TypeEnv) -> TypeInfo {
    let Some(signature) = func.inferred_signature(args).cloned() else {
        return TypeInfo::unknown();
    };
    let mut faulted = false;
    for (position, arg) in args.iter_mut().enumerate() {
        if let Some(param) = signature.param(position) {
            faulted |= check_argument(func.name(), position, param, arg);
        }
    }
    if faulted {
        TypeInfo::unknown()
    } else {
        TypeInfo::of(signature.return_static_type())
    }
}

/// Unimplemented connectors: arguments are checked, the declared return
/// type is kept and the call is flagged
pub fn analyze_unimplemented(func: &Builtin, args: &mut [TypedExpr], env: &mut TypeEnv) -> TypeInfo {
    analyze_by_signature(func, args, env).with_warning(format!(
        "{} is not implemented in this runtime and will fail when executed",
        func.name()
    ))
}

/// Static selector for functions whose overloads differ by an array in
/// the first position
pub fn infer_array_first(args: &[TypeInfo]) -> usize {
    crate::signature::static_array_at(args, 0)
}

pub fn choose_array_first(args: &[Value]) -> usize {
    crate::signature::array_at(args, 0)
}

// ── Runtime arguments ─────────────────────────────────────────────────

static NULL: Value = Value::Null;

/// Resolved, defaulted arguments of one call
#[derive(Debug)]
pub struct Args {
    function: &'static str,
    signature: usize,
    values: Vec<Value>,
}

impl Args {
    pub fn new(function: &'static str, signature: usize, values: Vec<Value>) -> Self {
        Args {
            function,
            signature,
            values,
        }
    }

    pub fn function(&self) -> &'static str {
        self.function
    }

    /// Index of the resolved signature
    pub fn signature(&self) -> usize {
        self.signature
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn has(&self, index: usize) -> bool {
        index < self.values.len()
    }

    /// Argument `index`; omitted optional arguments read as null
    pub fn value(&self, index: usize) -> &Value {
        self.values.get(index).unwrap_or(&NULL)
    }

    /// Mutable access for functions that update an argument in place
    pub fn value_mut(&mut self, index: usize) -> Option<&mut Value> {
        self.values.get_mut(index)
    }

    pub fn take(&mut self, index: usize) -> Value {
        match self.values.get_mut(index) {
            Some(value) => std::mem::replace(value, Value::Null),
            None => Value::Null,
        }
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    fn fault(&self, index: usize, fault: CoercionFault) -> ScriptError {
        ScriptError::Conversion {
            context: self.function.to_string(),
            position: index + 1,
            from: fault.from,
            to: fault.to,
        }
    }

    fn wrong_kind(&self, index: usize, to: ValueKind) -> ScriptError {
        ScriptError::Conversion {
            context: self.function.to_string(),
            position: index + 1,
            from: self.value(index).kind(),
            to,
        }
    }

    pub fn number(&self, index: usize) -> Result<f64> {
        self.value(index).to_number().map_err(|f| self.fault(index, f))
    }

    /// Number truncated toward zero
    pub fn integer(&self, index: usize) -> Result<i64> {
        self.number(index).map(|n| n.trunc() as i64)
    }

    pub fn string(&self, index: usize) -> String {
        self.value(index).to_string()
    }

    pub fn bool(&self, index: usize) -> Result<bool> {
        self.value(index).to_bool().map_err(|f| self.fault(index, f))
    }

    pub fn date(&self, index: usize) -> Result<DateTime<Utc>> {
        self.value(index).to_date().map_err(|f| self.fault(index, f))
    }

    pub fn binary(&self, index: usize) -> Result<Vec<u8>> {
        self.value(index).to_binary().map_err(|f| self.fault(index, f))
    }

    pub fn array(&self, index: usize) -> Result<&Vec<Value>> {
        match self.value(index) {
            Value::Array(items) => Ok(items),
            _ => Err(self.wrong_kind(index, ValueKind::Array)),
        }
    }

    pub fn dictionary(&self, index: usize) -> Result<&BTreeMap<String, Value>> {
        match self.value(index) {
            Value::Dictionary(entries) => Ok(entries),
            _ => Err(self.wrong_kind(index, ValueKind::Dictionary)),
        }
    }
}

// ── Catalog ───────────────────────────────────────────────────────────

/// Name-indexed set of built-ins
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    functions: HashMap<&'static str, Builtin>,
}

impl Catalog {
    pub fn new() -> Self {
        Catalog {
            functions: HashMap::new(),
        }
    }

    /// Every module's functions
    pub fn standard() -> Self {
        let mut catalog = Catalog::new();
        for module in [
            conversion::init(),
            string::init(),
            pattern::init(),
            collections::init(),
            logical::init(),
            math::init(),
            time::init(),
            encoding::init(),
            general::init(),
            connectors::init(),
        ] {
            for builtin in module {
                catalog.register(builtin);
            }
        }
        catalog
    }

    pub fn register(&mut self, builtin: Builtin) {
        self.functions.insert(builtin.name(), builtin);
    }

    pub fn get(&self, name: &str) -> Option<&Builtin> {
        self.functions.get(name)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Functions sorted by name
    pub fn iter(&self) -> impl Iterator<Item = &Builtin> {
        let mut all: Vec<_> = self.functions.values().collect();
        all.sort_by_key(|builtin| builtin.name());
        all.into_iter()
    }
}

lazy_static::lazy_static! {
    static ref STANDARD: Catalog = Catalog::standard();
}

/// The process-wide standard catalog
pub fn catalog() -> &'static Catalog {
    &STANDARD
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_bounds_cover_every_signature() {
        for builtin in catalog().iter() {
            let d = &builtin.descriptor;
            assert!(!d.signatures.is_empty(), "{} has no signature", d.name);
            for sig in &d.signatures {
                assert!(
                    d.min_args <= sig.min_args() && sig.max_args() <= d.max_args,
                    "{} bounds do not cover a signature",
                    d.name
                );
            }
        }
    }

    #[test]
    fn test_arity_checked_before_selection() {
        let length = catalog().get("Length").unwrap();
        let err = length.resolve(&[]).unwrap_err();
        assert!(matches!(err, ScriptError::ArityMismatch { got: 0, .. }));
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let length = catalog().get("Length").unwrap();
        let args = vec![Value::Array(vec![Value::from("ab")])];
        assert_eq!(length.resolve(&args).unwrap(), length.resolve(&args).unwrap());
        assert_eq!(length.resolve(&args).unwrap(), 1);
    }

    #[test]
    fn test_args_conversion_fault_names_position() {
        let args = Args::new("Round", 0, vec![Value::Number(1.0), Value::Array(vec![])]);
        assert_eq!(
            args.number(1),
            Err(ScriptError::Conversion {
                context: "Round".to_string(),
                position: 2,
                from: ValueKind::Array,
                to: ValueKind::Number,
            })
        );
        assert_eq!(args.value(5), &Value::Null);
    }
}
