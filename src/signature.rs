//! Function signatures and overload resolution
//!
//! A function declares one or more signatures. Arity is checked against the
//! union of all signatures before any kind-based selection happens; selection
//! itself is a per-function hook (see `stdlib::Builtin`).

use crate::error::{Result, ScriptError};
use crate::types::{DeclaredType, StaticType, TypeInfo};
use crate::value::{Value, ValueKind};

/// Upper arity bound of functions taking a variable list of arguments
pub const VARIADIC_MAX: usize = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: &'static str,
    pub declared_type: DeclaredType,
    pub required: bool,
    pub default_value: Option<Value>,
}

impl Parameter {
    pub fn required(name: &'static str, declared_type: impl Into<DeclaredType>) -> Self {
        Parameter {
            name,
            declared_type: declared_type.into(),
            required: true,
            default_value: None,
        }
    }

    pub fn optional(name: &'static str, declared_type: impl Into<DeclaredType>) -> Self {
        Parameter {
            name,
            declared_type: declared_type.into(),
            required: false,
            default_value: None,
        }
    }

    pub fn defaulted(name: &'static str, declared_type: impl Into<DeclaredType>, default: Value) -> Self {
        Parameter {
            name,
            declared_type: declared_type.into(),
            required: false,
            default_value: Some(default),
        }
    }
}

/// Shorthand for a parameter accepting any kind
pub fn any() -> DeclaredType {
    DeclaredType::Any
}

#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    pub return_type: DeclaredType,
    pub params: Vec<Parameter>,
    /// The last parameter repeats up to the function's `max_args`
    pub variadic: bool,
}

impl Signature {
    pub fn new(return_type: impl Into<DeclaredType>, params: Vec<Parameter>) -> Self {
        Signature {
            return_type: return_type.into(),
            params,
            variadic: false,
        }
    }

    pub fn variadic(mut self) -> Self {
        self.variadic = true;
        self
    }

    pub fn min_args(&self) -> usize {
        self.params.iter().filter(|p| p.required).count()
    }

    pub fn max_args(&self) -> usize {
        if self.variadic {
            VARIADIC_MAX
        } else {
            self.params.len()
        }
    }

    /// Parameter matched by argument `index`, following a variadic tail
    pub fn param(&self, index: usize) -> Option<&Parameter> {
        match self.params.get(index) {
            Some(param) => Some(param),
            None if self.variadic => self.params.last(),
            None => None,
        }
    }

    pub fn return_static_type(&self) -> StaticType {
        match self.return_type {
            DeclaredType::Any => StaticType::Unknown,
            DeclaredType::Kind(kind) => kind.into(),
        }
    }

    /// `Name(a: string, [b: bool = 1]) -> number`
    pub fn describe(&self, name: &str) -> String {
        let mut params: Vec<String> = self
            .params
            .iter()
            .map(|p| match (&p.default_value, p.required) {
                (_, true) => format!("{}: {}", p.name, p.declared_type),
                (Some(default), false) => format!("[{}: {} = {}]", p.name, p.declared_type, default),
                (None, false) => format!("[{}: {}]", p.name, p.declared_type),
            })
            .collect();
        if self.variadic {
            params.push("...".to_string());
        }
        format!("{}({}) -> {}", name, params.join(", "), self.return_type)
    }
}

/// Name, arity bounds and overloads of one function
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDescriptor {
    pub name: &'static str,
    pub min_args: usize,
    pub max_args: usize,
    pub signatures: Vec<Signature>,
}

impl FunctionDescriptor {
    /// Arity bounds are the union of the signatures' arities
    pub fn new(name: &'static str, signatures: Vec<Signature>) -> Self {
        debug_assert!(!signatures.is_empty(), "{} declares no signature", name);
        let min_args = signatures.iter().map(Signature::min_args).min().unwrap_or(0);
        let max_args = signatures.iter().map(Signature::max_args).max().unwrap_or(0);
        FunctionDescriptor {
            name,
            min_args,
            max_args,
            signatures,
        }
    }

    pub fn accepts_arity(&self, count: usize) -> bool {
        (self.min_args..=self.max_args).contains(&count)
    }

    pub fn check_arity(&self, count: usize) -> Result<()> {
        if self.accepts_arity(count) {
            Ok(())
        } else {
            Err(ScriptError::ArityMismatch {
                function: self.name.to_string(),
                min: self.min_args,
                max: self.max_args,
                got: count,
            })
        }
    }

    /// Static arity diagnostic, worded like the runtime fault
    pub fn arity_message(&self, count: usize) -> Option<String> {
        self.check_arity(count).err().map(|e| e.to_string())
    }
}

/// Appends defaults for missing optional parameters. Filling stops at the
/// first optional parameter without a default.
pub fn fill_defaults(function: &str, signature: &Signature, mut args: Vec<Value>) -> Result<Vec<Value>> {
    for param in signature.params.iter().skip(args.len()) {
        match (&param.default_value, param.required) {
            (Some(default), _) => args.push(default.clone()),
            (None, true) => {
                return Err(ScriptError::Internal(format!(
                    "{}: required parameter '{}' is missing after arity check",
                    function, param.name
                )))
            }
            (None, false) => break,
        }
    }
    Ok(args)
}

/// Selects the array overload when argument `position` is an array
pub fn array_at(args: &[Value], position: usize) -> usize {
    match args.get(position) {
        Some(Value::Array(_)) => 1,
        _ => 0,
    }
}

/// Static form of `array_at`
pub fn static_array_at(args: &[TypeInfo], position: usize) -> usize {
    match args.get(position).map(|info| info.ty) {
        Some(StaticType::Array) => 1,
        _ => 0,
    }
}

/// Kind of argument `position`, if present
pub fn kind_at(args: &[Value], position: usize) -> Option<ValueKind> {
    args.get(position).map(Value::kind)
}
