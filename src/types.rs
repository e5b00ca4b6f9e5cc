//! Static type representation
//!
//! `StaticType` is the analyzer's view of a value: one of the runtime kinds,
//! or one of three analysis-only states. `TypeInfo` pairs a type with the
//! error/warning text attached to the node that produced it.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::ValueKind;

/// Inferred type of a typed AST node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StaticType {
    Number,
    String,
    Bool,
    Null,
    Void,
    Array,
    Dictionary,
    Binary,
    Date,

    /// Hard static fault; inference stops at this node
    Error,

    /// Local variable read before any write
    Unassigned,

    /// Cannot be determined statically
    Unknown,
}

impl StaticType {
    /// The runtime kind, if this is not an analysis-only state
    pub fn kind(self) -> Option<ValueKind> {
        match self {
            StaticType::Number => Some(ValueKind::Number),
            StaticType::String => Some(ValueKind::String),
            StaticType::Bool => Some(ValueKind::Bool),
            StaticType::Null => Some(ValueKind::Null),
            StaticType::Void => Some(ValueKind::Void),
            StaticType::Array => Some(ValueKind::Array),
            StaticType::Dictionary => Some(ValueKind::Dictionary),
            StaticType::Binary => Some(ValueKind::Binary),
            StaticType::Date => Some(ValueKind::Date),
            StaticType::Error | StaticType::Unassigned | StaticType::Unknown => None,
        }
    }

    /// `error` or `unassigned`: the node already failed
    pub fn is_fault(self) -> bool {
        matches!(self, StaticType::Error | StaticType::Unassigned)
    }

    pub fn name(self) -> &'static str {
        match self.kind() {
            Some(kind) => kind.name(),
            None => match self {
                StaticType::Error => "error",
                StaticType::Unassigned => "unassigned",
                _ => "unknown",
            },
        }
    }
}

impl From<ValueKind> for StaticType {
    fn from(kind: ValueKind) -> Self {
        match kind {
            ValueKind::Number => StaticType::Number,
            ValueKind::String => StaticType::String,
            ValueKind::Bool => StaticType::Bool,
            ValueKind::Null => StaticType::Null,
            ValueKind::Void => StaticType::Void,
            ValueKind::Array => StaticType::Array,
            ValueKind::Dictionary => StaticType::Dictionary,
            ValueKind::Binary => StaticType::Binary,
            ValueKind::Date => StaticType::Date,
        }
    }
}

impl fmt::Display for StaticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Static inference result for one node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeInfo {
    #[serde(rename = "type")]
    pub ty: StaticType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl TypeInfo {
    pub fn of(ty: StaticType) -> Self {
        TypeInfo {
            ty,
            error: None,
            warning: None,
        }
    }

    pub fn kind(kind: ValueKind) -> Self {
        TypeInfo::of(kind.into())
    }

    pub fn unknown() -> Self {
        TypeInfo::of(StaticType::Unknown)
    }

    /// A node that faulted statically
    pub fn error(message: impl Into<String>) -> Self {
        TypeInfo {
            ty: StaticType::Error,
            error: Some(message.into()),
            warning: None,
        }
    }

    pub fn with_warning(mut self, message: impl Into<String>) -> Self {
        self.warning = Some(message.into());
        self
    }

    /// Keeps the type but records an error on the node
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error = Some(message.into());
        self
    }
}

/// Parameter/return type as written in a function's documentation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclaredType {
    /// Any kind (`type` in the legacy documentation)
    Any,
    Kind(ValueKind),
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclaredType::Any => f.write_str("type"),
            DeclaredType::Kind(kind) => write!(f, "{}", kind),
        }
    }
}

impl From<ValueKind> for DeclaredType {
    fn from(kind: ValueKind) -> Self {
        DeclaredType::Kind(kind)
    }
}

/// Outcome of passing a statically known kind to a declared parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgCheck {
    Accepted,
    Converted(String),
    Rejected(String),
}

impl DeclaredType {
    /// Static counterpart of the runtime argument conversions
    pub fn check(self, arg: ValueKind) -> ArgCheck {
        use ValueKind::*;

        let expected = match self {
            DeclaredType::Any => return ArgCheck::Accepted,
            DeclaredType::Kind(kind) if kind == arg => return ArgCheck::Accepted,
            DeclaredType::Kind(kind) => kind,
        };
        match (expected, arg) {
            (Number, String) => ArgCheck::Converted("String argument will be parsed as a number".into()),
            (Number, Null | Void) => ArgCheck::Converted("Null argument is treated as 0".into()),
            (Number, Bool | Date) => ArgCheck::Accepted,
            (String, Array | Dictionary) => {
                ArgCheck::Converted(format!("{} argument will be converted to its string form", arg))
            }
            (String, _) => ArgCheck::Accepted,
            (Bool, Number | String | Null | Void) => ArgCheck::Accepted,
            (Array | Dictionary, Null | Void) => {
                ArgCheck::Converted(format!("Null argument where {} is expected", expected))
            }
            (Date, String) => ArgCheck::Converted("String argument will be parsed as a date".into()),
            (Date, Number) => ArgCheck::Accepted,
            (Binary, String | Null | Void) => ArgCheck::Accepted,
            (Null | Void, _) => ArgCheck::Accepted,
            _ => ArgCheck::Rejected(format!("Expected {} but got {}", expected, arg)),
        }
    }
}

/// Static variable bindings for one analysis. Flat like the runtime scope:
/// locals under their bare name, globals under their `$` name.
#[derive(Debug, Clone, Default)]
pub struct TypeEnv {
    bindings: HashMap<String, TypeInfo>,
}

impl TypeEnv {
    pub fn new() -> Self {
        TypeEnv {
            bindings: HashMap::new(),
        }
    }

    /// Records the type flowing into `name`. Diagnostics stay on the node
    /// that produced them and are not copied into the binding.
    pub fn define(&mut self, name: &str, ty: StaticType) {
        self.bindings.insert(name.to_string(), TypeInfo::of(ty));
    }

    pub fn lookup(&self, name: &str) -> Option<&TypeInfo> {
        self.bindings.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.bindings.keys().map(String::as_str).collect();
        names.sort();
        names
    }
}
