//! Error types for jbscript
//!
//! Three fault categories exist. Static diagnostics never show up here; they
//! live on typed AST nodes. Runtime faults (`ScriptError`) abort the current
//! evaluation only. Internal consistency faults (`AnalyzerError`) mean the
//! analyzer was handed a tree it was not built for.

use thiserror::Error;

use crate::value::ValueKind;

/// Result type alias for runtime operations
pub type Result<T> = std::result::Result<T, ScriptError>;

/// Runtime value, coercion and call-resolution faults
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScriptError {
    #[error("{context}: argument {position} cannot be converted from {from} to {to}")]
    Conversion {
        context: String,
        position: usize,
        from: ValueKind,
        to: ValueKind,
    },

    #[error("Arity mismatch: {function} expects {min} to {max} arguments, got {got}")]
    ArityMismatch {
        function: String,
        min: usize,
        max: usize,
        got: usize,
    },

    #[error("Unsupported operation: {left} {operator} {right}")]
    UnsupportedOperation {
        operator: String,
        left: ValueKind,
        right: ValueKind,
    },

    #[error("Unsupported operation: {operator}{operand}")]
    UnsupportedUnary { operator: String, operand: ValueKind },

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Index out of bounds: index {index}, length {length}")]
    IndexOutOfBounds { index: i64, length: usize },

    #[error("{function}: {message}")]
    InvalidArgument { function: String, message: String },

    #[error("Undefined function: {0}")]
    UndefinedFunction(String),

    #[error("{0} is not implemented in this runtime")]
    Unimplemented(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ScriptError {
    pub fn invalid_argument(function: &str, message: impl Into<String>) -> Self {
        ScriptError::InvalidArgument {
            function: function.to_string(),
            message: message.into(),
        }
    }
}

/// Analyzer contract violations: defects in the parser/analyzer pairing,
/// never user script errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyzerError {
    #[error("Internal analyzer fault at {line}:{character}: {node} is not valid {position}")]
    InvalidNode {
        node: String,
        position: String,
        line: u32,
        character: u32,
    },
}

/// Configuration loading failures
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}
