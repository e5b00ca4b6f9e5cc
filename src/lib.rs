//! jbscript
//!
//! Core of a legacy business-integration script language: the dynamic value
//! model, the built-in function catalog, the system variable registry, a
//! static type-flow analyzer over a parsed AST, and an evaluator.

pub mod ast;
pub mod config;
pub mod error;
pub mod interpreter;
pub mod scope;
pub mod signature;
pub mod stdlib;
pub mod sysvars;
pub mod typechecker;
pub mod types;
pub mod value;

pub use error::{AnalyzerError, ConfigError, Result, ScriptError};
pub use interpreter::Interpreter;
pub use scope::Scope;
pub use typechecker::{check_program, Analysis, Analyzer, Diagnostic, Severity};
pub use value::{Value, ValueKind};
