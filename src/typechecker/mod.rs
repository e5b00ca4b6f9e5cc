//! Static type-flow analyzer
//!
//! Walks an untyped AST once, in evaluation order, and produces a typed AST
//! in which every node carries a `TypeInfo`. Types flow forward through
//! assignments into a flat `TypeEnv`. Problems are recorded as error or
//! warning text on the node they concern and collected afterwards with
//! `collect_diagnostics`; analysis never stops at the first problem.
//!
//! Only contract violations between parser and analyzer (a tree shape the
//! parser never produces) abort the pass, as `AnalyzerError`.

pub mod typed_ast;

use std::fmt;

use serde::Serialize;

use crate::ast::{AssignOp, Expr, ExprKind, Span};
use crate::error::AnalyzerError;
use crate::stdlib::{self, Catalog};
use crate::sysvars::{self, SysVarAccess};
use crate::types::{StaticType, TypeEnv, TypeInfo};
use crate::value::static_ops::{static_binary, static_unary};
use crate::value::ValueKind;

use typed_ast::{TypedExpr, TypedKind};

/// Severity of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
            Severity::Warning => f.write_str("warning"),
        }
    }
}

/// A diagnostic lifted from a typed AST node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub range: Span,
    pub message: String,
    pub severity: Severity,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.range, self.severity, self.message)
    }
}

/// Result of one analysis
#[derive(Debug, Clone)]
pub struct Analysis {
    pub typed: TypedExpr,
    pub diagnostics: Vec<Diagnostic>,
}

impl Analysis {
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Warning)
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }
}

/// Entry point: analyze a script against the standard catalog
pub fn check_program(script: &Expr) -> Result<Analysis, AnalyzerError> {
    let mut analyzer = Analyzer::new();
    let typed = analyzer.analyze(script)?;
    let diagnostics = collect_diagnostics(&typed);
    tracing::debug!(
        diagnostics = diagnostics.len(),
        variables = analyzer.env().names().len(),
        "analysis finished"
    );
    Ok(Analysis { typed, diagnostics })
}

/// Errors and warnings of every node, in pre-order
pub fn collect_diagnostics(typed: &TypedExpr) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    typed.walk(&mut |node| {
        if let Some(message) = &node.info.error {
            diagnostics.push(Diagnostic {
                range: node.span,
                message: message.clone(),
                severity: Severity::Error,
            });
        }
        if let Some(message) = &node.info.warning {
            diagnostics.push(Diagnostic {
                range: node.span,
                message: message.clone(),
                severity: Severity::Warning,
            });
        }
    });
    diagnostics
}

/// Kind of an operand that can take part in static operator evaluation.
/// An unassigned operand is turned into an error first.
fn operand_kind(operand: &mut TypedExpr) -> Option<ValueKind> {
    operand.fault_unassigned();
    operand.ty().kind()
}

fn invalid_node(expr: &Expr, position: &str) -> AnalyzerError {
    AnalyzerError::InvalidNode {
        node: expr.kind.name().to_string(),
        position: position.to_string(),
        line: expr.span.start.line,
        character: expr.span.start.character,
    }
}

/// Analysis state for one script
pub struct Analyzer<'c> {
    env: TypeEnv,
    catalog: &'c Catalog,
}

impl Analyzer<'static> {
    pub fn new() -> Self {
        Analyzer::with_catalog(stdlib::catalog())
    }
}

impl Default for Analyzer<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'c> Analyzer<'c> {
    pub fn with_catalog(catalog: &'c Catalog) -> Self {
        Analyzer {
            env: TypeEnv::new(),
            catalog,
        }
    }

    /// Starts from known bindings, e.g. globals the host declares
    pub fn with_env(mut self, env: TypeEnv) -> Self {
        self.env = env;
        self
    }

    pub fn env(&self) -> &TypeEnv {
        &self.env
    }

    /// Types a whole script. Reads still unassigned at the end become errors.
    pub fn analyze(&mut self, script: &Expr) -> Result<TypedExpr, AnalyzerError> {
        tracing::debug!(span = %script.span, "analyzing script");
        let mut typed = self.type_expr(script)?;
        typed.walk_mut(&mut |node| {
            node.fault_unassigned();
        });
        Ok(typed)
    }

    fn type_expr(&mut self, expr: &Expr) -> Result<TypedExpr, AnalyzerError> {
        let span = expr.span;
        let typed = match &expr.kind {
            ExprKind::Number { value } => {
                TypedExpr::new(TypedKind::Number(*value), span, TypeInfo::of(StaticType::Number))
            }
            ExprKind::String { value } => TypedExpr::new(
                TypedKind::String(value.clone()),
                span,
                TypeInfo::of(StaticType::String),
            ),
            ExprKind::Bool { value } => {
                TypedExpr::new(TypedKind::Bool(*value), span, TypeInfo::of(StaticType::Bool))
            }
            ExprKind::Identifier { name } => {
                let ty = self
                    .env
                    .lookup(name)
                    .map_or(StaticType::Unassigned, |info| info.ty);
                TypedExpr::new(TypedKind::Identifier(name.clone()), span, TypeInfo::of(ty))
            }
            ExprKind::Global { name } => {
                let info = self.type_global(name);
                TypedExpr::new(TypedKind::Global(name.clone()), span, info)
            }
            ExprKind::Function { .. } => return Err(invalid_node(expr, "outside of a call")),
            ExprKind::Assignment {
                operator,
                target,
                value,
            } => self.type_assignment(*operator, target, value, span)?,
            ExprKind::Binary {
                operator,
                left,
                right,
            } => {
                let mut left = self.type_expr(left)?;
                let mut right = self.type_expr(right)?;
                let l = operand_kind(&mut left);
                let r = operand_kind(&mut right);
                let info = match (l, r) {
                    (Some(l), Some(r)) => static_binary(*operator, l, r),
                    _ => TypeInfo::unknown(),
                };
                TypedExpr::new(
                    TypedKind::Binary {
                        operator: *operator,
                        left: Box::new(left),
                        right: Box::new(right),
                    },
                    span,
                    info,
                )
            }
            ExprKind::Unary { operator, operand } => {
                let mut operand = self.type_expr(operand)?;
                let info = match operand_kind(&mut operand) {
                    Some(kind) => static_unary(*operator, kind),
                    None => TypeInfo::unknown(),
                };
                TypedExpr::new(
                    TypedKind::Unary {
                        operator: *operator,
                        operand: Box::new(operand),
                    },
                    span,
                    info,
                )
            }
            ExprKind::Block { body } => {
                let mut items = body
                    .iter()
                    .map(|item| self.type_expr(item))
                    .collect::<Result<Vec<_>, _>>()?;
                // The fault stays on the trailing read, not on the block
                let ty = match items.last_mut() {
                    Some(last) => {
                        if last.fault_unassigned() {
                            StaticType::Unknown
                        } else {
                            last.ty()
                        }
                    }
                    None => StaticType::Void,
                };
                TypedExpr::new(TypedKind::Block(items), span, TypeInfo::of(ty))
            }
            ExprKind::Call { callee, arguments } => {
                let name = match &callee.kind {
                    ExprKind::Function { name } => name,
                    _ => return Err(invalid_node(callee, "as a callee")),
                };
                let mut args = arguments
                    .iter()
                    .map(|arg| self.type_expr(arg))
                    .collect::<Result<Vec<_>, _>>()?;
                let info = match self.catalog.get(name) {
                    Some(builtin) => builtin.analyze_call(&mut args, &mut self.env),
                    None => {
                        for arg in args.iter_mut() {
                            arg.fault_unassigned();
                        }
                        TypeInfo::error(format!("Unknown function '{}'", name))
                    }
                };
                TypedExpr::new(
                    TypedKind::Call {
                        name: name.clone(),
                        arguments: args,
                    },
                    span,
                    info,
                )
            }
            ExprKind::Member { object, key } => {
                let mut object = self.type_expr(object)?;
                let mut key = self.type_expr(key)?;
                operand_kind(&mut key);
                let info = match operand_kind(&mut object) {
                    None | Some(ValueKind::Array) | Some(ValueKind::Dictionary) => TypeInfo::unknown(),
                    Some(ValueKind::Null) | Some(ValueKind::Void) => TypeInfo::of(StaticType::Null)
                        .with_warning("Indexing a null value always yields null"),
                    Some(other) => TypeInfo::error(format!("Cannot index into a value of type {}", other)),
                };
                TypedExpr::new(
                    TypedKind::Member {
                        object: Box::new(object),
                        key: Box::new(key),
                    },
                    span,
                    info,
                )
            }
            ExprKind::Array { elements } => {
                let mut items = elements
                    .iter()
                    .map(|item| self.type_expr(item))
                    .collect::<Result<Vec<_>, _>>()?;
                for item in items.iter_mut() {
                    item.fault_unassigned();
                }
                TypedExpr::new(TypedKind::Array(items), span, TypeInfo::of(StaticType::Array))
            }
        };
        Ok(typed)
    }

    fn type_global(&self, name: &str) -> TypeInfo {
        if let Some(info) = self.env.lookup(name) {
            return TypeInfo::of(info.ty);
        }
        if sysvars::is_system_name(name) {
            return match sysvars::lookup(name) {
                Some(var) => TypeInfo::of(var.data_type.static_type()),
                None => TypeInfo::of(StaticType::Null)
                    .with_warning(format!("Unknown system variable '{}' reads as null", name)),
            };
        }
        TypeInfo::unknown().with_warning(format!(
            "Global variable '{}' is not assigned in this script; its value comes from the host",
            name
        ))
    }

    // ── Assignment ────────────────────────────────────────────────────

    fn type_assignment(
        &mut self,
        operator: AssignOp,
        target: &Expr,
        value: &Expr,
        span: Span,
    ) -> Result<TypedExpr, AnalyzerError> {
        if !matches!(
            target.kind,
            ExprKind::Identifier { .. } | ExprKind::Global { .. } | ExprKind::Member { .. }
        ) {
            return Err(invalid_node(target, "as an assignment target"));
        }

        let mut value = self.type_expr(value)?;
        let value_faulted = value.fault_unassigned() || value.ty() == StaticType::Error;

        let (target, info) = match operator.binary() {
            None => {
                let assigned = if value_faulted {
                    TypeInfo::unknown()
                } else {
                    TypeInfo::of(value.ty())
                };
                let target = self.bind_target(target, assigned.ty)?;
                (target, assigned)
            }
            Some(op) => {
                let mut current = self.type_expr(target)?;
                let l = operand_kind(&mut current);
                let info = match (l, value.ty().kind()) {
                    (Some(l), Some(r)) if !value_faulted => static_binary(op, l, r),
                    _ => TypeInfo::unknown(),
                };
                let result = if info.ty == StaticType::Error {
                    StaticType::Unknown
                } else {
                    info.ty
                };
                if let Some(name) = current.variable_name() {
                    self.env.define(name, result);
                }
                (current, info)
            }
        };

        let warning = self.system_write_warning(&target, value.ty());
        let mut node = TypedExpr::new(
            TypedKind::Assignment {
                operator,
                target: Box::new(target),
                value: Box::new(value),
            },
            span,
            info,
        );
        if let Some(warning) = warning {
            node.add_warning(warning);
        }
        Ok(node)
    }

    /// Types an assignment target and records the assigned type
    fn bind_target(&mut self, target: &Expr, ty: StaticType) -> Result<TypedExpr, AnalyzerError> {
        let span = target.span;
        match &target.kind {
            ExprKind::Identifier { name } => {
                self.env.define(name, ty);
                Ok(TypedExpr::new(TypedKind::Identifier(name.clone()), span, TypeInfo::of(ty)))
            }
            ExprKind::Global { name } => {
                self.env.define(name, ty);
                Ok(TypedExpr::new(TypedKind::Global(name.clone()), span, TypeInfo::of(ty)))
            }
            ExprKind::Member { object, key } => {
                let mut key = self.type_expr(key)?;
                let key_kind = operand_kind(&mut key);
                let object = self.bind_container(object, key_kind)?;
                Ok(TypedExpr::new(
                    TypedKind::Member {
                        object: Box::new(object),
                        key: Box::new(key),
                    },
                    span,
                    TypeInfo::of(ty),
                ))
            }
            _ => Err(invalid_node(target, "as an assignment target")),
        }
    }

    /// The container of `c[k] = v`. An unassigned or null variable becomes an
    /// array for numeric keys and a dictionary for string keys.
    fn bind_container(&mut self, object: &Expr, key: Option<ValueKind>) -> Result<TypedExpr, AnalyzerError> {
        let mut container = self.type_expr(object)?;
        let created = match key {
            Some(ValueKind::String) => StaticType::Dictionary,
            Some(ValueKind::Number) => StaticType::Array,
            _ => StaticType::Unknown,
        };
        match container.ty() {
            StaticType::Unassigned | StaticType::Null | StaticType::Void => {
                container.info = TypeInfo::of(created);
                if let Some(name) = container.variable_name() {
                    self.env.define(name, created);
                }
            }
            StaticType::Array | StaticType::Dictionary | StaticType::Unknown | StaticType::Error => {}
            other => {
                container.add_error(format!("Cannot index into a value of type {}", other));
            }
        }
        Ok(container)
    }

    /// Writes to read-only system variables, or of the wrong type to a
    /// settings variable
    fn system_write_warning(&self, target: &TypedExpr, assigned: StaticType) -> Option<String> {
        let name = match &target.kind {
            TypedKind::Global(name) if sysvars::is_system_name(name) => name,
            _ => return None,
        };
        let var = sysvars::lookup(name)?;
        match var.access {
            SysVarAccess::Informational => Some(format!(
                "System variable '{}' is informational; the host does not read it back",
                name
            )),
            SysVarAccess::Settings => {
                let expected = var.data_type.static_type();
                match assigned.kind() {
                    Some(kind) if StaticType::from(kind) != expected && !kind.is_nullish() => Some(format!(
                        "System variable '{}' expects {} but is assigned {}",
                        name, expected, kind
                    )),
                    _ => None,
                }
            }
        }
    }
}
