//! Typed AST
//!
//! Mirror of `ast::Expr` where every node carries the `TypeInfo` the analyzer
//! inferred for it. Callees are resolved to plain function names.

use crate::ast::{AssignOp, BinaryOp, Span, UnaryOp};
use crate::types::{StaticType, TypeInfo};

#[derive(Debug, Clone, PartialEq)]
pub struct TypedExpr {
    pub kind: TypedKind,
    pub span: Span,
    pub info: TypeInfo,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypedKind {
    Number(f64),
    String(String),
    Bool(bool),
    Identifier(String),
    Global(String),
    Assignment {
        operator: AssignOp,
        target: Box<TypedExpr>,
        value: Box<TypedExpr>,
    },
    Binary {
        operator: BinaryOp,
        left: Box<TypedExpr>,
        right: Box<TypedExpr>,
    },
    Unary {
        operator: UnaryOp,
        operand: Box<TypedExpr>,
    },
    Block(Vec<TypedExpr>),
    Call {
        name: String,
        arguments: Vec<TypedExpr>,
    },
    Member {
        object: Box<TypedExpr>,
        key: Box<TypedExpr>,
    },
    Array(Vec<TypedExpr>),
}

impl TypedExpr {
    pub fn new(kind: TypedKind, span: Span, info: TypeInfo) -> Self {
        TypedExpr { kind, span, info }
    }

    pub fn ty(&self) -> StaticType {
        self.info.ty
    }

    /// Variable name for identifier and global nodes
    pub fn variable_name(&self) -> Option<&str> {
        match &self.kind {
            TypedKind::Identifier(name) | TypedKind::Global(name) => Some(name),
            _ => None,
        }
    }

    /// String literal value, if this node is one
    pub fn string_literal(&self) -> Option<&str> {
        match &self.kind {
            TypedKind::String(value) => Some(value),
            _ => None,
        }
    }

    /// Turns an `unassigned` read into an `error` naming the variable.
    /// Returns true when the node was unassigned.
    pub fn fault_unassigned(&mut self) -> bool {
        if self.info.ty != StaticType::Unassigned {
            return false;
        }
        let name = self.variable_name().unwrap_or("<expression>");
        self.info = TypeInfo::error(format!("Local variable '{}' hasn't been initialized", name));
        true
    }

    /// Appends a warning, keeping any warning already on the node
    pub fn add_warning(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.info.warning = Some(match self.info.warning.take() {
            Some(existing) => format!("{}; {}", existing, message),
            None => message,
        });
    }

    /// Appends an error without changing the node's type
    pub fn add_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.info.error = Some(match self.info.error.take() {
            Some(existing) => format!("{}; {}", existing, message),
            None => message,
        });
    }

    /// Direct children in source order
    pub fn children(&self) -> Vec<&TypedExpr> {
        match &self.kind {
            TypedKind::Number(_)
            | TypedKind::String(_)
            | TypedKind::Bool(_)
            | TypedKind::Identifier(_)
            | TypedKind::Global(_) => Vec::new(),
            TypedKind::Assignment { target, value, .. } => vec![target, value],
            TypedKind::Binary { left, right, .. } => vec![left, right],
            TypedKind::Unary { operand, .. } => vec![operand],
            TypedKind::Member { object, key } => vec![object, key],
            TypedKind::Block(items) | TypedKind::Array(items) => items.iter().collect(),
            TypedKind::Call { arguments, .. } => arguments.iter().collect(),
        }
    }

    fn children_mut(&mut self) -> Vec<&mut TypedExpr> {
        match &mut self.kind {
            TypedKind::Number(_)
            | TypedKind::String(_)
            | TypedKind::Bool(_)
            | TypedKind::Identifier(_)
            | TypedKind::Global(_) => Vec::new(),
            TypedKind::Assignment { target, value, .. } => vec![target.as_mut(), value.as_mut()],
            TypedKind::Binary { left, right, .. } => vec![left.as_mut(), right.as_mut()],
            TypedKind::Unary { operand, .. } => vec![operand.as_mut()],
            TypedKind::Member { object, key } => vec![object.as_mut(), key.as_mut()],
            TypedKind::Block(items) | TypedKind::Array(items) => items.iter_mut().collect(),
            TypedKind::Call { arguments, .. } => arguments.iter_mut().collect(),
        }
    }

    /// Pre-order traversal
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a TypedExpr)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }

    pub fn walk_mut(&mut self, visit: &mut impl FnMut(&mut TypedExpr)) {
        visit(self);
        for child in self.children_mut() {
            child.walk_mut(visit);
        }
    }
}
