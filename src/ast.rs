//! Untyped Abstract Syntax Tree
//!
//! The parser is an external collaborator; this module only fixes the node
//! set it hands over. Nodes serialize as internally tagged JSON, e.g.
//! `{"kind": "identifier", "name": "x", "span": {...}}`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Zero-based line/character location in the script source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub fn new(line: u32, character: u32) -> Self {
        Position { line, character }
    }
}

/// Half-open source range of a node
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Span { start, end }
    }

    /// Span on a single line
    pub fn line(line: u32, from: u32, to: u32) -> Self {
        Span {
            start: Position::new(line, from),
            end: Position::new(line, to),
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}-{}:{}",
            self.start.line + 1,
            self.start.character + 1,
            self.end.line + 1,
            self.end.character + 1
        )
    }
}

/// A script expression. Scripts are a block of expressions; statements do
/// not exist as a separate category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    #[serde(flatten)]
    pub kind: ExprKind,
    #[serde(default)]
    pub span: Span,
}

/// Expression nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ExprKind {
    /// Numeric literal
    Number { value: f64 },

    /// String literal
    String { value: String },

    /// `true` / `false`
    Bool { value: bool },

    /// Local variable: `x`
    Identifier { name: String },

    /// Global or system variable: `$x`, `$jitterbit.operation.name`
    Global { name: String },

    /// Function name; only valid as the callee of a call
    Function { name: String },

    /// `target = value`, `target += value`, `target -= value`
    Assignment {
        operator: AssignOp,
        target: Box<Expr>,
        value: Box<Expr>,
    },

    /// Binary operation
    Binary {
        operator: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Unary operation
    Unary {
        operator: UnaryOp,
        operand: Box<Expr>,
    },

    /// Sequence of expressions; evaluates to the last one
    Block { body: Vec<Expr> },

    /// Function call
    Call { callee: Box<Expr>, arguments: Vec<Expr> },

    /// Index access: `a[0]`, `d["key"]`
    Member { object: Box<Expr>, key: Box<Expr> },

    /// Array literal: `{1, 2, 3}`
    Array { elements: Vec<Expr> },
}

impl ExprKind {
    /// Node kind name used in internal fault messages
    pub fn name(&self) -> &'static str {
        match self {
            ExprKind::Number { .. } => "number literal",
            ExprKind::String { .. } => "string literal",
            ExprKind::Bool { .. } => "bool literal",
            ExprKind::Identifier { .. } => "identifier",
            ExprKind::Global { .. } => "global identifier",
            ExprKind::Function { .. } => "function identifier",
            ExprKind::Assignment { .. } => "assignment",
            ExprKind::Binary { .. } => "binary expression",
            ExprKind::Unary { .. } => "unary expression",
            ExprKind::Block { .. } => "block",
            ExprKind::Call { .. } => "call",
            ExprKind::Member { .. } => "member access",
            ExprKind::Array { .. } => "array literal",
        }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    // Arithmetic
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Sub,
    #[serde(rename = "*")]
    Mul,
    #[serde(rename = "/")]
    Div,
    #[serde(rename = "^")]
    Pow,

    // Comparison
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,

    // Logical
    #[serde(rename = "&&")]
    And,
    #[serde(rename = "||")]
    Or,
}

/// Operator families the value model resolves rules for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpClass {
    Arithmetic,
    Equality,
    Ordering,
    Logical,
}

impl BinaryOp {
    pub fn class(self) -> OpClass {
        match self {
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Pow => {
                OpClass::Arithmetic
            }
            BinaryOp::Eq | BinaryOp::Ne => OpClass::Equality,
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => OpClass::Ordering,
            BinaryOp::And | BinaryOp::Or => OpClass::Logical,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Pow => "^",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    #[serde(rename = "-")]
    Neg,
    #[serde(rename = "!")]
    Not,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
        })
    }
}

/// Assignment operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignOp {
    #[serde(rename = "=")]
    Assign,
    #[serde(rename = "+=")]
    AddAssign,
    #[serde(rename = "-=")]
    SubAssign,
}

impl AssignOp {
    /// The binary operator a compound assignment applies
    pub fn binary(self) -> Option<BinaryOp> {
        match self {
            AssignOp::Assign => None,
            AssignOp::AddAssign => Some(BinaryOp::Add),
            AssignOp::SubAssign => Some(BinaryOp::Sub),
        }
    }
}

// ── Construction helpers ──────────────────────────────────────────────
//
// Used by hosts that build trees in Rust instead of deserializing them.

impl Expr {
    pub fn new(kind: ExprKind) -> Self {
        Expr {
            kind,
            span: Span::default(),
        }
    }

    pub fn at(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn number(value: f64) -> Self {
        Expr::new(ExprKind::Number { value })
    }

    pub fn string(value: &str) -> Self {
        Expr::new(ExprKind::String {
            value: value.to_string(),
        })
    }

    pub fn bool(value: bool) -> Self {
        Expr::new(ExprKind::Bool { value })
    }

    pub fn ident(name: &str) -> Self {
        Expr::new(ExprKind::Identifier {
            name: name.to_string(),
        })
    }

    pub fn global(name: &str) -> Self {
        Expr::new(ExprKind::Global {
            name: name.to_string(),
        })
    }

    pub fn function(name: &str) -> Self {
        Expr::new(ExprKind::Function {
            name: name.to_string(),
        })
    }

    pub fn assign(target: Expr, value: Expr) -> Self {
        Expr::assign_op(AssignOp::Assign, target, value)
    }

    pub fn assign_op(operator: AssignOp, target: Expr, value: Expr) -> Self {
        Expr::new(ExprKind::Assignment {
            operator,
            target: Box::new(target),
            value: Box::new(value),
        })
    }

    pub fn binary(operator: BinaryOp, left: Expr, right: Expr) -> Self {
        Expr::new(ExprKind::Binary {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn unary(operator: UnaryOp, operand: Expr) -> Self {
        Expr::new(ExprKind::Unary {
            operator,
            operand: Box::new(operand),
        })
    }

    pub fn block(body: Vec<Expr>) -> Self {
        Expr::new(ExprKind::Block { body })
    }

    pub fn call(name: &str, arguments: Vec<Expr>) -> Self {
        Expr::new(ExprKind::Call {
            callee: Box::new(Expr::function(name)),
            arguments,
        })
    }

    pub fn member(object: Expr, key: Expr) -> Self {
        Expr::new(ExprKind::Member {
            object: Box::new(object),
            key: Box::new(key),
        })
    }

    pub fn array(elements: Vec<Expr>) -> Self {
        Expr::new(ExprKind::Array { elements })
    }
}
