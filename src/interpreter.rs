//! Tree-walking evaluator for untyped scripts
//!
//! Evaluates an `ast::Expr` against a `Scope` and the function catalog.
//! Every fault aborts the current evaluation with a `ScriptError`; the scope
//! keeps whatever was written before the fault.

use crate::ast::{AssignOp, BinaryOp, Expr, ExprKind};
use crate::error::{Result, ScriptError};
use crate::scope::Scope;
use crate::stdlib::{self, Catalog};
use crate::value::ops::{binary_op, unary_op};
use crate::value::{Value, ValueKind, MAX_COLLECTION_LEN};

/// The script interpreter
pub struct Interpreter<'c> {
    scope: Scope,
    catalog: &'c Catalog,
}

impl Interpreter<'static> {
    pub fn new() -> Self {
        Interpreter::with_catalog(stdlib::catalog())
    }
}

impl Default for Interpreter<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'c> Interpreter<'c> {
    pub fn with_catalog(catalog: &'c Catalog) -> Self {
        Interpreter {
            scope: Scope::new(),
            catalog,
        }
    }

    /// Replaces the scope, e.g. with host-provided globals
    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn into_scope(self) -> Scope {
        self.scope
    }

    /// Evaluate a script
    pub fn eval(&mut self, script: &Expr) -> Result<Value> {
        tracing::debug!(span = %script.span, "evaluating script");
        self.eval_expr(script)
    }

    fn eval_expr(&mut self, expr: &Expr) -> Result<Value> {
        match &expr.kind {
            ExprKind::Number { value } => Ok(Value::Number(*value)),
            ExprKind::String { value } => Ok(Value::String(value.clone())),
            ExprKind::Bool { value } => Ok(Value::Bool(*value)),
            ExprKind::Identifier { name } | ExprKind::Global { name } => Ok(self.scope.get(name)),
            ExprKind::Function { name } => Err(ScriptError::Internal(format!(
                "function '{}' referenced outside of a call",
                name
            ))),

            ExprKind::Assignment {
                operator,
                target,
                value,
            } => {
                let value = self.eval_expr(value)?;
                let value = match operator {
                    AssignOp::Assign => value,
                    compound => {
                        let current = self.eval_expr(target)?;
                        match compound.binary() {
                            Some(op) => binary_op(op, &current, &value)?,
                            None => value,
                        }
                    }
                };
                self.assign(target, value.clone())?;
                Ok(value)
            }

            ExprKind::Binary {
                operator: op @ (BinaryOp::And | BinaryOp::Or),
                left,
                right,
            } => {
                let left = self.eval_expr(left)?;
                let l = truth(*op, &left)?;
                match op {
                    BinaryOp::And if !l => Ok(Value::Bool(false)),
                    BinaryOp::Or if l => Ok(Value::Bool(true)),
                    _ => {
                        let right = self.eval_expr(right)?;
                        Ok(Value::Bool(truth(*op, &right)?))
                    }
                }
            }

            ExprKind::Binary {
                operator,
                left,
                right,
            } => {
                let left = self.eval_expr(left)?;
                let right = self.eval_expr(right)?;
                binary_op(*operator, &left, &right)
            }

            ExprKind::Unary { operator, operand } => {
                let operand = self.eval_expr(operand)?;
                unary_op(*operator, &operand)
            }

            ExprKind::Block { body } => {
                let mut result = Value::Void;
                for item in body {
                    result = self.eval_expr(item)?;
                }
                Ok(result)
            }

            ExprKind::Call { callee, arguments } => {
                let name = match &callee.kind {
                    ExprKind::Function { name } => name,
                    other => {
                        return Err(ScriptError::Internal(format!(
                            "{} cannot be called",
                            other.name()
                        )))
                    }
                };
                let catalog = self.catalog;
                let builtin = catalog
                    .get(name)
                    .ok_or_else(|| ScriptError::UndefinedFunction(name.clone()))?;
                if let Some(lazy) = builtin.lazy {
                    builtin.descriptor.check_arity(arguments.len())?;
                    return lazy(arguments, &mut |arg: &Expr| self.eval_expr(arg));
                }
                let args = arguments
                    .iter()
                    .map(|arg| self.eval_expr(arg))
                    .collect::<Result<Vec<_>>>()?;
                if !builtin.updates_first {
                    return builtin.invoke(args, &mut self.scope);
                }
                let (result, mut args) = builtin.invoke_with_args(args, &mut self.scope)?;
                if let Some(first) = arguments.first().filter(|arg| is_assignable(arg)) {
                    self.assign(first, args.take(0))?;
                }
                Ok(result)
            }

            ExprKind::Member { object, key } => {
                let object = self.eval_expr(object)?;
                let key = self.eval_expr(key)?;
                index(&object, &key)
            }

            ExprKind::Array { elements } => elements
                .iter()
                .map(|item| self.eval_expr(item))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
        }
    }

    fn assign(&mut self, target: &Expr, value: Value) -> Result<()> {
        match &target.kind {
            ExprKind::Identifier { name } | ExprKind::Global { name } => {
                self.scope.set(name, value);
                Ok(())
            }
            ExprKind::Member { .. } => {
                let mut keys = Vec::new();
                let root = self.member_path(target, &mut keys)?;
                let mut container = self.scope.get(&root);
                store(&mut container, &keys, value)?;
                self.scope.set(&root, container);
                Ok(())
            }
            other => Err(ScriptError::Internal(format!(
                "{} is not an assignment target",
                other.name()
            ))),
        }
    }

    /// Root variable of a member chain; keys are collected outermost first
    fn member_path(&mut self, target: &Expr, keys: &mut Vec<Value>) -> Result<String> {
        match &target.kind {
            ExprKind::Identifier { name } | ExprKind::Global { name } => Ok(name.clone()),
            ExprKind::Member { object, key } => {
                let root = self.member_path(object, keys)?;
                keys.push(self.eval_expr(key)?);
                Ok(root)
            }
            other => Err(ScriptError::Internal(format!(
                "{} cannot be the root of an indexed assignment",
                other.name()
            ))),
        }
    }
}

fn is_assignable(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Identifier { .. } | ExprKind::Global { .. } => true,
        ExprKind::Member { object, .. } => is_assignable(object),
        _ => false,
    }
}

fn truth(op: BinaryOp, value: &Value) -> Result<bool> {
    value.to_bool().map_err(|fault| ScriptError::UnsupportedOperation {
        operator: op.symbol().to_string(),
        left: fault.from,
        right: ValueKind::Bool,
    })
}

fn array_index(key: &Value, length: usize) -> Result<usize> {
    let n = key.to_number().map_err(|fault| ScriptError::Conversion {
        context: "[]".to_string(),
        position: 1,
        from: fault.from,
        to: fault.to,
    })?;
    let index = n.trunc() as i64;
    if index < 0 {
        return Err(ScriptError::IndexOutOfBounds { index, length });
    }
    Ok(index as usize)
}

fn unsupported_index(object: &Value, key: &Value) -> ScriptError {
    ScriptError::UnsupportedOperation {
        operator: "[]".to_string(),
        left: object.kind(),
        right: key.kind(),
    }
}

/// `object[key]`. Arrays fault outside their bounds, dictionaries yield
/// null for missing keys, indexing null yields null.
pub fn index(object: &Value, key: &Value) -> Result<Value> {
    match object {
        Value::Array(items) => {
            let i = array_index(key, items.len())?;
            items.get(i).cloned().ok_or(ScriptError::IndexOutOfBounds {
                index: i as i64,
                length: items.len(),
            })
        }
        Value::Dictionary(entries) => Ok(entries.get(&key.to_string()).cloned().unwrap_or(Value::Null)),
        Value::Null | Value::Void => Ok(Value::Null),
        other => Err(unsupported_index(other, key)),
    }
}

/// Writes `value` at `keys` inside `container`. Null containers turn into a
/// dictionary for string keys and an array otherwise; arrays grow with nulls
/// up to `MAX_COLLECTION_LEN`.
fn store(container: &mut Value, keys: &[Value], value: Value) -> Result<()> {
    let Some((key, rest)) = keys.split_first() else {
        *container = value;
        return Ok(());
    };
    if container.is_nullish() {
        *container = match key {
            Value::String(_) => Value::Dictionary(Default::default()),
            _ => Value::Array(Vec::new()),
        };
    }
    let slot = match container {
        Value::Array(items) => {
            let i = array_index(key, items.len())?;
            if i >= MAX_COLLECTION_LEN {
                return Err(ScriptError::IndexOutOfBounds {
                    index: i as i64,
                    length: items.len(),
                });
            }
            if i >= items.len() {
                items.resize(i + 1, Value::Null);
            }
            &mut items[i]
        }
        Value::Dictionary(entries) => entries.entry(key.to_string()).or_insert(Value::Null),
        other => return Err(unsupported_index(other, key)),
    };
    store(slot, rest, value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::UnaryOp;
    use pretty_assertions::assert_eq;

    fn run(script: Expr) -> Result<Value> {
        Interpreter::new().eval(&script)
    }

    #[test]
    fn test_block_value_is_last_expression() {
        assert_eq!(run(Expr::block(vec![])), Ok(Value::Void));
        assert_eq!(
            run(Expr::block(vec![Expr::number(1.0), Expr::string("x")])),
            Ok(Value::from("x"))
        );
    }

    #[test]
    fn test_assignment_and_reads() {
        let script = Expr::block(vec![
            Expr::assign(Expr::ident("x"), Expr::number(2.0)),
            Expr::assign_op(AssignOp::AddAssign, Expr::ident("x"), Expr::number(3.0)),
            Expr::binary(BinaryOp::Mul, Expr::ident("x"), Expr::ident("x")),
        ]);
        assert_eq!(run(script), Ok(Value::Number(25.0)));
        assert_eq!(run(Expr::ident("never")), Ok(Value::Null));
    }

    #[test]
    fn test_system_variable_default() {
        assert_eq!(
            run(Expr::global("$jitterbit.scripting.while.max_iterations")),
            Ok(Value::Number(50000.0))
        );
    }

    #[test]
    fn test_logical_short_circuit() {
        // The right side would fault if it were evaluated
        let faulting = Expr::binary(BinaryOp::Div, Expr::number(1.0), Expr::number(0.0));
        assert_eq!(
            run(Expr::binary(BinaryOp::And, Expr::bool(false), faulting.clone())),
            Ok(Value::Bool(false))
        );
        assert_eq!(
            run(Expr::binary(BinaryOp::Or, Expr::string("t"), faulting.clone())),
            Ok(Value::Bool(true))
        );
        assert_eq!(
            run(Expr::binary(BinaryOp::And, Expr::bool(true), faulting)),
            Err(ScriptError::DivisionByZero)
        );
    }

    #[test]
    fn test_member_assignment_builds_containers() {
        let script = Expr::block(vec![
            Expr::assign(Expr::member(Expr::ident("a"), Expr::number(2.0)), Expr::string("c")),
            Expr::assign(
                Expr::member(Expr::member(Expr::ident("d"), Expr::string("k")), Expr::number(0.0)),
                Expr::number(1.0),
            ),
            Expr::array(vec![Expr::ident("a"), Expr::ident("d")]),
        ]);
        let result = run(script).unwrap();
        assert_eq!(result.to_string(), "{{,,\"c\"},[k=>{1}]}");
    }

    #[test]
    fn test_member_assignment_growth_is_bounded() {
        for index in [1e19, 1e12] {
            let script = Expr::assign(Expr::member(Expr::ident("a"), Expr::number(index)), Expr::number(1.0));
            assert!(matches!(
                run(script),
                Err(ScriptError::IndexOutOfBounds { length: 0, .. })
            ));
        }
    }

    #[test]
    fn test_member_reads() {
        let arr = Expr::array(vec![Expr::number(10.0), Expr::number(20.0)]);
        assert_eq!(run(Expr::member(arr.clone(), Expr::number(1.0))), Ok(Value::Number(20.0)));
        assert_eq!(
            run(Expr::member(arr, Expr::number(2.0))),
            Err(ScriptError::IndexOutOfBounds { index: 2, length: 2 })
        );
        assert_eq!(
            run(Expr::member(Expr::call("Dict", vec![]), Expr::string("missing"))),
            Ok(Value::Null)
        );
        assert!(run(Expr::member(Expr::number(1.0), Expr::number(0.0))).is_err());
    }

    #[test]
    fn test_calls_go_through_the_resolver() {
        assert_eq!(
            run(Expr::call("Length", vec![Expr::string("abc")])),
            Ok(Value::Number(3.0))
        );
        assert!(matches!(
            run(Expr::call("Length", vec![])),
            Err(ScriptError::ArityMismatch { .. })
        ));
        assert_eq!(
            run(Expr::call("Missing", vec![])),
            Err(ScriptError::UndefinedFunction("Missing".to_string()))
        );
    }

    #[test]
    fn test_unary_operators() {
        assert_eq!(run(Expr::unary(UnaryOp::Not, Expr::number(0.0))), Ok(Value::Bool(true)));
        assert_eq!(run(Expr::unary(UnaryOp::Neg, Expr::string("4"))), Ok(Value::Number(-4.0)));
    }

    #[test]
    fn test_fault_keeps_earlier_writes() {
        let script = Expr::block(vec![
            Expr::assign(Expr::ident("x"), Expr::number(1.0)),
            Expr::binary(BinaryOp::Div, Expr::number(1.0), Expr::number(0.0)),
        ]);
        let mut interpreter = Interpreter::new();
        assert!(interpreter.eval(&script).is_err());
        assert_eq!(interpreter.scope().get("x"), Value::Number(1.0));
    }
}
