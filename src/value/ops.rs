//! Binary and unary operator semantics
//!
//! Operators are resolved per left-operand kind into an `OpRule`. The rule
//! table is shared with the static analyzer (`static_ops`) so both sides
//! agree on which kind pairs are legal.

use std::cmp::Ordering;

use chrono::Duration;

use crate::ast::{BinaryOp, OpClass, UnaryOp};
use crate::error::{Result, ScriptError};
use crate::value::{Value, ValueKind};

/// How a binary operator evaluates for one pair of operand kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpRule {
    /// Both operands read as numbers
    Numeric,
    /// Both operands rendered as strings and joined
    Concat,
    NumericCompare,
    StringCompare,
    /// Equality after bool conversion of both sides
    BoolCompare,
    DateCompare,
    /// One side is null or void
    NullEquality,
    /// Structural equality
    DeepEquality,
    /// Applied element-wise over the array operand(s)
    Broadcast,
    /// Date moved by a number of seconds
    DateShift,
    /// Seconds between two dates
    DateDiff,
    BinaryConcat,
    /// `null + null`
    NullResult,
    Logical,
    Unsupported,
}

/// Resolves the rule for `left op right`
pub fn binary_rule(op: BinaryOp, left: ValueKind, right: ValueKind) -> OpRule {
    use OpRule::*;
    use ValueKind::*;

    let class = op.class();
    if class == OpClass::Logical {
        return if left.is_bool_convertible() && right.is_bool_convertible() {
            Logical
        } else {
            Unsupported
        };
    }
    if class == OpClass::Equality && (left.is_nullish() || right.is_nullish()) {
        return NullEquality;
    }

    let add = op == BinaryOp::Add;
    let arithmetic = class == OpClass::Arithmetic;
    let ordering = class == OpClass::Ordering;
    let equality = class == OpClass::Equality;

    match left {
        Number => match right {
            Number if arithmetic => Numeric,
            Number => NumericCompare,
            String if add => Concat,
            String if arithmetic => Numeric,
            String => NumericCompare,
            Bool if arithmetic => Numeric,
            Bool if equality => BoolCompare,
            Null | Void if arithmetic => Numeric,
            Null | Void if ordering => NumericCompare,
            Array if arithmetic => Broadcast,
            Date if add => DateShift,
            _ => Unsupported,
        },
        String => match right {
            String if add => Concat,
            String if arithmetic => Numeric,
            String => StringCompare,
            Number if add => Concat,
            Number if arithmetic => Numeric,
            Number => NumericCompare,
            Bool if add => Concat,
            Bool if equality => BoolCompare,
            Null | Void if add => Concat,
            Null | Void if arithmetic => Numeric,
            Null | Void if ordering => StringCompare,
            Array if arithmetic => Broadcast,
            Date if add => Concat,
            _ => Unsupported,
        },
        Bool => match right {
            Bool if equality => BoolCompare,
            Number if arithmetic => Numeric,
            Number if equality => BoolCompare,
            String if add => Concat,
            String if equality => BoolCompare,
            _ => Unsupported,
        },
        Null | Void => match right {
            Number if arithmetic => Numeric,
            Number if ordering => NumericCompare,
            String if add => Concat,
            String if arithmetic => Numeric,
            String if ordering => StringCompare,
            Null | Void if add => NullResult,
            Array if arithmetic => Broadcast,
            _ => Unsupported,
        },
        Array => match right {
            Array if arithmetic => Broadcast,
            Array if equality => DeepEquality,
            Number | String | Bool | Null | Void if arithmetic => Broadcast,
            _ => Unsupported,
        },
        Dictionary => match right {
            Dictionary if equality => DeepEquality,
            _ => Unsupported,
        },
        Binary => match right {
            Binary if add => BinaryConcat,
            Binary if equality => DeepEquality,
            _ => Unsupported,
        },
        Date => match right {
            Number if add || op == BinaryOp::Sub => DateShift,
            Date if op == BinaryOp::Sub => DateDiff,
            Date if equality || ordering => DateCompare,
            String if add => Concat,
            _ => Unsupported,
        },
    }
}

fn unsupported(op: BinaryOp, left: &Value, right: &Value) -> ScriptError {
    ScriptError::UnsupportedOperation {
        operator: op.symbol().to_string(),
        left: left.kind(),
        right: right.kind(),
    }
}

/// Evaluates `left op right`. `&&` and `||` are evaluated eagerly here; the
/// interpreter short-circuits before calling in.
pub fn binary_op(op: BinaryOp, left: &Value, right: &Value) -> Result<Value> {
    let number = |v: &Value| v.to_number().map_err(|_| unsupported(op, left, right));
    let boolean = |v: &Value| v.to_bool().map_err(|_| unsupported(op, left, right));
    let date = |v: &Value| v.to_date().map_err(|_| unsupported(op, left, right));

    match binary_rule(op, left.kind(), right.kind()) {
        OpRule::Numeric => arithmetic(op, number(left)?, number(right)?).map(Value::Number),
        OpRule::Concat => Ok(Value::String(format!("{}{}", left, right))),
        OpRule::NumericCompare => Ok(compare(op, number(left)?.partial_cmp(&number(right)?))),
        OpRule::StringCompare => Ok(compare(op, Some(left.to_string().cmp(&right.to_string())))),
        OpRule::BoolCompare => Ok(equality(op, boolean(left)? == boolean(right)?)),
        OpRule::DateCompare => Ok(compare(op, Some(date(left)?.cmp(&date(right)?)))),
        OpRule::NullEquality => Ok(equality(op, null_equal(left, right))),
        OpRule::DeepEquality => Ok(equality(op, left == right)),
        OpRule::Broadcast => broadcast(op, left, right),
        OpRule::DateShift => {
            let (when, seconds) = match (left, right) {
                (Value::Date(d), n) => (*d, number(n)?),
                (n, Value::Date(d)) => (*d, number(n)?),
                _ => return Err(unsupported(op, left, right)),
            };
            let shifted = Duration::try_milliseconds((seconds * 1000.0) as i64).and_then(|delta| {
                if op == BinaryOp::Sub {
                    when.checked_sub_signed(delta)
                } else {
                    when.checked_add_signed(delta)
                }
            });
            shifted.map(Value::Date).ok_or_else(|| {
                ScriptError::invalid_argument(
                    op.symbol(),
                    format!("date shifted by {} seconds is out of range", seconds),
                )
            })
        }
        OpRule::DateDiff => {
            let diff = date(left)? - date(right)?;
            Ok(Value::Number(diff.num_milliseconds() as f64 / 1000.0))
        }
        OpRule::BinaryConcat => match (left, right) {
            (Value::Binary(a), Value::Binary(b)) => {
                let mut joined = a.clone();
                joined.extend_from_slice(b);
                Ok(Value::Binary(joined))
            }
            _ => Err(unsupported(op, left, right)),
        },
        OpRule::NullResult => Ok(Value::Null),
        OpRule::Logical => {
            let (l, r) = (boolean(left)?, boolean(right)?);
            Ok(Value::Bool(if op == BinaryOp::And { l && r } else { l || r }))
        }
        OpRule::Unsupported => Err(unsupported(op, left, right)),
    }
}

fn arithmetic(op: BinaryOp, l: f64, r: f64) -> Result<f64> {
    match op {
        BinaryOp::Add => Ok(l + r),
        BinaryOp::Sub => Ok(l - r),
        BinaryOp::Mul => Ok(l * r),
        BinaryOp::Div if r == 0.0 => Err(ScriptError::DivisionByZero),
        BinaryOp::Div => Ok(l / r),
        BinaryOp::Pow => Ok(l.powf(r)),
        _ => Err(ScriptError::Internal(format!("{} is not arithmetic", op))),
    }
}

/// Unordered operands (NaN) compare false for everything but `!=`
fn compare(op: BinaryOp, ordering: Option<Ordering>) -> Value {
    let result = match (op, ordering) {
        (BinaryOp::Ne, None) => true,
        (_, None) => false,
        (BinaryOp::Eq, Some(o)) => o == Ordering::Equal,
        (BinaryOp::Ne, Some(o)) => o != Ordering::Equal,
        (BinaryOp::Lt, Some(o)) => o == Ordering::Less,
        (BinaryOp::Le, Some(o)) => o != Ordering::Greater,
        (BinaryOp::Gt, Some(o)) => o == Ordering::Greater,
        (BinaryOp::Ge, Some(o)) => o != Ordering::Less,
        _ => false,
    };
    Value::Bool(result)
}

fn equality(op: BinaryOp, equal: bool) -> Value {
    Value::Bool(if op == BinaryOp::Ne { !equal } else { equal })
}

/// Null and void equal each other and the empty string, nothing else
fn null_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (l, r) if l.is_nullish() && r.is_nullish() => true,
        (Value::String(s), n) | (n, Value::String(s)) if n.is_nullish() => s.is_empty(),
        _ => false,
    }
}

fn broadcast(op: BinaryOp, left: &Value, right: &Value) -> Result<Value> {
    match (left, right) {
        (Value::Array(a), Value::Array(b)) => {
            if a.len() != b.len() {
                return Err(ScriptError::InvalidArgument {
                    function: format!("operator {}", op),
                    message: format!("array lengths differ ({} and {})", a.len(), b.len()),
                });
            }
            a.iter()
                .zip(b)
                .map(|(l, r)| binary_op(op, l, r))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array)
        }
        (Value::Array(a), scalar) => a
            .iter()
            .map(|l| binary_op(op, l, scalar))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        (scalar, Value::Array(b)) => b
            .iter()
            .map(|r| binary_op(op, scalar, r))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        _ => Err(unsupported(op, left, right)),
    }
}

/// How a unary operator evaluates for one operand kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryRule {
    Not,
    Negate,
    Broadcast,
    Unsupported,
}

pub fn unary_rule(op: UnaryOp, operand: ValueKind) -> UnaryRule {
    match op {
        UnaryOp::Not if operand.is_bool_convertible() => UnaryRule::Not,
        UnaryOp::Neg => match operand {
            ValueKind::Number | ValueKind::Bool | ValueKind::String | ValueKind::Null | ValueKind::Void => {
                UnaryRule::Negate
            }
            ValueKind::Array => UnaryRule::Broadcast,
            _ => UnaryRule::Unsupported,
        },
        _ => UnaryRule::Unsupported,
    }
}

pub fn unary_op(op: UnaryOp, operand: &Value) -> Result<Value> {
    let unsupported = || ScriptError::UnsupportedUnary {
        operator: op.to_string(),
        operand: operand.kind(),
    };
    match unary_rule(op, operand.kind()) {
        UnaryRule::Not => operand
            .to_bool()
            .map(|b| Value::Bool(!b))
            .map_err(|_| unsupported()),
        UnaryRule::Negate => operand
            .to_number()
            .map(|n| Value::Number(-n))
            .map_err(|_| unsupported()),
        UnaryRule::Broadcast => match operand {
            Value::Array(items) => items
                .iter()
                .map(|item| unary_op(op, item))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            _ => Err(unsupported()),
        },
        UnaryRule::Unsupported => Err(unsupported()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap;

    fn num(n: f64) -> Value {
        Value::Number(n)
    }

    #[test]
    fn test_number_arithmetic() {
        assert_eq!(binary_op(BinaryOp::Add, &num(1.0), &num(2.0)), Ok(num(3.0)));
        assert_eq!(binary_op(BinaryOp::Pow, &num(2.0), &num(3.0)), Ok(num(8.0)));
        assert_eq!(
            binary_op(BinaryOp::Div, &num(1.0), &num(0.0)),
            Err(ScriptError::DivisionByZero)
        );
    }

    #[test]
    fn test_plus_with_string_concatenates() {
        assert_eq!(
            binary_op(BinaryOp::Add, &num(1.0), &Value::from("2")),
            Ok(Value::from("12"))
        );
        assert_eq!(
            binary_op(BinaryOp::Add, &Value::from("a"), &Value::Bool(true)),
            Ok(Value::from("a1"))
        );
        assert_eq!(
            binary_op(BinaryOp::Mul, &Value::from("3"), &num(2.0)),
            Ok(num(6.0))
        );
    }

    #[test]
    fn test_bool_ordering_is_unsupported() {
        let result = binary_op(BinaryOp::Lt, &Value::Bool(false), &Value::Bool(true));
        assert_eq!(
            result,
            Err(ScriptError::UnsupportedOperation {
                operator: "<".to_string(),
                left: ValueKind::Bool,
                right: ValueKind::Bool,
            })
        );
        assert_eq!(
            binary_op(BinaryOp::Eq, &Value::Bool(true), &Value::from("t")),
            Ok(Value::Bool(true))
        );
    }

    #[test]
    fn test_null_equality() {
        assert_eq!(binary_op(BinaryOp::Eq, &Value::Null, &Value::Void), Ok(Value::Bool(true)));
        assert_eq!(binary_op(BinaryOp::Eq, &Value::from(""), &Value::Null), Ok(Value::Bool(true)));
        assert_eq!(binary_op(BinaryOp::Ne, &num(0.0), &Value::Null), Ok(Value::Bool(true)));
        assert_eq!(
            binary_op(BinaryOp::Eq, &Value::Dictionary(BTreeMap::new()), &Value::Null),
            Ok(Value::Bool(false))
        );
    }

    #[test]
    fn test_broadcast_over_arrays() {
        let arr = Value::Array(vec![num(1.0), num(2.0)]);
        assert_eq!(
            binary_op(BinaryOp::Mul, &arr, &num(10.0)),
            Ok(Value::Array(vec![num(10.0), num(20.0)]))
        );
        assert_eq!(
            binary_op(BinaryOp::Sub, &num(10.0), &arr),
            Ok(Value::Array(vec![num(9.0), num(8.0)]))
        );
        assert_eq!(
            binary_op(BinaryOp::Add, &arr, &arr),
            Ok(Value::Array(vec![num(2.0), num(4.0)]))
        );
        let short = Value::Array(vec![num(1.0)]);
        assert!(binary_op(BinaryOp::Add, &arr, &short).is_err());
    }

    #[test]
    fn test_date_shift_and_difference() {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let later = binary_op(BinaryOp::Add, &Value::Date(base), &num(60.0)).unwrap();
        assert_eq!(later, Value::Date(base + Duration::seconds(60)));
        assert_eq!(
            binary_op(BinaryOp::Sub, &later, &Value::Date(base)),
            Ok(num(60.0))
        );
        assert_eq!(
            binary_op(BinaryOp::Gt, &later, &Value::Date(base)),
            Ok(Value::Bool(true))
        );
    }

    #[test]
    fn test_date_shift_out_of_range_faults() {
        let base = Value::Date(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert!(matches!(
            binary_op(BinaryOp::Add, &base, &num(1e15)),
            Err(ScriptError::InvalidArgument { .. })
        ));
        assert!(matches!(
            binary_op(BinaryOp::Sub, &base, &num(-1e300)),
            Err(ScriptError::InvalidArgument { .. })
        ));
        assert!(binary_op(BinaryOp::Add, &num(-1e300), &base).is_err());
    }

    #[test]
    fn test_logical_rejects_arrays() {
        assert_eq!(
            binary_op(BinaryOp::And, &Value::from("t"), &num(1.0)),
            Ok(Value::Bool(true))
        );
        assert!(binary_op(BinaryOp::Or, &Value::Array(vec![]), &num(1.0)).is_err());
    }

    #[test]
    fn test_unary_ops() {
        assert_eq!(unary_op(UnaryOp::Not, &Value::from("0")), Ok(Value::Bool(true)));
        assert_eq!(unary_op(UnaryOp::Neg, &Value::Bool(true)), Ok(num(-1.0)));
        assert_eq!(
            unary_op(UnaryOp::Neg, &Value::Array(vec![num(1.0)])),
            Ok(Value::Array(vec![num(-1.0)]))
        );
        assert!(unary_op(UnaryOp::Not, &Value::Binary(vec![1])).is_err());
    }

    #[test]
    fn test_rule_table_has_no_panicking_pair() {
        let ops = [
            BinaryOp::Add,
            BinaryOp::Sub,
            BinaryOp::Mul,
            BinaryOp::Div,
            BinaryOp::Pow,
            BinaryOp::Eq,
            BinaryOp::Ne,
            BinaryOp::Lt,
            BinaryOp::Le,
            BinaryOp::Gt,
            BinaryOp::Ge,
            BinaryOp::And,
            BinaryOp::Or,
        ];
        let samples = vec![
            num(2.0),
            Value::from("3"),
            Value::Bool(true),
            Value::Null,
            Value::Void,
            Value::Array(vec![num(1.0)]),
            Value::Dictionary(BTreeMap::new()),
            Value::Binary(vec![1]),
            Value::Date(Utc.timestamp_opt(0, 0).unwrap()),
        ];
        for op in ops {
            for l in &samples {
                for r in &samples {
                    let rule = binary_rule(op, l.kind(), r.kind());
                    let result = binary_op(op, l, r);
                    if rule == OpRule::Unsupported {
                        assert!(result.is_err(), "{} {} {}", l.kind(), op, r.kind());
                    }
                }
            }
        }
    }
}
