//! Static counterparts of the operator rules
//!
//! Given operand kinds, produce the result `TypeInfo` the analyzer records on
//! the operator node. Warnings stay on that node; callers do not propagate
//! them upward.

use crate::ast::{BinaryOp, UnaryOp};
use crate::types::{StaticType, TypeInfo};
use crate::value::ops::{binary_rule, unary_rule, OpRule, UnaryRule};
use crate::value::ValueKind;

pub fn static_binary(op: BinaryOp, left: ValueKind, right: ValueKind) -> TypeInfo {
    match binary_rule(op, left, right) {
        OpRule::Numeric => {
            let info = TypeInfo::of(StaticType::Number);
            if left == ValueKind::String || right == ValueKind::String {
                info.with_warning(format!(
                    "Implicit conversion of string to number in '{}'",
                    op
                ))
            } else if left.is_nullish() || right.is_nullish() {
                info.with_warning(format!("Null operand of '{}' is treated as 0", op))
            } else {
                info
            }
        }
        OpRule::Concat => TypeInfo::of(StaticType::String),
        OpRule::NumericCompare
        | OpRule::StringCompare
        | OpRule::BoolCompare
        | OpRule::DateCompare
        | OpRule::NullEquality
        | OpRule::DeepEquality
        | OpRule::Logical => TypeInfo::of(StaticType::Bool),
        OpRule::Broadcast => {
            let info = TypeInfo::of(StaticType::Array);
            if left == ValueKind::Array && right == ValueKind::Array {
                info.with_warning("Array operands must have the same length at runtime")
            } else {
                info
            }
        }
        OpRule::DateShift => TypeInfo::of(StaticType::Date),
        OpRule::DateDiff => TypeInfo::of(StaticType::Number),
        OpRule::BinaryConcat => TypeInfo::of(StaticType::Binary),
        OpRule::NullResult => TypeInfo::of(StaticType::Null),
        OpRule::Unsupported => TypeInfo::error(format!(
            "Operator '{}' is not supported between {} and {}",
            op, left, right
        )),
    }
}

pub fn static_unary(op: UnaryOp, operand: ValueKind) -> TypeInfo {
    match unary_rule(op, operand) {
        UnaryRule::Not => TypeInfo::of(StaticType::Bool),
        UnaryRule::Negate => {
            let info = TypeInfo::of(StaticType::Number);
            match operand {
                ValueKind::String => info.with_warning("Implicit conversion of string to number in '-'"),
                ValueKind::Null | ValueKind::Void => info.with_warning("Null operand of '-' is treated as 0"),
                _ => info,
            }
        }
        UnaryRule::Broadcast => TypeInfo::of(StaticType::Array),
        UnaryRule::Unsupported => TypeInfo::error(format!(
            "Operator '{}' is not supported for {}",
            op, operand
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ops::binary_op;
    use crate::value::Value;

    #[test]
    fn test_static_result_matches_runtime_kind() {
        let cases = [
            (BinaryOp::Add, Value::Number(1.0), Value::from("x"), StaticType::String),
            (BinaryOp::Sub, Value::from("4"), Value::Number(1.0), StaticType::Number),
            (BinaryOp::Lt, Value::Number(1.0), Value::Null, StaticType::Bool),
            (BinaryOp::Add, Value::Null, Value::Null, StaticType::Null),
            (
                BinaryOp::Mul,
                Value::Array(vec![Value::Number(1.0)]),
                Value::Number(2.0),
                StaticType::Array,
            ),
        ];
        for (op, l, r, expected) in cases {
            let info = static_binary(op, l.kind(), r.kind());
            assert_eq!(info.ty, expected);
            let value = binary_op(op, &l, &r).unwrap();
            assert_eq!(StaticType::from(value.kind()), expected);
        }
    }

    #[test]
    fn test_unsupported_pair_is_error() {
        let info = static_binary(BinaryOp::Lt, ValueKind::Bool, ValueKind::Bool);
        assert_eq!(info.ty, StaticType::Error);
        assert_eq!(
            info.error.as_deref(),
            Some("Operator '<' is not supported between bool and bool")
        );
    }

    #[test]
    fn test_string_arithmetic_warns() {
        let info = static_binary(BinaryOp::Div, ValueKind::String, ValueKind::Number);
        assert_eq!(info.ty, StaticType::Number);
        assert!(info.warning.is_some());
        assert!(static_binary(BinaryOp::Add, ValueKind::String, ValueKind::Number)
            .warning
            .is_none());
    }

    #[test]
    fn test_unary_static() {
        assert_eq!(static_unary(UnaryOp::Not, ValueKind::Number).ty, StaticType::Bool);
        assert_eq!(static_unary(UnaryOp::Neg, ValueKind::Date).ty, StaticType::Error);
        assert!(static_unary(UnaryOp::Neg, ValueKind::String).warning.is_some());
    }
}
