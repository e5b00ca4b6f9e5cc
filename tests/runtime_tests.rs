//! Integration tests for script evaluation
//!
//! Scripts are built as ASTs and run through the public `Interpreter`.

use jbscript::ast::{AssignOp, BinaryOp, Expr};
use jbscript::{Interpreter, Scope, ScriptError, Value, ValueKind};
use pretty_assertions::assert_eq;

fn n(v: f64) -> Expr {
    Expr::number(v)
}

fn s(v: &str) -> Expr {
    Expr::string(v)
}

fn call(name: &str, args: Vec<Expr>) -> Expr {
    Expr::call(name, args)
}

fn run(script: Vec<Expr>) -> Result<Value, ScriptError> {
    Interpreter::new().eval(&Expr::block(script))
}

fn nums(values: &[f64]) -> Value {
    Value::Array(values.iter().copied().map(Value::Number).collect())
}

// ============================================================================
// Variables and assignment
// ============================================================================

#[test]
fn test_locals_and_compound_assignment() {
    let result = run(vec![
        Expr::assign(Expr::ident("total"), n(10.0)),
        Expr::assign_op(AssignOp::AddAssign, Expr::ident("total"), n(5.0)),
        Expr::assign_op(AssignOp::SubAssign, Expr::ident("total"), n(3.0)),
        Expr::ident("total"),
    ]);
    assert_eq!(result, Ok(Value::Number(12.0)));
}

#[test]
fn test_string_concatenation_with_numbers() {
    let result = run(vec![Expr::binary(BinaryOp::Add, s("order-"), n(42.0))]);
    assert_eq!(result, Ok(Value::from("order-42")));
}

#[test]
fn test_member_assignment_builds_containers() {
    let result = run(vec![
        Expr::assign(Expr::member(Expr::ident("rows"), n(2.0)), s("c")),
        Expr::ident("rows"),
    ]);
    assert_eq!(
        result,
        Ok(Value::Array(vec![Value::Null, Value::Null, Value::from("c")]))
    );

    let result = run(vec![
        Expr::assign(Expr::member(Expr::ident("d"), s("k")), n(1.0)),
        call("HasKey", vec![Expr::ident("d"), s("k")]),
    ]);
    assert_eq!(result, Ok(Value::Bool(true)));
}

#[test]
fn test_host_globals_and_sysvar_defaults() {
    let scope = Scope::with_globals(vec![("$customer".to_string(), Value::from("acme"))]);
    let mut interpreter = Interpreter::new().with_scope(scope);
    let script = Expr::block(vec![
        Expr::assign(Expr::global("$greeting"), Expr::binary(BinaryOp::Add, s("hi "), Expr::global("$customer"))),
        Expr::global("$jitterbit.scripting.while.max_iterations"),
    ]);
    assert_eq!(interpreter.eval(&script), Ok(Value::Number(50000.0)));

    let scope = interpreter.into_scope();
    assert_eq!(scope.get("$greeting"), Value::from("hi acme"));
    assert_eq!(scope.globals().count(), 2);
}

// ============================================================================
// In-place functions
// ============================================================================

#[test]
fn test_sort_array_updates_variable() {
    let result = run(vec![
        Expr::assign(Expr::ident("a"), Expr::array(vec![n(3.0), n(1.0), n(2.0)])),
        call("SortArray", vec![Expr::ident("a")]),
        Expr::ident("a"),
    ]);
    assert_eq!(result, Ok(nums(&[1.0, 2.0, 3.0])));
}

#[test]
fn test_sort_array_descending_and_by_column() {
    let result = run(vec![
        Expr::assign(Expr::ident("a"), Expr::array(vec![n(3.0), n(1.0), n(2.0)])),
        call("SortArray", vec![Expr::ident("a"), Expr::bool(false)]),
        Expr::ident("a"),
    ]);
    assert_eq!(result, Ok(nums(&[3.0, 2.0, 1.0])));

    let rows = Expr::array(vec![
        Expr::array(vec![s("b"), n(2.0)]),
        Expr::array(vec![s("a"), n(1.0)]),
    ]);
    let result = run(vec![
        Expr::assign(Expr::ident("rows"), rows),
        call("SortArray", vec![Expr::ident("rows"), n(0.0)]),
        Expr::member(Expr::member(Expr::ident("rows"), n(0.0)), n(0.0)),
    ]);
    assert_eq!(result, Ok(Value::from("a")));
}

#[test]
fn test_dictionary_updates_through_member_target() {
    let result = run(vec![
        Expr::assign(Expr::ident("outer"), Expr::array(vec![call("Dict", vec![])])),
        call(
            "AddToDict",
            vec![Expr::member(Expr::ident("outer"), n(0.0)), s("id"), n(7.0)],
        ),
        call("RemoveKey", vec![Expr::member(Expr::ident("outer"), n(0.0)), s("missing")]),
        call("GetValues", vec![Expr::member(Expr::ident("outer"), n(0.0))]),
    ]);
    assert_eq!(result, Ok(nums(&[7.0])));
}

#[test]
fn test_literal_argument_is_not_written_back() {
    let result = run(vec![call("SortArray", vec![Expr::array(vec![n(2.0), n(1.0)])])]);
    assert_eq!(result, Ok(Value::Void));
}

// ============================================================================
// Functions
// ============================================================================

#[test]
fn test_regex_match_binds_groups() {
    let mut interpreter = Interpreter::new();
    let matched = interpreter.eval(&call(
        "RegExMatch",
        vec![s("abc-123"), s("([a-z]+)-(\\d+)"), s("word"), s("$num")],
    ));
    assert_eq!(matched, Ok(Value::Number(2.0)));
    assert_eq!(interpreter.scope().get("word"), Value::from("abc"));
    assert_eq!(interpreter.scope().get("$num"), Value::from("123"));

    let missed = interpreter.eval(&call("RegExMatch", vec![s("abc"), s("\\d+")]));
    assert_eq!(missed, Ok(Value::Number(-1.0)));
}

#[test]
fn test_reduce_dimension_example() {
    let leaf = |values: Vec<Expr>| Expr::array(values);
    let input = Expr::array(vec![
        Expr::array(vec![leaf(vec![n(1.0)]), leaf(vec![n(2.0), s("xd")])]),
        Expr::array(vec![leaf(vec![n(3.0)]), leaf(vec![n(4.0)]), leaf(vec![n(5.0)])]),
    ]);
    let result = run(vec![call("ReduceDimension", vec![input])]).unwrap();
    assert_eq!(result.to_string(), "{{1,2,\"xd\"},{3,4,5}}");

    let flat = run(vec![call("ReduceDimension", vec![Expr::array(vec![n(1.0)])])]);
    assert!(flat.is_err());
}

#[test]
fn test_lazy_conditionals() {
    let fault = Expr::binary(BinaryOp::Div, n(1.0), n(0.0));
    let result = run(vec![
        Expr::assign(Expr::ident("ok"), call("IsValid", vec![fault.clone()])),
        call("If", vec![Expr::ident("ok"), fault, s("skipped")]),
    ]);
    assert_eq!(result, Ok(Value::from("skipped")));
}

#[test]
fn test_string_and_math_functions_compose() {
    let result = run(vec![
        Expr::assign(Expr::ident("parts"), call("Split", vec![s(" 3.456 ,x"), s(",")])),
        call(
            "Round",
            vec![call("Trim", vec![Expr::member(Expr::ident("parts"), n(0.0))]), n(2.0)],
        ),
    ]);
    assert_eq!(result, Ok(Value::Number(3.46)));
}

#[test]
fn test_encoding_round_trip_through_script() {
    let result = run(vec![call(
        "HexToString",
        vec![call("StringToHex", vec![s("integration")])],
    )]);
    assert_eq!(result, Ok(Value::from("integration")));
}

// ============================================================================
// Faults
// ============================================================================

#[test]
fn test_fault_keeps_earlier_writes() {
    let mut interpreter = Interpreter::new();
    let script = Expr::block(vec![
        Expr::assign(Expr::ident("before"), n(1.0)),
        Expr::binary(BinaryOp::Div, n(1.0), n(0.0)),
        Expr::assign(Expr::ident("after"), n(2.0)),
    ]);
    assert_eq!(interpreter.eval(&script), Err(ScriptError::DivisionByZero));
    assert_eq!(interpreter.scope().get("before"), Value::Number(1.0));
    assert!(!interpreter.scope().contains("after"));
}

#[test]
fn test_conversion_fault_names_function_and_position() {
    let result = run(vec![call("Floor", vec![Expr::array(vec![])])]);
    assert_eq!(
        result,
        Err(ScriptError::Conversion {
            context: "Floor".to_string(),
            position: 1,
            from: ValueKind::Array,
            to: ValueKind::Number,
        })
    );
}

#[test]
fn test_call_faults() {
    assert!(matches!(
        run(vec![call("Length", vec![])]),
        Err(ScriptError::ArityMismatch { got: 0, .. })
    ));
    assert_eq!(
        run(vec![call("NoSuchFunction", vec![])]),
        Err(ScriptError::UndefinedFunction("NoSuchFunction".to_string()))
    );
    assert_eq!(
        run(vec![call("SendEmail", vec![s("a"), s("b"), s("c"), s("d")])]),
        Err(ScriptError::Unimplemented("SendEmail".to_string()))
    );
}

#[test]
fn test_index_out_of_bounds() {
    let result = run(vec![Expr::member(Expr::array(vec![n(1.0)]), n(3.0))]);
    assert!(matches!(result, Err(ScriptError::IndexOutOfBounds { index: 3, length: 1 })));
}
