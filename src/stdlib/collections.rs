//! Array and dictionary functions
//!
//! `SortArray`, `AddToDict` and `RemoveKey` work on their first argument in
//! place; the evaluator stores the result back into the variable passed.

use std::collections::BTreeMap;

use crate::error::{Result, ScriptError};
use crate::scope::Scope;
use crate::signature::{any, Parameter, Signature};
use crate::stdlib::{analyze_by_signature, Args, Builtin};
use crate::typechecker::typed_ast::TypedExpr;
use crate::types::{StaticType, TypeEnv, TypeInfo};
use crate::value::arrays::{reduce_dimension, sort_rows_by_column, sort_values};
use crate::value::{Value, ValueKind};

/// Initialize the collection functions
pub fn init() -> Vec<Builtin> {
    vec![
        // Array() -> array
        Builtin::new("Array", Signature::new(ValueKind::Array, vec![]), |_, _| {
            Ok(Value::Array(Vec::new()))
        }),
        // SortArray(arr[, isAscending]), SortArray(arr, index[, isAscending])
        Builtin::overloaded(
            "SortArray",
            vec![
                Signature::new(
                    ValueKind::Void,
                    vec![
                        Parameter::required("arr", ValueKind::Array),
                        Parameter::defaulted("isAscending", ValueKind::Bool, Value::Bool(true)),
                    ],
                ),
                Signature::new(
                    ValueKind::Void,
                    vec![
                        Parameter::required("arr", ValueKind::Array),
                        Parameter::required("index", ValueKind::Number),
                        Parameter::defaulted("isAscending", ValueKind::Bool, Value::Bool(true)),
                    ],
                ),
            ],
            sort_array,
        )
        .with_selectors(choose_sort, infer_sort)
        .analyze_with(analyze_sort)
        .updating_first(),
        // ReduceDimension(arr) -> array
        Builtin::new(
            "ReduceDimension",
            Signature::new(ValueKind::Array, vec![Parameter::required("arr", ValueKind::Array)]),
            |args, _| reduce_dimension(args.value(0)),
        ),
        // Dict() -> dictionary
        Builtin::new("Dict", Signature::new(ValueKind::Dictionary, vec![]), |_, _| {
            Ok(Value::Dictionary(BTreeMap::new()))
        }),
        // AddToDict(dict, key, value) -> bool
        Builtin::new(
            "AddToDict",
            Signature::new(
                ValueKind::Bool,
                vec![
                    Parameter::required("dict", ValueKind::Dictionary),
                    Parameter::required("key", ValueKind::String),
                    Parameter::required("value", any()),
                ],
            ),
            |args, _| {
                let key = args.string(1);
                let value = args.take(2);
                let entries = dictionary_mut(args)?;
                Ok(Value::Bool(entries.insert(key, value).is_none()))
            },
        )
        .updating_first(),
        // HasKey(dict, key) -> bool
        Builtin::new(
            "HasKey",
            Signature::new(
                ValueKind::Bool,
                vec![
                    Parameter::required("dict", ValueKind::Dictionary),
                    Parameter::required("key", ValueKind::String),
                ],
            ),
            |args, _| Ok(Value::Bool(args.dictionary(0)?.contains_key(&args.string(1)))),
        ),
        // RemoveKey(dict, key) -> bool
        Builtin::new(
            "RemoveKey",
            Signature::new(
                ValueKind::Bool,
                vec![
                    Parameter::required("dict", ValueKind::Dictionary),
                    Parameter::required("key", ValueKind::String),
                ],
            ),
            |args, _| {
                let key = args.string(1);
                let entries = dictionary_mut(args)?;
                Ok(Value::Bool(entries.remove(&key).is_some()))
            },
        )
        .updating_first(),
        // GetKeys(dict) -> array
        Builtin::new(
            "GetKeys",
            Signature::new(ValueKind::Array, vec![Parameter::required("dict", ValueKind::Dictionary)]),
            |args, _| {
                let keys = args.dictionary(0)?.keys().map(|k| Value::String(k.clone()));
                Ok(Value::Array(keys.collect()))
            },
        ),
        // GetValues(dict[, keys]) -> array
        Builtin::new(
            "GetValues",
            Signature::new(
                ValueKind::Array,
                vec![
                    Parameter::required("dict", ValueKind::Dictionary),
                    Parameter::optional("keys", ValueKind::Array),
                ],
            ),
            |args, _| {
                let entries = args.dictionary(0)?;
                if !args.has(1) {
                    return Ok(Value::Array(entries.values().cloned().collect()));
                }
                let values = args
                    .array(1)?
                    .iter()
                    .map(|key| entries.get(&key.to_string()).cloned().unwrap_or(Value::Null))
                    .collect();
                Ok(Value::Array(values))
            },
        ),
    ]
}

fn dictionary_mut(args: &mut Args) -> Result<&mut BTreeMap<String, Value>> {
    let function = args.function();
    match args.value_mut(0) {
        Some(Value::Dictionary(entries)) => Ok(entries),
        other => Err(ScriptError::Conversion {
            context: function.to_string(),
            position: 1,
            from: other.map_or(ValueKind::Null, |v| v.kind()),
            to: ValueKind::Dictionary,
        }),
    }
}

fn sort_array(args: &mut Args, _: &mut Scope) -> Result<Value> {
    let (column, ascending) = match args.signature() {
        1 => (Some(args.integer(1)?), args.bool(2)?),
        _ => (None, args.bool(1)?),
    };
    let function = args.function();
    let items = match args.value_mut(0) {
        Some(Value::Array(items)) => items,
        other => {
            return Err(ScriptError::Conversion {
                context: function.to_string(),
                position: 1,
                from: other.map_or(ValueKind::Null, |v| v.kind()),
                to: ValueKind::Array,
            })
        }
    };
    match column {
        Some(index) => sort_rows_by_column(items, index, ascending)?,
        None => sort_values(items, ascending),
    }
    Ok(Value::Void)
}

/// Three arguments, or a number in second position, select the column sort
fn choose_sort(args: &[Value]) -> usize {
    match args {
        [_, _, _] => 1,
        [_, Value::Number(_)] => 1,
        _ => 0,
    }
}

fn infer_sort(args: &[TypeInfo]) -> usize {
    match args {
        [_, _, _] => 1,
        [_, second] if second.ty == StaticType::Number => 1,
        _ => 0,
    }
}

fn analyze_sort(func: &Builtin, args: &mut [TypedExpr], env: &mut TypeEnv) -> TypeInfo {
    let info = analyze_by_signature(func, args, env);
    if let [_, second] = args {
        if second.ty() == StaticType::Unknown {
            second.add_warning(
                "SortArray: cannot tell statically whether this is a column index or the sort order",
            );
        }
    }
    info
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stdlib::catalog;
    use pretty_assertions::assert_eq;

    fn n(v: f64) -> Value {
        Value::Number(v)
    }

    fn s(v: &str) -> Value {
        Value::from(v)
    }

    fn sort(args: Vec<Value>) -> Result<Value> {
        let sort = catalog().get("SortArray").unwrap();
        let (_, mut args) = sort.invoke_with_args(args, &mut Scope::new())?;
        Ok(args.take(0))
    }

    #[test]
    fn test_sort_array_example() {
        let input = Value::Array(vec![n(-1.1), s("16"), n(0.0), n(22.0), Value::Bool(true)]);
        assert_eq!(
            sort(vec![input.clone()]),
            Ok(Value::Array(vec![n(-1.1), n(0.0), Value::Bool(true), s("16"), n(22.0)]))
        );
        assert_eq!(
            sort(vec![input, Value::Bool(false)]),
            Ok(Value::Array(vec![n(22.0), s("16"), Value::Bool(true), n(0.0), n(-1.1)]))
        );
    }

    #[test]
    fn test_sort_array_by_column() {
        let rows = Value::Array(vec![
            Value::Array(vec![s("b"), n(2.0)]),
            Value::Array(vec![s("a"), n(1.0)]),
        ]);
        let sorted = sort(vec![rows.clone(), n(1.0)]).unwrap();
        assert_eq!(sorted.to_string(), "{{\"a\",1},{\"b\",2}}");
        assert!(sort(vec![rows, n(5.0), Value::Bool(true)]).is_err());
    }

    #[test]
    fn test_sort_selection() {
        assert_eq!(choose_sort(&[Value::Array(vec![]), n(0.0)]), 1);
        assert_eq!(choose_sort(&[Value::Array(vec![]), Value::Bool(true)]), 0);
        assert_eq!(choose_sort(&[Value::Array(vec![]), s("1")]), 0);
        assert_eq!(
            choose_sort(&[Value::Array(vec![]), n(0.0), Value::Bool(false)]),
            1
        );
    }

    #[test]
    fn test_dictionary_functions() {
        let mut scope = Scope::new();
        let add = catalog().get("AddToDict").unwrap();
        let (added, mut args) = add
            .invoke_with_args(vec![Value::Dictionary(BTreeMap::new()), s("k"), n(1.0)], &mut scope)
            .unwrap();
        assert_eq!(added, Value::Bool(true));
        let dict = args.take(0);

        let (again, _) = add
            .invoke_with_args(vec![dict.clone(), s("k"), n(2.0)], &mut scope)
            .unwrap();
        assert_eq!(again, Value::Bool(false));

        let has = catalog().get("HasKey").unwrap();
        assert_eq!(has.invoke(vec![dict.clone(), s("k")], &mut scope), Ok(Value::Bool(true)));
        assert_eq!(
            catalog().get("GetKeys").unwrap().invoke(vec![dict.clone()], &mut scope),
            Ok(Value::Array(vec![s("k")]))
        );
        assert_eq!(
            catalog()
                .get("GetValues")
                .unwrap()
                .invoke(vec![dict.clone(), Value::Array(vec![s("k"), s("x")])], &mut scope),
            Ok(Value::Array(vec![n(1.0), Value::Null]))
        );
        assert!(add.invoke(vec![Value::Null, s("k"), n(1.0)], &mut scope).is_err());
    }

    #[test]
    fn test_reduce_dimension_function() {
        let input = Value::Array(vec![Value::Array(vec![n(1.0)]), Value::Array(vec![n(2.0)])]);
        assert_eq!(
            catalog().get("ReduceDimension").unwrap().invoke(vec![input], &mut Scope::new()),
            Ok(Value::Array(vec![n(1.0), n(2.0)]))
        );
    }
}
