//! Array algorithms driven by the value model: sorting and dimension
//! reduction.

use std::cmp::Ordering;

use crate::error::{Result, ScriptError};
use crate::value::Value;

fn by_sort_value(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Stable sort by `Value::sort_value`. Descending order is the ascending
/// result reversed, so elements with equal keys come out in reverse input
/// order; scripts rely on that.
pub fn sort_values(items: &mut [Value], ascending: bool) {
    items.sort_by(|a, b| by_sort_value(a.sort_value(), b.sort_value()));
    if !ascending {
        items.reverse();
    }
}

/// Sorts rows of a multi-dimensional array by the value in column `index`.
/// Every row must be an array long enough to have that column.
pub fn sort_rows_by_column(rows: &mut [Value], index: i64, ascending: bool) -> Result<()> {
    if index < 0 {
        return Err(ScriptError::invalid_argument(
            "SortArray",
            format!("column index {} is negative", index),
        ));
    }
    let column = index as usize;
    for (position, row) in rows.iter().enumerate() {
        match row {
            Value::Array(cells) if column < cells.len() => {}
            Value::Array(cells) => {
                return Err(ScriptError::IndexOutOfBounds {
                    index,
                    length: cells.len(),
                })
            }
            other => {
                return Err(ScriptError::invalid_argument(
                    "SortArray",
                    format!(
                        "element {} is {}, expected an array to sort by column {}",
                        position,
                        other.kind(),
                        column
                    ),
                ))
            }
        }
    }

    let key = |row: &Value| match row {
        Value::Array(cells) => cells[column].sort_value(),
        _ => 0.0,
    };
    rows.sort_by(|a, b| by_sort_value(key(a), key(b)));
    if !ascending {
        rows.reverse();
    }
    Ok(())
}

/// Nesting depth of an array whose leaves all sit at the same level.
/// Scalars have depth 0; an empty array counts as a leaf one level down.
pub fn uniform_depth(value: &Value) -> Result<usize> {
    let mut expected = None;
    check_depth(value, 0, &mut expected)?;
    Ok(expected.unwrap_or(0))
}

fn check_depth(value: &Value, level: usize, expected: &mut Option<usize>) -> Result<()> {
    match value {
        Value::Array(items) if !items.is_empty() => {
            for item in items {
                check_depth(item, level + 1, expected)?;
            }
            Ok(())
        }
        other => {
            let depth = if matches!(other, Value::Array(_)) {
                level + 1
            } else {
                level
            };
            match expected {
                None => {
                    *expected = Some(depth);
                    Ok(())
                }
                Some(first) if *first == depth => Ok(()),
                Some(first) => Err(ScriptError::invalid_argument(
                    "ReduceDimension",
                    format!(
                        "array is not uniform: found depth {} after depth {}",
                        depth, first
                    ),
                )),
            }
        }
    }
}

/// Folds the innermost dimension of an n-dimensional array into its parent
pub fn reduce_dimension(value: &Value) -> Result<Value> {
    let depth = uniform_depth(value)?;
    if depth < 2 {
        return Err(ScriptError::invalid_argument(
            "ReduceDimension",
            format!("array must have at least 2 dimensions, found {}", depth),
        ));
    }
    Ok(reduce(value, depth))
}

fn reduce(value: &Value, depth: usize) -> Value {
    match value {
        Value::Array(items) if depth == 2 => {
            let mut flat = Vec::new();
            for item in items {
                match item {
                    Value::Array(inner) => flat.extend(inner.iter().cloned()),
                    other => flat.push(other.clone()),
                }
            }
            Value::Array(flat)
        }
        Value::Array(items) => Value::Array(items.iter().map(|item| reduce(item, depth - 1)).collect()),
        other => other.clone(),
    }
}
