//! Runtime variable scope
//!
//! One flat namespace per script evaluation. Locals are stored under their
//! bare name (`x`), globals and system variables under their `$` name.

use std::collections::HashMap;

use crate::sysvars::{self, SysVarType};
use crate::value::{parse_number_prefix, Value};

#[derive(Debug, Clone, Default)]
pub struct Scope {
    values: HashMap<String, Value>,
}

impl Scope {
    pub fn new() -> Self {
        Scope {
            values: HashMap::new(),
        }
    }

    /// Seeds the scope with host-provided globals
    pub fn with_globals(globals: impl IntoIterator<Item = (String, Value)>) -> Self {
        Scope {
            values: globals.into_iter().collect(),
        }
    }

    pub fn set(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    /// Reads a variable. Unset locals and globals are null; unset system
    /// variables fall back to their registry default.
    pub fn get(&self, name: &str) -> Value {
        if let Some(value) = self.values.get(name) {
            return value.clone();
        }
        if name.starts_with('$') {
            if let Some(default) = system_default(name) {
                return default;
            }
        }
        Value::Null
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.values.get_mut(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.values.remove(name)
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<_> = self.values.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Globals (`$`-prefixed) currently set, for handing back to the host
    pub fn globals(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter().filter(|(name, _)| name.starts_with('$'))
    }
}

fn system_default(name: &str) -> Option<Value> {
    let descriptor = sysvars::lookup(name)?;
    let default = descriptor.default?;
    Some(match descriptor.data_type {
        SysVarType::String => Value::String(default.to_string()),
        SysVarType::Integer => Value::Number(parse_number_prefix(default).unwrap_or(0.0)),
        SysVarType::Boolean => Value::Bool(Value::from(default).to_bool().unwrap_or(false)),
        SysVarType::Array => Value::Array(Vec::new()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_variables_read_as_null() {
        let scope = Scope::new();
        assert_eq!(scope.get("x"), Value::Null);
        assert_eq!(scope.get("$user.defined"), Value::Null);
    }

    #[test]
    fn test_system_variable_defaults() {
        let scope = Scope::new();
        assert_eq!(
            scope.get("$jitterbit.scripting.while.max_iterations"),
            Value::Number(50000.0)
        );
        assert_eq!(scope.get("$jitterbit.operation.write_history"), Value::Bool(true));
    }

    #[test]
    fn test_flat_namespace() {
        let mut scope = Scope::with_globals(vec![("$g".to_string(), Value::from("host"))]);
        scope.set("x", Value::Number(1.0));
        scope.set("$jitterbit.operation.write_history", Value::Bool(false));
        assert_eq!(scope.get("$g"), Value::from("host"));
        assert_eq!(scope.get("$jitterbit.operation.write_history"), Value::Bool(false));
        assert_eq!(scope.keys(), vec!["$g", "$jitterbit.operation.write_history", "x"]);
        assert_eq!(scope.globals().count(), 2);
    }
}
