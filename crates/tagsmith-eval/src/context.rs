//! Render-local variable scopes.
//!
//! A [`Context`] is a stack of scopes; lookups walk from the innermost
//! scope outwards and then follow dotted paths through
//! [`Value::get_property`]. Directives receive `&mut Context` in their
//! output function and may push a scope or set variables (`as name`).

use anyhow::{Result, bail};
use std::collections::{BTreeMap, HashMap};
use tagsmith_syntax::{Lookup, Object, Value};

/// JSON key that turns an object into a typed [`Object`].
pub const TYPE_KEY: &str = "__type__";

#[derive(Debug, Clone, PartialEq)]
pub struct Context {
    scopes: Vec<HashMap<String, Value>>,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    pub fn new() -> Self {
        Self {
            scopes: vec![HashMap::new()],
        }
    }

    pub fn from_map(vars: HashMap<String, Value>) -> Self {
        Self { scopes: vec![vars] }
    }

    /// Builds a context from a JSON object, one variable per key.
    ///
    /// Nested objects carrying a `"__type__"` string become [`Object`]s
    /// named after it; other objects become maps.
    pub fn from_json(json: serde_json::Value) -> Result<Self> {
        let serde_json::Value::Object(map) = json else {
            bail!("context must be a JSON object, got {}", json_kind(&json));
        };
        let vars = map
            .into_iter()
            .map(|(k, v)| (k, json_to_value(v)))
            .collect();
        Ok(Self::from_map(vars))
    }

    pub fn from_json_str(source: &str) -> Result<Self> {
        let json: serde_json::Value = serde_json::from_str(source)?;
        Self::from_json(json)
    }

    /// Sets a variable in the innermost scope.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.into(), value.into());
        }
    }

    /// Finds a top-level variable, innermost scope first.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn push(&mut self) {
        self.scopes.push(HashMap::new());
    }

    /// Drops the innermost scope. The outermost scope is never popped.
    pub fn pop(&mut self) -> Option<HashMap<String, Value>> {
        if self.scopes.len() > 1 {
            self.scopes.pop()
        } else {
            None
        }
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Runs `f` inside a fresh scope that is dropped afterwards.
    pub fn scoped<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.push();
        let result = f(self);
        self.pop();
        result
    }
}

impl Lookup for Context {
    fn lookup(&self, path: &str) -> Option<Value> {
        let mut segments = path.split('.');
        let head = segments.next()?;
        let mut current = self.get(head)?.clone();
        for segment in segments {
            current = current.get_property(segment)?;
        }
        Some(current)
    }
}

pub fn json_to_value(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(items) => {
            Value::List(items.into_iter().map(json_to_value).collect())
        }
        serde_json::Value::Object(mut map) => match map.remove(TYPE_KEY) {
            Some(serde_json::Value::String(type_name)) => {
                let mut obj = Object::new(type_name);
                for (k, v) in map {
                    obj.set(k, json_to_value(v));
                }
                Value::Object(obj)
            }
            other => {
                let mut out: BTreeMap<String, Value> = map
                    .into_iter()
                    .map(|(k, v)| (k, json_to_value(v)))
                    .collect();
                // a non-string type marker is kept as a plain entry
                if let Some(marker) = other {
                    out.insert(TYPE_KEY.to_string(), json_to_value(marker));
                }
                Value::Map(out)
            }
        },
    }
}

fn json_kind(json: &serde_json::Value) -> &'static str {
    match json {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
