use crate::expr::SharedExpression;
use crate::value::Value;
use std::collections::HashMap;

/// A bound but not yet resolved argument value.
#[derive(Debug, Clone)]
pub enum BoundValue {
    Literal(Value),
    Deferred(SharedExpression),
    /// A comma-joined group, one entry per member, in source order.
    Multi(Vec<BoundValue>),
    /// Pairs collected by a keywords argument, in source order.
    Keywords(Vec<(String, BoundValue)>),
}

impl BoundValue {
    pub fn is_deferred(&self) -> bool {
        matches!(self, BoundValue::Deferred(_))
    }

    pub fn is_multi(&self) -> bool {
        matches!(self, BoundValue::Multi(_))
    }

    pub fn as_literal(&self) -> Option<&Value> {
        match self {
            BoundValue::Literal(value) => Some(value),
            _ => None,
        }
    }

    /// Short human-readable form, e.g. `5`, `$user.name`, `[a, $b]`.
    pub fn describe(&self) -> String {
        match self {
            BoundValue::Literal(value) => format!("{:?}", value),
            BoundValue::Deferred(expr) => format!("${}", expr.source()),
            BoundValue::Multi(items) => {
                let parts: Vec<String> = items.iter().map(|b| b.describe()).collect();
                format!("[{}]", parts.join(", "))
            }
            BoundValue::Keywords(pairs) => {
                let parts: Vec<String> =
                    pairs.iter().map(|(k, b)| format!("{}={}", k, b.describe())).collect();
                format!("{{{}}}", parts.join(", "))
            }
        }
    }
}

/// The arguments bound for one invocation, keyed by argument name.
///
/// Arguments that were optional and not supplied have no entry at all.
/// Once produced this map is never mutated, so a parsed invocation can be
/// rendered any number of times, concurrently, against different contexts.
#[derive(Debug, Clone, Default)]
pub struct BoundArgs {
    values: HashMap<String, BoundValue>,
}

impl BoundArgs {
    pub fn get(&self, name: &str) -> Option<&BoundValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BoundValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub(crate) fn insert(&mut self, name: impl Into<String>, value: BoundValue) {
        self.values.insert(name.into(), value);
    }
}
