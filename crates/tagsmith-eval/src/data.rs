//! The per-render result of resolving one invocation.

use crate::error::MissingArgument;
use tagsmith_syntax::{Schema, Value};

/// State of one name in a [`ResolvedData`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Entry<'a> {
    /// Bound, resolved and cleaned.
    Present(&'a Value),
    /// Declared but not supplied, with no default.
    Absent,
    /// Never declared by the directive.
    Undeclared,
}

#[derive(Debug, Clone, PartialEq)]
enum Slot {
    Present(Value),
    Absent,
}

/// Validated argument values for one render, in declaration order.
///
/// Presence is meaningful: an optional argument that was not supplied is
/// [`Entry::Absent`], which is different from being present with
/// `Value::Null`.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedData {
    tag: String,
    slots: Vec<(String, Slot)>,
}

impl ResolvedData {
    /// An empty bag with every declared argument marked absent.
    pub fn new(schema: &Schema) -> Self {
        Self {
            tag: schema.name().to_string(),
            slots: schema
                .args()
                .iter()
                .map(|spec| (spec.name().to_string(), Slot::Absent))
                .collect(),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn entry(&self, name: &str) -> Entry<'_> {
        match self.slot(name) {
            Some(Slot::Present(value)) => Entry::Present(value),
            Some(Slot::Absent) => Entry::Absent,
            None => Entry::Undeclared,
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        match self.entry(name) {
            Entry::Present(value) => Some(value),
            _ => None,
        }
    }

    /// Like [`ResolvedData::get`] but reports why a value is missing.
    pub fn require(&self, name: &str) -> Result<&Value, MissingArgument> {
        match self.entry(name) {
            Entry::Present(value) => Ok(value),
            Entry::Absent => Err(self.missing(name, true)),
            Entry::Undeclared => Err(self.missing(name, false)),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        matches!(self.entry(name), Entry::Present(_))
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.slot(name).is_some()
    }

    /// Sets a value, adding the name if it was not declared.
    ///
    /// Whole-bag hooks use this to enrich the result.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        match self.slots.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = Slot::Present(value),
            None => self.slots.push((name, Slot::Present(value))),
        }
    }

    /// Marks a declared name absent again, returning its old value.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let (_, slot) = self.slots.iter_mut().find(|(n, _)| n == name)?;
        match std::mem::replace(slot, Slot::Absent) {
            Slot::Present(value) => Some(value),
            Slot::Absent => None,
        }
    }

    /// Present values in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.slots.iter().filter_map(|(name, slot)| match slot {
            Slot::Present(value) => Some((name.as_str(), value)),
            Slot::Absent => None,
        })
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, name: &str) -> Option<&Slot> {
        self.slots.iter().find(|(n, _)| n == name).map(|(_, s)| s)
    }

    fn missing(&self, name: &str, declared: bool) -> MissingArgument {
        MissingArgument {
            tag: self.tag.clone(),
            name: name.to_string(),
            declared,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagsmith_syntax::{ArgSpec, SchemaBuilder};

    fn schema() -> Schema {
        SchemaBuilder::new("show")
            .arg("item", ArgSpec::new().positional())
            .arg("limit", ArgSpec::integer().optional())
            .build()
            .unwrap()
    }

    #[test]
    fn test_three_states() {
        let mut data = ResolvedData::new(&schema());
        data.insert("item", Value::from("a"));

        assert_eq!(data.entry("item"), Entry::Present(&Value::from("a")));
        assert_eq!(data.entry("limit"), Entry::Absent);
        assert_eq!(data.entry("page"), Entry::Undeclared);
        assert!(data.contains("item"));
        assert!(!data.contains("limit"));
        assert!(data.is_declared("limit"));
    }

    #[test]
    fn test_require_reports_why() {
        let data = ResolvedData::new(&schema());
        let err = data.require("limit").unwrap_err();
        assert!(err.declared);
        let err = data.require("page").unwrap_err();
        assert!(!err.declared);
        assert_eq!(err.tag, "show");
    }

    #[test]
    fn test_null_is_present() {
        let mut data = ResolvedData::new(&schema());
        data.insert("limit", Value::Null);
        assert!(data.contains("limit"));
        assert_eq!(data.get("limit"), Some(&Value::Null));
    }

    #[test]
    fn test_iter_in_declaration_order() {
        let mut data = ResolvedData::new(&schema());
        data.insert("extra", Value::Int(1));
        data.insert("limit", Value::Int(5));
        data.insert("item", Value::from("x"));

        let names: Vec<_> = data.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["item", "limit", "extra"]);
        assert_eq!(data.remove("limit"), Some(Value::Int(5)));
        assert_eq!(data.len(), 2);
    }
}
