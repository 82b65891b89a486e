//! Render-time resolution and the cleaning pipeline.
//!
//! For each declared argument, in declaration order:
//!
//! 1. resolve the bound value against the context (deferred expressions
//!    are resolved exactly once, literals pass through)
//! 2. reject null unless the argument is nullable
//! 3. clean the value for its kind ([`clean_value`])
//! 4. run the directive's hook for that argument, if any
//!
//! then run the whole-bag hook. The first failure aborts the render.

use crate::clean::clean_value;
use crate::data::ResolvedData;
use crate::error::ValidationError;
use crate::hooks::CleanHooks;
use once_cell::sync::Lazy;
use std::collections::BTreeMap;
use tagsmith_syntax::{ArgSpec, BoundArgs, BoundValue, Lookup, Resolution, Schema, Value};
use tracing::debug;

static NO_HOOKS: Lazy<CleanHooks> = Lazy::new(CleanHooks::new);

pub struct Resolver<'a> {
    schema: &'a Schema,
    hooks: &'a CleanHooks,
    strict_variables: bool,
}

impl<'a> Resolver<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        Self {
            schema,
            hooks: &NO_HOOKS,
            strict_variables: false,
        }
    }

    pub fn with_hooks(mut self, hooks: &'a CleanHooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Treat a missing variable as an error even on nullable arguments.
    pub fn strict_variables(mut self, strict: bool) -> Self {
        self.strict_variables = strict;
        self
    }

    pub fn resolve(&self, bound: &BoundArgs, context: &dyn Lookup) -> Result<ResolvedData, ValidationError> {
        let mut data = ResolvedData::new(self.schema);

        for spec in self.schema.args() {
            let name = spec.name();
            let Some(bound_value) = bound.get(name) else {
                continue;
            };

            let value = self.resolve_bound(spec, bound_value, context)?;
            let value = clean_value(spec, bound_value, value)?;
            let value = match self.hooks.arg(name) {
                Some(hook) => hook(value)?,
                None => value,
            };
            data.insert(name, value);
        }

        let data = match self.hooks.whole() {
            Some(hook) => hook(data)?,
            None => data,
        };

        debug!(tag = self.schema.name(), resolved = data.len(), "resolved arguments");
        Ok(data)
    }

    fn resolve_bound(
        &self,
        spec: &ArgSpec,
        bound: &BoundValue,
        context: &dyn Lookup,
    ) -> Result<Value, ValidationError> {
        match bound {
            BoundValue::Literal(value) => self.admit(spec, value.clone()),
            BoundValue::Deferred(expr) => match expr.resolve(context) {
                Resolution::Found(value) => self.admit(spec, value),
                Resolution::Missing(path) => {
                    if spec.is_nullable() && !self.strict_variables {
                        debug!(argument = spec.name(), path = %path, "missing variable resolved to null");
                        Ok(Value::Null)
                    } else {
                        Err(ValidationError::missing_variable(spec.name(), &path))
                    }
                }
            },
            BoundValue::Multi(items) => items
                .iter()
                .map(|item| self.resolve_bound(spec, item, context))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List),
            BoundValue::Keywords(pairs) => {
                let mut map = BTreeMap::new();
                for (key, item) in pairs {
                    map.insert(key.clone(), self.resolve_bound(spec, item, context)?);
                }
                Ok(Value::Map(map))
            }
        }
    }

    fn admit(&self, spec: &ArgSpec, value: Value) -> Result<Value, ValidationError> {
        if value.is_null() && !spec.is_nullable() {
            return Err(ValidationError::null(spec.name()));
        }
        Ok(value)
    }
}

/// Resolves `bound` against `context` with no hooks and lenient variables.
pub fn resolve(schema: &Schema, bound: &BoundArgs, context: &dyn Lookup) -> Result<ResolvedData, ValidationError> {
    Resolver::new(schema).resolve(bound, context)
}
