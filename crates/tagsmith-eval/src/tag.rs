//! Directive definitions.
//!
//! A [`Tag`] bundles everything a directive type declares once: its frozen
//! [`Schema`], its clean hooks, its output function and an optional
//! per-tag silence override. [`TagBuilder`] is the declaration surface.
//!
//! ```rust
//! use tagsmith_eval::{Context, Library, TagBuilder};
//! use tagsmith_syntax::ArgSpec;
//!
//! let greet = TagBuilder::new("greet")
//!     .arg("name", ArgSpec::string().positional())
//!     .arg("punct", ArgSpec::string().default("!"))
//!     .output(|data, _ctx| {
//!         Ok(format!("Hello {}{}", data.require("name")?, data.require("punct")?))
//!     })
//!     .build()
//!     .expect("valid declaration");
//!
//! let mut library = Library::new();
//! library.register(greet);
//!
//! let mut ctx = Context::new();
//! ctx.insert("who", "Ada");
//! assert_eq!(library.render("greet who", &mut ctx).unwrap(), "Hello Ada!");
//! ```

use crate::context::Context;
use crate::data::ResolvedData;
use crate::error::{RenderError, ValidationError};
use crate::hooks::{ArgHook, CleanHooks, DataHook};
use crate::resolve::Resolver;
use std::fmt;
use std::sync::Arc;
use tagsmith_syntax::naming::tag_name_from_type;
use tagsmith_syntax::{ArgSpec, BoundArgs, Lookup, Schema, SchemaBuilder, SchemaError, Value};

/// Produces a directive's output from its resolved arguments.
pub type OutputFn =
    Arc<dyn Fn(&ResolvedData, &mut Context) -> Result<String, RenderError> + Send + Sync>;

/// Default keyword used by [`TagBuilder::template_arg`].
pub const TEMPLATE_KEYWORD: &str = "template";

#[derive(Clone)]
pub struct Tag {
    schema: Arc<Schema>,
    hooks: CleanHooks,
    output: Option<OutputFn>,
    silence_errors: Option<bool>,
}

impl Tag {
    pub fn name(&self) -> &str {
        self.schema.name()
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn hooks(&self) -> &CleanHooks {
        &self.hooks
    }

    /// The per-tag silence override, if one was declared.
    pub fn silence_errors(&self) -> Option<bool> {
        self.silence_errors
    }

    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(&self.schema).with_hooks(&self.hooks)
    }

    pub fn resolve(
        &self,
        bound: &BoundArgs,
        context: &dyn Lookup,
        strict_variables: bool,
    ) -> Result<ResolvedData, ValidationError> {
        self.resolver()
            .strict_variables(strict_variables)
            .resolve(bound, context)
    }

    /// Calls the output function on already resolved data.
    pub fn output(&self, data: &ResolvedData, context: &mut Context) -> Result<String, RenderError> {
        match &self.output {
            Some(output) => output(data, context),
            None => Err(RenderError::output(format!(
                "'{}' does not define an output",
                self.name()
            ))),
        }
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tag")
            .field("schema", &self.schema)
            .field("hooks", &self.hooks)
            .field("output", &self.output.is_some())
            .field("silence_errors", &self.silence_errors)
            .finish()
    }
}

pub struct TagBuilder {
    schema: SchemaBuilder,
    hooks: CleanHooks,
    bases: Vec<Tag>,
    output: Option<OutputFn>,
    silence_errors: Option<bool>,
}

impl TagBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            schema: SchemaBuilder::new(name),
            hooks: CleanHooks::new(),
            bases: Vec::new(),
            output: None,
            silence_errors: None,
        }
    }

    /// Names the tag after a Rust type: `KeywordNoDefaultTag` declares
    /// `keyword_no_default`.
    pub fn for_type<T: ?Sized>() -> Self {
        Self::new(tag_name_from_type(std::any::type_name::<T>()))
    }

    /// Marks the tag as a block tag closed by `end<name>`.
    pub fn block(mut self) -> Self {
        self.schema = self.schema.block(true);
        self
    }

    pub fn arg(mut self, key: impl Into<String>, spec: ArgSpec) -> Self {
        self.schema = self.schema.arg(key, spec);
        self
    }

    /// Inherits arguments, hooks, output and silence override from `base`.
    /// Local declarations win; with several bases the nearest one (the
    /// first `extends` call) wins.
    pub fn extends(mut self, base: &Tag) -> Self {
        self.schema = self.schema.extends(&base.schema);
        self.bases.push(base.clone());
        self
    }

    /// Adds a hook run on the cleaned value of argument `name`.
    pub fn clean_arg<F>(mut self, name: impl Into<String>, hook: F) -> Self
    where
        F: Fn(Value) -> Result<Value, ValidationError> + Send + Sync + 'static,
    {
        let hook: ArgHook = Arc::new(hook);
        self.hooks.set_arg(name, hook);
        self
    }

    /// Adds the hook run on the complete bag after every argument is clean.
    pub fn clean<F>(mut self, hook: F) -> Self
    where
        F: Fn(ResolvedData) -> Result<ResolvedData, ValidationError> + Send + Sync + 'static,
    {
        let hook: DataHook = Arc::new(hook);
        self.hooks.set_whole(hook);
        self
    }

    pub fn output<F>(mut self, output: F) -> Self
    where
        F: Fn(&ResolvedData, &mut Context) -> Result<String, RenderError> + Send + Sync + 'static,
    {
        self.output = Some(Arc::new(output));
        self
    }

    /// Overrides the library-wide silence policy for this tag.
    pub fn silence_errors(mut self, silence: bool) -> Self {
        self.silence_errors = Some(silence);
        self
    }

    /// Adds a reserved keyword argument naming the template a
    /// template-rendering tag should use, usually [`TEMPLATE_KEYWORD`].
    /// Declaring another argument with that name is a [`SchemaError`].
    pub fn template_arg(mut self, name: impl Into<String>, required: bool) -> Self {
        self.schema = self.schema.reserve_keyword(name, required);
        self
    }

    pub fn build(self) -> Result<Tag, SchemaError> {
        let schema = self.schema.build()?;
        let mut hooks = self.hooks;
        let mut output = self.output;
        let mut silence_errors = self.silence_errors;

        for base in &self.bases {
            hooks.inherit(&base.hooks);
            if output.is_none() {
                output = base.output.clone();
            }
            if silence_errors.is_none() {
                silence_errors = base.silence_errors;
            }
        }

        Ok(Tag {
            schema: Arc::new(schema),
            hooks,
            output,
            silence_errors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagsmith_syntax::{bind, tokenize};

    struct KeywordNoDefaultTag;

    #[test]
    fn test_for_type_names_tag() {
        let tag = TagBuilder::for_type::<KeywordNoDefaultTag>().build().unwrap();
        assert_eq!(tag.name(), "keyword_no_default");
    }

    #[test]
    fn test_missing_output() {
        let tag = TagBuilder::new("bare").build().unwrap();
        let data = ResolvedData::new(tag.schema());
        let err = tag.output(&data, &mut Context::new()).unwrap_err();
        assert_eq!(err.to_string(), "'bare' does not define an output");
    }

    #[test]
    fn test_extends_inherits_hooks_and_output() {
        let base = TagBuilder::new("base")
            .arg("limit", ArgSpec::integer().default(5))
            .clean_arg("limit", |v| Ok(Value::Int(v.as_int().unwrap_or(0) + 1)))
            .output(|data, _| Ok(data.require("limit")?.to_string()))
            .silence_errors(true)
            .build()
            .unwrap();
        let derived = TagBuilder::new("derived").extends(&base).build().unwrap();

        assert_eq!(derived.silence_errors(), Some(true));
        let bound = bind(derived.schema(), tokenize(""), &crate::FilterCompiler).unwrap();
        let data = derived.resolve(&bound, &Context::new(), false).unwrap();
        assert_eq!(data.get("limit"), Some(&Value::Int(6)));
        assert_eq!(derived.output(&data, &mut Context::new()).unwrap(), "6");
    }

    #[test]
    fn test_block_end_tag() {
        let tag = TagBuilder::new("cache").block().build().unwrap();
        assert!(tag.schema().is_block());
        assert_eq!(tag.schema().end_tag().as_deref(), Some("endcache"));
    }
}
