use crate::error::SchemaError;
use crate::naming::{is_valid_name, unescape_key};
use crate::spec::{ArgKind, ArgSpec};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// The frozen argument layout of one directive type.
///
/// Built once by [`SchemaBuilder`] and shared read-only by every
/// invocation of the directive.
#[derive(Debug)]
pub struct Schema {
    name: String,
    is_block: bool,
    args: Vec<Arc<ArgSpec>>,
    positional: Vec<Arc<ArgSpec>>,
    keywords: HashMap<String, Arc<ArgSpec>>,
    by_name: HashMap<String, Arc<ArgSpec>>,
}

impl Schema {
    /// Builds a schema from ordered `(attribute key, spec)` declarations and
    /// the schemas it extends, nearest base first.
    pub fn build(
        name: impl Into<String>,
        is_block: bool,
        declared: Vec<(String, ArgSpec)>,
        bases: &[&Schema],
    ) -> Result<Schema, SchemaError> {
        let mut builder = SchemaBuilder::new(name).block(is_block);
        builder.declared = declared;
        builder.bases = bases.iter().map(|b| (*b).clone_args()).collect();
        builder.build()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_block(&self) -> bool {
        self.is_block
    }

    /// The closing marker a block directive expects, e.g. `endcache`.
    pub fn end_tag(&self) -> Option<String> {
        self.is_block.then(|| format!("end{}", self.name))
    }

    /// Every argument, inherited ones first, in declaration order.
    pub fn args(&self) -> &[Arc<ArgSpec>] {
        &self.args
    }

    pub fn positional_args(&self) -> &[Arc<ArgSpec>] {
        &self.positional
    }

    /// Keyword arguments in declaration order.
    pub fn keyword_args(&self) -> impl Iterator<Item = &Arc<ArgSpec>> {
        self.args.iter().filter(|spec| !spec.is_positional())
    }

    /// Looks up a keyword argument by the token that introduces it.
    pub fn keyword(&self, token: &str) -> Option<&Arc<ArgSpec>> {
        self.keywords.get(token)
    }

    pub fn is_keyword(&self, token: &str) -> bool {
        self.keywords.contains_key(token)
    }

    pub fn arg(&self, name: &str) -> Option<&Arc<ArgSpec>> {
        self.by_name.get(name)
    }

    /// Number of positional tokens every invocation must supply.
    pub fn min_positional(&self) -> usize {
        self.positional.iter().filter(|spec| spec.is_required()).count()
    }

    /// A one-line syntax summary, e.g. `positional_optional <start> [<finish>]`.
    pub fn usage(&self) -> String {
        let mut parts = vec![self.name.clone()];
        parts.extend(self.args.iter().map(|spec| spec.usage()));
        parts.join(" ")
    }

    fn clone_args(&self) -> Vec<Arc<ArgSpec>> {
        self.args.clone()
    }
}

/// Collects argument declarations for one directive type and freezes them
/// into a [`Schema`].
///
/// Keys ending in `_` are un-escaped (`as_` declares the `as` argument), so
/// reserved words can be used as attribute keys.
#[derive(Debug)]
pub struct SchemaBuilder {
    name: String,
    is_block: bool,
    declared: Vec<(String, ArgSpec)>,
    bases: Vec<Vec<Arc<ArgSpec>>>,
    reserved: Option<(String, bool)>,
}

impl SchemaBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_block: false,
            declared: Vec::new(),
            bases: Vec::new(),
            reserved: None,
        }
    }

    pub fn block(mut self, is_block: bool) -> Self {
        self.is_block = is_block;
        self
    }

    pub fn arg(mut self, key: impl Into<String>, spec: ArgSpec) -> Self {
        self.declared.push((key.into(), spec));
        self
    }

    /// Inherits the arguments of `base`. Call once per base, nearest first.
    pub fn extends(mut self, base: &Schema) -> Self {
        self.bases.push(base.clone_args());
        self
    }

    /// Adds a keyword argument named `name` that declarations may not use
    /// themselves (the template name of template-rendering directives).
    pub fn reserve_keyword(mut self, name: impl Into<String>, required: bool) -> Self {
        self.reserved = Some((name.into(), required));
        self
    }

    pub fn build(self) -> Result<Schema, SchemaError> {
        let tag = self.name;
        let mut local: Vec<Arc<ArgSpec>> = Vec::with_capacity(self.declared.len() + 1);

        for (key, mut spec) in self.declared {
            let name = match spec.name.take() {
                Some(name) => name,
                None => unescape_key(&key).to_string(),
            };
            if name.is_empty() {
                return Err(SchemaError::EmptyName { tag, key });
            }
            if !is_valid_name(&name) {
                return Err(SchemaError::InvalidName { tag, name });
            }
            check_flag(&tag, &name, &spec)?;

            if spec.keyword.is_none() && (!spec.positional || spec.is_constant()) {
                spec.keyword = Some(name.clone());
            }
            spec.name = Some(name);

            if spec.positional {
                if local.iter().any(|s| s.is_positional() && s.name() == spec.name()) {
                    return Err(SchemaError::DuplicatePositional {
                        tag,
                        arg: spec.name().to_string(),
                    });
                }
            } else if let Some(clash) = local.iter().find(|s| s.name() == spec.name()
                || (!s.is_positional() && s.keyword_token() == spec.keyword_token()))
            {
                let keyword = if clash.name() == spec.name() {
                    spec.name().to_string()
                } else {
                    spec.keyword_token().unwrap_or_default().to_string()
                };
                return Err(SchemaError::DuplicateKeyword { tag, keyword });
            }
            if spec.positional && local.iter().any(|s| s.name() == spec.name()) {
                return Err(SchemaError::DuplicateKeyword {
                    tag,
                    keyword: spec.name().to_string(),
                });
            }

            local.push(Arc::new(spec));
        }

        if let Some((reserved, required)) = self.reserved {
            if local.iter().any(|s| s.name() == reserved || s.keyword_token() == Some(&reserved)) {
                return Err(SchemaError::ReservedKeyword { tag, keyword: reserved });
            }
            let mut spec = ArgSpec::string();
            spec.required = required;
            spec.keyword = Some(reserved.clone());
            spec.name = Some(reserved);
            local.push(Arc::new(spec));
        }

        let mut args = local;
        for base in self.bases.iter().rev() {
            let mut inherited: Vec<Arc<ArgSpec>> = Vec::with_capacity(base.len() + args.len());
            for spec in base {
                if args.iter().chain(inherited.iter()).any(|s| Arc::ptr_eq(s, spec)) {
                    continue;
                }
                if spec.is_positional() {
                    if args.iter().chain(inherited.iter()).any(|s| s.name() == spec.name()) {
                        return Err(SchemaError::PositionalOverride {
                            tag,
                            arg: spec.name().to_string(),
                        });
                    }
                    inherited.push(spec.clone());
                } else {
                    let overridden = args.iter().chain(inherited.iter()).any(|s| {
                        s.name() == spec.name()
                            || (!s.is_positional() && s.keyword_token() == spec.keyword_token())
                    });
                    if !overridden {
                        inherited.push(spec.clone());
                    }
                }
            }
            inherited.extend(args);
            args = inherited;
        }

        let positional: Vec<Arc<ArgSpec>> =
            args.iter().filter(|s| s.is_positional()).cloned().collect();

        let mut seen_optional = false;
        for spec in &positional {
            if spec.is_required() {
                if seen_optional {
                    return Err(SchemaError::RequiredAfterOptional {
                        tag,
                        arg: spec.name().to_string(),
                    });
                }
            } else {
                seen_optional = true;
            }
        }

        let keywords: HashMap<String, Arc<ArgSpec>> = args
            .iter()
            .filter(|s| !s.is_positional())
            .filter_map(|s| s.keyword_token().map(|kw| (kw.to_string(), s.clone())))
            .collect();

        let by_name: HashMap<String, Arc<ArgSpec>> = args
            .iter()
            .map(|s| (s.name().to_string(), s.clone()))
            .collect();

        debug!(
            tag = %tag,
            positional = positional.len(),
            keywords = keywords.len(),
            "built directive schema"
        );

        Ok(Schema {
            name: tag,
            is_block: self.is_block,
            args,
            positional,
            keywords,
            by_name,
        })
    }
}

fn check_flag(tag: &str, name: &str, spec: &ArgSpec) -> Result<(), SchemaError> {
    if !matches!(spec.kind, ArgKind::Flag) {
        return Ok(());
    }
    let reason = if spec.positional {
        "cannot be positional"
    } else if spec.required {
        "cannot be required"
    } else if spec.multi {
        "cannot take multiple values"
    } else if spec.assign {
        "cannot be written as an assignment"
    } else {
        return Ok(());
    };
    Err(SchemaError::InvalidFlag {
        tag: tag.to_string(),
        arg: name.to_string(),
        reason: reason.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partitions_positional_and_keyword() {
        let schema = SchemaBuilder::new("positional_optional_mixed")
            .arg("start", ArgSpec::integer().positional())
            .arg("finish", ArgSpec::integer().positional().optional())
            .arg("step", ArgSpec::integer())
            .build()
            .unwrap();

        let names: Vec<_> = schema.positional_args().iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["start", "finish"]);
        assert!(schema.is_keyword("step"));
        assert!(!schema.is_keyword("start"));
        assert_eq!(schema.min_positional(), 1);
    }

    #[test]
    fn escaped_keys_are_unescaped() {
        let schema = SchemaBuilder::new("positional_mixed")
            .arg("limit", ArgSpec::integer().positional().default(5))
            .arg("as_", ArgSpec::basic())
            .build()
            .unwrap();
        assert!(schema.arg("as").is_some());
        assert!(schema.keyword("as").is_some());
        assert!(schema.arg("as_").is_none());
    }

    #[test]
    fn explicit_name_wins_over_key() {
        let schema = SchemaBuilder::new("single_positional")
            .arg("_", ArgSpec::integer().named("single_arg").default(5))
            .build()
            .unwrap();
        assert!(schema.arg("single_arg").is_some());
    }

    #[test]
    fn bare_underscore_needs_a_name() {
        let err = SchemaBuilder::new("t").arg("_", ArgSpec::new()).build().unwrap_err();
        assert!(matches!(err, SchemaError::EmptyName { .. }));
    }

    #[test]
    fn required_after_optional_is_rejected() {
        let err = SchemaBuilder::new("t")
            .arg("start", ArgSpec::new().positional().optional())
            .arg("end", ArgSpec::new().positional())
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            SchemaError::RequiredAfterOptional { tag: "t".into(), arg: "end".into() }
        );
    }

    #[test]
    fn flags_are_validated() {
        let err = SchemaBuilder::new("t")
            .arg("cool", ArgSpec::flag().positional())
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidFlag { .. }));

        let err = SchemaBuilder::new("t")
            .arg("cool", ArgSpec::flag().multi())
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidFlag { .. }));

        let err = SchemaBuilder::new("t")
            .arg("cool", ArgSpec::flag().required())
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidFlag { .. }));
    }

    #[test]
    fn end_tag_only_for_blocks() {
        let schema = SchemaBuilder::new("cache").block(true).build().unwrap();
        assert_eq!(schema.end_tag().as_deref(), Some("endcache"));
        let schema = SchemaBuilder::new("now").build().unwrap();
        assert!(schema.end_tag().is_none());
    }

    #[test]
    fn usage_line() {
        let schema = SchemaBuilder::new("constant")
            .arg("start", ArgSpec::new().positional())
            .arg("to", ArgSpec::constant())
            .arg("finish", ArgSpec::new().positional())
            .build()
            .unwrap();
        assert_eq!(schema.usage(), "constant <start> to <finish>");
    }
}
