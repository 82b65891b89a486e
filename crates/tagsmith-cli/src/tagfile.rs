//! Tag declarations loaded from a TOML file.
//!
//! ```toml
//! [[tag]]
//! name = "greet"
//! output = "Hello {name}{punct}"
//!
//! [[tag.arg]]
//! key = "name"
//! kind = "string"
//! positional = true
//!
//! [[tag.arg]]
//! key = "punct"
//! kind = "string"
//! default = "!"
//! ```
//!
//! `output` is a format string: `{arg}` is replaced by the argument's
//! value (nothing when it was not supplied), `{{` and `}}` are literal
//! braces. A tag may `extends` tags declared earlier in the same file.

use anyhow::{Context as _, Result, anyhow, bail};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use tagsmith::eval::{Entry, TEMPLATE_KEYWORD};
use tagsmith::{ArgSpec, Config, Library, RenderError, ResolvedData, Tag, TagBuilder, Value};

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct TagFile {
    #[serde(default, rename = "tag")]
    pub tags: Vec<TagDecl>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TagDecl {
    pub name: String,
    #[serde(default)]
    pub block: bool,
    /// Names of earlier tags to inherit from, nearest first.
    #[serde(default)]
    pub extends: Vec<String>,
    pub output: Option<String>,
    pub silence_errors: Option<bool>,
    pub template: Option<TemplateMode>,
    #[serde(default, rename = "arg")]
    pub args: Vec<ArgDecl>,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum TemplateMode {
    Optional,
    Required,
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum KindDecl {
    #[default]
    Any,
    Basic,
    Integer,
    String,
    Date,
    Time,
    Datetime,
    Instance,
    Constant,
    Flag,
    Keywords,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArgDecl {
    /// Declaration key; a trailing `_` is dropped to form the name.
    pub key: String,
    #[serde(default)]
    pub kind: KindDecl,
    #[serde(default)]
    pub positional: bool,
    pub required: Option<bool>,
    pub default: Option<toml::Value>,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub multi: bool,
    /// Keep the raw token instead of resolving it.
    #[serde(default)]
    pub literal: bool,
    pub keyword: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub assign: bool,
    /// Object type name for `kind = "instance"`.
    pub class: Option<String>,
    pub compact: Option<bool>,
    pub verbose: Option<bool>,
}

impl TagFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read tag file: {}", path.display()))?;
        Self::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Builds every declared tag and registers it in a new library.
    pub fn into_library(self, config: Config) -> Result<Library> {
        let mut library = Library::with_config(config);
        let mut built: HashMap<String, Tag> = HashMap::new();

        for decl in self.tags {
            let name = decl.name.clone();
            let tag = decl
                .build(&built)
                .with_context(|| format!("Invalid declaration of tag '{}'", name))?;
            library.register(tag.clone());
            built.insert(name, tag);
        }

        Ok(library)
    }
}

impl TagDecl {
    fn build(self, earlier: &HashMap<String, Tag>) -> Result<Tag> {
        let mut builder = TagBuilder::new(&self.name);
        if self.block {
            builder = builder.block();
        }
        for base in &self.extends {
            let tag = earlier
                .get(base)
                .ok_or_else(|| anyhow!("'{}' extends unknown tag '{}'", self.name, base))?;
            builder = builder.extends(tag);
        }
        for arg in self.args {
            let key = arg.key.clone();
            builder = builder.arg(key, arg.into_spec()?);
        }
        if let Some(mode) = self.template {
            builder = builder.template_arg(TEMPLATE_KEYWORD, mode == TemplateMode::Required);
        }
        if let Some(silence) = self.silence_errors {
            builder = builder.silence_errors(silence);
        }
        if let Some(format) = self.output {
            builder = builder.output(move |data, _ctx| render_format(&format, data));
        }
        Ok(builder.build()?)
    }
}

impl ArgDecl {
    pub fn into_spec(self) -> Result<ArgSpec> {
        let mut spec = match self.kind {
            KindDecl::Any => ArgSpec::new(),
            KindDecl::Basic => ArgSpec::basic(),
            KindDecl::Integer => ArgSpec::integer(),
            KindDecl::String => ArgSpec::string(),
            KindDecl::Date => ArgSpec::date(),
            KindDecl::Time => ArgSpec::time(),
            KindDecl::Datetime => ArgSpec::datetime(),
            KindDecl::Instance => {
                let Some(class) = self.class else {
                    bail!("argument '{}' of kind 'instance' needs a 'class'", self.key);
                };
                ArgSpec::instance(class)
            }
            KindDecl::Constant => ArgSpec::constant(),
            KindDecl::Flag => ArgSpec::flag(),
            KindDecl::Keywords => ArgSpec::keywords(),
        };

        if self.positional {
            spec = spec.positional();
        }
        spec = match self.required {
            Some(true) => spec.required(),
            Some(false) => spec.optional(),
            None => spec,
        };
        if let Some(default) = self.default {
            spec = spec.default(toml_to_value(default));
        }
        if self.nullable {
            spec = spec.nullable();
        }
        if self.multi {
            spec = spec.multi();
        }
        if self.literal {
            spec = spec.literal();
        }
        if let Some(keyword) = self.keyword {
            spec = spec.keyword(keyword);
        }
        if let Some(name) = self.name {
            spec = spec.named(name);
        }
        if self.assign {
            spec = spec.assign();
        }
        if let Some(compact) = self.compact {
            spec = spec.compact(compact);
        }
        if let Some(verbose) = self.verbose {
            spec = spec.verbose(verbose);
        }
        Ok(spec)
    }
}

pub fn toml_to_value(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(n) => Value::Int(n),
        toml::Value::Float(f) => Value::Float(f),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => parse_datetime(&dt.to_string()),
        toml::Value::Array(items) => Value::List(items.into_iter().map(toml_to_value).collect()),
        toml::Value::Table(table) => Value::Map(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_value(v)))
                .collect::<BTreeMap<_, _>>(),
        ),
    }
}

fn parse_datetime(text: &str) -> Value {
    if let Ok(dt) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Value::DateTime(dt);
    }
    if let Ok(d) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Value::Date(d);
    }
    if let Ok(t) = NaiveTime::parse_from_str(text, "%H:%M:%S%.f") {
        return Value::Time(t);
    }
    // offset datetimes are kept as text
    Value::String(text.to_string())
}

/// Expands `{arg}` placeholders with resolved values.
pub fn render_format(format: &str, data: &ResolvedData) -> Result<String, RenderError> {
    let mut out = String::with_capacity(format.len());
    let mut chars = format.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(c) => name.push(c),
                        None => {
                            return Err(RenderError::output(format!(
                                "unterminated '{{' in output of '{}'",
                                data.tag()
                            )));
                        }
                    }
                }
                let name = name.trim();
                match data.entry(name) {
                    Entry::Present(value) => out.push_str(&value.to_string()),
                    Entry::Absent => {}
                    Entry::Undeclared => {
                        data.require(name)?;
                    }
                }
            }
            c => out.push(c),
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagsmith::Context;

    const GREET: &str = r#"
        [[tag]]
        name = "greet"
        output = "Hello {name}{punct} {{ok}}"

        [[tag.arg]]
        key = "name"
        kind = "string"
        positional = true

        [[tag.arg]]
        key = "punct"
        kind = "string"
        default = "!"

        [[tag]]
        name = "shout"
        extends = ["greet"]
        output = "HELLO {name}{punct}{volume}"

        [[tag.arg]]
        key = "volume"
        kind = "integer"
        required = false
    "#;

    #[test]
    fn test_load_and_render() -> Result<()> {
        let library = TagFile::from_str(GREET)?.into_library(Config::default())?;
        let mut ctx = Context::new();
        ctx.insert("who", "Ada");

        assert_eq!(library.render("greet who", &mut ctx)?, "Hello Ada! {ok}");
        assert_eq!(library.render(r#"shout "Bob" punct "?""#, &mut ctx)?, "HELLO Bob?");
        assert_eq!(library.render(r#"shout "Bob" volume 11"#, &mut ctx)?, "HELLO Bob!11");
        Ok(())
    }

    #[test]
    fn test_load_from_file() -> Result<()> {
        let dir = tempfile::TempDir::new()?;
        let path = dir.path().join("tags.toml");
        fs::write(&path, GREET)?;

        let file = TagFile::load(&path)?;
        assert_eq!(file.tags.len(), 2);
        assert_eq!(file.tags[1].extends, vec!["greet".to_string()]);

        let err = TagFile::load(&dir.path().join("missing.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read tag file"));
        Ok(())
    }

    #[test]
    fn test_unknown_base_is_reported() {
        let source = r#"
            [[tag]]
            name = "child"
            extends = ["parent"]
        "#;
        let err = TagFile::from_str(source)
            .unwrap()
            .into_library(Config::default())
            .err().unwrap();
        assert!(format!("{:#}", err).contains("extends unknown tag 'parent'"));
    }

    #[test]
    fn test_instance_needs_class() {
        let source = r#"
            [[tag]]
            name = "link"

            [[tag.arg]]
            key = "target"
            kind = "instance"
        "#;
        let err = TagFile::from_str(source)
            .unwrap()
            .into_library(Config::default())
            .err().unwrap();
        assert!(format!("{:#}", err).contains("needs a 'class'"));
    }

    #[test]
    fn test_undeclared_placeholder() -> Result<()> {
        let source = r#"
            [[tag]]
            name = "oops"
            output = "{missing}"
        "#;
        let library = TagFile::from_str(source)?.into_library(Config::default())?;
        let err = library.render("oops", &mut Context::new()).unwrap_err();
        assert!(matches!(err, RenderError::MissingArgument(_)));
        Ok(())
    }

    #[test]
    fn test_toml_dates() {
        let value: toml::Value = toml::from_str::<toml::Table>("d = 2024-01-31")
            .unwrap()
            .remove("d")
            .unwrap();
        assert_eq!(
            toml_to_value(value),
            Value::Date(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap())
        );
    }
}
