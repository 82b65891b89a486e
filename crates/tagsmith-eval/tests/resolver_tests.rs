use anyhow::Result;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tagsmith_eval::{
    CleanHooks, Context, FilterCompiler, ResolvedData, Resolver, ValidationError, ValidationKind,
    resolve,
};
use tagsmith_syntax::{
    ArgSpec, BoundArgs, BoundValue, Compiler, Expression, Lookup, Resolution, Schema,
    SchemaBuilder, SharedExpression, SyntaxError, Token, Value, bind, tokenize,
};

/// Resolves like a variable lookup and counts how often it is asked to.
#[derive(Debug)]
struct Counted {
    path: String,
    hits: Arc<AtomicUsize>,
}

impl Expression for Counted {
    fn resolve(&self, context: &dyn Lookup) -> Resolution {
        self.hits.fetch_add(1, Ordering::SeqCst);
        match context.lookup(&self.path) {
            Some(value) => Resolution::Found(value),
            None => Resolution::Missing(self.path.clone()),
        }
    }

    fn source(&self) -> &str {
        &self.path
    }
}

struct CountingCompiler {
    hits: Arc<AtomicUsize>,
}

impl Compiler for CountingCompiler {
    fn compile(&self, token: &Token) -> Result<SharedExpression, SyntaxError> {
        Ok(Arc::new(Counted {
            path: token.content(),
            hits: Arc::clone(&self.hits),
        }))
    }
}

fn bound(schema: &Schema, source: &str) -> BoundArgs {
    bind(schema, tokenize(source), &FilterCompiler).expect("invocation binds")
}

#[test]
fn test_keyword_default_resolves() -> Result<()> {
    let schema = SchemaBuilder::new("show")
        .arg("limit", ArgSpec::integer().default(5))
        .build()?;

    let b = bound(&schema, "");
    assert_eq!(b.get("limit").and_then(|v| v.as_literal()), Some(&Value::Int(5)));

    let data = resolve(&schema, &b, &Context::new())?;
    assert_eq!(data.get("limit"), Some(&Value::Int(5)));
    Ok(())
}

#[test]
fn test_constant_landmark_resolves_numbers() -> Result<()> {
    let schema = SchemaBuilder::new("range")
        .arg("start", ArgSpec::integer().positional())
        .arg("to", ArgSpec::constant())
        .arg("finish", ArgSpec::integer().positional())
        .build()?;

    let data = resolve(&schema, &bound(&schema, "1 to 2"), &Context::new())?;
    assert_eq!(data.get("start"), Some(&Value::Int(1)));
    assert_eq!(data.get("finish"), Some(&Value::Int(2)));

    let err = bind(&schema, tokenize("1 toward 2"), &FilterCompiler).unwrap_err();
    assert_eq!(err.to_string(), "expected literal 'to', got 'toward'");
    Ok(())
}

#[test]
fn test_integer_clean_names_the_argument() -> Result<()> {
    let schema = SchemaBuilder::new("show")
        .arg("age", ArgSpec::integer().positional())
        .build()?;
    let mut ctx = Context::new();
    ctx.insert("age_var", "7b");

    let err = resolve(&schema, &bound(&schema, "age_var"), &ctx).unwrap_err();
    assert_eq!(err.argument.as_deref(), Some("age"));
    assert_eq!(err.kind, ValidationKind::Invalid);
    assert!(err.to_string().contains("'age'"));
    assert!(err.to_string().contains("'7b'"));
    Ok(())
}

#[test]
fn test_flag_presence() -> Result<()> {
    let schema = SchemaBuilder::new("show")
        .arg("item", ArgSpec::new().positional())
        .arg("reverse", ArgSpec::flag())
        .build()?;
    let mut ctx = Context::new();
    ctx.insert("x", 1);

    let absent = resolve(&schema, &bound(&schema, "x"), &ctx)?;
    assert_eq!(absent.get("reverse"), Some(&Value::Bool(false)));

    let present_bound = bound(&schema, "x reverse");
    assert_eq!(present_bound.len(), 2);
    let present = resolve(&schema, &present_bound, &ctx)?;
    assert_eq!(present.get("reverse"), Some(&Value::Bool(true)));
    Ok(())
}

#[test]
fn test_literal_is_never_resolved() -> Result<()> {
    let hits = Arc::new(AtomicUsize::new(0));
    let compiler = CountingCompiler { hits: Arc::clone(&hits) };
    let schema = SchemaBuilder::new("show")
        .arg("alias", ArgSpec::basic().positional())
        .arg("limit", ArgSpec::integer().default(5))
        .build()?;

    let b = bind(&schema, tokenize("some_name"), &compiler)?;
    let data = resolve(&schema, &b, &Context::new())?;

    assert_eq!(data.get("alias"), Some(&Value::from("some_name")));
    assert_eq!(hits.load(Ordering::SeqCst), 0);
    Ok(())
}

#[test]
fn test_deferred_resolves_once_per_render() -> Result<()> {
    let hits = Arc::new(AtomicUsize::new(0));
    let compiler = CountingCompiler { hits: Arc::clone(&hits) };
    let schema = SchemaBuilder::new("show")
        .arg("item", ArgSpec::new().positional())
        .arg("ids", ArgSpec::integer().multi().positional())
        .build()?;

    let b = bind(&schema, tokenize("item a,b"), &compiler)?;
    let mut ctx = Context::new();
    ctx.insert("item", "x");
    ctx.insert("a", 1);
    ctx.insert("b", 2);

    resolve(&schema, &b, &ctx)?;
    assert_eq!(hits.load(Ordering::SeqCst), 3);
    resolve(&schema, &b, &ctx)?;
    assert_eq!(hits.load(Ordering::SeqCst), 6);
    Ok(())
}

#[test]
fn test_resolving_twice_is_idempotent() -> Result<()> {
    let schema = SchemaBuilder::new("show")
        .arg("item", ArgSpec::new().positional())
        .arg("with", ArgSpec::keywords())
        .build()?;
    let b = bound(&schema, "user with a=1 b=user.name");
    let mut ctx = Context::new();
    ctx.insert("user", tagsmith_syntax::Object::new("User").with_property("name", "ada".into()));

    let first = resolve(&schema, &b, &ctx)?;
    let second = resolve(&schema, &b, &ctx)?;
    assert_eq!(first, second);

    let with = first.get("with").and_then(|v| v.as_map()).expect("keywords map");
    assert_eq!(with.get("a"), Some(&Value::Int(1)));
    assert_eq!(with.get("b"), Some(&Value::from("ada")));
    Ok(())
}

#[test]
fn test_multi_values_keep_order() -> Result<()> {
    let schema = SchemaBuilder::new("show")
        .arg("ids", ArgSpec::integer().multi().positional())
        .build()?;
    let data = resolve(&schema, &bound(&schema, r#"3,"1",2"#), &Context::new())?;
    assert_eq!(
        data.get("ids"),
        Some(&Value::List(vec![Value::Int(3), Value::Int(1), Value::Int(2)]))
    );
    Ok(())
}

#[test]
fn test_group_for_single_value_is_arity_error() -> Result<()> {
    let schema = SchemaBuilder::new("show")
        .arg("id", ArgSpec::integer().positional())
        .build()?;
    let err = resolve(&schema, &bound(&schema, "1,2"), &Context::new()).unwrap_err();
    assert_eq!(err.kind, ValidationKind::Arity);
    Ok(())
}

#[test]
fn test_missing_variable_is_distinguishable() -> Result<()> {
    let schema = SchemaBuilder::new("show")
        .arg("item", ArgSpec::new().positional())
        .build()?;
    let err = resolve(&schema, &bound(&schema, "nobody.name"), &Context::new()).unwrap_err();
    assert_eq!(err.kind, ValidationKind::MissingVariable("nobody.name".into()));

    let mut ctx = Context::new();
    ctx.insert("nobody", tagsmith_syntax::Object::new("User").with_property("name", Value::Null));
    let err = resolve(&schema, &bound(&schema, "nobody.name"), &ctx).unwrap_err();
    assert_eq!(err.kind, ValidationKind::Null);
    Ok(())
}

#[test]
fn test_first_failure_stops_the_pipeline() -> Result<()> {
    let schema = SchemaBuilder::new("show")
        .arg("first", ArgSpec::integer().positional())
        .arg("second", ArgSpec::integer().positional())
        .build()?;
    let calls = Arc::new(AtomicUsize::new(0));
    let mut hooks = CleanHooks::new();
    let seen = Arc::clone(&calls);
    hooks.set_arg(
        "second",
        Arc::new(move |value: Value| {
            seen.fetch_add(1, Ordering::SeqCst);
            Ok(value)
        }),
    );
    let whole_calls = Arc::new(AtomicUsize::new(0));
    let whole_seen = Arc::clone(&whole_calls);
    hooks.set_whole(Arc::new(move |data: ResolvedData| {
        whole_seen.fetch_add(1, Ordering::SeqCst);
        Ok(data)
    }));

    let err = Resolver::new(&schema)
        .with_hooks(&hooks)
        .resolve(&bound(&schema, r#""x" 2"#), &Context::new())
        .unwrap_err();

    assert_eq!(err.argument.as_deref(), Some("first"));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(whole_calls.load(Ordering::SeqCst), 0);
    Ok(())
}

#[test]
fn test_whole_bag_hook_sees_everything() -> Result<()> {
    let schema = SchemaBuilder::new("range")
        .arg("start", ArgSpec::integer().positional())
        .arg("finish", ArgSpec::integer().positional())
        .build()?;
    let mut hooks = CleanHooks::new();
    hooks.set_whole(Arc::new(|mut data: ResolvedData| {
        let start = data.require("start").ok().and_then(|v| v.as_int()).unwrap_or(0);
        let finish = data.require("finish").ok().and_then(|v| v.as_int()).unwrap_or(0);
        if finish < start {
            return Err(ValidationError::general("finish must not come before start"));
        }
        data.insert("span", Value::Int(finish - start));
        Ok(data)
    }));
    let resolver = Resolver::new(&schema).with_hooks(&hooks);

    let data = resolver.resolve(&bound(&schema, "2 5"), &Context::new())?;
    assert_eq!(data.get("span"), Some(&Value::Int(3)));

    let err = resolver.resolve(&bound(&schema, "5 2"), &Context::new()).unwrap_err();
    assert!(err.argument.is_none());
    assert_eq!(err.to_string(), "finish must not come before start");
    Ok(())
}

#[test]
fn test_bound_map_is_untouched_by_resolution() -> Result<()> {
    let schema = SchemaBuilder::new("show")
        .arg("item", ArgSpec::integer().positional())
        .build()?;
    let b = bound(&schema, r#""42""#);
    let before = b.get("item").map(BoundValue::describe);
    resolve(&schema, &b, &Context::new())?;
    assert_eq!(b.get("item").map(BoundValue::describe), before);
    Ok(())
}
