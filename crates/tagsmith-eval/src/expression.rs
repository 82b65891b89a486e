//! Default compile capability for deferred argument values.
//!
//! [`FilterCompiler`] understands the small expression language used by
//! invocation lines:
//!
//! | token | expression |
//! |-------|------------|
//! | `"text"`, `'text'` | string constant |
//! | `42`, `-3`, `1.5` | number constant |
//! | `True`, `False`, `None` | bool / null constant |
//! | `user.name`, `items.0` | variable path looked up in the [`Context`](crate::Context) |
//!
//! Anything else fails with [`SyntaxError::InvalidExpression`].

use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use tagsmith_syntax::{
    Compiler, Expression, Lookup, Resolution, SharedExpression, SyntaxError, Token, Value,
};

static INT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[+-]?\d+$").expect("valid regex"));
static FLOAT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?(\d+\.\d*|\.\d+)([eE][+-]?\d+)?$").expect("valid regex"));
static PATH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z0-9_]+)*$").expect("valid regex")
});

#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpression {
    Constant { source: String, value: Value },
    Variable { source: String },
}

impl FilterExpression {
    pub fn is_constant(&self) -> bool {
        matches!(self, FilterExpression::Constant { .. })
    }
}

impl Expression for FilterExpression {
    fn resolve(&self, context: &dyn Lookup) -> Resolution {
        match self {
            FilterExpression::Constant { value, .. } => Resolution::Found(value.clone()),
            FilterExpression::Variable { source } => match context.lookup(source) {
                Some(value) => Resolution::Found(value),
                None => Resolution::Missing(source.clone()),
            },
        }
    }

    fn source(&self) -> &str {
        match self {
            FilterExpression::Constant { source, .. } | FilterExpression::Variable { source } => {
                source
            }
        }
    }
}

/// Parses a single token into a [`FilterExpression`].
pub fn compile_filter(token: &Token) -> Result<FilterExpression, SyntaxError> {
    let source = token.text.clone();

    if token.is_quoted() {
        return Ok(FilterExpression::Constant {
            value: Value::String(token.content()),
            source,
        });
    }

    let text = token.text.as_str();
    let constant = match text {
        "True" => Some(Value::Bool(true)),
        "False" => Some(Value::Bool(false)),
        "None" => Some(Value::Null),
        _ if INT_RE.is_match(text) => Some(parse_int(token)?),
        _ if FLOAT_RE.is_match(text) => Some(parse_float(token)?),
        _ => None,
    };
    if let Some(value) = constant {
        return Ok(FilterExpression::Constant { source, value });
    }

    if PATH_RE.is_match(text) {
        return Ok(FilterExpression::Variable { source });
    }

    Err(invalid(token, "not a literal or a variable path"))
}

fn parse_int(token: &Token) -> Result<Value, SyntaxError> {
    token
        .text
        .parse::<i64>()
        .map(Value::Int)
        .map_err(|e| invalid(token, &e.to_string()))
}

fn parse_float(token: &Token) -> Result<Value, SyntaxError> {
    token
        .text
        .parse::<f64>()
        .map(Value::Float)
        .map_err(|e| invalid(token, &e.to_string()))
}

fn invalid(token: &Token, reason: &str) -> SyntaxError {
    SyntaxError::InvalidExpression {
        token: token.text.clone(),
        reason: reason.to_string(),
        span: token.span,
    }
}

/// The compile capability used by [`Library`](crate::Library) unless one is
/// supplied.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterCompiler;

impl Compiler for FilterCompiler {
    fn compile(&self, token: &Token) -> Result<SharedExpression, SyntaxError> {
        Ok(Arc::new(compile_filter(token)?))
    }
}
