//! Capabilities supplied by the host for late-bound values.
//!
//! The binder never interprets variable syntax itself. It hands every
//! resolvable token to a [`Compiler`] and keeps the resulting
//! [`Expression`] until a render supplies something to [`Lookup`] in.

use crate::error::SyntaxError;
use crate::lexer::Token;
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// Read access to a render context.
pub trait Lookup {
    /// Resolves a dotted variable path (`user.name`, `items.0`).
    fn lookup(&self, path: &str) -> Option<Value>;
}

/// Outcome of resolving an [`Expression`].
///
/// `Missing` is kept apart from a resolved `Value::Null` so callers can
/// tell "the variable holds null" from "there is no such variable".
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Found(Value),
    Missing(String),
}

impl Resolution {
    pub fn into_value(self) -> Option<Value> {
        match self {
            Resolution::Found(value) => Some(value),
            Resolution::Missing(_) => None,
        }
    }
}

pub trait Expression: fmt::Debug + Send + Sync {
    fn resolve(&self, context: &dyn Lookup) -> Resolution;

    /// The token text this expression was compiled from.
    fn source(&self) -> &str;
}

pub type SharedExpression = Arc<dyn Expression>;

/// Turns a raw token into an [`Expression`] at parse time.
pub trait Compiler: Send + Sync {
    fn compile(&self, token: &Token) -> Result<SharedExpression, SyntaxError>;
}

impl<F> Compiler for F
where
    F: Fn(&Token) -> Result<SharedExpression, SyntaxError> + Send + Sync,
{
    fn compile(&self, token: &Token) -> Result<SharedExpression, SyntaxError> {
        self(token)
    }
}
