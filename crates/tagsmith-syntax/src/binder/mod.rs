mod keyword;
mod positional;

use crate::bound::{BoundArgs, BoundValue};
use crate::error::SyntaxError;
use crate::expr::Compiler;
use crate::lexer::{Token, TokenTree};
use crate::schema::Schema;
use crate::spec::ArgSpec;
use crate::value::Value;
use tracing::debug;

/// Matches one invocation's tokens against a [`Schema`].
///
/// Binding is strictly two-phase: every positional argument is offered a
/// token first, then the remaining tokens are read as keyword arguments.
/// Use the free function [`bind()`] for a convenient entry point.
pub struct Binder<'a> {
    pub(super) schema: &'a Schema,
    pub(super) compiler: &'a dyn Compiler,
    pub(super) tokens: Vec<TokenTree>,
    pub(super) pos: usize,
    pub(super) bound: BoundArgs,
}

impl<'a> Binder<'a> {
    pub fn new(
        schema: &'a Schema,
        tokens: impl IntoIterator<Item = TokenTree>,
        compiler: &'a dyn Compiler,
    ) -> Self {
        Self {
            schema,
            compiler,
            tokens: tokens.into_iter().collect(),
            pos: 0,
            bound: BoundArgs::default(),
        }
    }

    #[inline]
    pub(super) fn peek(&self) -> Option<&TokenTree> {
        self.tokens.get(self.pos)
    }

    #[inline]
    pub(super) fn peek_nth(&self, n: usize) -> Option<&TokenTree> {
        self.tokens.get(self.pos + n)
    }

    #[inline]
    pub(super) fn advance(&mut self) -> Option<TokenTree> {
        let tree = self.tokens.get(self.pos).cloned();
        if tree.is_some() {
            self.pos += 1;
        }
        tree
    }

    /// True if `tree` would be read as a keyword of this schema.
    pub(super) fn is_keyword_shaped(&self, tree: &TokenTree) -> bool {
        let Some(token) = tree.as_single() else {
            return false;
        };
        if self.schema.is_keyword(&token.text) {
            return true;
        }
        token
            .split_assignment()
            .is_some_and(|(name, _)| self.schema.is_keyword(name))
    }

    pub(super) fn compile_tree(
        &self,
        spec: &ArgSpec,
        tree: &TokenTree,
    ) -> Result<BoundValue, SyntaxError> {
        match tree {
            TokenTree::Single(token) => self.compile_token(spec, token),
            TokenTree::Group(tokens) => tokens
                .iter()
                .map(|token| self.compile_token(spec, token))
                .collect::<Result<Vec<_>, _>>()
                .map(BoundValue::Multi),
        }
    }

    pub(super) fn compile_token(
        &self,
        spec: &ArgSpec,
        token: &Token,
    ) -> Result<BoundValue, SyntaxError> {
        if spec.resolves() {
            Ok(BoundValue::Deferred(self.compiler.compile(token)?))
        } else {
            Ok(BoundValue::Literal(Value::String(token.content())))
        }
    }

    /// Binds everything and returns the result.
    pub fn bind(mut self) -> Result<BoundArgs, SyntaxError> {
        self.bind_positional()?;
        self.bind_keywords()?;
        self.fill_defaults()?;

        debug!(
            tag = self.schema.name(),
            tokens = self.tokens.len(),
            bound = self.bound.len(),
            "bound directive arguments"
        );

        Ok(self.bound)
    }

    fn fill_defaults(&mut self) -> Result<(), SyntaxError> {
        let schema = self.schema;
        for spec in schema.keyword_args() {
            if self.bound.contains(spec.name()) {
                continue;
            }
            if spec.is_flag() {
                self.bound.insert(spec.name(), BoundValue::Literal(Value::Bool(false)));
            } else if let Some(default) = spec.default_value() {
                self.bound.insert(spec.name(), BoundValue::Literal(default.clone()));
            } else if spec.is_required() {
                return Err(SyntaxError::MissingRequired {
                    tag: schema.name().to_string(),
                    argument: spec.name().to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Binds a token sequence against `schema`, compiling resolvable tokens
/// with `compiler`.
pub fn bind(
    schema: &Schema,
    tokens: impl IntoIterator<Item = TokenTree>,
    compiler: &dyn Compiler,
) -> Result<BoundArgs, SyntaxError> {
    Binder::new(schema, tokens, compiler).bind()
}
