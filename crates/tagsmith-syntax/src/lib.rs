//! # tagsmith syntax
//!
//! Declaration and parse-time half of tagsmith: argument specs, directive
//! schemas, the invocation tokenizer and the binder.
//!
//! ## Overview
//!
//! - **ArgSpec**: the rules for one declared argument
//! - **SchemaBuilder / Schema**: an immutable argument layout per directive type
//! - **Tokenizer**: splits an invocation line, honoring quotes and comma groups
//! - **Binder**: matches tokens to the schema, producing [`BoundArgs`]
//! - **Errors**: [`SchemaError`] for bad declarations, [`SyntaxError`] for bad invocations
//!
//! ## Architecture
//!
//! ```text
//! Vec<(key, ArgSpec)> ──SchemaBuilder──▶ Schema        (once per directive type)
//!
//! "1 to 2"  ──tokenize──▶ TokenTree*
//!           ──bind(schema, compiler)──▶ BoundArgs      (once per invocation)
//! ```
//!
//! Resolving [`BoundArgs`] against a render context lives in `tagsmith-eval`.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use tagsmith_syntax::{
//!     ArgSpec, BoundValue, Lookup, Resolution, SchemaBuilder, SharedExpression, SyntaxError,
//!     Token, bind, tokenize,
//! };
//!
//! #[derive(Debug)]
//! struct Var(String);
//!
//! impl tagsmith_syntax::Expression for Var {
//!     fn resolve(&self, context: &dyn Lookup) -> Resolution {
//!         match context.lookup(&self.0) {
//!             Some(value) => Resolution::Found(value),
//!             None => Resolution::Missing(self.0.clone()),
//!         }
//!     }
//!     fn source(&self) -> &str {
//!         &self.0
//!     }
//! }
//!
//! let compile = |token: &Token| -> Result<SharedExpression, SyntaxError> {
//!     Ok(Arc::new(Var(token.content())))
//! };
//!
//! let schema = SchemaBuilder::new("constant")
//!     .arg("start", ArgSpec::new().positional())
//!     .arg("to", ArgSpec::constant())
//!     .arg("finish", ArgSpec::new().positional())
//!     .build()
//!     .expect("valid schema");
//!
//! let bound = bind(&schema, tokenize("1 to 2"), &compile).expect("valid invocation");
//! assert!(matches!(bound.get("start"), Some(BoundValue::Deferred(_))));
//!
//! let err = bind(&schema, tokenize("1 toward 2"), &compile).unwrap_err();
//! assert_eq!(err.to_string(), "expected literal 'to', got 'toward'");
//! ```

pub mod binder;
pub mod bound;
pub mod error;
pub mod expr;
pub mod lexer;
pub mod naming;
pub mod schema;
pub mod spec;
pub mod value;

pub use binder::{Binder, bind};
pub use bound::{BoundArgs, BoundValue};
pub use error::{SchemaError, Span, SyntaxError, format_error_with_source};
pub use expr::{Compiler, Expression, Lookup, Resolution, SharedExpression};
pub use lexer::{Token, TokenTree, Tokens, tokenize, tokenize_at};
pub use schema::{Schema, SchemaBuilder};
pub use spec::{ArgKind, ArgSpec, InstancePredicate};
pub use value::{Object, Value};
