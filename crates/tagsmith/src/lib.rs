//! Declarative argument schemas for template directives.
//!
//! Declare a tag once, then parse invocation lines and render them against
//! any number of contexts:
//!
//! ```rust
//! use tagsmith::prelude::*;
//!
//! let mut library = Library::new();
//! library.register(
//!     TagBuilder::new("range")
//!         .arg("start", ArgSpec::integer().positional())
//!         .arg("to", ArgSpec::constant())
//!         .arg("finish", ArgSpec::integer().positional())
//!         .output(|data, _ctx| {
//!             let start = data.require("start")?.as_int().unwrap_or(0);
//!             let finish = data.require("finish")?.as_int().unwrap_or(0);
//!             Ok((start..=finish).map(|n| n.to_string()).collect::<Vec<_>>().join(","))
//!         })
//!         .build()
//!         .expect("valid declaration"),
//! );
//!
//! let node = library.parse("range 1 to n").expect("valid invocation");
//! let mut ctx = Context::new();
//! ctx.insert("n", 4);
//! assert_eq!(node.render(&mut ctx).unwrap(), "1,2,3,4");
//! ```

pub use tagsmith_eval::{
    CleanHooks, Config, Context, Entry, FilterCompiler, Library, MissingArgument, Node,
    RenderError, ResolvedData, Resolver, Tag, TagBuilder, ValidationError, ValidationKind,
    resolve,
};
pub use tagsmith_syntax::{
    ArgKind, ArgSpec, BoundArgs, BoundValue, Compiler, Expression, Lookup, Object, Resolution,
    Schema, SchemaBuilder, SchemaError, SharedExpression, Span, SyntaxError, Token, TokenTree,
    Value, bind, tokenize,
};
pub use tagsmith_eval as eval;
pub use tagsmith_syntax as syntax;

pub mod prelude {
    pub use crate::{ArgSpec, Context, Library, TagBuilder, Value};
    pub use crate::{RenderError, SchemaError, SyntaxError, ValidationError};
}
