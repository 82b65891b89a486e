//! # tagsmith eval
//!
//! Render-time half of tagsmith: resolving bound arguments against a
//! [`Context`], cleaning them, and running directives registered in a
//! [`Library`].
//!
//! ```text
//! Library::parse("show items limit 5") ──▶ Node { Tag, BoundArgs }
//! Node::render(&mut Context)
//!     ──Resolver──▶ resolve ─▶ null check ─▶ clean ─▶ arg hook ─▶ bag hook
//!     ──▶ ResolvedData ──output fn──▶ String
//! ```

pub mod clean;
pub mod config;
pub mod context;
pub mod data;
pub mod error;
pub mod expression;
pub mod hooks;
pub mod library;
pub mod resolve;
pub mod tag;

pub use clean::clean_value;
pub use config::Config;
pub use context::{Context, json_to_value};
pub use data::{Entry, ResolvedData};
pub use error::{MissingArgument, RenderError, ValidationError, ValidationKind};
pub use expression::{FilterCompiler, FilterExpression, compile_filter};
pub use hooks::{ArgHook, CleanHooks, DataHook};
pub use library::{Library, Node};
pub use resolve::{Resolver, resolve};
pub use tag::{OutputFn, TEMPLATE_KEYWORD, Tag, TagBuilder};
