use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// Membership test used by [`ArgKind::Instance`].
pub type InstancePredicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// What shape of value an argument accepts once resolved.
#[derive(Clone)]
pub enum ArgKind {
    /// Any resolved value, left as is.
    Any,
    /// The raw token as a string, never resolved.
    Basic,
    Integer,
    String,
    /// A date (a datetime is accepted too).
    Date,
    Time,
    DateTime,
    Instance {
        class_name: String,
        predicate: InstancePredicate,
    },
    /// A fixed word in positional position, e.g. the `to` in `1 to 2`.
    Constant,
    /// Present or not; consumes no value token.
    Flag,
    /// A run of `name=value` pairs (compact) and/or `value as name` pairs
    /// joined by `and` (verbose).
    Keywords { compact: bool, verbose: bool },
}

impl fmt::Debug for ArgKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgKind::Any => f.write_str("Any"),
            ArgKind::Basic => f.write_str("Basic"),
            ArgKind::Integer => f.write_str("Integer"),
            ArgKind::String => f.write_str("String"),
            ArgKind::Date => f.write_str("Date"),
            ArgKind::Time => f.write_str("Time"),
            ArgKind::DateTime => f.write_str("DateTime"),
            ArgKind::Instance { class_name, .. } => {
                f.debug_struct("Instance").field("class_name", class_name).finish()
            }
            ArgKind::Constant => f.write_str("Constant"),
            ArgKind::Flag => f.write_str("Flag"),
            ArgKind::Keywords { compact, verbose } => f
                .debug_struct("Keywords")
                .field("compact", compact)
                .field("verbose", verbose)
                .finish(),
        }
    }
}

/// Declaration of a single directive argument.
///
/// Built with the constructor for its kind and refined with the chained
/// setters, then handed to a [`SchemaBuilder`](crate::SchemaBuilder) under an
/// attribute key:
///
/// ```rust
/// use tagsmith_syntax::{ArgSpec, Value};
///
/// let limit = ArgSpec::integer().default(Value::Int(5));
/// let start = ArgSpec::integer().positional();
/// let alias = ArgSpec::basic();
/// assert!(!limit.is_required());
/// assert!(start.is_required());
/// assert!(!alias.resolves());
/// ```
#[derive(Debug, Clone)]
pub struct ArgSpec {
    pub(crate) name: Option<String>,
    pub(crate) keyword: Option<String>,
    pub(crate) kind: ArgKind,
    pub(crate) required: bool,
    pub(crate) default: Option<Value>,
    pub(crate) nullable: bool,
    pub(crate) positional: bool,
    pub(crate) multi: bool,
    pub(crate) resolve: bool,
    pub(crate) assign: bool,
}

impl Default for ArgSpec {
    fn default() -> Self {
        Self::new()
    }
}

impl ArgSpec {
    /// A required keyword argument whose value is resolved but not cleaned.
    pub fn new() -> Self {
        Self::of_kind(ArgKind::Any)
    }

    pub fn of_kind(kind: ArgKind) -> Self {
        Self {
            name: None,
            keyword: None,
            kind,
            required: true,
            default: None,
            nullable: false,
            positional: false,
            multi: false,
            resolve: true,
            assign: false,
        }
    }

    pub fn basic() -> Self {
        let mut spec = Self::of_kind(ArgKind::Basic);
        spec.resolve = false;
        spec
    }

    pub fn integer() -> Self {
        Self::of_kind(ArgKind::Integer)
    }

    pub fn string() -> Self {
        Self::of_kind(ArgKind::String)
    }

    pub fn date() -> Self {
        Self::of_kind(ArgKind::Date)
    }

    pub fn time() -> Self {
        Self::of_kind(ArgKind::Time)
    }

    pub fn datetime() -> Self {
        Self::of_kind(ArgKind::DateTime)
    }

    /// Requires an [`Object`](crate::Object) whose `type_name` is `class_name`.
    pub fn instance(class_name: impl Into<String>) -> Self {
        let class_name = class_name.into();
        let expected = class_name.clone();
        let predicate: InstancePredicate = Arc::new(move |value: &Value| {
            matches!(value, Value::Object(obj) if obj.type_name == expected)
        });
        Self::of_kind(ArgKind::Instance { class_name, predicate })
    }

    /// Like [`ArgSpec::instance`] with a host-supplied membership test.
    pub fn instance_with(
        class_name: impl Into<String>,
        predicate: impl Fn(&Value) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self::of_kind(ArgKind::Instance {
            class_name: class_name.into(),
            predicate: Arc::new(predicate),
        })
    }

    /// A positional landmark word. The word is the argument's name unless
    /// [`ArgSpec::keyword`] sets another one.
    pub fn constant() -> Self {
        let mut spec = Self::of_kind(ArgKind::Constant);
        spec.positional = true;
        spec.resolve = false;
        spec
    }

    pub fn flag() -> Self {
        let mut spec = Self::of_kind(ArgKind::Flag);
        spec.required = false;
        spec.resolve = false;
        spec
    }

    pub fn keywords() -> Self {
        Self::of_kind(ArgKind::Keywords { compact: true, verbose: false })
    }

    pub fn positional(mut self) -> Self {
        self.positional = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets the value bound when the argument is not given. An argument with
    /// a default is never required.
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self.required = false;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn multi(mut self) -> Self {
        self.multi = true;
        self
    }

    /// Keeps the token as a literal string instead of resolving it.
    pub fn literal(mut self) -> Self {
        self.resolve = false;
        self
    }

    /// The word that introduces this argument (or, for a constant, the word
    /// it must match). Defaults to the argument name.
    pub fn keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }

    /// Overrides the name derived from the attribute key.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Written as `name=value` in one token instead of `name value`.
    pub fn assign(mut self) -> Self {
        self.assign = true;
        self
    }

    /// For [`ArgKind::Keywords`]: toggles the `name=value` form.
    pub fn compact(mut self, enabled: bool) -> Self {
        if let ArgKind::Keywords { compact, .. } = &mut self.kind {
            *compact = enabled;
        }
        self
    }

    /// For [`ArgKind::Keywords`]: toggles the `value as name and ...` form.
    pub fn verbose(mut self, enabled: bool) -> Self {
        if let ArgKind::Keywords { verbose, .. } = &mut self.kind {
            *verbose = enabled;
        }
        self
    }

    /// The argument name. Empty until the spec has been through a schema
    /// build, unless set with [`ArgSpec::named`].
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    pub fn keyword_token(&self) -> Option<&str> {
        self.keyword.as_deref()
    }

    pub fn kind(&self) -> &ArgKind {
        &self.kind
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn is_positional(&self) -> bool {
        self.positional
    }

    pub fn is_multi(&self) -> bool {
        self.multi
    }

    pub fn resolves(&self) -> bool {
        self.resolve
    }

    pub fn is_assign(&self) -> bool {
        self.assign
    }

    pub fn is_flag(&self) -> bool {
        matches!(self.kind, ArgKind::Flag)
    }

    pub fn is_constant(&self) -> bool {
        matches!(self.kind, ArgKind::Constant)
    }

    /// One-word usage hint, e.g. `<limit>` or `limit <value>`.
    pub fn usage(&self) -> String {
        let body = if self.positional {
            match self.kind {
                ArgKind::Constant => self.keyword_token().unwrap_or(self.name()).to_string(),
                _ => format!("<{}>", self.name()),
            }
        } else {
            let kw = self.keyword_token().unwrap_or(self.name());
            match self.kind {
                ArgKind::Flag => kw.to_string(),
                ArgKind::Keywords { .. } => format!("{} <name>=<value> ...", kw),
                _ if self.assign => format!("{}=<value>", kw),
                _ => format!("{} <value>", kw),
            }
        };
        let body = if self.multi { format!("{},...", body) } else { body };
        if self.required { body } else { format!("[{}]", body) }
    }
}
