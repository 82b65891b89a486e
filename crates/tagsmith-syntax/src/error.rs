use crate::naming::verbose_quantity;
use std::fmt;

/// Renders `error_msg` under the offending line of `source`, with a caret
/// pointing at `span`.
pub fn format_error_with_source(error_msg: &str, source: &str, span: Span) -> String {
    let lines: Vec<&str> = source.lines().collect();

    let line_idx = if span.line > 0 { span.line - 1 } else { 0 };

    if line_idx >= lines.len() {
        return format!("{} at line {}", error_msg, span.line);
    }

    let error_line = lines[line_idx];
    let width = span.end.saturating_sub(span.start).max(1);

    let mut output = String::new();
    output.push_str(&format!("  --> line {}:{}\n", span.line, span.col));
    output.push_str("   |\n");
    output.push_str(&format!(" {} | {}\n", span.line, error_line));
    output.push_str(&format!(
        "   | {}{} {}\n",
        " ".repeat(span.col.saturating_sub(1)),
        "^".repeat(width),
        error_msg
    ));
    output.push_str("   |");

    output
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub line: usize,
    pub col: usize,
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(line: usize, col: usize, start: usize, end: usize) -> Self {
        Self { line, col, start, end }
    }

    pub fn single(line: usize, col: usize, offset: usize) -> Self {
        Self { line, col, start: offset, end: offset + 1 }
    }

    pub fn merge(&self, other: &Span) -> Self {
        Self {
            line: self.line.min(other.line),
            col: if self.line == other.line { self.col.min(other.col) } else { self.col },
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// A directive type was declared incorrectly.
///
/// Raised while a [`Schema`](crate::Schema) is being built. These always
/// point at a bug in the declaration itself, never at template input.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaError {
    RequiredAfterOptional { tag: String, arg: String },
    DuplicatePositional { tag: String, arg: String },
    DuplicateKeyword { tag: String, keyword: String },
    PositionalOverride { tag: String, arg: String },
    InvalidFlag { tag: String, arg: String, reason: String },
    EmptyName { tag: String, key: String },
    InvalidName { tag: String, name: String },
    ReservedKeyword { tag: String, keyword: String },
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::RequiredAfterOptional { tag, arg } => write!(
                f,
                "required '{}' positional argument of '{}' cannot exist after optional positional arguments",
                arg, tag
            ),
            SchemaError::DuplicatePositional { tag, arg } => {
                write!(f, "'{}' declares positional argument '{}' more than once", tag, arg)
            }
            SchemaError::DuplicateKeyword { tag, keyword } => {
                write!(f, "'{}' declares keyword '{}' more than once", tag, keyword)
            }
            SchemaError::PositionalOverride { tag, arg } => write!(
                f,
                "'{}' cannot redeclare inherited positional argument '{}'",
                tag, arg
            ),
            SchemaError::InvalidFlag { tag, arg, reason } => {
                write!(f, "flag argument '{}' of '{}' {}", arg, tag, reason)
            }
            SchemaError::EmptyName { tag, key } => write!(
                f,
                "argument '{}' of '{}' has no name (use ArgSpec::named)",
                key, tag
            ),
            SchemaError::InvalidName { tag, name } => {
                write!(f, "'{}' is not a valid argument name for '{}'", name, tag)
            }
            SchemaError::ReservedKeyword { tag, keyword } => write!(
                f,
                "{} can not explicitly define an argument called '{}'",
                tag, keyword
            ),
        }
    }
}

impl std::error::Error for SchemaError {}

/// One invocation's tokens do not satisfy its directive's schema.
#[derive(Debug, Clone, PartialEq)]
pub enum SyntaxError {
    TooFewArguments { tag: String, minimum: usize },
    ExpectedLiteral { expected: String, found: String, span: Span },
    UnexpectedArgument { tag: String, argument: String, span: Span },
    MissingValue { tag: String, argument: String, span: Span },
    MissingRequired { tag: String, argument: String },
    DuplicateArgument { tag: String, argument: String, span: Span },
    ExpectedAssignment { tag: String, argument: String, span: Span },
    UnexpectedAssignment { tag: String, argument: String, span: Span },
    InvalidExpression { token: String, reason: String, span: Span },
    UnknownTag { name: String },
    EmptyInvocation,
}

impl SyntaxError {
    pub fn span(&self) -> Option<Span> {
        match self {
            SyntaxError::ExpectedLiteral { span, .. }
            | SyntaxError::UnexpectedArgument { span, .. }
            | SyntaxError::MissingValue { span, .. }
            | SyntaxError::DuplicateArgument { span, .. }
            | SyntaxError::ExpectedAssignment { span, .. }
            | SyntaxError::UnexpectedAssignment { span, .. }
            | SyntaxError::InvalidExpression { span, .. } => Some(*span),
            SyntaxError::TooFewArguments { .. }
            | SyntaxError::MissingRequired { .. }
            | SyntaxError::UnknownTag { .. }
            | SyntaxError::EmptyInvocation => None,
        }
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyntaxError::TooFewArguments { tag, minimum } => write!(
                f,
                "'{}' requires at least {}",
                tag,
                verbose_quantity("argument", *minimum)
            ),
            SyntaxError::ExpectedLiteral { expected, found, .. } => {
                write!(f, "expected literal '{}', got '{}'", expected, found)
            }
            SyntaxError::UnexpectedArgument { tag, argument, .. } => {
                write!(f, "'{}' does not take argument '{}'", tag, argument)
            }
            SyntaxError::MissingValue { tag, argument, .. } => {
                write!(f, "'{}' argument '{}' missing value", tag, argument)
            }
            SyntaxError::MissingRequired { tag, argument } => {
                write!(f, "'{}' argument to '{}' is required", argument, tag)
            }
            SyntaxError::DuplicateArgument { tag, argument, .. } => {
                write!(f, "'{}' received argument '{}' more than once", tag, argument)
            }
            SyntaxError::ExpectedAssignment { tag, argument, .. } => {
                write!(f, "'{}' expected '{}=...'", tag, argument)
            }
            SyntaxError::UnexpectedAssignment { tag, argument, .. } => {
                write!(f, "'{}' didn't expect an '=' after '{}'", tag, argument)
            }
            SyntaxError::InvalidExpression { token, reason, .. } => {
                write!(f, "could not parse '{}': {}", token, reason)
            }
            SyntaxError::UnknownTag { name } => write!(f, "invalid tag '{}'", name),
            SyntaxError::EmptyInvocation => write!(f, "empty tag invocation"),
        }
    }
}

impl std::error::Error for SyntaxError {}
