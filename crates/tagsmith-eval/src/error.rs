//! Render-time error types.
//!
//! [`ValidationError`] is raised while resolving and cleaning the bound
//! arguments of one invocation, [`MissingArgument`] when a directive reads a
//! name the resolved bag does not hold, and [`RenderError`] wraps both
//! together with parse-time [`SyntaxError`]s so a caller can match on one
//! type for a whole `parse` + `render` round trip.

use std::fmt;
use tagsmith_syntax::SyntaxError;

/// What went wrong with a value during resolution or cleaning.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationKind {
    /// A null value reached an argument that is not nullable.
    Null,
    /// A variable path was not found in the context.
    MissingVariable(String),
    /// The value has the wrong type or shape.
    Invalid,
    /// A list was given where a single value was expected, or vice versa.
    Arity,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// The argument being cleaned, `None` for whole-bag failures.
    pub argument: Option<String>,
    pub kind: ValidationKind,
    pub message: String,
}

impl ValidationError {
    pub fn new(argument: Option<&str>, kind: ValidationKind, message: impl Into<String>) -> Self {
        Self {
            argument: argument.map(str::to_string),
            kind,
            message: message.into(),
        }
    }

    /// A type or shape failure on a single argument.
    pub fn invalid(argument: &str, message: impl Into<String>) -> Self {
        Self::new(Some(argument), ValidationKind::Invalid, message)
    }

    /// A failure raised by a whole-bag hook, not tied to one argument.
    pub fn general(message: impl Into<String>) -> Self {
        Self::new(None, ValidationKind::Invalid, message)
    }

    pub(crate) fn null(argument: &str) -> Self {
        Self::new(
            Some(argument),
            ValidationKind::Null,
            format!("Value for '{}' must not be null", argument),
        )
    }

    pub(crate) fn missing_variable(argument: &str, path: &str) -> Self {
        Self::new(
            Some(argument),
            ValidationKind::MissingVariable(path.to_string()),
            format!(
                "Value for '{}' could not be resolved: variable '{}' does not exist",
                argument, path
            ),
        )
    }

    pub(crate) fn arity(argument: &str, message: impl Into<String>) -> Self {
        Self::new(Some(argument), ValidationKind::Arity, message)
    }

    pub fn is_missing_variable(&self) -> bool {
        matches!(self.kind, ValidationKind::MissingVariable(_))
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ValidationError {}

/// A directive asked the resolved bag for a value it does not hold.
#[derive(Debug, Clone, PartialEq)]
pub struct MissingArgument {
    pub tag: String,
    pub name: String,
    /// Whether the schema declares the name at all.
    pub declared: bool,
}

impl fmt::Display for MissingArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.declared {
            write!(f, "'{}' argument '{}' was not supplied", self.tag, self.name)
        } else {
            write!(f, "'{}' has no argument called '{}'", self.tag, self.name)
        }
    }
}

impl std::error::Error for MissingArgument {}

/// Everything that can stop an invocation from producing output.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderError {
    Syntax(SyntaxError),
    Validation(ValidationError),
    MissingArgument(MissingArgument),
    /// Raised by a directive's output function.
    Output(String),
}

impl RenderError {
    pub fn output(message: impl Into<String>) -> Self {
        RenderError::Output(message.into())
    }

    /// Errors that a silence policy may turn into placeholder output.
    pub fn is_silenceable(&self) -> bool {
        matches!(
            self,
            RenderError::Validation(_) | RenderError::MissingArgument(_)
        )
    }
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::Syntax(e) => write!(f, "{}", e),
            RenderError::Validation(e) => write!(f, "{}", e),
            RenderError::MissingArgument(e) => write!(f, "{}", e),
            RenderError::Output(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Syntax(e) => Some(e),
            RenderError::Validation(e) => Some(e),
            RenderError::MissingArgument(e) => Some(e),
            RenderError::Output(_) => None,
        }
    }
}

impl From<SyntaxError> for RenderError {
    fn from(e: SyntaxError) -> Self {
        RenderError::Syntax(e)
    }
}

impl From<ValidationError> for RenderError {
    fn from(e: ValidationError) -> Self {
        RenderError::Validation(e)
    }
}

impl From<MissingArgument> for RenderError {
    fn from(e: MissingArgument) -> Self {
        RenderError::MissingArgument(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::invalid("limit", "Value for 'limit' must be an integer (got '7b')");
        assert_eq!(err.to_string(), "Value for 'limit' must be an integer (got '7b')");
        assert_eq!(err.argument.as_deref(), Some("limit"));
    }

    #[test]
    fn test_missing_variable_kind() {
        let err = ValidationError::missing_variable("user", "request.user");
        assert!(err.is_missing_variable());
        assert_eq!(err.kind, ValidationKind::MissingVariable("request.user".into()));
    }

    #[test]
    fn test_render_error_silenceable() {
        let validation: RenderError = ValidationError::general("nope").into();
        assert!(validation.is_silenceable());

        let syntax: RenderError = SyntaxError::EmptyInvocation.into();
        assert!(!syntax.is_silenceable());
        assert!(!RenderError::output("boom").is_silenceable());
    }

    #[test]
    fn test_missing_argument_display() {
        let declared = MissingArgument { tag: "show".into(), name: "limit".into(), declared: true };
        assert_eq!(declared.to_string(), "'show' argument 'limit' was not supplied");

        let unknown = MissingArgument { tag: "show".into(), name: "page".into(), declared: false };
        assert_eq!(unknown.to_string(), "'show' has no argument called 'page'");
    }
}
