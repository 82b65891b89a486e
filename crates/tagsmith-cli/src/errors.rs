use colored::*;
use std::fmt;
use tagsmith::{Library, RenderError, Span, SyntaxError, ValidationError, ValidationKind};

/// Error with the invocation it came from and hints for fixing it.
pub struct EnhancedError {
    pub message: String,
    pub span: Option<Span>,
    pub source: Option<String>,
    pub suggestion: Option<String>,
    pub help: Option<String>,
}

impl EnhancedError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            span: None,
            source: None,
            suggestion: None,
            help: None,
        }
    }

    pub fn with_span(mut self, span: Option<Span>) -> Self {
        self.span = span;
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Display the error with colored output and context
    pub fn display(&self) {
        eprintln!("{} {}", "error:".red().bold(), self.message.bold());

        if let Some(span) = &self.span {
            eprintln!("  {} invocation:{}:{}", "-->".blue().bold(), span.line, span.col);
        }

        if let Some(source) = &self.source {
            eprintln!();
            self.display_source(source);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!();
            eprintln!("{} {}", "suggestion:".green().bold(), suggestion);
        }

        if let Some(help) = &self.help {
            eprintln!();
            eprintln!("{} {}", "help:".cyan().bold(), help);
        }
    }

    fn display_source(&self, source: &str) {
        eprintln!("  {} {}", "|".blue().bold(), source);

        let Some(span) = &self.span else {
            return;
        };
        let spaces = " ".repeat(span.col.saturating_sub(1));
        let width = source
            .get(span.start..span.end)
            .map(|s| s.chars().count())
            .unwrap_or(1)
            .max(1);
        eprintln!(
            "  {} {}{}",
            "|".blue().bold(),
            spaces,
            "^".repeat(width).red().bold()
        );
    }
}

impl fmt::Display for EnhancedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Debug for EnhancedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EnhancedError: {}", self.message)
    }
}

impl std::error::Error for EnhancedError {}

/// Builds a report for a parse failure of `line`.
pub fn enhance_syntax_error(err: &SyntaxError, line: &str, library: &Library) -> EnhancedError {
    let mut enhanced = EnhancedError::new(format!("Syntax error: {}", err))
        .with_span(err.span())
        .with_source(line);

    let usage = tag_of(err).and_then(|tag| library.get(tag)).map(|t| t.schema().usage());

    enhanced = match err {
        SyntaxError::UnknownTag { .. } => enhanced
            .with_suggestion("Check the tag name spelling")
            .with_help("Run 'tagsmith tags --tags <FILE>' to list declared tags"),
        SyntaxError::EmptyInvocation => {
            enhanced.with_help("An invocation starts with the tag name, e.g. \"greet name\"")
        }
        SyntaxError::InvalidExpression { .. } => enhanced
            .with_suggestion("Quote literal text, e.g. \"some text\"")
            .with_help("Values are quoted strings, numbers, True/False/None or variable paths like user.name"),
        SyntaxError::ExpectedAssignment { argument, .. } => {
            enhanced.with_suggestion(format!("Write it as {}=<value>", argument))
        }
        SyntaxError::UnexpectedAssignment { argument, .. } => {
            enhanced.with_suggestion(format!("Write it as {} <value>", argument))
        }
        _ => enhanced,
    };

    if let Some(usage) = usage {
        enhanced = enhanced.with_help(format!("usage: {}", usage));
    }
    enhanced
}

/// Builds a report for a render failure of `line`.
pub fn enhance_render_error(err: &RenderError, line: &str, library: &Library) -> EnhancedError {
    match err {
        RenderError::Syntax(e) => enhance_syntax_error(e, line, library),
        RenderError::Validation(e) => enhance_validation_error(e, line),
        RenderError::MissingArgument(e) => EnhancedError::new(format!("Render error: {}", e))
            .with_source(line)
            .with_help("The tag's output refers to an argument that has no value"),
        RenderError::Output(msg) => {
            EnhancedError::new(format!("Render error: {}", msg)).with_source(line)
        }
    }
}

fn enhance_validation_error(err: &ValidationError, line: &str) -> EnhancedError {
    let enhanced = EnhancedError::new(format!("Invalid value: {}", err)).with_source(line);
    match &err.kind {
        ValidationKind::MissingVariable(path) => {
            let root = path.split('.').next().unwrap_or(path);
            enhanced
                .with_suggestion(format!("Define '{}' with --set {}=<value> or in the --context file", root, root))
                .with_help("Arguments declared nullable accept missing variables as null")
        }
        ValidationKind::Null => {
            enhanced.with_help("Declare the argument with nullable = true to accept null")
        }
        ValidationKind::Arity => {
            enhanced.with_help("Comma-joined values are only accepted by arguments declared multi = true")
        }
        ValidationKind::Invalid => enhanced,
    }
}

fn tag_of(err: &SyntaxError) -> Option<&str> {
    match err {
        SyntaxError::TooFewArguments { tag, .. }
        | SyntaxError::UnexpectedArgument { tag, .. }
        | SyntaxError::MissingValue { tag, .. }
        | SyntaxError::MissingRequired { tag, .. }
        | SyntaxError::DuplicateArgument { tag, .. }
        | SyntaxError::ExpectedAssignment { tag, .. }
        | SyntaxError::UnexpectedAssignment { tag, .. } => Some(tag),
        SyntaxError::ExpectedLiteral { .. }
        | SyntaxError::InvalidExpression { .. }
        | SyntaxError::UnknownTag { .. }
        | SyntaxError::EmptyInvocation => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagsmith::{ArgSpec, TagBuilder};

    fn library() -> Library {
        let mut library = Library::new();
        library.register(
            TagBuilder::new("greet")
                .arg("name", ArgSpec::string().positional())
                .arg("sep", ArgSpec::string().assign().default(" "))
                .build()
                .unwrap(),
        );
        library
    }

    #[test]
    fn test_usage_is_offered_for_tag_errors() {
        let library = library();
        let err = library.parse("greet").unwrap_err();
        let enhanced = enhance_syntax_error(&err, "greet", &library);
        assert_eq!(enhanced.help.as_deref(), Some("usage: greet <name> [sep=<value>]"));
    }

    #[test]
    fn test_assignment_suggestion() {
        let library = library();
        let line = r#"greet "a" sep ",""#;
        let err = library.parse(line).unwrap_err();
        let enhanced = enhance_syntax_error(&err, line, &library);
        assert_eq!(enhanced.suggestion.as_deref(), Some("Write it as sep=<value>"));
        assert!(enhanced.span.is_some());
    }

    #[test]
    fn test_missing_variable_suggestion() {
        let err = ValidationError {
            argument: Some("name".into()),
            kind: ValidationKind::MissingVariable("user.name".into()),
            message: "missing".into(),
        };
        let enhanced = enhance_validation_error(&err, "greet user.name");
        assert_eq!(
            enhanced.suggestion.as_deref(),
            Some("Define 'user' with --set user=<value> or in the --context file")
        );
    }
}
