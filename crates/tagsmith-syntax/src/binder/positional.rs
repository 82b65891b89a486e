use super::Binder;
use crate::bound::BoundValue;
use crate::error::SyntaxError;
use crate::lexer::TokenTree;
use crate::value::Value;

impl Binder<'_> {
    pub(super) fn bind_positional(&mut self) -> Result<(), SyntaxError> {
        let schema = self.schema;

        for spec in schema.positional_args() {
            let available = match self.peek() {
                Some(tree) => spec.is_required() || !self.is_keyword_shaped(tree),
                None => false,
            };

            if !available {
                if spec.is_required() {
                    return Err(SyntaxError::TooFewArguments {
                        tag: schema.name().to_string(),
                        minimum: schema.min_positional(),
                    });
                }
                if let Some(default) = spec.default_value() {
                    self.bound.insert(spec.name(), BoundValue::Literal(default.clone()));
                }
                continue;
            }

            let Some(tree) = self.advance() else {
                continue;
            };

            if spec.is_constant() {
                let expected = spec.keyword_token().unwrap_or(spec.name());
                match &tree {
                    TokenTree::Single(token) if token.text == expected => {
                        self.bound
                            .insert(spec.name(), BoundValue::Literal(Value::String(token.text.clone())));
                    }
                    other => {
                        return Err(SyntaxError::ExpectedLiteral {
                            expected: expected.to_string(),
                            found: other.text(),
                            span: other.span(),
                        });
                    }
                }
                continue;
            }

            let value = self.compile_tree(spec, &tree)?;
            self.bound.insert(spec.name(), value);
        }

        Ok(())
    }
}
