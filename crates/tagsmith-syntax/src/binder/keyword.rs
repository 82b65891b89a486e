use super::Binder;
use crate::bound::BoundValue;
use crate::error::SyntaxError;
use crate::lexer::TokenTree;
use crate::naming::is_valid_name;
use crate::spec::{ArgKind, ArgSpec};
use crate::value::Value;

impl Binder<'_> {
    pub(super) fn bind_keywords(&mut self) -> Result<(), SyntaxError> {
        let schema = self.schema;
        let tag = schema.name();

        while let Some(tree) = self.advance() {
            let token = match tree {
                TokenTree::Single(token) => token,
                group @ TokenTree::Group(_) => {
                    return Err(SyntaxError::UnexpectedArgument {
                        tag: tag.to_string(),
                        argument: group.text(),
                        span: group.span(),
                    });
                }
            };

            let (keyword, inline) = match token.split_assignment() {
                Some((name, value)) => (name.to_string(), Some(value)),
                None => (token.text.clone(), None),
            };

            let Some(spec) = schema.keyword(&keyword) else {
                return Err(SyntaxError::UnexpectedArgument {
                    tag: tag.to_string(),
                    argument: keyword,
                    span: token.span,
                });
            };

            if self.bound.contains(spec.name()) {
                return Err(SyntaxError::DuplicateArgument {
                    tag: tag.to_string(),
                    argument: keyword,
                    span: token.span,
                });
            }

            match (inline.is_some(), spec.is_assign()) {
                (true, false) => {
                    return Err(SyntaxError::UnexpectedAssignment {
                        tag: tag.to_string(),
                        argument: keyword,
                        span: token.span,
                    });
                }
                (false, true) => {
                    return Err(SyntaxError::ExpectedAssignment {
                        tag: tag.to_string(),
                        argument: keyword,
                        span: token.span,
                    });
                }
                _ => {}
            }

            if spec.is_flag() {
                self.bound.insert(spec.name(), BoundValue::Literal(Value::Bool(true)));
                continue;
            }

            if let ArgKind::Keywords { compact, verbose } = *spec.kind() {
                let pairs = self.consume_pairs(spec, compact, verbose)?;
                if pairs.is_empty() {
                    return Err(SyntaxError::MissingValue {
                        tag: tag.to_string(),
                        argument: keyword,
                        span: token.span,
                    });
                }
                self.bound.insert(spec.name(), BoundValue::Keywords(pairs));
                continue;
            }

            let value_tree = match inline {
                Some(value) if !value.text.is_empty() => Some(TokenTree::Single(value)),
                Some(_) => None,
                None => self.advance(),
            };
            let Some(value_tree) = value_tree else {
                return Err(SyntaxError::MissingValue {
                    tag: tag.to_string(),
                    argument: keyword,
                    span: token.span,
                });
            };

            let value = self.compile_tree(spec, &value_tree)?;
            self.bound.insert(spec.name(), value);
        }

        Ok(())
    }

    /// Collects `name=value` and/or `value as name [and ...]` pairs until
    /// the next keyword of the schema or the end of input.
    fn consume_pairs(
        &mut self,
        spec: &ArgSpec,
        compact: bool,
        verbose: bool,
    ) -> Result<Vec<(String, BoundValue)>, SyntaxError> {
        let mut pairs = Vec::new();

        while let Some(tree) = self.peek() {
            if self.is_keyword_shaped(tree) {
                break;
            }
            let Some(token) = tree.as_single() else {
                break;
            };

            if compact {
                if let Some((name, value)) = token.split_assignment() {
                    if is_valid_name(name) && !value.text.is_empty() {
                        let pair = (name.to_string(), self.compile_token(spec, &value)?);
                        self.advance();
                        pairs.push(pair);
                        continue;
                    }
                }
            }

            if verbose && self.verbose_pair_ahead() {
                let (Some(value), Some(_as), Some(name)) =
                    (self.advance(), self.advance(), self.advance())
                else {
                    break;
                };
                let name = name.text();
                pairs.push((name, self.compile_tree(spec, &value)?));

                let and_follows = self
                    .peek()
                    .and_then(|t| t.as_single())
                    .is_some_and(|t| t.text == "and");
                if and_follows {
                    self.advance();
                }
                continue;
            }

            break;
        }

        Ok(pairs)
    }

    fn verbose_pair_ahead(&self) -> bool {
        let is_as = self
            .peek_nth(1)
            .and_then(|t| t.as_single())
            .is_some_and(|t| t.text == "as");
        let name_ok = self
            .peek_nth(2)
            .and_then(|t| t.as_single())
            .is_some_and(|t| is_valid_name(&t.text));
        is_as && name_ok
    }
}
