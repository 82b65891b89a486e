use crate::error::Span;
use smallvec::SmallVec;
use std::fmt;

/// One atomic piece of an invocation line.
///
/// `text` is the raw source slice, quotes included; [`Token::content`]
/// gives the unquoted form.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub text: String,
    pub span: Span,
}

impl Token {
    pub fn new(text: impl Into<String>, span: Span) -> Self {
        Self { text: text.into(), span }
    }

    /// Returns the quote character if the whole token is one quoted run.
    pub fn quote(&self) -> Option<char> {
        let mut chars = self.text.chars();
        let first = chars.next()?;
        if first != '"' && first != '\'' {
            return None;
        }
        let last = chars.next_back()?;
        if last != first {
            return None;
        }
        let inner = &self.text[first.len_utf8()..self.text.len() - last.len_utf8()];
        (!ends_with_escape(inner)).then_some(first)
    }

    pub fn is_quoted(&self) -> bool {
        self.quote().is_some()
    }

    /// The token without its surrounding quotes and with `\"`, `\'` and
    /// `\\` escapes removed. Unquoted tokens are returned unchanged.
    pub fn content(&self) -> String {
        let Some(_) = self.quote() else {
            return self.text.clone();
        };
        let inner = &self.text[1..self.text.len() - 1];
        let mut out = String::with_capacity(inner.len());
        let mut chars = inner.chars();
        while let Some(ch) = chars.next() {
            if ch == '\\' {
                match chars.next() {
                    Some(next @ ('"' | '\'' | '\\')) => out.push(next),
                    Some(next) => {
                        out.push('\\');
                        out.push(next);
                    }
                    None => out.push('\\'),
                }
            } else {
                out.push(ch);
            }
        }
        out
    }

    /// Splits `name=value` into the name and a token for the value part.
    ///
    /// Only the first `=` outside quotes counts, and the part before it must
    /// not be quoted.
    pub fn split_assignment(&self) -> Option<(&str, Token)> {
        if self.text.starts_with('"') || self.text.starts_with('\'') {
            return None;
        }
        let idx = self.text.find('=')?;
        let name = &self.text[..idx];
        if name.is_empty() || name.contains('"') || name.contains('\'') {
            return None;
        }
        let value_start = self.span.start + idx + 1;
        let value = Token::new(
            &self.text[idx + 1..],
            Span::new(
                self.span.line,
                self.span.col + name.chars().count() + 1,
                value_start,
                self.span.end,
            ),
        );
        Some((name, value))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

fn ends_with_escape(s: &str) -> bool {
    s.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

/// A single token, or a comma-joined run of tokens (`a,b,"c d"`).
#[derive(Debug, Clone, PartialEq)]
pub enum TokenTree {
    Single(Token),
    Group(SmallVec<[Token; 4]>),
}

impl TokenTree {
    pub fn span(&self) -> Span {
        match self {
            TokenTree::Single(token) => token.span,
            TokenTree::Group(tokens) => match tokens.split_first() {
                Some((head, rest)) => rest.iter().fold(head.span, |acc, t| acc.merge(&t.span)),
                None => Span::default(),
            },
        }
    }

    pub fn as_single(&self) -> Option<&Token> {
        match self {
            TokenTree::Single(token) => Some(token),
            TokenTree::Group(_) => None,
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, TokenTree::Group(_))
    }

    /// Raw text as written, with group members joined by `,`.
    pub fn text(&self) -> String {
        match self {
            TokenTree::Single(token) => token.text.clone(),
            TokenTree::Group(tokens) => tokens
                .iter()
                .map(|t| t.text.as_str())
                .collect::<Vec<_>>()
                .join(","),
        }
    }
}

impl fmt::Display for TokenTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

/// Lazy splitter over one invocation line.
///
/// Cloning the iterator restarts nothing but lets a caller replay the
/// remaining tokens; [`tokenize`] always starts from the beginning.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    input: &'a str,
    pos: usize,
    line: usize,
}

/// Splits a directive's argument text into tokens.
///
/// Whitespace and commas separate tokens; a quoted run (`"..."` or `'...'`,
/// with backslash escapes) is never split. Tokens joined by commas, with
/// optional whitespace around the commas, come out as one
/// [`TokenTree::Group`]. An unterminated quote swallows the rest of the line.
pub fn tokenize(input: &str) -> Tokens<'_> {
    tokenize_at(input, 1)
}

/// Like [`tokenize`], stamping spans with the given source line.
pub fn tokenize_at(input: &str, line: usize) -> Tokens<'_> {
    Tokens { input, pos: 0, line }
}

impl<'a> Tokens<'a> {
    fn char_at(&self, pos: usize) -> Option<char> {
        self.input[pos..].chars().next()
    }

    fn skip_whitespace(&self, mut pos: usize) -> usize {
        while let Some(ch) = self.char_at(pos) {
            if !ch.is_whitespace() {
                break;
            }
            pos += ch.len_utf8();
        }
        pos
    }

    fn scan_single(&self, start: usize) -> Option<Token> {
        let mut pos = start;

        while let Some(ch) = self.char_at(pos) {
            if ch.is_whitespace() || ch == ',' {
                break;
            }
            pos += ch.len_utf8();

            if ch == '"' || ch == '\'' {
                let mut escaped = false;
                loop {
                    let Some(inner) = self.char_at(pos) else {
                        break;
                    };
                    pos += inner.len_utf8();
                    if escaped {
                        escaped = false;
                    } else if inner == '\\' {
                        escaped = true;
                    } else if inner == ch {
                        break;
                    }
                }
            }
        }

        if pos == start {
            return None;
        }

        let col = self.input[..start].chars().count() + 1;
        Some(Token::new(
            &self.input[start..pos],
            Span::new(self.line, col, start, pos),
        ))
    }
}

impl Iterator for Tokens<'_> {
    type Item = TokenTree;

    fn next(&mut self) -> Option<TokenTree> {
        while let Some(ch) = self.char_at(self.pos) {
            if !ch.is_whitespace() && ch != ',' {
                break;
            }
            self.pos += ch.len_utf8();
        }

        let first = self.scan_single(self.pos)?;
        let mut cursor = first.span.end;
        let mut members: SmallVec<[Token; 4]> = SmallVec::new();
        members.push(first);

        loop {
            let comma = self.skip_whitespace(cursor);
            if self.char_at(comma) != Some(',') {
                break;
            }
            let next_start = self.skip_whitespace(comma + 1);
            match self.scan_single(next_start) {
                Some(token) => {
                    cursor = token.span.end;
                    members.push(token);
                }
                None => break,
            }
        }

        self.pos = cursor;

        if members.len() == 1 {
            members.pop().map(TokenTree::Single)
        } else {
            Some(TokenTree::Group(members))
        }
    }
}
