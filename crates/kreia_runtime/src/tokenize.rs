//! A regex tokenizer built from a grammar's token definitions.
//!
//! Patterns are tried in declaration order at each position and the first
//! non-empty match wins, so keywords must be declared before the
//! identifiers they overlap with. Virtual lexers are not driven here.

use kreia_foundation::{Error, ErrorKind, Name, Result};
use kreia_grammar::{Grammar, TokenDef};
use regex::Regex;

use crate::lexer::BufferedLexer;
use crate::span::Span;
use crate::token::Token;

#[derive(Clone, Debug)]
struct TokenPattern {
    kind: Name,
    regex: Regex,
    ignore: bool,
}

/// Splits source text into tokens.
#[derive(Clone, Debug)]
pub struct Tokenizer {
    patterns: Vec<TokenPattern>,
}

impl Tokenizer {
    /// Compiles the token definitions of `grammar`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTokenPattern` if a pattern does not compile.
    pub fn new(grammar: &Grammar) -> Result<Self> {
        Self::from_defs(grammar.tokens())
    }

    /// Compiles token definitions in the given order.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTokenPattern` if a pattern does not compile.
    pub fn from_defs<'a>(defs: impl IntoIterator<Item = &'a TokenDef>) -> Result<Self> {
        let patterns = defs
            .into_iter()
            .map(|def| {
                let regex = Regex::new(&format!(r"\A(?:{})", def.pattern)).map_err(|e| {
                    Error::new(ErrorKind::InvalidTokenPattern {
                        name: def.name.to_string(),
                        message: e.to_string(),
                    })
                })?;
                Ok(TokenPattern {
                    kind: def.name.clone(),
                    regex,
                    ignore: def.ignore,
                })
            })
            .collect::<Result<_>>()?;
        Ok(Self { patterns })
    }

    /// Tokenizes `source`, ignored kinds included.
    ///
    /// # Errors
    ///
    /// Returns `RuntimeParse` at the first position no pattern matches.
    pub fn tokenize(&self, source: &str) -> Result<Vec<Token>> {
        Ok(self.scan(source)?.0)
    }

    /// Tokenizes `source` into a lexer over its significant tokens.
    ///
    /// # Errors
    ///
    /// Returns `RuntimeParse` at the first position no pattern matches.
    pub fn lex(&self, source: &str) -> Result<BufferedLexer> {
        let (tokens, end) = self.scan(source)?;
        let significant = tokens
            .into_iter()
            .filter(|token| !self.is_ignored(&token.kind))
            .collect();
        Ok(BufferedLexer::with_end(significant, end))
    }

    fn is_ignored(&self, kind: &str) -> bool {
        self.patterns
            .iter()
            .any(|p| p.ignore && p.kind.as_ref() == kind)
    }

    fn scan(&self, source: &str) -> Result<(Vec<Token>, Span)> {
        let mut tokens = Vec::new();
        let mut cursor = Span::at_start();

        while cursor.start < source.len() {
            let rest = &source[cursor.start..];
            let matched = self.patterns.iter().find_map(|pattern| {
                pattern
                    .regex
                    .find(rest)
                    .filter(|m| !m.is_empty())
                    .map(|m| (pattern, m.as_str()))
            });
            let Some((pattern, text)) = matched else {
                let found = rest.chars().next().map(String::from);
                return Err(Error::runtime_parse(
                    self.patterns.iter().map(|p| p.kind.to_string()).collect(),
                    found,
                    cursor.line,
                    cursor.column,
                ));
            };
            tokens.push(Token::new(pattern.kind.clone(), text, cursor.covering(text)));
            cursor = cursor.after(text);
        }

        Ok((tokens, cursor))
    }
}
