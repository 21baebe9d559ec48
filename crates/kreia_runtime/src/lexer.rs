//! The token-stream contract and its buffered implementation.
//!
//! Decision tests and parse combinators only ever talk to a lexer through
//! [`TokenStream`]. Lookahead goes through [`TokenStream::test`], which
//! takes an explicit state and never moves the stream; only
//! [`TokenStream::require`] and [`TokenStream::advance_to`] commit.

use std::fmt;

use kreia_foundation::{Error, Result};
use kreia_grammar::Grammar;

use crate::span::Span;
use crate::token::Token;

/// A source of tokens that supports speculative lookahead.
pub trait TokenStream {
    /// An opaque position in the stream.
    type State: Clone + fmt::Debug;

    /// Returns the current position.
    fn state(&self) -> Self::State;

    /// Tests whether `kinds` follow in order from `state`.
    ///
    /// Returns the matched tokens and the position after them, leaving the
    /// stream untouched.
    fn test<S: AsRef<str>>(
        &self,
        kinds: &[S],
        state: &Self::State,
    ) -> Option<(Vec<Token>, Self::State)>;

    /// Consumes `kinds` in order from the current position.
    ///
    /// # Errors
    ///
    /// Returns `RuntimeParse` at the first token that does not match; the
    /// stream does not move in that case.
    fn require<S: AsRef<str>>(&mut self, kinds: &[S]) -> Result<Vec<Token>>;

    /// Moves the stream to a position previously obtained from it.
    fn advance_to(&mut self, state: Self::State);

    /// Returns the token at `state`, if any.
    fn peek_at(&self, state: &Self::State) -> Option<&Token>;

    /// Returns the empty span at the end of input.
    fn end_span(&self) -> Span;

    /// Returns the token at the current position, if any.
    fn peek(&self) -> Option<&Token> {
        self.peek_at(&self.state())
    }

    /// Returns true if no tokens remain.
    fn is_exhausted(&self) -> bool {
        self.peek().is_none()
    }

    /// Builds a parse error at the current position.
    fn unexpected(&self, expected: Vec<String>) -> Error {
        unexpected_at(self.peek(), self.end_span(), expected)
    }
}

/// Builds a parse error for `found`, or for end of input at `end`.
pub(crate) fn unexpected_at(found: Option<&Token>, end: Span, expected: Vec<String>) -> Error {
    let span = found.map_or(end, |token| token.span);
    Error::runtime_parse(
        expected,
        found.map(ToString::to_string),
        span.line,
        span.column,
    )
}

// =============================================================================
// BufferedLexer
// =============================================================================

/// A token stream over an already lexed token vector.
///
/// Ignored kinds are dropped when the lexer is created, so positions count
/// significant tokens only.
#[derive(Clone, Debug)]
pub struct BufferedLexer {
    tokens: Vec<Token>,
    position: usize,
    end: Span,
}

impl BufferedLexer {
    /// Creates a lexer over `tokens`, keeping every token.
    #[must_use]
    pub fn new(tokens: Vec<Token>) -> Self {
        let end = tokens
            .last()
            .map_or_else(Span::at_start, |last| last.span.after(&last.content));
        Self::with_end(tokens, end)
    }

    /// Creates a lexer over `tokens` with an explicit end-of-input span.
    #[must_use]
    pub fn with_end(tokens: Vec<Token>, end: Span) -> Self {
        Self {
            tokens,
            position: 0,
            end,
        }
    }

    /// Creates a lexer over `tokens`, dropping the kinds `grammar` marks
    /// as ignored.
    #[must_use]
    pub fn for_grammar(grammar: &Grammar, tokens: Vec<Token>) -> Self {
        let end = tokens
            .last()
            .map_or_else(Span::at_start, |last| last.span.after(&last.content));
        let significant = tokens
            .into_iter()
            .filter(|token| !grammar.is_ignored(&token.kind))
            .collect();
        Self::with_end(significant, end)
    }

    /// Returns the current token index.
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Returns the tokens not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> &[Token] {
        self.tokens.get(self.position..).unwrap_or(&[])
    }

    /// Returns every token.
    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Rewinds to the first token.
    pub fn reset(&mut self) {
        self.position = 0;
    }

    /// Offset of the first of `kinds` that does not match from `state`.
    fn first_mismatch<S: AsRef<str>>(&self, kinds: &[S], state: usize) -> Option<usize> {
        kinds.iter().enumerate().find_map(|(offset, kind)| {
            match self.tokens.get(state + offset) {
                Some(token) if token.is(kind.as_ref()) => None,
                _ => Some(offset),
            }
        })
    }
}

impl TokenStream for BufferedLexer {
    type State = usize;

    fn state(&self) -> usize {
        self.position
    }

    fn test<S: AsRef<str>>(&self, kinds: &[S], state: &usize) -> Option<(Vec<Token>, usize)> {
        if self.first_mismatch(kinds, *state).is_some() {
            return None;
        }
        let next = state + kinds.len();
        let matched = self.tokens.get(*state..next)?.to_vec();
        Some((matched, next))
    }

    fn require<S: AsRef<str>>(&mut self, kinds: &[S]) -> Result<Vec<Token>> {
        if let Some(offset) = self.first_mismatch(kinds, self.position) {
            let at = self.position + offset;
            return Err(unexpected_at(
                self.tokens.get(at),
                self.end,
                vec![kinds[offset].as_ref().to_string()],
            ));
        }
        let next = self.position + kinds.len();
        let tokens = self.tokens[self.position..next].to_vec();
        self.position = next;
        Ok(tokens)
    }

    fn advance_to(&mut self, state: usize) {
        self.position = state.min(self.tokens.len());
    }

    fn peek_at(&self, state: &usize) -> Option<&Token> {
        self.tokens.get(*state)
    }

    fn end_span(&self) -> Span {
        self.end
    }
}
