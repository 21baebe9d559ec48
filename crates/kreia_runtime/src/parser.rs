//! Thin parse combinators driven by precomputed decisions.
//!
//! Generated parsers call these in the shape of their grammar: `consume`
//! for mandatory tokens, a decidable test before every optional or
//! repeated part, and `choose` at every `Or`. None of them backtrack.

use kreia_decision::ChoiceDecision;
use kreia_foundation::{Name, Result};

use crate::decidable::Decidable;
use crate::lexer::{TokenStream, unexpected_at};
use crate::token::Token;

// =============================================================================
// Locker
// =============================================================================

/// Holds the lexeme of a locking argument for one activation of a rule or
/// macro.
///
/// The first occurrence locks whatever content it matched; every later
/// occurrence must repeat it exactly.
#[derive(Clone, Debug)]
pub struct Locker {
    kind: Name,
    locked: Option<Token>,
}

impl Locker {
    /// Creates an unlocked locker for tokens of `kind`.
    #[must_use]
    pub fn new(kind: impl Into<Name>) -> Self {
        Self {
            kind: kind.into(),
            locked: None,
        }
    }

    /// Returns the token kind.
    #[must_use]
    pub fn kind(&self) -> &Name {
        &self.kind
    }

    /// Returns the token that set the lock, if any.
    #[must_use]
    pub fn locked(&self) -> Option<&Token> {
        self.locked.as_ref()
    }

    /// Returns true if `token` may occupy this locker's position.
    #[must_use]
    pub fn accepts(&self, token: &Token) -> bool {
        token.kind == self.kind && self.locked.as_ref().is_none_or(|l| l.same_lexeme(token))
    }
}

// =============================================================================
// Parser
// =============================================================================

/// Parse combinators over a token stream.
#[derive(Clone, Debug)]
pub struct Parser<L> {
    stream: L,
}

impl<L: TokenStream> Parser<L> {
    /// Creates a parser reading from `stream`.
    #[must_use]
    pub fn new(stream: L) -> Self {
        Self { stream }
    }

    /// Returns the underlying stream.
    #[must_use]
    pub fn stream(&self) -> &L {
        &self.stream
    }

    /// Consumes the parser, returning its stream.
    #[must_use]
    pub fn into_stream(self) -> L {
        self.stream
    }

    /// Consumes tokens of the given kinds, in order.
    ///
    /// # Errors
    ///
    /// Returns `RuntimeParse` if the next tokens differ.
    pub fn consume<S: AsRef<str>>(&mut self, kinds: &[S]) -> Result<Vec<Token>> {
        self.stream.require(kinds)
    }

    /// Tests `decidable` at the current position without consuming.
    #[must_use]
    pub fn test<D: Decidable>(&self, decidable: &D) -> bool {
        decidable.matches(&self.stream)
    }

    /// Runs `parse` if `decidable` matches.
    ///
    /// # Errors
    ///
    /// Propagates errors from `parse`.
    pub fn maybe<D, T, F>(&mut self, decidable: &D, parse: F) -> Result<Option<T>>
    where
        D: Decidable,
        F: FnOnce(&mut Self) -> Result<T>,
    {
        if self.test(decidable) {
            parse(self).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Runs `parse` once, then again for as long as `decidable` matches.
    ///
    /// # Errors
    ///
    /// Propagates errors from `parse`.
    pub fn many<D, T, F>(&mut self, decidable: &D, mut parse: F) -> Result<Vec<T>>
    where
        D: Decidable,
        F: FnMut(&mut Self) -> Result<T>,
    {
        let mut results = vec![parse(self)?];
        while self.test(decidable) {
            results.push(parse(self)?);
        }
        Ok(results)
    }

    /// Runs `parse` for as long as `decidable` matches, possibly never.
    ///
    /// # Errors
    ///
    /// Propagates errors from `parse`.
    pub fn maybe_many<D, T, F>(&mut self, decidable: &D, mut parse: F) -> Result<Vec<T>>
    where
        D: Decidable,
        F: FnMut(&mut Self) -> Result<T>,
    {
        let mut results = Vec::new();
        while self.test(decidable) {
            results.push(parse(self)?);
        }
        Ok(results)
    }

    /// Returns the index of the first alternative whose test matches.
    ///
    /// # Errors
    ///
    /// Returns `RuntimeParse` listing the kinds every alternative could
    /// start with if none matches.
    pub fn choose<D: Decidable>(&self, alternatives: &[D]) -> Result<usize> {
        self.maybe_choose(alternatives)
            .ok_or_else(|| self.stream.unexpected(expected_kinds(alternatives)))
    }

    /// Returns the index of the first alternative whose test matches, if
    /// any.
    #[must_use]
    pub fn maybe_choose<D: Decidable>(&self, alternatives: &[D]) -> Option<usize> {
        alternatives.iter().position(|d| self.test(d))
    }

    /// Applies a tabled decision at the current position.
    ///
    /// For an `Or` this is the chosen alternative; for a modified node it
    /// is `Some(0)` when the node should be entered.
    #[must_use]
    pub fn decide(&self, decision: &ChoiceDecision) -> Option<usize> {
        match decision {
            ChoiceDecision::Alternatives(paths) => self.maybe_choose(paths.as_slice()),
            ChoiceDecision::Entry(path) => self.test(path).then_some(0),
        }
    }

    /// Consumes one token through `locker`, locking it on first use.
    ///
    /// # Errors
    ///
    /// Returns `RuntimeParse` if the next token is of another kind or does
    /// not repeat the locked content. The stream does not move then.
    pub fn locked(&mut self, locker: &mut Locker) -> Result<Token> {
        let state = self.stream.state();
        let matched = self
            .stream
            .test(std::slice::from_ref(&locker.kind), &state)
            .and_then(|(mut tokens, next)| tokens.pop().map(|token| (token, next)));

        match matched {
            Some((token, next)) if locker.accepts(&token) => {
                self.stream.advance_to(next);
                if locker.locked.is_none() {
                    locker.locked = Some(token.clone());
                }
                Ok(token)
            }
            found => {
                let expected = match &locker.locked {
                    Some(lock) => lock.to_string(),
                    None => locker.kind.to_string(),
                };
                let found = found.map(|(token, _)| token);
                Err(unexpected_at(
                    found.as_ref().or_else(|| self.stream.peek()),
                    self.stream.end_span(),
                    vec![expected],
                ))
            }
        }
    }

    /// Tests whether the next token would pass `locker`, without consuming.
    #[must_use]
    pub fn attempt_lock(&self, locker: &Locker) -> bool {
        self.stream.peek().is_some_and(|token| locker.accepts(token))
    }

    /// Checks that all input has been consumed.
    ///
    /// # Errors
    ///
    /// Returns `RuntimeParse` if tokens remain.
    pub fn exit(&self) -> Result<()> {
        if self.stream.is_exhausted() {
            Ok(())
        } else {
            Err(self.stream.unexpected(vec!["end of input".to_string()]))
        }
    }
}

fn expected_kinds<D: Decidable>(alternatives: &[D]) -> Vec<String> {
    let mut expected: Vec<String> = Vec::new();
    for kind in alternatives.iter().flat_map(Decidable::expected) {
        if !expected.iter().any(|e| e.as_str() == kind.as_ref()) {
            expected.push(kind.to_string());
        }
    }
    expected
}
