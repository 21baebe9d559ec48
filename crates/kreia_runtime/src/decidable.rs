//! Runtime evaluation of decision paths.
//!
//! A decision path is tested against a [`TokenStream`] from an explicit
//! state, threading that state through its segments. Testing never moves
//! the stream.

use kreia_decision::{AstDecisionBranch, AstDecisionPath, PathSegment};
use kreia_foundation::Name;

use crate::lexer::TokenStream;
use crate::token::Token;

/// A precomputed lookahead test.
pub trait Decidable {
    /// Number of tokens this test looks at in the worst case.
    fn test_length(&self) -> usize;

    /// Tests the stream from `state`.
    ///
    /// Returns the tokens looked at and the state after them, or `None` if
    /// the input does not match.
    fn test<L: TokenStream>(&self, stream: &L, state: L::State) -> Option<(Vec<Token>, L::State)>;

    /// Token kinds this test can start with, for error messages.
    fn expected(&self) -> Vec<Name>;

    /// Tests the stream from its current position.
    fn matches<L: TokenStream>(&self, stream: &L) -> bool {
        self.test(stream, stream.state()).is_some()
    }
}

impl Decidable for AstDecisionPath {
    fn test_length(&self) -> usize {
        AstDecisionPath::test_length(self)
    }

    fn expected(&self) -> Vec<Name> {
        self.leading_tokens()
    }

    fn test<L: TokenStream>(&self, stream: &L, state: L::State) -> Option<(Vec<Token>, L::State)> {
        let mut consumed = Vec::with_capacity(self.test_length());
        let mut state = state;
        for segment in self.segments() {
            let (tokens, next) = match segment {
                PathSegment::Tokens(kinds) => stream.test(kinds.as_slice(), &state)?,
                PathSegment::Branch(branch) => branch.test(stream, state)?,
            };
            consumed.extend(tokens);
            state = next;
        }
        Some((consumed, state))
    }
}

impl Decidable for AstDecisionBranch {
    fn test_length(&self) -> usize {
        AstDecisionBranch::test_length(self)
    }

    fn expected(&self) -> Vec<Name> {
        let mut expected: Vec<Name> = Vec::new();
        for kind in self.paths().iter().flat_map(AstDecisionPath::leading_tokens) {
            if !expected.contains(&kind) {
                expected.push(kind);
            }
        }
        expected
    }

    /// First matching alternative wins. A branch that lost its empty arm
    /// (or never had a second one) still succeeds, consuming nothing.
    fn test<L: TokenStream>(&self, stream: &L, state: L::State) -> Option<(Vec<Token>, L::State)> {
        self.paths()
            .iter()
            .find_map(|path| path.test(stream, state.clone()))
            .or_else(|| self.accepts_empty().then_some((Vec::new(), state)))
    }
}
