//! Tokens handed from a lexer to the parser.

use std::fmt;

use kreia_foundation::Name;

use crate::span::Span;

/// A lexed token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    /// Token kind, as declared in the grammar.
    pub kind: Name,
    /// The matched text.
    pub content: String,
    /// Source location of this token.
    pub span: Span,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub fn new(kind: impl Into<Name>, content: impl Into<String>, span: Span) -> Self {
        Self {
            kind: kind.into(),
            content: content.into(),
            span,
        }
    }

    /// Returns true if this token is of kind `kind`.
    #[must_use]
    pub fn is(&self, kind: &str) -> bool {
        self.kind.as_ref() == kind
    }

    /// Returns true if both tokens have the same kind and content,
    /// wherever they occur.
    #[must_use]
    pub fn same_lexeme(&self, other: &Self) -> bool {
        self.kind == other.kind && self.content == other.content
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?}", self.kind, self.content)
    }
}
