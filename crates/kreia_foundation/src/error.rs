//! Errors shared by every kreia crate.
//!
//! Every error belongs to one [`ErrorCategory`]: grammar-definition and
//! undecidability errors abort grammar loading, runtime parse errors are
//! ordinary syntax errors reported to whoever feeds input to the parser.

use std::fmt;

use thiserror::Error;

/// Result with a kreia [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// A failure while declaring a grammar, computing its decisions, or
/// parsing input with them.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// What went wrong.
    pub kind: ErrorKind,
    /// Which rule or macro, and which choice point inside it, if known.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Wraps `kind` with no context.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Attaches the owner and choice point.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Shorthand for `self.kind.category()`.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }

    /// Creates an empty definition error.
    #[must_use]
    pub fn empty_definition(what: impl Into<String>) -> Self {
        Self::new(ErrorKind::EmptyDefinition(what.into()))
    }

    /// Creates an all-optional alternative error.
    #[must_use]
    pub fn all_optional(what: impl Into<String>) -> Self {
        Self::new(ErrorKind::AllOptionalAlternative(what.into()))
    }

    /// Creates a macro arity mismatch error.
    #[must_use]
    pub fn arity_mismatch(macro_name: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::new(ErrorKind::ArityMismatch {
            macro_name: macro_name.into(),
            expected,
            actual,
        })
    }

    /// Creates a duplicate name error.
    #[must_use]
    pub fn duplicate_name(item: ItemKind, name: impl Into<String>) -> Self {
        Self::new(ErrorKind::DuplicateName {
            item,
            name: name.into(),
        })
    }

    /// Creates an unknown reference error.
    #[must_use]
    pub fn unknown_reference(item: ItemKind, name: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownReference {
            item,
            name: name.into(),
        })
    }

    /// Creates an undecidable grammar error.
    #[must_use]
    pub fn undecidable(reason: impl Into<String>) -> Self {
        Self::new(ErrorKind::Undecidable(reason.into()))
    }

    /// Creates a runtime parse error.
    #[must_use]
    pub fn runtime_parse(
        expected: Vec<String>,
        found: Option<String>,
        line: u32,
        column: u32,
    ) -> Self {
        Self::new(ErrorKind::RuntimeParse {
            expected,
            found,
            line,
            column,
        })
    }
}

/// Kinds of named grammar items, used in error messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ItemKind {
    /// A token definition (or a token exposed by a virtual lexer).
    Token,
    /// A rule.
    Rule,
    /// A macro.
    Macro,
    /// A virtual lexer usage.
    VirtualLexer,
    /// A formal macro argument.
    Arg,
    /// A locking argument.
    LockingArg,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Token => "token",
            Self::Rule => "rule",
            Self::Macro => "macro",
            Self::VirtualLexer => "virtual lexer",
            Self::Arg => "argument",
            Self::LockingArg => "locking argument",
        };
        f.write_str(name)
    }
}

/// Broad grouping of error kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Malformed grammar, detected while the grammar is declared.
    GrammarDefinition,
    /// No finite lookahead distinguishes some choice, detected at build time.
    UndecidableGrammar,
    /// Input did not match any alternative at a choice point.
    RuntimeParse,
    /// Serialization, I/O and internal failures.
    Other,
}

/// Every way a kreia operation can fail.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// A definition, `Or`, branch, or argument list was empty.
    #[error("empty definition: {0}")]
    EmptyDefinition(String),

    /// An alternative made only of optional nodes.
    #[error("alternative is entirely optional: {0}")]
    AllOptionalAlternative(String),

    /// Macro called with the wrong number of arguments.
    #[error("arity mismatch: macro {macro_name} takes {expected} arguments, got {actual}")]
    ArityMismatch {
        /// The macro being called.
        macro_name: String,
        /// Number of declared formal arguments.
        expected: usize,
        /// Number of supplied arguments.
        actual: usize,
    },

    /// Two items of the same kind share a name.
    #[error("duplicate {item} name: {name}")]
    DuplicateName {
        /// What kind of item was duplicated.
        item: ItemKind,
        /// The duplicated name.
        name: String,
    },

    /// A reference to an item that does not exist in scope.
    #[error("unknown {item}: {name}")]
    UnknownReference {
        /// What kind of item was referenced.
        item: ItemKind,
        /// The unresolved name.
        name: String,
    },

    /// A token pattern is not a valid regular expression.
    #[error("invalid pattern for token {name}: {message}")]
    InvalidTokenPattern {
        /// The token whose pattern failed to compile.
        name: String,
        /// The compiler's message.
        message: String,
    },

    /// No bounded lookahead can resolve a choice.
    #[error("undecidable grammar: {0}")]
    Undecidable(String),

    /// Input matched none of the alternatives at a choice point.
    #[error(
        "parse error at {line}:{column}: expected one of {}, found {}",
        .expected.join(" | "),
        .found.as_deref().unwrap_or("end of input")
    )]
    RuntimeParse {
        /// Leading tokens of every alternative that was tried.
        expected: Vec<String>,
        /// The token actually found, if any.
        found: Option<String>,
        /// Line number (1-indexed).
        line: u32,
        /// Column number (1-indexed).
        column: u32,
    },

    /// Serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// File I/O failed.
    #[error("i/o error: {0}")]
    Io(String),

    /// An iterator or engine invariant was broken.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ErrorKind {
    /// Returns the category this kind belongs to.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::EmptyDefinition(_)
            | Self::AllOptionalAlternative(_)
            | Self::ArityMismatch { .. }
            | Self::DuplicateName { .. }
            | Self::UnknownReference { .. }
            | Self::InvalidTokenPattern { .. } => ErrorCategory::GrammarDefinition,
            Self::Undecidable(_) => ErrorCategory::UndecidableGrammar,
            Self::RuntimeParse { .. } => ErrorCategory::RuntimeParse,
            Self::Serialization(_) | Self::Io(_) | Self::Internal(_) => ErrorCategory::Other,
        }
    }
}

/// Locates a grammar error: the owning item and the choice point in it.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Rule or macro that owns the failing definition, e.g. `rule expr`.
    pub owner: Option<String>,
    /// Node indices leading from the owner's definition to the choice point.
    pub choice_point: Option<Vec<usize>>,
}

impl ErrorContext {
    /// An empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the owning rule or macro.
    #[must_use]
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    /// Sets the choice-point path.
    #[must_use]
    pub fn with_choice_point(mut self, path: Vec<usize>) -> Self {
        self.choice_point = Some(path);
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(owner) = &self.owner else {
            return Ok(());
        };
        write!(f, "in {owner}")?;
        if let Some(path) = &self.choice_point {
            let path: Vec<String> = path.iter().map(ToString::to_string).collect();
            write!(f, " at choice point [{}]", path.join("."))?;
        }
        Ok(())
    }
}
