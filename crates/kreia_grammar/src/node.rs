//! Grammar nodes.
//!
//! A [`Node`] is one step of a [`Definition`]: consuming tokens, choosing
//! between alternatives, calling a rule or macro, splicing a macro argument,
//! matching a locking argument, or grouping nodes under a modifier.

use std::fmt;
use std::sync::Arc;

use kreia_foundation::{Error, Name, Result};

use crate::definition::Definition;

// =============================================================================
// Modifier
// =============================================================================

/// Repetition modifier attached to a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Modifier {
    /// `+` - one or more.
    Many,
    /// `?` - zero or one.
    Maybe,
    /// `*` - zero or more.
    MaybeMany,
}

impl Modifier {
    /// Returns true if the modified node may be skipped entirely.
    #[must_use]
    pub const fn is_optional(self) -> bool {
        matches!(self, Self::Maybe | Self::MaybeMany)
    }

    /// Returns true if the modified node may repeat.
    #[must_use]
    pub const fn is_repeating(self) -> bool {
        matches!(self, Self::Many | Self::MaybeMany)
    }

    /// Returns the grammar notation for this modifier.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Many => "+",
            Self::Maybe => "?",
            Self::MaybeMany => "*",
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

// =============================================================================
// NodeKind
// =============================================================================

/// The closed set of grammar node kinds.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    /// Consume these tokens, in order.
    Consume(Arc<[Name]>),
    /// Choose one of these alternatives.
    Or(Arc<[Definition]>),
    /// Call a rule by name.
    Subrule(Name),
    /// Call a macro with argument definitions.
    MacroCall {
        /// The called macro.
        macro_name: Name,
        /// One definition per formal argument, evaluated in the caller's scope.
        args: Arc<[Definition]>,
    },
    /// Splice the definition bound to a macro argument.
    Var(Name),
    /// Match the token behind a locking argument.
    LockingVar(Name),
    /// Group a definition, usually to apply a modifier to all of it.
    Paren(Definition),
}

// =============================================================================
// Node
// =============================================================================

/// A grammar node: a [`NodeKind`] plus an optional [`Modifier`].
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    kind: NodeKind,
    modifier: Option<Modifier>,
}

impl Node {
    /// Creates a node from its parts.
    #[must_use]
    pub const fn new(kind: NodeKind, modifier: Option<Modifier>) -> Self {
        Self { kind, modifier }
    }

    /// Creates a `Consume` node.
    ///
    /// # Errors
    ///
    /// Returns an error if no token names are given.
    pub fn consume<I, S>(token_names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<Name>,
    {
        let names: Arc<[Name]> = token_names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(Error::empty_definition("Consume node"));
        }
        Ok(Self::new(NodeKind::Consume(names), None))
    }

    /// Creates a `Consume` node for a single token.
    #[must_use]
    pub fn token(token_name: impl Into<Name>) -> Self {
        Self::new(NodeKind::Consume(Arc::from([token_name.into()])), None)
    }

    /// Creates an `Or` node.
    ///
    /// # Errors
    ///
    /// Returns an error if `choices` is empty or if any choice is made only
    /// of optional nodes.
    pub fn or(choices: Vec<Definition>) -> Result<Self> {
        if choices.is_empty() {
            return Err(Error::empty_definition("Or node"));
        }
        Definition::screen_all_optional(&choices)?;
        Ok(Self::new(NodeKind::Or(choices.into()), None))
    }

    /// Creates a `Subrule` node.
    #[must_use]
    pub fn subrule(rule_name: impl Into<Name>) -> Self {
        Self::new(NodeKind::Subrule(rule_name.into()), None)
    }

    /// Creates a `MacroCall` node.
    ///
    /// Arity against the macro's declared arguments is checked when the
    /// grammar is built, since the macro may not be declared yet.
    ///
    /// # Errors
    ///
    /// Returns an error if `args` is empty or if any argument is made only
    /// of optional nodes.
    pub fn macro_call(macro_name: impl Into<Name>, args: Vec<Definition>) -> Result<Self> {
        if args.is_empty() {
            return Err(Error::empty_definition("macro call arguments"));
        }
        Definition::screen_all_optional(&args)?;
        Ok(Self::new(
            NodeKind::MacroCall {
                macro_name: macro_name.into(),
                args: args.into(),
            },
            None,
        ))
    }

    /// Creates a `Var` node.
    #[must_use]
    pub fn var(arg_name: impl Into<Name>) -> Self {
        Self::new(NodeKind::Var(arg_name.into()), None)
    }

    /// Creates a `LockingVar` node.
    #[must_use]
    pub fn locking_var(locking_arg_name: impl Into<Name>) -> Self {
        Self::new(NodeKind::LockingVar(locking_arg_name.into()), None)
    }

    /// Creates a `Paren` node.
    #[must_use]
    pub fn paren(definition: Definition, modifier: Modifier) -> Self {
        Self::new(NodeKind::Paren(definition), Some(modifier))
    }

    /// Returns the kind of this node.
    #[must_use]
    pub const fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Returns the modifier of this node, if any.
    #[must_use]
    pub const fn modifier(&self) -> Option<Modifier> {
        self.modifier
    }

    /// Returns true for `?` and `*` nodes.
    #[must_use]
    pub fn is_optional(&self) -> bool {
        self.modifier.is_some_and(Modifier::is_optional)
    }

    /// Returns true when a runtime test is needed to decide whether to
    /// (re)enter this node.
    #[must_use]
    pub const fn needs_decidable(&self) -> bool {
        self.modifier.is_some()
    }

    /// Returns this node with the given modifier.
    #[must_use]
    pub fn with_modifier(mut self, modifier: Option<Modifier>) -> Self {
        self.modifier = modifier;
        self
    }

    /// Returns this node with the `+` modifier.
    #[must_use]
    pub fn many(self) -> Self {
        self.with_modifier(Some(Modifier::Many))
    }

    /// Returns this node with the `?` modifier.
    #[must_use]
    pub fn maybe(self) -> Self {
        self.with_modifier(Some(Modifier::Maybe))
    }

    /// Returns this node with the `*` modifier.
    #[must_use]
    pub fn maybe_many(self) -> Self {
        self.with_modifier(Some(Modifier::MaybeMany))
    }

    /// Returns a copy of this node without its modifier.
    #[must_use]
    pub fn purify(&self) -> Self {
        Self::new(self.kind.clone(), None)
    }

    /// Returns the definition matched by one pass through this node,
    /// ignoring its modifier.
    #[must_use]
    pub fn body(&self) -> Definition {
        match &self.kind {
            NodeKind::Paren(definition) => definition.clone(),
            _ => Definition::single(self.purify()),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            NodeKind::Consume(names) if names.len() == 1 => write!(f, "{}", names[0])?,
            NodeKind::Consume(names) => write!(f, "({})", names.join(" "))?,
            NodeKind::Or(choices) => {
                let choices: Vec<String> = choices.iter().map(ToString::to_string).collect();
                write!(f, "({})", choices.join(" | "))?;
            }
            NodeKind::Subrule(name) => write!(f, "{name}")?,
            NodeKind::MacroCall { macro_name, args } => {
                let args: Vec<String> = args.iter().map(ToString::to_string).collect();
                write!(f, "{macro_name}!({})", args.join(", "))?;
            }
            NodeKind::Var(name) => write!(f, "${name}")?,
            NodeKind::LockingVar(name) => write!(f, "@{name}")?,
            NodeKind::Paren(definition) => write!(f, "({definition})")?,
        }
        if let Some(modifier) = self.modifier {
            write!(f, "{modifier}")?;
        }
        Ok(())
    }
}
