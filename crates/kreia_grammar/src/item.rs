//! Named grammar items: tokens, rules, macros, virtual lexer usages, and
//! the argument identities rules and macros declare.

use std::collections::HashSet;

use kreia_foundation::{Error, ItemKind, Name, Result};

use crate::definition::Definition;

// =============================================================================
// Arguments
// =============================================================================

/// A formal macro parameter.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Arg {
    /// Parameter name, referenced by `Var` nodes.
    pub name: Name,
}

impl Arg {
    /// Creates a formal parameter.
    #[must_use]
    pub fn new(name: impl Into<Name>) -> Self {
        Self { name: name.into() }
    }
}

/// A locking argument: every occurrence within one activation of the owning
/// rule or macro must carry the same token content.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LockingArg {
    /// Name referenced by `LockingVar` nodes.
    pub name: Name,
    /// The concrete token kind behind this argument.
    pub token_name: Name,
}

impl LockingArg {
    /// Creates a locking argument over `token_name`.
    #[must_use]
    pub fn new(name: impl Into<Name>, token_name: impl Into<Name>) -> Self {
        Self {
            name: name.into(),
            token_name: token_name.into(),
        }
    }
}

fn ensure_unique<'a>(item: ItemKind, names: impl Iterator<Item = &'a Name>) -> Result<()> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(Error::duplicate_name(item, name.as_ref()));
        }
    }
    Ok(())
}

fn screen_body(owner: &str, definition: &Definition) -> Result<Definition> {
    if definition.is_all_optional() {
        return Err(Error::all_optional(format!("{owner}: {definition}")));
    }
    Ok(definition.cluster_consumes())
}

// =============================================================================
// TokenDef
// =============================================================================

/// A token definition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenDef {
    /// Token kind name.
    pub name: Name,
    /// Source of the matching rule, handed to the lexer unchanged.
    pub pattern: String,
    /// Ignored tokens (whitespace, comments) never appear in decision units.
    pub ignore: bool,
}

impl TokenDef {
    /// Creates a significant token.
    #[must_use]
    pub fn new(name: impl Into<Name>, pattern: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pattern: pattern.into(),
            ignore: false,
        }
    }

    /// Creates an ignored token.
    #[must_use]
    pub fn ignored(name: impl Into<Name>, pattern: impl Into<String>) -> Self {
        Self {
            ignore: true,
            ..Self::new(name, pattern)
        }
    }
}

// =============================================================================
// Rule
// =============================================================================

/// A named rule.
#[derive(Clone, Debug, PartialEq)]
pub struct Rule {
    name: Name,
    definition: Definition,
    locking_args: Vec<LockingArg>,
}

impl Rule {
    /// Creates a rule, clustering its consumes.
    ///
    /// # Errors
    ///
    /// Returns an error if the definition is entirely optional or if two
    /// locking arguments share a name.
    pub fn new(
        name: impl Into<Name>,
        definition: Definition,
        locking_args: Vec<LockingArg>,
    ) -> Result<Self> {
        let name = name.into();
        ensure_unique(ItemKind::LockingArg, locking_args.iter().map(|l| &l.name))?;
        let definition = screen_body(&name, &definition)?;
        Ok(Self {
            name,
            definition,
            locking_args,
        })
    }

    /// Returns the rule name.
    #[must_use]
    pub fn name(&self) -> &Name {
        &self.name
    }

    /// Returns the (clustered) definition.
    #[must_use]
    pub fn definition(&self) -> &Definition {
        &self.definition
    }

    /// Returns the locking arguments in declaration order.
    #[must_use]
    pub fn locking_args(&self) -> &[LockingArg] {
        &self.locking_args
    }
}

// =============================================================================
// Macro
// =============================================================================

/// A parameterized rule, instantiated with argument definitions at each
/// call site.
#[derive(Clone, Debug, PartialEq)]
pub struct Macro {
    name: Name,
    args: Vec<Arg>,
    definition: Definition,
    locking_args: Vec<LockingArg>,
}

impl Macro {
    /// Creates a macro, clustering its consumes.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no formal arguments, if the definition
    /// is entirely optional, or if argument names repeat.
    pub fn new(
        name: impl Into<Name>,
        args: Vec<Arg>,
        definition: Definition,
        locking_args: Vec<LockingArg>,
    ) -> Result<Self> {
        let name = name.into();
        if args.is_empty() {
            return Err(Error::empty_definition(format!("arguments of macro {name}")));
        }
        ensure_unique(ItemKind::Arg, args.iter().map(|a| &a.name))?;
        ensure_unique(ItemKind::LockingArg, locking_args.iter().map(|l| &l.name))?;
        let definition = screen_body(&name, &definition)?;
        Ok(Self {
            name,
            args,
            definition,
            locking_args,
        })
    }

    /// Returns the macro name.
    #[must_use]
    pub fn name(&self) -> &Name {
        &self.name
    }

    /// Returns the formal arguments in declaration order.
    #[must_use]
    pub fn args(&self) -> &[Arg] {
        &self.args
    }

    /// Returns true if `name` is a formal argument.
    #[must_use]
    pub fn has_arg(&self, name: &str) -> bool {
        self.args.iter().any(|a| a.name.as_ref() == name)
    }

    /// Returns the (clustered) definition.
    #[must_use]
    pub fn definition(&self) -> &Definition {
        &self.definition
    }

    /// Returns the locking arguments in declaration order.
    #[must_use]
    pub fn locking_args(&self) -> &[LockingArg] {
        &self.locking_args
    }
}

// =============================================================================
// VirtualLexerUsage
// =============================================================================

/// Use of an external sub-lexer that produces some of the grammar's tokens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VirtualLexerUsage {
    /// Name of the virtual lexer.
    pub name: Name,
    /// Where the lexer implementation lives.
    pub path: String,
    /// Pattern arguments handed to the lexer.
    pub args: Vec<String>,
    /// Token kinds the lexer emits, usable in rules like declared tokens.
    pub exposed_tokens: Vec<Name>,
}

impl VirtualLexerUsage {
    /// Creates a virtual lexer usage.
    #[must_use]
    pub fn new(
        name: impl Into<Name>,
        path: impl Into<String>,
        args: Vec<String>,
        exposed_tokens: Vec<Name>,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            args,
            exposed_tokens,
        }
    }

    /// Returns true if this lexer emits tokens of kind `token_name`.
    #[must_use]
    pub fn exposes(&self, token_name: &str) -> bool {
        self.exposed_tokens.iter().any(|t| t.as_ref() == token_name)
    }
}
