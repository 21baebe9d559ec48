//! Scope stacks for argument and locking-arg resolution.
//!
//! Each rule or macro activation gets its own [`Scope`] frame. Argument
//! definitions bound by a macro call are resolved in the current frame but
//! traversed in the caller's frame, which is what call-by-name expansion
//! requires.
//!
//! Frames are built from persistent collections, so cloning a whole stack
//! is O(1) and never copies grammar data.

use kreia_foundation::{Error, ItemKind, Name, Result, SharedMap, SharedStack};

use crate::definition::Definition;
use crate::item::{LockingArg, Macro, Rule};

/// One activation frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scope {
    locking_args: SharedMap<Name, LockingArg>,
    args: SharedMap<Name, Definition>,
}

impl Scope {
    /// Creates a frame from locking args and bound argument definitions.
    #[must_use]
    pub fn new(
        locking_args: impl IntoIterator<Item = LockingArg>,
        args: impl IntoIterator<Item = (Name, Definition)>,
    ) -> Self {
        Self {
            locking_args: locking_args
                .into_iter()
                .map(|l| (l.name.clone(), l))
                .collect(),
            args: args.into_iter().collect(),
        }
    }

    /// Returns the definition bound to argument `name`.
    #[must_use]
    pub fn arg(&self, name: &str) -> Option<&Definition> {
        self.args.get(name)
    }

    /// Returns the locking arg named `name`.
    #[must_use]
    pub fn locking_arg(&self, name: &str) -> Option<&LockingArg> {
        self.locking_args.get(name)
    }
}

/// A stack of activation frames, innermost on top.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScopeStack {
    current: Scope,
    previous: SharedStack<Scope>,
}

impl ScopeStack {
    /// Creates a stack with a single empty frame.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the root stack for traversing `rule`'s own definition.
    #[must_use]
    pub fn for_rule(rule: &Rule) -> Self {
        Self::new().enter_rule(rule)
    }

    /// Returns the innermost frame.
    #[must_use]
    pub fn current(&self) -> &Scope {
        &self.current
    }

    /// Returns the number of frames below the innermost one.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.previous.len()
    }

    fn push(&self, frame: Scope) -> Self {
        Self {
            current: frame,
            previous: self.previous.push(self.current.clone()),
        }
    }

    /// Pushes a frame for a `Subrule` call: the callee's locking args, no
    /// bound arguments.
    #[must_use]
    pub fn enter_rule(&self, rule: &Rule) -> Self {
        self.push(Scope::new(rule.locking_args().iter().cloned(), []))
    }

    /// Pushes a frame for a `MacroCall`: the callee's locking args plus its
    /// formal arguments zipped against `args`.
    ///
    /// # Errors
    ///
    /// Returns `ArityMismatch` if `args` does not match the macro's formal
    /// argument count.
    pub fn enter_macro(&self, callee: &Macro, args: &[Definition]) -> Result<Self> {
        if callee.args().len() != args.len() {
            return Err(Error::arity_mismatch(
                callee.name().as_ref(),
                callee.args().len(),
                args.len(),
            ));
        }
        let bound = callee
            .args()
            .iter()
            .zip(args)
            .map(|(formal, actual)| (formal.name.clone(), actual.clone()));
        Ok(self.push(Scope::new(callee.locking_args().iter().cloned(), bound)))
    }

    /// Resolves a `Var` node.
    ///
    /// Returns the bound definition together with the caller's stack, in
    /// which that definition must be traversed.
    ///
    /// # Errors
    ///
    /// Returns `UnknownReference` if `name` is not bound in the current frame
    /// or there is no caller frame.
    pub fn resolve_var(&self, name: &str) -> Result<(Definition, Self)> {
        let unbound = || Error::unknown_reference(ItemKind::Arg, name);
        let definition = self.current.arg(name).ok_or_else(unbound)?.clone();
        let (previous, caller) = self.previous.pop().ok_or_else(unbound)?;
        Ok((
            definition,
            Self {
                current: caller,
                previous,
            },
        ))
    }

    /// Resolves a `LockingVar` node to its underlying token name.
    ///
    /// Only the current frame is consulted.
    ///
    /// # Errors
    ///
    /// Returns `UnknownReference` if `name` is not a locking arg of the
    /// current frame.
    pub fn resolve_locking_var(&self, name: &str) -> Result<Name> {
        self.current
            .locking_arg(name)
            .map(|l| l.token_name.clone())
            .ok_or_else(|| Error::unknown_reference(ItemKind::LockingArg, name))
    }
}

/// A definition paired with the scope it must be traversed in.
#[derive(Clone, Debug, PartialEq)]
pub struct ScopedDefinition {
    /// What to traverse.
    pub definition: Definition,
    /// Where its names resolve.
    pub scope: ScopeStack,
}

impl ScopedDefinition {
    /// Pairs a definition with a scope.
    #[must_use]
    pub fn new(definition: Definition, scope: ScopeStack) -> Self {
        Self { definition, scope }
    }
}
