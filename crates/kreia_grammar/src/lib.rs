//! Grammar model for kreia.
//!
//! This crate provides the immutable data a grammar is made of once it has
//! been declared:
//! - [`Node`] / [`NodeKind`] / [`Modifier`] - the closed set of grammar nodes
//! - [`Definition`] - a non-empty ordered node sequence
//! - [`Rule`], [`Macro`], [`TokenDef`], [`VirtualLexerUsage`] - named items
//! - [`ScopeStack`] - call-by-name argument and locking-arg resolution
//! - [`Grammar`] - the validated, read-only resolution service built by
//!   [`GrammarBuilder`]

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod definition;
pub mod item;
pub mod node;
pub mod registry;
pub mod scope;

pub use definition::Definition;
pub use item::{Arg, LockingArg, Macro, Rule, TokenDef, VirtualLexerUsage};
pub use node::{Modifier, Node, NodeKind};
pub use registry::{Grammar, GrammarBuilder, TokenSource};
pub use scope::{Scope, ScopeStack, ScopedDefinition};
