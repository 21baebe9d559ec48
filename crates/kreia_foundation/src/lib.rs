//! Core types shared by every layer of kreia.
//!
//! This crate provides:
//! - [`Error`] - Rich error types with context, grouped by [`ErrorCategory`]
//! - [`Name`] - Cheaply clonable identifier for tokens, rules, macros, and args
//! - Persistent collections ([`SharedStack`], [`SharedMap`]) used by scope stacks

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod collections;
pub mod error;

use std::sync::Arc;

pub use collections::{SharedMap, SharedStack};
pub use error::{Error, ErrorCategory, ErrorContext, ErrorKind, ItemKind, Result};

/// Identifier of a token, rule, macro, argument, or locking argument.
///
/// Names are shared rather than copied, so cloning one is a reference
/// count bump.
pub type Name = Arc<str>;
