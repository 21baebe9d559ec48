//! Kreia - bounded lookahead for parser generators
//!
//! This crate re-exports all layers of kreia for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 3: kreia_runtime    - Token streams, decision evaluation, combinators
//! Layer 2: kreia_decision   - Grammar iteration, lockstep decision computation
//! Layer 1: kreia_grammar    - Nodes, definitions, rules, macros, scopes
//! Layer 0: kreia_foundation - Core types (Name, Error, collections)
//! ```

pub use kreia_decision as decision;
pub use kreia_foundation as foundation;
pub use kreia_grammar as grammar;
pub use kreia_runtime as runtime;
