//! Bounded lookahead decisions for kreia.
//!
//! This crate computes, ahead of any input, the minimal token tests that
//! pick one grammar alternative over its competitors without backtracking:
//! - [`GrammarIter`] - lazy, cloneable traversal producing [`DecisionUnit`]s
//! - [`PathBuilder`] / [`AstDecisionPath`] / [`AstDecisionBranch`] - the
//!   decision tree
//! - [`DecisionEngine`] - lockstep elimination of competitors
//! - [`DecisionTable`] - every choice point of a grammar, computed eagerly
//! - [`trace`] - optional tracing of the elimination

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod compute;
pub mod config;
pub mod iter;
pub mod path;
pub mod table;
pub mod trace;

pub use compute::{DecisionEngine, DecisionOutcome, compute_decidable};
pub use config::DecisionConfig;
pub use iter::{DecisionUnit, GrammarIter, gather_branches};
pub use path::{AstDecisionBranch, AstDecisionPath, PathBuilder, PathSegment};
pub use table::{ChoiceDecision, ChoicePoint, DecisionTable};
pub use trace::{TraceEvent, TraceRecord, Tracer, TracerConfig};
