//! Configuration for decision computation.

use crate::trace::TracerConfig;

/// Controls how decidables are computed.
#[derive(Clone, Debug)]
pub struct DecisionConfig {
    /// Treat "main exhausted while competitors remain" as undecidable.
    ///
    /// Off by default: a strict prefix of a sibling alternative is accepted
    /// and the leftover competitors are returned to the caller.
    pub strict_prefixes: bool,

    /// Bound on main-side branch recursion and on iterator frame nesting.
    pub max_depth: usize,

    /// Bound on competitors processed in a single round.
    pub max_competitors: usize,

    /// Tracing of the elimination.
    pub tracer: TracerConfig,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            strict_prefixes: false,
            max_depth: 64,
            max_competitors: 4096,
            tracer: TracerConfig::default(),
        }
    }
}

impl DecisionConfig {
    /// Creates the default (permissive, untraced) configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Permissive limits, but strict prefix handling.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            strict_prefixes: true,
            ..Self::default()
        }
    }

    /// Tracing on, written to stderr.
    #[must_use]
    pub fn debug() -> Self {
        Self {
            tracer: TracerConfig::new().enabled().with_stderr(),
            ..Self::default()
        }
    }

    /// Builder method to set strict prefix handling.
    #[must_use]
    pub fn with_strict_prefixes(mut self, strict: bool) -> Self {
        self.strict_prefixes = strict;
        self
    }

    /// Builder method to set the depth bound.
    #[must_use]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Builder method to set the competitor bound.
    #[must_use]
    pub fn with_max_competitors(mut self, count: usize) -> Self {
        self.max_competitors = count;
        self
    }

    /// Builder method to set the tracer configuration.
    #[must_use]
    pub fn with_tracer(mut self, tracer: TracerConfig) -> Self {
        self.tracer = tracer;
        self
    }
}
