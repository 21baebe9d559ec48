//! Step-by-step log of the lockstep elimination.
//!
//! When enabled, the engine reports every token the main side takes and
//! every competitor it forks, makes eternal or drops. Records are kept in a
//! bounded ring and can be echoed to stderr as they arrive.

use std::collections::VecDeque;
use std::fmt;
use std::io::{self, Write};

use kreia_foundation::Name;

/// Something the engine did while computing a decidable.
#[derive(Clone, Debug, PartialEq)]
pub enum TraceEvent {
    /// A computation started against this many alternatives.
    ComputeStart {
        /// Size of the against set.
        alternatives: usize,
    },
    /// The main side took a token.
    MainToken {
        /// The token kind.
        token: Name,
        /// Competitors that survived it.
        live: usize,
    },
    /// The main side reached a branch and recursed into each arm.
    BranchEntered {
        /// Number of arms.
        alternatives: usize,
    },
    /// A competitor reached a branch and was replaced by one clone per arm.
    CompetitorForked {
        /// Number of clones.
        alternatives: usize,
    },
    /// A competitor looped back through a repetition.
    CompetitorEternal,
    /// A competitor stopped matching.
    CompetitorEliminated {
        /// What it produced instead.
        reason: String,
    },
    /// The main side finished with competitors still live.
    MainExhausted {
        /// Competitors left over.
        leftover: usize,
    },
    /// A decidable was produced.
    Decided {
        /// Its test length.
        test_length: usize,
    },
    /// The computation failed.
    Undecidable {
        /// The error message.
        reason: String,
    },
}

impl TraceEvent {
    /// Kebab-case tag used for filtering.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::ComputeStart { .. } => "compute-start",
            Self::MainToken { .. } => "main-token",
            Self::BranchEntered { .. } => "branch-entered",
            Self::CompetitorForked { .. } => "competitor-forked",
            Self::CompetitorEternal => "competitor-eternal",
            Self::CompetitorEliminated { .. } => "competitor-eliminated",
            Self::MainExhausted { .. } => "main-exhausted",
            Self::Decided { .. } => "decided",
            Self::Undecidable { .. } => "undecidable",
        }
    }

    /// True for the events that close a computation.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::MainExhausted { .. } | Self::Decided { .. } | Self::Undecidable { .. }
        )
    }
}

impl fmt::Display for TraceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ComputeStart { alternatives } => write!(f, "COMPUTE against {alternatives}"),
            Self::MainToken { token, live } => write!(f, "TOKEN {token} ({live} live)"),
            Self::BranchEntered { alternatives } => write!(f, "BRANCH {alternatives} ways"),
            Self::CompetitorForked { alternatives } => write!(f, "  fork into {alternatives}"),
            Self::CompetitorEternal => f.write_str("  eternal"),
            Self::CompetitorEliminated { reason } => write!(f, "  eliminated: {reason}"),
            Self::MainExhausted { leftover } => write!(f, "EXHAUSTED with {leftover} leftover"),
            Self::Decided { test_length } => write!(f, "DECIDED length {test_length}"),
            Self::Undecidable { reason } => write!(f, "UNDECIDABLE {reason}"),
        }
    }
}

/// An event stamped with its sequence number and branch depth.
#[derive(Clone, Debug, PartialEq)]
pub struct TraceRecord {
    /// Position in the tracer's lifetime; never reused.
    pub seq: u64,
    /// Main-side branch recursion depth.
    pub depth: usize,
    /// The event.
    pub event: TraceEvent,
}

impl fmt::Display for TraceRecord {
    /// Indents two spaces per depth level.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:width$}{}", "", self.event, width = self.depth * 2)
    }
}

/// Tracer settings carried by [`DecisionConfig`](crate::DecisionConfig).
#[derive(Clone, Debug)]
pub struct TracerConfig {
    /// Off by default.
    pub enabled: bool,
    /// Records kept before the oldest are dropped.
    pub capacity: usize,
    /// Echo each record to stderr.
    pub stderr: bool,
    /// Event types to keep; empty keeps everything.
    pub only: Vec<&'static str>,
}

impl Default for TracerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            capacity: 10_000,
            stderr: false,
            only: Vec::new(),
        }
    }
}

impl TracerConfig {
    /// A disabled configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Turns recording on.
    #[must_use]
    pub fn enabled(mut self) -> Self {
        self.enabled = true;
        self
    }

    /// Sets the ring capacity.
    #[must_use]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Echoes records to stderr.
    #[must_use]
    pub fn with_stderr(mut self) -> Self {
        self.stderr = true;
        self
    }

    /// Keeps only the listed event types.
    #[must_use]
    pub fn only(mut self, event_types: &[&'static str]) -> Self {
        self.only = event_types.to_vec();
        self
    }
}

/// Collects [`TraceRecord`]s for one engine.
#[derive(Debug, Default)]
pub struct Tracer {
    config: TracerConfig,
    records: VecDeque<TraceRecord>,
    next_seq: u64,
}

impl Tracer {
    /// Creates a tracer.
    #[must_use]
    pub fn new(config: TracerConfig) -> Self {
        Self {
            records: VecDeque::with_capacity(config.capacity.min(256)),
            config,
            next_seq: 0,
        }
    }

    /// Whether [`Tracer::record`] does anything.
    #[must_use]
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Records `event`. A no-op when disabled or filtered out.
    #[inline]
    pub fn record(&mut self, depth: usize, event: TraceEvent) {
        if self.config.enabled && self.keeps(&event) {
            self.push(depth, event);
        }
    }

    fn keeps(&self, event: &TraceEvent) -> bool {
        self.config.only.is_empty() || self.config.only.contains(&event.event_type())
    }

    fn push(&mut self, depth: usize, event: TraceEvent) {
        let record = TraceRecord {
            seq: self.next_seq,
            depth,
            event,
        };
        self.next_seq += 1;
        if self.config.stderr {
            let _ = writeln!(io::stderr(), "{record}");
        }
        self.records.push_back(record);
        while self.records.len() > self.config.capacity {
            self.records.pop_front();
        }
    }

    /// Records held, oldest first.
    pub fn records(&self) -> impl Iterator<Item = &TraceRecord> {
        self.records.iter()
    }

    /// The newest record.
    #[must_use]
    pub fn last(&self) -> Option<&TraceRecord> {
        self.records.back()
    }

    /// How many held records have the given event type.
    #[must_use]
    pub fn count(&self, event_type: &str) -> usize {
        self.records
            .iter()
            .filter(|r| r.event.event_type() == event_type)
            .count()
    }

    /// All held records, one per line.
    #[must_use]
    pub fn render(&self) -> String {
        let lines: Vec<String> = self.records.iter().map(ToString::to_string).collect();
        lines.join("\n")
    }

    /// Drops held records. Sequence numbers keep counting.
    pub fn clear(&mut self) {
        self.records.clear();
    }
}
