//! Decision paths and branches, and the builder that assembles them.
//!
//! A decision path is what the compute engine proves: the shortest run of
//! token tests (with nested branches) that tells one alternative apart
//! from its competitors.

use std::fmt;

use kreia_foundation::{Error, Name, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// =============================================================================
// Segments
// =============================================================================

/// One segment of a decision path.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PathSegment {
    /// A contiguous run of token names, tested in order.
    Tokens(Vec<Name>),
    /// A choice between alternative paths.
    Branch(AstDecisionBranch),
}

impl PathSegment {
    /// Number of tokens this segment tests in the worst case.
    #[must_use]
    pub fn test_length(&self) -> usize {
        match self {
            Self::Tokens(names) => names.len(),
            Self::Branch(branch) => branch.test_length(),
        }
    }
}

// =============================================================================
// AstDecisionPath
// =============================================================================

/// An ordered sequence of token runs and branches.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AstDecisionPath {
    segments: Vec<PathSegment>,
    test_length: usize,
}

impl AstDecisionPath {
    /// Creates a path; its test length is the sum over segments.
    #[must_use]
    pub fn new(segments: Vec<PathSegment>) -> Self {
        let test_length = segments.iter().map(PathSegment::test_length).sum();
        Self {
            segments,
            test_length,
        }
    }

    /// Creates a path consisting of one token run.
    #[must_use]
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Name>,
    {
        let names: Vec<Name> = tokens.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Self::default();
        }
        Self::new(vec![PathSegment::Tokens(names)])
    }

    /// Returns the segments.
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Number of tokens this path tests in the worst case.
    #[must_use]
    pub fn test_length(&self) -> usize {
        self.test_length
    }

    /// Returns true if the path tests nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Token kinds this path can start with, in first-seen order.
    #[must_use]
    pub fn leading_tokens(&self) -> Vec<Name> {
        let mut leading = Vec::new();
        self.collect_leading(&mut leading);
        leading
    }

    /// A branch that may match nothing lets the following segment lead too.
    fn collect_leading(&self, into: &mut Vec<Name>) {
        for segment in &self.segments {
            match segment {
                PathSegment::Tokens(names) => {
                    if let Some(first) = names.first() {
                        if !into.contains(first) {
                            into.push(first.clone());
                        }
                    }
                    return;
                }
                PathSegment::Branch(branch) => {
                    for path in branch.paths() {
                        path.collect_leading(into);
                    }
                    if !branch.accepts_empty() {
                        return;
                    }
                }
            }
        }
    }
}

impl fmt::Display for AstDecisionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            match segment {
                PathSegment::Tokens(names) => f.write_str(&names.join(" "))?,
                PathSegment::Branch(branch) => write!(f, "{branch}")?,
            }
        }
        Ok(())
    }
}

// =============================================================================
// AstDecisionBranch
// =============================================================================

/// A non-empty set of alternative paths.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AstDecisionBranch {
    paths: Vec<AstDecisionPath>,
    is_optional: bool,
    accepts_empty: bool,
    test_length: usize,
}

impl AstDecisionBranch {
    /// Creates a branch.
    ///
    /// # Errors
    ///
    /// Returns `EmptyDefinition` if `paths` is empty.
    pub fn new(paths: Vec<AstDecisionPath>) -> Result<Self> {
        Self::with_empty_arm(paths, false)
    }

    /// Creates a branch, recording whether an arm matching nothing was
    /// dropped from it.
    ///
    /// # Errors
    ///
    /// Returns `EmptyDefinition` if `paths` is empty.
    pub fn with_empty_arm(paths: Vec<AstDecisionPath>, dropped_empty_arm: bool) -> Result<Self> {
        if paths.is_empty() {
            return Err(Error::empty_definition("decision branch"));
        }
        let is_optional = paths.len() == 1;
        let test_length = paths
            .iter()
            .map(AstDecisionPath::test_length)
            .max()
            .unwrap_or(0);
        Ok(Self {
            paths,
            is_optional,
            accepts_empty: is_optional || dropped_empty_arm,
            test_length,
        })
    }

    /// Returns the alternatives in declaration order.
    #[must_use]
    pub fn paths(&self) -> &[AstDecisionPath] {
        &self.paths
    }

    /// True iff the branch has exactly one alternative.
    #[must_use]
    pub fn is_optional(&self) -> bool {
        self.is_optional
    }

    /// True if the branch may match nothing at all.
    #[must_use]
    pub fn accepts_empty(&self) -> bool {
        self.accepts_empty
    }

    /// Maximum test length over the alternatives.
    #[must_use]
    pub fn test_length(&self) -> usize {
        self.test_length
    }
}

impl fmt::Display for AstDecisionBranch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let paths: Vec<String> = self.paths.iter().map(ToString::to_string).collect();
        write!(f, "({})", paths.join(" | "))?;
        if self.accepts_empty {
            f.write_str("?")?;
        }
        Ok(())
    }
}

// =============================================================================
// PathBuilder
// =============================================================================

/// Incrementally assembles a decision path.
#[derive(Clone, Debug, Default)]
pub struct PathBuilder {
    segments: Vec<PathSegment>,
}

impl PathBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a token to the trailing run, opening a new run after a
    /// branch.
    pub fn push(&mut self, token: Name) {
        if let Some(PathSegment::Tokens(names)) = self.segments.last_mut() {
            names.push(token);
        } else {
            self.segments.push(PathSegment::Tokens(vec![token]));
        }
    }

    /// Appends a branch of the alternatives that test at least one token.
    ///
    /// Zero-length alternatives carry no distinguishing information and are
    /// dropped; if none survive, nothing is appended.
    pub fn push_branch(&mut self, paths: Vec<AstDecisionPath>) {
        let total = paths.len();
        let survivors: Vec<AstDecisionPath> =
            paths.into_iter().filter(|p| p.test_length() > 0).collect();
        let dropped = survivors.len() < total;
        if let Ok(branch) = AstDecisionBranch::with_empty_arm(survivors, dropped) {
            self.segments.push(PathSegment::Branch(branch));
        }
    }

    /// Finalizes the path.
    ///
    /// A trailing branch with a single alternative never diverged and is
    /// dropped.
    #[must_use]
    pub fn build(mut self) -> AstDecisionPath {
        if let Some(PathSegment::Branch(branch)) = self.segments.last() {
            if branch.is_optional() {
                self.segments.pop();
            }
        }
        AstDecisionPath::new(self.segments)
    }
}
