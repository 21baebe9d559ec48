//! The decidable compute engine.
//!
//! Given one alternative (the *main* side) and its competitors, the engine
//! walks all of them in lockstep. Every token taken from the main side is
//! matched against the next unit of every live competitor; competitors
//! that disagree are eliminated, competitors that branch are split into
//! one clone per alternative, and competitors that loop back through a
//! repetition become eternal. The tokens and branches the main side went
//! through until no competitor was left form the decision path.
//!
//! Termination rests on the main side: each round consumes a unit of it or
//! recurses into a strictly smaller branch alternative, and the one way it
//! could loop forever (looping back through its own repetition) is
//! reported as undecidable.

use std::collections::VecDeque;

use kreia_foundation::{Error, ErrorKind, Name, Result};
use kreia_grammar::{Grammar, ScopedDefinition};

use crate::config::DecisionConfig;
use crate::iter::{DecisionUnit, GrammarIter};
use crate::path::{AstDecisionPath, PathBuilder};
use crate::trace::{TraceEvent, Tracer};

/// Computes the decision path for `main` against `against` with the
/// default configuration.
///
/// # Errors
///
/// See [`DecisionEngine::compute`].
pub fn compute_decidable(
    grammar: &Grammar,
    main: &ScopedDefinition,
    against: &[ScopedDefinition],
) -> Result<AstDecisionPath> {
    DecisionEngine::new(grammar, DecisionConfig::default()).compute_decidable(main, against)
}

/// The result of one computation.
#[derive(Debug)]
pub struct DecisionOutcome<'g> {
    /// The shortest path telling the main alternative apart.
    pub path: AstDecisionPath,
    /// Competitors still live when the main side ran out.
    ///
    /// Non-empty when the main alternative is a strict prefix of a
    /// competitor. Such input is taken by whichever alternative is tested
    /// first.
    pub leftover: Vec<GrammarIter<'g>>,
}

impl DecisionOutcome<'_> {
    /// Returns true if every competitor was eliminated.
    #[must_use]
    pub fn is_fully_decided(&self) -> bool {
        self.leftover.is_empty()
    }
}

/// Computes decision paths over one grammar.
#[derive(Debug)]
pub struct DecisionEngine<'g> {
    grammar: &'g Grammar,
    config: DecisionConfig,
    tracer: Tracer,
}

impl<'g> DecisionEngine<'g> {
    /// Creates an engine.
    #[must_use]
    pub fn new(grammar: &'g Grammar, config: DecisionConfig) -> Self {
        let tracer = Tracer::new(config.tracer.clone());
        Self {
            grammar,
            config,
            tracer,
        }
    }

    /// Returns the grammar.
    #[must_use]
    pub fn grammar(&self) -> &'g Grammar {
        self.grammar
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &DecisionConfig {
        &self.config
    }

    /// Returns the tracer.
    #[must_use]
    pub fn tracer(&self) -> &Tracer {
        &self.tracer
    }

    /// Creates an iterator bounded by this engine's depth limit.
    #[must_use]
    pub fn iter(&self, start: ScopedDefinition) -> GrammarIter<'g> {
        GrammarIter::new(self.grammar, start, self.config.max_depth)
    }

    /// Computes the decision path for `main` against `against`, returning
    /// leftover competitors as well.
    ///
    /// # Errors
    ///
    /// Returns `Undecidable` when the main side loops back through its own
    /// repetition with competitors left, when a configured bound is
    /// exceeded, or (in strict mode) when competitors outlive the main side.
    pub fn compute(
        &mut self,
        main: &ScopedDefinition,
        against: &[ScopedDefinition],
    ) -> Result<DecisionOutcome<'g>> {
        self.tracer.record(
            0,
            TraceEvent::ComputeStart {
                alternatives: against.len(),
            },
        );

        let competitors = against.iter().cloned().map(|d| self.iter(d)).collect();
        let result = self
            .lockstep(self.iter(main.clone()), competitors, 0)
            .and_then(|(path, leftover)| self.finish(path, leftover));

        if let Err(err) = &result {
            self.tracer.record(
                0,
                TraceEvent::Undecidable {
                    reason: err.to_string(),
                },
            );
        }
        result
    }

    /// Computes only the decision path for `main` against `against`.
    ///
    /// # Errors
    ///
    /// See [`DecisionEngine::compute`].
    pub fn compute_decidable(
        &mut self,
        main: &ScopedDefinition,
        against: &[ScopedDefinition],
    ) -> Result<AstDecisionPath> {
        self.compute(main, against).map(|outcome| outcome.path)
    }

    /// Builds a test for the first decision unit of `main` only.
    ///
    /// Used when there is nothing to decide against but a test is still
    /// needed to know whether `main` is present at all.
    ///
    /// # Errors
    ///
    /// Returns an error if `main` does not resolve.
    pub fn first_decidable(&mut self, main: &ScopedDefinition) -> Result<AstDecisionPath> {
        self.first_unit_path(main, 0)
    }

    fn first_unit_path(&mut self, main: &ScopedDefinition, depth: usize) -> Result<AstDecisionPath> {
        self.check_depth(depth)?;
        let mut iter = self.iter(main.clone());
        match iter.next_unit()? {
            None => Ok(AstDecisionPath::default()),
            Some(DecisionUnit::Token(token)) => Ok(AstDecisionPath::from_tokens([token])),
            // the skip arm of an optional unit would match anything, so it
            // is left out
            Some(DecisionUnit::Branch(alternatives) | DecisionUnit::Optional(alternatives))
                if alternatives.len() == 1 =>
            {
                self.first_unit_path(&alternatives[0], depth + 1)
            }
            Some(DecisionUnit::Branch(alternatives) | DecisionUnit::Optional(alternatives)) => {
                let mut paths = Vec::with_capacity(alternatives.len());
                for alternative in &alternatives {
                    paths.push(self.first_unit_path(alternative, depth + 1)?);
                }
                let mut builder = PathBuilder::new();
                builder.push_branch(paths);
                Ok(builder.build())
            }
            Some(DecisionUnit::Continue(body)) => Err(Error::new(ErrorKind::Internal(format!(
                "continue marker before any unit of {}",
                body.definition
            )))),
        }
    }

    fn finish(
        &mut self,
        path: AstDecisionPath,
        leftover: Vec<GrammarIter<'g>>,
    ) -> Result<DecisionOutcome<'g>> {
        if !leftover.is_empty() {
            self.tracer.record(
                0,
                TraceEvent::MainExhausted {
                    leftover: leftover.len(),
                },
            );
            if self.config.strict_prefixes {
                return Err(Error::undecidable(format!(
                    "alternative {path} is a prefix of {} competing continuations",
                    leftover.len()
                )));
            }
        }
        self.tracer.record(
            0,
            TraceEvent::Decided {
                test_length: path.test_length(),
            },
        );
        Ok(DecisionOutcome { path, leftover })
    }

    fn check_depth(&self, depth: usize) -> Result<()> {
        if depth > self.config.max_depth {
            return Err(Error::undecidable(format!(
                "branch recursion exceeds {} levels",
                self.config.max_depth
            )));
        }
        Ok(())
    }

    fn lockstep(
        &mut self,
        mut main: GrammarIter<'g>,
        mut against: Vec<GrammarIter<'g>>,
        depth: usize,
    ) -> Result<(AstDecisionPath, Vec<GrammarIter<'g>>)> {
        self.check_depth(depth)?;
        let mut builder = PathBuilder::new();

        while !against.is_empty() {
            let Some(unit) = main.next_unit()? else {
                break;
            };

            match unit {
                DecisionUnit::Token(token) => {
                    against = self.advance_competitors(&token, against, depth)?;
                    self.tracer.record(
                        depth,
                        TraceEvent::MainToken {
                            token: token.clone(),
                            live: against.len(),
                        },
                    );
                    builder.push(token);
                }
                DecisionUnit::Branch(alternatives) => {
                    against = self.main_branch(&mut builder, alternatives, against, false, depth)?;
                }
                DecisionUnit::Optional(alternatives) => {
                    against = self.main_branch(&mut builder, alternatives, against, true, depth)?;
                }
                DecisionUnit::Continue(body) => {
                    return Err(Error::undecidable(format!(
                        "repetition of {} loops back while {} competitors remain",
                        body.definition,
                        against.len()
                    )));
                }
            }
        }

        Ok((builder.build(), against))
    }

    /// Decides each alternative of a main-side branch against the current
    /// competitors and returns the union of their leftovers.
    ///
    /// Skipping a `skippable` branch takes no token, so every competitor
    /// survives it and the branch gains an arm matching nothing.
    fn main_branch(
        &mut self,
        builder: &mut PathBuilder,
        alternatives: Vec<ScopedDefinition>,
        against: Vec<GrammarIter<'g>>,
        skippable: bool,
        depth: usize,
    ) -> Result<Vec<GrammarIter<'g>>> {
        self.tracer.record(
            depth,
            TraceEvent::BranchEntered {
                alternatives: alternatives.len() + usize::from(skippable),
            },
        );
        let mut continued = Vec::new();
        let mut paths = Vec::with_capacity(alternatives.len() + 1);
        for alternative in alternatives {
            let (path, leftover) = self.lockstep(self.iter(alternative), against.clone(), depth + 1)?;
            continued.extend(leftover);
            paths.push(path);
        }
        if skippable {
            continued.extend(against);
            paths.push(AstDecisionPath::default());
        }
        self.check_competitors(continued.len())?;
        builder.push_branch(paths);
        Ok(continued)
    }

    /// Advances every competitor past one token, returning the survivors in
    /// order.
    fn advance_competitors(
        &mut self,
        token: &Name,
        against: Vec<GrammarIter<'g>>,
        depth: usize,
    ) -> Result<Vec<GrammarIter<'g>>> {
        let mut queue: VecDeque<GrammarIter<'g>> = against.into();
        let mut survivors = Vec::new();
        let mut processed = 0;

        while let Some(mut competitor) = queue.pop_front() {
            processed += 1;
            self.check_competitors(processed)?;

            match competitor.next_unit()? {
                None => self.eliminated(depth, "exhausted".to_string()),
                Some(DecisionUnit::Branch(alternatives)) => {
                    self.fork(depth, &competitor, alternatives, &mut queue);
                }
                Some(DecisionUnit::Optional(alternatives)) => {
                    self.fork(depth, &competitor, alternatives, &mut queue);
                    // skipped: resumes past the branch
                    queue.push_back(competitor);
                }
                Some(DecisionUnit::Continue(body)) => {
                    self.tracer.record(depth, TraceEvent::CompetitorEternal);
                    queue.push_back(GrammarIter::eternal(
                        self.grammar,
                        body,
                        self.config.max_depth,
                    ));
                }
                Some(DecisionUnit::Token(found)) if found == *token => survivors.push(competitor),
                Some(DecisionUnit::Token(found)) => {
                    self.eliminated(depth, format!("expected {token}, found {found}"));
                }
            }
        }

        Ok(survivors)
    }

    fn fork(
        &mut self,
        depth: usize,
        competitor: &GrammarIter<'g>,
        alternatives: Vec<ScopedDefinition>,
        queue: &mut VecDeque<GrammarIter<'g>>,
    ) {
        self.tracer.record(
            depth,
            TraceEvent::CompetitorForked {
                alternatives: alternatives.len(),
            },
        );
        for alternative in alternatives {
            queue.push_back(competitor.chained(alternative));
        }
    }

    fn eliminated(&mut self, depth: usize, reason: String) {
        self.tracer
            .record(depth, TraceEvent::CompetitorEliminated { reason });
    }

    fn check_competitors(&self, count: usize) -> Result<()> {
        if count > self.config.max_competitors {
            return Err(Error::undecidable(format!(
                "more than {} competing continuations",
                self.config.max_competitors
            )));
        }
        Ok(())
    }
}
