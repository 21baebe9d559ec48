//! Lazy, cloneable traversal of grammar definitions.
//!
//! A [`GrammarIter`] expands rules, macro calls, argument variables and
//! repetition into a flat stream of [`DecisionUnit`]s. Its state is a stack
//! of small frames, each a cursor into a shared definition plus the scope
//! stack it resolves names in, so cloning an iterator to explore several
//! speculative continuations never copies grammar data.
//!
//! An *eternal* iterator restarts its seed definition whenever it runs out.
//! It never terminates on its own; the compute engine only ever advances
//! competitors once per token taken from the main side, and it is the main
//! side's finite progress that bounds the whole computation.

use std::sync::Arc;

use kreia_foundation::{Error, ItemKind, Name, Result};
use kreia_grammar::{
    Definition, Grammar, Modifier, Node, NodeKind, Rule, ScopeStack, ScopedDefinition,
};

/// One item of the flattened traversal.
#[derive(Clone, Debug, PartialEq)]
pub enum DecisionUnit {
    /// A concrete token name.
    Token(Name),
    /// A choice between continuations, each paired with its scope.
    Branch(Vec<ScopedDefinition>),
    /// A choice that may also be skipped, resuming whatever follows it.
    ///
    /// Produced when an optional run reaches the end of its definition, so
    /// no mandatory node stands in for the skip.
    Optional(Vec<ScopedDefinition>),
    /// An unbounded repetition body has been unrolled once and loops back.
    Continue(ScopedDefinition),
}

#[derive(Clone, Debug)]
enum Frame {
    Nodes {
        definition: Definition,
        position: usize,
        scope: ScopeStack,
    },
    Tokens {
        names: Arc<[Name]>,
        position: usize,
    },
    /// Emits a continue marker when reached.
    Repeat(ScopedDefinition),
}

/// A traversal over a definition in a grammar.
#[derive(Clone, Debug)]
pub struct GrammarIter<'g> {
    grammar: &'g Grammar,
    frames: Vec<Frame>,
    eternal: Option<ScopedDefinition>,
    /// Set whenever a token is produced; an eternal seed that restarts
    /// without producing a token is treated as exhausted.
    produced: bool,
    max_depth: usize,
}

impl<'g> GrammarIter<'g> {
    /// Creates an iterator over `start`.
    #[must_use]
    pub fn new(grammar: &'g Grammar, start: ScopedDefinition, max_depth: usize) -> Self {
        let mut iter = Self {
            grammar,
            frames: Vec::new(),
            eternal: None,
            produced: false,
            max_depth,
        };
        iter.push_nodes(start.definition, start.scope);
        iter
    }

    /// Creates an iterator over `rule`'s own definition.
    #[must_use]
    pub fn for_rule(grammar: &'g Grammar, rule: &Rule, max_depth: usize) -> Self {
        let start = ScopedDefinition::new(rule.definition().clone(), ScopeStack::for_rule(rule));
        Self::new(grammar, start, max_depth)
    }

    /// Creates an iterator that restarts `seed` forever.
    #[must_use]
    pub fn eternal(grammar: &'g Grammar, seed: ScopedDefinition, max_depth: usize) -> Self {
        let mut iter = Self::new(grammar, seed.clone(), max_depth);
        iter.eternal = Some(seed);
        iter
    }

    /// Returns true if this iterator restarts when it runs out.
    #[must_use]
    pub fn is_eternal(&self) -> bool {
        self.eternal.is_some()
    }

    /// Returns an iterator that first traverses `alternative`, then resumes
    /// where `self` currently is.
    #[must_use]
    pub fn chained(&self, alternative: ScopedDefinition) -> Self {
        let mut chained = self.clone();
        chained.push_nodes(alternative.definition, alternative.scope);
        chained
    }

    /// Produces the next decision unit.
    ///
    /// # Errors
    ///
    /// Returns `UnknownReference` or `ArityMismatch` for references that do
    /// not resolve, and `Undecidable` when expansion nests deeper than the
    /// configured bound (left recursion).
    pub fn next_unit(&mut self) -> Result<Option<DecisionUnit>> {
        loop {
            let Some(frame) = self.frames.last_mut() else {
                match &self.eternal {
                    Some(seed) if self.produced => {
                        let seed = seed.clone();
                        self.produced = false;
                        self.push_nodes(seed.definition, seed.scope);
                        continue;
                    }
                    _ => return Ok(None),
                }
            };

            match frame {
                Frame::Tokens { names, position } => {
                    let Some(name) = names.get(*position).cloned() else {
                        self.frames.pop();
                        continue;
                    };
                    *position += 1;
                    if !self.grammar.is_ignored(&name) {
                        return Ok(Some(self.produce(DecisionUnit::Token(name))));
                    }
                }
                Frame::Repeat(seed) => {
                    let seed = seed.clone();
                    self.frames.pop();
                    return Ok(Some(self.produce(DecisionUnit::Continue(seed))));
                }
                Frame::Nodes {
                    definition,
                    position,
                    scope,
                } => {
                    let Some(node) = definition.get(*position).cloned() else {
                        self.frames.pop();
                        continue;
                    };
                    let definition = definition.clone();
                    let scope = scope.clone();
                    *position += 1;

                    let unit = if node.is_optional() {
                        let (gathered, consumed) = gather_branches(&definition, *position);
                        *position += consumed;
                        let skippable = definition.get(*position - 1).is_some_and(Node::is_optional);
                        Some(optional_branch(&node, gathered, &scope, skippable))
                    } else {
                        None
                    };
                    if let Some(Frame::Nodes { definition, position, .. }) = self.frames.last() {
                        if *position >= definition.len() {
                            self.frames.pop();
                        }
                    }
                    if let Some(unit) = unit {
                        return Ok(Some(self.produce(unit)));
                    }
                    if let Some(unit) = self.expand(&node, scope)? {
                        return Ok(Some(self.produce(unit)));
                    }
                }
            }
        }
    }

    fn produce(&mut self, unit: DecisionUnit) -> DecisionUnit {
        if matches!(unit, DecisionUnit::Token(_)) {
            self.produced = true;
        }
        unit
    }

    fn push_nodes(&mut self, definition: Definition, scope: ScopeStack) {
        self.frames.push(Frame::Nodes {
            definition,
            position: 0,
            scope,
        });
    }

    fn push_checked(&mut self, definition: Definition, scope: ScopeStack) -> Result<()> {
        if self.frames.len() >= self.max_depth {
            return Err(Error::undecidable(format!(
                "expansion of {definition} nests deeper than {} frames",
                self.max_depth
            )));
        }
        self.push_nodes(definition, scope);
        Ok(())
    }

    /// Expands a mandatory or `+` node. Returns a unit when the node yields
    /// one directly; otherwise frames are pushed and traversal continues.
    fn expand(&mut self, node: &Node, scope: ScopeStack) -> Result<Option<DecisionUnit>> {
        if node.modifier() == Some(Modifier::Many) {
            let body = node.body();
            self.frames.push(Frame::Repeat(ScopedDefinition::new(
                body.clone(),
                scope.clone(),
            )));
            self.push_checked(body, scope)?;
            return Ok(None);
        }

        match node.kind() {
            NodeKind::Consume(names) => {
                self.frames.push(Frame::Tokens {
                    names: Arc::clone(names),
                    position: 0,
                });
                Ok(None)
            }
            NodeKind::Or(choices) => Ok(Some(DecisionUnit::Branch(
                choices
                    .iter()
                    .map(|choice| ScopedDefinition::new(choice.clone(), scope.clone()))
                    .collect(),
            ))),
            NodeKind::Subrule(name) => {
                let rule = self
                    .grammar
                    .get_rule(name)
                    .ok_or_else(|| Error::unknown_reference(ItemKind::Rule, name.as_ref()))?;
                let callee_scope = scope.enter_rule(rule);
                self.push_checked(rule.definition().clone(), callee_scope)?;
                Ok(None)
            }
            NodeKind::MacroCall { macro_name, args } => {
                let callee = self
                    .grammar
                    .get_macro(macro_name)
                    .ok_or_else(|| Error::unknown_reference(ItemKind::Macro, macro_name.as_ref()))?;
                let callee_scope = scope.enter_macro(callee, args)?;
                self.push_checked(callee.definition().clone(), callee_scope)?;
                Ok(None)
            }
            NodeKind::Var(name) => {
                let (bound, caller_scope) = scope.resolve_var(name)?;
                self.push_checked(bound, caller_scope)?;
                Ok(None)
            }
            NodeKind::LockingVar(name) => {
                let token = scope.resolve_locking_var(name)?;
                if self.grammar.is_ignored(&token) {
                    Ok(None)
                } else {
                    Ok(Some(DecisionUnit::Token(token)))
                }
            }
            NodeKind::Paren(inner) => {
                self.push_checked(inner.clone(), scope)?;
                Ok(None)
            }
        }
    }
}

impl Iterator for GrammarIter<'_> {
    type Item = Result<DecisionUnit>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_unit().transpose()
    }
}

/// The branch for an optional node and the run gathered after it. The
/// node's own arm comes first: its body for `?`, its repeating form for `*`.
fn optional_branch(
    node: &Node,
    gathered: Vec<Definition>,
    scope: &ScopeStack,
    skippable: bool,
) -> DecisionUnit {
    let first = match node.modifier() {
        Some(Modifier::MaybeMany) => Definition::single(node.clone().many()),
        _ => node.body(),
    };
    let alternatives = std::iter::once(first)
        .chain(gathered)
        .map(|definition| ScopedDefinition::new(definition, scope.clone()))
        .collect();
    if skippable {
        DecisionUnit::Optional(alternatives)
    } else {
        DecisionUnit::Branch(alternatives)
    }
}

/// Collects the alternatives that follow an optional node, consuming nodes
/// of the same definition starting at `start`.
///
/// Further optional nodes are added and gathering goes on. The first
/// mandatory node ends the run: a `+` node contributes its repeating form,
/// an unmodified `Or` contributes each of its choices, anything else
/// contributes itself.
///
/// Returns the alternatives and the number of nodes consumed.
#[must_use]
pub fn gather_branches(definition: &Definition, start: usize) -> (Vec<Definition>, usize) {
    let mut branches = Vec::new();
    let mut consumed = 0;

    for node in definition.nodes().iter().skip(start) {
        consumed += 1;
        match (node.kind(), node.modifier()) {
            (_, Some(Modifier::Maybe)) => branches.push(node.body()),
            (_, Some(Modifier::MaybeMany)) => {
                branches.push(Definition::single(node.clone().many()));
            }
            (_, Some(Modifier::Many)) => {
                branches.push(Definition::single(node.clone()));
                break;
            }
            (NodeKind::Or(choices), None) => {
                branches.extend(choices.iter().cloned());
                break;
            }
            (_, None) => {
                branches.push(Definition::single(node.clone()));
                break;
            }
        }
    }

    (branches, consumed)
}
