//! Eager computation of every choice point in a grammar.
//!
//! [`DecisionTable::build`] walks each rule's definition and computes one
//! decision per choice point, so a grammar that cannot be decided with
//! bounded lookahead is rejected when it is loaded rather than when some
//! input first reaches the offending choice.

use std::collections::BTreeMap;
use std::fmt;

use kreia_foundation::{ErrorContext, Name, Result};
use kreia_grammar::{Definition, Grammar, Modifier, Node, NodeKind, Rule, ScopeStack, ScopedDefinition};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::compute::DecisionEngine;
use crate::config::DecisionConfig;
use crate::iter::gather_branches;
use crate::path::AstDecisionPath;

/// Location of a choice point: the owning rule plus node indices leading
/// to it.
///
/// Indices step into `Or` choices as `[node, choice, node, ...]` and into
/// `Paren` bodies as `[node, node, ...]`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChoicePoint {
    /// The owning rule.
    pub rule: Name,
    /// Node indices from the rule's definition to the choice point.
    pub path: Vec<usize>,
}

impl ChoicePoint {
    /// Creates a choice point.
    #[must_use]
    pub fn new(rule: impl Into<Name>, path: Vec<usize>) -> Self {
        Self {
            rule: rule.into(),
            path,
        }
    }
}

impl fmt::Display for ChoicePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path: Vec<String> = self.path.iter().map(ToString::to_string).collect();
        write!(f, "{}[{}]", self.rule, path.join("."))
    }
}

/// What was decided at a choice point.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ChoiceDecision {
    /// One path per alternative of an `Or`, in declaration order.
    Alternatives(Vec<AstDecisionPath>),
    /// Whether to enter (or re-enter) a modified node.
    Entry(AstDecisionPath),
}

/// Decisions for every choice point of a grammar's rules.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DecisionTable {
    entries: BTreeMap<ChoicePoint, ChoiceDecision>,
}

impl DecisionTable {
    /// Computes every choice point of every rule, in declaration order.
    ///
    /// An optional node is decided against what may follow it. Inside an
    /// `Or` choice or a `Paren` body that includes what follows the
    /// enclosing node, and another round of it when it repeats. A rule's own
    /// definition is decided with nothing after it, since what follows a
    /// rule depends on its callers.
    ///
    /// Choice points inside macro bodies depend on the arguments of each
    /// call and are left to [`DecisionEngine`].
    ///
    /// # Errors
    ///
    /// Returns the first error met, with context naming the rule and the
    /// choice point.
    pub fn build(grammar: &Grammar, config: DecisionConfig) -> Result<Self> {
        let mut builder = TableBuilder {
            engine: DecisionEngine::new(grammar, config),
            entries: BTreeMap::new(),
        };
        for rule in grammar.rules() {
            let scope = ScopeStack::for_rule(rule);
            builder.walk(rule, rule.definition(), &scope, &[], &mut Vec::new())?;
        }
        Ok(Self {
            entries: builder.entries,
        })
    }

    /// Returns the decision at a choice point.
    #[must_use]
    pub fn get(&self, rule: &str, path: &[usize]) -> Option<&ChoiceDecision> {
        self.entries.get(&ChoicePoint::new(rule, path.to_vec()))
    }

    /// Returns the number of choice points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the grammar has no choice points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over all entries, ordered by rule name then path.
    pub fn iter(&self) -> impl Iterator<Item = (&ChoicePoint, &ChoiceDecision)> {
        self.entries.iter()
    }

    /// Returns the longest test any entry performs.
    #[must_use]
    pub fn max_test_length(&self) -> usize {
        self.entries
            .values()
            .flat_map(|decision| match decision {
                ChoiceDecision::Alternatives(paths) => paths.iter().collect::<Vec<_>>(),
                ChoiceDecision::Entry(path) => vec![path],
            })
            .map(AstDecisionPath::test_length)
            .max()
            .unwrap_or(0)
    }
}

struct TableBuilder<'g> {
    engine: DecisionEngine<'g>,
    entries: BTreeMap<ChoicePoint, ChoiceDecision>,
}

impl TableBuilder<'_> {
    fn walk(
        &mut self,
        rule: &Rule,
        definition: &Definition,
        scope: &ScopeStack,
        outer: &[ScopedDefinition],
        prefix: &mut Vec<usize>,
    ) -> Result<()> {
        for (index, node) in definition.iter().enumerate() {
            prefix.push(index);
            let scoped = |d: &Definition| ScopedDefinition::new(d.clone(), scope.clone());
            let after = follow(definition, index, scope, outer);
            let inside = enclosed(node, scope, &after);
            let following: &[ScopedDefinition] = if node.needs_decidable() { &after } else { &[] };

            match node.kind() {
                NodeKind::Or(choices) => {
                    let choices: Vec<ScopedDefinition> = choices.iter().map(scoped).collect();
                    let decision = self
                        .alternatives(&choices, following)
                        .map_err(|e| e.with_context(context(rule, prefix)))?;
                    self.insert(rule, prefix, decision);
                    for (choice_index, choice) in choices.iter().enumerate() {
                        prefix.push(choice_index);
                        self.walk(rule, &choice.definition, scope, &inside, prefix)?;
                        prefix.pop();
                    }
                }
                _ if node.needs_decidable() => {
                    let body = scoped(&node.body());
                    let decision = self
                        .entry(&body, following)
                        .map_err(|e| e.with_context(context(rule, prefix)))?;
                    self.insert(rule, prefix, decision);
                    if let NodeKind::Paren(inner) = node.kind() {
                        self.walk(rule, inner, scope, &inside, prefix)?;
                    }
                }
                NodeKind::Paren(inner) => self.walk(rule, inner, scope, &inside, prefix)?,
                _ => {}
            }
            prefix.pop();
        }
        Ok(())
    }

    fn alternatives(
        &mut self,
        choices: &[ScopedDefinition],
        following: &[ScopedDefinition],
    ) -> Result<ChoiceDecision> {
        let mut paths = Vec::with_capacity(choices.len());
        for (index, choice) in choices.iter().enumerate() {
            let against: Vec<ScopedDefinition> = choices
                .iter()
                .enumerate()
                .filter(|(other, _)| *other != index)
                .map(|(_, d)| d.clone())
                .chain(following.iter().cloned())
                .collect();
            paths.push(self.decide(choice, &against)?);
        }
        Ok(ChoiceDecision::Alternatives(paths))
    }

    fn entry(
        &mut self,
        body: &ScopedDefinition,
        following: &[ScopedDefinition],
    ) -> Result<ChoiceDecision> {
        self.decide(body, following).map(ChoiceDecision::Entry)
    }

    fn decide(
        &mut self,
        main: &ScopedDefinition,
        against: &[ScopedDefinition],
    ) -> Result<AstDecisionPath> {
        if against.is_empty() {
            return self.engine.first_decidable(main);
        }
        let path = self.engine.compute_decidable(main, against)?;
        if path.is_empty() {
            // nothing told the alternatives apart before main ran out
            return self.engine.first_decidable(main);
        }
        Ok(path)
    }

    fn insert(&mut self, rule: &Rule, path: &[usize], decision: ChoiceDecision) {
        self.entries
            .insert(ChoicePoint::new(rule.name().clone(), path.to_vec()), decision);
    }
}

/// What may come after `definition[index]`: the optional run behind it up
/// to the first mandatory node, plus `outer` when that run reaches the end.
fn follow(
    definition: &Definition,
    index: usize,
    scope: &ScopeStack,
    outer: &[ScopedDefinition],
) -> Vec<ScopedDefinition> {
    let (gathered, consumed) = gather_branches(definition, index + 1);
    let runs_off = consumed == 0 || definition.get(index + consumed).is_some_and(Node::is_optional);
    let mut following: Vec<ScopedDefinition> = gathered
        .into_iter()
        .map(|d| ScopedDefinition::new(d, scope.clone()))
        .collect();
    if runs_off {
        following.extend_from_slice(outer);
    }
    following
}

/// What may follow the end of a node's nested definition: another round of
/// the node when it repeats, then whatever follows the node itself.
fn enclosed(node: &Node, scope: &ScopeStack, after: &[ScopedDefinition]) -> Vec<ScopedDefinition> {
    let again = matches!(node.modifier(), Some(Modifier::Many | Modifier::MaybeMany))
        .then(|| ScopedDefinition::new(Definition::single(node.clone().many()), scope.clone()));
    again.into_iter().chain(after.iter().cloned()).collect()
}

fn context(rule: &Rule, path: &[usize]) -> ErrorContext {
    ErrorContext::new()
        .with_owner(format!("rule {}", rule.name()))
        .with_choice_point(path.to_vec())
}
