//! Integration tests for grammar iteration

use kreia_decision::{DecisionUnit, GrammarIter};
use kreia_foundation::{ErrorKind, Result};
use kreia_grammar::{
    Arg, Definition, Grammar, GrammarBuilder, LockingArg, Macro, Node, Rule, ScopeStack,
    ScopedDefinition, TokenDef,
};

const DEPTH: usize = 64;

fn def(nodes: Vec<Node>) -> Definition {
    Definition::new(nodes).unwrap()
}

fn tokens() -> GrammarBuilder {
    let mut builder = GrammarBuilder::new();
    for name in ["A", "B", "C", "D"] {
        builder = builder.with_token(TokenDef::new(name, name.to_lowercase()));
    }
    builder.with_token(TokenDef::ignored("Space", " +"))
}

fn wrap() -> Macro {
    Macro::new(
        "wrap",
        vec![Arg::new("x")],
        def(vec![Node::token("C"), Node::var("x"), Node::token("D")]),
        vec![],
    )
    .unwrap()
}

fn units(grammar: &Grammar, rule: &str) -> Result<Vec<DecisionUnit>> {
    let rule = grammar.get_rule(rule).unwrap();
    GrammarIter::for_rule(grammar, rule, DEPTH).collect()
}

/// Token names of a run made only of tokens.
fn token_names(units: &[DecisionUnit]) -> Vec<String> {
    units
        .iter()
        .map(|unit| match unit {
            DecisionUnit::Token(name) => name.to_string(),
            other => panic!("expected a token, got {other:?}"),
        })
        .collect()
}

// =============================================================================
// Expansion
// =============================================================================

#[test]
fn subrules_expand_in_place() {
    let grammar = tokens()
        .with_rule(Rule::new("bc", def(vec![Node::token("B"), Node::token("C")]), vec![]).unwrap())
        .with_rule(
            Rule::new(
                "r",
                def(vec![Node::token("A"), Node::subrule("bc"), Node::token("D")]),
                vec![],
            )
            .unwrap(),
        )
        .build()
        .unwrap();
    assert_eq!(token_names(&units(&grammar, "r").unwrap()), ["A", "B", "C", "D"]);
}

#[test]
fn macro_arguments_expand_at_their_var() {
    let call = Node::macro_call("wrap", vec![def(vec![Node::token("A"), Node::token("B")])]).unwrap();
    let grammar = tokens()
        .with_macro(wrap())
        .with_rule(Rule::new("r", def(vec![call]), vec![]).unwrap())
        .build()
        .unwrap();
    assert_eq!(token_names(&units(&grammar, "r").unwrap()), ["C", "A", "B", "D"]);
}

#[test]
fn forwarded_arguments_resolve_in_the_original_caller() {
    let outer = Macro::new(
        "outer",
        vec![Arg::new("y")],
        def(vec![Node::macro_call("wrap", vec![def(vec![Node::var("y")])]).unwrap()]),
        vec![],
    )
    .unwrap();
    let call = Node::macro_call("outer", vec![def(vec![Node::token("A")])]).unwrap();
    let grammar = tokens()
        .with_macro(wrap())
        .with_macro(outer)
        .with_rule(Rule::new("r", def(vec![call]), vec![]).unwrap())
        .build()
        .unwrap();
    assert_eq!(token_names(&units(&grammar, "r").unwrap()), ["C", "A", "D"]);
}

#[test]
fn locking_vars_yield_their_token() {
    let grammar = tokens()
        .with_rule(
            Rule::new(
                "r",
                def(vec![Node::token("A"), Node::locking_var("tag"), Node::token("C")]),
                vec![LockingArg::new("tag", "B")],
            )
            .unwrap(),
        )
        .build()
        .unwrap();
    assert_eq!(token_names(&units(&grammar, "r").unwrap()), ["A", "B", "C"]);
}

#[test]
fn ignored_tokens_are_skipped() {
    let grammar = tokens()
        .with_rule(
            Rule::new(
                "r",
                def(vec![Node::token("A"), Node::token("Space"), Node::token("B")]),
                vec![],
            )
            .unwrap(),
        )
        .build()
        .unwrap();
    assert_eq!(token_names(&units(&grammar, "r").unwrap()), ["A", "B"]);
}

// =============================================================================
// Choices and repetition
// =============================================================================

#[test]
fn optional_node_branches_against_what_follows() {
    let grammar = tokens()
        .with_rule(
            Rule::new("r", def(vec![Node::token("A").maybe(), Node::token("B")]), vec![]).unwrap(),
        )
        .build()
        .unwrap();
    let units = units(&grammar, "r").unwrap();
    assert_eq!(units.len(), 1);
    match &units[0] {
        DecisionUnit::Branch(alternatives) => {
            let shown: Vec<String> = alternatives.iter().map(|a| a.definition.to_string()).collect();
            assert_eq!(shown, ["A", "B"]);
        }
        other => panic!("expected a branch, got {other:?}"),
    }
}

#[test]
fn or_yields_one_alternative_per_choice() {
    let or = Node::or(vec![def(vec![Node::token("A")]), def(vec![Node::token("B"), Node::token("C")])])
        .unwrap();
    let grammar = tokens()
        .with_rule(Rule::new("r", def(vec![or, Node::token("D")]), vec![]).unwrap())
        .build()
        .unwrap();
    let units = units(&grammar, "r").unwrap();
    assert_eq!(units.len(), 2);
    assert!(matches!(&units[0], DecisionUnit::Branch(alternatives) if alternatives.len() == 2));
    assert_eq!(units[1], DecisionUnit::Token("D".into()));
}

#[test]
fn many_unrolls_once_then_continues() {
    let grammar = tokens()
        .with_rule(Rule::new("r", def(vec![Node::token("A").many()]), vec![]).unwrap())
        .build()
        .unwrap();
    let units = units(&grammar, "r").unwrap();
    assert_eq!(units.len(), 2);
    assert_eq!(units[0], DecisionUnit::Token("A".into()));
    match &units[1] {
        DecisionUnit::Continue(body) => assert_eq!(body.definition.to_string(), "A"),
        other => panic!("expected a continue marker, got {other:?}"),
    }
}

#[test]
fn eternal_iterator_restarts_its_seed() {
    let grammar = tokens().build().unwrap();
    let seed = ScopedDefinition::new(
        def(vec![Node::token("A"), Node::token("B")]),
        ScopeStack::new(),
    );
    let mut iter = GrammarIter::eternal(&grammar, seed, DEPTH);
    assert!(iter.is_eternal());
    let first: Vec<DecisionUnit> = iter.by_ref().take(5).collect::<Result<_>>().unwrap();
    assert_eq!(token_names(&first), ["A", "B", "A", "B", "A"]);
}

#[test]
fn clones_continue_independently() {
    let grammar = tokens()
        .with_rule(
            Rule::new(
                "r",
                def(vec![Node::token("A"), Node::token("B"), Node::token("C")]),
                vec![],
            )
            .unwrap(),
        )
        .build()
        .unwrap();
    let rule = grammar.get_rule("r").unwrap();
    let mut iter = GrammarIter::for_rule(&grammar, rule, DEPTH);
    assert_eq!(iter.next_unit().unwrap(), Some(DecisionUnit::Token("A".into())));

    let fork = iter.clone();
    let rest: Vec<DecisionUnit> = iter.collect::<Result<_>>().unwrap();
    let forked: Vec<DecisionUnit> = fork.collect::<Result<_>>().unwrap();
    assert_eq!(rest, forked);
    assert_eq!(token_names(&rest), ["B", "C"]);
}

#[test]
fn left_recursion_hits_the_depth_bound() {
    let grammar = tokens()
        .with_rule(
            Rule::new("r", def(vec![Node::subrule("r"), Node::token("A")]), vec![]).unwrap(),
        )
        .build()
        .unwrap();
    let err = units(&grammar, "r").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Undecidable(_)));
}
