//! Integration tests for decision tables

use kreia_decision::{ChoiceDecision, ChoicePoint, DecisionConfig, DecisionTable};
use kreia_foundation::{ErrorCategory, ErrorKind};
use kreia_grammar::{Definition, Grammar, GrammarBuilder, Modifier, Node, Rule, TokenDef};

fn def(nodes: Vec<Node>) -> Definition {
    Definition::new(nodes).unwrap()
}

fn tokens(names: &[&str]) -> GrammarBuilder {
    names.iter().fold(GrammarBuilder::new(), |builder, name| {
        builder.with_token(TokenDef::new(*name, name.to_lowercase()))
    })
}

fn shown(decision: &ChoiceDecision) -> Vec<String> {
    match decision {
        ChoiceDecision::Alternatives(paths) => paths.iter().map(ToString::to_string).collect(),
        ChoiceDecision::Entry(path) => vec![path.to_string()],
    }
}

/// `atom = Num | LParen expr RParen` and `expr = atom (Plus atom)*`.
fn arithmetic() -> Grammar {
    let atom = Node::or(vec![
        def(vec![Node::token("Num")]),
        def(vec![Node::token("LParen"), Node::subrule("expr"), Node::token("RParen")]),
    ])
    .unwrap();
    let tail = Node::paren(
        def(vec![Node::token("Plus"), Node::subrule("atom")]),
        Modifier::MaybeMany,
    );
    tokens(&["Num", "Plus", "LParen", "RParen"])
        .with_rule(Rule::new("atom", Definition::single(atom), vec![]).unwrap())
        .with_rule(Rule::new("expr", def(vec![Node::subrule("atom"), tail]), vec![]).unwrap())
        .build()
        .unwrap()
}

// =============================================================================
// Building
// =============================================================================

#[test]
fn recursive_grammar_is_tabled() {
    let table = DecisionTable::build(&arithmetic(), DecisionConfig::default()).unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(shown(table.get("atom", &[0]).unwrap()), ["Num", "LParen"]);
    assert!(matches!(table.get("expr", &[1]), Some(ChoiceDecision::Entry(_))));
    assert_eq!(shown(table.get("expr", &[1]).unwrap()), ["Plus"]);
    assert_eq!(table.max_test_length(), 1);
}

#[test]
fn entries_iterate_by_rule_then_path() {
    let table = DecisionTable::build(&arithmetic(), DecisionConfig::default()).unwrap();
    let points: Vec<String> = table.iter().map(|(point, _)| point.to_string()).collect();
    assert_eq!(points, ["atom[0]", "expr[1]"]);
}

#[test]
fn optional_subrule_looks_through_the_callee() {
    let grammar = tokens(&["A", "B", "C"])
        .with_rule(Rule::new("sub", def(vec![Node::token("B"), Node::token("C")]), vec![]).unwrap())
        .with_rule(
            Rule::new(
                "r",
                def(vec![Node::token("A"), Node::subrule("sub").maybe(), Node::token("B")]),
                vec![],
            )
            .unwrap(),
        )
        .build()
        .unwrap();

    let table = DecisionTable::build(&grammar, DecisionConfig::default()).unwrap();
    assert_eq!(shown(table.get("r", &[1]).unwrap()), ["B C"]);
    assert!(table.get("sub", &[0]).is_none());
}

#[test]
fn optional_or_is_decided_against_what_follows() {
    let or = Node::or(vec![def(vec![Node::token("A")]), def(vec![Node::token("B")])])
        .unwrap()
        .maybe();
    let grammar = tokens(&["A", "B", "C"])
        .with_rule(Rule::new("r", def(vec![or, Node::token("C")]), vec![]).unwrap())
        .build()
        .unwrap();

    let table = DecisionTable::build(&grammar, DecisionConfig::default()).unwrap();
    assert_eq!(shown(table.get("r", &[0]).unwrap()), ["A", "B"]);
}

// =============================================================================
// Prefix handling
// =============================================================================

fn prefix_grammar() -> Grammar {
    tokens(&["A", "B"])
        .with_rule(
            Rule::new(
                "r",
                def(vec![
                    Node::paren(def(vec![Node::token("A")]), Modifier::Maybe),
                    Node::token("A"),
                    Node::token("B"),
                ]),
                vec![],
            )
            .unwrap(),
        )
        .build()
        .unwrap()
}

#[test]
fn prefix_entry_is_kept_when_permissive() {
    let table = DecisionTable::build(&prefix_grammar(), DecisionConfig::default()).unwrap();
    assert_eq!(shown(table.get("r", &[0]).unwrap()), ["A"]);
}

#[test]
fn prefix_entry_is_rejected_when_strict() {
    let err = DecisionTable::build(&prefix_grammar(), DecisionConfig::strict()).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::UndecidableGrammar);
    assert!(matches!(err.kind, ErrorKind::Undecidable(_)));

    let context = err.context.unwrap();
    assert_eq!(context.owner.as_deref(), Some("rule r"));
    assert_eq!(context.choice_point, Some(vec![0]));
}

#[test]
fn choice_points_order_by_rule_name() {
    let mut points = vec![
        ChoicePoint::new("b", vec![0]),
        ChoicePoint::new("a", vec![3]),
        ChoicePoint::new("a", vec![1, 0, 2]),
    ];
    points.sort();
    let shown: Vec<String> = points.iter().map(ToString::to_string).collect();
    assert_eq!(shown, ["a[1.0.2]", "a[3]", "b[0]"]);
}
