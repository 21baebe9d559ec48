//! Integration tests for nodes and definitions

use kreia_foundation::{ErrorCategory, ErrorKind};
use kreia_grammar::{Definition, Modifier, Node, NodeKind};

fn def(nodes: Vec<Node>) -> Definition {
    Definition::new(nodes).unwrap()
}

// =============================================================================
// Construction
// =============================================================================

#[test]
fn or_with_all_optional_alternative_fails_at_construction() {
    let err = Node::or(vec![
        def(vec![Node::token("A").maybe()]),
        def(vec![Node::token("B")]),
    ])
    .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::AllOptionalAlternative(_)));
    assert_eq!(err.category(), ErrorCategory::GrammarDefinition);
}

#[test]
fn alternative_with_one_mandatory_node_is_fine() {
    let or = Node::or(vec![
        def(vec![Node::token("A").maybe(), Node::token("B")]),
        def(vec![Node::token("C").maybe_many(), Node::token("D").many()]),
    ]);
    assert!(or.is_ok());
}

#[test]
fn empty_constructs_are_rejected() {
    assert!(matches!(
        Definition::new(vec![]).unwrap_err().kind,
        ErrorKind::EmptyDefinition(_)
    ));
    assert!(matches!(
        Node::or(vec![]).unwrap_err().kind,
        ErrorKind::EmptyDefinition(_)
    ));
    assert!(matches!(
        Node::macro_call("m", vec![]).unwrap_err().kind,
        ErrorKind::EmptyDefinition(_)
    ));
    assert!(Node::consume(Vec::<&str>::new()).is_err());
}

#[test]
fn macro_call_rejects_all_optional_argument() {
    let err = Node::macro_call("m", vec![def(vec![Node::token("A").maybe_many()])]).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::AllOptionalAlternative(_)));
}

#[test]
fn needs_decidable_follows_modifier() {
    assert!(!Node::token("A").needs_decidable());
    for modifier in [Modifier::Many, Modifier::Maybe, Modifier::MaybeMany] {
        let node = Node::paren(def(vec![Node::token("A")]), modifier);
        assert!(node.needs_decidable());
        assert_eq!(node.is_optional(), modifier.is_optional());
    }
}

// =============================================================================
// Clustering
// =============================================================================

#[test]
fn clustering_merges_plain_runs_only() {
    let definition = def(vec![
        Node::token("A"),
        Node::token("B"),
        Node::token("C").maybe(),
        Node::token("D"),
        Node::subrule("r"),
        Node::token("E"),
        Node::token("F"),
    ]);
    let clustered = definition.cluster_consumes();
    assert_eq!(clustered.len(), 5);
    assert_eq!(clustered.to_string(), "(A B) C? D r (E F)");
}

#[test]
fn clustering_reaches_nested_definitions() {
    let inner = def(vec![Node::token("A"), Node::token("B")]);
    let definition = def(vec![Node::paren(inner, Modifier::Many)]);
    let clustered = definition.cluster_consumes();
    match clustered.nodes()[0].kind() {
        NodeKind::Paren(body) => assert_eq!(body.len(), 1),
        other => panic!("expected Paren, got {other:?}"),
    }
}

#[test]
fn display_uses_grammar_notation() {
    let definition = def(vec![
        Node::token("Open"),
        Node::locking_var("tag"),
        Node::macro_call("list", vec![def(vec![Node::var("item")])]).unwrap().maybe(),
    ]);
    assert_eq!(definition.to_string(), "Open @tag list!($item)?");
}
