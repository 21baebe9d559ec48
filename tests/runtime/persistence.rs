//! Integration tests for decision table persistence

use kreia_decision::{ChoiceDecision, DecisionConfig, DecisionTable};
use kreia_foundation::{ErrorCategory, ErrorKind};
use kreia_grammar::{Definition, Grammar, Modifier, Node, Rule, TokenDef};
use kreia_runtime::serialize::{from_bytes, load_from_file, save_to_file, to_bytes};
use kreia_runtime::{Parser, Tokenizer};

fn def(nodes: Vec<Node>) -> Definition {
    Definition::new(nodes).unwrap()
}

/// `list = Ident (Comma Ident)* Semi?`
fn list_grammar() -> Grammar {
    Grammar::builder()
        .with_token(TokenDef::new("Ident", "[a-z]+"))
        .with_token(TokenDef::new("Comma", ","))
        .with_token(TokenDef::new("Semi", ";"))
        .with_token(TokenDef::ignored("Space", r"\s+"))
        .with_rule(
            Rule::new(
                "list",
                def(vec![
                    Node::token("Ident"),
                    Node::paren(def(vec![Node::token("Comma"), Node::token("Ident")]), Modifier::MaybeMany),
                    Node::token("Semi").maybe(),
                ]),
                vec![],
            )
            .unwrap(),
        )
        .build()
        .unwrap()
}

#[test]
fn restored_table_drives_a_parse() {
    let grammar = list_grammar();
    let table = DecisionTable::build(&grammar, DecisionConfig::default()).unwrap();
    let path = std::env::temp_dir().join("kreia_persistence_list.msgpack");
    save_to_file(&table, &path).unwrap();
    let restored = load_from_file(&path).unwrap();
    let _ = std::fs::remove_file(&path);
    assert_eq!(restored, table);

    let Some(ChoiceDecision::Entry(more)) = restored.get("list", &[1]) else {
        panic!("expected an entry for the repetition");
    };
    let Some(ChoiceDecision::Entry(semi)) = restored.get("list", &[2]) else {
        panic!("expected an entry for the terminator");
    };

    let lexer = Tokenizer::new(&grammar).unwrap().lex("a, b, c;").unwrap();
    let mut p = Parser::new(lexer);
    let mut names = vec![p.consume(&["Ident"]).unwrap().remove(0).content];
    let rest = p
        .maybe_many(more, |p| {
            let mut tokens = p.consume(&["Comma", "Ident"])?;
            Ok(tokens.remove(1).content)
        })
        .unwrap();
    names.extend(rest);
    assert!(p.maybe(semi, |p| p.consume(&["Semi"])).unwrap().is_some());
    p.exit().unwrap();

    assert_eq!(names, ["a", "b", "c"]);
}

#[test]
fn bytes_are_stable_for_equal_tables() {
    let grammar = list_grammar();
    let first = DecisionTable::build(&grammar, DecisionConfig::default()).unwrap();
    let second = DecisionTable::build(&grammar, DecisionConfig::default()).unwrap();
    assert_eq!(to_bytes(&first).unwrap(), to_bytes(&second).unwrap());
}

#[test]
fn truncated_bytes_fail_to_load() {
    let table = DecisionTable::build(&list_grammar(), DecisionConfig::default()).unwrap();
    let bytes = to_bytes(&table).unwrap();
    let err = from_bytes(&bytes[..bytes.len() / 2]).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Serialization(_)));
    assert_eq!(err.category(), ErrorCategory::Other);
}

#[test]
fn saving_into_a_missing_directory_fails() {
    let table = DecisionTable::default();
    let path = std::env::temp_dir()
        .join("kreia_no_such_directory")
        .join("table.msgpack");
    let err = save_to_file(&table, &path).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Io(ref msg) if msg.contains("failed to create")));
}
