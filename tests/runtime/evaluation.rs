//! Integration tests for evaluating decisions against lexed input

use kreia_decision::{AstDecisionPath, ChoiceDecision, DecisionConfig, DecisionTable, PathBuilder};
use kreia_foundation::{ErrorKind, Result};
use kreia_grammar::{Definition, Grammar, Modifier, Node, Rule, TokenDef};
use kreia_runtime::{BufferedLexer, Decidable, Parser, Tokenizer};

fn def(nodes: Vec<Node>) -> Definition {
    Definition::new(nodes).unwrap()
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
    Grammar::builder()
        .with_token(TokenDef::new("Num", "[0-9]+"))
        .with_token(TokenDef::new("Plus", r"\+"))
        .with_token(TokenDef::new("LParen", r"\("))
        .with_token(TokenDef::new("RParen", r"\)"))
        .with_token(TokenDef::ignored("Space", r"\s+"))
        .with_rule(Rule::new("atom", Definition::single(atom), vec![]).unwrap())
        .with_rule(Rule::new("expr", def(vec![Node::subrule("atom"), tail]), vec![]).unwrap())
        .build()
        .unwrap()
}

// =============================================================================
// A table-driven evaluator
// =============================================================================

struct Calculator {
    table: DecisionTable,
}

impl Calculator {
    fn new(grammar: &Grammar) -> Self {
        Self {
            table: DecisionTable::build(grammar, DecisionConfig::default()).unwrap(),
        }
    }

    fn alternatives(&self, rule: &str, path: &[usize]) -> &[AstDecisionPath] {
        match self.table.get(rule, path) {
            Some(ChoiceDecision::Alternatives(paths)) => paths,
            other => panic!("expected alternatives at {rule}{path:?}, got {other:?}"),
        }
    }

    fn entry(&self, rule: &str, path: &[usize]) -> &AstDecisionPath {
        match self.table.get(rule, path) {
            Some(ChoiceDecision::Entry(decidable)) => decidable,
            other => panic!("expected an entry at {rule}{path:?}, got {other:?}"),
        }
    }

    fn expr(&self, p: &mut Parser<BufferedLexer>) -> Result<i64> {
        let first = self.atom(p)?;
        let rest = p.maybe_many(self.entry("expr", &[1]), |p| {
            p.consume(&["Plus"])?;
            self.atom(p)
        })?;
        Ok(first + rest.iter().sum::<i64>())
    }

    fn atom(&self, p: &mut Parser<BufferedLexer>) -> Result<i64> {
        match p.choose(self.alternatives("atom", &[0]))? {
            0 => {
                let tokens = p.consume(&["Num"])?;
                Ok(tokens[0].content.parse().unwrap())
            }
            _ => {
                p.consume(&["LParen"])?;
                let value = self.expr(p)?;
                p.consume(&["RParen"])?;
                Ok(value)
            }
        }
    }

    fn eval(&self, source: &str) -> Result<i64> {
        let grammar = arithmetic();
        let lexer = Tokenizer::new(&grammar)?.lex(source)?;
        let mut p = Parser::new(lexer);
        let value = self.expr(&mut p)?;
        p.exit()?;
        Ok(value)
    }
}

#[test]
fn evaluates_nested_sums() {
    let calc = Calculator::new(&arithmetic());
    assert_eq!(calc.eval("7").unwrap(), 7);
    assert_eq!(calc.eval("1 + (2 + 3) + 4").unwrap(), 10);
    assert_eq!(calc.eval("((1))+((2+3))").unwrap(), 6);
}

#[test]
fn bad_atom_lists_every_alternative() {
    let calc = Calculator::new(&arithmetic());
    let err = calc.eval("1 + )").unwrap_err();
    match err.kind {
        ErrorKind::RuntimeParse {
            expected,
            found,
            line,
            column,
        } => {
            assert_eq!(expected, ["Num", "LParen"]);
            assert_eq!(found.as_deref(), Some("RParen \")\""));
            assert_eq!((line, column), (1, 5));
        }
        other => panic!("expected RuntimeParse, got {other:?}"),
    }
}

#[test]
fn trailing_input_is_rejected() {
    let calc = Calculator::new(&arithmetic());
    let err = calc.eval("1 + 2 3").unwrap_err();
    assert!(err.to_string().contains("end of input"));
}

#[test]
fn unclosed_paren_fails_at_end_of_input() {
    let calc = Calculator::new(&arithmetic());
    let err = calc.eval("(1 + 2").unwrap_err();
    match err.kind {
        ErrorKind::RuntimeParse {
            expected, found, ..
        } => {
            assert_eq!(expected, ["RParen"]);
            assert!(found.is_none());
        }
        other => panic!("expected RuntimeParse, got {other:?}"),
    }
}

// =============================================================================
// Decidables on real input
// =============================================================================

fn lex(source: &str) -> BufferedLexer {
    Tokenizer::new(&arithmetic()).unwrap().lex(source).unwrap()
}

#[test]
fn branch_with_empty_arm_lets_the_rest_decide() {
    // Plus (LParen | Num)? Plus
    let mut builder = PathBuilder::new();
    builder.push("Plus".into());
    builder.push_branch(vec![
        AstDecisionPath::from_tokens(["LParen"]),
        AstDecisionPath::from_tokens(["Num"]),
        AstDecisionPath::default(),
    ]);
    builder.push("Plus".into());
    let path = builder.build();

    assert!(path.matches(&lex("+ 1 +")));
    assert!(path.matches(&lex("+ +")));
    assert!(!path.matches(&lex("+ ) +")));

    let expected = path.expected();
    assert_eq!(expected.len(), 1);
    assert_eq!(expected[0].as_ref(), "Plus");
}

#[test]
fn test_returns_the_tokens_looked_at() {
    let stream = lex("( 12 + 3 )");
    let path = AstDecisionPath::from_tokens(["LParen", "Num", "Plus"]);
    let (tokens, state) = path.test(&stream, 0).unwrap();
    let contents: Vec<&str> = tokens.iter().map(|t| t.content.as_str()).collect();
    assert_eq!(contents, ["(", "12", "+"]);
    assert_eq!(state, 3);
    assert_eq!(stream.position(), 0);
}

#[test]
fn many_requires_a_first_match() {
    let item = AstDecisionPath::from_tokens(["Num"]);
    let mut p = Parser::new(lex("1 2 3 +"));
    let items = p.many(&item, |p| p.consume(&["Num"])).unwrap();
    assert_eq!(items.len(), 3);

    let mut p = Parser::new(lex("+"));
    assert!(p.many(&item, |p| p.consume(&["Num"])).is_err());
    let none = p.maybe(&item, |p| p.consume(&["Num"])).unwrap();
    assert!(none.is_none());
}
