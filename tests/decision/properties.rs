//! Property tests for lookahead computation over plain token sequences

use kreia_decision::{DecisionConfig, DecisionEngine, compute_decidable};
use kreia_grammar::{Definition, Grammar, GrammarBuilder, Node, ScopeStack, ScopedDefinition, TokenDef};
use proptest::prelude::*;

const ALPHABET: [&str; 3] = ["A", "B", "C"];

fn grammar() -> Grammar {
    ALPHABET
        .iter()
        .fold(GrammarBuilder::new(), |builder, name| {
            builder.with_token(TokenDef::new(*name, name.to_lowercase()))
        })
        .build()
        .unwrap()
}

fn sequence(indices: &[usize]) -> ScopedDefinition {
    let nodes = indices.iter().map(|i| Node::token(ALPHABET[*i])).collect();
    ScopedDefinition::new(Definition::new(nodes).unwrap(), ScopeStack::new())
}

fn names(indices: &[usize]) -> String {
    let names: Vec<&str> = indices.iter().map(|i| ALPHABET[*i]).collect();
    names.join(" ")
}

/// Index of the first main token that the competitor cannot match.
fn first_difference(main: &[usize], against: &[usize]) -> usize {
    main.iter()
        .zip(against)
        .take_while(|(m, a)| m == a)
        .count()
}

fn tokens() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(0..ALPHABET.len(), 1..6)
}

proptest! {
    #[test]
    fn path_stops_one_past_the_first_difference(main in tokens(), against in tokens()) {
        let g = grammar();
        let mut engine = DecisionEngine::new(&g, DecisionConfig::default());
        let outcome = engine.compute(&sequence(&main), &[sequence(&against)]).unwrap();

        let k = first_difference(&main, &against);
        if k < main.len() {
            prop_assert!(outcome.is_fully_decided());
            prop_assert_eq!(outcome.path.test_length(), k + 1);
            prop_assert_eq!(outcome.path.to_string(), names(&main[..=k]));
        } else {
            // main is a prefix of the competitor (or equal to it)
            prop_assert_eq!(outcome.leftover.len(), 1);
            prop_assert_eq!(outcome.path.to_string(), names(&main));
        }
    }

    #[test]
    fn path_covers_the_slowest_competitor(
        main in tokens(),
        first in tokens(),
        second in tokens(),
    ) {
        let k = first_difference(&main, &first).max(first_difference(&main, &second));
        prop_assume!(k < main.len());

        let g = grammar();
        let path = compute_decidable(
            &g,
            &sequence(&main),
            &[sequence(&first), sequence(&second)],
        )
        .unwrap();
        prop_assert_eq!(path.test_length(), k + 1);
    }

    #[test]
    fn computation_is_deterministic(main in tokens(), against in tokens()) {
        let g = grammar();
        let first = compute_decidable(&g, &sequence(&main), &[sequence(&against)]).unwrap();
        let second = compute_decidable(&g, &sequence(&main), &[sequence(&against)]).unwrap();
        prop_assert_eq!(first, second);
    }
}
