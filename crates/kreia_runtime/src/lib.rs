//! Runtime support for parsers generated with kreia.
//!
//! This crate provides:
//! - [`TokenStream`] - the lexer contract, with [`BufferedLexer`] over
//!   lexed [`Token`]s and a regex [`Tokenizer`] built from a grammar
//! - [`Decidable`] - runtime evaluation of decision paths
//! - [`Parser`] - non-backtracking parse combinators and [`Locker`]s
//! - [`serialize`] - decision table persistence

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod decidable;
pub mod lexer;
pub mod parser;
pub mod serialize;
pub mod span;
pub mod token;
pub mod tokenize;

pub use decidable::Decidable;
pub use lexer::{BufferedLexer, TokenStream};
pub use parser::{Locker, Parser};
pub use span::Span;
pub use token::Token;
pub use tokenize::Tokenizer;
