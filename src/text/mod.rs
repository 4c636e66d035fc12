//! Text preparation: citation/digit cleanup, tokenization and stemming

mod normalize;
mod tokenize;

pub use normalize::normalize;
pub use tokenize::{Token, Tokenizer};
