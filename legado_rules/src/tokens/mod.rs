//! Tokens of the book-source rule language
//!
//! A rule string lexes into an ordered list of text tokens. Each token is a
//! literal run, one of the markers in [`separators`], or a captured block
//! (`{{...}}`, `@get:{...}`) kept whole including its delimiters. Order is
//! significant: the classifier decides a token's role from its neighbours.

pub mod separators;
pub mod token_stream;

pub use separators::is_number_token;
pub use token_stream::TokenStream;
