//! Lexer module for tokenizing Idyllium source code

mod token;
mod scanner;

use std::sync::Arc;

use crate::common::CompileResult;

pub use token::{LexErrorKind, Token, TokenKind};
pub use scanner::Lexer;

/// Scan a whole source text; the result always ends with an `Eof` token.
pub fn scan(source: &str, file: impl Into<Arc<str>>) -> CompileResult<Vec<Token>> {
    Lexer::new(source, file).tokenize_all()
}
