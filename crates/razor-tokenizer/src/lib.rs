//! Pull-based lexers for the three sub-grammars of a Razor document.
//!
//! Every tokenizer can start at any offset of the document, which lets the
//! parser switch grammars at a transition without re-lexing what came before.
//! Unterminated literals and comments are not errors here: the token simply
//! runs to the end of input (or line) and carries [`Token::unterminated`].

mod comment;
mod csharp;
mod cursor;
mod html;
mod keywords;
mod version;

pub use comment::RazorCommentTokenizer;
pub use csharp::CSharpTokenizer;
pub use html::HtmlTokenizer;
pub use keywords::{is_keyword, is_preprocessor_directive};
pub use razor_syntax::SyntaxKind;
use text_size::{TextRange, TextSize};
pub use version::{CSharpLanguageVersion, ParseLanguageVersionError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: SyntaxKind,
    pub range: TextRange,
    pub unterminated: bool,
}

impl Token {
    pub(crate) fn eof(offset: TextSize) -> Self {
        Self { kind: SyntaxKind::EOF, range: TextRange::empty(offset), unterminated: false }
    }

    pub fn text<'t>(&self, source: &'t str) -> &'t str {
        &source[self.range]
    }
}

/// A lexer with one token of lookahead.
pub trait Tokenizer {
    /// The token [`Tokenizer::advance`] would return next.
    fn peek(&self) -> &Token;

    /// Returns the current token and lexes the following one.
    fn advance(&mut self) -> Token;
}

#[cfg(test)]
mod tests;
