use text_size::TextSize;

use crate::cursor::Cursor;
use crate::{SyntaxKind, Token, Tokenizer};

#[derive(Clone, Copy, PartialEq, Eq)]
enum State {
    OpenStar,
    Body,
    CloseStar,
    CloseTransition,
    Done,
}

/// Lexer for the inside of a `@* ... *@` comment, started just after the opening `@`.
///
/// Produces the opening star, one literal for the body (possibly empty) and,
/// when present, the closing star and transition. An unterminated body runs to
/// the end of input and is flagged.
pub struct RazorCommentTokenizer<'t> {
    cursor: Cursor<'t>,
    state: State,
    current: Token,
}

impl<'t> RazorCommentTokenizer<'t> {
    pub fn new(text: &'t str, offset: TextSize) -> Self {
        let mut tokenizer =
            Self { cursor: Cursor::new(text, offset), state: State::OpenStar, current: Token::eof(offset) };
        tokenizer.current = tokenizer.lex();
        tokenizer
    }

    fn lex(&mut self) -> Token {
        use SyntaxKind::*;

        self.cursor.reset_pos_within_token();
        let mut unterminated = false;
        let kind = match self.state {
            State::OpenStar if self.cursor.eat('*') => {
                self.state = State::Body;
                RAZOR_COMMENT_STAR
            }
            State::OpenStar | State::Body => {
                while !self.cursor.is_eof() && !self.cursor.starts_with("*@") {
                    self.cursor.advance();
                }
                unterminated = self.cursor.is_eof();
                self.state = if unterminated { State::Done } else { State::CloseStar };
                RAZOR_COMMENT_LITERAL
            }
            State::CloseStar => {
                self.cursor.advance();
                self.state = State::CloseTransition;
                RAZOR_COMMENT_STAR
            }
            State::CloseTransition => {
                self.cursor.advance();
                self.state = State::Done;
                RAZOR_COMMENT_TRANSITION
            }
            State::Done => return Token::eof(self.cursor.offset()),
        };
        Token { kind, range: self.cursor.token_range(), unterminated }
    }
}

impl Tokenizer for RazorCommentTokenizer<'_> {
    fn peek(&self) -> &Token {
        &self.current
    }

    fn advance(&mut self) -> Token {
        let next = self.lex();
        std::mem::replace(&mut self.current, next)
    }
}
