use text_size::TextSize;

use crate::cursor::{Cursor, is_newline, is_whitespace};
use crate::{SyntaxKind, Token, Tokenizer};

/// Lexer for markup: text runs, whitespace, newlines and tag punctuation.
pub struct HtmlTokenizer<'t> {
    cursor: Cursor<'t>,
    current: Token,
}

impl<'t> HtmlTokenizer<'t> {
    pub fn new(text: &'t str, offset: TextSize) -> Self {
        let mut tokenizer = Self { cursor: Cursor::new(text, offset), current: Token::eof(offset) };
        tokenizer.current = tokenizer.lex();
        tokenizer
    }

    fn lex(&mut self) -> Token {
        use SyntaxKind::*;

        self.cursor.reset_pos_within_token();
        if self.cursor.is_eof() {
            return Token::eof(self.cursor.offset());
        }

        let kind = match self.cursor.advance() {
            '<' => OPEN_ANGLE,
            '>' => CLOSE_ANGLE,
            '/' => FORWARD_SLASH,
            '!' => BANG,
            '?' => QUESTION_MARK,
            '=' => EQUALS,
            '"' => DOUBLE_QUOTE,
            '\'' => SINGLE_QUOTE,
            '[' => LEFT_BRACKET,
            ']' => RIGHT_BRACKET,
            '-' if self.cursor.matches('-') => {
                self.cursor.advance();
                DOUBLE_HYPHEN
            }
            '@' if self.cursor.matches('*') => RAZOR_COMMENT_TRANSITION,
            '@' => TRANSITION,
            '\r' => {
                self.cursor.eat('\n');
                NEW_LINE
            }
            c if is_newline(c) => NEW_LINE,
            c if is_whitespace(c) => {
                self.cursor.advance_while(is_whitespace);
                WHITESPACE
            }
            _ => {
                self.text();
                TEXT
            }
        };

        Token { kind, range: self.cursor.token_range(), unterminated: false }
    }

    fn text(&mut self) {
        while !self.cursor.is_eof() {
            match self.cursor.peek() {
                '<' | '>' | '/' | '!' | '?' | '=' | '"' | '\'' | '[' | ']' | '@' => return,
                '-' if self.cursor.second() == '-' => return,
                c if c.is_whitespace() => return,
                _ => {
                    self.cursor.advance();
                }
            }
        }
    }
}

impl Tokenizer for HtmlTokenizer<'_> {
    fn peek(&self) -> &Token {
        &self.current
    }

    fn advance(&mut self) -> Token {
        let next = self.lex();
        std::mem::replace(&mut self.current, next)
    }
}
