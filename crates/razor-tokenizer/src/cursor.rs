use std::str::Chars;

use text_size::{TextRange, TextSize};

pub(crate) const EOF_CHAR: char = '\0';

/// Character cursor over a whole document, starting at an arbitrary offset.
#[derive(Clone)]
pub(crate) struct Cursor<'t> {
    text: &'t str,
    chars: Chars<'t>,
    token_start: TextSize,
    previous: char,
}

impl<'t> Cursor<'t> {
    pub(crate) fn new(text: &'t str, offset: TextSize) -> Self {
        let start = usize::from(offset);
        let previous = text[..start].chars().next_back().unwrap_or(EOF_CHAR);
        Self { text, chars: text[start..].chars(), token_start: offset, previous }
    }

    pub(crate) fn offset(&self) -> TextSize {
        TextSize::new((self.text.len() - self.chars.as_str().len()) as u32)
    }

    pub(crate) fn is_eof(&self) -> bool {
        self.chars.as_str().is_empty()
    }

    /// The character consumed last, or the one just before the start offset.
    pub(crate) fn previous(&self) -> char {
        self.previous
    }

    pub(crate) fn pos_within_token(&self) -> TextSize {
        self.offset() - self.token_start
    }

    pub(crate) fn reset_pos_within_token(&mut self) {
        self.token_start = self.offset();
    }

    pub(crate) fn token_range(&self) -> TextRange {
        TextRange::new(self.token_start, self.offset())
    }

    pub(crate) fn token_text(&self) -> &'t str {
        &self.text[self.token_range()]
    }

    /// Source text before the current token, used for line-start checks.
    pub(crate) fn text_before_token(&self) -> &'t str {
        &self.text[..usize::from(self.token_start)]
    }

    pub(crate) fn rest(&self) -> &'t str {
        self.chars.as_str()
    }

    pub(crate) fn peek(&self) -> char {
        self.chars.clone().next().unwrap_or(EOF_CHAR)
    }

    pub(crate) fn second(&self) -> char {
        let mut chars = self.chars.clone();
        chars.next();
        chars.next().unwrap_or(EOF_CHAR)
    }

    pub(crate) fn third(&self) -> char {
        let mut chars = self.chars.clone();
        chars.next();
        chars.next();
        chars.next().unwrap_or(EOF_CHAR)
    }

    pub(crate) fn matches(&self, c: char) -> bool {
        self.peek() == c
    }

    pub(crate) fn starts_with(&self, prefix: &str) -> bool {
        self.rest().starts_with(prefix)
    }

    pub(crate) fn advance(&mut self) -> char {
        self.previous = self.chars.next().unwrap_or(EOF_CHAR);
        self.previous
    }

    pub(crate) fn advance_by(&mut self, n: usize) {
        for _ in 0..n {
            self.advance();
        }
    }

    pub(crate) fn eat(&mut self, c: char) -> bool {
        let matched = self.matches(c) && !self.is_eof();
        if matched {
            self.advance();
        }
        matched
    }

    pub(crate) fn advance_while(&mut self, f: impl Fn(char) -> bool + Copy) {
        while !self.is_eof() && f(self.peek()) {
            self.advance();
        }
    }

    pub(crate) fn checkpoint(&self) -> Checkpoint<'t> {
        Checkpoint { chars: self.chars.clone(), previous: self.previous }
    }

    pub(crate) fn restore(&mut self, checkpoint: Checkpoint<'t>) {
        self.chars = checkpoint.chars;
        self.previous = checkpoint.previous;
    }
}

pub(crate) struct Checkpoint<'t> {
    chars: Chars<'t>,
    previous: char,
}

pub(crate) fn is_newline(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{0085}' | '\u{2028}' | '\u{2029}')
}

pub(crate) fn is_whitespace(c: char) -> bool {
    c.is_whitespace() && !is_newline(c)
}

impl Cursor<'_> {
    /// Consumes one line terminator, treating `\r\n` as a single one.
    pub(crate) fn eat_newline(&mut self) -> bool {
        match self.peek() {
            '\r' => {
                self.advance();
                self.eat('\n');
                true
            }
            c if is_newline(c) && !self.is_eof() => {
                self.advance();
                true
            }
            _ => false,
        }
    }
}
