use text_size::TextSize;

use crate::cursor::{Cursor, EOF_CHAR, is_newline, is_whitespace};
use crate::{CSharpLanguageVersion, SyntaxKind, Token, Tokenizer, is_keyword, is_preprocessor_directive};

/// Lexer for embedded C#.
///
/// It balances nothing and understands no grammar; it only cuts the text into
/// identifiers, keywords, literals, comments, punctuation and operators.
pub struct CSharpTokenizer<'t> {
    cursor: Cursor<'t>,
    version: CSharpLanguageVersion,
    current: Token,
}

impl<'t> CSharpTokenizer<'t> {
    pub fn new(text: &'t str, offset: TextSize, version: CSharpLanguageVersion) -> Self {
        let mut tokenizer =
            Self { cursor: Cursor::new(text, offset), version, current: Token::eof(offset) };
        tokenizer.current = tokenizer.lex();
        tokenizer
    }

    fn lex(&mut self) -> Token {
        use SyntaxKind::*;

        self.cursor.reset_pos_within_token();
        if self.cursor.is_eof() {
            return Token::eof(self.cursor.offset());
        }

        let mut terminated = true;
        let kind = match self.cursor.advance() {
            '\r' => {
                self.cursor.eat('\n');
                NEW_LINE
            }
            c if is_newline(c) => NEW_LINE,
            c if is_whitespace(c) => {
                self.cursor.advance_while(is_whitespace);
                WHITESPACE
            }
            '/' if self.cursor.matches('/') => self.line_comment(),
            '/' if self.cursor.matches('*') => {
                self.cursor.advance();
                terminated = self.block_comment();
                CSHARP_BLOCK_COMMENT
            }
            '@' if self.cursor.matches('*') => RAZOR_COMMENT_TRANSITION,
            '@' if self.cursor.matches('"') => {
                self.cursor.advance();
                terminated = self.verbatim_string();
                VERBATIM_STRING_LITERAL
            }
            '@' if self.cursor.matches('$') && self.cursor.second() == '"' => {
                self.cursor.advance_by(2);
                terminated = self.interpolated_string(true);
                INTERPOLATED_STRING_LITERAL
            }
            '@' => TRANSITION,
            '$' => match self.dollar_string() {
                Some(closed) => {
                    terminated = closed;
                    INTERPOLATED_STRING_LITERAL
                }
                None => UNKNOWN,
            },
            '"' if self.version.supports_raw_strings() && self.cursor.starts_with("\"\"") => {
                terminated = self.raw_string(1);
                self.utf8_suffix();
                RAW_STRING_LITERAL
            }
            '"' => {
                terminated = self.quoted('"');
                self.utf8_suffix();
                STRING_LITERAL
            }
            '\'' => {
                terminated = self.quoted('\'');
                CHARACTER_LITERAL
            }
            '#' if self.at_preprocessor_directive() => {
                self.cursor.advance_while(|c| !is_newline(c));
                CSHARP_PREPROCESSOR_DIRECTIVE
            }
            '.' if self.cursor.peek().is_ascii_digit() => {
                self.digits(false);
                self.real_tail();
                REAL_LITERAL
            }
            c if c.is_ascii_digit() => self.number(c),
            c if is_identifier_start(c) => {
                self.cursor.advance_while(is_identifier_part);
                if is_keyword(self.cursor.token_text()) { KEYWORD } else { IDENTIFIER }
            }
            '{' => LEFT_BRACE,
            '}' => RIGHT_BRACE,
            '(' => LEFT_PAREN,
            ')' => RIGHT_PAREN,
            '[' => LEFT_BRACKET,
            ']' => RIGHT_BRACKET,
            ';' => SEMICOLON,
            ',' => COMMA,
            ':' if self.cursor.eat(':') => CSHARP_OPERATOR,
            ':' => COLON,
            '.' if self.cursor.eat('.') => {
                self.cursor.eat('.');
                CSHARP_OPERATOR
            }
            '.' => DOT,
            '?' if self.cursor.eat('?') => {
                self.cursor.eat('=');
                CSHARP_OPERATOR
            }
            '?' => QUESTION_MARK,
            '!' if self.cursor.eat('=') => CSHARP_OPERATOR,
            '!' => BANG,
            '=' if self.cursor.eat('=') || self.cursor.eat('>') => CSHARP_OPERATOR,
            '=' => EQUALS,
            '<' if self.cursor.eat('=') => CSHARP_OPERATOR,
            '<' => LESS_THAN,
            '>' if self.cursor.eat('=') => CSHARP_OPERATOR,
            '>' => GREATER_THAN,
            '+' => {
                let _ = self.cursor.eat('+') || self.cursor.eat('=');
                CSHARP_OPERATOR
            }
            '-' => {
                let _ = self.cursor.eat('-') || self.cursor.eat('=') || self.cursor.eat('>');
                CSHARP_OPERATOR
            }
            '&' => {
                let _ = self.cursor.eat('&') || self.cursor.eat('=');
                CSHARP_OPERATOR
            }
            '|' => {
                let _ = self.cursor.eat('|') || self.cursor.eat('=');
                CSHARP_OPERATOR
            }
            '*' | '/' | '%' | '^' => {
                self.cursor.eat('=');
                CSHARP_OPERATOR
            }
            '~' => CSHARP_OPERATOR,
            _ => UNKNOWN,
        };

        Token { kind, range: self.cursor.token_range(), unterminated: !terminated }
    }

    /// `//` comments stop before the newline; `///` documentation comments own it.
    fn line_comment(&mut self) -> SyntaxKind {
        self.cursor.advance();
        let doc = self.cursor.matches('/') && self.cursor.second() != '/';
        self.cursor.advance_while(|c| !is_newline(c));
        if doc {
            self.cursor.eat_newline();
            SyntaxKind::CSHARP_DOC_COMMENT
        } else {
            SyntaxKind::CSHARP_COMMENT
        }
    }

    /// Scans past `/*` up to the `*/` that closes the outermost level.
    fn block_comment(&mut self) -> bool {
        let mut depth = 1u32;
        while !self.cursor.is_eof() {
            if self.cursor.starts_with("*/") {
                self.cursor.advance_by(2);
                depth -= 1;
                if depth == 0 {
                    return true;
                }
            } else if self.cursor.starts_with("/*") {
                self.cursor.advance_by(2);
                depth += 1;
            } else {
                self.cursor.advance();
            }
        }
        false
    }

    /// Body of a `"..."` or `'...'` literal; an unterminated one stops before the newline.
    fn quoted(&mut self, quote: char) -> bool {
        loop {
            let c = self.cursor.peek();
            if self.cursor.is_eof() || is_newline(c) {
                return false;
            }
            self.cursor.advance();
            if c == quote {
                return true;
            }
            if c == '\\' && !self.cursor.is_eof() && !is_newline(self.cursor.peek()) {
                self.cursor.advance();
            }
        }
    }

    fn verbatim_string(&mut self) -> bool {
        while !self.cursor.is_eof() {
            if self.cursor.advance() == '"' && !self.cursor.eat('"') {
                return true;
            }
        }
        false
    }

    /// Raw string whose opening quote run started `consumed` quotes ago.
    fn raw_string(&mut self, consumed: usize) -> bool {
        let mut quotes = consumed;
        while self.cursor.eat('"') {
            quotes += 1;
        }
        while !self.cursor.is_eof() {
            if self.cursor.advance() != '"' {
                continue;
            }
            let mut run = 1;
            while run < quotes && self.cursor.eat('"') {
                run += 1;
            }
            if run == quotes {
                return true;
            }
        }
        false
    }

    /// `$"..."`, `$@"..."` and `$"""..."""`. Returns `None` for a lone `$`.
    fn dollar_string(&mut self) -> Option<bool> {
        let checkpoint = self.cursor.checkpoint();
        while self.cursor.eat('$') {}
        let verbatim = self.cursor.eat('@');
        if !self.cursor.eat('"') {
            self.cursor.restore(checkpoint);
            return None;
        }
        if !verbatim && self.version.supports_raw_strings() && self.cursor.starts_with("\"\"") {
            return Some(self.raw_string(1));
        }
        Some(self.interpolated_string(verbatim))
    }

    /// Body of an interpolated string, skipping over nested literals inside holes.
    fn interpolated_string(&mut self, verbatim: bool) -> bool {
        let mut depth = 0u32;
        loop {
            let c = self.cursor.peek();
            if self.cursor.is_eof() {
                return false;
            }
            if depth == 0 {
                if !verbatim && is_newline(c) {
                    return false;
                }
                self.cursor.advance();
                match c {
                    '\\' if !verbatim => {
                        if !self.cursor.is_eof() && !is_newline(self.cursor.peek()) {
                            self.cursor.advance();
                        }
                    }
                    '"' if verbatim && self.cursor.eat('"') => {}
                    '"' => return true,
                    '{' if self.cursor.eat('{') => {}
                    '{' => depth = 1,
                    '}' => {
                        self.cursor.eat('}');
                    }
                    _ => {}
                }
            } else {
                self.cursor.advance();
                match c {
                    '{' => depth += 1,
                    '}' => depth -= 1,
                    '"' => {
                        self.quoted('"');
                    }
                    '\'' => {
                        self.quoted('\'');
                    }
                    '@' if self.cursor.eat('"') => {
                        self.verbatim_string();
                    }
                    _ => {}
                }
            }
        }
    }

    fn utf8_suffix(&mut self) {
        if self.version.supports_utf8_strings()
            && (self.cursor.starts_with("u8") || self.cursor.starts_with("U8"))
            && !is_identifier_part(self.cursor.third())
        {
            self.cursor.advance_by(2);
        }
    }

    fn at_preprocessor_directive(&self) -> bool {
        let line = self.cursor.text_before_token().rsplit(is_newline).next().unwrap_or("");
        if !line.chars().all(is_whitespace) {
            return false;
        }
        let rest = self.cursor.rest().trim_start_matches(is_whitespace);
        let name_len = rest.find(|c: char| !c.is_ascii_alphabetic()).unwrap_or(rest.len());
        is_preprocessor_directive(&rest[..name_len])
    }

    fn number(&mut self, first: char) -> SyntaxKind {
        if first == '0' && matches!(self.cursor.peek(), 'x' | 'X' | 'b' | 'B') {
            let hex = matches!(self.cursor.advance(), 'x' | 'X');
            self.digits(hex);
            self.integer_suffix();
            return SyntaxKind::INTEGER_LITERAL;
        }

        self.digits(false);
        let mut real = false;
        if self.cursor.matches('.') && self.cursor.second().is_ascii_digit() {
            self.cursor.advance();
            self.digits(false);
            real = true;
        }
        real |= self.exponent();
        if self.real_suffix() || real {
            SyntaxKind::REAL_LITERAL
        } else {
            self.integer_suffix();
            SyntaxKind::INTEGER_LITERAL
        }
    }

    /// Exponent and suffix of a real literal that started with `.`.
    fn real_tail(&mut self) {
        self.exponent();
        self.real_suffix();
    }

    fn digits(&mut self, hex: bool) {
        self.cursor.advance_while(|c| c == '_' || if hex { c.is_ascii_hexdigit() } else { c.is_ascii_digit() });
    }

    fn exponent(&mut self) -> bool {
        if !matches!(self.cursor.peek(), 'e' | 'E') {
            return false;
        }
        let checkpoint = self.cursor.checkpoint();
        self.cursor.advance();
        if !self.cursor.eat('+') {
            self.cursor.eat('-');
        }
        if self.cursor.peek().is_ascii_digit() {
            self.digits(false);
            true
        } else {
            self.cursor.restore(checkpoint);
            false
        }
    }

    fn real_suffix(&mut self) -> bool {
        if !matches!(self.cursor.peek(), 'f' | 'F' | 'd' | 'D' | 'm' | 'M')
            || is_identifier_part(self.cursor.second())
        {
            return false;
        }
        self.cursor.advance();
        true
    }

    /// `U`, `L`, `UL` or `LU` in any case, only when no identifier character follows.
    fn integer_suffix(&mut self) {
        let checkpoint = self.cursor.checkpoint();
        match self.cursor.peek() {
            'u' | 'U' => {
                self.cursor.advance();
                if matches!(self.cursor.peek(), 'l' | 'L') {
                    self.cursor.advance();
                }
            }
            'l' | 'L' => {
                self.cursor.advance();
                if matches!(self.cursor.peek(), 'u' | 'U') {
                    self.cursor.advance();
                }
            }
            _ => return,
        }
        if is_identifier_part(self.cursor.peek()) {
            self.cursor.restore(checkpoint);
        }
    }
}

fn is_identifier_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_identifier_part(c: char) -> bool {
    c != EOF_CHAR && (c == '_' || c.is_alphanumeric())
}

impl Tokenizer for CSharpTokenizer<'_> {
    fn peek(&self) -> &Token {
        &self.current
    }

    fn advance(&mut self) -> Token {
        let next = self.lex();
        std::mem::replace(&mut self.current, next)
    }
}
