use razor_errors::catalog;
use razor_syntax::{Annotation, SyntaxKind, SyntaxKind::*, SyntaxSet};
use razor_tokenizer::Token;
use text_size::{TextRange, TextSize};

use super::{directive, markup, preprocessor, razor_comment};
use crate::annotations::{self, UsingDirective};
use crate::parser::{CompletedMarker, Mode, Parser};

const TRIVIA: SyntaxSet = SyntaxSet::new([
    WHITESPACE,
    NEW_LINE,
    CSHARP_COMMENT,
    CSHARP_DOC_COMMENT,
    CSHARP_BLOCK_COMMENT,
    CSHARP_DISABLED_TEXT,
]);

/// Keywords that start a statement with its own block after a transition.
const BLOCK_KEYWORDS: &[&str] = &["do", "for", "foreach", "if", "lock", "switch", "try", "using", "while"];

fn is_block_keyword(word: &str) -> bool {
    BLOCK_KEYWORDS.contains(&word)
}

/// The `@` that switches from markup to code.
pub(crate) fn transition(p: &mut Parser<'_>) -> CompletedMarker {
    let m = p.start();
    p.bump();
    let transition = m.complete(p, CSHARP_TRANSITION);
    p.switch(Mode::Code);
    transition
}

/// Code entered from markup through `@`. Returns with the mode it started in.
pub(crate) fn embedded(p: &mut Parser<'_>) {
    let mode = p.mode();
    let block = p.start();
    let at = p.pos();
    let t = transition(p);

    match p.kind() {
        LEFT_BRACE => statement_block(p, t),
        LEFT_PAREN => explicit_expression(p, t),
        IDENTIFIER | KEYWORD => word(p, t, at),
        WHITESPACE | NEW_LINE => {
            let range = first_char(p);
            p.error(catalog::unexpected_whitespace_at_code_start(range));
            missing_expression(p, t);
        }
        EOF => {
            p.error(catalog::unexpected_eof_at_code_start(TextRange::empty(p.pos())));
            missing_expression(p, t);
        }
        _ => {
            let range = first_char(p);
            let found = p.text_of(range);
            p.error(catalog::unexpected_character_at_code_start(range, found));
            missing_expression(p, t);
        }
    }

    block.complete(p, CSHARP_CODE_BLOCK);
    p.switch(mode);
}

fn first_char(p: &mut Parser<'_>) -> TextRange {
    let len = p.rest().chars().next().map_or(TextSize::new(0), TextSize::of);
    TextRange::at(p.pos(), len)
}

/// The identifier or keyword right after a transition.
fn word(p: &mut Parser<'_>, t: CompletedMarker, at: TextSize) {
    let text = p.current_text();
    let options = p.options();

    if let Some(descriptor) = options.directive(text) {
        directive::directive(p, t, at, descriptor);
        return;
    }

    match text {
        "using" if p.nth(1) != LEFT_PAREN && !(p.nth(1) == WHITESPACE && p.nth(2) == LEFT_PAREN) => {
            using_directive(p);
        }
        _ if is_block_keyword(text) => keyword_block(p),
        "class" | "namespace" => {
            let range = p.current_range();
            p.error(catalog::reserved_word(range, text));
            p.bump_literal(CSHARP_STATEMENT_LITERAL);
        }
        "await"
            if p.nth(1) == WHITESPACE
                && p.nth_text(2) == "foreach"
                && options.language_version().supports_await_foreach() =>
        {
            keyword_block(p);
        }
        _ => implicit_expression(p, t),
    }
}

/// `@using Some.Namespace`; the imported namespace is recorded on the literal.
fn using_directive(p: &mut Parser<'_>) {
    let m = p.start();
    p.bump();
    while p.at(WHITESPACE) {
        p.bump();
    }
    let start = p.pos();
    while !matches!(p.kind(), NEW_LINE | SEMICOLON | EOF) {
        p.bump();
    }
    let namespace = p.text_of(TextRange::new(start, p.pos())).trim_end();
    if p.at(SEMICOLON) {
        p.bump();
    }
    p.annotate(Annotation::new(annotations::USING, UsingDirective { namespace: namespace.into() }));
    m.complete(p, CSHARP_STATEMENT_LITERAL);
}

fn missing_expression(p: &mut Parser<'_>, t: CompletedMarker) {
    let m = t.precede(p);
    let body = p.start();
    let block = p.start();
    let literal = p.start();
    p.missing(IDENTIFIER);
    literal.complete(p, CSHARP_EXPRESSION_LITERAL);
    block.complete(p, CSHARP_CODE_BLOCK);
    body.complete(p, CSHARP_IMPLICIT_EXPRESSION_BODY);
    m.complete(p, CSHARP_IMPLICIT_EXPRESSION);
}

/// `@name.member(args)[index]?.more!`; stops at the first token that cannot
/// continue the expression, such as a trailing `.` followed by a space.
fn implicit_expression(p: &mut Parser<'_>, t: CompletedMarker) {
    let m = t.precede(p);
    let body = p.start();
    let block = p.start();

    if p.current_text() == "await" && p.nth(1) == WHITESPACE && matches!(p.nth(2), IDENTIFIER | KEYWORD) {
        p.bump_literal(CSHARP_EXPRESSION_LITERAL);
        p.bump_literal(CSHARP_EXPRESSION_LITERAL);
    }
    p.bump_literal(CSHARP_EXPRESSION_LITERAL);

    loop {
        match (p.kind(), p.nth(1)) {
            (DOT, IDENTIFIER | KEYWORD) => {
                p.bump_literal(CSHARP_EXPRESSION_LITERAL);
                p.bump_literal(CSHARP_EXPRESSION_LITERAL);
            }
            (QUESTION_MARK, DOT) if matches!(p.nth(2), IDENTIFIER | KEYWORD) => {
                for _ in 0..3 {
                    p.bump_literal(CSHARP_EXPRESSION_LITERAL);
                }
            }
            (QUESTION_MARK, LEFT_BRACKET) => {
                p.bump_literal(CSHARP_EXPRESSION_LITERAL);
                balanced(p, CSHARP_EXPRESSION_LITERAL);
            }
            (BANG, DOT | LEFT_BRACKET) => p.bump_literal(CSHARP_EXPRESSION_LITERAL),
            (LEFT_PAREN | LEFT_BRACKET, _) => balanced(p, CSHARP_EXPRESSION_LITERAL),
            _ => break,
        }
    }

    block.complete(p, CSHARP_CODE_BLOCK);
    body.complete(p, CSHARP_IMPLICIT_EXPRESSION_BODY);
    m.complete(p, CSHARP_IMPLICIT_EXPRESSION);
}

/// `@( ... )`.
fn explicit_expression(p: &mut Parser<'_>, t: CompletedMarker) {
    let m = t.precede(p);
    let body = p.start();
    let open = p.current_range();
    meta(p);

    let block = p.start();
    let mut depth = 0u32;
    loop {
        match p.kind() {
            EOF => break,
            RIGHT_PAREN if depth == 0 => break,
            LEFT_PAREN => depth += 1,
            RIGHT_PAREN => depth -= 1,
            _ => {}
        }
        expression_token(p, CSHARP_EXPRESSION_LITERAL);
    }
    block.complete(p, CSHARP_CODE_BLOCK);

    if p.at(RIGHT_PAREN) {
        meta(p);
    } else {
        missing_meta(p, RIGHT_PAREN);
        p.error(catalog::expected_block_end(open, "explicit expression", ")", "("));
    }
    body.complete(p, CSHARP_EXPLICIT_EXPRESSION_BODY);
    m.complete(p, CSHARP_EXPLICIT_EXPRESSION);
}

/// `@{ ... }`.
fn statement_block(p: &mut Parser<'_>, t: CompletedMarker) {
    let m = t.precede(p);
    let body = p.start();
    let open = p.current_range();
    meta(p);

    let block = p.start();
    statements(p);
    block.complete(p, CSHARP_CODE_BLOCK);

    close_brace(p, open, "code");
    body.complete(p, CSHARP_STATEMENT_BODY);
    m.complete(p, CSHARP_STATEMENT);
}

/// The `}` matching the `{` at `open`, or a missing one.
pub(crate) fn close_brace(p: &mut Parser<'_>, open: TextRange, block: &str) {
    if p.at(RIGHT_BRACE) {
        meta(p);
    } else {
        missing_meta(p, RIGHT_BRACE);
        p.error(catalog::expected_block_end(open, block, "}", "{"));
    }
}

pub(crate) fn meta(p: &mut Parser<'_>) {
    let m = p.start();
    p.bump();
    m.complete(p, RAZOR_META_CODE);
}

fn missing_meta(p: &mut Parser<'_>, kind: SyntaxKind) {
    let m = p.start();
    p.missing(kind);
    m.complete(p, RAZOR_META_CODE);
}

/// Consumes the current token into a code literal, reporting literals and
/// comments that run off the end of their line or of the input.
fn bump_code(p: &mut Parser<'_>, literal: SyntaxKind) {
    let Token { kind, range, unterminated } = p.current();
    p.bump_literal(literal);
    if !unterminated {
        return;
    }
    match kind {
        STRING_LITERAL
        | CHARACTER_LITERAL
        | VERBATIM_STRING_LITERAL
        | INTERPOLATED_STRING_LITERAL
        | RAW_STRING_LITERAL => {
            p.error(catalog::unterminated_string_literal(TextRange::at(range.start(), TextSize::new(1))));
        }
        CSHARP_BLOCK_COMMENT => {
            p.error(catalog::unterminated_block_comment(TextRange::at(range.start(), TextSize::of("/*"))));
        }
        _ => {}
    }
}

/// One token of an expression, where templates and razor comments may appear.
fn expression_token(p: &mut Parser<'_>, literal: SyntaxKind) {
    match (p.kind(), p.nth(1)) {
        (RAZOR_COMMENT_TRANSITION, _) => razor_comment(p),
        (TRANSITION, LESS_THAN) => template(p),
        _ => bump_code(p, literal),
    }
}

/// A bracketed run starting at the `(` or `[` under the cursor, up to its
/// matching closer.
fn balanced(p: &mut Parser<'_>, literal: SyntaxKind) {
    let (open, close, open_char, close_char) = match p.kind() {
        LEFT_BRACKET => (LEFT_BRACKET, RIGHT_BRACKET, '[', ']'),
        _ => (LEFT_PAREN, RIGHT_PAREN, '(', ')'),
    };
    let open_range = p.current_range();
    p.bump_literal(literal);

    let mut depth = 1u32;
    loop {
        let kind = p.kind();
        if kind == EOF {
            p.error(catalog::expected_close_bracket(open_range, open_char, close_char));
            return;
        }
        if kind == open {
            depth += 1;
        } else if kind == close {
            depth -= 1;
            if depth == 0 {
                p.bump_literal(literal);
                return;
            }
        }
        expression_token(p, literal);
    }
}

/// `@<p>...</p>` inside code: markup passed around as a value.
fn template(p: &mut Parser<'_>) {
    p.nested(CSHARP_STATEMENT_LITERAL, |p| {
        let m = p.start();
        let block = p.start();
        let transition = p.start();
        p.bump();
        transition.complete(p, MARKUP_TRANSITION);
        p.switch(Mode::Markup);
        markup::element_in_code(p);
        block.complete(p, MARKUP_BLOCK);
        m.complete(p, CSHARP_TEMPLATE_BLOCK);
        p.switch(Mode::Code);
    });
}

struct CodeState {
    braces: u32,
    statement_start: bool,
    /// Open `#if` regions, `true` once a region has passed its `#else`.
    conditionals: Vec<bool>,
}

/// Statements up to the `}` that closes the enclosing block, or the end of input.
pub(crate) fn statements(p: &mut Parser<'_>) {
    let mut state = CodeState { braces: 0, statement_start: true, conditionals: Vec::new() };
    loop {
        match p.kind() {
            EOF => return,
            RIGHT_BRACE if state.braces == 0 => return,
            LEFT_BRACE => {
                state.braces += 1;
                state.statement_start = true;
                p.bump_literal(CSHARP_STATEMENT_LITERAL);
            }
            RIGHT_BRACE => {
                state.braces -= 1;
                state.statement_start = true;
                p.bump_literal(CSHARP_STATEMENT_LITERAL);
            }
            SEMICOLON | RIGHT_PAREN => {
                state.statement_start = true;
                p.bump_literal(CSHARP_STATEMENT_LITERAL);
            }
            WHITESPACE | NEW_LINE | CSHARP_COMMENT | CSHARP_DOC_COMMENT | CSHARP_DISABLED_TEXT => {
                p.bump_literal(CSHARP_STATEMENT_LITERAL);
            }
            RAZOR_COMMENT_TRANSITION => razor_comment(p),
            TRANSITION => {
                transition_in_code(p);
                state.statement_start = true;
            }
            LESS_THAN if state.statement_start && looks_like_tag(p) => {
                markup_in_code(p);
                state.statement_start = true;
            }
            CSHARP_PREPROCESSOR_DIRECTIVE => {
                preprocessor_directive(p, &mut state);
                state.statement_start = true;
            }
            _ => {
                state.statement_start = false;
                bump_code(p, CSHARP_STATEMENT_LITERAL);
            }
        }
    }
}

fn looks_like_tag(p: &mut Parser<'_>) -> bool {
    match p.nth(1) {
        IDENTIFIER | KEYWORD | BANG => true,
        CSHARP_OPERATOR => p.nth_text(1) == "/" && matches!(p.nth(2), IDENTIFIER | KEYWORD),
        _ => false,
    }
}

/// Directives of taken branches. Regions nest within one code block and
/// every untaken branch reaches the grammar as disabled text.
fn preprocessor_directive(p: &mut Parser<'_>, state: &mut CodeState) {
    let text = p.current_text();
    let range = p.current_range();
    let name = preprocessor::directive_name(text);
    let misplaced = match name {
        "if" => {
            p.enter_conditional();
            state.conditionals.push(false);
            false
        }
        "elif" => state.conditionals.last() != Some(&false),
        "else" => match state.conditionals.last_mut() {
            Some(seen_else) if !*seen_else => {
                *seen_else = true;
                false
            }
            _ => true,
        },
        "endif" => state.conditionals.pop().is_none(),
        "define" => {
            if let Some(symbol) = preprocessor::defined_symbol(text) {
                p.define(symbol);
            }
            false
        }
        "undef" => {
            if let Some(symbol) = preprocessor::defined_symbol(text) {
                p.undefine(symbol);
            }
            false
        }
        _ => false,
    };
    if misplaced {
        p.error(catalog::unexpected_preprocessor_directive(range, name));
    }
    p.bump_literal(CSHARP_STATEMENT_LITERAL);
}

/// An element where a statement was expected, plus the rest of its line.
fn markup_in_code(p: &mut Parser<'_>) {
    let m = p.start();
    p.switch(Mode::Markup);
    p.nested(MARKUP_TEXT_LITERAL, markup::element_in_code);
    while p.at(WHITESPACE) {
        p.bump_literal(MARKUP_TEXT_LITERAL);
    }
    if p.at(NEW_LINE) {
        p.bump_literal(MARKUP_TEXT_LITERAL);
    }
    m.complete(p, MARKUP_BLOCK);
    p.switch(Mode::Code);
}

/// `@` already inside code.
fn transition_in_code(p: &mut Parser<'_>) {
    match p.nth(1) {
        LEFT_BRACE => {
            let range = TextRange::at(p.pos(), TextSize::of("@{"));
            p.error(catalog::nested_code_block(range));
            p.nested(CSHARP_STATEMENT_LITERAL, |p| {
                let t = transition(p);
                statement_block(p, t);
            });
        }
        LEFT_PAREN => p.nested(CSHARP_STATEMENT_LITERAL, |p| {
            let t = transition(p);
            explicit_expression(p, t);
        }),
        COLON => p.nested(CSHARP_STATEMENT_LITERAL, single_line_markup),
        LESS_THAN => template(p),
        IDENTIFIER => {
            let t = transition(p);
            implicit_expression(p, t);
        }
        KEYWORD if is_block_keyword(p.nth_text(1)) => {
            let (range, keyword) = (p.nth_token(1).range, p.nth_text(1));
            p.error(catalog::unexpected_keyword_after_transition(range, keyword));
            transition(p);
            keyword_block(p);
        }
        KEYWORD => p.bump_glued_literal(2, IDENTIFIER, CSHARP_STATEMENT_LITERAL),
        _ => p.bump_literal(CSHARP_STATEMENT_LITERAL),
    }
}

/// `@:` followed by markup up to the end of the line.
fn single_line_markup(p: &mut Parser<'_>) {
    let m = p.start();
    let transition = p.start();
    p.bump();
    transition.complete(p, MARKUP_TRANSITION);
    meta(p);
    p.switch(Mode::Markup);
    loop {
        match p.kind() {
            EOF => break,
            NEW_LINE => {
                p.bump_literal(MARKUP_TEXT_LITERAL);
                break;
            }
            TRANSITION => markup::transition(p),
            RAZOR_COMMENT_TRANSITION => razor_comment(p),
            _ => p.bump_literal(MARKUP_TEXT_LITERAL),
        }
    }
    m.complete(p, MARKUP_BLOCK);
    p.switch(Mode::Code);
}

/// `if`, `for`, `try` and friends, with every `else`, `catch`, `finally` or
/// trailing `while` that belongs to the statement.
fn keyword_block(p: &mut Parser<'_>) {
    let keyword = p.current_text();
    let keyword_range = p.current_range();

    match keyword {
        "await" => {
            p.bump_literal(CSHARP_STATEMENT_LITERAL);
            skip_trivia(p);
            header(p, "foreach", keyword_range);
        }
        "if" => {
            header(p, keyword, keyword_range);
            while let Some(range) = continuation(p, &["else"]) {
                skip_to(p, range.start());
                p.bump_literal(CSHARP_STATEMENT_LITERAL);
                let after = next_word(p);
                match after {
                    Some((word, range)) if word == "if" => {
                        skip_to(p, range.start());
                        header(p, "if", range);
                    }
                    _ => {
                        body(p, "else", range);
                        break;
                    }
                }
            }
        }
        "do" => {
            p.bump_literal(CSHARP_STATEMENT_LITERAL);
            body(p, keyword, keyword_range);
            if let Some(range) = continuation(p, &["while"]) {
                skip_to(p, range.start());
                p.bump_literal(CSHARP_STATEMENT_LITERAL);
                skip_trivia(p);
                if p.at(LEFT_PAREN) {
                    balanced(p, CSHARP_STATEMENT_LITERAL);
                }
                if p.at(SEMICOLON) {
                    p.bump_literal(CSHARP_STATEMENT_LITERAL);
                }
            }
        }
        "try" => {
            p.bump_literal(CSHARP_STATEMENT_LITERAL);
            body(p, keyword, keyword_range);
            while let Some(range) = continuation(p, &["catch", "finally"]) {
                skip_to(p, range.start());
                let clause = p.current_text();
                p.bump_literal(CSHARP_STATEMENT_LITERAL);
                if clause == "catch" {
                    skip_trivia(p);
                    if p.at(LEFT_PAREN) {
                        balanced(p, CSHARP_STATEMENT_LITERAL);
                        skip_trivia(p);
                    }
                    if p.current_text() == "when" {
                        p.bump_literal(CSHARP_STATEMENT_LITERAL);
                        skip_trivia(p);
                        if p.at(LEFT_PAREN) {
                            balanced(p, CSHARP_STATEMENT_LITERAL);
                        }
                    }
                }
                body(p, clause, range);
                if clause == "finally" {
                    break;
                }
            }
        }
        _ => header(p, keyword, keyword_range),
    }
}

/// `keyword (condition) { body }`.
fn header(p: &mut Parser<'_>, keyword: &str, keyword_range: TextRange) {
    p.bump_literal(CSHARP_STATEMENT_LITERAL);
    skip_trivia(p);
    if p.at(LEFT_PAREN) {
        balanced(p, CSHARP_STATEMENT_LITERAL);
    }
    body(p, keyword, keyword_range);
}

/// The braced body of a keyword statement.
fn body(p: &mut Parser<'_>, keyword: &str, keyword_range: TextRange) {
    skip_trivia(p);
    if !p.at(LEFT_BRACE) {
        p.error(catalog::block_requires_braces(keyword_range, keyword));
        return;
    }
    let open = p.current_range();
    p.bump_literal(CSHARP_STATEMENT_LITERAL);
    statements(p);
    if p.at(RIGHT_BRACE) {
        p.bump_literal(CSHARP_STATEMENT_LITERAL);
    } else {
        p.error(catalog::expected_block_end(open, keyword, "}", "{"));
    }
}

fn skip_trivia(p: &mut Parser<'_>) {
    while p.at_set(TRIVIA) {
        bump_code(p, CSHARP_STATEMENT_LITERAL);
    }
}

fn skip_to(p: &mut Parser<'_>, offset: TextSize) {
    while p.pos() < offset && !p.at_eof() {
        if p.at(RAZOR_COMMENT_TRANSITION) {
            razor_comment(p);
        } else {
            bump_code(p, CSHARP_STATEMENT_LITERAL);
        }
    }
}

/// The range of the next word when it is one of `words`.
fn continuation(p: &mut Parser<'_>, words: &[&str]) -> Option<TextRange> {
    next_word(p).filter(|(word, _)| words.contains(word)).map(|(_, range)| range)
}

/// Looks past whitespace, C# comments and razor comments without consuming
/// anything, so that markup after a statement is left alone when no
/// continuation follows.
fn next_word<'t>(p: &Parser<'t>) -> Option<(&'t str, TextRange)> {
    let rest = p.rest();
    let bytes = rest.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b' ' | b'\t' | b'\r' | b'\n' => i += 1,
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                i = rest[i..].find('\n').map_or(bytes.len(), |n| i + n);
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                let mut depth = 1;
                i += 2;
                while i < bytes.len() && depth > 0 {
                    if bytes[i..].starts_with(b"*/") {
                        depth -= 1;
                        i += 2;
                    } else if bytes[i..].starts_with(b"/*") {
                        depth += 1;
                        i += 2;
                    } else {
                        i += 1;
                    }
                }
            }
            b'@' if bytes.get(i + 1) == Some(&b'*') => {
                i = rest[i + 2..].find("*@").map_or(bytes.len(), |n| i + 2 + n + 2);
            }
            _ => break,
        }
    }
    let word = &rest[i..];
    let len = word.find(|c: char| !(c.is_alphanumeric() || c == '_')).unwrap_or(word.len());
    if len == 0 {
        return None;
    }
    let start = p.pos() + TextSize::try_from(i).ok()?;
    Some((&word[..len], TextRange::at(start, TextSize::try_from(len).ok()?)))
}
