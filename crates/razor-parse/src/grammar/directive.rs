use razor_errors::catalog;
use razor_syntax::{Annotation, SyntaxKind, SyntaxKind::*};
use text_size::{TextRange, TextSize};

use super::code::{self, close_brace, meta};
use super::markup;
use crate::annotations;
use crate::directives::{
    DirectiveDescriptor, DirectiveInfo, DirectiveKind, DirectiveTokenKind, DirectiveUsage, TAG_HELPER_PREFIX,
};
use crate::parser::{CompletedMarker, Mode, Parser};

/// Characters a tag helper prefix cannot contain.
const INVALID_PREFIX_CHARACTERS: &[char] = &['@', '!', '<', '/', '?', '[', '>', ']', '=', '"', '\'', '*'];

/// `@name tokens...` with either a line end or a braced body, as declared by `descriptor`.
/// `at` is the offset of the transition.
pub(crate) fn directive(p: &mut Parser<'_>, t: CompletedMarker, at: TextSize, descriptor: &DirectiveDescriptor) {
    let m = t.precede(p);
    p.annotate(Annotation::new(annotations::DIRECTIVE, DirectiveInfo::from(descriptor)));
    let body = p.start();

    let name = p.current_text();
    let name_range = p.current_range();
    meta(p);
    if descriptor.usage == DirectiveUsage::FileScopedSinglyOccurring && !p.record_directive(name) {
        log::debug!("duplicate `{name}` directive at {at:?}");
        p.error(catalog::duplicate_directive(TextRange::new(at, name_range.end()), name));
    }

    let block = p.start();
    let complete = if descriptor.is_tag_helper_directive() {
        tag_helper_value(p, name, name_range)
    } else {
        tokens(p, descriptor)
    };
    if complete {
        match descriptor.kind {
            DirectiveKind::SingleLine => end_of_line(p, name),
            DirectiveKind::RazorBlock | DirectiveKind::CodeBlock => braced_body(p, descriptor),
        }
    }
    block.complete(p, CSHARP_CODE_BLOCK);

    body.complete(p, RAZOR_DIRECTIVE_BODY);
    m.complete(p, RAZOR_DIRECTIVE);
}

fn whitespace(p: &mut Parser<'_>) {
    while p.at(WHITESPACE) {
        p.bump_literal(UNCLASSIFIED_TEXT_LITERAL);
    }
}

/// The declared tokens, each preceded by whitespace on the same line. On a
/// malformed token the directive ends and the rest is left to the caller.
fn tokens(p: &mut Parser<'_>, descriptor: &DirectiveDescriptor) -> bool {
    let name = &*descriptor.name;
    for token in &descriptor.tokens {
        let mut n = 0;
        while p.nth(n) == WHITESPACE {
            n += 1;
        }
        let expected = token.kind.description();
        match p.nth(n) {
            EOF | NEW_LINE if token.optional => break,
            EOF => {
                whitespace(p);
                p.error(catalog::unexpected_eof_after_directive(TextRange::empty(p.pos()), name, expected));
                return false;
            }
            _ if n == 0 => {
                let range = p.current_range();
                p.error(catalog::directive_expects_token(range, name, expected));
                return false;
            }
            _ => whitespace(p),
        }

        if !token_value(p, token.kind) {
            let range = p.current_range();
            let diagnostic = if token.kind == DirectiveTokenKind::String {
                catalog::directive_expects_quoted_string(range, name)
            } else {
                catalog::directive_expects_token(range, name, expected)
            };
            p.error(diagnostic);
            return false;
        }
    }
    true
}

fn token_value(p: &mut Parser<'_>, kind: DirectiveTokenKind) -> bool {
    let ok = match kind {
        DirectiveTokenKind::Type => type_name(p),
        DirectiveTokenKind::Namespace => namespace(p),
        DirectiveTokenKind::Member => eat(p, |p| p.at(IDENTIFIER)),
        DirectiveTokenKind::String => eat(p, |p| matches!(p.kind(), STRING_LITERAL | VERBATIM_STRING_LITERAL)),
        DirectiveTokenKind::Boolean => eat(p, |p| matches!(p.current_text(), "true" | "false")),
        DirectiveTokenKind::Attribute => p.at(LEFT_BRACKET) && bracketed(p, LEFT_BRACKET, RIGHT_BRACKET),
    };
    p.flush_literal();
    ok
}

fn eat(p: &mut Parser<'_>, at: impl FnOnce(&mut Parser<'_>) -> bool) -> bool {
    if !at(p) {
        return false;
    }
    p.bump_literal(CSHARP_STATEMENT_LITERAL);
    true
}

/// Up to and including the closer matching the opener under the cursor,
/// staying on the current line.
fn bracketed(p: &mut Parser<'_>, open: SyntaxKind, close: SyntaxKind) -> bool {
    let mut depth = 0u32;
    loop {
        let kind = p.kind();
        if matches!(kind, NEW_LINE | EOF) {
            return false;
        }
        if kind == open {
            depth += 1;
        } else if kind == close {
            depth -= 1;
        }
        p.bump_literal(CSHARP_STATEMENT_LITERAL);
        if depth == 0 {
            return true;
        }
    }
}

fn namespace(p: &mut Parser<'_>) -> bool {
    if !p.at(IDENTIFIER) {
        return false;
    }
    p.bump_literal(CSHARP_STATEMENT_LITERAL);
    while p.at(DOT) && p.nth(1) == IDENTIFIER {
        p.bump_literal(CSHARP_STATEMENT_LITERAL);
        p.bump_literal(CSHARP_STATEMENT_LITERAL);
    }
    true
}

/// A C# type: qualified and generic names, tuples, arrays and nullables.
fn type_name(p: &mut Parser<'_>) -> bool {
    match p.kind() {
        LEFT_PAREN => {
            if !bracketed(p, LEFT_PAREN, RIGHT_PAREN) {
                return false;
            }
        }
        IDENTIFIER | KEYWORD => p.bump_literal(CSHARP_STATEMENT_LITERAL),
        _ => return false,
    }

    loop {
        match (p.kind(), p.nth(1)) {
            (DOT, IDENTIFIER | KEYWORD) => {
                p.bump_literal(CSHARP_STATEMENT_LITERAL);
                p.bump_literal(CSHARP_STATEMENT_LITERAL);
            }
            (CSHARP_OPERATOR, IDENTIFIER) if p.current_text() == "::" => {
                p.bump_literal(CSHARP_STATEMENT_LITERAL);
                p.bump_literal(CSHARP_STATEMENT_LITERAL);
            }
            (LESS_THAN, _) => {
                if !bracketed(p, LESS_THAN, GREATER_THAN) {
                    return false;
                }
            }
            (LEFT_BRACKET, _) => {
                if !bracketed(p, LEFT_BRACKET, RIGHT_BRACKET) {
                    return false;
                }
            }
            (QUESTION_MARK, _) => p.bump_literal(CSHARP_STATEMENT_LITERAL),
            _ => return true,
        }
    }
}

/// `addTagHelper`, `removeTagHelper` and `tagHelperPrefix` take the rest of
/// the line as their value.
fn tag_helper_value(p: &mut Parser<'_>, name: &str, name_range: TextRange) -> bool {
    whitespace(p);
    let start = p.pos();
    while !matches!(p.kind(), NEW_LINE | EOF) {
        let token = p.current();
        p.bump_literal(CSHARP_STATEMENT_LITERAL);
        if token.unterminated && token.kind == STRING_LITERAL {
            p.error(catalog::unterminated_string_literal(TextRange::at(token.range.start(), TextSize::new(1))));
        }
    }
    p.flush_literal();

    let raw = p.text_of(TextRange::new(start, p.pos())).trim_end();
    if raw.is_empty() {
        p.error(catalog::directive_must_have_value(name_range, name));
        return true;
    }

    let (value, range) = unquote(raw, start);
    if name == TAG_HELPER_PREFIX {
        for character in value.chars().filter(|&c| c.is_whitespace() || INVALID_PREFIX_CHARACTERS.contains(&c)) {
            p.error(catalog::invalid_tag_helper_prefix_value(range, name, character, value));
        }
    } else if !is_lookup_text(value) {
        p.error(catalog::invalid_tag_helper_lookup_text(range, value));
    }
    true
}

/// Strips surrounding quotes, returning the inner text and its range.
fn unquote(raw: &str, start: TextSize) -> (&str, TextRange) {
    let mut value = raw;
    let mut offset = start;
    if let Some(rest) = value.strip_prefix('"') {
        value = rest;
        offset += TextSize::of('"');
    }
    if let Some(rest) = value.strip_suffix('"') {
        value = rest;
    }
    (value, TextRange::at(offset, TextSize::of(value)))
}

/// `typePattern, assemblyName`, both parts non-empty.
fn is_lookup_text(value: &str) -> bool {
    match value.split_once(',') {
        Some((type_pattern, assembly)) => {
            !type_pattern.trim().is_empty() && !assembly.trim().is_empty() && !assembly.contains(',')
        }
        None => false,
    }
}

/// Everything after the last token of a single-line directive: an optional
/// `;`, trailing whitespace and the line break.
fn end_of_line(p: &mut Parser<'_>, name: &str) {
    whitespace(p);
    if p.at(SEMICOLON) {
        p.bump_literal(CSHARP_STATEMENT_LITERAL);
        whitespace(p);
    }
    match p.kind() {
        NEW_LINE => p.bump_literal(UNCLASSIFIED_TEXT_LITERAL),
        EOF => {}
        _ => {
            let range = p.current_range();
            p.error(catalog::unexpected_directive_literal(range, name, "line break"));
        }
    }
    p.flush_literal();
}

fn braced_body(p: &mut Parser<'_>, descriptor: &DirectiveDescriptor) {
    let name = &*descriptor.name;
    while matches!(p.kind(), WHITESPACE | NEW_LINE) {
        p.bump_literal(UNCLASSIFIED_TEXT_LITERAL);
    }
    match p.kind() {
        LEFT_BRACE => {}
        EOF => {
            p.error(catalog::unexpected_eof_after_directive(TextRange::empty(p.pos()), name, "{"));
            return;
        }
        _ => {
            let range = p.current_range();
            p.error(catalog::directive_expects_token(range, name, "{"));
            return;
        }
    }

    let open = p.current_range();
    meta(p);
    if descriptor.kind == DirectiveKind::RazorBlock {
        p.switch(Mode::Markup);
        let block = p.start();
        markup::contents(p, &mut markup::Scope::section());
        block.complete(p, MARKUP_BLOCK);
        p.switch(Mode::Code);
    } else {
        code::statements(p);
    }
    close_brace(p, open, name);
}
