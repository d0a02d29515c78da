use razor_errors::catalog;
use razor_syntax::{Annotation, SyntaxKind, SyntaxKind::*, SyntaxSet};
use text_size::{TextRange, TextSize};

use super::{code, is_email_transition, razor_comment};
use crate::annotations::{self, MarkupTransitionTag};
use crate::parser::Parser;

const WHITESPACE_OR_NEW_LINE: SyntaxSet = SyntaxSet::new([WHITESPACE, NEW_LINE]);
const TAG_BOUNDARY: SyntaxSet = SyntaxSet::new([CLOSE_ANGLE, OPEN_ANGLE, EOF]);
const UNQUOTED_VALUE_END: SyntaxSet = WHITESPACE_OR_NEW_LINE.union(TAG_BOUNDARY);
const NAME_CONTINUATION: SyntaxSet =
    SyntaxSet::new([TEXT, LEFT_BRACKET, RIGHT_BRACKET, BANG, QUESTION_MARK, DOUBLE_HYPHEN]);

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source", "track",
    "wbr",
];

/// Elements whose body is raw text: no tags, only transitions.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Elements waiting for their end tag, innermost last.
#[derive(Default)]
pub(crate) struct Scope {
    open: Vec<Box<str>>,
    /// Brace depth inside a `@section { }` body.
    braces: Option<u32>,
}

impl Scope {
    pub(crate) fn section() -> Self {
        Self { open: Vec::new(), braces: Some(0) }
    }

    fn closes(&self, name: &str) -> bool {
        self.open.iter().any(|it| it.eq_ignore_ascii_case(name))
    }
}

/// `<input>` and friends: never have a body or an end tag.
pub fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS.iter().any(|it| it.eq_ignore_ascii_case(name))
}

/// Parses markup until the end of input, an end tag that closes an element of
/// `scope`, or the brace closing a section body.
pub(crate) fn contents(p: &mut Parser<'_>, scope: &mut Scope) {
    loop {
        if at_section_end(p, scope) {
            return;
        }
        match p.kind() {
            EOF => return,
            TRANSITION => transition(p),
            RAZOR_COMMENT_TRANSITION => razor_comment(p),
            OPEN_ANGLE => match end_tag_name(p) {
                Some(name) if scope.closes(name) => return,
                Some(_) => orphan_end_tag(p, false),
                None => tag(p, scope),
            },
            TEXT if scope.braces.is_some() => section_text(p, scope),
            _ => p.bump_literal(MARKUP_TEXT_LITERAL),
        }
    }
}

/// `@` in markup: an escape, an email address, or code.
pub(crate) fn transition(p: &mut Parser<'_>) {
    if p.nth(1) == TRANSITION {
        let m = p.start();
        p.bump();
        m.complete(p, MARKUP_EPHEMERAL_TEXT_LITERAL);
        p.bump_literal(MARKUP_TEXT_LITERAL);
    } else if is_email_transition(p) {
        p.bump_literal(MARKUP_TEXT_LITERAL);
    } else {
        p.nested(MARKUP_TEXT_LITERAL, code::embedded);
    }
}

fn at_section_end(p: &mut Parser<'_>, scope: &Scope) -> bool {
    scope.braces == Some(0) && p.at(TEXT) && p.current_text().starts_with('}')
}

/// Text inside a section body, split before the brace that closes the section.
fn section_text(p: &mut Parser<'_>, scope: &mut Scope) {
    let text = p.current_text();
    let mut depth = scope.braces.unwrap_or(0);
    for (index, c) in text.char_indices() {
        match c {
            '{' => depth += 1,
            '}' if depth == 0 => {
                scope.braces = Some(0);
                p.bump_raw_literal(TextSize::of(&text[..index]), TEXT, MARKUP_TEXT_LITERAL);
                return;
            }
            '}' => depth -= 1,
            _ => {}
        }
    }
    scope.braces = Some(depth);
    p.bump_literal(MARKUP_TEXT_LITERAL);
}

/// The name of the end tag at the cursor, if there is one.
fn end_tag_name<'t>(p: &mut Parser<'t>) -> Option<&'t str> {
    if p.nth(0) != OPEN_ANGLE || p.nth(1) != FORWARD_SLASH {
        return None;
    }
    match (p.nth(2), p.nth(3)) {
        (TEXT, _) => Some(p.nth_text(2)),
        (BANG, TEXT) => Some(p.nth_text(3)),
        _ => None,
    }
}

fn starts_with_letter(text: &str) -> bool {
    text.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
}

/// Whatever starts with `<` and is not an end tag.
fn tag(p: &mut Parser<'_>, scope: &mut Scope) {
    match p.nth(1) {
        BANG if p.nth(2) == DOUBLE_HYPHEN => html_comment(p),
        BANG if p.rest().starts_with("<![CDATA[") => text_until(p, "]]>"),
        BANG if p.nth(2) == TEXT && p.nth_text(2).eq_ignore_ascii_case("doctype") => text_until(p, ">"),
        BANG if p.nth(2) == TEXT && starts_with_letter(p.nth_text(2)) => {
            p.nested(MARKUP_TEXT_LITERAL, |p| element(p, scope, false));
        }
        QUESTION_MARK => text_until(p, ">"),
        TEXT if starts_with_letter(p.nth_text(1)) => {
            p.nested(MARKUP_TEXT_LITERAL, |p| element(p, scope, false));
        }
        _ => p.bump_literal(MARKUP_TEXT_LITERAL),
    }
}

/// Plain text up to and including `terminator`, or to the end of input.
fn text_until(p: &mut Parser<'_>, terminator: &str) {
    while !p.at_eof() && !p.rest().starts_with(terminator) {
        p.bump_literal(MARKUP_TEXT_LITERAL);
    }
    let end = p.pos() + TextSize::of(terminator);
    while !p.at_eof() && p.pos() < end {
        p.bump_literal(MARKUP_TEXT_LITERAL);
    }
}

fn html_comment(p: &mut Parser<'_>) {
    let m = p.start();
    let open = p.start();
    for _ in 0..3 {
        p.bump();
    }
    open.complete(p, MARKUP_TEXT_LITERAL);
    loop {
        match p.kind() {
            EOF => break,
            DOUBLE_HYPHEN if p.nth(1) == CLOSE_ANGLE => {
                let close = p.start();
                p.bump();
                p.bump();
                close.complete(p, MARKUP_TEXT_LITERAL);
                break;
            }
            TRANSITION => transition(p),
            RAZOR_COMMENT_TRANSITION => razor_comment(p),
            _ => p.bump_literal(MARKUP_TEXT_LITERAL),
        }
    }
    m.complete(p, MARKUP_COMMENT_BLOCK);
}

struct StartTag<'t> {
    name: &'t str,
    name_range: TextRange,
    closed: bool,
    self_closing: bool,
}

/// One element and, unless it is void or self-closing, its body and end tag.
///
/// In code the element must be closed explicitly, and a `<text>` element is a
/// transition whose tags are not part of the output.
fn element(p: &mut Parser<'_>, scope: &mut Scope, in_code: bool) {
    let m = p.start();
    let transition = in_code && p.nth(1) == TEXT && p.nth_text(1) == "text";
    let tag = start_tag(p, transition);

    if tag.closed && !tag.self_closing && !is_void_element(tag.name) {
        let body = p.start();
        scope.open.push(tag.name.into());
        if RAW_TEXT_ELEMENTS.iter().any(|it| it.eq_ignore_ascii_case(tag.name)) {
            raw_text(p, tag.name);
        } else {
            contents(p, scope);
        }
        body.complete(p, LIST);
        scope.open.pop();

        if end_tag_name(p).is_some_and(|name| name.eq_ignore_ascii_case(tag.name)) {
            end_tag(p, transition);
        } else {
            p.empty_slot();
            if in_code {
                p.error(catalog::missing_end_tag(tag.name_range, tag.name));
            }
        }
    } else {
        p.empty_slot();
        p.empty_slot();
    }
    m.complete(p, MARKUP_ELEMENT);
}

/// An element where a C# statement was expected.
pub(crate) fn element_in_code(p: &mut Parser<'_>) {
    if end_tag_name(p).is_some() {
        orphan_end_tag(p, true);
    } else if p.nth(1) == BANG && p.nth(2) == DOUBLE_HYPHEN {
        html_comment(p);
    } else {
        element(p, &mut Scope::default(), true);
    }
}

fn start_tag<'t>(p: &mut Parser<'t>, transition: bool) -> StartTag<'t> {
    let m = p.start();
    let open_range = p.current_range();
    p.bump();
    if p.at(BANG) {
        p.bump();
    } else {
        p.empty_slot();
    }
    let (name, name_range) = if p.at(TEXT) {
        let name = (p.current_text(), p.current_range());
        p.bump();
        name
    } else {
        p.empty_slot();
        ("", open_range)
    };

    let list = p.start();
    attributes(p);
    list.complete(p, LIST);

    let self_closing = p.at(FORWARD_SLASH) && p.nth(1) == CLOSE_ANGLE;
    if self_closing {
        p.bump();
    } else {
        p.empty_slot();
    }
    let closed = p.at(CLOSE_ANGLE);
    if closed {
        p.bump();
    } else {
        p.missing(CLOSE_ANGLE);
        p.error(catalog::unfinished_tag(name_range, name));
    }
    if transition {
        p.annotate(Annotation::new(annotations::TRANSITION, MarkupTransitionTag));
    }
    m.complete(p, MARKUP_START_TAG);
    StartTag { name, name_range, closed, self_closing }
}

fn end_tag(p: &mut Parser<'_>, transition: bool) {
    let m = p.start();
    p.bump();
    p.bump();
    if p.at(BANG) {
        p.bump();
    } else {
        p.empty_slot();
    }
    let (name, name_range) = (p.current_text(), p.current_range());
    p.bump();

    if p.at_set(TAG_BOUNDARY) {
        p.empty_slot();
    } else {
        let misc = p.start();
        while !p.at_set(TAG_BOUNDARY) {
            p.bump();
        }
        misc.complete(p, MARKUP_MISC_ATTRIBUTE_CONTENT);
    }

    if p.at(CLOSE_ANGLE) {
        p.bump();
    } else {
        p.missing(CLOSE_ANGLE);
        p.error(catalog::unfinished_tag(name_range, name));
    }
    if transition {
        p.annotate(Annotation::new(annotations::TRANSITION, MarkupTransitionTag));
    }
    m.complete(p, MARKUP_END_TAG);
}

/// An end tag with no open element to close.
fn orphan_end_tag(p: &mut Parser<'_>, in_code: bool) {
    let m = p.start();
    p.empty_slot();
    p.empty_slot();
    let name = end_tag_name(p).unwrap_or_default();
    let name_start = p.pos() + TextSize::of("</");
    end_tag(p, false);
    if in_code {
        let range = TextRange::at(name_start, TextSize::of(name));
        p.error(catalog::unexpected_end_tag(range, name));
    }
    m.complete(p, MARKUP_ELEMENT);
}

/// Body of `<script>` and `<style>`: text and transitions up to the matching end tag.
fn raw_text(p: &mut Parser<'_>, name: &str) {
    loop {
        match p.kind() {
            EOF => return,
            OPEN_ANGLE if end_tag_name(p).is_some_and(|it| it.eq_ignore_ascii_case(name)) => return,
            TRANSITION => transition(p),
            RAZOR_COMMENT_TRANSITION => razor_comment(p),
            _ => p.bump_literal(MARKUP_TEXT_LITERAL),
        }
    }
}

fn whitespace_run(p: &mut Parser<'_>, from: usize) -> usize {
    let mut n = from;
    while WHITESPACE_OR_NEW_LINE.contains(p.nth(n)) {
        n += 1;
    }
    n - from
}

/// Whitespace as a `MARKUP_TEXT_LITERAL`, or an empty slot when there is none.
fn whitespace_literal(p: &mut Parser<'_>) {
    if !p.at_set(WHITESPACE_OR_NEW_LINE) {
        p.empty_slot();
        return;
    }
    let m = p.start();
    while p.at_set(WHITESPACE_OR_NEW_LINE) {
        p.bump();
    }
    m.complete(p, MARKUP_TEXT_LITERAL);
}

fn is_name_start(p: &mut Parser<'_>, n: usize) -> bool {
    match p.nth(n) {
        TEXT | LEFT_BRACKET => true,
        TRANSITION => p.options().features().allow_component_directive_attributes && p.nth(n + 1) == TEXT,
        _ => false,
    }
}

/// Number of tokens making up the attribute name at the cursor. Symbolic
/// names such as `[(ngModel)]` or `@bind:event` span several tokens.
fn name_len(p: &mut Parser<'_>) -> usize {
    let mut n = 1;
    while NAME_CONTINUATION.contains(p.nth(n)) {
        n += 1;
    }
    n
}

fn attributes(p: &mut Parser<'_>) {
    loop {
        match p.kind() {
            CLOSE_ANGLE | OPEN_ANGLE | EOF => return,
            FORWARD_SLASH if p.nth(1) == CLOSE_ANGLE => return,
            WHITESPACE | NEW_LINE => {
                let whitespace = whitespace_run(p, 0);
                if is_name_start(p, whitespace) {
                    attribute(p);
                } else {
                    let m = p.start();
                    whitespace_literal(p);
                    m.complete(p, MARKUP_MISC_ATTRIBUTE_CONTENT);
                }
            }
            RAZOR_COMMENT_TRANSITION => {
                let m = p.start();
                razor_comment(p);
                m.complete(p, MARKUP_MISC_ATTRIBUTE_CONTENT);
            }
            _ if is_name_start(p, 0) => attribute(p),
            TRANSITION => code_in_attribute_area(p),
            _ => {
                let m = p.start();
                p.bump_literal(MARKUP_TEXT_LITERAL);
                m.complete(p, MARKUP_MISC_ATTRIBUTE_CONTENT);
            }
        }
    }
}

fn code_in_attribute_area(p: &mut Parser<'_>) {
    let m = p.start();
    if !p.options().features().allow_csharp_in_markup_attribute_area {
        let range = TextRange::at(p.pos(), TextSize::of("@"));
        p.error(catalog::csharp_in_attribute_area(range));
    }
    p.nested(MARKUP_TEXT_LITERAL, code::embedded);
    m.complete(p, MARKUP_MISC_ATTRIBUTE_CONTENT);
}

fn attribute(p: &mut Parser<'_>) {
    let m = p.start();
    whitespace_literal(p);

    let name = p.start();
    let n = name_len(p);
    p.bump_glued(n, TEXT);
    name.complete(p, MARKUP_TEXT_LITERAL);

    let whitespace = whitespace_run(p, 0);
    if p.nth(whitespace) != EQUALS {
        m.complete(p, MARKUP_MINIMIZED_ATTRIBUTE_BLOCK);
        return;
    }
    whitespace_literal(p);
    p.bump();

    let whitespace = whitespace_run(p, 0);
    let quote = match p.nth(whitespace) {
        kind @ (DOUBLE_QUOTE | SINGLE_QUOTE) => Some(kind),
        _ => None,
    };
    if whitespace > 0 || quote.is_some() {
        let prefix = p.start();
        for _ in 0..whitespace {
            p.bump();
        }
        if quote.is_some() {
            p.bump();
        }
        prefix.complete(p, MARKUP_TEXT_LITERAL);
    } else {
        p.empty_slot();
    }

    attribute_value(p, quote);

    match quote {
        Some(quote) if p.at(quote) => {
            let suffix = p.start();
            p.bump();
            suffix.complete(p, MARKUP_TEXT_LITERAL);
        }
        _ => p.empty_slot(),
    }
    m.complete(p, MARKUP_ATTRIBUTE_BLOCK);
}

fn at_value_end(p: &mut Parser<'_>, quote: Option<SyntaxKind>) -> bool {
    match quote {
        Some(quote) => p.at(quote) || p.at_eof(),
        None => {
            p.at_set(UNQUOTED_VALUE_END)
                || (p.at(FORWARD_SLASH) && p.nth(1) == CLOSE_ANGLE)
        }
    }
}

/// The value of an attribute, split into whitespace-prefixed literal and
/// dynamic parts.
fn attribute_value(p: &mut Parser<'_>, quote: Option<SyntaxKind>) {
    let block = p.start();
    let mut parts = 0;
    while !at_value_end(p, quote) {
        parts += 1;
        let part = p.start();
        if quote.is_some() {
            whitespace_literal(p);
        } else {
            p.empty_slot();
        }

        if at_value_end(p, quote) {
            p.empty_slot();
            part.complete(p, MARKUP_LITERAL_ATTRIBUTE_VALUE);
        } else if p.at(RAZOR_COMMENT_TRANSITION) {
            let value = p.start();
            razor_comment(p);
            value.complete(p, MARKUP_BLOCK);
            part.complete(p, MARKUP_DYNAMIC_ATTRIBUTE_VALUE);
        } else if p.at(TRANSITION) && p.nth(1) != TRANSITION && !is_email_transition(p) {
            let value = p.start();
            p.nested(MARKUP_TEXT_LITERAL, code::embedded);
            value.complete(p, MARKUP_BLOCK);
            part.complete(p, MARKUP_DYNAMIC_ATTRIBUTE_VALUE);
        } else {
            let value = p.start();
            literal_value(p, quote);
            value.complete(p, MARKUP_TEXT_LITERAL);
            part.complete(p, MARKUP_LITERAL_ATTRIBUTE_VALUE);
        }
    }

    if parts == 0 {
        block.abandon(p);
        p.empty_slot();
    } else {
        block.complete(p, GENERIC_BLOCK);
    }
}

fn literal_value(p: &mut Parser<'_>, quote: Option<SyntaxKind>) {
    loop {
        if at_value_end(p, quote) {
            return;
        }
        match p.kind() {
            WHITESPACE | NEW_LINE | RAZOR_COMMENT_TRANSITION => return,
            TRANSITION if p.nth(1) == TRANSITION => {
                p.bump();
                p.bump();
            }
            TRANSITION if !is_email_transition(p) => return,
            _ => p.bump(),
        }
    }
}
