use razor_errors::catalog;
use razor_syntax::SyntaxKind::*;
use text_size::{TextRange, TextSize};

use crate::parser::{Mode, Parser};

pub(crate) mod code;
pub(crate) mod directive;
pub(crate) mod markup;
pub(crate) mod preprocessor;

pub use markup::is_void_element;

pub(crate) fn document(p: &mut Parser<'_>) {
    let document = p.start();
    let block = p.start();
    markup::contents(p, &mut markup::Scope::default());
    block.complete(p, MARKUP_BLOCK);
    p.eof();
    document.complete(p, RAZOR_DOCUMENT);
}

/// `@* ... *@`, valid in every mode. The mode in effect before the comment is restored.
pub(crate) fn razor_comment(p: &mut Parser<'_>) {
    let mode = p.mode();
    let m = p.start();
    let open = TextRange::at(p.pos(), TextSize::new(2));
    p.bump();
    p.switch(Mode::Comment);
    p.bump();
    if p.at(RAZOR_COMMENT_LITERAL) {
        p.bump();
    } else {
        p.missing(RAZOR_COMMENT_LITERAL);
    }
    if p.at(RAZOR_COMMENT_STAR) {
        p.bump();
        p.bump();
    } else {
        p.missing(RAZOR_COMMENT_STAR);
        p.missing(RAZOR_COMMENT_TRANSITION);
        p.error(catalog::unterminated_razor_comment(open));
    }
    m.complete(p, RAZOR_COMMENT_BLOCK);
    p.switch(mode);
}

/// `a@b.c` reads as an email address, not a transition.
pub(crate) fn is_email_transition(p: &Parser<'_>) -> bool {
    let before = p.prev_char().is_some_and(char::is_alphanumeric);
    let after = p.rest().chars().nth(1).is_some_and(char::is_alphanumeric);
    before && after
}
