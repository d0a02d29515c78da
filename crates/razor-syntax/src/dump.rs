//! Human-readable tree dump used by baseline tests and the `--tree` CLI flag.
//!
//! ```text
//! RAZOR_DOCUMENT - [0..5)::5
//!   MARKUP_BLOCK - [0..5)::5
//!     MARKUP_TEXT_LITERAL - [0..5)::5 - [Hello]
//!       TEXT;[Hello];
//!   EOF;[];
//! ```
//!
//! List nodes are transparent and empty slots are omitted.

use std::fmt::Write as _;

use crate::{NodeOrToken, SyntaxNode, SyntaxToken};

pub(crate) fn debug_dump(root: &SyntaxNode) -> String {
    let mut out = String::new();
    dump_node(root, 0, &mut out);
    out
}

fn dump_node(node: &SyntaxNode, depth: usize, out: &mut String) {
    if !node.kind().is_list() {
        let range = node.text_range();
        let start: u32 = range.start().into();
        let end: u32 = range.end().into();
        let width: u32 = range.len().into();
        let _ = write!(out, "{:indent$}{:?} - [{start}..{end})::{width}", "", node.kind(), indent = depth * 2);
        if node.kind().is_literal() {
            let _ = write!(out, " - [{}]", escape(&node.text()));
        }
        for annotation in node.annotations() {
            let _ = write!(out, " - {annotation:?}");
        }
        out.push('\n');
    }

    let depth = if node.kind().is_list() { depth } else { depth + 1 };
    for index in 0..node.slot_count() {
        match node.slot(index) {
            Some(NodeOrToken::Node(child)) => dump_node(&child, depth, out),
            Some(NodeOrToken::Token(token)) => dump_token(&token, depth, out),
            None => {}
        }
    }
}

fn dump_token(token: &SyntaxToken, depth: usize, out: &mut String) {
    let text = if token.is_missing() { "<Missing>".to_owned() } else { escape(token.text()) };
    let _ = writeln!(out, "{:indent$}{:?};[{text}];", "", token.kind(), indent = depth * 2);
}

fn escape(text: &str) -> String {
    text.replace('\r', "CR").replace('\n', "LF")
}
