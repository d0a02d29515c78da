//! Incremental builder for the green tree.

use razor_errors::Diagnostic;
use rustc_hash::FxHashMap;
use text_size::TextSize;

use crate::{Annotation, GreenElement, GreenNode, GreenToken, NodeOrToken, SyntaxKind};

const DEFAULT_TREE_DEPTH: usize = 128;
const DEFAULT_CHILDREN_LEN: usize = 1024;
/// Short tokens are shared between every occurrence in a document.
const CACHED_TOKEN_LEN: usize = 16;

struct Opened {
    kind: SyntaxKind,
    first_child: usize,
    start: TextSize,
    diagnostics: Vec<Diagnostic>,
    annotations: Vec<Annotation>,
}

/// Builds a green tree from a depth-first stream of start, token and finish calls.
///
/// Nodes whose kind is list-bodied get all their children wrapped into a single
/// list slot; every other node kind receives exactly its declared number of slots.
pub struct GreenBuilder<'t> {
    text: &'t str,
    offset: TextSize,
    opened: Vec<Opened>,
    children: Vec<Option<GreenElement>>,
    tokens: FxHashMap<(SyntaxKind, &'t str), GreenToken>,
}

impl Drop for GreenBuilder<'_> {
    fn drop(&mut self) {
        if !std::thread::panicking() && !self.opened.is_empty() {
            panic!("you should call `GreenBuilder::finish()`");
        }
    }
}

impl<'t> GreenBuilder<'t> {
    pub fn new(text: &'t str) -> Self {
        Self {
            text,
            offset: TextSize::new(0),
            opened: Vec::with_capacity(DEFAULT_TREE_DEPTH),
            children: Vec::with_capacity(DEFAULT_CHILDREN_LEN),
            tokens: FxHashMap::default(),
        }
    }

    pub fn offset(&self) -> TextSize {
        self.offset
    }

    pub fn start_node(&mut self, kind: SyntaxKind) {
        self.opened.push(Opened {
            kind,
            first_child: self.children.len(),
            start: self.offset,
            diagnostics: Vec::new(),
            annotations: Vec::new(),
        });
    }

    /// Adds a token covering the next `len` bytes of the source text.
    pub fn token(&mut self, kind: SyntaxKind, len: TextSize) {
        let start = usize::from(self.offset);
        let end = usize::from(self.offset + len);
        let text = &self.text[start..end];
        self.offset += len;

        let token = if text.len() <= CACHED_TOKEN_LEN {
            self.tokens.entry((kind, text)).or_insert_with(|| GreenToken::new(kind, text)).clone()
        } else {
            GreenToken::new(kind, text)
        };
        self.children.push(Some(token.into()));
    }

    /// Adds a zero-width token that the grammar required but the source lacks.
    pub fn missing(&mut self, kind: SyntaxKind) {
        self.children.push(Some(GreenToken::missing(kind).into()));
    }

    /// Leaves the next slot of the current node empty.
    pub fn empty_slot(&mut self) {
        self.children.push(None);
    }

    /// Attaches `diagnostic`, whose range is absolute, to the innermost open node
    /// that starts at or before it.
    pub fn error(&mut self, diagnostic: Diagnostic) {
        let start = diagnostic.range().start();
        let owner = self.opened.iter_mut().rev().find(|opened| opened.start <= start);
        match owner {
            Some(opened) => opened.diagnostics.push(diagnostic),
            None => debug_assert!(false, "diagnostic outside of any node: {diagnostic}"),
        }
    }

    /// Attaches `annotation` to the innermost open node.
    pub fn annotate(&mut self, annotation: Annotation) {
        match self.opened.last_mut() {
            Some(opened) => opened.annotations.push(annotation),
            None => debug_assert!(false, "annotation outside of any node"),
        }
    }

    pub fn finish_node(&mut self) {
        let Opened { kind, first_child, start, diagnostics, annotations } =
            self.opened.pop().expect("no opened nodes?");
        if kind.is_list() {
            let list = GreenNode::new_list(self.children.drain(first_child..).flatten());
            if let Some(parent) = self.opened.last_mut() {
                parent.diagnostics.extend(diagnostics);
            }
            self.children.push(list.map(GreenElement::from));
            return;
        }

        let slots: Vec<Option<GreenElement>> = if kind.is_list_bodied() {
            let list = GreenNode::new_list(self.children.drain(first_child..).flatten());
            vec![list.map(GreenElement::from)]
        } else {
            self.children.drain(first_child..).collect()
        };
        debug_assert_eq!(Some(slots.len()), kind.slot_count(), "slot count of {kind:?}");

        let mut node = GreenNode::new(kind, slots);
        if !diagnostics.is_empty() {
            let relative = diagnostics.iter().map(|it| it.shifted_left(start)).collect();
            node = node.with_diagnostics(relative);
        }
        if !annotations.is_empty() {
            node = node.with_annotations(annotations);
        }
        self.children.push(Some(node.into()));
    }

    pub fn finish(mut self) -> GreenNode {
        assert!(self.opened.is_empty());
        assert_eq!(self.children.len(), 1);
        match self.children.pop() {
            Some(Some(NodeOrToken::Node(root))) => root,
            _ => panic!("the root must be a node"),
        }
    }
}
