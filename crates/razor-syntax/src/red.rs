//! Positioned, parent-aware facade over the green tree.
//!
//! A red node is created lazily the first time its slot is visited and then
//! cached in its parent, so repeated navigation returns the same node. Parents
//! are held weakly; a subtree handle outliving its root reports no parent.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Weak};

use once_cell::race::OnceBox;
use razor_errors::Diagnostic;
use text_size::{TextRange, TextSize};

use crate::{Annotation, GreenElement, GreenNode, GreenToken, NodeOrToken, SyntaxKind, TokenAtOffset};

pub type SyntaxElement = NodeOrToken<SyntaxNode, SyntaxToken>;

#[derive(Clone)]
pub struct SyntaxNode(Arc<NodeData>);

struct NodeData {
    parent: Option<(Weak<NodeData>, u32)>,
    offset: TextSize,
    green: GreenNode,
    children: Box<[OnceBox<SyntaxNode>]>,
}

impl NodeData {
    fn new(parent: Option<(Weak<Self>, u32)>, offset: TextSize, green: GreenNode) -> Arc<Self> {
        let children = (0..green.slot_count()).map(|_| OnceBox::new()).collect();
        Arc::new(Self { parent, offset, green, children })
    }
}

impl SyntaxNode {
    pub fn new_root(green: GreenNode) -> Self {
        Self(NodeData::new(None, TextSize::new(0), green))
    }

    pub fn kind(&self) -> SyntaxKind {
        self.0.green.kind()
    }

    pub fn green(&self) -> &GreenNode {
        &self.0.green
    }

    pub fn offset(&self) -> TextSize {
        self.0.offset
    }

    pub fn width(&self) -> TextSize {
        self.0.green.width()
    }

    pub fn text_range(&self) -> TextRange {
        TextRange::at(self.offset(), self.width())
    }

    pub fn text(&self) -> String {
        self.0.green.text()
    }

    /// Parent node including list nodes.
    fn raw_parent(&self) -> Option<(Self, usize)> {
        let (parent, index) = self.0.parent.as_ref()?;
        Some((Self(parent.upgrade()?), *index as usize))
    }

    /// The nearest enclosing non-list node.
    pub fn parent(&self) -> Option<Self> {
        let (mut parent, _) = self.raw_parent()?;
        while parent.kind().is_list() {
            (parent, _) = parent.raw_parent()?;
        }
        Some(parent)
    }

    /// This node followed by its enclosing nodes up to the root.
    pub fn ancestors(&self) -> impl Iterator<Item = Self> + use<> {
        std::iter::successors(Some(self.clone()), Self::parent)
    }

    pub fn slot_count(&self) -> usize {
        self.0.green.slot_count()
    }

    /// Child stored in slot `index`; list children come back as [`SyntaxKind::LIST`] nodes.
    pub fn slot(&self, index: usize) -> Option<SyntaxElement> {
        let element = self.0.green.slot(index)?;
        let offset = self.offset() + self.0.green.slot_offset(index);
        Some(match element {
            NodeOrToken::Node(green) => NodeOrToken::Node(self.cached_child(index, offset, green)),
            NodeOrToken::Token(green) => NodeOrToken::Token(SyntaxToken {
                parent: self.clone(),
                index: index as u32,
                offset,
                green: green.clone(),
            }),
        })
    }

    fn cached_child(&self, index: usize, offset: TextSize, green: &GreenNode) -> Self {
        self.0.children[index]
            .get_or_init(|| {
                let parent = Some((Arc::downgrade(&self.0), index as u32));
                Box::new(Self(NodeData::new(parent, offset, green.clone())))
            })
            .clone()
    }

    /// Number of logical children, counting each list element separately.
    pub fn child_count(&self) -> usize {
        self.0.green.slots().iter().flatten().map(GreenElement::occupancy).sum()
    }

    /// Logical child `index`, looking through list slots.
    pub fn child(&self, mut index: usize) -> Option<SyntaxElement> {
        for (slot, element) in self.0.green.slots().iter().enumerate() {
            let Some(element) = element else { continue };
            let occupancy = element.occupancy();
            if index >= occupancy {
                index -= occupancy;
                continue;
            }
            let child = self.slot(slot)?;
            return match child {
                NodeOrToken::Node(list) if list.kind().is_list() => list.slot(index),
                child => Some(child),
            };
        }
        None
    }

    pub fn children_with_tokens(&self) -> ChildrenWithTokens {
        ChildrenWithTokens { node: self.clone(), next_slot: 0, list: None }
    }

    pub fn children(&self) -> impl Iterator<Item = Self> + use<> {
        self.children_with_tokens().filter_map(NodeOrToken::into_node)
    }

    pub fn preorder_with_tokens(&self) -> PreorderWithTokens {
        PreorderWithTokens { stack: Vec::with_capacity(32), root: Some(self.clone()) }
    }

    /// Every node and token below this node, in document order, including this node.
    pub fn descendants_with_tokens(&self) -> impl Iterator<Item = SyntaxElement> + use<> {
        self.preorder_with_tokens().filter_map(|event| match event {
            WalkEvent::EnterNode(node) => Some(NodeOrToken::Node(node)),
            WalkEvent::Token(token) => Some(NodeOrToken::Token(token)),
            WalkEvent::LeaveNode(_) => None,
        })
    }

    pub fn descendants(&self) -> impl Iterator<Item = Self> + use<> {
        self.descendants_with_tokens().filter_map(NodeOrToken::into_node)
    }

    pub fn tokens(&self) -> impl Iterator<Item = SyntaxToken> + use<> {
        self.descendants_with_tokens().filter_map(NodeOrToken::into_token)
    }

    pub fn first_token(&self) -> Option<SyntaxToken> {
        (0..self.slot_count()).find_map(|index| match self.slot(index)? {
            NodeOrToken::Node(node) => node.first_token(),
            NodeOrToken::Token(token) => Some(token),
        })
    }

    pub fn last_token(&self) -> Option<SyntaxToken> {
        (0..self.slot_count()).rev().find_map(|index| match self.slot(index)? {
            NodeOrToken::Node(node) => node.last_token(),
            NodeOrToken::Token(token) => Some(token),
        })
    }

    /// Tokens touching `offset`; zero-width tokens are never reported.
    pub fn token_at_offset(&self, offset: TextSize) -> TokenAtOffset<SyntaxToken> {
        let mut found = Vec::with_capacity(2);
        self.collect_tokens_at(offset, &mut found);
        let mut found = found.into_iter();
        match (found.next(), found.next()) {
            (Some(left), Some(right)) => TokenAtOffset::Between(left, right),
            (Some(token), None) => TokenAtOffset::Single(token),
            _ => TokenAtOffset::None,
        }
    }

    fn collect_tokens_at(&self, offset: TextSize, found: &mut Vec<SyntaxToken>) {
        for index in 0..self.slot_count() {
            let Some(child) = self.slot(index) else { continue };
            let range = child.text_range();
            if range.is_empty() || !range.contains_inclusive(offset) {
                continue;
            }
            match child {
                NodeOrToken::Node(node) => node.collect_tokens_at(offset, found),
                NodeOrToken::Token(token) => found.push(token),
            }
        }
    }

    /// Diagnostics attached to this node, with absolute ranges.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.0.green.diagnostics().map_or_else(Vec::new, |diagnostics| {
            diagnostics.iter().map(|it| it.shifted_right(self.offset())).collect()
        })
    }

    pub fn annotations(&self) -> Vec<Annotation> {
        self.0.green.annotations().map_or_else(Vec::new, |it| it.to_vec())
    }

    /// Returns the green root of a tree in which this node is replaced by `replacement`.
    ///
    /// Only the spine from this node to the root is copied; every other subtree
    /// is shared with the current tree.
    pub fn replace_with(&self, replacement: GreenNode) -> GreenNode {
        let mut green = replacement;
        let mut node = self.clone();
        while let Some((parent, index)) = node.raw_parent() {
            green = parent.green().replace_slot(index, Some(green.into()));
            node = parent;
        }
        green
    }
}

impl PartialEq for SyntaxNode {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for SyntaxNode {}

impl Hash for SyntaxNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Arc::as_ptr(&self.0).hash(state);
    }
}

impl fmt::Debug for SyntaxNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{:?}", self.kind(), self.text_range())
    }
}

impl fmt::Display for SyntaxNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

#[derive(Clone)]
pub struct SyntaxToken {
    parent: SyntaxNode,
    index: u32,
    offset: TextSize,
    green: GreenToken,
}

impl SyntaxToken {
    pub fn kind(&self) -> SyntaxKind {
        self.green.kind()
    }

    pub fn text(&self) -> &str {
        self.green.text()
    }

    pub fn green(&self) -> &GreenToken {
        &self.green
    }

    pub fn text_range(&self) -> TextRange {
        TextRange::at(self.offset, self.green.width())
    }

    pub fn is_missing(&self) -> bool {
        self.green.is_missing()
    }

    /// The nearest enclosing non-list node.
    pub fn parent(&self) -> SyntaxNode {
        if self.parent.kind().is_list() {
            if let Some(parent) = self.parent.parent() {
                return parent;
            }
        }
        self.parent.clone()
    }

    pub fn ancestors(&self) -> impl Iterator<Item = SyntaxNode> + use<> {
        self.parent().ancestors()
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.green.diagnostics().map_or_else(Vec::new, |diagnostics| {
            diagnostics.iter().map(|it| it.shifted_right(self.offset)).collect()
        })
    }

    /// Returns the green root of a tree in which this token is replaced by `replacement`.
    pub fn replace_with(&self, replacement: GreenToken) -> GreenNode {
        let parent =
            self.parent.green().replace_slot(self.index as usize, Some(replacement.into()));
        self.parent.replace_with(parent)
    }
}

impl PartialEq for SyntaxToken {
    fn eq(&self, other: &Self) -> bool {
        self.parent == other.parent && self.index == other.index
    }
}

impl Eq for SyntaxToken {}

impl fmt::Debug for SyntaxToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{:?} {:?}", self.kind(), self.text_range(), self.text())
    }
}

impl SyntaxElement {
    pub fn kind(&self) -> SyntaxKind {
        match self {
            NodeOrToken::Node(node) => node.kind(),
            NodeOrToken::Token(token) => token.kind(),
        }
    }

    pub fn text_range(&self) -> TextRange {
        match self {
            NodeOrToken::Node(node) => node.text_range(),
            NodeOrToken::Token(token) => token.text_range(),
        }
    }

    pub fn parent(&self) -> Option<SyntaxNode> {
        match self {
            NodeOrToken::Node(node) => node.parent(),
            NodeOrToken::Token(token) => Some(token.parent()),
        }
    }
}

/// Logical children of a node, looking through list slots.
#[derive(Clone)]
pub struct ChildrenWithTokens {
    node: SyntaxNode,
    next_slot: usize,
    list: Option<(SyntaxNode, usize)>,
}

impl Iterator for ChildrenWithTokens {
    type Item = SyntaxElement;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((list, next)) = &mut self.list {
                if *next < list.slot_count() {
                    let child = list.slot(*next);
                    *next += 1;
                    match child {
                        Some(child) => return Some(child),
                        None => continue,
                    }
                }
                self.list = None;
            }

            if self.next_slot >= self.node.slot_count() {
                return None;
            }
            let child = self.node.slot(self.next_slot);
            self.next_slot += 1;
            match child {
                Some(NodeOrToken::Node(list)) if list.kind().is_list() => self.list = Some((list, 0)),
                Some(child) => return Some(child),
                None => {}
            }
        }
    }
}

/// Preorder traversal over nodes and tokens, looking through list slots.
#[derive(Clone)]
pub struct PreorderWithTokens {
    stack: Vec<(SyntaxNode, ChildrenWithTokens)>,
    root: Option<SyntaxNode>,
}

impl PreorderWithTokens {
    /// Skips the current subtree during traversal.
    pub fn skip_subtree(&mut self) {
        assert!(self.stack.pop().is_some(), "must have a subtree to skip");
    }
}

impl Iterator for PreorderWithTokens {
    type Item = WalkEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let Some((_, active_node)) = self.stack.last_mut() else {
            let root = self.root.take()?;
            self.stack.push((root.clone(), root.children_with_tokens()));
            return Some(WalkEvent::EnterNode(root));
        };
        match active_node.next() {
            Some(NodeOrToken::Node(child)) => {
                self.stack.push((child.clone(), child.children_with_tokens()));
                Some(WalkEvent::EnterNode(child))
            }
            Some(NodeOrToken::Token(child)) => Some(WalkEvent::Token(child)),
            None => {
                let (exited_node, _) = self.stack.pop().expect("should have an exited-from node");
                Some(WalkEvent::LeaveNode(exited_node))
            }
        }
    }
}

/// Preorder walk event including tokens.
#[derive(Clone, Debug)]
pub enum WalkEvent {
    EnterNode(SyntaxNode),
    LeaveNode(SyntaxNode),
    Token(SyntaxToken),
}
