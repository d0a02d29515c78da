//! Immutable, position-independent syntax tree.
//!
//! Green nodes know their kind, width and children but not their absolute
//! position or parent, so identical subtrees can be shared between trees.
//! Every node kind has a fixed number of nullable slots; variable-length runs
//! of children live in a [`SyntaxKind::LIST`] node occupying one slot.

use std::fmt;
use std::sync::Arc as StdArc;

use razor_errors::Diagnostic;
use text_size::TextSize;
use triomphe::Arc;

use crate::side_table::{ANNOTATIONS, DIAGNOSTICS};
use crate::{Annotation, NodeOrToken, SyntaxKind};

pub type GreenElement = NodeOrToken<GreenNode, GreenToken>;

#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct Flags(u8);

impl Flags {
    pub(crate) const CONTAINS_DIAGNOSTICS: Self = Self(1);
    pub(crate) const IS_MISSING: Self = Self(1 << 1);
    pub(crate) const HAS_DIAGNOSTICS: Self = Self(1 << 2);
    pub(crate) const HAS_ANNOTATIONS: Self = Self(1 << 3);
    pub(crate) const CONTAINS_ANNOTATIONS: Self = Self(1 << 4);

    const INHERITED: Self = Self(Self::CONTAINS_DIAGNOSTICS.0 | Self::CONTAINS_ANNOTATIONS.0);

    pub(crate) const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    const fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    const fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }
}

#[derive(Clone)]
pub struct GreenNode(Arc<GreenNodeData>);

pub(crate) struct GreenNodeData {
    kind: SyntaxKind,
    flags: Flags,
    width: TextSize,
    slots: Box<[Option<GreenElement>]>,
}

impl Drop for GreenNodeData {
    fn drop(&mut self) {
        let key = self as *const Self as usize;
        if self.flags.contains(Flags::HAS_DIAGNOSTICS) {
            DIAGNOSTICS.remove(key);
        }
        if self.flags.contains(Flags::HAS_ANNOTATIONS) {
            ANNOTATIONS.remove(key);
        }
    }
}

impl GreenNode {
    pub fn new(kind: SyntaxKind, slots: impl IntoIterator<Item = Option<GreenElement>>) -> Self {
        let slots: Box<[_]> = slots.into_iter().collect();
        debug_assert!(kind.is_node(), "{kind:?} is not a node kind");
        Self::from_parts(kind, Flags::default(), slots)
    }

    /// Builds a list node, or `None` when there is nothing to hold.
    pub fn new_list(children: impl IntoIterator<Item = GreenElement>) -> Option<Self> {
        let slots: Box<[_]> = children.into_iter().map(Some).collect();
        (!slots.is_empty()).then(|| Self::from_parts(SyntaxKind::LIST, Flags::default(), slots))
    }

    fn from_parts(kind: SyntaxKind, own: Flags, slots: Box<[Option<GreenElement>]>) -> Self {
        let mut width = TextSize::new(0);
        let mut flags = own;
        for slot in slots.iter().flatten() {
            width += slot.width();
            flags = flags.union(slot.flags().intersection(Flags::INHERITED));
        }
        if own.contains(Flags::HAS_DIAGNOSTICS) {
            flags = flags.union(Flags::CONTAINS_DIAGNOSTICS);
        }
        if own.contains(Flags::HAS_ANNOTATIONS) {
            flags = flags.union(Flags::CONTAINS_ANNOTATIONS);
        }
        Self(Arc::new(GreenNodeData { kind, flags, width, slots }))
    }

    pub(crate) fn key(&self) -> usize {
        &*self.0 as *const GreenNodeData as usize
    }

    pub fn kind(&self) -> SyntaxKind {
        self.0.kind
    }

    pub fn width(&self) -> TextSize {
        self.0.width
    }

    pub(crate) fn flags(&self) -> Flags {
        self.0.flags
    }

    pub fn slots(&self) -> &[Option<GreenElement>] {
        &self.0.slots
    }

    pub fn slot_count(&self) -> usize {
        self.0.slots.len()
    }

    pub fn slot(&self, index: usize) -> Option<&GreenElement> {
        self.0.slots.get(index)?.as_ref()
    }

    /// Offset of slot `index` relative to the start of this node.
    pub fn slot_offset(&self, index: usize) -> TextSize {
        self.0.slots[..index].iter().flatten().map(GreenElement::width).sum()
    }

    pub fn contains_diagnostics(&self) -> bool {
        self.0.flags.contains(Flags::CONTAINS_DIAGNOSTICS)
    }

    pub fn contains_annotations(&self) -> bool {
        self.0.flags.contains(Flags::CONTAINS_ANNOTATIONS)
    }

    /// Diagnostics attached to this node, with node-relative ranges.
    pub fn diagnostics(&self) -> Option<StdArc<[Diagnostic]>> {
        if !self.0.flags.contains(Flags::HAS_DIAGNOSTICS) {
            return None;
        }
        DIAGNOSTICS.get(self.key())
    }

    pub fn annotations(&self) -> Option<StdArc<[Annotation]>> {
        if !self.0.flags.contains(Flags::HAS_ANNOTATIONS) {
            return None;
        }
        ANNOTATIONS.get(self.key())
    }

    /// Returns a copy of this node whose diagnostics are replaced by `diagnostics`.
    ///
    /// Ranges are relative to the start of the node. Children are shared.
    pub fn with_diagnostics(&self, diagnostics: Vec<Diagnostic>) -> Self {
        let annotations = self.annotations();
        let node = Self::rebuild(self.kind(), self.slots().into(), !diagnostics.is_empty(), annotations.is_some());
        if !diagnostics.is_empty() {
            DIAGNOSTICS.insert(node.key(), diagnostics.into());
        }
        if let Some(annotations) = annotations {
            ANNOTATIONS.insert(node.key(), annotations);
        }
        node
    }

    /// Returns a copy of this node whose annotations are replaced by `annotations`.
    pub fn with_annotations(&self, annotations: Vec<Annotation>) -> Self {
        let diagnostics = self.diagnostics();
        let node = Self::rebuild(self.kind(), self.slots().into(), diagnostics.is_some(), !annotations.is_empty());
        if let Some(diagnostics) = diagnostics {
            DIAGNOSTICS.insert(node.key(), diagnostics);
        }
        if !annotations.is_empty() {
            ANNOTATIONS.insert(node.key(), annotations.into());
        }
        node
    }

    /// Returns a copy of this node with slot `index` replaced.
    ///
    /// Diagnostics and annotations of this node carry over.
    pub fn replace_slot(&self, index: usize, element: Option<GreenElement>) -> Self {
        let mut slots: Vec<_> = self.slots().into();
        slots[index] = element;
        self.reshaped(self.kind(), slots)
    }

    /// Returns a node of `kind` over `slots` that keeps the diagnostics and
    /// annotations of this node.
    pub fn reshaped(&self, kind: SyntaxKind, slots: impl IntoIterator<Item = Option<GreenElement>>) -> Self {
        let diagnostics = self.diagnostics();
        let annotations = self.annotations();
        let node = Self::rebuild(kind, slots.into_iter().collect(), diagnostics.is_some(), annotations.is_some());
        if let Some(diagnostics) = diagnostics {
            DIAGNOSTICS.insert(node.key(), diagnostics);
        }
        if let Some(annotations) = annotations {
            ANNOTATIONS.insert(node.key(), annotations);
        }
        node
    }

    fn rebuild(kind: SyntaxKind, slots: Box<[Option<GreenElement>]>, diagnostics: bool, annotations: bool) -> Self {
        let mut own = Flags::default();
        if diagnostics {
            own = own.union(Flags::HAS_DIAGNOSTICS);
        }
        if annotations {
            own = own.union(Flags::HAS_ANNOTATIONS);
        }
        Self::from_parts(kind, own, slots)
    }

    /// Number of logical children this node contributes when it sits in a slot.
    pub fn occupancy(&self) -> usize {
        if self.kind().is_list() { self.slot_count() } else { 1 }
    }

    pub fn text(&self) -> String {
        let mut text = String::with_capacity(self.width().into());
        self.write_text(&mut text);
        text
    }

    pub(crate) fn write_text(&self, out: &mut String) {
        for slot in self.slots().iter().flatten() {
            match slot {
                NodeOrToken::Node(node) => node.write_text(out),
                NodeOrToken::Token(token) => out.push_str(token.text()),
            }
        }
    }

    /// Structural equality: kinds, widths and token texts, ignoring diagnostics
    /// and annotations. A single-element list is equivalent to its element.
    pub fn is_equivalent_to(&self, other: &Self) -> bool {
        if Arc::ptr_eq(&self.0, &other.0) {
            return true;
        }
        match (through_lists(self), through_lists(other)) {
            (NodeOrToken::Node(lhs), NodeOrToken::Node(rhs)) => lhs.same_shape(rhs),
            (NodeOrToken::Token(lhs), NodeOrToken::Token(rhs)) => lhs.is_equivalent_to(rhs),
            _ => false,
        }
    }

    fn same_shape(&self, other: &Self) -> bool {
        self.kind() == other.kind()
            && self.width() == other.width()
            && self.slot_count() == other.slot_count()
            && self.slots().iter().zip(other.slots()).all(|pair| match pair {
                (None, None) => true,
                (Some(lhs), Some(rhs)) => lhs.is_equivalent_to(rhs),
                _ => false,
            })
    }
}

/// The element a chain of single-element lists stands for.
fn through_lists(node: &GreenNode) -> NodeOrToken<&GreenNode, &GreenToken> {
    let mut node = node;
    while node.kind().is_list() && node.slot_count() == 1 {
        match node.slot(0) {
            Some(NodeOrToken::Node(child)) => node = child,
            Some(NodeOrToken::Token(token)) => return NodeOrToken::Token(token),
            None => break,
        }
    }
    NodeOrToken::Node(node)
}

impl fmt::Debug for GreenNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GreenNode")
            .field("kind", &self.kind())
            .field("width", &self.width())
            .field("slots", &self.slot_count())
            .finish()
    }
}

#[derive(Clone)]
pub struct GreenToken(Arc<GreenTokenData>);

pub(crate) struct GreenTokenData {
    kind: SyntaxKind,
    flags: Flags,
    text: Box<str>,
}

impl Drop for GreenTokenData {
    fn drop(&mut self) {
        if self.flags.contains(Flags::HAS_DIAGNOSTICS) {
            DIAGNOSTICS.remove(self as *const Self as usize);
        }
    }
}

impl GreenToken {
    pub fn new(kind: SyntaxKind, text: &str) -> Self {
        debug_assert!(kind.is_token(), "{kind:?} is not a token kind");
        Self(Arc::new(GreenTokenData { kind, flags: Flags::default(), text: text.into() }))
    }

    /// Zero-width placeholder for a token the grammar required but the source lacks.
    pub fn missing(kind: SyntaxKind) -> Self {
        Self(Arc::new(GreenTokenData { kind, flags: Flags::IS_MISSING, text: "".into() }))
    }

    pub(crate) fn key(&self) -> usize {
        &*self.0 as *const GreenTokenData as usize
    }

    pub fn kind(&self) -> SyntaxKind {
        self.0.kind
    }

    pub fn text(&self) -> &str {
        &self.0.text
    }

    pub fn width(&self) -> TextSize {
        TextSize::of(&*self.0.text)
    }

    pub fn is_equivalent_to(&self, other: &Self) -> bool {
        self.kind() == other.kind() && self.text() == other.text()
    }

    pub(crate) fn flags(&self) -> Flags {
        self.0.flags
    }

    pub fn is_missing(&self) -> bool {
        self.0.flags.contains(Flags::IS_MISSING)
    }

    pub fn diagnostics(&self) -> Option<StdArc<[Diagnostic]>> {
        if !self.0.flags.contains(Flags::HAS_DIAGNOSTICS) {
            return None;
        }
        DIAGNOSTICS.get(self.key())
    }

    pub fn with_diagnostics(&self, diagnostics: Vec<Diagnostic>) -> Self {
        let mut flags = self.0.flags.without(Flags::HAS_DIAGNOSTICS.union(Flags::CONTAINS_DIAGNOSTICS));
        if !diagnostics.is_empty() {
            flags = flags.union(Flags::HAS_DIAGNOSTICS).union(Flags::CONTAINS_DIAGNOSTICS);
        }
        let token =
            Self(Arc::new(GreenTokenData { kind: self.kind(), flags, text: self.0.text.clone() }));
        if !diagnostics.is_empty() {
            DIAGNOSTICS.insert(token.key(), diagnostics.into());
        }
        token
    }
}

impl fmt::Debug for GreenToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GreenToken").field("kind", &self.kind()).field("text", &self.text()).finish()
    }
}

impl GreenElement {
    pub fn kind(&self) -> SyntaxKind {
        match self {
            NodeOrToken::Node(node) => node.kind(),
            NodeOrToken::Token(token) => token.kind(),
        }
    }

    pub fn width(&self) -> TextSize {
        match self {
            NodeOrToken::Node(node) => node.width(),
            NodeOrToken::Token(token) => token.width(),
        }
    }

    pub(crate) fn flags(&self) -> Flags {
        match self {
            NodeOrToken::Node(node) => node.flags(),
            NodeOrToken::Token(token) => token.flags(),
        }
    }

    pub fn occupancy(&self) -> usize {
        match self {
            NodeOrToken::Node(node) => node.occupancy(),
            NodeOrToken::Token(_) => 1,
        }
    }

    pub fn is_equivalent_to(&self, other: &Self) -> bool {
        match (self, other) {
            (NodeOrToken::Node(lhs), NodeOrToken::Node(rhs)) => lhs.is_equivalent_to(rhs),
            (NodeOrToken::Token(lhs), NodeOrToken::Token(rhs)) => lhs.is_equivalent_to(rhs),
            (NodeOrToken::Node(node), NodeOrToken::Token(token))
            | (NodeOrToken::Token(token), NodeOrToken::Node(node)) => {
                matches!(through_lists(node), NodeOrToken::Token(inner) if inner.is_equivalent_to(token))
            }
        }
    }
}

impl From<GreenNode> for GreenElement {
    fn from(node: GreenNode) -> Self {
        NodeOrToken::Node(node)
    }
}

impl From<GreenToken> for GreenElement {
    fn from(token: GreenToken) -> Self {
        NodeOrToken::Token(token)
    }
}
