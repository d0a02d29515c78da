use std::fmt;

use razor_errors::Diagnostic;

use crate::{GreenNode, SyntaxKind, SyntaxNode, WalkEvent};

/// A parsed Razor document: a `RAZOR_DOCUMENT` root whose text is exactly the source.
#[derive(Clone)]
pub struct RazorSyntaxTree {
    root: SyntaxNode,
    text: Box<str>,
}

impl RazorSyntaxTree {
    pub fn new(green: GreenNode, text: impl Into<Box<str>>) -> Self {
        let text = text.into();
        debug_assert_eq!(usize::from(green.width()), text.len(), "tree must cover the source");
        debug_assert_eq!(green.kind(), SyntaxKind::RAZOR_DOCUMENT);
        Self { root: SyntaxNode::new_root(green), text }
    }

    pub fn root(&self) -> &SyntaxNode {
        &self.root
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns a tree over the same source with a different green root.
    pub fn with_root(&self, green: GreenNode) -> Self {
        Self::new(green, self.text.clone())
    }

    /// Every diagnostic in the tree with absolute ranges, ordered by position.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        let mut preorder = self.root.preorder_with_tokens();
        while let Some(event) = preorder.next() {
            match event {
                WalkEvent::EnterNode(node) => {
                    if !node.green().contains_diagnostics() {
                        preorder.skip_subtree();
                        continue;
                    }
                    diagnostics.extend(node.diagnostics());
                }
                WalkEvent::Token(token) => diagnostics.extend(token.diagnostics()),
                WalkEvent::LeaveNode(_) => {}
            }
        }
        diagnostics.sort_by_key(|it| it.range().start());
        diagnostics
    }

    pub fn debug_dump(&self) -> String {
        crate::dump::debug_dump(&self.root)
    }
}

impl fmt::Debug for RazorSyntaxTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RazorSyntaxTree").field("text_len", &self.text.len()).finish_non_exhaustive()
    }
}

unsafe impl salsa::Update for RazorSyntaxTree {
    unsafe fn maybe_update(old_pointer: *mut Self, new_value: Self) -> bool {
        let old_value = unsafe { &mut *old_pointer };
        let unchanged = old_value.text == new_value.text
            && old_value.root.green().is_equivalent_to(new_value.root.green())
            && old_value.diagnostics() == new_value.diagnostics();
        if unchanged {
            false
        } else {
            *old_value = new_value;
            true
        }
    }
}
