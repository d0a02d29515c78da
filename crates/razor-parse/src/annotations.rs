//! Payloads the parser attaches to nodes for the lowering stage.

/// Marks the start and end tags of a `<text>` element inside code: the tags
/// switch to markup and produce no output themselves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MarkupTransitionTag;

/// `@using Some.Namespace` at markup level.
#[derive(Clone, PartialEq, Eq)]
pub struct UsingDirective {
    pub namespace: Box<str>,
}

impl std::fmt::Debug for UsingDirective {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{{}}}", self.namespace)
    }
}

pub const DIRECTIVE: &str = "Directive";
pub const TRANSITION: &str = "Transition";
pub const USING: &str = "Using";
