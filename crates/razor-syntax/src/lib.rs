//! Full-fidelity syntax tree for Razor documents.
//!
//! The tree has two layers. Green nodes are immutable, shareable and carry
//! only kind, width and children. Red nodes wrap green nodes with absolute
//! offsets and parent links and are materialized lazily while navigating.
//! Diagnostics and annotations live outside both layers, in side tables keyed
//! by green identity, so attaching one never disturbs structural sharing.

mod annotation;
mod builder;
mod dump;
mod green;
mod red;
mod side_table;
mod syntax;
mod syntax_kind;
mod syntax_set;
mod tree;

pub use annotation::Annotation;
pub use builder::GreenBuilder;
pub use green::{GreenElement, GreenNode, GreenToken};
pub use red::{ChildrenWithTokens, PreorderWithTokens, SyntaxElement, SyntaxNode, SyntaxToken, WalkEvent};
pub use syntax::{NodeOrToken, TokenAtOffset};
pub use syntax_kind::SyntaxKind;
pub use syntax_set::SyntaxSet;
pub use text_size::{TextRange, TextSize};
pub use tree::RazorSyntaxTree;
