//! Binds markup elements and attributes to tag helper descriptors.
//!
//! [`TagHelperDocumentContext`] decides which descriptors are in scope for a
//! document, [`TagHelperBinder`] matches them against individual elements, and
//! [`rewrite`] produces a tree in which bound elements and attributes have tag
//! helper kinds and carry [`annotations`] describing the binding.

pub mod annotations;
mod binder;
mod descriptor;
mod document_context;
mod rewriter;
#[cfg(test)]
mod tests;

pub use binder::{TagHelperBinder, TagHelperBinding};
pub use descriptor::{
    BoundAttributeDescriptor, BoundAttributeParameterDescriptor, CATCH_ALL_TAG, NameComparison, RequiredAttribute,
    TagHelperDescriptor, TagMatchingRule, TagStructure, ValueComparison, descriptors_from_json,
};
pub use document_context::TagHelperDocumentContext;
pub use rewriter::{RewriteResult, rewrite};
