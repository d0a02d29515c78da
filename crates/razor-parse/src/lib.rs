//! Recursive-descent parser for Razor documents.
//!
//! The parser drives three tokenizers (markup, C# and razor comments) and
//! switches between them at transitions. It records start/token/finish events
//! that are replayed into a green tree once the whole document is consumed, so
//! every input yields a complete tree covering the full source text.

pub mod annotations;
mod directives;
mod grammar;
mod options;
mod parser;
#[cfg(test)]
mod tests;

pub use directives::{
    ADD_TAG_HELPER, DirectiveDescriptor, DirectiveInfo, DirectiveKind, DirectiveTokenDescriptor, DirectiveTokenKind,
    DirectiveUsage, REMOVE_TAG_HELPER, TAG_HELPER_PREFIX, default_directives,
};
pub use grammar::is_void_element;
pub use options::{DEFAULT_MAX_NESTING_DEPTH, FileKind, ParseFileKindError, RazorParserFeatures, RazorParserOptions};
use razor_syntax::RazorSyntaxTree;
pub use razor_tokenizer::CSharpLanguageVersion;

pub fn parse(text: &str, options: &RazorParserOptions) -> RazorSyntaxTree {
    log::debug!("parsing {} bytes as {:?}", text.len(), options.file_kind());
    let mut parser = parser::Parser::new(text, options);
    grammar::document(&mut parser);
    let tree = parser.build_tree();
    log::trace!("parsed with {} diagnostics", tree.diagnostics().len());
    tree
}
