use std::sync::Arc;

use razor_parse::{ADD_TAG_HELPER, DirectiveInfo, REMOVE_TAG_HELPER, TAG_HELPER_PREFIX, annotations};
use razor_syntax::{RazorSyntaxTree, SyntaxKind, SyntaxNode};

use crate::binder::TagHelperBinder;
use crate::descriptor::TagHelperDescriptor;

/// The tag helpers in scope for one document and the prefix their tags carry.
#[derive(Clone, Debug, Default)]
pub struct TagHelperDocumentContext {
    prefix: Option<Box<str>>,
    descriptors: Vec<Arc<TagHelperDescriptor>>,
}

impl TagHelperDocumentContext {
    pub fn new(prefix: Option<&str>, descriptors: impl IntoIterator<Item = TagHelperDescriptor>) -> Self {
        Self { prefix: prefix.map(Box::from), descriptors: descriptors.into_iter().map(Arc::new).collect() }
    }

    /// Applies the document's `@addTagHelper`, `@removeTagHelper` and
    /// `@tagHelperPrefix` directives, in order, to `descriptors`.
    pub fn from_tree(tree: &RazorSyntaxTree, descriptors: &[TagHelperDescriptor]) -> Self {
        let mut prefix = None;
        let mut in_scope = vec![false; descriptors.len()];

        for directive in tree.root().descendants().filter(|it| it.kind() == SyntaxKind::RAZOR_DIRECTIVE) {
            let Some(name) = directive_name(&directive) else { continue };
            let Some(value) = directive_value(&directive) else { continue };

            match &*name {
                TAG_HELPER_PREFIX => {
                    if prefix.is_none() {
                        prefix = Some(value);
                    }
                }
                ADD_TAG_HELPER | REMOVE_TAG_HELPER => {
                    let Some(lookup) = LookupText::parse(&value) else { continue };
                    let add = &*name == ADD_TAG_HELPER;
                    for (descriptor, in_scope) in descriptors.iter().zip(&mut in_scope) {
                        if lookup.matches(descriptor) {
                            *in_scope = add;
                        }
                    }
                    log::trace!("@{name} {value}");
                }
                _ => {}
            }
        }

        let descriptors = descriptors.iter().zip(in_scope).filter(|(_, it)| *it).map(|(d, _)| Arc::new(d.clone()));
        Self { prefix: prefix.map(String::into_boxed_str), descriptors: descriptors.collect() }
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn descriptors(&self) -> &[Arc<TagHelperDescriptor>] {
        &self.descriptors
    }

    pub fn binder(&self) -> TagHelperBinder {
        TagHelperBinder::new(self.prefix(), self.descriptors.iter().cloned())
    }
}

fn directive_name(directive: &SyntaxNode) -> Option<Box<str>> {
    directive.annotations().iter().find(|it| it.kind() == annotations::DIRECTIVE).and_then(|annotation| {
        annotation.downcast_ref::<DirectiveInfo>().map(|info| info.name.clone())
    })
}

/// The unquoted value of a tag helper directive, taken from the statement
/// literal of its code block.
fn directive_value(directive: &SyntaxNode) -> Option<String> {
    let literal = directive.descendants().find(|it| it.kind() == SyntaxKind::CSHARP_STATEMENT_LITERAL)?;
    let text = literal.text();
    let text = text.trim();
    let text = text.strip_prefix('"').unwrap_or(text);
    let text = text.strip_suffix('"').unwrap_or(text).trim();
    (!text.is_empty()).then(|| text.to_owned())
}

/// `typePattern, assemblyName` of `@addTagHelper` and `@removeTagHelper`.
struct LookupText<'a> {
    type_pattern: &'a str,
    assembly: &'a str,
}

impl<'a> LookupText<'a> {
    fn parse(text: &'a str) -> Option<Self> {
        let (type_pattern, assembly) = text.split_once(',')?;
        let (type_pattern, assembly) = (type_pattern.trim(), assembly.trim());
        if type_pattern.is_empty() || assembly.is_empty() || assembly.contains(',') {
            return None;
        }
        Some(Self { type_pattern, assembly })
    }

    fn matches(&self, descriptor: &TagHelperDescriptor) -> bool {
        if !descriptor.assembly_name.eq_ignore_ascii_case(self.assembly) {
            return false;
        }
        match self.type_pattern.strip_suffix('*') {
            Some(prefix) => descriptor.type_name.starts_with(prefix),
            None => descriptor.type_name == self.type_pattern,
        }
    }
}

#[cfg(test)]
mod tests {
    use razor_parse::{FileKind, RazorParserOptions, parse};

    use super::*;

    fn descriptors() -> Vec<TagHelperDescriptor> {
        vec![
            TagHelperDescriptor::new("Forms.InputTagHelper", "Forms"),
            TagHelperDescriptor::new("Forms.FormTagHelper", "Forms"),
            TagHelperDescriptor::new("Other.PTagHelper", "Other"),
        ]
    }

    fn in_scope(text: &str) -> (Option<String>, Vec<String>) {
        let tree = parse(text, &RazorParserOptions::new(FileKind::Legacy));
        let context = TagHelperDocumentContext::from_tree(&tree, &descriptors());
        let names = context.descriptors().iter().map(|it| it.name.clone()).collect();
        (context.prefix().map(str::to_owned), names)
    }

    #[test]
    fn directives_apply_in_order() {
        let (prefix, names) = in_scope("@addTagHelper *, Forms\n@removeTagHelper Forms.FormTagHelper, Forms\n");
        assert_eq!(prefix, None);
        assert_eq!(names, ["Forms.InputTagHelper"]);

        let (_, names) = in_scope("@addTagHelper \"Forms.Form*, Forms\"\n@addTagHelper Other.PTagHelper, Other\n");
        assert_eq!(names, ["Forms.FormTagHelper", "Other.PTagHelper"]);
    }

    #[test]
    fn no_directives_means_no_tag_helpers() {
        let (_, names) = in_scope("<input />");
        assert!(names.is_empty());
    }

    #[test]
    fn malformed_lookup_text_is_ignored() {
        let (_, names) = in_scope("@addTagHelper Forms\n@addTagHelper *, Other\n");
        assert_eq!(names, ["Other.PTagHelper"]);
    }

    #[test]
    fn first_prefix_wins() {
        let (prefix, _) = in_scope("@tagHelperPrefix \"th:\"\n@tagHelperPrefix \"x:\"\n");
        assert_eq!(prefix.as_deref(), Some("th:"));
    }
}
