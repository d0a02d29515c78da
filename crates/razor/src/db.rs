use razor_inputs::File;
use razor_parse::{FileKind, RazorParserOptions};
use razor_syntax::RazorSyntaxTree;
use razor_tag_helpers::{TagHelperDescriptor, TagHelperDocumentContext, rewrite};
use salsa::Database;

/// A file together with everything it is parsed against.
#[salsa::input]
pub struct Document {
    pub file: File,
    #[returns(ref)]
    pub options: RazorParserOptions,
    #[returns(ref)]
    pub descriptors: Vec<TagHelperDescriptor>,
}

#[salsa::tracked(returns(ref), no_eq)]
pub fn parse_document(db: &dyn Database, document: Document) -> RazorSyntaxTree {
    let file = document.file(db);
    log::debug!("parsing `{}`", file.path(db));
    razor_parse::parse(file.text(db), document.options(db))
}

/// The parsed document with its tag helpers bound. Legacy documents pick
/// their tag helpers with `@addTagHelper`; components see every descriptor.
#[salsa::tracked(returns(ref), no_eq)]
pub fn bind_tag_helpers(db: &dyn Database, document: Document) -> RazorSyntaxTree {
    let tree = parse_document(db, document);
    let descriptors = document.descriptors(db);
    if descriptors.is_empty() {
        return tree.clone();
    }

    let options = document.options(db);
    let context = match options.file_kind() {
        FileKind::Legacy => TagHelperDocumentContext::from_tree(tree, descriptors),
        FileKind::Component => TagHelperDocumentContext::new(None, descriptors.iter().cloned()),
    };
    rewrite(tree, &context, options).tree
}

#[cfg(test)]
mod tests {
    use razor_tag_helpers::TagMatchingRule;
    use salsa::{DatabaseImpl, Setter};

    use super::*;

    fn document(db: &DatabaseImpl, path: &str, text: &str, descriptors: Vec<TagHelperDescriptor>) -> Document {
        let file = File::new(db, path.into(), text.into());
        let options = RazorParserOptions::new(file.kind(db));
        Document::new(db, file, options, descriptors)
    }

    #[test]
    fn legacy_documents_bind_only_added_tag_helpers() {
        let db = DatabaseImpl::default();
        let descriptors = vec![TagHelperDescriptor::new("P", "A").with_rule(TagMatchingRule::new("p"))];

        let plain = document(&db, "a.cshtml", "<p></p>", descriptors.clone());
        assert!(!bind_tag_helpers(&db, plain).debug_dump().contains("MARKUP_TAG_HELPER_ELEMENT"));

        let added = document(&db, "b.cshtml", "@addTagHelper *, A\n<p></p>", descriptors.clone());
        assert!(bind_tag_helpers(&db, added).debug_dump().contains("MARKUP_TAG_HELPER_ELEMENT"));

        let component = document(&db, "C.razor", "<p></p>", descriptors);
        assert!(bind_tag_helpers(&db, component).debug_dump().contains("MARKUP_TAG_HELPER_ELEMENT"));
    }

    #[test]
    fn edits_are_reparsed() {
        let mut db = DatabaseImpl::default();
        let document = document(&db, "a.cshtml", "@{", Vec::new());
        assert!(!parse_document(&db, document).diagnostics().is_empty());

        document.file(&db).set_text(&mut db).to("@{ }".into());
        assert!(parse_document(&db, document).diagnostics().is_empty());
    }
}
