use expect_test::expect;
use razor_errors::{DiagnosticId, catalog};
use razor_parse::{FileKind, RazorParserFeatures, RazorParserOptions, parse};
use razor_syntax::SyntaxKind::{self, *};
use razor_syntax::{RazorSyntaxTree, SyntaxNode, TextRange, TextSize};

use crate::annotations::{AttributeBindingKind, AttributeValueStyle, TagHelperAttributeInfo, TagHelperElementInfo, TagMode};
use crate::{
    BoundAttributeDescriptor, RequiredAttribute, RewriteResult, TagHelperDescriptor, TagHelperDocumentContext,
    TagMatchingRule, TagStructure, rewrite,
};

fn rewrite_with(text: &str, options: &RazorParserOptions, descriptors: Vec<TagHelperDescriptor>) -> RewriteResult {
    let tree = parse(text, options);
    let context = TagHelperDocumentContext::new(None, descriptors);
    let result = rewrite(&tree, &context, options);
    assert_eq!(result.tree.root().text(), text);
    assert_eq!(result.tree.root().width(), tree.root().width());
    result
}

fn legacy(text: &str, descriptors: Vec<TagHelperDescriptor>) -> RewriteResult {
    rewrite_with(text, &RazorParserOptions::new(FileKind::Legacy), descriptors)
}

fn ids(result: &RewriteResult) -> Vec<DiagnosticId> {
    result.diagnostics.iter().map(|it| it.id()).collect()
}

fn nodes(tree: &RazorSyntaxTree, kind: SyntaxKind) -> Vec<SyntaxNode> {
    tree.root().descendants().filter(|it| it.kind() == kind).collect()
}

fn element_info(node: &SyntaxNode) -> TagHelperElementInfo {
    let annotations = node.annotations();
    let info = annotations.iter().find_map(|it| it.downcast_ref::<TagHelperElementInfo>());
    info.cloned().unwrap()
}

fn attribute_info(node: &SyntaxNode) -> TagHelperAttributeInfo {
    let annotations = node.annotations();
    let info = annotations.iter().find_map(|it| it.downcast_ref::<TagHelperAttributeInfo>());
    info.cloned().unwrap()
}

fn p_helper(bound: BoundAttributeDescriptor) -> TagHelperDescriptor {
    TagHelperDescriptor::new("PTagHelper", "TestAssembly").with_rule(TagMatchingRule::new("p")).with_bound_attribute(bound)
}

#[test]
fn unbound_required_attribute_stays_plain() {
    let descriptor = TagHelperDescriptor::new("InputTagHelper", "TestAssembly")
        .with_rule(TagMatchingRule::new("input").with_attribute(RequiredAttribute::new("unbound-required")));
    let result = legacy("<input unbound-required />", vec![descriptor]);
    assert!(result.diagnostics.is_empty());

    let elements = nodes(&result.tree, MARKUP_TAG_HELPER_ELEMENT);
    assert_eq!(elements.len(), 1);
    assert_eq!(element_info(&elements[0]).tag_mode, TagMode::SelfClosing);
    assert_eq!(nodes(&result.tree, MARKUP_MINIMIZED_ATTRIBUTE_BLOCK).len(), 1);
    assert!(result.tree.root().descendants().all(|it| !matches!(
        it.kind(),
        MARKUP_TAG_HELPER_ATTRIBUTE | MARKUP_MINIMIZED_TAG_HELPER_ATTRIBUTE
    )));
}

#[test]
fn whitespace_before_code_in_bound_boolean_is_empty() {
    let result = legacy("<p bound='    @true  '/>", vec![p_helper(BoundAttributeDescriptor::new("bound", "System.Boolean"))]);
    assert_eq!(ids(&result), [catalog::EMPTY_BOUND_ATTRIBUTE]);
    assert_eq!(result.tree.diagnostics().iter().map(|it| it.id()).collect::<Vec<_>>(), ids(&result));

    let attributes = nodes(&result.tree, MARKUP_TAG_HELPER_ATTRIBUTE);
    assert_eq!(attributes.len(), 1);
    let info = attribute_info(&attributes[0]);
    assert_eq!(info.value_style, AttributeValueStyle::SingleQuotes);
    assert_eq!(info.kind, AttributeBindingKind::Property);
}

#[test]
fn bound_values() {
    let bool_helper = || vec![p_helper(BoundAttributeDescriptor::new("bound", "bool"))];
    assert!(legacy("<p bound=\"true\"></p>", bool_helper()).diagnostics.is_empty());
    assert!(legacy("<p bound=\"@true\"></p>", bool_helper()).diagnostics.is_empty());
    assert_eq!(ids(&legacy("<p bound=\"\"></p>", bool_helper())), [catalog::EMPTY_BOUND_ATTRIBUTE]);
    assert_eq!(ids(&legacy("<p bound=\"   \"></p>", bool_helper())), [catalog::EMPTY_BOUND_ATTRIBUTE]);

    let string_helper = vec![p_helper(BoundAttributeDescriptor::new("bound", "string"))];
    assert!(legacy("<p bound=\"\"></p>", string_helper).diagnostics.is_empty());
}

#[test]
fn minimized_bound_attributes() {
    let result = legacy("<p bound></p>", vec![p_helper(BoundAttributeDescriptor::new("bound", "System.Boolean"))]);
    assert!(result.diagnostics.is_empty());
    let attributes = nodes(&result.tree, MARKUP_MINIMIZED_TAG_HELPER_ATTRIBUTE);
    assert_eq!(attribute_info(&attributes[0]).value_style, AttributeValueStyle::Minimized);

    let result = legacy("<p bound></p>", vec![p_helper(BoundAttributeDescriptor::new("bound", "System.String"))]);
    assert_eq!(ids(&result), [catalog::EMPTY_BOUND_ATTRIBUTE]);
    assert_eq!(nodes(&result.tree, MARKUP_MINIMIZED_TAG_HELPER_ATTRIBUTE).len(), 1);

    let features = RazorParserFeatures {
        allow_minimized_boolean_tag_helper_attributes: false,
        ..RazorParserFeatures::for_file_kind(FileKind::Legacy)
    };
    let options = RazorParserOptions::new(FileKind::Legacy).with_features(features);
    let result =
        rewrite_with("<p bound></p>", &options, vec![p_helper(BoundAttributeDescriptor::new("bound", "bool"))]);
    assert_eq!(ids(&result), [catalog::EMPTY_BOUND_ATTRIBUTE]);
    assert!(nodes(&result.tree, MARKUP_MINIMIZED_TAG_HELPER_ATTRIBUTE).is_empty());
    assert_eq!(nodes(&result.tree, MARKUP_MINIMIZED_ATTRIBUTE_BLOCK).len(), 1);
}

#[test]
fn indexer_attributes_bind_by_prefix() {
    let descriptor = TagHelperDescriptor::new("AnchorTagHelper", "TestAssembly")
        .with_rule(TagMatchingRule::new("a"))
        .with_bound_attribute(
            BoundAttributeDescriptor::new("asp-all-route-data", "IDictionary<string, string>")
                .with_indexer("asp-route-", "string"),
        );
    let result = legacy("<a asp-route-id=\"1\" href=\"/\">x</a>", vec![descriptor]);
    assert!(result.diagnostics.is_empty());

    let attributes = nodes(&result.tree, MARKUP_TAG_HELPER_ATTRIBUTE);
    assert_eq!(attributes.len(), 1);
    let info = attribute_info(&attributes[0]);
    assert_eq!(&*info.name, "asp-route-id");
    assert_eq!(info.kind, AttributeBindingKind::Indexer);
    assert_eq!(nodes(&result.tree, MARKUP_ATTRIBUTE_BLOCK).len(), 1);
    assert_eq!(nodes(&result.tree, MARKUP_TAG_HELPER_END_TAG).len(), 1);
}

#[test]
fn component_directive_attribute_is_split() {
    let descriptor = TagHelperDescriptor::new("Bind", "Components")
        .with_rule(TagMatchingRule::new("*").with_attribute(RequiredAttribute::prefixed("@bind")))
        .with_bound_attribute(
            BoundAttributeDescriptor::new("@bind", "System.Object").directive().with_parameter("event", "System.String"),
        );
    let options = RazorParserOptions::new(FileKind::Component);
    let result = rewrite_with("<input @bind:event=\"oninput\" />", &options, vec![descriptor]);
    assert!(result.diagnostics.is_empty());

    let attributes = nodes(&result.tree, MARKUP_TAG_HELPER_DIRECTIVE_ATTRIBUTE);
    assert_eq!(attributes.len(), 1);
    let kinds: Vec<_> = attributes[0].children_with_tokens().map(|it| it.kind()).collect();
    assert_eq!(
        kinds,
        [
            MARKUP_TEXT_LITERAL,
            RAZOR_META_CODE,
            MARKUP_TEXT_LITERAL,
            RAZOR_META_CODE,
            MARKUP_TEXT_LITERAL,
            EQUALS,
            MARKUP_TEXT_LITERAL,
            MARKUP_TAG_HELPER_ATTRIBUTE_VALUE,
            MARKUP_TEXT_LITERAL,
        ]
    );
    let info = attribute_info(&attributes[0]);
    assert_eq!((&*info.name, info.parameter.as_deref()), ("@bind", Some("event")));
    assert_eq!(info.kind, AttributeBindingKind::Parameter);
    assert!(info.directive);
}

#[test]
fn conflicting_structures_are_reported() {
    let descriptors = vec![
        TagHelperDescriptor::new("First", "TestAssembly")
            .with_rule(TagMatchingRule::new("input").with_tag_structure(TagStructure::WithoutEndTag)),
        TagHelperDescriptor::new("Second", "TestAssembly")
            .with_rule(TagMatchingRule::new("input").with_tag_structure(TagStructure::NormalOrSelfClosing)),
    ];
    let result = legacy("<input />", descriptors);
    assert_eq!(ids(&result), [catalog::INCONSISTENT_TAG_STRUCTURE]);
    assert_eq!(element_info(&nodes(&result.tree, MARKUP_TAG_HELPER_ELEMENT)[0]).descriptors.len(), 2);
}

#[test]
fn end_tag_of_without_end_tag_helper() {
    let descriptor = || {
        vec![
            TagHelperDescriptor::new("Void", "TestAssembly")
                .with_rule(TagMatchingRule::new("my-tag").with_tag_structure(TagStructure::WithoutEndTag)),
            TagHelperDescriptor::new("Input", "TestAssembly")
                .with_rule(TagMatchingRule::new("input").with_tag_structure(TagStructure::WithoutEndTag)),
        ]
    };

    let result = legacy("<my-tag>text</my-tag>", descriptor());
    assert_eq!(ids(&result), [catalog::END_TAG_FOR_WITHOUT_END_TAG_HELPER]);
    let element = &nodes(&result.tree, MARKUP_TAG_HELPER_ELEMENT)[0];
    assert_eq!(element.text(), "<my-tag>");
    assert_eq!(element_info(element).tag_mode, TagMode::StartTagOnly);
    let stray = nodes(&result.tree, MARKUP_ELEMENT);
    assert_eq!(stray.iter().map(SyntaxNode::text).collect::<Vec<_>>(), ["</my-tag>"]);

    let result = legacy("<input></input>", descriptor());
    assert_eq!(ids(&result), [catalog::END_TAG_FOR_WITHOUT_END_TAG_HELPER]);
    assert_eq!(element_info(&nodes(&result.tree, MARKUP_TAG_HELPER_ELEMENT)[0]).tag_mode, TagMode::StartTagOnly);
}

#[test]
fn unclosed_tag_helper_is_malformed() {
    let result = legacy("<div><p></div>", vec![TagHelperDescriptor::new("P", "A").with_rule(TagMatchingRule::new("p"))]);
    assert_eq!(ids(&result), [catalog::MALFORMED_TAG_HELPER]);
    assert_eq!(result.diagnostics[0].range(), TextRange::new(TextSize::new(6), TextSize::new(7)));
}

#[test]
fn child_tags_are_restricted() {
    let descriptor = TagHelperDescriptor::new("List", "A").with_rule(TagMatchingRule::new("ul")).with_allowed_child_tag("li");
    let result = legacy("<ul><li>a</li><p>b</p></ul><p>c</p>", vec![descriptor]);
    assert_eq!(ids(&result), [catalog::INVALID_TAG_HELPER_CHILD]);
    assert_eq!(result.diagnostics[0].range(), TextRange::new(TextSize::new(15), TextSize::new(16)));
}

#[test]
fn prefix_and_opt_out() {
    let text = "@addTagHelper *, A\n@tagHelperPrefix \"th:\"\n<th:p></th:p><p></p><!th:p></!th:p>";
    let options = RazorParserOptions::new(FileKind::Legacy);
    let tree = parse(text, &options);
    let descriptors = [TagHelperDescriptor::new("P", "A").with_rule(TagMatchingRule::new("p"))];
    let context = TagHelperDocumentContext::from_tree(&tree, &descriptors);
    let result = rewrite(&tree, &context, &options);

    let elements = nodes(&result.tree, MARKUP_TAG_HELPER_ELEMENT);
    assert_eq!(elements.iter().map(SyntaxNode::text).collect::<Vec<_>>(), ["<th:p></th:p>"]);
    assert_eq!(&*element_info(&elements[0]).tag_name, "p");
}

#[test]
fn nested_elements_see_their_parent() {
    let descriptor = TagHelperDescriptor::new("Item", "A").with_rule(TagMatchingRule::new("li").with_parent_tag("ul"));
    let result = legacy("<ul><li>a</li></ul><ol><li>b</li></ol>", vec![descriptor]);
    let elements = nodes(&result.tree, MARKUP_TAG_HELPER_ELEMENT);
    assert_eq!(elements.iter().map(SyntaxNode::text).collect::<Vec<_>>(), ["<li>a</li>"]);
}

#[test]
fn annotation_payloads() {
    let descriptor = TagHelperDescriptor::new("AnchorTagHelper", "TestAssembly")
        .with_rule(TagMatchingRule::new("a"))
        .with_bound_attribute(BoundAttributeDescriptor::new("href", "string").with_indexer("asp-route-", "string"));
    let result = legacy("<a href='/' asp-route-id=1>x</a>", vec![descriptor]);

    let element = &nodes(&result.tree, MARKUP_TAG_HELPER_ELEMENT)[0];
    expect!["{a;StartTagAndEndTag;AnchorTagHelper}"].assert_eq(&format!("{:?}", element_info(element)));

    let attributes: Vec<_> = nodes(&result.tree, MARKUP_TAG_HELPER_ATTRIBUTE)
        .iter()
        .map(|it| format!("{:?}", attribute_info(it)))
        .collect();
    expect![[r#"
        [
            "{href;Property;SingleQuotes}",
            "{asp-route-id;Indexer;NoQuotes}",
        ]
    "#]]
    .assert_debug_eq(&attributes);
}

#[test]
fn rewriting_preserves_width_and_shares_untouched_subtrees() {
    let descriptors = || {
        vec![
            TagHelperDescriptor::new("Any", "A").with_rule(TagMatchingRule::new("*").with_attribute(RequiredAttribute::new("th"))),
            p_helper(BoundAttributeDescriptor::new("bound", "bool")),
        ]
    };
    let inputs = [
        "",
        "<p>",
        "<p bound>",
        "<p bound=",
        "<p th='@x' bound=\"@(y)\">text @z</p>",
        "@{ <p bound=\"true\"><span th>@x</span></p> }",
        "<div th><p bound='  '><b th /></div></p>",
        "@section Foo { <p></p> }",
    ];
    for input in inputs {
        legacy(input, descriptors());
    }

    let result = legacy("<div>untouched</div><p></p>", descriptors());
    let tree = parse("<div>untouched</div><p></p>", &RazorParserOptions::new(FileKind::Legacy));
    assert!(!tree.root().green().is_equivalent_to(result.tree.root().green()));
    assert_eq!(nodes(&result.tree, MARKUP_TAG_HELPER_ELEMENT).len(), 1);
}

#[test]
fn rewrite_that_changes_the_width_is_rejected() {
    let options = RazorParserOptions::new(FileKind::Legacy);
    let tree = parse("<p>x</p>", &options);
    let shorter = parse("<p></p>", &options);
    assert!(!crate::rewriter::keeps_width(&tree, shorter.root().green()));
    assert!(crate::rewriter::keeps_width(&tree, tree.root().green()));
}
