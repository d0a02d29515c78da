use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use expect_test::expect_file;
use razor_errors::{DiagnosticId, catalog};
use razor_syntax::{RazorSyntaxTree, SyntaxKind, TextSize};

use crate::{FileKind, RazorParserFeatures, RazorParserOptions, parse};

#[derive(PartialEq, Eq, PartialOrd, Ord)]
struct TestCase {
    input: PathBuf,
    expected: PathBuf,
    text: String,
}

impl TestCase {
    fn list() -> Vec<Self> {
        let test_data_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("test_data");

        let mut cases = fs::read_dir(&test_data_dir)
            .unwrap_or_else(|err| panic!("Cannot read directory {}: {err}", test_data_dir.display()))
            .filter_map(|entry| {
                let path = entry.ok()?.path();
                if path.extension()? == "cshtml" {
                    let expected = path.with_extension("txt");
                    let text = fs::read_to_string(&path).ok()?;
                    Some(Self { input: path, expected, text })
                } else {
                    None
                }
            })
            .collect::<Vec<_>>();

        cases.sort();
        cases
    }
}

fn dump(tree: &RazorSyntaxTree) -> String {
    let mut out = tree.debug_dump();
    out.push_str("Errors:\n");
    for diagnostic in tree.diagnostics() {
        let range = diagnostic.range();
        let _ = writeln!(
            out,
            "  {} [{}..{})",
            diagnostic.id(),
            u32::from(range.start()),
            u32::from(range.end())
        );
    }
    out
}

fn ids(tree: &RazorSyntaxTree) -> Vec<DiagnosticId> {
    tree.diagnostics().iter().map(|it| it.id()).collect()
}

fn legacy(text: &str) -> RazorSyntaxTree {
    parse(text, &RazorParserOptions::new(FileKind::Legacy))
}

#[test]
fn parse_test_data() {
    let options = RazorParserOptions::new(FileKind::Legacy);
    for case in TestCase::list() {
        let tree = parse(&case.text, &options);
        expect_file![&case.expected].assert_eq(&dump(&tree));
    }
}

#[test]
fn implicit_expression_between_text() {
    let tree = legacy("foo @bar baz");
    assert_eq!(tree.root().width(), TextSize::new(12));
    assert!(tree.diagnostics().is_empty());
    let expression = tree.root().descendants().find(|it| it.kind() == SyntaxKind::CSHARP_EXPRESSION_LITERAL);
    assert_eq!(expression.map(|it| it.text()), Some("bar".to_owned()));
}

#[test]
fn unterminated_statement_block_still_yields_a_tree() {
    let tree = legacy("@{");
    assert_eq!(tree.root().text(), "@{");
    assert_eq!(ids(&tree), [catalog::EXPECTED_BLOCK_END]);
}

#[test]
fn duplicate_tag_helper_prefix_is_reported_on_second_occurrence() {
    let text = "@tagHelperPrefix \"th:\"\n@tagHelperPrefix \"th\"";
    let tree = legacy(text);
    let diagnostics = tree.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].id(), catalog::DUPLICATE_DIRECTIVE);

    let second = TextSize::try_from(text.rfind('@').unwrap()).unwrap();
    assert_eq!(diagnostics[0].range().start(), second);
}

#[test]
fn escaped_transition_never_enters_code() {
    let tree = legacy("a@@b");
    assert!(tree.diagnostics().is_empty());
    assert!(tree.root().descendants().all(|it| it.kind() != SyntaxKind::CSHARP_CODE_BLOCK));
    let ephemeral = tree.root().descendants().filter(|it| it.kind() == SyntaxKind::MARKUP_EPHEMERAL_TEXT_LITERAL);
    assert_eq!(ephemeral.count(), 1);
}

#[test]
fn email_address_is_text() {
    let tree = legacy("<p>mail me at someone@example.com</p>");
    assert!(tree.diagnostics().is_empty());
    assert!(tree.root().descendants().all(|it| it.kind() != SyntaxKind::CSHARP_CODE_BLOCK));
}

#[test]
fn full_fidelity_on_malformed_input() {
    let inputs = [
        "",
        "@",
        "@ foo",
        "@!",
        "@(foo",
        "@* never closed",
        "@{ if (x) { <p>",
        "<div><span></div>",
        "</p>",
        "<p class=\"@(a\">",
        "<p class='x' @* c *@ disabled data-x=y/>",
        "@section Scripts { <p>",
        "@functions { void F() { }",
        "@if (a) { } else if (b) { } else { <p>x</p> }",
        "@try { } catch (Exception e) when (e != null) { } finally { }",
        "@do { } while (x);",
        "@{ #if DEBUG\n }",
        "@{ var s = \"abc\n }",
        "@{ /* open",
        "<script>var a = '<p>'; @x</script>",
        "@Html.Raw(\"x\")?.Foo![0]?[1]",
        "@{ <text>hi</text> }",
        "@{ @:line @x\n }",
        "@{ Func<int, object> t = @<p>@item</p>; }",
        "<!-- @x --> <!DOCTYPE html> <![CDATA[ a ]]> <?xml ?>",
        "@using System.Text;\n@using (var x = y) { }",
        "@await foreach (var x in y) { }",
        "@inject",
        "@inherits List<Dictionary<string, int[]>>?\n",
        "@model (int, string) x",
        "@addTagHelper *, Assembly\n@removeTagHelper \"Foo, Bar\"",
        "@{ } } }",
        "<p>}</p>@}",
        "@class",
        "@{ @if (x) { } }",
        "\u{1F600}@\u{1F600}",
    ];
    for input in inputs {
        let tree = legacy(input);
        assert_eq!(tree.root().text(), input);
        assert_eq!(tree.root().width(), TextSize::of(input), "{input:?}");

        let component = parse(input, &RazorParserOptions::new(FileKind::Component));
        assert_eq!(component.root().text(), input);
    }
}

#[test]
fn missing_end_tag_in_code() {
    let tree = legacy("@{ <p> }");
    assert_eq!(ids(&tree), [catalog::EXPECTED_BLOCK_END, catalog::MISSING_END_TAG]);
}

#[test]
fn unexpected_end_tag_in_code() {
    let tree = legacy("@{ </p> }");
    assert_eq!(ids(&tree), [catalog::UNEXPECTED_END_TAG]);
}

#[test]
fn nested_code_block() {
    let tree = legacy("@{ @{ } }");
    assert_eq!(ids(&tree), [catalog::NESTED_CODE_BLOCK]);
}

#[test]
fn code_start_errors() {
    assert_eq!(ids(&legacy("@ x")), [catalog::UNEXPECTED_WHITESPACE_AT_CODE_START]);
    assert_eq!(ids(&legacy("x @")), [catalog::UNEXPECTED_EOF_AT_CODE_START]);
    assert_eq!(ids(&legacy("@!x")), [catalog::UNEXPECTED_CHARACTER_AT_CODE_START]);
    assert_eq!(ids(&legacy("@(x")), [catalog::EXPECTED_BLOCK_END]);
    assert_eq!(ids(&legacy("@class")), [catalog::RESERVED_WORD]);
}

#[test]
fn code_block_errors() {
    assert_eq!(ids(&legacy("@{\n#endif\n}")), [catalog::UNEXPECTED_PREPROCESSOR_DIRECTIVE]);
    assert!(legacy("@{\n#if DEBUG\n#else\n#endif\n}").diagnostics().is_empty());
    assert_eq!(ids(&legacy("@{ var s = \"abc\n}")), [catalog::UNTERMINATED_STRING_LITERAL]);
    assert_eq!(ids(&legacy("@{ /* open }")), [catalog::EXPECTED_BLOCK_END, catalog::UNTERMINATED_BLOCK_COMMENT]);
    assert_eq!(ids(&legacy("@{ @if (x) { } }")), [catalog::UNEXPECTED_KEYWORD_AFTER_TRANSITION]);
    assert_eq!(ids(&legacy("@if (x) <p></p>")), [catalog::BLOCK_REQUIRES_BRACES]);
    assert_eq!(ids(&legacy("@foo(bar")), [catalog::EXPECTED_CLOSE_BRACKET]);
    assert_eq!(ids(&legacy("@* open")), [catalog::UNTERMINATED_RAZOR_COMMENT]);
}

#[test]
fn keyword_chains_leave_following_markup_alone() {
    let tree = legacy("@if (a) { } /* note */ else { }\n<p>x</p>");
    assert!(tree.diagnostics().is_empty());
    let element = tree.root().descendants().find(|it| it.kind() == SyntaxKind::MARKUP_ELEMENT);
    let parent = element.and_then(|it| it.parent()).map(|it| it.kind());
    assert_eq!(parent, Some(SyntaxKind::MARKUP_BLOCK));

    let tree = legacy("@try { } catch (E e) { } finally { }<b>x</b>");
    assert!(tree.diagnostics().is_empty());

    let tree = legacy("@if (a) { } @* note *@ else { <p>x</p> }");
    assert!(tree.diagnostics().is_empty());
    assert!(tree.root().descendants().any(|it| it.kind() == SyntaxKind::RAZOR_COMMENT_BLOCK));
    let element = tree.root().descendants().find(|it| it.kind() == SyntaxKind::MARKUP_ELEMENT);
    assert!(element.is_some_and(|it| it.ancestors().any(|it| it.kind() == SyntaxKind::CSHARP_CODE_BLOCK)));
}

#[test]
fn else_without_condition_ends_the_chain() {
    let tree = legacy("@if (a) { } else { } else { }");
    assert!(tree.diagnostics().is_empty());
    let block = tree.root().descendants().find(|it| it.kind() == SyntaxKind::CSHARP_CODE_BLOCK);
    assert_eq!(block.map(|it| it.text()), Some("@if (a) { } else { }".to_owned()));
    let markup = tree
        .root()
        .descendants()
        .filter(|it| it.kind() == SyntaxKind::MARKUP_TEXT_LITERAL)
        .map(|it| it.text())
        .collect::<String>();
    assert_eq!(markup, " else { }");

    let tree = legacy("@if (a) { } else if (b) { } else { }");
    let block = tree.root().descendants().find(|it| it.kind() == SyntaxKind::CSHARP_CODE_BLOCK);
    assert_eq!(block.map(|it| it.text()), Some("@if (a) { } else if (b) { } else { }".to_owned()));
}

fn disabled_text(tree: &RazorSyntaxTree) -> Vec<String> {
    tree.root()
        .tokens()
        .filter(|it| it.kind() == SyntaxKind::CSHARP_DISABLED_TEXT)
        .map(|it| it.text().to_owned())
        .collect()
}

fn element_text(tree: &RazorSyntaxTree) -> Vec<String> {
    tree.root().descendants().filter(|it| it.kind() == SyntaxKind::MARKUP_ELEMENT).map(|it| it.text()).collect()
}

#[test]
fn markup_balances_across_preprocessor_branches() {
    let tree = legacy("@{\n#if DEBUG\n    <div>\n#else\n    <div class=\"x\">\n#endif\n    </div>\n}\n");
    assert!(tree.diagnostics().is_empty());
    assert_eq!(disabled_text(&tree), ["    <div>\n"]);
    assert_eq!(element_text(&tree), ["<div class=\"x\">\n#endif\n    </div>"]);

    let tree = legacy("@{\n#define DEBUG\n#if DEBUG\n    <div>\n#else\n    <div class=\"x\">\n#endif\n    </div>\n}\n");
    assert!(tree.diagnostics().is_empty());
    assert_eq!(disabled_text(&tree), ["    <div class=\"x\">\n"]);
    assert_eq!(element_text(&tree), ["<div>\n#else\n    <div class=\"x\">\n#endif\n    </div>"]);
}

#[test]
fn disabled_branches_are_opaque() {
    let tree = legacy("@{\n#if false\n    {\n#endif\n}\n<p>after</p>");
    assert!(tree.diagnostics().is_empty());
    assert_eq!(disabled_text(&tree), ["    {\n"]);
    let element = tree.root().descendants().find(|it| it.kind() == SyntaxKind::MARKUP_ELEMENT);
    assert!(element.is_some_and(|it| it.ancestors().all(|it| it.kind() != SyntaxKind::CSHARP_CODE_BLOCK)));

    let tree = legacy("@{\n#if !DEBUG\n    var x = 1;\n#else\n    <p>\n#endif\n}");
    assert!(tree.diagnostics().is_empty());
    assert!(element_text(&tree).is_empty());
    assert_eq!(tree.root().width(), TextSize::of("@{\n#if !DEBUG\n    var x = 1;\n#else\n    <p>\n#endif\n}"));
}

#[test]
fn preprocessor_branches_follow_their_region() {
    let twice = legacy("@{\n#if true\n#else\n#else\n#endif\n}");
    assert_eq!(ids(&twice), [catalog::UNEXPECTED_PREPROCESSOR_DIRECTIVE]);
    let late = legacy("@{\n#if true\n#else\n#elif X\n#endif\n}");
    assert_eq!(ids(&late), [catalog::UNEXPECTED_PREPROCESSOR_DIRECTIVE]);
    let nested = legacy("@{\n#if true\n#if false\n}\n#endif\n#endif\n}");
    assert!(nested.diagnostics().is_empty());
    assert_eq!(disabled_text(&nested), ["}\n"]);
}

#[test]
fn directive_errors() {
    assert_eq!(ids(&legacy("@inject")), [catalog::UNEXPECTED_EOF_AFTER_DIRECTIVE]);
    assert_eq!(ids(&legacy("@model 123")), [catalog::DIRECTIVE_EXPECTS_TOKEN]);
    assert_eq!(ids(&legacy("@model Foo bar")), [catalog::UNEXPECTED_DIRECTIVE_LITERAL]);
    assert_eq!(ids(&legacy("@section {")), [catalog::DIRECTIVE_EXPECTS_TOKEN]);
    assert_eq!(ids(&legacy("@functions { void F() { }")), [catalog::EXPECTED_BLOCK_END]);
    assert_eq!(ids(&legacy("@addTagHelper")), [catalog::DIRECTIVE_MUST_HAVE_VALUE]);
    assert_eq!(ids(&legacy("@addTagHelper \"Foo\"")), [catalog::INVALID_TAG_HELPER_LOOKUP_TEXT]);
    assert_eq!(ids(&legacy("@tagHelperPrefix \"a b\"")), [catalog::INVALID_TAG_HELPER_PREFIX_VALUE]);
    assert!(legacy("@addTagHelper *, Microsoft.AspNetCore.Mvc.TagHelpers\n").diagnostics().is_empty());
    assert!(legacy("@inject IOptions<Settings> Settings\n@page\n").diagnostics().is_empty());

    let component = RazorParserOptions::new(FileKind::Component);
    assert!(parse("@page \"/counter\"\n@page \"/other\"\n", &component).diagnostics().is_empty());
    assert_eq!(
        parse("@layout Main\n@layout Other\n", &component).diagnostics().iter().map(|it| it.id()).collect::<Vec<_>>(),
        [catalog::DUPLICATE_DIRECTIVE]
    );
}

#[test]
fn section_body_is_markup() {
    let tree = legacy("@section Scripts { <p>{x}</p> }after");
    assert!(tree.diagnostics().is_empty());
    let directive = tree.root().descendants().find(|it| it.kind() == SyntaxKind::RAZOR_DIRECTIVE);
    assert_eq!(directive.map(|it| it.text()), Some("@section Scripts { <p>{x}</p> }".to_owned()));
}

#[test]
fn using_import_is_annotated() {
    let tree = legacy("@using System.Linq\n");
    let literal = tree.root().descendants().find(|it| it.kind() == SyntaxKind::CSHARP_STATEMENT_LITERAL);
    let annotations = literal.map(|it| it.annotations()).unwrap_or_default();
    assert_eq!(annotations.len(), 1);
    assert_eq!(format!("{:?}", annotations[0]), "Using:{System.Linq}");
}

#[test]
fn text_tags_are_transitions() {
    let tree = legacy("@{ <text>hi</text> }");
    assert!(tree.diagnostics().is_empty());
    let annotated = tree
        .root()
        .descendants()
        .filter(|it| matches!(it.kind(), SyntaxKind::MARKUP_START_TAG | SyntaxKind::MARKUP_END_TAG))
        .filter(|it| it.annotations().iter().any(|a| a.kind() == crate::annotations::TRANSITION))
        .count();
    assert_eq!(annotated, 2);
}

#[test]
fn csharp_in_attribute_area_depends_on_features() {
    assert!(legacy("<p @x></p>").diagnostics().is_empty());

    let features = RazorParserFeatures {
        allow_csharp_in_markup_attribute_area: false,
        ..RazorParserFeatures::for_file_kind(FileKind::Legacy)
    };
    let options = RazorParserOptions::new(FileKind::Legacy).with_features(features);
    let tree = parse("<p @x></p>", &options);
    assert_eq!(ids(&tree), [catalog::CSHARP_IN_ATTRIBUTE_AREA]);
}

#[test]
fn component_directive_attributes_are_attributes() {
    let options = RazorParserOptions::new(FileKind::Component);
    let tree = parse("<input @bind=\"value\" />", &options);
    assert!(tree.diagnostics().is_empty());
    let names = tree
        .root()
        .descendants()
        .filter(|it| it.kind() == SyntaxKind::MARKUP_ATTRIBUTE_BLOCK)
        .filter_map(|it| it.children().nth(1))
        .map(|it| it.text())
        .collect::<Vec<_>>();
    assert_eq!(names, ["@bind"]);
}

#[test]
fn nesting_limit_fails_closed() {
    let text = "<a><b><c><d>x</d></c></b></a>";
    let options = RazorParserOptions::new(FileKind::Legacy).with_max_nesting_depth(2);
    let tree = parse(text, &options);
    assert_eq!(tree.root().text(), text);
    assert_eq!(ids(&tree), [catalog::MAXIMUM_NESTING_DEPTH]);

    let deep = "@{ <p>".repeat(500);
    let tree = parse(&deep, &RazorParserOptions::default().with_max_nesting_depth(32));
    assert_eq!(tree.root().text(), deep);
    assert!(ids(&tree).contains(&catalog::MAXIMUM_NESTING_DEPTH));
}
