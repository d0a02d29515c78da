//! Constructors for every diagnostic the parser and the rewrite pass report.

use text_size::TextRange;

use crate::{Diagnostic, DiagnosticId};

pub const UNTERMINATED_STRING_LITERAL: DiagnosticId = DiagnosticId::new("RZ1000");
pub const UNEXPECTED_WHITESPACE_AT_CODE_START: DiagnosticId = DiagnosticId::new("RZ1003");
pub const UNEXPECTED_EOF_AT_CODE_START: DiagnosticId = DiagnosticId::new("RZ1004");
pub const UNEXPECTED_CHARACTER_AT_CODE_START: DiagnosticId = DiagnosticId::new("RZ1005");
pub const EXPECTED_BLOCK_END: DiagnosticId = DiagnosticId::new("RZ1006");
pub const RESERVED_WORD: DiagnosticId = DiagnosticId::new("RZ1007");
pub const BLOCK_REQUIRES_BRACES: DiagnosticId = DiagnosticId::new("RZ1008");
pub const NESTED_CODE_BLOCK: DiagnosticId = DiagnosticId::new("RZ1009");
pub const UNEXPECTED_KEYWORD_AFTER_TRANSITION: DiagnosticId = DiagnosticId::new("RZ1010");
pub const UNEXPECTED_EOF_AFTER_DIRECTIVE: DiagnosticId = DiagnosticId::new("RZ1012");
pub const DIRECTIVE_EXPECTS_TOKEN: DiagnosticId = DiagnosticId::new("RZ1013");
pub const DIRECTIVE_EXPECTS_QUOTED_STRING: DiagnosticId = DiagnosticId::new("RZ1016");
pub const UNEXPECTED_DIRECTIVE_LITERAL: DiagnosticId = DiagnosticId::new("RZ1017");
pub const INVALID_TAG_HELPER_PREFIX_VALUE: DiagnosticId = DiagnosticId::new("RZ1020");
pub const UNFINISHED_TAG: DiagnosticId = DiagnosticId::new("RZ1024");
pub const MISSING_END_TAG: DiagnosticId = DiagnosticId::new("RZ1025");
pub const UNEXPECTED_END_TAG: DiagnosticId = DiagnosticId::new("RZ1026");
pub const EXPECTED_CLOSE_BRACKET: DiagnosticId = DiagnosticId::new("RZ1027");
pub const UNTERMINATED_BLOCK_COMMENT: DiagnosticId = DiagnosticId::new("RZ1028");
pub const UNEXPECTED_PREPROCESSOR_DIRECTIVE: DiagnosticId = DiagnosticId::new("RZ1029");
pub const MAXIMUM_NESTING_DEPTH: DiagnosticId = DiagnosticId::new("RZ1030");
pub const CSHARP_IN_ATTRIBUTE_AREA: DiagnosticId = DiagnosticId::new("RZ1031");
pub const END_TAG_FOR_WITHOUT_END_TAG_HELPER: DiagnosticId = DiagnosticId::new("RZ1033");
pub const MALFORMED_TAG_HELPER: DiagnosticId = DiagnosticId::new("RZ1034");
pub const INVALID_TAG_HELPER_LOOKUP_TEXT: DiagnosticId = DiagnosticId::new("RZ1036");
pub const UNTERMINATED_RAZOR_COMMENT: DiagnosticId = DiagnosticId::new("RZ1037");
pub const DIRECTIVE_MUST_HAVE_VALUE: DiagnosticId = DiagnosticId::new("RZ1039");
pub const DUPLICATE_DIRECTIVE: DiagnosticId = DiagnosticId::new("RZ2001");
pub const EMPTY_BOUND_ATTRIBUTE: DiagnosticId = DiagnosticId::new("RZ2008");
pub const INVALID_TAG_HELPER_CHILD: DiagnosticId = DiagnosticId::new("RZ2010");
pub const INCONSISTENT_TAG_STRUCTURE: DiagnosticId = DiagnosticId::new("RZ2011");

pub fn unterminated_string_literal(range: TextRange) -> Diagnostic {
    Diagnostic::error(
        UNTERMINATED_STRING_LITERAL,
        "Unterminated string literal. Strings that start with a quotation mark (\") must be \
         terminated before the end of the line.",
        range,
    )
}

pub fn unexpected_whitespace_at_code_start(range: TextRange) -> Diagnostic {
    Diagnostic::error(
        UNEXPECTED_WHITESPACE_AT_CODE_START,
        "A space or line break was encountered after the \"@\" character. Only valid \
         identifiers, keywords, comments, \"(\" and \"{\" are valid at the start of a code block \
         and they must occur immediately following \"@\" with no space in between.",
        range,
    )
}

pub fn unexpected_eof_at_code_start(range: TextRange) -> Diagnostic {
    Diagnostic::error(
        UNEXPECTED_EOF_AT_CODE_START,
        "End-of-file was found after the \"@\" character. \"@\" must be followed by a valid code \
         block.",
        range,
    )
}

pub fn unexpected_character_at_code_start(range: TextRange, found: &str) -> Diagnostic {
    Diagnostic::error(
        UNEXPECTED_CHARACTER_AT_CODE_START,
        format!(
            "\"{found}\" is not valid at the start of a code block. Only identifiers, keywords, \
             comments, \"(\" and \"{{\" are valid."
        ),
        range,
    )
}

pub fn expected_block_end(range: TextRange, block: &str, close: &str, open: &str) -> Diagnostic {
    Diagnostic::error(
        EXPECTED_BLOCK_END,
        format!(
            "The {block} block is missing a closing \"{close}\" character. Make sure you have a \
             matching \"{close}\" character for all the \"{open}\" characters within this block."
        ),
        range,
    )
}

pub fn reserved_word(range: TextRange, word: &str) -> Diagnostic {
    Diagnostic::error(
        RESERVED_WORD,
        format!("\"{word}\" is a reserved word and cannot be used in implicit expressions."),
        range,
    )
}

pub fn block_requires_braces(range: TextRange, keyword: &str) -> Diagnostic {
    Diagnostic::error(
        BLOCK_REQUIRES_BRACES,
        format!("Expected a \"{{\" after the \"{keyword}\" statement header."),
        range,
    )
}

pub fn nested_code_block(range: TextRange) -> Diagnostic {
    Diagnostic::error(
        NESTED_CODE_BLOCK,
        "Unexpected \"{\" after \"@\" character. Once inside the body of a code block (@if {}, \
         @{}, etc.) you do not need to use \"@{\" to switch to code.",
        range,
    )
}

pub fn unexpected_keyword_after_transition(range: TextRange, keyword: &str) -> Diagnostic {
    Diagnostic::error(
        UNEXPECTED_KEYWORD_AFTER_TRANSITION,
        format!(
            "Unexpected \"{keyword}\" keyword after \"@\" character. Once inside code, you do not \
             need to prefix constructs like \"{keyword}\" with \"@\"."
        ),
        range,
    )
}

pub fn unexpected_eof_after_directive(range: TextRange, directive: &str, expected: &str) -> Diagnostic {
    Diagnostic::error(
        UNEXPECTED_EOF_AFTER_DIRECTIVE,
        format!("Unexpected end of file following the '{directive}' directive. Expected '{expected}'."),
        range,
    )
}

pub fn directive_expects_token(range: TextRange, directive: &str, expected: &str) -> Diagnostic {
    Diagnostic::error(
        DIRECTIVE_EXPECTS_TOKEN,
        format!("The '{directive}' directive expects {expected}."),
        range,
    )
}

pub fn directive_expects_quoted_string(range: TextRange, directive: &str) -> Diagnostic {
    Diagnostic::error(
        DIRECTIVE_EXPECTS_QUOTED_STRING,
        format!("The '{directive}' directive expects a string surrounded by double quotes."),
        range,
    )
}

pub fn unexpected_directive_literal(range: TextRange, directive: &str, expected: &str) -> Diagnostic {
    Diagnostic::error(
        UNEXPECTED_DIRECTIVE_LITERAL,
        format!("Unexpected literal following the '{directive}' directive. Expected '{expected}'."),
        range,
    )
}

pub fn invalid_tag_helper_prefix_value(
    range: TextRange,
    directive: &str,
    character: char,
    prefix: &str,
) -> Diagnostic {
    Diagnostic::error(
        INVALID_TAG_HELPER_PREFIX_VALUE,
        format!(
            "Invalid tag helper prefix value '{prefix}' for the '{directive}' directive. \
             Tag helper prefixes cannot contain the character '{character}'."
        ),
        range,
    )
}

pub fn unfinished_tag(range: TextRange, tag: &str) -> Diagnostic {
    Diagnostic::error(
        UNFINISHED_TAG,
        format!(
            "End of file or an unexpected character was reached before the \"{tag}\" tag could be \
             parsed. Elements inside markup blocks must be complete."
        ),
        range,
    )
}

pub fn missing_end_tag(range: TextRange, tag: &str) -> Diagnostic {
    Diagnostic::error(
        MISSING_END_TAG,
        format!(
            "The \"{tag}\" element was not closed. All elements must be either self-closing or \
             have a matching end tag."
        ),
        range,
    )
}

pub fn unexpected_end_tag(range: TextRange, tag: &str) -> Diagnostic {
    Diagnostic::error(
        UNEXPECTED_END_TAG,
        format!(
            "Encountered end tag \"{tag}\" with no matching start tag. Are your start/end tags \
             properly balanced?"
        ),
        range,
    )
}

pub fn expected_close_bracket(range: TextRange, open: char, close: char) -> Diagnostic {
    Diagnostic::error(
        EXPECTED_CLOSE_BRACKET,
        format!("An opening \"{open}\" is missing the corresponding closing \"{close}\"."),
        range,
    )
}

pub fn unterminated_block_comment(range: TextRange) -> Diagnostic {
    Diagnostic::error(
        UNTERMINATED_BLOCK_COMMENT,
        "End of file was reached before the end of the block comment. All comments that start \
         with \"/*\" must end with \"*/\".",
        range,
    )
}

pub fn unexpected_preprocessor_directive(range: TextRange, directive: &str) -> Diagnostic {
    Diagnostic::error(
        UNEXPECTED_PREPROCESSOR_DIRECTIVE,
        format!("Unexpected preprocessor directive '#{directive}'; it does not continue an open '#if' region."),
        range,
    )
}

pub fn maximum_nesting_depth(range: TextRange, limit: u32) -> Diagnostic {
    Diagnostic::error(
        MAXIMUM_NESTING_DEPTH,
        format!("The document nests more than {limit} blocks; the remaining content is not nested."),
        range,
    )
}

pub fn csharp_in_attribute_area(range: TextRange) -> Diagnostic {
    Diagnostic::error(
        CSHARP_IN_ATTRIBUTE_AREA,
        "C# is not allowed in the attribute declaration area of a tag in this document.",
        range,
    )
}

pub fn end_tag_for_without_end_tag_helper(
    range: TextRange,
    tag: &str,
    tag_helper: &str,
) -> Diagnostic {
    Diagnostic::error(
        END_TAG_FOR_WITHOUT_END_TAG_HELPER,
        format!(
            "Found an end tag (</{tag}>) for tag helper '{tag_helper}' with tag structure that \
             disallows an end tag ('WithoutEndTag')."
        ),
        range,
    )
}

pub fn malformed_tag_helper(range: TextRange, tag: &str) -> Diagnostic {
    Diagnostic::error(
        MALFORMED_TAG_HELPER,
        format!(
            "Found a malformed '{tag}' tag helper. Tag helpers must have a start and end tag or be \
             self closing."
        ),
        range,
    )
}

pub fn invalid_tag_helper_lookup_text(range: TextRange, text: &str) -> Diagnostic {
    Diagnostic::error(
        INVALID_TAG_HELPER_LOOKUP_TEXT,
        format!(
            "Invalid tag helper directive look up text '{text}'. The correct look up text format \
             is: \"name, assemblyName\"."
        ),
        range,
    )
}

pub fn unterminated_razor_comment(range: TextRange) -> Diagnostic {
    Diagnostic::error(
        UNTERMINATED_RAZOR_COMMENT,
        "End of file was reached before the end of the block comment. All comments started with \
         \"@*\" sequence must be terminated with a matching \"*@\" sequence.",
        range,
    )
}

pub fn directive_must_have_value(range: TextRange, directive: &str) -> Diagnostic {
    Diagnostic::error(
        DIRECTIVE_MUST_HAVE_VALUE,
        format!("Directive '{directive}' must have a value."),
        range,
    )
}

pub fn duplicate_directive(range: TextRange, directive: &str) -> Diagnostic {
    Diagnostic::error(
        DUPLICATE_DIRECTIVE,
        format!("The '{directive}' directive may only occur once per document."),
        range,
    )
}

pub fn empty_bound_attribute(
    range: TextRange,
    attribute: &str,
    tag: &str,
    type_name: &str,
) -> Diagnostic {
    Diagnostic::error(
        EMPTY_BOUND_ATTRIBUTE,
        format!(
            "Attribute '{attribute}' on tag helper element '{tag}' requires a value. Tag helper \
             bound attributes of type '{type_name}' cannot be empty or contain only whitespace."
        ),
        range,
    )
}

pub fn invalid_tag_helper_child(range: TextRange, child: &str, parent: &str, allowed: &str) -> Diagnostic {
    Diagnostic::error(
        INVALID_TAG_HELPER_CHILD,
        format!(
            "The <{child}> tag is not allowed by parent <{parent}> tag helper. Only child tags \
             with name(s) '{allowed}' are allowed."
        ),
        range,
    )
}

pub fn inconsistent_tag_structure(
    range: TextRange,
    first: &str,
    second: &str,
    tag: &str,
) -> Diagnostic {
    Diagnostic::error(
        INCONSISTENT_TAG_STRUCTURE,
        format!(
            "Tag helpers '{first}' and '{second}' targeting element '{tag}' must not expect \
             different TagStructure values."
        ),
        range,
    )
}
