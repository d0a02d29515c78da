#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
#[repr(u16)]
pub enum SyntaxKind {
    // Markup tokens.
    TEXT,
    WHITESPACE,
    NEW_LINE,
    OPEN_ANGLE,
    CLOSE_ANGLE,
    FORWARD_SLASH,
    BANG,
    QUESTION_MARK,
    EQUALS,
    DOUBLE_QUOTE,
    SINGLE_QUOTE,
    DOUBLE_HYPHEN,
    LEFT_BRACKET,
    RIGHT_BRACKET,
    TRANSITION,

    // Razor comment tokens.
    RAZOR_COMMENT_TRANSITION,
    RAZOR_COMMENT_STAR,
    RAZOR_COMMENT_LITERAL,

    // C# tokens.
    IDENTIFIER,
    KEYWORD,
    INTEGER_LITERAL,
    REAL_LITERAL,
    CHARACTER_LITERAL,
    STRING_LITERAL,
    VERBATIM_STRING_LITERAL,
    INTERPOLATED_STRING_LITERAL,
    RAW_STRING_LITERAL,
    CSHARP_COMMENT,
    CSHARP_DOC_COMMENT,
    CSHARP_BLOCK_COMMENT,
    CSHARP_PREPROCESSOR_DIRECTIVE,
    /// A branch of an `#if` region that is not taken.
    CSHARP_DISABLED_TEXT,
    LEFT_BRACE,
    RIGHT_BRACE,
    LEFT_PAREN,
    RIGHT_PAREN,
    SEMICOLON,
    COLON,
    DOT,
    COMMA,
    LESS_THAN,
    GREATER_THAN,
    CSHARP_OPERATOR,

    UNKNOWN,
    EOF,

    // Nodes.
    RAZOR_DOCUMENT,
    MARKUP_BLOCK,
    MARKUP_TRANSITION,
    MARKUP_ELEMENT,
    MARKUP_START_TAG,
    MARKUP_END_TAG,
    MARKUP_TEXT_LITERAL,
    MARKUP_EPHEMERAL_TEXT_LITERAL,
    MARKUP_COMMENT_BLOCK,
    MARKUP_ATTRIBUTE_BLOCK,
    MARKUP_MINIMIZED_ATTRIBUTE_BLOCK,
    MARKUP_MISC_ATTRIBUTE_CONTENT,
    MARKUP_LITERAL_ATTRIBUTE_VALUE,
    MARKUP_DYNAMIC_ATTRIBUTE_VALUE,
    MARKUP_TAG_HELPER_ELEMENT,
    MARKUP_TAG_HELPER_START_TAG,
    MARKUP_TAG_HELPER_END_TAG,
    MARKUP_TAG_HELPER_ATTRIBUTE,
    MARKUP_MINIMIZED_TAG_HELPER_ATTRIBUTE,
    MARKUP_TAG_HELPER_ATTRIBUTE_VALUE,
    MARKUP_TAG_HELPER_DIRECTIVE_ATTRIBUTE,
    MARKUP_MINIMIZED_TAG_HELPER_DIRECTIVE_ATTRIBUTE,
    GENERIC_BLOCK,
    CSHARP_CODE_BLOCK,
    CSHARP_TRANSITION,
    CSHARP_STATEMENT,
    CSHARP_STATEMENT_BODY,
    CSHARP_EXPLICIT_EXPRESSION,
    CSHARP_EXPLICIT_EXPRESSION_BODY,
    CSHARP_IMPLICIT_EXPRESSION,
    CSHARP_IMPLICIT_EXPRESSION_BODY,
    CSHARP_STATEMENT_LITERAL,
    CSHARP_EXPRESSION_LITERAL,
    CSHARP_EPHEMERAL_TEXT_LITERAL,
    CSHARP_TEMPLATE_BLOCK,
    RAZOR_DIRECTIVE,
    RAZOR_DIRECTIVE_BODY,
    RAZOR_META_CODE,
    RAZOR_COMMENT_BLOCK,
    UNCLASSIFIED_TEXT_LITERAL,
    LIST,
    TOMBSTONE,
}

use SyntaxKind::*;

impl SyntaxKind {
    pub const fn is_token(self) -> bool {
        (self as u16) <= (EOF as u16)
    }

    pub const fn is_node(self) -> bool {
        !self.is_token()
    }

    pub const fn is_list(self) -> bool {
        matches!(self, LIST)
    }

    pub const fn is_trivia(self) -> bool {
        matches!(
            self,
            WHITESPACE | NEW_LINE | CSHARP_COMMENT | CSHARP_DOC_COMMENT | CSHARP_BLOCK_COMMENT | CSHARP_DISABLED_TEXT
        )
    }

    /// Literal nodes print their text in tree dumps.
    pub const fn is_literal(self) -> bool {
        matches!(
            self,
            MARKUP_TEXT_LITERAL
                | MARKUP_EPHEMERAL_TEXT_LITERAL
                | CSHARP_STATEMENT_LITERAL
                | CSHARP_EXPRESSION_LITERAL
                | CSHARP_EPHEMERAL_TEXT_LITERAL
                | UNCLASSIFIED_TEXT_LITERAL
                | RAZOR_META_CODE
        )
    }

    /// Kinds whose only slot holds a [`LIST`] of every child.
    pub const fn is_list_bodied(self) -> bool {
        matches!(
            self,
            MARKUP_BLOCK
                | MARKUP_TRANSITION
                | MARKUP_TEXT_LITERAL
                | MARKUP_EPHEMERAL_TEXT_LITERAL
                | MARKUP_COMMENT_BLOCK
                | MARKUP_MISC_ATTRIBUTE_CONTENT
                | MARKUP_TAG_HELPER_ATTRIBUTE_VALUE
                | GENERIC_BLOCK
                | CSHARP_CODE_BLOCK
                | CSHARP_STATEMENT_LITERAL
                | CSHARP_EXPRESSION_LITERAL
                | CSHARP_EPHEMERAL_TEXT_LITERAL
                | CSHARP_TEMPLATE_BLOCK
                | RAZOR_META_CODE
                | UNCLASSIFIED_TEXT_LITERAL
        )
    }

    /// Number of slots a node of this kind carries, `None` for tokens and lists.
    pub const fn slot_count(self) -> Option<usize> {
        if self.is_list_bodied() {
            return Some(1);
        }
        let count = match self {
            RAZOR_DOCUMENT => 2,
            MARKUP_ELEMENT | MARKUP_TAG_HELPER_ELEMENT => 3,
            MARKUP_START_TAG | MARKUP_TAG_HELPER_START_TAG => 6,
            MARKUP_END_TAG | MARKUP_TAG_HELPER_END_TAG => 6,
            MARKUP_ATTRIBUTE_BLOCK | MARKUP_TAG_HELPER_ATTRIBUTE => 7,
            MARKUP_MINIMIZED_ATTRIBUTE_BLOCK | MARKUP_MINIMIZED_TAG_HELPER_ATTRIBUTE => 2,
            MARKUP_TAG_HELPER_DIRECTIVE_ATTRIBUTE => 10,
            MARKUP_MINIMIZED_TAG_HELPER_DIRECTIVE_ATTRIBUTE => 5,
            MARKUP_LITERAL_ATTRIBUTE_VALUE | MARKUP_DYNAMIC_ATTRIBUTE_VALUE => 2,
            CSHARP_TRANSITION => 1,
            CSHARP_STATEMENT | CSHARP_EXPLICIT_EXPRESSION | CSHARP_IMPLICIT_EXPRESSION => 2,
            CSHARP_STATEMENT_BODY | CSHARP_EXPLICIT_EXPRESSION_BODY => 3,
            CSHARP_IMPLICIT_EXPRESSION_BODY => 1,
            RAZOR_DIRECTIVE | RAZOR_DIRECTIVE_BODY => 2,
            RAZOR_COMMENT_BLOCK => 5,
            _ => return None,
        };
        Some(count)
    }

    pub const fn is_tag_helper(self) -> bool {
        matches!(
            self,
            MARKUP_TAG_HELPER_ELEMENT
                | MARKUP_TAG_HELPER_START_TAG
                | MARKUP_TAG_HELPER_END_TAG
                | MARKUP_TAG_HELPER_ATTRIBUTE
                | MARKUP_MINIMIZED_TAG_HELPER_ATTRIBUTE
                | MARKUP_TAG_HELPER_ATTRIBUTE_VALUE
                | MARKUP_TAG_HELPER_DIRECTIVE_ATTRIBUTE
                | MARKUP_MINIMIZED_TAG_HELPER_DIRECTIVE_ATTRIBUTE
        )
    }
}
