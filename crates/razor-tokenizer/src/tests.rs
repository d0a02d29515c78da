use text_size::TextSize;

use crate::SyntaxKind::*;
use crate::*;

fn collect(mut tokenizer: impl Tokenizer, text: &str) -> Vec<(SyntaxKind, String)> {
    let mut tokens = Vec::new();
    loop {
        let token = tokenizer.advance();
        if token.kind == EOF {
            break;
        }
        tokens.push((token.kind, token.text(text).to_owned()));
    }
    tokens
}

fn html(text: &str) -> Vec<(SyntaxKind, String)> {
    collect(HtmlTokenizer::new(text, TextSize::new(0)), text)
}

fn csharp(text: &str) -> Vec<(SyntaxKind, String)> {
    collect(CSharpTokenizer::new(text, TextSize::new(0), CSharpLanguageVersion::Latest), text)
}

fn kinds(tokens: &[(SyntaxKind, String)]) -> Vec<SyntaxKind> {
    tokens.iter().map(|(kind, _)| *kind).collect()
}

fn single(text: &str) -> Token {
    let mut tokenizer = CSharpTokenizer::new(text, TextSize::new(0), CSharpLanguageVersion::Latest);
    let token = tokenizer.advance();
    assert_eq!(tokenizer.peek().kind, EOF, "`{text}` was not a single token");
    token
}

#[test]
fn html_tag_punctuation() {
    let tokens = html("<p class=\"x\">Hi there</p>");
    assert_eq!(
        kinds(&tokens),
        [
            OPEN_ANGLE,
            TEXT,
            WHITESPACE,
            TEXT,
            EQUALS,
            DOUBLE_QUOTE,
            TEXT,
            DOUBLE_QUOTE,
            CLOSE_ANGLE,
            TEXT,
            WHITESPACE,
            TEXT,
            OPEN_ANGLE,
            FORWARD_SLASH,
            TEXT,
            CLOSE_ANGLE,
        ]
    );
}

#[test]
fn html_transition_and_comment_markers() {
    let tokens = html("a@b <!-- x-y --> @* c");
    assert_eq!(
        tokens,
        [
            (TEXT, "a".to_owned()),
            (TRANSITION, "@".to_owned()),
            (TEXT, "b".to_owned()),
            (WHITESPACE, " ".to_owned()),
            (OPEN_ANGLE, "<".to_owned()),
            (BANG, "!".to_owned()),
            (DOUBLE_HYPHEN, "--".to_owned()),
            (WHITESPACE, " ".to_owned()),
            (TEXT, "x-y".to_owned()),
            (WHITESPACE, " ".to_owned()),
            (DOUBLE_HYPHEN, "--".to_owned()),
            (CLOSE_ANGLE, ">".to_owned()),
            (WHITESPACE, " ".to_owned()),
            (RAZOR_COMMENT_TRANSITION, "@".to_owned()),
            (TEXT, "*".to_owned()),
            (WHITESPACE, " ".to_owned()),
            (TEXT, "c".to_owned()),
        ]
    );
}

#[test]
fn html_newlines() {
    assert_eq!(kinds(&html("a\r\nb\n")), [TEXT, NEW_LINE, TEXT, NEW_LINE]);
}

#[test]
fn html_tokenizer_starts_mid_document() {
    let text = "@foo <b>";
    let tokens = collect(HtmlTokenizer::new(text, TextSize::new(4)), text);
    assert_eq!(kinds(&tokens), [WHITESPACE, OPEN_ANGLE, TEXT, CLOSE_ANGLE]);
}

#[test]
fn razor_comment_pieces() {
    let text = "@* hi *@x";
    let tokens = collect(RazorCommentTokenizer::new(text, TextSize::new(1)), text);
    assert_eq!(
        tokens,
        [
            (RAZOR_COMMENT_STAR, "*".to_owned()),
            (RAZOR_COMMENT_LITERAL, " hi ".to_owned()),
            (RAZOR_COMMENT_STAR, "*".to_owned()),
            (RAZOR_COMMENT_TRANSITION, "@".to_owned()),
        ]
    );
}

#[test]
fn unterminated_razor_comment_runs_to_end() {
    let text = "@* open";
    let mut tokenizer = RazorCommentTokenizer::new(text, TextSize::new(1));
    assert_eq!(tokenizer.advance().kind, RAZOR_COMMENT_STAR);
    let literal = tokenizer.advance();
    assert_eq!(literal.kind, RAZOR_COMMENT_LITERAL);
    assert!(literal.unterminated);
    assert_eq!(literal.text(text), " open");
    assert_eq!(tokenizer.advance().kind, EOF);
}

#[test]
fn csharp_identifiers_and_keywords() {
    let tokens = csharp("if (x) { await Foo(); }");
    assert_eq!(
        kinds(&tokens),
        [
            KEYWORD,
            WHITESPACE,
            LEFT_PAREN,
            IDENTIFIER,
            RIGHT_PAREN,
            WHITESPACE,
            LEFT_BRACE,
            WHITESPACE,
            IDENTIFIER,
            WHITESPACE,
            IDENTIFIER,
            LEFT_PAREN,
            RIGHT_PAREN,
            SEMICOLON,
            WHITESPACE,
            RIGHT_BRACE,
        ]
    );
}

#[test]
fn csharp_member_access_operators() {
    let tokens = csharp("a?.b!.c ?? d => e == f");
    assert_eq!(
        tokens.iter().filter(|(kind, _)| *kind != WHITESPACE).map(|(_, t)| t.as_str()).collect::<Vec<_>>(),
        ["a", "?", ".", "b", "!", ".", "c", "??", "d", "=>", "e", "==", "f"]
    );
    assert_eq!(kinds(&csharp("<p")), [LESS_THAN, IDENTIFIER]);
    assert_eq!(kinds(&csharp("List<int>>")), [IDENTIFIER, LESS_THAN, KEYWORD, GREATER_THAN, GREATER_THAN]);
}

#[test]
fn csharp_numbers() {
    let cases = [
        ("123", INTEGER_LITERAL),
        ("0x1F", INTEGER_LITERAL),
        ("0b1010_1010", INTEGER_LITERAL),
        ("10UL", INTEGER_LITERAL),
        ("10lu", INTEGER_LITERAL),
        ("1.5", REAL_LITERAL),
        (".5e-3", REAL_LITERAL),
        ("1e10", REAL_LITERAL),
        ("2f", REAL_LITERAL),
        ("3.0m", REAL_LITERAL),
    ];
    for (input, expected) in cases {
        assert_eq!(single(input).kind, expected, "Input: '{input}'");
    }
}

#[test]
fn csharp_number_suffix_backtracks() {
    let tokens = csharp("1ux 2e 3.ToString()");
    assert_eq!(
        tokens.iter().filter(|(kind, _)| *kind != WHITESPACE).cloned().collect::<Vec<_>>(),
        [
            (INTEGER_LITERAL, "1".to_owned()),
            (IDENTIFIER, "ux".to_owned()),
            (INTEGER_LITERAL, "2".to_owned()),
            (IDENTIFIER, "e".to_owned()),
            (INTEGER_LITERAL, "3".to_owned()),
            (DOT, ".".to_owned()),
            (IDENTIFIER, "ToString".to_owned()),
            (LEFT_PAREN, "(".to_owned()),
            (RIGHT_PAREN, ")".to_owned()),
        ]
    );
}

#[test]
fn csharp_strings() {
    assert_eq!(single(r#""a\"b""#).kind, STRING_LITERAL);
    assert_eq!(single(r#"@"a""b""#).kind, VERBATIM_STRING_LITERAL);
    assert_eq!(single(r#"$"x{(a ? "}" : b)}y""#).kind, INTERPOLATED_STRING_LITERAL);
    assert_eq!(single(r#"$@"{{x}}""#).kind, INTERPOLATED_STRING_LITERAL);
    assert_eq!(single(r#""""raw "quoted" text""""#).kind, RAW_STRING_LITERAL);
    assert_eq!(single(r#""bytes"u8"#).kind, STRING_LITERAL);
    assert_eq!(single("'\\n'").kind, CHARACTER_LITERAL);
}

#[test]
fn raw_strings_need_csharp_11() {
    let text = r#""""a""""#;
    let mut tokenizer = CSharpTokenizer::new(text, TextSize::new(0), CSharpLanguageVersion::CSharp10);
    let first = tokenizer.advance();
    assert_eq!(first.kind, STRING_LITERAL);
    assert_eq!(first.text(text), "\"\"");
}

#[test]
fn unterminated_string_stops_at_newline() {
    let text = "\"abc\nx";
    let tokens = csharp(text);
    assert_eq!(kinds(&tokens), [STRING_LITERAL, NEW_LINE, IDENTIFIER]);
    assert!(single("\"abc").unterminated);
}

#[test]
fn csharp_comments() {
    let tokens = csharp("// a\n/// b\n/* c /* d */ e */x");
    assert_eq!(
        tokens,
        [
            (CSHARP_COMMENT, "// a".to_owned()),
            (NEW_LINE, "\n".to_owned()),
            (CSHARP_DOC_COMMENT, "/// b\n".to_owned()),
            (CSHARP_BLOCK_COMMENT, "/* c /* d */ e */".to_owned()),
            (IDENTIFIER, "x".to_owned()),
        ]
    );
    let unterminated = single("/* never closed");
    assert_eq!(unterminated.kind, CSHARP_BLOCK_COMMENT);
    assert!(unterminated.unterminated);
}

#[test]
fn preprocessor_directives_only_at_line_start() {
    let tokens = csharp("  #if DEBUG\nx #if");
    assert_eq!(
        kinds(&tokens),
        [WHITESPACE, CSHARP_PREPROCESSOR_DIRECTIVE, NEW_LINE, IDENTIFIER, WHITESPACE, UNKNOWN, KEYWORD]
    );
    assert_eq!(tokens[1].1, "#if DEBUG");
}

#[test]
fn csharp_transitions() {
    assert_eq!(kinds(&csharp("@foo @* x")), [TRANSITION, IDENTIFIER, WHITESPACE, RAZOR_COMMENT_TRANSITION, CSHARP_OPERATOR, WHITESPACE, IDENTIFIER]);
}
