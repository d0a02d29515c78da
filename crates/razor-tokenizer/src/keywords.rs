const KEYWORDS: &[&str] = &[
    "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char", "checked", "class",
    "const", "continue", "decimal", "default", "delegate", "do", "double", "else", "enum", "event",
    "explicit", "extern", "false", "finally", "fixed", "float", "for", "foreach", "goto", "if",
    "implicit", "in", "int", "interface", "internal", "is", "lock", "long", "namespace", "new",
    "null", "object", "operator", "out", "override", "params", "private", "protected", "public",
    "readonly", "ref", "return", "sbyte", "sealed", "short", "sizeof", "stackalloc", "static",
    "string", "struct", "switch", "this", "throw", "true", "try", "typeof", "uint", "ulong",
    "unchecked", "unsafe", "ushort", "using", "virtual", "void", "volatile", "while",
];

const PREPROCESSOR_DIRECTIVES: &[&str] = &[
    "if", "elif", "else", "endif", "region", "endregion", "pragma", "nullable", "line", "error",
    "warning", "define", "undef",
];

/// Reserved C# keywords. Contextual keywords such as `await` or `when` are identifiers.
pub fn is_keyword(text: &str) -> bool {
    KEYWORDS.binary_search(&text).is_ok()
}

pub fn is_preprocessor_directive(name: &str) -> bool {
    PREPROCESSOR_DIRECTIVES.contains(&name)
}
