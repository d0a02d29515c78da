use std::fmt;

use crate::FileKind;

/// The shape of what follows a directive keyword.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DirectiveKind {
    /// Tokens up to the end of the line.
    SingleLine,
    /// Tokens followed by a brace-delimited markup body, like `@section`.
    RazorBlock,
    /// Tokens followed by a brace-delimited C# body, like `@functions`.
    CodeBlock,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DirectiveUsage {
    Unrestricted,
    FileScopedSinglyOccurring,
    FileScopedMultipleOccurring,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DirectiveTokenKind {
    Type,
    Namespace,
    Member,
    String,
    Attribute,
    Boolean,
}

impl DirectiveTokenKind {
    pub(crate) fn description(self) -> &'static str {
        match self {
            Self::Type => "type name",
            Self::Namespace => "namespace",
            Self::Member => "identifier",
            Self::String => "string",
            Self::Attribute => "attribute",
            Self::Boolean => "boolean",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DirectiveTokenDescriptor {
    pub kind: DirectiveTokenKind,
    pub optional: bool,
}

/// Declares a `@keyword` the parser recognizes as a directive.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DirectiveDescriptor {
    pub name: Box<str>,
    pub kind: DirectiveKind,
    pub usage: DirectiveUsage,
    pub tokens: Vec<DirectiveTokenDescriptor>,
}

impl DirectiveDescriptor {
    pub fn new(name: impl Into<Box<str>>, kind: DirectiveKind) -> Self {
        Self { name: name.into(), kind, usage: DirectiveUsage::Unrestricted, tokens: Vec::new() }
    }

    pub fn single_line(name: impl Into<Box<str>>) -> Self {
        Self::new(name, DirectiveKind::SingleLine)
    }

    pub fn razor_block(name: impl Into<Box<str>>) -> Self {
        Self::new(name, DirectiveKind::RazorBlock)
    }

    pub fn code_block(name: impl Into<Box<str>>) -> Self {
        Self::new(name, DirectiveKind::CodeBlock)
    }

    #[must_use]
    pub fn usage(mut self, usage: DirectiveUsage) -> Self {
        self.usage = usage;
        self
    }

    #[must_use]
    pub fn token(mut self, kind: DirectiveTokenKind) -> Self {
        self.tokens.push(DirectiveTokenDescriptor { kind, optional: false });
        self
    }

    #[must_use]
    pub fn optional_token(mut self, kind: DirectiveTokenKind) -> Self {
        self.tokens.push(DirectiveTokenDescriptor { kind, optional: true });
        self
    }

    /// The `addTagHelper` family takes the rest of the line as free-form look-up text.
    pub(crate) fn is_tag_helper_directive(&self) -> bool {
        matches!(&*self.name, ADD_TAG_HELPER | REMOVE_TAG_HELPER | TAG_HELPER_PREFIX)
    }
}

pub const ADD_TAG_HELPER: &str = "addTagHelper";
pub const REMOVE_TAG_HELPER: &str = "removeTagHelper";
pub const TAG_HELPER_PREFIX: &str = "tagHelperPrefix";

/// Payload of the `Directive` annotation on `RAZOR_DIRECTIVE` nodes.
#[derive(Clone, PartialEq, Eq)]
pub struct DirectiveInfo {
    pub name: Box<str>,
    pub kind: DirectiveKind,
    pub usage: DirectiveUsage,
}

impl fmt::Debug for DirectiveInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{};{:?};{:?}}}", self.name, self.kind, self.usage)
    }
}

impl From<&DirectiveDescriptor> for DirectiveInfo {
    fn from(descriptor: &DirectiveDescriptor) -> Self {
        Self { name: descriptor.name.clone(), kind: descriptor.kind, usage: descriptor.usage }
    }
}

/// The directives every document of `file_kind` understands.
pub fn default_directives(file_kind: FileKind) -> Vec<DirectiveDescriptor> {
    use DirectiveTokenKind::*;
    use DirectiveUsage::*;

    let mut directives = vec![
        DirectiveDescriptor::code_block("functions"),
        DirectiveDescriptor::single_line("inherits").usage(FileScopedSinglyOccurring).token(Type),
        DirectiveDescriptor::single_line("implements").token(Type),
        DirectiveDescriptor::single_line("inject").token(Type).token(Member),
        DirectiveDescriptor::single_line("namespace").usage(FileScopedSinglyOccurring).token(Namespace),
        DirectiveDescriptor::single_line(ADD_TAG_HELPER).token(String),
        DirectiveDescriptor::single_line(REMOVE_TAG_HELPER).token(String),
        DirectiveDescriptor::single_line(TAG_HELPER_PREFIX).usage(FileScopedSinglyOccurring).token(String),
    ];

    match file_kind {
        FileKind::Legacy => directives.extend([
            DirectiveDescriptor::razor_block("section").token(Member),
            DirectiveDescriptor::single_line("model").usage(FileScopedSinglyOccurring).token(Type),
            DirectiveDescriptor::single_line("page").usage(FileScopedSinglyOccurring).optional_token(String),
        ]),
        FileKind::Component => directives.extend([
            DirectiveDescriptor::code_block("code"),
            DirectiveDescriptor::single_line("page").usage(FileScopedMultipleOccurring).token(String),
            DirectiveDescriptor::single_line("layout").usage(FileScopedSinglyOccurring).token(Type),
            DirectiveDescriptor::single_line("typeparam").token(Member).optional_token(Type),
            DirectiveDescriptor::single_line("attribute").token(Attribute),
            DirectiveDescriptor::single_line("preservewhitespace")
                .usage(FileScopedSinglyOccurring)
                .token(Boolean),
        ]),
    }

    directives
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registries_differ_per_file_kind() {
        let names = |kind| default_directives(kind).into_iter().map(|it| it.name).collect::<Vec<_>>();
        let legacy = names(FileKind::Legacy);
        let component = names(FileKind::Component);

        assert!(legacy.iter().any(|it| &**it == "section"));
        assert!(!component.iter().any(|it| &**it == "section"));
        assert!(component.iter().any(|it| &**it == "code"));
        assert!(legacy.iter().any(|it| &**it == TAG_HELPER_PREFIX));
    }

    #[test]
    fn directive_info_debug_format() {
        let info = DirectiveInfo::from(&DirectiveDescriptor::single_line("page"));
        assert_eq!(format!("{info:?}"), "{page;SingleLine;Unrestricted}");
    }
}
