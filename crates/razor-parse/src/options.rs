use std::str::FromStr;
use std::sync::Arc;

use razor_tokenizer::CSharpLanguageVersion;

use crate::directives::{DirectiveDescriptor, default_directives};

/// The two dialects of Razor documents.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FileKind {
    /// MVC views and pages (`.cshtml`).
    #[default]
    Legacy,
    /// Razor components (`.razor`).
    Component,
}

impl FileKind {
    pub fn from_extension(extension: &str) -> Option<Self> {
        if extension.eq_ignore_ascii_case("cshtml") {
            Some(Self::Legacy)
        } else if extension.eq_ignore_ascii_case("razor") {
            Some(Self::Component)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown file kind `{0}`, expected `legacy` or `component`")]
pub struct ParseFileKindError(String);

impl FromStr for FileKind {
    type Err = ParseFileKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "legacy" | "mvc" | "cshtml" => Ok(Self::Legacy),
            "component" | "razor" => Ok(Self::Component),
            _ => Err(ParseFileKindError(s.to_owned())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RazorParserFeatures {
    /// `<p @foo>`: C# between attributes of a tag.
    pub allow_csharp_in_markup_attribute_area: bool,
    pub allow_minimized_boolean_tag_helper_attributes: bool,
    /// `<input @bind="x">`: `@`-prefixed attribute names.
    pub allow_component_directive_attributes: bool,
}

impl RazorParserFeatures {
    pub fn for_file_kind(file_kind: FileKind) -> Self {
        match file_kind {
            FileKind::Legacy => Self {
                allow_csharp_in_markup_attribute_area: true,
                allow_minimized_boolean_tag_helper_attributes: true,
                allow_component_directive_attributes: false,
            },
            FileKind::Component => Self {
                allow_csharp_in_markup_attribute_area: false,
                allow_minimized_boolean_tag_helper_attributes: true,
                allow_component_directive_attributes: true,
            },
        }
    }
}

pub const DEFAULT_MAX_NESTING_DEPTH: u32 = 128;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RazorParserOptions {
    file_kind: FileKind,
    language_version: CSharpLanguageVersion,
    features: RazorParserFeatures,
    directives: Arc<[DirectiveDescriptor]>,
    max_nesting_depth: u32,
}

impl Default for RazorParserOptions {
    fn default() -> Self {
        Self::new(FileKind::Legacy)
    }
}

impl RazorParserOptions {
    pub fn new(file_kind: FileKind) -> Self {
        Self {
            file_kind,
            language_version: CSharpLanguageVersion::default(),
            features: RazorParserFeatures::for_file_kind(file_kind),
            directives: default_directives(file_kind).into(),
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }

    #[must_use]
    pub fn with_language_version(mut self, language_version: CSharpLanguageVersion) -> Self {
        self.language_version = language_version;
        self
    }

    #[must_use]
    pub fn with_features(mut self, features: RazorParserFeatures) -> Self {
        self.features = features;
        self
    }

    /// Registers extra directives; a descriptor replaces a built-in one of the same name.
    #[must_use]
    pub fn with_directives(mut self, directives: impl IntoIterator<Item = DirectiveDescriptor>) -> Self {
        let mut merged = self.directives.to_vec();
        for directive in directives {
            match merged.iter_mut().find(|it| it.name == directive.name) {
                Some(existing) => *existing = directive,
                None => merged.push(directive),
            }
        }
        self.directives = merged.into();
        self
    }

    #[must_use]
    pub fn with_max_nesting_depth(mut self, max_nesting_depth: u32) -> Self {
        self.max_nesting_depth = max_nesting_depth;
        self
    }

    pub fn file_kind(&self) -> FileKind {
        self.file_kind
    }

    pub fn language_version(&self) -> CSharpLanguageVersion {
        self.language_version
    }

    pub fn features(&self) -> RazorParserFeatures {
        self.features
    }

    pub fn directives(&self) -> &[DirectiveDescriptor] {
        &self.directives
    }

    pub fn directive(&self, name: &str) -> Option<&DirectiveDescriptor> {
        self.directives.iter().find(|it| &*it.name == name)
    }

    pub fn max_nesting_depth(&self) -> u32 {
        self.max_nesting_depth
    }
}
