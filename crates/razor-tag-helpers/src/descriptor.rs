//! Binding metadata supplied by the host.
//!
//! Descriptors are plain data: they are produced by whatever discovers tag
//! helpers in compiled assemblies and reach this crate either built in code or
//! deserialized from JSON.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagHelperDescriptor {
    pub name: String,
    #[serde(default)]
    pub type_name: String,
    #[serde(default)]
    pub assembly_name: String,
    pub tag_matching_rules: Vec<TagMatchingRule>,
    #[serde(default)]
    pub bound_attributes: Vec<BoundAttributeDescriptor>,
    /// Tag names allowed directly inside a bound element; empty means anything.
    #[serde(default)]
    pub allowed_child_tags: Vec<String>,
}

impl TagHelperDescriptor {
    pub fn new(name: impl Into<String>, assembly_name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            type_name: name.clone(),
            name,
            assembly_name: assembly_name.into(),
            tag_matching_rules: Vec::new(),
            bound_attributes: Vec::new(),
            allowed_child_tags: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = type_name.into();
        self
    }

    #[must_use]
    pub fn with_rule(mut self, rule: TagMatchingRule) -> Self {
        self.tag_matching_rules.push(rule);
        self
    }

    #[must_use]
    pub fn with_bound_attribute(mut self, attribute: BoundAttributeDescriptor) -> Self {
        self.bound_attributes.push(attribute);
        self
    }

    #[must_use]
    pub fn with_allowed_child_tag(mut self, tag: impl Into<String>) -> Self {
        self.allowed_child_tags.push(tag.into());
        self
    }
}

/// Reads a JSON array of descriptors.
pub fn descriptors_from_json(json: &str) -> serde_json::Result<Vec<TagHelperDescriptor>> {
    serde_json::from_str(json)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagMatchingRule {
    /// Tag name to match, or `*` for every tag.
    pub tag_name: String,
    #[serde(default)]
    pub parent_tag: Option<String>,
    #[serde(default)]
    pub tag_structure: TagStructure,
    #[serde(default)]
    pub attributes: Vec<RequiredAttribute>,
}

pub const CATCH_ALL_TAG: &str = "*";

impl TagMatchingRule {
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            parent_tag: None,
            tag_structure: TagStructure::Unspecified,
            attributes: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_parent_tag(mut self, parent_tag: impl Into<String>) -> Self {
        self.parent_tag = Some(parent_tag.into());
        self
    }

    #[must_use]
    pub fn with_tag_structure(mut self, tag_structure: TagStructure) -> Self {
        self.tag_structure = tag_structure;
        self
    }

    #[must_use]
    pub fn with_attribute(mut self, attribute: RequiredAttribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn is_catch_all(&self) -> bool {
        self.tag_name == CATCH_ALL_TAG
    }
}

/// How a matched tag may be written.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TagStructure {
    #[default]
    Unspecified,
    /// `<input>`: never has an end tag.
    WithoutEndTag,
    /// `<p></p>` or `<p />`.
    NormalOrSelfClosing,
}

impl TagStructure {
    /// Two rules targeting the same element may not disagree on whether an end
    /// tag is allowed.
    pub fn is_compatible_with(self, other: Self) -> bool {
        !matches!(
            (self, other),
            (Self::WithoutEndTag, Self::NormalOrSelfClosing) | (Self::NormalOrSelfClosing, Self::WithoutEndTag)
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequiredAttribute {
    pub name: String,
    #[serde(default)]
    pub name_comparison: NameComparison,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub value_comparison: ValueComparison,
}

impl RequiredAttribute {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            name_comparison: NameComparison::FullMatch,
            value: None,
            value_comparison: ValueComparison::None,
        }
    }

    /// Matches every attribute whose name starts with `prefix`.
    pub fn prefixed(prefix: impl Into<String>) -> Self {
        Self { name_comparison: NameComparison::PrefixMatch, ..Self::new(prefix) }
    }

    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>, comparison: ValueComparison) -> Self {
        self.value = Some(value.into());
        self.value_comparison = comparison;
        self
    }

    /// Names compare case-insensitively, values ordinally.
    pub fn is_match(&self, name: &str, value: &str) -> bool {
        let name_matches = match self.name_comparison {
            NameComparison::FullMatch => name.eq_ignore_ascii_case(&self.name),
            NameComparison::PrefixMatch => starts_with_ignore_ascii_case(name, &self.name),
        };
        if !name_matches {
            return false;
        }
        let expected = self.value.as_deref().unwrap_or_default();
        match self.value_comparison {
            ValueComparison::None => true,
            ValueComparison::FullMatch => value == expected,
            ValueComparison::PrefixMatch => value.starts_with(expected),
            ValueComparison::SuffixMatch => value.ends_with(expected),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NameComparison {
    #[default]
    FullMatch,
    PrefixMatch,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueComparison {
    #[default]
    None,
    FullMatch,
    PrefixMatch,
    SuffixMatch,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundAttributeDescriptor {
    /// Attribute name as written in markup; directive attributes include the `@`.
    pub name: String,
    pub type_name: String,
    /// `asp-route-` in `asp-route-id="1"`: the rest of the name is a dictionary key.
    #[serde(default)]
    pub indexer_name_prefix: Option<String>,
    #[serde(default)]
    pub indexer_type_name: Option<String>,
    #[serde(default)]
    pub is_directive_attribute: bool,
    /// `event` in `@bind:event`.
    #[serde(default)]
    pub parameters: Vec<BoundAttributeParameterDescriptor>,
}

impl BoundAttributeDescriptor {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            indexer_name_prefix: None,
            indexer_type_name: None,
            is_directive_attribute: false,
            parameters: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_indexer(mut self, prefix: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.indexer_name_prefix = Some(prefix.into());
        self.indexer_type_name = Some(type_name.into());
        self
    }

    #[must_use]
    pub fn directive(mut self) -> Self {
        self.is_directive_attribute = true;
        self
    }

    #[must_use]
    pub fn with_parameter(mut self, name: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.parameters.push(BoundAttributeParameterDescriptor { name: name.into(), type_name: type_name.into() });
        self
    }

    pub fn parameter(&self, name: &str) -> Option<&BoundAttributeParameterDescriptor> {
        self.parameters.iter().find(|it| it.name.eq_ignore_ascii_case(name))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundAttributeParameterDescriptor {
    pub name: String,
    pub type_name: String,
}

pub(crate) fn is_boolean_type(type_name: &str) -> bool {
    matches!(type_name, "bool" | "System.Boolean")
}

pub(crate) fn is_string_type(type_name: &str) -> bool {
    matches!(type_name, "string" | "System.String")
}

pub(crate) fn starts_with_ignore_ascii_case(text: &str, prefix: &str) -> bool {
    text.len() >= prefix.len()
        && text.is_char_boundary(prefix.len())
        && text[..prefix.len()].eq_ignore_ascii_case(prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_structure_compatibility() {
        use TagStructure::*;

        let all = [Unspecified, WithoutEndTag, NormalOrSelfClosing];
        let mut incompatible = Vec::new();
        for lhs in all {
            for rhs in all {
                assert_eq!(lhs.is_compatible_with(rhs), rhs.is_compatible_with(lhs));
                if !lhs.is_compatible_with(rhs) {
                    incompatible.push((lhs, rhs));
                }
            }
        }
        assert_eq!(incompatible, [(WithoutEndTag, NormalOrSelfClosing), (NormalOrSelfClosing, WithoutEndTag)]);
    }

    #[test]
    fn required_attribute_comparisons() {
        let full = RequiredAttribute::new("asp-for");
        assert!(full.is_match("ASP-FOR", ""));
        assert!(!full.is_match("asp-format", ""));

        let prefix = RequiredAttribute::prefixed("asp-route-");
        assert!(prefix.is_match("asp-route-id", "1"));
        assert!(!prefix.is_match("asp-rout", "1"));

        let value = RequiredAttribute::new("type").with_value("check", ValueComparison::PrefixMatch);
        assert!(value.is_match("type", "checkbox"));
        assert!(!value.is_match("type", "Checkbox"));

        let suffix = RequiredAttribute::new("src").with_value(".js", ValueComparison::SuffixMatch);
        assert!(suffix.is_match("src", "~/site.js"));
        assert!(!suffix.is_match("src", "~/site.css"));
    }

    #[test]
    fn deserializes_with_defaults() {
        let json = r#"[{
            "name": "InputTagHelper",
            "assemblyName": "Microsoft.AspNetCore.Mvc.TagHelpers",
            "tagMatchingRules": [
                { "tagName": "input", "tagStructure": "WithoutEndTag",
                  "attributes": [{ "name": "asp-for" }] }
            ],
            "boundAttributes": [{ "name": "asp-for", "typeName": "ModelExpression" }]
        }]"#;
        let descriptors = descriptors_from_json(json).unwrap();
        let expected = TagHelperDescriptor::new("InputTagHelper", "Microsoft.AspNetCore.Mvc.TagHelpers")
            .with_rule(
                TagMatchingRule::new("input")
                    .with_tag_structure(TagStructure::WithoutEndTag)
                    .with_attribute(RequiredAttribute::new("asp-for")),
            )
            .with_bound_attribute(BoundAttributeDescriptor::new("asp-for", "ModelExpression"));
        assert_eq!(descriptors, [TagHelperDescriptor { type_name: String::new(), ..expected }]);
    }
}
