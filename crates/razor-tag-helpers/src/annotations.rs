//! Payloads attached to rewritten nodes for the lowering stage.

use std::fmt;
use std::sync::Arc;

use crate::descriptor::TagHelperDescriptor;

pub const TAG_HELPER_ELEMENT: &str = "TagHelper";
pub const TAG_HELPER_ATTRIBUTE: &str = "TagHelperAttribute";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TagMode {
    StartTagAndEndTag,
    SelfClosing,
    StartTagOnly,
}

#[derive(Clone)]
pub struct TagHelperElementInfo {
    /// Tag name without the tag helper prefix.
    pub tag_name: Box<str>,
    pub tag_mode: TagMode,
    pub descriptors: Vec<Arc<TagHelperDescriptor>>,
}

impl fmt::Debug for TagHelperElementInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{};{:?};", self.tag_name, self.tag_mode)?;
        for (index, descriptor) in self.descriptors.iter().enumerate() {
            if index > 0 {
                f.write_str(",")?;
            }
            f.write_str(&descriptor.name)?;
        }
        f.write_str("}")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttributeValueStyle {
    DoubleQuotes,
    SingleQuotes,
    NoQuotes,
    Minimized,
}

/// What part of a bound attribute descriptor an attribute targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttributeBindingKind {
    Property,
    /// `asp-route-id`: a dictionary entry keyed by the text after the prefix.
    Indexer,
    /// `@bind:event`: a parameter of a directive attribute.
    Parameter,
}

#[derive(Clone, PartialEq, Eq)]
pub struct TagHelperAttributeInfo {
    /// Attribute name as written, without any `:parameter` suffix.
    pub name: Box<str>,
    pub parameter: Option<Box<str>>,
    /// Name of the bound attribute descriptor.
    pub bound: Box<str>,
    pub directive: bool,
    pub value_style: AttributeValueStyle,
    pub kind: AttributeBindingKind,
}

impl fmt::Debug for TagHelperAttributeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}", self.name)?;
        if let Some(parameter) = &self.parameter {
            write!(f, ":{parameter}")?;
        }
        write!(f, ";{:?};{:?}}}", self.kind, self.value_style)
    }
}
