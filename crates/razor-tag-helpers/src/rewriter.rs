//! Turns elements and attributes bound to tag helpers into tag helper nodes.
//!
//! The pass walks the red tree and rebuilds only the spines that lead to a
//! rewritten element; every untouched subtree is shared with the input tree.
//! Node kinds and annotations change, token text never does, so the rewritten
//! tree has exactly the width of the input.

use std::slice;

use razor_errors::{Diagnostic, catalog};
use razor_parse::{RazorParserFeatures, RazorParserOptions, is_void_element};
use razor_syntax::SyntaxKind::*;
use razor_syntax::{
    Annotation, GreenElement, GreenNode, GreenToken, NodeOrToken, RazorSyntaxTree, SyntaxKind, SyntaxNode,
};
use text_size::{TextRange, TextSize};

use crate::annotations::{
    AttributeBindingKind, AttributeValueStyle, TAG_HELPER_ATTRIBUTE, TAG_HELPER_ELEMENT, TagHelperAttributeInfo,
    TagHelperElementInfo, TagMode,
};
use crate::binder::{TagHelperBinder, TagHelperBinding};
use crate::descriptor::{
    BoundAttributeDescriptor, TagHelperDescriptor, TagStructure, is_boolean_type, is_string_type,
    starts_with_ignore_ascii_case,
};
use crate::document_context::TagHelperDocumentContext;

#[derive(Clone, Debug)]
pub struct RewriteResult {
    pub tree: RazorSyntaxTree,
    /// Diagnostics produced by the rewrite, ordered by position. They are also
    /// attached to the rewritten tree.
    pub diagnostics: Vec<Diagnostic>,
}

pub fn rewrite(
    tree: &RazorSyntaxTree,
    context: &TagHelperDocumentContext,
    options: &RazorParserOptions,
) -> RewriteResult {
    let binder = context.binder();
    if binder.descriptors().is_empty() {
        return RewriteResult { tree: tree.clone(), diagnostics: Vec::new() };
    }

    let mut rewriter =
        Rewriter { binder: &binder, features: options.features(), parents: Vec::new(), diagnostics: Vec::new() };
    let rewritten = match rewriter.children(tree.root()) {
        Some(root) if keeps_width(tree, &root) => tree.with_root(root),
        Some(_) => return RewriteResult { tree: tree.clone(), diagnostics: Vec::new() },
        None => tree.clone(),
    };

    let mut diagnostics = rewriter.diagnostics;
    diagnostics.sort_by_key(|it| it.range().start());
    log::debug!("tag helper rewrite produced {} diagnostics", diagnostics.len());
    RewriteResult { tree: rewritten, diagnostics }
}

/// Whether a rewritten root still covers the whole source. When it does not,
/// the rewrite is dropped and the parsed tree is returned unchanged.
pub(crate) fn keeps_width(tree: &RazorSyntaxTree, root: &GreenNode) -> bool {
    let (expected, actual) = (tree.root().width(), root.width());
    if expected != actual {
        log::error!("tag helper rewrite changed the document width from {expected:?} to {actual:?}, keeping the parsed tree");
    }
    expected == actual
}

/// An element enclosing the one being rewritten.
struct Parent {
    /// Tag name, without the prefix for tag helpers.
    name: Box<str>,
    tag_helper: bool,
    allowed_children: Option<Vec<Box<str>>>,
}

struct Rewriter<'a> {
    binder: &'a TagHelperBinder,
    features: RazorParserFeatures,
    parents: Vec<Parent>,
    diagnostics: Vec<Diagnostic>,
}

impl Rewriter<'_> {
    /// Replacement for `node`, `None` when it is unchanged. An element may
    /// turn into several siblings.
    fn visit(&mut self, node: &SyntaxNode) -> Option<Vec<GreenElement>> {
        match node.kind() {
            MARKUP_ELEMENT => self.element(node),
            kind if kind.is_literal() => None,
            _ => self.children(node).map(|green| vec![green.into()]),
        }
    }

    fn children(&mut self, node: &SyntaxNode) -> Option<GreenNode> {
        let mut slots = Vec::with_capacity(node.slot_count());
        let mut changed = false;
        for index in 0..node.slot_count() {
            let original = node.green().slot(index).cloned();
            let Some(NodeOrToken::Node(child)) = node.slot(index) else {
                slots.push(original);
                continue;
            };
            match self.visit(&child) {
                Some(replacement) if node.kind().is_list() => {
                    changed = true;
                    slots.extend(replacement.into_iter().map(Some));
                }
                Some(replacement) => {
                    changed = true;
                    slots.push(single(replacement));
                }
                None => slots.push(original),
            }
        }
        changed.then(|| node.green().reshaped(node.kind(), slots))
    }

    fn element(&mut self, element: &SyntaxNode) -> Option<Vec<GreenElement>> {
        let Some(start) = node_slot(element, 0) else {
            return self.orphan_end_tag(element);
        };
        let tag = StartTag::read(&start);

        let mut diagnostics = Vec::new();
        let binding = if tag.name.is_empty() || tag.bang {
            None
        } else {
            diagnostics.extend(self.invalid_child(&tag));
            let attributes: Vec<_> = tag.attributes.iter().map(|it| (&*it.name, &*it.value)).collect();
            let parent = self.parents.last().map(|it| &*it.name);
            self.binder.get_binding(&tag.name, &attributes, parent)
        };

        let rewritten = match binding {
            Some(binding) => Some(self.tag_helper_element(element, &start, &tag, &binding, &mut diagnostics)),
            None => self.plain_element(element, &tag),
        };
        if diagnostics.is_empty() {
            return rewritten;
        }

        let mut elements = rewritten.unwrap_or_else(|| vec![element.green().clone().into()]);
        if let Some(NodeOrToken::Node(first)) = elements.first_mut() {
            *first = attach(first, element.offset(), &diagnostics);
        }
        self.diagnostics.extend(diagnostics);
        Some(elements)
    }

    fn plain_element(&mut self, element: &SyntaxNode, tag: &StartTag) -> Option<Vec<GreenElement>> {
        self.parents.push(Parent { name: tag.name.clone(), tag_helper: false, allowed_children: None });
        let green = self.children(element);
        self.parents.pop();
        green.map(|it| vec![it.into()])
    }

    /// A child element that the nearest enclosing tag helper does not allow.
    fn invalid_child(&self, tag: &StartTag) -> Option<Diagnostic> {
        let parent = self.parents.iter().rev().find(|it| it.tag_helper)?;
        let allowed = parent.allowed_children.as_ref()?;
        let name = self.binder.strip_prefix(&tag.name).unwrap_or(&tag.name);
        if allowed.iter().any(|it| it.eq_ignore_ascii_case(name)) {
            return None;
        }
        Some(catalog::invalid_tag_helper_child(tag.name_range, &tag.name, &parent.name, &allowed.join(", ")))
    }

    fn tag_helper_element(
        &mut self,
        element: &SyntaxNode,
        start: &SyntaxNode,
        tag: &StartTag,
        binding: &TagHelperBinding,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Vec<GreenElement> {
        if let Some((first, second)) = binding.structure_conflict() {
            log::debug!("<{}> binds tag helpers with conflicting structures", tag.name);
            diagnostics.push(catalog::inconsistent_tag_structure(tag.name_range, &first.name, &second.name, &tag.name));
        }

        let body = node_slot(element, 1);
        let end = node_slot(element, 2);
        let without_end_tag = binding
            .rules()
            .find(|(_, rule)| rule.tag_structure == TagStructure::WithoutEndTag)
            .map(|(descriptor, _)| descriptor);
        let tag_mode = if tag.self_closing {
            TagMode::SelfClosing
        } else if without_end_tag.is_some() || (end.is_none() && is_void_element(&binding.tag_name)) {
            TagMode::StartTagOnly
        } else {
            if end.is_none() {
                diagnostics.push(catalog::malformed_tag_helper(tag.name_range, &tag.name));
            }
            TagMode::StartTagAndEndTag
        };

        let start_tag = self.start_tag(start, tag, binding, diagnostics);

        // A tag helper without an end tag cannot own what the parser put in its body.
        let mut siblings = Vec::new();
        let (body, end) = match without_end_tag {
            Some(descriptor) if tag_mode == TagMode::StartTagOnly => {
                if let Some(body) = &body {
                    let list = self.children(body).unwrap_or_else(|| body.green().clone());
                    siblings.extend(list.slots().iter().flatten().cloned());
                }
                if let Some(end) = &end {
                    siblings.push(self.stray_end_tag(end, descriptor).into());
                }
                (None, None)
            }
            _ => {
                self.parents.push(Parent {
                    name: binding.tag_name.clone(),
                    tag_helper: true,
                    allowed_children: binding.allowed_children(),
                });
                let body = body.map(|body| self.children(&body).unwrap_or_else(|| body.green().clone()));
                self.parents.pop();
                let end = end.map(|end| end.green().reshaped(MARKUP_TAG_HELPER_END_TAG, end.green().slots().to_vec()));
                (body, end)
            }
        };

        let info = TagHelperElementInfo {
            tag_name: binding.tag_name.clone(),
            tag_mode,
            descriptors: binding.descriptors().cloned().collect(),
        };
        log::trace!("rewrote {:?} as {info:?}", element.text_range());
        let green = element.green().reshaped(
            MARKUP_TAG_HELPER_ELEMENT,
            [Some(start_tag.into()), body.map(GreenElement::from), end.map(GreenElement::from)],
        );
        let mut elements = vec![annotate(&green, Annotation::new(TAG_HELPER_ELEMENT, info)).into()];
        elements.extend(siblings);
        elements
    }

    fn start_tag(
        &mut self,
        start: &SyntaxNode,
        tag: &StartTag,
        binding: &TagHelperBinding,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> GreenNode {
        let mut slots = start.green().slots().to_vec();
        if let Some(list) = node_slot(start, 3) {
            let mut attributes = Vec::with_capacity(list.slot_count());
            for child in list.children_with_tokens() {
                match child {
                    NodeOrToken::Node(node) => attributes.push(self.attribute(&node, tag, binding, diagnostics).into()),
                    NodeOrToken::Token(token) => attributes.push(token.green().clone().into()),
                }
            }
            slots[3] = GreenNode::new_list(attributes).map(GreenElement::from);
        }
        start.green().reshaped(MARKUP_TAG_HELPER_START_TAG, slots)
    }

    fn attribute(
        &mut self,
        node: &SyntaxNode,
        tag: &StartTag,
        binding: &TagHelperBinding,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> GreenNode {
        let green = self.children(node).unwrap_or_else(|| node.green().clone());
        let Some(attribute) = tag.attributes.iter().find(|it| it.node == *node) else { return green };
        let Some(bound) = BoundAttribute::find(binding, &attribute.name) else { return green };

        let error = || catalog::empty_bound_attribute(attribute.name_range, &attribute.name, &tag.name, bound.type_name);
        let is_boolean = is_boolean_type(bound.type_name);
        if attribute.style == AttributeValueStyle::Minimized {
            if is_boolean && !self.features.allow_minimized_boolean_tag_helper_attributes {
                diagnostics.push(error());
                return green;
            }
            if !is_boolean {
                diagnostics.push(error());
            }
        } else if !is_string_type(bound.type_name) && is_blank_value(attribute) {
            diagnostics.push(error());
        }

        let directive = bound.attribute.is_directive_attribute;
        let info = TagHelperAttributeInfo {
            name: bound.name.into(),
            parameter: bound.parameter.map(Box::from),
            bound: bound.attribute.name.as_str().into(),
            directive,
            value_style: attribute.style,
            kind: bound.kind,
        };
        let slot = |index: usize| green.slot(index).cloned();
        let rewritten = match (attribute.style, directive) {
            (AttributeValueStyle::Minimized, false) => {
                green.reshaped(MARKUP_MINIMIZED_TAG_HELPER_ATTRIBUTE, green.slots().to_vec())
            }
            (_, false) => green.reshaped(
                MARKUP_TAG_HELPER_ATTRIBUTE,
                [slot(0), slot(1), slot(2), slot(3), slot(4), attribute_value(&green), slot(6)],
            ),
            (AttributeValueStyle::Minimized, true) => {
                let [transition, name, colon, parameter] = split_directive_name(bound.name, bound.parameter);
                green.reshaped(MARKUP_MINIMIZED_TAG_HELPER_DIRECTIVE_ATTRIBUTE, [slot(0), transition, name, colon, parameter])
            }
            (_, true) => {
                let [transition, name, colon, parameter] = split_directive_name(bound.name, bound.parameter);
                green.reshaped(
                    MARKUP_TAG_HELPER_DIRECTIVE_ATTRIBUTE,
                    [
                        slot(0),
                        transition,
                        name,
                        colon,
                        parameter,
                        slot(2),
                        slot(3),
                        slot(4),
                        attribute_value(&green),
                        slot(6),
                    ],
                )
            }
        };
        annotate(&rewritten, Annotation::new(TAG_HELPER_ATTRIBUTE, info))
    }

    /// The end tag of a tag helper that must not have one, kept as an end-tag-only element.
    fn stray_end_tag(&mut self, end: &SyntaxNode, descriptor: &TagHelperDescriptor) -> GreenNode {
        let (name, range) = end_tag_name(end);
        let diagnostic = catalog::end_tag_for_without_end_tag_helper(range, &name, &descriptor.name);
        let element = GreenNode::new(MARKUP_ELEMENT, [None, None, Some(end.green().clone().into())]);
        let element = attach(&element, end.offset(), slice::from_ref(&diagnostic));
        self.diagnostics.push(diagnostic);
        element
    }

    fn orphan_end_tag(&mut self, element: &SyntaxNode) -> Option<Vec<GreenElement>> {
        let end = node_slot(element, 2)?;
        let (name, range) = end_tag_name(&end);
        if name.is_empty() {
            return None;
        }
        let parent = self.parents.last().map(|it| &*it.name);
        let binding = self.binder.get_binding(&name, &[], parent)?;
        let (descriptor, _) = binding.rules().find(|(_, rule)| rule.tag_structure == TagStructure::WithoutEndTag)?;

        let diagnostic = catalog::end_tag_for_without_end_tag_helper(range, &name, &descriptor.name);
        let green = attach(element.green(), element.offset(), slice::from_ref(&diagnostic));
        self.diagnostics.push(diagnostic);
        Some(vec![green.into()])
    }
}

struct StartTag {
    name: Box<str>,
    name_range: TextRange,
    /// `<!p>` opts the element out of tag helper binding.
    bang: bool,
    self_closing: bool,
    attributes: Vec<AttributeSyntax>,
}

impl StartTag {
    fn read(start: &SyntaxNode) -> Self {
        let (name, name_range) = match start.slot(2).and_then(NodeOrToken::into_token) {
            Some(token) => (token.text().into(), token.text_range()),
            None => (Box::default(), start.text_range()),
        };
        let attributes = node_slot(start, 3)
            .map(|list| list.children().filter_map(|it| AttributeSyntax::read(&it)).collect())
            .unwrap_or_default();
        Self {
            name,
            name_range,
            bang: start.slot(1).is_some(),
            self_closing: start.slot(4).is_some(),
            attributes,
        }
    }
}

struct AttributeSyntax {
    node: SyntaxNode,
    name: Box<str>,
    name_range: TextRange,
    value: Box<str>,
    value_node: Option<SyntaxNode>,
    style: AttributeValueStyle,
}

impl AttributeSyntax {
    fn read(node: &SyntaxNode) -> Option<Self> {
        let (value_node, style) = match node.kind() {
            MARKUP_MINIMIZED_ATTRIBUTE_BLOCK => (None, AttributeValueStyle::Minimized),
            MARKUP_ATTRIBUTE_BLOCK => {
                let quote = node_slot(node, 4).and_then(|prefix| prefix.text().chars().last());
                let style = match quote {
                    Some('"') => AttributeValueStyle::DoubleQuotes,
                    Some('\'') => AttributeValueStyle::SingleQuotes,
                    _ => AttributeValueStyle::NoQuotes,
                };
                (node_slot(node, 5), style)
            }
            _ => return None,
        };
        let name = node_slot(node, 1)?;
        Some(Self {
            node: node.clone(),
            name: name.text().into(),
            name_range: name.text_range(),
            value: value_node.as_ref().map(SyntaxNode::text).unwrap_or_default().into(),
            value_node,
            style,
        })
    }
}

/// An attribute matched against a bound attribute of one of the element's descriptors.
struct BoundAttribute<'b> {
    attribute: &'b BoundAttributeDescriptor,
    /// Attribute name without the `:parameter` suffix.
    name: &'b str,
    parameter: Option<&'b str>,
    type_name: &'b str,
    kind: AttributeBindingKind,
}

impl<'b> BoundAttribute<'b> {
    fn find(binding: &'b TagHelperBinding, name: &'b str) -> Option<Self> {
        let directive = name.starts_with('@');
        let (base, parameter) = match name.split_once(':') {
            Some((base, parameter)) if directive => (base, Some(parameter)),
            _ => (name, None),
        };

        for descriptor in binding.descriptors() {
            for attribute in &descriptor.bound_attributes {
                if attribute.is_directive_attribute {
                    if !directive || !attribute.name.eq_ignore_ascii_case(base) {
                        continue;
                    }
                    match parameter {
                        None => {
                            let kind = AttributeBindingKind::Property;
                            return Some(Self { attribute, name: base, parameter, type_name: &attribute.type_name, kind });
                        }
                        Some(parameter) => {
                            if let Some(declared) = attribute.parameter(parameter) {
                                let kind = AttributeBindingKind::Parameter;
                                let type_name = &declared.type_name;
                                return Some(Self { attribute, name: base, parameter: Some(parameter), type_name, kind });
                            }
                        }
                    }
                } else if attribute.name.eq_ignore_ascii_case(name) {
                    let kind = AttributeBindingKind::Property;
                    return Some(Self { attribute, name, parameter: None, type_name: &attribute.type_name, kind });
                } else if let (Some(prefix), Some(type_name)) =
                    (&attribute.indexer_name_prefix, &attribute.indexer_type_name)
                {
                    if name.len() > prefix.len() && starts_with_ignore_ascii_case(name, prefix) {
                        let kind = AttributeBindingKind::Indexer;
                        return Some(Self { attribute, name, parameter: None, type_name, kind });
                    }
                }
            }
        }
        None
    }
}

/// A value that produces no expression: absent, blank, or code preceded by
/// whitespace.
fn is_blank_value(attribute: &AttributeSyntax) -> bool {
    if attribute.value_node.is_none() {
        return true;
    }
    let trimmed = attribute.value.trim_start();
    trimmed.is_empty() || (trimmed.len() < attribute.value.len() && trimmed.starts_with('@'))
}

/// Slot 5 of an attribute block, as a tag helper attribute value.
fn attribute_value(attribute: &GreenNode) -> Option<GreenElement> {
    match attribute.slot(5)? {
        NodeOrToken::Node(value) => {
            Some(value.reshaped(MARKUP_TAG_HELPER_ATTRIBUTE_VALUE, value.slots().to_vec()).into())
        }
        token => Some(token.clone()),
    }
}

/// `@bind:event` as transition, name, colon and parameter slots.
fn split_directive_name(name: &str, parameter: Option<&str>) -> [Option<GreenElement>; 4] {
    let (transition, rest) = name.split_at(1);
    [
        Some(literal(RAZOR_META_CODE, TRANSITION, transition)),
        Some(literal(MARKUP_TEXT_LITERAL, TEXT, rest)),
        parameter.map(|_| literal(RAZOR_META_CODE, COLON, ":")),
        parameter.filter(|it| !it.is_empty()).map(|it| literal(MARKUP_TEXT_LITERAL, TEXT, it)),
    ]
}

fn literal(kind: SyntaxKind, token: SyntaxKind, text: &str) -> GreenElement {
    let list = GreenNode::new_list([GreenToken::new(token, text).into()]);
    GreenNode::new(kind, [list.map(GreenElement::from)]).into()
}

fn end_tag_name(end: &SyntaxNode) -> (Box<str>, TextRange) {
    match end.slot(3).and_then(NodeOrToken::into_token) {
        Some(token) => (token.text().into(), token.text_range()),
        None => (Box::default(), end.text_range()),
    }
}

fn node_slot(node: &SyntaxNode, index: usize) -> Option<SyntaxNode> {
    node.slot(index)?.into_node()
}

fn single(mut elements: Vec<GreenElement>) -> Option<GreenElement> {
    if elements.len() == 1 { elements.pop() } else { GreenNode::new_list(elements).map(GreenElement::from) }
}

/// Adds `diagnostics`, whose ranges are absolute, to a node starting at `offset`.
fn attach(node: &GreenNode, offset: TextSize, diagnostics: &[Diagnostic]) -> GreenNode {
    let mut all = node.diagnostics().map(|it| it.to_vec()).unwrap_or_default();
    all.extend(diagnostics.iter().map(|it| it.shifted_left(offset)));
    node.with_diagnostics(all)
}

fn annotate(node: &GreenNode, annotation: Annotation) -> GreenNode {
    let mut all = node.annotations().map(|it| it.to_vec()).unwrap_or_default();
    all.push(annotation);
    node.with_annotations(all)
}
