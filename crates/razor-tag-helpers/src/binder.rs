use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::descriptor::{TagHelperDescriptor, TagMatchingRule, TagStructure, starts_with_ignore_ascii_case};

/// Finds the descriptors that apply to an element.
///
/// Descriptors are indexed by the lower-cased tag name of each of their
/// rules; rules targeting `*` are checked for every element.
#[derive(Clone, Debug, Default)]
pub struct TagHelperBinder {
    prefix: Option<Box<str>>,
    descriptors: Vec<Arc<TagHelperDescriptor>>,
    by_tag: FxHashMap<Box<str>, Vec<usize>>,
    catch_all: Vec<usize>,
}

impl TagHelperBinder {
    pub fn new(prefix: Option<&str>, descriptors: impl IntoIterator<Item = Arc<TagHelperDescriptor>>) -> Self {
        let mut binder = Self {
            prefix: prefix.filter(|it| !it.is_empty()).map(Box::from),
            ..Self::default()
        };
        for descriptor in descriptors {
            let index = binder.descriptors.len();
            for rule in &descriptor.tag_matching_rules {
                let bucket = if rule.is_catch_all() {
                    &mut binder.catch_all
                } else {
                    binder.by_tag.entry(rule.tag_name.to_ascii_lowercase().into()).or_default()
                };
                if bucket.last() != Some(&index) {
                    bucket.push(index);
                }
            }
            binder.descriptors.push(descriptor);
        }
        binder
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn descriptors(&self) -> &[Arc<TagHelperDescriptor>] {
        &self.descriptors
    }

    /// `tag_name` without the tag helper prefix, or `None` when a prefix is
    /// in effect and the name does not carry it.
    pub fn strip_prefix<'a>(&self, tag_name: &'a str) -> Option<&'a str> {
        match self.prefix.as_deref() {
            None => Some(tag_name),
            Some(prefix) if starts_with_ignore_ascii_case(tag_name, prefix) && tag_name.len() > prefix.len() => {
                Some(&tag_name[prefix.len()..])
            }
            Some(_) => None,
        }
    }

    /// The descriptors whose rules accept `tag_name` (as written, including
    /// any prefix) with these attributes under `parent_tag`.
    pub fn get_binding(
        &self,
        tag_name: &str,
        attributes: &[(&str, &str)],
        parent_tag: Option<&str>,
    ) -> Option<TagHelperBinding> {
        let unprefixed = self.strip_prefix(tag_name)?;

        let mut candidates = self.catch_all.clone();
        if let Some(indices) = self.by_tag.get(unprefixed.to_ascii_lowercase().as_str()) {
            candidates.extend_from_slice(indices);
        }
        candidates.sort_unstable();
        candidates.dedup();

        let mappings: Vec<_> = candidates
            .into_iter()
            .filter_map(|index| {
                let descriptor = &self.descriptors[index];
                let rules: Vec<_> = descriptor
                    .tag_matching_rules
                    .iter()
                    .filter(|rule| rule_matches(rule, unprefixed, attributes, parent_tag))
                    .cloned()
                    .collect();
                (!rules.is_empty()).then(|| (descriptor.clone(), rules))
            })
            .collect();
        if mappings.is_empty() {
            return None;
        }

        log::debug!("<{tag_name}> binds {} tag helper(s)", mappings.len());
        Some(TagHelperBinding { tag_name: unprefixed.into(), mappings })
    }
}

fn rule_matches(rule: &TagMatchingRule, tag_name: &str, attributes: &[(&str, &str)], parent_tag: Option<&str>) -> bool {
    if !rule.is_catch_all() && !rule.tag_name.eq_ignore_ascii_case(tag_name) {
        return false;
    }
    if let Some(expected) = &rule.parent_tag {
        if !parent_tag.is_some_and(|parent| parent.eq_ignore_ascii_case(expected)) {
            return false;
        }
    }
    rule.attributes
        .iter()
        .all(|required| attributes.iter().any(|&(name, value)| required.is_match(name, value)))
}

/// The result of binding one element.
#[derive(Clone, Debug)]
pub struct TagHelperBinding {
    /// Tag name without the prefix.
    pub tag_name: Box<str>,
    pub mappings: Vec<(Arc<TagHelperDescriptor>, Vec<TagMatchingRule>)>,
}

impl TagHelperBinding {
    pub fn descriptors(&self) -> impl Iterator<Item = &Arc<TagHelperDescriptor>> {
        self.mappings.iter().map(|(descriptor, _)| descriptor)
    }

    pub fn rules(&self) -> impl Iterator<Item = (&TagHelperDescriptor, &TagMatchingRule)> {
        self.mappings.iter().flat_map(|(descriptor, rules)| rules.iter().map(move |rule| (&**descriptor, rule)))
    }

    pub fn is_without_end_tag(&self) -> bool {
        self.rules().any(|(_, rule)| rule.tag_structure == TagStructure::WithoutEndTag)
    }

    /// The first pair of descriptors whose rules disagree on the tag structure.
    pub fn structure_conflict(&self) -> Option<(&TagHelperDescriptor, &TagHelperDescriptor)> {
        let mut first: Option<(&TagHelperDescriptor, TagStructure)> = None;
        for (descriptor, rule) in self.rules() {
            if rule.tag_structure == TagStructure::Unspecified {
                continue;
            }
            match first {
                None => first = Some((descriptor, rule.tag_structure)),
                Some((other, structure)) if !structure.is_compatible_with(rule.tag_structure) => {
                    return Some((other, descriptor));
                }
                Some(_) => {}
            }
        }
        None
    }

    /// Union of the allowed child tags of every bound descriptor, or `None`
    /// when no descriptor restricts its children.
    pub fn allowed_children(&self) -> Option<Vec<Box<str>>> {
        let mut allowed: Vec<Box<str>> = Vec::new();
        for descriptor in self.descriptors() {
            for tag in &descriptor.allowed_child_tags {
                if !allowed.iter().any(|it| it.eq_ignore_ascii_case(tag)) {
                    allowed.push(tag.as_str().into());
                }
            }
        }
        (!allowed.is_empty()).then_some(allowed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{RequiredAttribute, TagStructure};

    fn binder(prefix: Option<&str>, descriptors: Vec<TagHelperDescriptor>) -> TagHelperBinder {
        TagHelperBinder::new(prefix, descriptors.into_iter().map(Arc::new))
    }

    fn names(binding: Option<TagHelperBinding>) -> Vec<String> {
        binding.map_or_else(Vec::new, |it| it.descriptors().map(|d| d.name.clone()).collect())
    }

    #[test]
    fn binds_by_tag_name_case_insensitively() {
        let binder = binder(None, vec![TagHelperDescriptor::new("P", "A").with_rule(TagMatchingRule::new("p"))]);
        assert_eq!(names(binder.get_binding("P", &[], None)), ["P"]);
        assert!(binder.get_binding("div", &[], None).is_none());
    }

    #[test]
    fn catch_all_and_specific_rules_both_bind() {
        let binder = binder(
            None,
            vec![
                TagHelperDescriptor::new("Any", "A")
                    .with_rule(TagMatchingRule::new("*").with_attribute(RequiredAttribute::new("x"))),
                TagHelperDescriptor::new("Div", "A").with_rule(TagMatchingRule::new("div")),
            ],
        );
        assert_eq!(names(binder.get_binding("div", &[("x", "")], None)), ["Any", "Div"]);
        assert_eq!(names(binder.get_binding("div", &[], None)), ["Div"]);
        assert_eq!(names(binder.get_binding("span", &[("X", "1")], None)), ["Any"]);
    }

    #[test]
    fn prefix_is_required_and_stripped() {
        let binder = binder(Some("th:"), vec![TagHelperDescriptor::new("P", "A").with_rule(TagMatchingRule::new("p"))]);
        assert!(binder.get_binding("p", &[], None).is_none());
        let binding = binder.get_binding("TH:p", &[], None);
        assert_eq!(binding.map(|it| it.tag_name), Some("p".into()));
        assert!(binder.get_binding("th:", &[], None).is_none());
    }

    #[test]
    fn parent_tag_must_match() {
        let binder = binder(
            None,
            vec![TagHelperDescriptor::new("Li", "A").with_rule(TagMatchingRule::new("li").with_parent_tag("ul"))],
        );
        assert!(binder.get_binding("li", &[], None).is_none());
        assert!(binder.get_binding("li", &[], Some("ol")).is_none());
        assert_eq!(names(binder.get_binding("li", &[], Some("UL"))), ["Li"]);
    }

    #[test]
    fn detects_structure_conflicts() {
        let binder = binder(
            None,
            vec![
                TagHelperDescriptor::new("First", "A")
                    .with_rule(TagMatchingRule::new("input").with_tag_structure(TagStructure::WithoutEndTag)),
                TagHelperDescriptor::new("Loose", "A").with_rule(TagMatchingRule::new("input")),
                TagHelperDescriptor::new("Second", "A")
                    .with_rule(TagMatchingRule::new("input").with_tag_structure(TagStructure::NormalOrSelfClosing)),
            ],
        );
        let binding = binder.get_binding("input", &[], None).unwrap();
        assert!(binding.is_without_end_tag());
        let conflict = binding.structure_conflict().map(|(a, b)| (a.name.as_str(), b.name.as_str()));
        assert_eq!(conflict, Some(("First", "Second")));
    }
}
