//! Rule buckets keyed by the most selective simple selector of each rule's
//! subject, so matching only visits rules that can possibly apply.

use std::collections::HashMap;

use css_selectors::SimpleSelector;

use crate::stylesheet::StyleRule;

#[derive(Debug, Default)]
pub struct RuleIndex {
    by_id: HashMap<String, Vec<usize>>,
    by_class: HashMap<String, Vec<usize>>,
    by_tag: HashMap<String, Vec<usize>>,
    universal: Vec<usize>,
}

enum BucketKey<'rule> {
    Id(&'rule str),
    Class(&'rule str),
    Tag(&'rule str),
    Universal,
}

fn bucket_key(rule: &StyleRule) -> BucketKey<'_> {
    let simples = &rule.selector.subject().simples;
    let mut key = BucketKey::Universal;
    for simple in simples {
        match (simple, &key) {
            (SimpleSelector::IdSelector(id), _) => return BucketKey::Id(id),
            (SimpleSelector::Class(class), BucketKey::Tag(_) | BucketKey::Universal) => {
                key = BucketKey::Class(class);
            }
            (SimpleSelector::Type(tag), BucketKey::Universal) => key = BucketKey::Tag(tag),
            _ => {}
        }
    }
    key
}

impl RuleIndex {
    /// Index the rules of `rules` accepted by `include` (e.g. media-matching ones).
    pub fn build(rules: &[StyleRule], include: impl Fn(&StyleRule) -> bool) -> Self {
        let mut index = Self::default();
        for (position, rule) in rules.iter().enumerate() {
            if !include(rule) {
                continue;
            }
            match bucket_key(rule) {
                BucketKey::Id(id) => index.by_id.entry(id.to_owned()).or_default().push(position),
                BucketKey::Class(class) => index
                    .by_class
                    .entry(class.to_owned())
                    .or_default()
                    .push(position),
                BucketKey::Tag(tag) => index
                    .by_tag
                    .entry(tag.to_owned())
                    .or_default()
                    .push(position),
                BucketKey::Universal => index.universal.push(position),
            }
        }
        index
    }

    /// Rule positions that may match an element, ascending and deduplicated.
    pub fn candidates<'element>(
        &self,
        tag: &str,
        id: Option<&str>,
        classes: impl Iterator<Item = &'element str>,
    ) -> Vec<usize> {
        let mut found: Vec<usize> = self.universal.clone();
        if let Some(bucket) = id.and_then(|id| self.by_id.get(id)) {
            found.extend_from_slice(bucket);
        }
        for class in classes {
            if let Some(bucket) = self.by_class.get(class) {
                found.extend_from_slice(bucket);
            }
        }
        if let Some(bucket) = self.by_tag.get(tag) {
            found.extend_from_slice(bucket);
        }
        found.sort_unstable();
        found.dedup();
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stylesheet::{Origin, SheetSource, StyleSet};
    use std::iter;

    #[test]
    fn buckets_pick_the_most_selective_key() {
        let mut set = StyleSet::new();
        set.add_stylesheet(SheetSource::new(
            "* { color: red } p { color: red } p.note { color: red } #main.note { color: red } .note .x { color: red }",
            Origin::Author,
        ));
        let index = RuleIndex::build(set.rules(), |_| true);
        assert_eq!(index.candidates("p", None, iter::empty()), vec![0, 1]);
        assert_eq!(index.candidates("p", None, ["note"].into_iter()), vec![0, 1, 2]);
        assert_eq!(index.candidates("div", Some("main"), ["x"].into_iter()), vec![0, 3, 4]);
    }
}
