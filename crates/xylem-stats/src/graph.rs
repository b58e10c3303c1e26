//! Linking pass: pending name sets become direct references.

use std::collections::BTreeSet;

use indexmap::IndexMap;

use crate::record::TagRecord;

/// Index of a tag in the linked graph's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TagId(usize);

/// Inferred content type for simple-content leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    /// Every observed value parses as an integer literal.
    Integer,
    /// Anything else, including tags with no observed values.
    String,
}

/// Fully aggregated and linked statistics for one tag identity.
#[derive(Debug, Clone, PartialEq)]
pub struct TagStats {
    /// The tag identity.
    pub key: String,
    /// Identity before the simple/complex split, present on split variants.
    pub origin: Option<String>,
    /// Whether the identity is a synthesized list-item key.
    pub is_list_item: bool,
    /// Ever observed with a parent context or attributes.
    pub is_complex: bool,
    /// Ever observed with both text content and surrounding structure.
    pub is_mixed: bool,
    /// Distinct non-empty text values.
    pub values: BTreeSet<String>,
    /// Attribute names, each with the last observed value as a sample.
    pub attributes: IndexMap<String, String>,
    /// Resolved children, in resolution order.
    pub children: Vec<TagId>,
    /// Resolved parents, in resolution order.
    pub parents: Vec<TagId>,
    /// Parent names that never resolved.
    pub ghost_parents: Vec<String>,
    /// Child names that never resolved.
    pub ghost_children: Vec<String>,
}

impl TagStats {
    /// Whether this tag is a simple-content leaf.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty() && self.attributes.is_empty()
    }

    /// Content type for a leaf. Integer only when there is at least one
    /// observed value and every one of them parses; a single non-numeric
    /// observation anywhere makes the whole tag a string.
    pub fn content_type(&self) -> ContentType {
        if !self.values.is_empty() && self.values.iter().all(|value| value.parse::<i64>().is_ok()) {
            ContentType::Integer
        } else {
            ContentType::String
        }
    }
}

/// The linked tag graph: an arena of [`TagStats`] addressed by [`TagId`].
#[derive(Debug, Clone, PartialEq)]
pub struct TagGraph {
    tags: Vec<TagStats>,
    index: IndexMap<String, TagId>,
}

impl TagGraph {
    /// Look up a tag by identity.
    pub fn get(&self, key: &str) -> Option<TagId> {
        self.index.get(key).copied()
    }

    /// Number of tags in the graph.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Whether the graph holds no tags.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Iterate over all tags in record order.
    pub fn iter(&self) -> impl Iterator<Item = (TagId, &TagStats)> {
        self.tags
            .iter()
            .enumerate()
            .map(|(position, tag)| (TagId(position), tag))
    }

    /// Whether any pending reference survived linking.
    pub fn has_ghosts(&self) -> bool {
        self.tags
            .iter()
            .any(|tag| !tag.ghost_parents.is_empty() || !tag.ghost_children.is_empty())
    }
}

impl std::ops::Index<TagId> for TagGraph {
    type Output = TagStats;

    fn index(&self, id: TagId) -> &TagStats {
        &self.tags[id.0]
    }
}

/// Resolve every pending child name into direct parent/child references.
///
/// A name matching a record directly resolves to it; a name matching the
/// origin of split variants resolves to both variants. Each installed child
/// reference gets a matching back-reference on the target, and the target's
/// pending-parent set drops both the resolver's identity and its origin.
/// Names that match nothing are kept as ghosts and logged, never dropped.
pub fn link(records: IndexMap<String, TagRecord>) -> TagGraph {
    let mut index: IndexMap<String, TagId> = IndexMap::with_capacity(records.len());
    for (position, key) in records.keys().enumerate() {
        index.insert(key.clone(), TagId(position));
    }

    // Variants of each split identity, in record order.
    let mut aliases: IndexMap<String, Vec<TagId>> = IndexMap::new();
    for (key, record) in &records {
        if let Some(origin) = &record.origin {
            aliases
                .entry(origin.clone())
                .or_default()
                .push(index[key.as_str()]);
        }
    }

    let mut tags: Vec<TagStats> = Vec::with_capacity(records.len());
    let mut pending_parents: Vec<BTreeSet<String>> = Vec::with_capacity(records.len());
    let mut pending_children: Vec<BTreeSet<String>> = Vec::with_capacity(records.len());
    for (_, record) in records {
        pending_parents.push(record.pending_parents);
        pending_children.push(record.pending_children);
        tags.push(TagStats {
            key: record.key,
            origin: record.origin,
            is_list_item: record.is_list_item,
            is_complex: record.is_complex,
            is_mixed: record.is_mixed,
            values: record.values,
            attributes: record.attributes,
            children: Vec::new(),
            parents: Vec::new(),
            ghost_parents: Vec::new(),
            ghost_children: Vec::new(),
        });
    }

    let mut targets: Vec<TagId> = Vec::new();
    for parent in 0..tags.len() {
        let parent_id = TagId(parent);
        let names = std::mem::take(&mut pending_children[parent]);
        for name in names {
            targets.clear();
            if let Some(&id) = index.get(name.as_str()) {
                targets.push(id);
            } else if let Some(variants) = aliases.get(name.as_str()) {
                targets.extend(variants.iter().copied());
            } else {
                crate::warn!("ghost child {name} referenced by {}", tags[parent].key);
                tags[parent].ghost_children.push(name);
                continue;
            }
            for &child_id in &targets {
                tags[parent].children.push(child_id);
                tags[child_id.0].parents.push(parent_id);
                pending_parents[child_id.0].remove(tags[parent].key.as_str());
                if let Some(origin) = &tags[parent].origin {
                    pending_parents[child_id.0].remove(origin.as_str());
                }
            }
        }
    }

    for (position, remaining) in pending_parents.into_iter().enumerate() {
        for name in remaining {
            crate::warn!("ghost parent {name} referenced by {}", tags[position].key);
            tags[position].ghost_parents.push(name);
        }
    }

    TagGraph { tags, index }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::occurrence::Collector;
    use crate::record::fold;
    use proptest::prelude::*;

    /// Tag names drawn from a small pool so documents collide on identities.
    fn tag_name() -> impl Strategy<Value = String> {
        prop::sample::select(vec!["alpha", "beta", "gamma", "delta"])
            .prop_map(|name| name.to_string())
    }

    fn text() -> impl Strategy<Value = String> {
        prop::string::string_regex("[a-z0-9]{0,6}").unwrap()
    }

    /// A childless element: text content, an attribute, or nothing.
    fn leaf() -> impl Strategy<Value = String> {
        prop_oneof![
            (tag_name(), text()).prop_map(|(n, t)| format!("<{n}>{t}</{n}>")),
            (tag_name(), text()).prop_map(|(n, v)| format!("<{n} id=\"{v}\"/>")),
            tag_name().prop_map(|n| format!("<{n}/>")),
        ]
    }

    fn list_item(depth: u32) -> BoxedStrategy<String> {
        if depth == 0 {
            text().prop_map(|t| format!("<li>{t}</li>")).boxed()
        } else {
            prop_oneof![
                2 => text().prop_map(|t| format!("<li>{t}</li>")),
                1 => prop::collection::vec(element(depth - 1), 1..3)
                    .prop_map(|kids| format!("<li>{}</li>", kids.concat())),
            ]
            .boxed()
        }
    }

    /// An element tree of bounded depth, never a bare list item.
    fn element(depth: u32) -> BoxedStrategy<String> {
        if depth == 0 {
            leaf().boxed()
        } else {
            prop_oneof![
                2 => leaf(),
                1 => (tag_name(), prop::collection::vec(element(depth - 1), 0..3))
                    .prop_map(|(n, kids)| format!("<{n}>{}</{n}>", kids.concat())),
                1 => (tag_name(), prop::collection::vec(list_item(depth - 1), 1..3))
                    .prop_map(|(n, items)| format!("<{n}>{}</{n}>", items.concat())),
            ]
            .boxed()
        }
    }

    fn corpus() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec(element(3), 1..4)
    }

    fn analyze(sources: &[String]) -> TagGraph {
        let mut collector = Collector::new();
        for source in sources {
            collector
                .scan(&xylem_tree::parse(source).unwrap())
                .unwrap();
        }
        link(fold(collector.finish(), "Li"))
    }

    proptest! {
        /// Scanning the same corpus twice yields the same graph.
        #[test]
        fn rescan_is_deterministic(sources in corpus()) {
            prop_assert_eq!(analyze(&sources), analyze(&sources));
        }

        /// Every resolved link has a matching back-reference.
        #[test]
        fn links_are_symmetric(sources in corpus()) {
            let graph = analyze(&sources);
            for (id, stats) in graph.iter() {
                for &child in &stats.children {
                    prop_assert!(graph[child].parents.contains(&id));
                }
                for &parent in &stats.parents {
                    prop_assert!(graph[parent].children.contains(&id));
                }
            }
        }

        /// A fully scanned corpus leaves no unresolved references, even
        /// through splits and list-item normalization.
        #[test]
        fn no_ghosts_in_complete_corpora(sources in corpus()) {
            prop_assert!(!analyze(&sources).has_ghosts());
        }
    }
}
