//! Aggregation of occurrence lists into per-tag summary records.

use std::collections::BTreeSet;

use indexmap::IndexMap;

use crate::occurrence::Occurrence;

/// Suffix for the text-only variant of a split identity.
pub const SIMPLE_SUFFIX: &str = "Simple";

/// Suffix for the structured variant of a split identity.
pub const COMPLEX_SUFFIX: &str = "Complex";

/// Aggregated but not yet linked statistics for one tag identity.
#[derive(Debug, Clone, PartialEq)]
pub struct TagRecord {
    /// The identity this record summarizes.
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
    /// Parent identities not yet resolved to records.
    pub pending_parents: BTreeSet<String>,
    /// Child identities not yet resolved to records.
    pub pending_children: BTreeSet<String>,
}

/// Fold each occurrence bucket into one record.
///
/// An identity observed both as plain text and as structured content splits
/// into suffixed simple and complex variants carrying the original identity
/// as their origin; the unsplit identity does not appear in the output.
/// Synthesized list-item identities never split: they emit as unconstrained
/// wildcards, so the conflict carries no type ambiguity and all occurrences
/// fold into the single marker record.
pub fn fold(
    occurrences: IndexMap<String, Vec<Occurrence>>,
    marker: &str,
) -> IndexMap<String, TagRecord> {
    let mut records = IndexMap::with_capacity(occurrences.len());
    for (key, bucket) in occurrences {
        let is_list_item = key.ends_with(marker);
        let has_text_only = bucket.iter().any(Occurrence::is_text_only);
        let has_structured = bucket.iter().any(Occurrence::is_structured);
        if has_text_only && has_structured && !is_list_item {
            crate::debug!("splitting {key} into simple and complex variants");
            let (simple, complex): (Vec<_>, Vec<_>) =
                bucket.iter().partition(|occurrence| occurrence.is_text_only());
            let simple_key = format!("{key}{SIMPLE_SUFFIX}");
            let complex_key = format!("{key}{COMPLEX_SUFFIX}");
            records.insert(
                simple_key.clone(),
                fold_bucket(simple_key, Some(key.clone()), is_list_item, &simple),
            );
            records.insert(
                complex_key.clone(),
                fold_bucket(complex_key, Some(key), is_list_item, &complex),
            );
        } else {
            let whole: Vec<_> = bucket.iter().collect();
            records.insert(key.clone(), fold_bucket(key, None, is_list_item, &whole));
        }
    }
    records
}

fn fold_bucket(
    key: String,
    origin: Option<String>,
    is_list_item: bool,
    bucket: &[&Occurrence],
) -> TagRecord {
    let mut record = TagRecord {
        key,
        origin,
        is_list_item,
        is_complex: false,
        is_mixed: false,
        values: BTreeSet::new(),
        attributes: IndexMap::new(),
        pending_parents: BTreeSet::new(),
        pending_children: BTreeSet::new(),
    };
    for occurrence in bucket {
        for (name, value) in &occurrence.attributes {
            record.attributes.insert(name.clone(), value.clone());
        }
        if !occurrence.text.is_empty() {
            record.values.insert(occurrence.text.clone());
        }
        for child in &occurrence.children {
            record.pending_children.insert(child.clone());
        }
        if let Some(parent) = &occurrence.parent {
            record.pending_parents.insert(parent.clone());
        }
    }
    record.is_complex = !record.pending_parents.is_empty() || !record.attributes.is_empty();
    record.is_mixed = !record.values.is_empty()
        && (!record.attributes.is_empty() || !record.pending_parents.is_empty());
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::occurrence::Collector;

    fn fold_sources(sources: &[&str]) -> IndexMap<String, TagRecord> {
        let mut collector = Collector::new();
        for source in sources {
            collector.scan(&xylem_tree::parse(source).unwrap()).unwrap();
        }
        fold(collector.finish(), "Li")
    }

    #[test]
    fn test_values_union_excludes_empty_text() {
        let records = fold_sources(&[
            "<root><t>a</t></root>",
            "<root><t>b</t><t>a</t><t></t></root>",
        ]);
        let values: Vec<_> = records["t"].values.iter().cloned().collect();
        assert_eq!(values, ["a", "b"]);
    }

    #[test]
    fn test_attribute_sample_is_last_observed() {
        let records = fold_sources(&[r#"<root><t id="first"/><t id="second" extra="1"/></root>"#]);
        let t = &records["t"];
        assert_eq!(t.attributes.get("id").map(String::as_str), Some("second"));
        // Replacement keeps the first-observed position.
        assert_eq!(t.attributes.get_index_of("id"), Some(0));
    }

    #[test]
    fn test_complex_and_mixed_flags() {
        let records = fold_sources(&["<t>just text</t>"]);
        assert!(!records["t"].is_complex);
        assert!(!records["t"].is_mixed);

        let records = fold_sources(&[r#"<t id="1">text</t>"#]);
        assert!(records["t"].is_complex);
        assert!(records["t"].is_mixed);
    }

    #[test]
    fn test_child_and_parent_names_recorded() {
        let records = fold_sources(&["<root><mid><leaf/></mid></root>"]);
        assert!(records["root"].pending_children.contains("mid"));
        assert!(records["root"].pending_parents.is_empty());
        assert!(records["mid"].pending_parents.contains("root"));
        assert!(records["mid"].pending_children.contains("leaf"));
        assert!(records["leaf"].pending_parents.contains("mid"));
    }

    #[test]
    fn test_conflicting_shapes_split() {
        let records = fold_sources(&[
            "<root><t>plain</t></root>",
            r#"<root><t kind="x">styled<leaf/></t></root>"#,
        ]);
        assert!(!records.contains_key("t"));

        let simple = &records["tSimple"];
        assert_eq!(simple.origin.as_deref(), Some("t"));
        let values: Vec<_> = simple.values.iter().cloned().collect();
        assert_eq!(values, ["plain"]);
        assert!(simple.attributes.is_empty());
        assert!(simple.pending_children.is_empty());

        let complex = &records["tComplex"];
        assert_eq!(complex.origin.as_deref(), Some("t"));
        assert!(complex.values.contains("styled"));
        assert!(complex.attributes.contains_key("kind"));
        assert!(complex.pending_children.contains("leaf"));

        // The leaf still names the unsplit identity as its parent.
        assert!(records["leaf"].pending_parents.contains("t"));
    }

    #[test]
    fn test_empty_occurrences_fold_into_complex_variant() {
        let records = fold_sources(&[
            "<a><t>plain</t></a>",
            "<b><t/></b>",
            r#"<c><t kind="x"/></c>"#,
        ]);
        let simple: Vec<_> = records["tSimple"].pending_parents.iter().cloned().collect();
        assert_eq!(simple, ["a"]);
        let complex: Vec<_> = records["tComplex"].pending_parents.iter().cloned().collect();
        assert_eq!(complex, ["b", "c"]);
    }

    #[test]
    fn test_list_item_identities_never_split() {
        let records = fold_sources(&[
            "<root><item><li>a</li><li>b</li></item></root>",
            r#"<root><item><li attr="x">c</li></item></root>"#,
        ]);
        assert!(!records.contains_key("itemLiSimple"));
        let li = &records["itemLi"];
        assert!(li.is_list_item);
        let values: Vec<_> = li.values.iter().cloned().collect();
        assert_eq!(values, ["a", "b", "c"]);
        assert!(li.attributes.contains_key("attr"));
    }

    #[test]
    fn test_list_item_flag_from_marker_suffix() {
        let records = fold_sources(&["<root><item><li>x</li></item></root>"]);
        assert!(records["itemLi"].is_list_item);
        assert!(!records["item"].is_list_item);
        assert!(!records["root"].is_list_item);
    }
}
