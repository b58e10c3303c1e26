//! Occurrence collection over parsed documents.

use indexmap::IndexMap;
use xylem_tree::{Document, Element};

/// The reserved list-item tag, compared case-insensitively.
pub const LIST_ITEM_TAG: &str = "li";

/// Default suffix for synthesized list-item identities.
pub const DEFAULT_LIST_MARKER: &str = "Li";

/// Fatal corpus-shape errors detected during collection.
#[derive(Debug, Clone, PartialEq)]
pub enum CorpusError {
    /// A list-item element occurred with no parent element.
    ListItemAtRoot,
}

impl std::fmt::Display for CorpusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CorpusError::ListItemAtRoot => write!(f, "list item element at the document root"),
        }
    }
}

impl std::error::Error for CorpusError {}

/// One observed occurrence of a tag.
///
/// Identities here are already normalized: a list-item child appears as its
/// synthesized per-parent identity, never as the reserved tag itself.
#[derive(Debug, Clone, PartialEq)]
pub struct Occurrence {
    /// Attributes as observed, in document order.
    pub attributes: Vec<(String, String)>,
    /// Identities of immediate children, in document order.
    pub children: Vec<String>,
    /// Joined text content; empty when the element had none.
    pub text: String,
    /// Identity of the immediate parent, absent for document roots.
    pub parent: Option<String>,
}

impl Occurrence {
    /// Whether this occurrence carries structure (attributes or children).
    pub fn is_structured(&self) -> bool {
        !self.attributes.is_empty() || !self.children.is_empty()
    }

    /// Whether this occurrence is text with no structure.
    pub fn is_text_only(&self) -> bool {
        !self.text.is_empty() && !self.is_structured()
    }
}

/// Collects every occurrence of every tag across a corpus.
///
/// Buckets keep first-seen order and occurrences keep document order, so the
/// same corpus scanned in the same order always produces the same mapping.
pub struct Collector {
    marker: String,
    occurrences: IndexMap<String, Vec<Occurrence>>,
}

impl Collector {
    /// Create a collector with the default list-item marker.
    pub fn new() -> Self {
        Self::with_marker(DEFAULT_LIST_MARKER)
    }

    /// Create a collector with a custom list-item marker.
    pub fn with_marker(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
            occurrences: IndexMap::new(),
        }
    }

    /// File one occurrence per element of `document`.
    pub fn scan(&mut self, document: &Document) -> Result<(), CorpusError> {
        // (element, raw parent name, normalized parent identity)
        let mut work: Vec<(&Element, Option<&str>, Option<String>)> =
            vec![(&document.root, None, None)];
        while let Some((element, raw_parent, parent)) = work.pop() {
            let key = normalize(&element.name, raw_parent, &self.marker)?;
            let children = element
                .children
                .iter()
                .map(|child| normalize(&child.name, Some(&element.name), &self.marker))
                .collect::<Result<Vec<_>, _>>()?;
            let occurrence = Occurrence {
                attributes: element.attributes.clone(),
                children,
                text: element.text(),
                parent,
            };
            self.occurrences
                .entry(key.clone())
                .or_default()
                .push(occurrence);
            for child in element.children.iter().rev() {
                work.push((child, Some(&element.name), Some(key.clone())));
            }
        }
        Ok(())
    }

    /// The tag identity to occurrence-list mapping for everything scanned.
    pub fn finish(self) -> IndexMap<String, Vec<Occurrence>> {
        self.occurrences
    }
}

impl Default for Collector {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalized identity for a tag name in its parent context. List items file
/// under the parent's raw name plus the marker suffix, so `<li>` inside
/// `<li>` files under the reserved tag plus the marker.
fn normalize(name: &str, raw_parent: Option<&str>, marker: &str) -> Result<String, CorpusError> {
    if !name.eq_ignore_ascii_case(LIST_ITEM_TAG) {
        return Ok(name.to_string());
    }
    match raw_parent {
        Some(parent) => Ok(format!("{parent}{marker}")),
        None => Err(CorpusError::ListItemAtRoot),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_all(sources: &[&str]) -> IndexMap<String, Vec<Occurrence>> {
        let mut collector = Collector::new();
        for source in sources {
            let doc = xylem_tree::parse(source).unwrap();
            collector.scan(&doc).unwrap();
        }
        collector.finish()
    }

    #[test]
    fn test_collects_every_occurrence() {
        let map = scan_all(&["<root><item>1</item><item>2</item></root>"]);
        assert_eq!(map["root"].len(), 1);
        assert_eq!(map["item"].len(), 2);
        assert_eq!(map["item"][0].text, "1");
        assert_eq!(map["item"][1].text, "2");
        assert_eq!(map["item"][0].parent.as_deref(), Some("root"));
        assert_eq!(map["root"][0].parent, None);
    }

    #[test]
    fn test_bucket_order_is_first_seen() {
        let map = scan_all(&["<root><b/><a/></root>", "<root><c/></root>"]);
        let keys: Vec<_> = map.keys().cloned().collect();
        assert_eq!(keys, ["root", "b", "a", "c"]);
    }

    #[test]
    fn test_list_items_file_under_parent_identity() {
        let map = scan_all(&["<root><item><li>a</li><li>b</li></item></root>"]);
        assert!(!map.contains_key("li"));
        assert_eq!(map["itemLi"].len(), 2);
        assert_eq!(map["itemLi"][0].parent.as_deref(), Some("item"));
        assert_eq!(map["item"][0].children, ["itemLi", "itemLi"]);
    }

    #[test]
    fn test_nested_list_items() {
        let map = scan_all(&["<root><item><li><li>x</li></li></item></root>"]);
        // The inner item files under the raw name of its list-item parent.
        assert_eq!(map["liLi"].len(), 1);
        assert_eq!(map["liLi"][0].parent.as_deref(), Some("itemLi"));
        assert_eq!(map["itemLi"][0].children, ["liLi"]);
    }

    #[test]
    fn test_list_item_tag_is_case_insensitive() {
        let map = scan_all(&["<root><item><LI>a</LI></item></root>"]);
        assert!(map.contains_key("itemLi"));
    }

    #[test]
    fn test_list_item_at_root_is_fatal() {
        let doc = xylem_tree::parse("<li>loose</li>").unwrap();
        let mut collector = Collector::new();
        assert_eq!(collector.scan(&doc), Err(CorpusError::ListItemAtRoot));
    }

    #[test]
    fn test_custom_marker() {
        let mut collector = Collector::with_marker("_items");
        let doc = xylem_tree::parse("<root><li>a</li></root>").unwrap();
        collector.scan(&doc).unwrap();
        assert!(collector.finish().contains_key("root_items"));
    }

    #[test]
    fn test_occurrence_classification() {
        let map = scan_all(&[r#"<root><t>text</t><t attr="v"/><t/></root>"#]);
        let occurrences = &map["t"];
        assert!(occurrences[0].is_text_only());
        assert!(occurrences[1].is_structured());
        assert!(!occurrences[2].is_text_only());
        assert!(!occurrences[2].is_structured());
    }
}
