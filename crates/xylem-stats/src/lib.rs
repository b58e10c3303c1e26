#![doc = include_str!("../README.md")]
//! Tag statistics for schema inference.
//!
//! Three passes over a corpus of parsed documents:
//!
//! 1. [`Collector`] files one [`Occurrence`] per element under the tag's
//!    normalized identity.
//! 2. [`fold`] aggregates each identity's occurrences into a [`TagRecord`],
//!    splitting identities observed both as plain text and as structured
//!    content.
//! 3. [`link`] resolves pending names into a [`TagGraph`] with symmetric
//!    parent/child references, keeping unresolved names as ghosts.

mod graph;
mod occurrence;
mod record;
mod tracing_macros;

pub use graph::{ContentType, TagGraph, TagId, TagStats, link};
pub use occurrence::{Collector, CorpusError, DEFAULT_LIST_MARKER, LIST_ITEM_TAG, Occurrence};
pub use record::{COMPLEX_SUFFIX, SIMPLE_SUFFIX, TagRecord, fold};

use xylem_tree::Document;

/// Collect, fold, and link a corpus in one call.
pub fn analyze<'a>(
    documents: impl IntoIterator<Item = &'a Document>,
    marker: &str,
) -> Result<TagGraph, CorpusError> {
    let mut collector = Collector::with_marker(marker);
    for document in documents {
        collector.scan(document)?;
    }
    Ok(link(fold(collector.finish(), marker)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_pipeline() {
        let doc = xylem_tree::parse("<root><item>axe</item></root>").unwrap();
        let graph = analyze([&doc], DEFAULT_LIST_MARKER).unwrap();
        assert_eq!(graph.len(), 2);
        let item = graph.get("item").unwrap();
        assert!(graph[item].values.contains("axe"));
    }

    #[test]
    fn test_analyze_rejects_malformed_corpus() {
        let doc = xylem_tree::parse("<li>loose</li>").unwrap();
        assert_eq!(
            analyze([&doc], DEFAULT_LIST_MARKER),
            Err(CorpusError::ListItemAtRoot)
        );
    }
}
