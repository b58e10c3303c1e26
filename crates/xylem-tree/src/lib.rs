#![doc = include_str!("../README.md")]
//! XML document tree for schema inference.
//!
//! This crate reads XML documents into an owned element tree. The statistics
//! passes walk that tree; nothing downstream touches the event-level reader.

mod diagnostic;
mod element;
mod reader;
mod span;

pub use diagnostic::{ParseError, ParseErrorKind};
pub use element::{Document, Element};
pub use reader::TreeBuilder;
pub use span::Span;

/// Parse an XML document into a tree.
pub fn parse(source: &str) -> Result<Document, ParseError> {
    TreeBuilder::new().build(source)
}
