//! Streaming reader that materializes a document tree.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::diagnostic::{ParseError, ParseErrorKind};
use crate::element::{Document, Element};
use crate::span::Span;

/// Builds a [`Document`] from the reader's event stream.
///
/// Text is trimmed, so whitespace between elements never produces chunks.
/// Namespace prefixes are stripped from element and attribute names.
pub struct TreeBuilder {
    /// Open elements, outermost first, with the span of their opening tag.
    stack: Vec<(Element, Span)>,
    /// The completed root element.
    root: Option<Element>,
}

impl TreeBuilder {
    /// Create a new tree builder.
    pub fn new() -> Self {
        Self {
            stack: Vec::new(),
            root: None,
        }
    }

    /// Read one document from `source`.
    pub fn build(mut self, source: &str) -> Result<Document, ParseError> {
        let mut reader = Reader::from_reader(source.as_bytes());
        reader.trim_text(true);

        let mut buf = Vec::new();
        loop {
            let start = reader.buffer_position() as u32;
            let event = reader.read_event_into(&mut buf);
            let span = Span::new(start, reader.buffer_position() as u32);
            match event {
                Ok(Event::Start(e)) => self.open(&e, span)?,
                Ok(Event::Empty(e)) => {
                    self.open(&e, span)?;
                    self.close();
                }
                Ok(Event::End(_)) => self.close(),
                Ok(Event::Text(e)) => {
                    let text = e.unescape().map_err(|err| syntax(err, span))?;
                    self.push_text(&text, span)?;
                }
                Ok(Event::CData(e)) => {
                    let text = String::from_utf8_lossy(e.as_ref());
                    self.push_text(&text, span)?;
                }
                Ok(Event::Decl(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_)) => {}
                Ok(Event::Eof) => break,
                Err(quick_xml::Error::EndEventMismatch { expected, found }) => {
                    return Err(ParseError::new(
                        ParseErrorKind::MismatchedCloseTag { expected, found },
                        span,
                    ));
                }
                Err(err) => return Err(syntax(err, span)),
            }
            buf.clear();
        }

        if let Some((element, span)) = self.stack.last() {
            return Err(ParseError::new(
                ParseErrorKind::UnclosedElement(element.name.clone()),
                *span,
            ));
        }
        let end = Span::empty(reader.buffer_position() as u32);
        match self.root {
            Some(root) => Ok(Document { root }),
            None => Err(ParseError::new(ParseErrorKind::NoRoot, end)),
        }
    }

    fn open(&mut self, tag: &BytesStart<'_>, span: Span) -> Result<(), ParseError> {
        if self.stack.is_empty() && self.root.is_some() {
            return Err(ParseError::new(ParseErrorKind::MultipleRoots, span));
        }
        let name = String::from_utf8_lossy(tag.local_name().as_ref()).into_owned();
        let mut element = Element::new(name);
        for attr in tag.attributes() {
            let attr =
                attr.map_err(|err| ParseError::new(ParseErrorKind::Syntax(err.to_string()), span))?;
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|err| syntax(err, span))?
                .into_owned();
            element.attributes.push((key, value));
        }
        self.stack.push((element, span));
        Ok(())
    }

    /// Close the innermost open element. The reader verifies close-tag names,
    /// so the top of the stack is always the element being closed.
    fn close(&mut self) {
        if let Some((element, _)) = self.stack.pop() {
            match self.stack.last_mut() {
                Some((parent, _)) => parent.children.push(element),
                None => self.root = Some(element),
            }
        }
    }

    fn push_text(&mut self, text: &str, span: Span) -> Result<(), ParseError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(());
        }
        match self.stack.last_mut() {
            Some((element, _)) => {
                element.text_chunks.push(trimmed.to_string());
                Ok(())
            }
            None => Err(ParseError::new(ParseErrorKind::ContentOutsideRoot, span)),
        }
    }
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn syntax(err: quick_xml::Error, span: Span) -> ParseError {
    ParseError::new(ParseErrorKind::Syntax(err.to_string()), span)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Document {
        TreeBuilder::new().build(source).unwrap()
    }

    #[test]
    fn test_single_empty_element() {
        let doc = parse("<config/>");
        assert_eq!(doc.root.name, "config");
        assert!(doc.root.is_empty());
    }

    #[test]
    fn test_nested_elements() {
        let doc = parse("<inventory><item><li>axe</li></item></inventory>");
        assert_eq!(doc.root.name, "inventory");
        assert_eq!(doc.root.children.len(), 1);
        let item = &doc.root.children[0];
        assert_eq!(item.name, "item");
        assert_eq!(item.children[0].name, "li");
        assert_eq!(item.children[0].text(), "axe");
    }

    #[test]
    fn test_attributes_in_document_order() {
        let doc = parse(r#"<item id="7" kind="tool"/>"#);
        assert_eq!(
            doc.root.attributes,
            vec![
                ("id".to_string(), "7".to_string()),
                ("kind".to_string(), "tool".to_string()),
            ]
        );
    }

    #[test]
    fn test_text_around_children_joins_with_space() {
        let doc = parse("<p>before <b>bold</b> after</p>");
        assert_eq!(doc.root.text(), "before after");
        assert_eq!(doc.root.children[0].text(), "bold");
    }

    #[test]
    fn test_cdata_counts_as_text() {
        let doc = parse("<note><![CDATA[a < b]]></note>");
        assert_eq!(doc.root.text(), "a < b");
    }

    #[test]
    fn test_entities_unescaped() {
        let doc = parse("<note>fish &amp; chips</note>");
        assert_eq!(doc.root.text(), "fish & chips");
        let doc = parse(r#"<note label="&lt;x&gt;"/>"#);
        assert_eq!(doc.root.attribute("label"), Some("<x>"));
    }

    #[test]
    fn test_namespace_prefixes_stripped() {
        let doc = parse(r#"<ns:list ns:kind="a"><ns:li>1</ns:li></ns:list>"#);
        assert_eq!(doc.root.name, "list");
        assert_eq!(doc.root.children[0].name, "li");
        assert_eq!(doc.root.attribute("kind"), Some("a"));
    }

    #[test]
    fn test_prolog_and_comments_skipped() {
        let doc = parse("<?xml version=\"1.0\"?><!-- corpus --><data/>");
        assert_eq!(doc.root.name, "data");
    }

    #[test]
    fn test_multiple_roots_rejected() {
        let err = TreeBuilder::new().build("<a/><b/>").unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::MultipleRoots));
    }

    #[test]
    fn test_unclosed_element_rejected() {
        let err = TreeBuilder::new().build("<a><b>").unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::UnclosedElement(ref name) if name == "b"));
    }

    #[test]
    fn test_mismatched_close_rejected() {
        let err = TreeBuilder::new().build("<a><b></a>").unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::MismatchedCloseTag { .. }));
    }

    #[test]
    fn test_empty_input_rejected() {
        let err = TreeBuilder::new().build("").unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::NoRoot));
    }

    #[test]
    fn test_text_outside_root_rejected() {
        let err = TreeBuilder::new().build("<a/>stray").unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::ContentOutsideRoot));
    }
}
