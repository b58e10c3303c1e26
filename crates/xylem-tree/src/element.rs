//! Owned element tree for parsed XML documents.

/// One element in a parsed document.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Local tag name (namespace prefix stripped).
    pub name: String,
    /// Attributes in document order, keyed by local name.
    pub attributes: Vec<(String, String)>,
    /// Child elements in document order.
    pub children: Vec<Element>,
    /// Trimmed text and CDATA chunks, in document order, empty chunks dropped.
    pub text_chunks: Vec<String>,
}

impl Element {
    /// Create an empty element with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            text_chunks: Vec::new(),
        }
    }

    /// Look up an attribute value by name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// The first child element with the given name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|child| child.name == name)
    }

    /// Observed text content: all chunks joined with single spaces.
    ///
    /// CDATA sections count as text. Chunks are trimmed when the document is
    /// read, so indentation whitespace never appears here.
    pub fn text(&self) -> String {
        self.text_chunks.join(" ")
    }

    /// Whether any non-whitespace text content was observed.
    pub fn has_text(&self) -> bool {
        !self.text_chunks.is_empty()
    }

    /// Whether the element carries neither attributes, children, nor text.
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.children.is_empty() && self.text_chunks.is_empty()
    }
}

/// A parsed XML document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// The single root element.
    pub root: Element,
}

impl Document {
    /// Parse an XML document.
    pub fn parse(source: &str) -> Result<Self, crate::ParseError> {
        crate::parse(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_lookup() {
        let mut element = Element::new("item");
        element.attributes.push(("id".to_string(), "1".to_string()));
        element
            .attributes
            .push(("kind".to_string(), "tool".to_string()));
        assert_eq!(element.attribute("id"), Some("1"));
        assert_eq!(element.attribute("kind"), Some("tool"));
        assert_eq!(element.attribute("missing"), None);
    }

    #[test]
    fn test_text_joins_chunks() {
        let mut element = Element::new("note");
        element.text_chunks.push("hello".to_string());
        element.text_chunks.push("world".to_string());
        assert_eq!(element.text(), "hello world");
        assert!(element.has_text());
    }

    #[test]
    fn test_empty_element() {
        let element = Element::new("gap");
        assert!(element.is_empty());
        assert_eq!(element.text(), "");
        assert!(!element.has_text());
    }

    #[test]
    fn test_child_lookup() {
        let mut parent = Element::new("parent");
        parent.children.push(Element::new("first"));
        parent.children.push(Element::new("second"));
        assert_eq!(parent.child("second").map(|c| c.name.as_str()), Some("second"));
        assert!(parent.child("third").is_none());
    }
}
