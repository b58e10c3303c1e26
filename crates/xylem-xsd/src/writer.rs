//! Low-level XSD markup assembly.
//!
//! [`XsdWriter`] is line-oriented: every tag lands on its own line at an
//! explicit indentation depth, so the emitter can interleave opening tags,
//! deferred closing tags, and self-contained declarations in worklist
//! order. The buffer can be drained incrementally for streaming.

use std::borrow::Cow;

/// Indentation unit, one per depth level.
const INDENT: &str = "  ";

/// Escape a string for use inside a double-quoted attribute value.
pub fn escape_attr(s: &str) -> Cow<'_, str> {
    if !s.chars().any(|c| matches!(c, '&' | '<' | '>' | '"')) {
        return Cow::Borrowed(s);
    }
    let mut result = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            c => result.push(c),
        }
    }
    Cow::Owned(result)
}

/// Markup of the closing tag for `name`.
pub fn closing_tag(name: &str) -> String {
    format!("</{name}>")
}

/// Accumulates XSD markup as UTF-8 bytes.
#[derive(Debug, Default)]
pub struct XsdWriter {
    out: Vec<u8>,
}

impl XsdWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    fn write_indent(&mut self, depth: usize) {
        for _ in 0..depth {
            self.out.extend_from_slice(INDENT.as_bytes());
        }
    }

    /// Append one indented line of pre-assembled markup.
    pub fn write_line(&mut self, depth: usize, markup: &str) {
        self.write_indent(depth);
        self.out.extend_from_slice(markup.as_bytes());
        self.out.push(b'\n');
    }

    /// Append an opening tag line: `<name a="v">`.
    pub fn open_tag(&mut self, depth: usize, name: &str, attributes: &[(&str, &str)]) {
        self.write_tag(depth, name, attributes, false);
    }

    /// Append a self-closed tag line: `<name a="v"/>`.
    pub fn empty_tag(&mut self, depth: usize, name: &str, attributes: &[(&str, &str)]) {
        self.write_tag(depth, name, attributes, true);
    }

    fn write_tag(&mut self, depth: usize, name: &str, attributes: &[(&str, &str)], empty: bool) {
        self.write_indent(depth);
        self.out.push(b'<');
        self.out.extend_from_slice(name.as_bytes());
        for (attribute, value) in attributes {
            self.out.push(b' ');
            self.out.extend_from_slice(attribute.as_bytes());
            self.out.extend_from_slice(b"=\"");
            self.out.extend_from_slice(escape_attr(value).as_bytes());
            self.out.push(b'"');
        }
        if empty {
            self.out.push(b'/');
        }
        self.out.extend_from_slice(b">\n");
    }

    /// Bytes buffered since the last drain.
    pub fn buffered(&self) -> usize {
        self.out.len()
    }

    /// The buffered bytes, without draining them.
    pub fn bytes(&self) -> &[u8] {
        &self.out
    }

    /// Drop the buffered bytes after a successful flush.
    pub fn clear(&mut self) {
        self.out.clear();
    }

    /// Drain the buffered bytes, leaving the writer empty.
    pub fn take(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.out)
    }

    /// Consume the writer and return everything still buffered.
    pub fn finish(self) -> Vec<u8> {
        self.out
    }
}
