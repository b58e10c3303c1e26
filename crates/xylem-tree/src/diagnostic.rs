//! Diagnostic rendering for reader errors.

use ariadne::{Color, Label, Report, ReportKind, Source};

use crate::span::Span;

/// The kind of reader error.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseErrorKind {
    /// Malformed markup reported by the underlying XML reader.
    Syntax(String),
    /// A closing tag that does not match the element it closes.
    MismatchedCloseTag {
        /// Name of the element that was open.
        expected: String,
        /// Name found in the closing tag.
        found: String,
    },
    /// A second element at the top level of the document.
    MultipleRoots,
    /// Text content outside the root element.
    ContentOutsideRoot,
    /// Input ended while an element was still open.
    UnclosedElement(String),
    /// Input ended without any root element.
    NoRoot,
}

/// A reader error with source location.
#[derive(Debug, Clone)]
pub struct ParseError {
    /// The kind of error.
    pub kind: ParseErrorKind,
    /// Source location.
    pub span: Span,
}

impl ParseError {
    /// Create a new parse error.
    pub fn new(kind: ParseErrorKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Render this error with ariadne.
    ///
    /// Returns a string containing the formatted error message with source context.
    pub fn render(&self, filename: &str, source: &str) -> String {
        let mut output = Vec::new();
        self.write_report(filename, source, &mut output);
        String::from_utf8(output).unwrap_or_else(|_| format!("{}", self))
    }

    /// Write the error report to a writer.
    pub fn write_report<W: std::io::Write>(&self, filename: &str, source: &str, writer: W) {
        let report = self.build_report(filename);
        let _ = report
            .finish()
            .write((filename, Source::from(source)), writer);
    }

    fn build_report<'a>(
        &self,
        filename: &'a str,
    ) -> ariadne::ReportBuilder<'static, (&'a str, std::ops::Range<usize>)> {
        let range = self.span.start as usize..self.span.end as usize;

        match &self.kind {
            ParseErrorKind::Syntax(message) => {
                Report::build(ReportKind::Error, (filename, range.clone()))
                    .with_message(format!("malformed markup: {}", message))
                    .with_label(
                        Label::new((filename, range))
                            .with_message("could not be read")
                            .with_color(Color::Red),
                    )
            }

            ParseErrorKind::MismatchedCloseTag { expected, found } => {
                Report::build(ReportKind::Error, (filename, range.clone()))
                    .with_message(format!(
                        "mismatched closing tag: expected </{}>, found </{}>",
                        expected, found
                    ))
                    .with_label(
                        Label::new((filename, range))
                            .with_message("closing tag here")
                            .with_color(Color::Red),
                    )
                    .with_help("elements must be closed in the order they were opened")
            }

            ParseErrorKind::MultipleRoots => {
                Report::build(ReportKind::Error, (filename, range.clone()))
                    .with_message("multiple root elements")
                    .with_label(
                        Label::new((filename, range))
                            .with_message("second root element starts here")
                            .with_color(Color::Red),
                    )
                    .with_help("a document has exactly one root element")
            }

            ParseErrorKind::ContentOutsideRoot => {
                Report::build(ReportKind::Error, (filename, range.clone()))
                    .with_message("content outside the root element")
                    .with_label(
                        Label::new((filename, range))
                            .with_message("text here is not inside any element")
                            .with_color(Color::Red),
                    )
            }

            ParseErrorKind::UnclosedElement(name) => {
                Report::build(ReportKind::Error, (filename, range.clone()))
                    .with_message(format!("unclosed element <{}>", name))
                    .with_label(
                        Label::new((filename, range))
                            .with_message("opened here")
                            .with_color(Color::Red),
                    )
                    .with_help(format!("add a closing </{}>", name))
            }

            ParseErrorKind::NoRoot => {
                Report::build(ReportKind::Error, (filename, range.clone()))
                    .with_message("document has no root element")
                    .with_label(
                        Label::new((filename, range))
                            .with_message("input ends here")
                            .with_color(Color::Red),
                    )
            }
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            ParseErrorKind::Syntax(message) => write!(f, "malformed markup: {}", message),
            ParseErrorKind::MismatchedCloseTag { expected, found } => write!(
                f,
                "mismatched closing tag: expected </{}>, found </{}>",
                expected, found
            ),
            ParseErrorKind::MultipleRoots => write!(f, "multiple root elements"),
            ParseErrorKind::ContentOutsideRoot => write!(f, "content outside the root element"),
            ParseErrorKind::UnclosedElement(name) => write!(f, "unclosed element <{}>", name),
            ParseErrorKind::NoRoot => write!(f, "document has no root element"),
        }?;
        write!(f, " at offset {}", self.span.start)
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_stripped(source: &str) -> String {
        let error = crate::parse(source).unwrap_err();
        let rendered = error.render("corpus.xml", source);
        String::from_utf8(strip_ansi_escapes::strip(&rendered)).unwrap()
    }

    #[test]
    fn test_unclosed_element_diagnostic() {
        let report = render_stripped("<inventory><item>axe");
        assert!(report.contains("unclosed element <item>"), "{report}");
        assert!(report.contains("add a closing </item>"), "{report}");
        assert!(report.contains("corpus.xml"), "{report}");
    }

    #[test]
    fn test_multiple_roots_diagnostic() {
        let report = render_stripped("<a/><b/>");
        assert!(report.contains("multiple root elements"), "{report}");
        assert!(report.contains("exactly one root element"), "{report}");
    }

    #[test]
    fn test_no_root_diagnostic() {
        let report = render_stripped("<!-- nothing here -->");
        assert!(report.contains("document has no root element"), "{report}");
    }

    #[test]
    fn test_display_carries_offset() {
        let error = ParseError::new(ParseErrorKind::MultipleRoots, Span::new(4, 8));
        assert_eq!(format!("{}", error), "multiple root elements at offset 4");
    }
}
