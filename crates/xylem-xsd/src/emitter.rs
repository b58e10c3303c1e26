//! Depth-bounded worklist traversal over a linked tag graph.
//!
//! The traversal is an explicit state machine rather than a recursion: a
//! pending stack holds `(tag, depth)` pairs still to emit, and a closing
//! stack holds deferred closing markup together with the depth it was
//! opened at. Popping a pending tag first flushes every closing entry
//! opened at the same depth or deeper, which reproduces correctly nested
//! scopes over a graph that may be cyclic. A visited set keeps each tag's
//! declaration unique; re-reaching an emitted tag is a no-op.

use std::collections::HashSet;
use std::fmt;
use std::io;

use xylem_stats::{ContentType, TagGraph, TagId};

use crate::options::{EmitOptions, Truncation};
use crate::sink::SchemaSink;
use crate::writer::{XsdWriter, closing_tag};

/// Errors raised while emitting a schema.
#[derive(Debug)]
pub enum EmitError {
    /// The configured root identity has no statistics in the graph.
    UnknownRoot(String),
    /// The sink failed while opening or finalizing a document.
    Io(io::Error),
}

impl fmt::Display for EmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmitError::UnknownRoot(root) => {
                write!(f, "no statistics recorded for root tag {root}")
            }
            EmitError::Io(err) => write!(f, "schema write failed: {err}"),
        }
    }
}

impl std::error::Error for EmitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EmitError::UnknownRoot(_) => None,
            EmitError::Io(err) => Some(err),
        }
    }
}

impl From<io::Error> for EmitError {
    fn from(err: io::Error) -> Self {
        EmitError::Io(err)
    }
}

/// Emit the schema for `graph` into `sink`.
///
/// Produces a single document, or one document per root child plus an
/// importing root document when [`EmitOptions::split`] is set. The graph
/// is only read; a missing root is the one fatal configuration error.
pub fn emit<S: SchemaSink>(
    graph: &TagGraph,
    options: &EmitOptions,
    sink: &mut S,
) -> Result<(), EmitError> {
    let root = graph
        .get(&options.root)
        .ok_or_else(|| EmitError::UnknownRoot(options.root.clone()))?;
    Emitter {
        graph,
        options,
        sink,
        writer: XsdWriter::new(),
        pending: vec![(root, 0)],
        closing: Vec::new(),
        visited: HashSet::new(),
        partitions: Vec::new(),
        root_doc: Vec::new(),
        import_mark: 0,
        indent_offset: 1,
    }
    .run()
}

struct Emitter<'a, S> {
    graph: &'a TagGraph,
    options: &'a EmitOptions,
    sink: &'a mut S,
    writer: XsdWriter,
    /// Tags awaiting emission, with the depth they were reached at.
    pending: Vec<(TagId, usize)>,
    /// Deferred closing markup, with the depth it was opened at.
    closing: Vec<(String, usize)>,
    visited: HashSet<TagId>,
    /// File names of partition documents, in creation order.
    partitions: Vec<String>,
    /// Root document bytes, held back until the partition list is complete.
    root_doc: Vec<u8>,
    /// Byte offset in the root document where imports are inserted.
    import_mark: usize,
    /// Indentation added to traversal depths in the current document.
    indent_offset: usize,
}

impl<S: SchemaSink> Emitter<'_, S> {
    fn run(mut self) -> Result<(), EmitError> {
        crate::debug!(
            "emitting from root {} with depth bound {}",
            self.options.root,
            self.options.depth
        );
        self.open_root_document()?;
        while let Some((id, depth)) = self.pending.pop() {
            if !self.visited.insert(id) {
                continue;
            }
            if self.options.split && depth == 1 {
                self.start_partition(id)?;
            } else {
                self.flush_closings(depth);
            }
            self.emit_tag(id, depth);
            let graph = self.graph;
            if depth + 1 < self.options.depth {
                for &child in graph[id].children.iter().rev() {
                    self.pending.push((child, depth + 1));
                }
            }
            self.maybe_flush();
        }
        self.finish()
    }

    fn open_root_document(&mut self) -> Result<(), EmitError> {
        if !self.options.split {
            let name = format!("{}.xsd", self.options.base_name);
            self.sink.begin_document(&name)?;
        }
        self.write_header();
        if self.options.split {
            // Imports land right after the schema opening once the
            // finishing pass knows the partition list.
            self.import_mark = self.writer.buffered();
        }
        Ok(())
    }

    fn write_header(&mut self) {
        self.writer
            .write_line(0, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>");
        self.writer.open_tag(
            0,
            "xs:schema",
            &[
                ("xmlns:xs", "http://www.w3.org/2001/XMLSchema"),
                ("targetNamespace", self.options.namespace.as_str()),
                ("xmlns", self.options.namespace.as_str()),
                ("elementFormDefault", "qualified"),
            ],
        );
    }

    /// Close out the current document and open a partition for the root
    /// child `id`.
    fn start_partition(&mut self, id: TagId) -> Result<(), EmitError> {
        if self.partitions.is_empty() {
            // Leaving the root document: close it and hold the bytes for
            // the import finishing pass.
            self.flush_closings(0);
            self.writer.write_line(0, "</xs:schema>");
            self.root_doc = self.writer.take();
            self.indent_offset = 0;
        } else {
            self.flush_closings(1);
            self.writer.write_line(0, "</xs:schema>");
            self.finish_document()?;
        }
        let name = format!("{}_{}.xsd", self.options.base_name, self.graph[id].key);
        crate::debug!("starting partition document {name}");
        self.sink.begin_document(&name)?;
        self.partitions.push(name);
        self.write_header();
        Ok(())
    }

    /// Write one tag's declaration at the given traversal depth.
    ///
    /// List items and leaves are self-contained; structured tags defer
    /// their closing markup so descendants nest inside.
    fn emit_tag(&mut self, id: TagId, depth: usize) {
        let graph = self.graph;
        let stats = &graph[id];
        let indent = depth + self.indent_offset;
        if stats.is_list_item {
            // Heterogeneous list contents stay unconstrained.
            self.writer
                .open_tag(indent, "xs:complexType", &[("name", stats.key.as_str())]);
            self.writer.empty_tag(
                indent + 1,
                "xs:any",
                &[
                    ("minOccurs", "0"),
                    ("maxOccurs", "unbounded"),
                    ("processContents", "skip"),
                ],
            );
            self.writer.write_line(indent, "</xs:complexType>");
            return;
        }
        if stats.is_leaf() {
            let base = match stats.content_type() {
                ContentType::Integer => "xs:integer",
                ContentType::String => "xs:string",
            };
            self.writer
                .open_tag(indent, "xs:simpleType", &[("name", stats.key.as_str())]);
            self.writer
                .empty_tag(indent + 1, "xs:restriction", &[("base", base)]);
            self.writer.write_line(indent, "</xs:simpleType>");
            return;
        }

        let mut attributes = vec![("name", stats.key.as_str())];
        if stats.is_mixed {
            attributes.push(("mixed", "true"));
        }
        self.writer.open_tag(indent, "xs:complexType", &attributes);
        self.closing.push((closing_tag("xs:complexType"), depth));

        let descend = depth + 1 < self.options.depth;
        let reference_children = descend || self.options.truncation == Truncation::Reference;
        if !stats.children.is_empty() && reference_children {
            self.writer.open_tag(
                indent + 1,
                "xs:choice",
                &[("minOccurs", "0"), ("maxOccurs", "unbounded")],
            );
            for &child in &stats.children {
                let child = &graph[child];
                let name = if child.is_list_item {
                    "li"
                } else {
                    child.key.as_str()
                };
                self.writer.empty_tag(
                    indent + 2,
                    "xs:element",
                    &[("name", name), ("type", child.key.as_str())],
                );
            }
            self.writer.write_line(indent + 1, "</xs:choice>");
        }
        for attribute in stats.attributes.keys() {
            self.writer.empty_tag(
                indent + 1,
                "xs:attribute",
                &[("name", attribute.as_str()), ("type", "xs:string")],
            );
        }
    }

    /// Write out deferred closing tags for every scope opened at `depth`
    /// or deeper.
    fn flush_closings(&mut self, depth: usize) {
        while let Some((markup, opened_at)) = self.closing.pop() {
            if opened_at < depth {
                self.closing.push((markup, opened_at));
                break;
            }
            self.writer
                .write_line(opened_at + self.indent_offset, &markup);
        }
    }

    fn maybe_flush(&mut self) {
        let streaming = !self.options.split || !self.partitions.is_empty();
        if streaming && self.writer.buffered() >= self.options.flush_threshold {
            self.flush();
        }
    }

    /// Push buffered bytes to the sink. Failure is recoverable: the bytes
    /// stay buffered for the next attempt.
    fn flush(&mut self) {
        match self.sink.write(self.writer.bytes()) {
            Ok(()) => self.writer.clear(),
            Err(err) => crate::warn!("schema flush failed, bytes retained: {err}"),
        }
    }

    /// Final flush and close of the current document. Failure here is
    /// fatal, unlike a mid-document flush.
    fn finish_document(&mut self) -> Result<(), EmitError> {
        self.sink.write(self.writer.bytes())?;
        self.writer.clear();
        self.sink.end_document()?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), EmitError> {
        if !self.options.split {
            self.flush_closings(0);
            self.writer.write_line(0, "</xs:schema>");
            return self.finish_document();
        }
        if self.partitions.is_empty() {
            // No partition was ever opened; the root document is still in
            // the writer.
            self.flush_closings(0);
            self.writer.write_line(0, "</xs:schema>");
            self.root_doc = self.writer.take();
        } else {
            self.flush_closings(1);
            self.writer.write_line(0, "</xs:schema>");
            self.finish_document()?;
        }
        self.write_root_document()
    }

    /// Insert the import declarations and write the held-back root document.
    fn write_root_document(&mut self) -> Result<(), EmitError> {
        let mut imports = XsdWriter::new();
        for partition in &self.partitions {
            imports.empty_tag(
                1,
                "xs:import",
                &[
                    ("namespace", self.options.namespace.as_str()),
                    ("schemaLocation", partition.as_str()),
                ],
            );
        }
        let imports = imports.finish();
        let mut document = Vec::with_capacity(self.root_doc.len() + imports.len());
        document.extend_from_slice(&self.root_doc[..self.import_mark]);
        document.extend_from_slice(&imports);
        document.extend_from_slice(&self.root_doc[self.import_mark..]);

        let name = format!("{}.xsd", self.options.base_name);
        self.sink.begin_document(&name)?;
        self.sink.write(&document)?;
        self.sink.end_document()?;
        Ok(())
    }
}
