#![doc = include_str!("../README.md")]
//! Schema emission for linked tag graphs.
//!
//! [`emit`] drives a depth-bounded worklist traversal from a declared
//! root, writing one declaration per reachable tag through a
//! [`SchemaSink`]. [`EmitOptions`] carries the traversal configuration;
//! [`FileSink`] streams documents to disk and [`MemorySink`] captures
//! them for inspection.

mod emitter;
mod options;
mod sink;
mod tracing_macros;
mod writer;

pub use emitter::{EmitError, emit};
pub use options::{EmitOptions, Truncation};
pub use sink::{FileSink, MemorySink, SchemaSink};
pub use writer::{XsdWriter, escape_attr};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_pipeline() {
        let doc = xylem_tree::parse("<inventory><item>axe</item></inventory>").unwrap();
        let graph = xylem_stats::analyze([&doc], "Li").unwrap();
        let mut sink = MemorySink::new();
        emit(&graph, &EmitOptions::new("inventory"), &mut sink).unwrap();
        let schema = sink.document("RWSchema.xsd").unwrap();
        assert!(schema.starts_with("<?xml"));
        assert!(schema.ends_with("</xs:schema>\n"));
    }

    #[test]
    fn test_options_are_chainable() {
        let options = EmitOptions::new("Defs")
            .depth(4)
            .base_name("Mods")
            .split()
            .truncation(Truncation::Reference);
        assert_eq!(options.root, "Defs");
        assert_eq!(options.depth, 4);
        assert_eq!(options.base_name, "Mods");
        assert!(options.split);
        assert_eq!(options.truncation, Truncation::Reference);
    }
}
