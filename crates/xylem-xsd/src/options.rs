//! Emission options.

/// How to handle a child sitting exactly on the depth bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Truncation {
    /// Drop the child from the parent's choice entirely.
    Omit,
    /// Keep the typed reference in the choice without descending into it.
    ///
    /// The referenced type may be declared on another branch or not at
    /// all; the policy bounds output size, it does not guarantee closure.
    Reference,
}

/// Options for schema emission.
#[derive(Debug, Clone)]
pub struct EmitOptions {
    /// Identity of the tag the traversal starts from.
    pub root: String,

    /// Maximum traversal depth; children past the bound stop expanding
    /// (default: 8)
    pub depth: usize,

    /// Base name for emitted documents: the root document is
    /// `{base}.xsd`, partitions are `{base}_{child}.xsd`
    /// (default: "RWSchema")
    pub base_name: String,

    /// Target namespace declared by every document
    /// (default: "http://tempuri.org/RWSchema")
    pub namespace: String,

    /// Partition output into one document per root child, with imports
    /// stitched into the root document (default: false)
    pub split: bool,

    /// Policy for children at the depth bound (default: Omit)
    pub truncation: Truncation,

    /// Buffered bytes before an incremental flush to the sink
    /// (default: 64 KiB)
    pub flush_threshold: usize,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            root: String::new(),
            depth: 8,
            base_name: "RWSchema".to_string(),
            namespace: "http://tempuri.org/RWSchema".to_string(),
            split: false,
            truncation: Truncation::Omit,
            flush_threshold: 64 * 1024,
        }
    }
}

impl EmitOptions {
    /// Default options for a traversal rooted at the given tag identity.
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Set the maximum traversal depth.
    pub fn depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    /// Set the base document name.
    pub fn base_name(mut self, name: impl Into<String>) -> Self {
        self.base_name = name.into();
        self
    }

    /// Set the declared target namespace.
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Partition output into one document per root child.
    pub fn split(mut self) -> Self {
        self.split = true;
        self
    }

    /// Set the policy for children at the depth bound.
    pub fn truncation(mut self, policy: Truncation) -> Self {
        self.truncation = policy;
        self
    }

    /// Set the incremental flush threshold in bytes.
    pub fn flush_threshold(mut self, bytes: usize) -> Self {
        self.flush_threshold = bytes;
        self
    }
}
