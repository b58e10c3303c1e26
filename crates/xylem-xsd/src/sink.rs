//! Destinations for emitted schema documents.

use std::fs;
use std::fs::File;
use std::io;
use std::io::Write;
use std::path::PathBuf;

/// Receives emitted schema documents.
///
/// The emitter opens one document at a time: a [`begin_document`] call,
/// one or more [`write`] calls streaming the document's bytes, then an
/// [`end_document`] call. Documents are never interleaved.
///
/// [`begin_document`]: SchemaSink::begin_document
/// [`write`]: SchemaSink::write
/// [`end_document`]: SchemaSink::end_document
pub trait SchemaSink {
    /// Start a new document with the given file name.
    fn begin_document(&mut self, name: &str) -> io::Result<()>;

    /// Append bytes to the open document.
    fn write(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Finish the open document.
    fn end_document(&mut self) -> io::Result<()>;
}

/// Writes each document to a file under one output directory.
#[derive(Debug)]
pub struct FileSink {
    dir: PathBuf,
    current: Option<File>,
}

impl FileSink {
    /// Create a sink writing under `dir`, creating the directory if missing.
    pub fn new(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir, current: None })
    }
}

impl SchemaSink for FileSink {
    fn begin_document(&mut self, name: &str) -> io::Result<()> {
        self.current = Some(File::create(self.dir.join(name))?);
        Ok(())
    }

    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        match &mut self.current {
            Some(file) => file.write_all(bytes),
            None => Err(io::Error::other("no document open")),
        }
    }

    fn end_document(&mut self) -> io::Result<()> {
        match self.current.take() {
            Some(mut file) => file.flush(),
            None => Err(io::Error::other("no document open")),
        }
    }
}

/// Captures finished documents in memory, for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemorySink {
    finished: Vec<(String, Vec<u8>)>,
    open: Option<(String, Vec<u8>)>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Finished documents in the order they were closed.
    pub fn documents(&self) -> &[(String, Vec<u8>)] {
        &self.finished
    }

    /// The finished document with the given name, as UTF-8 text.
    pub fn document(&self, name: &str) -> Option<&str> {
        self.finished
            .iter()
            .find(|(finished, _)| finished == name)
            .and_then(|(_, bytes)| std::str::from_utf8(bytes).ok())
    }
}

impl SchemaSink for MemorySink {
    fn begin_document(&mut self, name: &str) -> io::Result<()> {
        self.open = Some((name.to_string(), Vec::new()));
        Ok(())
    }

    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        match &mut self.open {
            Some((_, buffer)) => {
                buffer.extend_from_slice(bytes);
                Ok(())
            }
            None => Err(io::Error::other("no document open")),
        }
    }

    fn end_document(&mut self) -> io::Result<()> {
        match self.open.take() {
            Some(document) => {
                self.finished.push(document);
                Ok(())
            }
            None => Err(io::Error::other("no document open")),
        }
    }
}
