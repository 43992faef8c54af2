//! Destinations for rendered outputs.

use std::fs;
use std::io;
use std::path::PathBuf;

/// One rendered file: where it goes and what it contains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDescriptor {
    pub path: PathBuf,
    pub contents: Vec<u8>,
    /// Target language, `None` for an untranslated copy of the source.
    pub language: Option<String>,
}

/// Receives every output produced by a run.
pub trait OutputSink {
    /// # Errors
    /// The output could not be stored.
    fn emit(&mut self, output: OutputDescriptor) -> io::Result<()>;
}

/// Writes outputs to disk, creating parent directories as needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSink;

impl OutputSink for FsSink {
    fn emit(&mut self, output: OutputDescriptor) -> io::Result<()> {
        if let Some(parent) = output.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&output.path, &output.contents)?;
        tracing::debug!(language = ?output.language, "Wrote {}", output.path.display());
        Ok(())
    }
}

/// Keeps outputs in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    /// Everything emitted so far
    outputs: Vec<OutputDescriptor>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self { outputs: Vec::new() }
    }

    /// Outputs in emission order.
    #[must_use]
    pub fn outputs(&self) -> &[OutputDescriptor] {
        &self.outputs
    }

    #[must_use]
    pub fn into_outputs(self) -> Vec<OutputDescriptor> {
        self.outputs
    }
}

impl OutputSink for MemorySink {
    fn emit(&mut self, output: OutputDescriptor) -> io::Result<()> {
        self.outputs.push(output);
        Ok(())
    }
}

impl<S: OutputSink + ?Sized> OutputSink for &mut S {
    fn emit(&mut self, output: OutputDescriptor) -> io::Result<()> {
        (**self).emit(output)
    }
}
