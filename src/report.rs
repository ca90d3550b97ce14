/*!
 * Diagnostic sinks.
 *
 * The pipeline hands its final list of diagnostics to a `Reporter`; only
 * reporters turn them into text.
 */

use std::io::{self, Write};

use crate::checks::Diagnostic;

/// Receives the diagnostics of a finished run
pub trait Reporter {
    fn report(&mut self, diagnostics: &[Diagnostic]) -> io::Result<()>;
}

/// Human readable text, one block per diagnostic
pub struct ConsoleReporter<W: Write> {
    out: W,
}

impl ConsoleReporter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Reporter for ConsoleReporter<W> {
    fn report(&mut self, diagnostics: &[Diagnostic]) -> io::Result<()> {
        if diagnostics.is_empty() {
            writeln!(self.out, "No problems found")?;
            return self.out.flush();
        }

        for diagnostic in diagnostics {
            writeln!(self.out, "[{}] {}", diagnostic.kind(), diagnostic)?;
        }
        writeln!(self.out, "{} problem(s) found", diagnostics.len())?;
        self.out.flush()
    }
}

/// JSON array of diagnostics
pub struct JsonReporter<W: Write> {
    out: W,
}

impl JsonReporter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> JsonReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Reporter for JsonReporter<W> {
    fn report(&mut self, diagnostics: &[Diagnostic]) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut self.out, diagnostics)?;
        writeln!(self.out)?;
        self.out.flush()
    }
}

/// Keeps diagnostics in memory
#[derive(Debug, Default)]
pub struct MemoryReporter {
    pub diagnostics: Vec<Diagnostic>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Reporter for MemoryReporter {
    fn report(&mut self, diagnostics: &[Diagnostic]) -> io::Result<()> {
        self.diagnostics.extend_from_slice(diagnostics);
        Ok(())
    }
}
