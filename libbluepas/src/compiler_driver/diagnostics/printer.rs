// Copyright 2026 Neil Henderson, Blue Tarp Media.
//
//! The `printer` module prints diagnostics to an output buffer.

use std::io::Write;

use super::Diagnostic;

/// A diagnostics printer.
pub struct Printer<W: Write> {
    buffer: W,
}

impl<W: Write> Printer<W> {
    /// Creates a printer writing into the given buffer.
    pub fn new(buffer: W) -> Self {
        Self { buffer }
    }

    /// Prints the given diagnostics, one per line, in the order they were emitted.
    pub fn print_diagnostics(&mut self, diagnostics: &[Diagnostic]) {
        for diag in diagnostics {
            let result = if diag.location().is_none() {
                writeln!(self.buffer, "error: {}", diag.message())
            } else {
                writeln!(self.buffer, "error at {}: {}", diag.location(), diag.message())
            };

            if result.is_err() {
                return; // Nothing sensible to do about a broken diagnostics stream.
            }
        }

        _ = self.buffer.flush();
    }
}
