// Copyright 2026 Neil Henderson, Blue Tarp Media.
//
//! The `driver` module defines `Driver`, which is the BluePas compiler driver type.

use std::io::Write;

use super::diagnostics::Diagnostic;
use super::diagnostics::printer::Printer;
use super::options::DriverOptions;

/// The BluePas backend driver.
///
/// The driver carries the options that control the backend passes and collects the diagnostics
/// they emit. A pass reports a problem in the user's program by calling [add_diagnostic]
/// (normally through one of the [Error](super::Error) constructors) and keeps going, so that one
/// run surfaces as many independent errors as possible. Callers check
/// [has_error_diagnostics](Self::has_error_diagnostics) between passes.
///
/// [add_diagnostic]: Self::add_diagnostic
pub struct Driver {
    // Options that control the backend.
    options: DriverOptions,

    // Diagnostics emitted by the passes.
    errors: Vec<Diagnostic>,
}

impl Driver {
    /// Creates a new driver with the given options.
    pub fn new(options: DriverOptions) -> Self {
        Self { options, errors: Vec::new() }
    }

    /// Creates a new driver for unit tests, with default options.
    #[cfg(test)]
    pub fn for_testing() -> Self {
        Self::new(DriverOptions::default())
    }

    /// The driver's options.
    pub fn options(&self) -> &DriverOptions {
        &self.options
    }

    /// Adds a diagnostic.
    pub fn add_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.errors.push(diagnostic);
    }

    /// Are there any error diagnostics?
    pub fn has_error_diagnostics(&self) -> bool {
        !self.errors.is_empty()
    }

    /// The number of error diagnostics.
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// The collected diagnostics, in emission order.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.errors
    }

    /// Prints all diagnostics to `stderr`.
    pub fn print_diagnostics(&self) {
        self.print_diagnostics_to_buffer(std::io::stderr());
    }

    /// Prints all diagnostics to the given `buffer`.
    ///
    /// You probably want `print_diagnostics` instead of this function, unless you deliberately
    /// want to print diagnostics into a buffer.
    pub fn print_diagnostics_to_buffer(&self, buffer: impl Write) {
        if self.errors.is_empty() {
            return;
        }

        let mut printer = Printer::new(buffer);
        printer.print_diagnostics(&self.errors);
    }
}
