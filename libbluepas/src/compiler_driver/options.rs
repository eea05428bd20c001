// Copyright 2026 Neil Henderson, Blue Tarp Media.
//
//! The `options` module defines the compiler driver's options.

/// Options that control the compiler driver's behavior.
#[derive(Debug, Default)]
pub struct DriverOptions {
    /// Annotate the emitted assembly with `# QUAD` trace comments and prologue/epilogue symbol
    /// summaries. Cosmetic only; never changes the emitted instructions.
    pub assembler_trace: bool,

    /// Print each body's quad list to stdout before it is lowered.
    pub print_quads: bool,
}
