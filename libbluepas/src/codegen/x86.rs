// Copyright 2026 Neil Henderson, Blue Tarp Media.
//
//! The `x86` module contains the codegen functionality for the x86_64 target.
//!
//! The generated code follows the BluePas calling convention: the caller pushes arguments and
//! cleans them up after the call; each activation record carries a display of enclosing-scope
//! frame pointers for constant-cost non-local access; scalar results travel in `rax` and real
//! results on the x87 floating-point stack.

mod ast;
mod file_writer;
mod generate;
mod registers;


use std::io::{self, Write};

use log::debug;

use crate::compiler_driver::Driver;
use crate::ir::Quad;
use crate::symbols::{SymbolId, SymbolTable};

use file_writer::AsmFileWriter;

/// The x86_64 code generator. Owns the output sink for the whole compilation; bodies are lowered
/// into it one at a time, in declaration order.
pub struct CodeGenerator<W: Write> {
    writer: AsmFileWriter<W>,
}

impl<W: Write> CodeGenerator<W> {
    /// Creates a code generator writing into the given sink.
    pub fn new(out: W) -> Self {
        Self { writer: AsmFileWriter::new(out) }
    }

    /// Generates the assembly for one callable: its prologue, its lowered quad list, and its
    /// epilogue. All text is flushed before returning, so partial output is crash-consistent.
    pub fn generate_assembler(
        &mut self,
        quads: &[Quad],
        env: SymbolId,
        symbols: &mut SymbolTable,
        driver: &Driver,
    ) -> io::Result<()> {
        debug!("generating assembler for '{}'", symbols.get(env).name);

        if driver.options().print_quads {
            for (index, quad) in quads.iter().enumerate() {
                println!("{:4}: {quad}", index + 1);
            }
        }

        let instructions = generate::generate_asm_body(quads, env, symbols, driver.options().assembler_trace);

        for instruction in &instructions {
            self.writer.write_instruction(instruction)?;
        }

        self.writer.flush()
    }
}
