// Copyright 2026 Neil Henderson, Blue Tarp Media.
//
//! The `file_writer` module writes x86_64 assembly instructions as Intel-syntax text.

use std::io::{BufWriter, Result, Write};

use super::ast::{AsmInstruction, AsmOperand, ConditionalCode};

const INDENT: &str = "    ";

/// An x86_64 assembly code writer over any output sink.
pub struct AsmFileWriter<W: Write> {
    writer: BufWriter<W>,
}

impl<W: Write> AsmFileWriter<W> {
    /// Creates a new writer.
    pub fn new(out: W) -> Self {
        Self { writer: BufWriter::new(out) }
    }

    /// Writes one instruction.
    pub fn write_instruction(&mut self, instr: &AsmInstruction) -> Result<()> {
        match instr {
            AsmInstruction::Label { id, comment } => match comment {
                Some(comment) => writeln!(self.writer, "L{id}:{INDENT}# {comment}"),
                None => writeln!(self.writer, "L{id}:"),
            },

            AsmInstruction::Comment(text) => writeln!(self.writer, "{INDENT}# {text}"),

            AsmInstruction::Mov { dst, src } => self.write_binary_instruction("mov", dst, src),
            AsmInstruction::Push(operand) => self.write_unary_instruction("push", operand),

            AsmInstruction::Neg(reg) => self.writeln_with_indent(&format!("neg {reg}")),
            AsmInstruction::Add { dst, src } => self.write_binary_instruction("add", dst, src),
            AsmInstruction::Sub { dst, src } => self.write_binary_instruction("sub", dst, src),
            AsmInstruction::IMul { dst, src } => {
                self.writeln_with_indent(&format!("imul {dst}, {}", operand_to_string(src)))
            }

            AsmInstruction::Cqo => self.writeln_with_indent("cqo"),
            AsmInstruction::IDiv(reg) => self.writeln_with_indent(&format!("idiv {reg}")),

            AsmInstruction::Cmp { lhs, rhs } => self.write_binary_instruction("cmp", lhs, rhs),
            AsmInstruction::Jmp { target } => self.writeln_with_indent(&format!("jmp L{target}")),
            AsmInstruction::JmpCC { cond, target } => {
                self.writeln_with_indent(&format!("{} L{target}", conditional_jmp(cond)))
            }
            AsmInstruction::Call { target } => self.writeln_with_indent(&format!("call L{target}")),

            AsmInstruction::Fld(operand) => self.write_float_instruction("fld", operand),
            AsmInstruction::Fild(operand) => self.write_float_instruction("fild", operand),
            AsmInstruction::Fstp(operand) => self.write_float_instruction("fstp", operand),
            AsmInstruction::FstpSt0 => self.writeln_with_indent("fstp st(0)"),
            AsmInstruction::Fchs => self.writeln_with_indent("fchs"),
            AsmInstruction::Faddp => self.writeln_with_indent("faddp"),
            AsmInstruction::Fsubp => self.writeln_with_indent("fsubp"),
            AsmInstruction::Fmulp => self.writeln_with_indent("fmulp"),
            AsmInstruction::Fdivp => self.writeln_with_indent("fdivp"),
            AsmInstruction::Fcomip => self.writeln_with_indent("fcomip st, st(1)"),

            AsmInstruction::Leave => self.writeln_with_indent("leave"),
            AsmInstruction::Ret => self.writeln_with_indent("ret"),
        }
    }

    /// Flushes the output stream.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()
    }

    fn writeln_with_indent(&mut self, line: &str) -> Result<()> {
        writeln!(self.writer, "{INDENT}{line}")
    }

    fn write_unary_instruction(&mut self, instr: &str, operand: &AsmOperand) -> Result<()> {
        writeln!(self.writer, "{INDENT}{instr} {}", operand_to_string(operand))
    }

    fn write_binary_instruction(&mut self, instr: &str, operand1: &AsmOperand, operand2: &AsmOperand) -> Result<()> {
        writeln!(self.writer, "{INDENT}{instr} {}, {}", operand_to_string(operand1), operand_to_string(operand2))
    }

    // The x87 memory instructions need an operation-size qualifier; every real is one qword.
    fn write_float_instruction(&mut self, instr: &str, operand: &AsmOperand) -> Result<()> {
        writeln!(self.writer, "{INDENT}{instr} qword ptr {}", operand_to_string(operand))
    }
}

fn operand_to_string(operand: &AsmOperand) -> String {
    match operand {
        AsmOperand::Imm(value) => format!("{value}"),

        AsmOperand::Reg(reg) => reg.to_string(),

        AsmOperand::Memory { base, relative } => {
            if *relative == 0 {
                format!("[{base}]")
            } else if *relative > 0 {
                format!("[{base}+{relative}]")
            } else {
                format!("[{base}{relative}]")
            }
        }
    }
}

fn conditional_jmp(cond: &ConditionalCode) -> &'static str {
    match cond {
        ConditionalCode::E => "je",
        ConditionalCode::NE => "jne",
        ConditionalCode::L => "jl",
        ConditionalCode::G => "jg",
        ConditionalCode::B => "jb",
        ConditionalCode::A => "ja",
    }
}
