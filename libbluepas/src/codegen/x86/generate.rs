// Copyright 2026 Neil Henderson, Blue Tarp Media.
//
//! The `generate` module lowers one body's quad list into x86_64 assembly instructions.
//!
//! The prologue builds the activation record: it saves the caller's linkage, copies the caller's
//! display into the new frame, pushes the new frame pointer as the frame's own display slot, and
//! reserves the aligned activation-record size. After that, any variable at lexical level L is
//! reachable through a single load of display slot L, no matter how deep the nesting.
//!
//! Integer values move through `rax`/`rcx`; reals only ever move through the x87 evaluation
//! stack. Boolean results are materialized as 0/1 with a branch pair over two freshly allocated
//! labels; the operands of `and`/`or` are both evaluated fully (no short-circuit).

use crate::ICE;
use crate::ir::Quad;
use crate::symbols::{ConstValue, SymbolId, SymbolKind, SymbolTable, WORD_WIDTH};

use super::ast::{AsmInstruction, AsmOperand, ConditionalCode};
use super::registers::Register::{RAX, RCX, RDX, RBP, RSP};
use super::registers::Register;

/// Lowers one callable's quad list: prologue, body, epilogue.
pub fn generate_asm_body(quads: &[Quad], env: SymbolId, symbols: &mut SymbolTable, trace: bool) -> Vec<AsmInstruction> {
    let mut generator = Generator { symbols, trace, out: Vec::new() };

    generator.prologue(env);
    generator.expand(quads);
    generator.epilogue(env);

    generator.out
}

/// Aligns a frame size on the stack-alignment boundary. Used by the prologue.
pub fn align_frame_size(frame_size: i64) -> i64 {
    ((frame_size + WORD_WIDTH - 1) / WORD_WIDTH) * WORD_WIDTH
}

/// The bit pattern of a real, as the immediate it is moved around with.
pub fn ieee_bits(value: f64) -> i64 {
    value.to_bits() as i64
}

/// Finds the display level and frame-relative offset of a variable, array or parameter.
pub fn frame_location(symbols: &SymbolTable, sym: SymbolId) -> (usize, i64) {
    let symbol = symbols.get(sym);

    match symbol.kind {
        // Locals sit below the display area of their frame.
        SymbolKind::Variable | SymbolKind::Array { .. } => {
            (symbol.level, -((symbol.level as i64 + 1) * WORD_WIDTH + symbol.offset))
        }

        // Parameters sit above the saved return address, each addressed past its own slot.
        SymbolKind::Parameter { size } => (symbol.level, WORD_WIDTH + symbol.offset + size),

        _ => ICE!("frame_location() called for {} '{}'", symbol.kind_name(), symbol.name),
    }
}

struct Generator<'a> {
    symbols: &'a mut SymbolTable,
    trace: bool,
    out: Vec<AsmInstruction>,
}

impl Generator<'_> {
    fn emit(&mut self, instruction: AsmInstruction) {
        self.out.push(instruction);
    }

    /// Generates the code that builds a procedure's or function's activation record.
    fn prologue(&mut self, env: SymbolId) {
        let symbol = self.symbols.get(env);

        let (label, ar_size, level) = match &symbol.kind {
            SymbolKind::Procedure { label, ar_size, .. } | SymbolKind::Function { label, ar_size, .. } => {
                (*label, *ar_size, symbol.level)
            }
            _ => ICE!("prologue() called for non-procedure/function '{}'", symbol.name),
        };

        let name = symbol.name.clone();
        let kind_name = symbol.kind_name();

        self.emit(AsmInstruction::Label { id: label, comment: Some(name.clone()) });

        if self.trace {
            self.emit(AsmInstruction::Comment(format!("PROLOGUE ({name}: {kind_name} at level {level})")));
        }

        // Save the caller's frame pointer and remember where this frame starts.
        self.emit(AsmInstruction::Push(AsmOperand::Reg(RBP)));
        self.emit(AsmInstruction::Mov { dst: AsmOperand::Reg(RCX), src: AsmOperand::Reg(RSP) });

        // Copy the caller's display; every enclosing scope's frame pointer lands one slot lower
        // in the new frame.
        for slot in 1..=level {
            let caller_slot = AsmOperand::memory(RBP, -(slot as i64 * WORD_WIDTH));
            self.emit(AsmInstruction::Push(caller_slot));
        }

        // This frame's own display slot, then the new frame pointer and the locals.
        self.emit(AsmInstruction::Push(AsmOperand::Reg(RCX)));
        self.emit(AsmInstruction::Mov { dst: AsmOperand::Reg(RBP), src: AsmOperand::Reg(RCX) });
        self.emit(AsmInstruction::Sub {
            dst: AsmOperand::Reg(RSP),
            src: AsmOperand::Imm(align_frame_size(ar_size)),
        });
    }

    /// Generates the code that leaves a procedure or function.
    fn epilogue(&mut self, env: SymbolId) {
        if self.trace {
            let summary = format!("EPILOGUE ({})", self.symbols.get(env).name);
            self.emit(AsmInstruction::Comment(summary));
        }

        self.emit(AsmInstruction::Leave);
        self.emit(AsmInstruction::Ret);
    }

    /// Finds the display level and frame-relative offset of a variable, array or parameter.
    fn frame_location(&self, sym: SymbolId) -> (usize, i64) {
        frame_location(self.symbols, sym)
    }

    /// Loads the frame pointer for the given lexical level out of the current frame's display.
    fn frame_address(&mut self, level: usize, dest: Register) {
        self.emit(AsmInstruction::Mov {
            dst: AsmOperand::Reg(dest),
            src: AsmOperand::memory(RBP, -(level as i64 * WORD_WIDTH)),
        });
    }

    /// Fetches the value of a variable, parameter or constant into a register.
    fn fetch(&mut self, sym: SymbolId, dest: Register) {
        let symbol = self.symbols.get(sym);

        match symbol.kind {
            SymbolKind::Constant { value } => {
                let immediate = match value {
                    ConstValue::Int(value) => value,
                    ConstValue::Real(value) => ieee_bits(value),
                };
                self.emit(AsmInstruction::Mov { dst: AsmOperand::Reg(dest), src: AsmOperand::Imm(immediate) });
            }

            SymbolKind::Variable | SymbolKind::Parameter { .. } => {
                let (level, offset) = self.frame_location(sym);
                self.frame_address(level, RCX);
                self.emit(AsmInstruction::Mov { dst: AsmOperand::Reg(dest), src: AsmOperand::memory(RCX, offset) });
            }

            _ => ICE!("fetch() called for {} '{}'", symbol.kind_name(), symbol.name),
        }
    }

    /// Pushes the value of a real variable, parameter or constant onto the evaluation stack.
    fn fetch_float(&mut self, sym: SymbolId) {
        let symbol = self.symbols.get(sym);

        match symbol.kind {
            SymbolKind::Constant { value } => {
                let ConstValue::Real(value) = value else {
                    ICE!("fetch_float() called for integer constant '{}'", symbol.name);
                };

                // Land the bit pattern in stack memory so the fld can reach it.
                self.emit(AsmInstruction::Mov { dst: AsmOperand::Reg(RAX), src: AsmOperand::Imm(ieee_bits(value)) });
                self.emit(AsmInstruction::Push(AsmOperand::Reg(RAX)));
                self.emit(AsmInstruction::Fld(AsmOperand::memory(RSP, 0)));
                self.emit(AsmInstruction::Add { dst: AsmOperand::Reg(RSP), src: AsmOperand::Imm(WORD_WIDTH) });
            }

            SymbolKind::Variable | SymbolKind::Parameter { .. } => {
                let (level, offset) = self.frame_location(sym);
                self.frame_address(level, RCX);
                self.emit(AsmInstruction::Fld(AsmOperand::memory(RCX, offset)));
            }

            _ => ICE!("fetch_float() called for {} '{}'", symbol.kind_name(), symbol.name),
        }
    }

    /// Stores the value of a register into a variable or parameter.
    fn store(&mut self, src: Register, sym: SymbolId) {
        let (level, offset) = self.frame_location(sym);
        self.frame_address(level, RCX);
        self.emit(AsmInstruction::Mov { dst: AsmOperand::memory(RCX, offset), src: AsmOperand::Reg(src) });
    }

    /// Pops the evaluation stack into a real variable or parameter.
    fn store_float(&mut self, sym: SymbolId) {
        let (level, offset) = self.frame_location(sym);
        self.frame_address(level, RCX);
        self.emit(AsmInstruction::Fstp(AsmOperand::memory(RCX, offset)));
    }

    /// Fetches the base address of an array into a register. Array storage grows toward lower
    /// addresses from the declared base.
    fn array_address(&mut self, sym: SymbolId, dest: Register) {
        let (level, offset) = self.frame_location(sym);
        self.frame_address(level, RCX);

        if offset >= 0 {
            self.emit(AsmInstruction::Add { dst: AsmOperand::Reg(RCX), src: AsmOperand::Imm(offset) });
        } else {
            self.emit(AsmInstruction::Sub { dst: AsmOperand::Reg(RCX), src: AsmOperand::Imm(-offset) });
        }

        self.emit(AsmInstruction::Mov { dst: AsmOperand::Reg(dest), src: AsmOperand::Reg(RCX) });
    }

    /// Materializes a 0/1 result in `rax` from the branch taken on `cond`, then stores it.
    ///
    /// Uses two freshly allocated, never-reused labels. The comparison itself must already have
    /// set the CPU flags.
    fn materialize_boolean(&mut self, cond: ConditionalCode, dst: SymbolId) {
        let true_label = self.symbols.next_label();
        let end_label = self.symbols.next_label();

        self.emit(AsmInstruction::JmpCC { cond, target: true_label });
        self.emit(AsmInstruction::Mov { dst: AsmOperand::Reg(RAX), src: AsmOperand::Imm(0) });
        self.emit(AsmInstruction::Jmp { target: end_label });
        self.emit(AsmInstruction::Label { id: true_label, comment: None });
        self.emit(AsmInstruction::Mov { dst: AsmOperand::Reg(RAX), src: AsmOperand::Imm(1) });
        self.emit(AsmInstruction::Label { id: end_label, comment: None });
        self.store(RAX, dst);
    }

    /// Lowers an integer relation: compare, branch, materialize 0/1.
    fn integer_relation(&mut self, cond: ConditionalCode, lhs: SymbolId, rhs: SymbolId, dst: SymbolId) {
        self.fetch(lhs, RAX);
        self.fetch(rhs, RCX);
        self.emit(AsmInstruction::Cmp { lhs: AsmOperand::Reg(RAX), rhs: AsmOperand::Reg(RCX) });
        self.materialize_boolean(cond, dst);
    }

    /// Lowers a real relation. `first`/`second` are given in the push order the condition code
    /// expects: `fcomip` compares the top of the evaluation stack (the operand pushed second)
    /// against the slot below it.
    fn real_relation(&mut self, cond: ConditionalCode, first: SymbolId, second: SymbolId, dst: SymbolId) {
        self.fetch_float(first);
        self.fetch_float(second);
        self.emit(AsmInstruction::Fcomip);
        self.emit(AsmInstruction::FstpSt0); // Clear the remaining operand off the stack.
        self.materialize_boolean(cond, dst);
    }

    /// Lowers a real arithmetic operation: push both operands in source order, operate, pop.
    fn real_arithmetic(&mut self, operation: AsmInstruction, lhs: SymbolId, rhs: SymbolId, dst: SymbolId) {
        self.fetch_float(lhs);
        self.fetch_float(rhs);
        self.emit(operation);
        self.store_float(dst);
    }

    /// Lowers an integer arithmetic operation through `rax`/`rcx`.
    fn integer_arithmetic(&mut self, op: fn(AsmOperand, AsmOperand) -> AsmInstruction, lhs: SymbolId, rhs: SymbolId, dst: SymbolId) {
        self.fetch(lhs, RAX);
        self.fetch(rhs, RCX);
        self.emit(op(AsmOperand::Reg(RAX), AsmOperand::Reg(RCX)));
        self.store(RAX, dst);
    }

    /// Lowers the combined divide instruction; the quotient lands in `rax`, the remainder in
    /// `rdx`, and `result` picks which one the quad wants.
    fn integer_division(&mut self, lhs: SymbolId, rhs: SymbolId, result: Register, dst: SymbolId) {
        self.fetch(lhs, RAX);
        self.fetch(rhs, RCX);
        self.emit(AsmInstruction::Cqo);
        self.emit(AsmInstruction::IDiv(RCX));
        self.store(result, dst);
    }

    /// Computes the address of `array[index]` into `rax`.
    fn index_address(&mut self, array: SymbolId, index: SymbolId) {
        self.array_address(array, RAX);
        self.fetch(index, RCX);
        self.emit(AsmInstruction::IMul { dst: RCX, src: AsmOperand::Imm(WORD_WIDTH) });
        self.emit(AsmInstruction::Sub { dst: AsmOperand::Reg(RAX), src: AsmOperand::Reg(RCX) });
    }

    /// Expands a quad list into assembly instructions, quad for quad.
    fn expand(&mut self, quads: &[Quad]) {
        for (index, quad) in quads.iter().enumerate() {
            // Always emit labels here, so that a branch cannot miss the trace code.
            if let Quad::Label { label } = quad {
                self.emit(AsmInstruction::Label { id: *label, comment: None });
            }

            if self.trace {
                self.emit(AsmInstruction::Comment(format!("QUAD {}: {quad}", index + 1)));
            }

            match quad {
                Quad::LoadInt { value, dst } => {
                    self.emit(AsmInstruction::Mov { dst: AsmOperand::Reg(RAX), src: AsmOperand::Imm(*value) });
                    self.store(RAX, *dst);
                }

                Quad::LoadReal { value, dst } => {
                    self.emit(AsmInstruction::Mov {
                        dst: AsmOperand::Reg(RAX),
                        src: AsmOperand::Imm(ieee_bits(*value)),
                    });
                    self.store(RAX, *dst);
                }

                Quad::NotInt { src, dst } => {
                    self.fetch(*src, RAX);
                    self.emit(AsmInstruction::Cmp { lhs: AsmOperand::Reg(RAX), rhs: AsmOperand::Imm(0) });
                    self.materialize_boolean(ConditionalCode::E, *dst);
                }

                Quad::NegInt { src, dst } => {
                    self.fetch(*src, RAX);
                    self.emit(AsmInstruction::Neg(RAX));
                    self.store(RAX, *dst);
                }

                Quad::NegReal { src, dst } => {
                    self.fetch_float(*src);
                    self.emit(AsmInstruction::Fchs);
                    self.store_float(*dst);
                }

                Quad::AddInt { lhs, rhs, dst } => {
                    self.integer_arithmetic(|dst, src| AsmInstruction::Add { dst, src }, *lhs, *rhs, *dst);
                }

                Quad::SubInt { lhs, rhs, dst } => {
                    self.integer_arithmetic(|dst, src| AsmInstruction::Sub { dst, src }, *lhs, *rhs, *dst);
                }

                Quad::MulInt { lhs, rhs, dst } => {
                    self.fetch(*lhs, RAX);
                    self.fetch(*rhs, RCX);
                    self.emit(AsmInstruction::IMul { dst: RAX, src: AsmOperand::Reg(RCX) });
                    self.store(RAX, *dst);
                }

                Quad::AddReal { lhs, rhs, dst } => self.real_arithmetic(AsmInstruction::Faddp, *lhs, *rhs, *dst),
                Quad::SubReal { lhs, rhs, dst } => self.real_arithmetic(AsmInstruction::Fsubp, *lhs, *rhs, *dst),
                Quad::MulReal { lhs, rhs, dst } => self.real_arithmetic(AsmInstruction::Fmulp, *lhs, *rhs, *dst),
                Quad::DivReal { lhs, rhs, dst } => self.real_arithmetic(AsmInstruction::Fdivp, *lhs, *rhs, *dst),

                Quad::DivInt { lhs, rhs, dst } => self.integer_division(*lhs, *rhs, RAX, *dst),
                Quad::ModInt { lhs, rhs, dst } => self.integer_division(*lhs, *rhs, RDX, *dst),

                // `and`/`or` evaluate both operands fully; the 0/1 result comes from a zero-test
                // branch pair, not from the bitwise instructions.
                Quad::OrInt { lhs, rhs, dst } => {
                    let true_label = self.symbols.next_label();
                    let end_label = self.symbols.next_label();

                    self.fetch(*lhs, RAX);
                    self.emit(AsmInstruction::Cmp { lhs: AsmOperand::Reg(RAX), rhs: AsmOperand::Imm(0) });
                    self.emit(AsmInstruction::JmpCC { cond: ConditionalCode::NE, target: true_label });
                    self.fetch(*rhs, RAX);
                    self.emit(AsmInstruction::Cmp { lhs: AsmOperand::Reg(RAX), rhs: AsmOperand::Imm(0) });
                    self.emit(AsmInstruction::JmpCC { cond: ConditionalCode::NE, target: true_label });
                    self.emit(AsmInstruction::Mov { dst: AsmOperand::Reg(RAX), src: AsmOperand::Imm(0) });
                    self.emit(AsmInstruction::Jmp { target: end_label });
                    self.emit(AsmInstruction::Label { id: true_label, comment: None });
                    self.emit(AsmInstruction::Mov { dst: AsmOperand::Reg(RAX), src: AsmOperand::Imm(1) });
                    self.emit(AsmInstruction::Label { id: end_label, comment: None });
                    self.store(RAX, *dst);
                }

                Quad::AndInt { lhs, rhs, dst } => {
                    let false_label = self.symbols.next_label();
                    let end_label = self.symbols.next_label();

                    self.fetch(*lhs, RAX);
                    self.emit(AsmInstruction::Cmp { lhs: AsmOperand::Reg(RAX), rhs: AsmOperand::Imm(0) });
                    self.emit(AsmInstruction::JmpCC { cond: ConditionalCode::E, target: false_label });
                    self.fetch(*rhs, RAX);
                    self.emit(AsmInstruction::Cmp { lhs: AsmOperand::Reg(RAX), rhs: AsmOperand::Imm(0) });
                    self.emit(AsmInstruction::JmpCC { cond: ConditionalCode::E, target: false_label });
                    self.emit(AsmInstruction::Mov { dst: AsmOperand::Reg(RAX), src: AsmOperand::Imm(1) });
                    self.emit(AsmInstruction::Jmp { target: end_label });
                    self.emit(AsmInstruction::Label { id: false_label, comment: None });
                    self.emit(AsmInstruction::Mov { dst: AsmOperand::Reg(RAX), src: AsmOperand::Imm(0) });
                    self.emit(AsmInstruction::Label { id: end_label, comment: None });
                    self.store(RAX, *dst);
                }

                Quad::EqInt { lhs, rhs, dst } => self.integer_relation(ConditionalCode::E, *lhs, *rhs, *dst),
                Quad::NeInt { lhs, rhs, dst } => self.integer_relation(ConditionalCode::NE, *lhs, *rhs, *dst),
                Quad::LtInt { lhs, rhs, dst } => self.integer_relation(ConditionalCode::L, *lhs, *rhs, *dst),
                Quad::GtInt { lhs, rhs, dst } => self.integer_relation(ConditionalCode::G, *lhs, *rhs, *dst),

                Quad::EqReal { lhs, rhs, dst } => self.real_relation(ConditionalCode::E, *lhs, *rhs, *dst),
                Quad::NeReal { lhs, rhs, dst } => self.real_relation(ConditionalCode::NE, *lhs, *rhs, *dst),

                // The ordered comparisons push the right-hand operand first, so that the top of
                // the evaluation stack holds the left-hand operand and stack order matches
                // source order.
                Quad::LtReal { lhs, rhs, dst } => self.real_relation(ConditionalCode::B, *rhs, *lhs, *dst),
                Quad::GtReal { lhs, rhs, dst } => self.real_relation(ConditionalCode::A, *rhs, *lhs, *dst),

                Quad::AssignInt { src, dst } | Quad::AssignReal { src, dst } => {
                    self.fetch(*src, RAX);
                    self.store(RAX, *dst);
                }

                Quad::IndexAddress { array, index, dst } => {
                    self.index_address(*array, *index);
                    self.store(RAX, *dst);
                }

                Quad::IndexLoadInt { array, index, dst } | Quad::IndexLoadReal { array, index, dst } => {
                    self.index_address(*array, *index);
                    self.emit(AsmInstruction::Mov { dst: AsmOperand::Reg(RAX), src: AsmOperand::memory(RAX, 0) });
                    self.store(RAX, *dst);
                }

                Quad::StoreInt { src, addr } | Quad::StoreReal { src, addr } => {
                    self.fetch(*src, RAX);
                    self.fetch(*addr, RCX);
                    self.emit(AsmInstruction::Mov { dst: AsmOperand::memory(RCX, 0), src: AsmOperand::Reg(RAX) });
                }

                Quad::IntToReal { src, dst } => {
                    let (level, offset) = self.frame_location(*src);
                    self.frame_address(level, RCX);
                    self.emit(AsmInstruction::Fild(AsmOperand::memory(RCX, offset)));
                    self.store_float(*dst);
                }

                Quad::Param { value } => {
                    self.fetch(*value, RAX);
                    self.emit(AsmInstruction::Push(AsmOperand::Reg(RAX)));
                }

                Quad::Call { callee, arg_count } => {
                    let symbol = self.symbols.get(*callee);
                    let label = match symbol.kind {
                        SymbolKind::Procedure { label, .. } | SymbolKind::Function { label, .. } => label,
                        _ => ICE!("call to non-procedure/function '{}'", symbol.name),
                    };

                    self.emit(AsmInstruction::Call { target: label });

                    // Caller cleans the stack.
                    if *arg_count > 0 {
                        self.emit(AsmInstruction::Add {
                            dst: AsmOperand::Reg(RSP),
                            src: AsmOperand::Imm(arg_count * WORD_WIDTH),
                        });
                    }
                }

                Quad::ReturnInt { label, value } => {
                    self.fetch(*value, RAX);
                    self.emit(AsmInstruction::Jmp { target: *label });
                }

                // A real result is returned on the evaluation stack.
                Quad::ReturnReal { label, value } => {
                    self.fetch_float(*value);
                    self.emit(AsmInstruction::Jmp { target: *label });
                }

                Quad::Jump { label } => {
                    self.emit(AsmInstruction::Jmp { target: *label });
                }

                Quad::JumpIfZero { condition, label } => {
                    self.fetch(*condition, RAX);
                    self.emit(AsmInstruction::Cmp { lhs: AsmOperand::Reg(RAX), rhs: AsmOperand::Imm(0) });
                    self.emit(AsmInstruction::JmpCC { cond: ConditionalCode::E, target: *label });
                }

                Quad::Label { .. } => {
                    // Handled above already.
                }

                Quad::NoOp => {
                    ICE!("expand(): no-op quadruple reached code generation");
                }
            }
        }
    }
}
