// Copyright 2026 Neil Henderson, Blue Tarp Media.
//
//! The `quads` module defines the [Quad] instruction set.
//!
//! A quad carries up to three symbol operands and small integer immediates (label numbers and
//! argument counts). Operand symbols are always live table entries; temporaries are ordinary
//! variable symbols created by the front end. One `Vec<Quad>` per body, lowered read-only.

use std::fmt;

use crate::symbols::SymbolId;

/// One BlueQuad instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum Quad {
    /// Load an integer literal into `dst`.
    LoadInt { value: i64, dst: SymbolId },
    /// Load a real literal into `dst`.
    LoadReal { value: f64, dst: SymbolId },

    AddInt { lhs: SymbolId, rhs: SymbolId, dst: SymbolId },
    AddReal { lhs: SymbolId, rhs: SymbolId, dst: SymbolId },
    SubInt { lhs: SymbolId, rhs: SymbolId, dst: SymbolId },
    SubReal { lhs: SymbolId, rhs: SymbolId, dst: SymbolId },
    MulInt { lhs: SymbolId, rhs: SymbolId, dst: SymbolId },
    MulReal { lhs: SymbolId, rhs: SymbolId, dst: SymbolId },
    /// The `/` operator. Always real; operands were promoted by the type checker.
    DivReal { lhs: SymbolId, rhs: SymbolId, dst: SymbolId },
    /// The `div` operator (truncating integer division).
    DivInt { lhs: SymbolId, rhs: SymbolId, dst: SymbolId },
    /// The `mod` operator.
    ModInt { lhs: SymbolId, rhs: SymbolId, dst: SymbolId },

    AndInt { lhs: SymbolId, rhs: SymbolId, dst: SymbolId },
    OrInt { lhs: SymbolId, rhs: SymbolId, dst: SymbolId },
    NotInt { src: SymbolId, dst: SymbolId },

    NegInt { src: SymbolId, dst: SymbolId },
    NegReal { src: SymbolId, dst: SymbolId },

    EqInt { lhs: SymbolId, rhs: SymbolId, dst: SymbolId },
    EqReal { lhs: SymbolId, rhs: SymbolId, dst: SymbolId },
    NeInt { lhs: SymbolId, rhs: SymbolId, dst: SymbolId },
    NeReal { lhs: SymbolId, rhs: SymbolId, dst: SymbolId },
    LtInt { lhs: SymbolId, rhs: SymbolId, dst: SymbolId },
    LtReal { lhs: SymbolId, rhs: SymbolId, dst: SymbolId },
    GtInt { lhs: SymbolId, rhs: SymbolId, dst: SymbolId },
    GtReal { lhs: SymbolId, rhs: SymbolId, dst: SymbolId },

    AssignInt { src: SymbolId, dst: SymbolId },
    AssignReal { src: SymbolId, dst: SymbolId },

    /// Compute the address of `array[index]` into `dst`.
    IndexAddress { array: SymbolId, index: SymbolId, dst: SymbolId },
    /// Load the value of `array[index]` into `dst`.
    IndexLoadInt { array: SymbolId, index: SymbolId, dst: SymbolId },
    IndexLoadReal { array: SymbolId, index: SymbolId, dst: SymbolId },
    /// Store `src` through the address held by `addr`.
    StoreInt { src: SymbolId, addr: SymbolId },
    StoreReal { src: SymbolId, addr: SymbolId },

    /// Widen the integer in `src` into the real `dst`.
    IntToReal { src: SymbolId, dst: SymbolId },

    /// Push one argument; emitted in calling-convention order.
    Param { value: SymbolId },
    /// Call a procedure or function. The caller removes `arg_count` pushed words afterwards.
    Call { callee: SymbolId, arg_count: i64 },

    /// Return an integer value: fetch it and jump to the body's epilogue label.
    ReturnInt { label: i64, value: SymbolId },
    /// Return a real value on the floating-point stack, then jump to the epilogue label.
    ReturnReal { label: i64, value: SymbolId },

    Jump { label: i64 },
    /// Jump to `label` when `condition` is zero.
    JumpIfZero { condition: SymbolId, label: i64 },
    /// Marks a branch target.
    Label { label: i64 },

    /// Never emitted by a correct front end; reaching lowering is an internal defect.
    NoOp,
}

impl fmt::Display for Quad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quad::LoadInt { value, dst } => write!(f, "iload {value} -> {dst}"),
            Quad::LoadReal { value, dst } => write!(f, "rload {value} -> {dst}"),
            Quad::AddInt { lhs, rhs, dst } => write!(f, "iadd {lhs}, {rhs} -> {dst}"),
            Quad::AddReal { lhs, rhs, dst } => write!(f, "radd {lhs}, {rhs} -> {dst}"),
            Quad::SubInt { lhs, rhs, dst } => write!(f, "isub {lhs}, {rhs} -> {dst}"),
            Quad::SubReal { lhs, rhs, dst } => write!(f, "rsub {lhs}, {rhs} -> {dst}"),
            Quad::MulInt { lhs, rhs, dst } => write!(f, "imul {lhs}, {rhs} -> {dst}"),
            Quad::MulReal { lhs, rhs, dst } => write!(f, "rmul {lhs}, {rhs} -> {dst}"),
            Quad::DivReal { lhs, rhs, dst } => write!(f, "rdiv {lhs}, {rhs} -> {dst}"),
            Quad::DivInt { lhs, rhs, dst } => write!(f, "idiv {lhs}, {rhs} -> {dst}"),
            Quad::ModInt { lhs, rhs, dst } => write!(f, "imod {lhs}, {rhs} -> {dst}"),
            Quad::AndInt { lhs, rhs, dst } => write!(f, "iand {lhs}, {rhs} -> {dst}"),
            Quad::OrInt { lhs, rhs, dst } => write!(f, "ior {lhs}, {rhs} -> {dst}"),
            Quad::NotInt { src, dst } => write!(f, "inot {src} -> {dst}"),
            Quad::NegInt { src, dst } => write!(f, "ineg {src} -> {dst}"),
            Quad::NegReal { src, dst } => write!(f, "rneg {src} -> {dst}"),
            Quad::EqInt { lhs, rhs, dst } => write!(f, "ieq {lhs}, {rhs} -> {dst}"),
            Quad::EqReal { lhs, rhs, dst } => write!(f, "req {lhs}, {rhs} -> {dst}"),
            Quad::NeInt { lhs, rhs, dst } => write!(f, "ine {lhs}, {rhs} -> {dst}"),
            Quad::NeReal { lhs, rhs, dst } => write!(f, "rne {lhs}, {rhs} -> {dst}"),
            Quad::LtInt { lhs, rhs, dst } => write!(f, "ilt {lhs}, {rhs} -> {dst}"),
            Quad::LtReal { lhs, rhs, dst } => write!(f, "rlt {lhs}, {rhs} -> {dst}"),
            Quad::GtInt { lhs, rhs, dst } => write!(f, "igt {lhs}, {rhs} -> {dst}"),
            Quad::GtReal { lhs, rhs, dst } => write!(f, "rgt {lhs}, {rhs} -> {dst}"),
            Quad::AssignInt { src, dst } => write!(f, "iassign {src} -> {dst}"),
            Quad::AssignReal { src, dst } => write!(f, "rassign {src} -> {dst}"),
            Quad::IndexAddress { array, index, dst } => write!(f, "lindex {array}[{index}] -> {dst}"),
            Quad::IndexLoadInt { array, index, dst } => write!(f, "irindex {array}[{index}] -> {dst}"),
            Quad::IndexLoadReal { array, index, dst } => write!(f, "rrindex {array}[{index}] -> {dst}"),
            Quad::StoreInt { src, addr } => write!(f, "istore {src} -> [{addr}]"),
            Quad::StoreReal { src, addr } => write!(f, "rstore {src} -> [{addr}]"),
            Quad::IntToReal { src, dst } => write!(f, "itor {src} -> {dst}"),
            Quad::Param { value } => write!(f, "param {value}"),
            Quad::Call { callee, arg_count } => write!(f, "call {callee}, {arg_count}"),
            Quad::ReturnInt { label, value } => write!(f, "ireturn L{label}, {value}"),
            Quad::ReturnReal { label, value } => write!(f, "rreturn L{label}, {value}"),
            Quad::Jump { label } => write!(f, "jump L{label}"),
            Quad::JumpIfZero { condition, label } => write!(f, "jumpf L{label}, {condition}"),
            Quad::Label { label } => write!(f, "label L{label}"),
            Quad::NoOp => write!(f, "nop"),
        }
    }
}
