// Copyright 2026 Neil Henderson, Blue Tarp Media.
//
//! The `registers` module defines the fixed working-register set used by the code generator.
//!
//! Integer values are worked on in `rax` and `rcx`, with `rdx` receiving the remainder of the
//! combined divide instruction. Reals never occupy general registers; they live on the x87
//! evaluation stack.

use std::fmt;

/// An x86_64 general-purpose register.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Register {
    RAX,
    RCX,
    RDX,
    RBP,
    RSP,
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Register::RAX => write!(f, "rax"),
            Register::RCX => write!(f, "rcx"),
            Register::RDX => write!(f, "rdx"),
            Register::RBP => write!(f, "rbp"),
            Register::RSP => write!(f, "rsp"),
        }
    }
}
