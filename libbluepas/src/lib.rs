// Copyright 2026 Neil Henderson, Blue Tarp Media.
//
//! The BluePas backend library.
//!
//! The front end hands this library a populated symbol table, one AST per procedure/function
//! body, and (after semantic analysis) one quad list per body. The backend type-checks and
//! constant-folds each body in place, then lowers each quad list to x86_64 assembly text.

#![doc(html_no_source)]

pub mod ast;
pub mod codegen;
pub mod compiler_driver;
pub mod core;
pub mod ir;
pub mod sema;
pub mod symbols;

pub use crate::core::ICE;
