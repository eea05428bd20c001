// Copyright 2026 Neil Henderson, Blue Tarp Media.
//
//! The `ir` module defines the BlueQuad intermediate representation: the linear three-address
//! form that the front end produces from each optimized procedure/function body and that the
//! code generator lowers to assembly.

mod quads;

pub use quads::Quad;
