// Copyright 2026 Neil Henderson, Blue Tarp Media.
//
//! The `sema` module is responsible for semantic analysis of the AST produced by the front end.
//!
//! Semantic analysis runs once per procedure/function body (and once for the program body), in
//! two passes over the same tree: type checking (see the [type_check] module), which validates
//! the block and inserts the implicit integer-to-real casts, and then constant folding (see the
//! [constant_folding] module), which rewrites constant-valued subtrees into literals. Folding
//! only runs when type checking emitted no diagnostics.

pub mod constant_folding;
pub mod type_check;


use log::debug;

use crate::ast::{AstMetadata, AstStatement};
use crate::compiler_driver::Driver;
use crate::symbols::{SymbolId, SymbolTable};

use constant_folding::ConstantFolder;
use type_check::TypeChecker;

/// Analyzes one block: type-checks `body` in the environment of the callable `env` and, if no
/// errors were found, folds its constant subexpressions in place.
///
/// The front end calls this once per declared procedure/function body and once for the program
/// body, before it translates the block to quads.
pub fn analyze_body(
    env: SymbolId,
    body: &mut [AstStatement],
    symbols: &SymbolTable,
    metadata: &mut AstMetadata,
    driver: &mut Driver,
) {
    debug!("type checking body of '{}'", symbols.get(env).name);

    let mut chk = TypeChecker::new(symbols, metadata);
    type_check::check_block(env, body, &mut chk, driver);

    // Constant folding.
    //      Only do so if we have no error diagnostics from type checking.
    //
    if !driver.has_error_diagnostics() {
        debug!("folding constants in body of '{}'", symbols.get(env).name);

        let mut folder = ConstantFolder::new(symbols, metadata);
        constant_folding::fold_block(body, &mut folder);
    }
}
