// Copyright 2026 Neil Henderson, Blue Tarp Media.
//
//! The `error` module defines functions to emit error diagnostics.

use crate::core::SourceLocation;
use crate::symbols::TypeId;

use super::super::Driver;
use super::Diagnostic;

/// An error diagnostic.
pub struct Error;

impl Error {
    /// Emits an error that a function body never returns a value.
    pub fn function_must_return_value(loc: SourceLocation, driver: &mut Driver) {
        let err = "A function must return a value".to_string();
        if loc.is_none() {
            driver.add_diagnostic(Diagnostic::error(err));
        } else {
            driver.add_diagnostic(Diagnostic::error_at_location(err, loc));
        }
    }

    /// Emits an error that a non-array identifier was indexed.
    pub fn cannot_index_non_array(loc: SourceLocation, driver: &mut Driver) {
        let err = "Cannot index a non-array identifier".to_string();
        driver.add_diagnostic(Diagnostic::error_at_location(err, loc));
    }

    /// Emits an error that an array index expression is not an integer.
    pub fn index_not_integer(loc: SourceLocation, driver: &mut Driver) {
        let err = "An array index must be of integer type".to_string();
        driver.add_diagnostic(Diagnostic::error_at_location(err, loc));
    }

    /// Emits an error that an arithmetic operand has no value. `which` is "first" or "second".
    pub fn operand_is_void(which: &str, loc: SourceLocation, driver: &mut Driver) {
        let err = format!("The {which} operand is of type void");
        driver.add_diagnostic(Diagnostic::error_at_location(err, loc));
    }

    /// Emits an error that a unary operator was applied to an expression with no value.
    pub fn unary_operand_is_void(loc: SourceLocation, driver: &mut Driver) {
        let err = "The operand of a unary operator is of type void".to_string();
        driver.add_diagnostic(Diagnostic::error_at_location(err, loc));
    }

    /// Emits an error that an integer-only operator was applied to a non-integer operand.
    pub fn integer_operands_required(op_name: &str, loc: SourceLocation, driver: &mut Driver) {
        let err = format!("Both operands of '{op_name}' must be integers");
        driver.add_diagnostic(Diagnostic::error_at_location(err, loc));
    }

    /// Emits an error that a real value was assigned to an integer variable.
    pub fn assignment_type_mismatch(loc: SourceLocation, driver: &mut Driver) {
        let err = "Cannot assign a real value to an integer variable".to_string();
        driver.add_diagnostic(Diagnostic::error_at_location(err, loc));
    }

    /// Emits an error that a while/if/elsif condition is not an integer.
    pub fn condition_not_integer(loc: SourceLocation, driver: &mut Driver) {
        let err = "A condition must be of integer type".to_string();
        driver.add_diagnostic(Diagnostic::error_at_location(err, loc));
    }

    /// Emits an error that a called identifier is not a procedure or function.
    pub fn identifier_not_callable(name: &str, loc: SourceLocation, driver: &mut Driver) {
        let err = format!("'{name}' is not a procedure or function");
        driver.add_diagnostic(Diagnostic::error_at_location(err, loc));
    }

    /// Emits an error that a call has the wrong number of arguments.
    pub fn wrong_argument_count(name: &str, formals: usize, actuals: usize, loc: SourceLocation, driver: &mut Driver) {
        let err = format!("Call to '{name}' has {actuals} argument(s), but {formals} are declared");
        driver.add_diagnostic(Diagnostic::error_at_location(err, loc));
    }

    /// Emits an error that an argument's type does not match its formal parameter's type.
    pub fn argument_type_mismatch(
        name: &str,
        formal_type: TypeId,
        actual_type: TypeId,
        loc: SourceLocation,
        driver: &mut Driver,
    ) {
        let err = format!("Argument of type '{actual_type}' passed to '{name}' parameter of type '{formal_type}'");
        driver.add_diagnostic(Diagnostic::error_at_location(err, loc));
    }

    /// Emits an error that a bare `return` appeared outside a procedure.
    pub fn missing_return_value(loc: SourceLocation, driver: &mut Driver) {
        let err = "Must return a value from a function".to_string();
        driver.add_diagnostic(Diagnostic::error_at_location(err, loc));
    }

    /// Emits an error that a valued `return` appeared inside a procedure.
    pub fn procedure_cannot_return_value(loc: SourceLocation, driver: &mut Driver) {
        let err = "A procedure may not return a value".to_string();
        driver.add_diagnostic(Diagnostic::error_at_location(err, loc));
    }

    /// Emits an error that a returned value's type does not match the function's declared type.
    pub fn return_type_mismatch(loc: SourceLocation, driver: &mut Driver) {
        let err = "Bad return type from function".to_string();
        driver.add_diagnostic(Diagnostic::error_at_location(err, loc));
    }
}
