// Copyright 2026 Neil Henderson, Blue Tarp Media.

use crate::ast::{AstBinaryOp, AstExpression, AstMetadata, AstRelationOp, AstStatement};
use crate::compiler_driver::Driver;
use crate::symbols::{ConstValue, Symbol, SymbolId, SymbolTable, TypeId};

use super::super::type_check::{self, TypeChecker};
use super::loc;

#[test]
fn missing_return_in_function() {
    let mut symbols = SymbolTable::new();
    let label = symbols.next_label();
    let f = symbols.add(Symbol::function("f", 0, TypeId::INTEGER, label, 8, vec![]));
    let x = symbols.add(Symbol::variable("x", 1, 0, TypeId::INTEGER));

    let mut metadata = AstMetadata::new();
    let mut driver = Driver::for_testing();

    // A body of any size without a `return` produces exactly one diagnostic.
    let mut body: Vec<AstStatement> = (0..5_u32)
        .map(|i| AstStatement::Assign {
            pos: loc(i + 1),
            lhs: AstExpression::identifier(loc(i + 1), x, &symbols, &mut metadata),
            rhs: AstExpression::integer(loc(i + 1), 1, &mut metadata),
        })
        .collect();

    let mut chk = TypeChecker::new(&symbols, &mut metadata);
    type_check::check_block(f, &mut body, &mut chk, &mut driver);

    assert_eq!(driver.error_count(), 1);
    assert!(driver.diagnostics()[0].message().contains("must return a value"));
}

#[test]
fn function_with_return_is_accepted() {
    let mut symbols = SymbolTable::new();
    let label = symbols.next_label();
    let f = symbols.add(Symbol::function("f", 0, TypeId::INTEGER, label, 8, vec![]));

    let mut metadata = AstMetadata::new();
    let mut driver = Driver::for_testing();

    let value = AstExpression::integer(loc(2), 1, &mut metadata);
    let mut body = vec![AstStatement::Return { pos: loc(2), value: Some(value) }];

    let mut chk = TypeChecker::new(&symbols, &mut metadata);
    type_check::check_block(f, &mut body, &mut chk, &mut driver);

    assert_eq!(driver.error_count(), 0);
}

#[test]
fn procedure_cannot_return_a_value() {
    let mut symbols = SymbolTable::new();
    let label = symbols.next_label();
    let p = symbols.add(Symbol::procedure("p", 0, label, 8, vec![]));

    let mut metadata = AstMetadata::new();
    let mut driver = Driver::for_testing();

    let value = AstExpression::integer(loc(2), 1, &mut metadata);
    let mut body = vec![AstStatement::Return { pos: loc(2), value: Some(value) }];

    let mut chk = TypeChecker::new(&symbols, &mut metadata);
    type_check::check_block(p, &mut body, &mut chk, &mut driver);

    assert_eq!(driver.error_count(), 1);
    assert!(driver.diagnostics()[0].message().contains("may not return a value"));
}

#[test]
fn bare_return_in_function_is_an_error() {
    let mut symbols = SymbolTable::new();
    let label = symbols.next_label();
    let f = symbols.add(Symbol::function("f", 0, TypeId::INTEGER, label, 8, vec![]));

    let mut metadata = AstMetadata::new();
    let mut driver = Driver::for_testing();

    let mut body = vec![AstStatement::Return { pos: loc(2), value: None }];

    let mut chk = TypeChecker::new(&symbols, &mut metadata);
    type_check::check_block(f, &mut body, &mut chk, &mut driver);

    // The bare `return` is the only diagnostic; it still counts as the function's return.
    assert_eq!(driver.error_count(), 1);
    assert!(driver.diagnostics()[0].message().contains("Must return a value"));
}

#[test]
fn return_type_must_match_declared_type() {
    let mut symbols = SymbolTable::new();
    let label = symbols.next_label();
    let f = symbols.add(Symbol::function("f", 0, TypeId::INTEGER, label, 8, vec![]));

    let mut metadata = AstMetadata::new();
    let mut driver = Driver::for_testing();

    let value = AstExpression::real(loc(3), 1.5, &mut metadata);
    let mut body = vec![AstStatement::Return { pos: loc(3), value: Some(value) }];

    let mut chk = TypeChecker::new(&symbols, &mut metadata);
    type_check::check_block(f, &mut body, &mut chk, &mut driver);

    assert_eq!(driver.error_count(), 1);
    assert!(driver.diagnostics()[0].message().contains("Bad return type"));
    assert_eq!(driver.diagnostics()[0].location().line, 3);
}

#[test]
fn arithmetic_promotion_inserts_single_cast() {
    let symbols = SymbolTable::new();
    let mut metadata = AstMetadata::new();
    let mut driver = Driver::for_testing();

    let lhs = AstExpression::integer(loc(1), 1, &mut metadata);
    let rhs = AstExpression::real(loc(1), 2.5, &mut metadata);
    let mut expr = AstExpression::binary(loc(1), AstBinaryOp::Add, lhs, rhs, &mut metadata);

    let mut chk = TypeChecker::new(&symbols, &mut metadata);
    let ty = type_check::typecheck_expression(&mut expr, &mut chk, &mut driver);

    assert_eq!(ty, TypeId::REAL);
    assert_eq!(driver.error_count(), 0);
    assert_cast_around_integer(&expr);

    // Re-running the checker on the already-promoted expression must not stack a second cast.
    let mut chk = TypeChecker::new(&symbols, &mut metadata);
    type_check::typecheck_expression(&mut expr, &mut chk, &mut driver);

    assert_eq!(driver.error_count(), 0);
    assert_cast_around_integer(&expr);
}

// Asserts that the left operand is exactly one cast wrapping the integer literal.
fn assert_cast_around_integer(expr: &AstExpression) {
    let AstExpression::Binary { lhs, .. } = expr else {
        panic!("Expected a binary expression");
    };
    let AstExpression::Cast { expr: inner, .. } = lhs.as_ref() else {
        panic!("Expected the integer operand to be wrapped in a cast");
    };
    assert!(inner.is_integer_literal_with_value(1));
}

#[test]
fn division_yields_real_without_promoting_equal_operands() {
    let symbols = SymbolTable::new();
    let mut metadata = AstMetadata::new();
    let mut driver = Driver::for_testing();

    let lhs = AstExpression::integer(loc(1), 6, &mut metadata);
    let rhs = AstExpression::integer(loc(1), 3, &mut metadata);
    let mut expr = AstExpression::binary(loc(1), AstBinaryOp::Divide, lhs, rhs, &mut metadata);

    let mut chk = TypeChecker::new(&symbols, &mut metadata);
    let ty = type_check::typecheck_expression(&mut expr, &mut chk, &mut driver);

    assert_eq!(ty, TypeId::REAL);
    assert_eq!(driver.error_count(), 0);

    // Operands of equal type are not wrapped.
    let AstExpression::Binary { lhs, rhs, .. } = &expr else {
        panic!("Expected a binary expression");
    };
    assert!(lhs.is_literal());
    assert!(rhs.is_literal());
}

#[test]
fn integer_operators_reject_real_operands() {
    let mut symbols = SymbolTable::new();
    let a = symbols.add(Symbol::variable("a", 1, 0, TypeId::INTEGER));
    let r = symbols.add(Symbol::variable("r", 1, 8, TypeId::REAL));

    let mut metadata = AstMetadata::new();
    let mut driver = Driver::for_testing();

    let lhs = AstExpression::identifier(loc(1), a, &symbols, &mut metadata);
    let rhs = AstExpression::identifier(loc(1), r, &symbols, &mut metadata);
    let mut expr = AstExpression::binary(loc(1), AstBinaryOp::And, lhs, rhs, &mut metadata);

    let mut chk = TypeChecker::new(&symbols, &mut metadata);
    let ty = type_check::typecheck_expression(&mut expr, &mut chk, &mut driver);

    assert_eq!(ty, TypeId::INTEGER);
    assert_eq!(driver.error_count(), 1);
    assert!(driver.diagnostics()[0].message().contains("'and'"));
}

#[test]
fn integer_operators_accept_integer_identifiers() {
    let mut symbols = SymbolTable::new();
    let a = symbols.add(Symbol::variable("a", 1, 0, TypeId::INTEGER));
    let b = symbols.add(Symbol::variable("b", 1, 8, TypeId::INTEGER));

    let mut metadata = AstMetadata::new();
    let mut driver = Driver::for_testing();

    let lhs = AstExpression::identifier(loc(1), a, &symbols, &mut metadata);
    let rhs = AstExpression::identifier(loc(1), b, &symbols, &mut metadata);
    let mut expr = AstExpression::binary(loc(1), AstBinaryOp::IntDivide, lhs, rhs, &mut metadata);

    let mut chk = TypeChecker::new(&symbols, &mut metadata);
    let ty = type_check::typecheck_expression(&mut expr, &mut chk, &mut driver);

    assert_eq!(ty, TypeId::INTEGER);
    assert_eq!(driver.error_count(), 0);
}

#[test]
fn relation_promotes_non_real_operand() {
    let symbols = SymbolTable::new();
    let mut metadata = AstMetadata::new();
    let mut driver = Driver::for_testing();

    let lhs = AstExpression::real(loc(1), 2.5, &mut metadata);
    let rhs = AstExpression::integer(loc(1), 2, &mut metadata);
    let mut expr = AstExpression::relation(loc(1), AstRelationOp::LessThan, lhs, rhs, &mut metadata);

    let mut chk = TypeChecker::new(&symbols, &mut metadata);
    let ty = type_check::typecheck_expression(&mut expr, &mut chk, &mut driver);

    // Relations always produce the 0/1 integer encoding.
    assert_eq!(ty, TypeId::INTEGER);
    assert_eq!(driver.error_count(), 0);

    let AstExpression::Relation { rhs, .. } = &expr else {
        panic!("Expected a relation");
    };
    assert!(matches!(rhs.as_ref(), AstExpression::Cast { .. }));
}

#[test]
fn assignment_casts_integer_to_real() {
    let mut symbols = SymbolTable::new();
    let env = add_program_env(&mut symbols);
    let r = symbols.add(Symbol::variable("r", 1, 0, TypeId::REAL));

    let mut metadata = AstMetadata::new();
    let mut driver = Driver::for_testing();

    let lhs = AstExpression::identifier(loc(1), r, &symbols, &mut metadata);
    let rhs = AstExpression::integer(loc(1), 2, &mut metadata);
    let mut body = vec![AstStatement::Assign { pos: loc(1), lhs, rhs }];

    let mut chk = TypeChecker::new(&symbols, &mut metadata);
    type_check::check_block(env, &mut body, &mut chk, &mut driver);

    assert_eq!(driver.error_count(), 0);
    let AstStatement::Assign { rhs, .. } = &body[0] else {
        panic!("Expected an assignment");
    };
    assert!(matches!(rhs, AstExpression::Cast { .. }));
}

#[test]
fn assignment_rejects_real_to_integer() {
    let mut symbols = SymbolTable::new();
    let env = add_program_env(&mut symbols);
    let x = symbols.add(Symbol::variable("x", 1, 0, TypeId::INTEGER));

    let mut metadata = AstMetadata::new();
    let mut driver = Driver::for_testing();

    let lhs = AstExpression::identifier(loc(4), x, &symbols, &mut metadata);
    let rhs = AstExpression::real(loc(4), 2.5, &mut metadata);
    let mut body = vec![AstStatement::Assign { pos: loc(4), lhs, rhs }];

    let mut chk = TypeChecker::new(&symbols, &mut metadata);
    type_check::check_block(env, &mut body, &mut chk, &mut driver);

    assert_eq!(driver.error_count(), 1);
    assert!(driver.diagnostics()[0].message().contains("Cannot assign a real value"));
    assert_eq!(driver.diagnostics()[0].location().line, 4);
}

#[test]
fn indexing_a_non_array_is_an_error() {
    let mut symbols = SymbolTable::new();
    let x = symbols.add(Symbol::variable("x", 1, 0, TypeId::INTEGER));

    let mut metadata = AstMetadata::new();
    let mut driver = Driver::for_testing();

    let index = AstExpression::integer(loc(1), 0, &mut metadata);
    let mut expr = AstExpression::indexed(loc(1), x, index, &mut metadata);

    let mut chk = TypeChecker::new(&symbols, &mut metadata);
    let ty = type_check::typecheck_expression(&mut expr, &mut chk, &mut driver);

    assert_eq!(ty, TypeId::VOID);
    assert_eq!(driver.error_count(), 1);
    assert!(driver.diagnostics()[0].message().contains("non-array"));
}

#[test]
fn array_index_must_be_integer() {
    let mut symbols = SymbolTable::new();
    let arr = symbols.add(Symbol::array("arr", 1, 0, TypeId::REAL, TypeId::INTEGER, 10));

    let mut metadata = AstMetadata::new();
    let mut driver = Driver::for_testing();

    let index = AstExpression::real(loc(2), 1.5, &mut metadata);
    let mut expr = AstExpression::indexed(loc(2), arr, index, &mut metadata);

    let mut chk = TypeChecker::new(&symbols, &mut metadata);
    let ty = type_check::typecheck_expression(&mut expr, &mut chk, &mut driver);

    // The result is still the element type; the bad index gets its own diagnostic.
    assert_eq!(ty, TypeId::REAL);
    assert_eq!(driver.error_count(), 1);
    assert!(driver.diagnostics()[0].message().contains("index"));
}

#[test]
fn call_arity_is_checked() {
    for actual_count in [1_usize, 3] {
        let (symbols, f) = function_with_two_integer_params();
        let mut metadata = AstMetadata::new();
        let mut driver = Driver::for_testing();

        let args: Vec<AstExpression> =
            (0..actual_count).map(|_| AstExpression::integer(loc(5), 1, &mut metadata)).collect();
        let mut expr = AstExpression::function_call(loc(5), f, args, &symbols, &mut metadata);

        let mut chk = TypeChecker::new(&symbols, &mut metadata);
        let ty = type_check::typecheck_expression(&mut expr, &mut chk, &mut driver);

        assert_eq!(ty, TypeId::INTEGER);
        assert_eq!(driver.error_count(), 1, "expected an arity error for {actual_count} argument(s)");
        assert!(driver.diagnostics()[0].message().contains("2 are declared"));
        assert_eq!(driver.diagnostics()[0].location().line, 5);
    }
}

#[test]
fn call_argument_type_mismatch_is_positioned_at_the_actual() {
    let (symbols, f) = function_with_two_integer_params();
    let mut metadata = AstMetadata::new();
    let mut driver = Driver::for_testing();

    // Actuals (real, integer) against formals (integer, integer).
    let args =
        vec![AstExpression::real(loc(7), 1.5, &mut metadata), AstExpression::integer(loc(8), 2, &mut metadata)];
    let mut expr = AstExpression::function_call(loc(6), f, args, &symbols, &mut metadata);

    let mut chk = TypeChecker::new(&symbols, &mut metadata);
    type_check::typecheck_expression(&mut expr, &mut chk, &mut driver);

    assert_eq!(driver.error_count(), 1);
    assert!(driver.diagnostics()[0].message().contains("type 'real'"));
    assert_eq!(driver.diagnostics()[0].location().line, 7);
}

#[test]
fn calling_a_variable_is_an_error() {
    let mut symbols = SymbolTable::new();
    let env = add_program_env(&mut symbols);
    let x = symbols.add(Symbol::variable("x", 1, 0, TypeId::INTEGER));

    let mut metadata = AstMetadata::new();
    let mut driver = Driver::for_testing();

    let mut body = vec![AstStatement::ProcedureCall { pos: loc(2), callee: x, args: Vec::new() }];

    let mut chk = TypeChecker::new(&symbols, &mut metadata);
    type_check::check_block(env, &mut body, &mut chk, &mut driver);

    assert_eq!(driver.error_count(), 1);
    assert!(driver.diagnostics()[0].message().contains("not a procedure or function"));
}

#[test]
fn condition_must_be_integer() {
    let mut symbols = SymbolTable::new();
    let env = add_program_env(&mut symbols);

    let mut metadata = AstMetadata::new();
    let mut driver = Driver::for_testing();

    let condition = AstExpression::real(loc(3), 1.0, &mut metadata);
    let mut body = vec![AstStatement::While { pos: loc(3), condition, body: Vec::new() }];

    let mut chk = TypeChecker::new(&symbols, &mut metadata);
    type_check::check_block(env, &mut body, &mut chk, &mut driver);

    assert_eq!(driver.error_count(), 1);
    assert!(driver.diagnostics()[0].message().contains("condition"));
}

#[test]
fn constant_identifier_keeps_its_declared_type() {
    let mut symbols = SymbolTable::new();
    let c = symbols.add(Symbol::constant("limit", 0, ConstValue::Real(1.5)));

    let mut metadata = AstMetadata::new();
    let mut driver = Driver::for_testing();

    let mut expr = AstExpression::identifier(loc(1), c, &symbols, &mut metadata);

    let mut chk = TypeChecker::new(&symbols, &mut metadata);
    let ty = type_check::typecheck_expression(&mut expr, &mut chk, &mut driver);

    assert_eq!(ty, TypeId::REAL);
    assert_eq!(driver.error_count(), 0);
}

/// Adds a level-0 procedure to act as the program-body environment.
fn add_program_env(symbols: &mut SymbolTable) -> SymbolId {
    let label = symbols.next_label();
    symbols.add(Symbol::procedure("main", 0, label, 8, vec![]))
}

/// Builds a function `f(a: integer; b: integer): integer` and returns its table and id.
fn function_with_two_integer_params() -> (SymbolTable, SymbolId) {
    let mut symbols = SymbolTable::new();
    let a = symbols.add(Symbol::parameter("a", 1, 0, TypeId::INTEGER));
    let b = symbols.add(Symbol::parameter("b", 1, 8, TypeId::INTEGER));
    let label = symbols.next_label();
    let f = symbols.add(Symbol::function("f", 0, TypeId::INTEGER, label, 16, vec![a, b]));
    (symbols, f)
}
