// Copyright 2026 Neil Henderson, Blue Tarp Media.
//
//! The `type_check` module defines the type checking pass.
//!
//! Type checking walks one block at a time, validates each node, records every visited
//! expression's resolved type in the [AstMetadata] cache, and rewrites the tree in place where
//! the language calls for an implicit integer-to-real conversion. It reports problems through
//! the driver's diagnostics and keeps going, so several independent mistakes surface in one run;
//! an ill-typed node falls back to a sentinel type so one mistake does not cascade.

use crate::ICE;
use crate::ast::{AstBinaryOp, AstExpression, AstMetadata, AstNodeId, AstStatement};
use crate::compiler_driver::{Driver, Error};
use crate::core::SourceLocation;
use crate::symbols::{SymbolId, SymbolKind, SymbolTable, TypeId};

/// The Type Checker holds the state shared by the checking functions.
pub struct TypeChecker<'a> {
    symbols: &'a SymbolTable,
    pub metadata: &'a mut AstMetadata,

    // The callable whose body is being checked.
    current_env: Option<SymbolId>,

    // Did the current block contain a `return` statement?
    saw_return: bool,
}

impl<'a> TypeChecker<'a> {
    /// Creates a new Type Checker.
    pub fn new(symbols: &'a SymbolTable, metadata: &'a mut AstMetadata) -> Self {
        Self { symbols, metadata, current_env: None, saw_return: false }
    }

    /// The callable whose body is being checked.
    fn current_env(&self) -> SymbolId {
        let Some(env) = self.current_env else {
            ICE!("Type checking a statement outside of a block");
        };
        env
    }

    /// Wraps the given child expression in an integer-to-real cast.
    ///
    /// The old subtree moves into the new cast node; nothing else holds a reference to it.
    fn add_cast(&mut self, child: &mut Box<AstExpression>) {
        let pos = child.pos();
        let placeholder = AstExpression::IntegerLiteral { node_id: AstNodeId::default(), pos, value: 0 };
        let inner = std::mem::replace(child.as_mut(), placeholder);
        **child = AstExpression::cast(pos, inner, self.metadata);
    }
}

/// Type checks a block of code in the environment of the callable `env`.
///
/// After the walk, a function body that never returned a value gets a diagnostic; all other
/// return-discipline mistakes are reported at the offending `return` statement itself.
pub fn check_block(env: SymbolId, body: &mut [AstStatement], chk: &mut TypeChecker, driver: &mut Driver) {
    chk.current_env = Some(env);
    chk.saw_return = false;

    for stmt in body.iter_mut() {
        typecheck_statement(stmt, chk, driver);
    }

    if matches!(chk.symbols.get(env).kind, SymbolKind::Function { .. }) && !chk.saw_return {
        // An empty body has no position to point at.
        let loc = body.last().map_or(SourceLocation::none(), |stmt| stmt.pos());
        Error::function_must_return_value(loc, driver);
    }
}

/// Type checks a single statement.
fn typecheck_statement(stmt: &mut AstStatement, chk: &mut TypeChecker, driver: &mut Driver) {
    match stmt {
        AstStatement::Assign { lhs, rhs, .. } => typecheck_assignment(lhs, rhs, chk, driver),

        AstStatement::ProcedureCall { pos, callee, args } => {
            check_call_arguments(*callee, *pos, args, chk, driver);
        }

        AstStatement::While { condition, body, .. } => {
            check_condition(condition, chk, driver);
            for stmt in body {
                typecheck_statement(stmt, chk, driver);
            }
        }

        AstStatement::If { condition, body, elsif_chain, else_body, .. } => {
            check_condition(condition, chk, driver);
            for stmt in body {
                typecheck_statement(stmt, chk, driver);
            }

            for elsif in elsif_chain {
                check_condition(&mut elsif.condition, chk, driver);
                for stmt in &mut elsif.body {
                    typecheck_statement(stmt, chk, driver);
                }
            }

            if let Some(else_body) = else_body {
                for stmt in else_body {
                    typecheck_statement(stmt, chk, driver);
                }
            }
        }

        AstStatement::Return { pos, value } => typecheck_return(*pos, value, chk, driver),
    }
}

/// Type checks an assignment. An integer right-hand side assigned to a real variable is
/// implicitly cast; any other type mismatch is an error.
fn typecheck_assignment(lhs: &mut AstExpression, rhs: &mut AstExpression, chk: &mut TypeChecker, driver: &mut Driver) {
    if !matches!(lhs, AstExpression::Identifier { .. } | AstExpression::Indexed { .. }) {
        ICE!("Assignment target must be an identifier or an array element");
    }

    let lhs_type = typecheck_expression(lhs, chk, driver);
    let rhs_type = typecheck_expression(rhs, chk, driver);

    if lhs_type != rhs_type {
        if lhs_type == TypeId::REAL && rhs_type == TypeId::INTEGER {
            let pos = rhs.pos();
            let placeholder = AstExpression::IntegerLiteral { node_id: AstNodeId::default(), pos, value: 0 };
            let inner = std::mem::replace(rhs, placeholder);
            *rhs = AstExpression::cast(pos, inner, chk.metadata);
        } else {
            Error::assignment_type_mismatch(rhs.pos(), driver);
        }
    }
}

/// Type checks a `return` statement against the enclosing callable.
fn typecheck_return(
    pos: SourceLocation,
    value: &mut Option<AstExpression>,
    chk: &mut TypeChecker,
    driver: &mut Driver,
) {
    chk.saw_return = true;

    let env = chk.symbols.get(chk.current_env());

    let Some(value) = value else {
        // A bare `return` is only meaningful inside a procedure.
        if !matches!(env.kind, SymbolKind::Procedure { .. }) {
            Error::missing_return_value(pos, driver);
        }
        return;
    };

    let value_type = typecheck_expression(value, chk, driver);

    let env = chk.symbols.get(chk.current_env());
    if !matches!(env.kind, SymbolKind::Function { .. }) {
        Error::procedure_cannot_return_value(pos, driver);
        return;
    }

    if env.ty != value_type {
        Error::return_type_mismatch(value.pos(), driver);
    }
}

/// Type checks a while/if/elsif condition, which must be an integer (the 0/1 encoding).
fn check_condition(condition: &mut AstExpression, chk: &mut TypeChecker, driver: &mut Driver) {
    if typecheck_expression(condition, chk, driver) != TypeId::INTEGER {
        Error::condition_not_integer(condition.pos(), driver);
    }
}

/// Type checks an expression and returns its resolved type.
pub fn typecheck_expression(expr: &mut AstExpression, chk: &mut TypeChecker, driver: &mut Driver) -> TypeId {
    match expr {
        AstExpression::IntegerLiteral { .. } => TypeId::INTEGER,

        AstExpression::RealLiteral { .. } => TypeId::REAL,

        AstExpression::Identifier { node_id, sym, .. } => {
            // A name type stands for itself in type position: it resolves to its own symbol
            // index rather than to a value type.
            if matches!(chk.symbols.get(*sym).kind, SymbolKind::NameType) {
                return sym.as_type();
            }
            chk.metadata.node_type(*node_id)
        }

        AstExpression::Indexed { node_id, pos, array, index } => {
            let array_symbol = chk.symbols.get(*array);
            let SymbolKind::Array { .. } = array_symbol.kind else {
                Error::cannot_index_non_array(*pos, driver);
                chk.metadata.set_node_type(*node_id, TypeId::VOID);
                return TypeId::VOID;
            };

            if typecheck_expression(index, chk, driver) != TypeId::INTEGER {
                Error::index_not_integer(index.pos(), driver);
            }

            let element_type = array_symbol.ty;
            chk.metadata.set_node_type(*node_id, element_type);
            element_type
        }

        AstExpression::Binary { node_id, pos, op, lhs, rhs } => {
            let node_id = *node_id;
            let result = match op {
                AstBinaryOp::Add | AstBinaryOp::Subtract | AstBinaryOp::Multiply => {
                    check_arithmetic_binop(lhs, rhs, chk, driver)
                }

                // Division promotes like the other arithmetic operators but always yields real.
                AstBinaryOp::Divide => {
                    check_arithmetic_binop(lhs, rhs, chk, driver);
                    TypeId::REAL
                }

                AstBinaryOp::IntDivide | AstBinaryOp::Modulo | AstBinaryOp::And | AstBinaryOp::Or => {
                    check_integer_binop(op.name(), *pos, lhs, rhs, chk, driver)
                }
            };

            chk.metadata.set_node_type(node_id, result);
            result
        }

        AstExpression::Relation { node_id, lhs, rhs, .. } => {
            let node_id = *node_id;
            let result = check_relation(lhs, rhs, chk, driver);
            chk.metadata.set_node_type(node_id, result);
            result
        }

        AstExpression::Negate { node_id, pos, .. } | AstExpression::Not { node_id, pos, .. } => {
            // Unary operators pass their operand's cached type through.
            let ty = chk.metadata.node_type(*node_id);
            if ty == TypeId::VOID {
                Error::unary_operand_is_void(*pos, driver);
            }
            ty
        }

        AstExpression::Cast { .. } => TypeId::REAL,

        AstExpression::FunctionCall { node_id, pos, callee, args } => {
            check_call_arguments(*callee, *pos, args, chk, driver);
            chk.metadata.node_type(*node_id)
        }
    }
}

/// Type checks the binary operations in which implicit casting of integer to real is done:
/// plus, minus, multiplication (and, via its caller, division).
///
/// Differing operand types wrap the integer-typed side in a cast and promote the result to real.
fn check_arithmetic_binop(
    lhs: &mut Box<AstExpression>,
    rhs: &mut Box<AstExpression>,
    chk: &mut TypeChecker,
    driver: &mut Driver,
) -> TypeId {
    let lhs_type = typecheck_expression(lhs, chk, driver);
    let rhs_type = typecheck_expression(rhs, chk, driver);

    if lhs_type == TypeId::VOID {
        Error::operand_is_void("first", lhs.pos(), driver);
    } else if rhs_type == TypeId::VOID {
        Error::operand_is_void("second", lhs.pos(), driver);
    } else if lhs_type != rhs_type {
        if lhs_type == TypeId::INTEGER {
            chk.add_cast(lhs);
        } else {
            chk.add_cast(rhs);
        }
        return TypeId::REAL;
    }

    TypeId::INTEGER
}

/// Type checks the binary operations which only accept integer operands: `and`, `or`, `div`,
/// `mod`.
///
/// Both operands' cached types must already be integer; the operands are not re-walked here.
fn check_integer_binop(
    op_name: &str,
    pos: SourceLocation,
    lhs: &AstExpression,
    rhs: &AstExpression,
    chk: &mut TypeChecker,
    driver: &mut Driver,
) -> TypeId {
    let lhs_type = chk.metadata.node_type(lhs.node_id());
    let rhs_type = chk.metadata.node_type(rhs.node_id());

    if lhs_type != TypeId::INTEGER || rhs_type != TypeId::INTEGER {
        Error::integer_operands_required(op_name, pos, driver);
    }

    TypeId::INTEGER
}

/// Type checks a binary relation. A relation's operands are promoted to real when they differ,
/// and the result is always an integer (1 = true, 0 = false).
fn check_relation(
    lhs: &mut Box<AstExpression>,
    rhs: &mut Box<AstExpression>,
    chk: &mut TypeChecker,
    driver: &mut Driver,
) -> TypeId {
    let lhs_type = typecheck_expression(lhs, chk, driver);
    let rhs_type = typecheck_expression(rhs, chk, driver);

    if lhs_type != rhs_type {
        if lhs_type != TypeId::REAL {
            chk.add_cast(lhs);
        } else {
            chk.add_cast(rhs);
        }
    }

    TypeId::INTEGER
}

/// Checks formal vs. actual parameters at procedure/function calls.
///
/// The formal list is walked in lock-step with the actuals from the tail. A length mismatch is
/// reported at the call site; the first positional type mismatch is reported at the offending
/// actual and stops the walk.
fn check_call_arguments(
    callee: SymbolId,
    call_pos: SourceLocation,
    args: &mut [AstExpression],
    chk: &mut TypeChecker,
    driver: &mut Driver,
) {
    let callee_symbol = chk.symbols.get(callee);

    let formals = match &callee_symbol.kind {
        SymbolKind::Procedure { formals, .. } | SymbolKind::Function { formals, .. } => formals.clone(),
        _ => {
            Error::identifier_not_callable(&callee_symbol.name, call_pos, driver);
            return;
        }
    };

    let actual_types: Vec<(TypeId, SourceLocation)> =
        args.iter_mut().map(|arg| (typecheck_expression(arg, chk, driver), arg.pos())).collect();

    if formals.len() != actual_types.len() {
        let name = &chk.symbols.get(callee).name;
        Error::wrong_argument_count(name, formals.len(), actual_types.len(), call_pos, driver);
        return;
    }

    for (formal, (actual_type, actual_pos)) in formals.iter().zip(actual_types.iter()).rev() {
        let formal_symbol = chk.symbols.get(*formal);
        if formal_symbol.ty != *actual_type {
            Error::argument_type_mismatch(&formal_symbol.name, formal_symbol.ty, *actual_type, *actual_pos, driver);
            break;
        }
    }
}
