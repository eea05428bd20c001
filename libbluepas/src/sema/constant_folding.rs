// Copyright 2026 Neil Henderson, Blue Tarp Media.
//
//! The `constant_folding` module provides functionality to fold constant expressions in the AST.
//!
//! Folding is a full depth-first walk run after type checking. At each rewrite point a child is
//! optimized first and then offered to [fold_constants]; when a replacement literal comes back it
//! is spliced in with a plain assignment, which drops the superseded subtree. Folding is exact:
//! a node that does not match a known kind/value combination is left untouched.

use crate::ast::{AstBinaryOp, AstExpression, AstMetadata, AstStatement};
use crate::symbols::{ConstValue, SymbolKind, SymbolTable};

/// The Constant Folder holds the state shared by the folding functions.
pub struct ConstantFolder<'a> {
    symbols: &'a SymbolTable,
    metadata: &'a mut AstMetadata,
}

impl<'a> ConstantFolder<'a> {
    /// Creates a new Constant Folder.
    pub fn new(symbols: &'a SymbolTable, metadata: &'a mut AstMetadata) -> Self {
        Self { symbols, metadata }
    }
}

/// The value of a literal operand.
#[derive(Copy, Clone)]
enum Literal {
    Int(i64),
    Real(f64),
}

/// Folds constant expressions in a block, statement by statement.
pub fn fold_block(body: &mut [AstStatement], ctx: &mut ConstantFolder) {
    for stmt in body {
        optimize_statement(stmt, ctx);
    }
}

/// Optimizes a single statement.
fn optimize_statement(stmt: &mut AstStatement, ctx: &mut ConstantFolder) {
    match stmt {
        AstStatement::Assign { rhs, .. } => {
            optimize_expression(rhs, ctx);
            fold_operand(rhs, ctx);
        }

        AstStatement::ProcedureCall { args, .. } => {
            for arg in args {
                optimize_expression(arg, ctx);
            }
        }

        AstStatement::While { condition, body, .. } => {
            optimize_expression(condition, ctx);
            fold_operand(condition, ctx);
            fold_block(body, ctx);
        }

        AstStatement::If { condition, body, elsif_chain, else_body, .. } => {
            optimize_expression(condition, ctx);
            fold_operand(condition, ctx);
            fold_block(body, ctx);

            for elsif in elsif_chain {
                optimize_expression(&mut elsif.condition, ctx);
                fold_operand(&mut elsif.condition, ctx);
                fold_block(&mut elsif.body, ctx);
            }

            if let Some(else_body) = else_body {
                fold_block(else_body, ctx);
            }
        }

        AstStatement::Return { value, .. } => {
            if let Some(value) = value {
                optimize_expression(value, ctx);
                fold_operand(value, ctx);
            }
        }
    }
}

/// Optimizes a single expression.
fn optimize_expression(expr: &mut AstExpression, ctx: &mut ConstantFolder) {
    match expr {
        // An identifier's value can change at run time, so there is nothing to do here; an
        // identifier bound to a constant is handled by `fold_constants` at the rewrite point.
        AstExpression::Identifier { .. } => (),

        AstExpression::IntegerLiteral { .. } | AstExpression::RealLiteral { .. } => (),

        // Casts are never folded and never removed.
        AstExpression::Cast { .. } => (),

        AstExpression::Indexed { index, .. } => {
            optimize_expression(index, ctx);
        }

        AstExpression::Binary { lhs, rhs, .. } => {
            optimize_expression(lhs, ctx);
            optimize_expression(rhs, ctx);
            fold_operand(lhs, ctx);
            fold_operand(rhs, ctx);
        }

        AstExpression::Relation { lhs, rhs, .. } => {
            optimize_expression(lhs, ctx);
            fold_operand(lhs, ctx);
            optimize_expression(rhs, ctx);
            fold_operand(rhs, ctx);
        }

        AstExpression::Negate { expr, .. } | AstExpression::Not { expr, .. } => {
            optimize_expression(expr, ctx);
            fold_operand(expr, ctx);
        }

        // A call is never folded; its arguments are only recursed into.
        AstExpression::FunctionCall { args, .. } => {
            for arg in args {
                optimize_expression(arg, ctx);
            }
        }
    }
}

/// Offers an already-optimized child to `fold_constants` and splices in any replacement.
/// The assignment retires exactly the superseded subtree.
fn fold_operand(expr: &mut AstExpression, ctx: &mut ConstantFolder) {
    if let Some(replacement) = fold_constants(expr, ctx) {
        *expr = replacement;
    }
}

/// Attempts to fold an already-optimized expression node into a literal.
///
/// Returns the replacement literal, or `None` when the node does not match any fold rule.
/// Applying this to a bare literal returns `None`; the rewrite is idempotent.
pub fn fold_constants(expr: &AstExpression, ctx: &mut ConstantFolder) -> Option<AstExpression> {
    match expr {
        // An identifier bound to a declared constant becomes that constant's value.
        AstExpression::Identifier { pos, sym, .. } => {
            let SymbolKind::Constant { value } = ctx.symbols.get(*sym).kind else {
                return None;
            };

            match value {
                ConstValue::Int(value) => Some(AstExpression::integer(*pos, value, ctx.metadata)),
                ConstValue::Real(value) => Some(AstExpression::real(*pos, value, ctx.metadata)),
            }
        }

        AstExpression::Binary { op, lhs, rhs, .. } => {
            let lhs_literal = literal_value(lhs)?;
            let rhs_literal = literal_value(rhs)?;
            fold_binary(*op, lhs_literal, rhs_literal).map(|result| match result {
                Literal::Int(value) => AstExpression::integer(lhs.pos(), value, ctx.metadata),
                Literal::Real(value) => AstExpression::real(lhs.pos(), value, ctx.metadata),
            })
        }

        _ => None,
    }
}

/// The literal value of an expression, if it is a literal.
fn literal_value(expr: &AstExpression) -> Option<Literal> {
    match expr {
        AstExpression::IntegerLiteral { value, .. } => Some(Literal::Int(*value)),
        AstExpression::RealLiteral { value, .. } => Some(Literal::Real(*value)),
        _ => None,
    }
}

/// Evaluates a binary operation over two literals.
///
/// Promotion is exact: int⊕int stays integer, any real operand promotes the other side first and
/// the result is real. Division only folds real⊕real (the type checker already promoted its
/// operands); `div` and `mod` only fold integer pairs, with truncating semantics, and leave a
/// zero divisor for the runtime. The logical operators fold through the 0/1 encoding.
fn fold_binary(op: AstBinaryOp, lhs: Literal, rhs: Literal) -> Option<Literal> {
    use Literal::{Int, Real};

    match (op, lhs, rhs) {
        (AstBinaryOp::Add, Int(l), Int(r)) => Some(Int(l.wrapping_add(r))),
        (AstBinaryOp::Subtract, Int(l), Int(r)) => Some(Int(l.wrapping_sub(r))),
        (AstBinaryOp::Multiply, Int(l), Int(r)) => Some(Int(l.wrapping_mul(r))),

        (AstBinaryOp::Add, l, r) => Some(Real(promote(l) + promote(r))),
        (AstBinaryOp::Subtract, l, r) => Some(Real(promote(l) - promote(r))),
        (AstBinaryOp::Multiply, l, r) => Some(Real(promote(l) * promote(r))),

        (AstBinaryOp::Divide, Real(l), Real(r)) => Some(Real(l / r)),
        (AstBinaryOp::Divide, ..) => None,

        (AstBinaryOp::IntDivide, Int(l), Int(r)) if r != 0 => Some(Int(l.wrapping_div(r))),
        (AstBinaryOp::Modulo, Int(l), Int(r)) if r != 0 => Some(Int(l.wrapping_rem(r))),
        (AstBinaryOp::IntDivide | AstBinaryOp::Modulo, ..) => None,

        (AstBinaryOp::And, Int(l), Int(r)) => Some(Int((l != 0 && r != 0) as i64)),
        (AstBinaryOp::Or, Int(l), Int(r)) => Some(Int((l != 0 || r != 0) as i64)),

        (AstBinaryOp::And, l, r) => Some(Real((promote(l) != 0.0 && promote(r) != 0.0) as i64 as f64)),
        (AstBinaryOp::Or, l, r) => Some(Real((promote(l) != 0.0 || promote(r) != 0.0) as i64 as f64)),
    }
}

/// Promotes a literal to real.
fn promote(literal: Literal) -> f64 {
    match literal {
        Literal::Int(value) => value as f64,
        Literal::Real(value) => value,
    }
}
