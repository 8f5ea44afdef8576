//! Compile-time values of guard expressions.
//!
//! Only literals and pure operators over them fold. Names, field reads,
//! calls and `instanceof` depend on runtime values and never do.
//!
//! `&&` and `||` fold as soon as the result is decided: `x && false` is
//! `false` whatever `x` is. That is what the branch planner needs to skip
//! dead jumps, and what `is_always_true` means by a vacuous guard.

use kava_ir::{BinaryOp, ExprId, ExprKind, PatternArena, UnaryOp};
use kava_stack::ensure_sufficient_stack;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Constant {
    NotAConstant,
    Bool(bool),
    Int(i64),
}

impl Constant {
    pub fn as_bool(self) -> Option<bool> {
        match self {
            Constant::Bool(b) => Some(b),
            _ => None,
        }
    }

    pub fn is_true(self) -> bool {
        self == Constant::Bool(true)
    }

    pub fn is_false(self) -> bool {
        self == Constant::Bool(false)
    }
}

/// The boolean value `expr` is known to have, or `NotAConstant`.
pub fn optimized_boolean_constant(arena: &PatternArena, expr: ExprId) -> Constant {
    match fold(arena, expr) {
        c @ Constant::Bool(_) => c,
        _ => Constant::NotAConstant,
    }
}

/// Whether evaluating `expr` reads or calls anything at runtime.
///
/// A guard can fold and still need evaluating: `check() && false` is
/// `false`, but `check()` runs first.
pub fn has_runtime_operands(arena: &PatternArena, expr: ExprId) -> bool {
    ensure_sufficient_stack(|| match &arena.expr(expr).kind {
        ExprKind::Bool(_) | ExprKind::Int(_) => false,
        ExprKind::Unary { operand, .. } => has_runtime_operands(arena, *operand),
        ExprKind::Binary { left, right, .. } => {
            has_runtime_operands(arena, *left) || has_runtime_operands(arena, *right)
        }
        ExprKind::Ident(_)
        | ExprKind::Field { .. }
        | ExprKind::InstanceOf { .. }
        | ExprKind::Call { .. } => true,
    })
}

pub fn fold(arena: &PatternArena, expr: ExprId) -> Constant {
    ensure_sufficient_stack(|| match &arena.expr(expr).kind {
        ExprKind::Bool(b) => Constant::Bool(*b),
        ExprKind::Int(i) => Constant::Int(*i),
        ExprKind::Unary { op, operand } => fold_unary(*op, fold(arena, *operand)),
        ExprKind::Binary { op, left, right } => {
            fold_binary(*op, fold(arena, *left), fold(arena, *right))
        }
        ExprKind::Ident(_)
        | ExprKind::Field { .. }
        | ExprKind::InstanceOf { .. }
        | ExprKind::Call { .. } => Constant::NotAConstant,
    })
}

fn fold_unary(op: UnaryOp, operand: Constant) -> Constant {
    match (op, operand) {
        (UnaryOp::Not, Constant::Bool(b)) => Constant::Bool(!b),
        (UnaryOp::Neg, Constant::Int(i)) => i.checked_neg().map_or(Constant::NotAConstant, Constant::Int),
        _ => Constant::NotAConstant,
    }
}

fn fold_binary(op: BinaryOp, left: Constant, right: Constant) -> Constant {
    use Constant::{Bool, Int, NotAConstant};

    match op {
        BinaryOp::And => match (left, right) {
            (Bool(false), _) | (_, Bool(false)) => Bool(false),
            (Bool(true), Bool(true)) => Bool(true),
            _ => NotAConstant,
        },
        BinaryOp::Or => match (left, right) {
            (Bool(true), _) | (_, Bool(true)) => Bool(true),
            (Bool(false), Bool(false)) => Bool(false),
            _ => NotAConstant,
        },
        _ => match (left, right) {
            (Int(l), Int(r)) => fold_int(op, l, r),
            (Bool(l), Bool(r)) => match op {
                BinaryOp::Eq => Bool(l == r),
                BinaryOp::NotEq => Bool(l != r),
                _ => NotAConstant,
            },
            _ => NotAConstant,
        },
    }
}

fn fold_int(op: BinaryOp, l: i64, r: i64) -> Constant {
    use Constant::{Bool, Int, NotAConstant};

    let arith = |v: Option<i64>| v.map_or(NotAConstant, Int);
    match op {
        BinaryOp::Eq => Bool(l == r),
        BinaryOp::NotEq => Bool(l != r),
        BinaryOp::Lt => Bool(l < r),
        BinaryOp::LtEq => Bool(l <= r),
        BinaryOp::Gt => Bool(l > r),
        BinaryOp::GtEq => Bool(l >= r),
        BinaryOp::Add => arith(l.checked_add(r)),
        BinaryOp::Sub => arith(l.checked_sub(r)),
        BinaryOp::Mul => arith(l.checked_mul(r)),
        // Division by zero throws at runtime; not a constant.
        BinaryOp::Div => arith(l.checked_div(r)),
        BinaryOp::Rem => arith(l.checked_rem(r)),
        BinaryOp::And | BinaryOp::Or => NotAConstant,
    }
}

#[cfg(test)]
mod tests;
