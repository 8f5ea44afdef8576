//! Source-like rendering of patterns and guards.
//!
//! Used in diagnostics and debug output. Output is normalized (single
//! spaces, minimal parentheses) and does not preserve the original text.

use std::fmt::Write;

use crate::ast::{BinaryOp, ExprId, ExprKind, Pattern, PatternArena, PatternId, TypeRef, TypeRefKind};
use crate::StringInterner;

pub fn print_pattern(arena: &PatternArena, interner: &StringInterner, id: PatternId) -> String {
    let mut printer = Printer::new(arena, interner);
    printer.pattern(id);
    printer.out
}

pub fn print_expr(arena: &PatternArena, interner: &StringInterner, id: ExprId) -> String {
    let mut printer = Printer::new(arena, interner);
    printer.expr(id, 0);
    printer.out
}

struct Printer<'a> {
    arena: &'a PatternArena,
    interner: &'a StringInterner,
    out: String,
}

/// Binding strength of `instanceof` (same tier as relational operators).
const INSTANCEOF_PREC: u8 = 4;
const UNARY_PREC: u8 = 7;

fn precedence(op: BinaryOp) -> u8 {
    match op {
        BinaryOp::Or => 1,
        BinaryOp::And => 2,
        BinaryOp::Eq | BinaryOp::NotEq => 3,
        BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => INSTANCEOF_PREC,
        BinaryOp::Add | BinaryOp::Sub => 5,
        BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => 6,
    }
}

impl<'a> Printer<'a> {
    fn new(arena: &'a PatternArena, interner: &'a StringInterner) -> Self {
        Printer {
            arena,
            interner,
            out: String::new(),
        }
    }

    fn ty(&mut self, ty: TypeRef) {
        match ty.kind {
            TypeRefKind::Named(name) => self.out.push_str(self.interner.lookup(name)),
            TypeRefKind::Var => self.out.push_str("var"),
        }
    }

    fn pattern(&mut self, id: PatternId) {
        let arena = self.arena;
        kava_stack::ensure_sufficient_stack(|| match arena.pattern(id) {
            Pattern::Type(p) => {
                self.ty(p.ty);
                self.out.push(' ');
                match p.local {
                    Some(local) => {
                        let name = arena.local(local).name;
                        self.out.push_str(self.interner.lookup(name));
                    }
                    None => self.out.push('_'),
                }
            }
            Pattern::Record(p) => {
                self.ty(p.ty);
                self.out.push('(');
                for (i, &component) in p.components.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.pattern(component);
                }
                self.out.push(')');
            }
            Pattern::Guarded(p) => {
                for (i, &sub) in p.patterns.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.pattern(sub);
                }
                self.out.push_str(" when ");
                self.expr(p.condition, 0);
            }
            Pattern::Any(_) => self.out.push('_'),
        });
    }

    /// Print `id`, parenthesized if it binds looser than `min_prec`.
    fn expr(&mut self, id: ExprId, min_prec: u8) {
        let arena = self.arena;
        kava_stack::ensure_sufficient_stack(|| {
            let expr = arena.expr(id);
            match &expr.kind {
                ExprKind::Bool(value) => {
                    let _ = write!(self.out, "{value}");
                }
                ExprKind::Int(value) => {
                    let _ = write!(self.out, "{value}");
                }
                ExprKind::Ident(name) => self.out.push_str(self.interner.lookup(*name)),
                ExprKind::Field { receiver, field } => {
                    self.expr(*receiver, UNARY_PREC + 1);
                    self.out.push('.');
                    self.out.push_str(self.interner.lookup(*field));
                }
                ExprKind::Binary { op, left, right } => {
                    let prec = precedence(*op);
                    self.open(prec < min_prec);
                    self.expr(*left, prec);
                    let _ = write!(self.out, " {} ", op.symbol());
                    self.expr(*right, prec + 1);
                    self.close(prec < min_prec);
                }
                ExprKind::Unary { op, operand } => {
                    self.out.push_str(op.symbol());
                    self.expr(*operand, UNARY_PREC);
                }
                ExprKind::InstanceOf { expr, pattern } => {
                    let wrap = INSTANCEOF_PREC < min_prec;
                    self.open(wrap);
                    self.expr(*expr, INSTANCEOF_PREC);
                    self.out.push_str(" instanceof ");
                    self.pattern(*pattern);
                    self.close(wrap);
                }
                ExprKind::Call { callee, args, .. } => {
                    self.out.push_str(self.interner.lookup(*callee));
                    self.out.push('(');
                    for (i, &arg) in args.iter().enumerate() {
                        if i > 0 {
                            self.out.push_str(", ");
                        }
                        self.expr(arg, 0);
                    }
                    self.out.push(')');
                }
            }
        });
    }

    fn open(&mut self, wrap: bool) {
        if wrap {
            self.out.push('(');
        }
    }

    fn close(&mut self, wrap: bool) {
        if wrap {
            self.out.push(')');
        }
    }
}

#[cfg(test)]
mod tests;
