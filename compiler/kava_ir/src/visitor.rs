//! Read-only traversal over patterns and guard expressions.
//!
//! Default `visit_*` methods call the matching `walk_*` function, which
//! visits children in source order. Override a `visit_*` method to act on
//! a node and call `walk_*` from it to keep descending.
//!
//! Nodes are handed over together with their id so visitors can key side
//! tables without a reverse lookup.

use kava_stack::ensure_sufficient_stack;

use crate::ast::{Expr, ExprId, ExprKind, LocalDecl, LocalId, Pattern, PatternArena, PatternId};

pub trait Visitor<'ast> {
    fn visit_pattern(&mut self, id: PatternId, pattern: &'ast Pattern, arena: &'ast PatternArena) {
        walk_pattern(self, id, pattern, arena);
    }

    fn visit_pattern_id(&mut self, id: PatternId, arena: &'ast PatternArena) {
        self.visit_pattern(id, arena.pattern(id), arena);
    }

    fn visit_expr(&mut self, id: ExprId, expr: &'ast Expr, arena: &'ast PatternArena) {
        walk_expr(self, id, expr, arena);
    }

    fn visit_expr_id(&mut self, id: ExprId, arena: &'ast PatternArena) {
        self.visit_expr(id, arena.expr(id), arena);
    }

    /// A local declared by a type pattern.
    fn visit_local(&mut self, local: LocalId, decl: &'ast LocalDecl) {
        let _ = (local, decl);
    }
}

pub fn walk_pattern<'ast, V: Visitor<'ast> + ?Sized>(
    visitor: &mut V,
    id: PatternId,
    pattern: &'ast Pattern,
    arena: &'ast PatternArena,
) {
    let _ = id;
    ensure_sufficient_stack(|| match pattern {
        Pattern::Type(p) => {
            if let Some(local) = p.local {
                visitor.visit_local(local, arena.local(local));
            }
        }
        Pattern::Record(p) => {
            for &component in &p.components {
                visitor.visit_pattern_id(component, arena);
            }
        }
        Pattern::Guarded(p) => {
            for &sub in &p.patterns {
                visitor.visit_pattern_id(sub, arena);
            }
            visitor.visit_expr_id(p.condition, arena);
        }
        Pattern::Any(_) => {}
    });
}

pub fn walk_expr<'ast, V: Visitor<'ast> + ?Sized>(
    visitor: &mut V,
    id: ExprId,
    expr: &'ast Expr,
    arena: &'ast PatternArena,
) {
    let _ = id;
    ensure_sufficient_stack(|| match &expr.kind {
        ExprKind::Bool(_) | ExprKind::Int(_) | ExprKind::Ident(_) => {}
        ExprKind::Field { receiver, .. } => visitor.visit_expr_id(*receiver, arena),
        ExprKind::Binary { left, right, .. } => {
            visitor.visit_expr_id(*left, arena);
            visitor.visit_expr_id(*right, arena);
        }
        ExprKind::Unary { operand, .. } => visitor.visit_expr_id(*operand, arena),
        ExprKind::InstanceOf { expr, pattern } => {
            visitor.visit_expr_id(*expr, arena);
            visitor.visit_pattern_id(*pattern, arena);
        }
        ExprKind::Call { args, .. } => {
            for &arg in args {
                visitor.visit_expr_id(arg, arena);
            }
        }
    });
}
