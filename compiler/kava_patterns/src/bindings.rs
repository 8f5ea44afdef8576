//! Locals a pattern or guard introduces when it succeeds.
//!
//! Binding sets are static: they depend only on the syntax, never on flow
//! state, so they can be queried before and after analysis alike.

use kava_ir::{BinaryOp, ExprId, ExprKind, LocalId, Pattern, PatternArena, PatternId, UnaryOp};
use kava_stack::ensure_sufficient_stack;
use smallvec::SmallVec;

/// Ordered set of locals, deduplicated by identity.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct BindingSet(SmallVec<[LocalId; 4]>);

impl BindingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `local` unless it is already present.
    pub fn push(&mut self, local: LocalId) {
        if !self.0.contains(&local) {
            self.0.push(local);
        }
    }

    /// Append every local of `other` not yet present, keeping `other`'s
    /// order.
    pub fn merge(&mut self, other: &BindingSet) {
        for &local in &other.0 {
            self.push(local);
        }
    }

    pub fn contains(&self, local: LocalId) -> bool {
        self.0.contains(&local)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[LocalId] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = LocalId> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<LocalId> for BindingSet {
    fn from_iter<I: IntoIterator<Item = LocalId>>(iter: I) -> Self {
        let mut set = BindingSet::new();
        for local in iter {
            set.push(local);
        }
        set
    }
}

/// Locals bound when `pattern` matches.
///
/// For a guarded pattern: each sub-pattern's bindings left to right, then
/// the bindings the guard introduces when true.
pub fn bindings_when_true(arena: &PatternArena, pattern: PatternId) -> BindingSet {
    let mut out = BindingSet::new();
    collect_pattern(arena, pattern, &mut out);
    out
}

fn collect_pattern(arena: &PatternArena, pattern: PatternId, out: &mut BindingSet) {
    ensure_sufficient_stack(|| match arena.pattern(pattern) {
        Pattern::Type(p) => {
            if let Some(local) = p.local {
                out.push(local);
            }
        }
        Pattern::Record(p) => {
            for &component in &p.components {
                collect_pattern(arena, component, out);
            }
        }
        Pattern::Guarded(p) => {
            for &sub in &p.patterns {
                collect_pattern(arena, sub, out);
            }
            out.merge(&expr_bindings_when_true(arena, p.condition));
        }
        Pattern::Any(_) => {}
    });
}

/// Locals definitely bound when `expr` evaluates to `true`.
pub fn expr_bindings_when_true(arena: &PatternArena, expr: ExprId) -> BindingSet {
    expr_bindings(arena, expr, true)
}

/// Locals definitely bound when `expr` evaluates to `false`.
pub fn expr_bindings_when_false(arena: &PatternArena, expr: ExprId) -> BindingSet {
    expr_bindings(arena, expr, false)
}

fn expr_bindings(arena: &PatternArena, expr: ExprId, when: bool) -> BindingSet {
    ensure_sufficient_stack(|| match &arena.expr(expr).kind {
        ExprKind::InstanceOf { pattern, .. } if when => bindings_when_true(arena, *pattern),
        ExprKind::Unary {
            op: UnaryOp::Not,
            operand,
        } => expr_bindings(arena, *operand, !when),
        // `a && b` is true only when both are; `a || b` is false only when
        // both are.
        ExprKind::Binary { op, left, right }
            if (*op == BinaryOp::And && when) || (*op == BinaryOp::Or && !when) =>
        {
            let mut out = expr_bindings(arena, *left, when);
            out.merge(&expr_bindings(arena, *right, when));
            out
        }
        _ => BindingSet::new(),
    })
}
