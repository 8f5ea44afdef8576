//! Type resolution for patterns and their guards.
//!
//! Resolution never mutates the syntax tree. Everything it learns goes into
//! a [`ResolvedPatterns`] side table keyed by pattern, expression and local
//! ids, which flow analysis and branch planning read later.
//!
//! Guarded patterns resolve their guard a second time with the sub-pattern
//! bindings in scope: without them, names the pattern introduces would not
//! be visible to the condition and its implicit conversions could not be
//! computed.

use bitflags::bitflags;
use kava_diagnostic::{
    guard_always_false, guard_not_boolean, incompatible_pattern_type, unknown_name, unknown_type,
    Diagnostic, DiagnosticQueue, ErrorCode,
};
use kava_ir::visitor::{walk_expr, walk_pattern, Visitor};
use kava_ir::{
    BinaryOp, Expr, ExprId, ExprKind, GuardedPattern, LocalId, Name, Pattern, PatternArena,
    PatternId, RecordPattern, Span, StringInterner, TypePattern, TypeRefKind, UnaryOp,
};
use kava_stack::ensure_sufficient_stack;
use kava_types::{Idx, Pool};
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::bindings::{bindings_when_true, expr_bindings_when_false, expr_bindings_when_true, BindingSet};
use crate::const_fold::optimized_boolean_constant;

bitflags! {
    /// Facts attached to name references during resolution.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct NameFlags: u8 {
        /// The name reads a local from inside a pattern guard.
        const USED_IN_PATTERN_GUARD = 1 << 0;
    }
}

/// Conversion applied to an operand before use.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ImplicitConversion {
    /// `Boolean` to `boolean`, `Integer` to `int`, ...
    Unbox,
    /// Primitive widening to the given type.
    Widen(Idx),
    UnboxAndWiden(Idx),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScopeEntry {
    pub name: Name,
    pub local: LocalId,
    pub ty: Idx,
}

/// Locals visible at a match site. Later entries shadow earlier ones.
#[derive(Clone, Debug, Default)]
pub struct LocalScope {
    entries: Vec<ScopeEntry>,
}

impl LocalScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(&mut self, name: Name, local: LocalId, ty: Idx) {
        self.entries.push(ScopeEntry { name, local, ty });
    }

    pub fn lookup(&self, name: Name) -> Option<ScopeEntry> {
        self.entries.iter().rev().find(|e| e.name == name).copied()
    }

    pub fn locals(&self) -> impl Iterator<Item = LocalId> + '_ {
        self.entries.iter().map(|e| e.local)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// This scope extended with pattern `bindings`.
    fn with_bindings(
        &self,
        arena: &PatternArena,
        resolved: &ResolvedPatterns,
        bindings: &BindingSet,
    ) -> LocalScope {
        let mut scope = self.clone();
        for local in bindings.iter() {
            let ty = resolved.local_type(local).unwrap_or(Idx::ERROR);
            scope.declare(arena.local(local).name, local, ty);
        }
        scope
    }
}

/// Everything resolution learned about one unit.
#[derive(Clone, Debug, Default)]
pub struct ResolvedPatterns {
    pattern_types: FxHashMap<PatternId, Idx>,
    expr_types: FxHashMap<ExprId, Idx>,
    conversions: FxHashMap<ExprId, ImplicitConversion>,
    name_flags: FxHashMap<ExprId, NameFlags>,
    ident_locals: FxHashMap<ExprId, LocalId>,
    local_types: FxHashMap<LocalId, Idx>,
    /// Record pattern inside a guard -> the guarded pattern owning the guard.
    guarded_else_owners: FxHashMap<PatternId, PatternId>,
}

impl ResolvedPatterns {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pattern_type(&self, id: PatternId) -> Option<Idx> {
        self.pattern_types.get(&id).copied()
    }

    pub fn expr_type(&self, id: ExprId) -> Option<Idx> {
        self.expr_types.get(&id).copied()
    }

    pub fn conversion(&self, id: ExprId) -> Option<ImplicitConversion> {
        self.conversions.get(&id).copied()
    }

    pub fn name_flags(&self, id: ExprId) -> NameFlags {
        self.name_flags.get(&id).copied().unwrap_or_default()
    }

    /// The local a name reference resolved to.
    pub fn local_of(&self, id: ExprId) -> Option<LocalId> {
        self.ident_locals.get(&id).copied()
    }

    pub fn local_type(&self, local: LocalId) -> Option<Idx> {
        self.local_types.get(&local).copied()
    }

    pub fn guarded_else_owner(&self, record: PatternId) -> Option<PatternId> {
        self.guarded_else_owners.get(&record).copied()
    }

    /// Record patterns nested in `guarded`'s condition, in id order.
    pub fn records_owned_by(&self, guarded: PatternId) -> Vec<PatternId> {
        let mut records: Vec<_> = self
            .guarded_else_owners
            .iter()
            .filter(|&(_, &owner)| owner == guarded)
            .map(|(&record, _)| record)
            .collect();
        records.sort_unstable();
        records
    }
}

pub struct Resolver<'a> {
    arena: &'a PatternArena,
    pool: &'a Pool,
    interner: &'a StringInterner,
    diagnostics: &'a mut DiagnosticQueue,
    resolved: &'a mut ResolvedPatterns,
}

impl<'a> Resolver<'a> {
    pub fn new(
        arena: &'a PatternArena,
        pool: &'a Pool,
        interner: &'a StringInterner,
        diagnostics: &'a mut DiagnosticQueue,
        resolved: &'a mut ResolvedPatterns,
    ) -> Self {
        Resolver {
            arena,
            pool,
            interner,
            diagnostics,
            resolved,
        }
    }

    /// Resolve `id` against a matched value of type `expected`.
    pub fn resolve_pattern(&mut self, id: PatternId, expected: Idx, scope: &LocalScope) -> Idx {
        let arena = self.arena;
        ensure_sufficient_stack(|| {
            let ty = match arena.pattern(id) {
                Pattern::Type(p) => self.resolve_type_pattern(p, expected),
                Pattern::Record(p) => self.resolve_record_pattern(p, expected, scope),
                Pattern::Guarded(g) => return self.resolve_guarded_pattern(id, g, expected, scope),
                Pattern::Any(_) => expected,
            };
            self.resolved.pattern_types.insert(id, ty);
            ty
        })
    }

    /// Whether a value of type `expected` may be tested against `pattern`.
    /// Guarded patterns answer for their first sub-pattern.
    pub fn is_pattern_type_compatible(&self, pattern: PatternId, expected: Idx) -> bool {
        match self.arena.pattern(pattern) {
            Pattern::Guarded(g) => g
                .patterns
                .first()
                .is_none_or(|&first| self.is_pattern_type_compatible(first, expected)),
            Pattern::Any(_) => true,
            Pattern::Type(_) | Pattern::Record(_) => self
                .resolved
                .pattern_type(pattern)
                .is_none_or(|ty| self.compatible(expected, ty)),
        }
    }

    fn compatible(&self, expected: Idx, ty: Idx) -> bool {
        self.pool.is_error(expected) || self.pool.is_error(ty) || self.pool.is_castable(expected, ty)
    }

    fn display(&self, ty: Idx) -> &'static str {
        self.pool.display(ty, self.interner)
    }

    fn lookup_type(&mut self, name: Name, span: Span) -> Idx {
        if let Some(ty) = self.pool.lookup(name) {
            return ty;
        }
        self.diagnostics
            .add(unknown_type(span, self.interner.lookup(name)));
        Idx::ERROR
    }

    fn check_compatible(&mut self, span: Span, expected: Idx, ty: Idx) {
        if !self.compatible(expected, ty) {
            let diag = incompatible_pattern_type(span, self.display(expected), self.display(ty));
            self.diagnostics.add(diag);
        }
    }

    fn resolve_type_pattern(&mut self, p: &TypePattern, expected: Idx) -> Idx {
        let ty = match p.ty.kind {
            TypeRefKind::Var => expected,
            TypeRefKind::Named(name) => self.lookup_type(name, p.ty.span),
        };
        self.check_compatible(p.span, expected, ty);
        if let Some(local) = p.local {
            self.resolved.local_types.insert(local, ty);
        }
        ty
    }

    fn resolve_record_pattern(&mut self, p: &RecordPattern, expected: Idx, scope: &LocalScope) -> Idx {
        let record = match p.ty.kind {
            TypeRefKind::Named(name) => self.lookup_type(name, p.ty.span),
            TypeRefKind::Var => {
                self.diagnostics.add(
                    Diagnostic::error(ErrorCode::E3003)
                        .with_message("`var` cannot name the type of a record pattern")
                        .with_label(p.ty.span, "expected a record type"),
                );
                Idx::ERROR
            }
        };

        if !self.pool.is_error(record) && !self.pool.is_record(record) {
            self.diagnostics.add(
                Diagnostic::error(ErrorCode::E3003)
                    .with_message(format!("`{}` is not a record type", self.display(record)))
                    .with_label(p.ty.span, "expected a record type"),
            );
        }
        if self.pool.is_error(record) || !self.pool.is_record(record) {
            for &component in &p.components {
                self.resolve_pattern(component, Idx::ERROR, scope);
            }
            return Idx::ERROR;
        }

        self.check_compatible(p.span, expected, record);

        let pool = self.pool;
        let components = pool.record_components(record);
        if components.len() != p.components.len() {
            self.diagnostics.add(
                Diagnostic::error(ErrorCode::E3004)
                    .with_message(format!(
                        "record `{}` has {} component(s), but the pattern has {}",
                        self.display(record),
                        components.len(),
                        p.components.len()
                    ))
                    .with_label(p.span, "wrong number of components"),
            );
        }
        for (i, &component) in p.components.iter().enumerate() {
            let expected = components.get(i).map_or(Idx::ERROR, |c| c.ty);
            self.resolve_pattern(component, expected, scope);
        }
        record
    }

    fn resolve_guarded_pattern(
        &mut self,
        id: PatternId,
        g: &GuardedPattern,
        expected: Idx,
        scope: &LocalScope,
    ) -> Idx {
        if let Some(ty) = self.resolved.pattern_type(id) {
            trace!(?id, "guarded pattern already resolved");
            return ty;
        }
        let arena = self.arena;

        let mut first = None;
        let mut bindings = BindingSet::new();
        for &sub in &g.patterns {
            let ty = self.resolve_pattern(sub, expected, scope);
            first.get_or_insert(ty);
            bindings.merge(&bindings_when_true(arena, sub));
        }
        // An unresolved first sub-pattern makes the whole pattern an error.
        let ty = first.unwrap_or(expected);
        self.resolved.pattern_types.insert(id, ty);

        let guard_scope = scope.with_bindings(arena, self.resolved, &bindings);
        self.resolve_guard(g.condition, &guard_scope);

        if optimized_boolean_constant(arena, g.condition).is_false() {
            self.diagnostics
                .add(guard_always_false(arena.expr_span(g.condition)));
        }

        GuardNameTagger {
            resolved: &mut *self.resolved,
        }
        .visit_expr_id(g.condition, arena);
        GuardedElseCollector {
            owner: id,
            resolved: &mut *self.resolved,
        }
        .visit_expr_id(g.condition, arena);

        debug!(
            ?id,
            ty = self.display(ty),
            sub_patterns = g.patterns.len(),
            bindings = bindings.len(),
            "resolved guarded pattern"
        );
        ty
    }

    /// Resolve a guard condition, which must be `boolean` or `Boolean`.
    pub fn resolve_guard(&mut self, condition: ExprId, scope: &LocalScope) -> Idx {
        let ty = self.resolve_expr(condition, scope);
        if self.pool.is_boolean(ty) {
            self.coerce(condition, ty, Idx::BOOLEAN);
        } else if !self.pool.is_error(ty) {
            let span = self.arena.expr_span(condition);
            self.diagnostics
                .add(guard_not_boolean(span, self.display(ty)));
        }
        ty
    }

    /// Resolve a guard sub-expression (or a selector) and record its type.
    pub fn resolve_expr(&mut self, id: ExprId, scope: &LocalScope) -> Idx {
        let arena = self.arena;
        ensure_sufficient_stack(|| {
            let expr = arena.expr(id);
            let ty = self.resolve_expr_kind(id, expr, scope);
            self.resolved.expr_types.insert(id, ty);
            ty
        })
    }

    fn resolve_expr_kind(&mut self, id: ExprId, expr: &Expr, scope: &LocalScope) -> Idx {
        match &expr.kind {
            ExprKind::Bool(_) => Idx::BOOLEAN,
            ExprKind::Int(value) => {
                if i32::try_from(*value).is_ok() {
                    Idx::INT
                } else {
                    Idx::LONG
                }
            }
            ExprKind::Ident(name) => match scope.lookup(*name) {
                Some(entry) => {
                    self.resolved.ident_locals.insert(id, entry.local);
                    entry.ty
                }
                None => {
                    self.diagnostics
                        .add(unknown_name(expr.span, self.interner.lookup(*name)));
                    Idx::ERROR
                }
            },
            ExprKind::Field { receiver, field } => {
                let receiver_ty = self.resolve_expr(*receiver, scope);
                if self.pool.is_error(receiver_ty) {
                    return Idx::ERROR;
                }
                let pool = self.pool;
                if let Some(component) = pool
                    .record_components(receiver_ty)
                    .iter()
                    .find(|c| c.name == *field)
                {
                    return component.ty;
                }
                self.diagnostics.add(
                    Diagnostic::error(ErrorCode::E2003)
                        .with_message(format!(
                            "no component `{}` on type `{}`",
                            self.interner.lookup(*field),
                            self.display(receiver_ty)
                        ))
                        .with_label(expr.span, "unknown component"),
                );
                Idx::ERROR
            }
            ExprKind::Unary { op, operand } => {
                let ty = self.resolve_expr(*operand, scope);
                self.resolve_unary(expr.span, *op, *operand, ty)
            }
            ExprKind::Binary { op, left, right } => {
                self.resolve_binary(expr.span, *op, *left, *right, scope)
            }
            ExprKind::InstanceOf { expr: tested, pattern } => {
                let tested_ty = self.resolve_expr(*tested, scope);
                self.resolve_pattern(*pattern, tested_ty, scope);
                Idx::BOOLEAN
            }
            ExprKind::Call { args, ret, .. } => {
                for &arg in args {
                    self.resolve_expr(arg, scope);
                }
                match ret.kind {
                    TypeRefKind::Named(name) => self.lookup_type(name, ret.span),
                    TypeRefKind::Var => Idx::ERROR,
                }
            }
        }
    }

    fn resolve_unary(&mut self, span: Span, op: UnaryOp, operand: ExprId, ty: Idx) -> Idx {
        match op {
            UnaryOp::Not => {
                if !self.expect_boolean(operand, ty) {
                    self.operand_mismatch(span, op.symbol(), ty, None);
                }
                Idx::BOOLEAN
            }
            UnaryOp::Neg => {
                if self.pool.is_error(ty) {
                    return Idx::ERROR;
                }
                // Unary promotion: `char` and `int` become `int`.
                match self.pool.binary_numeric_promotion(ty, Idx::INT) {
                    Some(promoted) => {
                        self.coerce(operand, ty, promoted);
                        promoted
                    }
                    None => {
                        self.operand_mismatch(span, op.symbol(), ty, None);
                        Idx::ERROR
                    }
                }
            }
        }
    }

    fn resolve_binary(
        &mut self,
        span: Span,
        op: BinaryOp,
        left: ExprId,
        right: ExprId,
        scope: &LocalScope,
    ) -> Idx {
        let arena = self.arena;
        let left_ty = self.resolve_expr(left, scope);

        if op.is_logical() {
            // `a && b` sees a's true bindings, `a || b` its false ones.
            let carried = if op == BinaryOp::And {
                expr_bindings_when_true(arena, left)
            } else {
                expr_bindings_when_false(arena, left)
            };
            let right_scope = scope.with_bindings(arena, self.resolved, &carried);
            let right_ty = self.resolve_expr(right, &right_scope);
            let left_ok = self.expect_boolean(left, left_ty);
            let right_ok = self.expect_boolean(right, right_ty);
            if !(left_ok && right_ok) {
                self.operand_mismatch(span, op.symbol(), left_ty, Some(right_ty));
            }
            return Idx::BOOLEAN;
        }

        let right_ty = self.resolve_expr(right, scope);
        let either_error = self.pool.is_error(left_ty) || self.pool.is_error(right_ty);

        if let Some(promoted) = self.pool.binary_numeric_promotion(left_ty, right_ty) {
            self.coerce(left, left_ty, promoted);
            self.coerce(right, right_ty, promoted);
            return if op.is_arithmetic() {
                promoted
            } else {
                Idx::BOOLEAN
            };
        }

        let equality = matches!(op, BinaryOp::Eq | BinaryOp::NotEq);
        if equality && self.pool.is_boolean(left_ty) && self.pool.is_boolean(right_ty) {
            self.coerce(left, left_ty, Idx::BOOLEAN);
            self.coerce(right, right_ty, Idx::BOOLEAN);
            return Idx::BOOLEAN;
        }
        if equality && !self.pool.is_primitive(left_ty) && !self.pool.is_primitive(right_ty) {
            return Idx::BOOLEAN;
        }

        if !either_error {
            self.operand_mismatch(span, op.symbol(), left_ty, Some(right_ty));
        }
        if op.is_arithmetic() {
            Idx::ERROR
        } else {
            Idx::BOOLEAN
        }
    }

    /// Record the conversion from `from` to `to` on `expr`, if any.
    fn coerce(&mut self, expr: ExprId, from: Idx, to: Idx) {
        if from == to || self.pool.is_error(from) {
            return;
        }
        let conversion = match self.pool.unboxed(from) {
            Some(primitive) if primitive == to => ImplicitConversion::Unbox,
            Some(_) => ImplicitConversion::UnboxAndWiden(to),
            None => ImplicitConversion::Widen(to),
        };
        self.resolved.conversions.insert(expr, conversion);
    }

    /// `true` if `ty` can be used as a boolean (errors pass silently).
    fn expect_boolean(&mut self, expr: ExprId, ty: Idx) -> bool {
        if self.pool.is_boolean(ty) {
            self.coerce(expr, ty, Idx::BOOLEAN);
            true
        } else {
            self.pool.is_error(ty)
        }
    }

    fn operand_mismatch(&mut self, span: Span, op: &str, left: Idx, right: Option<Idx>) {
        let message = match right {
            Some(right) => format!(
                "operator `{op}` cannot be applied to `{}` and `{}`",
                self.display(left),
                self.display(right)
            ),
            None => format!("operator `{op}` cannot be applied to `{}`", self.display(left)),
        };
        self.diagnostics.add(
            Diagnostic::error(ErrorCode::E2004)
                .with_message(message)
                .with_label(span, "invalid operand types"),
        );
    }
}

/// Tags every name in a guard that reads a local.
struct GuardNameTagger<'r> {
    resolved: &'r mut ResolvedPatterns,
}

impl GuardNameTagger<'_> {
    fn tag(&mut self, id: ExprId) {
        *self.resolved.name_flags.entry(id).or_default() |= NameFlags::USED_IN_PATTERN_GUARD;
    }
}

impl<'ast> Visitor<'ast> for GuardNameTagger<'_> {
    fn visit_expr(&mut self, id: ExprId, expr: &'ast Expr, arena: &'ast PatternArena) {
        match &expr.kind {
            ExprKind::Ident(_) if self.resolved.local_of(id).is_some() => self.tag(id),
            ExprKind::Field { receiver, .. } if self.resolved.local_of(*receiver).is_some() => {
                self.tag(id);
            }
            _ => {}
        }
        walk_expr(self, id, expr, arena);
    }
}

/// Marks record patterns inside a guard as failing to the guarded
/// pattern's else target.
struct GuardedElseCollector<'r> {
    owner: PatternId,
    resolved: &'r mut ResolvedPatterns,
}

impl<'ast> Visitor<'ast> for GuardedElseCollector<'_> {
    fn visit_pattern(&mut self, id: PatternId, pattern: &'ast Pattern, arena: &'ast PatternArena) {
        match pattern {
            Pattern::Record(_) => {
                self.resolved.guarded_else_owners.insert(id, self.owner);
                walk_pattern(self, id, pattern, arena);
            }
            // A nested guard owns the records in its own condition.
            Pattern::Guarded(g) => {
                for &sub in &g.patterns {
                    self.visit_pattern_id(sub, arena);
                }
            }
            _ => walk_pattern(self, id, pattern, arena),
        }
    }
}

#[cfg(test)]
mod tests;
