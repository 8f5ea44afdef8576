//! Arena-allocated syntax for patterns and their guard expressions.
//!
//! The parser builds these nodes once; every later pass (resolution, flow
//! analysis, branch planning) refers to them by [`PatternId`] / [`ExprId`]
//! and keeps its derived facts in side tables keyed by those ids, so the
//! tree itself never changes after construction.

use crate::{Name, Span};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            #[inline]
            pub const fn new(raw: u32) -> Self {
                Self(raw)
            }

            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }

            /// Index into the owning arena's storage.
            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

define_id!(
    /// Handle to a [`Pattern`] in a [`PatternArena`].
    PatternId
);
define_id!(
    /// Handle to an [`Expr`] in a [`PatternArena`].
    ExprId
);
define_id!(
    /// Identity of a pattern-introduced local variable.
    ///
    /// Binding sets deduplicate on this id, never on the name.
    LocalId
);

// Types as written

/// How a pattern spells its type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeRefKind {
    /// A nominal type name, resolved by the type pool.
    Named(Name),
    /// `var`: the type is inferred from the matched value.
    Var,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TypeRef {
    pub kind: TypeRefKind,
    pub span: Span,
}

impl TypeRef {
    pub const fn named(name: Name, span: Span) -> Self {
        TypeRef {
            kind: TypeRefKind::Named(name),
            span,
        }
    }

    pub const fn var(span: Span) -> Self {
        TypeRef {
            kind: TypeRefKind::Var,
            span,
        }
    }
}

/// A local declared by a type pattern.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LocalDecl {
    pub name: Name,
    pub span: Span,
}

// Patterns

/// `T x`, `var x`, or the unnamed form `T _`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypePattern {
    pub ty: TypeRef,
    /// `None` for an unnamed binding.
    pub local: Option<LocalId>,
    pub span: Span,
}

/// `R(p1, ..., pn)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordPattern {
    pub ty: TypeRef,
    pub components: Vec<PatternId>,
    pub span: Span,
}

/// `p1, ..., pk when condition`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GuardedPattern {
    pub patterns: Vec<PatternId>,
    pub condition: ExprId,
    pub span: Span,
    /// Offset of the contextual `when` keyword, if the parser saw one.
    pub restricted_identifier_start: Option<u32>,
}

/// The unnamed pattern `_`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnyPattern {
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Pattern {
    Type(TypePattern),
    Record(RecordPattern),
    Guarded(GuardedPattern),
    Any(AnyPattern),
}

impl Pattern {
    pub fn span(&self) -> Span {
        match self {
            Pattern::Type(p) => p.span,
            Pattern::Record(p) => p.span,
            Pattern::Guarded(p) => p.span,
            Pattern::Any(p) => p.span,
        }
    }

    /// Short variant name for logs and diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Pattern::Type(_) => "type pattern",
            Pattern::Record(_) => "record pattern",
            Pattern::Guarded(_) => "guarded pattern",
            Pattern::Any(_) => "unnamed pattern",
        }
    }
}

// Guard expressions

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    And,
    Or,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl BinaryOp {
    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq
                | BinaryOp::NotEq
                | BinaryOp::Lt
                | BinaryOp::LtEq
                | BinaryOp::Gt
                | BinaryOp::GtEq
        )
    }

    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem
        )
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Not,
    Neg,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Not => "!",
            UnaryOp::Neg => "-",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExprKind {
    Bool(bool),
    Int(i64),
    /// Simple name reference.
    Ident(Name),
    /// Qualified name `receiver.field` (record accessor on a local).
    Field { receiver: ExprId, field: Name },
    Binary {
        op: BinaryOp,
        left: ExprId,
        right: ExprId,
    },
    Unary { op: UnaryOp, operand: ExprId },
    /// `expr instanceof pattern`.
    InstanceOf { expr: ExprId, pattern: PatternId },
    /// Opaque call; only its declared result type is known.
    Call {
        callee: Name,
        args: Vec<ExprId>,
        ret: TypeRef,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

// Arena

/// Storage for one compilation unit's patterns, guard expressions and
/// pattern locals.
#[derive(Clone, Debug, Default)]
pub struct PatternArena {
    patterns: Vec<Pattern>,
    exprs: Vec<Expr>,
    locals: Vec<LocalDecl>,
}

impl PatternArena {
    pub fn new() -> Self {
        Self::default()
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "arena sizes never exceed u32"
    )]
    pub fn alloc_pattern(&mut self, pattern: Pattern) -> PatternId {
        let id = PatternId::new(self.patterns.len() as u32);
        self.patterns.push(pattern);
        id
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "arena sizes never exceed u32"
    )]
    pub fn alloc_expr(&mut self, expr: Expr) -> ExprId {
        let id = ExprId::new(self.exprs.len() as u32);
        self.exprs.push(expr);
        id
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "arena sizes never exceed u32"
    )]
    pub fn declare_local(&mut self, name: Name, span: Span) -> LocalId {
        let id = LocalId::new(self.locals.len() as u32);
        self.locals.push(LocalDecl { name, span });
        id
    }

    #[inline]
    pub fn pattern(&self, id: PatternId) -> &Pattern {
        &self.patterns[id.index()]
    }

    #[inline]
    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    #[inline]
    pub fn local(&self, id: LocalId) -> &LocalDecl {
        &self.locals[id.index()]
    }

    pub fn get_pattern(&self, id: PatternId) -> Option<&Pattern> {
        self.patterns.get(id.index())
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    pub fn expr_count(&self) -> usize {
        self.exprs.len()
    }

    pub fn local_count(&self) -> usize {
        self.locals.len()
    }

    pub fn pattern_span(&self, id: PatternId) -> Span {
        self.pattern(id).span()
    }

    pub fn expr_span(&self, id: ExprId) -> Span {
        self.expr(id).span
    }

    // Builders used by the parser (and tests).

    /// `ty name`; pass `None` for the unnamed form `ty _`.
    pub fn type_pattern(&mut self, ty: TypeRef, name: Option<(Name, Span)>) -> PatternId {
        let (local, span) = match name {
            Some((name, name_span)) => (
                Some(self.declare_local(name, name_span)),
                ty.span.to(name_span),
            ),
            None => (None, ty.span),
        };
        self.alloc_pattern(Pattern::Type(TypePattern { ty, local, span }))
    }

    pub fn record_pattern(&mut self, ty: TypeRef, components: Vec<PatternId>, span: Span) -> PatternId {
        self.alloc_pattern(Pattern::Record(RecordPattern {
            ty,
            components,
            span,
        }))
    }

    pub fn any_pattern(&mut self, span: Span) -> PatternId {
        self.alloc_pattern(Pattern::Any(AnyPattern { span }))
    }

    /// Build `patterns when condition`.
    ///
    /// The span starts at the first sub-pattern (the condition when there
    /// is none) and ends with the condition.
    pub fn guarded_pattern(
        &mut self,
        patterns: Vec<PatternId>,
        condition: ExprId,
        restricted_identifier_start: Option<u32>,
    ) -> PatternId {
        let cond_span = self.expr_span(condition);
        let span = match patterns.first() {
            Some(&first) => self.pattern_span(first).to(cond_span),
            None => cond_span,
        };
        self.alloc_pattern(Pattern::Guarded(GuardedPattern {
            patterns,
            condition,
            span,
            restricted_identifier_start,
        }))
    }

    pub fn bool_lit(&mut self, value: bool, span: Span) -> ExprId {
        self.alloc_expr(Expr {
            kind: ExprKind::Bool(value),
            span,
        })
    }

    pub fn int_lit(&mut self, value: i64, span: Span) -> ExprId {
        self.alloc_expr(Expr {
            kind: ExprKind::Int(value),
            span,
        })
    }

    pub fn ident(&mut self, name: Name, span: Span) -> ExprId {
        self.alloc_expr(Expr {
            kind: ExprKind::Ident(name),
            span,
        })
    }

    pub fn field(&mut self, receiver: ExprId, field: Name, field_span: Span) -> ExprId {
        let span = self.expr_span(receiver).to(field_span);
        self.alloc_expr(Expr {
            kind: ExprKind::Field { receiver, field },
            span,
        })
    }

    pub fn binary(&mut self, op: BinaryOp, left: ExprId, right: ExprId) -> ExprId {
        let span = self.expr_span(left).to(self.expr_span(right));
        self.alloc_expr(Expr {
            kind: ExprKind::Binary { op, left, right },
            span,
        })
    }

    pub fn unary(&mut self, op: UnaryOp, operand: ExprId, op_span: Span) -> ExprId {
        let span = op_span.to(self.expr_span(operand));
        self.alloc_expr(Expr {
            kind: ExprKind::Unary { op, operand },
            span,
        })
    }

    pub fn instance_of(&mut self, expr: ExprId, pattern: PatternId) -> ExprId {
        let span = self.expr_span(expr).to(self.pattern_span(pattern));
        self.alloc_expr(Expr {
            kind: ExprKind::InstanceOf { expr, pattern },
            span,
        })
    }

    pub fn call(&mut self, callee: Name, args: Vec<ExprId>, ret: TypeRef, span: Span) -> ExprId {
        self.alloc_expr(Expr {
            kind: ExprKind::Call { callee, args, ret },
            span,
        })
    }

    /// The single local a pattern exposes as "the" pattern variable.
    ///
    /// A guarded pattern exposes one only when it has exactly one
    /// sub-pattern, and then it is that sub-pattern's variable.
    pub fn pattern_variable(&self, id: PatternId) -> Option<LocalId> {
        match self.pattern(id) {
            Pattern::Type(p) => p.local,
            Pattern::Guarded(g) => match g.patterns.as_slice() {
                [only] => self.pattern_variable(*only),
                _ => None,
            },
            Pattern::Record(_) | Pattern::Any(_) => None,
        }
    }
}
