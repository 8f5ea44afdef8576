//! Builders shared by the unit tests of this crate.

use kava_ir::{
    BinaryOp, ExprId, LocalId, Name, PatternArena, PatternId, Span, StringInterner, TypeRef,
    UnaryOp,
};
use kava_types::{Idx, Pool, RecordComponent, TypeFlags};

use crate::resolve::LocalScope;

pub(crate) struct Fixture {
    pub interner: StringInterner,
    pub pool: Pool,
    pub arena: PatternArena,
    /// Locals of the enclosing method, visible to every pattern.
    pub scope: LocalScope,
    pos: u32,
}

impl Fixture {
    pub fn new() -> Self {
        let interner = StringInterner::new();
        let pool = Pool::new(&interner);
        Fixture {
            interner,
            pool,
            arena: PatternArena::new(),
            scope: LocalScope::new(),
            pos: 0,
        }
    }

    /// Fresh, non-overlapping span of `len` bytes.
    pub fn span(&mut self, len: u32) -> Span {
        let span = Span::new(self.pos, self.pos + len);
        self.pos += len + 1;
        span
    }

    pub fn name(&self, text: &str) -> Name {
        self.interner.intern(text)
    }

    fn len_of(text: &str) -> u32 {
        u32::try_from(text.len()).unwrap_or(1)
    }

    pub fn ty(&mut self, name: &str) -> TypeRef {
        let span = self.span(Self::len_of(name));
        TypeRef::named(self.name(name), span)
    }

    // Declarations

    pub fn record_type(&mut self, name: &str, components: &[(&str, Idx)], interfaces: &[Idx]) -> Idx {
        let components = components
            .iter()
            .map(|&(n, ty)| RecordComponent {
                name: self.name(n),
                ty,
            })
            .collect();
        let name = self.name(name);
        self.pool.declare_record(name, components, interfaces)
    }

    pub fn interface(&mut self, name: &str, sealed: bool) -> Idx {
        let name = self.name(name);
        self.pool.declare_interface(name, &[], sealed)
    }

    pub fn class(&mut self, name: &str, supertypes: &[Idx], flags: TypeFlags) -> Idx {
        let name = self.name(name);
        self.pool.declare_class(name, supertypes, flags)
    }

    /// `record Point(int x, int y)`.
    pub fn point(&mut self) -> Idx {
        self.record_type("Point", &[("x", Idx::INT), ("y", Idx::INT)], &[])
    }

    /// A local of the enclosing method, definitely assigned on entry.
    pub fn local(&mut self, name: &str, ty: Idx) -> LocalId {
        let span = self.span(Self::len_of(name));
        let name = self.name(name);
        let local = self.arena.declare_local(name, span);
        self.scope.declare(name, local, ty);
        local
    }

    // Patterns

    /// `ty var`
    pub fn bind(&mut self, ty: &str, var: &str) -> PatternId {
        let ty = self.ty(ty);
        let span = self.span(Self::len_of(var));
        let name = self.name(var);
        self.arena.type_pattern(ty, Some((name, span)))
    }

    /// `var name`
    pub fn var(&mut self, var: &str) -> PatternId {
        let ty = TypeRef::var(self.span(3));
        let span = self.span(Self::len_of(var));
        let name = self.name(var);
        self.arena.type_pattern(ty, Some((name, span)))
    }

    /// `ty _`
    pub fn unnamed(&mut self, ty: &str) -> PatternId {
        let ty = self.ty(ty);
        self.arena.type_pattern(ty, None)
    }

    pub fn any(&mut self) -> PatternId {
        let span = self.span(1);
        self.arena.any_pattern(span)
    }

    pub fn record(&mut self, ty: &str, components: Vec<PatternId>) -> PatternId {
        let ty = self.ty(ty);
        let end = self.span(1);
        self.arena.record_pattern(ty, components, ty.span.to(end))
    }

    pub fn guarded(&mut self, patterns: Vec<PatternId>, condition: ExprId) -> PatternId {
        let when = self.span(4);
        self.arena
            .guarded_pattern(patterns, condition, Some(when.start))
    }

    // Guard expressions

    pub fn bool(&mut self, value: bool) -> ExprId {
        let span = self.span(if value { 4 } else { 5 });
        self.arena.bool_lit(value, span)
    }

    pub fn int(&mut self, value: i64) -> ExprId {
        let span = self.span(1);
        self.arena.int_lit(value, span)
    }

    pub fn ident(&mut self, name: &str) -> ExprId {
        let span = self.span(Self::len_of(name));
        let name = self.name(name);
        self.arena.ident(name, span)
    }

    pub fn field(&mut self, receiver: ExprId, field: &str) -> ExprId {
        let span = self.span(Self::len_of(field));
        let name = self.name(field);
        self.arena.field(receiver, name, span)
    }

    pub fn bin(&mut self, op: BinaryOp, left: ExprId, right: ExprId) -> ExprId {
        self.arena.binary(op, left, right)
    }

    pub fn not(&mut self, operand: ExprId) -> ExprId {
        let span = self.span(1);
        self.arena.unary(UnaryOp::Not, operand, span)
    }

    pub fn instance_of(&mut self, expr: ExprId, pattern: PatternId) -> ExprId {
        self.arena.instance_of(expr, pattern)
    }

    pub fn call(&mut self, callee: &str, args: Vec<ExprId>, ret: &str) -> ExprId {
        let span = self.span(Self::len_of(callee) + 2);
        let ret = self.ty(ret);
        let callee = self.name(callee);
        self.arena.call(callee, args, ret, span)
    }
}
