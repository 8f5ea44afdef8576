use pretty_assertions::assert_eq;

use super::*;
use crate::ast::UnaryOp;
use crate::Span;

struct Fixture {
    interner: StringInterner,
    arena: PatternArena,
}

impl Fixture {
    fn new() -> Self {
        Fixture {
            interner: StringInterner::new(),
            arena: PatternArena::new(),
        }
    }

    fn ty(&self, name: &str) -> TypeRef {
        TypeRef::named(self.interner.intern(name), Span::DUMMY)
    }

    fn bind(&mut self, ty: &str, var: &str) -> PatternId {
        let ty = self.ty(ty);
        let name = self.interner.intern(var);
        self.arena.type_pattern(ty, Some((name, Span::DUMMY)))
    }

    fn ident(&mut self, name: &str) -> ExprId {
        let name = self.interner.intern(name);
        self.arena.ident(name, Span::DUMMY)
    }
}

#[test]
fn guarded_pattern_lists_sub_patterns_then_guard() {
    let mut f = Fixture::new();
    let s = f.bind("String", "s");
    let i = f.bind("Integer", "i");
    let cond = f.arena.bool_lit(true, Span::DUMMY);
    let g = f.arena.guarded_pattern(vec![s, i], cond, None);
    assert_eq!(print_pattern(&f.arena, &f.interner, g), "String s, Integer i when true");
}

#[test]
fn record_and_unnamed_patterns() {
    let mut f = Fixture::new();
    let x = f.bind("int", "x");
    let any = f.arena.any_pattern(Span::DUMMY);
    let ty = f.ty("Point");
    let record = f.arena.record_pattern(ty, vec![x, any], Span::DUMMY);
    assert_eq!(print_pattern(&f.arena, &f.interner, record), "Point(int x, _)");

    let var = f.arena.type_pattern(TypeRef::var(Span::DUMMY), None);
    assert_eq!(print_pattern(&f.arena, &f.interner, var), "var _");
}

#[test]
fn parentheses_follow_precedence() {
    let mut f = Fixture::new();
    let a = f.ident("a");
    let b = f.ident("b");
    let c = f.ident("c");
    let or = f.arena.binary(BinaryOp::Or, a, b);
    let and = f.arena.binary(BinaryOp::And, or, c);
    assert_eq!(print_expr(&f.arena, &f.interner, and), "(a || b) && c");

    let not = f.arena.unary(UnaryOp::Not, and, Span::DUMMY);
    assert_eq!(print_expr(&f.arena, &f.interner, not), "!((a || b) && c)");
}

#[test]
fn field_access_and_instanceof() {
    let mut f = Fixture::new();
    let p = f.ident("p");
    let field = f.interner.intern("x");
    let px = f.arena.field(p, field, Span::DUMMY);
    let zero = f.arena.int_lit(0, Span::DUMMY);
    let gt = f.arena.binary(BinaryOp::Gt, px, zero);
    assert_eq!(print_expr(&f.arena, &f.interner, gt), "p.x > 0");

    let o = f.ident("o");
    let s = f.bind("String", "s");
    let test = f.arena.instance_of(o, s);
    assert_eq!(print_expr(&f.arena, &f.interner, test), "o instanceof String s");
}
