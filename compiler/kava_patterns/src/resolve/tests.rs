use kava_diagnostic::DiagnosticConfig;
use pretty_assertions::assert_eq;

use super::*;
use crate::test_support::Fixture;

struct Resolved {
    table: ResolvedPatterns,
    codes: Vec<ErrorCode>,
}

fn resolve(f: &Fixture, pattern: PatternId, expected: Idx) -> Resolved {
    resolve_times(f, pattern, expected, 1)
}

fn resolve_times(f: &Fixture, pattern: PatternId, expected: Idx, times: usize) -> Resolved {
    let mut diagnostics = DiagnosticQueue::with_config(DiagnosticConfig::unlimited());
    let mut table = ResolvedPatterns::new();
    let mut resolver = Resolver::new(&f.arena, &f.pool, &f.interner, &mut diagnostics, &mut table);
    for _ in 0..times {
        resolver.resolve_pattern(pattern, expected, &f.scope);
    }
    let codes = diagnostics.flush().into_iter().map(|d| d.code).collect();
    Resolved { table, codes }
}

#[test]
fn guard_sees_pattern_bindings() {
    // p instanceof Point(int x, int y) when x > 0
    let mut f = Fixture::new();
    f.point();
    let x = f.bind("int", "x");
    let y = f.bind("int", "y");
    let point = f.record("Point", vec![x, y]);
    let x_ref = f.ident("x");
    let zero = f.int(0);
    let cond = f.bin(BinaryOp::Gt, x_ref, zero);
    let guarded = f.guarded(vec![point], cond);

    let r = resolve(&f, guarded, Idx::OBJECT);
    assert_eq!(r.codes, vec![]);
    let point_ty = f.pool.lookup(f.name("Point"));
    assert_eq!(r.table.pattern_type(guarded), point_ty);
    assert_eq!(r.table.expr_type(cond), Some(Idx::BOOLEAN));
    assert_eq!(r.table.local_of(x_ref), f.arena.pattern_variable(x));
    assert!(r.table
        .name_flags(x_ref)
        .contains(NameFlags::USED_IN_PATTERN_GUARD));
    // Literals are not names.
    assert_eq!(r.table.name_flags(zero), NameFlags::empty());
}

#[test]
fn constant_false_guard_reported_once() {
    let mut f = Fixture::new();
    let s = f.bind("String", "s");
    let cond = f.bool(false);
    let guarded = f.guarded(vec![s], cond);

    let r = resolve_times(&f, guarded, Idx::OBJECT, 3);
    assert_eq!(r.codes, vec![ErrorCode::E3001]);
}

#[test]
fn unresolved_first_sub_pattern_types_the_whole_pattern() {
    let mut f = Fixture::new();
    let bad = f.bind("Missing", "m");
    let ok = f.bind("String", "s");
    let cond = f.ident("nowhere");
    let guarded = f.guarded(vec![bad, ok], cond);

    let r = resolve(&f, guarded, Idx::OBJECT);
    assert_eq!(r.table.pattern_type(guarded), Some(Idx::ERROR));
    assert_eq!(r.table.pattern_type(ok), Some(Idx::STRING));
    // The guard is still resolved and its own error surfaces.
    assert_eq!(r.codes, vec![ErrorCode::E2002, ErrorCode::E2003]);
}

#[test]
fn non_boolean_guard_is_rejected() {
    let mut f = Fixture::new();
    let s = f.bind("String", "s");
    let cond = f.int(1);
    let guarded = f.guarded(vec![s], cond);
    let r = resolve(&f, guarded, Idx::OBJECT);
    assert_eq!(r.codes, vec![ErrorCode::E2001]);
}

#[test]
fn boxed_boolean_guard_is_unboxed() {
    let mut f = Fixture::new();
    f.local("flag", Idx::BOOLEAN_BOX);
    let s = f.bind("String", "s");
    let cond = f.ident("flag");
    let guarded = f.guarded(vec![s], cond);

    let r = resolve(&f, guarded, Idx::OBJECT);
    assert_eq!(r.codes, vec![]);
    assert_eq!(r.table.conversion(cond), Some(ImplicitConversion::Unbox));
    // Enclosing locals are tagged too.
    assert!(r.table
        .name_flags(cond)
        .contains(NameFlags::USED_IN_PATTERN_GUARD));
}

#[test]
fn numeric_comparison_records_promotions() {
    // Integer i when i > limit, with `long limit`
    let mut f = Fixture::new();
    f.local("limit", Idx::LONG);
    let i = f.bind("Integer", "i");
    let i_ref = f.ident("i");
    let limit = f.ident("limit");
    let cond = f.bin(BinaryOp::Gt, i_ref, limit);
    let guarded = f.guarded(vec![i], cond);

    let r = resolve(&f, guarded, Idx::OBJECT);
    assert_eq!(r.codes, vec![]);
    assert_eq!(
        r.table.conversion(i_ref),
        Some(ImplicitConversion::UnboxAndWiden(Idx::LONG))
    );
    assert_eq!(r.table.conversion(limit), None);
}

#[test]
fn logical_operators_require_booleans() {
    let mut f = Fixture::new();
    let s = f.bind("String", "s");
    let one = f.int(1);
    let tru = f.bool(true);
    let cond = f.bin(BinaryOp::And, one, tru);
    let guarded = f.guarded(vec![s], cond);
    let r = resolve(&f, guarded, Idx::OBJECT);
    assert_eq!(r.codes, vec![ErrorCode::E2004]);
}

#[test]
fn conjunction_right_operand_sees_instanceof_binding() {
    // String s when o instanceof Integer n && n > 0
    let mut f = Fixture::new();
    f.local("o", Idx::OBJECT);
    let s = f.bind("String", "s");
    let o = f.ident("o");
    let n = f.bind("Integer", "n");
    let test = f.instance_of(o, n);
    let n_ref = f.ident("n");
    let zero = f.int(0);
    let positive = f.bin(BinaryOp::Gt, n_ref, zero);
    let cond = f.bin(BinaryOp::And, test, positive);
    let guarded = f.guarded(vec![s], cond);

    let r = resolve(&f, guarded, Idx::OBJECT);
    assert_eq!(r.codes, vec![]);
    assert_eq!(r.table.local_of(n_ref), f.arena.pattern_variable(n));
}

#[test]
fn record_pattern_errors() {
    let mut f = Fixture::new();
    f.point();
    let x = f.bind("int", "x");
    let short = f.record("Point", vec![x]);
    let r = resolve(&f, short, Idx::OBJECT);
    assert_eq!(r.codes, vec![ErrorCode::E3004]);

    let s = f.bind("int", "s");
    let not_record = f.record("String", vec![s]);
    let r = resolve(&f, not_record, Idx::OBJECT);
    assert_eq!(r.codes, vec![ErrorCode::E3003]);
    assert_eq!(r.table.pattern_type(not_record), Some(Idx::ERROR));
}

#[test]
fn incompatible_pattern_type_is_reported() {
    let mut f = Fixture::new();
    let i = f.bind("Integer", "i");
    let r = resolve(&f, i, Idx::STRING);
    assert_eq!(r.codes, vec![ErrorCode::E3002]);
}

#[test]
fn compatibility_of_guarded_pattern_is_its_first_sub_pattern() {
    let mut f = Fixture::new();
    let i = f.bind("Integer", "i");
    let cond = f.bool(true);
    let guarded = f.guarded(vec![i], cond);

    let mut diagnostics = DiagnosticQueue::with_config(DiagnosticConfig::unlimited());
    let mut table = ResolvedPatterns::new();
    let mut resolver = Resolver::new(&f.arena, &f.pool, &f.interner, &mut diagnostics, &mut table);
    resolver.resolve_pattern(guarded, Idx::OBJECT, &f.scope);
    assert!(resolver.is_pattern_type_compatible(guarded, Idx::OBJECT));
    assert!(!resolver.is_pattern_type_compatible(guarded, Idx::STRING));
}

#[test]
fn records_in_guard_are_owned_by_the_guarded_pattern() {
    // String s when o instanceof Box(Box(var v))
    let mut f = Fixture::new();
    let box_ty = f.record_type("Box", &[("value", Idx::OBJECT)], &[]);
    assert!(!box_ty.is_none());
    f.local("o", Idx::OBJECT);
    let s = f.bind("String", "s");
    let v = f.var("v");
    let inner = f.record("Box", vec![v]);
    let outer = f.record("Box", vec![inner]);
    let o = f.ident("o");
    let cond = f.instance_of(o, outer);
    let guarded = f.guarded(vec![s], cond);

    let r = resolve(&f, guarded, Idx::OBJECT);
    assert_eq!(r.codes, vec![]);
    assert_eq!(r.table.guarded_else_owner(outer), Some(guarded));
    assert_eq!(r.table.guarded_else_owner(inner), Some(guarded));
    assert_eq!(r.table.records_owned_by(guarded), vec![inner, outer]);
    let v_local = f.arena.pattern_variable(v);
    assert_eq!(v_local.and_then(|l| r.table.local_type(l)), Some(Idx::OBJECT));

    // String s when o instanceof (Box(var w) when o instanceof Box(var v))
    let mut f = Fixture::new();
    f.record_type("Box", &[("value", Idx::OBJECT)], &[]);
    f.local("o", Idx::OBJECT);
    let s = f.bind("String", "s");
    let w = f.var("w");
    let box_w = f.record("Box", vec![w]);
    let v = f.var("v");
    let box_v = f.record("Box", vec![v]);
    let o = f.ident("o");
    let inner_cond = f.instance_of(o, box_v);
    let inner = f.guarded(vec![box_w], inner_cond);
    let o = f.ident("o");
    let cond = f.instance_of(o, inner);
    let outer = f.guarded(vec![s], cond);

    let r = resolve(&f, outer, Idx::OBJECT);
    assert_eq!(r.codes, vec![]);
    assert_eq!(r.table.guarded_else_owner(box_v), Some(inner));
    assert_eq!(r.table.guarded_else_owner(box_w), Some(outer));
    assert_eq!(r.table.records_owned_by(inner), vec![box_v]);
}

#[test]
fn field_access_on_bound_record_is_tagged() {
    // Point pt when pt.x > 0
    let mut f = Fixture::new();
    f.point();
    let pt = f.bind("Point", "pt");
    let pt_ref = f.ident("pt");
    let x = f.field(pt_ref, "x");
    let zero = f.int(0);
    let cond = f.bin(BinaryOp::Gt, x, zero);
    let guarded = f.guarded(vec![pt], cond);

    let r = resolve(&f, guarded, Idx::OBJECT);
    assert_eq!(r.codes, vec![]);
    assert_eq!(r.table.expr_type(x), Some(Idx::INT));
    assert!(r.table.name_flags(x).contains(NameFlags::USED_IN_PATTERN_GUARD));
    assert!(r.table.name_flags(pt_ref).contains(NameFlags::USED_IN_PATTERN_GUARD));
}
