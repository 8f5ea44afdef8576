use kava_diagnostic::DiagnosticConfig;
use kava_ir::BinaryOp;
use kava_types::TypeFlags;
use pretty_assertions::assert_eq;

use super::*;
use crate::resolve::Resolver;
use crate::test_support::Fixture;

struct Checked {
    report: SwitchReport,
    codes: Vec<ErrorCode>,
}

fn check(f: &mut Fixture, cases: &[PatternId], selector_ty: Idx) -> Checked {
    let span = f.span(6);
    let mut diagnostics = DiagnosticQueue::with_config(DiagnosticConfig::unlimited());
    let mut resolved = ResolvedPatterns::new();
    let mut resolver = Resolver::new(&f.arena, &f.pool, &f.interner, &mut diagnostics, &mut resolved);
    for &case in cases {
        resolver.resolve_pattern(case, selector_ty, &f.scope);
    }
    let mut switch_diags = DiagnosticQueue::with_config(DiagnosticConfig::unlimited());
    let report = SwitchChecker::new(&f.arena, &f.pool, &f.interner, &resolved).check(
        cases,
        selector_ty,
        span,
        &mut switch_diags,
    );
    let codes = switch_diags.flush().into_iter().map(|d| d.code).collect();
    Checked { report, codes }
}

/// `sealed interface Shape permits Circle, Square`
fn shapes(f: &mut Fixture) -> Idx {
    let shape = f.interface("Shape", true);
    f.record_type("Circle", &[("r", Idx::DOUBLE)], &[shape]);
    f.record_type("Square", &[("side", Idx::DOUBLE)], &[shape]);
    shape
}

fn circle(f: &mut Fixture) -> PatternId {
    let r = f.var("r");
    f.record("Circle", vec![r])
}

fn square(f: &mut Fixture) -> PatternId {
    let side = f.var("side");
    f.record("Square", vec![side])
}

#[test]
fn sealed_hierarchy_is_covered_by_its_subtypes() {
    let mut f = Fixture::new();
    let shape = shapes(&mut f);
    let c = circle(&mut f);
    let s = square(&mut f);
    let checked = check(&mut f, &[c, s], shape);
    assert!(checked.report.exhaustive);
    assert_eq!(checked.codes, vec![]);
}

#[test]
fn missing_subtype_is_reported() {
    let mut f = Fixture::new();
    let shape = shapes(&mut f);
    let c = circle(&mut f);
    let checked = check(&mut f, &[c], shape);
    assert!(!checked.report.exhaustive);
    assert_eq!(checked.codes, vec![ErrorCode::E3006]);
}

#[test]
fn guarded_case_only_covers_with_vacuous_guard() {
    let mut f = Fixture::new();
    let shape = shapes(&mut f);
    let c = circle(&mut f);

    let side = f.var("side");
    let square_pattern = f.record("Square", vec![side]);
    let side_ref = f.ident("side");
    let zero = f.int(0);
    let positive = f.bin(BinaryOp::Gt, side_ref, zero);
    let guarded = f.guarded(vec![square_pattern], positive);
    let checked = check(&mut f, &[c, guarded], shape);
    assert!(!checked.report.exhaustive);

    let mut f = Fixture::new();
    let shape = shapes(&mut f);
    let c = circle(&mut f);
    let s = square(&mut f);
    let yes = f.bool(true);
    let guarded = f.guarded(vec![s], yes);
    let checked = check(&mut f, &[c, guarded], shape);
    assert!(checked.report.exhaustive);
}

#[test]
fn earlier_supertype_dominates_later_case() {
    let mut f = Fixture::new();
    let o = f.bind("Object", "o");
    let s = f.bind("String", "s");
    let checked = check(&mut f, &[o, s], Idx::OBJECT);
    assert_eq!(
        checked.report.dominated,
        vec![DominatedCase { case: 1, by: 0 }]
    );
    assert_eq!(checked.codes, vec![ErrorCode::E3005]);
    assert!(checked.report.exhaustive);
}

#[test]
fn guarded_case_after_its_unguarded_form_is_dominated() {
    let mut f = Fixture::new();
    let s = f.bind("String", "s");
    let t = f.bind("String", "t");
    let t_ref = f.ident("t");
    let len = f.call("length", vec![t_ref], "int");
    let zero = f.int(0);
    let cond = f.bin(BinaryOp::Gt, len, zero);
    let guarded = f.guarded(vec![t], cond);
    let checked = check(&mut f, &[s, guarded], Idx::STRING);
    assert_eq!(
        checked.report.dominated,
        vec![DominatedCase { case: 1, by: 0 }]
    );
}

#[test]
fn non_constant_guard_does_not_dominate() {
    let mut f = Fixture::new();
    let t = f.bind("String", "t");
    let t_ref = f.ident("t");
    let len = f.call("length", vec![t_ref], "int");
    let zero = f.int(0);
    let cond = f.bin(BinaryOp::Gt, len, zero);
    let guarded = f.guarded(vec![t], cond);
    let s = f.bind("String", "s");
    let checked = check(&mut f, &[guarded, s], Idx::STRING);
    assert_eq!(checked.report.dominated, vec![]);
    assert!(checked.report.exhaustive);
}

#[test]
fn nested_records_need_every_combination() {
    // record Pair(Shape a, Shape b)
    let mut f = Fixture::new();
    let shape = shapes(&mut f);
    let pair = f.record_type("Pair", &[("a", shape), ("b", shape)], &[]);

    let c = circle(&mut f);
    let b1 = f.var("b");
    let first = f.record("Pair", vec![c, b1]);
    let s = square(&mut f);
    let b2 = f.var("b");
    let second = f.record("Pair", vec![s, b2]);
    let checked = check(&mut f, &[first, second], pair);
    assert!(checked.report.exhaustive);

    let mut f = Fixture::new();
    let shape = shapes(&mut f);
    let pair = f.record_type("Pair", &[("a", shape), ("b", shape)], &[]);
    let c = circle(&mut f);
    let b1 = f.var("b");
    let first = f.record("Pair", vec![c, b1]);
    let a = f.var("a");
    let s = square(&mut f);
    let second = f.record("Pair", vec![a, s]);
    let checked = check(&mut f, &[first, second], pair);
    // Pair(Square, Circle) escapes both cases.
    assert!(!checked.report.exhaustive);
}

#[test]
fn unsealed_interface_needs_a_catch_all() {
    let mut f = Fixture::new();
    let open = f.interface("Named", false);
    f.record_type("Person", &[("name", Idx::STRING)], &[open]);
    let n = f.var("name");
    let person = f.record("Person", vec![n]);
    let checked = check(&mut f, &[person], open);
    assert!(!checked.report.exhaustive);

    let mut f = Fixture::new();
    let open = f.interface("Named", false);
    let any = f.bind("Named", "n");
    let checked = check(&mut f, &[any], open);
    assert!(checked.report.exhaustive);
}

#[test]
fn sealed_class_splits_only_when_abstract() {
    // sealed abstract class Vehicle permits Car, Bike
    let mut f = Fixture::new();
    let vehicle = f.class("Vehicle", &[], TypeFlags::IS_SEALED | TypeFlags::IS_ABSTRACT);
    f.class("Car", &[vehicle], TypeFlags::IS_FINAL);
    f.class("Bike", &[vehicle], TypeFlags::IS_FINAL);
    let car = f.bind("Car", "c");
    let bike = f.bind("Bike", "b");
    let checked = check(&mut f, &[car, bike], vehicle);
    assert!(checked.report.exhaustive);
    assert_eq!(checked.codes, vec![]);

    // sealed class Animal permits Dog: an Animal itself may be matched
    let mut f = Fixture::new();
    let animal = f.class("Animal", &[], TypeFlags::IS_SEALED);
    f.class("Dog", &[animal], TypeFlags::IS_FINAL);
    let dog = f.bind("Dog", "d");
    let checked = check(&mut f, &[dog], animal);
    assert!(!checked.report.exhaustive);
    assert_eq!(checked.codes, vec![ErrorCode::E3006]);
}

#[test]
fn error_selector_is_not_reported() {
    let mut f = Fixture::new();
    let s = f.bind("String", "s");
    let checked = check(&mut f, &[s], Idx::ERROR);
    assert!(checked.report.exhaustive);
    assert_eq!(checked.codes, vec![]);
}
