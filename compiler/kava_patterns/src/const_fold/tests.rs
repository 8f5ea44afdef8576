use pretty_assertions::assert_eq;

use super::*;
use crate::test_support::Fixture;

#[test]
fn literals_fold() {
    let mut f = Fixture::new();
    let t = f.bool(true);
    let n = f.int(7);
    assert_eq!(optimized_boolean_constant(&f.arena, t), Constant::Bool(true));
    assert_eq!(fold(&f.arena, n), Constant::Int(7));
    // An int is a constant but not a boolean one.
    assert_eq!(optimized_boolean_constant(&f.arena, n), Constant::NotAConstant);
}

#[test]
fn names_and_calls_are_runtime_values() {
    let mut f = Fixture::new();
    let x = f.ident("x");
    let call = f.call("check", vec![], "boolean");
    assert_eq!(fold(&f.arena, x), Constant::NotAConstant);
    assert_eq!(fold(&f.arena, call), Constant::NotAConstant);
}

#[test]
fn comparisons_and_arithmetic_fold() {
    let mut f = Fixture::new();
    let two = f.int(2);
    let three = f.int(3);
    let sum = f.bin(BinaryOp::Add, two, three);
    let five = f.int(5);
    let eq = f.bin(BinaryOp::Eq, sum, five);
    assert_eq!(fold(&f.arena, sum), Constant::Int(5));
    assert!(optimized_boolean_constant(&f.arena, eq).is_true());
}

#[test]
fn overflow_and_division_by_zero_do_not_fold() {
    let mut f = Fixture::new();
    let max = f.int(i64::MAX);
    let one = f.int(1);
    let zero = f.int(0);
    let overflow = f.bin(BinaryOp::Add, max, one);
    let div = f.bin(BinaryOp::Div, one, zero);
    assert_eq!(fold(&f.arena, overflow), Constant::NotAConstant);
    assert_eq!(fold(&f.arena, div), Constant::NotAConstant);
}

#[test]
fn short_circuit_operators_fold_once_decided() {
    let mut f = Fixture::new();
    let x = f.ident("x");
    let fls = f.bool(false);
    let tru = f.bool(true);
    let and = f.bin(BinaryOp::And, x, fls);
    let or = f.bin(BinaryOp::Or, tru, x);
    let undecided = f.bin(BinaryOp::And, tru, x);

    assert!(optimized_boolean_constant(&f.arena, and).is_false());
    assert!(optimized_boolean_constant(&f.arena, or).is_true());
    assert_eq!(optimized_boolean_constant(&f.arena, undecided), Constant::NotAConstant);
}

#[test]
fn negation_folds() {
    let mut f = Fixture::new();
    let fls = f.bool(false);
    let not = f.not(fls);
    assert_eq!(optimized_boolean_constant(&f.arena, not), Constant::Bool(true));
}

#[test]
fn folded_guards_can_still_have_runtime_operands() {
    let mut f = Fixture::new();
    let call = f.call("check", vec![], "boolean");
    let fls = f.bool(false);
    let one = f.int(1);
    let two = f.int(2);
    let folded_call = f.bin(BinaryOp::And, call, fls);
    let literal_only = f.bin(BinaryOp::Lt, one, two);
    let negated = f.not(literal_only);

    assert!(optimized_boolean_constant(&f.arena, folded_call).is_false());
    assert!(has_runtime_operands(&f.arena, folded_call));
    assert!(!has_runtime_operands(&f.arena, literal_only));
    assert!(!has_runtime_operands(&f.arena, negated));
}
