use pretty_assertions::assert_eq;

use super::*;

/// `sealed interface Shape permits Circle, Square; record Circle(double r);
/// record Square(double side);` plus an open `interface Named` and an
/// abstract class.
struct Shapes {
    interner: StringInterner,
    pool: Pool,
    shape: Idx,
    circle: Idx,
    square: Idx,
    named: Idx,
    animal: Idx,
}

fn shapes() -> Shapes {
    let interner = StringInterner::new();
    let mut pool = Pool::new(&interner);
    let shape = pool.declare_interface(interner.intern("Shape"), &[], true);
    let r = RecordComponent {
        name: interner.intern("r"),
        ty: Idx::DOUBLE,
    };
    let side = RecordComponent {
        name: interner.intern("side"),
        ty: Idx::DOUBLE,
    };
    let circle = pool.declare_record(interner.intern("Circle"), vec![r], &[shape]);
    let square = pool.declare_record(interner.intern("Square"), vec![side], &[shape]);
    let named = pool.declare_interface(interner.intern("Named"), &[], false);
    let animal = pool.declare_class(interner.intern("Animal"), &[], TypeFlags::IS_ABSTRACT);
    Shapes {
        interner,
        pool,
        shape,
        circle,
        square,
        named,
        animal,
    }
}

#[test]
fn builtins_at_fixed_indices() {
    let interner = StringInterner::new();
    let pool = Pool::new(&interner);
    assert_eq!(pool.len(), Idx::FIRST_DYNAMIC as usize);
    assert_eq!(pool.lookup(interner.intern("int")), Some(Idx::INT));
    assert_eq!(pool.lookup(interner.intern("String")), Some(Idx::STRING));
    assert_eq!(pool.lookup(interner.intern("Boolean")), Some(Idx::BOOLEAN_BOX));
    assert_eq!(pool.lookup(interner.intern("<error>")), None);
    assert!(pool.is_primitive(Idx::CHAR));
    assert!(pool.is_error(Idx::ERROR));
    assert!(pool.is_error(Idx::NONE));
}

#[test]
fn declarations_start_after_reserved_range() {
    let s = shapes();
    assert_eq!(s.shape.raw(), Idx::FIRST_DYNAMIC);
    assert_eq!(s.pool.lookup(s.interner.intern("Circle")), Some(s.circle));
    assert_eq!(s.pool.display(s.square, &s.interner), "Square");
}

#[test]
fn subtyping_is_nominal_and_transitive() {
    let s = shapes();
    assert!(s.pool.is_subtype(s.circle, s.shape));
    assert!(s.pool.is_subtype(s.circle, Idx::OBJECT));
    assert!(s.pool.is_subtype(s.shape, Idx::OBJECT));
    assert!(!s.pool.is_subtype(s.shape, s.circle));
    assert!(!s.pool.is_subtype(s.circle, s.square));
    assert!(!s.pool.is_subtype(Idx::INT, Idx::OBJECT));
    assert!(!s.pool.is_subtype(Idx::INT, Idx::LONG));
    assert!(s.pool.is_subtype(Idx::ERROR, s.circle));
}

#[test]
fn sealed_interface_permits_declared_subtypes() {
    let s = shapes();
    assert!(s.pool.is_sealed(s.shape));
    assert!(s.pool.is_abstract(s.shape));
    assert_eq!(s.pool.permitted_subtypes(s.shape), &[s.circle, s.square]);
    assert!(s.pool.permitted_subtypes(s.named).is_empty());
}

#[test]
fn records_expose_components() {
    let s = shapes();
    let components = s.pool.record_components(s.circle);
    assert_eq!(components.len(), 1);
    assert_eq!(components[0].ty, Idx::DOUBLE);
    assert!(s.pool.is_record(s.circle));
    assert!(s.pool.is_final(s.circle));
    assert!(s.pool.record_components(s.shape).is_empty());
}

#[test]
fn boxing_round_trips_through_the_box_table() {
    let s = shapes();
    assert_eq!(s.pool.boxed(Idx::INT), Some(Idx::INTEGER_BOX));
    assert_eq!(s.pool.unboxed(Idx::BOOLEAN_BOX), Some(Idx::BOOLEAN));
    assert_eq!(s.pool.unboxed(Idx::STRING), None);
    assert!(s.pool.is_boolean(Idx::BOOLEAN_BOX));
    assert!(s.pool.is_numeric(Idx::CHARACTER_BOX));
    assert!(!s.pool.is_numeric(Idx::BOOLEAN));
}

#[test]
fn numeric_promotion_widens_to_the_larger_operand() {
    let s = shapes();
    assert_eq!(s.pool.binary_numeric_promotion(Idx::INT, Idx::CHAR), Some(Idx::INT));
    assert_eq!(s.pool.binary_numeric_promotion(Idx::INTEGER_BOX, Idx::LONG), Some(Idx::LONG));
    assert_eq!(s.pool.binary_numeric_promotion(Idx::LONG, Idx::DOUBLE_BOX), Some(Idx::DOUBLE));
    assert_eq!(s.pool.binary_numeric_promotion(Idx::BOOLEAN, Idx::INT), None);
    assert_eq!(s.pool.binary_numeric_promotion(Idx::STRING, Idx::INT), None);
}

#[test]
fn castability() {
    let s = shapes();
    // Down- and up-casts.
    assert!(s.pool.is_castable(s.shape, s.circle));
    assert!(s.pool.is_castable(s.circle, s.shape));
    // Sibling records never meet.
    assert!(!s.pool.is_castable(s.circle, s.square));
    // A final record that does not implement `Named` cannot become one.
    assert!(!s.pool.is_castable(s.circle, s.named));
    // An abstract class might have a subclass implementing `Named`.
    assert!(s.pool.is_castable(s.animal, s.named));
    // Boxing and unboxing.
    assert!(s.pool.is_castable(Idx::INT, Idx::OBJECT));
    assert!(s.pool.is_castable(Idx::OBJECT, Idx::INT));
    assert!(s.pool.is_castable(Idx::INTEGER_BOX, Idx::INT));
    assert!(!s.pool.is_castable(Idx::STRING, Idx::INT));
    assert!(!s.pool.is_castable(Idx::BOOLEAN, Idx::INT));
    assert!(s.pool.is_castable(Idx::ERROR, Idx::INT));
}
