use super::*;

/// Models a chain of nested record patterns: `depth` levels of `Box(...)`.
enum Nested {
    Leaf,
    Boxed(Box<Nested>),
}

fn build(depth: usize) -> Nested {
    let mut node = Nested::Leaf;
    for _ in 0..depth {
        node = Nested::Boxed(Box::new(node));
    }
    node
}

fn depth_of(node: &Nested) -> usize {
    ensure_sufficient_stack(|| match node {
        Nested::Leaf => 0,
        Nested::Boxed(inner) => depth_of(inner) + 1,
    })
}

fn unwind(node: Nested) {
    let mut node = node;
    while let Nested::Boxed(inner) = node {
        node = *inner;
    }
}

#[test]
fn shallow_nesting() {
    let tree = build(8);
    assert_eq!(depth_of(&tree), 8);
    unwind(tree);
}

#[test]
fn deep_nesting_does_not_overflow() {
    let tree = build(100_000);
    assert_eq!(depth_of(&tree), 100_000);
    unwind(tree);
}

#[test]
fn passes_result_through() {
    let result: Result<u32, &str> = ensure_sufficient_stack(|| Ok(7));
    assert_eq!(result, Ok(7));
}
