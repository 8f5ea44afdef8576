//! Syntax for patterns and pattern guards.
//!
//! Patterns, guard expressions and the locals patterns declare live in one
//! [`PatternArena`] per compilation unit and are addressed by id. Strings
//! are interned through a shared [`StringInterner`].

mod ast;
mod interner;
mod name;
pub mod print;
mod span;
pub mod visitor;

pub use ast::{
    AnyPattern, BinaryOp, Expr, ExprId, ExprKind, GuardedPattern, LocalDecl, LocalId, Pattern,
    PatternArena, PatternId, RecordPattern, TypePattern, TypeRef, TypeRefKind, UnaryOp,
};
pub use interner::StringInterner;
pub use name::Name;
pub use span::Span;
