//! Nominal types for Kava patterns.
//!
//! Patterns only need a small slice of a type system: names that resolve to
//! declarations, subtyping, castability, boxing, record components and
//! sealed hierarchies. All of it lives in [`Pool`].

mod flags;
mod idx;
mod pool;

pub use flags::TypeFlags;
pub use idx::Idx;
pub use pool::{Pool, RecordComponent, TypeKind};
