//! Type index handle.
//!
//! Every type lives in the [`Pool`](crate::Pool) and is referred to by a
//! 32-bit index. Built-in types sit at fixed indices so the checker can name
//! them without a lookup.

use std::fmt;

#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct Idx(u32);

impl Idx {
    // === Primitive types ===
    pub const BOOLEAN: Self = Self(0);
    pub const INT: Self = Self(1);
    pub const LONG: Self = Self(2);
    pub const DOUBLE: Self = Self(3);
    pub const CHAR: Self = Self(4);

    // === Built-in reference types ===
    /// Root of the reference hierarchy.
    pub const OBJECT: Self = Self(5);
    pub const STRING: Self = Self(6);
    pub const BOOLEAN_BOX: Self = Self(7);
    pub const INTEGER_BOX: Self = Self(8);
    pub const LONG_BOX: Self = Self(9);
    pub const DOUBLE_BOX: Self = Self(10);
    pub const CHARACTER_BOX: Self = Self(11);

    /// Placeholder for anything that failed to resolve; propagates silently.
    pub const ERROR: Self = Self(12);

    /// Number of pre-declared types.
    pub const BUILTIN_COUNT: u32 = 13;

    /// First index handed out to user declarations. 13..32 is reserved.
    pub const FIRST_DYNAMIC: u32 = 32;

    /// Sentinel for "no type".
    pub const NONE: Self = Self(u32::MAX);

    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn is_primitive(self) -> bool {
        self.0 <= Self::CHAR.0
    }

    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == u32::MAX
    }

    #[inline]
    pub const fn is_error(self) -> bool {
        self.0 == Self::ERROR.0
    }

    /// Source name of a built-in type, `None` for declarations.
    pub const fn builtin_name(self) -> Option<&'static str> {
        match self.0 {
            0 => Some("boolean"),
            1 => Some("int"),
            2 => Some("long"),
            3 => Some("double"),
            4 => Some("char"),
            5 => Some("Object"),
            6 => Some("String"),
            7 => Some("Boolean"),
            8 => Some("Integer"),
            9 => Some("Long"),
            10 => Some("Double"),
            11 => Some("Character"),
            12 => Some("<error>"),
            _ => None,
        }
    }
}

impl fmt::Debug for Idx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            write!(f, "Idx::NONE")
        } else if let Some(name) = self.builtin_name() {
            write!(f, "Idx({name})")
        } else {
            write!(f, "Idx({})", self.0)
        }
    }
}

impl Default for Idx {
    fn default() -> Self {
        Self::NONE
    }
}
