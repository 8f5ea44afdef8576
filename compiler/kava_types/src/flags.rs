use bitflags::bitflags;

bitflags! {
    /// Properties fixed when a type is declared.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct TypeFlags: u16 {
        const IS_PRIMITIVE = 1 << 0;
        const IS_RECORD = 1 << 1;
        const IS_INTERFACE = 1 << 2;
        /// Subtypes are closed: exactly the declared direct subtypes exist.
        const IS_SEALED = 1 << 3;
        const IS_FINAL = 1 << 4;
        /// No direct instances (interfaces, abstract classes).
        const IS_ABSTRACT = 1 << 5;
        /// A wrapper of a primitive (`Integer`, `Boolean`, ...).
        const IS_BOXED = 1 << 6;
        const IS_ERROR = 1 << 7;
    }
}

impl TypeFlags {
    /// Flags a declaration may set itself; the rest are derived.
    pub const DECLARABLE: Self = Self::IS_SEALED
        .union(Self::IS_FINAL)
        .union(Self::IS_ABSTRACT);
}
