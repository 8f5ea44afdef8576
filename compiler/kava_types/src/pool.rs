//! The type pool: built-ins plus the unit's class, interface and record
//! declarations.
//!
//! Declarations are append-only. A sealed type's permitted subtypes are the
//! direct subtypes declared against it, so a hierarchy must be declared
//! top-down.

use kava_ir::{Name, StringInterner};
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use crate::{Idx, TypeFlags};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeKind {
    Primitive,
    Class,
    Interface,
    Record,
    Error,
    /// Unused slot in the reserved range.
    Reserved,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecordComponent {
    pub name: Name,
    pub ty: Idx,
}

#[derive(Clone, Debug)]
struct TypeEntry {
    name: Name,
    kind: TypeKind,
    flags: TypeFlags,
    supertypes: SmallVec<[Idx; 2]>,
    /// Direct subtypes, in declaration order.
    subtypes: Vec<Idx>,
    components: Vec<RecordComponent>,
}

impl TypeEntry {
    fn new(name: Name, kind: TypeKind, flags: TypeFlags) -> Self {
        TypeEntry {
            name,
            kind,
            flags,
            supertypes: SmallVec::new(),
            subtypes: Vec::new(),
            components: Vec::new(),
        }
    }
}

pub struct Pool {
    entries: Vec<TypeEntry>,
    by_name: FxHashMap<Name, Idx>,
    /// `(primitive, box)` pairs.
    boxes: [(Idx, Idx); 5],
}

impl Pool {
    /// Create a pool holding the built-in types, their names interned in
    /// `interner`.
    pub fn new(interner: &StringInterner) -> Self {
        let mut pool = Pool {
            entries: Vec::with_capacity(Idx::FIRST_DYNAMIC as usize + 16),
            by_name: FxHashMap::default(),
            boxes: [
                (Idx::BOOLEAN, Idx::BOOLEAN_BOX),
                (Idx::INT, Idx::INTEGER_BOX),
                (Idx::LONG, Idx::LONG_BOX),
                (Idx::DOUBLE, Idx::DOUBLE_BOX),
                (Idx::CHAR, Idx::CHARACTER_BOX),
            ],
        };

        for raw in 0..Idx::FIRST_DYNAMIC {
            let idx = Idx::from_raw(raw);
            let Some(text) = idx.builtin_name() else {
                pool.entries
                    .push(TypeEntry::new(Name::EMPTY, TypeKind::Reserved, TypeFlags::empty()));
                continue;
            };
            let name = interner.intern(text);
            let entry = if idx.is_primitive() {
                TypeEntry::new(name, TypeKind::Primitive, TypeFlags::IS_PRIMITIVE | TypeFlags::IS_FINAL)
            } else if idx.is_error() {
                TypeEntry::new(name, TypeKind::Error, TypeFlags::IS_ERROR)
            } else if idx == Idx::OBJECT {
                TypeEntry::new(name, TypeKind::Class, TypeFlags::empty())
            } else {
                let mut flags = TypeFlags::IS_FINAL;
                if idx != Idx::STRING {
                    flags |= TypeFlags::IS_BOXED;
                }
                let mut entry = TypeEntry::new(name, TypeKind::Class, flags);
                entry.supertypes.push(Idx::OBJECT);
                entry
            };
            pool.entries.push(entry);
            if !idx.is_error() {
                pool.by_name.insert(name, idx);
            }
        }
        pool
    }

    /// Total number of slots, reserved ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "type counts never exceed u32"
    )]
    fn push(&mut self, entry: TypeEntry) -> Idx {
        let idx = Idx::from_raw(self.entries.len() as u32);
        for &sup in &entry.supertypes {
            if let Some(parent) = self.entries.get_mut(sup.index()) {
                parent.subtypes.push(idx);
            }
        }
        self.by_name.insert(entry.name, idx);
        tracing::trace!(?idx, kind = ?entry.kind, flags = ?entry.flags, "declared type");
        self.entries.push(entry);
        idx
    }

    fn with_supertypes(mut entry: TypeEntry, supertypes: &[Idx]) -> TypeEntry {
        entry.supertypes.extend(supertypes.iter().copied());
        if entry.supertypes.is_empty() {
            entry.supertypes.push(Idx::OBJECT);
        }
        entry
    }

    /// Declare a class. `flags` may carry `IS_SEALED`, `IS_FINAL` and
    /// `IS_ABSTRACT`; other bits are ignored.
    pub fn declare_class(&mut self, name: Name, supertypes: &[Idx], flags: TypeFlags) -> Idx {
        let entry = TypeEntry::new(name, TypeKind::Class, flags & TypeFlags::DECLARABLE);
        self.push(Self::with_supertypes(entry, supertypes))
    }

    /// Declare an interface; it is always abstract.
    pub fn declare_interface(&mut self, name: Name, supertypes: &[Idx], sealed: bool) -> Idx {
        let mut flags = TypeFlags::IS_INTERFACE | TypeFlags::IS_ABSTRACT;
        if sealed {
            flags |= TypeFlags::IS_SEALED;
        }
        let entry = TypeEntry::new(name, TypeKind::Interface, flags);
        self.push(Self::with_supertypes(entry, supertypes))
    }

    /// Declare a record. Records are final and implement `interfaces`.
    pub fn declare_record(
        &mut self,
        name: Name,
        components: Vec<RecordComponent>,
        interfaces: &[Idx],
    ) -> Idx {
        let mut entry = TypeEntry::new(name, TypeKind::Record, TypeFlags::IS_RECORD | TypeFlags::IS_FINAL);
        entry.components = components;
        self.push(Self::with_supertypes(entry, interfaces))
    }

    fn entry(&self, idx: Idx) -> Option<&TypeEntry> {
        self.entries.get(idx.index())
    }

    pub fn lookup(&self, name: Name) -> Option<Idx> {
        self.by_name.get(&name).copied()
    }

    pub fn name(&self, idx: Idx) -> Name {
        self.entry(idx).map_or(Name::EMPTY, |e| e.name)
    }

    pub fn kind(&self, idx: Idx) -> TypeKind {
        self.entry(idx).map_or(TypeKind::Error, |e| e.kind)
    }

    pub fn flags(&self, idx: Idx) -> TypeFlags {
        self.entry(idx).map_or(TypeFlags::IS_ERROR, |e| e.flags)
    }

    /// `true` for `ERROR`, `NONE` and anything outside the pool.
    pub fn is_error(&self, idx: Idx) -> bool {
        self.flags(idx).contains(TypeFlags::IS_ERROR)
    }

    pub fn is_primitive(&self, idx: Idx) -> bool {
        self.flags(idx).contains(TypeFlags::IS_PRIMITIVE)
    }

    pub fn is_record(&self, idx: Idx) -> bool {
        self.kind(idx) == TypeKind::Record
    }

    pub fn is_sealed(&self, idx: Idx) -> bool {
        self.flags(idx).contains(TypeFlags::IS_SEALED)
    }

    pub fn is_abstract(&self, idx: Idx) -> bool {
        self.flags(idx).contains(TypeFlags::IS_ABSTRACT)
    }

    pub fn is_final(&self, idx: Idx) -> bool {
        self.flags(idx).contains(TypeFlags::IS_FINAL)
    }

    pub fn is_interface(&self, idx: Idx) -> bool {
        self.flags(idx).contains(TypeFlags::IS_INTERFACE)
    }

    pub fn record_components(&self, idx: Idx) -> &[RecordComponent] {
        self.entry(idx).map_or(&[], |e| e.components.as_slice())
    }

    /// Permitted direct subtypes of a sealed type; empty for anything else.
    pub fn permitted_subtypes(&self, idx: Idx) -> &[Idx] {
        match self.entry(idx) {
            Some(e) if e.flags.contains(TypeFlags::IS_SEALED) => &e.subtypes,
            _ => &[],
        }
    }

    pub fn boxed(&self, idx: Idx) -> Option<Idx> {
        self.boxes.iter().find(|(p, _)| *p == idx).map(|&(_, b)| b)
    }

    pub fn unboxed(&self, idx: Idx) -> Option<Idx> {
        self.boxes.iter().find(|(_, b)| *b == idx).map(|&(p, _)| p)
    }

    /// The primitive behind `idx`, unboxing if needed.
    pub fn as_primitive(&self, idx: Idx) -> Option<Idx> {
        if self.is_primitive(idx) {
            Some(idx)
        } else {
            self.unboxed(idx)
        }
    }

    /// Numeric after unboxing (`char` counts).
    pub fn is_numeric(&self, idx: Idx) -> bool {
        matches!(
            self.as_primitive(idx),
            Some(Idx::INT | Idx::LONG | Idx::DOUBLE | Idx::CHAR)
        )
    }

    /// `boolean` or `Boolean`.
    pub fn is_boolean(&self, idx: Idx) -> bool {
        self.as_primitive(idx) == Some(Idx::BOOLEAN)
    }

    /// Binary numeric promotion of two operand types, after unboxing.
    pub fn binary_numeric_promotion(&self, left: Idx, right: Idx) -> Option<Idx> {
        let l = self.as_primitive(left)?;
        let r = self.as_primitive(right)?;
        if !self.is_numeric(l) || !self.is_numeric(r) {
            return None;
        }
        Some(if l == Idx::DOUBLE || r == Idx::DOUBLE {
            Idx::DOUBLE
        } else if l == Idx::LONG || r == Idx::LONG {
            Idx::LONG
        } else {
            Idx::INT
        })
    }

    /// Reflexive, transitive nominal subtyping. Primitives are only
    /// subtypes of themselves; the error type relates to everything.
    pub fn is_subtype(&self, sub: Idx, sup: Idx) -> bool {
        if sub == sup || self.is_error(sub) || self.is_error(sup) {
            return true;
        }
        if self.is_primitive(sub) || self.is_primitive(sup) {
            return false;
        }
        if sup == Idx::OBJECT {
            return true;
        }

        let mut seen = FxHashSet::default();
        let mut work: SmallVec<[Idx; 8]> = SmallVec::new();
        work.push(sub);
        while let Some(current) = work.pop() {
            if !seen.insert(current) {
                continue;
            }
            let Some(entry) = self.entry(current) else {
                continue;
            };
            for &parent in &entry.supertypes {
                if parent == sup {
                    return true;
                }
                work.push(parent);
            }
        }
        false
    }

    /// Whether a value of static type `from` may be tested against `to`.
    pub fn is_castable(&self, from: Idx, to: Idx) -> bool {
        if from == to || self.is_error(from) || self.is_error(to) {
            return true;
        }
        match (self.is_primitive(from), self.is_primitive(to)) {
            (true, true) => self.is_numeric(from) && self.is_numeric(to),
            (true, false) => self
                .boxed(from)
                .is_some_and(|b| self.is_subtype(b, to)),
            (false, true) => self
                .boxed(to)
                .is_some_and(|b| self.is_subtype(b, from)),
            (false, false) => {
                if self.is_subtype(from, to) || self.is_subtype(to, from) {
                    return true;
                }
                // Unrelated types meet only through an interface a non-final
                // class could still implement.
                let open = |iface: Idx, other: Idx| {
                    self.is_interface(iface) && !self.is_final(other) && !self.is_sealed(other)
                };
                open(from, to) || open(to, from) || (self.is_interface(from) && self.is_interface(to))
            }
        }
    }

    /// Render a type for diagnostics.
    pub fn display(&self, idx: Idx, interner: &StringInterner) -> &'static str {
        if self.is_error(idx) {
            return "<error>";
        }
        interner.lookup(self.name(idx))
    }
}

#[cfg(test)]
mod tests;
