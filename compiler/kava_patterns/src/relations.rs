//! Static facts about patterns: vacuous matches, coverage and domination.
//!
//! These feed switch completeness checking. All three are conservative:
//! `false` means "not provable", never "provably not".

use kava_ir::{Pattern, PatternArena, PatternId};
use kava_stack::ensure_sufficient_stack;
use kava_types::{Idx, Pool};

use crate::const_fold::optimized_boolean_constant;
use crate::resolve::ResolvedPatterns;

/// Relation queries over resolved patterns.
#[derive(Clone, Copy)]
pub struct Relations<'a> {
    arena: &'a PatternArena,
    pool: &'a Pool,
    resolved: &'a ResolvedPatterns,
}

impl<'a> Relations<'a> {
    pub fn new(arena: &'a PatternArena, pool: &'a Pool, resolved: &'a ResolvedPatterns) -> Self {
        Relations {
            arena,
            pool,
            resolved,
        }
    }

    fn type_of(&self, pattern: PatternId) -> Idx {
        self.resolved.pattern_type(pattern).unwrap_or(Idx::ERROR)
    }

    /// Whether `pattern` matches every value that reaches it.
    ///
    /// A guarded pattern qualifies only when its guard folds to exactly
    /// `true`; an undecidable guard does not count.
    pub fn is_always_true(&self, pattern: PatternId) -> bool {
        ensure_sufficient_stack(|| match self.arena.pattern(pattern) {
            Pattern::Guarded(g) => optimized_boolean_constant(self.arena, g.condition).is_true(),
            Pattern::Record(r) => r.components.iter().all(|&c| self.is_always_true(c)),
            Pattern::Type(_) | Pattern::Any(_) => true,
        })
    }

    /// Whether `pattern` matches every value of type `ty`.
    pub fn covers_type(&self, pattern: PatternId, ty: Idx) -> bool {
        if self.pool.is_error(ty) {
            return false;
        }
        ensure_sufficient_stack(|| match self.arena.pattern(pattern) {
            Pattern::Type(_) => self.leaf_covers(pattern, ty),
            Pattern::Record(r) => {
                if !self.leaf_covers(pattern, ty) {
                    return false;
                }
                let record_ty = self.type_of(pattern);
                let components = self.pool.record_components(record_ty);
                components.len() == r.components.len()
                    && r.components
                        .iter()
                        .zip(components)
                        .all(|(&sub, component)| self.covers_type(sub, component.ty))
            }
            Pattern::Any(_) => true,
            Pattern::Guarded(g) => {
                self.is_always_true(pattern) && g.patterns.iter().any(|&sub| self.covers_type(sub, ty))
            }
        })
    }

    fn leaf_covers(&self, pattern: PatternId, ty: Idx) -> bool {
        let pattern_ty = self.type_of(pattern);
        !self.pool.is_error(pattern_ty) && self.pool.is_subtype(ty, pattern_ty)
    }

    /// Whether every value matched by `other` is also matched by `pattern`.
    pub fn dominates(&self, pattern: PatternId, other: PatternId) -> bool {
        ensure_sufficient_stack(|| match self.arena.pattern(pattern) {
            Pattern::Type(_) => {
                let mine = self.type_of(pattern);
                let theirs = self.dominated_type(other);
                !self.pool.is_error(mine)
                    && !self.pool.is_error(theirs)
                    && self.pool.is_subtype(theirs, mine)
            }
            Pattern::Record(mine) => match self.arena.pattern(other) {
                Pattern::Record(theirs) => {
                    let ty = self.type_of(pattern);
                    !self.pool.is_error(ty)
                        && ty == self.type_of(other)
                        && mine.components.len() == theirs.components.len()
                        && mine
                            .components
                            .iter()
                            .zip(&theirs.components)
                            .all(|(&p, &q)| self.dominates(p, q))
                }
                Pattern::Guarded(g) => g
                    .patterns
                    .first()
                    .is_some_and(|&first| self.dominates(pattern, first)),
                Pattern::Type(_) | Pattern::Any(_) => false,
            },
            Pattern::Any(_) => true,
            Pattern::Guarded(g) => {
                self.is_always_true(pattern)
                    && g.patterns.iter().any(|&sub| self.dominates(sub, other))
            }
        })
    }

    /// The type a dominating type pattern must be a supertype of.
    fn dominated_type(&self, other: PatternId) -> Idx {
        match self.arena.pattern(other) {
            Pattern::Guarded(g) => g
                .patterns
                .first()
                .map_or(Idx::ERROR, |&first| self.dominated_type(first)),
            _ => self.type_of(other),
        }
    }
}
