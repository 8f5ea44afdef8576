//! Completeness and redundancy checks for pattern switches.
//!
//! Coverage is decided over a matrix of pattern rows in the style of
//! Maranget's usefulness algorithm. Columns carry the static type being
//! matched; record types specialize into their components and sealed
//! abstract types split into their permitted subtypes.

use kava_diagnostic::{Diagnostic, DiagnosticQueue, ErrorCode};
use kava_ir::{Pattern, PatternArena, PatternId, Span, StringInterner};
use kava_stack::ensure_sufficient_stack;
use kava_types::{Idx, Pool};
use tracing::{debug, trace};

use crate::relations::Relations;
use crate::resolve::ResolvedPatterns;

/// A case label made unreachable by an earlier one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DominatedCase {
    pub case: usize,
    pub by: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SwitchReport {
    pub dominated: Vec<DominatedCase>,
    pub exhaustive: bool,
}

/// `None` cells are wildcards introduced by specialization.
type Row = Vec<Option<PatternId>>;

pub struct SwitchChecker<'a> {
    arena: &'a PatternArena,
    pool: &'a Pool,
    interner: &'a StringInterner,
    resolved: &'a ResolvedPatterns,
    relations: Relations<'a>,
}

impl<'a> SwitchChecker<'a> {
    pub fn new(
        arena: &'a PatternArena,
        pool: &'a Pool,
        interner: &'a StringInterner,
        resolved: &'a ResolvedPatterns,
    ) -> Self {
        SwitchChecker {
            arena,
            pool,
            interner,
            resolved,
            relations: Relations::new(arena, pool, resolved),
        }
    }

    /// Check the cases of a switch over `selector_ty`, reporting dominated
    /// labels (E3005) and missing coverage (E3006).
    pub fn check(
        &self,
        cases: &[PatternId],
        selector_ty: Idx,
        span: Span,
        diagnostics: &mut DiagnosticQueue,
    ) -> SwitchReport {
        let mut dominated = Vec::new();
        for (j, &later) in cases.iter().enumerate() {
            let Some(by) = cases[..j]
                .iter()
                .position(|&earlier| self.relations.dominates(earlier, later))
            else {
                continue;
            };
            debug!(case = j, by, "dominated case label");
            diagnostics.add(
                Diagnostic::error(ErrorCode::E3005)
                    .with_label(self.arena.pattern_span(later), "this case can never match")
                    .with_secondary_label(
                        self.arena.pattern_span(cases[by]),
                        "every value it would match is matched here",
                    ),
            );
            dominated.push(DominatedCase { case: j, by });
        }

        let exhaustive = self.pool.is_error(selector_ty) || {
            let rows: Vec<Row> = cases.iter().map(|&case| vec![Some(case)]).collect();
            self.is_covered(&rows, &[selector_ty])
        };
        if !exhaustive {
            let ty = self.pool.display(selector_ty, self.interner);
            diagnostics.add(
                Diagnostic::error(ErrorCode::E3006)
                    .with_message(format!("switch over `{ty}` does not cover all possible values"))
                    .with_label(span, "not exhaustive"),
            );
        }

        SwitchReport {
            dominated,
            exhaustive,
        }
    }

    /// Whether every value vector of `types` is matched by some row.
    fn is_covered(&self, rows: &[Row], types: &[Idx]) -> bool {
        ensure_sufficient_stack(|| {
            let Some((&ty, rest_types)) = types.split_first() else {
                return !rows.is_empty();
            };
            let rows = self.expand_guarded_heads(rows);
            trace!(rows = rows.len(), columns = types.len(), "coverage step");
            if rows.is_empty() {
                return false;
            }

            if self.pool.is_record(ty) {
                return self.is_covered_record(&rows, ty, rest_types);
            }

            let defaults: Vec<Row> = rows
                .iter()
                .filter(|row| self.head_covers(row[0], ty))
                .map(|row| row[1..].to_vec())
                .collect();
            if self.is_covered(&defaults, rest_types) {
                return true;
            }

            let subtypes = self.pool.permitted_subtypes(ty);
            self.pool.is_sealed(ty)
                && self.pool.is_abstract(ty)
                && !subtypes.is_empty()
                && subtypes.iter().all(|&sub| {
                    let mut column = Vec::with_capacity(types.len());
                    column.push(sub);
                    column.extend_from_slice(rest_types);
                    self.is_covered(&rows, &column)
                })
        })
    }

    fn is_covered_record(&self, rows: &[Row], ty: Idx, rest_types: &[Idx]) -> bool {
        let components = self.pool.record_components(ty);
        let mut specialized = Vec::new();
        for row in rows {
            let mut cells: Row = match row[0] {
                Some(head) => match self.arena.pattern(head) {
                    Pattern::Record(r)
                        if self.resolved.pattern_type(head) == Some(ty)
                            && r.components.len() == components.len() =>
                    {
                        r.components.iter().copied().map(Some).collect()
                    }
                    _ if self.head_covers(Some(head), ty) => vec![None; components.len()],
                    _ => continue,
                },
                None => vec![None; components.len()],
            };
            cells.extend_from_slice(&row[1..]);
            specialized.push(cells);
        }
        let mut column: Vec<Idx> = components.iter().map(|c| c.ty).collect();
        column.extend_from_slice(rest_types);
        self.is_covered(&specialized, &column)
    }

    fn head_covers(&self, head: Option<PatternId>, ty: Idx) -> bool {
        head.is_none_or(|p| self.relations.covers_type(p, ty))
    }

    /// Replace guarded heads by their sub-patterns when the guard is
    /// vacuous. Rows under any other guard can never be relied on.
    fn expand_guarded_heads(&self, rows: &[Row]) -> Vec<Row> {
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            self.expand_row(row.clone(), &mut out);
        }
        out
    }

    fn expand_row(&self, row: Row, out: &mut Vec<Row>) {
        if let Some(head) = row[0] {
            if let Pattern::Guarded(g) = self.arena.pattern(head) {
                if self.relations.is_always_true(head) {
                    for &sub in &g.patterns {
                        let mut expanded = row.clone();
                        expanded[0] = Some(sub);
                        self.expand_row(expanded, out);
                    }
                }
                return;
            }
        }
        out.push(row);
    }
}

#[cfg(test)]
mod tests;
