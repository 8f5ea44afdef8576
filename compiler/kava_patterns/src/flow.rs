//! Definite-assignment analysis for patterns and guards.
//!
//! Tracks, per program point, which locals are definitely assigned. Boolean
//! guards split the state into "when true" and "when false" halves so that
//! short-circuit operators and `instanceof` bindings are precise.
//!
//! Snapshots of the state are recorded into a [`FlowStateTable`] owned by
//! the enclosing method. Branch planning replays them to keep the local
//! variable table in step with what this analysis proved.

use kava_diagnostic::{Diagnostic, DiagnosticQueue, ErrorCode};
use kava_ir::{BinaryOp, ExprId, ExprKind, LocalId, Pattern, PatternArena, PatternId, StringInterner, UnaryOp};
use kava_stack::ensure_sufficient_stack;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::resolve::ResolvedPatterns;

// Bit vectors

/// Set of locals, one bit per `LocalId`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct InitBits(SmallVec<[u64; 2]>);

impl InitBits {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    fn position(local: LocalId) -> (usize, u64) {
        let raw = local.index();
        (raw / 64, 1u64 << (raw % 64))
    }

    pub fn insert(&mut self, local: LocalId) {
        let (word, bit) = Self::position(local);
        if self.0.len() <= word {
            self.0.resize(word + 1, 0);
        }
        self.0[word] |= bit;
    }

    pub fn remove(&mut self, local: LocalId) {
        let (word, bit) = Self::position(local);
        if let Some(w) = self.0.get_mut(word) {
            *w &= !bit;
        }
    }

    pub fn contains(&self, local: LocalId) -> bool {
        let (word, bit) = Self::position(local);
        self.0.get(word).is_some_and(|w| w & bit != 0)
    }

    pub fn intersect_with(&mut self, other: &InitBits) {
        for (i, word) in self.0.iter_mut().enumerate() {
            *word &= other.0.get(i).copied().unwrap_or(0);
        }
    }

    pub fn union_with(&mut self, other: &InitBits) {
        if self.0.len() < other.0.len() {
            self.0.resize(other.0.len(), 0);
        }
        for (word, &o) in self.0.iter_mut().zip(other.0.iter()) {
            *word |= o;
        }
    }

    pub fn is_subset(&self, other: &InitBits) -> bool {
        self.0
            .iter()
            .enumerate()
            .all(|(i, &w)| w & !other.0.get(i).copied().unwrap_or(0) == 0)
    }

    pub fn count(&self) -> usize {
        self.0.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Members in ascending id order.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "word indices come from u32 local ids"
    )]
    pub fn iter(&self) -> impl Iterator<Item = LocalId> + '_ {
        self.0.iter().enumerate().flat_map(|(w, &word)| {
            (0..64u32)
                .filter(move |b| word & (1u64 << b) != 0)
                .map(move |b| LocalId::new(w as u32 * 64 + b))
        })
    }
}

impl FromIterator<LocalId> for InitBits {
    fn from_iter<I: IntoIterator<Item = LocalId>>(iter: I) -> Self {
        let mut bits = InitBits::new();
        for local in iter {
            bits.insert(local);
        }
        bits
    }
}

// Flow states

/// Definite-assignment facts at one point.
///
/// An unreachable state vouches for every local, which makes it the
/// identity of [`InitState::merge`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct InitState {
    pub bits: InitBits,
    pub reachable: bool,
}

impl InitState {
    pub fn reachable(bits: InitBits) -> Self {
        InitState {
            bits,
            reachable: true,
        }
    }

    pub fn unreachable() -> Self {
        InitState {
            bits: InitBits::new(),
            reachable: false,
        }
    }

    pub fn is_definitely_assigned(&self, local: LocalId) -> bool {
        !self.reachable || self.bits.contains(local)
    }

    pub fn mark(&mut self, local: LocalId) {
        self.bits.insert(local);
    }

    /// Facts holding on both incoming paths.
    #[must_use]
    pub fn merge(&self, other: &InitState) -> InitState {
        match (self.reachable, other.reachable) {
            (false, _) => other.clone(),
            (_, false) => self.clone(),
            (true, true) => {
                let mut bits = self.bits.clone();
                bits.intersect_with(&other.bits);
                InitState::reachable(bits)
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FlowInfo {
    Unconditional(InitState),
    /// After a boolean expression: separate facts for each outcome.
    Conditional {
        when_true: InitState,
        when_false: InitState,
    },
}

impl FlowInfo {
    /// Entry state with `locals` assigned.
    pub fn initial(locals: impl IntoIterator<Item = LocalId>) -> Self {
        FlowInfo::Unconditional(InitState::reachable(locals.into_iter().collect()))
    }

    pub fn dead() -> Self {
        FlowInfo::Unconditional(InitState::unreachable())
    }

    pub fn conditional(when_true: InitState, when_false: InitState) -> Self {
        FlowInfo::Conditional {
            when_true,
            when_false,
        }
    }

    pub fn inits_when_true(&self) -> InitState {
        match self {
            FlowInfo::Unconditional(s) => s.clone(),
            FlowInfo::Conditional { when_true, .. } => when_true.clone(),
        }
    }

    pub fn inits_when_false(&self) -> InitState {
        match self {
            FlowInfo::Unconditional(s) => s.clone(),
            FlowInfo::Conditional { when_false, .. } => when_false.clone(),
        }
    }

    /// The facts that hold whichever way the expression went.
    pub fn unconditional_inits(&self) -> InitState {
        match self {
            FlowInfo::Unconditional(s) => s.clone(),
            FlowInfo::Conditional {
                when_true,
                when_false,
            } => when_true.merge(when_false),
        }
    }

    /// Unconditional flow for the code reached only when the expression
    /// was true.
    #[must_use]
    pub fn safe_inits_when_true(&self) -> FlowInfo {
        FlowInfo::Unconditional(self.inits_when_true())
    }

    #[must_use]
    pub fn merge(&self, other: &FlowInfo) -> FlowInfo {
        FlowInfo::Unconditional(self.unconditional_inits().merge(&other.unconditional_inits()))
    }

    pub fn is_reachable(&self) -> bool {
        match self {
            FlowInfo::Unconditional(s) => s.reachable,
            FlowInfo::Conditional {
                when_true,
                when_false,
            } => when_true.reachable || when_false.reachable,
        }
    }

    pub fn is_definitely_assigned(&self, local: LocalId) -> bool {
        self.unconditional_inits().is_definitely_assigned(local)
    }

    pub fn mark_as_definitely_assigned(&mut self, local: LocalId) {
        match self {
            FlowInfo::Unconditional(s) => s.mark(local),
            FlowInfo::Conditional {
                when_true,
                when_false,
            } => {
                when_true.mark(local);
                when_false.mark(local);
            }
        }
    }
}

// Snapshot table

/// Handle to a recorded flow state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FlowStateIndex(u32);

impl FlowStateIndex {
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Flow states recorded by one method or lambda body.
#[derive(Clone, Debug, Default)]
pub struct FlowStateTable {
    states: Vec<InitState>,
}

impl FlowStateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the unconditional facts of `flow`; indices are handed out in
    /// increasing order.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "a method never records u32::MAX states"
    )]
    pub fn record_initialization_states(&mut self, flow: &FlowInfo) -> FlowStateIndex {
        let index = FlowStateIndex(self.states.len() as u32);
        self.states.push(flow.unconditional_inits());
        index
    }

    pub fn get(&self, index: FlowStateIndex) -> Option<&InitState> {
        self.states.get(index.index())
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

/// The two snapshots a pattern leaves behind.
///
/// For type and record patterns these are the states on entry and exit.
/// For a guarded pattern, `suspend_state` is the state after its first
/// sub-pattern and `resume_state` the state once the guard held.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PatternFlowStates {
    pub suspend_state: Option<FlowStateIndex>,
    pub resume_state: FlowStateIndex,
}

#[derive(Clone, Debug, Default)]
pub struct FlowSnapshots {
    states: FxHashMap<PatternId, PatternFlowStates>,
}

impl FlowSnapshots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, pattern: PatternId) -> Option<PatternFlowStates> {
        self.states.get(&pattern).copied()
    }

    pub fn contains(&self, pattern: PatternId) -> bool {
        self.states.contains_key(&pattern)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

// Analyzer

pub struct FlowAnalyzer<'a> {
    arena: &'a PatternArena,
    interner: &'a StringInterner,
    resolved: &'a ResolvedPatterns,
    table: &'a mut FlowStateTable,
    snapshots: &'a mut FlowSnapshots,
    diagnostics: &'a mut DiagnosticQueue,
}

impl<'a> FlowAnalyzer<'a> {
    pub fn new(
        arena: &'a PatternArena,
        interner: &'a StringInterner,
        resolved: &'a ResolvedPatterns,
        table: &'a mut FlowStateTable,
        snapshots: &'a mut FlowSnapshots,
        diagnostics: &'a mut DiagnosticQueue,
    ) -> Self {
        FlowAnalyzer {
            arena,
            interner,
            resolved,
            table,
            snapshots,
            diagnostics,
        }
    }

    /// Flow after `pattern` matched, given `flow` before the test.
    pub fn analyse_pattern(&mut self, pattern: PatternId, flow: FlowInfo) -> FlowInfo {
        let arena = self.arena;
        ensure_sufficient_stack(|| match arena.pattern(pattern) {
            Pattern::Guarded(g) => {
                // Precondition: the parser never builds an empty guarded
                // pattern; sessions reject one before analysis.
                debug_assert!(!g.patterns.is_empty(), "guarded pattern without sub-patterns");

                let mut flow = flow;
                let mut state1 = None;
                if let Some(&first) = g.patterns.first() {
                    flow = self.analyse_pattern(first, flow);
                    state1 = Some(self.table.record_initialization_states(&flow));
                }
                for &sub in g.patterns.iter().skip(1) {
                    flow = self.analyse_pattern(sub, flow);
                }
                let merged = self.analyse_expr(g.condition, flow);
                let merged = merged.safe_inits_when_true();
                let state2 = self.table.record_initialization_states(&merged);
                debug!(?pattern, ?state1, ?state2, "guarded pattern flow states");
                self.snapshots.states.insert(
                    pattern,
                    PatternFlowStates {
                        suspend_state: state1,
                        resume_state: state2,
                    },
                );
                merged
            }
            other => {
                let entry = self.table.record_initialization_states(&flow);
                let mut flow = flow;
                match other {
                    Pattern::Type(p) => {
                        if let Some(local) = p.local {
                            flow.mark_as_definitely_assigned(local);
                        }
                    }
                    Pattern::Record(p) => {
                        for &component in &p.components {
                            flow = self.analyse_pattern(component, flow);
                        }
                    }
                    Pattern::Any(_) | Pattern::Guarded(_) => {}
                }
                let exit = self.table.record_initialization_states(&flow);
                trace!(?pattern, ?entry, ?exit, "pattern flow states");
                self.snapshots.states.insert(
                    pattern,
                    PatternFlowStates {
                        suspend_state: Some(entry),
                        resume_state: exit,
                    },
                );
                flow
            }
        })
    }

    /// Flow after evaluating `expr`, conditional for boolean operators.
    pub fn analyse_expr(&mut self, expr: ExprId, flow: FlowInfo) -> FlowInfo {
        let arena = self.arena;
        ensure_sufficient_stack(|| match &arena.expr(expr).kind {
            ExprKind::Bool(true) => {
                FlowInfo::conditional(flow.unconditional_inits(), InitState::unreachable())
            }
            ExprKind::Bool(false) => {
                FlowInfo::conditional(InitState::unreachable(), flow.unconditional_inits())
            }
            ExprKind::Int(_) => flow,
            ExprKind::Ident(_) => {
                self.check_assigned(expr, &flow);
                flow
            }
            ExprKind::Field { receiver, .. } => self.analyse_expr(*receiver, flow),
            ExprKind::Unary {
                op: UnaryOp::Not,
                operand,
            } => match self.analyse_expr(*operand, flow) {
                FlowInfo::Conditional {
                    when_true,
                    when_false,
                } => FlowInfo::conditional(when_false, when_true),
                unconditional @ FlowInfo::Unconditional(_) => unconditional,
            },
            ExprKind::Unary { operand, .. } => self.analyse_expr(*operand, flow),
            ExprKind::Binary {
                op: BinaryOp::And,
                left,
                right,
            } => {
                let left = self.analyse_expr(*left, flow);
                let right =
                    self.analyse_expr(*right, FlowInfo::Unconditional(left.inits_when_true()));
                FlowInfo::conditional(
                    right.inits_when_true(),
                    left.inits_when_false().merge(&right.inits_when_false()),
                )
            }
            ExprKind::Binary {
                op: BinaryOp::Or,
                left,
                right,
            } => {
                let left = self.analyse_expr(*left, flow);
                let right =
                    self.analyse_expr(*right, FlowInfo::Unconditional(left.inits_when_false()));
                FlowInfo::conditional(
                    left.inits_when_true().merge(&right.inits_when_true()),
                    right.inits_when_false(),
                )
            }
            ExprKind::Binary { left, right, .. } => {
                let flow = self.analyse_expr(*left, flow);
                let flow = FlowInfo::Unconditional(flow.unconditional_inits());
                let flow = self.analyse_expr(*right, flow);
                FlowInfo::Unconditional(flow.unconditional_inits())
            }
            ExprKind::InstanceOf {
                expr: tested,
                pattern,
            } => {
                let before = self.analyse_expr(*tested, flow).unconditional_inits();
                let matched = self.analyse_pattern(*pattern, FlowInfo::Unconditional(before.clone()));
                FlowInfo::conditional(matched.inits_when_true(), before)
            }
            ExprKind::Call { args, .. } => {
                let mut flow = flow;
                for &arg in args {
                    flow = FlowInfo::Unconditional(self.analyse_expr(arg, flow).unconditional_inits());
                }
                flow
            }
        })
    }

    fn check_assigned(&mut self, expr: ExprId, flow: &FlowInfo) {
        let Some(local) = self.resolved.local_of(expr) else {
            return;
        };
        if flow.is_definitely_assigned(local) {
            return;
        }
        let name = self.interner.lookup(self.arena.local(local).name);
        self.diagnostics.add(
            Diagnostic::error(ErrorCode::E2005)
                .with_message(format!("variable `{name}` might not have been initialized"))
                .with_label(self.arena.expr_span(expr), "read here"),
        );
    }
}
