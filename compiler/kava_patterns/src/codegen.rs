//! Branch planning and local-variable scope tracking.
//!
//! Patterns compile to short-circuit tests over symbolic labels: every test
//! either falls through or jumps to a `when_true` / `when_false` target, so
//! no intermediate boolean is ever materialized. [`CodeStream`] is the
//! emitter. It also keeps the local-variable table (which pattern bindings
//! are live at each instruction), reconciled against the flow states
//! recorded by [`crate::flow`].
//!
//! A guarded pattern plans its own "then" and "else" labels. Sub-pattern
//! failures and a false guard both reach "else", where the pattern's
//! bindings are suspended before control leaves for the caller's false
//! target. Record patterns nested in the guard fail straight to that same
//! "else"; the label is threaded down through [`PlanContext`].

use kava_ir::{BinaryOp, ExprId, ExprKind, GuardedPattern, LocalId, Pattern, PatternArena, PatternId, UnaryOp};
use kava_stack::ensure_sufficient_stack;
use kava_types::{Idx, Pool};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::const_fold::{has_runtime_operands, optimized_boolean_constant};
use crate::error::CompileError;
use crate::flow::{FlowSnapshots, FlowStateIndex, FlowStateTable};
use crate::resolve::ResolvedPatterns;

/// A branch target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label(u32);

impl Label {
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// An operand-stack temporary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ValueId(u32);

impl ValueId {
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Instr {
    PlaceLabel(Label),
    Goto(Label),
    /// Jump to `on_fail` unless `value` is an instance of `ty`.
    TestType {
        value: ValueId,
        ty: Idx,
        on_fail: Label,
    },
    /// Read record component `component` of `record` into `dest`.
    Project {
        dest: ValueId,
        record: ValueId,
        component: usize,
    },
    StoreLocal {
        local: LocalId,
        slot: u16,
        value: ValueId,
    },
    /// Evaluate an opaque guard operand.
    EvalOperand {
        dest: ValueId,
        expr: ExprId,
    },
    BranchIf {
        value: ValueId,
        when: bool,
        target: Label,
    },
}

/// One live interval of a local, in instruction offsets. An open range
/// (`end: None`) is still live when the stream is finished.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LocalRange {
    pub local: LocalId,
    pub slot: u16,
    pub start: u32,
    pub end: Option<u32>,
}

/// Finished output of a [`CodeStream`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EmittedCode {
    pub instrs: Vec<Instr>,
    pub local_ranges: Vec<LocalRange>,
    pub slot_count: u16,
}

/// Symbolic instruction emitter with a local-variable table.
#[derive(Debug)]
pub struct CodeStream {
    instrs: Vec<Instr>,
    next_label: u32,
    placed: Vec<bool>,
    next_value: u32,
    slots: FxHashMap<LocalId, u16>,
    next_slot: u16,
    /// Live local -> index of its open range.
    live: FxHashMap<LocalId, usize>,
    ranges: Vec<LocalRange>,
    track_locals: bool,
}

impl CodeStream {
    pub fn new(track_locals: bool) -> Self {
        CodeStream {
            instrs: Vec::new(),
            next_label: 0,
            placed: Vec::new(),
            next_value: 0,
            slots: FxHashMap::default(),
            next_slot: 0,
            live: FxHashMap::default(),
            ranges: Vec::new(),
            track_locals,
        }
    }

    /// A label never handed out before.
    pub fn new_label(&mut self) -> Label {
        let label = Label(self.next_label);
        self.next_label += 1;
        self.placed.push(false);
        label
    }

    pub fn new_value(&mut self) -> ValueId {
        let value = ValueId(self.next_value);
        self.next_value += 1;
        value
    }

    pub fn emit(&mut self, instr: Instr) {
        trace!(pc = self.pc(), ?instr, "emit");
        self.instrs.push(instr);
    }

    pub fn place_label(&mut self, label: Label) {
        let placed = &mut self.placed[label.0 as usize];
        debug_assert!(!*placed, "label {label:?} placed twice");
        *placed = true;
        self.emit(Instr::PlaceLabel(label));
    }

    pub fn goto(&mut self, label: Label) {
        self.emit(Instr::Goto(label));
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "instruction counts stay far below u32::MAX"
    )]
    pub fn pc(&self) -> u32 {
        self.instrs.len() as u32
    }

    pub fn instrs(&self) -> &[Instr] {
        &self.instrs
    }

    /// Slot of `local`, assigning the next free one on first use.
    pub fn declare_local(&mut self, local: LocalId) -> u16 {
        if let Some(&slot) = self.slots.get(&local) {
            return slot;
        }
        let slot = self.next_slot;
        self.next_slot += 1;
        self.slots.insert(local, slot);
        slot
    }

    pub fn is_declared(&self, local: LocalId) -> bool {
        self.slots.contains_key(&local)
    }

    pub fn is_live(&self, local: LocalId) -> bool {
        self.live.contains_key(&local)
    }

    /// Live locals in id order.
    pub fn live_locals(&self) -> Vec<LocalId> {
        let mut live: Vec<LocalId> = self.live.keys().copied().collect();
        live.sort_unstable();
        live
    }

    pub fn open_range(&mut self, local: LocalId) {
        if !self.track_locals || self.live.contains_key(&local) {
            return;
        }
        let slot = self.declare_local(local);
        self.live.insert(local, self.ranges.len());
        self.ranges.push(LocalRange {
            local,
            slot,
            start: self.pc(),
            end: None,
        });
    }

    pub fn close_range(&mut self, local: LocalId) {
        if let Some(index) = self.live.remove(&local) {
            self.ranges[index].end = Some(self.pc());
        }
    }

    /// End the live range of every declared local that `state` does not
    /// prove assigned.
    pub fn remove_not_definitely_assigned(&mut self, table: &FlowStateTable, state: FlowStateIndex) {
        let Some(state) = table.get(state) else {
            return;
        };
        if !state.reachable {
            return;
        }
        let dead: SmallVec<[LocalId; 4]> = self
            .live
            .keys()
            .copied()
            .filter(|&local| !state.bits.contains(local))
            .collect();
        for local in dead {
            self.close_range(local);
        }
    }

    /// Start a live range for every declared local that `state` proves
    /// assigned.
    pub fn add_definitely_assigned(&mut self, table: &FlowStateTable, state: FlowStateIndex) {
        let Some(state) = table.get(state) else {
            return;
        };
        if !state.reachable {
            return;
        }
        for local in state.bits.iter() {
            if self.is_declared(local) {
                self.open_range(local);
            }
        }
    }

    pub fn finish(self) -> EmittedCode {
        EmittedCode {
            instrs: self.instrs,
            local_ranges: self.ranges,
            slot_count: self.next_slot,
        }
    }
}

/// Where a boolean test goes. `None` means fall through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct BranchTargets {
    pub when_true: Option<Label>,
    pub when_false: Option<Label>,
}

impl BranchTargets {
    pub fn new(when_true: Option<Label>, when_false: Option<Label>) -> Self {
        BranchTargets {
            when_true,
            when_false,
        }
    }

    #[must_use]
    pub fn swapped(self) -> Self {
        BranchTargets {
            when_true: self.when_false,
            when_false: self.when_true,
        }
    }
}

/// State threaded down while planning a guard.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlanContext {
    /// Failure label of the guarded pattern whose guard is being compiled.
    pub guarded_else: Option<Label>,
    /// Label reached by falling through when the current test is false.
    pub false_fallthrough: Option<Label>,
}

impl PlanContext {
    fn without_fallthrough(self) -> Self {
        PlanContext {
            false_fallthrough: None,
            ..self
        }
    }
}

/// Code-generation phase of one pattern occurrence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlanPhase {
    Unanalyzed,
    FlowAnalyzed,
    BranchPlanned,
    Emitted,
}

/// Labels planned for one guarded pattern.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GuardedPlan {
    pub pattern: PatternId,
    pub then_label: Label,
    pub else_label: Label,
}

/// What one `generate_optimized_boolean` call produced.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EmittedPattern {
    pub guarded: Vec<GuardedPlan>,
    /// Record patterns inside a guard, with the guarded "else" they fail to.
    pub guarded_else_targets: Vec<(PatternId, Label)>,
}

impl EmittedPattern {
    pub fn plan_of(&self, pattern: PatternId) -> Option<GuardedPlan> {
        self.guarded.iter().copied().find(|p| p.pattern == pattern)
    }

    pub fn guarded_else_target(&self, record: PatternId) -> Option<Label> {
        self.guarded_else_targets
            .iter()
            .find_map(|&(p, label)| (p == record).then_some(label))
    }
}

pub struct PatternCodegen<'a> {
    arena: &'a PatternArena,
    pool: &'a Pool,
    resolved: &'a ResolvedPatterns,
    table: &'a FlowStateTable,
    snapshots: &'a FlowSnapshots,
    code: &'a mut CodeStream,
    phases: FxHashMap<PatternId, PlanPhase>,
    emitted: EmittedPattern,
}

impl<'a> PatternCodegen<'a> {
    pub fn new(
        arena: &'a PatternArena,
        pool: &'a Pool,
        resolved: &'a ResolvedPatterns,
        table: &'a FlowStateTable,
        snapshots: &'a FlowSnapshots,
        code: &'a mut CodeStream,
    ) -> Self {
        PatternCodegen {
            arena,
            pool,
            resolved,
            table,
            snapshots,
            code,
            phases: FxHashMap::default(),
            emitted: EmittedPattern::default(),
        }
    }

    pub fn code(&self) -> &CodeStream {
        self.code
    }

    pub fn code_mut(&mut self) -> &mut CodeStream {
        self.code
    }

    pub fn phase(&self, pattern: PatternId) -> PlanPhase {
        if let Some(&phase) = self.phases.get(&pattern) {
            return phase;
        }
        if self.snapshots.contains(pattern) {
            PlanPhase::FlowAnalyzed
        } else {
            PlanPhase::Unanalyzed
        }
    }

    fn require_analyzed(&self, pattern: PatternId) -> Result<(), CompileError> {
        if self.snapshots.contains(pattern) {
            Ok(())
        } else {
            Err(CompileError::NotFlowAnalyzed(pattern))
        }
    }

    /// Emit the test of `pattern` against `value`, whose static type is
    /// `static_ty`, branching to `targets`.
    pub fn generate_optimized_boolean(
        &mut self,
        pattern: PatternId,
        value: ValueId,
        static_ty: Idx,
        targets: BranchTargets,
    ) -> Result<EmittedPattern, CompileError> {
        self.require_analyzed(pattern)?;
        self.emitted = EmittedPattern::default();
        self.gen_pattern(pattern, value, static_ty, targets, PlanContext::default())?;
        Ok(std::mem::take(&mut self.emitted))
    }

    fn gen_pattern(
        &mut self,
        pattern: PatternId,
        value: ValueId,
        static_ty: Idx,
        targets: BranchTargets,
        ctx: PlanContext,
    ) -> Result<(), CompileError> {
        let arena = self.arena;
        if let Pattern::Guarded(g) = arena.pattern(pattern) {
            return self.gen_guarded(pattern, g, value, static_ty, targets);
        }

        let (fail, local_fail) = match targets.when_false.or(ctx.false_fallthrough) {
            Some(f) => (f, None),
            None => {
                let l = self.code.new_label();
                (l, Some(l))
            }
        };
        self.emit_match(pattern, value, static_ty, fail, ctx)?;
        if let Some(t) = targets.when_true {
            self.code.goto(t);
        }
        if let Some(l) = local_fail {
            self.code.place_label(l);
        }
        Ok(())
    }

    /// Test `pattern`, falling through on success and jumping to `on_fail`
    /// otherwise.
    fn emit_match(
        &mut self,
        pattern: PatternId,
        value: ValueId,
        static_ty: Idx,
        on_fail: Label,
        ctx: PlanContext,
    ) -> Result<(), CompileError> {
        let arena = self.arena;
        ensure_sufficient_stack(|| match arena.pattern(pattern) {
            Pattern::Type(p) => {
                self.emit_type_test(pattern, value, static_ty, on_fail);
                if let Some(local) = p.local {
                    self.store_local(local, value);
                }
                Ok(())
            }
            Pattern::Record(r) => {
                if ctx.guarded_else == Some(on_fail) {
                    trace!(?pattern, else_label = ?on_fail, "record fails to guarded else");
                    self.emitted.guarded_else_targets.push((pattern, on_fail));
                }
                self.emit_type_test(pattern, value, static_ty, on_fail);
                let record_ty = self.resolved.pattern_type(pattern).unwrap_or(Idx::ERROR);
                let pool = self.pool;
                let components = pool.record_components(record_ty);
                for (i, &sub) in r.components.iter().enumerate() {
                    let dest = self.code.new_value();
                    self.code.emit(Instr::Project {
                        dest,
                        record: value,
                        component: i,
                    });
                    let sub_ty = components.get(i).map_or(Idx::ERROR, |c| c.ty);
                    self.emit_match(sub, dest, sub_ty, on_fail, ctx)?;
                }
                Ok(())
            }
            Pattern::Any(_) => Ok(()),
            Pattern::Guarded(_) => {
                // A guard nested below a record: plan it with the failure
                // edge pinned and success falling through.
                self.gen_pattern(
                    pattern,
                    value,
                    static_ty,
                    BranchTargets::new(None, Some(on_fail)),
                    ctx,
                )
            }
        })
    }

    /// Skipped when every value of `static_ty` already has the pattern's type.
    fn emit_type_test(&mut self, pattern: PatternId, value: ValueId, static_ty: Idx, on_fail: Label) {
        let ty = self.resolved.pattern_type(pattern).unwrap_or(Idx::ERROR);
        let total = !self.pool.is_error(ty)
            && !self.pool.is_error(static_ty)
            && self.pool.is_subtype(static_ty, ty);
        if total {
            return;
        }
        self.code.emit(Instr::TestType {
            value,
            ty,
            on_fail,
        });
    }

    fn store_local(&mut self, local: LocalId, value: ValueId) {
        let slot = self.code.declare_local(local);
        self.code.emit(Instr::StoreLocal { local, slot, value });
        self.code.open_range(local);
    }

    fn gen_guarded(
        &mut self,
        pattern: PatternId,
        g: &GuardedPattern,
        value: ValueId,
        static_ty: Idx,
        targets: BranchTargets,
    ) -> Result<(), CompileError> {
        let states = self
            .snapshots
            .get(pattern)
            .ok_or(CompileError::NotFlowAnalyzed(pattern))?;

        let then_label = self.code.new_label();
        let else_label = self.code.new_label();
        self.phases.insert(pattern, PlanPhase::BranchPlanned);
        self.emitted.guarded.push(GuardedPlan {
            pattern,
            then_label,
            else_label,
        });
        debug!(?pattern, ?then_label, ?else_label, ?targets, "planning guarded pattern");

        for &sub in &g.patterns {
            self.gen_pattern(
                sub,
                value,
                static_ty,
                BranchTargets::new(None, Some(else_label)),
                PlanContext::default(),
            )?;
        }

        let guard_ctx = PlanContext {
            guarded_else: Some(else_label),
            false_fallthrough: None,
        };
        let mut then_used = false;
        match self.skippable_constant(g.condition) {
            Some(true) => {
                if let Some(t) = targets.when_true {
                    self.code.goto(t);
                }
            }
            Some(false) => self.code.goto(else_label),
            None => match targets.when_true {
                Some(t) => self.gen_cond(
                    g.condition,
                    BranchTargets::new(Some(t), None),
                    PlanContext {
                        false_fallthrough: Some(else_label),
                        ..guard_ctx
                    },
                )?,
                None => self.gen_cond(
                    g.condition,
                    BranchTargets::new(None, Some(else_label)),
                    guard_ctx,
                )?,
            },
        }

        self.code
            .remove_not_definitely_assigned(self.table, states.resume_state);
        self.code.add_definitely_assigned(self.table, states.resume_state);

        match (targets.when_true, targets.when_false) {
            (Some(_), when_false) => {
                self.code.place_label(else_label);
                self.suspend_variables(pattern)?;
                if let Some(f) = when_false {
                    self.code.goto(f);
                }
            }
            (None, Some(f)) => {
                then_used = true;
                self.code.goto(then_label);
                self.code.place_label(else_label);
                self.suspend_variables(pattern)?;
                self.code.goto(f);
            }
            (None, None) => {
                then_used = true;
                self.code.goto(then_label);
                self.code.place_label(else_label);
                self.suspend_variables(pattern)?;
            }
        }
        if then_used {
            self.code.place_label(then_label);
            self.resume_variables(pattern)?;
        }

        self.phases.insert(pattern, PlanPhase::Emitted);
        Ok(())
    }

    /// The value of `expr` when it folds and has nothing to evaluate.
    /// Folded expressions with runtime operands are still generated in
    /// full, so their calls run before control leaves.
    fn skippable_constant(&self, expr: ExprId) -> Option<bool> {
        if has_runtime_operands(self.arena, expr) {
            return None;
        }
        optimized_boolean_constant(self.arena, expr).as_bool()
    }

    /// Short-circuit code for a guard expression.
    fn gen_cond(&mut self, expr: ExprId, targets: BranchTargets, ctx: PlanContext) -> Result<(), CompileError> {
        let arena = self.arena;
        ensure_sufficient_stack(|| match &arena.expr(expr).kind {
            ExprKind::Bool(value) => {
                let target = if *value {
                    targets.when_true
                } else {
                    targets.when_false
                };
                if let Some(label) = target {
                    self.code.goto(label);
                }
                Ok(())
            }
            ExprKind::Unary {
                op: UnaryOp::Not,
                operand,
            } => self.gen_cond(*operand, targets.swapped(), ctx.without_fallthrough()),
            ExprKind::Binary {
                op: BinaryOp::And,
                left,
                right,
            } => self.gen_and(*left, *right, targets, ctx),
            ExprKind::Binary {
                op: BinaryOp::Or,
                left,
                right,
            } => self.gen_or(*left, *right, targets, ctx),
            ExprKind::InstanceOf {
                expr: tested,
                pattern,
            } => {
                let value = self.code.new_value();
                self.code.emit(Instr::EvalOperand {
                    dest: value,
                    expr: *tested,
                });
                let static_ty = self.resolved.expr_type(*tested).unwrap_or(Idx::OBJECT);
                self.gen_pattern(*pattern, value, static_ty, targets, ctx)
            }
            _ => {
                let value = self.code.new_value();
                self.code.emit(Instr::EvalOperand { dest: value, expr });
                self.branch(value, targets);
                Ok(())
            }
        })
    }

    fn gen_and(
        &mut self,
        left: ExprId,
        right: ExprId,
        targets: BranchTargets,
        ctx: PlanContext,
    ) -> Result<(), CompileError> {
        match self.skippable_constant(left) {
            Some(true) => return self.gen_cond(right, targets, ctx),
            Some(false) => {
                if let Some(f) = targets.when_false {
                    self.code.goto(f);
                }
                return Ok(());
            }
            _ => {}
        }
        match targets.when_false {
            Some(f) => {
                self.gen_cond(left, BranchTargets::new(None, Some(f)), ctx.without_fallthrough())?;
                self.gen_cond(right, targets, ctx)
            }
            None => {
                let internal_false = self.code.new_label();
                self.gen_cond(
                    left,
                    BranchTargets::new(None, Some(internal_false)),
                    ctx.without_fallthrough(),
                )?;
                self.gen_cond(right, targets, ctx)?;
                self.code.place_label(internal_false);
                Ok(())
            }
        }
    }

    fn gen_or(
        &mut self,
        left: ExprId,
        right: ExprId,
        targets: BranchTargets,
        ctx: PlanContext,
    ) -> Result<(), CompileError> {
        match self.skippable_constant(left) {
            Some(false) => return self.gen_cond(right, targets, ctx),
            Some(true) => {
                if let Some(t) = targets.when_true {
                    self.code.goto(t);
                }
                return Ok(());
            }
            _ => {}
        }
        match targets.when_true {
            Some(t) => {
                self.gen_cond(left, BranchTargets::new(Some(t), None), ctx.without_fallthrough())?;
                self.gen_cond(right, targets, ctx)
            }
            None => {
                let internal_true = self.code.new_label();
                self.gen_cond(
                    left,
                    BranchTargets::new(Some(internal_true), None),
                    ctx.without_fallthrough(),
                )?;
                self.gen_cond(right, targets, ctx)?;
                self.code.place_label(internal_true);
                Ok(())
            }
        }
    }

    fn branch(&mut self, value: ValueId, targets: BranchTargets) {
        match (targets.when_true, targets.when_false) {
            (Some(t), Some(f)) => {
                self.code.emit(Instr::BranchIf {
                    value,
                    when: true,
                    target: t,
                });
                self.code.goto(f);
            }
            (Some(t), None) => self.code.emit(Instr::BranchIf {
                value,
                when: true,
                target: t,
            }),
            (None, Some(f)) => self.code.emit(Instr::BranchIf {
                value,
                when: false,
                target: f,
            }),
            (None, None) => {}
        }
    }

    /// Store `value` into the pattern's variables without testing it.
    pub fn generate_pattern_variable(&mut self, pattern: PatternId, value: ValueId) -> Result<(), CompileError> {
        let arena = self.arena;
        ensure_sufficient_stack(|| match arena.pattern(pattern) {
            Pattern::Type(p) => {
                if let Some(local) = p.local {
                    self.store_local(local, value);
                }
                Ok(())
            }
            Pattern::Record(r) => {
                for (i, &sub) in r.components.iter().enumerate() {
                    let dest = self.code.new_value();
                    self.code.emit(Instr::Project {
                        dest,
                        record: value,
                        component: i,
                    });
                    self.generate_pattern_variable(sub, dest)?;
                }
                Ok(())
            }
            Pattern::Any(_) => Ok(()),
            Pattern::Guarded(g) => match g.patterns.first() {
                Some(&first) => self.generate_pattern_variable(first, value),
                None => Err(CompileError::EmptyGuardedPattern(pattern)),
            },
        })
    }

    /// Deactivate the bindings of `pattern` when control leaves the region
    /// where they are live.
    pub fn suspend_variables(&mut self, pattern: PatternId) -> Result<(), CompileError> {
        let states = self
            .snapshots
            .get(pattern)
            .ok_or(CompileError::NotFlowAnalyzed(pattern))?;
        if let Some(suspend) = states.suspend_state {
            self.code.remove_not_definitely_assigned(self.table, suspend);
        }
        if let Pattern::Guarded(g) = self.arena.pattern(pattern) {
            if let Some(&first) = g.patterns.first() {
                self.suspend_variables(first)?;
            }
        }
        Ok(())
    }

    /// Reactivate the bindings of `pattern` on a path where it matched.
    pub fn resume_variables(&mut self, pattern: PatternId) -> Result<(), CompileError> {
        let states = self
            .snapshots
            .get(pattern)
            .ok_or(CompileError::NotFlowAnalyzed(pattern))?;
        self.code.add_definitely_assigned(self.table, states.resume_state);
        if let Pattern::Guarded(g) = self.arena.pattern(pattern) {
            if let Some(&first) = g.patterns.first() {
                self.resume_variables(first)?;
            }
        }
        Ok(())
    }

    /// End the scope of the pattern's primary bindings.
    pub fn wrapup_generation(&mut self, pattern: PatternId) {
        self.wrapup(pattern, false);
    }

    /// End the scope of every binding the pattern introduces.
    pub fn full_wrapup_generation(&mut self, pattern: PatternId) {
        self.wrapup(pattern, true);
    }

    fn wrapup(&mut self, pattern: PatternId, full: bool) {
        let arena = self.arena;
        ensure_sufficient_stack(|| match arena.pattern(pattern) {
            Pattern::Type(p) => {
                if let Some(local) = p.local {
                    self.code.close_range(local);
                }
            }
            Pattern::Record(r) => {
                for &sub in &r.components {
                    self.wrapup(sub, full);
                }
            }
            Pattern::Any(_) => {}
            Pattern::Guarded(g) => {
                let take = if full { g.patterns.len() } else { 1 };
                for &sub in g.patterns.iter().take(take) {
                    self.wrapup(sub, full);
                }
            }
        })
    }
}
