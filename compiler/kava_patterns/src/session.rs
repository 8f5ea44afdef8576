//! Compilation sessions: resolve, analyse and plan every pattern of a unit.
//!
//! A [`CompilationUnit`] is one method or lambda body. It owns its arena
//! and shares a single [`FlowStateTable`] and [`CodeStream`] across all of
//! its match sites. Units are independent, so [`compile_units`] runs them on
//! the rayon pool.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use kava_diagnostic::{Diagnostic, DiagnosticConfig, DiagnosticQueue};
use kava_ir::{ExprId, Pattern, PatternArena, PatternId, Span, StringInterner};
use kava_types::Pool;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::codegen::{BranchTargets, CodeStream, EmittedCode, EmittedPattern, Instr, PatternCodegen};
use crate::error::CompileError;
use crate::flow::{FlowAnalyzer, FlowInfo, FlowSnapshots, FlowStateTable};
use crate::resolve::{LocalScope, ResolvedPatterns, Resolver};
use crate::switch::{SwitchChecker, SwitchReport};

/// Session settings.
#[derive(Clone, Debug)]
pub struct PatternConfig {
    pub diagnostics: DiagnosticConfig,
    /// Keep local-variable live ranges while emitting.
    pub local_variable_table: bool,
}

impl Default for PatternConfig {
    fn default() -> Self {
        PatternConfig {
            diagnostics: DiagnosticConfig::default(),
            local_variable_table: true,
        }
    }
}

impl PatternConfig {
    /// Report every diagnostic; for tests.
    pub fn unlimited() -> Self {
        PatternConfig {
            diagnostics: DiagnosticConfig::unlimited(),
            ..Self::default()
        }
    }
}

/// `selector instanceof pattern`
#[derive(Clone, Debug)]
pub struct MatchSite {
    pub pattern: PatternId,
    pub selector: ExprId,
    /// Locals of the enclosing body, all assigned before the site.
    pub scope: LocalScope,
}

/// `switch (selector) { case ... }` over patterns.
#[derive(Clone, Debug)]
pub struct SwitchSite {
    pub selector: ExprId,
    pub cases: Vec<PatternId>,
    pub scope: LocalScope,
    pub span: Span,
}

#[derive(Debug, Default)]
pub struct CompilationUnit {
    pub name: String,
    pub arena: PatternArena,
    pub sites: Vec<MatchSite>,
    pub switches: Vec<SwitchSite>,
}

impl CompilationUnit {
    pub fn new(name: impl Into<String>, arena: PatternArena) -> Self {
        CompilationUnit {
            name: name.into(),
            arena,
            sites: Vec::new(),
            switches: Vec::new(),
        }
    }

    fn patterns(&self) -> impl Iterator<Item = PatternId> + '_ {
        self.sites
            .iter()
            .map(|s| s.pattern)
            .chain(self.switches.iter().flat_map(|s| s.cases.iter().copied()))
    }

    /// Reject ids from another arena and guarded patterns without
    /// sub-patterns before any pass runs.
    fn validate(&self) -> Result<(), CompileError> {
        for pattern in self.patterns() {
            if self.arena.get_pattern(pattern).is_none() {
                return Err(CompileError::UnknownPattern(pattern));
            }
        }
        for raw in 0..self.arena.pattern_count() {
            let id = PatternId::new(u32::try_from(raw).unwrap_or(u32::MAX));
            if let Some(Pattern::Guarded(g)) = self.arena.get_pattern(id) {
                if g.patterns.is_empty() {
                    return Err(CompileError::EmptyGuardedPattern(id));
                }
            }
        }
        Ok(())
    }
}

/// Everything a unit produced.
#[derive(Debug)]
pub struct CompiledUnit {
    pub name: String,
    pub diagnostics: Vec<Diagnostic>,
    pub resolved: ResolvedPatterns,
    pub flow_table: FlowStateTable,
    pub snapshots: FlowSnapshots,
    pub code: EmittedCode,
    /// One entry per match site, then one per switch case, in order.
    pub emitted: Vec<EmittedPattern>,
    pub switch_reports: Vec<SwitchReport>,
}

impl CompiledUnit {
    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

/// Coarse cancellation signal, checked between match sites.
#[derive(Clone, Debug, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    fn check(&self) -> Result<(), CompileError> {
        if self.is_cancelled() {
            Err(CompileError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Resolve, flow-analyse and plan every site of `unit`.
#[tracing::instrument(level = "debug", skip_all, fields(unit = %unit.name))]
pub fn compile_unit(
    unit: &CompilationUnit,
    pool: &Pool,
    interner: &StringInterner,
    config: &PatternConfig,
    cancel: &CancellationFlag,
) -> Result<CompiledUnit, CompileError> {
    unit.validate()?;
    let arena = &unit.arena;
    let mut diagnostics = DiagnosticQueue::with_config(config.diagnostics.clone());

    // Resolution
    let mut resolved = ResolvedPatterns::new();
    let mut site_types = Vec::with_capacity(unit.sites.len());
    let mut switch_types = Vec::with_capacity(unit.switches.len());
    {
        let mut resolver = Resolver::new(arena, pool, interner, &mut diagnostics, &mut resolved);
        for site in &unit.sites {
            cancel.check()?;
            let selector_ty = resolver.resolve_expr(site.selector, &site.scope);
            resolver.resolve_pattern(site.pattern, selector_ty, &site.scope);
            site_types.push(selector_ty);
        }
        for switch in &unit.switches {
            cancel.check()?;
            let selector_ty = resolver.resolve_expr(switch.selector, &switch.scope);
            for &case in &switch.cases {
                resolver.resolve_pattern(case, selector_ty, &switch.scope);
            }
            switch_types.push(selector_ty);
        }
    }

    // Flow analysis
    let mut flow_table = FlowStateTable::new();
    let mut snapshots = FlowSnapshots::new();
    {
        let mut analyzer = FlowAnalyzer::new(
            arena,
            interner,
            &resolved,
            &mut flow_table,
            &mut snapshots,
            &mut diagnostics,
        );
        for site in &unit.sites {
            cancel.check()?;
            let entry = analyzer.analyse_expr(site.selector, FlowInfo::initial(site.scope.locals()));
            analyzer.analyse_pattern(site.pattern, entry);
        }
        for switch in &unit.switches {
            cancel.check()?;
            let entry = analyzer.analyse_expr(switch.selector, FlowInfo::initial(switch.scope.locals()));
            for &case in &switch.cases {
                analyzer.analyse_pattern(case, entry.clone());
            }
        }
    }

    // Switch checks
    let checker = SwitchChecker::new(arena, pool, interner, &resolved);
    let switch_reports: Vec<SwitchReport> = unit
        .switches
        .iter()
        .zip(&switch_types)
        .map(|(switch, &ty)| checker.check(&switch.cases, ty, switch.span, &mut diagnostics))
        .collect();

    // Branch planning
    let mut code = CodeStream::new(config.local_variable_table);
    let mut emitted = Vec::new();
    {
        let mut cg = PatternCodegen::new(arena, pool, &resolved, &flow_table, &snapshots, &mut code);
        for (site, &selector_ty) in unit.sites.iter().zip(&site_types) {
            cancel.check()?;
            let value = cg.code_mut().new_value();
            cg.code_mut().emit(Instr::EvalOperand {
                dest: value,
                expr: site.selector,
            });
            let no_match = cg.code_mut().new_label();
            let targets = BranchTargets::new(None, Some(no_match));
            emitted.push(cg.generate_optimized_boolean(site.pattern, value, selector_ty, targets)?);
            cg.full_wrapup_generation(site.pattern);
            cg.code_mut().place_label(no_match);
        }
        for (switch, &selector_ty) in unit.switches.iter().zip(&switch_types) {
            cancel.check()?;
            let value = cg.code_mut().new_value();
            cg.code_mut().emit(Instr::EvalOperand {
                dest: value,
                expr: switch.selector,
            });
            let end = cg.code_mut().new_label();
            for &case in &switch.cases {
                let next = cg.code_mut().new_label();
                let targets = BranchTargets::new(None, Some(next));
                emitted.push(cg.generate_optimized_boolean(case, value, selector_ty, targets)?);
                cg.full_wrapup_generation(case);
                cg.code_mut().goto(end);
                cg.code_mut().place_label(next);
            }
            cg.code_mut().place_label(end);
        }
    }

    let diagnostics = diagnostics.flush();
    if !diagnostics.is_empty() {
        warn!(errors = diagnostics.len(), "unit compiled with errors");
    }
    debug!(
        states = flow_table.len(),
        instrs = code.instrs().len(),
        "unit compiled"
    );
    Ok(CompiledUnit {
        name: unit.name.clone(),
        diagnostics,
        resolved,
        flow_table,
        snapshots,
        code: code.finish(),
        emitted,
        switch_reports,
    })
}

/// Compile independent units in parallel. Results keep the input order.
pub fn compile_units(
    units: &[CompilationUnit],
    pool: &Pool,
    interner: &StringInterner,
    config: &PatternConfig,
    cancel: &CancellationFlag,
) -> Vec<Result<CompiledUnit, CompileError>> {
    units
        .par_iter()
        .map(|unit| compile_unit(unit, pool, interner, config, cancel))
        .collect()
}
