//! Pattern compilation for Kava: binding collection, resolution, flow
//! analysis, static relations and branch planning.
//!
//! Passes run in order over one [`session::CompilationUnit`]:
//!
//! 1. [`resolve`] types patterns and their guards into a side table.
//! 2. [`flow`] computes definite assignment and records the flow-state
//!    snapshots that code generation replays.
//! 3. [`switch`] uses [`relations`] to report dominated and missing cases.
//! 4. [`codegen`] plans short-circuit branches and keeps the local-variable
//!    table in step with the flow snapshots.
//!
//! The syntax tree is never mutated; every pass writes its own table keyed
//! by arena ids.

pub mod bindings;
pub mod codegen;
pub mod const_fold;
mod error;
pub mod flow;
pub mod relations;
pub mod resolve;
pub mod session;
pub mod switch;

#[cfg(test)]
mod test_support;

pub use bindings::{bindings_when_true, BindingSet};
pub use codegen::{BranchTargets, CodeStream, EmittedPattern, Label, PatternCodegen, PlanPhase};
pub use const_fold::{optimized_boolean_constant, Constant};
pub use error::CompileError;
pub use flow::{FlowAnalyzer, FlowInfo, FlowSnapshots, FlowStateIndex, FlowStateTable};
pub use relations::Relations;
pub use resolve::{LocalScope, ResolvedPatterns, Resolver};
pub use session::{
    compile_unit, compile_units, CancellationFlag, CompilationUnit, CompiledUnit, MatchSite,
    PatternConfig, SwitchSite,
};
pub use switch::{SwitchChecker, SwitchReport};

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install a `tracing` subscriber filtered by `RUST_LOG`.
///
/// Does nothing unless `RUST_LOG` is set, and only runs once per process.
/// Use `RUST_LOG=kava_patterns=debug` to see planning decisions, or
/// `trace` for every emitted instruction.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
