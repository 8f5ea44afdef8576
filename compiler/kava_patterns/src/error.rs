use kava_ir::PatternId;
use thiserror::Error;

/// Hard failures of a compilation session.
///
/// User mistakes are never reported here; they become diagnostics and
/// compilation continues. These are the cases where a unit cannot be
/// compiled at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("compilation cancelled")]
    Cancelled,
    /// A guarded pattern reached analysis without sub-patterns; the parser
    /// never builds one.
    #[error("guarded pattern {0:?} has no sub-patterns")]
    EmptyGuardedPattern(PatternId),
    #[error("pattern {0:?} does not belong to this unit")]
    UnknownPattern(PatternId),
    #[error("pattern {0:?} must be flow-analyzed before code generation")]
    NotFlowAnalyzed(PatternId),
}
