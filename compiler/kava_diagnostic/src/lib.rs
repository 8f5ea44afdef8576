//! Diagnostics for pattern compilation.
//!
//! Passes never fail on user errors; they build a [`Diagnostic`] and push it
//! into a [`DiagnosticQueue`], then carry on with degraded information.

mod diagnostic;
mod error_code;
pub mod queue;

pub use diagnostic::{
    guard_always_false, guard_not_boolean, incompatible_pattern_type, unknown_name, unknown_type,
    Diagnostic, Label,
};
pub use error_code::ErrorCode;
pub use queue::{DiagnosticConfig, DiagnosticQueue};
