//! Error codes for pattern compilation diagnostics.

use std::fmt;

/// Format: E#### where the first digit names the phase:
/// - E2xxx: Type and name errors in patterns and guards
/// - E3xxx: Pattern errors
/// - E9xxx: Driver limits
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub enum ErrorCode {
    // Type errors (E2xxx)
    /// Guard condition is not boolean
    E2001,
    /// Unknown type name in a pattern
    E2002,
    /// Unknown name in a guard
    E2003,
    /// Operator applied to operands of the wrong type
    E2004,
    /// Local read before it is definitely assigned
    E2005,

    // Pattern errors (E3xxx)
    /// Guard is the constant `false`
    E3001,
    /// Pattern type incompatible with the matched type
    E3002,
    /// Record pattern over a non-record type
    E3003,
    /// Record pattern with the wrong number of components
    E3004,
    /// Case label dominated by an earlier one
    E3005,
    /// Switch does not cover its selector type
    E3006,

    // Driver limits (E9xxx)
    /// Too many errors
    E9002,
}

impl ErrorCode {
    pub const ALL: &'static [ErrorCode] = &[
        ErrorCode::E2001,
        ErrorCode::E2002,
        ErrorCode::E2003,
        ErrorCode::E2004,
        ErrorCode::E2005,
        ErrorCode::E3001,
        ErrorCode::E3002,
        ErrorCode::E3003,
        ErrorCode::E3004,
        ErrorCode::E3005,
        ErrorCode::E3006,
        ErrorCode::E9002,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E2004 => "E2004",
            ErrorCode::E2005 => "E2005",
            ErrorCode::E3001 => "E3001",
            ErrorCode::E3002 => "E3002",
            ErrorCode::E3003 => "E3003",
            ErrorCode::E3004 => "E3004",
            ErrorCode::E3005 => "E3005",
            ErrorCode::E3006 => "E3006",
            ErrorCode::E9002 => "E9002",
        }
    }

    /// One-line summary, used when a diagnostic has no message of its own.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E2001 => "guard condition must be boolean",
            ErrorCode::E2002 => "unknown type",
            ErrorCode::E2003 => "cannot find name in this scope",
            ErrorCode::E2004 => "operator cannot be applied to these operand types",
            ErrorCode::E2005 => "variable might not have been initialized",
            ErrorCode::E3001 => "this guard can never be true",
            ErrorCode::E3002 => "incompatible pattern type",
            ErrorCode::E3003 => "record pattern requires a record type",
            ErrorCode::E3004 => "wrong number of record components",
            ErrorCode::E3005 => "this case label is dominated by a preceding case label",
            ErrorCode::E3006 => "the switch does not cover all possible input values",
            ErrorCode::E9002 => "too many errors",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
