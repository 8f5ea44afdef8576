//! Diagnostic queue: the sink every pass reports into.
//!
//! Features:
//! - Error limits to prevent overwhelming output
//! - Deduplication of repeated reports at one location
//! - Follow-on error filtering

use kava_ir::Span;

use crate::{Diagnostic, ErrorCode};

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DiagnosticConfig {
    /// Maximum number of errors before stopping (0 = unlimited).
    pub error_limit: usize,
    /// Drop errors that mention the error type, which only arise after
    /// an earlier failure.
    pub filter_follow_on: bool,
    /// Drop an error identical in code and location to an earlier one.
    pub deduplicate: bool,
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        DiagnosticConfig {
            error_limit: 10,
            filter_follow_on: true,
            deduplicate: true,
        }
    }
}

impl DiagnosticConfig {
    /// No limits, no filtering (for testing).
    pub fn unlimited() -> Self {
        DiagnosticConfig {
            error_limit: 0,
            filter_follow_on: false,
            deduplicate: false,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
struct QueuedDiagnostic {
    diagnostic: Diagnostic,
    /// Sort key: primary span start, or 0 when the diagnostic has none.
    offset: u32,
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DiagnosticQueue {
    diagnostics: Vec<QueuedDiagnostic>,
    error_count: usize,
    /// Set once the E9002 marker has been queued.
    limit_reported: bool,
    config: DiagnosticConfig,
}

impl Default for DiagnosticQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagnosticQueue {
    pub fn new() -> Self {
        Self::with_config(DiagnosticConfig::default())
    }

    pub fn with_config(config: DiagnosticConfig) -> Self {
        DiagnosticQueue {
            diagnostics: Vec::new(),
            error_count: 0,
            limit_reported: false,
            config,
        }
    }

    /// Add a diagnostic. Returns `false` if it was filtered.
    ///
    /// The diagnostic that reaches the error limit is followed by a single
    /// "too many errors" report; everything after it is dropped.
    pub fn add(&mut self, diag: Diagnostic) -> bool {
        if self.limit_reached() {
            return false;
        }

        if self.config.filter_follow_on && Self::is_follow_on(&diag) {
            return false;
        }

        let primary = diag.primary_span();
        let offset = primary.map_or(0, |s| s.start);
        if self.config.deduplicate && self.is_duplicate(&diag, offset) {
            return false;
        }

        self.error_count += 1;
        self.diagnostics.push(QueuedDiagnostic {
            diagnostic: diag,
            offset,
        });

        if self.limit_reached() && !self.limit_reported {
            self.limit_reported = true;
            let span = primary.unwrap_or(Span::DUMMY);
            self.diagnostics.push(QueuedDiagnostic {
                diagnostic: too_many_errors(self.config.error_limit, span),
                offset: span.end,
            });
        }
        true
    }

    pub fn limit_reached(&self) -> bool {
        self.config.error_limit > 0 && self.error_count >= self.config.error_limit
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Sort by source position and drain the queue.
    pub fn flush(&mut self) -> Vec<Diagnostic> {
        // Stable: same-offset diagnostics keep report order.
        self.diagnostics.sort_by_key(|d| d.offset);
        let result = self.diagnostics.drain(..).map(|d| d.diagnostic).collect();
        self.error_count = 0;
        self.limit_reported = false;
        result
    }

    fn is_follow_on(diag: &Diagnostic) -> bool {
        diag.message.contains("<error>")
    }

    fn is_duplicate(&self, diag: &Diagnostic, offset: u32) -> bool {
        self.diagnostics
            .iter()
            .any(|q| q.offset == offset && q.diagnostic.code == diag.code)
    }
}

/// "too many errors" diagnostic, reported once when the limit is hit.
#[cold]
fn too_many_errors(limit: usize, span: Span) -> Diagnostic {
    Diagnostic::error(ErrorCode::E9002)
        .with_message(format!("aborting due to {limit} previous errors"))
        .with_label(span, "error limit reached here")
}
