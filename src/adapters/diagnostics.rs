//! Diagnostics sink adapters.

use crate::ports::diagnostics_port::DiagnosticsPort;

/// Writes every note to stderr, keeping stdout clean for reports.
pub struct StderrDiagnostics;

impl DiagnosticsPort for StderrDiagnostics {
    fn note(&self, message: &str) {
        eprintln!("{message}");
    }
}

/// Swallows everything; the default for quiet runs and tests.
pub struct NullDiagnostics;

impl DiagnosticsPort for NullDiagnostics {
    fn note(&self, _message: &str) {}
}
