//! Implements DiagnosticsPort on top of `tracing`.

use crate::ports::DiagnosticsPort;
use tracing::warn;

/// Forwards operator diagnostics to the `medpet::diagnostics` tracing target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl DiagnosticsPort for TracingDiagnostics {
    fn warn(&self, message: &str) {
        warn!(target: "medpet::diagnostics", "{}", message);
    }
}
