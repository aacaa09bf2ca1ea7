//! Diagnostic sink.
//!
//! Unexpected repository failures and skipped entries are recorded here.
//! The sink is an explicit dependency shared by the builder and the adapter;
//! switching verbosity swaps the sink, nothing else.

use std::sync::{Arc, Mutex, RwLock};

/// How bad a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Repository failure that may indicate corruption.
    Unexpected,
    /// An entry that could not be exposed and was left out.
    Skipped,
}

/// One diagnostic record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
}

/// Destination for diagnostic records.
pub trait DiagnosticSink: Send + Sync {
    fn record(&self, diagnostic: &Diagnostic);
}

/// Discards everything. The default.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn record(&self, _diagnostic: &Diagnostic) {}
}

/// Routes diagnostics to `tracing` under the `gitview` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record(&self, diagnostic: &Diagnostic) {
        match diagnostic.severity {
            Severity::Unexpected => {
                tracing::warn!(target: "gitview", "unexpected error: {}", diagnostic.message)
            }
            Severity::Skipped => tracing::debug!(target: "gitview", "{}", diagnostic.message),
        }
    }
}

/// Keeps every record in memory.
#[derive(Debug, Default)]
pub struct BufferSink {
    records: Mutex<Vec<Diagnostic>>,
}

impl BufferSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    pub fn records(&self) -> Vec<Diagnostic> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.records()
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }
}

impl DiagnosticSink for BufferSink {
    fn record(&self, diagnostic: &Diagnostic) {
        if let Ok(mut records) = self.records.lock() {
            records.push(diagnostic.clone());
        }
    }
}

/// Shared handle to the current sink.
///
/// Cloning is cheap; all clones see sink swaps.
#[derive(Clone)]
pub struct Diagnostics {
    sink: Arc<RwLock<Arc<dyn DiagnosticSink>>>,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::with_sink(Arc::new(NullSink))
    }
}

impl Diagnostics {
    /// A handle that discards everything until made verbose.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sink(sink: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            sink: Arc::new(RwLock::new(sink)),
        }
    }

    /// Replace the sink for every holder of this handle.
    pub fn set_sink(&self, sink: Arc<dyn DiagnosticSink>) {
        let mut current = self.sink.write().unwrap_or_else(|e| e.into_inner());
        *current = sink;
    }

    /// `true` routes to [`TracingSink`], `false` to [`NullSink`].
    pub fn set_verbose(&self, verbose: bool) {
        if verbose {
            self.set_sink(Arc::new(TracingSink));
        } else {
            self.set_sink(Arc::new(NullSink));
        }
    }

    pub fn record(&self, severity: Severity, message: impl Into<String>) {
        let sink = self.sink.read().unwrap_or_else(|e| e.into_inner()).clone();
        sink.record(&Diagnostic {
            severity,
            message: message.into(),
        });
    }

    pub fn unexpected(&self, message: impl Into<String>) {
        self.record(Severity::Unexpected, message);
    }

    pub fn skipped(&self, message: impl Into<String>) {
        self.record(Severity::Skipped, message);
    }
}

impl std::fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Diagnostics").finish_non_exhaustive()
    }
}
