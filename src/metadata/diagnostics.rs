//! Diagnostics collection for allocation runs.
//!
//! The allocator distinguishes fatal invariant violations (surfaced as
//! [`crate::Error`]) from recoverable anomalies: a launch-profile entry that names no
//! known class, a mismatch between predicted and actual reference sets at flush time,
//! a canary class that had to be synthesized. Recoverable anomalies are reported here
//! and execution continues.
//!
//! The [`Diagnostics`] container uses `boxcar::Vec` for lock-free append operations,
//! so class-model construction and plugins may report from any thread without
//! coordination.
//!
//! # Usage Examples
//!
//! ```rust
//! use interdex::metadata::diagnostics::{Diagnostics, DiagnosticCategory};
//!
//! let diagnostics = Diagnostics::new();
//! diagnostics.warning(DiagnosticCategory::Flush, "could not find ref in predicted set");
//!
//! assert!(diagnostics.has_any());
//! for entry in diagnostics.iter() {
//!     println!("{entry}");
//! }
//! ```

use std::fmt;

/// Severity level of a diagnostic entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticSeverity {
    /// Informational message, not indicating a problem.
    Info,

    /// Warning about an anomaly the allocator compensated for.
    Warning,

    /// Error-level anomaly; the run continued but the output may be degraded.
    Error,
}

impl fmt::Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticSeverity::Info => write!(f, "INFO"),
            DiagnosticSeverity::Warning => write!(f, "WARN"),
            DiagnosticSeverity::Error => write!(f, "ERROR"),
        }
    }
}

/// Category indicating the source of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCategory {
    /// Launch-profile processing (unknown entries, marker handling).
    Profile,

    /// Per-class emission decisions (skips, capacity flushes).
    Emit,

    /// Container flush bookkeeping (predicted vs actual reference sets).
    Flush,

    /// Canary sentinel handling (lookup misses, synthesis).
    Canary,

    /// Mixed-mode set handling.
    MixedMode,

    /// Cold-start pruning progress.
    Prune,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticCategory::Profile => write!(f, "Profile"),
            DiagnosticCategory::Emit => write!(f, "Emit"),
            DiagnosticCategory::Flush => write!(f, "Flush"),
            DiagnosticCategory::Canary => write!(f, "Canary"),
            DiagnosticCategory::MixedMode => write!(f, "MixedMode"),
            DiagnosticCategory::Prune => write!(f, "Prune"),
        }
    }
}

/// A single diagnostic entry with context information.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Severity level of this diagnostic.
    pub severity: DiagnosticSeverity,

    /// Category indicating the source of this diagnostic.
    pub category: DiagnosticCategory,

    /// Human-readable description of the observation.
    pub message: String,

    /// Optional class descriptor related to the observation.
    pub class_name: Option<String>,

    /// Optional output container index related to the observation.
    pub dex_index: Option<usize>,
}

impl Diagnostic {
    /// Creates a new diagnostic entry.
    pub fn new(
        severity: DiagnosticSeverity,
        category: DiagnosticCategory,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category,
            message: message.into(),
            class_name: None,
            dex_index: None,
        }
    }

    /// Adds a class descriptor to the diagnostic.
    #[must_use]
    pub fn with_class(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    /// Adds an output container index to the diagnostic.
    #[must_use]
    pub fn with_dex_index(mut self, dex_index: usize) -> Self {
        self.dex_index = Some(dex_index);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.category, self.message)?;

        if let Some(class_name) = &self.class_name {
            write!(f, " (class: {class_name})")?;
        }

        if let Some(dex_index) = self.dex_index {
            write!(f, " (dex: {dex_index})")?;
        }

        Ok(())
    }
}

/// Thread-safe container for collecting diagnostic entries.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: boxcar::Vec<Diagnostic>,
}

impl Diagnostics {
    /// Creates a new empty diagnostics container.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: boxcar::Vec::new(),
        }
    }

    /// Adds an informational diagnostic.
    pub fn info(&self, category: DiagnosticCategory, message: impl Into<String>) {
        self.push(Diagnostic::new(DiagnosticSeverity::Info, category, message));
    }

    /// Adds a warning diagnostic.
    pub fn warning(&self, category: DiagnosticCategory, message: impl Into<String>) {
        self.push(Diagnostic::new(
            DiagnosticSeverity::Warning,
            category,
            message,
        ));
    }

    /// Adds an error diagnostic.
    pub fn error(&self, category: DiagnosticCategory, message: impl Into<String>) {
        self.push(Diagnostic::new(
            DiagnosticSeverity::Error,
            category,
            message,
        ));
    }

    /// Adds a diagnostic entry directly.
    ///
    /// Use this for diagnostics that carry a class descriptor or container index.
    pub fn push(&self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }

    /// Returns true if any diagnostics have been collected.
    pub fn has_any(&self) -> bool {
        self.entries.count() > 0
    }

    /// Returns true if any warning-level diagnostics have been collected.
    pub fn has_warnings(&self) -> bool {
        self.entries
            .iter()
            .any(|(_, d)| d.severity == DiagnosticSeverity::Warning)
    }

    /// Number of warning-level diagnostics collected.
    pub fn warning_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|(_, d)| d.severity == DiagnosticSeverity::Warning)
            .count()
    }

    /// Total number of diagnostics collected.
    pub fn count(&self) -> usize {
        self.entries.count()
    }

    /// Iterates over the collected diagnostics in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().map(|(_, d)| d)
    }
}
