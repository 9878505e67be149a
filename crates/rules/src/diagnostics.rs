//! Structured diagnostics collected during validation and loading.
//!
//! A [`Diagnostics`] collector is passed explicitly into the validator and the
//! loader so each load operation owns its own record of what was accepted,
//! rejected and why. Every entry is also emitted as a `tracing` event.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Severity level for diagnostic entries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Info,
    Warning,
    Error,
}

impl Level {
    /// Numeric severity for comparison (higher = more severe).
    pub fn as_severity(&self) -> u8 {
        match self {
            Level::Info => 0,
            Level::Warning => 1,
            Level::Error => 2,
        }
    }
}

/// What a diagnostic is about.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Elements do not uniformly carry `{Tag, Required[, Optional]}`.
    BaseStructure,
    /// `Tag.Class` differs between elements.
    InconsistentClass,
    /// Class segment of `Tag.Class` is not a fixed class name.
    UnknownClass,
    /// Class is declared but has no entry in the class rules.
    MissingRule,
    /// `Required` key set differs from the class rule.
    MissingRequired,
    /// Origin/Study key set differs from the origin rules.
    OriginFields,
    /// Content has the wrong JSON type where a mapping or string was expected.
    IllTyped,
    /// Member file could not be read or parsed.
    Unreadable,
    /// File was dropped from the merged tree.
    Rejected,
    /// A check passed, or a file was validated and merged.
    Accepted,
    /// Content carries no `Optional` group.
    OptionalAbsent,
}

impl DiagnosticKind {
    /// True for every kind that makes a document invalid.
    pub fn is_violation(&self) -> bool {
        !matches!(
            self,
            DiagnosticKind::Accepted | DiagnosticKind::OptionalAbsent | DiagnosticKind::Rejected
        )
    }
}

/// A single diagnostic entry.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub timestamp: DateTime<Utc>,
    /// File (or label) the entry refers to; empty when unscoped.
    pub source: String,
    pub level: Level,
    pub kind: DiagnosticKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Ordered collector of [`Diagnostic`] entries.
#[derive(Debug, Default)]
pub struct Diagnostics {
    source: String,
    entries: Vec<Diagnostic>,
    recovered: bool,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the source label applied to subsequent entries.
    pub fn scoped(&mut self, source: impl Into<String>) -> &mut Self {
        self.source = source.into();
        self
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Mark subsequent errors as recovered by the caller; returns the previous mode.
    ///
    /// Recovered errors are still collected at [`Level::Error`] but are traced
    /// at `WARN`.
    pub fn set_recovered(&mut self, recovered: bool) -> bool {
        std::mem::replace(&mut self.recovered, recovered)
    }

    fn event_level(&self, level: Level) -> tracing::Level {
        match level {
            Level::Info => tracing::Level::INFO,
            Level::Warning => tracing::Level::WARN,
            Level::Error if self.recovered => tracing::Level::WARN,
            Level::Error => tracing::Level::ERROR,
        }
    }

    pub fn info(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        self.push(Level::Info, kind, message.into(), None);
    }

    pub fn warn(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        self.push(Level::Warning, kind, message.into(), None);
    }

    pub fn error(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        self.push(Level::Error, kind, message.into(), None);
    }

    pub fn error_with_details(
        &mut self,
        kind: DiagnosticKind,
        message: impl Into<String>,
        details: serde_json::Value,
    ) {
        self.push(Level::Error, kind, message.into(), Some(details));
    }

    fn push(
        &mut self,
        level: Level,
        kind: DiagnosticKind,
        message: String,
        details: Option<serde_json::Value>,
    ) {
        let event_level = self.event_level(level);
        if event_level == tracing::Level::ERROR {
            tracing::error!(source = %self.source, ?kind, "{message}");
        } else if event_level == tracing::Level::WARN {
            tracing::warn!(source = %self.source, ?kind, "{message}");
        } else {
            tracing::info!(source = %self.source, ?kind, "{message}");
        }
        self.entries.push(Diagnostic {
            timestamp: Utc::now(),
            source: self.source.clone(),
            level,
            kind,
            message,
            details,
        });
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    /// Entries appended since `mark` (a previous [`len`](Self::len)).
    pub fn since(&self, mark: usize) -> &[Diagnostic] {
        &self.entries[mark.min(self.entries.len())..]
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(|d| d.level == Level::Error)
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    pub fn for_source<'a>(&'a self, source: &'a str) -> impl Iterator<Item = &'a Diagnostic> + 'a {
        self.entries.iter().filter(move |d| d.source == source)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<Diagnostic> {
        self.entries
    }
}
