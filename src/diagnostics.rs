use std::fmt;

use tracing::{error, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Warning,
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
            Severity::Fatal => f.write_str("fatal"),
        }
    }
}

/// Receiver for configuration warnings and fatal errors.
///
/// A fatal entry is always followed by an `Err` returned to the caller; the
/// sink only records it.
pub trait DiagnosticsSink {
    fn log(&mut self, message: &str, severity: Severity);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticsSink for TracingSink {
    fn log(&mut self, message: &str, severity: Severity) {
        match severity {
            Severity::Warning => warn!("{}", message),
            Severity::Fatal => error!("{}", message),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CollectingSink {
    pub entries: Vec<(Severity, String)>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.entries.iter().filter(|(s, _)| *s == severity).count()
    }

    pub fn has_fatal(&self) -> bool {
        self.count(Severity::Fatal) > 0
    }
}

impl DiagnosticsSink for CollectingSink {
    fn log(&mut self, message: &str, severity: Severity) {
        self.entries.push((severity, message.to_string()));
    }
}
