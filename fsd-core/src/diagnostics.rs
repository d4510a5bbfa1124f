//! Severity-graded status messages produced by matching and reverse lookup.
//!
//! Diagnostics are the only failure channel of the matcher: "no match" and
//! "ambiguous match" are recorded here instead of being returned as errors.
//! Every recorded message is also emitted as a `tracing` event.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Severity {
    Debug,
    Info,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Debug => write!(f, "debug"),
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// One human-readable diagnostic line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusMessage {
    pub severity: Severity,
    pub text: String,
}

/// Ordered list of diagnostics for one matching or lookup pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    /// Prefix for log output, usually the callsign
    #[serde(skip)]
    context: String,
    messages: Vec<StatusMessage>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Diagnostics::default()
    }

    /// Diagnostics whose tracing output is tagged with `context`.
    pub fn for_context(context: &str) -> Self {
        Diagnostics {
            context: context.to_string(),
            messages: Vec::new(),
        }
    }

    pub fn push(&mut self, severity: Severity, text: impl Into<String>) {
        let text = text.into();
        match severity {
            Severity::Debug => tracing::debug!(context = %self.context, "{text}"),
            Severity::Info => tracing::info!(context = %self.context, "{text}"),
            Severity::Warning => tracing::warn!(context = %self.context, "{text}"),
        }
        self.messages.push(StatusMessage { severity, text });
    }

    pub fn debug(&mut self, text: impl Into<String>) {
        self.push(Severity::Debug, text);
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.push(Severity::Info, text);
    }

    pub fn warning(&mut self, text: impl Into<String>) {
        self.push(Severity::Warning, text);
    }

    pub fn messages(&self) -> &[StatusMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// True if any message has at least the given severity.
    pub fn has_at_least(&self, severity: Severity) -> bool {
        self.messages.iter().any(|m| m.severity >= severity)
    }

    /// True if any message contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.messages.iter().any(|m| m.text.contains(needle))
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.messages.extend(other.messages);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
