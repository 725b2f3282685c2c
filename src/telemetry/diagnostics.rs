use std::sync::Mutex;

use serde::Serialize;

/// Classification of a diagnostic so the external scheduler can tell a
/// defective node from bad data or a node that simply cannot run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DiagnosticKind {
    DataQuality,
    Defect,
    Inoperable,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticEvent {
    pub kind: DiagnosticKind,
    pub node: String,
    pub message: String,
}

/// Structured diagnostics sink passed into each derivation.
///
/// Events are also mirrored through the `log` facade at a level matching
/// their kind. Recording takes `&self` so one sink can serve a whole run.
#[derive(Debug, Default)]
pub struct Diagnostics {
    inner: Mutex<Vec<DiagnosticEvent>>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// A candidate result dropped because of bad recorded data. Routine in
    /// production recordings, hence never fatal.
    pub fn data_quality(&self, node: &str, message: impl Into<String>) {
        let message = message.into();
        log::warn!("{}: {}", node, message);
        self.record(DiagnosticKind::DataQuality, node, message);
    }

    /// A programming error in a node implementation.
    pub fn defect(&self, node: &str, message: impl Into<String>) {
        let message = message.into();
        log::error!("{}: {}", node, message);
        self.record(DiagnosticKind::Defect, node, message);
    }

    /// A node excluded from the run because its dependencies are not met.
    pub fn inoperable(&self, node: &str, message: impl Into<String>) {
        let message = message.into();
        log::debug!("{}: {}", node, message);
        self.record(DiagnosticKind::Inoperable, node, message);
    }

    fn record(&self, kind: DiagnosticKind, node: &str, message: String) {
        if let Ok(mut events) = self.inner.lock() {
            events.push(DiagnosticEvent {
                kind,
                node: node.to_string(),
                message,
            });
        }
    }

    /// Snapshot of everything recorded so far.
    pub fn events(&self) -> Vec<DiagnosticEvent> {
        if let Ok(events) = self.inner.lock() {
            events.clone()
        } else {
            Vec::new()
        }
    }

    pub fn count(&self, kind: DiagnosticKind) -> usize {
        if let Ok(events) = self.inner.lock() {
            events.iter().filter(|e| e.kind == kind).count()
        } else {
            0
        }
    }

    pub fn is_empty(&self) -> bool {
        if let Ok(events) = self.inner.lock() {
            events.is_empty()
        } else {
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_accumulate_by_kind() {
        let diag = Diagnostics::new();
        assert!(diag.is_empty());
        diag.data_quality("Airspeed Max", "value is NaN");
        diag.defect("Airspeed Max", "derive not implemented");
        diag.data_quality("Heading At Takeoff", "index is None");
        assert_eq!(diag.count(DiagnosticKind::DataQuality), 2);
        assert_eq!(diag.count(DiagnosticKind::Defect), 1);
        assert_eq!(diag.count(DiagnosticKind::Inoperable), 0);
        assert_eq!(diag.events().len(), 3);
    }
}
