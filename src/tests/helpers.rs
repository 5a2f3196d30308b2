//! Shared helpers for unit tests.

use crate::error::{ErrorCategory, ErrorRecord, ErrorSeverity, RecoveryAction};
use crate::events::CoordinatorEvent;
use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Build a minimal record for history tests, with a controlled timestamp.
pub fn record_at(
    category: ErrorCategory,
    timestamp: DateTime<Utc>,
    code: &str,
) -> ErrorRecord {
    ErrorRecord {
        id: Uuid::new_v4(),
        category,
        severity: ErrorSeverity::Medium,
        code: code.to_string(),
        message: format!("test failure: {code}"),
        timestamp,
        context: None,
        retryable: false,
        recovery_action: RecoveryAction::LogOnly,
    }
}

/// Drain every buffered event from a receiver and return their names in
/// emission order. Only usable once the emitting side has gone quiet.
pub fn drain_event_names(rx: &mut broadcast::Receiver<CoordinatorEvent>) -> Vec<&'static str> {
    let mut names = Vec::new();
    while let Ok(event) = rx.try_recv() {
        names.push(event.name());
    }
    names
}

/// Drain every buffered event from a receiver.
pub fn drain_events(rx: &mut broadcast::Receiver<CoordinatorEvent>) -> Vec<CoordinatorEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
