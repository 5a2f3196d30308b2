//! Coordinator facade.
//!
//! [`ResilienceCoordinator`] is the single entry surface for raw failures:
//! one `handle_*_error` method per failure origin. Each call classifies the
//! failure, appends the record to the bounded history, emits the origin's
//! category event, and dispatches the recovery action. Only the
//! authentication entry point suspends - it awaits the credential refresh
//! handshake. Everything else is synchronous end-to-end.

use crate::classifier::ErrorClassifier;
use crate::config::CoordinatorConfig;
use crate::dispatch::RecoveryDispatcher;
use crate::error::{ErrorCategory, ErrorContext, ErrorRecord, RecoveryAction};
use crate::events::{CoordinatorEvent, EventBus};
use crate::history::{ErrorStatistics, HistoryStore};
use crate::logging::log_warn;
use crate::refresh::TokenRefreshCoordinator;
use std::fmt::Display;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::broadcast;

/// The failure origins exposed as entry points. Each maps one-to-one onto
/// the category hint passed to the classifier and the category event emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FailureOrigin {
    Connection,
    Authentication,
    Protocol,
    Network,
    Server,
    Timeout,
}

impl FailureOrigin {
    fn category(self) -> ErrorCategory {
        match self {
            Self::Connection => ErrorCategory::Connection,
            Self::Authentication => ErrorCategory::Authentication,
            Self::Protocol => ErrorCategory::Protocol,
            Self::Network => ErrorCategory::Network,
            Self::Server => ErrorCategory::Server,
            Self::Timeout => ErrorCategory::Timeout,
        }
    }

    fn event(self, record: ErrorRecord) -> CoordinatorEvent {
        match self {
            Self::Connection => CoordinatorEvent::ConnectionError(record),
            Self::Authentication => CoordinatorEvent::AuthenticationError(record),
            Self::Protocol => CoordinatorEvent::ProtocolError(record),
            Self::Network => CoordinatorEvent::NetworkError(record),
            Self::Server => CoordinatorEvent::ServerError(record),
            Self::Timeout => CoordinatorEvent::TimeoutError(record),
        }
    }
}

/// Connection-resilience coordinator.
///
/// Wires the classifier, bounded history, event bus, refresh coordinator,
/// and recovery dispatcher together behind one entry point per failure
/// origin. Raw failures are never re-thrown: every outcome is communicated
/// as a [`CoordinatorEvent`] and each entry point returns the classified
/// [`ErrorRecord`] for inspection.
///
/// # Example
///
/// ```rust,no_run
/// use conn_resilience::{CoordinatorConfig, ResilienceCoordinator};
///
/// # async fn example() {
/// let coordinator = ResilienceCoordinator::new(CoordinatorConfig::default());
/// let mut events = coordinator.subscribe();
///
/// let record = coordinator.handle_connection_error("connection refused", None);
/// assert!(record.retryable);
/// # }
/// ```
pub struct ResilienceCoordinator {
    config: CoordinatorConfig,
    classifier: ErrorClassifier,
    history: Mutex<HistoryStore>,
    bus: EventBus,
    dispatcher: RecoveryDispatcher,
}

impl ResilienceCoordinator {
    /// Create a coordinator from configuration.
    pub fn new(config: CoordinatorConfig) -> Self {
        let bus = EventBus::new(config.event_capacity);
        let classifier = ErrorClassifier::new(&config);
        let refresh = TokenRefreshCoordinator::new(bus.clone(), config.refresh_timeout);
        let dispatcher = RecoveryDispatcher::new(bus.clone(), refresh, classifier);
        let history = Mutex::new(HistoryStore::new(
            config.max_history_size,
            config.persistent_threshold,
            config.recent_window,
        ));

        Self {
            config,
            classifier,
            history,
            bus,
            dispatcher,
        }
    }

    /// Subscribe to all coordinator events.
    pub fn subscribe(&self) -> broadcast::Receiver<CoordinatorEvent> {
        self.bus.subscribe()
    }

    /// The event bus this coordinator publishes on.
    pub fn event_bus(&self) -> &EventBus {
        &self.bus
    }

    // ========================================================================
    // Entry points, one per failure origin
    // ========================================================================

    /// Handle a failure of the long-lived connection itself.
    pub fn handle_connection_error(
        &self,
        failure: impl Display,
        context: Option<ErrorContext>,
    ) -> ErrorRecord {
        self.handle(failure, FailureOrigin::Connection, context)
    }

    /// Handle a credential failure and drive the refresh handshake.
    ///
    /// The only suspending entry point: when the classified record's action
    /// is a token refresh, this awaits the bounded handshake with the
    /// credential provider and reports `AuthenticationRecovered` or
    /// `AuthenticationFailed` before returning.
    pub async fn handle_authentication_error(
        &self,
        failure: impl Display,
        context: Option<ErrorContext>,
    ) -> ErrorRecord {
        let record = self.handle(failure, FailureOrigin::Authentication, context);
        if record.recovery_action == RecoveryAction::RefreshToken {
            self.dispatcher.run_refresh_handshake(&record).await;
        }
        record
    }

    /// Handle malformed or unparseable traffic. The offending payload, when
    /// available, is carried in the record's context for diagnostics.
    pub fn handle_protocol_error(
        &self,
        failure: impl Display,
        payload: Option<serde_json::Value>,
        context: Option<ErrorContext>,
    ) -> ErrorRecord {
        let context = match payload {
            Some(payload) => Some(
                context
                    .unwrap_or_default()
                    .with_metadata("payload", payload),
            ),
            None => context,
        };
        self.handle(failure, FailureOrigin::Protocol, context)
    }

    /// Handle a lower-level network failure.
    pub fn handle_network_error(
        &self,
        failure: impl Display,
        context: Option<ErrorContext>,
    ) -> ErrorRecord {
        self.handle(failure, FailureOrigin::Network, context)
    }

    /// Handle a remote-side failure.
    pub fn handle_server_error(
        &self,
        failure: impl Display,
        context: Option<ErrorContext>,
    ) -> ErrorRecord {
        self.handle(failure, FailureOrigin::Server, context)
    }

    /// Handle an operation that exceeded its deadline.
    pub fn handle_timeout_error(
        &self,
        failure: impl Display,
        context: Option<ErrorContext>,
    ) -> ErrorRecord {
        self.handle(failure, FailureOrigin::Timeout, context)
    }

    // ========================================================================
    // Diagnostics surface
    // ========================================================================

    /// Snapshot of the retained history, oldest to newest.
    pub fn error_history(&self) -> Vec<ErrorRecord> {
        self.history().all().cloned().collect()
    }

    /// Aggregate statistics over the retained history.
    pub fn error_statistics(&self) -> ErrorStatistics {
        self.history().statistics()
    }

    /// Whether `category` is failing persistently within `window`
    /// (the configured default window when `None`).
    pub fn is_persistent_issue(&self, category: ErrorCategory, window: Option<Duration>) -> bool {
        let window = window.unwrap_or(self.config.persistent_window);
        self.history().is_persistent_issue(category, window)
    }

    /// Drop all retained history.
    pub fn clear_history(&self) {
        self.history().clear();
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Classify, store, emit the origin's category event, and dispatch
    /// recovery. Synchronous; never suspends.
    fn handle(
        &self,
        failure: impl Display,
        origin: FailureOrigin,
        context: Option<ErrorContext>,
    ) -> ErrorRecord {
        let message = failure.to_string();
        let record = self
            .classifier
            .classify(&message, origin.category(), context);

        log_warn!(
            origin = ?origin,
            category = ?record.category,
            severity = ?record.severity,
            code = %record.code,
            "Handling raw failure"
        );

        self.history().append(record.clone());
        self.bus.emit(origin.event(record.clone()));
        self.dispatcher.dispatch(&record);

        record
    }

    /// The lock is never held across an await; a poisoned lock is recovered
    /// since the history holds no cross-record invariants.
    fn history(&self) -> MutexGuard<'_, HistoryStore> {
        match self.history.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
