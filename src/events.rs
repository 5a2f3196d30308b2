//! Publish/subscribe surface for classified errors and recovery intents.
//!
//! The coordinator is a terminal sink for raw failures and a source for
//! recovery intents: nothing is re-thrown, everything is reported as a
//! [`CoordinatorEvent`] over a broadcast channel. External collaborators
//! (connection manager, credential provider, UI layer) subscribe and react.
//!
//! The one bidirectional exchange is the token refresh handshake: the
//! [`CoordinatorEvent::TokenRefreshRequested`] payload carries a
//! [`RefreshHandle`] the credential provider settles with
//! [`RefreshHandle::resolve`] or [`RefreshHandle::reject`].

use crate::error::ErrorRecord;
use crate::logging::log_debug;
use std::sync::{Arc, Mutex};
use tokio::sync::{broadcast, oneshot};

/// Settlement payload for the refresh handshake: `Ok(())` on success,
/// `Err(reason)` on explicit rejection.
pub(crate) type RefreshSettlement = Result<(), String>;

/// Single-settle completion handle for a token refresh handshake.
///
/// Clonable so it can travel over the broadcast bus; only the first call to
/// [`resolve`](Self::resolve) or [`reject`](Self::reject) across all clones
/// has any effect. Later calls are no-ops, which makes the timeout race in
/// the refresh coordinator safe: whichever side settles first wins.
#[derive(Debug, Clone)]
pub struct RefreshHandle {
    slot: Arc<Mutex<Option<oneshot::Sender<RefreshSettlement>>>>,
}

impl RefreshHandle {
    pub(crate) fn new(sender: oneshot::Sender<RefreshSettlement>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(sender))),
        }
    }

    /// Report a successful credential refresh. No-op if already settled.
    pub fn resolve(&self) {
        if let Some(sender) = self.take() {
            let _ = sender.send(Ok(()));
        }
    }

    /// Report a failed credential refresh. No-op if already settled.
    pub fn reject(&self, reason: impl Into<String>) {
        if let Some(sender) = self.take() {
            let _ = sender.send(Err(reason.into()));
        }
    }

    fn take(&self) -> Option<oneshot::Sender<RefreshSettlement>> {
        match self.slot.lock() {
            Ok(mut slot) => slot.take(),
            // A poisoned slot means a settler panicked mid-take; the
            // handshake falls through to its timeout.
            Err(_) => None,
        }
    }
}

/// Events emitted by the coordinator, plus the refresh handshake request.
///
/// Category events (`ConnectionError` through `TimeoutError`) are keyed by
/// the entry point that observed the failure, not by the classified category.
/// Recovery events (`RequestReconnection` through `PermanentFailure`) carry
/// the record whose recovery action triggered them.
#[derive(Debug, Clone)]
pub enum CoordinatorEvent {
    /// A failure handled via the connection entry point.
    ConnectionError(ErrorRecord),
    /// A failure handled via the authentication entry point.
    AuthenticationError(ErrorRecord),
    /// A failure handled via the protocol entry point.
    ProtocolError(ErrorRecord),
    /// Secondary signal for critical protocol failures, which are otherwise
    /// non-retryable and easy to silently ignore.
    CriticalProtocolError(ErrorRecord),
    /// A failure handled via the network entry point.
    NetworkError(ErrorRecord),
    /// A failure handled via the server entry point.
    ServerError(ErrorRecord),
    /// A failure handled via the timeout entry point.
    TimeoutError(ErrorRecord),

    /// The connection manager should re-establish the connection.
    RequestReconnection(ErrorRecord),
    /// Credentials should be renewed (advisory; the handshake is separate).
    RequestTokenRefresh(ErrorRecord),
    /// The client should fall back to polling.
    RequestFallbackMode(ErrorRecord),
    /// The UI layer should surface this failure to the user.
    RequestUserNotification(ErrorRecord),
    /// Terminal: no further recovery will be attempted for this record.
    PermanentFailure(ErrorRecord),

    /// A credential refresh handshake concluded successfully.
    AuthenticationRecovered,
    /// A credential refresh handshake failed; carries the reclassified record.
    AuthenticationFailed(ErrorRecord),
    /// The credential provider must settle the carried handle within the
    /// refresh window, or the handshake times out.
    TokenRefreshRequested(RefreshHandle),
}

impl CoordinatorEvent {
    /// Stable name of this event, for logging and diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ConnectionError(_) => "connection_error",
            Self::AuthenticationError(_) => "authentication_error",
            Self::ProtocolError(_) => "protocol_error",
            Self::CriticalProtocolError(_) => "critical_protocol_error",
            Self::NetworkError(_) => "network_error",
            Self::ServerError(_) => "server_error",
            Self::TimeoutError(_) => "timeout_error",
            Self::RequestReconnection(_) => "request_reconnection",
            Self::RequestTokenRefresh(_) => "request_token_refresh",
            Self::RequestFallbackMode(_) => "request_fallback_mode",
            Self::RequestUserNotification(_) => "request_user_notification",
            Self::PermanentFailure(_) => "permanent_failure",
            Self::AuthenticationRecovered => "authentication_recovered",
            Self::AuthenticationFailed(_) => "authentication_failed",
            Self::TokenRefreshRequested(_) => "token_refresh_requested",
        }
    }
}

/// Broadcast event bus connecting the coordinator to its collaborators.
///
/// Cheap to clone; all clones publish into the same channel. Subscribers that
/// fall more than the configured capacity behind lose the oldest events -
/// recovery intents are advisory, so lagging consumers see a
/// `RecvError::Lagged` and continue rather than stalling the coordinator.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoordinatorEvent>,
}

impl EventBus {
    /// Create a bus buffering up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribe to all subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<CoordinatorEvent> {
        self.sender.subscribe()
    }

    /// Publish an event. Having no subscribers is not an error; the event is
    /// simply dropped.
    pub fn emit(&self, event: CoordinatorEvent) {
        let name = event.name();
        match self.sender.send(event) {
            Ok(receivers) => {
                log_debug!(event = name, receivers = receivers, "Emitted event");
            }
            Err(_) => {
                log_debug!(event = name, "Emitted event with no subscribers");
            }
        }
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
