//! Bounded-time credential refresh handshake.
//!
//! The coordinator holds no network logic: the actual token exchange is
//! performed by an external credential provider listening for
//! [`CoordinatorEvent::TokenRefreshRequested`]. This module emits that
//! request and races the provider's settlement against a fixed timer -
//! whichever settles first determines the outcome, and the loser's effect
//! becomes a no-op.

use crate::error::{CoordinatorError, CoordinatorResult};
use crate::events::{CoordinatorEvent, EventBus, RefreshHandle};
use crate::logging::{log_debug, log_info};
use std::time::Duration;
use tokio::sync::oneshot;

/// Runs the request/response token refresh handshake over the event bus.
///
/// There is no retry loop and no caller-supplied timeout override; retries,
/// if desired, belong to whoever calls the coordinator entry points again.
/// Concurrent handshakes are independent and are not deduplicated.
#[derive(Debug, Clone)]
pub struct TokenRefreshCoordinator {
    bus: EventBus,
    timeout: Duration,
}

impl TokenRefreshCoordinator {
    /// Create a refresh coordinator publishing on `bus` with the given
    /// handshake window.
    pub fn new(bus: EventBus, timeout: Duration) -> Self {
        Self { bus, timeout }
    }

    /// Request fresh credentials and wait for the outcome.
    ///
    /// Emits [`CoordinatorEvent::TokenRefreshRequested`] carrying a
    /// [`RefreshHandle`], then waits for the provider to settle it.
    ///
    /// # Errors
    ///
    /// - [`CoordinatorError::RefreshTimeout`] when nothing settles the handle
    ///   within the window.
    /// - [`CoordinatorError::RefreshRejected`] when the provider rejects.
    /// - [`CoordinatorError::RefreshChannelClosed`] when every clone of the
    ///   handle is dropped unsettled (e.g. no provider is subscribed).
    pub async fn refresh(&self) -> CoordinatorResult<()> {
        let timeout_ms = self.timeout.as_millis() as u64;
        let (sender, receiver) = oneshot::channel();
        let handle = RefreshHandle::new(sender);

        log_debug!(
            timeout_ms = timeout_ms,
            "Requesting token refresh from credential provider"
        );
        self.bus.emit(CoordinatorEvent::TokenRefreshRequested(handle));

        match tokio::time::timeout(self.timeout, receiver).await {
            Ok(Ok(Ok(()))) => {
                log_info!("Token refresh resolved by credential provider");
                Ok(())
            }
            Ok(Ok(Err(reason))) => Err(CoordinatorError::refresh_rejected(reason)),
            Ok(Err(_closed)) => Err(CoordinatorError::refresh_channel_closed()),
            Err(_elapsed) => Err(CoordinatorError::refresh_timeout(timeout_ms)),
        }
    }
}
