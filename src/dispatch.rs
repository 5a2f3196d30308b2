//! Recovery action dispatch.
//!
//! Once a failure is classified and stored, the dispatcher triggers the side
//! effects its recovery action implies: emit a recovery intent for the
//! connection manager, drive the credential refresh handshake, or just log.
//! Dispatch is side-effect-only; it never returns a value and never throws
//! past the coordinator boundary.

use crate::classifier::ErrorClassifier;
use crate::error::{ErrorCategory, ErrorRecord, ErrorSeverity, RecoveryAction};
use crate::events::{CoordinatorEvent, EventBus};
use crate::logging::{log_error, log_info, log_warn};
use crate::refresh::TokenRefreshCoordinator;

/// Executes the side effects implied by a record's recovery action.
#[derive(Debug, Clone)]
pub struct RecoveryDispatcher {
    bus: EventBus,
    refresh: TokenRefreshCoordinator,
    classifier: ErrorClassifier,
}

impl RecoveryDispatcher {
    /// Create a dispatcher publishing on `bus`.
    pub fn new(
        bus: EventBus,
        refresh: TokenRefreshCoordinator,
        classifier: ErrorClassifier,
    ) -> Self {
        Self {
            bus,
            refresh,
            classifier,
        }
    }

    /// Trigger the synchronous side effects for a classified record.
    ///
    /// For [`RecoveryAction::RefreshToken`] this only emits the advisory
    /// `RequestTokenRefresh` intent; the handshake itself runs through
    /// [`run_refresh_handshake`](Self::run_refresh_handshake) and only for
    /// authentication-origin failures.
    pub fn dispatch(&self, record: &ErrorRecord) {
        match record.recovery_action {
            RecoveryAction::Reconnect => {
                self.bus
                    .emit(CoordinatorEvent::RequestReconnection(record.clone()));
            }
            RecoveryAction::RefreshToken => {
                self.bus
                    .emit(CoordinatorEvent::RequestTokenRefresh(record.clone()));
            }
            RecoveryAction::FallbackPolling => {
                self.bus
                    .emit(CoordinatorEvent::RequestFallbackMode(record.clone()));
            }
            RecoveryAction::NotifyUser => {
                self.bus
                    .emit(CoordinatorEvent::RequestUserNotification(record.clone()));
            }
            RecoveryAction::PermanentFailure => {
                log_error!(
                    code = %record.code,
                    category = ?record.category,
                    "Recovery exhausted, reporting permanent failure"
                );
                self.bus
                    .emit(CoordinatorEvent::PermanentFailure(record.clone()));
            }
            RecoveryAction::LogOnly => {
                log_info!(
                    code = %record.code,
                    category = ?record.category,
                    message = %record.message,
                    "Failure recorded, no recovery action"
                );
            }
        }

        // Critical protocol failures get a secondary signal: their action is
        // log-only, which makes them easy to miss downstream.
        if record.severity == ErrorSeverity::Critical && record.category == ErrorCategory::Protocol
        {
            self.bus
                .emit(CoordinatorEvent::CriticalProtocolError(record.clone()));
        }
    }

    /// Run the credential refresh handshake for an authentication-origin
    /// record and report the outcome over the bus.
    ///
    /// On success emits `AuthenticationRecovered`. On any failure (timeout,
    /// rejection, dropped handle) the original failure is reclassified with
    /// `refresh_attempt` set and emitted as `AuthenticationFailed`.
    pub async fn run_refresh_handshake(&self, record: &ErrorRecord) {
        match self.refresh.refresh().await {
            Ok(()) => {
                log_info!(code = %record.code, "Authentication recovered after token refresh");
                self.bus.emit(CoordinatorEvent::AuthenticationRecovered);
            }
            Err(err) => {
                log_warn!(
                    code = %record.code,
                    error = %err,
                    "Token refresh failed, reporting authentication failure"
                );
                let context = record
                    .context
                    .clone()
                    .unwrap_or_default()
                    .with_refresh_attempt();
                let failed = self.classifier.classify(
                    &record.message,
                    ErrorCategory::Authentication,
                    Some(context),
                );
                self.bus
                    .emit(CoordinatorEvent::AuthenticationFailed(failed));
            }
        }
    }
}
