//! Error taxonomy and record types for connection resilience.
//!
//! This module provides the data model the coordinator operates on:
//! classified error categories, severity levels, recovery actions, and the
//! immutable [`ErrorRecord`] produced for every raw failure.
//!
//! # Error Handling Example
//!
//! ```rust,no_run
//! use conn_resilience::{ErrorRecord, RecoveryAction};
//!
//! fn handle_record(record: &ErrorRecord) {
//!     // Check if the failure should trigger another attempt
//!     if record.retryable {
//!         println!("Retryable failure: {}", record.message);
//!     }
//!
//!     // Route on the chosen recovery action
//!     match record.recovery_action {
//!         RecoveryAction::Reconnect => println!("Ask the transport to reconnect"),
//!         RecoveryAction::RefreshToken => println!("Renew credentials"),
//!         _ => println!("No automatic recovery"),
//!     }
//! }
//! ```
//!
//! # Result Type
//!
//! Use [`CoordinatorResult<T>`] as a convenient alias for
//! `Result<T, CoordinatorError>`. Only the token refresh handshake produces
//! a [`CoordinatorError`]; classification itself never fails.

use crate::logging::log_warn;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// Classification taxonomy
// ============================================================================

/// Category assigned to a classified failure.
///
/// This is a closed set: every raw failure maps to exactly one category, with
/// [`ErrorCategory::Unknown`] as the safety fallback when no heuristic and no
/// origin hint applies.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Failures of the long-lived connection itself (drops, refused opens).
    Connection,

    /// Credential problems: expired tokens, unauthorized, forbidden.
    Authentication,

    /// Malformed or unparseable traffic. Not retryable - resending the same
    /// bytes reproduces the same failure.
    Protocol,

    /// Lower-level network trouble (unreachable hosts, refused connections).
    Network,

    /// Remote-side failures (5xx-style responses, internal errors).
    Server,

    /// Operations that exceeded their deadline.
    Timeout,

    /// Nothing matched and no origin hint was available.
    Unknown,
}

/// Severity level of a classified failure.
///
/// Totally ordered: `Low < Medium < High < Critical`. Severity is a function
/// of both the failure category and accumulated attempt context, so two
/// structurally identical failures can carry different severities.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ErrorSeverity {
    /// Informational; no action expected.
    Low,

    /// Unexpected but recoverable; the default for unrecognized failures.
    Medium,

    /// An operation failed and recovery should be attempted.
    High,

    /// Repeated failure of the same origin; escalated response required.
    Critical,
}

/// The abstract recovery policy chosen for a classified failure.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryAction {
    /// Ask the connection manager to re-establish the connection.
    Reconnect,

    /// Ask the credential provider for fresh credentials.
    RefreshToken,

    /// Give up on the live connection and fall back to polling.
    FallbackPolling,

    /// Surface the failure to the user.
    NotifyUser,

    /// Record the failure; no side effect beyond the category event.
    LogOnly,

    /// Terminal: no further recovery is attempted for this record.
    PermanentFailure,
}

// ============================================================================
// Error records
// ============================================================================

/// Free-form context supplied alongside a raw failure.
///
/// `attempt_count` drives severity escalation; `refresh_attempt` marks a
/// record produced while reclassifying a failed credential refresh. Anything
/// else rides along in `metadata` as JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorContext {
    /// How many times this failure has been observed in the current call
    /// chain. Drives the escalation policy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attempt_count: Option<u32>,

    /// Set when the record was produced by reclassifying a failure after a
    /// credential refresh handshake failed.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub refresh_attempt: bool,

    /// Arbitrary diagnostic payload (e.g. the offending protocol message).
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub metadata: serde_json::Value,
}

impl ErrorContext {
    /// Set the accumulated attempt count for escalation.
    #[must_use]
    pub fn with_attempt_count(mut self, attempt_count: u32) -> Self {
        self.attempt_count = Some(attempt_count);
        self
    }

    /// Mark this context as belonging to a failed refresh reclassification.
    #[must_use]
    pub fn with_refresh_attempt(mut self) -> Self {
        self.refresh_attempt = true;
        self
    }

    /// Attach a diagnostic key/value pair.
    ///
    /// Values that fail to serialize are silently dropped; context is
    /// advisory and must never block classification.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            if !self.metadata.is_object() {
                self.metadata = serde_json::Value::Object(serde_json::Map::new());
            }
            if let Some(obj) = self.metadata.as_object_mut() {
                obj.insert(key.into(), v);
            }
        }
        self
    }
}

/// Immutable classified representation of one raw failure.
///
/// Created once by the classifier, appended to the bounded history, and then
/// read-only for the rest of its life. There is no mutation API.
///
/// Invariant: `retryable == true` implies `recovery_action` is
/// [`RecoveryAction::Reconnect`] or [`RecoveryAction::RefreshToken`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    /// Unique identifier for this record (UUID v4).
    pub id: Uuid,

    /// The classified category.
    pub category: ErrorCategory,

    /// The assigned severity, after escalation.
    pub severity: ErrorSeverity,

    /// Stable machine-readable code (e.g. `invalid_token`).
    pub code: String,

    /// The raw failure's textual message.
    pub message: String,

    /// When the record was created (UTC).
    pub timestamp: DateTime<Utc>,

    /// Context supplied by the caller, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<ErrorContext>,

    /// Whether another attempt may succeed.
    pub retryable: bool,

    /// The recovery policy chosen for this failure.
    pub recovery_action: RecoveryAction,
}

// ============================================================================
// Coordinator error type
// ============================================================================

/// Convenient result type for coordinator operations.
pub type CoordinatorResult<T> = std::result::Result<T, CoordinatorError>;

/// Errors produced by the coordinator itself.
///
/// Raw failures handed to the entry points are never re-thrown; they become
/// [`ErrorRecord`]s and events. The only fallible internal operation is the
/// credential refresh handshake, whose outcomes are modeled here.
///
/// # Creating Errors
///
/// Use the constructor methods which automatically log the error:
///
/// ```rust
/// use conn_resilience::CoordinatorError;
///
/// let err = CoordinatorError::refresh_timeout(5000);
/// let err = CoordinatorError::refresh_rejected("provider offline");
/// ```
#[derive(Error, Debug)]
pub enum CoordinatorError {
    /// No collaborator settled the refresh handshake within the window.
    ///
    /// Treated identically to an explicit rejection at the recovery level.
    #[error("Token refresh timed out after {timeout_ms}ms")]
    RefreshTimeout {
        /// The handshake window that elapsed.
        timeout_ms: u64,
    },

    /// The credential provider explicitly rejected the refresh.
    #[error("Token refresh rejected: {reason}")]
    RefreshRejected {
        /// Reason supplied by the provider.
        reason: String,
    },

    /// The refresh handle was dropped without being settled.
    ///
    /// Usually means no credential provider is subscribed, or the provider
    /// discarded the handle. Dispatched the same way as a rejection.
    #[error("Token refresh handle dropped before completion")]
    RefreshChannelClosed,
}

impl CoordinatorError {
    /// Create a refresh timeout error (logs at WARN level).
    pub fn refresh_timeout(timeout_ms: u64) -> Self {
        log_warn!(
            error_type = "refresh_timeout",
            timeout_ms = timeout_ms,
            "Token refresh handshake timed out"
        );
        Self::RefreshTimeout { timeout_ms }
    }

    /// Create a refresh rejection error (logs at WARN level).
    pub fn refresh_rejected(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        log_warn!(
            error_type = "refresh_rejected",
            reason = %reason,
            "Credential provider rejected token refresh"
        );
        Self::RefreshRejected { reason }
    }

    /// Create a closed-channel error (logs at WARN level).
    pub fn refresh_channel_closed() -> Self {
        log_warn!(
            error_type = "refresh_channel_closed",
            "Token refresh handle dropped without resolve or reject"
        );
        Self::RefreshChannelClosed
    }
}
