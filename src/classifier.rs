//! Heuristic failure classification.
//!
//! Raw failures arrive as loosely-structured text from heterogeneous sources
//! (socket errors, server payloads, timeouts), so the message is the only
//! signal available. Classification lower-cases the message and applies an
//! ordered set of substring buckets; the first match wins. Callers must not
//! reorder the buckets - the precedence (network/timeout before
//! authentication before protocol before server) is part of the contract.
//!
//! Classification never fails: an unrecognized message falls back to the
//! origin hint supplied by the entry point, with severity medium and code
//! `unknown_error`.

use crate::config::CoordinatorConfig;
use crate::error::{ErrorCategory, ErrorContext, ErrorRecord, ErrorSeverity, RecoveryAction};
use crate::logging::log_debug;
use chrono::Utc;
use uuid::Uuid;

/// The outcome of a heuristic bucket match, before escalation.
struct Disposition {
    category: ErrorCategory,
    severity: ErrorSeverity,
    code: &'static str,
    retryable: bool,
    recovery_action: RecoveryAction,
}

/// Pure classifier mapping a raw failure plus optional context into an
/// immutable [`ErrorRecord`].
///
/// The classifier also owns the attempt-count escalation policy: a single
/// failure and the tenth consecutive identical failure warrant different
/// responses even though the category is unchanged.
#[derive(Debug, Clone, Copy)]
pub struct ErrorClassifier {
    critical_attempt_threshold: u32,
    permanent_attempt_threshold: u32,
}

impl Default for ErrorClassifier {
    fn default() -> Self {
        Self::new(&CoordinatorConfig::default())
    }
}

impl ErrorClassifier {
    /// Create a classifier with the escalation thresholds from `config`.
    pub fn new(config: &CoordinatorConfig) -> Self {
        Self {
            critical_attempt_threshold: config.critical_attempt_threshold,
            permanent_attempt_threshold: config.permanent_attempt_threshold,
        }
    }

    /// Classify a raw failure message into an [`ErrorRecord`].
    ///
    /// `origin` is the category hint from the calling entry point, used only
    /// when no heuristic bucket matches. `context` is carried into the record
    /// unchanged; its `attempt_count` drives escalation.
    pub fn classify(
        &self,
        failure_message: &str,
        origin: ErrorCategory,
        context: Option<ErrorContext>,
    ) -> ErrorRecord {
        let disposition = Self::match_buckets(&failure_message.to_lowercase(), origin);
        let record = self.escalate(disposition, failure_message, context);

        log_debug!(
            category = ?record.category,
            severity = ?record.severity,
            code = %record.code,
            retryable = record.retryable,
            recovery_action = ?record.recovery_action,
            "Classified raw failure"
        );

        record
    }

    /// Ordered first-match substring heuristics. The order is load-bearing:
    /// "timeout" belongs to the network bucket even though timeouts get their
    /// own category, and must be checked before the authentication bucket.
    fn match_buckets(lowered: &str, origin: ErrorCategory) -> Disposition {
        if Self::matches_any(lowered, &["network", "connection refused", "timeout", "unreachable"])
        {
            let is_timeout = lowered.contains("timeout");
            return Disposition {
                category: if is_timeout {
                    ErrorCategory::Timeout
                } else {
                    ErrorCategory::Network
                },
                severity: ErrorSeverity::High,
                code: if is_timeout { "timeout" } else { "network_error" },
                retryable: true,
                recovery_action: RecoveryAction::Reconnect,
            };
        }

        if Self::matches_any(lowered, &["auth", "unauthorized", "forbidden", "token"]) {
            let code = if lowered.contains("token") {
                "invalid_token"
            } else if lowered.contains("unauthorized") || lowered.contains("forbidden") {
                "unauthorized"
            } else {
                "authentication_failed"
            };
            return Disposition {
                category: ErrorCategory::Authentication,
                severity: ErrorSeverity::High,
                code,
                retryable: true,
                recovery_action: RecoveryAction::RefreshToken,
            };
        }

        if Self::matches_any(lowered, &["parse", "malformed", "invalid json", "protocol"]) {
            return Disposition {
                category: ErrorCategory::Protocol,
                severity: ErrorSeverity::Medium,
                code: "protocol_error",
                retryable: false,
                recovery_action: RecoveryAction::LogOnly,
            };
        }

        if Self::matches_any(lowered, &["server", "internal", "500", "503"]) {
            let code = if lowered.contains("503") {
                "service_unavailable"
            } else if lowered.contains("500") || lowered.contains("internal") {
                "internal_server_error"
            } else {
                "server_error"
            };
            return Disposition {
                category: ErrorCategory::Server,
                severity: ErrorSeverity::High,
                code,
                retryable: true,
                recovery_action: RecoveryAction::Reconnect,
            };
        }

        // No bucket matched: fall back to the entry point's origin hint. The
        // recovery action derives from the hint so that retryable records
        // always carry a reconnect or refresh action.
        let (recovery_action, retryable) = Self::fallback_disposition(origin);
        Disposition {
            category: origin,
            severity: ErrorSeverity::Medium,
            code: "unknown_error",
            retryable,
            recovery_action,
        }
    }

    fn matches_any(lowered: &str, needles: &[&str]) -> bool {
        needles.iter().any(|needle| lowered.contains(needle))
    }

    fn fallback_disposition(origin: ErrorCategory) -> (RecoveryAction, bool) {
        match origin {
            ErrorCategory::Connection
            | ErrorCategory::Network
            | ErrorCategory::Timeout
            | ErrorCategory::Server => (RecoveryAction::Reconnect, true),
            ErrorCategory::Authentication => (RecoveryAction::RefreshToken, true),
            ErrorCategory::Protocol | ErrorCategory::Unknown => (RecoveryAction::LogOnly, false),
        }
    }

    /// Apply the attempt-count escalation policy and build the final record.
    fn escalate(
        &self,
        disposition: Disposition,
        failure_message: &str,
        context: Option<ErrorContext>,
    ) -> ErrorRecord {
        let mut severity = disposition.severity;
        let mut recovery_action = disposition.recovery_action;
        let mut retryable = disposition.retryable;

        let attempt_count = context.as_ref().and_then(|ctx| ctx.attempt_count);
        if let Some(attempts) = attempt_count {
            if attempts > self.critical_attempt_threshold {
                severity = ErrorSeverity::Critical;
            }
            if attempts > self.permanent_attempt_threshold {
                recovery_action = RecoveryAction::PermanentFailure;
                retryable = false;
            }
        }

        ErrorRecord {
            id: Uuid::new_v4(),
            category: disposition.category,
            severity,
            code: disposition.code.to_string(),
            message: failure_message.to_string(),
            timestamp: Utc::now(),
            context,
            retryable,
            recovery_action,
        }
    }
}
