//! Coordinator configuration.
//!
//! All tunables live in [`CoordinatorConfig`]. The defaults are the
//! production values; tests shrink the time-based ones to keep runs fast.
//! Configuration sourcing (files, environment) is the host application's
//! concern - this crate only consumes the struct.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the resilience coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// Maximum number of error records retained; oldest evicted first.
    pub max_history_size: usize,

    /// Default sliding window for persistent-issue detection.
    pub persistent_window: Duration,

    /// A category is a persistent issue when its count within the window
    /// exceeds this threshold.
    pub persistent_threshold: usize,

    /// How long to wait for the credential provider to settle a refresh
    /// handshake before treating it as failed.
    pub refresh_timeout: Duration,

    /// Attempt counts above this force severity to critical.
    pub critical_attempt_threshold: u32,

    /// Attempt counts above this force the recovery action to permanent
    /// failure regardless of category.
    pub permanent_attempt_threshold: u32,

    /// Window for the `recent_errors` slice of statistics queries.
    pub recent_window: Duration,

    /// Buffered capacity of the broadcast event bus per subscriber.
    pub event_capacity: usize,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            max_history_size: 100,
            persistent_window: Duration::from_secs(300),
            persistent_threshold: 5,
            refresh_timeout: Duration::from_secs(5),
            critical_attempt_threshold: 3,
            permanent_attempt_threshold: 10,
            recent_window: Duration::from_secs(3600),
            event_capacity: 64,
        }
    }
}
