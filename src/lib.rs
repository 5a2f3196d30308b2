//! # conn-resilience
//!
//! Connection-resilience coordinator for browser-style clients holding a
//! long-lived connection: classifies raw failures into a closed taxonomy,
//! keeps a bounded error history, and publishes recovery intents (reconnect,
//! refresh credentials, fall back to polling, notify the user, or give up)
//! over an event bus.
//!
//! ## Key Features
//!
//! - **Heuristic classification**: ordered substring matching turns
//!   loosely-structured failure text into stable categories, codes, and
//!   recovery actions
//! - **Severity escalation**: repeated failures of the same origin raise
//!   severity and can force permanent failure
//! - **Bounded history**: FIFO log with statistics and sliding-window
//!   persistent-issue detection
//! - **Refresh handshake**: bounded-time credential renewal raced against a
//!   fixed timeout over the event bus
//!
//! ## Example
//!
//! ```rust,no_run
//! use conn_resilience::{
//!     CoordinatorConfig, CoordinatorEvent, ErrorCategory, ResilienceCoordinator,
//! };
//!
//! # async fn example() {
//! let coordinator = ResilienceCoordinator::new(CoordinatorConfig::default());
//! let mut events = coordinator.subscribe();
//!
//! // A credential provider must answer refresh requests.
//! tokio::spawn(async move {
//!     while let Ok(event) = events.recv().await {
//!         if let CoordinatorEvent::TokenRefreshRequested(handle) = event {
//!             handle.resolve();
//!         }
//!     }
//! });
//!
//! let record = coordinator
//!     .handle_authentication_error("token expired", None)
//!     .await;
//! assert_eq!(record.category, ErrorCategory::Authentication);
//! # }
//! ```

// Allow missing errors documentation - errors are self-documenting via type signatures
#![allow(clippy::missing_errors_doc)]

pub mod classifier;
pub mod config;
pub mod coordinator;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod history;
pub mod refresh;

// Logging utilities (re-exports tracing with log_* naming) - internal only
pub(crate) mod logging;

#[cfg(test)]
pub mod tests;

// Re-export main types
pub use classifier::ErrorClassifier;
pub use config::CoordinatorConfig;
pub use coordinator::ResilienceCoordinator;
pub use dispatch::RecoveryDispatcher;
pub use error::{
    CoordinatorError, CoordinatorResult, ErrorCategory, ErrorContext, ErrorRecord, ErrorSeverity,
    RecoveryAction,
};
pub use events::{CoordinatorEvent, EventBus, RefreshHandle};
pub use history::{ErrorStatistics, HistoryStore};
pub use refresh::TokenRefreshCoordinator;
