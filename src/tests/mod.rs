// Test modules for conn-resilience crate
//
// Test organization follows the pattern where each source file has a
// corresponding test file that focuses on business logic verification.

// Test helper utilities
pub mod helpers;

pub mod history;
