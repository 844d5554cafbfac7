//! Host capabilities the flow depends on.
//!
//! Storage, wall-clock time, randomness and navigation are injected through
//! these traits so the flow runs the same way in a terminal, a desktop shell
//! or a test with in-memory fakes.

use crate::errors::AuthError;

/// Key/value storage scoped either to the current session or durably.
///
/// Reads and writes are synchronous; the flow relies on a write being
/// visible to the very next read in the same task.
pub trait KeyValueStore: Send + Sync {
    /// Read a value. Returns `None` when the key is absent.
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<(), AuthError>;

    /// Delete a value. Deleting an absent key succeeds.
    fn remove(&self, key: &str) -> Result<(), AuthError>;
}

/// Source of wall-clock time.
pub trait Clock: Send + Sync {
    /// Current time in milliseconds since the Unix epoch.
    fn now_ms(&self) -> i64;
}

/// Source of random strings over the unreserved character set.
pub trait RandomSource: Send + Sync {
    /// Produce a string of exactly `length` unreserved characters.
    fn random_string(&self, length: usize) -> String;
}

/// Transfers the user agent to the authorization server.
pub trait Navigator: Send + Sync {
    /// Navigate to `url`. An error means no navigation happened.
    fn navigate(&self, url: &str) -> Result<(), AuthError>;
}

/// [`Clock`] backed by the system time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// [`RandomSource`] backed by the thread-local CSPRNG.
#[derive(Clone, Copy, Debug, Default)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn random_string(&self, length: usize) -> String {
        crate::pkce::random_string(length)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
