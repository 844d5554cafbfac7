//! Login-attempt and token persistence on top of [`KeyValueStore`].
//!
//! The in-flight attempt lives in session-scoped storage so it cannot
//! outlive the session that started it. The token record lives in durable
//! storage. Both are last-write-wins; nothing here guards against a second
//! session writing the same backend concurrently.

use std::sync::Arc;

use crate::errors::AuthError;
use crate::ports::{Clock, KeyValueStore};
use crate::types::TokenRecord;

/// Session key for the PKCE code verifier.
pub const CODE_VERIFIER_KEY: &str = "oauth_code_verifier";

/// Session key for the anti-CSRF state.
pub const STATE_KEY: &str = "oauth_state";

/// Durable key for the token record.
pub const TOKEN_KEY: &str = "oauth_token";

/// Holds the verifier and state of at most one in-flight login attempt.
#[derive(Clone)]
pub struct TransientStore {
    backend: Arc<dyn KeyValueStore>,
}

impl TransientStore {
    /// Wrap a session-scoped backend.
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// Record a new attempt, silently replacing any previous one.
    pub fn save(&self, verifier: &str, state: &str) -> Result<(), AuthError> {
        self.backend.set(CODE_VERIFIER_KEY, verifier)?;
        self.backend.set(STATE_KEY, state)
    }

    /// Stored code verifier, if any.
    pub fn load_verifier(&self) -> Option<String> {
        self.backend.get(CODE_VERIFIER_KEY)
    }

    /// Stored state, if any.
    pub fn load_state(&self) -> Option<String> {
        self.backend.get(STATE_KEY)
    }

    /// Forget the attempt. Both keys are removed even if the first fails.
    pub fn clear(&self) -> Result<(), AuthError> {
        let verifier = self.backend.remove(CODE_VERIFIER_KEY);
        let state = self.backend.remove(STATE_KEY);
        verifier.and(state)
    }
}

/// Holds the latest token record across restarts.
#[derive(Clone)]
pub struct TokenStore {
    backend: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
}

impl TokenStore {
    /// Wrap a durable backend. `clock` decides expiry on read.
    pub fn new(backend: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self { backend, clock }
    }

    /// Replace the stored record.
    pub fn save(&self, record: &TokenRecord) -> Result<(), AuthError> {
        let json = serde_json::to_string(record)?;
        self.backend.set(TOKEN_KEY, &json)
    }

    /// Load the record if it exists, parses and has not expired.
    ///
    /// An expired record is reported as absent but left in place.
    pub fn load(&self) -> Option<TokenRecord> {
        let record = self.load_unchecked()?;
        if record.is_valid_at(self.clock.now_ms()) {
            Some(record)
        } else {
            tracing::debug!("stored token expired");
            None
        }
    }

    /// Load the record regardless of expiry.
    ///
    /// A value that fails to parse is deleted and reported as absent.
    pub fn load_unchecked(&self) -> Option<TokenRecord> {
        let raw = self.backend.get(TOKEN_KEY)?;
        match serde_json::from_str::<TokenRecord>(&raw) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("discarding corrupt stored token: {e}");
                if let Err(e) = self.backend.remove(TOKEN_KEY) {
                    tracing::warn!("failed to delete corrupt stored token: {e}");
                }
                None
            }
        }
    }

    /// Delete the stored record.
    pub fn clear(&self) -> Result<(), AuthError> {
        self.backend.remove(TOKEN_KEY)
    }

    /// Current time according to the store's clock.
    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
